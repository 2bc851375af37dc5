//! Provisions and populates a small analytics data lake on AWS: player
//! records fetched over HTTP land in S3 as JSON lines, get a Glue table
//! over them and are counted through Athena.

pub mod catalog;
pub mod config;
pub mod definitions;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod sql;
pub mod storage;

#[cfg(test)]
mod testing;
