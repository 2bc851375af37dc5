use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{multispace0, multispace1},
    combinator::{eof, opt, recognize},
    sequence::pair,
    IResult,
};

use crate::error::{Error, Result};

/// Statements this tool submits to the query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateDatabaseIfNotExists(String),
    SelectCount { database: String, table: String },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::CreateDatabaseIfNotExists(database) => {
                write!(f, "CREATE DATABASE IF NOT EXISTS {database}")
            }
            Statement::SelectCount { database, table } => {
                write!(f, "SELECT COUNT(*) FROM {database}.{table}")
            }
        }
    }
}

impl Statement {
    /// Renders the statement and parses the text back. Names that would
    /// change the statement's shape (quotes, dots, separators) do not
    /// survive the round trip and are rejected.
    pub fn to_checked_sql(&self) -> Result<String> {
        let sql = self.to_string();

        match parse_statement(&sql) {
            Ok((_, parsed)) if parsed == *self => Ok(sql),
            _ => Err(Error::UnsafeStatement(sql)),
        }
    }
}

pub fn parse_statement(input: &str) -> IResult<&str, Statement> {
    let (input, _) = multispace0(input)?;
    let (input, statement) = alt((parse_create_database, parse_select_count))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(tag(";"))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = eof(input)?;

    IResult::Ok((input, statement))
}

fn parse_create_database(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("CREATE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("DATABASE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("IF")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("NOT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("EXISTS")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, database) = parse_ident(input)?;

    IResult::Ok((input, Statement::CreateDatabaseIfNotExists(database)))
}

fn parse_select_count(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("SELECT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("COUNT")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("(*)")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("FROM")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, database) = parse_ident(input)?;
    let (input, _) = tag(".")(input)?;
    let (input, table) = parse_ident(input)?;

    IResult::Ok((input, Statement::SelectCount { database, table }))
}

fn parse_ident(input: &str) -> IResult<&str, String> {
    let (input, ident) = recognize(pair(
        take_while1(|ch: char| ch.is_ascii_alphabetic() || ch == '_'),
        take_while(|ch: char| ch.is_ascii_alphanumeric() || ch == '_'),
    ))(input)?;

    IResult::Ok((input, ident.to_string()))
}
