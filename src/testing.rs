//! In-memory stand-ins for the three cloud services, used by unit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::mpsc,
};

use crate::{
    catalog::MetadataCatalog,
    config::Config,
    definitions::TableDefinition,
    error::{Error, Result},
    query::{QueryEngine, QuerySubmission},
    storage::ObjectStore,
};

/// Answers every HTTP request on a local port with the same response and
/// forwards each raw request head. Returns the `/players` URL to fetch.
pub async fn serve_json(status_line: &str, body: &str) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let (sender, receiver) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buffer = vec![0u8; 8192];
            let mut request = Vec::new();

            loop {
                let read = socket.read(&mut buffer).await.unwrap_or(0);
                request.extend_from_slice(&buffer[..read]);
                if read == 0 || request.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }

            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            let _ = sender.send(String::from_utf8_lossy(&request).to_string());
        }
    });

    (format!("http://{address}/players"), receiver)
}

/// A URL on a local port nothing listens on.
pub async fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{address}/players")
}

pub fn test_config(endpoint: &str) -> Config {
    Config {
        bucket_name: "nfl-lake".to_string(),
        catalog_database: "nfl_glue".to_string(),
        query_database: "nfl_athena".to_string(),
        api_key: "secret-key".to_string(),
        data_endpoint: endpoint.to_string(),
        object_key: "raw-data/nfl_player_data.jsonl".to_string(),
        bucket_ready_timeout: Duration::from_millis(20),
        bucket_ready_poll_interval: Duration::from_millis(1),
    }
}

#[derive(Default)]
pub struct FakeObjectStore {
    pub buckets: Mutex<HashSet<String>>,
    pub objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_exists_check: bool,
    pub fail_create: bool,
    pub fail_put: bool,
    /// Existence checks that report absence after a successful create.
    pub invisible_checks: Mutex<usize>,
}

impl FakeObjectStore {
    pub fn with_bucket(bucket: &str) -> Self {
        let store = Self::default();
        store.buckets.lock().unwrap().insert(bucket.to_string());
        store
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("head_bucket {bucket}"));

        if self.fail_exists_check {
            return Err(Error::Storage("head bucket timed out".to_string()));
        }

        let mut invisible = self.invisible_checks.lock().unwrap();
        if *invisible > 0 {
            *invisible -= 1;
            return Err(Error::Storage(format!("bucket {bucket} not found")));
        }

        if self.buckets.lock().unwrap().contains(bucket) {
            Ok(())
        } else {
            Err(Error::Storage(format!("bucket {bucket} not found")))
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("create_bucket {bucket}"));

        if self.fail_create {
            return Err(Error::Storage("access denied".to_string()));
        }

        if !self.buckets.lock().unwrap().insert(bucket.to_string()) {
            return Err(Error::Storage(format!(
                "bucket {bucket} already owned by you"
            )));
        }

        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.calls.lock().unwrap().push(format!("put_object {bucket}/{key}"));

        if self.fail_put {
            return Err(Error::Storage("slow down".to_string()));
        }

        if !self.buckets.lock().unwrap().contains(bucket) {
            return Err(Error::Storage(format!("bucket {bucket} does not exist")));
        }

        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body);

        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub databases: Mutex<HashSet<String>>,
    pub tables: Mutex<HashMap<(String, String), TableDefinition>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataCatalog for FakeCatalog {
    async fn create_database(&self, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("create_database {name}"));

        if !self.databases.lock().unwrap().insert(name.to_string()) {
            return Err(Error::Catalog(format!("database {name} already exists")));
        }

        Ok(())
    }

    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create_table {database}.{}", table.name));

        if !self.databases.lock().unwrap().contains(database) {
            return Err(Error::Catalog(format!("database {database} not found")));
        }

        let key = (database.to_string(), table.name.clone());
        let mut tables = self.tables.lock().unwrap();
        if tables.contains_key(&key) {
            return Err(Error::Catalog(format!(
                "table {database}.{} already exists",
                table.name
            )));
        }
        tables.insert(key, table.clone());

        Ok(())
    }
}

#[derive(Default)]
pub struct FakeQueryEngine {
    pub submissions: Mutex<Vec<QuerySubmission>>,
    pub fail: bool,
}

impl FakeQueryEngine {
    pub fn submissions(&self) -> Vec<QuerySubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryEngine for FakeQueryEngine {
    async fn submit_query(&self, submission: &QuerySubmission) -> Result<Option<String>> {
        self.submissions.lock().unwrap().push(submission.clone());

        if self.fail {
            return Err(Error::Query("throttled".to_string()));
        }

        let count = self.submissions.lock().unwrap().len();
        Ok(Some(format!("execution-{count}")))
    }
}
