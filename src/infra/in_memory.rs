use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::app::ports::{DerivedStorePort, ErrorStorePort, FetchPort, FetchedResponse};

/// In-memory Error Store for development/testing.
#[derive(Default)]
pub struct MemoryErrorStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryErrorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ErrorStorePort for MemoryErrorStore {
    async fn record(&self, urim: &str, info: &str) -> Result<(), String> {
        let mut records = self.records.lock().unwrap();
        records.entry(urim.to_string()).or_insert_with(|| info.to_string());
        Ok(())
    }

    async fn lookup(&self, urim: &str) -> Result<Option<String>, String> {
        let records = self.records.lock().unwrap();
        Ok(records.get(urim).cloned())
    }
}

#[derive(Default, Clone)]
struct DerivedRecord {
    bpfree: Option<String>,
    fingerprint: Option<u64>,
}

/// In-memory Derived-Value Store with the same write-once field semantics as
/// the SQLite adapter.
#[derive(Default)]
pub struct MemoryDerivedStore {
    records: Mutex<HashMap<String, DerivedRecord>>,
}

impl MemoryDerivedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DerivedStorePort for MemoryDerivedStore {
    async fn bpfree(&self, urim: &str) -> Result<Option<String>, String> {
        let records = self.records.lock().unwrap();
        Ok(records.get(urim).and_then(|r| r.bpfree.clone()))
    }

    async fn put_bpfree(&self, urim: &str, text: &str) -> Result<(), String> {
        let mut records = self.records.lock().unwrap();
        let record = records.entry(urim.to_string()).or_default();
        if record.bpfree.is_none() {
            record.bpfree = Some(text.to_string());
        }
        Ok(())
    }

    async fn fingerprint(&self, urim: &str) -> Result<Option<u64>, String> {
        let records = self.records.lock().unwrap();
        Ok(records.get(urim).and_then(|r| r.fingerprint))
    }

    async fn put_fingerprint(&self, urim: &str, fingerprint: u64) -> Result<(), String> {
        let mut records = self.records.lock().unwrap();
        let record = records.entry(urim.to_string()).or_default();
        if record.fingerprint.is_none() {
            record.fingerprint = Some(fingerprint);
        }
        Ok(())
    }

    async fn urims_with_fingerprint(&self, fingerprint: u64) -> Result<Vec<String>, String> {
        let records = self.records.lock().unwrap();
        let mut urims: Vec<String> = records
            .iter()
            .filter(|(_, r)| r.fingerprint == Some(fingerprint))
            .map(|(urim, _)| urim.clone())
            .collect();
        urims.sort();
        Ok(urims)
    }
}

/// Fetch adapter serving canned responses, for tests and offline runs. URIs
/// without a canned response fail the way a dead link would.
#[derive(Default)]
pub struct StaticFetch {
    responses: Mutex<HashMap<String, FetchedResponse>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl StaticFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: &str, response: FetchedResponse) {
        self.responses.lock().unwrap().insert(uri.to_string(), response);
    }

    /// Number of `get` calls observed for `uri`.
    pub fn hits(&self, uri: &str) -> usize {
        self.hits.lock().unwrap().get(uri).copied().unwrap_or(0)
    }
}

#[async_trait]
impl FetchPort for StaticFetch {
    async fn get(&self, uri: &str) -> Result<FetchedResponse, String> {
        *self.hits.lock().unwrap().entry(uri.to_string()).or_insert(0) += 1;
        self.responses
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or_else(|| format!("connection refused for {uri}"))
    }
}
