use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A cached HTTP-like response as served by the fetch adapter.
///
/// Header names are stored lower-cased so lookups are case-insensitive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Read side of the response cache. `get` is idempotent: once a URI has been
/// fetched, repeated calls must be served from cache without a new network
/// round trip.
#[async_trait]
pub trait FetchPort: Send + Sync {
    async fn get(&self, uri: &str) -> Result<FetchedResponse, String>;
}

/// Append-only record of per-URI-M fetch/validation failures. A recorded
/// URI-M is permanently unusable for content-dependent operations within
/// the session.
#[async_trait]
pub trait ErrorStorePort: Send + Sync {
    /// Insert-if-absent; recording a second failure for the same URI-M is a no-op.
    async fn record(&self, urim: &str, info: &str) -> Result<(), String>;
    async fn lookup(&self, urim: &str) -> Result<Option<String>, String>;
}

/// Persistent cache of lazily computed per-URI-M artifacts. Both fields are
/// write-once: a populated field is never overwritten, so racing writers of
/// the same value are harmless.
#[async_trait]
pub trait DerivedStorePort: Send + Sync {
    async fn bpfree(&self, urim: &str) -> Result<Option<String>, String>;
    async fn put_bpfree(&self, urim: &str, text: &str) -> Result<(), String>;
    async fn fingerprint(&self, urim: &str) -> Result<Option<u64>, String>;
    async fn put_fingerprint(&self, urim: &str, fingerprint: u64) -> Result<(), String>;
    async fn urims_with_fingerprint(&self, fingerprint: u64) -> Result<Vec<String>, String>;
}

/// Boilerplate-removal collaborator: yields the paragraph texts of a page
/// with template/navigation chrome stripped. Fails on unparseable input.
pub trait TextExtractorPort: Send + Sync {
    fn extract(&self, html: &[u8]) -> Result<Vec<String>, String>;
}

/// Content-fingerprinting collaborator. Deterministic: identical bytes must
/// yield an identical fingerprint.
pub trait FingerprintPort: Send + Sync {
    fn fingerprint(&self, content: &[u8]) -> u64;
}
