#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use memento_curator::app::ports::{FetchPort, FetchedResponse, TextExtractorPort};
use memento_curator::infra::extractor::ParagraphExtractor;
use memento_curator::infra::fingerprint::Sha256Fingerprinter;
use memento_curator::infra::in_memory::{MemoryDerivedStore, MemoryErrorStore, StaticFetch};
use memento_curator::model::rawuri::raw_urim;
use memento_curator::model::CollectionModel;

pub fn memento_response(datetime: &str, body: &str) -> FetchedResponse {
    let mut headers = HashMap::new();
    headers.insert("memento-datetime".to_string(), datetime.to_string());
    headers.insert("content-type".to_string(), "text/html".to_string());
    FetchedResponse {
        status: 200,
        headers,
        body: body.as_bytes().to_vec(),
    }
}

pub fn plain_response(body: &str) -> FetchedResponse {
    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), "text/html".to_string());
    FetchedResponse {
        status: 200,
        headers,
        body: body.as_bytes().to_vec(),
    }
}

/// Seeds canned responses for a memento and its raw-content counterpart.
pub fn seed_memento(fetch: &StaticFetch, urim: &str, datetime: &str, raw_body: &str) {
    fetch.insert(urim, memento_response(datetime, "<html><p>archive banner</p></html>"));
    fetch.insert(&raw_urim(urim), memento_response(datetime, raw_body));
}

/// Extractor wrapper that counts invocations, for memoization assertions.
pub struct CountingExtractor {
    inner: ParagraphExtractor,
    calls: Arc<AtomicUsize>,
}

impl CountingExtractor {
    pub fn new(calls: Arc<AtomicUsize>) -> Self {
        Self { inner: ParagraphExtractor, calls }
    }
}

impl TextExtractorPort for CountingExtractor {
    fn extract(&self, html: &[u8]) -> Result<Vec<String>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.extract(html)
    }
}

pub struct Harness {
    pub fetch: Arc<StaticFetch>,
    pub model: CollectionModel,
    pub extractor_calls: Arc<AtomicUsize>,
}

/// Collection Model wired to in-memory adapters and canned responses.
pub fn harness() -> Harness {
    let fetch = Arc::new(StaticFetch::new());
    let extractor_calls = Arc::new(AtomicUsize::new(0));
    let model = CollectionModel::new(
        Arc::clone(&fetch) as Arc<dyn FetchPort>,
        Arc::new(MemoryErrorStore::new()),
        Arc::new(MemoryDerivedStore::new()),
        Arc::new(CountingExtractor::new(Arc::clone(&extractor_calls))),
        Arc::new(Sha256Fingerprinter),
    );
    Harness { fetch, model, extractor_calls }
}
