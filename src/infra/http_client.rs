use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::app::ports::{FetchPort, FetchedResponse};

#[derive(Serialize, Deserialize)]
struct CachedMeta {
    status: u16,
    headers: HashMap<String, String>,
}

/// Reqwest-backed fetch adapter with an on-disk response cache keyed by the
/// sha256 of the exact URI string, fronted by an in-process memo so repeated
/// classification passes never touch the network or the disk twice.
pub struct CachedHttpClient {
    client: reqwest::Client,
    cache_root: PathBuf,
    memo: Mutex<HashMap<String, FetchedResponse>>,
}

impl CachedHttpClient {
    pub fn new<P: AsRef<Path>>(cache_root: P) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_root: cache_root.as_ref().to_path_buf(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn cache_paths(&self, uri: &str) -> (PathBuf, PathBuf) {
        let mut hasher = Sha256::new();
        hasher.update(uri.as_bytes());
        let hex = hex::encode(hasher.finalize());
        let dir = self.cache_root.join(&hex[0..2]).join(&hex[2..4]);
        (dir.join(format!("{hex}.json")), dir.join(format!("{hex}.bin")))
    }

    fn load_cached(&self, uri: &str) -> Option<FetchedResponse> {
        let (meta_path, body_path) = self.cache_paths(uri);
        let meta_bytes = fs::read(meta_path).ok()?;
        let meta: CachedMeta = serde_json::from_slice(&meta_bytes).ok()?;
        let body = fs::read(body_path).ok()?;
        Some(FetchedResponse {
            status: meta.status,
            headers: meta.headers,
            body,
        })
    }

    fn store_cached(&self, uri: &str, response: &FetchedResponse) -> Result<(), String> {
        let (meta_path, body_path) = self.cache_paths(uri);
        if let Some(parent) = meta_path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        if !meta_path.exists() {
            let meta = CachedMeta {
                status: response.status,
                headers: response.headers.clone(),
            };
            let meta_bytes = serde_json::to_vec(&meta).map_err(|e| e.to_string())?;
            fs::write(&body_path, &response.body).map_err(|e| e.to_string())?;
            fs::write(&meta_path, meta_bytes).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[async_trait]
impl FetchPort for CachedHttpClient {
    async fn get(&self, uri: &str) -> Result<FetchedResponse, String> {
        if let Some(hit) = self.memo.lock().unwrap().get(uri) {
            return Ok(hit.clone());
        }

        if let Some(hit) = self.load_cached(uri) {
            debug!(uri, "response cache hit");
            self.memo.lock().unwrap().insert(uri.to_string(), hit.clone());
            return Ok(hit);
        }

        let resp = self.client.get(uri).send().await.map_err(|e| e.to_string())?;
        let status = resp.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in resp.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }
        let body = resp.bytes().await.map_err(|e| e.to_string())?.to_vec();

        let response = FetchedResponse { status, headers, body };
        self.store_cached(uri, &response)?;
        self.memo
            .lock()
            .unwrap()
            .insert(uri.to_string(), response.clone());
        debug!(uri, status, "fetched and cached response");
        Ok(response)
    }
}
