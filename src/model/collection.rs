use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::ports::{
    DerivedStorePort, ErrorStorePort, FetchPort, FingerprintPort, TextExtractorPort,
};
use crate::common::error::{CurateError, Result};
use crate::model::rawuri::raw_urim;
use crate::model::timemap::{self, TimeMap};

/// URI-M/URI-T-addressed view over the fetch, error, and derived-value
/// caches.
///
/// The model owns the in-memory registration lists (append-only within a
/// session) and mediates all access to the shared stores. A URI-M with an
/// Error Record is permanently blocked from content-dependent operations;
/// derived values are memoized write-once.
pub struct CollectionModel {
    fetch: Arc<dyn FetchPort>,
    errors: Arc<dyn ErrorStorePort>,
    derived: Arc<dyn DerivedStorePort>,
    extractor: Arc<dyn TextExtractorPort>,
    fingerprinter: Arc<dyn FingerprintPort>,
    urim_list: Vec<String>,
    urit_list: Vec<String>,
}

impl CollectionModel {
    pub fn new(
        fetch: Arc<dyn FetchPort>,
        errors: Arc<dyn ErrorStorePort>,
        derived: Arc<dyn DerivedStorePort>,
        extractor: Arc<dyn TextExtractorPort>,
        fingerprinter: Arc<dyn FingerprintPort>,
    ) -> Self {
        Self {
            fetch,
            errors,
            derived,
            extractor,
            fingerprinter,
            urim_list: Vec::new(),
            urit_list: Vec::new(),
        }
    }

    /// Fetches the TimeMap resource (populating the response cache) and
    /// registers `urit`. Fetch failures propagate to the caller.
    pub async fn add_timemap(&mut self, urit: &str) -> Result<()> {
        self.fetch.get(urit).await.map_err(|message| CurateError::Fetch {
            uri: urit.to_string(),
            message,
        })?;
        self.urit_list.push(urit.to_string());
        debug!(urit, "registered TimeMap");
        Ok(())
    }

    /// Parses the previously fetched TimeMap body.
    pub async fn get_timemap(&self, urit: &str) -> Result<TimeMap> {
        if !self.urit_list.iter().any(|u| u == urit) {
            return Err(CurateError::NotRegistered(urit.to_string()));
        }
        let response = self.fetch.get(urit).await.map_err(|message| CurateError::Fetch {
            uri: urit.to_string(),
            message,
        })?;
        timemap::parse_link_timemap(&response.text())
    }

    /// Fetches `urim` and its raw-content counterpart, registering the
    /// URI-M on success. Fetch failures become Error Records rather than
    /// propagating, so a dead link never aborts collection building.
    pub async fn add_memento(&mut self, urim: &str) -> Result<()> {
        let outcome = match self.fetch.get(urim).await {
            Ok(_) => self.fetch.get(&raw_urim(urim)).await.map(|_| ()),
            Err(message) => Err(message),
        };
        match outcome {
            Ok(()) => {
                self.urim_list.push(urim.to_string());
                Ok(())
            }
            Err(message) => {
                warn!(urim, %message, "memento fetch failed, recording error");
                self.add_memento_error(urim, &message).await
            }
        }
    }

    /// Explicit error registration, e.g. after header validation finds no
    /// memento marker. At most one Error Record per URI-M is kept.
    pub async fn add_memento_error(&self, urim: &str, info: &str) -> Result<()> {
        self.errors.record(urim, info).await.map_err(CurateError::Store)
    }

    /// Registers a URI-M whose fetches already settled successfully, used by
    /// the batch ingestion engine.
    pub(crate) fn register_memento(&mut self, urim: &str) {
        self.urim_list.push(urim.to_string());
    }

    /// Returns the raw-content body of a registered memento.
    pub async fn get_memento_content(&self, urim: &str) -> Result<String> {
        if !self.urim_list.iter().any(|u| u == urim) {
            return Err(CurateError::NoSuchMemento(urim.to_string()));
        }
        if self.get_memento_error_information(urim).await?.is_some() {
            return Err(CurateError::MementoError(urim.to_string()));
        }
        let raw = raw_urim(urim);
        let response = self.fetch.get(&raw).await.map_err(|message| CurateError::Fetch {
            uri: raw.clone(),
            message,
        })?;
        Ok(response.text())
    }

    /// Point lookup of the recorded error, `None` when no failure was
    /// recorded. An unregistered URI-M also yields `None`; callers must
    /// separately confirm registration to tell "no error" from "unknown".
    pub async fn get_memento_error_information(&self, urim: &str) -> Result<Option<String>> {
        self.errors.lookup(urim).await.map_err(CurateError::Store)
    }

    /// Returns the memento's text with boilerplate removed, computing and
    /// persisting it on first access.
    pub async fn get_memento_content_without_boilerplate(&self, urim: &str) -> Result<String> {
        if self.get_memento_error_information(urim).await?.is_some() {
            return Err(CurateError::MementoError(urim.to_string()));
        }

        if let Some(text) = self.derived.bpfree(urim).await.map_err(CurateError::Store)? {
            return Ok(text);
        }

        let content = self.get_memento_content(urim).await?;
        let paragraphs = self.extractor.extract(content.as_bytes()).map_err(|message| {
            CurateError::BoilerplateRemovalFailure {
                urim: urim.to_string(),
                message,
            }
        })?;

        let mut text = String::new();
        for paragraph in paragraphs {
            text.push_str(&paragraph);
            text.push('\n');
        }

        self.derived
            .put_bpfree(urim, &text)
            .await
            .map_err(CurateError::Store)?;
        Ok(text)
    }

    /// Returns the memento's raw-content fingerprint, computing and
    /// persisting it on first access.
    pub async fn get_raw_fingerprint(&self, urim: &str) -> Result<u64> {
        if self.get_memento_error_information(urim).await?.is_some() {
            return Err(CurateError::MementoError(urim.to_string()));
        }

        if let Some(fingerprint) = self.derived.fingerprint(urim).await.map_err(CurateError::Store)?
        {
            return Ok(fingerprint);
        }

        let content = self.get_memento_content(urim).await?;
        let fingerprint = self.fingerprinter.fingerprint(content.as_bytes());
        self.derived
            .put_fingerprint(urim, fingerprint)
            .await
            .map_err(CurateError::Store)?;
        Ok(fingerprint)
    }

    /// Resolves the most recent capture among all URI-Ms sharing
    /// `fingerprint`: descending sort on `(capture time, URI-M)`, so ties on
    /// capture time break toward the lexically larger URI-M.
    ///
    /// Expects [`Self::get_raw_fingerprint`] to have been called for at
    /// least one member of the group.
    pub async fn get_first_urim_by_raw_fingerprint(
        &self,
        fingerprint: u64,
    ) -> Result<(DateTime<Utc>, String)> {
        let urims = self
            .derived
            .urims_with_fingerprint(fingerprint)
            .await
            .map_err(CurateError::Store)?;

        let mut matches: Vec<(DateTime<Utc>, String)> = Vec::new();
        for urim in urims {
            let headers = self.get_memento_headers(&urim).await?;
            let datetime = headers
                .get("memento-datetime")
                .and_then(|v| timemap::parse_memento_datetime(v));
            match datetime {
                Some(dt) => matches.push((dt, urim)),
                None => warn!(urim, "memento has no parseable Memento-Datetime header"),
            }
        }

        matches.sort_by(|a, b| b.cmp(a));
        matches.into_iter().next().ok_or_else(|| {
            CurateError::NoSuchMemento(format!(
                "no derived records share fingerprint {fingerprint}"
            ))
        })
    }

    /// Cache pass-through for the memento's response headers; not gated by
    /// the Error Store.
    pub async fn get_memento_headers(&self, urim: &str) -> Result<HashMap<String, String>> {
        let response = self.fetch.get(urim).await.map_err(|message| CurateError::Fetch {
            uri: urim.to_string(),
            message,
        })?;
        Ok(response.headers)
    }

    /// Registered URI-Ms, in registration order.
    pub fn get_memento_uri_list(&self) -> &[String] {
        &self.urim_list
    }

    /// Registered URI-Ts, in registration order.
    pub fn get_timemap_uri_list(&self) -> &[String] {
        &self.urit_list
    }

    pub(crate) fn fetch_port(&self) -> Arc<dyn FetchPort> {
        Arc::clone(&self.fetch)
    }
}
