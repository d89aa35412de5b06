pub mod extractor;
pub mod fingerprint;
pub mod http_client;
pub mod in_memory;
pub mod sqlite_store;
