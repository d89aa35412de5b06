use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("fetch failed for {uri}: {message}")]
    Fetch { uri: String, message: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("no such memento: {0}")]
    NoSuchMemento(String),

    #[error("errors were recorded for URI-M {0}")]
    MementoError(String),

    #[error("boilerplate removal failed for {urim}: {message}")]
    BoilerplateRemovalFailure { urim: String, message: String },

    #[error("TimeMap {0} was never registered")]
    NotRegistered(String),

    #[error("TimeMap could not be parsed: {0}")]
    TimeMapParse(String),

    #[error("ingestion task failed: {0}")]
    Ingestion(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CurateError>;
