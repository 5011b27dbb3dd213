use thiserror::Error;

#[derive(Debug, Error)]
pub enum BetterError {
    /// Connection, DNS, timeout, or body-read failure. Aborts the batch.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header \"{name}\": {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("no availability retrieved: zero days were requested")]
    NoData,

    #[error("none of the {requested} availability responses succeeded")]
    EmptyResult { requested: usize },

    #[error("JSON deserialization error for {context}: {source}")]
    InvalidJson {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response for {context} has no \"data\" field")]
    MissingData { context: String },

    #[error("unrecognized envelope shape for {context}: \"data\" is {kind}, expected an object or array")]
    UnrecognizedEnvelopeShape { context: String, kind: &'static str },

    #[error("record is {kind}, expected an object")]
    NonObjectRecord { kind: &'static str },

    #[error("cannot coerce column {column}: {reason}")]
    Coercion { column: &'static str, reason: String },
}
