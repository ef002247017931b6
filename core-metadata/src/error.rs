use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read tags: {0}")]
    TagRead(String),

    #[error("HTTP error {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("{provider} API error {code}: {message}")]
    RemoteApi {
        provider: String,
        code: i64,
        message: String,
    },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not signed in to {0}")]
    NotSignedIn(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
