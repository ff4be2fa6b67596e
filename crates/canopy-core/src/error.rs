pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied taxonomy is not a tree of named nodes.
    #[error("Malformed taxonomy at {path}: {message}")]
    MalformedInput { path: String, message: String },

    #[error("Taxonomy JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No render node with identity {identity}")]
    UnknownNode { identity: u64 },
}

impl Error {
    pub(crate) fn malformed(path: &str, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
