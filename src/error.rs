#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("link {link} references a missing node ({from} -> {to})")]
    InvalidLinkReference {
        link: usize,
        from: String,
        to: String,
    },
    #[error("duplicate node id: {id}")]
    DuplicateNodeId { id: String },
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },
    #[error("unknown node: {id}")]
    UnknownNode { id: String },
    #[error("non-finite drag coordinates for node {id}")]
    NonFiniteCoordinate { id: String },
}

impl Error {
    pub(crate) fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
