use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record name must not be empty")]
    EmptyName,

    #[error("{op} is not supported by {kind} records")]
    NotSupported {
        kind: &'static str,
        op: &'static str,
    },

    #[error("{kind} records do not accept a codec")]
    CodecForbidden { kind: &'static str },

    #[error("{op} cannot be used while a codec is attached")]
    CodecConflict { op: &'static str },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("wrong record kind under key: {key}")]
    WrongType { key: String },

    #[error("store backend error: {0}")]
    Backend(String),
}
