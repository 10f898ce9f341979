#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid transform `{value}`: {message}")]
    TransformParse { value: String, message: String },

    #[error("flat matrix must have 9 or 16 values, got {len}")]
    InvalidMatrixLength { len: usize },

    #[error("invalid preserveAspectRatio `{value}`")]
    AspectRatioParse { value: String },

    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },

    #[error("unknown node id: {id}")]
    UnknownNode { id: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
