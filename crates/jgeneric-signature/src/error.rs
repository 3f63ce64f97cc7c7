use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("unexpected end of input in `{text}`")]
    UnexpectedEnd { text: String },

    #[error("unexpected `{found}` at offset {offset} in `{text}`")]
    Unexpected {
        found: char,
        offset: usize,
        text: String,
    },

    #[error("unknown class `{0}`")]
    UnknownClass(String),

    #[error("`{0}` cannot take type arguments")]
    UnexpectedTypeArguments(String),

    #[error("invalid type parameter declaration `{0}`")]
    InvalidTypeParam(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("class `{0}` is declared more than once")]
    DuplicateClass(String),

    #[error("{context}: {source}")]
    Signature {
        context: String,
        #[source]
        source: SignatureError,
    },
}
