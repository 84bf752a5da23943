use thiserror::Error;

use crate::resources::SourceKind;

/// Failures specific to asset loading. Everything else travels as `anyhow::Error`.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("unsupported uri `{0}`: only relative paths are resolved")]
    UnsupportedUri(String),

    #[error("gltf buffer {index} of `{file}` is missing")]
    MissingBuffer { file: String, index: usize },

    #[error("source `{name}` needs {expected} path(s), got {actual}")]
    WrongPathCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("no source named `{0}` was declared")]
    UnknownSource(String),

    #[error("source `{name}` is declared as {expected:?} but loaded as {actual:?}")]
    WrongKind {
        name: String,
        expected: SourceKind,
        actual: SourceKind,
    },

    #[error("`{0}` is not a gltf asset")]
    NotAGltf(String),
}
