use std::path::PathBuf;
use thiserror::Error;

/// Per-file AST ingestion errors. Recoverable: the loader reports the file
/// and continues with the remaining dumps.
#[derive(Error, Debug)]
pub enum AstError {
    #[error("translation unit root not found in {file}")]
    NotATranslationUnit { file: PathBuf },
}

/// Load-phase errors. Fatal: they abort the run before analysis begins.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to walk {path}")]
    DirWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}")]
    JsonDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
