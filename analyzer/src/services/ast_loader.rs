//! Snapshot discovery and loading
//!
//! Walks a project directory tree for `*.ast.json` dumps and decodes each
//! into a translation unit. Files whose root is not a translation unit are
//! reported and skipped; I/O and JSON failures abort the load.

use crate::models::ast::{Snapshot, TranslationUnit};
use crate::models::error::{AstError, LoadError};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const AST_FILE_SUFFIX: &str = ".ast.json";

pub fn load_snapshot(project_dir: &Path) -> Result<Snapshot, LoadError> {
    let mut units = Vec::new();
    for path in discover_ast_files(project_dir)? {
        let file = File::open(&path).map_err(|source| LoadError::FileRead {
            path: path.clone(),
            source,
        })?;
        let doc: serde_json::Value = serde_json::from_reader(BufReader::new(file)).map_err(
            |source| LoadError::JsonDecode {
                path: path.clone(),
                source,
            },
        )?;
        match TranslationUnit::from_json(path, &doc) {
            Ok(unit) => units.push(unit),
            Err(skipped @ AstError::NotATranslationUnit { .. }) => {
                warn!("skipping AST dump: {skipped}");
            }
        }
    }

    debug!(
        units = units.len(),
        dir = %project_dir.display(),
        "snapshot loaded"
    );
    Ok(Snapshot {
        project_dir: project_dir.to_path_buf(),
        units,
    })
}

fn discover_ast_files(project_dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(project_dir).follow_links(false) {
        let entry = entry.map_err(|source| LoadError::DirWalk {
            path: project_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(AST_FILE_SUFFIX) {
            files.push(entry.into_path());
        }
    }
    // Sort for deterministic load order; downstream logic is
    // order-insensitive either way.
    files.sort();
    Ok(files)
}
