//! Modified-method detection between two snapshots
//!
//! One-sided from snapshot 1's perspective: a method counts as modified when
//! no structurally equal subtree exists anywhere in snapshot 2. Methods have
//! no usable hash (children compare as an unordered collection), so the scan
//! is a linear search per method; quadratic worst case, fine for inputs in
//! the thousands.

use crate::models::ast::AstNode;
use rustc_hash::FxHashSet;
use tracing::debug;

pub fn find_modified_ids(methods1: &[&AstNode], methods2: &[&AstNode]) -> FxHashSet<String> {
    let mut modified = FxHashSet::default();
    for &method in methods1 {
        if !methods2.iter().any(|&other| method == other) {
            debug!(
                uid = method.uid(),
                name = method.display_name(),
                "method modified"
            );
            modified.insert(method.uid().to_string());
        }
    }
    modified
}
