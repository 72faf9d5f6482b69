//! Method lookup maps over one snapshot
//!
//! The same function can surface several times across translation units: as
//! a declaration in every unit that includes its header and as a definition
//! in exactly one. The index therefore maps to lists, keyed both by producer
//! uid and by the display-name/mangled-name composite.

use crate::models::ast::AstNode;
use rustc_hash::FxHashMap;

/// Composite key joining a method's display name and mangled name. For free
/// `extern "C"` functions the two halves coincide.
pub fn name_key(display_name: &str, mangled_name: &str) -> String {
    format!("{display_name}{mangled_name}")
}

pub struct MethodIndex<'a> {
    by_uid: FxHashMap<&'a str, Vec<&'a AstNode>>,
    by_name: FxHashMap<String, Vec<&'a AstNode>>,
}

impl<'a> MethodIndex<'a> {
    pub fn new(methods: &[&'a AstNode]) -> Self {
        let mut by_uid: FxHashMap<&'a str, Vec<&'a AstNode>> = FxHashMap::default();
        let mut by_name: FxHashMap<String, Vec<&'a AstNode>> = FxHashMap::default();
        for &method in methods {
            by_uid.entry(method.uid()).or_default().push(method);
            by_name
                .entry(name_key(method.display_name(), method.mangled_name()))
                .or_default()
                .push(method);
        }
        Self { by_uid, by_name }
    }

    pub fn by_uid(&self, uid: &str) -> &[&'a AstNode] {
        self.by_uid.get(uid).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn by_name(&self, key: &str) -> &[&'a AstNode] {
        self.by_name.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn method_count(&self) -> usize {
        self.by_uid.values().map(Vec::len).sum()
    }
}
