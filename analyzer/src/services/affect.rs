//! Transitive-affect analysis
//!
//! Memoized depth-first reachability over the method reference graph of
//! snapshot 1. The graph is cyclic in general (recursion, mutual recursion);
//! a per-descent path set guards against re-entry while a global cache keeps
//! the whole run linear in the node count.

use crate::models::error::LoadError;
use crate::models::report::PublicApiMap;
use crate::services::ast_loader::load_snapshot;
use crate::services::diff::find_modified_ids;
use crate::services::method_index::{name_key, MethodIndex};
use crate::services::report::load_public_api;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, trace};

pub struct AffectAnalyzer<'a> {
    public_api: &'a PublicApiMap,
    modified_ids: &'a FxHashSet<String>,
    index: &'a MethodIndex<'a>,
    checked_methods: FxHashMap<String, bool>,
    checked_nodes: FxHashMap<String, bool>,
}

impl<'a> AffectAnalyzer<'a> {
    pub fn new(
        public_api: &'a PublicApiMap,
        modified_ids: &'a FxHashSet<String>,
        index: &'a MethodIndex<'a>,
    ) -> Self {
        Self {
            public_api,
            modified_ids,
            index,
            checked_methods: FxHashMap::default(),
            checked_nodes: FxHashMap::default(),
        }
    }

    /// Collects the fuzzer labels of every affected public API.
    pub fn run(&mut self) -> BTreeSet<String> {
        let mut affected = BTreeSet::new();
        let public_api = self.public_api;
        for (api, fuzzers) in public_api {
            debug!(api = %api, "checking public API");
            let hit = match self.checked_methods.get(api) {
                Some(&hit) => hit,
                None => {
                    let hit = self.is_method_affected(api);
                    self.checked_methods.insert(api.clone(), hit);
                    hit
                }
            };
            if hit {
                info!(api = %api, "public API affected");
                affected.extend(fuzzers.iter().cloned());
            }
        }
        affected
    }

    /// The name key doubles the API name: only symbols whose display and
    /// mangled names both equal the API name match, i.e. `extern "C"`
    /// functions. An API with no such method has no roots and is unaffected.
    fn is_method_affected(&mut self, api: &str) -> bool {
        let roots: FxHashSet<String> = self
            .index
            .by_name(&name_key(api, api))
            .iter()
            .map(|method| method.uid().to_string())
            .collect();
        let mut stack = FxHashSet::default();
        self.are_nodes_affected(&roots, &mut stack)
    }

    fn are_nodes_affected(&mut self, uids: &FxHashSet<String>, stack: &mut FxHashSet<String>) -> bool {
        for uid in uids {
            trace!(uid = %uid, "checking node");

            // Cycle guard: an in-progress ancestor on the current DFS path
            // contributes "not yet known" and is skipped for this descent.
            if stack.contains(uid) {
                trace!(uid = %uid, "on current path, skipped");
                continue;
            }

            if !self.checked_nodes.contains_key(uid) {
                stack.insert(uid.clone());
                let affected = self.is_node_affected(uid, stack);
                stack.remove(uid);
                // Recorded only after the recursive call returns; an
                // in-progress entry would poison the cache with a premature
                // false.
                self.checked_nodes.insert(uid.clone(), affected);
            }
            if self.checked_nodes.get(uid).copied().unwrap_or(false) {
                trace!(uid = %uid, "node affected");
                return true;
            }
        }
        false
    }

    /// Expands a uid to every same-named method before testing, so that a
    /// header declaration and its definition (distinct uids, identical
    /// names) pool their outgoing references.
    fn is_node_affected(&mut self, uid: &str, stack: &mut FxHashSet<String>) -> bool {
        let index = self.index;
        for method in index.by_uid(uid) {
            if method.display_name().is_empty() || method.mangled_name().is_empty() {
                continue;
            }
            let key = name_key(method.display_name(), method.mangled_name());
            for sibling in index.by_name(&key) {
                if self.modified_ids.contains(sibling.uid()) {
                    return true;
                }
                if self.are_nodes_affected(&sibling.find_referenced_methods(), stack) {
                    return true;
                }
            }
        }
        false
    }
}

/// End-to-end driver: loads the report and both snapshots, diffs the method
/// sets, and runs the reachability analysis over snapshot 1.
pub fn find_affected_fuzzers(
    report_path: &Path,
    ast_dir1: &Path,
    ast_dir2: &Path,
) -> Result<BTreeSet<String>, LoadError> {
    let public_api = load_public_api(report_path)?;

    let snapshot1 = load_snapshot(ast_dir1)?;
    let snapshot2 = load_snapshot(ast_dir2)?;
    let methods1 = snapshot1.find_methods(None, None);
    let methods2 = snapshot2.find_methods(None, None);
    info!(
        methods1 = methods1.len(),
        methods2 = methods2.len(),
        "methods discovered"
    );

    let modified_ids = find_modified_ids(&methods1, &methods2);
    info!(modified = modified_ids.len(), "modified methods detected");

    let index = MethodIndex::new(&methods1);
    let mut analyzer = AffectAnalyzer::new(&public_api, &modified_ids, &index);
    let affected = analyzer.run();
    info!(fuzzers = affected.len(), "affected fuzzers collected");
    Ok(affected)
}
