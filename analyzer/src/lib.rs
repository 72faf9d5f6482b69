//! fuzzdelta - affected-fuzzer detection over Clang AST dumps
//!
//! Given two snapshots of the same codebase (each a directory tree of
//! `*.ast.json` translation-unit dumps) and a fuzzer-generation report, the
//! analysis answers one question: which fuzzers target a public API whose
//! call graph in snapshot 1 transitively reaches a method that changed
//! between the snapshots?
//!
//! Pipeline: load both snapshots, diff the method sets structurally, index
//! snapshot 1 by uid and by name, then run a memoized cycle-tolerant DFS
//! from each report API over the method reference graph.

pub mod cli;
pub mod models;
pub mod services;

pub use models::ast::{AstNode, ParamValue, Snapshot, TranslationUnit};
pub use models::error::{AstError, LoadError};
pub use models::report::PublicApiMap;
pub use services::affect::{find_affected_fuzzers, AffectAnalyzer};
