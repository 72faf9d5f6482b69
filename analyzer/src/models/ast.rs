//! In-memory model for Clang AST dumps
//!
//! Each `*.ast.json` file is one translation unit. Nodes are normalized at
//! construction into a canonical comparable form: location data and other
//! producer noise are dropped, build-sandbox paths are blanked, and comment
//! nodes are filtered out, so that structural equality between two parses
//! reflects real source changes only.

use crate::models::error::AstError;
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Comment node kinds, dropped at ingestion.
pub const SKIPPED_KINDS: [&str; 12] = [
    "FullComment",
    "ParagraphComment",
    "TextComment",
    "InlineCommandComment",
    "HTMLStartTagComment",
    "HTMLEndTagComment",
    "BlockCommandComment",
    "ParamCommandComment",
    "TParamCommandComment",
    "VerbatimBlockComment",
    "VerbatimBlockLineComment",
    "VerbatimLineComment",
];

/// Function-like declaration kinds.
pub const METHOD_KINDS: [&str; 5] = [
    "FunctionDecl",
    "CXXConstructorDecl",
    "CXXDestructorDecl",
    "CXXMethodDecl",
    "FunctionTemplateDecl",
];

/// The only JSON keys that are ingested; everything else (`loc`, `range`,
/// ...) is producer noise for our purposes.
const USED_NODE_KEYS: [&str; 15] = [
    "id",
    "kind",
    "name",
    "mangledName",
    "isUsed",
    "virtual",
    "type",
    "valueCategory",
    "value",
    "opcode",
    "castKind",
    "isReferenced",
    "referencedDecl",
    "referencedMemberDecl",
    "inner",
];

/// Build-sandbox prefix that leaks into `qualType` and string literals and
/// varies between snapshot builds.
const BUILD_SANDBOX_PATH: &str = "/home/abuild/rpmbuild";

const TRANSLATION_UNIT_KIND: &str = "TranslationUnitDecl";

/// Value of a single comparable node parameter.
///
/// `referencedDecl` is ingested as an owned nested node inside the param map;
/// it participates in equality but does not share identity with the method it
/// references.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Bool(bool),
    Node(Box<AstNode>),
}

impl ParamValue {
    /// Scalar JSON mapping: strings and booleans as-is, numbers as their
    /// decimal text. Nulls and structured values for scalar keys are dropped.
    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ParamValue::Str(s.clone())),
            Value::Bool(b) => Some(ParamValue::Bool(*b)),
            Value::Number(n) => Some(ParamValue::Str(n.to_string())),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{s}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Node(node) => {
                write!(f, "AstNode(uid: {}, kind: {})", node.uid(), node.kind())
            }
        }
    }
}

/// A single normalized AST node.
#[derive(Debug, Clone)]
pub struct AstNode {
    /// Opaque producer-assigned id (hex address). Not compared.
    uid: String,
    /// Canonical comparable parameters.
    params: BTreeMap<String, ParamValue>,
    /// Parameters that cannot be compared (`referencedMemberDecl` is a bare
    /// uid whose target kind is not recorded).
    params_ex: BTreeMap<String, String>,
    /// Source-ordered children, comment kinds already filtered.
    children: Vec<AstNode>,
    /// Provenance only; not compared.
    file_pathname: Arc<Path>,
}

impl AstNode {
    pub fn from_json(file_pathname: &Arc<Path>, node: &Map<String, Value>) -> Self {
        let mut uid = String::new();
        let mut params = BTreeMap::new();
        let mut params_ex = BTreeMap::new();
        let mut children = Vec::new();

        for (key, value) in node {
            if !USED_NODE_KEYS.contains(&key.as_str()) {
                continue;
            }
            match key.as_str() {
                "id" => {
                    if let Value::String(id) = value {
                        uid = id.clone();
                    }
                }
                "type" => {
                    // Only the qualified type text is comparable. It may embed
                    // a sandbox path with line/col numbers, for example
                    // '(lambda at /home/abuild/rpmbuild/BUILD/.../X.cpp:295:3)'.
                    let mut qual_type = value
                        .get("qualType")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    if qual_type.contains(BUILD_SANDBOX_PATH) {
                        qual_type = "";
                    }
                    params.insert(key.clone(), ParamValue::Str(qual_type.to_string()));
                }
                "referencedDecl" => {
                    if let Value::Object(decl) = value {
                        params.insert(
                            key.clone(),
                            ParamValue::Node(Box::new(AstNode::from_json(file_pathname, decl))),
                        );
                    }
                }
                "referencedMemberDecl" => {
                    if let Value::String(target_uid) = value {
                        params_ex.insert(key.clone(), target_uid.clone());
                    }
                }
                "inner" => {
                    if let Value::Array(inner) = value {
                        children = Self::parse_children(file_pathname, inner);
                    }
                }
                _ => {
                    if let Some(param) = ParamValue::from_scalar(value) {
                        params.insert(key.clone(), param);
                    }
                }
            }
        }

        Self::blank_unstable_value(&mut params);

        Self {
            uid,
            params,
            params_ex,
            children,
            file_pathname: Arc::clone(file_pathname),
        }
    }

    /// Literal values that differ between otherwise identical builds:
    /// rvalue integer/string literals, and lvalue string literals embedding
    /// the build-sandbox path.
    fn blank_unstable_value(params: &mut BTreeMap<String, ParamValue>) {
        let Some(value) = params.get("value").and_then(ParamValue::as_str) else {
            return;
        };
        if value.is_empty() {
            return;
        }
        let kind = params.get("kind").and_then(ParamValue::as_str).unwrap_or_default();
        let value_category = params
            .get("valueCategory")
            .and_then(ParamValue::as_str)
            .unwrap_or_default();

        let blank = match kind {
            "IntegerLiteral" => value_category == "rvalue",
            "StringLiteral" => {
                value_category == "rvalue"
                    || (value_category == "lvalue" && value.contains(BUILD_SANDBOX_PATH))
            }
            _ => false,
        };
        if blank {
            params.insert("value".to_string(), ParamValue::Str(String::new()));
        }
    }

    fn parse_children(file_pathname: &Arc<Path>, nodes: &[Value]) -> Vec<AstNode> {
        nodes
            .iter()
            .filter_map(Value::as_object)
            .filter(|node| {
                let kind = node.get("kind").and_then(Value::as_str).unwrap_or_default();
                !SKIPPED_KINDS.contains(&kind)
            })
            .map(|node| AstNode::from_json(file_pathname, node))
            .collect()
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn kind(&self) -> &str {
        self.str_param("kind")
    }

    pub fn display_name(&self) -> &str {
        self.str_param("name")
    }

    pub fn mangled_name(&self) -> &str {
        self.str_param("mangledName")
    }

    pub fn file_pathname(&self) -> &Path {
        &self.file_pathname
    }

    pub fn children(&self) -> &[AstNode] {
        &self.children
    }

    pub fn is_method(&self) -> bool {
        METHOD_KINDS.contains(&self.kind())
    }

    fn str_param(&self, key: &str) -> &str {
        self.params.get(key).and_then(ParamValue::as_str).unwrap_or_default()
    }

    /// Pre-order search for function-like declarations.
    ///
    /// Method-kind nodes are leaves for this search: function bodies are not
    /// scanned for nested declarations, which cannot occur. Name filters are
    /// exact string matches.
    pub fn find_methods(
        &self,
        display_name: Option<&str>,
        mangled_name: Option<&str>,
    ) -> Vec<&AstNode> {
        let mut found = Vec::new();
        self.collect_methods(display_name, mangled_name, &mut found);
        found
    }

    fn collect_methods<'a>(
        &'a self,
        display_name: Option<&str>,
        mangled_name: Option<&str>,
        found: &mut Vec<&'a AstNode>,
    ) {
        if self.is_method() {
            let matches = display_name.map_or(true, |name| name == self.display_name())
                && mangled_name.map_or(true, |name| name == self.mangled_name());
            if matches {
                found.push(self);
            }
        } else {
            for child in &self.children {
                child.collect_methods(display_name, mangled_name, found);
            }
        }
    }

    /// Uids of every method this subtree references.
    ///
    /// Collects the uid of a `referencedDecl` whose kind is function-like,
    /// and any raw `referencedMemberDecl` uid unconditionally (its target
    /// kind is not recorded in the dump). The nested `referencedDecl` subtree
    /// itself is not traversed.
    pub fn find_referenced_methods(&self) -> FxHashSet<String> {
        let mut referenced = FxHashSet::default();
        self.collect_referenced_methods(&mut referenced);
        referenced
    }

    fn collect_referenced_methods(&self, referenced: &mut FxHashSet<String>) {
        if let Some(ParamValue::Node(decl)) = self.params.get("referencedDecl") {
            if decl.is_method() {
                referenced.insert(decl.uid.clone());
            }
        }
        if let Some(target_uid) = self.params_ex.get("referencedMemberDecl") {
            referenced.insert(target_uid.clone());
        }
        for child in &self.children {
            child.collect_referenced_methods(referenced);
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        write!(f, "{prefix} AstNode(uid: {}, ", self.uid)?;
        for (key, value) in &self.params {
            write!(f, "{key}: {value}, ")?;
        }
        for (key, value) in &self.params_ex {
            write!(f, "{key}: {value}, ")?;
        }
        writeln!(f, ")")?;
        for child in &self.children {
            child.fmt_tree(f, &format!("{prefix}--"))?;
        }
        Ok(())
    }
}

/// Structural equality: equal param maps, equal child counts, and every
/// child of `self` has a structurally equal child in `other`. Child matching
/// is order-insensitive for-all-exists via linear search; `uid`,
/// `file_pathname` and `params_ex` are ignored.
impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        if self.params != other.params {
            return false;
        }
        if self.children.len() != other.children.len() {
            return false;
        }
        self.children.iter().all(|child| other.children.contains(child))
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, "|")
    }
}

/// One `*.ast.json` file: a source file with all includes expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub file_pathname: Arc<Path>,
    pub root: AstNode,
}

impl TranslationUnit {
    pub fn from_json(file_pathname: PathBuf, doc: &Value) -> Result<Self, AstError> {
        let root = doc
            .as_object()
            .filter(|node| {
                node.get("kind").and_then(Value::as_str) == Some(TRANSLATION_UNIT_KIND)
            })
            .ok_or(AstError::NotATranslationUnit {
                file: file_pathname.clone(),
            })?;
        let file_pathname: Arc<Path> = Arc::from(file_pathname);
        Ok(Self {
            root: AstNode::from_json(&file_pathname, root),
            file_pathname,
        })
    }

    pub fn find_methods(
        &self,
        display_name: Option<&str>,
        mangled_name: Option<&str>,
    ) -> Vec<&AstNode> {
        self.root.find_methods(display_name, mangled_name)
    }
}

impl fmt::Display for TranslationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.file_pathname.display())?;
        write!(f, "{}", self.root)
    }
}

/// All translation units loaded from one project directory tree.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub project_dir: PathBuf,
    pub units: Vec<TranslationUnit>,
}

impl Snapshot {
    /// Methods across all units. Unit order is unspecified; callers must be
    /// order-insensitive.
    pub fn find_methods(
        &self,
        display_name: Option<&str>,
        mangled_name: Option<&str>,
    ) -> Vec<&AstNode> {
        self.units
            .iter()
            .flat_map(|unit| unit.find_methods(display_name, mangled_name))
            .collect()
    }
}
