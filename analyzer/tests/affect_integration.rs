//! End-to-end scenarios over on-disk snapshot fixtures

use fuzzdelta::find_affected_fuzzers;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    report: PathBuf,
    snapshot1: PathBuf,
    snapshot2: PathBuf,
}

impl Fixture {
    fn new(report: Value) -> Self {
        let temp = TempDir::new().unwrap();
        let report_path = temp.path().join("fuzzGen_Report.json");
        fs::write(&report_path, serde_json::to_string_pretty(&report).unwrap()).unwrap();
        let snapshot1 = temp.path().join("1");
        let snapshot2 = temp.path().join("2");
        fs::create_dir_all(&snapshot1).unwrap();
        fs::create_dir_all(&snapshot2).unwrap();
        Self {
            _temp: temp,
            report: report_path,
            snapshot1,
            snapshot2,
        }
    }

    fn write_unit(&self, snapshot: u8, name: &str, functions: Value) {
        let dir = match snapshot {
            1 => &self.snapshot1,
            _ => &self.snapshot2,
        };
        write_tu(dir, name, functions);
    }

    fn run(&self) -> BTreeSet<String> {
        find_affected_fuzzers(&self.report, &self.snapshot1, &self.snapshot2).unwrap()
    }
}

fn write_tu(dir: &Path, name: &str, functions: Value) {
    let doc = json!({"id": "0x0", "kind": "TranslationUnitDecl", "inner": functions});
    fs::write(dir.join(name), serde_json::to_string_pretty(&doc).unwrap()).unwrap();
}

fn simple_report(api: &str, fuzzer: &str) -> Value {
    json!({
        "API": [{
            "Name": api,
            "Status": "GENERATED",
            "FuzzerBuildStatus": "SUCCESS",
            "StatusList": [{"Status": "GENERATED", "StatusFromUT": fuzzer}],
        }],
    })
}

fn function(uid: &str, name: &str, body: Value) -> Value {
    json!({
        "id": uid,
        "kind": "FunctionDecl",
        "name": name,
        "mangledName": name,
        "inner": [{"id": format!("{uid}0"), "kind": "CompoundStmt", "inner": body}],
    })
}

fn call(target_uid: &str, target_name: &str) -> Value {
    json!({
        "id": format!("{target_uid}f"),
        "kind": "DeclRefExpr",
        "referencedDecl": {
            "id": target_uid,
            "kind": "FunctionDecl",
            "name": target_name,
            "mangledName": target_name,
        },
    })
}

fn labels(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|label| label.to_string()).collect()
}

#[test]
fn test_empty_inputs_produce_empty_result() {
    let fixture = Fixture::new(json!({"API": []}));
    assert_eq!(fixture.run(), BTreeSet::new());
}

#[test]
fn test_identical_snapshots_produce_empty_result() {
    let fixture = Fixture::new(simple_report("foo", "foo_ut"));
    for snapshot in [1, 2] {
        fixture.write_unit(
            snapshot,
            "main.ast.json",
            json!([function("0x1", "foo", json!([{"id": "0x2", "kind": "ReturnStmt"}]))]),
        );
    }
    assert_eq!(fixture.run(), BTreeSet::new());
}

#[test]
fn test_direct_hit() {
    let fixture = Fixture::new(simple_report("foo", "foo_ut"));
    fixture.write_unit(
        1,
        "main.ast.json",
        json!([function("0x1", "foo", json!([{"id": "0x2", "kind": "ReturnStmt"}]))]),
    );
    fixture.write_unit(
        2,
        "main.ast.json",
        json!([function("0x1", "foo", json!([{"id": "0x2", "kind": "NullStmt"}]))]),
    );
    assert_eq!(fixture.run(), labels(&["foo_ut_ftgfuzz"]));
}

#[test]
fn test_indirect_hit_through_call_graph() {
    let fixture = Fixture::new(simple_report("foo", "foo_ut"));
    // foo is byte-identical across snapshots; only bar's body changes.
    for (snapshot, bar_stmt) in [(1u8, "ReturnStmt"), (2u8, "NullStmt")] {
        fixture.write_unit(
            snapshot,
            "main.ast.json",
            json!([
                function("0x1", "foo", json!([call("0x2", "bar")])),
                function("0x2", "bar", json!([{"id": "0x3", "kind": bar_stmt}])),
            ]),
        );
    }
    assert_eq!(fixture.run(), labels(&["foo_ut_ftgfuzz"]));
}

#[test]
fn test_mutual_recursion_terminates() {
    let fixture = Fixture::new(simple_report("foo", "foo_ut"));
    for snapshot in [1, 2] {
        fixture.write_unit(
            snapshot,
            "main.ast.json",
            json!([
                function("0x1", "foo", json!([call("0x2", "bar")])),
                function("0x2", "bar", json!([call("0x1", "foo")])),
            ]),
        );
    }
    assert_eq!(fixture.run(), BTreeSet::new());
}

#[test]
fn test_comment_only_change_is_not_a_modification() {
    let fixture = Fixture::new(simple_report("foo", "foo_ut"));
    fixture.write_unit(
        1,
        "main.ast.json",
        json!([function("0x1", "foo", json!([
            {"id": "0x2", "kind": "FullComment", "inner": [
                {"id": "0x3", "kind": "TextComment", "value": "old docs"},
            ]},
            {"id": "0x4", "kind": "ReturnStmt"},
        ]))]),
    );
    fixture.write_unit(
        2,
        "main.ast.json",
        json!([function("0x1", "foo", json!([
            {"id": "0x2", "kind": "FullComment", "inner": [
                {"id": "0x3", "kind": "TextComment", "value": "rewritten docs"},
            ]},
            {"id": "0x4", "kind": "ReturnStmt"},
        ]))]),
    );
    assert_eq!(fixture.run(), BTreeSet::new());
}

#[test]
fn test_build_sandbox_path_change_is_not_a_modification() {
    let fixture = Fixture::new(simple_report("foo", "foo_ut"));
    for (snapshot, build_root) in [
        (1u8, "/home/abuild/rpmbuild/BUILD/pkg-1.0.1/data"),
        (2u8, "/home/abuild/rpmbuild/BUILD/pkg-1.0.2/data"),
    ] {
        fixture.write_unit(
            snapshot,
            "main.ast.json",
            json!([function("0x1", "foo", json!([{
                "id": "0x2",
                "kind": "StringLiteral",
                "valueCategory": "lvalue",
                "value": format!("\"{build_root}/config.xml\""),
            }]))]),
        );
    }
    assert_eq!(fixture.run(), BTreeSet::new());
}

#[test]
fn test_declaration_in_second_unit_does_not_mask_definition_change() {
    // The definition lives in impl.ast.json; a header-style declaration of
    // the same function sits in another unit with a different uid.
    let fixture = Fixture::new(simple_report("foo", "foo_ut"));
    for (snapshot, stmt) in [(1u8, "ReturnStmt"), (2u8, "NullStmt")] {
        fixture.write_unit(
            snapshot,
            "header.ast.json",
            json!([{"id": "0x10", "kind": "FunctionDecl", "name": "foo", "mangledName": "foo"}]),
        );
        fixture.write_unit(
            snapshot,
            "impl.ast.json",
            json!([function("0x1", "foo", json!([{"id": "0x2", "kind": stmt}]))]),
        );
    }
    assert_eq!(fixture.run(), labels(&["foo_ut_ftgfuzz"]));
}

#[test]
fn test_missing_snapshot_directory_is_fatal() {
    let fixture = Fixture::new(simple_report("foo", "foo_ut"));
    let missing = fixture.snapshot1.join("missing");
    assert!(find_affected_fuzzers(&fixture.report, &missing, &fixture.snapshot2).is_err());
}
