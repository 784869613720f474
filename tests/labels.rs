mod common;

use std::collections::HashSet;

use hack_vmt::{translate, ErrorKind, SourceModule, TranslatorConfig};
use pretty_assertions::assert_eq;

fn declared_labels(lines: &[String]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(|l| l.strip_prefix('(').and_then(|l| l.strip_suffix(')')))
        .collect()
}

#[test]
fn no_label_is_declared_twice_in_the_output() {
    let body = "\
label LOOP
push constant 1
push constant 2
eq
if-goto LOOP
call Util.f 0
call Util.f 0
return
";
    let main = format!("function Main.a 0\n{body}function Main.b 0\n{body}");
    let other = format!("function Other.a 0\n{body}");
    let util = "function Util.f 0\npush constant 0\nreturn\n";
    let sys = "function Sys.init 0\ncall Main.a 0\nreturn\n";
    let modules = [
        SourceModule::new("Main", &main),
        SourceModule::new("Other", &other),
        SourceModule::new("Util", util),
        SourceModule::new("Sys", sys),
    ];
    let lines = translate(&modules, &TranslatorConfig::default()).unwrap();
    let labels = declared_labels(&lines);
    let unique: HashSet<&str> = labels.iter().copied().collect();
    assert_eq!(unique.len(), labels.len());

    for expected in ["Main.Main.a$LOOP", "Main.Main.b$LOOP", "Other.Other.a$LOOP"] {
        assert!(unique.contains(expected), "{expected}");
    }
    // The bootstrap call takes id 0; Main.a's two calls follow.
    for expected in ["Bootstrap$ret.0", "Main.a$ret.1", "Main.a$ret.2"] {
        assert!(unique.contains(expected), "{expected}");
    }
    assert!(unique.contains("__HALT__"));
    // Same generated text for the same label, whether declared or jumped to.
    assert!(lines.iter().any(|l| l == "  @Main.Main.b$LOOP"));
}

#[test]
fn return_labels_count_across_the_whole_program() {
    let modules = [
        SourceModule::new("A", "function A.f 0\ncall A.f 0\nreturn\n"),
        SourceModule::new("B", "function B.g 0\ncall A.f 0\nreturn\n"),
    ];
    let lines = translate(&modules, &common::no_bootstrap()).unwrap();
    let labels = declared_labels(&lines);
    assert_eq!(labels, vec!["A.f", "A.f$ret.0", "B.g", "B.g$ret.1", "__HALT__"]);
}

#[test]
fn strictness_is_configurable() {
    let m = [SourceModule::new("Main", "function Main.f 0\nif-goto MISSING\nreturn\n")];
    let err = translate(&m, &TranslatorConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndeclaredLabel);
    assert_eq!(err.to_string(), "Main.vm:2: label `MISSING` is never declared in `Main.Main.f`");

    let lenient = TranslatorConfig { strict_labels: false, ..TranslatorConfig::default() };
    assert!(translate(&m, &lenient).is_ok());
}
