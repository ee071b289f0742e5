use std::path::PathBuf;
use tagsoup::{parse_document, render};
use tagsoup_test_support::{GoldenCase, case_filter, diff_lines, load_golden, tree_snapshot};

fn manifest_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/golden.toml")
}

fn check_case(case: &GoldenCase) -> Result<(), String> {
    let dom = match (parse_document(case.input.as_bytes()), &case.error) {
        (Ok(dom), None) => dom,
        (Err(err), Some(expected)) => {
            return if &err.to_string() == expected {
                Ok(())
            } else {
                Err(format!("expected error {expected:?}, got {:?}", err.to_string()))
            };
        }
        (Ok(dom), Some(expected)) => {
            return Err(format!(
                "expected error {expected:?}, parse succeeded with {:?}",
                render(&dom, dom.root())
            ));
        }
        (Err(err), None) => return Err(format!("unexpected error: {err}")),
    };

    if let Some(expected) = &case.render {
        let actual = render(&dom, dom.root());
        if &actual != expected {
            return Err(format!("render mismatch\nexpected: {expected:?}\n  actual: {actual:?}"));
        }
    }
    if let Some(expected) = &case.tree {
        let actual = tree_snapshot(&dom, dom.root());
        if &actual != expected {
            return Err(format!("tree mismatch\n{}", diff_lines(expected, &actual)));
        }
    }
    Ok(())
}

#[test]
fn golden_cases() {
    let cases = load_golden(&manifest_path());
    let filter = case_filter();
    let mut ran = 0usize;
    let mut failures = Vec::new();
    for case in &cases {
        if filter.as_deref().is_some_and(|f| !case.id.contains(f)) {
            continue;
        }
        ran += 1;
        if let Err(message) = check_case(case) {
            failures.push(format!("case '{}' ({:?}): {message}", case.id, case.input));
        }
    }
    assert!(ran > 0, "no golden cases matched filter");
    assert!(
        failures.is_empty(),
        "{} of {ran} golden cases failed:\n\n{}",
        failures.len(),
        failures.join("\n\n")
    );
}

/// Every successful case must survive render then reparse unchanged.
#[test]
fn golden_renders_are_fixed_points() {
    for case in load_golden(&manifest_path()) {
        let Some(expected) = case.render else {
            continue;
        };
        let reparsed = parse_document(expected.as_bytes())
            .unwrap_or_else(|err| panic!("case '{}': rendered output does not parse: {err}", case.id));
        assert_eq!(
            render(&reparsed, reparsed.root()),
            expected,
            "case '{}': render is not stable",
            case.id
        );
    }
}
