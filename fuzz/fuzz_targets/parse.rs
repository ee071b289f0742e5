#![no_main]

use libfuzzer_sys::fuzz_target;
use tagsoup::{Dom, ParseError, ParserConfig, parse, parse_document, parse_with_config, render};

fuzz_target!(|data: &[u8]| {
    let mut dom = Dom::new();
    let root = dom.root();
    let result = parse(&mut dom, root, data);
    // Partial trees left by a failed parse must still be well linked.
    if let Err(err) = dom.check_invariants() {
        panic!("broken tree: {err}");
    }
    if result.is_err() {
        return;
    }

    let mut limited = Dom::new();
    let limited_root = limited.root();
    let config = ParserConfig {
        max_depth: Some(8),
    };
    match parse_with_config(&mut limited, limited_root, data, &config) {
        Ok(stats) => assert!(stats.max_depth <= 8),
        Err(ParseError::TooDeep { limit }) => assert_eq!(limit, 8),
        Err(err) => panic!("depth limit changed the outcome: {err}"),
    }

    let once = render(&dom, root);
    let reparsed = match parse_document(once.as_bytes()) {
        Ok(reparsed) => reparsed,
        Err(err) => panic!("rendered output does not parse: {err}\n{once:?}"),
    };
    if let Err(err) = reparsed.check_invariants() {
        panic!("broken tree on reparse: {err}");
    }
});
