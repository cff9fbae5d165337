//! Whole-pipeline tests: sources in, load order out.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tangle_resolver::{ResolveError, Resolver, ResolverOptions, SourceInput};

fn resolver_for(sources: &[(&str, &str)]) -> Resolver {
    let map: HashMap<String, String> = sources
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut options = ResolverOptions::default();
    options.read_source = Some(Box::new(move |key| map.get(key).cloned()));
    Resolver::new(options)
}

const ANIMAL: &str = "\
var Animal = function (pName) { this.name = pName; };
Animal.prototype.getName = function () { return this.name; };
";

const DOG: &str = "\
var Dog = (function (pSuper) {
    function Dog() { pSuper.call(this, 'dog'); }
    Dog.prototype = Object.create(pSuper.prototype);
    Dog.prototype.constructor = Dog;
    Dog.prototype.bark = function () { return 'woof'; };
    return Dog;
})(Animal);
";

const FAST_DOG: &str = "\
var FastDog = (function (pSuper) {
    function FastDog() { pSuper.call(this); }
    FastDog.prototype = Object.create(pSuper.prototype);
    FastDog.prototype.run = function () { return 'zoom'; };
    return FastDog;
})(Dog);
";

#[test]
fn prototype_chain_orders_base_first() {
    let mut r = resolver_for(&[("a.js", DOG), ("b.js", ANIMAL), ("c.js", FAST_DOG)]);
    r.add_all(["a.js", "b.js", "c.js"]).unwrap();
    assert_eq!(
        r.resolve(),
        vec!["b.js".to_string(), "a.js".to_string(), "c.js".to_string()]
    );
}

#[test]
fn order_of_adds_does_not_change_the_result() {
    for adds in [
        ["a.js", "b.js", "c.js"],
        ["c.js", "b.js", "a.js"],
        ["b.js", "c.js", "a.js"],
    ] {
        let mut r = resolver_for(&[("a.js", DOG), ("b.js", ANIMAL), ("c.js", FAST_DOG)]);
        r.add_all(adds).unwrap();
        assert_eq!(
            r.resolve(),
            vec!["b.js".to_string(), "a.js".to_string(), "c.js".to_string()],
            "adds = {adds:?}"
        );
    }
}

#[test]
fn namespace_files_stay_order_independent() {
    let mut r = resolver_for(&[
        ("ns.js", "var eg = eg || {};\n"),
        (
            "widget.js",
            "var eg = eg || {};\neg.Widget = function () {};\n",
        ),
        ("app.js", "var w = new eg.Widget();\n"),
    ]);
    r.add_all(["app.js", "widget.js", "ns.js"]).unwrap();
    let order = r.resolve();
    let pos = |k: &str| order.iter().position(|x| x == k).unwrap();
    assert!(pos("widget.js") < pos("app.js"));
    assert_eq!(order.len(), 3);
}

#[test]
fn deferred_calls_settle_across_files() {
    let mut r = resolver_for(&[
        ("boot.js", "Config.setup();\n"),
        (
            "impl.js",
            "window.Config = { setup: function () { window.Ready = true; } };\n",
        ),
    ]);
    r.add_all(["boot.js", "impl.js"]).unwrap();

    let boot = r.facts("boot.js").unwrap();
    assert!(boot.requires.contains(&"Config".to_string()));
    assert!(boot.requires.contains(&"Config.setup".to_string()));
    // The side effect of the replayed call belongs to the calling file.
    assert!(boot.exports.contains(&"Ready".to_string()));

    assert_eq!(
        r.resolve(),
        vec!["impl.js".to_string(), "boot.js".to_string()]
    );
}

#[test]
fn re_adding_a_file_is_idempotent() {
    let mut r = resolver_for(&[("a.js", DOG), ("b.js", ANIMAL), ("c.js", FAST_DOG)]);
    r.add_all(["a.js", "b.js", "c.js"]).unwrap();
    let first = r.resolve();
    r.add("a.js").unwrap();
    r.add("b.js").unwrap();
    assert_eq!(r.resolve(), first);
}

#[test]
fn missing_source_is_a_key_error() {
    let mut r = resolver_for(&[]);
    let err = r.add("ghost.js").unwrap_err();
    match err {
        ResolveError::Key { key, .. } => assert_eq!(key, "ghost.js"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn parse_errors_are_key_errors() {
    let mut r = resolver_for(&[("bad.js", "var = ;")]);
    assert!(matches!(
        r.add("bad.js"),
        Err(ResolveError::Key { .. })
    ));
}

#[test]
fn add_source_accepts_prebuilt_text() {
    let mut r = Resolver::new(ResolverOptions::default());
    r.add_source("inline.js", SourceInput::Text("var Z = 1;".to_string()))
        .unwrap();
    assert!(
        r.facts("inline.js")
            .unwrap()
            .exports
            .contains(&"Z".to_string())
    );
}

#[test]
fn resolve_only_selects_the_needed_files() {
    let mut r = resolver_for(&[
        ("a.js", "var A = {};\n"),
        ("b.js", "var B = { uses: A };\n"),
        ("c.js", "var C = {};\n"),
    ]);
    r.add_all(["a.js", "b.js", "c.js"]).unwrap();
    let order = r.resolve_only(&["B".to_string()]).unwrap();
    assert_eq!(order, vec!["a.js".to_string(), "b.js".to_string()]);
}

#[test]
fn resolve_only_rejects_unknown_exports() {
    let mut r = resolver_for(&[("a.js", "var A = {};\n")]);
    r.add("a.js").unwrap();
    let err = r.resolve_only(&["Missing".to_string()]).unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnresolvedExport {
            path: "Missing".to_string()
        }
    );
}

#[test]
fn cache_hits_skip_source_loading() {
    let cache: HashMap<String, String> = [(
        "lib.js".to_string(),
        r#"{"requires":[],"exports":["Lib","Lib.go"]}"#.to_string(),
    )]
    .into_iter()
    .collect();
    let source_reads: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let reads = source_reads.clone();

    let sources: HashMap<String, String> =
        [("user.js".to_string(), "Lib.go();\n".to_string())]
            .into_iter()
            .collect();

    let mut options = ResolverOptions::default();
    options.read_cache = Some(Box::new(move |key| cache.get(key).cloned()));
    options.read_source = Some(Box::new(move |key| {
        reads.borrow_mut().push(key.to_string());
        sources.get(key).cloned()
    }));
    let mut r = Resolver::new(options);
    r.add_all(["lib.js", "user.js"]).unwrap();

    assert!(!source_reads.borrow().contains(&"lib.js".to_string()));
    assert_eq!(
        r.resolve(),
        vec!["lib.js".to_string(), "user.js".to_string()]
    );
}

#[test]
fn evaluated_files_write_cache_records() {
    let written: Rc<RefCell<Vec<(String, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = written.clone();
    let mut options = ResolverOptions::default();
    options.read_source = Some(Box::new(|_| Some("var Q = {};".to_string())));
    options.write_cache = Some(Box::new(move |key, raw| {
        sink.borrow_mut().push((key.to_string(), raw.to_string()));
    }));
    let mut r = Resolver::new(options);
    r.add("q.js").unwrap();

    let written = written.borrow();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].0, "q.js");
    assert!(written[0].1.contains("\"exports\""));
    assert!(written[0].1.contains("\"Q\""));
}

const FACTORY_A: &str = "\
var A = { mk: function () { return { mk: function () { return { done: true }; } }; } };
";
const FACTORY_B: &str = "var B = A.mk();\n";
const FACTORY_C: &str = "var C = B.mk();\n";

#[test]
fn factory_chain_partial_resolve_spans_providers() {
    // Worst case: the deepest consumer lands first, so every call defers.
    let mut r = resolver_for(&[
        ("a.js", FACTORY_A),
        ("b.js", FACTORY_B),
        ("c.js", FACTORY_C),
    ]);
    r.add_all(["c.js", "b.js", "a.js"]).unwrap();
    let order = r.resolve_only(&["C".to_string()]).unwrap();
    assert_eq!(order, vec!["a.js".to_string(), "b.js".to_string(), "c.js".to_string()]);
}

#[test]
fn export_sets_do_not_depend_on_add_order() {
    let mut forward = resolver_for(&[
        ("a.js", FACTORY_A),
        ("b.js", FACTORY_B),
        ("c.js", FACTORY_C),
    ]);
    forward.add_all(["a.js", "b.js", "c.js"]).unwrap();

    let mut backward = resolver_for(&[
        ("a.js", FACTORY_A),
        ("b.js", FACTORY_B),
        ("c.js", FACTORY_C),
    ]);
    backward.add_all(["c.js", "b.js", "a.js"]).unwrap();

    for key in ["a.js", "b.js", "c.js"] {
        let mut f = forward.facts(key).unwrap().clone();
        let mut b = backward.facts(key).unwrap().clone();
        f.exports.sort();
        b.exports.sort();
        f.requires.sort();
        b.requires.sort();
        assert_eq!(f, b, "{key} facts diverge across add orders");
    }
    assert!(forward.facts("b.js").unwrap().exports.contains(&"B".to_string()));
    assert_eq!(forward.resolve(), backward.resolve());
}

#[test]
fn nested_namespace_files_order_by_depth() {
    let mut r = resolver_for(&[
        ("app.js", "var app = {};\n"),
        ("model.js", "app.model = {};\n"),
        ("io.js", "app.model.io = function () {};\n"),
    ]);
    r.add_all(["io.js", "app.js", "model.js"]).unwrap();

    let expected = vec![
        "app.js".to_string(),
        "model.js".to_string(),
        "io.js".to_string(),
    ];
    assert_eq!(r.resolve(), expected);
    assert_eq!(r.resolve_only(&["app.model.io".to_string()]).unwrap(), expected);
}
