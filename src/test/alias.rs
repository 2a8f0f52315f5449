use crate::ir::AliasGraph;

#[test]
fn unknown_names_are_their_own_root() {
    let mut graph = AliasGraph::new();
    assert!(!graph.contains("x"));
    assert_eq!(graph.find("x"), "x");
    // a find must not invent an entry
    assert!(!graph.contains("x"));
}

#[test]
fn chains_resolve_to_the_root() {
    let mut graph = AliasGraph::new();
    graph.make_root("t");
    graph.record("a", "t");
    graph.record("b", "a");
    graph.record("c", "b");
    assert_eq!(graph.find("c"), "t");
    assert_eq!(graph.find("b"), "t");
    assert_eq!(graph.find("a"), "t");
    assert_eq!(graph.find("t"), "t");
}

#[test]
fn find_compresses_paths() {
    let mut graph = AliasGraph::new();
    graph.make_root("t");
    graph.record("a", "t");
    graph.record("b", "a");
    graph.record("c", "b");
    graph.find("c");
    let classes = graph.classes();
    // after one lookup every recorded name points straight at the root
    for root in classes.values() {
        assert_eq!(root, "t");
    }
}

#[test]
fn same_class_follows_move_equivalence() {
    let mut graph = AliasGraph::new();
    graph.make_root("t");
    graph.make_root("u");
    graph.record("a", "t");
    graph.record("b", "u");
    assert!(graph.same_class("a", "t"));
    assert!(graph.same_class("b", "u"));
    assert!(!graph.same_class("a", "b"));
    assert!(!graph.same_class("t", "u"));
}

#[test]
fn record_resolves_target_through_its_chain() {
    let mut graph = AliasGraph::new();
    graph.make_root("t");
    graph.record("a", "t");
    graph.record("b", "a");
    let classes = graph.classes();
    assert_eq!(classes.get("b"), Some(&"t".to_string()));
}
