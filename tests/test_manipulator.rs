use reroot::graph::InputRooting;
use reroot::manipulator::{ManipulatorConfig, TreeManipulator};
use reroot::model::{Annotation, AnnotationValue, RootedSink, RootedSource, RootedTreeBuilder};
use reroot::newick::{parse_str, to_newick};
use reroot::RerootError;

const BALANCED: &str = "((A:1,B:2):3,(C:4,D:5):6);";

fn manipulator(newick: &str) -> TreeManipulator {
    TreeManipulator::new(&parse_str(newick).unwrap()).unwrap()
}

// --- CONSTRUCTION ---
#[test]
fn test_too_few_leaves() {
    let tree = parse_str("(A:1,B:1);").unwrap();
    assert!(matches!(
        TreeManipulator::new(&tree),
        Err(RerootError::TooFewLeaves { found: 2 })
    ));

    let tree = parse_str("A;").unwrap();
    assert!(matches!(
        TreeManipulator::new(&tree),
        Err(RerootError::TooFewLeaves { found: 1 })
    ));
}

#[test]
fn test_counts() {
    let m = manipulator(BALANCED);
    assert_eq!(m.num_leaves(), 4);
    assert_eq!(m.num_connections(), 5);
    assert_eq!(m.total_length(), 21.0);

    let mut labels = m.leaf_labels();
    labels.sort();
    assert_eq!(labels, vec!["A", "B", "C", "D"]);
}

#[test]
fn test_bifurcating_input_rooting() {
    let m = manipulator(BALANCED);
    assert!(!m.input_was_unrooted());
    assert_eq!(
        m.input_rooting_position(),
        InputRooting::Split {
            connection: m.graph().base(),
            end0_length: 3.0
        }
    );
    assert_eq!(to_newick(&m.input_rooting()), BALANCED);
}

#[test]
fn test_multifurcating_input_rooting() {
    let newick = "(A:1,(B:1,C:1):2,D:3);";
    let m = manipulator(newick);
    assert!(m.input_was_unrooted());
    assert!(matches!(m.input_rooting_position(), InputRooting::Node(_)));
    assert_eq!(to_newick(&m.input_rooting()), newick);
}

#[test]
fn test_unary_root_is_skipped() {
    let m = manipulator("(((A:1,B:1):1,C:1):2);");
    assert!(!m.input_was_unrooted());
    assert_eq!(m.num_connections(), 3);
    assert_eq!(to_newick(&m.input_rooting()), "((A:1,B:1):1,C:1);");
}

#[test]
fn test_from_sources() {
    let tree = parse_str(BALANCED).unwrap();
    let config = ManipulatorConfig::default();

    let rooted = TreeManipulator::from_rooted_source(&tree, config).unwrap();
    assert!(!rooted.input_was_unrooted());
    assert_eq!(to_newick(&rooted.input_rooting()), BALANCED);

    let unrooted = TreeManipulator::from_unrooted_source(&rooted, config).unwrap();
    assert!(unrooted.input_was_unrooted());
    assert_eq!(unrooted.num_leaves(), 4);
    assert_eq!(unrooted.num_connections(), 5);
    assert_eq!(unrooted.total_length(), rooted.total_length());
}

struct Silent;

impl RootedSource for Silent {
    fn emit_rooted<S: RootedSink>(&self, _sink: &mut S) {}
}

#[test]
fn test_empty_source() {
    let result = TreeManipulator::from_rooted_source(&Silent, ManipulatorConfig::default());
    assert!(matches!(result, Err(RerootError::TooFewLeaves { found: 0 })));
}

// --- ROOTINGS ---
#[test]
fn test_rooted_at_splits_evenly() {
    let m = manipulator(BALANCED);
    let base = m.graph().base();
    let rooted = m.rooted_at(base).unwrap();
    assert_eq!(to_newick(&rooted), "((A:1,B:2):4.5,(C:4,D:5):4.5);");
}

#[test]
fn test_rooted_at_split_clamps() {
    let m = manipulator(BALANCED);
    let base = m.graph().base();

    let rooted = m.rooted_at_split(base, 100.0).unwrap();
    assert_eq!(to_newick(&rooted), "((A:1,B:2):9,(C:4,D:5):0);");

    let rooted = m.rooted_at_split(base, -1.0).unwrap();
    assert_eq!(to_newick(&rooted), "((A:1,B:2):0,(C:4,D:5):9);");
}

#[test]
fn test_every_rooting_conserves_length() {
    let m = manipulator("((A:1,B:2):3,(C:4,D:5):6,(E:0.5,F:1.5):0.25);");
    for branch in m.branches() {
        let rooted = branch.rooted();
        assert_eq!(rooted.num_leaves(), 6);
        assert!((rooted.total_branch_length() - m.total_length()).abs() < 1e-9);
        assert_eq!(rooted.root().children().len(), 2);
    }
}

#[test]
fn test_unknown_connection() {
    let m = manipulator(BALANCED);
    assert!(matches!(
        m.rooted_at(42),
        Err(RerootError::UnknownConnection {
            index: 42,
            num_connections: 5
        })
    ));
    assert!(m.branch(5).is_err());
    assert!(m.path_diff(5).is_err());
    assert!(m.rooted_at_split(5, 0.0).is_err());
}

#[test]
fn test_render_unrooted_into_builder() {
    let m = manipulator(BALANCED);
    let mut builder = RootedTreeBuilder::new();
    m.render_unrooted_into(&mut builder);
    let tree = builder.finish_tree().unwrap();
    assert_eq!(to_newick(&tree), "((A:1,B:2):4.5,(C:4,D:5):4.5);");
}

#[test]
fn test_render_rooted_into_builder() {
    let m = manipulator(BALANCED);
    let mut builder = RootedTreeBuilder::new();
    m.render_rooted_into(m.graph().base(), 3.0, &mut builder).unwrap();
    let tree = builder.finish_tree().unwrap();
    assert_eq!(to_newick(&tree), BALANCED);
}

// --- BRANCHES ---
#[test]
fn test_label_split() {
    let m = manipulator(BALANCED);
    let split = m.branch(m.graph().base()).unwrap().label_split();
    assert_eq!(split.end0, vec!["A", "B"]);
    assert_eq!(split.end1, vec!["C", "D"]);

    let pendant = m
        .branches()
        .find(|b| b.label_split().smaller_side() == ["D".to_string()])
        .unwrap();
    assert_eq!(pendant.length(), 5.0);
    assert_eq!(pendant.label_split().end0.len() + pendant.label_split().end1.len(), 4);
}

#[test]
fn test_branch_annotation() {
    let mut m = manipulator(BALANCED);
    let base = m.graph().base();
    assert!(m.branch(base).unwrap().annotation().is_none());

    {
        let mut branch = m.branch_mut(base).unwrap();
        branch.set_annotation(Some(Annotation::new().with("support", 97)));
        assert_eq!(branch.as_branch().index(), base);
    }

    let annotation = m.branch(base).unwrap().annotation().cloned().unwrap();
    assert_eq!(annotation.get("support"), Some(&AnnotationValue::Int(97)));

    // Both root children carry the annotation of the split connection
    let rooted = m.rooted_at(base).unwrap();
    for &child in rooted.root().children() {
        assert_eq!(rooted[child].annotation(), Some(&annotation));
    }
}

// --- ENUMERATION ---
#[test]
fn test_all_connections() {
    let m = manipulator(BALANCED);
    let connections = m.all_connections();
    assert_eq!(connections.len(), 5);
    assert_eq!(connections[0], m.graph().base());
    assert_eq!(m.all_rootings().len(), 5);
}

#[test]
fn test_root_enumerator() {
    let m = manipulator(BALANCED);
    let eager: Vec<String> = m.all_rootings().iter().map(to_newick).collect();

    let mut enumerator = m.root_enumerator();
    assert_eq!(enumerator.len(), 5);
    assert!(enumerator.has_next());

    let lazy: Vec<String> = enumerator.by_ref().map(|t| to_newick(&t)).collect();
    assert_eq!(lazy, eager);
    assert!(!enumerator.has_next());
    assert!(enumerator.next().is_none());

    enumerator.reset();
    assert!(enumerator.has_next());
    assert_eq!(enumerator.peek_connection(), Some(m.graph().base()));
    assert_eq!(to_newick(&enumerator.next().unwrap()), eager[0]);
    assert_eq!(enumerator.len(), 4);
}
