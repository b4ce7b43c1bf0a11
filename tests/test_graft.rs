use reroot::graph::{ConstructionPolicy, InputRooting};
use reroot::manipulator::{ManipulatorConfig, TreeManipulator};
use reroot::newick::{parse_str, to_newick};
use reroot::RerootError;

const QUARTET: &str = "((A:1,B:1):1,(C:1,D:1):1);";

fn manipulator(newick: &str) -> TreeManipulator {
    TreeManipulator::new(&parse_str(newick).unwrap()).unwrap()
}

fn with_policy(newick: &str, policy: ConstructionPolicy) -> TreeManipulator {
    let tree = parse_str(newick).unwrap();
    TreeManipulator::with_config(&tree, ManipulatorConfig::new(policy)).unwrap()
}

/// Sorted degrees of all internal graph nodes.
fn internal_degrees(m: &TreeManipulator) -> Vec<usize> {
    let graph = m.graph();
    let mut degrees: Vec<usize> = (0..graph.num_nodes())
        .map(|i| graph.node(i))
        .filter(|node| !node.is_leaf())
        .map(|node| node.degree())
        .collect();
    degrees.sort();
    degrees
}

fn pendant_of(m: &TreeManipulator, label: &str) -> usize {
    m.branches()
        .find(|b| b.label_split().smaller_side() == [label.to_string()])
        .map(|b| b.index())
        .unwrap()
}

fn distance(m: &TreeManipulator, a: &str, b: &str) -> f64 {
    let key = if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    };
    m.input_rooting().patristic_distances()[&key]
}

#[test]
fn test_graft_cherry_onto_pendant_branch() {
    let m = manipulator(QUARTET);
    let subtree = parse_str("(X:1,Y:1):0.5;").unwrap();
    let grafted = m.attach_subtree(pendant_of(&m, "A"), &subtree).unwrap();

    assert_eq!(grafted.num_leaves(), 6);
    assert_eq!(grafted.num_connections(), 9);
    assert!((grafted.total_length() - 8.5).abs() < 1e-12);
    assert_eq!(grafted.graph().num_cached_cells(), 0);

    assert!((distance(&grafted, "A", "X") - 2.0).abs() < 1e-12);
    assert!((distance(&grafted, "A", "B") - 2.0).abs() < 1e-12);
    assert!((distance(&grafted, "B", "Y") - 3.0).abs() < 1e-12);
    assert!((distance(&grafted, "X", "Y") - 2.0).abs() < 1e-12);
}

#[test]
fn test_graft_leaves_original_untouched() {
    let m = manipulator(QUARTET);
    let before = to_newick(&m.midpoint_rooted());
    let cached = m.graph().num_cached_cells();
    assert!(cached > 0);

    let subtree = parse_str("(X:1,Y:1):0.5;").unwrap();
    let grafted = m.attach_subtree(m.graph().base(), &subtree).unwrap();

    assert_eq!(m.num_leaves(), 4);
    assert_eq!(m.num_connections(), 5);
    assert_eq!(m.graph().num_cached_cells(), cached);
    assert_eq!(to_newick(&m.midpoint_rooted()), before);
    assert_eq!(grafted.graph().num_cached_cells(), 0);
}

#[test]
fn test_graft_single_leaf() {
    let m = manipulator(QUARTET);
    let leaf = parse_str("E:0.25;").unwrap();
    let grafted = m.branch(pendant_of(&m, "C")).unwrap().attach(&leaf);

    assert_eq!(grafted.num_leaves(), 5);
    assert_eq!(grafted.num_connections(), 7);
    assert!((distance(&grafted, "C", "E") - 0.75).abs() < 1e-12);
    assert!((distance(&grafted, "D", "E") - 1.75).abs() < 1e-12);
}

#[test]
fn test_graft_onto_base_moves_input_root() {
    // Root sits 1.5 from end 0 of a connection of length 2
    let m = manipulator("((A:1,B:1):1.5,(C:1,D:1):0.5);");
    let base = m.graph().base();
    let leaf = parse_str("E:1;").unwrap();
    let grafted = m.attach_subtree(base, &leaf).unwrap();

    match grafted.input_rooting_position() {
        InputRooting::Split {
            connection,
            end0_length,
        } => {
            assert_ne!(connection, base);
            assert!((end0_length - 0.5).abs() < 1e-12);
        }
        other => panic!("unexpected input rooting {other:?}"),
    }

    // The original root position is reproduced
    let rooted = grafted.input_rooting();
    assert_eq!(rooted.num_leaves(), 5);
    let mut depths: Vec<f64> = rooted
        .root()
        .children()
        .iter()
        .map(|&c| rooted[c].branch_length().unwrap())
        .collect();
    depths.sort_by(f64::total_cmp);
    assert_eq!(depths, vec![0.5, 0.5]);
}

#[test]
fn test_graft_unknown_connection() {
    let m = manipulator(QUARTET);
    let leaf = parse_str("E:1;").unwrap();
    assert!(matches!(
        m.attach_subtree(99, &leaf),
        Err(RerootError::UnknownConnection { index: 99, .. })
    ));
}

#[test]
fn test_graft_duplicate_label() {
    let m = manipulator(QUARTET);
    let leaf = parse_str("A:1;").unwrap();
    let grafted = m.attach_subtree(pendant_of(&m, "D"), &leaf).unwrap();

    assert_eq!(grafted.num_leaves(), 5);
    let labels = grafted.leaf_labels();
    assert_eq!(labels.iter().filter(|l| l.as_str() == "A").count(), 2);
    assert_eq!(grafted.all_rootings().len(), grafted.num_connections());
}

// --- TESTS GRAFTING UNDER POLICIES ---
#[test]
fn test_graft_expand_resolves_subtree_polytomy() {
    let m = with_policy(QUARTET, ConstructionPolicy::Expand);
    let subtree = parse_str("(X:1,Y:1,Z:1):0.5;").unwrap();
    let grafted = m.attach_subtree(pendant_of(&m, "B"), &subtree).unwrap();

    assert_eq!(grafted.policy(), ConstructionPolicy::Expand);
    assert_eq!(grafted.num_leaves(), 7);
    assert_eq!(grafted.num_connections(), 11);
    assert_eq!(internal_degrees(&grafted), vec![3, 3, 3, 3, 3]);
    assert!((distance(&grafted, "B", "Z") - 2.0).abs() < 1e-12);
    assert!((distance(&grafted, "X", "Y") - 2.0).abs() < 1e-12);
}

#[test]
fn test_graft_reduce_keeps_zero_attachment_branch() {
    let m = with_policy(QUARTET, ConstructionPolicy::Reduce);
    let subtree = parse_str("(X:1,Y:1);").unwrap();
    let grafted = m.attach_subtree(pendant_of(&m, "A"), &subtree).unwrap();

    // The subtree hangs on its own zero-length branch
    assert_eq!(grafted.num_leaves(), 6);
    assert_eq!(grafted.num_connections(), 9);
    assert_eq!(internal_degrees(&grafted), vec![3, 3, 3, 3]);
    let attachment = grafted
        .branches()
        .find(|b| {
            let mut side = b.label_split().smaller_side().to_vec();
            side.sort();
            side == ["X", "Y"]
        })
        .unwrap();
    assert_eq!(attachment.length(), 0.0);
    assert!((distance(&grafted, "A", "X") - 1.5).abs() < 1e-12);
}

#[test]
fn test_graft_reduce_absorbs_inside_subtree() {
    let m = with_policy(QUARTET, ConstructionPolicy::Reduce);
    let subtree = parse_str("((X:1,Y:1):0,Z:1);").unwrap();
    let grafted = m.attach_subtree(pendant_of(&m, "A"), &subtree).unwrap();

    assert_eq!(grafted.num_leaves(), 7);
    assert_eq!(grafted.num_connections(), 10);
    assert_eq!(internal_degrees(&grafted), vec![3, 3, 3, 4]);
}
