use reroot::manipulator::TreeManipulator;
use reroot::midpoint_root_newick;
use reroot::newick::{parse_str, to_newick};

fn manipulator(newick: &str) -> TreeManipulator {
    TreeManipulator::new(&parse_str(newick).unwrap()).unwrap()
}

/// Longest distance from the root to any leaf below each root child.
fn root_child_depths(tree: &reroot::RootedTree) -> Vec<f64> {
    tree.root()
        .children()
        .iter()
        .map(|&child| {
            tree.leaf_labels_below(child)
                .iter()
                .map(|label| {
                    let mut depth = 0.0;
                    let mut node = tree
                        .post_order_iter()
                        .find(|n| n.label() == Some(label.as_str()))
                        .unwrap();
                    while let Some(parent) = node.parent() {
                        depth += node.branch_length().unwrap_or(0.0);
                        node = &tree[parent];
                    }
                    depth
                })
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

#[test]
fn test_midpoint_on_pendant_branch() {
    let m = manipulator("((A:1,B:1):1,(C:1,D:9):1);");
    let rooted = m.midpoint_rooted();
    assert_eq!(to_newick(&rooted), "(((A:1,B:1):2,C:1):3,D:6);");

    let depths = root_child_depths(&rooted);
    assert_eq!(depths, vec![6.0, 6.0]);
}

#[test]
fn test_midpoint_tie_prefers_balancing_connection() {
    // The base connection and the pendant of D both have a difference of 4,
    // but only the pendant of D is long enough to balance it
    let m = manipulator("((A:1,B:1):2,(C:1,D:5):1);");
    let midpoint = m.midpoint_connection();
    assert_eq!(m.path_diff(midpoint).unwrap(), 4.0);
    assert_eq!(m.path_diff(m.graph().base()).unwrap(), 4.0);
    assert_ne!(midpoint, m.graph().base());

    let depths = root_child_depths(&m.midpoint_rooted());
    assert_eq!(depths, vec![4.5, 4.5]);
}

#[test]
fn test_midpoint_follows_smallest_path_diff() {
    let m = manipulator("((A:1,D:1):5,(C:0.1,(B:9.5,E:0.1):0.5):5);");
    let midpoint = m.midpoint_connection();
    assert_eq!(m.path_diff(midpoint).unwrap(), 1.5);
    assert_eq!(m.graph().connection(midpoint).length(), 0.5);

    let mut depths = root_child_depths(&m.midpoint_rooted());
    depths.sort_by(f64::total_cmp);
    assert_eq!(depths, vec![10.0, 11.0]);
}

#[test]
fn test_midpoint_of_star() {
    assert_eq!(
        midpoint_root_newick("(A:1,B:1,C:4);").unwrap(),
        "((A:1,B:1):1.5,C:2.5);"
    );
}

#[test]
fn test_symmetric_tree_splits_in_the_middle() {
    let m = manipulator("((A:1,B:1):0,(C:1,D:1):0);");
    let midpoint = m.midpoint_connection();
    assert_eq!(midpoint, m.graph().base());
    assert_eq!(m.path_diff(midpoint).unwrap(), 0.0);

    let rooted = m.midpoint_rooted();
    for &child in rooted.root().children() {
        assert_eq!(rooted[child].branch_length(), Some(0.0));
    }

    let m = manipulator("((A:2,B:2):1.5,(C:2,D:2):0.5);");
    let rooted = m.midpoint_rooted();
    for &child in rooted.root().children() {
        assert_eq!(rooted[child].branch_length(), Some(1.0));
    }
}

#[test]
fn test_midpoint_minimises_path_diff() {
    let m = manipulator("(((A:0.3,B:2.1):0.7,C:1.4):0.2,(D:0.9,(E:3.2,F:0.1):0.4):1.1,G:2.5);");
    let midpoint = m.midpoint_connection();
    let best = m.path_diff(midpoint).unwrap();
    for connection in m.all_connections() {
        assert!(best <= m.path_diff(connection).unwrap());
    }

    let rooted = m.midpoint_rooted();
    assert!((rooted.total_branch_length() - m.total_length()).abs() < 1e-9);
}

#[test]
fn test_midpoint_fills_every_cache_cell_once() {
    let m = manipulator("((A:1,B:2):3,(C:4,D:5):6,(E:0.5,F:1.5):0.25);");
    assert_eq!(m.graph().num_cached_cells(), 0);

    let first = to_newick(&m.midpoint_rooted());
    assert_eq!(m.graph().num_cached_cells(), 2 * m.num_connections());

    // Reuses the caches
    assert_eq!(to_newick(&m.midpoint_rooted()), first);
}
