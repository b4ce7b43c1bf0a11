use proptest::prelude::*;
use reroot::graph::ConstructionPolicy;
use reroot::manipulator::{ManipulatorConfig, TreeManipulator};
use reroot::newick::parse_str;
use std::collections::BTreeMap;

const POLICIES: [ConstructionPolicy; 3] = [
    ConstructionPolicy::Mimic,
    ConstructionPolicy::Expand,
    ConstructionPolicy::Reduce,
];

/// Builds a random tree by repeatedly merging two or three subtrees, until
/// two or three remain below the root. Branch lengths are multiples of 0.1.
fn random_newick(num_leaves: usize, lengths: &[u32], picks: &[usize]) -> String {
    let mut next_length = lengths.iter().cycle().map(|&l| f64::from(l) / 10.0);
    let mut picks = picks.iter().cycle().copied();
    let mut items: Vec<String> = (0..num_leaves)
        .map(|i| format!("L{i}:{}", next_length.next().unwrap()))
        .collect();

    loop {
        let merge = match items.len() {
            2 => break,
            3 if picks.next().unwrap() % 2 == 0 => break,
            3 => 2,
            _ if picks.next().unwrap() % 3 == 0 => 3,
            _ => 2,
        };
        let mut merged = Vec::with_capacity(merge);
        for _ in 0..merge {
            let i = picks.next().unwrap() % items.len();
            merged.push(items.swap_remove(i));
        }
        items.push(format!("({}):{}", merged.join(","), next_length.next().unwrap()));
    }
    format!("({});", items.join(","))
}

fn random_tree() -> impl Strategy<Value = String> {
    (
        3usize..12,
        proptest::collection::vec(1u32..50, 1..32),
        proptest::collection::vec(any::<usize>(), 1..32),
    )
        .prop_map(|(num_leaves, lengths, picks)| random_newick(num_leaves, &lengths, &picks))
}

fn with_policy(newick: &str, policy: ConstructionPolicy) -> TreeManipulator {
    let tree = parse_str(newick).unwrap();
    TreeManipulator::with_config(&tree, ManipulatorConfig::new(policy)).unwrap()
}

fn assert_distances_close(
    a: &BTreeMap<(String, String), f64>,
    b: &BTreeMap<(String, String), f64>,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(a.len(), b.len());
    for (pair, distance) in a {
        let other = b.get(pair).copied().unwrap_or(f64::NAN);
        prop_assert!((distance - other).abs() < 1e-9, "{:?}: {} vs {}", pair, distance, other);
    }
    Ok(())
}

/// Both sides of `connection`, each sorted, smaller side first.
fn split_key(m: &TreeManipulator, connection: usize) -> (Vec<String>, Vec<String>) {
    let split = m.branch(connection).unwrap().label_split();
    let (mut end0, mut end1) = (split.end0, split.end1);
    end0.sort();
    end1.sort();
    if end0 <= end1 { (end0, end1) } else { (end1, end0) }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_rooting_conserves_leaves_and_length(newick in random_tree()) {
        for policy in POLICIES {
            let m = with_policy(&newick, policy);
            let rootings = m.all_rootings();
            prop_assert_eq!(rootings.len(), m.num_connections());
            for rooted in &rootings {
                prop_assert_eq!(rooted.num_leaves(), m.num_leaves());
                prop_assert!((rooted.total_branch_length() - m.total_length()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn rootings_keep_patristic_distances(newick in random_tree()) {
        let input = parse_str(&newick).unwrap().patristic_distances();
        for policy in POLICIES {
            let m = with_policy(&newick, policy);
            assert_distances_close(&m.input_rooting().patristic_distances(), &input)?;
            assert_distances_close(&m.midpoint_rooted().patristic_distances(), &input)?;
            for rooted in m.root_enumerator() {
                assert_distances_close(&rooted.patristic_distances(), &input)?;
            }
        }
    }

    #[test]
    fn rooting_survives_rebuild(newick in random_tree()) {
        for policy in POLICIES {
            let m = with_policy(&newick, policy);
            for connection in m.all_connections() {
                let rooted = m.rooted_at(connection).unwrap();
                let rebuilt =
                    TreeManipulator::with_config(&rooted, ManipulatorConfig::new(policy)).unwrap();
                prop_assert_eq!(rebuilt.num_connections(), m.num_connections());

                let key = split_key(&m, connection);
                let matching = rebuilt
                    .all_connections()
                    .into_iter()
                    .find(|&c| split_key(&rebuilt, c) == key);
                prop_assert!(matching.is_some(), "no connection splits {:?}", key);

                let again = rebuilt.rooted_at(matching.unwrap()).unwrap();
                assert_distances_close(&again.patristic_distances(), &rooted.patristic_distances())?;
            }
        }
    }

    #[test]
    fn midpoint_minimises_path_diff(newick in random_tree()) {
        let m = with_policy(&newick, ConstructionPolicy::Mimic);
        let midpoint = m.midpoint_connection();
        let best = m.path_diff(midpoint).unwrap();
        for connection in m.all_connections() {
            prop_assert!(best <= m.path_diff(connection).unwrap());
        }

        let rooted = m.midpoint_rooted();
        prop_assert_eq!(rooted.root().children().len(), 2);
        for &child in rooted.root().children() {
            prop_assert!(rooted[child].branch_length().unwrap() >= 0.0);
        }
        prop_assert_eq!(m.graph().num_cached_cells(), 2 * m.num_connections());
    }

    #[test]
    fn input_clade_is_found_as_outgroup(newick in random_tree()) {
        let m = with_policy(&newick, ConstructionPolicy::Mimic);
        let input = m.input_rooting();
        let mut clade = input.leaf_labels_below(input.root().children()[0]);
        clade.sort();

        let rooted = m.outgroup_rooted(&clade).unwrap();
        let mut first = rooted.leaf_labels_below(rooted.root().children()[0]);
        first.sort();
        prop_assert_eq!(first, clade.clone());
        prop_assert_eq!(m.outgroup_connections(&clade).unwrap().len(), 1);
    }

    #[test]
    fn graft_adds_exactly_the_subtree(newick in random_tree(), pick in any::<usize>()) {
        let m = with_policy(&newick, ConstructionPolicy::Mimic);
        let connection = pick % m.num_connections();
        let subtree = parse_str("(X:1,Y:2):0.5;").unwrap();
        let grafted = m.attach_subtree(connection, &subtree).unwrap();

        prop_assert_eq!(grafted.num_leaves(), m.num_leaves() + 2);
        prop_assert_eq!(grafted.num_connections(), m.num_connections() + 4);
        prop_assert!((grafted.total_length() - m.total_length() - 3.5).abs() < 1e-9);

        // Distances among the old leaves are untouched
        let before = m.input_rooting().patristic_distances();
        let after: BTreeMap<_, _> = grafted
            .input_rooting()
            .patristic_distances()
            .into_iter()
            .filter(|((a, b), _)| a.starts_with('L') && b.starts_with('L'))
            .collect();
        assert_distances_close(&after, &before)?;
    }
}
