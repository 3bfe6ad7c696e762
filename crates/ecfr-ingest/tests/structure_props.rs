//! Property tests for structure flattening.

use std::collections::HashSet;

use ecfr_client::StructureNode;
use ecfr_core::UpdatedDate;
use ecfr_ingest::upsert::flatten_structure;
use proptest::prelude::*;

fn leaf(identifier: String) -> StructureNode {
    StructureNode {
        identifier,
        label: None,
        label_level: None,
        label_description: None,
        reserved: false,
        node_type: "part".into(),
        size: None,
        volumes: vec![],
        children: vec![],
    }
}

/// Trees whose sibling identifiers are unique, as upstream guarantees.
fn tree() -> impl Strategy<Value = StructureNode> {
    let leaf_strategy = "[A-Z0-9]{1,4}".prop_map(leaf);
    leaf_strategy.prop_recursive(4, 48, 6, |inner| {
        ("[A-Z0-9]{1,4}", prop::collection::vec(inner, 0..6)).prop_map(|(id, kids)| {
            let mut seen = HashSet::new();
            let mut node = leaf(id);
            node.node_type = "chapter".into();
            node.children = kids
                .into_iter()
                .filter(|k| seen.insert(k.identifier.clone()))
                .collect();
            node
        })
    })
}

proptest! {
    #[test]
    fn one_row_per_node_with_unique_paths(root in tree()) {
        let date = UpdatedDate::parse("2025-08-01").unwrap();
        let rows = flatten_structure(40, &root, date).unwrap();
        prop_assert_eq!(rows.len(), root.node_count());

        let paths: HashSet<_> = rows.iter().map(|r| r.path.clone()).collect();
        prop_assert_eq!(paths.len(), rows.len());
        prop_assert_eq!(&rows[0].path, &root.identifier);
    }

    #[test]
    fn every_path_extends_an_earlier_path(root in tree()) {
        let date = UpdatedDate::parse("2025-08-01").unwrap();
        let rows = flatten_structure(40, &root, date).unwrap();
        for (i, row) in rows.iter().enumerate().skip(1) {
            let (parent, last) = row.path.rsplit_once('/').unwrap();
            prop_assert_eq!(last, row.identifier.as_str());
            prop_assert!(rows[..i].iter().any(|r| r.path == parent));
        }
    }

    #[test]
    fn flattening_is_deterministic(root in tree()) {
        let date = UpdatedDate::parse("2025-08-01").unwrap();
        let a = flatten_structure(40, &root, date).unwrap();
        let b = flatten_structure(40, &root, date).unwrap();
        prop_assert_eq!(a, b);
    }
}
