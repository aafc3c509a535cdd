//! Expected tree shapes after concrete insertion sequences.
//!
//! Each case inserts a key sequence, checks the full shape (height and
//! children per node), and checks the ancestor list reported by the last
//! insertion.

use crate::{
    builder::TreeBuilder,
    node::{BasicNode, MutableNode, Node},
    tests::num_key,
};

/// Expected node: (key, height, left, right).
type Shape = (i64, i16, Option<i64>, Option<i64>);

struct Case {
    name: &'static str,
    keys: &'static [i64],
    root: i64,
    shape: &'static [Shape],
    updated: &'static [i64],
}

fn run(case: &Case) {
    let mut builder = TreeBuilder::new();
    let (last, head) = case.keys.split_last().expect("non-empty case");
    for key in head {
        builder.add(BasicNode::new(&num_key(*key))).expect("add");
    }
    let updated = builder
        .add(BasicNode::new(&num_key(*last)))
        .expect("last add");

    let mut updated_keys: Vec<Vec<u8>> = updated.iter().map(|n| n.key()).collect();
    updated_keys.sort();
    let mut expected_updated: Vec<Vec<u8>> = case.updated.iter().map(|k| num_key(*k)).collect();
    expected_updated.sort();
    assert_eq!(
        updated_keys, expected_updated,
        "{}: reported ancestors differ",
        case.name
    );

    let root = builder.root().expect("root");
    assert_eq!(root.key(), num_key(case.root), "{}: root differs", case.name);

    assert_eq!(builder.len(), case.shape.len(), "{}: node count", case.name);
    for &(key, height, left, right) in case.shape {
        let node = builder
            .nodes()
            .get(&num_key(key))
            .unwrap_or_else(|| panic!("{}: node {} missing", case.name, key));
        assert_eq!(node.height(), height, "{}: height of {}", case.name, key);
        assert_eq!(
            node.left_key(),
            left.map(num_key),
            "{}: left of {}",
            case.name,
            key
        );
        assert_eq!(
            node.right_key(),
            right.map(num_key),
            "{}: right of {}",
            case.name,
            key
        );
    }

    builder
        .into_tree()
        .expect("tree")
        .is_valid()
        .unwrap_or_else(|e| panic!("{}: invalid tree: {e}", case.name));
}

#[test]
fn plain_attachments() {
    for case in [
        Case {
            name: "first node becomes root",
            keys: &[100],
            root: 100,
            shape: &[(100, 0, None, None)],
            updated: &[],
        },
        Case {
            name: "attach left",
            keys: &[100, 50],
            root: 100,
            shape: &[(100, 1, Some(50), None), (50, 0, None, None)],
            updated: &[100],
        },
        Case {
            name: "attach both sides",
            keys: &[100, 50, 150],
            root: 100,
            shape: &[
                (100, 1, Some(50), Some(150)),
                (50, 0, None, None),
                (150, 0, None, None),
            ],
            updated: &[100],
        },
        Case {
            name: "grow the left arm",
            keys: &[100, 50, 150, 30],
            root: 100,
            shape: &[
                (100, 2, Some(50), Some(150)),
                (50, 1, Some(30), None),
                (150, 0, None, None),
                (30, 0, None, None),
            ],
            updated: &[100, 50],
        },
    ] {
        run(&case);
    }
}

#[test]
fn shallow_rotations() {
    for case in [
        Case {
            name: "left-left chain promotes the middle",
            keys: &[100, 50, 30],
            root: 50,
            shape: &[
                (50, 1, Some(30), Some(100)),
                (30, 0, None, None),
                (100, 0, None, None),
            ],
            updated: &[100, 50],
        },
        Case {
            name: "left-right chain promotes the new node",
            keys: &[100, 50, 80],
            root: 80,
            shape: &[
                (80, 1, Some(50), Some(100)),
                (50, 0, None, None),
                (100, 0, None, None),
            ],
            updated: &[100, 50],
        },
        Case {
            name: "right-right chain promotes the middle",
            keys: &[100, 150, 180],
            root: 150,
            shape: &[
                (150, 1, Some(100), Some(180)),
                (100, 0, None, None),
                (180, 0, None, None),
            ],
            updated: &[100, 150],
        },
        Case {
            name: "right-left chain promotes the new node",
            keys: &[100, 150, 110],
            root: 110,
            shape: &[
                (110, 1, Some(100), Some(150)),
                (100, 0, None, None),
                (150, 0, None, None),
            ],
            updated: &[100, 150],
        },
    ] {
        run(&case);
    }
}

#[test]
fn rotations_below_the_root() {
    for case in [
        Case {
            name: "left arm rebalances in place",
            keys: &[100, 50, 150, 30, 10],
            root: 100,
            shape: &[
                (100, 2, Some(30), Some(150)),
                (30, 1, Some(10), Some(50)),
                (10, 0, None, None),
                (50, 0, None, None),
                (150, 0, None, None),
            ],
            updated: &[100, 50, 30],
        },
        Case {
            name: "right arm rebalances in place",
            keys: &[100, 50, 150, 180, 200],
            root: 100,
            shape: &[
                (100, 2, Some(50), Some(180)),
                (180, 1, Some(150), Some(200)),
                (50, 0, None, None),
                (150, 0, None, None),
                (200, 0, None, None),
            ],
            updated: &[100, 150, 180],
        },
        Case {
            name: "deep left outer insert",
            keys: &[100, 50, 150, 30, 70, 130, 10, 5],
            root: 100,
            shape: &[
                (100, 3, Some(50), Some(150)),
                (50, 2, Some(10), Some(70)),
                (150, 1, Some(130), None),
                (10, 1, Some(5), Some(30)),
                (5, 0, None, None),
                (30, 0, None, None),
                (70, 0, None, None),
                (130, 0, None, None),
            ],
            updated: &[100, 50, 30, 10],
        },
        Case {
            name: "deep left inner insert",
            keys: &[100, 50, 150, 30, 70, 130, 10, 20],
            root: 100,
            shape: &[
                (100, 3, Some(50), Some(150)),
                (50, 2, Some(20), Some(70)),
                (150, 1, Some(130), None),
                (20, 1, Some(10), Some(30)),
                (10, 0, None, None),
                (30, 0, None, None),
                (70, 0, None, None),
                (130, 0, None, None),
            ],
            updated: &[100, 50, 30, 10],
        },
        Case {
            name: "right-left violation promotes the grandchild",
            keys: &[100, 50, 150, 130, 180, 110],
            root: 130,
            shape: &[
                (130, 2, Some(100), Some(150)),
                (100, 1, Some(50), Some(110)),
                (150, 1, None, Some(180)),
                (50, 0, None, None),
                (110, 0, None, None),
                (180, 0, None, None),
            ],
            updated: &[100, 150, 130],
        },
    ] {
        run(&case);
    }
}

#[test]
fn twelve_sequential_keys() {
    let mut builder = TreeBuilder::new();
    for i in 1..=12 {
        builder.add(BasicNode::new(&num_key(i))).expect("add");
    }

    let root = builder.root().expect("root");
    assert_eq!(root.key(), num_key(8));

    for (key, height, left, right) in [
        (8, 3, Some(4), Some(10)),
        (4, 2, Some(2), Some(6)),
        (10, 2, Some(9), Some(11)),
        (11, 1, None, Some(12)),
        (2, 1, Some(1), Some(3)),
        (6, 1, Some(5), Some(7)),
        (1, 0, None, None),
        (3, 0, None, None),
        (5, 0, None, None),
        (7, 0, None, None),
        (9, 0, None, None),
        (12, 0, None, None),
    ] {
        let node = builder.nodes().get(&num_key(key)).expect("node");
        assert_eq!(node.height(), height, "height of {key}");
        assert_eq!(node.left_key(), left.map(num_key), "left of {key}");
        assert_eq!(node.right_key(), right.map(num_key), "right of {key}");
    }
}

#[test]
fn fifty_sequential_keys() {
    let mut builder = TreeBuilder::new();
    for i in 1..=50 {
        builder.add(BasicNode::new(&num_key(i))).expect("add");
    }

    let root = builder.root().expect("root");
    assert_eq!(root.key(), num_key(32));
    assert_eq!(root.height(), 5);

    let tree = builder.into_tree().expect("tree");
    tree.is_valid().expect("valid");
    assert_eq!(
        in_order_keys(tree.root()),
        (1..=50).map(num_key).collect::<Vec<_>>()
    );
}

/// Left subtree, self, right subtree, through the direct handles.
pub(crate) fn in_order_keys<N: MutableNode>(root: &N) -> Vec<Vec<u8>> {
    fn walk<N: MutableNode>(node: &N, keys: &mut Vec<Vec<u8>>) {
        if let Some(left) = node.left() {
            walk(&left, keys);
        }
        keys.push(node.key());
        if let Some(right) = node.right() {
            walk(&right, keys);
        }
    }

    let mut keys = Vec::new();
    walk(root, &mut keys);
    keys
}
