//! Tests for pre-order and post-order traversal

use std::collections::HashSet;

use rstest::rstest;

use reltree::util::testing::init_test_setup;
use reltree::{NodeId, Tree};

/// Builds a tree from (name, parent index) pairs; index 0 is the root.
fn build(shape: &[(&'static str, usize)]) -> (Tree<&'static str>, NodeId) {
    init_test_setup();
    let mut tree = Tree::new();
    let mut ids: Vec<NodeId> = Vec::new();
    for (i, &(name, parent)) in shape.iter().enumerate() {
        let parent = (i > 0).then(|| ids[parent]);
        ids.push(tree.insert_with(name, parent, vec![]).unwrap());
    }
    (tree, ids[0])
}

fn names<'a>(iter: impl Iterator<Item = reltree::NodeRef<'a, &'static str>>) -> Vec<&'static str> {
    iter.map(|n| *n.data()).collect()
}

#[rstest]
#[case::single(&[("r", 0)])]
#[case::chain(&[("r", 0), ("a", 0), ("b", 1), ("c", 2)])]
#[case::wide(&[("r", 0), ("a", 0), ("b", 0), ("c", 0), ("d", 0)])]
#[case::mixed(&[("f", 0), ("b", 0), ("a", 1), ("d", 1), ("c", 3), ("e", 3), ("g", 0), ("i", 6), ("h", 7)])]
fn given_tree_when_walking_both_orders_then_same_nodes_root_first_and_last(
    #[case] shape: &[(&'static str, usize)],
) {
    let (tree, root) = build(shape);

    let pre: Vec<NodeId> = tree.pre_order(root).map(|n| n.id()).collect();
    let post: Vec<NodeId> = tree.post_order(root).map(|n| n.id()).collect();

    assert_eq!(pre.len(), shape.len());
    assert_eq!(post.len(), shape.len());
    assert_eq!(
        pre.iter().collect::<HashSet<_>>(),
        post.iter().collect::<HashSet<_>>()
    );
    assert_eq!(pre.first(), Some(&root));
    assert_eq!(post.last(), Some(&root));
}

#[rstest]
fn given_letter_tree_when_walking_then_orders_match_reference() {
    let (tree, f) = build(&[
        ("f", 0),
        ("b", 0),
        ("a", 1),
        ("d", 1),
        ("c", 3),
        ("e", 3),
        ("g", 0),
        ("i", 6),
        ("h", 7),
    ]);

    assert_eq!(
        names(tree.pre_order(f)),
        vec!["f", "b", "a", "d", "c", "e", "g", "i", "h"]
    );
    assert_eq!(
        names(tree.post_order(f)),
        vec!["a", "c", "e", "d", "b", "h", "i", "g", "f"]
    );
}

#[rstest]
fn given_subtree_start_when_walking_then_only_subtree_visited() {
    let (tree, f) = build(&[("f", 0), ("b", 0), ("a", 1), ("g", 0)]);
    let b = tree.children(f).unwrap()[0];

    assert_eq!(names(tree.pre_order(b)), vec!["b", "a"]);
    assert_eq!(names(tree.get(b).unwrap().post_order()), vec!["a", "b"]);
}

#[rstest]
fn given_filter_when_walking_then_descent_continues_below_rejected_nodes() {
    let (tree, r) = build(&[("r", 0), ("skip", 0), ("keep", 1)]);

    let kept = names(tree.pre_order(r).with_filter(|n| *n.data() != "skip"));
    assert_eq!(kept, vec!["r", "keep"]);

    let kept = names(tree.post_order(r).with_filter(|n| n.is_leaf()));
    assert_eq!(kept, vec!["keep"]);
}

#[rstest]
fn given_consumer_stopping_early_when_walking_then_rest_is_not_visited() {
    let (tree, r) = build(&[("r", 0), ("a", 0), ("b", 0), ("c", 0)]);
    let mut visited = Vec::new();

    let found = tree
        .pre_order(r)
        .inspect(|n| visited.push(*n.data()))
        .find(|n| *n.data() == "a");

    assert_eq!(found.map(|n| *n.data()), Some("a"));
    assert_eq!(visited, vec!["r", "a"]);
}

#[rstest]
fn given_reparented_node_when_walking_again_then_new_links_are_followed() {
    let (mut tree, r) = build(&[("r", 0), ("s0", 0), ("s1", 0), ("s1c", 2)]);
    let s0 = tree.children(r).unwrap()[0];
    let s1 = tree.children(r).unwrap()[1];
    let s1c = tree.children(s1).unwrap()[0];

    tree.set_parent(s1c, Some(s0)).unwrap();

    assert_eq!(names(tree.pre_order(r)), vec!["r", "s0", "s1c", "s1"]);
    assert_eq!(names(tree.post_order(r)), vec!["s1c", "s0", "s1", "r"]);
}
