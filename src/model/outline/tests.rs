// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use proptest::prelude::*;
use rstest::rstest;

use super::{NodeId, Outline, OutlineError};
use crate::model::direction::Lateral;

fn empty() -> [&'static str; 0] {
    []
}

fn visible(outline: &Outline) -> Vec<NodeId> {
    outline.iter().collect()
}

fn fields_of(outline: &Outline, id: NodeId) -> Vec<String> {
    outline.node(id).unwrap().fields().to_vec()
}

#[test]
fn new_node_gets_one_empty_field() {
    let outline = Outline::new(empty());
    let root = outline.node(outline.root()).unwrap();
    assert_eq!(root.fields(), [""]);
    assert_eq!(root.level(), 0);
    assert!(!root.has_child());
    assert_eq!(outline.to_string(), "\n");
}

#[test]
fn rendered_row_joins_padded_fields() {
    let outline = Outline::new(["1", "2", "3"]);
    assert_eq!(outline.to_string(), "1    2    3\n");
}

#[test]
fn count_visible_includes_later_siblings() {
    let mut outline = Outline::new(empty());
    let root = outline.root();
    assert_eq!(outline.count_visible(root), 1);
    let sibling = outline.insert_sibling(root, empty()).unwrap();
    assert_eq!(outline.count_visible(root), 2);
    let child = outline.insert_child(sibling, empty()).unwrap();
    assert_eq!(outline.count_visible(sibling), 2);
    assert_eq!(outline.count_visible(root), 3);
    let grandchild = outline.insert_child(child, empty()).unwrap();
    assert_eq!(outline.count_visible(root), 4);
    outline.insert_sibling(grandchild, empty()).unwrap();
    assert_eq!(outline.count_visible(root), 5);
    outline.insert_sibling(grandchild, empty()).unwrap();
    assert_eq!(outline.count_visible(root), 6);
    outline.insert_sibling(child, empty()).unwrap();
    assert_eq!(outline.count_visible(root), 7);
}

#[test]
fn insert_child_prepends_and_shares_the_child_columns() {
    let mut outline = Outline::new(["root"]);
    let root = outline.root();
    let child = outline.insert_child(root, ["child"]).unwrap();
    let grandchild = outline.insert_child(child, ["grandchild"]).unwrap();
    let child2 = outline.insert_sibling(child, ["child2"]).unwrap();
    let first = outline.insert_child(root, ["first"]).unwrap();

    assert_eq!(outline.child(root), Some(first));
    assert_eq!(outline.sibling(first), Some(child));
    assert_eq!(outline.sibling(child), Some(child2));
    assert_eq!(outline.child(child), Some(grandchild));
    assert_eq!(outline.level(grandchild), Some(2));

    let first_columns = outline.node(first).unwrap().row().columns();
    let child_columns = outline.node(child).unwrap().row().columns();
    let root_columns = outline.node(root).unwrap().row().columns();
    assert!(first_columns.shares_with(child_columns));
    assert!(!first_columns.shares_with(root_columns));
}

#[test]
fn node_at_walks_visible_pre_order() {
    let mut outline = Outline::new(empty());
    let root = outline.root();
    let child = outline.insert_child(root, empty()).unwrap();
    let grandchild = outline.insert_child(child, empty()).unwrap();
    let child2 = outline.insert_sibling(child, empty()).unwrap();
    assert_eq!(visible(&outline), [root, child, grandchild, child2]);

    let grandchild2 = outline.insert_sibling(grandchild, empty()).unwrap();
    let child3 = outline.insert_sibling(child2, empty()).unwrap();
    let greatgrandchild = outline.insert_child(grandchild, empty()).unwrap();
    let expected = [
        root,
        child,
        grandchild,
        greatgrandchild,
        grandchild2,
        child2,
        child3,
    ];
    for (offset, id) in expected.iter().enumerate() {
        assert_eq!(outline.node_at(offset).unwrap(), *id);
    }
    assert_eq!(outline.node_at_from(child2, 1).unwrap(), child3);
    assert_eq!(
        outline.node_at(7),
        Err(OutlineError::OutOfRange {
            offset: 7,
            count: 7
        })
    );
}

#[test]
fn iteration_follows_children_before_later_siblings() {
    let mut outline = Outline::new(empty());
    let root = outline.root();
    let child = outline.insert_child(root, empty()).unwrap();
    let child2 = outline.insert_sibling(child, empty()).unwrap();
    let grandchild = outline.insert_child(child2, empty()).unwrap();
    let child3 = outline.insert_sibling(child2, empty()).unwrap();
    let greatgrandchild = outline.insert_child(grandchild, empty()).unwrap();
    let deepest = outline.insert_child(greatgrandchild, empty()).unwrap();
    let sibling2 = outline.insert_sibling(root, empty()).unwrap();
    let sibling = outline.insert_sibling(root, empty()).unwrap();

    assert_eq!(
        visible(&outline),
        [
            root,
            child,
            child2,
            grandchild,
            greatgrandchild,
            deepest,
            child3,
            sibling,
            sibling2
        ]
    );
}

#[test]
fn collapsed_nodes_hide_their_children() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let two = outline.insert_child(one, ["two"]).unwrap();
    outline.insert_child(two, ["three"]).unwrap();
    let four = outline.insert_sibling(one, ["four"]).unwrap();

    assert!(outline.toggle_collapsed(two).unwrap());
    assert_eq!(visible(&outline), [one, two, four]);
    assert_eq!(outline.visible_len(), 3);
    assert_eq!(outline.iter_all().count(), 4);
    assert_eq!(outline.node_at(2).unwrap(), four);

    assert!(!outline.toggle_collapsed(two).unwrap());
    assert_eq!(outline.visible_len(), 4);
}

#[test]
fn display_renders_indentation_and_columns() {
    let mut outline = Outline::new(["123", "1"]);
    let root = outline.root();
    assert_eq!(outline.to_string(), "123    1\n");
    outline.insert_child(root, ["1234"]).unwrap();
    assert_eq!(outline.to_string(), "123    1\n    1234\n");

    let mut columns = Outline::new(["123", "1"]);
    let root = columns.root();
    columns.insert_sibling(root, ["1234"]).unwrap();
    assert_eq!(columns.to_string(), "123     1\n1234\n");
    columns.delete_sibling(root).unwrap();
    assert_eq!(columns.to_string(), "123    1\n");
}

#[test]
fn delete_sibling_rehomes_children() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let two = outline.insert_sibling(one, ["two"]).unwrap();
    let three = outline.insert_child(two, ["three"]).unwrap();
    outline.insert_sibling(three, ["four"]).unwrap();
    outline.insert_sibling(two, ["five"]).unwrap();
    assert_eq!(outline.to_string(), "one\ntwo\n    three\n    four\nfive\n");

    outline.delete_sibling(one).unwrap();
    assert_eq!(outline.to_string(), "one\n    three\n    four\nfive\n");
    assert_eq!(outline.len(), 4);
    assert_eq!(outline.child(one), Some(three));
}

#[test]
fn delete_sibling_without_sibling_is_rejected() {
    let mut outline = Outline::new(["only"]);
    let root = outline.root();
    assert_eq!(
        outline.delete_sibling(root),
        Err(OutlineError::NoSibling { node: root })
    );
}

#[test]
fn equality_compares_structure_and_padded_content() {
    fn build(last: &str) -> Outline {
        let mut outline = Outline::new(["01234"]);
        let root = outline.root();
        let child = outline.insert_child(root, ["012", "0", "0"]).unwrap();
        outline.insert_child(child, ["012"]).unwrap();
        outline.insert_sibling(child, ["0", "0", "0123", last]).unwrap();
        outline
    }

    assert_eq!(build(""), build(""));
    assert_ne!(build(""), build("9"));
    assert_eq!(Outline::new(["01234"]), Outline::new(["01234"]));
}

#[test]
fn indent_moves_node_under_previous_sibling() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let two = outline.insert_sibling(one, ["two"]).unwrap();
    let three = outline.insert_sibling(two, ["three"]).unwrap();

    outline.indent(two, one).unwrap();
    assert_eq!(outline.to_string(), "one\n    two\nthree\n");
    assert_eq!(outline.child(one), Some(two));
    assert_eq!(outline.sibling(one), Some(three));
    assert_eq!(outline.level(two), Some(1));
}

#[test]
fn indent_appends_after_existing_children_and_keeps_grandchildren_depth() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    outline.insert_child(one, ["child"]).unwrap();
    let two = outline.insert_sibling(one, ["two"]).unwrap();
    let grandchild = outline.insert_child(two, ["grandchild"]).unwrap();

    outline.indent(two, one).unwrap();
    assert_eq!(outline.to_string(), "one\n    child\n    two\n    grandchild\n");
    assert_eq!(outline.level(grandchild), Some(1));
    assert_eq!(outline.sibling(two), Some(grandchild));

    let child_columns = outline.node(two).unwrap().row().columns();
    let grandchild_columns = outline.node(grandchild).unwrap().row().columns();
    assert!(child_columns.shares_with(grandchild_columns));
}

#[test]
fn indent_requires_the_immediate_previous_sibling() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let two = outline.insert_sibling(one, ["two"]).unwrap();
    let three = outline.insert_sibling(two, ["three"]).unwrap();
    let before = outline.to_string();

    assert_eq!(
        outline.indent(three, one),
        Err(OutlineError::NotPreviousSibling {
            node: three,
            prev: one
        })
    );
    assert_eq!(outline.to_string(), before);
}

#[test]
fn unindent_simple_child_becomes_sibling() {
    let mut outline = Outline::new(["root"]);
    let root = outline.root();
    let child = outline.insert_child(root, ["child"]).unwrap();
    outline.insert_child(child, ["grandchild"]).unwrap();

    outline.unindent(child, root).unwrap();

    let mut expected = Outline::new(["root"]);
    let expected_root = expected.root();
    let sibling = expected.insert_sibling(expected_root, ["child"]).unwrap();
    expected.insert_child(sibling, ["grandchild"]).unwrap();
    assert_eq!(outline, expected);
}

#[test]
fn unindent_takes_later_siblings_as_children() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let two = outline.insert_child(one, ["two"]).unwrap();
    let three = outline.insert_sibling(two, ["three"]).unwrap();
    let four = outline.insert_child(three, ["four"]).unwrap();
    let five = outline.insert_sibling(three, ["five"]).unwrap();
    outline.insert_child(five, ["six"]).unwrap();
    assert_eq!(
        outline.to_string(),
        "one\n    two\n    three\n        four\n    five\n        six\n"
    );

    outline.unindent(two, one).unwrap();
    assert_eq!(
        outline.to_string(),
        "one\ntwo\n    three\n        four\n    five\n        six\n"
    );

    outline.unindent(three, two).unwrap();
    assert_eq!(
        outline.to_string(),
        "one\ntwo\nthree\n    four\n    five\n        six\n"
    );
    assert_eq!(outline.sibling(four), Some(five));

    outline.unindent(five, three).unwrap();
    assert_eq!(
        outline.to_string(),
        "one\ntwo\nthree\n    four\nfive\n    six\n"
    );
}

#[test]
fn unindent_requires_a_child_of_parent() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let two = outline.insert_sibling(one, ["two"]).unwrap();
    assert_eq!(
        outline.unindent(two, one),
        Err(OutlineError::NotChildOf {
            node: two,
            parent: one
        })
    );
}

#[rstest]
#[case::middle_of_first_field(2)]
#[case::padding_of_first_field(5)]
fn split_moves_fields_from_the_enclosing_field(#[case] x: usize) {
    let mut outline = Outline::new(["root", "two", "three"]);
    let root = outline.root();
    let child = outline.insert_child(root, ["child"]).unwrap();

    let created = outline.split(root, x).unwrap();
    assert_eq!(fields_of(&outline, root), [""]);
    assert_eq!(fields_of(&outline, created), ["root", "two", "three"]);
    assert_eq!(outline.child(created), Some(child));
    assert!(!outline.has_child(root));
}

#[test]
fn split_at_field_boundary_creates_sibling_with_tail() {
    let mut outline = Outline::new(["root", "two", "three"]);
    let root = outline.root();
    assert_eq!(outline.to_string(), "root    two    three\n");

    let created = outline.split(root, 8).unwrap();
    assert_eq!(outline.to_string(), "root\ntwo     three\n");
    assert_eq!(outline.sibling(root), Some(created));
    assert_eq!(outline.level(created), Some(0));
}

#[test]
fn combine_appends_fields_and_rehomes_children() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let two = outline.insert_sibling(one, ["two", "2"]).unwrap();
    outline.insert_child(two, ["child"]).unwrap();
    let three = outline.insert_sibling(two, ["three"]).unwrap();

    outline.combine(two, one, Some(one)).unwrap();
    assert_eq!(outline.to_string(), "one      two    2\n    child\nthree\n");
    assert_eq!(outline.sibling(one), Some(three));
    assert_eq!(outline.len(), 3);
}

#[test]
fn combine_into_a_deeper_previous_row() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let child = outline.insert_child(one, ["child"]).unwrap();
    let two = outline.insert_sibling(one, ["two"]).unwrap();
    outline.insert_child(two, ["grandchild"]).unwrap();

    outline.combine(two, child, Some(one)).unwrap();
    assert_eq!(
        outline.to_string(),
        "one\n    child         two\n    grandchild\n"
    );
}

#[test]
fn combine_rejects_the_first_row() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    assert_eq!(
        outline.combine(one, one, None),
        Err(OutlineError::NoPreviousRow)
    );
}

#[test]
fn combine_rejects_nested_rows() {
    let mut outline = Outline::new(["one"]);
    let one = outline.root();
    let child = outline.insert_child(one, ["child"]).unwrap();
    assert_eq!(
        outline.combine(child, one, None),
        Err(OutlineError::NotRootLevel { level: 1 })
    );
}

#[test]
fn split_field_and_combine_fields() {
    let mut outline = Outline::new(["onetwo"]);
    let root = outline.root();

    outline.split_field(root, 3).unwrap();
    assert_eq!(fields_of(&outline, root), ["one", "two"]);
    assert_eq!(outline.to_string(), "one    two\n");

    outline.combine_fields(root, 7, Lateral::Left).unwrap();
    assert_eq!(fields_of(&outline, root), ["onetwo"]);

    assert_eq!(
        outline.combine_fields(root, 0, Lateral::Right),
        Err(OutlineError::NoNeighborField {
            index: 0,
            direction: Lateral::Right
        })
    );
}

#[test]
fn combined_field_slot_stops_counting_in_its_column() {
    let mut outline = Outline::new(["root", "node"]);
    let root = outline.root();
    let columns = outline.node(root).unwrap().row().columns().clone();
    assert_eq!(columns.field_count(1), 1);

    outline.combine_fields(root, 0, Lateral::Right).unwrap();
    assert_eq!(fields_of(&outline, root), ["rootnode"]);
    assert_eq!(columns.field_count(1), 0);
    assert_eq!(columns.width(0), 8);
}

#[test]
fn insert_and_delete_text_at_virtual_columns() {
    let mut outline = Outline::new(["one"]);
    let root = outline.root();
    let child = outline.insert_child(root, ["ab", "cd"]).unwrap();

    outline.insert_text(child, 5, "X").unwrap();
    assert_eq!(fields_of(&outline, child), ["aXb", "cd"]);
    outline.insert_text(child, 12, "!").unwrap();
    assert_eq!(fields_of(&outline, child), ["aXb", "c!d"]);

    assert_eq!(outline.delete_char_at(child, 4).unwrap(), Some('a'));
    assert_eq!(fields_of(&outline, child), ["Xb", "c!d"]);
    assert_eq!(outline.delete_char_at(child, 7).unwrap(), None);
}

#[test]
fn geometry_is_derived_from_columns_and_level() {
    let mut outline = Outline::new(["root"]);
    let root = outline.root();
    let child = outline.insert_child(root, ["one", "two.", "three"]).unwrap();
    let node = outline.node(child).unwrap();

    assert_eq!(node.indent_width(), 4);
    assert_eq!(node.line_width(), 4 + 7 + 8 + 5);
    assert_eq!(node.column_width(0), Some(7));
    assert_eq!(node.column_width(1), Some(8));
    assert_eq!(node.column_width(2), Some(9));
    assert_eq!(node.field_start(1), Some(11));
    assert_eq!(node.field_end(1, Lateral::Right), Some(15));
    assert_eq!(node.field_index_at(0), 0);
    assert_eq!(node.field_index_at(10), 0);
    assert_eq!(node.field_index_at(11), 1);
    assert_eq!(node.field_index_at(100), 2);
    assert_eq!(node.index_in_field(13), 2);
    assert_eq!(node.index_in_field(100), 5);
    assert_eq!(node.selected_field_end(12, Lateral::Left), 11);
    assert_eq!(node.padding_len(1), Some(4));
}

#[derive(Debug, Clone)]
enum Build {
    Child(usize, String),
    Sibling(usize, String),
    Toggle(usize),
}

fn build_op() -> impl Strategy<Value = Build> {
    prop_oneof![
        (any::<usize>(), "[a-z]{0,6}").prop_map(|(at, text)| Build::Child(at, text)),
        (any::<usize>(), "[a-z]{0,6}").prop_map(|(at, text)| Build::Sibling(at, text)),
        any::<usize>().prop_map(Build::Toggle),
    ]
}

fn build_outline(ops: &[Build]) -> Outline {
    let mut outline = Outline::new(["root"]);
    for op in ops {
        let ids: Vec<NodeId> = outline.iter_all().collect();
        match op {
            Build::Child(at, text) => {
                outline.insert_child(ids[at % ids.len()], [text.as_str()]).unwrap();
            }
            Build::Sibling(at, text) => {
                outline
                    .insert_sibling(ids[at % ids.len()], [text.as_str(), "x"])
                    .unwrap();
            }
            Build::Toggle(at) => {
                outline.toggle_collapsed(ids[at % ids.len()]).unwrap();
            }
        }
    }
    outline
}

fn expected_visible(outline: &Outline) -> usize {
    fn count(outline: &Outline, id: Option<NodeId>) -> usize {
        match id {
            None => 0,
            Some(id) => {
                let node = outline.node(id).unwrap();
                let children = if node.is_collapsed() {
                    0
                } else {
                    count(outline, node.child())
                };
                1 + children + count(outline, node.sibling())
            }
        }
    }
    count(outline, Some(outline.root()))
}

proptest! {
    #[test]
    fn count_visible_matches_recursive_definition(ops in prop::collection::vec(build_op(), 0..40)) {
        let outline = build_outline(&ops);
        prop_assert_eq!(outline.visible_len(), expected_visible(&outline));
        prop_assert_eq!(outline.iter().count(), outline.visible_len());
    }

    #[test]
    fn indent_then_unindent_restores_the_outline(
        ops in prop::collection::vec(build_op(), 0..30),
        pick in any::<usize>(),
    ) {
        let mut outline = build_outline(&ops);
        let candidates: Vec<(NodeId, NodeId)> = outline
            .iter_all()
            .filter_map(|id| outline.sibling(id).map(|next| (next, id)))
            .collect();
        prop_assume!(!candidates.is_empty());
        let (node, prev) = candidates[pick % candidates.len()];
        let before = outline.to_string();
        let reference = build_outline(&ops);

        outline.indent(node, prev).unwrap();
        outline.unindent(node, prev).unwrap();
        prop_assert_eq!(outline.to_string(), before);
        prop_assert!(outline == reference);
    }

    #[test]
    fn split_then_combine_restores_the_row(
        fields in prop::collection::vec("[a-z]{1,5}", 2..6),
        boundary in 1usize..5,
        children in 0usize..3,
    ) {
        let boundary = boundary.min(fields.len() - 1);
        let mut outline = Outline::new(fields.iter().map(String::as_str));
        let root = outline.root();
        for index in 0..children {
            outline.append_child(root, [format!("child{index}")]).unwrap();
        }
        let reference_text = outline.to_string();

        let x = outline.node(root).unwrap().field_start(boundary).unwrap();
        let created = outline.split(root, x).unwrap();
        outline.combine(created, root, Some(root)).unwrap();

        prop_assert_eq!(outline.node(root).unwrap().fields(), fields.as_slice());
        prop_assert_eq!(outline.to_string(), reference_text);
    }
}
