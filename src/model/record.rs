// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nested `{fields, child, sibling}` records used by the document file.
//!
//! Sibling chains nest in this shape, so a long flat outline becomes a deeply nested record.
//! Conversion to and from the arena, and dropping a record, never recurse.

use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use super::outline::{NodeId, Outline, OutlineError};

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub fields: Vec<String>,
    #[serde(default)]
    pub child: Option<Box<NodeRecord>>,
    #[serde(default)]
    pub sibling: Option<Box<NodeRecord>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapsed: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl NodeRecord {
    pub fn leaf<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            child: None,
            sibling: None,
            collapsed: false,
        }
    }
}

impl Drop for NodeRecord {
    fn drop(&mut self) {
        let mut pending: Vec<Box<NodeRecord>> = Vec::new();
        pending.extend(self.child.take());
        pending.extend(self.sibling.take());
        while let Some(mut record) = pending.pop() {
            pending.extend(record.child.take());
            pending.extend(record.sibling.take());
        }
    }
}

#[derive(Clone, Copy)]
enum Link {
    Child,
    Sibling,
}

impl Outline {
    pub fn from_record(mut record: NodeRecord) -> Result<Self, OutlineError> {
        let mut outline = Outline::new(std::mem::take(&mut record.fields));
        let root = outline.root();
        outline.set_collapsed(root, record.collapsed)?;

        let mut pending: Vec<(NodeId, Link, Box<NodeRecord>)> = Vec::new();
        pending.extend(record.child.take().map(|child| (root, Link::Child, child)));
        pending.extend(record.sibling.take().map(|sibling| (root, Link::Sibling, sibling)));

        while let Some((anchor, link, mut next)) = pending.pop() {
            let fields = std::mem::take(&mut next.fields);
            let id = match link {
                Link::Child => outline.insert_child(anchor, fields)?,
                Link::Sibling => outline.insert_sibling(anchor, fields)?,
            };
            outline.set_collapsed(id, next.collapsed)?;
            pending.extend(next.child.take().map(|child| (id, Link::Child, child)));
            pending.extend(next.sibling.take().map(|sibling| (id, Link::Sibling, sibling)));
        }
        Ok(outline)
    }

    pub fn to_record(&self) -> NodeRecord {
        let order: Vec<NodeId> = self.iter_all().collect();
        let mut built: SecondaryMap<NodeId, NodeRecord> = SecondaryMap::new();
        for id in order.into_iter().rev() {
            let Some(node) = self.get(id) else {
                continue;
            };
            let child = node.child().and_then(|child| built.remove(child));
            let sibling = node.sibling().and_then(|sibling| built.remove(sibling));
            built.insert(
                id,
                NodeRecord {
                    fields: node.fields().to_vec(),
                    child: child.map(Box::new),
                    sibling: sibling.map(Box::new),
                    collapsed: node.is_collapsed(),
                },
            );
        }
        built.remove(self.root()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::NodeRecord;
    use crate::model::outline::Outline;

    fn sample() -> Outline {
        let mut outline = Outline::new(["one", "two", "three"]);
        let root = outline.root();
        let child = outline.insert_child(root, ["child1", "child2"]).unwrap();
        let grandchild = outline.insert_child(child, ["gc1"]).unwrap();
        outline.insert_sibling(grandchild, ["gc2", "gc2"]).unwrap();
        let sibling = outline.insert_sibling(root, [""; 0]).unwrap();
        outline.insert_sibling(sibling, ["sib2", "sib2"]).unwrap();
        outline.toggle_collapsed(child).unwrap();
        outline
    }

    #[test]
    fn record_round_trip_preserves_structure_and_text() {
        let outline = sample();
        let copy = Outline::from_record(outline.to_record()).unwrap();
        assert_eq!(copy.to_string(), outline.to_string());
        assert_eq!(copy, outline);
    }

    #[test]
    fn record_shape_follows_child_and_sibling_links() {
        let record = Outline::new(["one"]).to_record();
        assert_eq!(record, NodeRecord::leaf(["one"]));

        let record = sample().to_record();
        assert_eq!(record.fields, ["one", "two", "three"]);
        let child = record.child.as_deref().unwrap();
        assert!(child.collapsed);
        assert_eq!(child.child.as_deref().unwrap().fields, ["gc1"]);
        let sibling = record.sibling.as_deref().unwrap();
        assert_eq!(sibling.fields, [""]);
        assert_eq!(sibling.sibling.as_deref().unwrap().fields, ["sib2", "sib2"]);
    }

    #[test]
    fn collapsed_is_omitted_when_false() {
        let json = serde_json::to_string(&NodeRecord::leaf(["a"])).unwrap();
        assert_eq!(json, r#"{"fields":["a"],"child":null,"sibling":null}"#);

        let parsed: NodeRecord =
            serde_json::from_str(r#"{"fields":["a"],"child":null,"sibling":null}"#).unwrap();
        assert!(!parsed.collapsed);
    }

    #[test]
    fn long_sibling_chains_convert_without_recursion() {
        let mut outline = Outline::new(["0"]);
        let mut last = outline.root();
        for index in 1..20_000 {
            last = outline.insert_sibling(last, [index.to_string()]).unwrap();
        }
        let record = outline.to_record();
        let copy = Outline::from_record(record).unwrap();
        assert_eq!(copy.len(), 20_000);
        assert_eq!(copy.visible_len(), 20_000);
    }

    proptest! {
        #[test]
        fn arbitrary_chains_round_trip(
            rows in prop::collection::vec((0usize..3, prop::collection::vec("[a-z ]{0,4}", 0..4)), 1..30),
        ) {
            let mut outline = Outline::new(["root"]);
            let mut last = outline.root();
            for (shape, fields) in rows {
                last = match shape {
                    0 => outline.insert_child(last, fields).unwrap(),
                    1 => outline.insert_sibling(last, fields).unwrap(),
                    _ => outline.append_child(outline.root(), fields).unwrap(),
                };
            }
            let copy = Outline::from_record(outline.to_record()).unwrap();
            prop_assert_eq!(copy.to_string(), outline.to_string());
            prop_assert!(copy == outline);
        }
    }
}
