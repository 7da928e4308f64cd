// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Outline forest stored in an arena.
//!
//! Nodes are addressed by [`NodeId`]. Each node links to its first child and to its next sibling;
//! every node of one sibling chain has the same level and shares one [`ColumnSet`]. The head of
//! the level 0 chain is the document root.
//!
//! Traversals use an explicit stack, so neither long sibling chains nor deep nesting recurse.
//! Structural edits validate their preconditions before touching any node.

use std::fmt;

use slotmap::{new_key_type, SlotMap};
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use crate::logging::targets;

use super::column::ColumnSet;
use super::direction::Lateral;
use super::row::{byte_offset, text_width, Row, RowError, TAB_WIDTH};

new_key_type! {
    pub struct NodeId;
}

/// Columns of indentation per level.
pub const INDENT_WIDTH: usize = 4;

type NodeStack = SmallVec<[NodeId; 16]>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("node {0:?} is not part of this outline")]
    UnknownNode(NodeId),
    #[error("visible offset {offset} is out of range ({count} visible rows)")]
    OutOfRange { offset: usize, count: usize },
    #[error("{prev:?} is not the previous sibling of {node:?}")]
    NotPreviousSibling { node: NodeId, prev: NodeId },
    #[error("{node:?} is not a child of {parent:?}")]
    NotChildOf { node: NodeId, parent: NodeId },
    #[error("only level 0 rows can be combined upward (row is at level {level})")]
    NotRootLevel { level: usize },
    #[error("the first row has no previous row to combine into")]
    NoPreviousRow,
    #[error("{node:?} has no next sibling")]
    NoSibling { node: NodeId },
    #[error("field {index} has no neighbor to the {direction}")]
    NoNeighborField { index: usize, direction: Lateral },
    #[error(transparent)]
    Row(#[from] RowError),
}

/// One outline line.
#[derive(Debug)]
pub struct OutlineNode {
    row: Row,
    child: Option<NodeId>,
    sibling: Option<NodeId>,
    level: usize,
    collapsed: bool,
}

impl OutlineNode {
    fn new<I, S>(columns: ColumnSet, fields: I, level: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row = Row::new(columns, fields);
        if row.is_empty() {
            row.append("");
        }
        Self {
            row,
            child: None,
            sibling: None,
            level,
            collapsed: false,
        }
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    pub fn sibling(&self) -> Option<NodeId> {
        self.sibling
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn has_child(&self) -> bool {
        self.child.is_some()
    }

    pub fn num_fields(&self) -> usize {
        self.row.len()
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.row.field(index)
    }

    pub fn fields(&self) -> &[String] {
        self.row.fields()
    }

    pub fn padding_len(&self, index: usize) -> Option<usize> {
        self.row.padding_len(index)
    }

    pub fn padded_field(&self, index: usize) -> Option<String> {
        self.row.padded_field(index)
    }

    /// Padded width of field `index`, the last field included.
    pub fn column_width(&self, index: usize) -> Option<usize> {
        (index < self.row.len()).then(|| self.row.columns().width(index) + TAB_WIDTH)
    }

    pub fn indent_width(&self) -> usize {
        self.level * INDENT_WIDTH
    }

    pub fn line_width(&self) -> usize {
        self.indent_width() + self.row.width()
    }

    /// Field containing virtual column `x`; the last field when `x` is past the end.
    pub fn field_index_at(&self, x: usize) -> usize {
        self.locate(x).0
    }

    /// Offset of `x` inside its field. Positions in a field's padding lie past its text.
    pub fn index_in_field(&self, x: usize) -> usize {
        self.locate(x).1
    }

    pub fn field_start(&self, index: usize) -> Option<usize> {
        if index >= self.row.len() {
            return None;
        }
        let preceding: usize = (0..index)
            .filter_map(|earlier| self.row.rendered_len(earlier))
            .sum();
        Some(self.indent_width() + preceding)
    }

    /// Left or right edge of the text of field `index`.
    pub fn field_end(&self, index: usize, direction: Lateral) -> Option<usize> {
        let start = self.field_start(index)?;
        match direction {
            Lateral::Left => Some(start),
            Lateral::Right => Some(start + text_width(self.row.field(index)?)),
        }
    }

    pub fn selected_field_end(&self, x: usize, direction: Lateral) -> usize {
        self.field_end(self.field_index_at(x), direction)
            .unwrap_or_else(|| self.indent_width())
    }

    fn locate(&self, x: usize) -> (usize, usize) {
        let count = self.row.len();
        let mut offset = x.saturating_sub(self.indent_width());
        for index in 0..count {
            let rendered = self.row.rendered_len(index).unwrap_or(0);
            if index + 1 == count {
                return (index, offset.min(rendered));
            }
            if offset < rendered {
                return (index, offset);
            }
            offset -= rendered;
        }
        (0, 0)
    }

    fn field_text(&self, index: usize) -> Result<&str, RowError> {
        self.row.field(index).ok_or(RowError::IndexOutOfRange {
            index,
            len: self.row.len(),
        })
    }
}

/// A document: a forest of [`OutlineNode`]s whose first level 0 node is the root.
#[derive(Debug)]
pub struct Outline {
    nodes: SlotMap<NodeId, OutlineNode>,
    root: NodeId,
}

impl Outline {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(OutlineNode::new(ColumnSet::new(), fields, 0));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, collapsed subtrees included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&OutlineNode> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&OutlineNode, OutlineError> {
        self.nodes.get(id).ok_or(OutlineError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut OutlineNode, OutlineError> {
        self.nodes.get_mut(id).ok_or(OutlineError::UnknownNode(id))
    }

    pub fn child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.child)
    }

    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.sibling)
    }

    pub fn level(&self, id: NodeId) -> Option<usize> {
        self.nodes.get(id).map(|node| node.level)
    }

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.collapsed)
    }

    pub fn has_child(&self, id: NodeId) -> bool {
        self.child(id).is_some()
    }

    pub fn last_sibling(&self, id: NodeId) -> Result<NodeId, OutlineError> {
        let mut current = id;
        while let Some(next) = self.node(current)?.sibling {
            current = next;
        }
        Ok(current)
    }

    pub fn last_child(&self, id: NodeId) -> Result<Option<NodeId>, OutlineError> {
        self.node(id)?
            .child
            .map(|first| self.last_sibling(first))
            .transpose()
    }

    /// Visible pre-order walk of the whole document.
    pub fn iter(&self) -> PreOrder<'_> {
        self.iter_from(self.root)
    }

    /// Visible pre-order walk starting at `id` and continuing through its later siblings.
    pub fn iter_from(&self, id: NodeId) -> PreOrder<'_> {
        PreOrder {
            outline: self,
            stack: smallvec![id],
            skip_collapsed: true,
        }
    }

    /// Pre-order walk of every node, ignoring collapse state.
    pub fn iter_all(&self) -> PreOrder<'_> {
        PreOrder {
            outline: self,
            stack: smallvec![self.root],
            skip_collapsed: false,
        }
    }

    /// Rows visible from `id`: itself, its expanded descendants and its later siblings.
    ///
    /// Unknown ids count as zero rows.
    pub fn count_visible(&self, id: NodeId) -> usize {
        self.iter_from(id).count()
    }

    pub fn visible_len(&self) -> usize {
        self.count_visible(self.root)
    }

    /// Node at the visible pre-order `offset` of the whole document.
    pub fn node_at(&self, offset: usize) -> Result<NodeId, OutlineError> {
        self.node_at_from(self.root, offset)
    }

    pub fn node_at_from(&self, id: NodeId, offset: usize) -> Result<NodeId, OutlineError> {
        self.iter_from(id)
            .nth(offset)
            .ok_or_else(|| OutlineError::OutOfRange {
                offset,
                count: self.count_visible(id),
            })
    }

    pub fn insert_sibling<I, S>(&mut self, id: NodeId, fields: I) -> Result<NodeId, OutlineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let anchor = self.node(id)?;
        let mut node = OutlineNode::new(anchor.row.columns().clone(), fields, anchor.level);
        node.sibling = anchor.sibling;
        let inserted = self.nodes.insert(node);
        self.node_mut(id)?.sibling = Some(inserted);
        Ok(inserted)
    }

    /// Inserts a node at the front of `id`'s children.
    pub fn insert_child<I, S>(&mut self, id: NodeId, fields: I) -> Result<NodeId, OutlineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parent = self.node(id)?;
        let level = parent.level + 1;
        let first = parent.child;
        let columns = match first {
            Some(first) => self.node(first)?.row.columns().clone(),
            None => ColumnSet::new(),
        };
        let mut node = OutlineNode::new(columns, fields, level);
        node.sibling = first;
        let inserted = self.nodes.insert(node);
        self.node_mut(id)?.child = Some(inserted);
        Ok(inserted)
    }

    pub fn append_child<I, S>(&mut self, id: NodeId, fields: I) -> Result<NodeId, OutlineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.last_child(id)? {
            Some(last) => self.insert_sibling(last, fields),
            None => self.insert_child(id, fields),
        }
    }

    pub fn toggle_collapsed(&mut self, id: NodeId) -> Result<bool, OutlineError> {
        let node = self.node_mut(id)?;
        node.collapsed = !node.collapsed;
        Ok(node.collapsed)
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> Result<(), OutlineError> {
        self.node_mut(id)?.collapsed = collapsed;
        Ok(())
    }

    /// Moves `id` to the end of `prev`'s children. `id`'s own children stay at their depth and
    /// follow it as siblings.
    pub fn indent(&mut self, id: NodeId, prev: NodeId) -> Result<(), OutlineError> {
        self.node(id)?;
        if self.node(prev)?.sibling != Some(id) {
            return Err(OutlineError::NotPreviousSibling { node: id, prev });
        }
        tracing::trace!(target: targets::OUTLINE, node = ?id, ?prev, "indent");

        let node = self.node_mut(id)?;
        let next = node.sibling.take();
        let children = node.child.take();
        self.node_mut(prev)?.sibling = next;
        self.graft_children(prev, Some(id))?;
        self.graft_after(id, children)
    }

    /// Moves `id` out of `parent`'s children to directly after `parent`. Siblings that followed
    /// `id` become its trailing children.
    pub fn unindent(&mut self, id: NodeId, parent: NodeId) -> Result<(), OutlineError> {
        let predecessor = self.predecessor_in_children(parent, id)?;
        tracing::trace!(target: targets::OUTLINE, node = ?id, ?parent, "unindent");

        let later = self.node_mut(id)?.sibling.take();
        match predecessor {
            Some(predecessor) => self.node_mut(predecessor)?.sibling = None,
            None => self.node_mut(parent)?.child = None,
        }

        let (level, columns, after_parent) = {
            let parent_node = self.node(parent)?;
            (
                parent_node.level,
                parent_node.row.columns().clone(),
                parent_node.sibling,
            )
        };
        self.node_mut(parent)?.sibling = Some(id);
        self.node_mut(id)?.sibling = after_parent;
        self.set_subtree_level(id, level)?;
        self.node_mut(id)?.row.rebind(columns)?;

        self.graft_children(id, later)
    }

    /// Moves every field from the one containing `x` onward into a new sibling right after `id`,
    /// which also takes over `id`'s children. Returns the new node.
    pub fn split(&mut self, id: NodeId, x: usize) -> Result<NodeId, OutlineError> {
        let index = self.node(id)?.field_index_at(x);
        tracing::trace!(target: targets::OUTLINE, node = ?id, x, index, "split");

        let node = self.node_mut(id)?;
        let moved = node.row.split_off(index)?;
        if node.row.is_empty() {
            node.row.append("");
        }
        let children = node.child.take();

        let inserted = self.insert_sibling(id, moved)?;
        self.node_mut(inserted)?.child = children;
        Ok(inserted)
    }

    /// Appends the fields of level 0 node `id` onto `prev_visible` and unlinks `id` from after
    /// `prev_sibling`, which adopts the children of `id` as trailing children.
    pub fn combine(
        &mut self,
        id: NodeId,
        prev_visible: NodeId,
        prev_sibling: Option<NodeId>,
    ) -> Result<(), OutlineError> {
        let level = self.node(id)?.level;
        if level != 0 {
            return Err(OutlineError::NotRootLevel { level });
        }
        let Some(prev_sibling) = prev_sibling else {
            return Err(OutlineError::NoPreviousRow);
        };
        if self.node(prev_sibling)?.sibling != Some(id) {
            return Err(OutlineError::NotPreviousSibling {
                node: id,
                prev: prev_sibling,
            });
        }
        if prev_visible == id {
            return Err(OutlineError::NoPreviousRow);
        }
        self.node(prev_visible)?;
        tracing::trace!(target: targets::OUTLINE, node = ?id, ?prev_visible, ?prev_sibling, "combine");

        let fields = self.node(id)?.fields().to_vec();
        let target = self.node_mut(prev_visible)?;
        for field in fields {
            target.row.append(field);
        }
        self.delete_sibling(prev_sibling)
    }

    /// Unlinks the sibling after `id`; its children become trailing children of `id`.
    pub fn delete_sibling(&mut self, id: NodeId) -> Result<(), OutlineError> {
        let target = self
            .node(id)?
            .sibling
            .ok_or(OutlineError::NoSibling { node: id })?;
        tracing::trace!(target: targets::OUTLINE, node = ?id, removed = ?target, "delete sibling");

        let removed = self
            .nodes
            .remove(target)
            .ok_or(OutlineError::UnknownNode(target))?;
        self.node_mut(id)?.sibling = removed.sibling;
        let children = removed.child;
        drop(removed);
        self.graft_children(id, children)
    }

    /// Splits the field containing `x` at the cursor offset into two adjacent fields.
    pub fn split_field(&mut self, id: NodeId, x: usize) -> Result<(), OutlineError> {
        let node = self.node(id)?;
        let (index, offset) = node.locate(x);
        let text = node.field_text(index)?;
        let at = byte_offset(text, offset);
        let (head, tail) = (text[..at].to_owned(), text[at..].to_owned());
        tracing::trace!(target: targets::OUTLINE, node = ?id, index, offset, "split field");

        let row = &mut self.node_mut(id)?.row;
        row.replace(index, head)?;
        row.insert(index + 1, tail)?;
        Ok(())
    }

    /// Merges the field containing `x` with its neighbor in `direction`.
    pub fn combine_fields(
        &mut self,
        id: NodeId,
        x: usize,
        direction: Lateral,
    ) -> Result<(), OutlineError> {
        let node = self.node(id)?;
        let index = node.field_index_at(x);
        let (left, right) = match direction {
            Lateral::Left if index > 0 => (index - 1, index),
            Lateral::Right if index + 1 < node.num_fields() => (index, index + 1),
            _ => return Err(OutlineError::NoNeighborField { index, direction }),
        };
        let merged = format!("{}{}", node.field_text(left)?, node.field_text(right)?);
        tracing::trace!(target: targets::OUTLINE, node = ?id, left, right, "combine fields");

        let row = &mut self.node_mut(id)?.row;
        row.replace(left, merged)?;
        row.delete(right)?;
        Ok(())
    }

    /// Inserts `text` at virtual column `x`.
    pub fn insert_text(&mut self, id: NodeId, x: usize, text: &str) -> Result<(), OutlineError> {
        let node = self.node(id)?;
        let (index, offset) = node.locate(x);
        let field = node.field_text(index)?;
        let at = byte_offset(field, offset);
        let mut updated = String::with_capacity(field.len() + text.len());
        updated.push_str(&field[..at]);
        updated.push_str(text);
        updated.push_str(&field[at..]);

        self.node_mut(id)?.row.replace(index, updated)?;
        Ok(())
    }

    /// Removes the character at virtual column `x`; positions past the field text remove nothing.
    pub fn delete_char_at(&mut self, id: NodeId, x: usize) -> Result<Option<char>, OutlineError> {
        let node = self.node(id)?;
        let (index, offset) = node.locate(x);
        let field = node.field_text(index)?;
        if offset >= text_width(field) {
            return Ok(None);
        }
        let mut updated = field.to_owned();
        let removed = updated.remove(byte_offset(field, offset));

        self.node_mut(id)?.row.replace(index, updated)?;
        Ok(Some(removed))
    }

    fn predecessor_in_children(
        &self,
        parent: NodeId,
        id: NodeId,
    ) -> Result<Option<NodeId>, OutlineError> {
        let mut previous = None;
        let mut current = self.node(parent)?.child;
        while let Some(candidate) = current {
            if candidate == id {
                return Ok(previous);
            }
            previous = Some(candidate);
            current = self.node(candidate)?.sibling;
        }
        Err(OutlineError::NotChildOf { node: id, parent })
    }

    fn chain(&self, head: NodeId) -> Result<Vec<NodeId>, OutlineError> {
        let mut chain = Vec::new();
        let mut current = Some(head);
        while let Some(id) = current {
            chain.push(id);
            current = self.node(id)?.sibling;
        }
        Ok(chain)
    }

    /// Links the chain starting at `head` directly after `anchor`, adopting its level and columns.
    fn graft_after(&mut self, anchor: NodeId, head: Option<NodeId>) -> Result<(), OutlineError> {
        let Some(head) = head else {
            return Ok(());
        };
        let chain = self.chain(head)?;
        let (level, columns, next) = {
            let anchor_node = self.node(anchor)?;
            (
                anchor_node.level,
                anchor_node.row.columns().clone(),
                anchor_node.sibling,
            )
        };
        if let Some(&tail) = chain.last() {
            self.node_mut(tail)?.sibling = next;
        }
        self.node_mut(anchor)?.sibling = Some(head);
        self.adopt(&chain, level, &columns)
    }

    /// Appends the chain starting at `head` to `parent`'s children.
    fn graft_children(&mut self, parent: NodeId, head: Option<NodeId>) -> Result<(), OutlineError> {
        let Some(head) = head else {
            return Ok(());
        };
        if let Some(last) = self.last_child(parent)? {
            return self.graft_after(last, Some(head));
        }
        let level = self.node(parent)?.level + 1;
        self.node_mut(parent)?.child = Some(head);
        let chain = self.chain(head)?;
        self.adopt(&chain, level, &ColumnSet::new())
    }

    fn adopt(
        &mut self,
        chain: &[NodeId],
        level: usize,
        columns: &ColumnSet,
    ) -> Result<(), OutlineError> {
        for &id in chain {
            self.set_subtree_level(id, level)?;
            self.node_mut(id)?.row.rebind(columns.clone())?;
        }
        Ok(())
    }

    /// Moves `id` to `level`, shifting its descendants by the same amount.
    fn set_subtree_level(&mut self, id: NodeId, level: usize) -> Result<(), OutlineError> {
        let current = self.node(id)?.level;
        if current == level {
            return Ok(());
        }
        let node = self.node_mut(id)?;
        node.level = level;
        let mut stack: NodeStack = node.child.into_iter().collect();
        while let Some(next) = stack.pop() {
            let node = self.node_mut(next)?;
            node.level = level + (node.level - current);
            stack.extend(node.sibling);
            stack.extend(node.child);
        }
        Ok(())
    }
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.iter_all() {
            let Some(node) = self.get(id) else {
                continue;
            };
            write!(f, "{:width$}", "", width = node.indent_width())?;
            for field in node.row() {
                f.write_str(&field)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl PartialEq for Outline {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.iter_all();
        let mut right = other.iter_all();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    let (Some(a), Some(b)) = (self.get(a), other.get(b)) else {
                        return false;
                    };
                    if a.level != b.level
                        || a.collapsed != b.collapsed
                        || a.child.is_some() != b.child.is_some()
                        || a.sibling.is_some() != b.sibling.is_some()
                        || a.row != b.row
                    {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

/// Depth-first pre-order walk driven by an explicit stack.
///
/// The stack holds at most one pending sibling per depth, so its size is bounded by the depth of
/// the tree.
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    outline: &'a Outline,
    stack: NodeStack,
    skip_collapsed: bool,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(node) = self.outline.nodes.get(id) else {
                continue;
            };
            self.stack.extend(node.sibling);
            if !(self.skip_collapsed && node.collapsed) {
                self.stack.extend(node.child);
            }
            return Some(id);
        }
        None
    }
}

#[cfg(test)]
mod tests;
