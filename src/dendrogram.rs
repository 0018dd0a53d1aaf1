//! # Dendrogram structures
//!
//! Read-only view of the hierarchical decomposition produced upstream (a dendrogram of a
//! position-position-velocity cube). Each [`StructureNode`] owns its children; a
//! [`Dendrogram`] is a forest of such trees whose ids are unique across the whole forest.
//!
//! ## Vocabulary
//! -----------------
//! - **Trunk**: a root of the forest.
//! - **Leaf**: a node without children.
//! - **Merger**: a node with two or more children, i.e. the lowest point where distinct
//!   substructures join.
//!
//! ## Construction
//! -----------------
//! Trees are either built directly from nested [`StructureNode::branch`] / [`StructureNode::leaf`]
//! values, or from flat `(id, parent)` links with [`DendrogramBuilder`]:
//!
//! ```rust
//! use kdist::dendrogram::DendrogramBuilder;
//!
//! let dendrogram = DendrogramBuilder::new()
//!     .trunk(3)
//!     .child(1, 3)
//!     .child(2, 3)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(dendrogram.len(), 3);
//! assert!(dendrogram.get(3).unwrap().is_merger());
//! ```
use std::collections::{HashMap, HashSet};

use crate::{constants::StructureId, kdist_errors::KdistError};

/// One node of the hierarchical decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureNode {
    id: StructureId,
    children: Vec<StructureNode>,
}

impl StructureNode {
    pub fn leaf(id: StructureId) -> Self {
        StructureNode {
            id,
            children: Vec::new(),
        }
    }

    pub fn branch(id: StructureId, children: Vec<StructureNode>) -> Self {
        StructureNode { id, children }
    }

    pub fn id(&self) -> StructureId {
        self.id
    }

    pub fn children(&self) -> &[StructureNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `true` when at least two lineages join at this node.
    pub fn is_merger(&self) -> bool {
        self.children.len() >= 2
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order, depth-first iterator over structure nodes.
///
/// Uses an explicit stack so arbitrarily deep trees do not grow the call stack.
pub struct Descendants<'a> {
    stack: Vec<&'a StructureNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a StructureNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Forest of structure trees with globally unique ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dendrogram {
    trunks: Vec<StructureNode>,
}

impl Dendrogram {
    /// Build a dendrogram from its trunks.
    ///
    /// Return
    /// ----------
    /// * [`KdistError::DuplicateStructureId`] if an id appears twice anywhere in the forest.
    pub fn new(trunks: Vec<StructureNode>) -> Result<Self, KdistError> {
        let dendrogram = Dendrogram { trunks };
        let mut seen = HashSet::with_capacity(dendrogram.len());
        for node in dendrogram.iter() {
            if !seen.insert(node.id) {
                return Err(KdistError::DuplicateStructureId(node.id));
            }
        }
        Ok(dendrogram)
    }

    pub fn trunks(&self) -> &[StructureNode] {
        &self.trunks
    }

    /// Every node of the forest, trunk by trunk, in pre-order.
    pub fn iter(&self) -> Descendants<'_> {
        Descendants {
            stack: self.trunks.iter().rev().collect(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = StructureId> + '_ {
        self.iter().map(StructureNode::id)
    }

    pub fn get(&self, id: StructureId) -> Option<&StructureNode> {
        self.iter().find(|node| node.id == id)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.trunks.is_empty()
    }
}

/// Builds a [`Dendrogram`] from flat `(id, parent)` links.
///
/// Children keep the order in which they were declared.
#[derive(Debug, Clone, Default)]
pub struct DendrogramBuilder {
    links: Vec<(StructureId, Option<StructureId>)>,
}

impl DendrogramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a root structure.
    pub fn trunk(mut self, id: StructureId) -> Self {
        self.links.push((id, None));
        self
    }

    /// Declare `id` as a child of `parent`. The parent may be declared later.
    pub fn child(mut self, id: StructureId, parent: StructureId) -> Self {
        self.links.push((id, Some(parent)));
        self
    }

    /// Assemble the forest.
    ///
    /// Return
    /// ----------
    /// * [`KdistError::DuplicateStructureId`] if an id is declared twice.
    /// * [`KdistError::InvalidStructureTree`] if a parent is never declared or if some
    ///   structures are unreachable from any trunk (a cycle).
    pub fn build(self) -> Result<Dendrogram, KdistError> {
        let mut declared = HashSet::with_capacity(self.links.len());
        for (id, _) in &self.links {
            if !declared.insert(*id) {
                return Err(KdistError::DuplicateStructureId(*id));
            }
        }

        let mut children_of: HashMap<StructureId, Vec<StructureId>> = HashMap::new();
        let mut trunk_ids = Vec::new();
        for (id, parent) in &self.links {
            match parent {
                None => trunk_ids.push(*id),
                Some(p) if !declared.contains(p) => {
                    return Err(KdistError::InvalidStructureTree(format!(
                        "structure {id} has undeclared parent {p}"
                    )))
                }
                Some(p) => children_of.entry(*p).or_default().push(*id),
            }
        }

        // pre-order walk from the trunks, then children are built before their parents
        let mut order = Vec::with_capacity(declared.len());
        let mut stack = trunk_ids.clone();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(children) = children_of.get(&id) {
                stack.extend(children.iter().copied());
            }
        }

        let mut built: HashMap<StructureId, StructureNode> = HashMap::with_capacity(order.len());
        for id in order.into_iter().rev() {
            let children = children_of
                .get(&id)
                .map(|ids| ids.iter().filter_map(|c| built.remove(c)).collect())
                .unwrap_or_default();
            built.insert(id, StructureNode::branch(id, children));
        }

        let trunks: Vec<StructureNode> = trunk_ids
            .iter()
            .filter_map(|id| built.remove(id))
            .collect();

        let dendrogram = Dendrogram { trunks };
        let reached = dendrogram.len();
        if reached != declared.len() {
            return Err(KdistError::InvalidStructureTree(format!(
                "{} structures are not reachable from a trunk",
                declared.len() - reached
            )));
        }
        Ok(dendrogram)
    }
}
