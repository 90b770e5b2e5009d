//! Call tree construction.
//!
//! Each [`CallEdge`] is one distinct call-site: a (parent edge, operation)
//! pair. Calling the same operation again from the same parent reuses the
//! existing edge and bumps its invocation count.
//!
//! Edges live in an arena owned by [`CallTree`]. A parent refers to its
//! children by arena slot and a child points back at its parent the same
//! way, so there is no reference-counted cycle.

use super::operation::OperationKey;
use crate::utils::config::{FIRST_EDGE_ID, ROOT_EDGE_ID};
use log::debug;
use std::hash::{Hash, Hasher};

/// One node of the call tree
#[derive(Debug, Clone)]
pub struct CallEdge {
    id: i64,
    operation: OperationKey,
    parent: Option<usize>,
    invocation_count: u64,
    children: Vec<usize>,
}

impl CallEdge {
    // The root stands for the whole program and is never invoked, so it counts 0
    fn root() -> Self {
        Self {
            invocation_count: 0,
            ..Self::new(ROOT_EDGE_ID, OperationKey::Root, None)
        }
    }

    fn new(id: i64, operation: OperationKey, parent: Option<usize>) -> Self {
        Self {
            id,
            operation,
            parent,
            invocation_count: 1,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn operation(&self) -> &OperationKey {
        &self.operation
    }

    pub fn invocation_count(&self) -> u64 {
        self.invocation_count
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

// Identity is the id alone: two call-sites of the same operation stay distinct
impl PartialEq for CallEdge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CallEdge {}

impl Hash for CallEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Arena-backed call tree rooted at a synthetic `ROOT` edge
#[derive(Debug, Clone)]
pub struct CallTree {
    edges: Vec<CallEdge>,
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CallTree {
    /// Create a tree holding only the root edge (`id = -1`, operation `ROOT`)
    pub fn new() -> Self {
        Self {
            edges: vec![CallEdge::root()],
        }
    }

    pub fn root(&self) -> &CallEdge {
        &self.edges[0]
    }

    /// Look up an edge by id
    pub fn edge(&self, id: i64) -> Option<&CallEdge> {
        self.slot(id).map(|slot| &self.edges[slot])
    }

    pub fn parent(&self, edge: &CallEdge) -> Option<&CallEdge> {
        edge.parent.map(|slot| &self.edges[slot])
    }

    pub fn children<'a>(&'a self, edge: &'a CallEdge) -> impl Iterator<Item = &'a CallEdge> + 'a {
        edge.children.iter().map(move |&slot| &self.edges[slot])
    }

    /// Find the child of `parent_id` that calls `operation`, if any
    pub fn find_child(&self, parent_id: i64, operation: &OperationKey) -> Option<&CallEdge> {
        let parent = self.edge(parent_id)?;
        self.children(parent).find(|child| child.operation == *operation)
    }

    /// Walk from `id` up to (and including) the root
    pub fn ancestors(&self, id: i64) -> impl Iterator<Item = &CallEdge> + '_ {
        let mut next = self.slot(id);
        std::iter::from_fn(move || {
            let slot = next?;
            let edge = &self.edges[slot];
            next = edge.parent;
            Some(edge)
        })
    }

    /// All edges in creation order, root first
    pub fn iter(&self) -> impl Iterator<Item = &CallEdge> {
        self.edges.iter()
    }

    /// Number of edges, root included
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// A tree always holds its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Record a call to `operation` from `parent_id`.
    ///
    /// Returns the id of the child edge and whether it was newly created.
    /// A new edge takes `next_id`; an existing edge has its invocation
    /// count incremented instead. Returns `None` if `parent_id` is unknown,
    /// or if a new edge is needed and `next_id` is not the next dense id.
    pub fn add_or_get_child(
        &mut self,
        parent_id: i64,
        operation: OperationKey,
        next_id: i64,
    ) -> Option<(i64, bool)> {
        let parent_slot = self.slot(parent_id)?;

        let existing = self.edges[parent_slot]
            .children
            .iter()
            .copied()
            .find(|&slot| self.edges[slot].operation == operation);

        if let Some(slot) = existing {
            let child = &mut self.edges[slot];
            child.invocation_count += 1;
            return Some((child.id, false));
        }

        // Ids are handed out densely, so an edge's slot is its id
        if next_id != self.edges.len() as i64 {
            return None;
        }
        debug!("New call edge {}: {} -> {}", next_id, self.edges[parent_slot].operation, operation);

        let slot = self.edges.len();
        self.edges.push(CallEdge::new(next_id, operation, Some(parent_slot)));
        self.edges[parent_slot].children.push(slot);
        Some((next_id, true))
    }

    fn slot(&self, id: i64) -> Option<usize> {
        let slot = if id == ROOT_EDGE_ID {
            0
        } else if id >= FIRST_EDGE_ID {
            usize::try_from(id).ok()?
        } else {
            return None;
        };
        self.edges.get(slot).filter(|edge| edge.id == id).map(|_| slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callgraph::operation::Variant;

    fn op(name: &str) -> OperationKey {
        OperationKey::new(name, Variant::Body)
    }

    #[test]
    fn test_new_tree_has_root() {
        let tree = CallTree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().id(), ROOT_EDGE_ID);
        assert!(tree.root().operation().is_root());
        assert!(tree.parent(tree.root()).is_none());
        assert_eq!(tree.root().invocation_count(), 0);
    }

    #[test]
    fn test_repeated_call_reuses_edge() {
        let mut tree = CallTree::new();

        let (first, created) = tree.add_or_get_child(ROOT_EDGE_ID, op("A"), 1).unwrap();
        assert!(created);
        let (second, created) = tree.add_or_get_child(ROOT_EDGE_ID, op("A"), 2).unwrap();
        assert!(!created);

        assert_eq!(first, second);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.edge(first).unwrap().invocation_count(), 2);
    }

    #[test]
    fn test_same_operation_under_different_parents() {
        let mut tree = CallTree::new();
        let (a, _) = tree.add_or_get_child(ROOT_EDGE_ID, op("A"), 1).unwrap();
        let (c, _) = tree.add_or_get_child(ROOT_EDGE_ID, op("C"), 2).unwrap();
        let (b_under_a, _) = tree.add_or_get_child(a, op("B"), 3).unwrap();
        let (b_under_c, _) = tree.add_or_get_child(c, op("B"), 4).unwrap();

        assert_ne!(b_under_a, b_under_c);
        assert_ne!(tree.edge(b_under_a), tree.edge(b_under_c));
        assert_eq!(tree.parent(tree.edge(b_under_c).unwrap()).unwrap().id(), c);
    }

    #[test]
    fn test_ancestors_end_at_root() {
        let mut tree = CallTree::new();
        let (a, _) = tree.add_or_get_child(ROOT_EDGE_ID, op("A"), 1).unwrap();
        let (b, _) = tree.add_or_get_child(a, op("B"), 2).unwrap();

        let path: Vec<i64> = tree.ancestors(b).map(|e| e.id()).collect();
        assert_eq!(path, vec![b, a, ROOT_EDGE_ID]);
    }

    #[test]
    fn test_unknown_ids() {
        let mut tree = CallTree::new();
        assert!(tree.edge(0).is_none());
        assert!(tree.edge(7).is_none());
        assert!(tree.add_or_get_child(42, op("A"), 1).is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut tree = CallTree::new();
        tree.add_or_get_child(ROOT_EDGE_ID, op("A"), 1).unwrap();
        let snapshot = tree.clone();

        tree.add_or_get_child(ROOT_EDGE_ID, op("A"), 2).unwrap();

        assert_eq!(snapshot.edge(1).unwrap().invocation_count(), 1);
        assert_eq!(tree.edge(1).unwrap().invocation_count(), 2);
    }
}
