//! A bounding volume hierarchy over static entities,
//! used to find the geometry a kinetic box may be touching.

use std::collections::HashMap;

use glam::Vec2;
use log::{debug, warn};

use crate::{
    core::{
        collidable::{entity_key, inspect, EntityHandle},
        types::Rect,
    },
    error::Result,
    utils::arena::{Arena, NodeId},
};

//
// Internal types
//

/// Node bounds kept as corners so that unions are exact and a branch never
/// rounds below one of its children.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Envelope {
    min: Vec2,
    max: Vec2,
}

impl Envelope {
    fn from_rect(rect: &Rect) -> Self {
        Self {
            min: rect.min(),
            max: rect.max(),
        }
    }

    fn union(&self, other: &Envelope) -> Envelope {
        Envelope {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    fn area(&self) -> f32 {
        let size = self.max - self.min;
        size.x * size.y
    }

    /// Same strict overlap rule as [`Rect::intersects`].
    fn intersects(&self, rect: &Rect) -> bool {
        self.min.x < rect.right()
            && rect.left() < self.max.x
            && self.min.y < rect.bottom()
            && rect.top() < self.max.y
    }

    #[cfg(test)]
    fn contains(&self, other: &Envelope) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    fn to_rect(self) -> Rect {
        Rect::from_min_max(self.min, self.max)
    }
}

struct Node {
    bounds: Envelope,
    parent: Option<NodeId>,
    kind: NodeKind,
}

enum NodeKind {
    Branch { left: NodeId, right: NodeId },
    Leaf { entity: EntityHandle },
}

//
// Tree
//

/// Incrementally built binary AABB tree.
///
/// Leaves cache the boundary their entity reported on insertion; static
/// geometry is expected to stay put while registered. Inserting the same
/// handle twice creates two leaves, and removal takes out the oldest one.
#[derive(Default)]
pub struct BoundingVolumeTree {
    nodes: Arena<Node>,
    root: Option<NodeId>,
    /// Leaves of each entity, oldest first, keyed by handle address.
    leaves: HashMap<usize, Vec<NodeId>>,
    leaf_count: usize,
}

impl BoundingVolumeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `entity` under its current boundary.
    ///
    /// Returns `Ok(false)` when the boundary is not finite or has a negative
    /// extent, since such a box cannot take part in envelope unions.
    pub fn add(&mut self, entity: &EntityHandle) -> Result<bool> {
        let bounds = inspect(entity, |e| e.boundary())?;
        if !bounds.is_valid() {
            warn!("rejecting static entity with unusable boundary {bounds:?}");
            return Ok(false);
        }

        let envelope = Envelope::from_rect(&bounds);
        let leaf = self.nodes.insert(Node {
            bounds: envelope,
            parent: None,
            kind: NodeKind::Leaf {
                entity: entity.clone(),
            },
        });
        self.leaves.entry(entity_key(entity)).or_default().push(leaf);
        self.leaf_count += 1;
        self.attach_leaf(leaf, envelope);
        Ok(true)
    }

    /// Removes the oldest leaf holding `entity`.
    pub fn remove(&mut self, entity: &EntityHandle) -> bool {
        let key = entity_key(entity);
        let Some(ids) = self.leaves.get_mut(&key) else {
            return false;
        };
        if ids.is_empty() {
            self.leaves.remove(&key);
            return false;
        }

        let leaf = ids.remove(0);
        if ids.is_empty() {
            self.leaves.remove(&key);
        }
        self.leaf_count -= 1;
        self.detach_leaf(leaf);
        true
    }

    pub fn contains(&self, entity: &EntityHandle) -> bool {
        self.leaves.contains_key(&entity_key(entity))
    }

    /// Number of indexed leaves, duplicates included.
    pub fn count(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    pub fn clear(&mut self) {
        if self.leaf_count > 0 {
            debug!("clearing {} static entities from the tree", self.leaf_count);
        }
        self.nodes.clear();
        self.leaves.clear();
        self.root = None;
        self.leaf_count = 0;
    }

    /// Every indexed entity whose cached boundary overlaps `area`.
    pub fn query(&self, area: &Rect) -> Vec<EntityHandle> {
        let mut hits = Vec::new();
        self.visit_overlaps(area, |entity| hits.push(entity.clone()));
        hits
    }

    /// Calls `visit` for each overlapping leaf without collecting them.
    ///
    /// Subtrees whose envelope misses `area` are never entered.
    pub fn visit_overlaps(&self, area: &Rect, mut visit: impl FnMut(&EntityHandle)) {
        let Some(root) = self.root else {
            return;
        };

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.bounds.intersects(area) {
                continue;
            }
            match &node.kind {
                NodeKind::Branch { left, right } => {
                    stack.push(*right);
                    stack.push(*left);
                }
                NodeKind::Leaf { entity } => visit(entity),
            }
        }
    }

    /// One entry per leaf, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityHandle> + '_ {
        self.nodes.iter().filter_map(|(_, node)| match &node.kind {
            NodeKind::Leaf { entity } => Some(entity),
            NodeKind::Branch { .. } => None,
        })
    }

    /// Envelope of everything in the tree.
    pub fn bounds(&self) -> Option<Rect> {
        self.root.map(|root| self.nodes[root].bounds.to_rect())
    }

    /// Height of the tree; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };

        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let NodeKind::Branch { left, right } = &self.nodes[id].kind {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        deepest
    }

    fn attach_leaf(&mut self, leaf: NodeId, bounds: Envelope) {
        let Some(root) = self.root else {
            self.root = Some(leaf);
            return;
        };

        // descend into whichever child ends up with the smaller envelope once the new box joins it
        let mut sibling = root;
        while let NodeKind::Branch { left, right } = &self.nodes[sibling].kind {
            let left_union = self.nodes[*left].bounds.union(&bounds);
            let right_union = self.nodes[*right].bounds.union(&bounds);
            sibling = if left_union.area() <= right_union.area() {
                *left
            } else {
                *right
            };
        }

        // replace the sibling leaf with a branch holding both leaves
        let old_parent = self.nodes[sibling].parent;
        let branch_bounds = self.nodes[sibling].bounds.union(&bounds);
        let branch = self.nodes.insert(Node {
            bounds: branch_bounds,
            parent: old_parent,
            kind: NodeKind::Branch {
                left: sibling,
                right: leaf,
            },
        });
        self.nodes[sibling].parent = Some(branch);
        self.nodes[leaf].parent = Some(branch);

        match old_parent {
            Some(parent) => {
                self.replace_child(parent, sibling, branch);
                self.refit_from(parent);
            }
            None => self.root = Some(branch),
        }
    }

    fn detach_leaf(&mut self, leaf: NodeId) {
        let parent = self.nodes[leaf].parent;
        self.nodes.remove(leaf);

        let Some(parent) = parent else {
            self.root = None;
            return;
        };

        // a branch never outlives one of its children: promote the sibling into its place
        let sibling = match &self.nodes[parent].kind {
            NodeKind::Branch { left, right } => {
                if *left == leaf {
                    *right
                } else {
                    *left
                }
            }
            NodeKind::Leaf { .. } => unreachable!("leaf recorded as a parent"),
        };
        let grandparent = self.nodes[parent].parent;
        self.nodes.remove(parent);
        self.nodes[sibling].parent = grandparent;

        match grandparent {
            Some(grandparent) => {
                self.replace_child(grandparent, parent, sibling);
                self.refit_from(grandparent);
            }
            None => self.root = Some(sibling),
        }
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if let NodeKind::Branch { left, right } = &mut self.nodes[parent].kind {
            if *left == old {
                *left = new;
            } else if *right == old {
                *right = new;
            }
        }
    }

    /// Recomputes branch envelopes from `start` up to the root.
    fn refit_from(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(id) = current {
            if let NodeKind::Branch { left, right } = &self.nodes[id].kind {
                let bounds = self.nodes[*left].bounds.union(&self.nodes[*right].bounds);
                self.nodes[id].bounds = bounds;
            }
            current = self.nodes[id].parent;
        }
    }
}

impl std::fmt::Debug for BoundingVolumeTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundingVolumeTree")
            .field("leaves", &self.leaf_count)
            .field("depth", &self.depth())
            .field("bounds", &self.bounds())
            .finish()
    }
}
