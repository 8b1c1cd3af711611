//! Sampling-tree storage.

use crate::core::{Point2D, Pose2D};

/// A sampled configuration in an RRT.
///
/// `parent` indexes into the owning tree's node arena (or, for a returned
/// path, the previous path element). `radius` is non-zero for arc segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RrtNode {
    pub x: f32,
    pub y: f32,
    /// Heading in radians
    pub q: f32,
    pub parent: Option<usize>,
    pub radius: f32,
}

impl RrtNode {
    pub fn new(x: f32, y: f32, q: f32) -> Self {
        Self {
            x,
            y,
            q,
            parent: None,
            radius: 0.0,
        }
    }

    pub fn from_pose(pose: Pose2D) -> Self {
        Self::new(pose.x, pose.y, pose.theta)
    }

    #[inline]
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    #[inline]
    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.q)
    }

    #[inline]
    pub fn distance(&self, other: &RrtNode) -> f32 {
        self.point().distance(&other.point())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.q.is_finite()
    }
}

/// A rooted tree of samples stored as an arena.
///
/// Nodes are only ever appended, so indices stay valid for the lifetime of
/// the tree. The tree is owned by a single planning call.
#[derive(Clone, Debug)]
pub struct RrtTree {
    nodes: Vec<RrtNode>,
}

impl RrtTree {
    pub fn new(root: RrtNode) -> Self {
        let mut root = root;
        root.parent = None;
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> &RrtNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> &RrtNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[RrtNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node below `parent`, returning its index.
    pub fn add(&mut self, mut node: RrtNode, parent: usize) -> usize {
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Index of the node closest to `target`.
    pub fn nearest(&self, target: Point2D) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, node) in self.nodes.iter().enumerate() {
            let d = node.point().distance_squared(&target);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    }

    /// Nodes from the root down to `index`, inclusive.
    pub fn path_from_root(&self, index: usize) -> Vec<RrtNode> {
        let mut path = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            let node = self.nodes[i];
            path.push(node);
            current = node.parent;
        }
        path.reverse();
        path
    }
}
