//! KD-tree spatial index over point and segment keys.
//!
//! The tree is built once per batch over the bounding boxes of its keys and
//! is read-only afterward, so it can be shared freely across consumers. It
//! answers axis-aligned range queries with a lazy iterator of original key
//! indices.
//!
//! The split is min/max-aware so the same tree handles both point-like keys
//! (degenerate boxes) and interval-like keys (segments): entries strictly
//! below the cut go left, strictly above go right, and anything straddling
//! the cut plane - including a point sitting exactly on it - stays in the
//! node itself and is never pushed into a child. This is what makes range
//! queries correct for segments whose extent crosses the cut.

use crate::geometry::{BoundingBox, HasBoundingBox, EPSILON};

/// Maximum number of entries in a leaf. When a split would leave both
/// children below this threshold, the node collapses into a single leaf
/// instead, avoiding degenerate single-entry subtrees.
const LEAF_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
struct Entry<const D: usize> {
    index: usize,
    bounds: BoundingBox<D>,
}

#[derive(Debug)]
enum Node<const D: usize> {
    /// Terminator standing in for an absent child.
    Empty,
    Leaf {
        entries: Vec<Entry<D>>,
    },
    Internal {
        axis: usize,
        cut: f64,
        /// Aggregate bounding box of the whole subtree. Lets a query reject
        /// the subtree with one overlap check instead of per-entry
        /// comparisons; leaves skip the cached box and test entries
        /// directly.
        bounds: BoundingBox<D>,
        /// Entries whose extent straddles the cut plane.
        straddling: Vec<Entry<D>>,
        left: Box<Node<D>>,
        right: Box<Node<D>>,
    },
}

/// Immutable KD-tree over a fixed list of geometric keys.
///
/// Built via [`KdTree::build`] from any slice of keys implementing
/// [`HasBoundingBox`]; queries return the indices of keys whose bounding box
/// overlaps the query box. Callers needing exact geometry must filter the
/// candidates themselves (and should be prepared to deduplicate).
///
/// # Example
/// ```
/// use trajclust::{KdTree, Point};
///
/// let points = vec![Point::xy(0.0, 0.0), Point::xy(10.0, 10.0)];
/// let tree = KdTree::build(&points);
/// let hits: Vec<usize> = tree
///     .search(&trajclust::BoundingBox { lo: [-1.0, -1.0], hi: [1.0, 1.0] })
///     .collect();
/// assert_eq!(hits, vec![0]);
/// ```
#[derive(Debug)]
pub struct KdTree<const D: usize> {
    root: Node<D>,
    len: usize,
}

impl<const D: usize> KdTree<D> {
    /// Build the index over the given keys. Empty input yields an empty
    /// tree that answers every query with an empty iterator.
    pub fn build<K: HasBoundingBox<D>>(keys: &[K]) -> Self {
        let entries: Vec<Entry<D>> = keys
            .iter()
            .enumerate()
            .map(|(index, key)| Entry {
                index,
                bounds: key.bounding_box(),
            })
            .collect();
        Self {
            root: build_node(entries, 0),
            len: keys.len(),
        }
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree (0 for an empty tree), for size bookkeeping.
    pub fn depth(&self) -> usize {
        node_depth(&self.root)
    }

    /// Lazily iterate the indices of all keys whose bounding box overlaps
    /// the query box. Order is unspecified; duplicates are permitted by the
    /// contract (callers deduplicate) though this implementation stores each
    /// key in exactly one node.
    pub fn search(&self, query: &BoundingBox<D>) -> RangeQuery<'_, D> {
        RangeQuery {
            query: *query,
            stack: vec![&self.root],
            pending: [].iter(),
        }
    }
}

fn build_node<const D: usize>(entries: Vec<Entry<D>>, depth: usize) -> Node<D> {
    if entries.is_empty() {
        return Node::Empty;
    }
    if entries.len() <= LEAF_CAPACITY {
        return Node::Leaf { entries };
    }

    let axis = depth % D;

    // Candidate cut: median of the per-entry lower coordinates. For point
    // keys this is the true coordinate median; for intervals it keeps the
    // partition balanced even when extents vary wildly.
    let mut lows: Vec<f64> = entries.iter().map(|e| e.bounds.lo[axis]).collect();
    lows.sort_by(f64::total_cmp);
    let cut = lows[lows.len() / 2];

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut straddling = Vec::new();
    let mut bounds = entries[0].bounds;
    for entry in entries {
        bounds = bounds.merged(&entry.bounds);
        if entry.bounds.hi[axis] < cut {
            left.push(entry);
        } else if entry.bounds.lo[axis] > cut {
            right.push(entry);
        } else {
            straddling.push(entry);
        }
    }

    // The entry whose lower bound defined the cut always straddles, so both
    // child sets are strictly smaller than the input and recursion
    // terminates even with heavily duplicated coordinates.
    if left.len() < LEAF_CAPACITY && right.len() < LEAF_CAPACITY {
        let mut entries = left;
        entries.append(&mut straddling);
        entries.append(&mut right);
        return Node::Leaf { entries };
    }

    Node::Internal {
        axis,
        cut,
        bounds,
        straddling,
        left: Box::new(build_node(left, depth + 1)),
        right: Box::new(build_node(right, depth + 1)),
    }
}

fn node_depth<const D: usize>(node: &Node<D>) -> usize {
    match node {
        Node::Empty => 0,
        Node::Leaf { .. } => 1,
        Node::Internal { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

/// Lazy range-query iterator over a [`KdTree`].
///
/// Holds an explicit stack of unvisited subtrees so candidates are produced
/// on demand; callers that stop early never pay for the rest of the tree.
pub struct RangeQuery<'a, const D: usize> {
    query: BoundingBox<D>,
    stack: Vec<&'a Node<D>>,
    pending: std::slice::Iter<'a, Entry<D>>,
}

impl<const D: usize> Iterator for RangeQuery<'_, D> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            for entry in self.pending.by_ref() {
                if entry.bounds.overlaps(&self.query) {
                    return Some(entry.index);
                }
            }
            match self.stack.pop()? {
                Node::Empty => {}
                Node::Leaf { entries } => {
                    self.pending = entries.iter();
                }
                Node::Internal {
                    axis,
                    cut,
                    bounds,
                    straddling,
                    left,
                    right,
                } => {
                    if !bounds.overlaps(&self.query) {
                        continue;
                    }
                    if self.query.lo[*axis] <= cut + EPSILON {
                        self.stack.push(left);
                    }
                    if self.query.hi[*axis] >= cut - EPSILON {
                        self.stack.push(right);
                    }
                    self.pending = straddling.iter();
                }
            }
        }
    }
}
