use std::fmt::{Debug, Formatter, Result};
use std::ops::Range;

use geometry::bbox::{self, BBox};
use geometry::ray::Ray;
use shape::Hit;

use crate::Element;

/// Maximum number of children stored in one leaf.
pub const MAX_LEAF_SIZE: usize = 4;

enum BvhNodeContent {
    Children([Box<BvhNode>; 2]),
    /// Range into `Bvh::order`.
    Leaf(Range<usize>),
}

struct BvhNode {
    bbox: BBox,
    content: BvhNodeContent,
}

use BvhNodeContent::{Children, Leaf};

impl Debug for BvhNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let content_string = match &self.content {
            Children([l, r]) => format!("\n{:?}\n{:?}", l, r),
            Leaf(range) => format!("leaf {:?}", range),
        };
        write!(
            f,
            "{{ bbox = {} {}\n }}",
            self.bbox,
            content_string.replace("\n", "\n  ")
        )
    }
}

impl BvhNode {
    fn height(&self) -> usize {
        match &self.content {
            Children([left, right]) => left.height().max(right.height()) + 1,
            Leaf(_) => 1,
        }
    }
    fn count(&self) -> usize {
        match &self.content {
            Children([left, right]) => left.count() + right.count() + 1,
            Leaf(_) => 1,
        }
    }
}

/// Bounding-volume hierarchy over the children of one aggregator.
///
/// The children themselves are not moved; leaves refer to them through `order`, a permutation of
/// child indices sorted during the build.
#[derive(Debug)]
pub(crate) struct Bvh {
    root: BvhNode,
    order: Vec<usize>,
}

impl Bvh {
    /// Builds the hierarchy from the children's bounding boxes. `boxes` must not be empty.
    pub fn build(boxes: &[BBox]) -> Bvh {
        assert!(!boxes.is_empty(), "empty bvh");
        let mut order: Vec<usize> = (0..boxes.len()).collect();
        let root = recursive_build(boxes, &mut order, 0..boxes.len());
        Bvh { root, order }
    }

    pub fn bbox(&self) -> BBox {
        self.root.bbox
    }
    pub fn height(&self) -> usize {
        self.root.height()
    }
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Checks that every node box encloses its children's boxes and every leaf is small enough.
    pub fn geometric_sound(&self, children: &[Element]) -> bool {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match &node.content {
                Children([left, right]) => {
                    if !node.bbox.encloses(left.bbox) || !node.bbox.encloses(right.bbox) {
                        return false;
                    }
                    stack.push(left);
                    stack.push(right);
                }
                Leaf(range) => {
                    if range.len() > MAX_LEAF_SIZE {
                        return false;
                    }
                    let all_enclosed = self.order[range.clone()].iter().all(|&i| {
                        children[i]
                            .bbox()
                            .map_or(false, |b| node.bbox.encloses(b))
                    });
                    if !all_enclosed {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Appends every intersection of `r` with the children under this hierarchy to `hits`.
    pub fn intersect_all<'a>(&self, children: &'a [Element], r: &Ray, hits: &mut Vec<Hit<'a>>) {
        self.intersect_node(&self.root, children, r, hits)
    }

    fn intersect_node<'a>(
        &self, node: &BvhNode, children: &'a [Element], r: &Ray, hits: &mut Vec<Hit<'a>>,
    ) {
        if !node.bbox.intersect(r) {
            return;
        }
        match &node.content {
            Leaf(range) => {
                for &i in self.order[range.clone()].iter() {
                    let child = &children[i];
                    if child.bbox().map_or(true, |b| b.intersect(r)) {
                        child.collect_hits(r, hits);
                    }
                }
            }
            Children([left, right]) => {
                self.intersect_node(left, children, r, hits);
                self.intersect_node(right, children, r, hits);
            }
        }
    }

    /// Nearest intersection whose squared distance from the ray origin is below `best`.
    pub fn nearest<'a>(&self, children: &'a [Element], r: &Ray, best: f32) -> Option<Hit<'a>> {
        self.nearest_in_node(&self.root, children, r, best)
    }

    fn nearest_in_node<'a>(
        &self, node: &BvhNode, children: &'a [Element], r: &Ray, best: f32,
    ) -> Option<Hit<'a>> {
        if !node.bbox.intersect(r) {
            return None;
        }
        match &node.content {
            Leaf(range) => {
                let mut best = best;
                let mut closest = None;
                for &i in self.order[range.clone()].iter() {
                    let child = &children[i];
                    if !child.bbox().map_or(true, |b| b.intersect(r)) {
                        continue;
                    }
                    if let Some(hit) = child.nearest_within(r, best) {
                        best = hit.distance_squared();
                        closest = Some(hit);
                    }
                }
                closest
            }
            Children([left, right]) => {
                // Visits first the child whose center lies earlier along the ray.
                let along = |n: &BvhNode| (n.bbox.center() - r.origin).dot(r.dir);
                let (first, second) = if along(left.as_ref()) <= along(right.as_ref()) {
                    (left, right)
                } else {
                    (right, left)
                };
                let near = self.nearest_in_node(first, children, r, best);
                let best = near.map_or(best, |h| h.distance_squared());
                let far = self.nearest_in_node(second, children, r, best);
                far.or(near)
            }
        }
    }
}

/// Builds the subtree over `order[range]`, reordering that slice in place.
fn recursive_build(boxes: &[BBox], order: &mut [usize], range: Range<usize>) -> BvhNode {
    let bbox = order[range.clone()]
        .iter()
        .map(|&i| boxes[i])
        .reduce(bbox::union)
        .expect("bvh node over an empty range");

    if range.len() <= MAX_LEAF_SIZE {
        return BvhNode {
            bbox,
            content: Leaf(range),
        };
    }

    // Sorts the children according to box-center coordinate on the longest axis, and splits the
    // sorted list in half.
    let split_axis = bbox.max_extent_axis();
    order[range.clone()].sort_by(|&i0, &i1| {
        let axis_pos_0 = boxes[i0].center()[split_axis];
        let axis_pos_1 = boxes[i1].center()[split_axis];
        axis_pos_0
            .partial_cmp(&axis_pos_1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mid = range.start + range.len() / 2;

    let left = recursive_build(boxes, order, range.start..mid);
    let right = recursive_build(boxes, order, mid..range.end);
    BvhNode {
        bbox: bbox::union(left.bbox, right.bbox),
        content: Children([Box::new(left), Box::new(right)]),
    }
}
