//! Top-level aggregation of scene surfaces.
//!
//! An [`Aggregator`] owns a list of [`Element`]s, each either a single `Surface` or a nested
//! aggregator, and answers "all hits" and "closest hit" queries for a ray using one of the
//! strategies in [`AccelStrategy`].

mod aggregator;
mod bvh;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use geometry::{bbox::BBox, ray::Ray};
use shape::{Hit, Surface};
use thiserror::Error;

pub use aggregator::Aggregator;
pub use bvh::MAX_LEAF_SIZE;

/// How an aggregator narrows down the children it tests against a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelStrategy {
    /// Tests every child exactly.
    Linear,
    /// Tests the group box, then each bounded child's box, before the exact tests.
    Coarse,
    /// Hierarchy of boxes over the children.
    Bvh,
}

impl Default for AccelStrategy {
    fn default() -> Self {
        AccelStrategy::Linear
    }
}

impl Display for AccelStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccelStrategy::Linear => "linear",
            AccelStrategy::Coarse => "cbr",
            AccelStrategy::Bvh => "bvh",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown acceleration strategy '{0}', expected one of linear, cbr, bvh")]
pub struct ParseStrategyError(pub String);

impl FromStr for AccelStrategy {
    type Err = ParseStrategyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "none" => Ok(AccelStrategy::Linear),
            "cbr" | "coarse" => Ok(AccelStrategy::Coarse),
            "bvh" => Ok(AccelStrategy::Bvh),
            _ => Err(ParseStrategyError(s.to_owned())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("child {index} ({summary}) has no bounding box and can't be placed in a hierarchy")]
    Unbounded { index: usize, summary: String },
}

/// A child of an aggregator.
#[derive(Debug)]
pub enum Element {
    Surface(Surface),
    Group(Aggregator),
}

impl From<Surface> for Element {
    fn from(s: Surface) -> Self {
        Element::Surface(s)
    }
}

impl From<Aggregator> for Element {
    fn from(a: Aggregator) -> Self {
        Element::Group(a)
    }
}

impl Element {
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Element::Surface(s) => s.bbox(),
            Element::Group(g) => g.bbox(),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Element::Surface(s) => s.summary(),
            Element::Group(g) => format!("Group{{ {} x {} }}", g.strategy(), g.len()),
        }
    }

    pub(crate) fn collect_hits<'a>(&'a self, r: &Ray, hits: &mut Vec<Hit<'a>>) {
        match self {
            Element::Surface(s) => hits.extend(s.intersect(r)),
            Element::Group(g) => g.collect_hits(r, hits),
        }
    }

    /// Nearest hit closer (in squared distance) than `best`.
    pub(crate) fn nearest_within(&self, r: &Ray, best: f32) -> Option<Hit<'_>> {
        match self {
            Element::Surface(s) => s.nearest(r).filter(|h| h.distance_squared() < best),
            Element::Group(g) => g.nearest_within(r, best),
        }
    }
}
