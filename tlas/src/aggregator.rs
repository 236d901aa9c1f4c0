use geometry::{bbox, bbox::BBox, ray::Ray};
use shape::Hit;

use crate::bvh::Bvh;
use crate::{AccelStrategy, BuildError, Element};

/// A group of surfaces and nested groups, queried together.
///
/// The group's own box is the union of its children's boxes, or `None` if any child is unbounded
/// or the group is empty.
#[derive(Debug)]
pub struct Aggregator {
    strategy: AccelStrategy,
    children: Vec<Element>,
    bbox: Option<BBox>,
    bvh: Option<Bvh>,
}

impl Aggregator {
    /// Builds a group over `children`. With [`AccelStrategy::Bvh`] every child must be bounded.
    pub fn build<I>(strategy: AccelStrategy, children: I) -> Result<Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        let children: Vec<Element> = children.into_iter().map(Into::into).collect();
        let boxes: Vec<Option<BBox>> = children.iter().map(Element::bbox).collect();
        let bbox = boxes
            .iter()
            .copied()
            .collect::<Option<Vec<BBox>>>()
            .and_then(|all| all.into_iter().reduce(bbox::union));

        let bvh = match strategy {
            AccelStrategy::Bvh if !children.is_empty() => {
                let mut bounded = Vec::with_capacity(boxes.len());
                for (index, b) in boxes.iter().enumerate() {
                    match b {
                        Some(b) => bounded.push(*b),
                        None => {
                            return Err(BuildError::Unbounded {
                                index,
                                summary: children[index].summary(),
                            })
                        }
                    }
                }
                let bvh = Bvh::build(&bounded);
                log::debug!(
                    "bvh over {} children: height {}, {} nodes",
                    children.len(),
                    bvh.height(),
                    bvh.node_count()
                );
                Some(bvh)
            }
            _ => None,
        };

        Ok(Aggregator {
            strategy,
            children,
            bbox,
            bvh,
        })
    }

    pub fn strategy(&self) -> AccelStrategy {
        self.strategy
    }
    pub fn children(&self) -> &[Element] {
        &self.children
    }
    pub fn len(&self) -> usize {
        self.children.len()
    }
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
    pub fn bbox(&self) -> Option<BBox> {
        self.bbox
    }

    /// Checks that the hierarchy (if any) is made of properly nested boxes, recursing into groups.
    pub fn geometric_sound(&self) -> bool {
        let own = self
            .bvh
            .as_ref()
            .map_or(true, |bvh| bvh.geometric_sound(&self.children));
        own && self.children.iter().all(|c| match c {
            Element::Group(g) => g.geometric_sound(),
            Element::Surface(_) => true,
        })
    }

    /// Every point where `r` meets any surface in this group, in no particular order.
    pub fn find_intersections(&self, r: &Ray) -> Vec<Hit<'_>> {
        let mut hits = Vec::new();
        self.collect_hits(r, &mut hits);
        hits
    }

    /// Same as `find_intersections`, keeping only the hits closer than `max_distance`.
    pub fn find_intersections_within(&self, r: &Ray, max_distance: f32) -> Vec<Hit<'_>> {
        let mut hits = self.find_intersections(r);
        hits.retain(|h| h.ray_t < max_distance);
        hits
    }

    /// The hit nearest to the ray origin, if any.
    pub fn find_closest(&self, r: &Ray) -> Option<Hit<'_>> {
        self.nearest_within(r, f32::INFINITY)
    }

    pub(crate) fn collect_hits<'a>(&'a self, r: &Ray, hits: &mut Vec<Hit<'a>>) {
        match (self.strategy, &self.bvh) {
            (AccelStrategy::Bvh, Some(bvh)) => bvh.intersect_all(&self.children, r, hits),
            (AccelStrategy::Bvh, None) => (),
            (AccelStrategy::Linear, _) => {
                for child in self.children.iter() {
                    child.collect_hits(r, hits);
                }
            }
            (AccelStrategy::Coarse, _) => {
                if !self.bbox.map_or(true, |b| b.intersect(r)) {
                    return;
                }
                for child in self.children.iter() {
                    if child.bbox().map_or(true, |b| b.intersect(r)) {
                        child.collect_hits(r, hits);
                    }
                }
            }
        }
    }

    /// Nearest hit whose squared distance is below `best`.
    pub(crate) fn nearest_within(&self, r: &Ray, best: f32) -> Option<Hit<'_>> {
        match (self.strategy, &self.bvh) {
            (AccelStrategy::Bvh, Some(bvh)) => bvh.nearest(&self.children, r, best),
            (AccelStrategy::Bvh, None) => None,
            (AccelStrategy::Linear, _) => closest_of(self.children.iter(), r, best),
            (AccelStrategy::Coarse, _) => {
                if !self.bbox.map_or(true, |b| b.intersect(r)) {
                    return None;
                }
                let candidates = self
                    .children
                    .iter()
                    .filter(|c| c.bbox().map_or(true, |b| b.intersect(r)));
                closest_of(candidates, r, best)
            }
        }
    }
}

fn closest_of<'a, I>(children: I, r: &Ray, best: f32) -> Option<Hit<'a>>
where
    I: Iterator<Item = &'a Element>,
{
    let mut best = best;
    let mut closest = None;
    for child in children {
        if let Some(hit) = child.nearest_within(r, best) {
            best = hit.distance_squared();
            closest = Some(hit);
        }
    }
    closest
}

#[cfg(test)]
mod test {
    use super::*;
    use math::hcm::{point3, Point3, Vec3};
    use shape::{Plane, Sphere, Surface};

    fn sphere_at(x: f32) -> Surface {
        Surface::new(Sphere::new(point3(x, 0.0, 0.0), 0.5).unwrap())
    }

    #[test]
    fn bvh_rejects_unbounded_children() {
        let plane = Surface::new(Plane::new(Point3::ORIGIN, Vec3::Y).unwrap());
        let err = Aggregator::build(AccelStrategy::Bvh, vec![sphere_at(0.0), plane]).unwrap_err();
        match err {
            BuildError::Unbounded { index, .. } => assert_eq!(index, 1),
        }
        // Other strategies accept them, but the group is then unbounded.
        let plane = Surface::new(Plane::new(Point3::ORIGIN, Vec3::Y).unwrap());
        let group = Aggregator::build(AccelStrategy::Coarse, vec![sphere_at(0.0), plane]).unwrap();
        assert!(group.bbox().is_none());
    }

    #[test]
    fn empty_groups() {
        for &strategy in [AccelStrategy::Linear, AccelStrategy::Coarse, AccelStrategy::Bvh].iter() {
            let group = Aggregator::build(strategy, Vec::<Surface>::new()).unwrap();
            assert!(group.is_empty());
            assert!(group.bbox().is_none());
            let r = Ray::new(Point3::ORIGIN, Vec3::X);
            assert!(group.find_intersections(&r).is_empty());
            assert!(group.find_closest(&r).is_none());
        }
    }

    #[test]
    fn group_box_and_closest() {
        let spheres: Vec<Surface> = (1..=10).map(|i| sphere_at(i as f32 * 3.0)).collect();
        let group = Aggregator::build(AccelStrategy::Bvh, spheres).unwrap();
        let b = group.bbox().unwrap();
        assert_eq!(b.min(), point3(2.5, -0.5, -0.5));
        assert_eq!(b.max(), point3(30.5, 0.5, 0.5));
        assert!(group.geometric_sound());

        let r = Ray::new(Point3::ORIGIN, Vec3::X);
        assert_eq!(group.find_intersections(&r).len(), 20);
        let closest = group.find_closest(&r).unwrap();
        assert!((closest.ray_t - 2.5).abs() < 1e-5);

        let backwards = Ray::new(point3(40.0, 0.0, 0.0), -Vec3::X);
        let closest = group.find_closest(&backwards).unwrap();
        assert!((closest.ray_t - 9.5).abs() < 1e-5);

        // Both walls of the first sphere and the near wall of the second.
        assert_eq!(group.find_intersections_within(&r, 6.0).len(), 3);
    }

    #[test]
    fn nested_groups() {
        let inner = Aggregator::build(AccelStrategy::Bvh, vec![sphere_at(6.0), sphere_at(9.0)])
            .unwrap();
        let children: Vec<Element> = vec![sphere_at(3.0).into(), inner.into()];
        let outer = Aggregator::build(AccelStrategy::Coarse, children).unwrap();
        assert_eq!(outer.bbox().unwrap().max(), point3(9.5, 0.5, 0.5));
        assert_eq!(outer.children()[1].summary(), "Group{ bvh x 2 }");

        let r = Ray::new(point3(20.0, 0.0, 0.0), -Vec3::X);
        assert_eq!(outer.find_intersections(&r).len(), 6);
        let closest = outer.find_closest(&r).unwrap();
        assert!((closest.pos.x - 9.5).abs() < 1e-5);
    }

    #[test]
    fn parse_strategy() {
        assert_eq!("bvh".parse::<AccelStrategy>(), Ok(AccelStrategy::Bvh));
        assert_eq!("CBR".parse::<AccelStrategy>(), Ok(AccelStrategy::Coarse));
        assert_eq!("linear".parse::<AccelStrategy>(), Ok(AccelStrategy::Linear));
        assert!("octree".parse::<AccelStrategy>().is_err());
        assert_eq!(AccelStrategy::Coarse.to_string(), "cbr");
    }
}
