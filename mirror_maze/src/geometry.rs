use nalgebra::Matrix2;

use crate::{Float, Vector};

/// Tolerance used by ray/segment intersections, both for detecting parallel
/// lines and for accepting hits that land right on a segment's endpoints.
pub const EPSILON: Float = 1e-10;

/// Returns `v` scaled to unit length, or the zero vector if `v` has no
/// meaningful direction.
#[inline]
#[must_use]
pub fn normalize(v: Vector) -> Vector {
    v.try_normalize(Float::EPSILON).unwrap_or_else(Vector::zeros)
}

/// A light ray, represented as a half-line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The starting point of the half-line
    pub origin: Vector,
    /// The direction of the half-line, of unit length, or zero if undefined
    pub dir: Vector,
}

impl Ray {
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<Vector>, dir: impl Into<Vector>) -> Self {
        Self {
            origin: origin.into(),
            dir: normalize(dir.into()),
        }
    }

    /// A ray starting at `origin`, heading towards `target`.
    #[inline]
    #[must_use]
    pub fn towards(origin: Vector, target: Vector) -> Self {
        Self::new(origin, target - origin)
    }

    #[inline]
    pub fn has_direction(&self) -> bool {
        self.dir != Vector::zeros()
    }

    /// Move the ray's origin forward (or backward if t < 0.0) by `t`
    #[inline]
    pub fn advance(&mut self, t: Float) {
        self.origin = self.at(t);
    }

    /// Get the point at distance `t` (can be negative) from the ray's origin
    #[inline]
    pub fn at(&self, t: Float) -> Vector {
        self.origin + self.dir * t
    }
}

/// A line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub p1: Vector,
    pub p2: Vector,
}

/// Where a [`Ray`] meets a [`Segment`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub point: Vector,
    /// Distance travelled along the ray
    pub t: Float,
}

impl Segment {
    #[inline]
    #[must_use]
    pub fn new(p1: impl Into<Vector>, p2: impl Into<Vector>) -> Self {
        Self {
            p1: p1.into(),
            p2: p2.into(),
        }
    }

    #[inline]
    pub fn edge(&self) -> Vector {
        self.p2 - self.p1
    }

    #[inline]
    pub fn translated(&self, offset: Vector) -> Self {
        Self::new(self.p1 + offset, self.p2 + offset)
    }

    /// Returns `[t, s]` such that `ray.at(t) == p1 + s * (p2 - p1)`, i. e. the
    /// intersection of `ray` with the (infinite) line through this segment.
    ///
    /// Returns `None` if they are parallel.
    #[inline]
    pub fn intersection_coordinates(&self, ray: &Ray) -> Option<Vector> {
        let a = Matrix2::from_columns(&[ray.dir, -self.edge()]);

        if a.determinant().abs() < EPSILON {
            return None;
        }

        a.try_inverse().map(|inv| inv * (self.p1 - ray.origin))
    }

    /// Returns where `ray` hits this segment, if it does so forward of its origin.
    #[inline]
    pub fn intersect(&self, ray: &Ray) -> Option<Hit> {
        self.intersection_coordinates(ray).and_then(|coords| {
            let (t, s) = (coords.x, coords.y);
            (t >= -EPSILON && (-EPSILON..=1.0 + EPSILON).contains(&s)).then(|| Hit {
                point: ray.at(t),
                t,
            })
        })
    }

    /// Whether `point` lies on this segment, within `tolerance`, both across
    /// the segment's line and along it.
    pub fn contains_point(&self, point: Vector, tolerance: Float) -> bool {
        let min = self.p1.inf(&self.p2);
        let max = self.p1.sup(&self.p2);

        if point.x < min.x - tolerance
            || point.x > max.x + tolerance
            || point.y < min.y - tolerance
            || point.y > max.y + tolerance
        {
            return false;
        }

        let edge = self.edge();
        let offset = point - self.p1;
        let cross = offset.y * edge.x - offset.x * edge.y;

        cross.abs() < tolerance
    }

    /// Distance from `point` to the closest point of this segment.
    pub fn distance_to(&self, point: Vector) -> Float {
        let edge = self.edge();
        let len_sq = edge.norm_squared();

        let closest = if len_sq == 0.0 {
            self.p1
        } else {
            let s = ((point - self.p1).dot(&edge) / len_sq).clamp(0.0, 1.0);
            self.p1 + edge * s
        };

        (point - closest).norm()
    }
}

/// The hit closest to `ray`'s origin, among all `segments`.
///
/// On exact ties, the segment that comes first wins.
pub fn closest_intersection<'a>(
    ray: &Ray,
    segments: impl IntoIterator<Item = &'a Segment>,
) -> Option<Hit> {
    segments
        .into_iter()
        .filter_map(|segment| segment.intersect(ray))
        .min_by(|h1, h2| h1.t.total_cmp(&h2.t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn normalize_degenerate_vector_is_zero() {
        assert_eq!(normalize(Vector::zeros()), Vector::zeros());
        assert_close(normalize(Vector::new(3.0, 4.0)), Vector::new(0.6, 0.8));
    }

    #[test]
    fn ray_advances_along_direction() {
        let mut ray = Ray::new(Vector::new(1.0, 1.0), Vector::new(0.0, 5.0));
        assert_close(ray.at(2.0), Vector::new(1.0, 3.0));
        ray.advance(-1.0);
        assert_close(ray.origin, Vector::new(1.0, 0.0));
        assert!(ray.has_direction());
        assert!(!Ray::towards(ray.origin, ray.origin).has_direction());
    }

    #[test]
    fn ray_hits_segment() {
        let wall = Segment::new(Vector::new(10.0, -5.0), Vector::new(10.0, 5.0));
        let ray = Ray::new(Vector::zeros(), Vector::new(1.0, 0.0));

        let hit = wall.intersect(&ray).unwrap();
        assert_close(hit.point, Vector::new(10.0, 0.0));
        assert!((hit.t - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn ray_misses_segment_behind_it() {
        let wall = Segment::new(Vector::new(-10.0, -5.0), Vector::new(-10.0, 5.0));
        let ray = Ray::new(Vector::zeros(), Vector::new(1.0, 0.0));
        assert_eq!(wall.intersect(&ray), None);
    }

    #[test]
    fn ray_misses_segment_beyond_its_ends() {
        let wall = Segment::new(Vector::new(10.0, 1.0), Vector::new(10.0, 5.0));
        let ray = Ray::new(Vector::zeros(), Vector::new(1.0, 0.0));
        assert_eq!(wall.intersect(&ray), None);
    }

    #[test]
    fn parallel_ray_never_hits() {
        let wall = Segment::new(Vector::new(0.0, 1.0), Vector::new(10.0, 1.0));
        let ray = Ray::new(Vector::zeros(), Vector::new(1.0, 0.0));
        assert_eq!(wall.intersection_coordinates(&ray), None);
        assert_eq!(wall.intersect(&ray), None);
    }

    #[test]
    fn endpoint_hits_count() {
        let wall = Segment::new(Vector::new(10.0, 0.0), Vector::new(10.0, 5.0));
        let ray = Ray::new(Vector::zeros(), Vector::new(1.0, 0.0));
        assert!(wall.intersect(&ray).is_some());
    }

    #[test]
    fn closest_intersection_picks_nearest() {
        let near = Segment::new(Vector::new(5.0, -1.0), Vector::new(5.0, 1.0));
        let far = Segment::new(Vector::new(9.0, -1.0), Vector::new(9.0, 1.0));
        let ray = Ray::new(Vector::zeros(), Vector::new(1.0, 0.0));

        let hit = closest_intersection(&ray, &[far, near]).unwrap();
        assert!((hit.t - 5.0).abs() < TOLERANCE);

        assert_eq!(closest_intersection(&ray, &Vec::<Segment>::new()), None);
    }

    #[test]
    fn segment_contains_point() {
        let wall = Segment::new(Vector::new(240.0, 0.0), Vector::new(240.0, 240.0));
        assert!(wall.contains_point(Vector::new(240.0, 120.0), 1e-6));
        assert!(wall.contains_point(Vector::new(240.0, 240.0), 1e-6));
        assert!(!wall.contains_point(Vector::new(240.0, 241.0), 1e-6));
        assert!(!wall.contains_point(Vector::new(239.0, 120.0), 1e-6));
    }

    #[test]
    fn distance_is_clamped_to_segment() {
        let wall = Segment::new(Vector::new(0.0, 0.0), Vector::new(10.0, 0.0));
        assert!((wall.distance_to(Vector::new(5.0, 3.0)) - 3.0).abs() < TOLERANCE);
        assert!((wall.distance_to(Vector::new(13.0, 4.0)) - 5.0).abs() < TOLERANCE);
        assert!((wall.distance_to(Vector::new(-3.0, -4.0)) - 5.0).abs() < TOLERANCE);

        let dot = Segment::new(Vector::new(1.0, 1.0), Vector::new(1.0, 1.0));
        assert!((dot.distance_to(Vector::new(4.0, 5.0)) - 5.0).abs() < TOLERANCE);
    }
}
