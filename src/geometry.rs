//! Planar geometry helpers.
//!
//! Points are plain `(x, y)` pairs. Clustering uses them as
//! `(longitude, latitude)`; map matching uses them in the network's
//! planar projection.

/// A 2D point. Equality is exact, by value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }
}

/// Result of snapping a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    /// Closest point on the segment.
    pub point: Point,
    /// Distance from the snapped input to `point`.
    pub distance: f64,
}

/// Euclidean distance between `(x1, y1)` and `(x2, y2)`.
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x1 - x2) * (x1 - x2) + (y1 - y2) * (y1 - y2)).sqrt()
}

/// Find the closest point to `p` on the segment `a`-`b`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end snap to that endpoint. A zero-length segment snaps to `a`.
pub fn snap(a: Point, b: Point, p: Point) -> Snap {
    let length_sq = (a.x - b.x) * (a.x - b.x) + (a.y - b.y) * (a.y - b.y);
    if length_sq == 0.0 {
        return Snap {
            point: a,
            distance: a.distance(&p),
        };
    }

    let t = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / length_sq;
    let point = if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
    };

    Snap {
        point,
        distance: point.distance(&p),
    }
}

/// Arithmetic mean of a set of points, or `None` when empty.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    let n = points.len() as f64;
    Some(Point::new(sum_x / n, sum_y / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_pythagorean() {
        assert_eq!(Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_snap_inside_segment() {
        let snap = snap(Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(4.0, 3.0));
        assert_eq!(snap.point, Point::new(4.0, 0.0));
        assert_eq!(snap.distance, 3.0);
    }

    #[test]
    fn test_snap_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(snap(a, b, Point::new(-5.0, 1.0)).point, a);
        assert_eq!(snap(a, b, Point::new(15.0, -1.0)).point, b);
    }

    #[test]
    fn test_snap_zero_length_segment() {
        let a = Point::new(2.0, 2.0);
        let snap = snap(a, a, Point::new(2.0, 5.0));
        assert_eq!(snap.point, a);
        assert_eq!(snap.distance, 3.0);
    }

    #[test]
    fn test_centroid() {
        let points = vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(1.0, 3.0)];
        assert_eq!(centroid(&points), Some(Point::new(1.0, 1.0)));
        assert_eq!(centroid(&[]), None);
    }
}
