use serde::Deserialize;
use thiserror::Error;

use crate::bbox::Bbox;

#[derive(Debug, Error, PartialEq)]
pub enum PolygonError {
    #[error("AOI polygon needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),
    #[error("AOI vertex {0} is not finite")]
    NonFinite(usize),
    #[error("AOI polygon edges {0} and {1} intersect")]
    SelfIntersecting(usize, usize),
}

/// How points lying exactly on the AOI boundary are treated.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryRule {
    /// Even-odd crossing test: for an axis-aligned edge the min side is
    /// inside and the max side is outside, i.e. `[min, max)` on both axes.
    #[default]
    #[serde(rename = "half_open")]
    HalfOpen,
    /// Any point on an edge or vertex is inside.
    #[serde(rename = "inclusive")]
    Inclusive,
}

/// A simple closed ring of (x, y) = (longitude, latitude) vertices.
///
/// The closing vertex is implicit; a repeated first vertex at the end of the
/// input is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiPolygon {
    vertices: Vec<(f64, f64)>,
}

impl AoiPolygon {
    pub fn new(mut vertices: Vec<(f64, f64)>) -> Result<Self, PolygonError> {
        if let Some(i) = vertices
            .iter()
            .position(|(x, y)| !(x.is_finite() && y.is_finite()))
        {
            return Err(PolygonError::NonFinite(i));
        }

        vertices.dedup();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < 3 {
            return Err(PolygonError::TooFewVertices(vertices.len()));
        }

        let polygon = AoiPolygon { vertices };
        if let Some((a, b)) = polygon.first_self_intersection() {
            return Err(PolygonError::SelfIntersecting(a, b));
        }

        Ok(polygon)
    }

    pub fn from_bbox(bbox: &Bbox) -> Self {
        AoiPolygon {
            vertices: vec![
                (bbox.xmin, bbox.ymin),
                (bbox.xmax, bbox.ymin),
                (bbox.xmax, bbox.ymax),
                (bbox.xmin, bbox.ymax),
            ],
        }
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    pub fn bbox(&self) -> Bbox {
        Bbox::enclosing(&self.vertices)
    }

    fn edges(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn contains(&self, x: f64, y: f64, rule: BoundaryRule) -> bool {
        if rule == BoundaryRule::Inclusive && self.edges().any(|(a, b)| on_segment(a, b, (x, y))) {
            return true;
        }

        let mut inside = false;
        for ((xi, yi), (xj, yj)) in self.edges() {
            if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
        }
        inside
    }

    // Adjacent edges share a vertex and are skipped.
    fn first_self_intersection(&self) -> Option<(usize, usize)> {
        let n = self.vertices.len();
        for i in 0..n {
            let a = (self.vertices[i], self.vertices[(i + 1) % n]);
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    continue;
                }
                let b = (self.vertices[j], self.vertices[(j + 1) % n]);
                if segments_intersect(a, b) {
                    return Some((i, j));
                }
            }
        }
        None
    }
}

fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

fn on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    let scale = (b.0 - a.0).abs().max((b.1 - a.1).abs()).max(1.0);
    cross(a, b, p).abs() <= 1e-12 * scale * scale
        && p.0 >= a.0.min(b.0)
        && p.0 <= a.0.max(b.0)
        && p.1 >= a.1.min(b.1)
        && p.1 <= a.1.max(b.1)
}

fn segments_intersect(s: ((f64, f64), (f64, f64)), t: ((f64, f64), (f64, f64))) -> bool {
    let (p1, p2) = s;
    let (p3, p4) = t;
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    on_segment(p3, p4, p1) || on_segment(p3, p4, p2) || on_segment(p1, p2, p3) || on_segment(p1, p2, p4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> AoiPolygon {
        AoiPolygon::new(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_closing_vertex_is_dropped() {
        assert_eq!(square().vertices().len(), 4);
        assert_eq!(square().bbox(), Bbox::new(0.0, 10.0, 0.0, 10.0).unwrap());
    }

    #[test]
    fn test_rejects_degenerate_polygons() {
        assert_eq!(
            AoiPolygon::new(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            Err(PolygonError::TooFewVertices(2))
        );
        assert_eq!(
            AoiPolygon::new(vec![(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0)]),
            Err(PolygonError::NonFinite(1))
        );

        // Bow tie
        let bow_tie = AoiPolygon::new(vec![(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        assert!(matches!(bow_tie, Err(PolygonError::SelfIntersecting(_, _))));
    }

    #[test]
    fn test_contains_interior_and_exterior() {
        let poly = square();
        assert!(poly.contains(5.0, 5.0, BoundaryRule::HalfOpen));
        assert!(!poly.contains(15.0, 5.0, BoundaryRule::HalfOpen));
        assert!(!poly.contains(-0.1, 5.0, BoundaryRule::Inclusive));
    }

    #[test]
    fn test_half_open_boundary() {
        let poly = square();
        // min edges inside
        assert!(poly.contains(0.0, 5.0, BoundaryRule::HalfOpen));
        assert!(poly.contains(5.0, 0.0, BoundaryRule::HalfOpen));
        // max edges outside
        assert!(!poly.contains(10.0, 5.0, BoundaryRule::HalfOpen));
        assert!(!poly.contains(5.0, 10.0, BoundaryRule::HalfOpen));
    }

    #[test]
    fn test_inclusive_boundary() {
        let poly = square();
        assert!(poly.contains(10.0, 5.0, BoundaryRule::Inclusive));
        assert!(poly.contains(5.0, 10.0, BoundaryRule::Inclusive));
        assert!(poly.contains(10.0, 10.0, BoundaryRule::Inclusive));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening north
        let poly = AoiPolygon::new(vec![
            (0.0, 0.0),
            (9.0, 0.0),
            (9.0, 9.0),
            (6.0, 9.0),
            (6.0, 3.0),
            (3.0, 3.0),
            (3.0, 9.0),
            (0.0, 9.0),
        ])
        .unwrap();

        assert!(poly.contains(1.5, 6.0, BoundaryRule::HalfOpen));
        assert!(poly.contains(7.5, 6.0, BoundaryRule::HalfOpen));
        assert!(!poly.contains(4.5, 6.0, BoundaryRule::HalfOpen));
        assert!(poly.contains(4.5, 1.5, BoundaryRule::HalfOpen));
    }
}
