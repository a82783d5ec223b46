//! Marker glyph shapes: host marker spellings mapped to unit outline paths.
//!
//! Outlines are centered on the origin and span one unit, so scaling by the
//! marker size in points gives the glyph in pixels.

use crate::models::{Point, RawPath};
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Point,
    Square,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Diamond,
    ThinDiamond,
    Pentagon,
    Hexagon,
    Star,
    Plus,
    X,
}

/// Bézier handle length for a quarter circle.
const KAPPA: f64 = 0.552_284_749_8;

impl MarkerShape {
    /// `None` for the spellings that hide the marker. Unknown spellings fall
    /// back to a circle with a warning.
    pub fn parse(symbol: &str) -> Option<MarkerShape> {
        let shape = match symbol {
            "" | " " | "none" | "None" => return None,
            "o" | "circle" => MarkerShape::Circle,
            "." | "point" => MarkerShape::Point,
            "s" | "square" => MarkerShape::Square,
            "^" => MarkerShape::TriangleUp,
            "v" => MarkerShape::TriangleDown,
            "<" => MarkerShape::TriangleLeft,
            ">" => MarkerShape::TriangleRight,
            "D" | "diamond" => MarkerShape::Diamond,
            "d" => MarkerShape::ThinDiamond,
            "p" | "pentagon" => MarkerShape::Pentagon,
            "h" | "H" | "hexagon" => MarkerShape::Hexagon,
            "*" | "star" => MarkerShape::Star,
            "+" | "P" | "plus" => MarkerShape::Plus,
            "x" | "X" => MarkerShape::X,
            other => {
                log::warn!("marker '{other}' not understood. Defaulting to circle.");
                MarkerShape::Circle
            }
        };
        Some(shape)
    }

    /// Stroke-only glyphs get no fill.
    pub fn is_filled(self) -> bool {
        !matches!(self, MarkerShape::Plus | MarkerShape::X)
    }

    pub fn unit_path(self) -> RawPath {
        match self {
            MarkerShape::Circle => circle(0.5),
            MarkerShape::Point => circle(0.25),
            MarkerShape::Square => closed(vec![[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]]),
            MarkerShape::TriangleUp => regular(3, 0.5, 90.0),
            MarkerShape::TriangleDown => regular(3, 0.5, -90.0),
            MarkerShape::TriangleLeft => regular(3, 0.5, 180.0),
            MarkerShape::TriangleRight => regular(3, 0.5, 0.0),
            MarkerShape::Diamond => regular(4, 0.5, 90.0),
            MarkerShape::ThinDiamond => {
                let mut p = regular(4, 0.5, 90.0);
                for v in &mut p.vertices {
                    v[0] *= 0.6;
                }
                p
            }
            MarkerShape::Pentagon => regular(5, 0.5, 90.0),
            MarkerShape::Hexagon => regular(6, 0.5, 90.0),
            MarkerShape::Star => star(0.5, 0.19),
            MarkerShape::Plus => strokes(&[[[-0.5, 0.0], [0.5, 0.0]], [[0.0, -0.5], [0.0, 0.5]]]),
            MarkerShape::X => strokes(&[[[-0.5, -0.5], [0.5, 0.5]], [[-0.5, 0.5], [0.5, -0.5]]]),
        }
    }
}

fn closed(points: Vec<Point>) -> RawPath {
    RawPath::polygon(points)
}

fn regular(n: usize, radius: f64, start_deg: f64) -> RawPath {
    let pts = (0..n)
        .map(|i| {
            let t = start_deg.to_radians() + 2.0 * PI * i as f64 / n as f64;
            [radius * t.cos(), radius * t.sin()]
        })
        .collect();
    closed(pts)
}

fn star(outer: f64, inner: f64) -> RawPath {
    let pts = (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let t = PI / 2.0 + PI * i as f64 / 5.0;
            [r * t.cos(), r * t.sin()]
        })
        .collect();
    closed(pts)
}

fn circle(r: f64) -> RawPath {
    let k = KAPPA * r;
    let vertices = vec![
        [r, 0.0],
        [r, k],
        [k, r],
        [0.0, r],
        [-k, r],
        [-r, k],
        [-r, 0.0],
        [-r, -k],
        [-k, -r],
        [0.0, -r],
        [k, -r],
        [r, -k],
        [r, 0.0],
        [r, 0.0],
    ];
    let mut codes = vec![1];
    codes.extend(std::iter::repeat_n(4, 12));
    codes.push(79);
    RawPath::new(vertices, codes)
}

fn strokes(segments: &[[Point; 2]]) -> RawPath {
    let mut path = RawPath::default();
    for [a, b] in segments {
        path.vertices.extend([*a, *b]);
        path.codes.extend([1, 2]);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathCode, decode};

    #[test]
    fn hidden_marker_spellings() {
        for s in ["", " ", "none", "None"] {
            assert_eq!(MarkerShape::parse(s), None, "{s:?}");
        }
        assert_eq!(MarkerShape::parse("o"), Some(MarkerShape::Circle));
        assert_eq!(MarkerShape::parse("?"), Some(MarkerShape::Circle));
    }

    #[test]
    fn every_shape_decodes() {
        let shapes = [
            MarkerShape::Circle,
            MarkerShape::Point,
            MarkerShape::Square,
            MarkerShape::TriangleUp,
            MarkerShape::TriangleDown,
            MarkerShape::TriangleLeft,
            MarkerShape::TriangleRight,
            MarkerShape::Diamond,
            MarkerShape::ThinDiamond,
            MarkerShape::Pentagon,
            MarkerShape::Hexagon,
            MarkerShape::Star,
            MarkerShape::Plus,
            MarkerShape::X,
        ];
        for s in shapes {
            let g = decode(&s.unit_path(), None).unwrap();
            assert_eq!(g.codes[0], PathCode::MoveTo, "{s:?}");
            for [x, y] in &g.vertices {
                assert!(x.abs() <= 0.5 + 1e-9 && y.abs() <= 0.5 + 1e-9, "{s:?}");
            }
        }
    }

    #[test]
    fn circle_uses_cubic_segments() {
        let g = decode(&MarkerShape::Circle.unit_path(), None).unwrap();
        assert_eq!(g.codes.iter().filter(|c| **c == PathCode::CurveTo4).count(), 4);
        assert_eq!(g.codes.last(), Some(&PathCode::ClosePath));
    }
}
