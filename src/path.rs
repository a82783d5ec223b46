//! Geometry codec: host paths to typed segment codes, and segment codes back to rings.

use crate::error::{ExportError, Result};
use crate::models::{Point, RawPath};
use crate::transform::PointTransform;
use serde::Serialize;

/// Host command codes.
const HOST_STOP: u8 = 0;
const HOST_MOVETO: u8 = 1;
const HOST_LINETO: u8 = 2;
const HOST_CURVE3: u8 = 3;
const HOST_CURVE4: u8 = 4;
const HOST_CLOSEPOLY: u8 = 79;

/// Normalized segment command; serializes as its SVG letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathCode {
    #[serde(rename = "M")]
    MoveTo,
    #[serde(rename = "L")]
    LineTo,
    /// Quadratic Bézier: control point + end point.
    #[serde(rename = "S")]
    CurveTo3,
    /// Cubic Bézier: two control points + end point.
    #[serde(rename = "C")]
    CurveTo4,
    #[serde(rename = "Z")]
    ClosePath,
}

impl PathCode {
    /// `Ok(None)` marks the end of the path.
    fn from_host(code: u8) -> Result<Option<Self>> {
        match code {
            HOST_STOP => Ok(None),
            HOST_MOVETO => Ok(Some(PathCode::MoveTo)),
            HOST_LINETO => Ok(Some(PathCode::LineTo)),
            HOST_CURVE3 => Ok(Some(PathCode::CurveTo3)),
            HOST_CURVE4 => Ok(Some(PathCode::CurveTo4)),
            HOST_CLOSEPOLY => Ok(Some(PathCode::ClosePath)),
            other => Err(ExportError::UnrecognizedCommand(other)),
        }
    }

    /// Vertices this code contributes to a decoded vertex list.
    pub fn vertex_count(self) -> usize {
        match self {
            PathCode::MoveTo | PathCode::LineTo => 1,
            PathCode::CurveTo3 => 2,
            PathCode::CurveTo4 => 3,
            PathCode::ClosePath => 0,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PathCode::MoveTo => 'M',
            PathCode::LineTo => 'L',
            PathCode::CurveTo3 => 'S',
            PathCode::CurveTo4 => 'C',
            PathCode::ClosePath => 'Z',
        }
    }

    fn name(self) -> &'static str {
        match self {
            PathCode::MoveTo => "moveto",
            PathCode::LineTo => "lineto",
            PathCode::CurveTo3 => "curve3",
            PathCode::CurveTo4 => "curve4",
            PathCode::ClosePath => "closepoly",
        }
    }
}

/// Decoded path: flat vertex list plus one code per segment.
///
/// Curve segments report all of their vertices; `ClosePath` reports none.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Geometry {
    pub vertices: Vec<Point>,
    pub codes: Vec<PathCode>,
}

impl Geometry {
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn rings(&self) -> Rings<'_> {
        build_rings(&self.vertices, &self.codes)
    }

    pub fn transformed(&self, t: &dyn PointTransform) -> Geometry {
        Geometry {
            vertices: t.apply_all(&self.vertices),
            codes: self.codes.clone(),
        }
    }

    /// SVG path data (`M x y L x y … Z`).
    pub fn to_svg_d(&self) -> String {
        let mut out = String::new();
        let mut vi = 0;
        for code in &self.codes {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push(code.letter());
            let seg = self
                .vertices
                .get(vi..vi + code.vertex_count())
                .unwrap_or_default();
            for [x, y] in seg {
                out.push_str(&format!(" {} {}", svg_num(*x), svg_num(*y)));
            }
            vi += code.vertex_count();
        }
        out
    }
}

pub(crate) fn svg_num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".into() } else { s.to_string() }
}

/// Decode a host path into vertices and segment codes.
///
/// The optional transform is applied to every vertex. An empty path decodes to
/// an empty geometry.
pub fn decode(path: &RawPath, transform: Option<&dyn PointTransform>) -> Result<Geometry> {
    let vertices: Vec<Point> = match transform {
        Some(t) => t.apply_all(&path.vertices),
        None => path.vertices.clone(),
    };

    if path.codes.is_empty() {
        let codes = (0..vertices.len())
            .map(|i| {
                if i == 0 {
                    PathCode::MoveTo
                } else {
                    PathCode::LineTo
                }
            })
            .collect();
        return Ok(Geometry { vertices, codes });
    }
    if path.codes.len() != vertices.len() {
        return Err(ExportError::CodeCountMismatch {
            vertices: vertices.len(),
            codes: path.codes.len(),
        });
    }

    let mut out = Geometry::default();
    let mut i = 0;
    while i < vertices.len() {
        let Some(code) = PathCode::from_host(path.codes[i])? else {
            break;
        };
        // closepoly still occupies one (ignored) host vertex
        let consumed = code.vertex_count().max(1);
        if i + consumed > vertices.len() {
            return Err(ExportError::TruncatedPath {
                command: code.name(),
                needed: consumed,
                available: vertices.len() - i,
            });
        }
        if code != PathCode::ClosePath {
            out.vertices.extend_from_slice(&vertices[i..i + consumed]);
        }
        out.codes.push(code);
        i += consumed;
    }
    Ok(out)
}

/// Polyline geometry through `data`; non-finite points lift the pen.
pub fn line_path(data: &[Point]) -> Geometry {
    let mut out = Geometry::default();
    let mut pen_up = true;
    for p in data {
        if !(p[0].is_finite() && p[1].is_finite()) {
            pen_up = true;
            continue;
        }
        out.codes.push(if pen_up {
            PathCode::MoveTo
        } else {
            PathCode::LineTo
        });
        out.vertices.push(*p);
        pen_up = false;
    }
    out
}

/// One contour of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub points: Vec<Point>,
    /// A `ClosePath` ended this contour.
    pub closed: bool,
}

impl Ring {
    /// Shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut acc = 0.0;
        for i in 0..n {
            let [x0, y0] = self.points[i];
            let [x1, y1] = self.points[(i + 1) % n];
            acc += x0 * y1 - x1 * y0;
        }
        acc / 2.0
    }

    /// Points with the first point repeated at the end, as GeoJSON polygons expect.
    pub fn closed_points(&self) -> Vec<Point> {
        let mut pts = self.points.clone();
        if let (Some(first), Some(last)) = (pts.first().copied(), pts.last().copied())
            && first != last
        {
            pts.push(first);
        }
        pts
    }
}

/// Split decoded geometry into rings at every `MoveTo`.
///
/// Single pass and lazy. A `MoveTo` directly after another `MoveTo` yields a
/// single-point ring.
pub fn build_rings<'a>(vertices: &'a [Point], codes: &'a [PathCode]) -> Rings<'a> {
    Rings {
        vertices,
        codes,
        vi: 0,
        ci: 0,
        current: Vec::new(),
        closed: false,
        done: false,
    }
}

pub struct Rings<'a> {
    vertices: &'a [Point],
    codes: &'a [PathCode],
    vi: usize,
    ci: usize,
    current: Vec<Point>,
    closed: bool,
    done: bool,
}

impl Rings<'_> {
    fn take_ring(&mut self) -> Option<Ring> {
        let closed = std::mem::replace(&mut self.closed, false);
        if self.current.is_empty() {
            return None;
        }
        Some(Ring {
            points: std::mem::take(&mut self.current),
            closed,
        })
    }
}

impl Iterator for Rings<'_> {
    type Item = Result<Ring>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while let Some(&code) = self.codes.get(self.ci) {
            self.ci += 1;
            let need = code.vertex_count();
            let Some(points) = self.vertices.get(self.vi..self.vi + need) else {
                self.done = true;
                return Some(Err(ExportError::TruncatedPath {
                    command: code.name(),
                    needed: need,
                    available: self.vertices.len().saturating_sub(self.vi),
                }));
            };
            self.vi += need;
            match code {
                PathCode::MoveTo => {
                    let finished = self.take_ring();
                    self.current.push(points[0]);
                    if let Some(ring) = finished {
                        return Some(Ok(ring));
                    }
                }
                PathCode::LineTo | PathCode::CurveTo3 | PathCode::CurveTo4 => {
                    self.current.extend_from_slice(points)
                }
                PathCode::ClosePath => self.closed = true,
            }
        }
        self.done = true;
        self.take_ring().map(Ok)
    }
}

impl std::iter::FusedIterator for Rings<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Affine2D;

    fn square(x0: f64) -> Vec<Point> {
        vec![[x0, 0.0], [x0 + 1.0, 0.0], [x0 + 1.0, 1.0], [x0, 1.0], [x0, 0.0]]
    }

    #[test]
    fn empty_path_decodes_to_nothing() {
        let g = decode(&RawPath::default(), None).unwrap();
        assert!(g.vertices.is_empty());
        assert!(g.codes.is_empty());
        assert_eq!(g.rings().count(), 0);
    }

    #[test]
    fn closepoly_drops_its_vertex() {
        let g = decode(&RawPath::new(square(0.0), vec![1, 2, 2, 2, 79]), None).unwrap();
        assert_eq!(g.vertices.len(), 4);
        assert_eq!(
            g.codes,
            vec![
                PathCode::MoveTo,
                PathCode::LineTo,
                PathCode::LineTo,
                PathCode::LineTo,
                PathCode::ClosePath
            ]
        );
        let rings: Vec<Ring> = g.rings().collect::<Result<_>>().unwrap();
        assert_eq!(rings.len(), 1);
        assert!(rings[0].closed);
        assert_eq!(rings[0].points.len(), 4);
    }

    #[test]
    fn curves_keep_every_vertex() {
        let verts = vec![[0.0, 0.0], [1.0, 1.0], [2.0, 0.0], [3.0, 1.0], [4.0, 1.0], [5.0, 0.0]];
        let g = decode(&RawPath::new(verts, vec![1, 3, 3, 4, 4, 4]), None).unwrap();
        assert_eq!(g.codes, vec![PathCode::MoveTo, PathCode::CurveTo3, PathCode::CurveTo4]);
        assert_eq!(g.vertices.len(), 6);
        let rings: Vec<Ring> = g.rings().collect::<Result<_>>().unwrap();
        assert_eq!(rings[0].points.len(), 6);
        assert_eq!(g.to_svg_d(), "M 0 0 S 1 1 2 0 C 3 1 4 1 5 0");
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = decode(&RawPath::new(vec![[0.0, 0.0], [1.0, 1.0]], vec![1, 7]), None);
        assert_eq!(err, Err(ExportError::UnrecognizedCommand(7)));
    }

    #[test]
    fn truncated_curve_is_rejected() {
        let err = decode(&RawPath::new(vec![[0.0, 0.0], [1.0, 1.0]], vec![1, 4]), None);
        assert!(matches!(err, Err(ExportError::TruncatedPath { .. })));
    }

    #[test]
    fn stop_code_ends_the_path() {
        let g = decode(
            &RawPath::new(vec![[0.0, 0.0], [1.0, 1.0], [9.0, 9.0]], vec![1, 2, 0]),
            None,
        )
        .unwrap();
        assert_eq!(g.vertices, vec![[0.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn transform_applies_before_codes() {
        let t = Affine2D::scale(2.0, -1.0);
        let g = decode(&RawPath::new(vec![[1.0, 1.0], [2.0, 3.0]], vec![]), Some(&t)).unwrap();
        assert_eq!(g.vertices, vec![[2.0, -1.0], [4.0, -3.0]]);
        assert_eq!(g.codes, vec![PathCode::MoveTo, PathCode::LineTo]);
    }

    #[test]
    fn rings_split_at_each_moveto_and_conserve_vertices() {
        let mut verts = square(0.0);
        verts.extend(square(5.0));
        let codes = vec![1, 2, 2, 2, 79, 1, 2, 2, 2, 79];
        let g = decode(&RawPath::new(verts, codes), None).unwrap();
        let rings: Vec<Ring> = g.rings().collect::<Result<_>>().unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].points[0], [0.0, 0.0]);
        assert_eq!(rings[1].points[0], [5.0, 0.0]);
        let total: usize = rings.iter().map(|r| r.points.len()).sum();
        assert_eq!(total, g.vertices.len());
    }

    #[test]
    fn back_to_back_moveto_yields_single_point_ring() {
        let codes = [PathCode::MoveTo, PathCode::MoveTo, PathCode::LineTo];
        let verts = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        let rings: Vec<Ring> = build_rings(&verts, &codes).collect::<Result<_>>().unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].points, vec![[0.0, 0.0]]);
        assert_eq!(rings[1].points, vec![[1.0, 1.0], [2.0, 2.0]]);
    }

    #[test]
    fn rings_report_missing_vertices() {
        let codes = [PathCode::MoveTo, PathCode::LineTo];
        let verts = [[0.0, 0.0]];
        let mut it = build_rings(&verts, &codes);
        assert!(matches!(it.next(), Some(Err(ExportError::TruncatedPath { .. }))));
        assert!(it.next().is_none());
    }

    #[test]
    fn line_path_breaks_at_nan() {
        let g = line_path(&[[0.0, 0.0], [1.0, 1.0], [f64::NAN, 2.0], [3.0, 3.0], [4.0, 4.0]]);
        assert_eq!(
            g.codes,
            vec![PathCode::MoveTo, PathCode::LineTo, PathCode::MoveTo, PathCode::LineTo]
        );
        assert_eq!(g.rings().count(), 2);
    }

    #[test]
    fn signed_area_follows_winding() {
        let ccw = Ring {
            points: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            closed: true,
        };
        assert_eq!(ccw.signed_area(), 1.0);
        let mut cw = ccw.clone();
        cw.points.reverse();
        assert_eq!(cw.signed_area(), -1.0);
        assert_eq!(ccw.closed_points().len(), 5);
    }
}
