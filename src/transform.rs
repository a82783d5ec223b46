//! Coordinate transforms: affine helpers for glyph paths and the per-export
//! projection that maps data coordinates to longitude/latitude.

use crate::error::{ExportError, Result};
use crate::models::Point;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Anything that maps a 2D point to another 2D point.
pub trait PointTransform {
    fn apply(&self, p: Point) -> Point;

    fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.apply(*p)).collect()
    }
}

/// Row-major 2x3 affine matrix `[a, b, c; d, e, f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2D {
    m: [f64; 6],
}

impl Affine2D {
    pub fn identity() -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            m: [sx, 0.0, 0.0, 0.0, sy, 0.0],
        }
    }
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl PointTransform for Affine2D {
    fn apply(&self, [x, y]: Point) -> Point {
        let [a, b, c, d, e, f] = self.m;
        [a * x + b * y + c, d * x + e * y + f]
    }
}


/// Source coordinate system of the figure's data, inverted to lon/lat on apply.
#[derive(Debug)]
pub enum Projection {
    /// Data already is longitude/latitude.
    Identity,
    /// Spherical (web) mercator meters.
    WebMercator,
    /// Any other CRS PROJ understands.
    #[cfg(feature = "proj")]
    Proj(Reprojector),
}

const EARTH_RADIUS_M: f64 = 6_378_137.0;

static EPSG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*epsg:(\d+)\s*$").expect("valid EPSG regex"));

/// Pick the projection for one export call.
///
/// At most one of `crs` and `epsg` may be given. With neither, the data is
/// assumed to be longitude/latitude already. Lon/lat and web mercator are
/// handled in closed form; every other CRS needs the `proj` feature.
pub fn resolve(crs: Option<&str>, epsg: Option<u32>) -> Result<Projection> {
    match (crs, epsg) {
        (Some(_), Some(_)) => Err(ExportError::ConflictingProjection),
        (None, None) => Ok(Projection::Identity),
        (None, Some(code)) => from_definition(&format!("EPSG:{code}")),
        (Some(def), None) => from_definition(def),
    }
}

fn from_definition(def: &str) -> Result<Projection> {
    match closed_form(def) {
        Some(projection) => Ok(projection),
        None => reproject(def.trim()),
    }
}

/// `EPSG:nnnn` or a PROJ string (`+proj=longlat`, `+proj=webmerc`, ...) that
/// needs no PROJ database.
fn closed_form(def: &str) -> Option<Projection> {
    if let Some(caps) = EPSG_RE.captures(def) {
        return match caps[1].parse::<u32>().ok()? {
            4326 | 4269 | 4258 => Some(Projection::Identity),
            3857 | 3785 | 900913 | 102100 => Some(Projection::WebMercator),
            _ => None,
        };
    }

    let params: HashMap<&str, Option<&str>> = def
        .split_whitespace()
        .filter_map(|tok| tok.strip_prefix('+'))
        .map(|tok| match tok.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (tok, None),
        })
        .collect();
    let param = |key: &str| params.get(key).copied().flatten();

    match param("proj")? {
        "longlat" | "latlong" | "lonlat" => Some(Projection::Identity),
        "webmerc" => Some(Projection::WebMercator),
        // Mercator on the web-mercator sphere; ellipsoidal mercator goes to PROJ.
        "merc" if param("a") == Some("6378137") && param("b") == Some("6378137") => {
            Some(Projection::WebMercator)
        }
        _ => None,
    }
}

#[cfg(feature = "proj")]
fn reproject(def: &str) -> Result<Projection> {
    Reprojector::new(def).map(Projection::Proj)
}

#[cfg(not(feature = "proj"))]
fn reproject(def: &str) -> Result<Projection> {
    Err(ExportError::UnsupportedProjection(def.to_string()))
}

/// PROJ pipeline from a source CRS to EPSG:4326, in lon/lat axis order.
#[cfg(feature = "proj")]
pub struct Reprojector {
    source: String,
    inner: proj::Proj,
}

#[cfg(feature = "proj")]
impl Reprojector {
    pub fn new(source: &str) -> Result<Self> {
        let inner = proj::Proj::new_known_crs(source, "EPSG:4326", None)
            .map_err(|e| ExportError::UnsupportedProjection(format!("{source}: {e}")))?;
        Ok(Self {
            source: source.to_string(),
            inner,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Points PROJ cannot convert come out non-finite, which breaks lines there.
    fn to_lonlat(&self, [x, y]: Point) -> Point {
        match self.inner.convert((x, y)) {
            Ok((lon, lat)) => [lon, lat],
            Err(e) => {
                log::debug!("cannot reproject ({x}, {y}) from {}: {e}", self.source);
                [f64::NAN, f64::NAN]
            }
        }
    }
}

#[cfg(feature = "proj")]
impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("source", &self.source)
            .finish()
    }
}

impl PointTransform for Projection {
    fn apply(&self, p: Point) -> Point {
        match self {
            Projection::Identity => p,
            Projection::WebMercator => mercator_to_lonlat(p),
            #[cfg(feature = "proj")]
            Projection::Proj(reprojector) => reprojector.to_lonlat(p),
        }
    }
}

fn mercator_to_lonlat([x, y]: Point) -> Point {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    [lon, lat]
}
