//! Style extraction: host paint attributes to normalized, serializable style records.
//!
//! Colors resolve to `"none"`, `#RRGGBB` or `rgba(r, g, b, a)`. Dash patterns
//! resolve to an SVG dash array or `None` for an undashed stroke.

use crate::error::{ExportError, Result};
use crate::marker::MarkerShape;
use crate::models::{Color, Line, MarkerProps, PathPatch, Text};
use crate::path::{Geometry, decode};
use crate::transform::Affine2D;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let nib = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok().map(|v| v * 17);
        let (r, g, b, a) = match digits.len() {
            3 => (nib(0)?, nib(1)?, nib(2)?, 255),
            6 => (byte(0)?, byte(2)?, byte(4)?, 255),
            8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
            _ => return None,
        };
        Some(Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        })
    }
}

/// Property-cycle colors `C0`..`C9`.
const CYCLE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

fn named(name: &str) -> Option<Rgba> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "b" => Rgba::rgb(0.0, 0.0, 1.0),
        "g" => Rgba::rgb(0.0, 0.5, 0.0),
        "r" => Rgba::rgb(1.0, 0.0, 0.0),
        "c" => Rgba::rgb(0.0, 0.75, 0.75),
        "m" => Rgba::rgb(0.75, 0.0, 0.75),
        "y" => Rgba::rgb(0.75, 0.75, 0.0),
        "k" | "black" => Rgba::rgb(0.0, 0.0, 0.0),
        "w" | "white" => Rgba::rgb(1.0, 1.0, 1.0),
        "red" => Rgba::rgb(1.0, 0.0, 0.0),
        "green" => Rgba::rgb(0.0, 128.0 / 255.0, 0.0),
        "blue" => Rgba::rgb(0.0, 0.0, 1.0),
        "cyan" => Rgba::rgb(0.0, 1.0, 1.0),
        "magenta" => Rgba::rgb(1.0, 0.0, 1.0),
        "yellow" => Rgba::rgb(1.0, 1.0, 0.0),
        "gray" | "grey" => Rgba::rgb(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0),
        "orange" => Rgba::rgb(1.0, 165.0 / 255.0, 0.0),
        "purple" => Rgba::rgb(128.0 / 255.0, 0.0, 128.0 / 255.0),
        "brown" => Rgba::rgb(165.0 / 255.0, 42.0 / 255.0, 42.0 / 255.0),
        "pink" => Rgba::rgb(1.0, 192.0 / 255.0, 203.0 / 255.0),
        "navy" => Rgba::rgb(0.0, 0.0, 128.0 / 255.0),
        _ => return None,
    };
    Some(rgb)
}

static RGBA_FN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^rgba?\(\s*([0-9.]+)\s*,\s*([0-9.]+)\s*,\s*([0-9.]+)\s*(?:,\s*([0-9.eE+-]+)\s*)?\)$",
    )
    .expect("valid rgba() regex")
});

/// Parse a host color. `Ok(None)` is the explicit "no color" spelling.
pub fn parse_color(color: &Color) -> Result<Option<Rgba>> {
    let invalid = || ExportError::InvalidColor(format!("{color:?}"));
    let rgba = match color {
        Color::Rgba([r, g, b, a]) => Rgba {
            r: *r,
            g: *g,
            b: *b,
            a: *a,
        },
        Color::Rgb([r, g, b]) => Rgba::rgb(*r, *g, *b),
        Color::Spec(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("none") {
                return Ok(None);
            }
            if s.starts_with('#') {
                Rgba::from_hex(s).ok_or_else(invalid)?
            } else if let Some(caps) = RGBA_FN_RE.captures(s) {
                let ch = |i: usize| -> Result<f64> {
                    caps[i].parse::<f64>().map(|v| v / 255.0).map_err(|_| invalid())
                };
                let a = match caps.get(4) {
                    Some(m) => m.as_str().parse::<f64>().map_err(|_| invalid())?,
                    None => 1.0,
                };
                Rgba {
                    r: ch(1)?,
                    g: ch(2)?,
                    b: ch(3)?,
                    a,
                }
            } else if let Some(idx) = s.strip_prefix('C').and_then(|d| d.parse::<usize>().ok()) {
                Rgba::from_hex(CYCLE[idx % CYCLE.len()]).ok_or_else(invalid)?
            } else if let Ok(level) = s.parse::<f64>() {
                // grayscale level string, e.g. "0.75"
                if !(0.0..=1.0).contains(&level) {
                    return Err(invalid());
                }
                Rgba::rgb(level, level, level)
            } else {
                named(s).ok_or_else(invalid)?
            }
        }
    };
    Ok(Some(rgba))
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// `"none"` when unset or fully transparent, `#RRGGBB` when opaque, `rgba(…)` otherwise.
pub fn resolve_color(color: Option<&Rgba>) -> String {
    match color {
        None => "none".into(),
        Some(c) if c.a == 0.0 => "none".into(),
        Some(c) if c.a == 1.0 => format!(
            "#{:02X}{:02X}{:02X}",
            channel(c.r),
            channel(c.g),
            channel(c.b)
        ),
        Some(c) => format!(
            "rgba({}, {}, {}, {})",
            channel(c.r),
            channel(c.g),
            channel(c.b),
            c.a
        ),
    }
}

/// Parse and resolve in one step.
pub fn export_color(color: Option<&Color>) -> Result<String> {
    let parsed = match color {
        Some(c) => parse_color(c)?,
        None => None,
    };
    Ok(resolve_color(parsed.as_ref()))
}

/// Named line styles the host understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
    Dotted,
    DashDot,
    /// No stroke at all.
    Hidden,
}

impl LineKind {
    pub fn parse(spelling: &str) -> Option<LineKind> {
        match spelling {
            "solid" | "-" => Some(LineKind::Solid),
            "dashed" | "--" => Some(LineKind::Dashed),
            "dotted" | ":" => Some(LineKind::Dotted),
            "dashdot" | "-." => Some(LineKind::DashDot),
            "" | " " | "None" | "none" => Some(LineKind::Hidden),
            _ => None,
        }
    }

    /// Like [`LineKind::parse`], but unknown spellings warn and fall back to solid.
    pub fn resolve(spelling: &str) -> LineKind {
        LineKind::parse(spelling).unwrap_or_else(|| {
            log::warn!("line style '{spelling}' not understood. Defaulting to solid line.");
            LineKind::Solid
        })
    }

    pub fn dasharray(self) -> Option<&'static str> {
        match self {
            LineKind::Solid | LineKind::Hidden => None,
            LineKind::Dashed => Some("6,6"),
            LineKind::Dotted => Some("2,2"),
            LineKind::DashDot => Some("4,4,2,4"),
        }
    }

    pub fn draws(self) -> bool {
        self != LineKind::Hidden
    }
}

/// SVG dash array for a stroke; `None` means an undashed line.
///
/// An explicit per-instance dash sequence wins over the named style.
pub fn resolve_dash(dashes: Option<&[f64]>, linestyle: &str) -> Option<String> {
    if let Some(seq) = dashes.filter(|s| !s.is_empty()) {
        return Some(
            seq.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    LineKind::resolve(linestyle).dasharray().map(str::to_string)
}

fn alpha_or_opaque(alpha: Option<f64>) -> f64 {
    alpha.unwrap_or(1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub alpha: f64,
    pub color: String,
    pub linewidth: f64,
    pub dasharray: Option<String>,
    pub zorder: i32,
    pub drawstyle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStyle {
    pub alpha: f64,
    pub edgecolor: String,
    pub facecolor: String,
    pub edgewidth: f64,
    pub dasharray: Option<String>,
    pub zorder: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub alpha: f64,
    pub fontsize: f64,
    pub color: String,
    pub halign: String,
    pub valign: String,
    pub malign: Option<String>,
    pub rotation: f64,
    pub zorder: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub alpha: f64,
    pub facecolor: String,
    pub edgecolor: String,
    pub edgewidth: f64,
    pub marker: String,
    /// Glyph outline in pixels, y pointing down, centered on the data point.
    pub markerpath: Geometry,
    pub markersize: f64,
    pub zorder: i32,
}

pub fn extract_line_style(line: &Line) -> Result<LineStyle> {
    Ok(LineStyle {
        alpha: alpha_or_opaque(line.alpha),
        color: export_color(line.color.as_ref())?,
        linewidth: line.linewidth,
        dasharray: resolve_dash(line.dashes.as_deref(), &line.linestyle),
        zorder: line.zorder,
        drawstyle: line.drawstyle.clone(),
    })
}

/// With `fill == false` the face color is forced to `"none"`.
pub fn extract_path_style(path: &PathPatch, fill: bool) -> Result<PathStyle> {
    let facecolor = if fill {
        export_color(path.facecolor.as_ref())?
    } else {
        "none".into()
    };
    Ok(PathStyle {
        alpha: alpha_or_opaque(path.alpha),
        edgecolor: export_color(path.edgecolor.as_ref())?,
        facecolor,
        edgewidth: path.linewidth,
        dasharray: resolve_dash(path.dashes.as_deref(), &path.linestyle),
        zorder: path.zorder,
    })
}

pub fn extract_text_style(text: &Text) -> Result<TextStyle> {
    Ok(TextStyle {
        alpha: alpha_or_opaque(text.alpha),
        fontsize: text.fontsize,
        color: export_color(text.color.as_ref())?,
        halign: text.halign.clone(),
        valign: text.valign.clone(),
        malign: text.multialign.clone(),
        rotation: text.rotation,
        zorder: text.zorder,
    })
}

/// Marker style for a line or scatter; `Ok(None)` when the marker is hidden.
pub fn extract_marker_style(
    marker: &MarkerProps,
    alpha: Option<f64>,
    zorder: i32,
) -> Result<Option<MarkerStyle>> {
    let Some(shape) = MarkerShape::parse(&marker.symbol) else {
        return Ok(None);
    };
    let facecolor = if shape.is_filled() {
        export_color(marker.facecolor.as_ref())?
    } else {
        "none".into()
    };
    let scale = Affine2D::scale(marker.size, -marker.size);
    Ok(Some(MarkerStyle {
        alpha: alpha_or_opaque(alpha),
        facecolor,
        edgecolor: export_color(marker.edgecolor.as_ref())?,
        edgewidth: marker.edgewidth,
        marker: marker.symbol.clone(),
        markerpath: decode(&shape.unit_path(), Some(&scale))?,
        markersize: marker.size,
        zorder,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, Once};

    fn resolve_spec(s: &str) -> String {
        export_color(Some(&Color::from(s))).unwrap()
    }

    #[test]
    fn zero_alpha_and_unset_are_none() {
        assert_eq!(resolve_color(None), "none");
        assert_eq!(resolve_spec("none"), "none");
        assert_eq!(
            export_color(Some(&Color::Rgba([1.0, 0.0, 0.0, 0.0]))).unwrap(),
            "none"
        );
        assert_eq!(export_color(None).unwrap(), "none");
    }

    #[test]
    fn opaque_colors_are_uppercase_hex() {
        assert_eq!(resolve_spec("C0"), "#1F77B4");
        assert_eq!(resolve_spec("#ff8000"), "#FF8000");
        assert_eq!(resolve_spec("k"), "#000000");
        assert_eq!(resolve_spec("0.5"), "#808080");
        assert_eq!(resolve_spec("#fff"), "#FFFFFF");
    }

    #[test]
    fn translucent_colors_keep_their_alpha() {
        let out = export_color(Some(&Color::Rgba([1.0, 0.5, 0.0, 0.25]))).unwrap();
        assert_eq!(out, "rgba(255, 128, 0, 0.25)");
    }

    #[test]
    fn resolution_is_idempotent() {
        for spec in [
            Color::from("C3"),
            Color::Rgba([0.1, 0.2, 0.3, 0.4]),
            Color::Rgba([0.9, 0.8, 0.7, 1.0]),
            Color::from("none"),
        ] {
            let once = export_color(Some(&spec)).unwrap();
            let twice = export_color(Some(&Color::Spec(once.clone()))).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn garbage_color_is_an_error() {
        assert!(matches!(
            export_color(Some(&Color::from("not-a-color"))),
            Err(ExportError::InvalidColor(_))
        ));
    }

    #[test]
    fn dash_table() {
        assert_eq!(resolve_dash(Some(&[6.0, 6.0]), "solid").as_deref(), Some("6,6"));
        assert_eq!(resolve_dash(None, "dashed").as_deref(), Some("6,6"));
        assert_eq!(resolve_dash(None, "--").as_deref(), Some("6,6"));
        assert_eq!(resolve_dash(None, ":").as_deref(), Some("2,2"));
        assert_eq!(resolve_dash(None, "-.").as_deref(), Some("4,4,2,4"));
        assert_eq!(resolve_dash(None, "solid"), None);
        assert_eq!(resolve_dash(None, "None"), None);
        assert_eq!(resolve_dash(Some(&[3.5, 1.0]), "solid").as_deref(), Some("3.5,1"));
    }

    struct CaptureLog(Mutex<Vec<(log::Level, String)>>);

    impl log::Log for CaptureLog {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = self.0.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLog = CaptureLog(Mutex::new(Vec::new()));

    // Tests run in parallel, so callers filter records by their own message.
    fn capture_log() -> &'static CaptureLog {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&CAPTURE).unwrap();
            log::set_max_level(log::LevelFilter::Trace);
        });
        &CAPTURE
    }

    #[test]
    fn unknown_linestyle_logs_one_warning() {
        let capture = capture_log();
        assert_eq!(resolve_dash(None, "squiggle"), resolve_dash(None, "solid"));

        let records = capture.0.lock().unwrap();
        let hits: Vec<_> = records
            .iter()
            .filter(|(_, msg)| msg.contains("'squiggle'"))
            .collect();
        assert_eq!(hits.len(), 1, "{records:?}");
        assert_eq!(hits[0].0, log::Level::Warn);
        assert!(hits[0].1.contains("Defaulting to solid line"));
    }

    #[test]
    fn unknown_linestyle_falls_back_to_solid() {
        assert_eq!(resolve_dash(None, "wiggly"), resolve_dash(None, "solid"));
        assert_eq!(LineKind::resolve("wiggly"), LineKind::Solid);
        assert!(!LineKind::resolve("None").draws());
    }

    #[test]
    fn unfilled_path_has_no_face() {
        let patch = PathPatch::new(crate::models::RawPath::polygon(vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
        ]));
        let s = extract_path_style(&patch, false).unwrap();
        assert_eq!(s.facecolor, "none");
        assert_eq!(s.edgecolor, "#1F77B4");
        assert_eq!(s.alpha, 1.0);
        assert_eq!(s.dasharray, None);
    }

    #[test]
    fn marker_style_scales_glyph_and_flips_y() {
        let props = MarkerProps::new("^", 10.0);
        let s = extract_marker_style(&props, Some(0.5), 4).unwrap().unwrap();
        assert_eq!(s.alpha, 0.5);
        assert_eq!(s.zorder, 4);
        // apex of the upward triangle points to negative y in screen space
        let apex = s.markerpath.vertices[0];
        assert!(apex[0].abs() < 1e-9);
        assert!((apex[1] + 5.0).abs() < 1e-9);
        assert!(extract_marker_style(&MarkerProps::new("None", 10.0), None, 1)
            .unwrap()
            .is_none());
    }

    #[test]
    fn stroke_only_markers_have_no_face() {
        let s = extract_marker_style(&MarkerProps::new("x", 8.0), None, 2).unwrap().unwrap();
        assert_eq!(s.facecolor, "none");
    }
}
