//! Read-only snapshot of a plot scene graph.
//!
//! Every attribute the exporter reads is declared here. Callers build these
//! values directly or deserialize them from JSON; the export pipeline only
//! borrows them.

use serde::{Deserialize, Serialize};

/// A data-space coordinate pair `[x, y]`.
pub type Point = [f64; 2];

/// Default color of the first entry in the host's property cycle.
pub const DEFAULT_CYCLE_COLOR: &str = "C0";

/// Paint specification as written by the host: a string spelling or raw channels in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// `"#RRGGBB"`, `"#RRGGBBAA"`, `"rgba(r, g, b, a)"`, `"none"`, `"C3"`, `"k"`, `"red"`…
    Spec(String),
    Rgba([f64; 4]),
    Rgb([f64; 3]),
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Color::Spec(s.to_string())
    }
}

fn cycle_color() -> Option<Color> {
    Some(Color::from(DEFAULT_CYCLE_COLOR))
}

fn yes() -> bool {
    true
}

fn solid() -> String {
    "solid".into()
}

/// Root container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    /// Width in inches.
    #[serde(default = "Figure::default_width")]
    pub width: f64,
    /// Height in inches.
    #[serde(default = "Figure::default_height")]
    pub height: f64,
    #[serde(default = "Figure::default_dpi")]
    pub dpi: f64,
    #[serde(default)]
    pub axes: Vec<Axes>,
}

impl Figure {
    fn default_width() -> f64 {
        6.4
    }
    fn default_height() -> f64 {
        4.8
    }
    fn default_dpi() -> f64 {
        100.0
    }

    pub fn new(width: f64, height: f64, dpi: f64) -> Self {
        Self {
            width,
            height,
            dpi,
            axes: Vec::new(),
        }
    }

    /// Append an axes and return it for further population.
    pub fn add_axes(&mut self, axes: Axes) -> &mut Axes {
        self.axes.push(axes);
        let last = self.axes.len() - 1;
        &mut self.axes[last]
    }

    /// Pixel size of the rendered figure.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.width * self.dpi, self.height * self.dpi)
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(
            Self::default_width(),
            Self::default_height(),
            Self::default_dpi(),
        )
    }
}

/// One plotting region with exactly two axis objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    #[serde(default = "Axes::default_facecolor")]
    pub facecolor: Option<Color>,
    #[serde(default)]
    pub patch_alpha: Option<f64>,
    #[serde(default = "yes")]
    pub patch_visible: bool,
    #[serde(default = "yes")]
    pub axison: bool,
    #[serde(default = "yes")]
    pub frame_on: bool,
    /// Whether pan/zoom navigation is enabled.
    #[serde(default = "yes")]
    pub navigate: bool,
    /// `[x0, y0, width, height]` in figure-fraction units.
    #[serde(default = "Axes::default_bounds")]
    pub bounds: [f64; 4],
    #[serde(default)]
    pub xaxis: Axis,
    #[serde(default)]
    pub yaxis: Axis,
    #[serde(default = "Axes::default_lim")]
    pub xlim: [f64; 2],
    #[serde(default = "Axes::default_lim")]
    pub ylim: [f64; 2],
    /// Drawables in the order the host draws them.
    #[serde(default)]
    pub primitives: Vec<Primitive>,
}

impl Axes {
    fn default_facecolor() -> Option<Color> {
        Some(Color::from("white"))
    }
    fn default_bounds() -> [f64; 4] {
        [0.125, 0.11, 0.775, 0.77]
    }
    fn default_lim() -> [f64; 2] {
        [0.0, 1.0]
    }

    pub fn push(&mut self, primitive: impl Into<Primitive>) -> &mut Self {
        self.primitives.push(primitive.into());
        self
    }
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            facecolor: Self::default_facecolor(),
            patch_alpha: None,
            patch_visible: true,
            axison: true,
            frame_on: true,
            navigate: true,
            bounds: Self::default_bounds(),
            xaxis: Axis::default(),
            yaxis: Axis::default(),
            xlim: Self::default_lim(),
            ylim: Self::default_lim(),
            primitives: Vec::new(),
        }
    }
}

/// One dimension's scale, ticks and grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Scale name as reported by the host (`linear`, `log`, `symlog`, …).
    #[serde(default = "Axis::default_scale")]
    pub scale: String,
    /// The axis converts calendar time (values are days since 1970-01-01).
    #[serde(default)]
    pub calendar: bool,
    #[serde(default)]
    pub locator: Locator,
    #[serde(default)]
    pub formatter: Option<TickFormatter>,
    /// Major tick labels as currently rendered.
    #[serde(default)]
    pub tick_labels: Vec<TickLabel>,
    /// Tick labels drawn on the primary side (bottom / left).
    #[serde(default = "yes")]
    pub label1_on: bool,
    #[serde(default)]
    pub grid: Grid,
    #[serde(default = "yes")]
    pub visible: bool,
}

impl Axis {
    fn default_scale() -> String {
        "linear".into()
    }
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            scale: Self::default_scale(),
            calendar: false,
            locator: Locator::default(),
            formatter: None,
            tick_labels: Vec::new(),
            label1_on: true,
            grid: Grid::default(),
            visible: true,
        }
    }
}

/// Major tick locations, either pinned by the user or computed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Locator {
    Fixed(Vec<f64>),
    Auto(Vec<f64>),
}

impl Locator {
    pub fn values(&self) -> &[f64] {
        match self {
            Locator::Fixed(v) | Locator::Auto(v) => v,
        }
    }
}

impl Default for Locator {
    fn default() -> Self {
        Locator::Auto(Vec::new())
    }
}

/// Host tick-label formatter kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickFormatter {
    /// Formatter that renders no labels.
    Null,
    /// `str.format`-style template with the tick value bound to field `x`.
    StrMethod { template: String },
    Percent {
        #[serde(default = "TickFormatter::default_xmax")]
        xmax: f64,
        #[serde(default)]
        decimals: Option<u32>,
        #[serde(default = "TickFormatter::default_symbol")]
        symbol: Option<String>,
    },
    /// Literal label list.
    Fixed { labels: Vec<String> },
    /// Legacy index-based formatter; labels are read from the rendered ticks.
    Index,
    /// Any other formatter, identified by name only.
    Other { name: String },
}

impl TickFormatter {
    fn default_xmax() -> f64 {
        100.0
    }
    fn default_symbol() -> Option<String> {
        Some("%".into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLabel {
    #[serde(default)]
    pub text: String,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "TickLabel::default_fontsize")]
    pub fontsize: f64,
}

impl TickLabel {
    fn default_fontsize() -> f64 {
        10.0
    }

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
            fontsize: Self::default_fontsize(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    #[serde(default)]
    pub on: bool,
    /// Style of the first major gridline, if any gridline exists.
    #[serde(default)]
    pub line: Option<GridLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    #[serde(default = "GridLine::default_color")]
    pub color: Option<Color>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default = "solid")]
    pub linestyle: String,
    #[serde(default)]
    pub dashes: Option<Vec<f64>>,
}

impl GridLine {
    fn default_color() -> Option<Color> {
        Some(Color::from("#b0b0b0"))
    }
}

impl Default for GridLine {
    fn default() -> Self {
        Self {
            color: Self::default_color(),
            alpha: None,
            linestyle: solid(),
            dashes: None,
        }
    }
}

/// Drawable graphic object, dispatched by tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Line(Line),
    Path(PathPatch),
    Text(Text),
    Markers(Markers),
}

impl From<Line> for Primitive {
    fn from(v: Line) -> Self {
        Primitive::Line(v)
    }
}

impl From<PathPatch> for Primitive {
    fn from(v: PathPatch) -> Self {
        Primitive::Path(v)
    }
}

impl From<Text> for Primitive {
    fn from(v: Text) -> Self {
        Primitive::Text(v)
    }
}

impl From<Markers> for Primitive {
    fn from(v: Markers) -> Self {
        Primitive::Markers(v)
    }
}

/// A polyline through data points, optionally with a marker at every point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub data: Vec<Point>,
    #[serde(default = "cycle_color")]
    pub color: Option<Color>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default = "Line::default_linewidth")]
    pub linewidth: f64,
    #[serde(default = "solid")]
    pub linestyle: String,
    /// Explicit per-instance dash sequence; overrides `linestyle` when present.
    #[serde(default)]
    pub dashes: Option<Vec<f64>>,
    #[serde(default = "Line::default_zorder")]
    pub zorder: i32,
    #[serde(default = "Line::default_drawstyle")]
    pub drawstyle: String,
    #[serde(default)]
    pub marker: Option<MarkerProps>,
}

impl Line {
    fn default_linewidth() -> f64 {
        1.5
    }
    fn default_zorder() -> i32 {
        2
    }
    fn default_drawstyle() -> String {
        "default".into()
    }

    pub fn new(data: Vec<Point>) -> Self {
        Self {
            data,
            color: cycle_color(),
            alpha: None,
            linewidth: Self::default_linewidth(),
            linestyle: solid(),
            dashes: None,
            zorder: Self::default_zorder(),
            drawstyle: Self::default_drawstyle(),
            marker: None,
        }
    }
}

/// Backend path: vertices plus one host command code per vertex.
///
/// Codes follow the host numbering: 0 stop, 1 moveto, 2 lineto, 3 curve3,
/// 4 curve4, 79 closepoly. Empty `codes` means moveto followed by linetos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPath {
    #[serde(default)]
    pub vertices: Vec<Point>,
    #[serde(default)]
    pub codes: Vec<u8>,
}

impl RawPath {
    pub fn new(vertices: Vec<Point>, codes: Vec<u8>) -> Self {
        Self { vertices, codes }
    }

    /// Closed polygon through `vertices`.
    pub fn polygon(vertices: Vec<Point>) -> Self {
        let mut codes = Vec::with_capacity(vertices.len() + 1);
        for i in 0..vertices.len() {
            codes.push(if i == 0 { 1 } else { 2 });
        }
        let mut vertices = vertices;
        if let Some(first) = vertices.first().copied() {
            vertices.push(first);
            codes.push(79);
        }
        Self { vertices, codes }
    }
}

/// Filled and/or stroked path (a patch in host terms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPatch {
    pub path: RawPath,
    #[serde(default = "cycle_color")]
    pub facecolor: Option<Color>,
    #[serde(default = "cycle_color")]
    pub edgecolor: Option<Color>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default = "PathPatch::default_linewidth")]
    pub linewidth: f64,
    #[serde(default = "solid")]
    pub linestyle: String,
    #[serde(default)]
    pub dashes: Option<Vec<f64>>,
    #[serde(default = "PathPatch::default_zorder")]
    pub zorder: i32,
    #[serde(default = "yes")]
    pub fill: bool,
}

impl PathPatch {
    fn default_linewidth() -> f64 {
        1.0
    }
    fn default_zorder() -> i32 {
        1
    }

    pub fn new(path: RawPath) -> Self {
        Self {
            path,
            facecolor: cycle_color(),
            edgecolor: cycle_color(),
            alpha: None,
            linewidth: Self::default_linewidth(),
            linestyle: solid(),
            dashes: None,
            zorder: Self::default_zorder(),
            fill: true,
        }
    }
}

/// A string anchored at a data position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub position: Point,
    pub text: String,
    #[serde(default = "Text::default_color")]
    pub color: Option<Color>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default = "Text::default_fontsize")]
    pub fontsize: f64,
    #[serde(default = "Text::default_halign")]
    pub halign: String,
    #[serde(default = "Text::default_valign")]
    pub valign: String,
    /// Alignment between lines of a multi-line string.
    #[serde(default)]
    pub multialign: Option<String>,
    /// Degrees, counter-clockwise.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "Text::default_zorder")]
    pub zorder: i32,
}

impl Text {
    fn default_color() -> Option<Color> {
        Some(Color::from("black"))
    }
    fn default_fontsize() -> f64 {
        10.0
    }
    fn default_halign() -> String {
        "left".into()
    }
    fn default_valign() -> String {
        "baseline".into()
    }
    fn default_zorder() -> i32 {
        3
    }

    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
            color: Self::default_color(),
            alpha: None,
            fontsize: Self::default_fontsize(),
            halign: Self::default_halign(),
            valign: Self::default_valign(),
            multialign: None,
            rotation: 0.0,
            zorder: Self::default_zorder(),
        }
    }
}

/// Marker glyph repeated at each offset (a scatter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markers {
    pub offsets: Vec<Point>,
    #[serde(default)]
    pub marker: MarkerProps,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default = "Markers::default_zorder")]
    pub zorder: i32,
}

impl Markers {
    fn default_zorder() -> i32 {
        1
    }

    pub fn new(offsets: Vec<Point>, marker: MarkerProps) -> Self {
        Self {
            offsets,
            marker,
            alpha: None,
            zorder: Self::default_zorder(),
        }
    }
}

/// Marker glyph paint and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerProps {
    /// Host marker spelling (`o`, `s`, `^`, `D`, `+`, `x`, …; `none` hides it).
    #[serde(default = "MarkerProps::default_symbol")]
    pub symbol: String,
    /// Size in points.
    #[serde(default = "MarkerProps::default_size")]
    pub size: f64,
    #[serde(default = "cycle_color")]
    pub facecolor: Option<Color>,
    #[serde(default = "cycle_color")]
    pub edgecolor: Option<Color>,
    #[serde(default = "MarkerProps::default_edgewidth")]
    pub edgewidth: f64,
}

impl MarkerProps {
    fn default_symbol() -> String {
        "o".into()
    }
    fn default_size() -> f64 {
        6.0
    }
    fn default_edgewidth() -> f64 {
        1.0
    }

    pub fn new(symbol: impl Into<String>, size: f64) -> Self {
        Self {
            symbol: symbol.into(),
            size,
            ..Self::default()
        }
    }
}

impl Default for MarkerProps {
    fn default() -> Self {
        Self {
            symbol: Self::default_symbol(),
            size: Self::default_size(),
            facecolor: cycle_color(),
            edgecolor: cycle_color(),
            edgewidth: Self::default_edgewidth(),
        }
    }
}
