//! Axis introspection: scale kind, tick locations, tick-label formats, grid and domains.

use crate::error::{ExportError, Result};
use crate::models::{Axes, Axis, Locator, TickFormatter};
use crate::style::{export_color, resolve_dash};
use chrono::{DateTime, Datelike, Timelike};
use serde::{Serialize, Serializer};

/// Which slot of the axes an axis occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Linear,
    Log,
    Date,
}

/// Template formatter split around the substituted tick value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateFormat {
    pub prefix: String,
    pub suffix: String,
    #[serde(rename = "format_string")]
    pub format_spec: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentFormat {
    pub xmax: f64,
    pub decimals: Option<u32>,
    pub symbol: Option<String>,
}

/// Normalized tick-label format, resolved once per axis.
#[derive(Debug, Clone, PartialEq)]
pub enum TickFormat {
    /// No tick labels.
    Empty,
    Template(TemplateFormat),
    Percent(PercentFormat),
    Fixed(Vec<String>),
    /// Labels as currently rendered by a legacy index formatter.
    Index(Vec<String>),
    /// The renderer should fall back to its default tick labels.
    Unrepresentable,
}

impl TickFormat {
    /// Host formatter family tag reported next to the format.
    pub fn formatter_tag(&self) -> &'static str {
        match self {
            TickFormat::Template(_) => "str_method",
            TickFormat::Percent(_) => "percent",
            TickFormat::Fixed(_) => "fixed",
            TickFormat::Index(_) => "index",
            TickFormat::Empty | TickFormat::Unrepresentable => "",
        }
    }
}

impl Serialize for TickFormat {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            TickFormat::Empty => s.serialize_str(""),
            TickFormat::Template(t) => t.serialize(s),
            TickFormat::Percent(p) => p.serialize(s),
            TickFormat::Fixed(labels) | TickFormat::Index(labels) => labels.serialize(s),
            TickFormat::Unrepresentable => s.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GridStyle {
    On {
        #[serde(rename = "gridOn")]
        grid_on: bool,
        color: String,
        dasharray: Option<String>,
        alpha: Option<f64>,
    },
    Off {
        #[serde(rename = "gridOn")]
        grid_on: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisProps {
    pub position: AxisPosition,
    pub nticks: usize,
    /// Only set when the tick locations are pinned.
    pub tickvalues: Option<Vec<f64>>,
    pub tickformat: TickFormat,
    pub tickformat_formatter: &'static str,
    pub scale: Scale,
    pub fontsize: Option<f64>,
    pub grid: GridStyle,
    pub visible: bool,
}

/// `(year, zero-based month, day, hour, minute, second, millisecond)`.
pub type CalendarTuple = (i32, u32, u32, u32, u32, u32, f64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Domain {
    Numeric([f64; 2]),
    Date([CalendarTuple; 2]),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxesProps {
    pub axesbg: String,
    pub axesbgalpha: Option<f64>,
    pub bounds: [f64; 4],
    pub dynamic: bool,
    pub axison: bool,
    pub frame_on: bool,
    pub patch_visible: bool,
    pub axes: [AxisProps; 2],
    pub xscale: Scale,
    pub xlim: [f64; 2],
    pub xdomain: Domain,
    pub yscale: Scale,
    pub ylim: [f64; 2],
    pub ydomain: Domain,
}

/// Normalize one axis.
pub fn introspect(axis: &Axis, kind: AxisKind) -> Result<AxisProps> {
    let position = match (kind, axis.label1_on) {
        (AxisKind::X, true) => AxisPosition::Bottom,
        (AxisKind::X, false) => AxisPosition::Top,
        (AxisKind::Y, true) => AxisPosition::Left,
        (AxisKind::Y, false) => AxisPosition::Right,
    };
    let tickvalues = match &axis.locator {
        Locator::Fixed(v) => Some(v.clone()),
        Locator::Auto(_) => None,
    };
    let tickformat = tick_format(axis)?;
    Ok(AxisProps {
        position,
        nticks: axis.locator.values().len(),
        tickvalues,
        tickformat_formatter: tickformat.formatter_tag(),
        tickformat,
        scale: classify_scale(axis)?,
        fontsize: axis.tick_labels.first().map(|l| l.fontsize),
        grid: grid_style(axis)?,
        visible: axis.visible,
    })
}

/// Resolve the tick-label format; the first matching rule wins.
pub fn tick_format(axis: &Axis) -> Result<TickFormat> {
    let any_visible = axis.tick_labels.iter().any(|l| l.visible);
    let format = match &axis.formatter {
        None if !any_visible => TickFormat::Empty,
        Some(TickFormatter::Null) => TickFormat::Empty,
        Some(TickFormatter::StrMethod { template }) => {
            TickFormat::Template(decompose_template(template)?)
        }
        Some(TickFormatter::Percent {
            xmax,
            decimals,
            symbol,
        }) => TickFormat::Percent(PercentFormat {
            xmax: *xmax,
            decimals: *decimals,
            symbol: symbol.clone(),
        }),
        Some(TickFormatter::Fixed { labels }) => TickFormat::Fixed(labels.clone()),
        Some(TickFormatter::Index) => {
            TickFormat::Index(axis.tick_labels.iter().map(|l| l.text.clone()).collect())
        }
        _ if !any_visible => TickFormat::Empty,
        _ => TickFormat::Unrepresentable,
    };
    Ok(format)
}

/// Split a `str.format` template around its `{x}` field.
///
/// `"${x:,.2f} USD"` becomes prefix `"$"`, spec `",.2f"`, suffix `" USD"`.
/// Other fields contribute nothing; `{{`/`}}` are literal braces.
pub fn decompose_template(template: &str) -> Result<TemplateFormat> {
    let unsupported = |why: &str| ExportError::UnsupportedFormat(format!("{why}: {template:?}"));

    let mut prefix = String::new();
    let mut suffix = String::new();
    let mut format_spec: Option<String> = None;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                push_literal(&mut prefix, &mut suffix, format_spec.is_some(), '{');
            }
            '{' => {
                let mut field = String::new();
                let mut depth = 1;
                loop {
                    match chars.next() {
                        Some('{') => {
                            depth += 1;
                            field.push('{');
                        }
                        Some('}') => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                            field.push('}');
                        }
                        Some(other) => field.push(other),
                        None => return Err(unsupported("unterminated replacement field")),
                    }
                }
                let name_end = field.find(['!', ':']).unwrap_or(field.len());
                if &field[..name_end] != "x" {
                    continue;
                }
                if format_spec.is_some() {
                    return Err(unsupported("tick value referenced more than once"));
                }
                let spec = field[name_end..]
                    .split_once(':')
                    .map(|(_, spec)| spec.to_string())
                    .unwrap_or_default();
                format_spec = Some(spec);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                push_literal(&mut prefix, &mut suffix, format_spec.is_some(), '}');
            }
            '}' => return Err(unsupported("single '}' in template")),
            other => push_literal(&mut prefix, &mut suffix, format_spec.is_some(), other),
        }
    }

    Ok(TemplateFormat {
        prefix,
        suffix,
        format_spec: format_spec.unwrap_or_default(),
    })
}

fn push_literal(prefix: &mut String, suffix: &mut String, after_x: bool, c: char) {
    if after_x {
        suffix.push(c);
    } else {
        prefix.push(c);
    }
}

/// Calendar axes are `date`; otherwise only `linear` and `log` are accepted.
pub fn classify_scale(axis: &Axis) -> Result<Scale> {
    if axis.calendar {
        return Ok(Scale::Date);
    }
    match axis.scale.as_str() {
        "linear" => Ok(Scale::Linear),
        "log" => Ok(Scale::Log),
        other => Err(ExportError::UnknownScale(other.to_string())),
    }
}

/// Data limits as reported to the renderer; date axes are decomposed per endpoint.
pub fn domain(axis: &Axis, lim: [f64; 2]) -> Result<Domain> {
    if !axis.calendar {
        return Ok(Domain::Numeric(lim));
    }
    Ok(Domain::Date([calendar_tuple(lim[0])?, calendar_tuple(lim[1])?]))
}

/// Days since 1970-01-01T00:00 UTC to calendar components.
pub fn calendar_tuple(days: f64) -> Result<CalendarTuple> {
    let micros = (days * 86_400_000_000.0).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return Err(ExportError::DateOutOfRange(days));
    }
    let dt = DateTime::from_timestamp_micros(micros as i64)
        .ok_or(ExportError::DateOutOfRange(days))?
        .naive_utc();
    Ok((
        dt.year(),
        dt.month0(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        (dt.nanosecond() / 1_000) as f64 * 1e-3,
    ))
}

fn grid_style(axis: &Axis) -> Result<GridStyle> {
    match (axis.grid.on, &axis.grid.line) {
        (true, Some(line)) => Ok(GridStyle::On {
            grid_on: true,
            color: export_color(line.color.as_ref())?,
            dasharray: resolve_dash(line.dashes.as_deref(), &line.linestyle),
            alpha: line.alpha,
        }),
        _ => Ok(GridStyle::Off { grid_on: false }),
    }
}

/// Normalize an axes: background, frame flags, both axes and their domains.
pub fn axes_properties(axes: &Axes) -> Result<AxesProps> {
    let x = introspect(&axes.xaxis, AxisKind::X)?;
    let y = introspect(&axes.yaxis, AxisKind::Y)?;
    Ok(AxesProps {
        axesbg: export_color(axes.facecolor.as_ref())?,
        axesbgalpha: axes.patch_alpha,
        bounds: axes.bounds,
        dynamic: axes.navigate,
        axison: axes.axison,
        frame_on: axes.frame_on,
        patch_visible: axes.patch_visible,
        xscale: x.scale,
        xlim: axes.xlim,
        xdomain: domain(&axes.xaxis, axes.xlim)?,
        yscale: y.scale,
        ylim: axes.ylim,
        ydomain: domain(&axes.yaxis, axes.ylim)?,
        axes: [x, y],
    })
}
