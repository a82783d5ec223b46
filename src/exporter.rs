//! Traversal engine: walks a figure in a fixed order and hands normalized
//! geometry and style records to a [`Renderer`].

use crate::axis::{AxesProps, axes_properties};
use crate::error::Result;
use crate::models::{Axes, Figure, Line, Markers, PathPatch, Point, Primitive, Text};
use crate::path::{Geometry, decode, line_path};
use crate::style::{
    LineKind, LineStyle, MarkerStyle, PathStyle, TextStyle, extract_line_style,
    extract_marker_style, extract_path_style, extract_text_style,
};
use crate::transform::{PointTransform, Projection};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FigureProps {
    pub figwidth: f64,
    pub figheight: f64,
    pub dpi: f64,
}

impl FigureProps {
    pub fn of(figure: &Figure) -> Self {
        Self {
            figwidth: figure.width,
            figheight: figure.height,
            dpi: figure.dpi,
        }
    }
}

/// Consumer of the normalized event stream.
///
/// Geometry and positions arrive already projected to longitude/latitude.
/// Callbacks are strictly nested: figure, then each axes, then its primitives.
pub trait Renderer {
    fn enter_figure(&mut self, _props: &FigureProps) -> Result<()> {
        Ok(())
    }

    fn exit_figure(&mut self) -> Result<()> {
        Ok(())
    }

    fn enter_axes(&mut self, _props: &AxesProps) -> Result<()> {
        Ok(())
    }

    fn exit_axes(&mut self) -> Result<()> {
        Ok(())
    }

    fn draw_line(&mut self, geometry: &Geometry, style: &LineStyle) -> Result<()>;

    fn draw_path(&mut self, geometry: &Geometry, style: &PathStyle, fill: bool) -> Result<()>;

    fn draw_text(&mut self, position: Point, text: &str, style: &TextStyle) -> Result<()>;

    fn draw_marker_point(&mut self, position: Point, style: &MarkerStyle) -> Result<()>;
}

pub struct Exporter {
    projection: Projection,
}

impl Exporter {
    pub fn new(projection: Projection) -> Self {
        Self { projection }
    }

    /// Walk `figure` once, in declaration order. The first error aborts.
    pub fn run<R: Renderer + ?Sized>(&self, figure: &Figure, renderer: &mut R) -> Result<()> {
        renderer.enter_figure(&FigureProps::of(figure))?;
        for (i, axes) in figure.axes.iter().enumerate() {
            log::debug!("exporting axes {i} ({} primitives)", axes.primitives.len());
            self.run_axes(axes, renderer)?;
        }
        renderer.exit_figure()
    }

    fn run_axes<R: Renderer + ?Sized>(&self, axes: &Axes, renderer: &mut R) -> Result<()> {
        renderer.enter_axes(&axes_properties(axes)?)?;
        for primitive in &axes.primitives {
            match primitive {
                Primitive::Line(line) => self.line(line, renderer)?,
                Primitive::Path(patch) => self.path(patch, renderer)?,
                Primitive::Text(text) => self.text(text, renderer)?,
                Primitive::Markers(markers) => self.markers(markers, renderer)?,
            }
        }
        renderer.exit_axes()
    }

    fn line<R: Renderer + ?Sized>(&self, line: &Line, renderer: &mut R) -> Result<()> {
        let draws = LineKind::parse(&line.linestyle).is_none_or(LineKind::draws);
        if draws {
            let style = extract_line_style(line)?;
            let geometry = line_path(&line.data).transformed(&self.projection);
            if !geometry.is_empty() {
                renderer.draw_line(&geometry, &style)?;
            }
        }
        let Some(marker) = &line.marker else {
            return Ok(());
        };
        let Some(style) = extract_marker_style(marker, line.alpha, line.zorder)? else {
            return Ok(());
        };
        for p in line.data.iter().filter(|p| p[0].is_finite() && p[1].is_finite()) {
            renderer.draw_marker_point(self.projection.apply(*p), &style)?;
        }
        Ok(())
    }

    fn path<R: Renderer + ?Sized>(&self, patch: &PathPatch, renderer: &mut R) -> Result<()> {
        let geometry = decode(&patch.path, Some(&self.projection))?;
        if geometry.is_empty() {
            log::debug!("skipping empty path");
            return Ok(());
        }
        let style = extract_path_style(patch, patch.fill)?;
        renderer.draw_path(&geometry, &style, patch.fill)
    }

    fn text<R: Renderer + ?Sized>(&self, text: &Text, renderer: &mut R) -> Result<()> {
        let style = extract_text_style(text)?;
        renderer.draw_text(self.projection.apply(text.position), &text.text, &style)
    }

    fn markers<R: Renderer + ?Sized>(&self, markers: &Markers, renderer: &mut R) -> Result<()> {
        let Some(style) = extract_marker_style(&markers.marker, markers.alpha, markers.zorder)?
        else {
            return Ok(());
        };
        for p in &markers.offsets {
            renderer.draw_marker_point(self.projection.apply(*p), &style)?;
        }
        Ok(())
    }
}

/// One recorded renderer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    OpenFigure(FigureProps),
    CloseFigure,
    OpenAxes(Box<AxesProps>),
    CloseAxes,
    Line {
        geometry: Geometry,
        style: LineStyle,
    },
    Path {
        geometry: Geometry,
        style: PathStyle,
        fill: bool,
    },
    Text {
        position: Point,
        text: String,
        style: TextStyle,
    },
    MarkerPoint {
        position: Point,
        style: MarkerStyle,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::OpenFigure(_) => "open_figure",
            Event::CloseFigure => "close_figure",
            Event::OpenAxes(_) => "open_axes",
            Event::CloseAxes => "close_axes",
            Event::Line { .. } => "draw_line",
            Event::Path { .. } => "draw_path",
            Event::Text { .. } => "draw_text",
            Event::MarkerPoint { .. } => "draw_marker_point",
        }
    }
}

/// Renderer that only records what it is given.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
}

impl EventLog {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(Event::name).collect()
    }
}

impl Renderer for EventLog {
    fn enter_figure(&mut self, props: &FigureProps) -> Result<()> {
        self.events.push(Event::OpenFigure(*props));
        Ok(())
    }

    fn exit_figure(&mut self) -> Result<()> {
        self.events.push(Event::CloseFigure);
        Ok(())
    }

    fn enter_axes(&mut self, props: &AxesProps) -> Result<()> {
        self.events.push(Event::OpenAxes(Box::new(props.clone())));
        Ok(())
    }

    fn exit_axes(&mut self) -> Result<()> {
        self.events.push(Event::CloseAxes);
        Ok(())
    }

    fn draw_line(&mut self, geometry: &Geometry, style: &LineStyle) -> Result<()> {
        self.events.push(Event::Line {
            geometry: geometry.clone(),
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_path(&mut self, geometry: &Geometry, style: &PathStyle, fill: bool) -> Result<()> {
        self.events.push(Event::Path {
            geometry: geometry.clone(),
            style: style.clone(),
            fill,
        });
        Ok(())
    }

    fn draw_text(&mut self, position: Point, text: &str, style: &TextStyle) -> Result<()> {
        self.events.push(Event::Text {
            position,
            text: text.to_string(),
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_marker_point(&mut self, position: Point, style: &MarkerStyle) -> Result<()> {
        self.events.push(Event::MarkerPoint {
            position,
            style: style.clone(),
        });
        Ok(())
    }
}
