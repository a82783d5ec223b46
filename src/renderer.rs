//! Renderer that accumulates drawing events into a GeoJSON FeatureCollection
//! styled for Leaflet.

use crate::error::Result;
use crate::exporter::Renderer;
use crate::geojson::{Feature, FeatureCollection, Geometry, Properties, PropValue};
use crate::models::Point;
use crate::path::{self, Ring, svg_num};
use crate::style::{LineStyle, MarkerStyle, PathStyle, TextStyle};

#[derive(Debug, Default)]
pub struct GeoJsonRenderer {
    collection: FeatureCollection,
}

impl GeoJsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geojson(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn into_geojson(self) -> FeatureCollection {
        self.collection
    }

    fn push(&mut self, geometry: Geometry, properties: Properties) {
        self.collection
            .features
            .push(Feature::new(geometry, properties));
    }
}

fn props<const N: usize>(entries: [(&str, PropValue); N]) -> Properties {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn dash_prop(dasharray: &Option<String>) -> PropValue {
    dasharray.as_deref().unwrap_or("none").into()
}

fn collect_rings(geometry: &path::Geometry) -> Result<Vec<Ring>> {
    geometry.rings().collect()
}

/// Group rings into polygons: a ring wound like the first ring starts a new
/// polygon, a ring wound the other way is a hole in the current one.
/// Zero-area rings have no winding and are dropped.
fn polygons(rings: &[Ring]) -> Vec<Vec<Vec<Point>>> {
    let mut out: Vec<Vec<Vec<Point>>> = Vec::new();
    let mut outer_sign = 0.0;
    for ring in rings
        .iter()
        .filter(|r| r.points.len() >= 3 && r.signed_area() != 0.0)
    {
        let sign = ring.signed_area().signum();
        if out.is_empty() {
            outer_sign = sign;
        } else if sign != outer_sign {
            if let Some(polygon) = out.last_mut() {
                polygon.push(ring.closed_points());
            }
            continue;
        }
        out.push(vec![ring.closed_points()]);
    }
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Inline SVG of the glyph, sized to include its stroke.
pub fn marker_svg(style: &MarkerStyle) -> String {
    let width = style.markersize + 2.0 * style.edgewidth;
    let origin = svg_num(-width / 2.0);
    let w = svg_num(width);
    format!(
        r#"<svg width="{w}px" height="{w}px" viewBox="{origin} {origin} {w} {w}" xmlns="http://www.w3.org/2000/svg" version="1.1"><path d="{d}" style="fill: {fill}; stroke: {stroke}; stroke-width: {sw}; opacity: {alpha}"/></svg>"#,
        d = style.markerpath.to_svg_d(),
        fill = style.facecolor,
        stroke = style.edgecolor,
        sw = svg_num(style.edgewidth),
        alpha = svg_num(style.alpha),
    )
}

pub fn text_span(text: &str, style: &TextStyle) -> String {
    let mut css = format!(
        "color: {}; font-size: {}px; opacity: {}; white-space: nowrap",
        style.color,
        svg_num(style.fontsize),
        svg_num(style.alpha)
    );
    if style.rotation != 0.0 {
        // screen y points down, so counter-clockwise degrees flip sign
        css.push_str(&format!("; transform: rotate({}deg)", svg_num(-style.rotation)));
    }
    format!(r#"<span style="{css}">{}</span>"#, escape_html(text))
}

impl Renderer for GeoJsonRenderer {
    fn draw_line(&mut self, geometry: &path::Geometry, style: &LineStyle) -> Result<()> {
        for ring in collect_rings(geometry)? {
            if ring.points.len() < 2 {
                continue;
            }
            let properties = props([
                ("color", style.color.as_str().into()),
                ("weight", style.linewidth.into()),
                ("opacity", style.alpha.into()),
                ("alpha", style.alpha.into()),
                ("dashArray", dash_prop(&style.dasharray)),
                ("zorder", style.zorder.into()),
            ]);
            self.push(Geometry::LineString(ring.points), properties);
        }
        Ok(())
    }

    fn draw_path(&mut self, geometry: &path::Geometry, style: &PathStyle, fill: bool) -> Result<()> {
        let rings = collect_rings(geometry)?;
        let properties = props([
            ("color", style.edgecolor.as_str().into()),
            ("edgecolor", style.edgecolor.as_str().into()),
            ("weight", style.edgewidth.into()),
            ("edgewidth", style.edgewidth.into()),
            ("opacity", style.alpha.into()),
            ("alpha", style.alpha.into()),
            ("fillColor", style.facecolor.as_str().into()),
            ("facecolor", style.facecolor.as_str().into()),
            ("fillOpacity", style.alpha.into()),
            ("dashArray", dash_prop(&style.dasharray)),
            ("zorder", style.zorder.into()),
        ]);
        if !fill {
            for ring in rings {
                let points = if ring.closed {
                    ring.closed_points()
                } else {
                    ring.points
                };
                if points.len() >= 2 {
                    self.push(Geometry::LineString(points), properties.clone());
                }
            }
            return Ok(());
        }
        let mut polys = polygons(&rings);
        let geometry = match polys.len() {
            0 => {
                log::debug!("filled path has no ring with an area, skipped");
                return Ok(());
            }
            1 => Geometry::Polygon(polys.remove(0)),
            _ => Geometry::MultiPolygon(polys),
        };
        self.push(geometry, properties);
        Ok(())
    }

    fn draw_text(&mut self, position: Point, text: &str, style: &TextStyle) -> Result<()> {
        let properties = props([
            ("html", text_span(text, style).into()),
            ("anchor_x", 0.0.into()),
            ("anchor_y", style.fontsize.into()),
            ("color", style.color.as_str().into()),
            ("fontsize", style.fontsize.into()),
            ("alpha", style.alpha.into()),
            ("zorder", style.zorder.into()),
        ]);
        self.push(Geometry::Point(position), properties);
        Ok(())
    }

    fn draw_marker_point(&mut self, position: Point, style: &MarkerStyle) -> Result<()> {
        let anchor = style.markersize / 2.0 + style.edgewidth;
        let properties = props([
            ("html", marker_svg(style).into()),
            ("anchor_x", anchor.into()),
            ("anchor_y", anchor.into()),
            ("facecolor", style.facecolor.as_str().into()),
            ("edgecolor", style.edgecolor.as_str().into()),
            ("edgewidth", style.edgewidth.into()),
            ("alpha", style.alpha.into()),
            ("zorder", style.zorder.into()),
        ]);
        self.push(Geometry::Point(position), properties);
        Ok(())
    }
}
