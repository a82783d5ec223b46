//! One-call entry points: figure to GeoJSON, figure to a Leaflet page.
//!
//! - Projection chosen per call from `crs` / `epsg`
//! - Float precision chosen per call, no shared state
//! - Tiles from the registry or a custom template
//! - Standalone page or notebook fragment

use crate::error::Result as ExportResult;
use crate::exporter::Exporter;
use crate::geojson::FeatureCollection;
use crate::html::{self, ATTRIBUTION_PREFIX, HtmlParams, Template};
use crate::models::Figure;
use crate::renderer::GeoJsonRenderer;
use crate::serialize::DEFAULT_FLOAT_PRECISION;
use crate::storage;
use crate::tiles::TileSource;
use crate::transform;
use anyhow::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Knobs for [`fig_to_html`]; [`fig_to_geojson`] only reads the projection.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub tiles: TileSource,
    /// `EPSG:nnnn` or a PROJ string; exclusive with `epsg`.
    pub crs: Option<String>,
    pub epsg: Option<u32>,
    /// Inline Leaflet's script and stylesheet instead of linking them.
    pub embed_links: bool,
    pub float_precision: usize,
    pub template: Template,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            tiles: TileSource::default(),
            crs: None,
            epsg: None,
            embed_links: false,
            float_precision: DEFAULT_FLOAT_PRECISION,
            template: Template::default(),
        }
    }
}

/// Run the exporter and collect every drawing event as a GeoJSON feature.
pub fn fig_to_geojson(fig: &Figure, options: &MapOptions) -> ExportResult<FeatureCollection> {
    let projection = transform::resolve(options.crs.as_deref(), options.epsg)?;
    let mut renderer = GeoJsonRenderer::new();
    Exporter::new(projection).run(fig, &mut renderer)?;
    log::debug!(
        "figure exported to {} features",
        renderer.geojson().features.len()
    );
    Ok(renderer.into_geojson())
}

/// Same text gives the same id, so re-rendering a figure is reproducible.
fn map_id(geojson: &str) -> String {
    let mut hasher = DefaultHasher::new();
    geojson.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Render `fig` as a Leaflet map page.
///
/// ### Example
/// ```no_run
/// use spatplot::{Axes, Figure, Line, MapOptions, fig_to_html};
///
/// let mut fig = Figure::default();
/// fig.add_axes(Axes::default())
///     .push(Line::new(vec![[13.4, 52.5], [2.35, 48.86]]));
/// let html = fig_to_html(&fig, &MapOptions::default())?;
/// assert!(html.contains("L.geoJson"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn fig_to_html(fig: &Figure, options: &MapOptions) -> Result<String> {
    let (tile_url, tile_attribution) = options.tiles.resolve()?;
    let collection = fig_to_geojson(fig, options)?;
    let geojson = collection.to_json(options.float_precision)?;
    let (width, height) = fig.pixel_size();
    let params = HtmlParams {
        mapid: map_id(&geojson),
        geojson,
        width,
        height,
        tile_url,
        attribution: format!("{ATTRIBUTION_PREFIX} | {tile_attribution}"),
        links: html::default_links(),
        embed_links: options.embed_links,
    };
    html::render(options.template, &params)
}

/// Render `fig` and write the page to `path`.
pub fn save_html<P: AsRef<Path>>(fig: &Figure, path: P, options: &MapOptions) -> Result<()> {
    let page = fig_to_html(fig, options)?;
    storage::write_text(&page, path)
}
