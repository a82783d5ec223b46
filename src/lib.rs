//! spatplot
//!
//! Turn a 2D plot into an interactive web map. A figure snapshot (axes, lines,
//! paths, markers, text) is walked once, normalized into drawing events, and
//! collected as a GeoJSON FeatureCollection with Leaflet style properties,
//! which is then embedded in a self-contained Leaflet page. Pairs with the
//! `spatplot` CLI.
//!
//! ### Features
//! - Path decoding into segment codes and polygon/line rings
//! - Color, alpha and dash resolution to web-ready strings
//! - Axis introspection: tick formats, scales, grids, date domains
//! - Projected input mapped back to longitude/latitude (web mercator built in,
//!   any other CRS with the `proj` feature)
//! - Fixed-precision JSON with `NaN`/`Infinity` tokens
//!
//! ### Example
//! ```no_run
//! use spatplot::{Axes, Figure, Line, MapOptions};
//!
//! let mut fig = Figure::default();
//! fig.add_axes(Axes::default())
//!     .push(Line::new(vec![[-0.1276, 51.5072], [2.3522, 48.8566]]));
//! let collection = spatplot::fig_to_geojson(&fig, &MapOptions::default())?;
//! println!("{}", collection.to_json(6)?);
//! spatplot::save_html(&fig, "map.html", &MapOptions::default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod axis;
pub mod display;
pub mod error;
pub mod exporter;
pub mod geojson;
pub mod html;
pub mod marker;
pub mod models;
pub mod path;
pub mod renderer;
pub mod serialize;
pub mod storage;
pub mod style;
pub mod tiles;
pub mod transform;

pub use display::{MapOptions, fig_to_geojson, fig_to_html, save_html};
pub use error::{ExportError, Result};
pub use exporter::{Event, EventLog, Exporter, FigureProps, Renderer};
pub use geojson::FeatureCollection;
pub use html::Template;
pub use models::{Axes, Axis, Color, Figure, Line, MarkerProps, Markers, PathPatch, RawPath, Text};
pub use renderer::GeoJsonRenderer;
pub use tiles::TileSource;
