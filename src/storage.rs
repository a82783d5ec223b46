use crate::geojson::FeatureCollection;
use crate::models::Figure;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Read a figure snapshot from a JSON file.
pub fn load_figure<P: AsRef<Path>>(path: P) -> Result<Figure> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse figure {}", path.display()))
}

/// Save a feature collection as compact GeoJSON with `precision` float digits.
pub fn save_geojson<P: AsRef<Path>>(
    collection: &FeatureCollection,
    path: P,
    precision: usize,
) -> Result<()> {
    let text = collection.to_json(precision)?;
    write_text(&text, path)
}

pub fn write_text<P: AsRef<Path>>(text: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    f.write_all(text.as_bytes())?;
    Ok(())
}
