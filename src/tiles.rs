//! Map tile providers.

use crate::error::{ExportError, Result};

/// Provider used when callers do not pick one.
pub const DEFAULT_TILES: &str = "osm";

const OSM_ATTRIBUTION: &str =
    r#"Map data (c) <a href="https://openstreetmap.org">OpenStreetMap</a> contributors"#;
const CARTO_ATTRIBUTION: &str = r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> &copy; <a href="https://carto.com/attributions">CARTO</a>"#;

/// `(name, url template, attribution)`.
pub const PROVIDERS: &[(&str, &str, &str)] = &[
    (
        "osm",
        "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        OSM_ATTRIBUTION,
    ),
    (
        "cartodb_positron",
        "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png",
        CARTO_ATTRIBUTION,
    ),
    (
        "cartodb_dark",
        "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}.png",
        CARTO_ATTRIBUTION,
    ),
    (
        "esri_aerial",
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community",
    ),
    (
        "esri_natgeo",
        "https://server.arcgisonline.com/ArcGIS/rest/services/NatGeo_World_Map/MapServer/tile/{z}/{y}/{x}",
        "Tiles &copy; Esri &mdash; National Geographic, Esri, DeLorme, NAVTEQ, UNEP-WCMC, USGS, NASA, ESA, METI, NRCAN, GEBCO, NOAA, iPC",
    ),
    (
        "esri_worldtopo",
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}",
        "Tiles &copy; Esri &mdash; Esri, DeLorme, NAVTEQ, TomTom, Intermap, iPC, USGS, FAO, NPS, NRCAN, GeoBase, Kadaster NL, Ordnance Survey, Esri Japan, METI, Esri China (Hong Kong), and the GIS User Community",
    ),
    (
        "esri_worldstreet",
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Street_Map/MapServer/tile/{z}/{y}/{x}",
        "Tiles &copy; Esri &mdash; Source: Esri, DeLorme, NAVTEQ, USGS, Intermap, iPC, NRCAN, Esri Japan, METI, Esri China (Hong Kong), Esri (Thailand), TomTom, 2012",
    ),
    (
        "opentopomap",
        "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        "Map data: &copy; OpenStreetMap contributors, SRTM | Map style: &copy; OpenTopoMap (CC-BY-SA)",
    ),
];

/// Where map tiles come from: a registry shortcut or an explicit template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileSource {
    Named(String),
    Custom { url: String, attribution: String },
}

impl Default for TileSource {
    fn default() -> Self {
        TileSource::Named(DEFAULT_TILES.to_string())
    }
}

impl TileSource {
    pub fn named(name: impl Into<String>) -> Self {
        TileSource::Named(name.into())
    }

    /// `(url template, attribution)`; unknown shortcuts are an error.
    pub fn resolve(&self) -> Result<(String, String)> {
        match self {
            TileSource::Named(name) => {
                let (url, attribution) = lookup(name)?;
                Ok((url.to_string(), attribution.to_string()))
            }
            TileSource::Custom { url, attribution } => Ok((url.clone(), attribution.clone())),
        }
    }
}

pub fn lookup(name: &str) -> Result<(&'static str, &'static str)> {
    PROVIDERS
        .iter()
        .find(|(key, _, _)| *key == name)
        .map(|(_, url, attribution)| (*url, *attribution))
        .ok_or_else(|| ExportError::UnknownTiles(name.to_string()))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PROVIDERS.iter().map(|(name, _, _)| *name)
}

/// Tiles from a Mapbox map id, authorized with an access token.
pub fn mapbox(map_id: &str, access_token: &str) -> TileSource {
    TileSource::Custom {
        url: format!(
            "https://api.tiles.mapbox.com/v4/{map_id}/{{z}}/{{x}}/{{y}}.png?access_token={access_token}"
        ),
        attribution: format!(
            r#"{OSM_ATTRIBUTION}, <a href="https://creativecommons.org/licenses/by-sa/2.0/">CC-BY-SA</a>, Imagery &copy; <a href="https://mapbox.com">Mapbox</a>"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_osm() {
        let (url, attribution) = TileSource::default().resolve().unwrap();
        assert!(url.contains("openstreetmap.org/{z}/{x}/{y}"));
        assert!(attribution.contains("OpenStreetMap"));
    }

    #[test]
    fn unknown_shortcut_is_an_error() {
        assert_eq!(
            TileSource::named("mapquest open").resolve().unwrap_err(),
            ExportError::UnknownTiles("mapquest open".into())
        );
    }

    #[test]
    fn every_provider_has_a_template_and_no_single_quotes() {
        assert_eq!(names().count(), PROVIDERS.len());
        for (name, url, attribution) in PROVIDERS {
            assert!(url.contains("{z}"), "{name}");
            assert!(!attribution.contains('\''), "{name}");
        }
    }

    #[test]
    fn mapbox_template_keeps_placeholders() {
        let (url, _) = mapbox("user.abc", "tok").resolve().unwrap();
        assert_eq!(
            url,
            "https://api.tiles.mapbox.com/v4/user.abc/{z}/{x}/{y}.png?access_token=tok"
        );
    }
}
