//! Leaflet page templates and the script/stylesheet links they pull in.

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::time::Duration;

pub const LEAFLET_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js";
pub const LEAFLET_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css";

/// Shown before the tile provider's own attribution.
pub const ATTRIBUTION_PREFIX: &str =
    r#"<a href="https://github.com/ralian/spatplotlib">spatplotlib</a>"#;

/// Page layout to render into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Template {
    /// Full page; the map fills its container.
    #[default]
    Standalone,
    /// Fragment for notebook output cells: fixed pixel height, delayed init.
    Notebook,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Js(String),
    Css(String),
}

impl Link {
    pub fn url(&self) -> &str {
        match self {
            Link::Js(url) | Link::Css(url) => url,
        }
    }

    fn tag(&self) -> String {
        match self {
            Link::Js(url) => format!(r#"<script src="{url}"></script>"#),
            Link::Css(url) => format!(r#"<link rel="stylesheet" href="{url}" />"#),
        }
    }

    /// Tag referencing the resource, or the resource inlined when a fetcher is given.
    pub fn render(&self, fetcher: Option<&LinkFetcher>) -> Result<String> {
        let Some(fetcher) = fetcher else {
            return Ok(self.tag());
        };
        let code = fetcher.fetch(self.url())?;
        Ok(match self {
            Link::Js(_) => format!("<script>\n{code}\n</script>"),
            Link::Css(_) => format!("<style>\n{code}\n</style>"),
        })
    }
}

pub fn default_links() -> Vec<Link> {
    vec![Link::Js(LEAFLET_JS.into()), Link::Css(LEAFLET_CSS.into())]
}

/// Downloads link targets for embedding.
#[derive(Debug, Clone)]
pub struct LinkFetcher {
    http: HttpClient,
}

impl LinkFetcher {
    pub fn new() -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("spatplot/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { http })
    }

    pub fn fetch(&self, url: &str) -> Result<String> {
        let mut last_err: Option<anyhow::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.text().with_context(|| format!("read body of {url}"));
                }
                Ok(r) if r.status().is_server_error() => { /* retry */ }
                Ok(r) => bail!("GET {url} failed with HTTP {}", r.status()),
                Err(e) => last_err = Some(e.into()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        bail!("GET {url}: network error: {:?}", last_err);
    }
}

/// Everything a template needs.
#[derive(Debug, Clone)]
pub struct HtmlParams {
    pub geojson: String,
    pub width: f64,
    pub height: f64,
    pub mapid: String,
    pub tile_url: String,
    pub attribution: String,
    pub links: Vec<Link>,
    pub embed_links: bool,
}

fn js_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn js_double_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Leaflet setup shared by both layouts; fits the data, or shows the world
/// when there is none.
fn map_script(p: &HtmlParams) -> String {
    format!(
        r#"var map = L.map('map{mapid}');
L.tileLayer(
  "{tile_url}",
  {{maxZoom:19, attribution: '{attribution}'}}).addTo(map);
var gjData = {geojson};

if (gjData.features.length != 0) {{
  var gj = L.geoJson(gjData, {{
    style: function (feature) {{
      return feature.properties;
    }},
    pointToLayer: function (feature, latlng) {{
      var icon = L.divIcon({{'html': feature.properties.html,
        iconAnchor: [feature.properties.anchor_x,
                     feature.properties.anchor_y],
        className: 'empty'}});
      return L.marker(latlng, {{icon: icon}});
    }}
  }});

  gj.addTo(map);
  map.fitBounds(gj.getBounds());
}} else {{
  map.setView([0, 0], 1);
}}"#,
        mapid = p.mapid,
        tile_url = js_double_quoted(&p.tile_url),
        attribution = js_single_quoted(&p.attribution),
        geojson = p.geojson,
    )
}

pub fn render(template: Template, params: &HtmlParams) -> Result<String> {
    let fetcher = if params.embed_links {
        Some(LinkFetcher::new()?)
    } else {
        None
    };
    let links = params
        .links
        .iter()
        .map(|link| link.render(fetcher.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let links = links.join("\n");
    let mapid = &params.mapid;
    let script = map_script(params);
    Ok(match template {
        Template::Standalone => format!(
            r#"<head>
  {links}
  <style>
    #map{mapid} {{
      height:100%;
    }}
  </style>
</head>
<body>
<div id="map{mapid}"></div>
<script text="text/javascript">
{script}
</script>
</body>
"#
        ),
        Template::Notebook => format!(
            r#"<head>
  {links}
  <style>
    .leaflet-container .leaflet-tile {{
       margin: 0;
    }}
    .leaflet-control-zoom-in {{
        text-decoration: none !important;
    }}
    .leaflet-control-zoom-out {{
        text-decoration: none !important;
    }}
    #map{mapid} {{
      height:{height}px;
    }}
  </style>
</head>
<body>
<div id="map{mapid}"></div>
<script text="text/javascript">
func{mapid} = function() {{
{script}
}}
setTimeout(function() {{ func{mapid}() }}, 2000);
</script>
</body>
"#,
            height = params.height.round() as i64,
        ),
    })
}
