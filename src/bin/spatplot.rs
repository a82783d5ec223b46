use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use spatplot::serialize::DEFAULT_FLOAT_PRECISION;
use spatplot::{MapOptions, Template, TileSource, storage, tiles};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "spatplot",
    version,
    about = "Turn plot figures into GeoJSON and interactive Leaflet maps"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a figure JSON file to a Leaflet HTML page.
    Render(RenderArgs),
    /// Export a figure JSON file as a GeoJSON FeatureCollection.
    Geojson(GeojsonArgs),
    /// List the built-in tile providers.
    Tiles,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Layout {
    Standalone,
    Notebook,
}

#[derive(Args, Debug)]
struct ProjectionArgs {
    /// Source CRS of the data, `EPSG:nnnn` or a PROJ string (default: lon/lat).
    #[arg(long)]
    crs: Option<String>,
    /// Source EPSG code of the data; cannot be combined with --crs.
    #[arg(long)]
    epsg: Option<u32>,
    /// Digits after the decimal point for every coordinate and style number.
    #[arg(long, default_value_t = DEFAULT_FLOAT_PRECISION)]
    precision: usize,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Figure snapshot (JSON).
    input: PathBuf,
    /// Output HTML path.
    #[arg(short, long, default_value = "_map.html")]
    out: PathBuf,
    /// Tile provider shortcut (see `spatplot tiles`).
    #[arg(long, default_value = tiles::DEFAULT_TILES)]
    tiles: String,
    /// Custom tile URL template; overrides --tiles. Needs --attribution.
    #[arg(long, requires = "attribution")]
    tile_url: Option<String>,
    /// Attribution shown for --tile-url.
    #[arg(long)]
    attribution: Option<String>,
    /// Inline the Leaflet script and stylesheet (fetched over the network).
    #[arg(long, default_value_t = false)]
    embed_links: bool,
    #[arg(long, value_enum, default_value = "standalone")]
    template: Layout,
    #[command(flatten)]
    projection: ProjectionArgs,
}

#[derive(Args, Debug)]
struct GeojsonArgs {
    /// Figure snapshot (JSON).
    input: PathBuf,
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    projection: ProjectionArgs,
}

fn options(projection: &ProjectionArgs) -> Result<MapOptions> {
    if projection.crs.is_some() && projection.epsg.is_some() {
        bail!("--crs and --epsg cannot both be given");
    }
    Ok(MapOptions {
        crs: projection.crs.clone(),
        epsg: projection.epsg,
        float_precision: projection.precision,
        ..MapOptions::default()
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Geojson(args) => cmd_geojson(args),
        Command::Tiles => {
            for (name, url, _) in tiles::PROVIDERS {
                println!("{name:<18} {url}");
            }
            Ok(())
        }
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let fig = storage::load_figure(&args.input)?;
    let tiles = match (args.tile_url, args.attribution) {
        (Some(url), Some(attribution)) => TileSource::Custom { url, attribution },
        _ => TileSource::named(args.tiles),
    };
    let options = MapOptions {
        tiles,
        embed_links: args.embed_links,
        template: match args.template {
            Layout::Standalone => Template::Standalone,
            Layout::Notebook => Template::Notebook,
        },
        ..options(&args.projection)?
    };
    spatplot::save_html(&fig, &args.out, &options)?;
    log::info!("rendered {}", args.input.display());
    eprintln!("Wrote map to {}", args.out.display());
    Ok(())
}

fn cmd_geojson(args: GeojsonArgs) -> Result<()> {
    let fig = storage::load_figure(&args.input)?;
    let options = options(&args.projection)?;
    let collection = spatplot::fig_to_geojson(&fig, &options)?;
    match args.out.as_ref() {
        Some(path) => {
            storage::save_geojson(&collection, path, options.float_precision)?;
            eprintln!(
                "Saved {} features to {}",
                collection.features.len(),
                path.display()
            );
        }
        None => println!("{}", collection.to_json(options.float_precision)?),
    }
    Ok(())
}
