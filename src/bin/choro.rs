use anyhow::Result;
use choropleth_rs::selection::Interaction;
use choropleth_rs::settings::{OBJECT_NAMES, ObjectInstance};
use choropleth_rs::{BoundaryLevel, Frame, LocalSelectionManager, UpdateOptions, Viewport, Visual};
use choropleth_rs::{storage, viz};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "choro",
    version,
    about = "Join values to administrative boundaries and render a choropleth map"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame to SVG or PNG.
    Render(RenderArgs),
    /// Print the editable properties of the settings pane as JSON.
    Properties(PropertiesArgs),
    /// List the known boundary levels.
    Levels,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Directory holding `<level>.geojson` files (e.g. regions.geojson).
    #[arg(short, long)]
    geometry: PathBuf,
    /// CSV with header `name,value[,highlight][,selection_id]`.
    #[arg(short, long)]
    data: PathBuf,
    /// JSON property bag (`{"map": {..}, "couleur": {..}, ..}`).
    #[arg(short, long)]
    settings: Option<PathBuf>,
    /// Drill depth, 0 = first configured level.
    #[arg(long, default_value_t = 0)]
    drill_level: usize,
    /// Width of the output (default 900).
    #[arg(long, default_value_t = 900)]
    width: u32,
    /// Height of the output (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Output path (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// GeoJSON property holding the feature name.
    #[arg(long, default_value = storage::DEFAULT_NAME_PROPERTY)]
    name_property: String,
    /// Select a feature by name; repeat to multi-select.
    #[arg(long = "select")]
    select: Vec<String>,
    /// Also save the computed frame as JSON.
    #[arg(long)]
    dump: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PropertiesArgs {
    /// JSON property bag to enumerate against.
    #[arg(short, long)]
    settings: Option<PathBuf>,
    /// Only this object (couleur, tooltip, scale, map).
    #[arg(long)]
    object: Option<String>,
}

fn load_objects(path: Option<&Path>) -> Result<serde_json::Value> {
    match path {
        Some(p) => storage::load_objects_json(p),
        None => Ok(serde_json::json!({})),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Properties(args) => cmd_properties(args),
        Command::Levels => {
            for level in BoundaryLevel::ALL {
                println!("{level}");
            }
            Ok(())
        }
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let geometry = storage::load_geometry_dir(&args.geometry, &args.name_property)?;
    let rows = storage::load_rows_csv(&args.data)?;
    let options = UpdateOptions {
        rows: Some(rows),
        objects: load_objects(args.settings.as_deref())?,
        drill_level: args.drill_level,
        viewport: Viewport::new(args.width as f64, args.height as f64),
    };

    let mut visual = Visual::new(geometry, LocalSelectionManager::new());
    let mut frame = visual.update(options.clone());
    if !args.select.is_empty() {
        for (i, name) in args.select.iter().enumerate() {
            if visual.interact(name, Interaction::Click { ctrl: i > 0 }).is_none() {
                eprintln!("No drawn feature named {name:?}");
            }
        }
        frame = visual.update(options);
    }

    viz::render_frame(&frame, &args.out, args.width, args.height)?;
    match &frame {
        Frame::Landing => eprintln!("No data rows, wrote landing page to {}", args.out.display()),
        Frame::Map(map) => {
            let model = visual.model();
            eprintln!(
                "Rendered {} ({} of {} feature(s) with data) to {}",
                map.level,
                model.matched_count(),
                model.feature_count(),
                args.out.display()
            );
        }
    }

    if let Some(path) = args.dump.as_ref() {
        storage::save_json(&frame, path)?;
        eprintln!("Saved frame to {}", path.display());
    }
    Ok(())
}

fn cmd_properties(args: PropertiesArgs) -> Result<()> {
    let objects = load_objects(args.settings.as_deref())?;
    let settings = choropleth_rs::VisualSettings::resolve(&objects, 0);
    let names: Vec<&str> = match args.object.as_deref() {
        Some(name) if OBJECT_NAMES.contains(&name) => vec![name],
        Some(other) => anyhow::bail!(
            "unknown object: {other} (expected one of {})",
            OBJECT_NAMES.join(", ")
        ),
        None => OBJECT_NAMES.to_vec(),
    };
    let listing: BTreeMap<&str, Vec<ObjectInstance>> = names
        .into_iter()
        .map(|n| (n, settings.enumerate_objects(n)))
        .collect();
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}
