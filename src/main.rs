//! SceneFBX CLI
//!
//! Command-line interface for exporting JSON scene descriptions to binary
//! FBX and inspecting the written files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fbxcel::low::v7400::AttributeValue;
use fbxcel::tree::any::AnyTree;
use fbxcel::tree::v7400::NodeHandle;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

use scenefbx_export::{ExportConfig, ExportSummary, FbxExporter};
use scenefbx_scene::{SceneDescription, SceneObject};

/// SceneFBX - export scene graphs to binary FBX
#[derive(Parser)]
#[command(name = "scenefbx")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for summaries
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene description to FBX
    Export(ExportArgs),

    /// Load a scene description and its textures without exporting
    Validate(ValidateArgs),

    /// Dump the record tree of a binary FBX file
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Scene description (JSON)
    input: PathBuf,

    /// Output FBX file
    #[arg(short, long)]
    output: PathBuf,

    /// Export every object under the root instead of preserving hierarchy
    #[arg(long)]
    flat: bool,

    /// Skip materials and textures
    #[arg(long)]
    no_materials: bool,

    /// Reference staged textures instead of embedding them
    #[arg(long)]
    no_embed: bool,

    /// Multiplier for node translations
    #[arg(long, default_value = "100")]
    distance_scale: f32,

    /// Multiplier for non-directional light intensities
    #[arg(long, default_value = "10000")]
    intensity_scale: f32,

    /// Multiplier for mesh vertex positions
    #[arg(long, default_value = "100")]
    vertex_scale: f32,

    /// Keep alpha when decompressing block-compressed textures
    #[arg(long)]
    keep_alpha: bool,

    /// Directory under which textures are staged (default: system temp)
    #[arg(long)]
    data_root: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Scene description (JSON)
    input: PathBuf,
}

#[derive(Args)]
struct InspectArgs {
    /// FBX file to inspect
    path: PathBuf,

    /// Maximum record depth to print
    #[arg(long, default_value = "2")]
    depth: usize,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_file(verbosity >= 3)
        .with_line_number(verbosity >= 3)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Export(args) => cmd_export(args, cli.format),
        Commands::Validate(args) => cmd_validate(args, cli.format),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
    }
}

/// Directory that texture paths in `input` are relative to
fn base_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn cmd_export(args: ExportArgs, format: OutputFormat) -> Result<()> {
    info!("Loading scene description: {:?}", args.input);
    let description = SceneDescription::load(&args.input)
        .with_context(|| format!("Failed to load scene description {:?}", args.input))?;
    let base = base_dir(&args.input);

    let mut config = ExportConfig::default()
        .with_materials(!args.no_materials)
        .with_embedded(!args.no_embed)
        .with_distance_scale(args.distance_scale)
        .with_intensity_scale(args.intensity_scale)
        .with_vertex_scale(args.vertex_scale)
        .with_drop_alpha(!args.keep_alpha);
    if let Some(root) = &args.data_root {
        config = config.with_data_root(root);
    }
    let exporter = FbxExporter::new(config);

    let summary = if args.flat {
        let objects = description
            .build_objects(&base)
            .context("Failed to build scene objects")?;
        exporter.export_flat(&objects, &args.output)
    } else {
        let trees = description
            .build_trees(&base)
            .context("Failed to build scene trees")?;
        exporter.export_hierarchy(&trees, &args.output)
    }
    .with_context(|| format!("Failed to export {:?}", args.output))?;

    print_summary(&summary, format)
}

fn print_summary(summary: &ExportSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": summary.path,
                "bytes": summary.bytes,
                "nodes": summary.nodes,
                "meshes": summary.meshes,
                "materials": summary.materials,
                "textures": summary.textures,
                "lights": summary.lights,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Exported: {:?}", summary.path);
            println!("  Size:       {}", format_size(summary.bytes as u64));
            println!("  Nodes:      {}", summary.nodes);
            println!("  Meshes:     {}", summary.meshes);
            println!("  Materials:  {}", summary.materials);
            println!("  Textures:   {}", summary.textures);
            println!("  Lights:     {}", summary.lights);
        }
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs, format: OutputFormat) -> Result<()> {
    let description = SceneDescription::load(&args.input)
        .with_context(|| format!("Failed to load scene description {:?}", args.input))?;
    let objects: Vec<SceneObject> = description
        .build_objects(base_dir(&args.input))
        .context("Scene description is invalid")?;

    let meshes = objects.iter().filter(|o| o.has_mesh()).count();
    let lights = objects.iter().filter(|o| o.has_light()).count();
    let triangles: usize = objects
        .iter()
        .filter_map(|o| o.mesh.as_ref())
        .map(|m| m.triangle_count())
        .sum();
    let textures: usize = objects
        .iter()
        .flat_map(|o| &o.materials)
        .map(|m| m.textures().count())
        .sum();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": args.input,
                "roots": description.objects.len(),
                "objects": objects.len(),
                "meshes": meshes,
                "triangles": triangles,
                "lights": lights,
                "textures": textures,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Scene description: {:?}", args.input);
            println!("  Root objects:  {}", description.objects.len());
            println!("  Objects:       {}", objects.len());
            println!("  Meshes:        {} ({} triangles)", meshes, triangles);
            println!("  Lights:        {}", lights);
            println!("  Textures:      {}", textures);
        }
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let file = File::open(&args.path).with_context(|| format!("Failed to open {:?}", args.path))?;
    let size = file.metadata()?.len();
    let loaded = AnyTree::from_seekable_reader(BufReader::new(file))
        .map_err(|e| anyhow!("Failed to decode {:?}: {}", args.path, e))?;
    let (version, tree, footer) = match loaded {
        AnyTree::V7400(version, tree, footer) => (version, tree, footer),
        _ => bail!("{:?} uses an unsupported FBX version", args.path),
    };
    if let Err(e) = &footer {
        warn!("Invalid FBX footer in {:?}: {}", args.path, e);
    }
    let (major, minor) = version.major_minor();

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": args.path,
                "version": format!("{}.{}", major, minor),
                "footer_ok": footer.is_ok(),
                "records": tree.root().children().map(|r| record_json(r, args.depth)).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("FBX {}.{} ({})", major, minor, format_size(size));
            for record in tree.root().children() {
                print_record(record, 0, args.depth);
            }
        }
    }
    Ok(())
}

fn print_record(node: NodeHandle<'_>, level: usize, max_depth: usize) {
    let props: Vec<String> = node.attributes().iter().map(describe_property).collect();
    println!("{}{}: {}", "  ".repeat(level), node.name(), props.join(", "));

    let children = node.children().count();
    if level + 1 < max_depth {
        for child in node.children() {
            print_record(child, level + 1, max_depth);
        }
    } else if children > 0 {
        println!("{}... {} children", "  ".repeat(level + 1), children);
    }
}

fn record_json(node: NodeHandle<'_>, depth: usize) -> serde_json::Value {
    let props: Vec<String> = node.attributes().iter().map(describe_property).collect();
    let children: Vec<serde_json::Value> = if depth > 1 {
        node.children().map(|c| record_json(c, depth - 1)).collect()
    } else {
        Vec::new()
    };
    serde_json::json!({
        "name": node.name(),
        "properties": props,
        "children": children,
    })
}

/// Short human-readable rendering of an attribute; arrays show their length
fn describe_property(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Bool(v) => v.to_string(),
        AttributeValue::I16(v) => v.to_string(),
        AttributeValue::I32(v) => v.to_string(),
        AttributeValue::I64(v) => v.to_string(),
        AttributeValue::F32(v) => v.to_string(),
        AttributeValue::F64(v) => v.to_string(),
        AttributeValue::String(s) => format!("{:?}", s.replace("\u{0}\u{1}", "::")),
        AttributeValue::Binary(b) => format!("<{} bytes>", b.len()),
        AttributeValue::ArrBool(a) => format!("bool[{}]", a.len()),
        AttributeValue::ArrI32(a) => format!("i32[{}]", a.len()),
        AttributeValue::ArrI64(a) => format!("i64[{}]", a.len()),
        AttributeValue::ArrF32(a) => format!("f32[{}]", a.len()),
        AttributeValue::ArrF64(a) => format!("f64[{}]", a.len()),
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
