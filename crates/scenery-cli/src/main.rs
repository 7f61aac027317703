use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use scenery_core::{DefaultAssetLoader, Director, ElementKind, LoadOptions, NodeId, SceneGraph};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scene directory holding placements.json and its assets
    #[arg(value_name = "SCENE_DIR")]
    scene: PathBuf,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1920.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 1080.0)]
    height: f32,

    /// Number of frames to step
    #[arg(long, default_value_t = 0)]
    frames: usize,

    /// Spawn this template instead of the stage
    #[arg(long, value_name = "TEMPLATE")]
    spawn: Option<String>,

    /// Play every timeline under the root before stepping
    #[arg(long)]
    play: bool,

    /// Print the display list as JSON to stdout
    #[arg(long)]
    dump: bool,

    /// Print the node tree to stdout
    #[arg(long)]
    tree: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level.to_string().parse()?)
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }
    Ok(())
}

fn print_tree(graph: &SceneGraph, id: NodeId, depth: usize) {
    let Some(node) = graph.get_node(id) else {
        return;
    };
    let t = &node.transform;
    println!(
        "{}{} [{:?}] x={} y={} alpha={}{}",
        "  ".repeat(depth),
        if node.name.is_empty() { "<unnamed>" } else { node.name.as_str() },
        node.kind(),
        t.x,
        t.y,
        t.alpha,
        if t.visible { "" } else { " hidden" }
    );
    for &child in &node.children {
        print_tree(graph, child, depth + 1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let base = cli.scene.to_string_lossy().into_owned();
    let mut director = Director::new(Arc::new(DefaultAssetLoader), cli.width, cli.height);
    director
        .load_scene("main", &base, &LoadOptions::default())
        .with_context(|| format!("loading scene from {}", base))?;

    // Log every cue point the scene declares.
    let cue_names: BTreeSet<String> = director
        .scenes
        .peek()
        .and_then(|s| s.data())
        .map(|d| d.cue_points.values().flat_map(|c| c.values().cloned()).collect())
        .unwrap_or_default();
    for name in cue_names {
        director.add_cue_listener(&name, |event, _| {
            info!("Cue '{}' at frame {} of node {}", event.name, event.frame, event.timeline);
        });
    }

    let root = match &cli.spawn {
        Some(name) => director
            .spawn(name)
            .with_context(|| format!("no template named '{}'", name))?,
        None => director.load_stage()?,
    };
    director.wait_attachments(Duration::from_secs(10));

    if cli.play {
        let timelines: Vec<NodeId> = director
            .graph()
            .descendants(root)
            .into_iter()
            .filter(|&id| director.graph().kind(id) == Some(ElementKind::Timeline))
            .collect();
        if timelines.is_empty() {
            warn!("--play given but nothing under the root is a timeline");
        }
        for id in timelines {
            director.play(id);
        }
    }

    for _ in 0..cli.frames {
        director.step();
    }
    info!("Stepped {} frames, {} nodes live", cli.frames, director.graph().len());

    if cli.tree {
        print_tree(director.graph(), root, 0);
    }
    if cli.dump {
        let list = director.display_list(root)?;
        println!("{}", serde_json::to_string_pretty(&list)?);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("Invalid log configuration: {}", e);
        std::process::exit(2);
    }

    info!("Scene: {:?} at {}x{}", cli.scene, cli.width, cli.height);
    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
