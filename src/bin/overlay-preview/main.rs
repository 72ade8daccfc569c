//! CLI tool to preview a collaborator overlay for a scene file.
//!
//! Usage:
//!   overlay-preview --scene scene.json [--config overlay.json] [--format json|html] [--output out.html]

mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use heyocursors::{render_html, OverlayConfig, OverlayRenderer};
use scene::Scene;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Html,
}

#[derive(Parser, Debug)]
#[command(
    name = "overlay-preview",
    about = "Render collaborator carets and selections for a scene file",
    version
)]
struct Args {
    /// Scene JSON file (text nodes, layout, collaborators)
    #[arg(short, long)]
    scene: PathBuf,

    /// Overlay config JSON file (defaults apply to missing keys)
    #[arg(short, long, env = "HEYOCURSORS_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "heyocursors=info".into()))
        .init();

    let args = Args::parse();

    // 1. Load config
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            OverlayConfig::from_json(&json).context("Invalid overlay config")?
        }
        None => OverlayConfig::default(),
    };
    debug!(?config, "loaded config");

    // 2. Load scene
    if !args.scene.exists() {
        anyhow::bail!("Scene file does not exist: {}", args.scene.display());
    }
    let json = std::fs::read_to_string(&args.scene).context("Failed to read scene file")?;
    let scene: Scene = serde_json::from_str(&json).context("Failed to parse scene JSON")?;
    let surface = scene.surface().context("Invalid scene layout")?;

    // 3. Render
    let renderer = OverlayRenderer::new(config);
    let overlay = renderer.render(&scene.collaborators, Some(&surface));
    info!(
        text_len = scene.text_len(),
        collaborators = scene.collaborators.len(),
        groups = overlay.len(),
        "rendered scene"
    );

    // 4. Write
    let rendered = match args.format {
        Format::Json => serde_json::to_string_pretty(&overlay).context("Failed to serialize overlay")?,
        Format::Html => render_html(&overlay, renderer.config()),
    };
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered).context("Failed to write output file")?;
            info!(path = %path.display(), "wrote overlay");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
