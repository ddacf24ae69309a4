// ABOUTME: sashgrid entry point.
// ABOUTME: Loads or builds a grid layout, applies edits, and prints the resulting pane rectangles.

mod pane;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sash_core::GridConfig;
use sash_layout::{Grid, GridOptions, SerializedGrid};
use tracing_subscriber::EnvFilter;

use pane::{Pane, PaneFactory, Split};

#[derive(Parser, Debug)]
#[command(name = "sashgrid", version, about = "Lay out split panes and print their rectangles")]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Layout JSON written by a previous `--output`.
    #[arg(long, value_name = "PATH")]
    layout: Option<PathBuf>,

    /// Name of the initial pane when no layout file is given.
    #[arg(long, default_value = "main")]
    root: String,

    /// Add a pane next to an existing one. Repeatable.
    #[arg(long = "split", value_name = "REF:DIR:NAME:SIZE")]
    splits: Vec<Split>,

    /// Remove a pane after all splits are applied. Repeatable.
    #[arg(long = "remove", value_name = "NAME")]
    removals: Vec<String>,

    /// Container width; defaults to the configured width.
    #[arg(long)]
    width: Option<u32>,

    /// Container height; defaults to the configured height.
    #[arg(long)]
    height: Option<u32>,

    /// Minimum width and height of every pane.
    #[arg(long, default_value_t = 50)]
    min_size: u32,

    /// Write the resulting layout as JSON (`-` for stdout).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Store the effective container size in the default config file.
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => GridConfig::load(path).with_context(|| format!("reading config {}", path.display()))?,
        None => GridConfig::load_or_default(),
    };
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    tracing::info!(
        width = config.width,
        height = config.height,
        orientation = ?config.orientation,
        "starting sashgrid"
    );

    let grid = build_grid(cli, &config)?;
    print!("{}", render_rects(&grid));

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&grid.serialize())?;
        if path.as_os_str() == "-" {
            println!("{json}");
        } else {
            std::fs::write(path, json).with_context(|| format!("writing layout {}", path.display()))?;
            tracing::info!(path = %path.display(), "saved layout");
        }
    }

    if cli.save_config {
        let path = config.save_to_default().context("saving config")?;
        tracing::info!(path = %path.display(), "saved config");
    }
    Ok(())
}

fn build_grid(cli: &Cli, config: &GridConfig) -> Result<Grid<Pane>> {
    let options = GridOptions::from(config);
    let mut grid = match &cli.layout {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("reading layout {}", path.display()))?;
            let state: SerializedGrid =
                serde_json::from_str(&text).with_context(|| format!("parsing layout {}", path.display()))?;
            let mut factory = PaneFactory { minimum: cli.min_size };
            Grid::deserialize_with_options(options, &state, &mut factory)
                .with_context(|| format!("restoring layout {}", path.display()))?
        }
        None => Grid::with_options(Pane::new(cli.root.clone(), cli.min_size), options),
    };

    for split in &cli.splits {
        grid.add_view(
            Pane::new(split.name.clone(), cli.min_size),
            split.size,
            &split.reference,
            split.direction,
        )
        .with_context(|| format!("splitting {:?} {:?}", split.reference, split.direction))?;
    }
    for name in &cli.removals {
        grid.remove_view(name).with_context(|| format!("removing {name:?}"))?;
    }

    grid.layout(config.width, config.height);
    Ok(grid)
}

/// One line per pane, top to bottom then left to right.
fn render_rects(grid: &Grid<Pane>) -> String {
    let mut rects: Vec<_> = grid.view_rects().into_iter().collect();
    rects.sort_by(|(a_name, a), (b_name, b)| (a.y, a.x, a_name).cmp(&(b.y, b.x, b_name)));

    let width = rects.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out: String = rects
        .into_iter()
        .map(|(name, rect)| {
            format!(
                "{name:<width$}  {:>5},{:<5} {:>5}x{}\n",
                rect.x, rect.y, rect.width, rect.height
            )
        })
        .collect();
    if let Some(overflow) = grid.overflow() {
        out.push_str(&format!(
            "overflow: {:?} needs {} but only {} available\n",
            overflow.orientation, overflow.required, overflow.available
        ));
    }
    out
}
