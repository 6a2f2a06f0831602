//! Command-line host: imports a markup file into an editor, prints the
//! resulting HTML and CSS and optionally stores the project.
//!
//! Usage: `trowel <page.html> [config.json] [--store] [--canvas]`

use anyhow::{Context as _, Result, anyhow};
use editor::{Editor, EditorConfig, GetCssOptions, StorageConfig};
use log::{info, warn};
use std::env;
use std::io::{self, Write as _};
use tokio::fs;
use tokio::runtime::Builder;

const USAGE: &str = "usage: trowel <page.html> [config.json] [--store] [--canvas]";

struct Args {
    markup: String,
    config: Option<String>,
    store: bool,
    canvas: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut positional = Vec::new();
        let mut store = false;
        let mut canvas = false;
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--store" => store = true,
                "--canvas" => canvas = true,
                _ => positional.push(arg),
            }
        }
        let mut positional = positional.into_iter();
        let markup = positional.next().ok_or_else(|| anyhow!(USAGE))?;
        Ok(Self {
            markup,
            config: positional.next(),
            store,
            canvas,
        })
    }
}

async fn load_config(path: Option<&str>) -> Result<EditorConfig> {
    let config = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {path}"))?;
            EditorConfig::from_json(&json)?
        }
        None => EditorConfig::default().with_storage(StorageConfig {
            autoload: false,
            ..StorageConfig::default()
        }),
    };
    Ok(config.apply_env())
}

async fn run() -> Result<()> {
    let args = Args::parse()?;
    let markup = fs::read_to_string(&args.markup)
        .await
        .with_context(|| format!("reading {}", args.markup))?;
    let config = load_config(args.config.as_deref()).await?.with_components(&markup);

    let mut editor = Editor::init(config)?;
    for failure in editor.import_errors() {
        warn!("{failure}");
    }
    editor.load_on_start().await?;

    {
        let mut out = io::stdout().lock();
        if args.canvas {
            writeln!(out, "{}", editor.canvas_html())?;
        } else {
            writeln!(out, "{}", editor.get_html())?;
            writeln!(out, "{}", editor.get_css(&GetCssOptions::default()))?;
        }
    }

    if args.store {
        let data = editor.store().await?;
        info!(
            "Stored {} rules to {}",
            data.styles.len(),
            editor.storage().config().path
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(run())
}
