//! ArcHelper command line.
//!
//! Identifies item icons from screenshots and prints what the item is good for.

mod config;
mod recognizer;
mod report;
mod state;
mod watch;

use std::{
    io::BufRead,
    path::PathBuf,
    sync::{
        Arc,
        mpsc::{self, Receiver},
    },
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::{
    config::Config,
    recognizer::{Recognition, Recognizer},
    state::State,
};

#[derive(Parser)]
#[command(name = "archelper", version, about = "Arc Raiders item icon lookup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Item data directory (contains Items/ and Hideout/)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Reference icon directory
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Locale for names and descriptions
    #[arg(long, global = true)]
    language: Option<String>,

    /// Minimum score for a match to be accepted (0..1)
    #[arg(long, global = true)]
    threshold: Option<f32>,

    /// Write the effective settings back to the config file
    #[arg(long, global = true)]
    save_config: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Identify the icon in one or more images
    Identify {
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Crop a square around this point first (x,y), e.g. a cursor position on a screenshot
        #[arg(long, value_parser = parse_point)]
        at: Option<(u32, u32)>,
    },

    /// Describe an item by identifier
    Describe { id: String },

    /// Find items whose name contains the query
    Search { query: String },

    /// Reload on data changes and identify image paths read from stdin
    Watch,
}

fn parse_point(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s.split_once(',').ok_or("expected x,y")?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    // Structured logging. Use `RUST_LOG=debug` etc.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = effective_config(&cli);
    if cli.save_config {
        config.save()?;
    }

    match cli.command {
        Command::Identify { images, at } => {
            let state = State::new(config)?;
            let snapshot = state.snapshot();
            for image in &images {
                let probe = load_probe(image, at, state.config())?;
                let recognition = recognizer::recognize(
                    &snapshot,
                    &probe,
                    state.config().match_threshold,
                    &state.config().language,
                    None,
                )?;
                if images.len() > 1 {
                    println!("== {}", image.display());
                }
                print!("{}", report::recognition(&recognition));
            }
        }
        Command::Describe { id } => {
            let db = data::Database::load(&config.data_dir)?;
            match db.describe(&id, &config.language) {
                data::Lookup::Found(item) => print!("{}", report::item(&item)),
                data::Lookup::NotFound { identifier } => {
                    println!("{}", report::not_found(&identifier, db.catalog.closest_identifier(&identifier)));
                }
            }
        }
        Command::Search { query } => {
            let db = data::Database::load(&config.data_dir)?;
            let hits = db.catalog.search_by_name(&query, &config.language);
            if hits.is_empty() {
                println!("no items match '{query}'");
            }
            for item in hits {
                println!("{}  {}", item.id, item.display_name(&config.language));
            }
        }
        Command::Watch => watch_stdin(config)?,
    }
    Ok(())
}

/// File config, overridden by command line flags.
fn effective_config(cli: &Cli) -> Config {
    let mut config = Config::load_or_default();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.templates {
        config.template_dir = Some(dir.clone());
    }
    if let Some(language) = &cli.language {
        config.language = language.clone();
    }
    if let Some(threshold) = cli.threshold {
        config.match_threshold = threshold;
    }
    config.validate();
    config
}

fn load_probe(path: &std::path::Path, at: Option<(u32, u32)>, config: &Config) -> Result<ie::OwnedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read {:?}", path))?;
    let image = ie::OwnedImage::decode(&bytes, config.recognition.background)
        .with_context(|| format!("decode {:?}", path))?;
    Ok(match at {
        Some((x, y)) => image.as_image().centered_square(x, y, config.capture_size).to_owned_image(),
        None => image,
    })
}

fn watch_stdin(config: Config) -> Result<()> {
    let state = Arc::new(State::new(config)?);
    let _reloader = watch::spawn(state.clone()).context("start file watcher")?;
    let recognizer = Recognizer::new(state.clone());

    // Results print in submission order; a newer line cancels the one still running.
    let (pending, results) = mpsc::channel::<Receiver<Result<Recognition, String>>>();
    let printer = std::thread::spawn(move || {
        for rx in results {
            match rx.recv() {
                Ok(Ok(recognition)) => print!("{}", report::recognition(&recognition)),
                Ok(Err(err)) => eprintln!("{err}"),
                Err(_) => break,
            }
        }
    });

    eprintln!("enter image paths (optionally followed by x,y); Ctrl-D to quit");
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(path) = parts.next() else {
            continue;
        };
        let at = match parts.next().map(parse_point).transpose() {
            Ok(at) => at,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        let probe = match load_probe(std::path::Path::new(path), at, state.config()) {
            Ok(probe) => probe,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };
        if pending.send(recognizer.submit(probe)).is_err() {
            anyhow::bail!("result printer stopped");
        }
    }

    drop(pending);
    printer.join().map_err(|_| anyhow::anyhow!("result printer panicked"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points() {
        assert_eq!(parse_point("120, 48"), Ok((120, 48)));
        assert!(parse_point("120").is_err());
        assert!(parse_point("a,1").is_err());
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn identify_crops_around_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        image::RgbaImage::from_pixel(400, 300, image::Rgba([10, 20, 30, 255])).save(&path).unwrap();

        let mut config = Config::default();
        config.capture_size = 100;
        let probe = load_probe(&path, Some((390, 10)), &config).unwrap();
        assert_eq!((probe.width(), probe.height()), (100, 100));
        let full = load_probe(&path, None, &config).unwrap();
        assert_eq!((full.width(), full.height()), (400, 300));
    }
}
