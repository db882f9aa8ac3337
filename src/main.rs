use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};

use metacat::core::batch::BatchSession;
use metacat::core::catalog::Catalog;
use metacat::core::display::build_sections;
use metacat::core::edit::EditSession;
use metacat::core::format::EXIF_DATETIME_FORMAT;
use metacat::core::io::TagStore;
use metacat::models::{CatalogConfig, Coordinate, LocationEdit, SortOrder};

#[derive(Parser)]
#[command(name = "metacat", about = "Photo metadata catalog and batch editor")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    RecentlyAdded,
    DateCaptured,
    DateModified,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::RecentlyAdded => SortOrder::RecentlyAdded,
            SortArg::DateCaptured => SortOrder::DateCaptured,
            SortArg::DateModified => SortOrder::DateModified,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog in sorted order.
    List {
        directory: PathBuf,
        #[arg(long, value_enum, default_value = "recently-added")]
        sort: SortArg,
    },
    /// Show the formatted metadata sections of one image.
    Show { path: PathBuf },
    /// Edit fields, date, or location on a single image.
    Edit {
        path: PathBuf,
        /// Field assignment, `key=value`. Repeatable.
        #[arg(long = "set", value_parser = parse_assignment)]
        sets: Vec<(String, String)>,
        /// Date taken, `yyyy:MM:dd HH:mm:ss`.
        #[arg(long)]
        date_taken: Option<String>,
        /// GPS coordinate, `lat,lon` in signed decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        location: Option<String>,
        #[arg(long, conflicts_with = "location")]
        remove_location: bool,
    },
    /// Apply the same edits to several images, dirty-gated.
    Batch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long = "set", value_parser = parse_assignment)]
        sets: Vec<(String, String)>,
        #[arg(long)]
        date_taken: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        location: Option<String>,
        #[arg(long, conflicts_with = "location")]
        remove_location: bool,
    },
    /// Rewrite an image with every metadata segment removed.
    Strip { path: PathBuf },
    /// Ingest an image file into a catalog directory.
    Add {
        directory: PathBuf,
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::List { directory, sort } => list(directory, sort.into()),
        Commands::Show { path } => show(path),
        Commands::Edit {
            path,
            sets,
            date_taken,
            location,
            remove_location,
        } => edit(path, sets, date_taken, location, remove_location),
        Commands::Batch {
            paths,
            sets,
            date_taken,
            location,
            remove_location,
        } => batch(paths, sets, date_taken, location, remove_location),
        Commands::Strip { path } => {
            TagStore::new(&path)
                .strip_all_metadata()
                .with_context(|| format!("stripping {}", path.display()))?;
            println!("stripped {}", path.display());
            Ok(())
        }
        Commands::Add {
            directory,
            file,
            index,
        } => {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let mut catalog = Catalog::open(&directory, CatalogConfig::default())?;
            let path = catalog.add_image(&bytes, index)?;
            println!("added {}", path.display());
            Ok(())
        }
    }
}

fn list(directory: PathBuf, sort: SortOrder) -> Result<()> {
    let config = CatalogConfig {
        sort_order: sort,
        ..CatalogConfig::default()
    };
    let catalog = Catalog::open(&directory, config)
        .with_context(|| format!("opening catalog at {}", directory.display()))?;

    println!("{} photos ({})", catalog.len(), sort.label());
    for record in catalog.records() {
        println!("  {}", record.filename());
    }
    Ok(())
}

fn show(path: PathBuf) -> Result<()> {
    let dict = TagStore::new(&path).load();
    for section in build_sections(&dict) {
        println!("[{}]", section.title);
        for item in &section.items {
            println!("  {:<24} {}", item.label, item.value);
        }
    }
    Ok(())
}

fn edit(
    path: PathBuf,
    sets: Vec<(String, String)>,
    date_taken: Option<String>,
    location: Option<String>,
    remove_location: bool,
) -> Result<()> {
    let mut session = EditSession::open(&path);

    for (key, value) in sets {
        if !session.set_field(&key, value) {
            bail!("unknown editable field key: {key}");
        }
    }
    if let Some(raw) = date_taken {
        session.set_date_taken(parse_date(&raw)?);
    }
    if let Some(raw) = location {
        session.set_coordinate(Some(parse_coordinate(&raw)?));
    } else if remove_location {
        session.set_coordinate(None);
    }

    session
        .save_changes()
        .with_context(|| format!("saving {}", path.display()))?;
    println!("saved {}", path.display());
    Ok(())
}

fn batch(
    paths: Vec<PathBuf>,
    sets: Vec<(String, String)>,
    date_taken: Option<String>,
    location: Option<String>,
    remove_location: bool,
) -> Result<()> {
    let mut session = BatchSession::new(paths);

    for (key, value) in sets {
        if !session.set_field(&key, value) {
            bail!("unknown editable field key: {key}");
        }
    }
    if let Some(raw) = date_taken {
        session.set_date_taken(parse_date(&raw)?);
    }
    if let Some(raw) = location {
        session.set_location(LocationEdit::Set(parse_coordinate(&raw)?));
    } else if remove_location {
        session.set_location(LocationEdit::Removed);
    }

    let (progress_tx, progress_rx) = mpsc::channel();
    let outcome = session.save_changes(progress_tx, None);
    for event in progress_rx {
        let status = if event.success { "ok" } else { "failed" };
        println!("[{}/{}] {} {status}", event.current, event.total, event.filename);
    }

    println!("{} saved, {} failed of {}", outcome.saved, outcome.failed, outcome.total);
    for (path, message) in &outcome.errors {
        eprintln!("  {}: {message}", path.display());
    }
    if !outcome.all_saved() {
        bail!("{} photos failed to save", outcome.failed);
    }
    Ok(())
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(String::from("expected key=value")),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, EXIF_DATETIME_FORMAT)
        .with_context(|| format!("invalid date `{raw}`, expected yyyy:MM:dd HH:mm:ss"))
}

fn parse_coordinate(raw: &str) -> Result<Coordinate> {
    let Some((lat, lon)) = raw.split_once(',') else {
        bail!("invalid coordinate `{raw}`, expected lat,lon");
    };
    let latitude: f64 = lat.trim().parse().context("invalid latitude")?;
    let longitude: f64 = lon.trim().parse().context("invalid longitude")?;
    Ok(Coordinate::new(latitude, longitude))
}
