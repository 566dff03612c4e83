use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use cliptimeline_lib::{
    find_date_divisions, now_local, parse_filename_date, ActivitySegment, AxisSpan, DateDivision,
    DateRange, EngineSettings, FileStore, KeyValueStore, MemoryStore, SettingsStore, ViewerSession,
    WindowState,
};

#[derive(Parser, Debug)]
#[command(name = "cliptimeline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON array of clip filenames, newest first, or `-` for stdin
    input: String,

    /// Reference time as YYYYMMDD-HHMMSS (default: now, local time)
    #[arg(long)]
    now: Option<String>,

    /// Maximum number of axis divisions (default: sized to the range)
    #[arg(long)]
    divisions: Option<usize>,

    /// Engine settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Range to report on instead of the default or restored one
    #[arg(long)]
    range: Option<String>,

    /// Directory for saved viewer positions (default: not persisted)
    #[arg(long)]
    prefs_dir: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    ranges: &'a [DateRange],
    selected_range: &'a str,
    segments: &'a [ActivitySegment],
    activity_markers: Vec<AxisSpan>,
    divisions: Vec<DateDivision>,
    state: &'a WindowState,
    current_clip_url: Option<String>,
}

fn read_filenames(input: &str) -> Result<Vec<String>> {
    let raw = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read file list from stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read file list from {input}"))?
    };
    serde_json::from_str(&raw).context("File list must be a JSON array of strings")
}

fn load_settings(path: Option<PathBuf>) -> Result<EngineSettings> {
    match path {
        Some(path) => Ok(SettingsStore::new(path)?.engine()),
        None => Ok(EngineSettings::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var); stdout carries the report
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let settings = load_settings(args.settings)?;
    let filenames = read_filenames(&args.input)?;
    let now = match args.now.as_deref() {
        Some(stamp) => parse_filename_date(stamp).context("Invalid --now")?,
        None => now_local(),
    };

    let kv: Box<dyn KeyValueStore> = match &args.prefs_dir {
        Some(dir) => Box::new(FileStore::new(dir)?),
        None => Box::new(MemoryStore::new()),
    };
    let namespace = settings.media_host.clone();
    let mut session = ViewerSession::new(settings, kv, &namespace);
    session.start_autosave();

    session.load_file_list(&filenames, now)?;
    if let Some(name) = args.range.as_deref() {
        session.select_range(name)?;
    }

    let divisions = match args.divisions {
        Some(max_count) => find_date_divisions(&session.state().filter_range, max_count),
        None => session.filter_divisions(),
    };

    let report = Report {
        ranges: session.ranges(),
        selected_range: session.selected_range_name(),
        segments: session.segments(),
        activity_markers: session.activity_markers(),
        divisions,
        state: session.state(),
        current_clip_url: session.current_clip_url(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    session.shutdown().await
}
