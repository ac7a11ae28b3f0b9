use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use farm_core::model::{GameState, WordId};
use services::{ExportService, FarmService, HttpWordSource, StaticWordSource, WordSource};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSource { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSource { raw } => write!(f, "invalid --source value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- stats  [--db <sqlite_url>] [--source <url_or_file>]");
    eprintln!("  cargo run -p app -- export [--db <sqlite_url>] [--source <url_or_file>]");
    eprintln!("                             [--out <dir>] [--graduate-mastered]");
    eprintln!("  cargo run -p app -- reset  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:farm.sqlite3");
    eprintln!("  --source vocabulary.csv");
    eprintln!("  --out .");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FARM_DB_URL, FARM_SOURCE_URL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stats,
    Export,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "stats" => Some(Self::Stats),
            "export" => Some(Self::Export),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    source: String,
    out_dir: String,
    graduate_mastered: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("FARM_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://farm.sqlite3".into(), normalize_sqlite_url);
        let mut source = std::env::var("FARM_SOURCE_URL")
            .ok()
            .unwrap_or_else(|| "vocabulary.csv".into());
        let mut out_dir = ".".to_string();
        let mut graduate_mastered = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--source" => {
                    let value = require_value(args, "--source")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidSource { raw: value });
                    }
                    source = value;
                }
                "--out" => {
                    out_dir = require_value(args, "--out")?;
                }
                "--graduate-mastered" => graduate_mastered = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            source,
            out_dir,
            graduate_mastered,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn build_source(raw: &str) -> Result<Arc<dyn WordSource>, Box<dyn std::error::Error>> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        Ok(Arc::new(HttpWordSource::new(raw)))
    } else {
        Ok(Arc::new(StaticWordSource::from_file(Path::new(raw))?))
    }
}

/// Ids of words the learner has fully mastered (learned, attempted, and
/// never missed); the CLI graduates these when asked.
fn mastered_ids(state: &GameState) -> HashSet<WordId> {
    state
        .words()
        .filter(|word| {
            word.learned()
                && word.total_attempts() > 0
                && word.correct_count() == word.total_attempts()
        })
        .map(|word| word.id())
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Stats,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Stats,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    match cmd {
        Command::Stats => {
            let farm = FarmService::new(build_source(&parsed.source)?, storage);
            let state = farm.load().await?;
            let stats = farm.statistics(&state);
            println!("words:        {}", stats.total_words);
            println!("learned:      {}", stats.learned);
            println!("unlearned:    {}", stats.unlearned);
            println!("needs review: {}", stats.needs_review);
            Ok(())
        }
        Command::Export => {
            let farm = FarmService::new(build_source(&parsed.source)?, storage);
            let state = farm.load().await?;
            let selected = if parsed.graduate_mastered {
                mastered_ids(&state)
            } else {
                HashSet::new()
            };
            let service = ExportService::new(services::Clock::default_clock());
            let path = service.write_to(Path::new(&parsed.out_dir), &state, &selected)?;
            println!("wrote {} ({} graduated)", path.display(), selected.len());
            Ok(())
        }
        Command::Reset => {
            let farm = FarmService::new(
                Arc::new(StaticWordSource::new(String::new())),
                storage,
            );
            farm.clear_progress().await?;
            println!("progress cleared");
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
