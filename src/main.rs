//! IndexKV - An Embeddable JSON Document Store
//!
//! This is the interactive front end: it opens a session over a snapshot
//! file and runs the command loop on stdin/stdout.

use anyhow::Context;
use indexkv::repl::{self, ReplOptions};
use indexkv::session::Session;
use indexkv::storage::{JsonFilePersistence, NoPersistence, Persistence};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Binary configuration
struct Config {
    /// Snapshot file
    data: PathBuf,
    /// Run without persistence
    memory: bool,
    /// Table refresh interval in milliseconds (0 = off)
    refresh_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: PathBuf::from(indexkv::DEFAULT_DATA_FILE),
            memory: false,
            refresh_ms: 0,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--data" | "-d" => {
                    if i + 1 < args.len() {
                        config.data = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        eprintln!("Error: --data requires a path");
                        std::process::exit(1);
                    }
                }
                "--memory" | "-m" => {
                    config.memory = true;
                    i += 1;
                }
                "--refresh-ms" | "-r" => {
                    if i + 1 < args.len() {
                        config.refresh_ms = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid refresh interval");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --refresh-ms requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("IndexKV version {}", indexkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Builds the persistence backend selected by the flags
    fn persistence(&self) -> Box<dyn Persistence> {
        if self.memory {
            Box::new(NoPersistence)
        } else {
            Box::new(JsonFilePersistence::new(&self.data))
        }
    }
}

fn print_help() {
    println!(
        r#"
IndexKV - An Embeddable JSON Document Store

USAGE:
    indexkv [OPTIONS]

OPTIONS:
    -d, --data <PATH>        Snapshot file (default: indexkv.json)
    -m, --memory             Do not load or save a snapshot
    -r, --refresh-ms <MS>    Redraw the document table every MS milliseconds (default: off)
    -v, --version            Print version information
    -h, --help               Print this help message

COMMANDS:
    SET <key> <jsonObject> [ttlMillis]
    GET <key>
    DEL <key>
    INDEX <baseKey> <field> <value>
    RANGE <field> <start> <end>
    .view  .help  .quit

EXAMPLE:
    > SET user:1 {{"status": "active", "age": 30}} 60000
    OK
    > INDEX user:1 status active
    Index created.
    > RANGE age 18 40
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Logs go to stderr so replies on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut session = Session::open(config.persistence()).with_context(|| {
        format!("failed to load snapshot from {}", config.data.display())
    })?;
    info!(
        version = indexkv::VERSION,
        documents = session.database().len(),
        "IndexKV ready"
    );

    let options = ReplOptions::new()
        .with_prompt("> ")
        .with_refresh(Duration::from_millis(config.refresh_ms));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        result = repl::run(stdin, &mut stdout, &mut session, &options) => {
            result.context("command loop failed")?;
        }
        _ = signal::ctrl_c() => {
            info!("Interrupted");
            // The blocking stdin reader would otherwise hold up runtime shutdown
            std::process::exit(0);
        }
    }

    info!("Goodbye");
    Ok(())
}
