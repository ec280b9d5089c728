use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use maintenance_gate::config::load_config;
use maintenance_gate::filter::{parse, RequestAttributes};
use maintenance_gate::gate::{ContentItem, ContentResolver, FsResolver, Snapshot};
use maintenance_gate::negotiate::negotiate;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Offline tooling for maintenance gate configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an onlyIf predicate and print its canonical form
    Check {
        predicate: String,
    },
    /// Evaluate an onlyIf predicate against request attributes
    Eval {
        predicate: String,
        #[arg(long, default_value = "")]
        host: String,
        #[arg(long, default_value = "/")]
        path: String,
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long, default_value = "")]
        ua: String,
    },
    /// Pick a content file for an Accept header
    Negotiate {
        /// Accept header value (omit for none)
        #[arg(long)]
        accept: Option<String>,
        /// Content files in preference order
        files: Vec<PathBuf>,
    },
    /// Load a configuration file and build its maintenance snapshot
    Validate {
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (ok, output) = match cli.command {
        Commands::Check { predicate } => check(&predicate),
        Commands::Eval {
            predicate,
            host,
            path,
            method,
            ua,
        } => {
            let attrs = RequestAttributes {
                host: &host,
                path: &path,
                method: &method,
                user_agent: &ua,
            };
            eval(&predicate, &attrs)
        }
        Commands::Negotiate { accept, files } => negotiate_files(accept.as_deref(), &files),
        Commands::Validate { config } => validate(&config),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn check(predicate: &str) -> (bool, Value) {
    match parse(predicate) {
        Ok(expr) => (true, json!({ "valid": true, "canonical": expr.to_string() })),
        Err(e) => (
            false,
            json!({ "valid": false, "offset": e.offset, "error": e.kind.to_string() }),
        ),
    }
}

fn eval(predicate: &str, attrs: &RequestAttributes<'_>) -> (bool, Value) {
    match parse(predicate) {
        Ok(expr) => (true, json!({ "matches": expr.evaluate(attrs) })),
        Err(e) => (false, json!({ "error": e.to_string() })),
    }
}

fn negotiate_files(accept: Option<&str>, files: &[PathBuf]) -> (bool, Value) {
    let resolver = FsResolver::new(".");
    let items = files
        .iter()
        .map(|file| {
            let name = file.to_string_lossy().into_owned();
            let body = resolver.resolve(&name);
            ContentItem::new(name, body)
        })
        .collect();

    let snapshot = match Snapshot::build(true, None, items) {
        Ok(snapshot) => snapshot,
        Err(e) => return (false, json!({ "error": e.to_string() })),
    };
    let result = negotiate(accept, snapshot.alternatives());

    (
        true,
        json!({
            "status": result.status,
            "media_type": result.media_type,
            "body": String::from_utf8_lossy(&result.body),
        }),
    )
}

fn validate(path: &Path) -> (bool, Value) {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => return (false, json!({ "valid": false, "error": e.to_string() })),
    };

    let root = config
        .maintenance
        .content_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    match Snapshot::from_config(&config.maintenance, &FsResolver::new(root)) {
        Ok(snapshot) => (
            true,
            json!({
                "valid": true,
                "enabled": snapshot.enabled(),
                "only_if": snapshot.predicate().map(|p| p.to_string()),
                "content": snapshot
                    .alternatives()
                    .iter()
                    .map(|alt| json!({ "media_type": alt.media_type, "bytes": alt.body.len() }))
                    .collect::<Vec<_>>(),
            }),
        ),
        Err(e) => (false, json!({ "valid": false, "error": e.to_string() })),
    }
}
