use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::fmt::SubscriberBuilder;

use mirage::prelude::*;

#[derive(Parser)]
#[command(name = "mirage")]
#[command(about = "Mirror visibility and trajectory queries over JSON scenes")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Run one query and print the full JSON report
    Query {
        #[arg(long)]
        input: PathBuf,
        /// Pretty-print the report
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Print only the visibility polygons with their provenance tags
    Polygons {
        #[arg(long)]
        input: PathBuf,
    },
}

/// One query as a JSON document: the scene plus the per-frame inputs.
#[derive(Deserialize)]
struct QueryFile {
    chains: Vec<ChainSpec>,
    bounds: Option<ScreenBounds>,
    #[serde(flatten)]
    query: QueryInput,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Query { input, pretty } => {
            let report = run_query_file(&input)?;
            let text = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{text}");
        }
        Action::Polygons { input } => {
            let report = run_query_file(&input)?;
            println!("{}", serde_json::to_string_pretty(&report.polygons)?);
        }
    }
    Ok(())
}

fn run_query_file(path: &Path) -> Result<EngineReport> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading query file {}", path.display()))?;
    let file: QueryFile =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let scene = Scene::build(file.chains, file.bounds)
        .with_context(|| "building scene from chain specs")?;
    let engine = Engine::new(&scene, EngineCfg::default());
    let result = engine
        .query(&file.query)
        .with_context(|| "evaluating query")?;
    tracing::info!(
        stages = result.cascade.stages.len(),
        aligned = result.alignment.is_fully_aligned,
        "query evaluated"
    );
    Ok(result.report())
}
