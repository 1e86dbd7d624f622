//! `talentmatch` command-line interface.
//!
//! Two subcommands, both reading a `{ "candidates": [...], "jobs": [...] }`
//! JSON document and printing a JSON report to stdout:
//!
//! - `rules`: exhaustive rule-based scan.
//! - `semantic`: index every profile, then list nearest neighbours, or run
//!   a free-text search with `--text`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use talentmatch::{
    all_profiles, build_semantic_matcher, diagnose, ensure_indexed, init_tracing, read_snapshot,
    run_rule_scan, AppConfig, GroupBy, OwnerKind, Profile, RuleScan,
};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "talentmatch",
    about = "Match candidates and jobs by explainable rules or embedding similarity",
    version
)]
struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to ./talentmatch.* when present.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Candidate,
    Job,
}

impl From<Side> for GroupBy {
    fn from(side: Side) -> Self {
        match side {
            Side::Candidate => GroupBy::Candidate,
            Side::Job => GroupBy::Job,
        }
    }
}

impl From<Side> for OwnerKind {
    fn from(side: Side) -> Self {
        match side {
            Side::Candidate => OwnerKind::Candidate,
            Side::Job => OwnerKind::Job,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score every candidate/job pair and report matches above the threshold
    Rules {
        /// Profiles document
        profiles: PathBuf,

        /// Group results by candidate or by job
        #[arg(long, value_enum, default_value = "candidate")]
        group_by: Side,

        /// Only scan this source profile id
        #[arg(long)]
        target: Option<String>,

        /// Override scoring.min_match_score
        #[arg(long)]
        min_score: Option<f64>,

        /// Print every pair with its full breakdown, below-threshold ones included
        #[arg(long)]
        diagnose: bool,
    },

    /// Embed and index profiles, then list nearest opposite-kind neighbours
    Semantic {
        /// Profiles document
        profiles: PathBuf,

        /// Neighbours per profile (defaults to semantic.top_k)
        #[arg(long)]
        top_k: Option<usize>,

        /// Only match this profile id
        #[arg(long)]
        target: Option<String>,

        /// Free-text search instead of profile matching
        #[arg(long)]
        text: Option<String>,

        /// Restrict --text search to one side
        #[arg(long, value_enum)]
        kind: Option<Side>,

        /// Assume the index already holds the profiles (persistent backends only)
        #[arg(long)]
        skip_index: bool,

        /// Create the Qdrant collection if it does not exist
        #[arg(long)]
        provision: bool,
    },
}

fn run_rules(
    cfg: &AppConfig,
    profiles: PathBuf,
    group_by: Side,
    target: Option<String>,
    min_score: Option<f64>,
    show_all: bool,
) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&profiles, &cfg.ingest)?;
    let scoring = match min_score {
        Some(min) => cfg.scoring.with_min_match_score(min),
        None => cfg.scoring,
    };
    let mut scan = RuleScan::new(group_by.into());
    if let Some(target) = target {
        scan = scan.with_target(target);
    }

    let json = if show_all {
        let pairs = diagnose(&snapshot.candidates, &snapshot.jobs, &scoring, &scan)?;
        serde_json::to_string_pretty(&pairs)?
    } else {
        run_rule_scan(&snapshot.candidates, &snapshot.jobs, &scoring, &scan)?.to_json_pretty()?
    };
    println!("{json}");
    Ok(())
}

struct SemanticArgs {
    profiles: PathBuf,
    top_k: Option<usize>,
    target: Option<String>,
    text: Option<String>,
    kind: Option<Side>,
    skip_index: bool,
    provision: bool,
}

async fn run_semantic(cfg: &AppConfig, args: SemanticArgs) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.profiles, &cfg.ingest)?;
    let profiles = all_profiles(&snapshot);
    let matcher = build_semantic_matcher(cfg, args.provision).await?;

    ensure_indexed(&matcher, cfg.index.backend, &profiles, args.skip_index).await?;

    if let Some(text) = args.text {
        let limit = args.top_k.unwrap_or(cfg.semantic.top_k);
        let hits = matcher
            .search_text(&text, args.kind.map(OwnerKind::from), limit)
            .await?;
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    let sources: Vec<Profile> = match &args.target {
        Some(id) => profiles.into_iter().filter(|p| p.id() == id.trim()).collect(),
        None => profiles,
    };
    if let (Some(id), true) = (&args.target, sources.is_empty()) {
        anyhow::bail!("no profile with id `{id}`");
    }

    let outcome = matcher.match_profiles(&sources, args.top_k).await?;
    for failure in &outcome.failures {
        warn!(kind = %failure.owner_kind, id = %failure.owner_id, error = %failure.error, "not_matched");
    }
    println!("{}", outcome.report.to_json_pretty()?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&cfg.log_level, cfg.log_json)?;

    match cli.command {
        Commands::Rules {
            profiles,
            group_by,
            target,
            min_score,
            diagnose,
        } => run_rules(&cfg, profiles, group_by, target, min_score, diagnose),
        Commands::Semantic {
            profiles,
            top_k,
            target,
            text,
            kind,
            skip_index,
            provision,
        } => {
            run_semantic(
                &cfg,
                SemanticArgs {
                    profiles,
                    top_k,
                    target,
                    text,
                    kind,
                    skip_index,
                    provision,
                },
            )
            .await
        }
    }
}
