use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use intentrank_core::config::{resolve_with_base, Config, EngineSettings};
use intentrank_core::types::{BackoffPlan, RankRequest};
use intentrank_hybrid::{ActionHint, IntentLocator, IntentQueries};

#[derive(Parser)]
#[command(name = "intentrank", about = "Rank page elements and knowledge chunks by intent", version)]
struct Cli {
    /// Directory that relative `--html` and `--doc` paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the elements of a markup page
    Locate(LocateArgs),
    /// Rank the chunks of a knowledge document
    Knowledge(KnowledgeArgs),
}

#[derive(Args)]
struct LocateArgs {
    /// Markup file, or inline markup
    #[arg(long)]
    html: String,

    /// What the element is for, in plain words
    #[arg(long)]
    intent: String,

    /// Possibly stale CSS selector or `//` path query
    #[arg(long, default_value = "")]
    locator: String,

    /// Defaults to the action hint guessed from the intent
    #[arg(long)]
    top_k: Option<usize>,

    #[arg(long)]
    min_score: Option<f64>,

    /// Relax the minimum score until something matches
    #[arg(long)]
    backoff: bool,

    #[arg(long)]
    start: Option<f64>,

    #[arg(long)]
    floor: Option<f64>,

    #[arg(long)]
    step: Option<f64>,

    /// Print outer markup only instead of full records
    #[arg(long)]
    outer_only: bool,
}

#[derive(Args)]
struct KnowledgeArgs {
    /// Knowledge document (markdown)
    #[arg(long)]
    doc: String,

    #[arg(long)]
    intent: String,

    #[arg(long, value_enum, default_value_t = Section::All)]
    section: Section,

    #[arg(long)]
    top_k: Option<usize>,

    #[arg(long)]
    min_score: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Section {
    All,
    Schemas,
    Queries,
    Relationships,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Inline markup passes through; anything else is a path, expanded (`~`,
/// `$VAR`) and resolved against `base`.
fn html_argument(base: &Path, html: &str) -> String {
    if html.contains('<') {
        html.to_string()
    } else {
        resolve_with_base(base, html).to_string_lossy().into_owned()
    }
}

fn locate(settings: &EngineSettings, base: &Path, args: LocateArgs) -> anyhow::Result<serde_json::Value> {
    let LocateArgs { html, intent, locator, top_k, min_score, backoff, start, floor, step, outer_only } = args;
    let top_k = top_k.unwrap_or_else(|| {
        let hint = ActionHint::guess(&intent);
        let top_k = match hint {
            ActionHint::Default => settings.ranking.top_k,
            _ => hint.top_k(),
        };
        info!(action = ?hint, top_k, "top_k from action hint");
        top_k
    });
    if top_k == 0 {
        return Ok(serde_json::Value::Array(Vec::new()));
    }
    let request = RankRequest::new(intent.as_str())
        .with_locator(locator)
        .with_top_k(top_k)
        .with_min_score(min_score.unwrap_or(settings.ranking.min_score));
    let plan = BackoffPlan {
        start: start.unwrap_or(settings.backoff.start),
        floor: floor.unwrap_or(settings.backoff.floor),
        step: step.unwrap_or(settings.backoff.step),
    };
    let html = html_argument(base, &html);
    let engine = IntentLocator::new();

    let value = match (backoff, outer_only) {
        (false, false) => serde_json::to_value(engine.rank_elements(&html, &request)?)?,
        (false, true) => serde_json::to_value(engine.find_outer_html(&html, &request)?)?,
        (true, false) => serde_json::to_value(engine.rank_elements_with_backoff(&html, &request, &plan)?)?,
        (true, true) => serde_json::to_value(engine.find_outer_html_with_backoff(&html, &request, &plan)?)?,
    };
    Ok(value)
}

fn knowledge(settings: &EngineSettings, base: &Path, args: KnowledgeArgs) -> anyhow::Result<serde_json::Value> {
    let KnowledgeArgs { doc, intent, section, top_k, min_score } = args;
    let path = resolve_with_base(base, &doc);
    let content = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let request = RankRequest::new(intent)
        .with_top_k(top_k.unwrap_or(settings.knowledge.top_k_each))
        .with_min_score(min_score.unwrap_or(settings.knowledge.min_score));
    let engine = IntentQueries::new();

    let value = match section {
        Section::All => serde_json::to_value(engine.rank_all(&content, &request))?,
        Section::Schemas => serde_json::to_value(engine.rank_schemas(&content, &request))?,
        Section::Queries => serde_json::to_value(engine.rank_queries(&content, &request))?,
        Section::Relationships => serde_json::to_value(engine.rank_relationships(&content, &request))?,
    };
    Ok(value)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().context("loading configuration")?;
    let settings = config.settings()?;
    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Locate(args) => locate(&settings, &cli.base_dir, args)?,
        Commands::Knowledge(args) => knowledge(&settings, &cli.base_dir, args)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_arguments_pass_through_and_paths_resolve() {
        let base = Path::new("/srv/pages");
        assert_eq!(html_argument(base, "<p>hi</p>"), "<p>hi</p>");
        assert_eq!(html_argument(base, "login.html"), "/srv/pages/login.html");
        assert_eq!(html_argument(base, "/tmp/login.html"), "/tmp/login.html");
    }

    #[test]
    fn base_dir_is_global() {
        let cli = Cli::parse_from(["intentrank", "knowledge", "--doc", "kb.md", "--intent", "crew", "--base-dir", "/data"]);
        assert_eq!(cli.base_dir, PathBuf::from("/data"));
        assert!(matches!(cli.command, Commands::Knowledge(_)));
    }
}
