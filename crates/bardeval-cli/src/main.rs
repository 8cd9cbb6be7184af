//! bardeval - base vs fine-tuned model evaluation
//!
//! ## Commands
//!
//! - `eval`: register both models and the judge checks, run both
//!   evaluations and print links to the hosted reports
//! - `corpus split`: cut the Shakespeare corpus into training chunks
//! - `corpus finetune`: pack chunks into a fine-tuning JSONL file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info, Level};

use bardeval_client::{ClientConfig, OkareoClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use bardeval_core::{
    load_seed_file, BuildId, EvalFlow, EvalPlatform, FlowConfig, FlowOutcome, Preset,
    PROJECT_NAME,
};
use bardeval_corpus::{build_jsonl, write_split, CorpusKind, SplitInput};

#[derive(Parser)]
#[command(name = "bardeval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate a base model against its fine-tuned variant", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register models and checks, run both evaluations, print report links
    Eval(EvalArgs),

    /// Training corpus preparation
    Corpus {
        #[command(subcommand)]
        action: CorpusAction,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PresetArg {
    /// Ten seeds, judge prompts from files, failures logged
    Local,
    /// Five seeds, few-shot judge prompts, failures fail the CI job
    Ci,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Local => Preset::Local,
            PresetArg::Ci => Preset::Ci,
        }
    }
}

#[derive(Args)]
struct EvalArgs {
    /// Flow preset (default: ci under GitHub Actions, local otherwise)
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Project to register everything under
    #[arg(long, default_value = PROJECT_NAME)]
    project: String,

    /// Directory holding archaic.txt and poetic.txt (local preset)
    #[arg(long, default_value = "prompts")]
    prompts_dir: PathBuf,

    /// JSON file of seed data overriding the preset's seeds
    #[arg(long)]
    seeds: Option<PathBuf>,

    /// Build id prefix (default: preset name)
    #[arg(long)]
    build_prefix: Option<String>,

    /// Run both evaluations concurrently
    #[arg(long)]
    parallel_runs: bool,

    /// Fail when any custom check cannot be registered
    #[arg(long)]
    strict_checks: bool,

    /// Evaluation platform API key
    #[arg(long, env = "OKAREO_API_KEY", hide_env_values = true)]
    okareo_api_key: Option<String>,

    /// Model provider API key forwarded with each run
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Evaluation platform API root
    #[arg(long, env = "OKAREO_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Write the full flow outcome as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum CorpusAction {
    /// Split the corpus into chunk files
    Split {
        /// Sonnets text
        #[arg(long, default_value = "sonnets.txt")]
        sonnets: PathBuf,

        /// Plays text
        #[arg(long, default_value = "plays.txt")]
        plays: PathBuf,

        /// Other verse text
        #[arg(long, default_value = "verse.txt")]
        verse: PathBuf,

        /// Output directory (recreated on every run)
        #[arg(short, long, default_value = "shakespeare_split")]
        out: PathBuf,
    },

    /// Build the fine-tuning JSONL file from chunk files
    Finetune {
        /// Directory of chunk files
        #[arg(short, long, default_value = "shakespeare_split")]
        input: PathBuf,

        /// JSONL output path
        #[arg(short, long, default_value = "output.jsonl")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    bardeval_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Eval(args) => {
            let github_actions = std::env::var("GITHUB_ACTIONS").ok();
            let preset = resolve_preset(args.preset, github_actions.as_deref());
            let mode = preset.failure_mode();
            if let Err(e) = cmd_eval(&args, preset).await {
                let reason = format!("{:#}", e);
                error!("{}", reason);
                println!("{}", mode.failure_line(&reason));
                let code = mode.exit_code();
                if code != 0 {
                    std::process::exit(code);
                }
            }
            Ok(())
        }
        Commands::Corpus { action } => match action {
            CorpusAction::Split {
                sonnets,
                plays,
                verse,
                out,
            } => cmd_corpus_split(&sonnets, &plays, &verse, &out),
            CorpusAction::Finetune { input, output } => cmd_corpus_finetune(&input, &output),
        },
    }
}

fn resolve_preset(arg: Option<PresetArg>, github_actions: Option<&str>) -> Preset {
    match (arg, github_actions) {
        (Some(arg), _) => arg.into(),
        (None, Some("true")) => Preset::Ci,
        (None, _) => Preset::Local,
    }
}

/// Run the evaluation flow against the hosted platform
async fn cmd_eval(args: &EvalArgs, preset: Preset) -> Result<()> {
    let okareo_key =
        non_empty(args.okareo_api_key.as_deref()).context("OKAREO_API_KEY is not set")?;
    let openai_key =
        non_empty(args.openai_api_key.as_deref()).context("OPENAI_API_KEY is not set")?;

    let client = OkareoClient::new(
        ClientConfig::new(&args.base_url, okareo_key).with_timeout(args.timeout_secs),
    )
    .context("Failed to construct platform client")?;

    let config = build_flow_config(args, preset, openai_key)?;
    let outcome = run_flow(&client, &config).await?;

    print_outcome(&outcome);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write outcome to {:?}", path))?;
        info!("Wrote flow outcome to {:?}", path);
    }

    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn build_flow_config(args: &EvalArgs, preset: Preset, model_api_key: &str) -> Result<FlowConfig> {
    let seeds = match &args.seeds {
        Some(path) => load_seed_file(path)?,
        None => preset.seed_data(),
    };
    let checks = preset
        .custom_checks(&args.prompts_dir)
        .context("Failed to load judge prompts")?;
    let prefix = args
        .build_prefix
        .as_deref()
        .unwrap_or_else(|| preset.build_prefix());

    let mut config = FlowConfig::new(BuildId::new(prefix), seeds, checks, model_api_key);
    config.project_name = args.project.clone();
    config.parallel_runs = args.parallel_runs;
    config.strict_checks = args.strict_checks;
    Ok(config)
}

async fn run_flow(platform: &dyn EvalPlatform, config: &FlowConfig) -> Result<FlowOutcome> {
    info!(
        "Evaluating {} vs {} on {} seed(s), build {}",
        config.base_model.name,
        config.fine_tuned_model.name,
        config.seed_data.len(),
        config.build_id
    );
    Ok(EvalFlow::new(platform).run(config).await?)
}

fn print_outcome(outcome: &FlowOutcome) {
    println!(
        "Scenario set: {} ({})",
        outcome.scenario.name, outcome.scenario.scenario_id
    );
    if !outcome.registration.is_complete() {
        println!(
            "Checks not registered: {}",
            outcome.registration.failed_names().join(", ")
        );
    }
    for eval in [&outcome.base, &outcome.fine_tuned] {
        println!("{}", eval.summary.render(&eval.label));
    }
}

/// Split the corpus into chunk files
fn cmd_corpus_split(sonnets: &Path, plays: &Path, verse: &Path, out: &Path) -> Result<()> {
    let summary = write_split(
        out,
        &[
            SplitInput::new(CorpusKind::Sonnets, sonnets),
            SplitInput::new(CorpusKind::Plays, plays),
            SplitInput::new(CorpusKind::Verse, verse),
        ],
    )
    .context("Failed to split corpus")?;

    for (kind, count) in &summary.counts {
        println!("  {:?}: {} chunk(s)", kind, count);
    }
    println!("Wrote {} chunk(s) to {:?}", summary.total(), summary.out_dir);
    Ok(())
}

/// Build the fine-tuning JSONL file
fn cmd_corpus_finetune(input: &Path, output: &Path) -> Result<()> {
    let file = build_jsonl(input, output).context("Failed to build fine-tune file")?;
    println!("JSONL file has been written: {:?}", file.path);
    println!("  entries: {}", file.entries);
    println!("  sha256:  {}", file.sha256);
    Ok(())
}
