//! CLI entry point for ideamap.
//!
//! Provides commands for clustering ideas files, printing cluster
//! summaries, and mapping centroids back to their nearest ideas.

use clap::{
    ArgAction, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use ideamap::display::{THEME, Tone, create_cluster_table, create_neighbors_table};
use ideamap::io::{ExitCode, IdeaSet, JsonResponse, OutputFormat, ResponseMeta, load_ideas_file};
use ideamap::retrieve::CentroidNeighbors;
use ideamap::{
    ClusteringEngine, ClusteringOutcome, ConvergenceStatus, FailurePolicy, IdeaMapError,
    IdeaMapResult, MemoryIdeaIndex, RetrievalReport, Settings, nearest_per_centroid_concurrent,
    nearest_per_centroid_with, render_summaries, summarize,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Serialize)]
struct ClusterOutput<'a> {
    k: usize,
    iterations: usize,
    status: ConvergenceStatus,
    inertia: Option<f64>,
    clusters: &'a ideamap::ClusterAssignment,
    summaries: BTreeMap<usize, String>,
}

#[derive(Debug, Serialize)]
struct NeighborsOutput<'a> {
    k: usize,
    limit: usize,
    groups: &'a [CentroidNeighbors],
    skipped_centroids: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct IndexOutput {
    ideas: usize,
    dimension: usize,
    path: PathBuf,
}

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Semantic clustering of extracted ideas
#[derive(Parser)]
#[command(
    name = "ideamap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Cluster extracted ideas and find the ideas nearest each cluster",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    #[command(about = "Set up .ideamap directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    #[command(about = "Display active settings")]
    Config,

    /// Partition the ideas in a file and print one block per cluster
    #[command(
        after_help = "Examples:\n  ideamap cluster ideas.json -k 5\n  ideamap cluster ideas.json --clusters 5 --max-iterations 50\n  ideamap cluster ideas.json --seed 42 --json | jq '.data.summaries'"
    )]
    Cluster {
        /// JSON ideas file
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Cluster, then list the indexed ideas nearest each centroid
    #[command(
        after_help = "Examples:\n  ideamap neighbors ideas.json -k 4 --limit 3\n  ideamap neighbors ideas.json --index .ideamap/index.json --skip-failures"
    )]
    Neighbors {
        /// JSON ideas file
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        /// Neighbours per centroid (overrides config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Saved index to query; defaults to indexing the ideas file itself
        #[arg(long)]
        index: Option<PathBuf>,

        /// Keep other centroids' results when one lookup fails
        #[arg(long)]
        skip_failures: bool,

        /// Query centroids concurrently
        #[arg(long)]
        parallel: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Build a similarity index from an ideas file
    Index {
        /// JSON ideas file
        file: PathBuf,

        /// Where to write the index
        output: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Clustering overrides shared by `cluster` and `neighbors`.
#[derive(clap::Args)]
struct RunArgs {
    /// Number of clusters (overrides config)
    #[arg(short = 'k', long = "clusters")]
    k: Option<usize>,

    /// Seed for reproducible clusters (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Lloyd iteration cap (overrides config)
    #[arg(long)]
    max_iterations: Option<usize>,
}

impl RunArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(k) = self.k {
            settings.clustering.k = k;
        }
        if let Some(seed) = self.seed {
            settings.clustering.seed = Some(seed);
        }
        if let Some(max_iterations) = self.max_iterations {
            settings.clustering.max_iterations = max_iterations;
        }
    }
}

fn init_logging(verbose: u8, debug: bool) {
    let filter = match verbose {
        0 if debug => EnvFilter::new("debug"),
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>) -> IdeaMapResult<Settings> {
    let loaded = match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    loaded.map_err(|e| IdeaMapError::ConfigError {
        reason: e.to_string(),
    })
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let json = match &cli.command {
        Commands::Cluster { json, .. }
        | Commands::Neighbors { json, .. }
        | Commands::Index { json, .. } => *json,
        _ => false,
    };
    let format = OutputFormat::from_json_flag(json);

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(cli.verbose, false);
            return report_error(&e, format);
        }
    };
    init_logging(cli.verbose, settings.debug);

    match run(cli, settings, format) {
        Ok(code) => code.into(),
        Err(e) => report_error(&e, format),
    }
}

fn report_error(error: &IdeaMapError, format: OutputFormat) -> std::process::ExitCode {
    if format.is_json() {
        let response = JsonResponse::from_error(error).with_meta(ResponseMeta::now(None));
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize error response: {e}"),
        }
    } else {
        eprintln!("{}", THEME.status(Tone::Error, &error.to_string()));
        for suggestion in error.recovery_suggestions() {
            eprintln!("  {}", THEME.apply(&THEME.dim, suggestion));
        }
    }
    ExitCode::from_error(error).into()
}

fn run(cli: Cli, mut settings: Settings, format: OutputFormat) -> IdeaMapResult<ExitCode> {
    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force)?;
            println!(
                "{}",
                THEME.status(Tone::Success, &format!(
                    "Created configuration file at: {}",
                    path.display()
                ))
            );
            println!("Edit this file to customize your settings.");
            Ok(ExitCode::Success)
        }

        Commands::Config => {
            let toml_str =
                toml::to_string_pretty(&settings).map_err(|e| IdeaMapError::ConfigError {
                    reason: format!("Failed to render settings: {e}"),
                })?;
            println!("{}", THEME.apply(&THEME.header, "Current Configuration:"));
            println!("{}", "=".repeat(50));
            println!("{toml_str}");
            Ok(ExitCode::Success)
        }

        Commands::Cluster { file, run, .. } => {
            run.apply(&mut settings);
            let started = Instant::now();
            let set = load_ideas_file(&file)?;
            let outcome = cluster_set(&settings, &set)?;
            print_clusters(&outcome, format, started)?;
            Ok(ExitCode::Success)
        }

        Commands::Neighbors {
            file,
            run,
            limit,
            index,
            skip_failures,
            parallel,
            ..
        } => {
            run.apply(&mut settings);
            if let Some(limit) = limit {
                settings.retrieval.limit = limit;
            }
            settings.retrieval.skip_failures |= skip_failures;
            settings.retrieval.parallel |= parallel;

            let started = Instant::now();
            let set = load_ideas_file(&file)?;
            let outcome = cluster_set(&settings, &set)?;

            let index = match index {
                Some(path) => MemoryIdeaIndex::load(&path)?,
                None => MemoryIdeaIndex::from_ideas(&set.ideas, &set.vectors)?,
            };

            let policy = if settings.retrieval.skip_failures {
                FailurePolicy::Skip
            } else {
                FailurePolicy::Abort
            };
            let report = if settings.retrieval.parallel {
                nearest_per_centroid_concurrent(
                    &outcome.centroids,
                    &index,
                    settings.retrieval.limit,
                    policy,
                )?
            } else {
                nearest_per_centroid_with(
                    &outcome.centroids,
                    &index,
                    settings.retrieval.limit,
                    policy,
                )?
            };

            print_neighbors(&report, outcome.k(), settings.retrieval.limit, format, started)
        }

        Commands::Index { file, output, .. } => {
            let set = load_ideas_file(&file)?;
            let index = MemoryIdeaIndex::from_ideas(&set.ideas, &set.vectors)?;
            index.save(&output)?;
            info!("Indexed {} ideas into {}", index.len(), output.display());

            let summary = IndexOutput {
                ideas: index.len(),
                dimension: index.dimension().get(),
                path: output,
            };
            if format.is_json() {
                print_json(&JsonResponse::success(summary))?;
            } else {
                println!(
                    "{}",
                    THEME.status(Tone::Success, &format!(
                        "Indexed {} ideas ({} dimensions) into {}",
                        summary.ideas,
                        summary.dimension,
                        THEME.apply(&THEME.path, summary.path.display())
                    ))
                );
            }
            Ok(ExitCode::Success)
        }
    }
}

fn cluster_set(settings: &Settings, set: &IdeaSet) -> IdeaMapResult<ClusteringOutcome> {
    settings.validate()?;
    configure_thread_pool(settings.clustering.parallel_threads);

    let mut engine = ClusteringEngine::new(settings.clustering.to_kmeans_config());
    let outcome = engine.cluster(&set.ideas, &set.vectors, settings.clustering.k)?;

    if !outcome.converged() {
        warn!(
            "Stopped after {} iterations without converging",
            outcome.iterations
        );
    }
    Ok(outcome)
}

fn configure_thread_pool(threads: usize) {
    // The global pool can only be built once per process
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        debug!("Rayon pool already configured: {e}");
    }
}

fn print_clusters(
    outcome: &ClusteringOutcome,
    format: OutputFormat,
    started: Instant,
) -> IdeaMapResult<()> {
    let summaries = summarize(&outcome.assignment);

    if format.is_json() {
        let data = ClusterOutput {
            k: outcome.k(),
            iterations: outcome.iterations,
            status: outcome.status,
            inertia: outcome.inertia(),
            clusters: &outcome.assignment,
            summaries,
        };
        let elapsed = started.elapsed().as_millis() as u64;
        return print_json(&JsonResponse::success(data).with_meta(ResponseMeta::now(Some(elapsed))));
    }

    println!("{}", render_summaries(&summaries));
    println!();
    println!("{}", create_cluster_table(outcome));

    let (tone, verdict) = match outcome.status {
        ConvergenceStatus::Converged => (Tone::Success, "Converged"),
        ConvergenceStatus::IterationCapReached => (Tone::Warning, "Iteration cap reached"),
    };
    println!(
        "{}",
        THEME.status(tone, &format!("{verdict} after {} iterations", outcome.iterations))
    );
    Ok(())
}

fn print_neighbors(
    report: &RetrievalReport,
    k: usize,
    limit: usize,
    format: OutputFormat,
    started: Instant,
) -> IdeaMapResult<ExitCode> {
    let code = ExitCode::from_result_count(report.total());

    if format.is_json() {
        let data = NeighborsOutput {
            k,
            limit,
            groups: &report.groups,
            skipped_centroids: report.failures.iter().map(|(index, _)| *index).collect(),
        };
        let elapsed = started.elapsed().as_millis() as u64;
        print_json(
            &JsonResponse::success(data)
                .with_exit_code(code)
                .with_meta(ResponseMeta::now(Some(elapsed))),
        )?;
        return Ok(code);
    }

    println!("{}", create_neighbors_table(report));
    if !report.is_complete() {
        println!(
            "{}",
            THEME.status(Tone::Warning, &format!(
                "{} of {k} centroid lookups failed and were skipped",
                report.failures.len()
            ))
        );
    }
    if report.total() == 0 {
        println!("{}", THEME.status(Tone::Warning, "No neighbours found"));
    }
    Ok(code)
}

fn print_json<T: Serialize>(value: &T) -> IdeaMapResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| IdeaMapError::General(format!("Failed to serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}
