use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use weft::{
    detect_conflicts, detect_cross_document_conflicts, get_conflicts, load_document,
    what_does_this_block, what_must_be_true, ConstraintGraph, ExecutionPlan, GraphBuilder,
    GraphCache, RequirementsDocument, Strategy, WeftConfig,
};

/// Environment variable holding the log filter
const LOG_ENV: &str = "WEFT_LOG";

#[derive(Parser)]
#[command(name = "weft")]
#[command(about = "Constraint graphs and wave plans for requirements documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./weft.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the constraint graph and print it as JSON
    Graph {
        /// Requirements document (.yaml, .json or .md)
        document: PathBuf,
    },

    /// Generate a wave-based execution plan
    Plan {
        document: PathBuf,

        /// forward, backward or hybrid (defaults to the config value)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Print the graph annotated with wave numbers alongside the plan
        #[arg(long)]
        annotate: bool,
    },

    /// Mark nodes satisfied and report what became unblocked
    Satisfy {
        document: PathBuf,

        /// Node IDs to mark satisfied
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Ask the graph a question about one node
    Query {
        #[command(subcommand)]
        query: QueryCommands,
    },

    /// Scan constraints for suspected conflicts (advisory)
    ///
    /// With one document the scan is within that document. With several,
    /// only pairs that span two documents are compared.
    Conflicts {
        #[arg(required = true)]
        documents: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum QueryCommands {
    /// Everything the node transitively depends on
    MustBeTrue { document: PathBuf, id: String },
    /// Everything that transitively depends on the node
    Blocks { document: PathBuf, id: String },
    /// Direct conflicts of the node
    Conflicts { document: PathBuf, id: String },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let config = WeftConfig::load(cli.config.as_deref(), &cwd).context("Failed to load config")?;

    match cli.command {
        Commands::Graph { document } => graph(&config, &document),
        Commands::Plan {
            document,
            strategy,
            annotate,
        } => plan(
            &config,
            &document,
            strategy.unwrap_or(config.default_strategy),
            annotate,
        ),
        Commands::Satisfy { document, ids } => satisfy(&config, &document, &ids),
        Commands::Query { query } => run_query(&config, query),
        Commands::Conflicts { documents } => conflicts(&documents),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> Result<RequirementsDocument> {
    load_document(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn graph(config: &WeftConfig, document: &Path) -> Result<()> {
    let doc = load(document)?;
    let graph = GraphBuilder::from_config(config).build(&doc);
    print_json(&graph)
}

fn plan(config: &WeftConfig, document: &Path, strategy: Strategy, annotate: bool) -> Result<()> {
    let doc = load(document)?;
    let mut cache = GraphCache::with_builder(GraphBuilder::from_config(config));
    let plan = cache.plan(&doc, strategy).clone();

    if !annotate {
        return print_json(&plan);
    }

    let mut graph = cache.graph(&doc).clone();
    plan.annotate(&mut graph);

    #[derive(Serialize)]
    struct Annotated<'a> {
        plan: &'a ExecutionPlan,
        graph: &'a ConstraintGraph,
    }
    print_json(&Annotated {
        plan: &plan,
        graph: &graph,
    })
}

fn satisfy(config: &WeftConfig, document: &Path, ids: &[String]) -> Result<()> {
    let doc = load(document)?;
    let mut cache = GraphCache::with_builder(GraphBuilder::from_config(config));
    cache.graph(&doc);

    let delta = cache
        .mark_many_satisfied(&doc.feature, ids)
        .context("Failed to mark nodes satisfied")?;
    print_json(&delta)
}

type Answer = fn(&ConstraintGraph, &str) -> Vec<String>;

fn run_query(config: &WeftConfig, query: QueryCommands) -> Result<()> {
    let (document, id, answer) = match query {
        QueryCommands::MustBeTrue { document, id } => (document, id, what_must_be_true as Answer),
        QueryCommands::Blocks { document, id } => (document, id, what_does_this_block as Answer),
        QueryCommands::Conflicts { document, id } => (document, id, get_conflicts as Answer),
    };

    let doc = load(&document)?;
    let graph = GraphBuilder::from_config(config).build(&doc);
    if !graph.contains(&id) {
        bail!("Node '{id}' not found in {}", document.display());
    }
    print_json(&answer(&graph, &id))
}

fn conflicts(documents: &[PathBuf]) -> Result<()> {
    let docs = documents
        .iter()
        .map(|path| load(path))
        .collect::<Result<Vec<_>>>()?;

    match docs.as_slice() {
        [single] => print_json(&detect_conflicts(single)),
        _ => print_json(&detect_cross_document_conflicts(&docs)),
    }
}
