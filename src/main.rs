//! paper-graph-import CLI: replay research-metadata dumps into a graph API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use paper_graph_import::config::ImportConfig;
use paper_graph_import::import::{ImportInputs, ImportReport, Importer, InputPaths};
use paper_graph_import::store::memory::NodeKind;
use paper_graph_import::store::{GraphStore, HttpStore, MemoryStore};

#[derive(Parser)]
#[command(name = "paper-graph-import", version, about = "Import research metadata dumps into a graph API")]
struct Cli {
    /// TOML config file. Flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the graph API, e.g. http://localhost:8080/api.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Build the graph in memory instead of calling the API.
    #[arg(long, global = true)]
    dry_run: bool,

    /// First number for `Res_<n>` result labels.
    #[arg(long, global = true)]
    result_seed: Option<u64>,

    /// Abort on the first failed record.
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import papers, and optionally their code links.
    Papers {
        /// Papers-with-abstracts JSON file.
        #[arg(long)]
        abstracts: PathBuf,

        /// Paper ↔ repository links JSON file.
        #[arg(long)]
        links: Option<PathBuf>,
    },

    /// Import evaluation tables (tasks, datasets, results).
    Evaluations {
        /// Evaluation-tables JSON file.
        #[arg(long)]
        file: PathBuf,
    },

    /// Import the research-field taxonomy.
    Fields {
        /// Taxonomy JSON file.
        #[arg(long)]
        file: PathBuf,
    },

    /// Run every pass whose input is given, in order.
    All {
        #[arg(long)]
        abstracts: Option<PathBuf>,
        #[arg(long)]
        links: Option<PathBuf>,
        #[arg(long)]
        evaluations: Option<PathBuf>,
        #[arg(long)]
        fields: Option<PathBuf>,
    },

    /// Write the effective configuration to a TOML file.
    InitConfig {
        /// Destination path.
        #[arg(long, default_value = "paper-graph-import.toml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = effective_config(&cli)?;

    let paths = match cli.command {
        Commands::Papers { abstracts, links } => InputPaths {
            abstracts: Some(abstracts),
            links,
            ..Default::default()
        },
        Commands::Evaluations { file } => InputPaths {
            evaluations: Some(file),
            ..Default::default()
        },
        Commands::Fields { file } => InputPaths {
            fields: Some(file),
            ..Default::default()
        },
        Commands::All {
            abstracts,
            links,
            evaluations,
            fields,
        } => InputPaths {
            abstracts,
            links,
            evaluations,
            fields,
        },
        Commands::InitConfig { path } => {
            config.save(&path)?;
            println!("Wrote {}", path.display());
            return Ok(());
        }
    };

    let inputs = ImportInputs::load(&paths)?;
    if inputs.is_empty() {
        return Err(miette::miette!(
            help = "Pass at least one of --abstracts, --links, --evaluations or --fields.",
            "nothing to import"
        ));
    }

    if cli.dry_run {
        tracing::info!("dry run: building the graph in memory");
        let (report, store) = run(MemoryStore::new(), &config, &inputs)?;
        print_report(&report);
        println!(
            "  dry run: {} resources, {} literals, {} predicates, {} statements",
            store.count(NodeKind::Resource),
            store.count(NodeKind::Literal),
            store.count(NodeKind::Predicate),
            store.statements().len()
        );
    } else {
        tracing::info!(base_url = %config.base_url, "importing into graph API");
        let store = HttpStore::new(&config.base_url, config.timeout());
        let (report, _store) = run(store, &config, &inputs)?;
        print_report(&report);
    }

    Ok(())
}

/// Config file (or defaults), with CLI flags applied on top.
fn effective_config(cli: &Cli) -> Result<ImportConfig> {
    let mut config = match &cli.config {
        Some(path) => ImportConfig::load(path)?,
        None => ImportConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(seed) = cli.result_seed {
        config.result_seed = seed;
    }
    if cli.fail_fast {
        config.fail_fast = true;
    }
    Ok(config)
}

fn run<S: GraphStore>(store: S, config: &ImportConfig, inputs: &ImportInputs) -> Result<(ImportReport, S)> {
    let mut importer = Importer::new(store, config);
    importer.run(inputs)?;
    Ok(importer.finish())
}

fn print_report(report: &ImportReport) {
    println!("Import finished:");
    println!("{report}");

    if report.failures.is_empty() {
        return;
    }
    const SHOWN: usize = 20;
    println!("\nFailures ({}):", report.failures.len());
    for failure in report.failures.iter().take(SHOWN) {
        println!(
            "  [{}] #{} {}: {}",
            failure.pass,
            failure.index,
            failure.label.as_deref().unwrap_or("<unlabeled>"),
            failure.message
        );
    }
    if report.failures.len() > SHOWN {
        println!("  ... and {} more", report.failures.len() - SHOWN);
    }
}
