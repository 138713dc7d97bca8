use anyhow::{Context, Result};
use clap::Parser;
use qfilter::dataset;
use qfilter::{Filter, FilterNode, QueryOptions};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

const ENV_LOG: &str = "QFILTER_LOG";

#[derive(Parser)]
#[command(
    name = "qfilter",
    about = "Filter records with a filter tree or compile it to a Gridify query"
)]
struct Cli {
    #[arg(long, env = "QFILTER_TREE", help = "YAML/JSON file with the filter tree")]
    tree: Option<PathBuf>,

    #[arg(long, help = "YAML/JSON file with the records to filter")]
    data: Option<PathBuf>,

    #[arg(long, help = "Read records from stdin")]
    stdin: bool,

    #[arg(long, help = "Print the Gridify query envelope instead of filtering")]
    remote: bool,

    #[arg(long, help = "Print the compiled predicate expression")]
    print_predicate: bool,

    #[arg(long, default_value = "", help = "Sort field for the remote query")]
    order_by: String,

    #[arg(long, default_value_t = 0, help = "1-based page for the remote query")]
    page: u32,

    #[arg(long, default_value_t = 0, help = "Page length for the remote query")]
    page_size: u32,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let filter = std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let Some(tree_path) = cli.tree else {
        anyhow::bail!("No filter tree specified. Use --tree or set QFILTER_TREE");
    };

    let nodes: Vec<FilterNode> = dataset::load_document(&tree_path)
        .with_context(|| format!("Failed to load filter tree {}", tree_path.display()))?;

    let filter = Filter::from_nodes(nodes).with_options(QueryOptions {
        order_by: cli.order_by,
        page: cli.page,
        page_size: cli.page_size,
    });

    if cli.print_predicate {
        println!("{}", filter.predicate());
        if !cli.remote && cli.data.is_none() && !cli.stdin {
            return Ok(ExitCode::from(0));
        }
    }

    if cli.remote {
        return run_remote_mode(&filter);
    }

    run_filter_mode(&filter, cli.data, cli.stdin)
}

fn run_remote_mode(filter: &Filter) -> Result<ExitCode> {
    let envelope = filter.to_remote_query();
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    println!("{}", envelope.to_query_string()?);
    Ok(ExitCode::from(0))
}

fn run_filter_mode(filter: &Filter, data: Option<PathBuf>, stdin: bool) -> Result<ExitCode> {
    let records = match (data, stdin) {
        (Some(path), _) => dataset::load_records(&path)
            .with_context(|| format!("Failed to load records from {}", path.display()))?,
        (None, true) => dataset::read_records(io::stdin().lock())?,
        (None, false) => anyhow::bail!("No records provided. Use --data or --stdin"),
    };

    let matched = filter.filter(&records[..]);
    if matched.is_empty() {
        return Ok(ExitCode::from(1));
    }

    print!("{}", serde_yaml::to_string(&matched)?);
    Ok(ExitCode::from(0))
}
