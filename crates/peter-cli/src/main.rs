//! PETER CLI - construct and query polarised retrieval graphs.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Default encoder model when none is given on the command line.
const DEFAULT_MODEL: &str = "hash-v1-256";

#[derive(Parser)]
#[command(name = "peter")]
#[command(author, version, about = "PETER - polarised retrieval graphs for paper novelty", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full graph from annotated and context corpora
    Build {
        /// JSON file with papers with extracted backgrounds and targets
        #[arg(long)]
        ann: PathBuf,

        /// JSON file with papers with classified citation contexts
        #[arg(long)]
        context: PathBuf,

        /// Directory where the graph files will be saved
        #[arg(long)]
        output_dir: PathBuf,

        /// Encoder model to use on the nodes
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
    },

    /// Demonstrate the graph by querying a few papers and printing buckets
    Query {
        /// JSON file with annotated papers to query with
        #[arg(long)]
        ann: PathBuf,

        /// Directory containing the graph files
        #[arg(long)]
        graph_dir: PathBuf,

        /// Titles of the papers to query; if absent, use the first papers
        #[arg(long)]
        title: Vec<String>,

        /// Number of papers to query when --title isn't given
        #[arg(short, long, default_value = "1")]
        num_papers: usize,
    },

    /// Query the graph for every paper with a fixed number of results
    TopK {
        /// JSON file with annotated papers to query with
        #[arg(long)]
        ann: PathBuf,

        /// Directory containing the graph files
        #[arg(long)]
        graph_dir: PathBuf,

        /// Output file for the query results
        #[arg(long)]
        output: PathBuf,

        /// Number of papers to query; defaults to all papers
        #[arg(short, long)]
        num_papers: Option<usize>,

        /// Number of positive and negative cited papers per query
        #[arg(long, default_value = "2")]
        num_citations: usize,

        /// Number of positive and negative semantic papers per query
        #[arg(long, default_value = "2")]
        num_semantic: usize,
    },

    /// Query the graph for every paper with a minimum similarity threshold
    QueryThreshold {
        /// JSON file with annotated papers to query with
        #[arg(long)]
        ann: PathBuf,

        /// Directory containing the graph files
        #[arg(long)]
        graph_dir: PathBuf,

        /// Output file for the query results
        #[arg(long)]
        output: PathBuf,

        /// Number of papers to query; defaults to all papers
        #[arg(short, long)]
        num_papers: Option<usize>,

        /// Minimum similarity threshold for cited papers
        #[arg(long, default_value = "0.8")]
        citation: f32,

        /// Minimum similarity threshold for semantic papers
        #[arg(long, default_value = "0.8")]
        semantic: f32,

        /// Semantic neighbours to retrieve before applying the threshold
        #[arg(long, default_value = "100")]
        retrieved_k: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Build {
            ann,
            context,
            output_dir,
            model,
        } => commands::build(&ann, &context, &output_dir, &model),
        Commands::Query {
            ann,
            graph_dir,
            title,
            num_papers,
        } => commands::query(&ann, &graph_dir, &title, num_papers),
        Commands::TopK {
            ann,
            graph_dir,
            output,
            num_papers,
            num_citations,
            num_semantic,
        } => commands::top_k(&ann, &graph_dir, &output, num_papers, num_citations, num_semantic),
        Commands::QueryThreshold {
            ann,
            graph_dir,
            output,
            num_papers,
            citation,
            semantic,
            retrieved_k,
        } => commands::query_threshold(
            &ann,
            &graph_dir,
            &output,
            num_papers,
            semantic,
            citation,
            retrieved_k,
        ),
    }
}
