//! Command implementations for the `peter` binary.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use peter_core::{PaperAnnotated, PaperWithClassifiedContexts, QueryResult};
use peter_embeddings::load_encoder;
use peter_graph::{Graph, CITATION_TOP_K, SEMANTIC_TOP_K};

/// A queried paper together with its related papers.
#[derive(Debug, Serialize, Deserialize)]
struct PaperResult {
    paper: PaperAnnotated,
    results: QueryResult,
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {what} from {}", path.display()))
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

fn progress(len: u64, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}").expect("valid template"),
    );
    bar.set_message(message);
    bar
}

/// Build the full graph and persist it to `output_dir`.
pub fn build(ann: &Path, context: &Path, output_dir: &Path, model: &str) -> Result<()> {
    debug!("Loading annotated papers");
    let annotated: Vec<PaperAnnotated> = load_json(ann, "annotated papers")?;
    debug!("Loading context papers");
    let contexts: Vec<PaperWithClassifiedContexts> = load_json(context, "context papers")?;

    debug!(%model, "Loading encoder");
    let encoder = load_encoder(model)?;

    info!(
        annotated = annotated.len(),
        contexts = contexts.len(),
        "Building graph"
    );
    let started = Instant::now();
    Graph::build(encoder, &annotated, &contexts, output_dir)?;
    info!(elapsed = ?started.elapsed(), dir = %output_dir.display(), "Graph built");
    Ok(())
}

/// Demonstrate the graph by querying it and printing the four buckets.
pub fn query(ann: &Path, graph_dir: &Path, titles: &[String], num_papers: usize) -> Result<()> {
    let annotated: Vec<PaperAnnotated> = load_json(ann, "annotated papers")?;

    let papers: Vec<&PaperAnnotated> = if titles.is_empty() {
        annotated.iter().take(num_papers).collect()
    } else {
        titles
            .iter()
            .map(|title| {
                annotated
                    .iter()
                    .find(|p| p.title.eq_ignore_ascii_case(title))
                    .with_context(|| format!("paper not found in corpus: {title}"))
            })
            .collect::<Result<_>>()?
    };
    if papers.is_empty() {
        bail!("no papers to query");
    }

    debug!("Loading graph");
    let graph = Graph::load(graph_dir)?;

    for paper in papers {
        let started = Instant::now();
        let result = graph.query_all(
            &paper.id(),
            &paper.background,
            &paper.target,
            SEMANTIC_TOP_K,
            CITATION_TOP_K,
        )?;
        debug!(elapsed = ?started.elapsed(), "Graph query");

        println!("{}\n", paper.title.bold());
        for (label, bucket) in [
            (">> semantic_positive", &result.semantic_positive),
            (">> semantic_negative", &result.semantic_negative),
            (">> citations_positive", &result.citations_positive),
            (">> citations_negative", &result.citations_negative),
        ] {
            println!("{} ({})", label.cyan(), bucket.len());
            for related in bucket {
                println!("- {} [{:.3}]", related.title, related.score);
            }
            println!();
        }
    }
    Ok(())
}

/// Query the graph for a corpus of papers with an exact number of related
/// papers per bucket; saves both the papers and their results.
pub fn top_k(
    ann: &Path,
    graph_dir: &Path,
    output: &Path,
    num_papers: Option<usize>,
    num_citations: usize,
    num_semantic: usize,
) -> Result<()> {
    let annotated: Vec<PaperAnnotated> = load_json(ann, "annotated papers")?;
    let papers = truncated(annotated, num_papers);

    debug!("Loading graph");
    let graph = Graph::load(graph_dir)?;

    let bar = progress(papers.len() as u64, "Querying papers");
    let results = papers
        .into_iter()
        .map(|paper| {
            bar.inc(1);
            let results = graph.query_all(
                &paper.id(),
                &paper.background,
                &paper.target,
                num_semantic,
                num_citations,
            )?;
            Ok(PaperResult { paper, results })
        })
        .collect::<Result<Vec<_>>>()?;
    bar.finish();

    info!(results = results.len(), output = %output.display(), "Saving results");
    save_json(output, &results)
}

/// Query the graph for a corpus of papers with per-subgraph minimum
/// similarity thresholds; saves both the papers and their results.
pub fn query_threshold(
    ann: &Path,
    graph_dir: &Path,
    output: &Path,
    num_papers: Option<usize>,
    semantic_threshold: f32,
    citation_threshold: f32,
    retrieved_k: usize,
) -> Result<()> {
    let annotated: Vec<PaperAnnotated> = load_json(ann, "annotated papers")?;
    let papers = truncated(annotated, num_papers);

    debug!("Loading graph");
    let graph = Graph::load(graph_dir)?;

    let bar = progress(papers.len() as u64, "Querying papers");
    let results = papers
        .into_iter()
        .map(|paper| {
            bar.inc(1);
            let results = graph.query_threshold(
                &paper.id(),
                &paper.background,
                &paper.target,
                semantic_threshold,
                citation_threshold,
                retrieved_k,
            )?;
            Ok(PaperResult { paper, results })
        })
        .collect::<Result<Vec<_>>>()?;
    bar.finish();

    info!(results = results.len(), output = %output.display(), "Saving results");
    save_json(output, &results)
}

fn truncated(mut papers: Vec<PaperAnnotated>, num_papers: Option<usize>) -> Vec<PaperAnnotated> {
    if let Some(n) = num_papers {
        papers.truncate(n);
    }
    papers
}

#[cfg(test)]
mod tests {
    use super::*;
    use peter_core::{ClassifiedContext, ClassifiedReference, ContextPolarity};

    fn write_corpora(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let annotated = vec![
            PaperAnnotated {
                title: "paper one".to_string(),
                abstract_: "first".to_string(),
                background: "shared goal".to_string(),
                target: "method one".to_string(),
            },
            PaperAnnotated {
                title: "paper two".to_string(),
                abstract_: "second".to_string(),
                background: "shared goal again".to_string(),
                target: "method two".to_string(),
            },
        ];
        let contexts = vec![PaperWithClassifiedContexts {
            title: "paper one".to_string(),
            abstract_: "first".to_string(),
            references: vec![ClassifiedReference {
                title: "paper two".to_string(),
                abstract_: "second".to_string(),
                contexts: vec![ClassifiedContext {
                    text: "builds on".to_string(),
                    prediction: ContextPolarity::Positive,
                    gold: None,
                }],
            }],
        }];

        let ann_path = dir.join("ann.json");
        let ctx_path = dir.join("context.json");
        save_json(&ann_path, &annotated).unwrap();
        save_json(&ctx_path, &contexts).unwrap();
        (ann_path, ctx_path)
    }

    #[test]
    fn build_then_top_k_writes_results() {
        let dir = tempfile::tempdir().unwrap();
        let (ann, ctx) = write_corpora(dir.path());
        let graph_dir = dir.path().join("graph");

        build(&ann, &ctx, &graph_dir, "hash-v1-64").unwrap();

        let output = dir.path().join("results.json");
        top_k(&ann, &graph_dir, &output, Some(1), 2, 2).unwrap();

        let results: Vec<PaperResult> =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].paper.title, "paper one");
        assert_eq!(results[0].results.citations_positive.len(), 1);
    }

    #[test]
    fn build_rejects_unknown_models() {
        let dir = tempfile::tempdir().unwrap();
        let (ann, ctx) = write_corpora(dir.path());
        let err = build(&ann, &ctx, &dir.path().join("graph"), "no-such-model").unwrap_err();
        assert!(err.to_string().contains("no-such-model"));
    }
}
