//! gwcheck CLI
//!
//! Parse an official document into its structural node tree, or run the
//! full per-node format-compliance check against the remote model.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use gwcheck::ai::{CheckReport, DeepSeekClient, DocumentAnalyzer};
use gwcheck::config::CheckConfig;
use gwcheck::document::{parse_document, DocumentTree, HybridClassifier, RuleClassifier};

#[derive(Parser)]
#[command(name = "gwcheck")]
#[command(about = "Structure-aware format checker for Chinese official documents")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a document into its structural node tree
    Parse {
        /// Path to the .docx file
        file: PathBuf,

        /// Write the tree as JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print an indented outline instead of JSON
        #[arg(long)]
        outline: bool,

        /// Consult the remote model for classification
        #[arg(long)]
        ai: bool,

        /// DeepSeek API key (defaults to the DEEPSEEK_API_KEY variable)
        #[arg(long)]
        api_key: Option<String>,

        /// Configuration file (defaults to the user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check every node against the formatting standard
    Check {
        /// Path to the .docx file
        file: PathBuf,

        /// Write the report as JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also use the remote model for node classification
        #[arg(long)]
        ai_classify: bool,

        /// DeepSeek API key (defaults to the DEEPSEEK_API_KEY variable)
        #[arg(long)]
        api_key: Option<String>,

        /// File with custom format requirements text
        #[arg(long)]
        requirements: Option<PathBuf>,

        /// Configuration file (defaults to the user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "gwcheck=info"
                    .parse()
                    .expect("directive is compile-time constant"),
            ),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Parse {
            file,
            output,
            outline,
            ai,
            api_key,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let tree = build_tree(&file, &config, ai, api_key).await?;

            if outline {
                print!("{}", tree.render_outline());
            } else {
                let json = serde_json::to_string_pretty(&tree)?;
                write_output(output.as_deref(), &json)?;
            }
        }
        Command::Check {
            file,
            output,
            ai_classify,
            api_key,
            requirements,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let key = resolve_api_key(api_key)?;
            let tree = build_tree(&file, &config, ai_classify, Some(key.clone())).await?;
            info!(
                "parsed {} paragraphs from {}",
                tree.paragraph_count, tree.source
            );

            let client = DeepSeekClient::new(key, config.oracle.clone());
            let mut analyzer = DocumentAnalyzer::new(&client, &config);
            if let Some(path) = requirements {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading requirements from {}", path.display()))?;
                analyzer = analyzer.with_requirements(text);
            }

            let results = analyzer.analyze_tree(&tree).await;
            let report = CheckReport::new(&tree, results);

            match output {
                Some(path) => {
                    let json = serde_json::to_string_pretty(&report)?;
                    write_output(Some(path.as_path()), &json)?;
                }
                None => print!("{}", report.render()),
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CheckConfig> {
    match path {
        Some(path) => CheckConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => CheckConfig::load(),
    }
}

fn resolve_api_key(flag: Option<String>) -> Result<String> {
    if let Some(key) = flag {
        return Ok(key);
    }
    match std::env::var("DEEPSEEK_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => bail!("no API key: pass --api-key or set DEEPSEEK_API_KEY"),
    }
}

/// Parse the document, with or without the remote classification oracle
async fn build_tree(
    file: &Path,
    config: &CheckConfig,
    use_oracle: bool,
    api_key: Option<String>,
) -> Result<DocumentTree> {
    let rules = RuleClassifier::new(config.classifier.clone());

    let oracle = if use_oracle || config.oracle.enabled {
        let key = resolve_api_key(api_key)?;
        Some(DeepSeekClient::new(key, config.oracle.clone()))
    } else {
        None
    };

    let classifier = HybridClassifier::new(rules, oracle);
    parse_document(file, &classifier).await
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("writing output to {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
