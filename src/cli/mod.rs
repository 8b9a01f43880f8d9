//! Command-line interface for persflow.
//!
//! Provides commands for running the press-release pipeline, checking
//! a project definition, listing brief files, and probing topic
//! detection.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{GeminiGenerator, GenerationRequest, TextGenerator};
use crate::core::{Orchestrator, TopicRuleset};
use crate::domain::RunState;
use crate::ingest::{ContextLoader, LoadedContext, ProjectLayout};
use crate::press;

/// persflow - multi-agent press release pipeline
#[derive(Parser, Debug)]
#[command(name = "persflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the staged press-release pipeline
    Run {
        /// Project base path (contains data/, prompts/, user_input/)
        base_path: PathBuf,

        /// Brief file to use (name under user_input/ or a path;
        /// default: user_input/prompt_1.txt)
        #[arg(short, long)]
        prompt: Option<String>,

        /// Fall back to a single-shot generation that bypasses the
        /// staged pipeline if the run fails
        #[arg(long)]
        single_shot: bool,

        /// Gemini model id (default: gemini-2.0-flash)
        #[arg(long)]
        model: Option<String>,

        /// Use the streaming generation endpoint
        #[arg(long)]
        streaming: bool,

        /// Per-stage timeout in seconds
        #[arg(long, default_value = "300")]
        timeout_seconds: u64,
    },

    /// Validate the project files and pipeline definition
    Check {
        /// Project base path
        base_path: PathBuf,
    },

    /// List available brief files
    Prompts {
        /// Project base path
        base_path: PathBuf,
    },

    /// Show which addendum category a brief selects
    Topic {
        /// The brief text
        brief: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                base_path,
                prompt,
                single_shot,
                model,
                streaming,
                timeout_seconds,
            } => {
                run_pipeline(
                    &base_path,
                    prompt.as_deref(),
                    single_shot,
                    model,
                    streaming,
                    timeout_seconds,
                )
                .await
            }
            Commands::Check { base_path } => check_project(&base_path),
            Commands::Prompts { base_path } => list_prompts(&base_path),
            Commands::Topic { brief } => show_topic(&brief),
        }
    }
}

/// Resolve a brief argument against the project layout
fn resolve_prompt_file(layout: &ProjectLayout, prompt: Option<&str>) -> Option<PathBuf> {
    let name = prompt?;
    let direct = PathBuf::from(name);
    if direct.exists() {
        return Some(direct);
    }
    Some(layout.user_prompt_dir().join(name))
}

/// Run the staged pipeline and persist the artifact
async fn run_pipeline(
    base_path: &PathBuf,
    prompt: Option<&str>,
    single_shot: bool,
    model: Option<String>,
    streaming: bool,
    timeout_seconds: u64,
) -> Result<()> {
    let layout = ProjectLayout::new(base_path);
    let loader = ContextLoader::new(layout.clone())?;
    let prompt_file = resolve_prompt_file(&layout, prompt);
    let loaded = loader.load(prompt_file.as_deref())?;

    if let Some(ref topic) = loaded.topic {
        eprintln!("[Topic addendum applied: {}]", topic);
    }

    let mut generator = GeminiGenerator::from_env()?.with_streaming(streaming);
    if let Some(model) = model {
        generator = generator.with_model(model);
    }
    let generator: Arc<dyn TextGenerator> = Arc::new(generator);

    let (pipeline, agents) = press::build();
    let orchestrator = Orchestrator::new(Arc::clone(&generator))
        .with_stage_timeout(Duration::from_secs(timeout_seconds));

    let report = orchestrator
        .run_pipeline(&pipeline, &agents, &loaded.context)
        .await?;

    layout.save_drafts(&report.ledger)?;

    match &report.state {
        RunState::Completed => {
            let output = report
                .final_output()
                .context("Completed run has no terminal output")?;
            layout.save_output(output)?;
            print_preview(output);
            eprintln!("\n[Run {} completed successfully]", report.id);
            Ok(())
        }
        RunState::Failed { error } => {
            eprintln!("\n[Run {} failed: {}]", report.id, error);

            if single_shot {
                eprintln!("[Falling back to single-shot generation]");
                let output = generate_single_shot(generator.as_ref(), &loaded).await?;
                layout.save_output(&output)?;
                print_preview(&output);
                return Ok(());
            }

            std::process::exit(1);
        }
        RunState::Running => {
            // run_pipeline always returns a terminal state
            anyhow::bail!("Run {} ended in a non-terminal state", report.id)
        }
    }
}

/// Degraded mode: one generation call with the combined corpus and
/// brief, bypassing the staged pipeline entirely.
async fn generate_single_shot(
    generator: &dyn TextGenerator,
    loaded: &LoadedContext,
) -> Result<String> {
    let prompt = format!(
        "{}\n\n{}",
        loaded.context.source_data, loaded.context.user_brief
    );
    let request =
        GenerationRequest::single_shot(prompt, loaded.context.system_prompt.clone(), 0.7);

    let output = generator
        .generate(&request, Duration::from_secs(180))
        .await
        .context("Single-shot generation failed")?;

    if output.content.trim().is_empty() {
        anyhow::bail!("Single-shot generation returned empty output");
    }

    Ok(output.content)
}

/// Print the first 500 characters of the artifact
fn print_preview(output: &str) {
    let preview: String = output.chars().take(500).collect();
    let suffix = if output.chars().count() > 500 { "..." } else { "" };

    println!("\nPress Release Preview (first 500 characters):");
    println!("{}", "-".repeat(80));
    println!("{}{}", preview, suffix);
    println!("{}", "-".repeat(80));
}

/// Validate the project: input files, pipeline wiring, templates
fn check_project(base_path: &PathBuf) -> Result<()> {
    let layout = ProjectLayout::new(base_path);
    let loader = ContextLoader::new(layout.clone())?;

    let loaded = loader.load(None)?;
    loaded.context.ensure_complete()?;

    let (pipeline, agents) = press::build();
    pipeline.validate(&agents)?;

    println!("Project OK: {}", layout.base().display());
    println!("  Pipeline: {} ({} stages)", pipeline.name, pipeline.stages.len());
    println!("  Agents: {}", agents.len());
    match loaded.topic {
        Some(topic) => println!("  Default brief selects topic: {}", topic),
        None => println!("  Default brief selects no topic addendum"),
    }

    Ok(())
}

/// List available brief files
fn list_prompts(base_path: &PathBuf) -> Result<()> {
    let layout = ProjectLayout::new(base_path);
    let files = layout.list_prompt_files()?;

    if files.is_empty() {
        println!(
            "No brief files found in {}",
            layout.user_prompt_dir().display()
        );
        return Ok(());
    }

    println!("Available briefs:");
    for file in files {
        if let Some(name) = file.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }

    Ok(())
}

/// Show which addendum category a brief selects
fn show_topic(brief: &str) -> Result<()> {
    let rules = TopicRuleset::default_rules();
    match rules.select(brief) {
        Some(rule) => println!("{}", rule.id),
        None => println!("(no topic addendum)"),
    }
    Ok(())
}
