use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use ivo::inspector::FsInspector;
use ivo::slicer::{
    self, CancelToken, Intensity, OutputFormat, PlanOptions, SliceError, SliceRequest,
    StrategyRegistry,
};

#[derive(Parser)]
#[command(
    name = "ivo",
    version,
    about = "Context slicer - budget-bounded repository context for LLMs",
    long_about = "Scans a source repository with a set of ranked strategies and emits a \
                  token-budgeted context bundle (XML, Markdown, or JSON) on stdout."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a context bundle for a task
    Slice {
        /// Task description; may be empty for a repository snapshot
        #[arg(short, long, default_value = "")]
        task: String,

        /// Repository root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Token budget for the bundle
        #[arg(short, long, default_value_t = 12_000)]
        budget: u32,

        /// Gathering intensity: lite, standard, deep
        #[arg(short, long, default_value = "standard")]
        intensity: String,

        /// Comma-separated strategy list (default: intensity policy set)
        #[arg(short, long)]
        strategies: Option<String>,

        /// Include glob, repeatable
        #[arg(long)]
        include: Vec<String>,

        /// Exclude glob, repeatable
        #[arg(long)]
        exclude: Vec<String>,

        /// Attach the directory-tree sidecar
        #[arg(long)]
        tree: bool,

        /// Output format: xml, markdown, json
        #[arg(short, long, default_value = "xml")]
        format: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red());
            ExitCode::from(1)
        }
    }
}

fn exit_code_for(error: &SliceError) -> u8 {
    match error {
        SliceError::InvalidRequest(_) => 2,
        SliceError::InspectorUnavailable(_) => 3,
        SliceError::Cancelled => 130,
        SliceError::Internal(_) => 1,
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let Commands::Slice {
        task,
        root,
        budget,
        intensity,
        strategies,
        include,
        exclude,
        tree,
        format,
    } = &cli.command;

    let intensity: Intensity = match intensity.parse() {
        Ok(level) => level,
        Err(e) => return fail(&e),
    };
    let output: OutputFormat = match format.parse() {
        Ok(fmt) => fmt,
        Err(e) => return fail(&e),
    };

    let inspector = match FsInspector::new(root.clone()) {
        Ok(inspector) => inspector,
        Err(e) => return fail(&SliceError::InspectorUnavailable(e.to_string())),
    };

    let mut request = SliceRequest::new(task.clone(), root.clone(), *budget);
    request.intensity = intensity;
    request.with_tree = *tree;
    request.include = include.clone();
    request.exclude = exclude.clone();
    if let Some(list) = strategies {
        request.strategies = list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    let registry = StrategyRegistry::builtin();
    let opts = PlanOptions {
        cancel: CancelToken::new(),
        ..Default::default()
    };

    if cli.verbose > 0 {
        eprintln!(
            "slicing {} (budget {budget}, intensity {intensity})",
            root.display()
        );
    }

    let plan = match slicer::plan(request, &inspector, &registry, &opts) {
        Ok(plan) => plan,
        Err(e) => return fail(&e),
    };
    if cli.verbose > 1 {
        eprintln!(
            "planned {} candidates, {} gross tokens",
            plan.candidates.len(),
            plan.gross_tokens
        );
    }

    let result = match slicer::assemble(&plan, *budget, &inspector, &registry) {
        Ok(result) => result,
        Err(e) => return fail(&e),
    };

    for warning in &result.warnings {
        eprintln!("{} {warning}", "warning:".yellow());
    }
    print!("{}", slicer::format_result(&result.context, output));

    if cli.verbose > 0 {
        eprintln!(
            "{} {} files, {}/{} tokens",
            "done:".green(),
            result.context.files.len(),
            result.total_tokens,
            result.budget
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn fail(error: &SliceError) -> Result<ExitCode> {
    eprintln!("{} {error}", "error:".red());
    Ok(ExitCode::from(exit_code_for(error)))
}
