use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use regex::Regex;

use crate::config::{load_config, DepvizConfig};
use crate::error::{DepvizError, Result};
use crate::graph::builder::{build_graph, BuildOptions};
use crate::graph::prune::{simulate_removal, PruneOptions, RemovalOutcome};
use crate::graph::PackageGraph;
use crate::manifest::load_manifest;
use crate::render::{render_graph, Direction, Notation, RenderOptions};
use crate::util::output;

#[derive(Parser, Debug)]
#[command(name = "depviz")]
#[command(about = "Visualize and prune resolved package dependency graphs", long_about = None)]
pub struct Cli {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the dependency graph of a resolved manifest
    Render(RenderArgs),
    /// Simulate removing packages, then render what would remain
    Remove(RemoveArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Resolved dependency manifest (JSON)
    pub manifest: PathBuf,
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Resolved dependency manifest (JSON)
    pub manifest: PathBuf,
    /// Packages to remove (case-insensitive)
    #[arg(required = true)]
    pub packages: Vec<String>,
    /// Print the removal classification as JSON on stdout
    #[arg(long)]
    pub json: bool,
    /// Count ignored packages as kept dependents during restoration
    #[arg(long)]
    pub restore_via_ignored: bool,
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Output notation: 'mermaid' or 'dot'
    #[arg(short, long)]
    pub format: Option<String>,
    /// Layout direction: 'lr' or 'tb'
    #[arg(short, long)]
    pub direction: Option<String>,
    /// Embed resolved versions in node identifiers
    #[arg(long)]
    pub include_versions: bool,
    /// Show packages marked ignored in the config
    #[arg(long)]
    pub show_ignored: bool,
    /// Mark a package ignored (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,
    /// Restrict the graph to packages matching this regex (roots always stay)
    #[arg(long)]
    pub only: Option<String>,
    /// Write the graph document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        console::set_colors_enabled(false);
    }
    match cli.command {
        Commands::Render(args) => handle_render(args, cli.config.as_deref(), cli.quiet),
        Commands::Remove(args) => handle_remove(args, cli.config.as_deref(), cli.quiet),
        Commands::Completions(args) => handle_completions(args),
    }
}

fn handle_render(args: RenderArgs, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    let config = load_config(config_path, &args.manifest)?;
    let render_options = resolve_render_options(&args.view, &config)?;
    let graph = load_graph(&args.manifest, &args.view, &config, &render_options)?;
    let document = render_graph(&graph, &render_options)?;
    emit(&document, args.view.output.as_deref(), &graph, quiet)
}

fn handle_remove(args: RemoveArgs, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    let config = load_config(config_path, &args.manifest)?;
    let render_options = resolve_render_options(&args.view, &config)?;
    let mut graph = load_graph(&args.manifest, &args.view, &config, &render_options)?;

    let prune_options = PruneOptions {
        restore_via_ignored: args.restore_via_ignored || config.prune.restore_via_ignored,
    };
    let outcome = simulate_removal(&mut graph, &args.packages, &prune_options);

    let document = render_graph(&graph, &render_options)?;
    if args.json {
        // The classification takes stdout; the graph document only goes to an
        // explicit --output destination.
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome)
                .map_err(|err| DepvizError::Other(anyhow::Error::new(err)))?
        );
        if let Some(path) = args.view.output.as_deref() {
            write_document(&document, path, &graph, quiet)?;
        }
        return Ok(());
    }

    if !quiet {
        report_outcome(&outcome);
    }
    emit(&document, args.view.output.as_deref(), &graph, quiet)
}

fn handle_completions(args: CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(args.shell, &mut command, "depviz", &mut io::stdout());
    Ok(())
}

fn resolve_render_options(view: &ViewArgs, config: &DepvizConfig) -> Result<RenderOptions> {
    let notation = if let Some(format) = view.format.as_deref() {
        Notation::parse(format)?
    } else if let Some(notation) = view
        .output
        .as_deref()
        .and_then(Notation::from_extension)
    {
        notation
    } else if let Some(format) = config.render.format.as_deref() {
        Notation::parse(format)?
    } else {
        Notation::default()
    };

    let direction = match view
        .direction
        .as_deref()
        .or(config.render.direction.as_deref())
    {
        Some(direction) => Direction::parse(direction)?,
        None => Direction::default(),
    };

    Ok(RenderOptions {
        notation,
        direction,
        include_versions: view.include_versions
            || config.render.include_versions.unwrap_or(false),
        show_ignored: view.show_ignored || config.render.show_ignored.unwrap_or(false),
    })
}

fn load_graph(
    manifest_path: &Path,
    view: &ViewArgs,
    config: &DepvizConfig,
    render_options: &RenderOptions,
) -> Result<PackageGraph> {
    let only = match view.only.as_deref().or(config.packages.only.as_deref()) {
        Some(pattern) => Some(Regex::new(pattern).map_err(|err| {
            DepvizError::Configuration(format!("invalid package filter '{pattern}': {err}"))
        })?),
        None => None,
    };

    let manifest = load_manifest(manifest_path)?;

    let mut ignored = config.packages.ignore.clone();
    ignored.extend(view.ignore.iter().cloned());

    let build_options = BuildOptions {
        require_versions: render_options.include_versions,
        ignored,
        only,
    };
    build_graph(&manifest.packages, &manifest.effective_roots(), &build_options)
}

fn emit(document: &str, destination: Option<&Path>, graph: &PackageGraph, quiet: bool) -> Result<()> {
    match destination {
        Some(path) => write_document(document, path, graph, quiet),
        None => {
            print!("{document}");
            Ok(())
        }
    }
}

fn write_document(document: &str, path: &Path, graph: &PackageGraph, quiet: bool) -> Result<()> {
    fs::write(path, document)?;
    if !quiet {
        output::info(&format!(
            "wrote {} ({} packages, {} edges)",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        ));
    }
    Ok(())
}

fn report_outcome(outcome: &RemovalOutcome) {
    if outcome.removed.is_empty() {
        output::info("nothing becomes removable");
    } else {
        output::info(&format!(
            "removable ({}): {}",
            outcome.removed.len(),
            outcome.removed.join(", ")
        ));
    }
    if !outcome.removed_roots.is_empty() {
        output::warn(&format!(
            "kept roots ({}): {}",
            outcome.removed_roots.len(),
            outcome.removed_roots.join(", ")
        ));
    }
    if !outcome.not_found.is_empty() {
        output::warn(&format!(
            "not found ({}): {}",
            outcome.not_found.len(),
            outcome.not_found.join(", ")
        ));
    }
}
