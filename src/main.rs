use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pom_versioner::config::{discover, load_from_path, EngineConfig};
use pom_versioner::engine::{FieldUpdate, PatchEngine, PatchReport};
use pom_versioner::reactor::{
    discover_modules, patch_module, patch_modules, DirectiveOverrides, ModuleRequest,
    MANIFEST_FILE,
};
use pom_versioner::swap::ActiveManifest;
use pom_versioner::xml::{self, DocumentStore, FieldPath};
use pom_versioner::{logging, Plugin, ProjectModel};
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pom-versioner")]
#[command(about = "Generate git versioned Maven POM files", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a git versioned copy of one module's POM
    Patch {
        /// Path to the module POM
        #[arg(short, long, default_value = "pom.xml")]
        pom: PathBuf,

        /// Version resolved from version control
        #[arg(short = 'r', long)]
        resolved_version: String,

        /// Build output directory (defaults to <pom dir>/target)
        #[arg(short, long)]
        build_dir: Option<PathBuf>,

        /// Also overwrite the original POM with the patched one
        #[arg(long)]
        update_pom: bool,

        /// Rewrite the parent version (it is rewritten whenever present)
        #[arg(long)]
        force_update_parent: bool,

        /// Config file (defaults to .mvn/pom-versioner.toml next to the POM)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show unified diff of original vs patched POM
        #[arg(short, long)]
        diff: bool,

        /// Print the patch report as JSON
        #[arg(long, conflicts_with = "diff")]
        json: bool,
    },

    /// Patch every module POM below a directory
    Reactor {
        /// Root of the multi-module project
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Version resolved from version control
        #[arg(short = 'r', long)]
        resolved_version: String,

        /// Also overwrite the original POMs
        #[arg(long)]
        update_pom: bool,

        /// Rewrite parent versions (they are rewritten whenever present)
        #[arg(long)]
        force_update_parent: bool,

        /// Config file (defaults to .mvn/pom-versioner.toml under the root)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of modules patched in parallel (defaults to one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Print the module reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the version fields and plugin fingerprint of a POM
    Show {
        /// Path to the module POM
        #[arg(short, long, default_value = "pom.xml")]
        pom: PathBuf,

        /// Config file (defaults to .mvn/pom-versioner.toml next to the POM)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = if cli.quiet {
        -1
    } else {
        i8::try_from(cli.verbose).unwrap_or(i8::MAX)
    };
    if let Err(err) = logging::init(verbosity) {
        eprintln!(
            "{}",
            format!("Warning: failed to initialise logging: {err}").yellow()
        );
    }

    match cli.command {
        Commands::Patch {
            pom,
            resolved_version,
            build_dir,
            update_pom,
            force_update_parent,
            config,
            diff,
            json,
        } => cmd_patch(
            pom,
            resolved_version,
            build_dir,
            DirectiveOverrides {
                update_pom,
                force_update_parent,
            },
            config,
            diff,
            json,
        ),

        Commands::Reactor {
            root,
            resolved_version,
            update_pom,
            force_update_parent,
            config,
            jobs,
            json,
        } => cmd_reactor(
            root,
            resolved_version,
            DirectiveOverrides {
                update_pom,
                force_update_parent,
            },
            config,
            jobs,
            json,
        ),

        Commands::Show { pom, config, json } => cmd_show(pom, config, json),
    }
}

/// Explicit `--config` wins; otherwise the project's own config file, if any.
fn load_config(explicit: Option<PathBuf>, manifest: &Path) -> Result<EngineConfig> {
    let config = match explicit {
        Some(path) => load_from_path(&path)?,
        None => discover(manifest)?,
    };
    Ok(config)
}

fn cmd_patch(
    pom: PathBuf,
    resolved_version: String,
    build_dir: Option<PathBuf>,
    overrides: DirectiveOverrides,
    config: Option<PathBuf>,
    show_diff: bool,
    json: bool,
) -> Result<()> {
    let engine = PatchEngine::new(load_config(config, &pom)?);

    let mut request = ModuleRequest::new(&pom, resolved_version);
    if let Some(dir) = build_dir {
        request.build_dir = dir;
    }
    request.overrides = overrides;

    // Read before patching: --update-pom replaces the file
    let original = if show_diff {
        Some(
            fs::read_to_string(&pom)
                .with_context(|| format!("failed to read {}", pom.display()))?,
        )
    } else {
        None
    };

    let result = patch_module(&engine, &request)
        .with_context(|| format!("failed to patch {}", pom.display()))?;

    let mut active = ActiveManifest::new(&pom);
    active.install(&result.sidecar_path);

    if json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
        return Ok(());
    }

    print_report(&result.report);
    println!("Active manifest: {}", active.path().display());

    if let Some(before) = original {
        let after = result.document.to_xml();
        if before != after {
            display_diff(&pom, &before, after);
        }
    }

    Ok(())
}

fn cmd_reactor(
    root: PathBuf,
    resolved_version: String,
    overrides: DirectiveOverrides,
    config: Option<PathBuf>,
    jobs: Option<usize>,
    json: bool,
) -> Result<()> {
    let manifests = discover_modules(&root)?;
    if manifests.is_empty() {
        anyhow::bail!("No {} files found below {}", MANIFEST_FILE, root.display());
    }

    let engine = PatchEngine::new(load_config(config, &root.join(MANIFEST_FILE))?);
    let requests: Vec<ModuleRequest> = manifests
        .iter()
        .map(|manifest| {
            let mut request = ModuleRequest::new(manifest, resolved_version.as_str());
            request.overrides = overrides;
            request
        })
        .collect();

    let outcomes = patch_modules(&engine, &requests, jobs.unwrap_or(0))?;
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

    if json {
        let entries: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(result) => serde_json::json!({
                    "manifest": outcome.manifest,
                    "report": result.report,
                }),
                Err(err) => serde_json::json!({
                    "manifest": outcome.manifest,
                    "error": format_error_chain(err),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("Root: {}", root.display());
        println!("Version: {}", resolved_version);
        println!();

        for outcome in &outcomes {
            match &outcome.result {
                Ok(result) => println!(
                    "{} {}: {}",
                    "✓".green(),
                    result.report.project,
                    result.sidecar_path.display()
                ),
                Err(err) => println!(
                    "{} {}: {}",
                    "✗".red(),
                    outcome.manifest.display(),
                    format_error_chain(err)
                ),
            }
        }

        println!();
        println!("Summary:");
        println!("  {} patched", (outcomes.len() - failed).to_string().green());
        if failed > 0 {
            println!("  {} failed", failed.to_string().red());
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} modules failed", failed, outcomes.len());
    }
    Ok(())
}

fn cmd_show(pom: PathBuf, config: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_config(config, &pom)?;
    let document = DocumentStore::load(&pom)
        .with_context(|| format!("failed to read {}", pom.display()))?;
    let model = ProjectModel::from_document(&document)
        .with_context(|| format!("failed to read project model from {}", pom.display()))?;

    let prefix = config.property_prefix();
    let self_version = xml::read(&document, FieldPath::SelfVersion);
    let parent_version = xml::read(&document, FieldPath::ParentVersion);
    let plugin_declared = model.declares_plugin(&config.plugin.group_id, &config.plugin.artifact_id);
    let plugins: Vec<String> = model.plugins.iter().map(Plugin::key).collect();
    let private_properties: BTreeMap<&str, &str> = model
        .properties
        .iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    if json {
        let value = serde_json::json!({
            "project": model.gav,
            "parent": model.parent,
            "version": self_version,
            "parent_version": parent_version,
            "plugins": plugins,
            "plugin_declared": plugin_declared,
            "private_properties": private_properties,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Project: {}", model.gav);
    if let Some(parent) = &model.parent {
        println!("Parent: {}", parent);
    }
    println!(
        "{}: {}",
        FieldPath::SelfVersion,
        self_version.as_deref().unwrap_or("(inherited)")
    );
    println!(
        "{}: {}",
        FieldPath::ParentVersion,
        parent_version.as_deref().unwrap_or("(none)")
    );
    for plugin in &plugins {
        println!("Plugin: {}", plugin);
    }
    if plugin_declared {
        println!("{} declares {}", "⊙".yellow(), config.plugin);
    }
    for (key, value) in private_properties {
        println!("  {} = {}", key, value);
    }

    Ok(())
}

fn print_report(report: &PatchReport) {
    println!("Project: {}", report.project);
    println!("Version: {}", report.version);
    print_field(FieldPath::SelfVersion, &report.self_version, &report.version);
    print_field(FieldPath::ParentVersion, &report.parent_version, &report.version);

    if !report.sanitized.is_clean() {
        println!(
            "{}",
            format!(
                "  Removed {} plugin declaration(s) and {} plugin propert(ies) from model",
                report.sanitized.removed_plugins, report.sanitized.removed_properties
            )
            .dimmed()
        );
    }

    println!(
        "{} Wrote {}",
        "✓".green(),
        report.sidecar_path.display()
    );
    if report.promoted {
        println!("{} Updated original POM", "✓".green());
    }
}

fn print_field(field: FieldPath, update: &FieldUpdate, version: &str) {
    match update {
        FieldUpdate::Updated { previous } => {
            println!("  {}: {} -> {}", field, previous, version.green())
        }
        FieldUpdate::Unchanged => println!("  {}: {} (unchanged)", field, version),
        FieldUpdate::Absent => println!("{}", format!("  {}: not declared", field).dimmed()),
    }
}

fn format_error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Show unified diff between original and patched content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!(
        "{}",
        format!("+++ {} (git versioned)", file.display()).dimmed()
    );

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", line);
    }
}
