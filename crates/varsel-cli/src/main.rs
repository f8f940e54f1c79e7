#![forbid(unsafe_code)]

use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use varsel_config::MANIFEST_FILE;
use varsel_engine::ResolutionSession;
use varsel_util::ModuleCoordinate;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "varsel", about = "Variant-aware dependency selection")]
#[command(version)]
struct Cli {
    /// Log selection steps at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new varsel project with a sample catalog
    Init {
        /// Project name
        #[arg(long)]
        name: Option<String>,
    },
    /// Select a variant for every dependency in every configuration
    Resolve {
        /// Only resolve this configuration
        #[arg(long, short = 'c')]
        configuration: Option<String>,
    },
    /// Show the variants published by the catalog's components
    OutgoingVariants {
        /// Only show this component (group:module:version)
        #[arg(long)]
        module: Option<String>,
    },
    /// Show the attributes each consumer configuration requests
    ResolvableConfigurations {
        /// Only show this configuration
        #[arg(long, short = 'c')]
        configuration: Option<String>,
    },
    /// List registered attributes and their rules
    Attributes,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Init { name } => cmd_init(name),
        Command::Resolve { configuration } => cmd_resolve(configuration.as_deref()),
        Command::OutgoingVariants { module } => cmd_outgoing_variants(module.as_deref()),
        Command::ResolvableConfigurations { configuration } => {
            cmd_resolvable_configurations(configuration.as_deref())
        }
        Command::Attributes => cmd_attributes(),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

/// Find the project root by looking for `varsel.toml` in the current directory.
fn project_root() -> Result<PathBuf, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    let manifest = cwd.join(MANIFEST_FILE);
    if !manifest.exists() {
        return Err(
            "no varsel.toml found in current directory — run `varsel init` to create a project"
                .into(),
        );
    }
    Ok(cwd)
}

fn cmd_init(name: Option<String>) -> CliResult {
    let cwd = std::env::current_dir()?;

    let project_name = name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("my-project")
            .to_owned()
    });

    let project_dir = cwd.join(&project_name);
    varsel_engine::init_project(&project_name, &project_dir)?;

    eprintln!(
        "    Created project `{project_name}` at {}",
        project_dir.display()
    );
    eprintln!();
    eprintln!("  To get started:");
    eprintln!("    cd {project_name}");
    eprintln!("    varsel resolve");
    Ok(())
}

fn cmd_resolve(configuration: Option<&str>) -> CliResult {
    let root = project_root()?;
    let (session, manifest) = ResolutionSession::from_project(&root)?;
    let report = session.resolve_all(&manifest, configuration)?;

    print!("{report}");

    let failed = report.failures().count();
    if failed > 0 {
        return Err(format!(
            "{failed} of {} selection(s) failed — see the report above",
            report.entries.len()
        )
        .into());
    }
    eprintln!("    Resolved {} selection(s)", report.entries.len());
    Ok(())
}

fn cmd_outgoing_variants(module: Option<&str>) -> CliResult {
    let root = project_root()?;
    let filter = module.map(ModuleCoordinate::parse).transpose()?;
    let (session, _) = ResolutionSession::from_project(&root)?;
    let text = varsel_engine::outgoing_variants(session.catalog(), filter.as_ref())?;
    if text.is_empty() {
        eprintln!("The catalog is empty");
    }
    print!("{text}");
    Ok(())
}

fn cmd_resolvable_configurations(configuration: Option<&str>) -> CliResult {
    let root = project_root()?;
    let (session, manifest) = ResolutionSession::from_project(&root)?;
    let text =
        varsel_engine::resolvable_configurations(&manifest, session.registry(), configuration)?;
    print!("{text}");
    Ok(())
}

fn cmd_attributes() -> CliResult {
    let root = project_root()?;
    let (session, _) = ResolutionSession::from_project(&root)?;
    print!("{}", varsel_engine::describe_schema(session.registry()));
    Ok(())
}
