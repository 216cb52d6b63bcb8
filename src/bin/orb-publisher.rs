//! Orb Publisher CLI
//!
//! Client-side command surface for a remote orb registry: list, create,
//! validate, process, publish (with nested increment/promote), source,
//! and info.

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use orb_publisher::core::config::OutputOptions;
use orb_publisher::core::config_loader::{ConfigLoadOptions, ConfigLoader, ConfigOverrides};
use orb_publisher::core::error::OrbError;
use orb_publisher::core::traits::OrbRegistry;
use orb_publisher::orchestration::{read_orb_source, ListingAggregator, OrbPublisher};
use orb_publisher::registry::RegistryClient;
use orb_publisher::render::MetadataFormatter;
use orb_publisher::validation::VersionKind;
use std::process;
use std::sync::Arc;

/// Manage versioned orb packages in a remote registry
#[derive(Parser)]
#[command(name = "orb-publisher")]
#[command(version = "0.1.0")]
#[command(about = "Manage versioned orb packages in a remote registry", long_about = None)]
struct Cli {
    /// Registry host (overrides config file and environment)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Registry API endpoint path (overrides config file and environment)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Registry API token (overrides config file and environment)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List orbs
    List {
        /// Namespace to list (optional)
        #[arg(value_name = "NAMESPACE")]
        namespace: Option<String>,

        /// Include uncertified orbs
        #[arg(short = 'u', long)]
        uncertified: bool,

        /// Print output as JSON instead of human-readable
        #[arg(long, hide = true)]
        json: bool,

        /// Output all the commands, executors, and jobs, along with a tree
        /// of their parameters
        #[arg(short = 'd', long)]
        details: bool,
    },

    /// Create an orb in the specified namespace
    Create {
        /// Reference in the form namespace/orb
        #[arg(value_name = "ORB")]
        reference: String,
    },

    /// Validate an orb.yml
    Validate {
        /// The path to your orb (use "-" for STDIN)
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Validate an orb and print its form after all pre-registration
    /// processing
    Process {
        /// The path to your orb (use "-" for STDIN)
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Publish an orb to the registry
    Publish(PublishArgs),

    /// Show the source of an orb
    Source {
        /// A fully-qualified reference: namespace/orb@version
        #[arg(value_name = "ORB")]
        reference: String,
    },

    /// Show the meta-data of an orb
    Info {
        /// A fully-qualified reference: namespace/orb@version
        #[arg(value_name = "ORB")]
        reference: String,
    },
}

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct PublishArgs {
    #[command(subcommand)]
    command: Option<PublishCommands>,

    /// The path to your orb (use "-" for STDIN)
    #[arg(value_name = "PATH", required = true)]
    path: Option<String>,

    /// A fully-qualified reference: namespace/orb@version
    #[arg(value_name = "ORB", required = true)]
    reference: Option<String>,
}

#[derive(Subcommand)]
enum PublishCommands {
    /// Increment a released version of an orb
    #[command(alias = "inc")]
    Increment {
        /// The path to your orb (use "-" for STDIN)
        #[arg(value_name = "PATH")]
        path: String,

        /// Reference in the form namespace/orb
        #[arg(value_name = "ORB")]
        reference: String,

        /// "major"|"minor"|"patch"
        #[arg(value_name = "SEGMENT")]
        segment: String,
    },

    /// Promote a development version of an orb to a semantic release
    Promote {
        /// A fully-qualified reference: namespace/orb@version
        #[arg(value_name = "ORB")]
        reference: String,

        /// "major"|"minor"|"patch"
        #[arg(value_name = "SEGMENT")]
        segment: String,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("❌ {:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        host: cli.host,
        endpoint: cli.endpoint,
        token: cli.token,
    };
    let config = ConfigLoader::load(ConfigLoadOptions::from_process_env(overrides)).await?;
    let registry: Arc<dyn OrbRegistry> = Arc::new(RegistryClient::new(&config)?);

    match cli.command {
        Commands::List {
            namespace,
            uncertified,
            json,
            details,
        } => {
            let options = OutputOptions {
                json,
                details,
                uncertified,
            };
            list_command(registry, namespace, options).await
        }
        Commands::Create { reference } => create_command(registry, reference).await,
        Commands::Validate { path } => validate_command(registry, path).await,
        Commands::Process { path } => process_command(registry, path).await,
        Commands::Publish(args) => match args.command {
            Some(PublishCommands::Increment {
                path,
                reference,
                segment,
            }) => increment_command(registry, path, reference, segment).await,
            Some(PublishCommands::Promote { reference, segment }) => {
                promote_command(registry, reference, segment).await
            }
            None => {
                let path = args.path.ok_or_else(|| anyhow!("missing <PATH> argument"))?;
                let reference = args
                    .reference
                    .ok_or_else(|| anyhow!("missing <ORB> argument"))?;
                publish_command(registry, path, reference).await
            }
        },
        Commands::Source { reference } => source_command(registry, reference).await,
        Commands::Info { reference } => info_command(registry, reference).await,
    }
}

async fn list_command(
    registry: Arc<dyn OrbRegistry>,
    namespace: Option<String>,
    options: OutputOptions,
) -> Result<i32> {
    let aggregator = ListingAggregator::new(registry);
    let orbs = aggregator
        .list(namespace.as_deref(), options.uncertified)
        .await?;

    let rendered = MetadataFormatter::orb_collection_to_string(&orbs, options)?;
    println!("{rendered}");

    Ok(0)
}

async fn create_command(registry: Arc<dyn OrbRegistry>, reference: String) -> Result<i32> {
    let publisher = OrbPublisher::new(registry);
    publisher.create(&reference).await?;

    println!("✅ Orb `{reference}` created.");
    println!("Please note that any versions you publish of this orb are world-readable.");
    println!("You can now register versions of `{reference}` using `orb-publisher publish`.");

    Ok(0)
}

async fn validate_command(registry: Arc<dyn OrbRegistry>, path: String) -> Result<i32> {
    let orb_yaml = read_orb_source(&path).await?;

    // Validation problems surface exactly as the registry reports them.
    registry.validate_orb(&orb_yaml).await?;

    if path == "-" {
        println!("✅ Orb input is valid.");
    } else {
        println!("✅ Orb at `{path}` is valid.");
    }

    Ok(0)
}

async fn process_command(registry: Arc<dyn OrbRegistry>, path: String) -> Result<i32> {
    let orb_yaml = read_orb_source(&path).await?;
    let processed = registry.process_orb(&orb_yaml).await?;

    println!("{}", processed.output_yaml);

    Ok(0)
}

async fn publish_command(
    registry: Arc<dyn OrbRegistry>,
    path: String,
    reference: String,
) -> Result<i32> {
    let publisher = OrbPublisher::new(registry);
    let published = publisher.publish(&path, &reference).await?;

    println!("✅ Orb `{}` was published.", published.reference);
    println!("Please note that this is an open orb and is world-readable.");

    if published.kind == VersionKind::Dev {
        println!(
            "⚠️  Note that your dev label `{}` can be overwritten by anyone in your organization.",
            published.version
        );
        println!(
            "⚠️  Your dev orb will expire in 90 days unless a new version is published on the label `{}`.",
            published.version
        );
    }

    Ok(0)
}

async fn increment_command(
    registry: Arc<dyn OrbRegistry>,
    path: String,
    reference: String,
    segment: String,
) -> Result<i32> {
    let publisher = OrbPublisher::new(registry);
    let bumped = publisher.increment(&path, &reference, &segment).await?;

    println!(
        "✅ Orb `{}` has been incremented to `{}@{}`.",
        reference,
        bumped.reference.full_name(),
        bumped.highest_version
    );
    println!("Please note that this is an open orb and is world-readable.");

    Ok(0)
}

async fn promote_command(
    registry: Arc<dyn OrbRegistry>,
    reference: String,
    segment: String,
) -> Result<i32> {
    let publisher = OrbPublisher::new(registry);
    let bumped = publisher.promote(&reference, &segment).await?;

    println!(
        "✅ Orb `{}` was promoted to `{}@{}`.",
        reference,
        bumped.reference.full_name(),
        bumped.highest_version
    );
    println!("Please note that this is an open orb and is world-readable.");

    Ok(0)
}

async fn source_command(registry: Arc<dyn OrbRegistry>, reference: String) -> Result<i32> {
    let source = registry
        .fetch_source(&reference)
        .await
        .map_err(|e| OrbError::registry(format!("failed to get source for `{reference}`"), e))?;

    println!("{source}");

    Ok(0)
}

async fn info_command(registry: Arc<dyn OrbRegistry>, reference: String) -> Result<i32> {
    let info = registry
        .fetch_info(&reference)
        .await
        .map_err(|e| OrbError::registry(format!("failed to get info for `{reference}`"), e))?;

    print!("{}", MetadataFormatter::orb_to_info_string(&info));

    Ok(0)
}
