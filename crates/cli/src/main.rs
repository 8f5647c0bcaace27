//! busybee-rally CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Load configuration** from the TOML file named by `--config` (or
//!    `BUSYBEE_RALLY_CONFIG`), with `RALLY_API_KEY` overriding `apiKey`.
//! 2. **Wire logging**: a `tracing-subscriber` fmt layer (optionally JSON)
//!    filtered by `RUST_LOG`, and the resolver's [`Logger`] threshold from
//!    `logLevel` or `LOG_LEVEL`.
//! 3. **Construct infrastructure**: a [`RallyClient`] injected into a
//!    [`Resolver`].
//! 4. **Run one command** and print its result as JSON on stdout.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rally::RallyClient;
use resolver::{ConfiguredScope, Resolver};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;
use tracker::{
    FetchFields, LogLevel, Logger, ObjectId, ObjectType, ProjectId, TestFolderId, WorkspaceId,
    LOG_TARGET,
};

#[derive(Parser, Debug)]
#[command(
    name = "busybee-rally",
    version,
    about = "Resolve, find-or-create and list Rally objects by name"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "BUSYBEE_RALLY_CONFIG")]
    config: Option<PathBuf>,
    /// API key; overrides `apiKey` from the configuration file.
    #[arg(long, global = true, env = "RALLY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the ObjectID of the object with the given name, or null.
    Resolve(LookupArgs),
    /// Print the ObjectID of the user with the given e-mail address, or null.
    User {
        #[arg(long)]
        email: String,
    },
    /// Print the ObjectID of the named object, creating it if missing.
    FindOrCreate(LookupArgs),
    /// Create an object from a JSON attribute map and print its ObjectID.
    Create {
        #[arg(long = "type")]
        object_type: String,
        /// Attributes as a JSON object, e.g. '{"Name":"Smoke"}'.
        #[arg(long)]
        data: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// List the test cases of a test folder (default: the configured one).
    TestCases {
        #[arg(long)]
        folder: Option<String>,
    },
    /// List the collection `/{parent_type}/{parent_id}/{relation}`.
    Children {
        #[arg(long)]
        parent_type: String,
        #[arg(long)]
        parent_id: String,
        #[arg(long)]
        relation: String,
    },
}

#[derive(Args, Debug)]
struct LookupArgs {
    #[arg(long = "type")]
    object_type: String,
    #[arg(long)]
    name: String,
    /// Fields to fetch (comma-separated). Defaults to Name,ObjectID.
    #[arg(long, value_delimiter = ',')]
    fetch: Vec<String>,
    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(Args, Debug)]
struct ScopeArgs {
    /// Workspace id; defaults to the configured workspace.
    #[arg(long)]
    workspace: Option<String>,
    /// Project id; defaults to the configured project.
    #[arg(long)]
    project: Option<String>,
    /// Search globally, ignoring the configured workspace and project.
    #[arg(long, default_value_t = false, conflicts_with_all = ["workspace", "project"])]
    unscoped: bool,
}

fn init_tracing(json: bool, domain_level: LogLevel) {
    let default_directives = format!(
        "info,{LOG_TARGET}={}",
        domain_level.as_str().to_ascii_lowercase()
    );
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn object_type(raw: &str) -> Result<ObjectType> {
    ObjectType::new(raw).context("--type must not be empty")
}

fn fetch_fields(raw: Vec<String>) -> Option<FetchFields> {
    let fields: Vec<String> = raw.into_iter().filter(|f| !f.trim().is_empty()).collect();
    (!fields.is_empty()).then(|| FetchFields::new(fields))
}

fn id_json(id: Option<ObjectId>) -> Value {
    json!({ "objectId": id.map(ObjectId::as_u64) })
}

impl ScopeArgs {
    /// With `--workspace` or `--project`, exactly the given ids apply and the
    /// other side stays unset. With neither, the configured pair applies
    /// unless `--unscoped` was given.
    fn resolve(&self, configured: &ConfiguredScope) -> (Option<WorkspaceId>, Option<ProjectId>) {
        if self.unscoped {
            return (None, None);
        }
        let workspace = self.workspace.clone().and_then(WorkspaceId::new);
        let project = self.project.clone().and_then(ProjectId::new);
        if workspace.is_none() && project.is_none() {
            return (
                Some(configured.workspace.clone()),
                Some(configured.project.clone()),
            );
        }
        (workspace, project)
    }
}

async fn run(command: Commands, resolver: &Resolver<RallyClient>) -> Result<Value> {
    let output = match command {
        Commands::Resolve(args) => {
            let (workspace, project) = args.scope.resolve(resolver.configured_scope());
            let id = resolver
                .resolve_by_name(
                    &object_type(&args.object_type)?,
                    &args.name,
                    workspace.as_ref(),
                    project.as_ref(),
                    fetch_fields(args.fetch),
                )
                .await?;
            id_json(id)
        }
        Commands::User { email } => id_json(resolver.resolve_user_by_email(&email).await?),
        Commands::FindOrCreate(args) => {
            let (workspace, project) = args.scope.resolve(resolver.configured_scope());
            let id = resolver
                .find_or_create(
                    &object_type(&args.object_type)?,
                    &args.name,
                    workspace.as_ref(),
                    project.as_ref(),
                    fetch_fields(args.fetch),
                )
                .await?;
            id_json(id)
        }
        Commands::Create {
            object_type: raw_type,
            data,
            scope,
        } => {
            let attributes: Map<String, Value> =
                serde_json::from_str(&data).context("--data must be a JSON object")?;
            let (workspace, project) = scope.resolve(resolver.configured_scope());
            let id = resolver
                .create_object(
                    &object_type(&raw_type)?,
                    attributes,
                    workspace.as_ref(),
                    project.as_ref(),
                )
                .await?;
            id_json(id)
        }
        Commands::TestCases { folder } => {
            let records = match folder.and_then(TestFolderId::new) {
                Some(folder) => resolver.list_test_cases(&folder).await?,
                None => resolver.list_configured_test_cases().await?,
            };
            serde_json::to_value(records)?
        }
        Commands::Children {
            parent_type,
            parent_id,
            relation,
        } => {
            let records = resolver
                .list_child_objects(&object_type(&parent_type)?, &parent_id, &relation)
                .await?;
            serde_json::to_value(records)?
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref(), cli.api_key.clone())?;
    config.validate()?;

    let logger = match config.log_level {
        Some(level) => Logger::tracing(level),
        None => Logger::from_env(),
    };
    init_tracing(cli.log_json, logger.threshold());

    let client = RallyClient::from_config(&config).context("building Rally client")?;
    tracing::info!(
        server = client.base_url(),
        user = config.user.as_deref().unwrap_or_default(),
        "connecting"
    );
    let resolver = Resolver::new(config, client, logger)?;

    let output = run(cli.command, &resolver).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
