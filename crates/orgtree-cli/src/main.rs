//! orgtree: admin client for the organization hierarchy.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use orgtree_core::models::organization::{CreateOrganization, OrganizationId, UpdateOrganization};
use orgtree_core::repository::Pagination;
use orgtree_core::{InvalidationPolicy, MemoryCache, OrganizationService, RowFilter, ServiceConfig};
use orgtree_db::{DbConfig, DbManager};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orgtree")]
#[command(about = "Admin client for the organization hierarchy", long_about = None)]
struct Args {
    /// SurrealDB WebSocket endpoint (host:port).
    #[arg(long, env = "ORGTREE_DB_URL", default_value = "127.0.0.1:8000")]
    db_url: String,
    #[arg(long, env = "ORGTREE_NAMESPACE", default_value = "orgtree")]
    namespace: String,
    #[arg(long, env = "ORGTREE_DATABASE", default_value = "main")]
    database: String,
    #[arg(long, env = "ORGTREE_USERNAME", default_value = "root")]
    username: String,
    #[arg(long, env = "ORGTREE_PASSWORD", default_value = "root", hide_env_values = true)]
    password: String,
    /// Prefix for organization cache keys.
    #[arg(long, env = "ORGTREE_CACHE_PREFIX")]
    cache_prefix: Option<String>,
    #[arg(long, env = "ORGTREE_INVALIDATION", value_enum, default_value_t = Invalidation::Strict)]
    invalidation: Invalidation,
    /// Deepest hierarchy a traversal will walk; unbounded when unset.
    #[arg(long, env = "ORGTREE_MAX_DEPTH")]
    max_depth: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Invalidation {
    Strict,
    BestEffort,
}

impl From<Invalidation> for InvalidationPolicy {
    fn from(value: Invalidation) -> Self {
        match value {
            Invalidation::Strict => InvalidationPolicy::Strict,
            Invalidation::BestEffort => InvalidationPolicy::BestEffort,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Create an organization, optionally under a parent.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        parent: Option<OrganizationId>,
    },
    /// Print one organization.
    Get {
        id: OrganizationId,
        /// Only match active rows.
        #[arg(long, default_value_t = false)]
        active: bool,
    },
    /// Rename an active organization.
    Rename {
        id: OrganizationId,
        #[arg(long)]
        name: String,
    },
    /// Print the chain from the root down to an organization.
    Ancestors { id: OrganizationId },
    /// Print the subtree below an organization.
    Tree {
        id: OrganizationId,
        #[arg(long, default_value_t = false)]
        active_only: bool,
    },
    /// Page through direct children; roots when no parent is given.
    Children {
        #[arg(long)]
        parent: Option<OrganizationId>,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 50)]
        limit: u64,
        #[arg(long, default_value_t = false)]
        active_only: bool,
    },
    /// List every root organization.
    Roots {
        #[arg(long, default_value_t = false)]
        active_only: bool,
    },
    /// List organizations with an exact name.
    FindByName {
        name: String,
        #[arg(long, default_value_t = false)]
        active_only: bool,
    },
    Disable { id: OrganizationId },
    Enable { id: OrganizationId },
    /// Soft-delete an existing organization.
    Delete { id: OrganizationId },
    Restore { id: OrganizationId },
    /// Soft-delete several organizations at once.
    BatchDelete {
        #[arg(required = true)]
        ids: Vec<OrganizationId>,
    },
    /// Disable several organizations at once.
    BatchDisable {
        #[arg(required = true)]
        ids: Vec<OrganizationId>,
    },
}

impl Args {
    fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.namespace.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig {
            invalidation: self.invalidation.into(),
            max_depth: self.max_depth,
            ..ServiceConfig::default()
        };
        if let Some(prefix) = &self.cache_prefix {
            config.cache_key_prefix = prefix.clone();
        }
        config
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("orgtree=info".parse()?))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let db = DbManager::connect(&args.db_config())
        .await
        .with_context(|| format!("connect to SurrealDB at {}", args.db_url))?;

    if let Command::Migrate = args.command {
        db.migrate().await.context("run migrations")?;
        tracing::info!("Schema is up to date");
        return Ok(());
    }

    let config = args.service_config();
    let cache = MemoryCache::new(config.cache_capacity);
    let service = OrganizationService::new(db.organizations(), cache, config);

    match args.command {
        Command::Migrate => {}
        Command::Create { name, parent } => {
            let org = service
                .create(CreateOrganization {
                    parent_id: parent,
                    name,
                })
                .await?;
            print_json(&org)?;
        }
        Command::Get { id, active } => {
            let org = if active {
                service.get_active(id).await?
            } else {
                service.get(id).await?
            };
            print_json(&org)?;
        }
        Command::Rename { id, name } => {
            let org = service
                .update(id, UpdateOrganization { name: Some(name) })
                .await?;
            print_json(&org)?;
        }
        Command::Ancestors { id } => {
            print_json(&service.ancestors(id).await?)?;
        }
        Command::Tree { id, active_only } => {
            print_json(&service.descendants(id, active_only).await?)?;
        }
        Command::Children {
            parent,
            offset,
            limit,
            active_only,
        } => {
            let page = service
                .list_children(
                    parent,
                    RowFilter::for_active_only(active_only),
                    Pagination { offset, limit },
                )
                .await?;
            print_json(&json!({
                "items": page.items,
                "total": page.total,
                "offset": page.offset,
                "limit": page.limit,
            }))?;
        }
        Command::Roots { active_only } => {
            let roots = service
                .find_roots(RowFilter::for_active_only(active_only))
                .await?;
            print_json(&roots)?;
        }
        Command::FindByName { name, active_only } => {
            let found = service
                .find_by_name(&name, RowFilter::for_active_only(active_only))
                .await?;
            print_json(&found)?;
        }
        Command::Disable { id } => {
            service.disable(id).await?;
            print_json(&json!({ "id": id, "disabled": true }))?;
        }
        Command::Enable { id } => {
            service.enable(id).await?;
            print_json(&json!({ "id": id, "disabled": false }))?;
        }
        Command::Delete { id } => {
            service.delete(id).await?;
            print_json(&json!({ "id": id, "deleted": true }))?;
        }
        Command::Restore { id } => {
            service.restore(id).await?;
            print_json(&json!({ "id": id, "deleted": false }))?;
        }
        Command::BatchDelete { ids } => {
            let affected = service.batch_soft_delete(&ids).await?;
            print_json(&json!({ "requested": ids.len(), "affected": affected }))?;
        }
        Command::BatchDisable { ids } => {
            let affected = service.batch_disable(&ids).await?;
            print_json(&json!({ "requested": ids.len(), "affected": affected }))?;
        }
    }

    Ok(())
}
