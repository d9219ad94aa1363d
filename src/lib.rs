pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod services;
pub mod state;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use db::Store;

/// Load the config named on the command line, or search the default locations.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from_path(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    init_tracing(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => cmd_migrate(&config).await,
        Commands::InitConfig => {
            let path = cli.config.unwrap_or_else(Config::default_config_path);
            if Config::create_default_if_missing(&path)? {
                println!("Created {}", path.display());
            } else {
                println!("{} already exists", path.display());
            }
            Ok(())
        }
        Commands::AddAvatar { url } => cmd_add_avatar(&config, &url).await,
        Commands::SetRole { user_id, role_id } => cmd_set_role(&config, user_id, role_id).await,
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "parking-alert")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Parking alert v{} starting...", env!("CARGO_PKG_VERSION"));

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let port = config.server.port;
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web server running at http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
}

async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    store.ping().await?;
    println!("Migrations applied to {}", config.general.database_path);
    Ok(())
}

async fn cmd_add_avatar(config: &Config, url: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let id = store.add_image(url).await?;
    if id > config.accounts.avatar_pool_size {
        println!(
            "Added image {id}; outside the avatar pool (1..={}), signup will not pick it",
            config.accounts.avatar_pool_size
        );
    } else {
        println!("Added avatar image {id}");
    }
    Ok(())
}

async fn cmd_set_role(config: &Config, user_id: i32, role_id: i32) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    if store.get_role(role_id).await?.is_none() {
        let available = store
            .list_roles()
            .await?
            .into_iter()
            .map(|role| format!("{} ({})", role.id, role.name))
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::bail!("Role {role_id} does not exist; available roles: {available}");
    }

    if store.set_user_role(user_id, role_id).await? {
        println!("User {user_id} now has role {role_id}");
        Ok(())
    } else {
        anyhow::bail!("User {user_id} not found")
    }
}
