use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};

use ttlink::cli::{Cli, Commands};
use ttlink::config::init_config;
use ttlink::interfaces::cli::commands::config_generate;
use ttlink::interfaces::cli::{CliError, run_cli_command};
use ttlink::services::{ExpiryReclaimer, LinkPolicy, LinkService};
use ttlink::storage::StorageFactory;
use ttlink::system::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Shell);

    // 生成配置文件不需要加载配置和连接存储
    let result = match command {
        Commands::ConfigGen { output_path, force } => config_generate(output_path, force),
        command => run(cli.config.as_deref(), command).await,
    };

    if let Err(e) = result {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}

async fn run(config_path: Option<&str>, command: Commands) -> Result<(), CliError> {
    let config = init_config(config_path)
        .map_err(|e| CliError::CommandError(format!("Invalid configuration: {}", e)))?;
    let _guard = init_logging(&config.logging)?;
    debug!("Configuration: {:?}", config);

    let store = StorageFactory::create().await?;
    info!("Using {} storage", store.backend_name());

    let policy = LinkPolicy::from_config(&config.link)?;
    let service = LinkService::new(store.clone(), config.link.short_url_prefix.clone())
        .with_operation_timeout(config.database.operation_timeout());

    // 只有交互模式常驻，才需要后台清理
    let reclaimer = (command == Commands::Shell && config.reclaimer.enabled).then(|| {
        ExpiryReclaimer::new(
            store.clone(),
            Duration::from_secs(config.reclaimer.interval_secs),
        )
        .spawn()
    });

    let result = run_cli_command(&service, &policy, command).await;

    if let Some(handle) = reclaimer {
        handle.shutdown().await;
    }
    result
}
