use clap::Parser;
use parking_alert::cli::{Cli, Commands};
use parking_alert::{Config, load_config, run};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = if cli.command == Some(Commands::InitConfig) {
        Config::default()
    } else {
        load_config(&cli)?
    };
    let worker_threads = config.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    let runtime = builder.build()?;
    runtime.block_on(run(cli, config))
}
