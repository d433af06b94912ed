use aire_config::ConfigLoader;
use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod logging;
mod monitor;

use cli::{Args, Command};
use commands::Context;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let loader = ConfigLoader::new(&args.config_dir);

    if let Command::Init = args.command {
        let path = loader.write_default()?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = loader.load()?;
    logging::init(&config.logging);

    loader.validate()?;
    tracing::info!(
        "Starting {} v{} with config dir: {}",
        config.system.name,
        config.system.version,
        args.config_dir.display()
    );

    let registry = loader.load_registry()?;
    let ctx = Context::new(config, registry);

    match args.command {
        Command::Init => {}
        Command::Status => commands::status(&ctx).await?,
        Command::Summary { metric, window } => {
            let selection = ctx.selection(metric, window)?;
            commands::summary(&ctx, &selection).await?;
        }
        Command::Alerts { metric, json } => {
            let selection = ctx.selection(metric, None)?;
            commands::alerts(&ctx, selection.metric, json).await?;
        }
        Command::Export {
            metric,
            window,
            format,
        } => {
            let selection = ctx.selection(metric, window)?;
            commands::export(&ctx, &selection, format).await?;
        }
        Command::Watch {
            metric,
            window,
            ticks,
        } => {
            let selection = ctx.selection(metric, window)?;
            commands::watch(&ctx, selection, ticks).await?;
        }
    }

    Ok(())
}
