mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use mise_core::{AppConfig, Application};

use crate::cli::CliArgs;

fn load_config(args: &CliArgs) -> Result<AppConfig, mise_core::KernelError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    // Flags win over the file
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(source) = &args.plugins {
        config.plugins.source = source.clone();
    }
    if let Some(api) = &args.api {
        config.api.base_url = api.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut app = match Application::new(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize application: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = app.run().await {
        eprintln!("Failed to start application: {}", e);
        return ExitCode::FAILURE;
    }

    let outcome = match args.command {
        Some(command) => cli::execute(&app, command).await,
        None => {
            println!("{}", cli::summary(&app));
            Ok(())
        }
    };

    info!("Shutting down application...");
    if let Err(e) = app.shutdown().await {
        error!("Shutdown failed: {}", e);
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
