use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use mirror_sync::{
    audio::transcode::FlacLameTranscoder,
    cli::commands::{Cli, Commands, SyncArgs},
    diff,
    utils::reporting::{reporter_for, PlanReport},
    ActionSet, Canonicalizer, Config, Result, Scanner, Synchronizer,
};

fn load_config(cli_config: Option<&std::path::Path>, args: &SyncArgs) -> Result<Config> {
    let mut config = match cli_config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn compare(config: &Config) -> Result<ActionSet> {
    let scanner = Scanner::new(&config.ignore_dirs);
    let source = scanner.scan(&config.source)?;
    let target = scanner.scan(&config.target)?;
    if !config.silent {
        info!(
            "Source: {} audio, {} other files; target: {} audio, {} other files",
            source.audio.len(),
            source.other.len(),
            target.audio.len(),
            target.other.len()
        );
    }
    Ok(diff(&source, &target))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync { args } => {
            let config = load_config(cli.config.as_deref(), &args)?;
            let canonicalizer = Canonicalizer::from_config(&config)?;
            let transcoder = FlacLameTranscoder::from_config(&config);
            let reporter = reporter_for(config.silent);

            let actions = compare(&config)?;
            if actions.is_empty() {
                if !config.silent {
                    info!("Target is up to date");
                }
                return Ok(());
            }

            let summary = Synchronizer::new(
                &config.source,
                &config.target,
                &canonicalizer,
                &transcoder,
                reporter.as_ref(),
            )
            .apply(&actions)?;
            if !config.silent {
                summary.log();
            }
        }

        Commands::Plan { args, output } => {
            let config = load_config(cli.config.as_deref(), &args)?;
            Canonicalizer::from_config(&config)?;

            let actions = compare(&config)?;
            if !config.silent {
                for (kind, key) in actions.planned() {
                    info!("{:<6} {}", kind.as_str(), key);
                }
                info!("{} planned actions", actions.len());
            }
            if let Some(output) = output {
                let rows = PlanReport::new().generate(&actions, &output)?;
                if !config.silent {
                    info!("Plan of {rows} steps written to {}", output.display());
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
