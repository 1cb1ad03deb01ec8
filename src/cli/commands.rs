use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "mirror-sync")]
#[command(version)]
#[command(about = "Keep an mp3-only mirror in sync with a flac + mp3 collection", long_about = None)]
pub struct Cli {
    /// TOML config file; flags given on the command line win
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bring the target tree in line with the source tree
    Sync {
        #[command(flatten)]
        args: SyncArgs,
    },

    /// Show what a sync would do without touching anything
    Plan {
        #[command(flatten)]
        args: SyncArgs,

        /// Also write the plan as CSV
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Source tree (flac, mp3 and other files)
    #[arg(short = 's', long)]
    pub source: Option<PathBuf>,

    /// Target tree (mp3 only)
    #[arg(short = 't', long)]
    pub target: Option<PathBuf>,

    /// Directory name to skip at any depth (repeatable)
    #[arg(short = 'i', long = "ignore")]
    pub ignore: Vec<String>,

    /// LAME quality preset, e.g. V2
    #[arg(short = 'q', long)]
    pub quality: Option<String>,

    /// Print nothing but errors and warnings
    #[arg(long)]
    pub silent: bool,
}

impl SyncArgs {
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        config.ignore_dirs.extend(self.ignore.iter().cloned());
        if let Some(quality) = &self.quality {
            config.quality = quality.clone();
        }
        config.silent |= self.silent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "mirror-sync", "plan", "-s", "/music", "-t", "/phone", "-i", "podcasts", "--silent",
        ]);
        let Commands::Plan { args, output } = cli.command else {
            panic!("expected plan");
        };
        assert!(output.is_none());

        let mut config = Config {
            ignore_dirs: vec!["scans".to_string()],
            ..Config::default()
        };
        args.apply_to(&mut config);

        assert_eq!(config.source, PathBuf::from("/music"));
        assert_eq!(config.target, PathBuf::from("/phone"));
        assert_eq!(config.ignore_dirs, vec!["scans".to_string(), "podcasts".to_string()]);
        assert_eq!(config.quality, "V2");
        assert!(config.silent);
    }
}
