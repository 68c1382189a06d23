//! [`Args`] definitions.

use std::time::Duration;

use clap::{Parser, Subcommand};
use humantime_serde::re::humantime;
use uuid::Uuid;

/// Server of the society maintenance billing.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// [`Cmd`] to run instead of the server.
    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// One-off command.
#[derive(Clone, Copy, Debug, Subcommand)]
pub enum Cmd {
    /// Issues an access token and prints it to stdout.
    ///
    /// The token grants the administration access, unless a member is
    /// specified.
    IssueToken {
        /// ID of the member to issue a resident token for.
        #[arg(short, long)]
        member: Option<Uuid>,

        /// Time the token stays valid for.
        #[arg(
            short,
            long,
            default_value = "30days",
            value_parser = humantime::parse_duration,
        )]
        ttl: Duration,
    },
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use clap::Parser as _;

    use super::{Args, Cmd};

    #[test]
    fn parses_issue_token() {
        let args = Args::try_parse_from([
            "application",
            "--config",
            "billing.toml",
            "issue-token",
            "--ttl",
            "1h",
        ])
        .unwrap();

        assert_eq!(args.config, "billing.toml");
        assert!(matches!(
            args.cmd,
            Some(Cmd::IssueToken { member: None, ttl })
                if ttl == Duration::from_secs(3600),
        ));
    }

    #[test]
    fn runs_server_by_default() {
        let args = Args::try_parse_from(["application"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(args.cmd.is_none());
    }
}
