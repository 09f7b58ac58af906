//! # repo256 Entry Point
//!
//! Parses the command line, initializes tracing, and either runs the
//! one-shot importer or scans the repository and enters the serving loop
//! on a current-thread runtime.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use repo256_server::{run, Interface};
use repo256_store::{import, Mode, Repository};

/// Content-addressed object repository served over ICN datagrams.
///
/// Objects live under ROOT, addressed by their SHA-256 digest, and are
/// requested with Interest packets carrying either a digest or an exact
/// name, in CCNx-TLV or NDN-TLV encoding.
#[derive(Parser, Debug)]
#[command(name = "repo256", version, about)]
struct Cli {
    /// UDP port to serve on.
    #[arg(short = 'u', long = "udp-port", value_name = "PORT", default_value_t = 7777)]
    udp_port: u16,

    /// UNIX datagram socket path to serve on, in addition to UDP.
    #[arg(short = 'x', long = "unix-socket", value_name = "PATH")]
    unix_socket: Option<PathBuf>,

    /// Operating mode: 'file' re-verifies every hit from disk, 'ndx'
    /// trusts the startup index.
    #[arg(short = 'm', long = "mode", value_enum, default_value_t = ModeArg::Ndx)]
    mode: ModeArg,

    /// Import DIR into the repository and exit.
    #[arg(short = 'i', long = "import", value_name = "DIR")]
    import: Option<PathBuf>,

    /// Log verbosity: fatal, error, warning, info, debug, verbose, trace,
    /// or the corresponding digit.
    #[arg(short = 'v', long = "verbosity", value_name = "LEVEL")]
    verbosity: Option<String>,

    /// Repository root directory.
    #[arg(value_name = "ROOT")]
    root: PathBuf,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    File,
    Ndx,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::File => Mode::File,
            ModeArg::Ndx => Mode::Ndx,
        }
    }
}

/// Map the classic repo level names (and their digits) onto tracing
/// directives.
fn level_directive(level: &str) -> Option<&'static str> {
    const NAMES: [&str; 7] = [
        "fatal", "error", "warning", "info", "debug", "verbose", "trace",
    ];
    let idx = match level.parse::<usize>() {
        Ok(n) => n.min(NAMES.len() - 1),
        Err(_) => NAMES.iter().position(|n| *n == level)?,
    };
    Some(match idx {
        0 | 1 => "error",
        2 => "warn",
        3 => "info",
        4 => "debug",
        _ => "trace",
    })
}

fn init_tracing(verbosity: Option<&str>) -> anyhow::Result<()> {
    let filter = match verbosity {
        Some(level) => {
            let directive = level_directive(level)
                .with_context(|| format!("unknown verbosity level '{level}'"))?;
            EnvFilter::new(directive)
        }
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity.as_deref())?;

    if !cli.root.is_dir() {
        anyhow::bail!(
            "repository root {} is not a directory",
            cli.root.display()
        );
    }

    if let Some(source) = &cli.import {
        let summary = import(&cli.root, source)
            .with_context(|| format!("importing {}", source.display()))?;
        tracing::info!(
            stored = summary.stored,
            linked = summary.linked,
            skipped = summary.skipped,
            "import finished"
        );
        return Ok(());
    }

    // The core is single-threaded cooperative; a current-thread runtime
    // makes that literal.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(cli))
}

async fn serve(cli: Cli) -> anyhow::Result<()> {
    let mut repo = Repository::new(&cli.root, cli.mode.into());
    tracing::info!(root = %cli.root.display(), mode = %repo.mode(), "configuring repo");

    repo.scan()
        .with_context(|| format!("scanning {}", cli.root.display()))?;
    let index = repo.index();
    tracing::info!(
        "loaded {} files ({} with name, {} without name)",
        index.ok_len(),
        index.nm_len(),
        index.ok_len() - index.nm_len()
    );

    let mut interfaces = Vec::new();
    interfaces.push(Interface::udp(cli.udp_port).await?);
    if let Some(path) = &cli.unix_socket {
        interfaces.push(Interface::unix(path)?);
    }

    let (halt_tx, halt_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = halt_tx.send(true);
        }
    });

    run(repo, interfaces, halt_rx).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive_names_and_digits() {
        assert_eq!(level_directive("fatal"), Some("error"));
        assert_eq!(level_directive("warning"), Some("warn"));
        assert_eq!(level_directive("debug"), Some("debug"));
        assert_eq!(level_directive("verbose"), Some("trace"));
        assert_eq!(level_directive("4"), Some("debug"));
        assert_eq!(level_directive("99"), Some("trace"));
        assert_eq!(level_directive("chatty"), None);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["repo256", "/tmp/repo"]);
        assert_eq!(cli.udp_port, 7777);
        assert!(matches!(cli.mode, ModeArg::Ndx));
        assert!(cli.import.is_none());
        assert!(cli.unix_socket.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "repo256", "-u", "9000", "-m", "file", "-x", "/tmp/r.sock", "/data/repo",
        ]);
        assert_eq!(cli.udp_port, 9000);
        assert!(matches!(cli.mode, ModeArg::File));
        assert_eq!(cli.unix_socket.as_deref(), Some(std::path::Path::new("/tmp/r.sock")));
        assert_eq!(cli.root, PathBuf::from("/data/repo"));
    }
}
