//! github-subs
//!
//! Prints every subdomain of the target domain found in code search results,
//! one per line on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use github_subs::config::Args;
use github_subs::Discovery;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,github_subs=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let settings = args.into_settings()?;
    let discovery = Discovery::with_http(settings.token, settings.discovery, settings.timeout)?;

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(print_names(rx, io::stdout()));

    let report = discovery.run(&settings.domain, tx).await?;
    tracing::debug!(?report, "Run complete");

    match printer.await.context("Output task failed")? {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
            Err(e).context("Failed to write output")
        }
        _ => Ok(()),
    }
}

/// Write each name on its own line until the channel closes or a write fails.
///
/// Returning drops the receiver, which tells the run to stop.
async fn print_names<W: Write>(
    mut names: mpsc::UnboundedReceiver<String>,
    mut out: W,
) -> io::Result<()> {
    while let Some(name) = names.recv().await {
        writeln!(out, "{}", name)?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_print_names_one_per_line() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("api.example.com".to_string()).unwrap();
        tx.send("www.example.com".to_string()).unwrap();
        drop(tx);

        let mut out = Vec::new();
        print_names(rx, &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "api.example.com\nwww.example.com\n");
    }

    #[tokio::test]
    async fn test_print_names_stops_on_write_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("api.example.com".to_string()).unwrap();

        let err = print_names(rx, ClosedPipe).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(tx.is_closed());
    }
}
