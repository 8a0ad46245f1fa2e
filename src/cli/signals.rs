//! Shutdown signal handling for the recording loop

use colored::Colorize;
use tokio::sync::mpsc;

/// Why the recording loop is asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

/// Listens for OS shutdown signals and forwards them over a channel.
///
/// A signal stops the recording the same way the `s` command does, so the
/// file is finalized instead of left truncated.
pub struct ShutdownSignal {
    receiver: mpsc::Receiver<ShutdownReason>,
}

impl ShutdownSignal {
    /// Install handlers for SIGINT and SIGTERM (Ctrl+C elsewhere)
    #[cfg(unix)]
    pub fn install() -> Result<Self, std::io::Error> {
        use tokio::signal::unix::{signal, SignalKind};

        let (tx, rx) = mpsc::channel(4);

        let tx_int = tx.clone();
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            while sigint.recv().await.is_some() {
                if tx_int.send(ShutdownReason::Interrupt).await.is_err() {
                    break;
                }
            }
        });

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            while sigterm.recv().await.is_some() {
                if tx.send(ShutdownReason::Terminate).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self { receiver: rx })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if tx.send(ShutdownReason::Interrupt).await.is_err() {
                    break;
                }
            }
        });
        Ok(Self { receiver: rx })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<ShutdownReason> {
        let reason = self.receiver.recv().await?;
        let name = match reason {
            ShutdownReason::Interrupt => "SIGINT",
            ShutdownReason::Terminate => "SIGTERM",
        };
        tracing::debug!(signal = name, "shutdown requested");
        eprintln!();
        eprintln!("{} Received {} (stopping)", "↓".cyan(), name);
        Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_distinct() {
        assert_eq!(ShutdownReason::Interrupt, ShutdownReason::Interrupt);
        assert_ne!(ShutdownReason::Interrupt, ShutdownReason::Terminate);
    }

    #[tokio::test]
    async fn install_succeeds_inside_runtime() {
        assert!(ShutdownSignal::install().is_ok());
    }
}
