//! Tracing setup shared by the binaries.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`debug`,
/// `command_tree_loader=info`, ...).
pub const LOG_ENV: &str = "CMDTREE_LOG";

/// Installs a stderr subscriber filtered by [`LOG_ENV`].
///
/// Logging is off unless the variable is set, so command output on stdout
/// and stderr stays exactly what the command tree produced.
///
/// Returns `false` when a global subscriber was already installed; that
/// subscriber stays in place.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    if subscriber.try_init().is_err() {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_existing_subscriber() {
        init_tracing();
        assert!(!init_tracing());
        tracing::debug!("still routed to the first subscriber");
    }
}
