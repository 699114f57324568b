//! Logging setup
//!
//! Logs go to stderr so stdout stays free for workflow commands and
//! command output. `RUST_LOG` overrides the level chosen from flags.

use std::path::Path;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use workflow_gate::{ConfigOverrides, DebugLevel, YamlConfig};

/// Debug level in effect before the full configuration is loaded.
///
/// Layers that fail to load are skipped here; configuration loading reports
/// them properly later.
pub fn early_debug_level(cli_debug: Option<DebugLevel>, config_file: Option<&Path>) -> DebugLevel {
    let env = ConfigOverrides::from_env().ok().and_then(|env| env.debug);
    let file = YamlConfig::load_or_default(config_file)
        .ok()
        .and_then(|yaml| yaml.into_overrides().debug);

    cli_debug.or(env).or(file).unwrap_or_default()
}

/// Map flags to a maximum log level
pub fn log_level(quiet: bool, debug: DebugLevel) -> Level {
    if quiet {
        Level::ERROR
    } else {
        match debug {
            DebugLevel::Off => Level::INFO,
            DebugLevel::On => Level::DEBUG,
            DebugLevel::Verbose => Level::TRACE,
        }
    }
}

/// Filter applied when `RUST_LOG` is unset.
///
/// Dependencies stay at WARN so verbose mode shows our own tracing without
/// the HTTP stack's.
pub fn default_filter(level: Level) -> String {
    let dependencies = if level == Level::ERROR { "error" } else { "warn" };
    let level = level.to_string().to_lowercase();
    format!("{dependencies},workflow_gate={level},workflow_gate_cli={level}")
}

/// Install the global subscriber
pub fn init(quiet: bool, debug: DebugLevel) {
    let level = log_level(quiet, debug);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level(false, DebugLevel::Off), Level::INFO);
        assert_eq!(log_level(false, DebugLevel::On), Level::DEBUG);
        assert_eq!(log_level(false, DebugLevel::Verbose), Level::TRACE);
        assert_eq!(log_level(true, DebugLevel::Verbose), Level::ERROR);
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(
            default_filter(Level::DEBUG),
            "warn,workflow_gate=debug,workflow_gate_cli=debug"
        );
        assert_eq!(
            default_filter(Level::ERROR),
            "error,workflow_gate=error,workflow_gate_cli=error"
        );
    }

    #[test]
    #[serial]
    fn test_early_debug_level_precedence() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("gate.yaml");
        std::fs::write(&config, "debug: verbose\n").unwrap();

        env::remove_var("INPUT_DEBUG");
        assert_eq!(
            early_debug_level(None, Some(&config)),
            DebugLevel::Verbose
        );

        env::set_var("INPUT_DEBUG", "on");
        assert_eq!(early_debug_level(None, Some(&config)), DebugLevel::On);
        assert_eq!(
            early_debug_level(Some(DebugLevel::Off), Some(&config)),
            DebugLevel::Off
        );
        env::remove_var("INPUT_DEBUG");
    }
}
