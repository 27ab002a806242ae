//! Error handling and exit codes.

use segfit_memory::constants::exit_codes;
use segfit_memory::{ArenaError, ConfigError};

/// Map an application error to a process exit code.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(arena) = err.downcast_ref::<ArenaError>() {
        arena.exit_code()
    } else if let Some(config) = err.downcast_ref::<ConfigError>() {
        config.exit_code()
    } else {
        exit_codes::ERROR_GENERIC
    }
}

/// Map a command-line parse failure to a process exit code.
///
/// `--help` and `--version` come back from clap as errors and exit cleanly.
pub fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        exit_codes::ERROR_CONFIG
    } else {
        exit_codes::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use clap::Parser;

    #[test]
    fn error_codes() {
        assert_eq!(exit_code(&ArenaError::OutOfMemory { size: 15 }.into()), 2);
        assert_eq!(exit_code(&ArenaError::InvalidSize { requested: 9 }.into()), 3);
        assert_eq!(exit_code(&ConfigError::EmptySizeClasses.into()), 4);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }

    #[test]
    fn context_keeps_the_code() {
        let err = anyhow::Error::from(ConfigError::ZeroPayload).context("loading config");
        assert_eq!(exit_code(&err), 4);
    }

    #[test]
    fn usage_errors_are_config_errors() {
        let err = AppConfig::try_parse_from(["segfit", "--size-class", "300"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), exit_codes::ERROR_CONFIG);
        assert_ne!(parse_exit_code(&err), exit_codes::ERROR_OUT_OF_MEMORY);

        let err = AppConfig::try_parse_from(["segfit", "--bogus"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), exit_codes::ERROR_CONFIG);
    }

    #[test]
    fn help_and_version_exit_cleanly() {
        let err = AppConfig::try_parse_from(["segfit", "--help"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), exit_codes::SUCCESS);
        let err = AppConfig::try_parse_from(["segfit", "--version"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), exit_codes::SUCCESS);
    }
}
