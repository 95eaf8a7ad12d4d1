//! Configuration for budget-backoffice
//!
//! CLI arguments with environment fallbacks; `.env` is loaded by `main`
//! before parsing.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::auth::jwt::DEFAULT_EXPIRY_SECONDS;
use crate::auth::JwtValidator;
use crate::error::Result;
use crate::logging::AuditConfig;

/// Budgeting back-office API server
#[derive(Parser, Debug, Clone)]
#[command(name = "budget-backoffice")]
#[command(about = "Budget, cap, detail and fund-request CRUD API")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "budget.db")]
    pub database_path: PathBuf,

    /// JWT secret for token signing (required unless dev mode)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value_t = DEFAULT_EXPIRY_SECONDS)]
    pub jwt_expiry_seconds: u64,

    /// Development mode: a built-in JWT secret is used when none is given
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Audit log directory
    #[arg(long, env = "LOG_DIR", default_value = "./log")]
    pub log_dir: PathBuf,

    /// Audit log file prefix
    #[arg(long, env = "LOG_PREFIX", default_value = "log")]
    pub log_prefix: String,

    /// Echo audit lines to the console
    #[arg(long, env = "LOG_CONSOLE", default_value_t = true, action = ArgAction::Set)]
    pub log_console: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a login, or reset its password
    AddUser {
        #[arg(long)]
        userid: String,
        #[arg(long)]
        password: String,
    },
}

impl Args {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.dev_mode {
            match self.jwt_secret.as_deref() {
                None | Some("") => return Err("JWT_SECRET is required unless DEV_MODE is set".to_string()),
                Some(secret) if secret.len() < 32 => {
                    return Err("JWT_SECRET must be at least 32 characters".to_string())
                }
                Some(_) => {}
            }
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Token validator for the configured secret; dev mode without a secret
    /// falls back to the built-in one
    pub fn jwt_validator(&self) -> Result<JwtValidator> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) if !secret.is_empty() => {
                JwtValidator::new(secret.clone(), self.jwt_expiry_seconds)
            }
            (_, true) => Ok(JwtValidator::new_dev()),
            _ => JwtValidator::new(String::new(), self.jwt_expiry_seconds),
        }
    }

    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            dir: self.log_dir.clone(),
            prefix: self.log_prefix.clone(),
            console: self.log_console,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("budget-backoffice").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn secret_required_outside_dev_mode() {
        let args = parse(&["--jwt-secret", "short"]);
        assert!(args.validate().is_err());

        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        assert!(args.jwt_validator().is_ok());

        let args = parse(&["--jwt-secret", "0123456789abcdef0123456789abcdef"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn add_user_subcommand() {
        let args = parse(&["--dev-mode", "add-user", "--userid", "finance", "--password", "pw"]);
        match args.command {
            Some(Command::AddUser { userid, password }) => {
                assert_eq!(userid, "finance");
                assert_eq!(password, "pw");
            }
            None => panic!("expected add-user"),
        }
    }

    #[test]
    fn console_echo_can_be_disabled() {
        let args = parse(&["--dev-mode", "--log-console", "false"]);
        assert!(!args.log_console);
        assert_eq!(args.audit_config().prefix, "log");
    }
}
