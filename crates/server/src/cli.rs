use std::path::PathBuf;

use clap::{Parser, Subcommand};
use services::services::config::{
    Config, DEFAULT_DATABASE_PATH, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REPORT_PATH,
};

/// Order management for the painting studio.
#[derive(Debug, Parser)]
#[command(name = "server", version)]
pub struct Cli {
    /// SQLite file holding the `pedidos` table; created when missing.
    #[arg(long, env = "PEDIDOS_DB_PATH", default_value = DEFAULT_DATABASE_PATH, global = true)]
    pub database: PathBuf,

    /// Where the PDF report is written. Overwritten on every export.
    #[arg(long, env = "PEDIDOS_REPORT_PATH", default_value = DEFAULT_REPORT_PATH, global = true)]
    pub report: PathBuf,

    #[arg(long, env = "HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the order form (default).
    Serve,
    /// Print every stored order.
    List,
    /// Write the PDF report and exit.
    Report,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    pub fn config(&self) -> Config {
        Config {
            database_path: self.database.clone(),
            report_path: self.report.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::try_parse_from(["server", "--database", "a.db", "--report", "r.pdf", "--port", "9000"]).unwrap();
        assert_eq!(cli.command(), Command::Serve);
        let config = cli.config();
        assert_eq!(config.database_path, PathBuf::from("a.db"));
        assert_eq!(config.report_path, PathBuf::from("r.pdf"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn subcommands_accept_global_flags() {
        let cli = Cli::try_parse_from(["server", "report", "--report", "out.pdf"]).unwrap();
        assert_eq!(cli.command(), Command::Report);
        assert_eq!(cli.config().report_path, PathBuf::from("out.pdf"));
    }
}
