use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "encomendas.db";
pub const DEFAULT_REPORT_PATH: &str = "relatorio_pedidos.pdf";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;

/// Runtime settings resolved from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    /// Fixed output file; every generation overwrites it.
    pub report_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}
