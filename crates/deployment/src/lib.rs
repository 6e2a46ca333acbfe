use async_trait::async_trait;
use db::{DBService, DBServiceError};
use services::services::{config::Config, orders::OrderService, report::ReportService};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Database(#[from] DBServiceError),
}

/// Everything a request handler needs, owned in one place.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new(config: Config) -> Result<Self, DeploymentError>;

    fn config(&self) -> &Config;

    fn db(&self) -> &DBService;

    fn orders(&self) -> &OrderService;

    fn reports(&self) -> &ReportService;
}
