use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{config::Config, orders::OrderService, report::ReportService};
use tracing::info;

/// Single-operator deployment backed by a local SQLite file.
#[derive(Clone)]
pub struct LocalDeployment {
    config: Config,
    db: DBService,
    orders: OrderService,
    reports: ReportService,
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new(config: Config) -> Result<Self, DeploymentError> {
        let db = DBService::new(&config.database_path).await?;
        let orders = OrderService::new(db.pool.clone());
        let reports = ReportService::new(db.pool.clone(), config.report_path.clone());

        info!(
            database = %config.database_path.display(),
            report = %config.report_path.display(),
            "Local deployment initialized"
        );

        Ok(Self {
            config,
            db,
            orders,
            reports,
        })
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn orders(&self) -> &OrderService {
        &self.orders
    }

    fn reports(&self) -> &ReportService {
        &self.reports
    }
}
