pub mod cli;
pub mod error;
pub mod routes;
pub mod templates;

pub type DeploymentImpl = local_deployment::LocalDeployment;
