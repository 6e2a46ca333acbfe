use anyhow::Context;
use clap::Parser;
use deployment::Deployment;
use server::{
    DeploymentImpl,
    cli::{Cli, Command},
    routes,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init_tracing();

    let cli = Cli::parse();
    let deployment = DeploymentImpl::new(cli.config())
        .await
        .context("failed to open the order database")?;

    match cli.command() {
        Command::Serve => serve(deployment).await,
        Command::List => list_orders(&deployment).await,
        Command::Report => write_report(&deployment).await,
    }
}

async fn serve(deployment: DeploymentImpl) -> anyhow::Result<()> {
    let address = deployment.config().bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, routes::router(deployment))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

async fn list_orders(deployment: &DeploymentImpl) -> anyhow::Result<()> {
    let orders = deployment.orders().list().await?;
    for order in &orders {
        println!(
            "{:>5}  {:<30}  {:<15}  {:<12}  {:<13}  pedido {}  entrega {}  {}",
            order.id,
            order.client,
            order.theme,
            order.frame_option,
            order.size,
            order.order_date,
            order.delivery_date,
            order.payment_method
        );
    }
    println!("{} pedido(s)", orders.len());
    Ok(())
}

async fn write_report(deployment: &DeploymentImpl) -> anyhow::Result<()> {
    let report = deployment.reports().generate().await?;
    println!(
        "Relatório gerado em {} ({} pedido(s), {} página(s))",
        report.summary.path.display(),
        report.summary.order_count,
        report.summary.page_count
    );
    Ok(())
}
