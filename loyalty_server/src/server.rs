use log::*;
use loyalty_engine::{
    accrual::HttpAccrualClient,
    pipeline::AccrualPipeline,
    sqlite::db::create_database_if_missing,
    SqliteDatabase,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{config::ServerConfig, errors::ServerError};

/// Opens the database, then runs the accrual pipeline until Ctrl-C is pressed or the pipeline fails.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = prepare_database(&config).await?;
    let client = HttpAccrualClient::new(&config.accrual_system_address, config.accrual_timeout)?;
    let cancel = CancellationToken::new();
    start_shutdown_listener(cancel.clone());
    let result = AccrualPipeline::new(db.clone(), client, config.poll_interval).run(cancel).await;
    db.close().await;
    result?;
    Ok(())
}

async fn prepare_database(config: &ServerConfig) -> Result<SqliteDatabase, ServerError> {
    create_database_if_missing(&config.database_url)
        .await
        .map_err(|e| ServerError::InitializeError(format!("Could not create {}. {e}", config.database_url)))?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.skip_migrations {
        info!("🗃️ Skipping database migrations");
    } else {
        db.run_migrations().await?;
    }
    Ok(db)
}

/// Cancels `cancel` on Ctrl-C.
fn start_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("🛑️ Ctrl-C received. Shutting down");
                cancel.cancel();
            },
            Err(e) => error!("🛑️ Could not listen for Ctrl-C. The server can only be stopped by killing it. {e}"),
        }
    });
}
