//! Registry wiring: in-memory by default, Postgres when configured.

use std::sync::Arc;

use grocery_directory::{
    InMemoryNodeRegistry, InMemoryPersonRegistry, NodeRegistry, PersonRegistry, RegistryError, StaffService, seed,
};

use crate::config::ApiConfig;

pub async fn build_services(config: &ApiConfig) -> Result<StaffService, RegistryError> {
    let (nodes, people) = match config.database_url.as_deref() {
        Some(url) => persistent(url).await?,
        None => {
            let nodes: Arc<dyn NodeRegistry> = Arc::new(InMemoryNodeRegistry::new());
            let people: Arc<dyn PersonRegistry> = Arc::new(InMemoryPersonRegistry::new());
            (nodes, people)
        }
    };

    if config.seed {
        seed::seed_demo(nodes.as_ref(), people.as_ref()).await?;
    }

    Ok(StaffService::new(nodes, people).with_timeout(config.storage_timeout))
}

#[cfg(feature = "postgres")]
async fn persistent(url: &str) -> Result<(Arc<dyn NodeRegistry>, Arc<dyn PersonRegistry>), RegistryError> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .map_err(|e| RegistryError::Unavailable(format!("failed to connect to postgres: {e}")))?;

    let directory = Arc::new(grocery_directory::registry::PostgresDirectory::new(pool));
    directory.ensure_schema().await?;
    tracing::info!("using postgres registries");
    let nodes: Arc<dyn NodeRegistry> = directory.clone();
    let people: Arc<dyn PersonRegistry> = directory;
    Ok((nodes, people))
}

#[cfg(not(feature = "postgres"))]
async fn persistent(_url: &str) -> Result<(Arc<dyn NodeRegistry>, Arc<dyn PersonRegistry>), RegistryError> {
    Err(RegistryError::Unavailable(
        "DATABASE_URL is set but this build lacks the `postgres` feature".to_string(),
    ))
}
