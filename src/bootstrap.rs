use anyhow::Context;

use crate::state::AppState;

/// Connects to the record store and creates any missing sheet. A failure is
/// returned to the caller, which keeps serving from the fallback tiers.
pub async fn initialize_record_store(state: &AppState) -> anyhow::Result<()> {
    let created = state
        .store
        .ensure_schema()
        .await
        .context("Failed to initialize record store")?;

    if created.is_empty() {
        tracing::info!("Record store schema is up to date");
    } else {
        tracing::info!("Created record store sheets: {}", created.join(", "));
    }
    Ok(())
}
