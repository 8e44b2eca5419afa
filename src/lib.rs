pub mod drafts;
pub mod error;
pub mod gemini;
pub mod leads;
pub mod notification;
pub mod services;
pub mod state;
pub mod supabase;
pub mod types;
pub mod util;

#[cfg(test)]
mod test_support;

use state::AppState;

/// Load config, sync the lead mirror once, and return the wired state.
///
/// A failed sync is not fatal: the store raises its toast and the state is
/// returned with whatever collection it holds.
pub async fn start() -> Result<AppState, String> {
    let config = state::load_config()?;
    let state = AppState::from_config(config).map_err(|e| e.to_string())?;

    if let Err(e) = state.store.refresh().await {
        log::warn!("Initial lead sync failed: {}", e);
    }

    Ok(state)
}
