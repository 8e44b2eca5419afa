use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RemoteError;
use crate::leads::{filter_leads, LeadStore};
use crate::notification::ToastCenter;
use crate::supabase::{LeadGateway, SupabaseClient};
use crate::types::{Config, Lead};

/// Application state owned by the shell and passed by reference.
///
/// All writes to the lead collection go through `store`.
pub struct AppState {
    pub config: RwLock<Config>,
    pub store: LeadStore,
    pub toasts: Arc<ToastCenter>,
    search_term: RwLock<String>,
}

impl AppState {
    pub fn new(config: Config, gateway: Arc<dyn LeadGateway>) -> Self {
        let toasts = Arc::new(ToastCenter::new());
        Self {
            config: RwLock::new(config),
            store: LeadStore::new(gateway, toasts.clone()),
            toasts,
            search_term: RwLock::new(String::new()),
        }
    }

    /// Wire the Supabase gateway from config.
    pub fn from_config(config: Config) -> Result<Self, RemoteError> {
        let gateway = SupabaseClient::new(&config.supabase)?;
        Ok(Self::new(config, Arc::new(gateway)))
    }

    pub fn search_term(&self) -> String {
        self.search_term.read().clone()
    }

    pub fn set_search_term(&self, term: &str) {
        *self.search_term.write() = term.to_string();
    }

    /// Current collection narrowed by the search term.
    pub fn filtered_leads(&self) -> Vec<Lead> {
        let term = self.search_term();
        self.store
            .with_leads(|leads| filter_leads(leads, &term).into_iter().cloned().collect())
    }

    /// Outreach draft for a loaded lead. `None` if the lead is not loaded.
    pub async fn draft_for(&self, lead_id: &str, campaign_context: Option<&str>) -> Option<String> {
        let lead = self.store.get(lead_id)?;
        let (gemini, default_context) = {
            let config = self.config.read();
            (config.gemini.clone(), config.default_campaign_context.clone())
        };
        let context = campaign_context
            .map(str::to_string)
            .or(default_context)
            .unwrap_or_default();
        Some(crate::drafts::draft_with_config(&gemini, &lead, &context).await)
    }
}

/// Get the canonical config file path (~/.vortex/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".vortex").join("config.json"))
}

/// Load configuration from ~/.vortex/config.json, then apply env overrides.
///
/// A missing file is not an error: defaults plus environment are used.
pub fn load_config() -> Result<Config, String> {
    let path = config_path()?;
    let mut config = load_config_from(&path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

pub fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Environment wins over the file: `SUPABASE_URL`, `SUPABASE_ANON_KEY`,
/// `GEMINI_API_KEY` (or `API_KEY`).
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("SUPABASE_URL") {
        config.supabase.url = url;
    }
    if let Some(key) = non_empty("SUPABASE_ANON_KEY") {
        config.supabase.anon_key = Some(key);
    }
    if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
        config.gemini.api_key = Some(key);
    }
}

/// Write config as pretty JSON, creating the parent directory if needed.
pub fn save_config(path: &Path, config: &Config) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))
}
