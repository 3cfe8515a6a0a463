use std::sync::{Arc, OnceLock};

use super::StaticConfig;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Panics if [`init_config`] has not been called. Storage and service
/// constructors take their settings explicitly; only the binary's wiring
/// reads the global.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .cloned()
        .expect("Config not initialized. Call init_config() first.")
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (default "config.toml") and `TL__*`
/// environment variables. Only the first successful call has an effect.
///
/// # Examples
/// ```no_run
/// use ttlink::config::init_config;
/// init_config(None).expect("invalid configuration");
/// ```
pub fn init_config(path: Option<&str>) -> Result<Arc<StaticConfig>, config::ConfigError> {
    if let Some(existing) = CONFIG.get() {
        return Ok(existing.clone());
    }
    let loaded = Arc::new(StaticConfig::load(path)?);
    Ok(CONFIG.get_or_init(|| loaded).clone())
}
