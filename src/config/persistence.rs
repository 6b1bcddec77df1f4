//! File persistence configuration

/// Configuration for per-instrument user settings
pub struct SettingsPersistenceConfig {
    /// Directory holding the settings file
    pub directory: &'static str,
    /// File name of the JSON settings document
    pub filename: &'static str,
    /// Current version of the settings document format
    pub version: u32,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub settings: SettingsPersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    settings: SettingsPersistenceConfig {
        directory: ".chart_state",
        filename: "chart_settings.json",
        version: 1,
    },
};

/// Default location of the settings document, e.g. `.chart_state/chart_settings.json`
pub fn settings_path() -> std::path::PathBuf {
    std::path::Path::new(PERSISTENCE.settings.directory).join(PERSISTENCE.settings.filename)
}
