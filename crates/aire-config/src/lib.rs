pub mod global;
pub mod loader;
pub mod thresholds;

pub use global::{
    AlertsConfig, ExportConfig, GlobalConfig, LoggingConfig, MonitorConfig, SystemConfig,
};
pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use thresholds::BandConfig;
