use aire_core::ThresholdRegistry;
use anyhow::{anyhow, Result};
use config::{Config, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::thresholds::build_registry;
use crate::GlobalConfig;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "aire.toml";

/// 配置加载器
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// 加载全局配置
    pub fn load(&self) -> Result<GlobalConfig> {
        let config_path = self.config_path();

        if !config_path.exists() {
            // 如果配置文件不存在，返回默认配置
            debug!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(GlobalConfig::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 加载配置并构建阈值注册表
    pub fn load_registry(&self) -> Result<ThresholdRegistry> {
        let global = self.load()?;
        Ok(build_registry(&global.thresholds)?)
    }

    /// 写出默认配置文件，已存在时不覆盖
    pub fn write_default(&self) -> Result<PathBuf> {
        let config_path = self.config_path();
        if config_path.exists() {
            return Err(anyhow!(
                "Config file already exists: {}",
                config_path.display()
            ));
        }

        std::fs::create_dir_all(&self.config_dir)?;
        let content = toml::to_string_pretty(&GlobalConfig::default())?;
        std::fs::write(&config_path, content)?;

        info!(path = %config_path.display(), "Default config written");
        Ok(config_path)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        let global = self.load()?;

        if global.monitor.refresh_interval_secs == 0 {
            return Err(anyhow!("refresh_interval_secs must be greater than 0"));
        }

        let confidence = global.alerts.medium_confidence_min;
        if !(0.0..=100.0).contains(&confidence) {
            return Err(anyhow!(
                "medium_confidence_min ({}) must be within 0-100",
                confidence
            ));
        }

        if global.export.rows_per_page == 0 {
            return Err(anyhow!("rows_per_page must be greater than 0"));
        }

        global.monitor.selection()?;
        build_registry(&global.thresholds)?;

        Ok(())
    }
}
