// ==========================================
// 多渠道补货计划系统 - 应用设置
// ==========================================
// 职责: 上次使用的参数 / 品类规则 / 默认路径（JSON 持久化）
// 位置: <config dir>/inventory-planner/settings.json
//       INVENTORY_PLANNER_SETTINGS 环境变量可覆盖
// ==========================================

use crate::config::planning_params::PlanningParams;
use crate::domain::product::CategoryRule;
use crate::engine::error::PlanningResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("设置文件读取失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("设置文件格式错误 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("设置文件写入失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("设置序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 天数默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningDefaults {
    #[serde(default = "default_sales_period")]
    pub sales_period_days: i64,
    #[serde(default = "default_purchase_period")]
    pub purchase_period_days: i64,
    #[serde(default = "default_lead_time")]
    pub lead_time_days: i64,
    #[serde(default = "default_safety_stock")]
    pub safety_stock_days: i64,
}

fn default_sales_period() -> i64 {
    30
}

fn default_purchase_period() -> i64 {
    15
}

fn default_lead_time() -> i64 {
    10
}

fn default_safety_stock() -> i64 {
    7
}

impl Default for PlanningDefaults {
    fn default() -> Self {
        Self {
            sales_period_days: default_sales_period(),
            purchase_period_days: default_purchase_period(),
            lead_time_days: default_lead_time(),
            safety_stock_days: default_safety_stock(),
        }
    }
}

/// 应用设置（持久化对象）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub defaults: PlanningDefaults,

    /// 品类前缀规则（按顺序匹配）
    #[serde(default)]
    pub category_rules: Vec<CategoryRule>,

    #[serde(default)]
    pub master_catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub multiplier_table_path: Option<PathBuf>,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl AppSettings {
    /// 默认设置文件路径
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("INVENTORY_PLANNER_SETTINGS") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        dirs::config_dir()
            .map(|dir| dir.join("inventory-planner"))
            .unwrap_or_else(|| PathBuf::from("./config"))
            .join("settings.json")
    }

    /// 读取设置文件；文件不存在时返回默认设置
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "设置文件不存在，使用默认设置");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let settings = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        info!(path = %path.display(), "设置已加载");
        Ok(settings)
    }

    /// 保存设置（自动创建上级目录）
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(write_err)?;

        info!(path = %path.display(), "设置已保存");
        Ok(())
    }

    /// 记住本次运行参数，作为下次默认值
    pub fn remember(&mut self, params: &PlanningParams) {
        self.defaults = PlanningDefaults {
            sales_period_days: i64::from(params.sales_window_days),
            purchase_period_days: i64::from(params.purchase_window_days),
            lead_time_days: i64::from(params.lead_time_days),
            safety_stock_days: i64::from(params.safety_stock_days),
        };
    }

    /// 以默认值构造已校验参数
    pub fn to_params(&self) -> PlanningResult<PlanningParams> {
        PlanningParams::new(
            self.defaults.sales_period_days,
            self.defaults.purchase_period_days,
            self.defaults.lead_time_days,
            Some(self.defaults.safety_stock_days),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = AppSettings::load_or_default(&dir.path().join("none.json")).unwrap();

        assert_eq!(settings, AppSettings::default());
        let params = settings.to_params().unwrap();
        assert_eq!(params.sales_window_days, 30);
        assert_eq!(params.purchase_window_days, 15);
        assert_eq!(params.lead_time_days, 10);
        assert_eq!(params.safety_stock_days, 7);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"defaults": {"sales_period_days": 60},
                "category_rules": [{"prefix": "WID", "category": "TOOL"}]}"#,
        )
        .unwrap();

        let settings = AppSettings::load_or_default(&path).unwrap();

        assert_eq!(settings.defaults.sales_period_days, 60);
        assert_eq!(settings.defaults.safety_stock_days, 7);
        assert_eq!(settings.category_rules, vec![CategoryRule::new("WID", "TOOL")]);
        assert!(settings.master_catalog_path.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            AppSettings::load_or_default(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_remember_and_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::default();
        settings.remember(&PlanningParams::new(10, 15, 5, Some(2)).unwrap());
        settings.output_dir = Some(dir.path().to_path_buf());
        settings.save(&path).unwrap();

        let loaded = AppSettings::load_or_default(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.defaults.lead_time_days, 5);
    }

    #[test]
    fn test_negative_defaults_rejected() {
        let mut settings = AppSettings::default();
        settings.defaults.lead_time_days = -1;
        assert!(settings.to_params().is_err());
    }
}
