// ==========================================
// 多渠道补货计划系统 - 引擎层错误类型
// ==========================================
// InvalidConfiguration: 中止整个运行（在任何计算之前）
// UnresolvedSku: 行级，记录后丢弃该行
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("配置无效: {0}")]
    InvalidConfiguration(String),

    #[error("无法解析 SKU: '{raw_sku}' 归一化后为空")]
    UnresolvedSku { raw_sku: String },

    #[error("没有可用的销售数据: {0}")]
    NoSalesData(String),
}

impl PlanningError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        PlanningError::InvalidConfiguration(message.into())
    }

    /// 主数据/倍率表加载失败一律视为配置错误
    pub fn from_config_import(what: &str, err: ImportError) -> Self {
        PlanningError::InvalidConfiguration(format!("{}加载失败: {}", what, err))
    }
}

pub type PlanningResult<T> = Result<T, PlanningError>;
