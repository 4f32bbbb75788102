// ==========================================
// 多渠道补货计划系统 - 采购计划领域模型
// ==========================================
// 用途: 聚合器 / 预测引擎输出，报表层只读
// ==========================================

use crate::domain::types::Channel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 未在主数据中找到的 SKU 的品类
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

// ==========================================
// NormalizedDemand - 基础件需求
// ==========================================
// 红线: Σ base_units == Σ (units_sold × 解析倍率)，仅统计主数据命中的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDemand {
    pub base_sku: String,
    pub base_units: u64,
    pub category: String,
    pub supplier: Option<String>,
    pub listing_count: usize, // 贡献该基础 SKU 的渠道 SKU 数
}

// ==========================================
// PurchasePlanRow - 采购建议行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasePlanRow {
    pub sku: String,
    pub category: String,
    pub total_units_sold_in_window: u64,
    pub average_daily_sales: f64,
    pub recommended_purchase_qty: u64,
    pub listing_count: usize,
    pub supplier: Option<String>,
}

// ==========================================
// OrphanSku - 主数据缺失 SKU
// ==========================================
// 不参与采购测算，仅供人工补录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanSku {
    pub raw_sku: String,
    pub base_sku: String,
    pub channels: Vec<Channel>, // 去重后按渠道排序
    pub units_sold: u64,
    pub base_units: u64, // 倍率缺省为 1
    pub category: String,
}

// ==========================================
// RejectedFile - 被拒绝的输入文件
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedFile {
    pub source: String,
    pub channel: Channel,
    pub reason: String,
}

// ==========================================
// RunWarning - 运行级告警
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunWarning {
    /// 倍率表与后缀识别结果不一致（倍率表生效）
    MultiplierConflict {
        raw_sku: String,
        pattern_multiplier: u32,
        table_multiplier: u32,
    },
    /// 归一化后基础 SKU 为空，行被丢弃
    UnresolvedSku {
        channel: Channel,
        row_number: usize,
        raw_sku: String,
    },
    /// 同一订单行重复出现（数量与日期一致），只计一次
    DuplicateRow {
        channel: Channel,
        row_number: usize,
        order_id: String,
        raw_sku: String,
    },
    /// 同一订单行出现多次且数量/日期不同，保留数量最大者
    ConflictingOrderRow {
        channel: Channel,
        row_number: usize,
        order_id: String,
        raw_sku: String,
        kept_units: u64,
        dropped_units: u64,
    },
    /// 基础件数超出可表示范围，行被丢弃
    QuantityOverflow {
        channel: Channel,
        row_number: usize,
        raw_sku: String,
    },
    /// 主数据缺失
    OrphanSku { raw_sku: String, units_sold: u64 },
    /// 订单日期跨度超过销售窗口
    SalesWindowMismatch {
        observed_days: i64,
        sales_window_days: u32,
    },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::MultiplierConflict {
                raw_sku,
                pattern_multiplier,
                table_multiplier,
            } => write!(
                f,
                "倍率冲突: {} 后缀识别为 {}，倍率表为 {}（采用倍率表）",
                raw_sku, pattern_multiplier, table_multiplier
            ),
            RunWarning::UnresolvedSku {
                channel,
                row_number,
                raw_sku,
            } => write!(
                f,
                "无法解析 SKU: {} ({} 第 {} 行)",
                raw_sku, channel, row_number
            ),
            RunWarning::DuplicateRow {
                channel,
                row_number,
                order_id,
                raw_sku,
            } => write!(
                f,
                "重复订单行已忽略: {} / {} ({} 第 {} 行)",
                order_id, raw_sku, channel, row_number
            ),
            RunWarning::ConflictingOrderRow {
                channel,
                row_number,
                order_id,
                raw_sku,
                kept_units,
                dropped_units,
            } => write!(
                f,
                "订单行数量冲突: {} / {} 保留 {}，忽略 {} ({} 第 {} 行)",
                order_id, raw_sku, kept_units, dropped_units, channel, row_number
            ),
            RunWarning::QuantityOverflow {
                channel,
                row_number,
                raw_sku,
            } => write!(
                f,
                "基础件数溢出，行已丢弃: {} ({} 第 {} 行)",
                raw_sku, channel, row_number
            ),
            RunWarning::OrphanSku {
                raw_sku,
                units_sold,
            } => write!(f, "主数据缺失: {}（销量 {}）", raw_sku, units_sold),
            RunWarning::SalesWindowMismatch {
                observed_days,
                sales_window_days,
            } => write!(
                f,
                "订单日期跨度 {} 天超过销售窗口 {} 天",
                observed_days, sales_window_days
            ),
        }
    }
}

// ==========================================
// PlanSummary - 计划汇总指标
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_base_units_sold: u64,
    pub total_units_to_buy: u64,
    pub unique_products: usize,
    pub orphan_count: usize,
}

impl PlanSummary {
    pub fn from_rows(rows: &[PurchasePlanRow], orphans: &[OrphanSku]) -> Self {
        Self {
            total_base_units_sold: rows
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.total_units_sold_in_window)),
            total_units_to_buy: rows
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.recommended_purchase_qty)),
            unique_products: rows.len(),
            orphan_count: orphans.len(),
        }
    }
}
