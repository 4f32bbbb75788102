// ==========================================
// 多渠道补货计划系统 - 销售领域模型
// ==========================================
// 用途: 渠道解析器输出，聚合器输入
// 生命周期: 仅在单次计划运行内，运行结束即丢弃
// ==========================================

use crate::domain::types::{Channel, IssueLevel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// SalesRecord - 统一销售行
// ==========================================
// 红线: 解析后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub raw_sku: String,              // 渠道 SKU（已 TRIM + UPPER）
    pub channel: Channel,             // 来源渠道
    pub units_sold: u64,              // 销售件数（> 0）
    pub order_date: Option<NaiveDate>, // 下单日期（报表无日期列时为空）
    pub order_id: Option<String>,     // 订单行号（用于去重）
    pub row_number: usize,            // 源文件行号（表头为第 1 行）
}

impl SalesRecord {
    pub fn new(raw_sku: impl Into<String>, channel: Channel, units_sold: u64) -> Self {
        Self {
            raw_sku: raw_sku.into(),
            channel,
            units_sold,
            order_date: None,
            order_id: None,
            row_number: 0,
        }
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_order_date(mut self, order_date: NaiveDate) -> Self {
        self.order_date = Some(order_date);
        self
    }
}

// ==========================================
// ImportIssue - 行级问题记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportIssue {
    pub row_number: usize,       // 源文件行号
    pub raw_sku: Option<String>, // SKU（如果可解析）
    pub level: IssueLevel,       // 问题级别
    pub field: String,           // 问题字段
    pub message: String,         // 问题描述
}

// ==========================================
// ImportReport - 单文件导入汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub source: String,           // 文件路径或来源描述
    pub channel: Channel,         // 渠道
    pub total_rows: usize,        // 非空数据行数
    pub accepted: usize,          // 转为 SalesRecord 的行数
    pub skipped: usize,           // 被丢弃/过滤的行数
    pub issues: Vec<ImportIssue>, // 问题明细
}

impl ImportReport {
    pub fn new(source: impl Into<String>, channel: Channel) -> Self {
        Self {
            source: source.into(),
            channel,
            total_rows: 0,
            accepted: 0,
            skipped: 0,
            issues: Vec::new(),
        }
    }

    /// 按级别统计问题数量
    pub fn count_level(&self, level: IssueLevel) -> usize {
        self.issues.iter().filter(|i| i.level == level).count()
    }
}

// ==========================================
// ChannelImport - 渠道解析结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ChannelImport {
    pub records: Vec<SalesRecord>,
    pub report: ImportReport,
}

impl ChannelImport {
    /// 本文件全部已保留记录的销售件数合计
    pub fn total_units(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.units_sold))
    }
}
