// ==========================================
// 多渠道补货计划系统 - 渠道报表解析器
// ==========================================
// 职责: 渠道导出报表 → SalesRecord
// 流程: 表头解析 → SKU 提取/清洗 → 状态过滤 → 数量校验 → 日期/订单号
// 红线: 行级问题只丢弃该行；缺少必需列整个文件作废
// ==========================================

use crate::domain::sales::{ChannelImport, ImportIssue, ImportReport, SalesRecord};
use crate::domain::types::{Channel, IssueLevel};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{FieldMapper, FieldSpec};
use crate::importer::file_parser::RawTable;
use crate::importer::importer_trait::ChannelParser;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

const FIELD_SKU: &str = "sku";
const FIELD_QUANTITY: &str = "quantity";
const FIELD_STATUS: &str = "status";
const FIELD_ORDER_DATE: &str = "order_date";
const FIELD_ORDER_ID: &str = "order_id";

// ==========================================
// ChannelLayout - 渠道报表版式
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ChannelLayout {
    pub report_name: &'static str,
    pub sku: FieldSpec,
    pub quantity: FieldSpec,
    pub status: Option<FieldSpec>,
    pub order_date: Option<FieldSpec>,
    pub order_id: Option<FieldSpec>,
    pub preferred_sheet: Option<&'static str>,
}

impl ChannelLayout {
    fn optional_fields(&self) -> Vec<FieldSpec> {
        [self.status, self.order_date, self.order_id]
            .into_iter()
            .flatten()
            .collect()
    }
}

static AMAZON_LAYOUT: ChannelLayout = ChannelLayout {
    report_name: "Business Report",
    sku: FieldSpec::new(FIELD_SKU, &["SKU", "Seller SKU"]),
    quantity: FieldSpec::new(FIELD_QUANTITY, &["Units Ordered"]),
    status: None,
    order_date: None,
    order_id: None,
    preferred_sheet: None,
};

static FLIPKART_LAYOUT: ChannelLayout = ChannelLayout {
    report_name: "Orders Report",
    sku: FieldSpec::new(FIELD_SKU, &["sku"]),
    quantity: FieldSpec::new(FIELD_QUANTITY, &["quantity", "qty"]),
    status: Some(FieldSpec::new(FIELD_STATUS, &["order_item_status"])),
    order_date: Some(FieldSpec::new(FIELD_ORDER_DATE, &["order_date", "ordered_on"])),
    order_id: Some(FieldSpec::new(FIELD_ORDER_ID, &["order_item_id"])),
    preferred_sheet: Some("Orders"),
};

static MEESHO_LAYOUT: ChannelLayout = ChannelLayout {
    report_name: "Orders Report",
    sku: FieldSpec::new(FIELD_SKU, &["SKU"]),
    quantity: FieldSpec::new(FIELD_QUANTITY, &["Quantity"]),
    status: Some(FieldSpec::new(
        FIELD_STATUS,
        &["Reason for Credit Entry", "Order Status"],
    )),
    order_date: Some(FieldSpec::new(FIELD_ORDER_DATE, &["Order Date"])),
    order_id: Some(FieldSpec::new(FIELD_ORDER_ID, &["Sub Order No", "Sub Order No."])),
    preferred_sheet: None,
};

fn push_issue(
    report: &mut ImportReport,
    row_number: usize,
    raw_sku: Option<&str>,
    level: IssueLevel,
    field: &str,
    message: String,
) {
    report.issues.push(ImportIssue {
        row_number,
        raw_sku: raw_sku.map(|s| s.to_string()),
        level,
        field: field.to_string(),
        message,
    });
}

/// 按渠道版式解析原始表（ChannelParser 的默认实现）
pub fn parse_channel_table<P: ChannelParser + ?Sized>(
    parser: &P,
    table: &RawTable,
    source: &str,
) -> ImportResult<ChannelImport> {
    let layout = parser.layout();
    let channel = parser.channel();

    let mapper = FieldMapper::resolve(
        &table.headers,
        &[layout.sku, layout.quantity],
        &layout.optional_fields(),
        source,
    )
    .map_err(|e| {
        warn!(channel = %channel, source = %source, error = %e, "报表缺少必需列");
        e
    })?;

    let cleaner = DataCleaner;
    let mut report = ImportReport::new(source, channel);
    report.total_rows = table.rows.len();
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        // === SKU ===
        let raw_sku = mapper
            .get_string(row, FIELD_SKU)
            .map(|v| parser.extract_sku(v))
            .and_then(|v| cleaner.clean_sku(&v));

        let raw_sku = match raw_sku {
            Some(sku) => sku,
            None => {
                warn!(channel = %channel, row = row.row_number, "SKU 为空，行已丢弃");
                push_issue(
                    &mut report,
                    row.row_number,
                    None,
                    IssueLevel::Error,
                    FIELD_SKU,
                    "SKU 为空".to_string(),
                );
                continue;
            }
        };

        // === 订单状态 ===
        if mapper.has(FIELD_STATUS) {
            let status = mapper
                .get_string(row, FIELD_STATUS)
                .unwrap_or("")
                .to_uppercase();
            if !parser.accepts_status(&status) {
                debug!(channel = %channel, row = row.row_number, status = %status, "订单状态不计入需求");
                push_issue(
                    &mut report,
                    row.row_number,
                    Some(&raw_sku),
                    IssueLevel::Info,
                    FIELD_STATUS,
                    format!("订单状态不计入需求: {}", status),
                );
                continue;
            }
        }

        // === 数量 ===
        let units_sold = match cleaner.parse_quantity(mapper.get_string(row, FIELD_QUANTITY)) {
            Ok(units) => units,
            Err(issue) => {
                warn!(
                    channel = %channel,
                    row = row.row_number,
                    sku = %raw_sku,
                    reason = %issue,
                    "数量不可用，行已丢弃"
                );
                push_issue(
                    &mut report,
                    row.row_number,
                    Some(&raw_sku),
                    IssueLevel::Warning,
                    FIELD_QUANTITY,
                    issue.to_string(),
                );
                continue;
            }
        };

        // === 日期 / 订单号 ===
        let order_date = match mapper.get_string(row, FIELD_ORDER_DATE) {
            Some(value) => {
                let parsed = cleaner.parse_order_date(value);
                if parsed.is_none() {
                    push_issue(
                        &mut report,
                        row.row_number,
                        Some(&raw_sku),
                        IssueLevel::Info,
                        FIELD_ORDER_DATE,
                        format!("无法识别的日期: {}", value),
                    );
                }
                parsed
            }
            None => None,
        };
        let order_id = mapper.get_string(row, FIELD_ORDER_ID).map(str::to_string);

        records.push(SalesRecord {
            raw_sku,
            channel,
            units_sold,
            order_date,
            order_id,
            row_number: row.row_number,
        });
    }

    report.accepted = records.len();
    report.skipped = report.total_rows - report.accepted;

    info!(
        channel = %channel,
        report = layout.report_name,
        source = %source,
        total_rows = report.total_rows,
        accepted = report.accepted,
        skipped = report.skipped,
        "渠道报表解析完成"
    );

    Ok(ChannelImport { records, report })
}

// ==========================================
// Amazon - Business Report
// ==========================================
pub struct AmazonParser;

impl ChannelParser for AmazonParser {
    fn channel(&self) -> Channel {
        Channel::Amazon
    }

    fn layout(&self) -> &'static ChannelLayout {
        &AMAZON_LAYOUT
    }
}

// ==========================================
// Flipkart - Orders Report
// ==========================================
// SKU 单元格形如 `Tax:18% SKU:ABC-123`，取 `SKU:` 之后的文本
static FLIPKART_SKU_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"SKU:([^"]+)"#).expect("Invalid regex pattern: FLIPKART_SKU_PATTERN")
});

const FLIPKART_VALID_STATUSES: [&str; 4] = ["DELIVERED", "SHIPPED", "APPROVED", "PACKED"];

pub struct FlipkartParser;

impl ChannelParser for FlipkartParser {
    fn channel(&self) -> Channel {
        Channel::Flipkart
    }

    fn layout(&self) -> &'static ChannelLayout {
        &FLIPKART_LAYOUT
    }

    fn extract_sku(&self, raw: &str) -> String {
        FLIPKART_SKU_PATTERN
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| raw.to_string())
    }

    fn accepts_status(&self, status: &str) -> bool {
        FLIPKART_VALID_STATUSES.contains(&status)
    }
}

// ==========================================
// Meesho - Orders Report
// ==========================================
const MEESHO_EXCLUDED_PREFIXES: [&str; 3] = ["CANCEL", "RTO", "RETURN"];

pub struct MeeshoParser;

impl ChannelParser for MeeshoParser {
    fn channel(&self) -> Channel {
        Channel::Meesho
    }

    fn layout(&self) -> &'static ChannelLayout {
        &MEESHO_LAYOUT
    }

    fn accepts_status(&self, status: &str) -> bool {
        !MEESHO_EXCLUDED_PREFIXES
            .iter()
            .any(|prefix| status.starts_with(prefix))
    }
}

/// 按渠道获取解析器
pub fn parser_for(channel: Channel) -> Box<dyn ChannelParser> {
    match channel {
        Channel::Amazon => Box::new(AmazonParser),
        Channel::Flipkart => Box::new(FlipkartParser),
        Channel::Meesho => Box::new(MeeshoParser),
    }
}
