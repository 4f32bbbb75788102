// ==========================================
// 多渠道补货计划系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 数量与日期解析
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::num::IntErrorKind;

/// 数量列无法使用的原因
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityIssue {
    Missing,
    NonNumeric(String),
    NonPositive(i64),
    TooLarge(String),
}

impl fmt::Display for QuantityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityIssue::Missing => write!(f, "数量为空"),
            QuantityIssue::NonNumeric(v) => write!(f, "数量无法解析为整数: {}", v),
            QuantityIssue::NonPositive(v) => write!(f, "数量 <= 0: {}", v),
            QuantityIssue::TooLarge(v) => {
                write!(f, "数量超过单行上限 {}: {}", MAX_ROW_QUANTITY, v)
            }
        }
    }
}

/// 单行销售数量上限
pub const MAX_ROW_QUANTITY: u64 = 1_000_000_000;

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d-%m-%Y %H:%M:%S"];

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗文本字段（TRIM，可选 UPPER）
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    /// 标准化 NULL 值（空字符串/空白 → None）
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 标准化 SKU（TRIM + UPPER，两端引号去除；空值 → None）
    pub fn clean_sku(&self, value: &str) -> Option<String> {
        let cleaned = self.clean_text(value.trim_matches('"'), true);
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    /// 解析销售数量
    ///
    /// # 规则
    /// - 去除千分位逗号（"1,000" → 1000）
    /// - 允许小数部分全为 0 的整数（Excel 数值单元格 "5.0"）
    /// - 只走整数解析，不接受科学计数法
    /// - <= 0 或超过 MAX_ROW_QUANTITY 视为不可用
    pub fn parse_quantity(&self, value: Option<&str>) -> Result<u64, QuantityIssue> {
        let raw = match value.map(str::trim) {
            None | Some("") => return Err(QuantityIssue::Missing),
            Some(v) => v,
        };

        let compact: String = raw.chars().filter(|c| *c != ',').collect();
        let (integer, fraction) = compact.split_once('.').unwrap_or((compact.as_str(), ""));
        if !fraction.chars().all(|c| c == '0') {
            return Err(QuantityIssue::NonNumeric(raw.to_string()));
        }

        let number = integer.parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => QuantityIssue::TooLarge(raw.to_string()),
            IntErrorKind::NegOverflow => QuantityIssue::NonPositive(i64::MIN),
            _ => QuantityIssue::NonNumeric(raw.to_string()),
        })?;

        if number <= 0 {
            return Err(QuantityIssue::NonPositive(number));
        }
        let units = number.unsigned_abs();
        if units > MAX_ROW_QUANTITY {
            return Err(QuantityIssue::TooLarge(raw.to_string()));
        }
        Ok(units)
    }

    /// 解析订单日期（多格式兼容，无法识别返回 None）
    pub fn parse_order_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(|dt| dt.date())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_basic() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  hello  ", false), "hello");
        assert_eq!(cleaner.clean_text("  hello  ", true), "HELLO");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(
            cleaner.normalize_null(Some("  value  ".to_string())),
            Some("value".to_string())
        );
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_clean_sku() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_sku(" widget-p04 "), Some("WIDGET-P04".to_string()));
        assert_eq!(cleaner.clean_sku("\"abc\""), Some("ABC".to_string()));
        assert_eq!(cleaner.clean_sku("   "), None);
    }

    #[test]
    fn test_parse_quantity() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_quantity(Some("12")), Ok(12));
        assert_eq!(cleaner.parse_quantity(Some("1,000")), Ok(1000));
        assert_eq!(cleaner.parse_quantity(Some("5.0")), Ok(5));
        assert_eq!(cleaner.parse_quantity(None), Err(QuantityIssue::Missing));
        assert_eq!(
            cleaner.parse_quantity(Some("0")),
            Err(QuantityIssue::NonPositive(0))
        );
        assert_eq!(
            cleaner.parse_quantity(Some("-3")),
            Err(QuantityIssue::NonPositive(-3))
        );
        assert!(matches!(
            cleaner.parse_quantity(Some("abc")),
            Err(QuantityIssue::NonNumeric(_))
        ));
        assert!(matches!(
            cleaner.parse_quantity(Some("2.5")),
            Err(QuantityIssue::NonNumeric(_))
        ));
    }

    #[test]
    fn test_parse_quantity_rejects_huge_and_exponent_values() {
        let cleaner = DataCleaner;
        assert!(matches!(
            cleaner.parse_quantity(Some("1e20")),
            Err(QuantityIssue::NonNumeric(_))
        ));
        assert!(matches!(
            cleaner.parse_quantity(Some("18446744073709551615")),
            Err(QuantityIssue::TooLarge(_))
        ));
        assert!(matches!(
            cleaner.parse_quantity(Some("1,000,000,001")),
            Err(QuantityIssue::TooLarge(_))
        ));
        assert!(matches!(
            cleaner.parse_quantity(Some("1e3")),
            Err(QuantityIssue::NonNumeric(_))
        ));
        assert_eq!(cleaner.parse_quantity(Some("1,000,000,000")), Ok(MAX_ROW_QUANTITY));
        assert!(matches!(
            cleaner.parse_quantity(Some("9007199254740993.0")),
            Err(QuantityIssue::TooLarge(_))
        ));
        assert_eq!(cleaner.parse_quantity(Some("7.00")), Ok(7));
    }

    #[test]
    fn test_parse_order_date_formats() {
        let cleaner = DataCleaner;
        let expected = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        assert_eq!(cleaner.parse_order_date("2025-01-20"), Some(expected));
        assert_eq!(cleaner.parse_order_date("20-01-2025"), Some(expected));
        assert_eq!(cleaner.parse_order_date("20/01/2025"), Some(expected));
        assert_eq!(cleaner.parse_order_date("20250120"), Some(expected));
        assert_eq!(cleaner.parse_order_date("2025-01-20 13:45:00"), Some(expected));
        assert_eq!(cleaner.parse_order_date("not a date"), None);
        assert_eq!(cleaner.parse_order_date(""), None);
    }
}
