// ==========================================
// 多渠道补货计划系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 销售渠道 (Channel)
// ==========================================
// 每个渠道对应一种导出报表版式
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Amazon,   // Business Report
    Flipkart, // Orders Report
    Meesho,   // Orders Report
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Amazon, Channel::Flipkart, Channel::Meesho];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Amazon => write!(f, "Amazon"),
            Channel::Flipkart => write!(f, "Flipkart"),
            Channel::Meesho => write!(f, "Meesho"),
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AMAZON" | "AMZ" => Ok(Channel::Amazon),
            "FLIPKART" | "FK" => Ok(Channel::Flipkart),
            "MEESHO" => Ok(Channel::Meesho),
            other => Err(format!("未知渠道: {}", other)),
        }
    }
}

// ==========================================
// 问题级别 (Issue Level)
// ==========================================
// 行级问题只影响本行，不阻断文件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueLevel {
    Error,   // 行被丢弃
    Warning, // 行被丢弃（业务上可预期，如非正数量）
    Info,    // 仅记录（如状态过滤、日期无法识别）
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLevel::Error => write!(f, "ERROR"),
            IssueLevel::Warning => write!(f, "WARNING"),
            IssueLevel::Info => write!(f, "INFO"),
        }
    }
}

// ==========================================
// 件数倍率来源 (Multiplier Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MultiplierSource {
    Table,   // 倍率覆盖表
    Pattern, // SKU 后缀识别（-P04 / -PACKOF5 / -X4）
    Default, // 未识别，按 1 处理（聚合时回落到主数据 pack_qty）
}

impl fmt::Display for MultiplierSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiplierSource::Table => write!(f, "TABLE"),
            MultiplierSource::Pattern => write!(f, "PATTERN"),
            MultiplierSource::Default => write!(f, "DEFAULT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_from_str() {
        assert_eq!("amazon".parse::<Channel>(), Ok(Channel::Amazon));
        assert_eq!(" Flipkart ".parse::<Channel>(), Ok(Channel::Flipkart));
        assert_eq!("MEESHO".parse::<Channel>(), Ok(Channel::Meesho));
        assert!("ebay".parse::<Channel>().is_err());
    }

    #[test]
    fn test_channel_serde_format() {
        let json = serde_json::to_string(&Channel::Flipkart).unwrap();
        assert_eq!(json, "\"FLIPKART\"");
    }
}
