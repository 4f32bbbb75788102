// ==========================================
// 多渠道补货计划系统 - 导入 Trait
// ==========================================
// 职责: 定义文件解析 / 渠道解析接口（不包含实现）
// ==========================================

use crate::domain::sales::ChannelImport;
use crate::domain::types::Channel;
use crate::importer::channel_parser::{parse_channel_table, ChannelLayout};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表（表头 + 行记录）
    ///
    /// # 返回
    /// - Ok(RawTable): 表头保留原始顺序，完全空白的行已跳过
    /// - Err: 文件不存在、格式不支持、读取失败
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// ChannelParser Trait
// ==========================================
// 用途: 渠道报表 → SalesRecord
// 实现者: AmazonParser, FlipkartParser, MeeshoParser
pub trait ChannelParser: Send + Sync {
    /// 渠道标识
    fn channel(&self) -> Channel;

    /// 报表版式（必需列 / 可选列及其别名）
    fn layout(&self) -> &'static ChannelLayout;

    /// 从 SKU 单元格中提取 SKU 文本（默认原样返回）
    fn extract_sku(&self, raw: &str) -> String {
        raw.to_string()
    }

    /// 订单状态是否计入需求（仅在报表带状态列时调用）
    fn accepts_status(&self, _status: &str) -> bool {
        true
    }

    /// 解析已读取的原始表
    ///
    /// # 返回
    /// - Ok(ChannelImport): 保留的记录 + 导入汇总（含行级问题）
    /// - Err(SchemaMismatch): 缺少必需列，整个文件作废
    fn parse_table(&self, table: &RawTable, source: &str) -> ImportResult<ChannelImport> {
        parse_channel_table(self, table, source)
    }

    /// 读取并解析文件
    fn parse_file(&self, file_path: &Path) -> ImportResult<ChannelImport> {
        let parser = UniversalFileParser::with_preferred_sheet(self.layout().preferred_sheet);
        let table = parser.parse(file_path)?;
        self.parse_table(&table, &file_path.display().to_string())
    }
}
