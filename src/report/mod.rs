// ==========================================
// 多渠道补货计划系统 - 报表层
// ==========================================
// 职责: 采购计划 / 孤儿 SKU 清单 → CSV 文件
// 红线: 只做序列化，不做任何计算
// ==========================================

pub mod error;
pub mod writer;

pub use error::{ReportError, ReportResult};
pub use writer::{default_output_file_name, orphan_report_path, ReportWriter, WrittenReport};
