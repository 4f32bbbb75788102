// ==========================================
// 多渠道补货计划系统 - 报表层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("输出文件已存在: {0}（如需覆盖请显式允许）")]
    OutputExists(String),

    #[error("输出路径无效: {0}")]
    InvalidPath(String),

    #[error("报表写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
