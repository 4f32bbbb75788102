// ==========================================
// 多渠道补货计划系统 - 导入层
// ==========================================
// 职责: 外部表格文件 → 内部数据
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod catalog_loader;
pub mod channel_parser;
pub mod conflict_handler;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use catalog_loader::{CatalogLoader, MultiplierLoader};
pub use channel_parser::{parser_for, AmazonParser, ChannelLayout, FlipkartParser, MeeshoParser};
pub use conflict_handler::{ConflictHandler, DroppedRow};
pub use data_cleaner::{DataCleaner, QuantityIssue, MAX_ROW_QUANTITY};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, FieldSpec};
pub use file_parser::{CsvParser, ExcelParser, RawRow, RawTable, UniversalFileParser};

// 重导出 Trait 接口
pub use importer_trait::{ChannelParser, FileParser};
