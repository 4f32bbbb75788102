// ==========================================
// 多渠道补货计划系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含文件读写逻辑，不含引擎逻辑
// ==========================================

pub mod plan;
pub mod product;
pub mod sales;
pub mod types;

// 重导出核心类型
pub use plan::{
    NormalizedDemand, OrphanSku, PlanSummary, PurchasePlanRow, RejectedFile, RunWarning,
    UNKNOWN_CATEGORY,
};
pub use product::{CategoryRule, Listing, MasterProduct, MultiplierTable, ProductCatalog};
pub use sales::{ChannelImport, ImportIssue, ImportReport, SalesRecord};
pub use types::{Channel, IssueLevel, MultiplierSource};
