// ==========================================
// 多渠道补货计划系统 - 核心库
// ==========================================
// 输入: Amazon / Flipkart / Meesho 销售导出 + 商品主数据
// 输出: 基础 SKU 采购建议表 + 主数据缺失 SKU 清单
// 系统定位: 决策支持（采购数量由人工最终确认）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 归一化 / 聚合 / 测算
pub mod engine;

// 配置层 - 参数与设置
pub mod config;

// 报表层 - 文件输出
pub mod report;

// 日志系统
pub mod logging;

// 阶段耗时统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Channel, IssueLevel, MultiplierSource};

// 领域实体
pub use domain::{
    CategoryRule, ImportReport, MasterProduct, MultiplierTable, NormalizedDemand, OrphanSku,
    PlanSummary, ProductCatalog, PurchasePlanRow, RejectedFile, RunWarning, SalesRecord,
};

// 引擎
pub use engine::{
    DemandAggregator, ForecastEngine, PlanResult, PlanningError, PlanningInputs,
    ReplenishmentPlanner, SalesFile, SkuNormalizer,
};

// 配置
pub use config::{AppSettings, PlanningParams};

// 报表
pub use report::{ReportError, ReportWriter};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "多渠道补货计划系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(!APP_NAME.is_empty());
    }
}
