// ==========================================
// 多渠道补货计划系统 - 引擎层
// ==========================================
// 职责: SKU 归一化、需求聚合、补货测算、流程编排
// 红线: 引擎不读写文件（文件解析在 importer，输出在 report）
// ==========================================

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod forecast;
pub mod planner;
pub mod sku_normalizer;

// 重导出核心引擎
pub use aggregator::{AggregationResult, DemandAggregator};
pub use classifier::{CategoryClassifier, UNCATEGORIZED};
pub use error::{PlanningError, PlanningResult};
pub use forecast::{average_daily_sales, recommended_quantity, ForecastEngine};
pub use planner::{PlanResult, PlanningInputs, ReplenishmentPlanner, SalesFile};
pub use sku_normalizer::{strip_pack_suffix, MultiplierConflict, NormalizedSku, SkuNormalizer};
