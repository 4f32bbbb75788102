// ==========================================
// 多渠道补货计划系统 - 配置层
// ==========================================
// 职责: 计划参数校验、应用设置持久化
// 存储: settings.json
// ==========================================

pub mod planning_params;
pub mod settings;

pub use planning_params::PlanningParams;
pub use settings::{AppSettings, ConfigError, ConfigResult, PlanningDefaults};
