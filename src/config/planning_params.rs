// ==========================================
// 多渠道补货计划系统 - 计划参数
// ==========================================
// 红线: 参数在任何计算之前校验；非法值 → InvalidConfiguration
// ==========================================

use crate::engine::error::{PlanningError, PlanningResult};
use serde::{Deserialize, Serialize};

/// 已校验的天数参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningParams {
    pub sales_window_days: u32,    // >= 1
    pub purchase_window_days: u32, // >= 1
    pub lead_time_days: u32,
    pub safety_stock_days: u32,
}

impl PlanningParams {
    /// 校验并构造参数
    ///
    /// # 参数
    /// - sales: 销售统计窗口天数（>= 1）
    /// - purchase: 采购覆盖天数（>= 1）
    /// - lead: 采购提前期天数（>= 0）
    /// - safety: 安全库存天数（>= 0，缺省 0）
    pub fn new(sales: i64, purchase: i64, lead: i64, safety: Option<i64>) -> PlanningResult<Self> {
        Ok(Self {
            sales_window_days: checked_days("销售窗口天数", sales, 1)?,
            purchase_window_days: checked_days("采购周期天数", purchase, 1)?,
            lead_time_days: checked_days("提前期天数", lead, 0)?,
            safety_stock_days: checked_days("安全库存天数", safety.unwrap_or(0), 0)?,
        })
    }

    /// 采购需覆盖的总天数（周期 + 安全 + 提前期）
    pub fn coverage_days(&self) -> u64 {
        u64::from(self.purchase_window_days)
            + u64::from(self.safety_stock_days)
            + u64::from(self.lead_time_days)
    }
}

fn checked_days(name: &str, value: i64, min: i64) -> PlanningResult<u32> {
    if value < min {
        return Err(PlanningError::invalid_config(format!(
            "{} 必须 >= {}，实际为 {}",
            name, min, value
        )));
    }
    u32::try_from(value)
        .map_err(|_| PlanningError::invalid_config(format!("{} 超出范围: {}", name, value)))
}
