// ==========================================
// 多渠道补货计划系统 - 补货测算引擎
// ==========================================
// 公式:
//   ADS              = base_units / 销售窗口
//   cycle_stock      = ADS × 采购周期
//   safety_stock     = ADS × 安全库存天数
//   lead_time_demand = ADS × 提前期
//   建议采购量       = ceil(cycle + safety + lead)
// 红线: 取整使用整数运算，浮点误差不得多买一件
// ==========================================

use crate::config::PlanningParams;
use crate::domain::plan::{NormalizedDemand, PurchasePlanRow};
use crate::engine::error::{PlanningError, PlanningResult};
use tracing::{debug, info};

/// 建议采购量 = ceil(base_units × 覆盖天数 / 销售窗口)
///
/// 销售窗口为 0 时返回 None
pub fn recommended_quantity(base_units: u64, params: &PlanningParams) -> Option<u64> {
    let window = u128::from(params.sales_window_days);
    if window == 0 {
        return None;
    }
    let demand = u128::from(base_units) * u128::from(params.coverage_days());
    let qty = (demand + window - 1) / window;
    u64::try_from(qty).ok()
}

/// 日均销量（仅用于展示）
pub fn average_daily_sales(base_units: u64, sales_window_days: u32) -> f64 {
    if sales_window_days == 0 {
        return 0.0;
    }
    base_units as f64 / f64::from(sales_window_days)
}

#[derive(Debug, Default)]
pub struct ForecastEngine;

impl ForecastEngine {
    pub fn new() -> Self {
        Self
    }

    /// 为每个基础 SKU 计算建议采购量
    ///
    /// # 返回
    /// 按建议采购量降序、SKU 升序排列的采购建议
    pub fn compute(
        &self,
        demands: &[NormalizedDemand],
        params: &PlanningParams,
    ) -> PlanningResult<Vec<PurchasePlanRow>> {
        if params.sales_window_days == 0 {
            return Err(PlanningError::invalid_config("销售窗口天数必须 >= 1"));
        }

        let mut rows = Vec::with_capacity(demands.len());
        for demand in demands {
            let qty = recommended_quantity(demand.base_units, params).ok_or_else(|| {
                PlanningError::invalid_config(format!("{} 的建议采购量溢出", demand.base_sku))
            })?;
            let ads = average_daily_sales(demand.base_units, params.sales_window_days);

            debug!(
                sku = %demand.base_sku,
                base_units = demand.base_units,
                ads,
                qty,
                "补货测算"
            );

            rows.push(PurchasePlanRow {
                sku: demand.base_sku.clone(),
                category: demand.category.clone(),
                total_units_sold_in_window: demand.base_units,
                average_daily_sales: ads,
                recommended_purchase_qty: qty,
                listing_count: demand.listing_count,
                supplier: demand.supplier.clone(),
            });
        }

        rows.sort_by(|a, b| {
            b.recommended_purchase_qty
                .cmp(&a.recommended_purchase_qty)
                .then_with(|| a.sku.cmp(&b.sku))
        });

        info!(
            products = rows.len(),
            total_qty = rows
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.recommended_purchase_qty)),
            "补货测算完成"
        );

        Ok(rows)
    }
}
