// ==========================================
// 多渠道补货计划系统 - 重复订单行处理器
// ==========================================
// 职责: 检测同一订单行（渠道 + 订单号 + SKU）的重复出现
// 规则: 无订单号的记录（如 Amazon Business Report 汇总行）不参与去重
// 红线: 保留哪一行只取决于行内容（数量最大，其次日期最晚），与输入顺序无关
// ==========================================

use crate::domain::sales::SalesRecord;
use crate::domain::types::Channel;
use std::collections::HashMap;

/// 被忽略的订单行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedRow {
    pub index: usize,    // 被忽略记录的下标
    pub kept: usize,     // 同键保留记录的下标
    pub identical: bool, // 数量与日期均与保留记录一致
}

pub struct ConflictHandler;

impl ConflictHandler {
    /// 检测重复订单行
    ///
    /// # 返回
    /// - Vec<DroppedRow>: 每个键只保留一行，其余按下标升序返回
    pub fn detect_duplicates(&self, records: &[SalesRecord]) -> Vec<DroppedRow> {
        let mut groups: HashMap<(Channel, &str, &str), Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            if let Some(order_id) = record.order_id.as_deref() {
                groups
                    .entry((record.channel, order_id, record.raw_sku.as_str()))
                    .or_default()
                    .push(idx);
            }
        }

        let mut dropped = Vec::new();
        for indices in groups.values().filter(|v| v.len() > 1) {
            let kept = indices
                .iter()
                .copied()
                .max_by_key(|&i| (records[i].units_sold, records[i].order_date))
                .unwrap_or(indices[0]);
            let keeper = &records[kept];

            dropped.extend(indices.iter().copied().filter(|&i| i != kept).map(|index| {
                let record = &records[index];
                DroppedRow {
                    index,
                    kept,
                    identical: record.units_sold == keeper.units_sold
                        && record.order_date == keeper.order_date,
                }
            }));
        }

        dropped.sort_by_key(|d| d.index);
        dropped
    }
}
