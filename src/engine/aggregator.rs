// ==========================================
// 多渠道补货计划系统 - 需求聚合器
// ==========================================
// 职责: 全渠道 SalesRecord → 基础 SKU 需求（基础件）
// 匹配: 渠道 SKU 原样命中主数据（渠道商品 / 基础 SKU）优先，否则剥离后缀再匹配
// 倍率: 倍率表 > 后缀 > 渠道商品/主数据 pack_qty；主数据缺失 → 孤儿 SKU（倍率缺省 1）
// 红线: 聚合结果与输入顺序无关；重复订单行只计一次；溢出行丢弃并告警，不允许 panic
// ==========================================

use crate::domain::plan::{NormalizedDemand, OrphanSku, RunWarning, UNKNOWN_CATEGORY};
use crate::domain::product::{MasterProduct, ProductCatalog};
use crate::domain::sales::SalesRecord;
use crate::domain::types::Channel;
use crate::engine::classifier::CategoryClassifier;
use crate::engine::error::PlanningError;
use crate::engine::sku_normalizer::SkuNormalizer;
use crate::importer::conflict_handler::{ConflictHandler, DroppedRow};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

// ==========================================
// AggregationResult - 聚合结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    pub demands: Vec<NormalizedDemand>, // 按 base_sku 排序
    pub orphans: Vec<OrphanSku>,        // 按 raw_sku 排序
    pub warnings: Vec<RunWarning>,
    pub retained_records: usize,        // 参与聚合的记录数（去重、剔除无法解析后）
}

impl AggregationResult {
    pub fn total_base_units(&self) -> u64 {
        self.demands
            .iter()
            .fold(0u64, |acc, d| acc.saturating_add(d.base_units))
    }

    pub fn total_orphan_base_units(&self) -> u64 {
        self.orphans
            .iter()
            .fold(0u64, |acc, o| acc.saturating_add(o.base_units))
    }
}

#[derive(Default)]
struct DemandAccumulator {
    base_units: u64,
    category: String,
    supplier: Option<String>,
    listings: BTreeSet<String>,
}

#[derive(Default)]
struct OrphanAccumulator {
    base_sku: String,
    channels: BTreeSet<Channel>,
    units_sold: u64,
    base_units: u64,
}

/// 单条记录的匹配结果
enum Resolution<'a> {
    Catalog {
        product: &'a MasterProduct,
        listing: String,
        pack: u32,
    },
    Orphan {
        raw_sku: String,
        base_sku: String,
        multiplier: u32,
    },
}

pub struct DemandAggregator {
    normalizer: SkuNormalizer,
    classifier: CategoryClassifier,
}

impl DemandAggregator {
    pub fn new(normalizer: SkuNormalizer, classifier: CategoryClassifier) -> Self {
        Self {
            normalizer,
            classifier,
        }
    }

    /// 聚合全部销售记录
    ///
    /// # 流程
    /// 1. 重复订单行剔除
    /// 2. 渠道 SKU 原样匹配主数据；未命中则归一化（失败 → UnresolvedSku 告警，行丢弃）
    /// 3. 主数据匹配：命中 → 需求；未命中 → 孤儿
    pub fn aggregate(&self, records: &[SalesRecord], catalog: &ProductCatalog) -> AggregationResult {
        let mut result = AggregationResult::default();

        // === 步骤 1: 重复订单行 ===
        let dropped: HashMap<usize, DroppedRow> = ConflictHandler
            .detect_duplicates(records)
            .into_iter()
            .map(|d| (d.index, d))
            .collect();

        let mut demand_acc: BTreeMap<String, DemandAccumulator> = BTreeMap::new();
        let mut orphan_acc: BTreeMap<String, OrphanAccumulator> = BTreeMap::new();
        let mut reported_conflicts: HashSet<String> = HashSet::new();

        for (idx, record) in records.iter().enumerate() {
            if let Some(dup) = dropped.get(&idx) {
                result
                    .warnings
                    .push(duplicate_warning(record, &records[dup.kept], dup.identical));
                continue;
            }

            // === 步骤 2: 匹配 ===
            let resolution =
                match self.resolve(record, catalog, &mut reported_conflicts, &mut result.warnings) {
                    Some(r) => r,
                    None => continue,
                };

            // === 步骤 3: 累加（溢出 → 行丢弃） ===
            let accumulated = match resolution {
                Resolution::Catalog {
                    product,
                    listing,
                    pack,
                } => record
                    .units_sold
                    .checked_mul(u64::from(pack))
                    .and_then(|base_units| {
                        let acc = demand_acc.entry(product.base_sku.clone()).or_default();
                        acc.base_units = acc.base_units.checked_add(base_units)?;
                        acc.listings.insert(listing);
                        if acc.category.is_empty() {
                            acc.category = if product.category.is_empty() {
                                self.classifier.classify(&product.base_sku).to_string()
                            } else {
                                product.category.clone()
                            };
                            acc.supplier = product.supplier.clone();
                        }
                        debug!(
                            sku = %record.raw_sku,
                            base_sku = %product.base_sku,
                            pack,
                            base_units,
                            "记录已聚合"
                        );
                        Some(())
                    }),
                Resolution::Orphan {
                    raw_sku,
                    base_sku,
                    multiplier,
                } => record
                    .units_sold
                    .checked_mul(u64::from(multiplier))
                    .and_then(|base_units| {
                        let acc = orphan_acc.entry(raw_sku).or_default();
                        let units_sold = acc.units_sold.checked_add(record.units_sold)?;
                        acc.base_units = acc.base_units.checked_add(base_units)?;
                        acc.units_sold = units_sold;
                        acc.base_sku = base_sku;
                        acc.channels.insert(record.channel);
                        Some(())
                    }),
            };

            if accumulated.is_none() {
                warn!(
                    channel = %record.channel,
                    row = record.row_number,
                    sku = %record.raw_sku,
                    units_sold = record.units_sold,
                    "基础件数溢出，行已丢弃"
                );
                result.warnings.push(RunWarning::QuantityOverflow {
                    channel: record.channel,
                    row_number: record.row_number,
                    raw_sku: record.raw_sku.clone(),
                });
                continue;
            }

            result.retained_records += 1;
        }

        result.demands = demand_acc
            .into_iter()
            .map(|(base_sku, acc)| NormalizedDemand {
                base_sku,
                base_units: acc.base_units,
                category: acc.category,
                supplier: acc.supplier,
                listing_count: acc.listings.len(),
            })
            .collect();

        result.orphans = orphan_acc
            .into_iter()
            .map(|(raw_sku, acc)| {
                warn!(sku = %raw_sku, units_sold = acc.units_sold, "主数据缺失 SKU");
                result.warnings.push(RunWarning::OrphanSku {
                    raw_sku: raw_sku.clone(),
                    units_sold: acc.units_sold,
                });
                OrphanSku {
                    raw_sku,
                    base_sku: acc.base_sku,
                    channels: acc.channels.into_iter().collect(),
                    units_sold: acc.units_sold,
                    base_units: acc.base_units,
                    category: UNKNOWN_CATEGORY.to_string(),
                }
            })
            .collect();

        info!(
            records = records.len(),
            retained = result.retained_records,
            demands = result.demands.len(),
            orphans = result.orphans.len(),
            base_units = result.total_base_units(),
            "需求聚合完成"
        );

        result
    }

    /// 为单条记录确定基础 SKU 与倍率
    ///
    /// 渠道 SKU 原样存在于主数据时不剥离后缀（倍率表仍可覆盖件数）
    fn resolve<'a>(
        &self,
        record: &SalesRecord,
        catalog: &'a ProductCatalog,
        reported_conflicts: &mut HashSet<String>,
        warnings: &mut Vec<RunWarning>,
    ) -> Option<Resolution<'a>> {
        let raw = record.raw_sku.trim().to_uppercase();

        if let Some((product, pack)) = catalog.match_exact(&raw) {
            let pack = self.normalizer.table_multiplier(&raw).unwrap_or(pack);
            return Some(Resolution::Catalog {
                product,
                listing: raw,
                pack,
            });
        }

        let normalized = match self.normalizer.normalize(&raw) {
            Ok(n) => n,
            Err(PlanningError::UnresolvedSku { .. }) => {
                warn!(channel = %record.channel, row = record.row_number, sku = %record.raw_sku, "无法解析 SKU，行已丢弃");
                warnings.push(RunWarning::UnresolvedSku {
                    channel: record.channel,
                    row_number: record.row_number,
                    raw_sku: record.raw_sku.clone(),
                });
                return None;
            }
            Err(e) => {
                warn!(error = %e, "SKU 归一化失败，行已丢弃");
                return None;
            }
        };

        if let Some(conflict) = normalized.conflict {
            if reported_conflicts.insert(normalized.raw_sku.clone()) {
                warnings.push(RunWarning::MultiplierConflict {
                    raw_sku: normalized.raw_sku.clone(),
                    pattern_multiplier: conflict.pattern_multiplier,
                    table_multiplier: conflict.table_multiplier,
                });
            }
        }

        let resolution = match catalog.get(&normalized.base_sku) {
            Some(product) => Resolution::Catalog {
                product,
                pack: if normalized.has_explicit_multiplier() {
                    normalized.multiplier
                } else {
                    product.pack_qty
                },
                listing: normalized.raw_sku,
            },
            None => Resolution::Orphan {
                multiplier: normalized.multiplier,
                raw_sku: normalized.raw_sku,
                base_sku: normalized.base_sku,
            },
        };
        Some(resolution)
    }
}

/// 重复订单行告警：内容一致为重复，数量/日期不同为冲突
fn duplicate_warning(record: &SalesRecord, kept: &SalesRecord, identical: bool) -> RunWarning {
    let order_id = record.order_id.clone().unwrap_or_default();
    if identical {
        warn!(
            channel = %record.channel,
            row = record.row_number,
            order_id = %order_id,
            sku = %record.raw_sku,
            "重复订单行已忽略"
        );
        RunWarning::DuplicateRow {
            channel: record.channel,
            row_number: record.row_number,
            order_id,
            raw_sku: record.raw_sku.clone(),
        }
    } else {
        warn!(
            channel = %record.channel,
            row = record.row_number,
            order_id = %order_id,
            sku = %record.raw_sku,
            kept_units = kept.units_sold,
            dropped_units = record.units_sold,
            "订单行数量冲突，保留数量较大者"
        );
        RunWarning::ConflictingOrderRow {
            channel: record.channel,
            row_number: record.row_number,
            order_id,
            raw_sku: record.raw_sku.clone(),
            kept_units: kept.units_sold,
            dropped_units: record.units_sold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{CategoryRule, Listing, MultiplierTable};

    fn product(base_sku: &str, pack_qty: u32) -> MasterProduct {
        MasterProduct {
            base_sku: base_sku.to_string(),
            pack_qty,
            category: "GPU".to_string(),
            supplier: None,
        }
    }

    fn catalog() -> ProductCatalog {
        [
            MasterProduct {
                base_sku: "WIDGET".to_string(),
                pack_qty: 4,
                category: "TOOL".to_string(),
                supplier: Some("Acme".to_string()),
            },
            MasterProduct {
                base_sku: "CABLE".to_string(),
                pack_qty: 2,
                category: String::new(),
                supplier: None,
            },
        ]
        .into_iter()
        .collect()
    }

    fn aggregator() -> DemandAggregator {
        DemandAggregator::new(
            SkuNormalizer::pattern_only(),
            CategoryClassifier::new(vec![CategoryRule::new("CAB", "ELECTRICAL")]),
        )
    }

    #[test]
    fn test_pattern_multiplier_and_catalog_fallback() {
        let records = vec![
            SalesRecord::new("WIDGET-P04", Channel::Amazon, 12),
            SalesRecord::new("WIDGET-P04", Channel::Flipkart, 8),
            SalesRecord::new("CABLE", Channel::Meesho, 5), // 无后缀 → 主数据 pack_qty=2
        ];

        let result = aggregator().aggregate(&records, &catalog());

        assert_eq!(result.demands.len(), 2);
        let cable = &result.demands[0];
        assert_eq!(cable.base_sku, "CABLE");
        assert_eq!(cable.base_units, 10);
        assert_eq!(cable.category, "ELECTRICAL");

        let widget = &result.demands[1];
        assert_eq!(widget.base_units, 80);
        assert_eq!(widget.category, "TOOL");
        assert_eq!(widget.supplier.as_deref(), Some("Acme"));
        assert_eq!(widget.listing_count, 1);
        assert_eq!(cable.supplier, None);
        assert!(result.orphans.is_empty());
    }

    #[test]
    fn test_orphans_are_summed_once() {
        let records = vec![
            SalesRecord::new("MYSTERY-X3", Channel::Amazon, 2),
            SalesRecord::new("WIDGET", Channel::Amazon, 1),
            SalesRecord::new("MYSTERY-X3", Channel::Meesho, 5),
        ];

        let result = aggregator().aggregate(&records, &catalog());

        assert_eq!(result.orphans.len(), 1);
        let orphan = &result.orphans[0];
        assert_eq!(orphan.raw_sku, "MYSTERY-X3");
        assert_eq!(orphan.base_sku, "MYSTERY");
        assert_eq!(orphan.units_sold, 7);
        assert_eq!(orphan.base_units, 21);
        assert_eq!(orphan.category, UNKNOWN_CATEGORY);
        assert_eq!(orphan.channels, vec![Channel::Amazon, Channel::Meesho]);
        assert!(result.demands.iter().all(|d| d.base_sku != "MYSTERY"));
        assert_eq!(
            result
                .warnings
                .iter()
                .filter(|w| matches!(w, RunWarning::OrphanSku { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_duplicate_order_rows_counted_once() {
        let records = vec![
            SalesRecord::new("WIDGET", Channel::Flipkart, 3).with_order_id("OI-1"),
            SalesRecord::new("WIDGET", Channel::Flipkart, 3).with_order_id("OI-1"),
            SalesRecord::new("WIDGET", Channel::Flipkart, 1).with_order_id("OI-2"),
        ];

        let result = aggregator().aggregate(&records, &catalog());

        assert_eq!(result.demands[0].base_units, 16);
        assert_eq!(result.retained_records, 2);
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::DuplicateRow { .. })));
    }

    #[test]
    fn test_unresolved_sku_dropped() {
        let records = vec![
            SalesRecord::new("-P04", Channel::Amazon, 3),
            SalesRecord::new("WIDGET", Channel::Amazon, 1),
        ];

        let result = aggregator().aggregate(&records, &catalog());

        assert_eq!(result.retained_records, 1);
        assert_eq!(result.total_base_units(), 4);
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, RunWarning::UnresolvedSku { .. })));
    }

    #[test]
    fn test_table_conflict_reported_once() {
        let mut table = MultiplierTable::new();
        table.insert("WIDGET-P04", 6);
        let aggregator = DemandAggregator::new(SkuNormalizer::new(table), CategoryClassifier::default());
        let records = vec![
            SalesRecord::new("WIDGET-P04", Channel::Amazon, 1),
            SalesRecord::new("WIDGET-P04", Channel::Flipkart, 1),
        ];

        let result = aggregator.aggregate(&records, &catalog());

        assert_eq!(result.total_base_units(), 12);
        let conflicts: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| matches!(w, RunWarning::MultiplierConflict { .. }))
            .collect();
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn test_order_independent() {
        let mut records = vec![
            SalesRecord::new("WIDGET-P04", Channel::Amazon, 12),
            SalesRecord::new("CABLE", Channel::Meesho, 5),
            SalesRecord::new("GHOST", Channel::Flipkart, 2),
            SalesRecord::new("WIDGET", Channel::Flipkart, 3),
        ];
        let forward = aggregator().aggregate(&records, &catalog());
        records.reverse();
        let backward = aggregator().aggregate(&records, &catalog());

        assert_eq!(forward.demands, backward.demands);
        assert_eq!(forward.orphans, backward.orphans);
    }

    #[test]
    fn test_base_unit_conservation() {
        let records = vec![
            SalesRecord::new("WIDGET-P04", Channel::Amazon, 12),
            SalesRecord::new("WIDGET", Channel::Flipkart, 3),
            SalesRecord::new("CABLE-PACKOF5", Channel::Meesho, 2),
            SalesRecord::new("CABLE", Channel::Meesho, 7),
        ];
        // 4×12 + 4×3 + 5×2 + 2×7
        let expected: u64 = 48 + 12 + 10 + 14;

        let result = aggregator().aggregate(&records, &catalog());

        assert_eq!(result.total_base_units(), expected);
        assert_eq!(
            result.demands.iter().find(|d| d.base_sku == "CABLE").unwrap().listing_count,
            2
        );
    }

    #[test]
    fn test_catalogued_sku_is_not_split_as_pack_suffix() {
        let catalog: ProductCatalog = [product("RX580", 1), product("KIT-P02", 1)]
            .into_iter()
            .collect();
        let records = vec![
            SalesRecord::new("RX580", Channel::Amazon, 2),
            SalesRecord::new("KIT-P02", Channel::Meesho, 3),
        ];

        let result = aggregator().aggregate(&records, &catalog);

        assert!(result.orphans.is_empty());
        assert_eq!(result.demands.len(), 2);
        assert_eq!(result.demands[0].base_sku, "KIT-P02");
        assert_eq!(result.demands[0].base_units, 3);
        assert_eq!(result.demands[1].base_sku, "RX580");
        assert_eq!(result.demands[1].base_units, 2);
    }

    #[test]
    fn test_table_overrides_catalogued_sku_pack() {
        let mut table = MultiplierTable::new();
        table.insert("RX580", 2);
        let aggregator = DemandAggregator::new(SkuNormalizer::new(table), CategoryClassifier::default());
        let catalog: ProductCatalog = [product("RX580", 1)].into_iter().collect();

        let result = aggregator.aggregate(&[SalesRecord::new("RX580", Channel::Amazon, 3)], &catalog);

        assert_eq!(result.demands[0].base_units, 6);
    }

    #[test]
    fn test_listing_maps_to_base_with_own_pack() {
        let mut catalog = catalog();
        catalog
            .insert_listing(Listing {
                marketplace_sku: "WIDGET-BOX".to_string(),
                base_sku: "WIDGET".to_string(),
                pack_qty: 10,
            })
            .unwrap();
        let records = vec![
            SalesRecord::new("WIDGET-BOX", Channel::Flipkart, 2),
            SalesRecord::new("WIDGET-P04", Channel::Amazon, 1),
        ];

        let result = aggregator().aggregate(&records, &catalog);

        assert_eq!(result.demands.len(), 1);
        assert_eq!(result.demands[0].base_sku, "WIDGET");
        assert_eq!(result.demands[0].base_units, 24);
        assert_eq!(result.demands[0].listing_count, 2);
    }

    #[test]
    fn test_conflicting_order_rows_resolved_in_any_order() {
        let mut records = vec![
            SalesRecord::new("WIDGET", Channel::Flipkart, 3).with_order_id("OI-1"),
            SalesRecord::new("WIDGET", Channel::Flipkart, 5).with_order_id("OI-1"),
        ];
        let forward = aggregator().aggregate(&records, &catalog());
        records.reverse();
        let reversed = aggregator().aggregate(&records, &catalog());

        assert_eq!(forward.total_base_units(), 20);
        assert_eq!(forward.demands, reversed.demands);
        for result in [&forward, &reversed] {
            assert!(result.warnings.iter().any(|w| matches!(
                w,
                RunWarning::ConflictingOrderRow {
                    kept_units: 5,
                    dropped_units: 3,
                    ..
                }
            )));
        }
    }

    #[test]
    fn test_overflowing_rows_dropped_with_warning() {
        let records = vec![
            SalesRecord::new("WIDGET-P04", Channel::Amazon, u64::MAX),
            SalesRecord::new("WIDGET", Channel::Amazon, u64::MAX / 4),
            SalesRecord::new("WIDGET", Channel::Meesho, u64::MAX / 4),
            SalesRecord::new("GHOST-X3", Channel::Flipkart, u64::MAX),
            SalesRecord::new("CABLE", Channel::Meesho, 1),
        ];

        let result = aggregator().aggregate(&records, &catalog());

        let overflows = result
            .warnings
            .iter()
            .filter(|w| matches!(w, RunWarning::QuantityOverflow { .. }))
            .count();
        assert_eq!(overflows, 3);
        assert_eq!(result.retained_records, 2);
        assert!(result.orphans.is_empty());
        let widget = result.demands.iter().find(|d| d.base_sku == "WIDGET").unwrap();
        assert_eq!(widget.base_units, (u64::MAX / 4) * 4);
    }
}
