// ==========================================
// 多渠道补货计划系统 - SKU 归一化器
// ==========================================
// 职责: 去除包装规格后缀，解析每个渠道 SKU 的件数倍率
// 后缀: -P04 / -PACKOF5 / -PACK OF 5 / -PACK5 / -X4 / _x4
// 优先级: 倍率表 > 后缀识别 > 1
// 红线: 只剥离一次后缀；冲突必须记录，不允许静默覆盖
//       X 前必须有分隔符（RX580 这类型号不是包装规格）
// ==========================================

use crate::domain::product::MultiplierTable;
use crate::domain::types::MultiplierSource;
use crate::engine::error::{PlanningError, PlanningResult};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

// 按顺序尝试，命中即停
static PACK_SUFFIX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(?P<base>.*?)[-_]P(?P<n>\d{1,3})$",
        r"^(?P<base>.*?)[-_ ]PACK\s*(?:OF\s*)?(?P<n>\d{1,3})$",
        r"^(?P<base>.*?)[-_]X(?P<n>\d{1,3})$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex pattern: PACK_SUFFIX_PATTERNS"))
    .collect()
});

/// 倍率表与后缀识别不一致
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplierConflict {
    pub pattern_multiplier: u32,
    pub table_multiplier: u32,
}

/// 归一化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSku {
    pub raw_sku: String,
    pub base_sku: String,
    pub multiplier: u32,
    pub source: MultiplierSource,
    pub conflict: Option<MultiplierConflict>,
}

impl NormalizedSku {
    /// 倍率是否来自本条 SKU 自身（倍率表或后缀），而非默认值
    pub fn has_explicit_multiplier(&self) -> bool {
        self.source != MultiplierSource::Default
    }
}

/// 识别包装后缀（输入须已大写）
///
/// # 返回
/// - Some((基础 SKU, 件数)): 命中后缀且件数 >= 1（基础 SKU 可能为空）
/// - None: 无后缀
pub fn strip_pack_suffix(sku: &str) -> Option<(String, u32)> {
    PACK_SUFFIX_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(sku)?;
        let n = caps.name("n")?.as_str().parse::<u32>().ok()?;
        if n == 0 {
            return None;
        }
        let base = caps.name("base").map_or("", |m| m.as_str()).trim();
        Some((base.to_string(), n))
    })
}

pub struct SkuNormalizer {
    multipliers: MultiplierTable,
}

impl SkuNormalizer {
    pub fn new(multipliers: MultiplierTable) -> Self {
        Self { multipliers }
    }

    /// 无倍率表的归一化器（仅后缀识别）
    pub fn pattern_only() -> Self {
        Self::new(MultiplierTable::new())
    }

    /// 倍率表中该 SKU 的倍率（大写后精确键，其次前缀）
    pub fn table_multiplier(&self, raw_sku: &str) -> Option<u32> {
        self.multipliers.lookup(&raw_sku.trim().to_uppercase())
    }

    /// 归一化单个 SKU
    ///
    /// # 返回
    /// - Ok(NormalizedSku)
    /// - Err(UnresolvedSku): 基础 SKU 为空
    pub fn normalize(&self, raw_sku: &str) -> PlanningResult<NormalizedSku> {
        let raw = raw_sku.trim().to_uppercase();

        let (base_sku, pattern_multiplier) = match strip_pack_suffix(&raw) {
            Some((base, n)) => (base, Some(n)),
            None => (raw.clone(), None),
        };

        if base_sku.is_empty() {
            return Err(PlanningError::UnresolvedSku {
                raw_sku: raw_sku.to_string(),
            });
        }

        let table_multiplier = self.multipliers.lookup(&raw);

        let (multiplier, source, conflict) = match (table_multiplier, pattern_multiplier) {
            (Some(table), Some(pattern)) if table != pattern => {
                warn!(
                    sku = %raw,
                    pattern_multiplier = pattern,
                    table_multiplier = table,
                    "倍率冲突：采用倍率表"
                );
                (
                    table,
                    MultiplierSource::Table,
                    Some(MultiplierConflict {
                        pattern_multiplier: pattern,
                        table_multiplier: table,
                    }),
                )
            }
            (Some(table), _) => (table, MultiplierSource::Table, None),
            (None, Some(pattern)) => (pattern, MultiplierSource::Pattern, None),
            (None, None) => (1, MultiplierSource::Default, None),
        };

        Ok(NormalizedSku {
            raw_sku: raw,
            base_sku,
            multiplier,
            source,
            conflict,
        })
    }
}
