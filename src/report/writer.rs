// ==========================================
// 多渠道补货计划系统 - 报表输出
// ==========================================
// 计划表列顺序: sku, category, qty, recommended_purchase_qty, ads, listing_count, supplier
// 孤儿清单列顺序: sku, base_sku, channels, qty, base_units, category
// 红线: 先写临时文件，全部成功后再改名落盘；默认不覆盖已有文件
//       改名中途失败时已落盘的文件回滚为原内容（计划表最后改名）
// ==========================================

use crate::domain::plan::{OrphanSku, PurchasePlanRow};
use crate::engine::planner::PlanResult;
use crate::report::error::{ReportError, ReportResult};
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

const PLAN_HEADERS: [&str; 7] = [
    "sku",
    "category",
    "qty",
    "recommended_purchase_qty",
    "ads",
    "listing_count",
    "supplier",
];
const ORPHAN_HEADERS: [&str; 6] = ["sku", "base_sku", "channels", "qty", "base_units", "category"];

/// 默认输出文件名: Purchase_Plan_YYYY-MM-DD.csv
pub fn default_output_file_name(date: NaiveDate) -> String {
    format!("Purchase_Plan_{}.csv", date.format("%Y-%m-%d"))
}

/// 孤儿清单路径: <stem>_unknown_skus.csv（与计划表同目录）
pub fn orphan_report_path(plan_path: &Path) -> PathBuf {
    let stem = plan_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Purchase_Plan".to_string());
    plan_path.with_file_name(format!("{}_unknown_skus.csv", stem))
}

/// 已写出的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReport {
    pub plan_path: PathBuf,
    pub orphan_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ReportWriter {
    overwrite: bool,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// 序列化采购计划
    pub fn write_plan<W: Write>(&self, rows: &[PurchasePlanRow], out: W) -> ReportResult<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(PLAN_HEADERS)?;
        for row in rows {
            let qty = row.total_units_sold_in_window.to_string();
            let recommended = row.recommended_purchase_qty.to_string();
            let ads = format!("{:.2}", row.average_daily_sales);
            let listing_count = row.listing_count.to_string();
            writer.write_record([
                row.sku.as_str(),
                row.category.as_str(),
                qty.as_str(),
                recommended.as_str(),
                ads.as_str(),
                listing_count.as_str(),
                row.supplier.as_deref().unwrap_or(""),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 序列化孤儿 SKU 清单（渠道以 ";" 分隔）
    pub fn write_orphans<W: Write>(&self, orphans: &[OrphanSku], out: W) -> ReportResult<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(ORPHAN_HEADERS)?;
        for orphan in orphans {
            let channels = orphan
                .channels
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(";");
            let qty = orphan.units_sold.to_string();
            let base_units = orphan.base_units.to_string();
            writer.write_record([
                orphan.raw_sku.as_str(),
                orphan.base_sku.as_str(),
                channels.as_str(),
                qty.as_str(),
                base_units.as_str(),
                orphan.category.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 将运行结果写入磁盘
    ///
    /// # 返回
    /// - Ok(WrittenReport): 计划表路径 + 孤儿清单路径（无孤儿时为 None）
    /// - Err(OutputExists): 目标已存在且未允许覆盖，磁盘无任何改动
    pub fn write(&self, result: &PlanResult, plan_path: &Path) -> ReportResult<WrittenReport> {
        if plan_path.file_name().is_none() {
            return Err(ReportError::InvalidPath(plan_path.display().to_string()));
        }

        let orphan_path = (!result.orphans.is_empty()).then(|| orphan_report_path(plan_path));

        let targets: Vec<&Path> = std::iter::once(plan_path)
            .chain(orphan_path.as_deref())
            .collect();
        if !self.overwrite {
            if let Some(existing) = targets.iter().find(|p| p.exists()) {
                return Err(ReportError::OutputExists(existing.display().to_string()));
            }
        }

        if let Some(parent) = plan_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // === 阶段1: 写临时文件（孤儿清单在前，计划表最后落盘） ===
        let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(targets.len());
        let staging = (|| -> ReportResult<()> {
            if let Some(path) = orphan_path.as_deref() {
                let tmp = temp_sibling(path);
                staged.push((tmp.clone(), path));
                self.write_orphans(&result.orphans, std::fs::File::create(&tmp)?)?;
            }

            let tmp = temp_sibling(plan_path);
            staged.push((tmp.clone(), plan_path));
            self.write_plan(&result.rows, std::fs::File::create(&tmp)?)?;
            Ok(())
        })();

        if let Err(e) = staging {
            discard(&staged);
            return Err(e);
        }

        // === 阶段2: 改名落盘 ===
        if let Err(e) = commit(&staged) {
            discard(&staged);
            return Err(e.into());
        }

        info!(
            plan = %plan_path.display(),
            rows = result.rows.len(),
            orphans = result.orphans.len(),
            "报表已写出"
        );

        Ok(WrittenReport {
            plan_path: plan_path.to_path_buf(),
            orphan_path,
        })
    }
}

fn temp_sibling(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}

/// 按顺序改名落盘
///
/// 已存在的目标先改名为备份；任一步失败时，已落盘的目标恢复为原内容
fn commit(staged: &[(PathBuf, &Path)]) -> std::io::Result<()> {
    let mut committed: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());

    for (tmp, target) in staged {
        let target: &Path = target;
        let backup = if target.exists() {
            let backup = temp_sibling(target);
            if let Err(e) = std::fs::rename(target, &backup) {
                rollback(&committed);
                return Err(e);
            }
            Some(backup)
        } else {
            None
        };

        if let Err(e) = std::fs::rename(tmp, target) {
            if let Some(backup) = &backup {
                restore(backup, target);
            }
            rollback(&committed);
            return Err(e);
        }
        committed.push((target, backup));
    }

    for backup in committed.iter().filter_map(|(_, b)| b.as_ref()) {
        if let Err(e) = std::fs::remove_file(backup) {
            warn!(path = %backup.display(), error = %e, "备份文件清理失败");
        }
    }
    Ok(())
}

/// 撤销已落盘的文件：有备份则还原，否则删除
fn rollback(committed: &[(&Path, Option<PathBuf>)]) {
    for (target, backup) in committed.iter().rev() {
        match backup {
            Some(backup) => restore(backup, target),
            None => {
                if let Err(e) = std::fs::remove_file(target) {
                    warn!(path = %target.display(), error = %e, "回滚删除失败");
                }
            }
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(e) = std::fs::rename(backup, target) {
        warn!(
            backup = %backup.display(),
            path = %target.display(),
            error = %e,
            "原文件还原失败"
        );
    }
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        if tmp.exists() {
            if let Err(e) = std::fs::remove_file(tmp) {
                warn!(path = %tmp.display(), error = %e, "临时文件清理失败");
            }
        }
    }
}
