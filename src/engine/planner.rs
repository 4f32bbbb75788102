// ==========================================
// 多渠道补货计划系统 - 计划编排器
// ==========================================
// 流程:
//   步骤0: 参数校验（非法 → InvalidConfiguration，不做任何计算）
//   步骤1: 渠道文件解析（单文件失败 → RejectedFile，不影响其他文件）
//   步骤2: SKU 归一化 + 主数据匹配 + 聚合
//   步骤3: 补货测算
// 红线: 一次运行要么得到完整计划，要么返回错误
// ==========================================

use crate::config::PlanningParams;
use crate::domain::plan::{OrphanSku, PlanSummary, PurchasePlanRow, RejectedFile, RunWarning};
use crate::domain::product::{CategoryRule, MultiplierTable, ProductCatalog};
use crate::domain::sales::{ChannelImport, ImportReport, SalesRecord};
use crate::domain::types::Channel;
use crate::engine::aggregator::DemandAggregator;
use crate::engine::classifier::CategoryClassifier;
use crate::engine::error::{PlanningError, PlanningResult};
use crate::engine::forecast::ForecastEngine;
use crate::engine::sku_normalizer::SkuNormalizer;
use crate::importer::{parser_for, CatalogLoader, MultiplierLoader};
use crate::perf::PerfGuard;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// SalesFile - 渠道销售文件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesFile {
    pub channel: Channel,
    pub path: PathBuf,
}

impl SalesFile {
    pub fn new(channel: Channel, path: impl Into<PathBuf>) -> Self {
        Self {
            channel,
            path: path.into(),
        }
    }
}

// ==========================================
// PlanningInputs - 一次运行的全部输入
// ==========================================
#[derive(Debug, Clone)]
pub struct PlanningInputs {
    pub sales_files: Vec<SalesFile>,
    pub catalog: ProductCatalog,
    pub multipliers: MultiplierTable,
    pub category_rules: Vec<CategoryRule>,
    pub params: PlanningParams,
}

impl PlanningInputs {
    /// 加载主数据与倍率表
    ///
    /// # 返回
    /// - Err(InvalidConfiguration): 主数据 / 倍率表缺失、结构不符或含非法值
    pub fn load(
        sales_files: Vec<SalesFile>,
        catalog_path: &Path,
        multiplier_path: Option<&Path>,
        category_rules: Vec<CategoryRule>,
        params: PlanningParams,
    ) -> PlanningResult<Self> {
        let catalog = CatalogLoader
            .load(catalog_path)
            .map_err(|e| PlanningError::from_config_import("商品主数据", e))?;

        let multipliers = match multiplier_path {
            Some(path) => MultiplierLoader
                .load(path)
                .map_err(|e| PlanningError::from_config_import("倍率表", e))?,
            None => MultiplierTable::new(),
        };

        Ok(Self {
            sales_files,
            catalog,
            multipliers,
            category_rules,
            params,
        })
    }
}

// ==========================================
// PlanResult - 运行结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub run_id: String,
    pub generated_on: NaiveDate,
    pub params: PlanningParams,
    pub rows: Vec<PurchasePlanRow>,
    pub orphans: Vec<OrphanSku>,
    pub file_reports: Vec<ImportReport>,
    pub rejected_files: Vec<RejectedFile>,
    pub warnings: Vec<RunWarning>,
    pub summary: PlanSummary,
}

// ==========================================
// ReplenishmentPlanner - 计划编排器
// ==========================================
#[derive(Debug, Default)]
pub struct ReplenishmentPlanner {
    forecast: ForecastEngine,
}

impl ReplenishmentPlanner {
    pub fn new() -> Self {
        Self {
            forecast: ForecastEngine::new(),
        }
    }

    /// 执行完整计划流程
    ///
    /// # 返回
    /// - Ok(PlanResult)
    /// - Err(InvalidConfiguration): 参数非法
    /// - Err(NoSalesData): 未提供销售文件，或全部文件被拒绝
    #[instrument(skip(self, inputs), fields(files = inputs.sales_files.len()))]
    pub fn run(&self, inputs: PlanningInputs) -> PlanningResult<PlanResult> {
        let _perf = PerfGuard::new("plan_run");
        let run_id = Uuid::new_v4().to_string();

        // ==========================================
        // 步骤0: 参数校验
        // ==========================================
        validate_params(&inputs.params)?;
        if inputs.sales_files.is_empty() {
            return Err(PlanningError::NoSalesData("未提供任何渠道销售文件".to_string()));
        }

        info!(
            run_id = %run_id,
            catalog = inputs.catalog.len(),
            multipliers = inputs.multipliers.len(),
            "开始生成补货计划"
        );

        // ==========================================
        // 步骤1: 渠道文件解析
        // ==========================================
        let (imports, rejected_files) = import_sales_files(&inputs.sales_files);
        if imports.is_empty() {
            return Err(PlanningError::NoSalesData(format!(
                "全部 {} 个销售文件均被拒绝",
                rejected_files.len()
            )));
        }

        self.plan_from_imports(run_id, imports, rejected_files, inputs)
    }

    /// 基于已解析的渠道数据生成计划
    pub fn plan_from_imports(
        &self,
        run_id: String,
        imports: Vec<ChannelImport>,
        rejected_files: Vec<RejectedFile>,
        inputs: PlanningInputs,
    ) -> PlanningResult<PlanResult> {
        validate_params(&inputs.params)?;

        let mut file_reports = Vec::with_capacity(imports.len());
        let mut records: Vec<SalesRecord> = Vec::new();
        for import in imports {
            records.extend(import.records);
            file_reports.push(import.report);
        }

        let mut warnings = Vec::new();
        if let Some(warning) = check_sales_window(&records, inputs.params.sales_window_days) {
            warnings.push(warning);
        }

        // ==========================================
        // 步骤2: 归一化 + 聚合
        // ==========================================
        let aggregation = {
            let mut perf = PerfGuard::new("aggregate");
            perf.set_items(records.len());
            let aggregator = DemandAggregator::new(
                SkuNormalizer::new(inputs.multipliers),
                CategoryClassifier::new(inputs.category_rules),
            );
            aggregator.aggregate(&records, &inputs.catalog)
        };
        let orphan_base_units = aggregation.total_orphan_base_units();
        warnings.extend(aggregation.warnings);

        // ==========================================
        // 步骤3: 补货测算
        // ==========================================
        let rows = {
            let mut perf = PerfGuard::new("forecast");
            perf.set_items(aggregation.demands.len());
            self.forecast.compute(&aggregation.demands, &inputs.params)?
        };

        let summary = PlanSummary::from_rows(&rows, &aggregation.orphans);

        info!(
            run_id = %run_id,
            products = summary.unique_products,
            base_units = summary.total_base_units_sold,
            to_buy = summary.total_units_to_buy,
            orphans = summary.orphan_count,
            orphan_base_units,
            rejected = rejected_files.len(),
            warnings = warnings.len(),
            "补货计划生成完成"
        );

        Ok(PlanResult {
            run_id,
            generated_on: Local::now().date_naive(),
            params: inputs.params,
            rows,
            orphans: aggregation.orphans,
            file_reports,
            rejected_files,
            warnings,
            summary,
        })
    }
}

fn validate_params(params: &PlanningParams) -> PlanningResult<()> {
    if params.sales_window_days == 0 {
        return Err(PlanningError::invalid_config("销售窗口天数必须 >= 1"));
    }
    if params.purchase_window_days == 0 {
        return Err(PlanningError::invalid_config("采购周期天数必须 >= 1"));
    }
    Ok(())
}

/// 逐个解析渠道文件；单文件失败只拒绝该文件
fn import_sales_files(files: &[SalesFile]) -> (Vec<ChannelImport>, Vec<RejectedFile>) {
    let _perf = PerfGuard::new("import_sales_files");
    let mut imports = Vec::new();
    let mut rejected = Vec::new();

    for file in files {
        let source = file.path.display().to_string();
        match parser_for(file.channel).parse_file(&file.path) {
            Ok(import) => {
                info!(
                    channel = %file.channel,
                    source = %source,
                    accepted = import.report.accepted,
                    skipped = import.report.skipped,
                    units = import.total_units(),
                    "渠道文件解析完成"
                );
                imports.push(import);
            }
            Err(e) => {
                warn!(channel = %file.channel, source = %source, error = %e, "渠道文件被拒绝");
                rejected.push(RejectedFile {
                    source,
                    channel: file.channel,
                    reason: e.to_string(),
                });
            }
        }
    }

    (imports, rejected)
}

/// 订单日期跨度（含首尾两天）超过销售窗口时返回告警
fn check_sales_window(records: &[SalesRecord], sales_window_days: u32) -> Option<RunWarning> {
    let mut dates = records.iter().filter_map(|r| r.order_date);
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    let observed_days = (max - min).num_days() + 1;

    if observed_days > i64::from(sales_window_days) {
        warn!(
            observed_days,
            sales_window_days,
            from = %min,
            to = %max,
            "订单日期跨度超过销售窗口"
        );
        return Some(RunWarning::SalesWindowMismatch {
            observed_days,
            sales_window_days,
        });
    }
    None
}
