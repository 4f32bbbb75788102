// ==========================================
// 多渠道补货计划系统 - 命令行入口
// ==========================================
// 流程: 读取设置 → 校验参数 → 加载主数据 → 生成计划 → 写出报表
// 退出码: 成功 0；任何运行失败非 0
// ==========================================

use anyhow::{bail, Context, Result};
use clap::Parser;
use inventory_planner::config::{AppSettings, PlanningParams};
use inventory_planner::engine::{PlanResult, PlanningInputs, ReplenishmentPlanner, SalesFile};
use inventory_planner::report::{default_output_file_name, ReportWriter};
use inventory_planner::{logging, Channel};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "inventory-planner")]
#[command(about = "多渠道补货计划：渠道销售导出 → 基础 SKU 采购建议")]
#[command(version)]
struct Cli {
    /// Amazon Business Report 导出文件
    #[arg(long)]
    amazon: Option<PathBuf>,

    /// Flipkart 订单导出文件
    #[arg(long)]
    flipkart: Option<PathBuf>,

    /// Meesho 订单导出文件
    #[arg(long)]
    meesho: Option<PathBuf>,

    /// 商品主数据（base_sku/internal_sku, pack_qty, 可选 marketplace_sku, category, supplier）
    #[arg(long, env = "INVENTORY_PLANNER_CATALOG")]
    catalog: Option<PathBuf>,

    /// SKU 件数倍率覆盖表（sku, multiplier）
    #[arg(long)]
    multipliers: Option<PathBuf>,

    /// 设置文件路径
    #[arg(long)]
    settings: Option<PathBuf>,

    /// 销售统计窗口天数
    #[arg(long, allow_negative_numbers = true)]
    sales_days: Option<i64>,

    /// 采购覆盖天数
    #[arg(long, allow_negative_numbers = true)]
    purchase_days: Option<i64>,

    /// 采购提前期天数
    #[arg(long, allow_negative_numbers = true)]
    lead_time: Option<i64>,

    /// 安全库存天数
    #[arg(long, allow_negative_numbers = true)]
    safety_days: Option<i64>,

    /// 输出文件（默认: Purchase_Plan_YYYY-MM-DD.csv）
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// 允许覆盖已有输出文件
    #[arg(long)]
    force: bool,

    /// 保存本次参数为新的默认值
    #[arg(long)]
    remember: bool,

    /// JSON 格式日志
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn sales_files(&self) -> Vec<SalesFile> {
        [
            (Channel::Amazon, &self.amazon),
            (Channel::Flipkart, &self.flipkart),
            (Channel::Meesho, &self.meesho),
        ]
        .into_iter()
        .filter_map(|(channel, path)| path.as_ref().map(|p| SalesFile::new(channel, p)))
        .collect()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("{} v{}", inventory_planner::APP_NAME, inventory_planner::VERSION);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings_path = cli.settings.clone().unwrap_or_else(AppSettings::default_path);
    let mut settings = AppSettings::load_or_default(&settings_path)?;

    // 命令行参数优先，缺省取设置中的默认值
    let defaults = &settings.defaults;
    let params = PlanningParams::new(
        cli.sales_days.unwrap_or(defaults.sales_period_days),
        cli.purchase_days.unwrap_or(defaults.purchase_period_days),
        cli.lead_time.unwrap_or(defaults.lead_time_days),
        Some(cli.safety_days.unwrap_or(defaults.safety_stock_days)),
    )?;

    let sales_files = cli.sales_files();
    if sales_files.is_empty() {
        bail!("至少需要提供一个渠道销售文件（--amazon / --flipkart / --meesho）");
    }

    let catalog_path = cli
        .catalog
        .clone()
        .or_else(|| settings.master_catalog_path.clone())
        .context("未指定商品主数据文件（--catalog 或设置中的 master_catalog_path）")?;
    let multiplier_path = cli
        .multipliers
        .clone()
        .or_else(|| settings.multiplier_table_path.clone());

    let inputs = PlanningInputs::load(
        sales_files,
        &catalog_path,
        multiplier_path.as_deref(),
        settings.category_rules.clone(),
        params,
    )?;

    let result = ReplenishmentPlanner::new().run(inputs)?;

    let output = match cli.output.clone() {
        Some(path) => path,
        None => settings
            .output_dir
            .clone()
            .unwrap_or_default()
            .join(default_output_file_name(result.generated_on)),
    };

    let written = ReportWriter::new()
        .with_overwrite(cli.force)
        .write(&result, &output)
        .with_context(|| format!("写出报表失败: {}", output.display()))?;

    print_summary(&result);
    println!();
    println!("采购计划: {}", written.plan_path.display());
    if let Some(path) = &written.orphan_path {
        println!("缺失主数据 SKU 清单: {}", path.display());
    }

    if cli.remember {
        settings.remember(&params);
        settings.master_catalog_path = Some(catalog_path);
        if multiplier_path.is_some() {
            settings.multiplier_table_path = multiplier_path;
        }
        settings.save(&settings_path)?;
        println!("参数已保存为默认值: {}", settings_path.display());
    }

    Ok(())
}

fn print_summary(result: &PlanResult) {
    let summary = &result.summary;
    println!("==================================================");
    println!("补货计划 {}（{}）", result.run_id, result.generated_on);
    println!(
        "参数: 销售窗口 {} 天 / 采购周期 {} 天 / 提前期 {} 天 / 安全库存 {} 天",
        result.params.sales_window_days,
        result.params.purchase_window_days,
        result.params.lead_time_days,
        result.params.safety_stock_days
    );
    println!("==================================================");
    println!("销售基础件合计: {}", summary.total_base_units_sold);
    println!("建议采购合计:   {}", summary.total_units_to_buy);
    println!("涉及商品数:     {}", summary.unique_products);

    if !result.rows.is_empty() {
        println!();
        println!(
            "{:<20} {:<14} {:>8} {:>8} {:>6} {}",
            "SKU", "品类", "建议采购", "ADS", "渠道数", "供应商"
        );
        for row in &result.rows {
            println!(
                "{:<20} {:<14} {:>8} {:>8.2} {:>6} {}",
                row.sku,
                row.category,
                row.recommended_purchase_qty,
                row.average_daily_sales,
                row.listing_count,
                row.supplier.as_deref().unwrap_or("-")
            );
        }

        // 按供应商汇总建议采购量
        let mut by_supplier: BTreeMap<&str, u64> = BTreeMap::new();
        for row in &result.rows {
            let total = by_supplier
                .entry(row.supplier.as_deref().unwrap_or("-"))
                .or_default();
            *total = total.saturating_add(row.recommended_purchase_qty);
        }
        println!();
        println!("按供应商:");
        for (supplier, qty) in &by_supplier {
            println!("  {:<24} {}", supplier, qty);
        }
    }

    if !result.rejected_files.is_empty() {
        println!();
        println!("被拒绝的文件 ({}):", result.rejected_files.len());
        for rejected in &result.rejected_files {
            println!("  [{}] {}: {}", rejected.channel, rejected.source, rejected.reason);
        }
    }

    if !result.orphans.is_empty() {
        println!();
        println!("主数据缺失 SKU ({}):", result.orphans.len());
        for orphan in &result.orphans {
            let channels = orphan
                .channels
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {} 销量 {}（{}）", orphan.raw_sku, orphan.units_sold, channels);
        }
    }

    let warnings = result
        .warnings
        .iter()
        .filter(|w| !matches!(w, inventory_planner::RunWarning::OrphanSku { .. }))
        .count();
    if warnings > 0 {
        println!();
        println!("其他告警 {} 条（详见日志）", warnings);
    }
}
