// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 在临时目录中生成渠道导出 / 主数据 / 倍率表文件
// ==========================================

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 创建临时工作目录（需要保持存活）
pub fn create_workspace() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// 写入文本文件并返回路径
pub fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// 标准主数据: WIDGET(4, TOOL) / CABLE(2, 无品类) / SOAP(1, CARE)
pub fn write_catalog(dir: &Path) -> PathBuf {
    write_file(
        dir,
        "master.csv",
        &[
            "base_sku,pack_qty,category,supplier",
            "WIDGET,4,TOOL,Acme",
            "CABLE,2,,",
            "SOAP,1,CARE,Fresh Co",
        ],
    )
}

/// Amazon Business Report
pub fn write_amazon(dir: &Path, rows: &[(&str, u64)]) -> PathBuf {
    let mut lines = vec!["(Parent) ASIN,(Child) ASIN,SKU,Units Ordered".to_string()];
    for (i, (sku, units)) in rows.iter().enumerate() {
        lines.push(format!("B00P{i},B00C{i},{sku},{units}"));
    }
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_file(dir, "amazon.csv", &lines)
}

/// Flipkart Orders Report: (order_item_id, order_date, sku 单元格, quantity, status)
pub fn write_flipkart(dir: &Path, rows: &[(&str, &str, &str, &str, &str)]) -> PathBuf {
    let mut lines = vec!["order_item_id,order_date,sku,quantity,order_item_status".to_string()];
    for (id, date, sku, qty, status) in rows {
        lines.push(format!("{id},{date},\"{sku}\",{qty},{status}"));
    }
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_file(dir, "flipkart.csv", &lines)
}

/// Meesho Orders Report: (sub_order_no, order_date, sku, quantity, reason)
pub fn write_meesho(dir: &Path, rows: &[(&str, &str, &str, &str, &str)]) -> PathBuf {
    let mut lines =
        vec!["Reason for Credit Entry,Sub Order No,Order Date,SKU,Quantity".to_string()];
    for (id, date, sku, qty, reason) in rows {
        lines.push(format!("{reason},{id},{date},{sku},{qty}"));
    }
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_file(dir, "meesho.csv", &lines)
}

/// 读取 CSV 文件的全部行
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read output file")
        .lines()
        .map(str::to_string)
        .collect()
}
