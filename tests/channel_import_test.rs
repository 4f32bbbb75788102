// ==========================================
// 渠道报表导入集成测试
// ==========================================
// 测试目标: 各渠道真实导出格式 → SalesRecord
// ==========================================

mod test_helpers;

use inventory_planner::importer::{parser_for, ImportError};
use inventory_planner::{logging, Channel, IssueLevel};
use test_helpers::{create_workspace, write_amazon, write_file, write_flipkart, write_meesho};

#[test]
fn test_amazon_business_report() {
    logging::init_test();
    let dir = create_workspace();
    let path = write_amazon(dir.path(), &[("widget-p04", 12), ("SOAP", 0), ("", 3)]);

    let import = parser_for(Channel::Amazon).parse_file(&path).unwrap();

    assert_eq!(import.report.total_rows, 3);
    assert_eq!(import.report.accepted, 1);
    assert_eq!(import.records[0].raw_sku, "WIDGET-P04");
    assert_eq!(import.records[0].units_sold, 12);
    assert_eq!(import.records[0].order_id, None);
    assert_eq!(import.report.count_level(IssueLevel::Error), 1);
    assert_eq!(import.report.count_level(IssueLevel::Warning), 1);
}

#[test]
fn test_flipkart_sku_extraction_and_status_filter() {
    let dir = create_workspace();
    let path = write_flipkart(
        dir.path(),
        &[
            ("OI-1", "2024-03-01 10:15:00", "Tax:18% SKU:CABLE-X2", "3", "Delivered"),
            ("OI-2", "2024-03-02", "SKU:CABLE-X2", "1", "RETURNED"),
            ("OI-3", "2024-03-03", "SOAP", "2", "SHIPPED"),
        ],
    );

    let import = parser_for(Channel::Flipkart).parse_file(&path).unwrap();

    assert_eq!(import.records.len(), 2);
    assert_eq!(import.records[0].raw_sku, "CABLE-X2");
    assert_eq!(import.records[0].order_id.as_deref(), Some("OI-1"));
    assert_eq!(
        import.records[0].order_date,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
    );
    assert_eq!(import.records[1].raw_sku, "SOAP");
    assert_eq!(import.total_units(), 5);
    assert_eq!(import.report.count_level(IssueLevel::Info), 1);
}

#[test]
fn test_meesho_excludes_cancelled_and_returns() {
    let dir = create_workspace();
    let path = write_meesho(
        dir.path(),
        &[
            ("S1", "2024-03-01", "SOAP", "2", "DELIVERED"),
            ("S2", "2024-03-01", "SOAP", "1", "CANCELLED"),
            ("S3", "2024-03-02", "SOAP", "4", "RTO_COMPLETE"),
            ("S4", "2024-03-02", "SOAP", "5", "RETURN"),
            ("S5", "2024-03-03", "SOAP", "\"1,000\"", "SHIPPED"),
        ],
    );

    let import = parser_for(Channel::Meesho).parse_file(&path).unwrap();

    assert_eq!(import.report.accepted, 2);
    assert_eq!(import.report.skipped, 3);
    assert_eq!(import.total_units(), 1002);
}

#[test]
fn test_missing_columns_is_schema_mismatch() {
    let dir = create_workspace();
    let path = write_file(dir.path(), "orders.csv", &["order_id,item", "1,SOAP"]);

    let err = parser_for(Channel::Meesho).parse_file(&path).unwrap_err();

    assert!(err.is_schema_mismatch());
    match err {
        ImportError::SchemaMismatch { missing, .. } => {
            assert_eq!(missing, vec!["SKU".to_string(), "Quantity".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_rejected() {
    let dir = create_workspace();
    let result = parser_for(Channel::Amazon).parse_file(&dir.path().join("nope.csv"));
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}
