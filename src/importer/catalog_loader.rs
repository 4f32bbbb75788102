// ==========================================
// 多渠道补货计划系统 - 主数据 / 倍率表加载器
// ==========================================
// 职责: 商品主数据目录、件数倍率覆盖表的读取与校验
// 主数据两种行:
//   - 基础商品行: base_sku(internal_sku), pack_qty
//   - 渠道商品行: marketplace_sku → internal_sku，pack_qty 为该渠道商品的件数
//     多行可共用一个 internal_sku；基础商品未单独声明时由首个渠道商品行补建
// 红线: 任何错误都是配置错误，由上层中止整个运行
// ==========================================

use crate::domain::product::{Listing, MasterProduct, MultiplierTable, ProductCatalog};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{FieldMapper, FieldSpec};
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use std::path::Path;
use tracing::info;

const CATALOG_SKU: FieldSpec = FieldSpec::new("base_sku", &["base_sku", "internal_sku", "sku"]);
const CATALOG_PACK: FieldSpec = FieldSpec::new("pack_qty", &["pack_qty"]);
const CATALOG_CATEGORY: FieldSpec = FieldSpec::new("category", &["category"]);
const CATALOG_SUPPLIER: FieldSpec = FieldSpec::new("supplier", &["supplier"]);
const CATALOG_LISTING: FieldSpec =
    FieldSpec::new("marketplace_sku", &["marketplace_sku", "listing_sku"]);

const MULTIPLIER_SKU: FieldSpec = FieldSpec::new("sku", &["sku", "sku_pattern", "pattern"]);
const MULTIPLIER_VALUE: FieldSpec =
    FieldSpec::new("multiplier", &["multiplier", "units_per_sale", "pack_qty"]);

/// 解析正整数配置值
fn parse_positive(value: Option<&str>, row: usize, field: &str) -> ImportResult<u32> {
    let raw = value.ok_or_else(|| ImportError::ValueError {
        row,
        field: field.to_string(),
        message: "值为空".to_string(),
    })?;

    let compact: String = raw.chars().filter(|c| *c != ',').collect();
    let parsed = compact
        .parse::<u32>()
        .ok()
        .or_else(|| {
            compact
                .parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u32)
        })
        .ok_or_else(|| ImportError::ValueError {
            row,
            field: field.to_string(),
            message: format!("无法解析为正整数: {}", raw),
        })?;

    if parsed == 0 {
        return Err(ImportError::ValueError {
            row,
            field: field.to_string(),
            message: "必须 >= 1".to_string(),
        });
    }
    Ok(parsed)
}

// ==========================================
// CatalogLoader - 商品主数据加载
// ==========================================
pub struct CatalogLoader;

impl CatalogLoader {
    /// 从文件加载主数据（CSV / Excel）
    pub fn load<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ProductCatalog> {
        let path = file_path.as_ref();
        let table = UniversalFileParser::new().parse(path)?;
        let catalog = self.load_table(&table, &path.display().to_string())?;
        info!(
            file = %path.display(),
            products = catalog.len(),
            listings = catalog.listing_count(),
            "主数据加载完成"
        );
        Ok(catalog)
    }

    /// 从原始表构造主数据目录
    ///
    /// # 校验
    /// - base_sku / pack_qty 列必须存在
    /// - base_sku 非空；基础商品行之间唯一（清洗后比较）
    /// - marketplace_sku 唯一
    /// - pack_qty 为正整数
    pub fn load_table(&self, table: &RawTable, source: &str) -> ImportResult<ProductCatalog> {
        let mapper = FieldMapper::resolve(
            &table.headers,
            &[CATALOG_SKU, CATALOG_PACK],
            &[CATALOG_CATEGORY, CATALOG_SUPPLIER, CATALOG_LISTING],
            source,
        )?;
        let cleaner = DataCleaner;
        let mut catalog = ProductCatalog::new();
        let mut listing_rows: Vec<(usize, Listing, MasterProduct)> = Vec::new();

        for row in &table.rows {
            let base_sku = mapper
                .get_string(row, CATALOG_SKU.name)
                .and_then(|v| cleaner.clean_sku(v))
                .ok_or_else(|| ImportError::ValueError {
                    row: row.row_number,
                    field: CATALOG_SKU.name.to_string(),
                    message: "base_sku 为空".to_string(),
                })?;

            let pack_qty = parse_positive(
                mapper.get_string(row, CATALOG_PACK.name),
                row.row_number,
                CATALOG_PACK.name,
            )?;

            let product = MasterProduct {
                base_sku,
                pack_qty,
                category: mapper
                    .get_string(row, CATALOG_CATEGORY.name)
                    .map(|v| cleaner.clean_text(v, true))
                    .unwrap_or_default(),
                supplier: mapper
                    .get_string(row, CATALOG_SUPPLIER.name)
                    .map(str::to_string),
            };

            match mapper
                .get_string(row, CATALOG_LISTING.name)
                .and_then(|v| cleaner.clean_sku(v))
            {
                Some(marketplace_sku) => {
                    let listing = Listing {
                        marketplace_sku,
                        base_sku: product.base_sku.clone(),
                        pack_qty,
                    };
                    listing_rows.push((row.row_number, listing, product));
                }
                None => catalog
                    .insert(product)
                    .map_err(|dup| ImportError::DuplicateKey {
                        row: row.row_number,
                        key: dup.base_sku,
                    })?,
            }
        }

        // 渠道商品行在基础商品行之后登记，结果与行顺序无关
        for (row_number, listing, product) in listing_rows {
            if !catalog.contains(&product.base_sku) {
                let pack_qty = if listing.marketplace_sku == product.base_sku {
                    product.pack_qty
                } else {
                    1
                };
                let _ = catalog.insert(MasterProduct { pack_qty, ..product });
            }
            catalog
                .insert_listing(listing)
                .map_err(|dup| ImportError::DuplicateKey {
                    row: row_number,
                    key: dup.marketplace_sku,
                })?;
        }

        Ok(catalog)
    }
}

// ==========================================
// MultiplierLoader - 件数倍率覆盖表加载
// ==========================================
pub struct MultiplierLoader;

impl MultiplierLoader {
    pub fn load<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<MultiplierTable> {
        let path = file_path.as_ref();
        let table = UniversalFileParser::new().parse(path)?;
        let multipliers = self.load_table(&table, &path.display().to_string())?;
        info!(file = %path.display(), entries = multipliers.len(), "倍率表加载完成");
        Ok(multipliers)
    }

    pub fn load_table(&self, table: &RawTable, source: &str) -> ImportResult<MultiplierTable> {
        let mapper =
            FieldMapper::resolve(&table.headers, &[MULTIPLIER_SKU, MULTIPLIER_VALUE], &[], source)?;
        let mut multipliers = MultiplierTable::new();

        for row in &table.rows {
            let key = mapper
                .get_string(row, MULTIPLIER_SKU.name)
                .ok_or_else(|| ImportError::ValueError {
                    row: row.row_number,
                    field: MULTIPLIER_SKU.name.to_string(),
                    message: "SKU 为空".to_string(),
                })?;
            let multiplier = parse_positive(
                mapper.get_string(row, MULTIPLIER_VALUE.name),
                row.row_number,
                MULTIPLIER_VALUE.name,
            )?;

            if !multipliers.insert(key, multiplier) {
                return Err(ImportError::DuplicateKey {
                    row: row.row_number,
                    key: key.to_uppercase(),
                });
            }
        }

        Ok(multipliers)
    }
}
