// ==========================================
// 多渠道补货计划系统 - 商品主数据模型
// ==========================================
// 用途: 导入层写入，引擎层只读
// 生命周期: 每次运行重新加载，运行期间不可变
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// MasterProduct - 商品主数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterProduct {
    pub base_sku: String,         // 基础 SKU（唯一键）
    pub pack_qty: u32,            // 每个销售单位包含的基础件数（>= 1）
    pub category: String,         // 品类（可为空，为空时走前缀规则）
    pub supplier: Option<String>, // 供应商
}

// ==========================================
// Listing - 渠道商品（marketplace_sku → 基础 SKU）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub marketplace_sku: String, // 渠道 SKU（唯一键）
    pub base_sku: String,        // 对应基础 SKU
    pub pack_qty: u32,           // 该渠道商品包含的基础件数
}

// ==========================================
// ProductCatalog - 主数据目录
// ==========================================
// 红线: base_sku 唯一，marketplace_sku 唯一；重复键由加载器判定为配置错误
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: HashMap<String, MasterProduct>,
    listings: HashMap<String, Listing>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入商品；键已存在时不覆盖，返回被拒绝的商品
    pub fn insert(&mut self, product: MasterProduct) -> Result<(), MasterProduct> {
        if self.products.contains_key(&product.base_sku) {
            return Err(product);
        }
        self.products.insert(product.base_sku.clone(), product);
        Ok(())
    }

    /// 登记渠道商品；marketplace_sku 已存在或基础 SKU 未登记时返回被拒绝的条目
    pub fn insert_listing(&mut self, listing: Listing) -> Result<(), Listing> {
        if self.listings.contains_key(&listing.marketplace_sku)
            || !self.products.contains_key(&listing.base_sku)
        {
            return Err(listing);
        }
        self.listings.insert(listing.marketplace_sku.clone(), listing);
        Ok(())
    }

    pub fn get(&self, base_sku: &str) -> Option<&MasterProduct> {
        self.products.get(base_sku)
    }

    pub fn get_listing(&self, marketplace_sku: &str) -> Option<&Listing> {
        self.listings.get(marketplace_sku)
    }

    /// 按渠道 SKU 原样匹配（不剥离后缀）
    ///
    /// # 返回
    /// - Some((商品, 件数)): 渠道商品优先，其次基础 SKU 本身
    /// - None: 需要走后缀归一化
    pub fn match_exact(&self, sku: &str) -> Option<(&MasterProduct, u32)> {
        if let Some(listing) = self.listings.get(sku) {
            return self
                .products
                .get(&listing.base_sku)
                .map(|product| (product, listing.pack_qty));
        }
        self.products.get(sku).map(|product| (product, product.pack_qty))
    }

    pub fn contains(&self, base_sku: &str) -> bool {
        self.products.contains_key(base_sku)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn listing_count(&self) -> usize {
        self.listings.len()
    }
}

impl FromIterator<MasterProduct> for ProductCatalog {
    /// 用于测试与内存构造：重复键保留首个
    fn from_iter<I: IntoIterator<Item = MasterProduct>>(iter: I) -> Self {
        let mut catalog = ProductCatalog::new();
        for product in iter {
            let _ = catalog.insert(product);
        }
        catalog
    }
}

// ==========================================
// MultiplierTable - 件数倍率覆盖表
// ==========================================
// 键: 精确 SKU，或以 `*` 结尾的前缀模式（如 `COMBO-*`）
// 查找顺序: 精确键 > 最长前缀模式
#[derive(Debug, Clone, Default)]
pub struct MultiplierTable {
    exact: HashMap<String, u32>,
    prefixes: Vec<(String, u32)>,
}

impl MultiplierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一条倍率；键已存在时返回 false
    pub fn insert(&mut self, key: &str, multiplier: u32) -> bool {
        let key = key.trim().to_uppercase();
        match key.strip_suffix('*') {
            Some(prefix) => {
                if self.prefixes.iter().any(|(p, _)| p == prefix) {
                    return false;
                }
                self.prefixes.push((prefix.to_string(), multiplier));
                // 最长前缀优先
                self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));
                true
            }
            None => {
                if self.exact.contains_key(&key) {
                    return false;
                }
                self.exact.insert(key, multiplier);
                true
            }
        }
    }

    pub fn lookup(&self, sku: &str) -> Option<u32> {
        if let Some(m) = self.exact.get(sku) {
            return Some(*m);
        }
        self.prefixes
            .iter()
            .find(|(prefix, _)| sku.starts_with(prefix.as_str()))
            .map(|(_, m)| *m)
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ==========================================
// CategoryRule - 品类前缀规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub prefix: String,
    pub category: String,
}

impl CategoryRule {
    pub fn new(prefix: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            category: category.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, pack_qty: u32) -> MasterProduct {
        MasterProduct {
            base_sku: sku.to_string(),
            pack_qty,
            category: "TOOL".to_string(),
            supplier: None,
        }
    }

    #[test]
    fn test_catalog_rejects_duplicate() {
        let mut catalog = ProductCatalog::new();
        assert!(catalog.insert(product("WIDGET", 4)).is_ok());
        let rejected = catalog.insert(product("WIDGET", 6)).unwrap_err();
        assert_eq!(rejected.pack_qty, 6);
        assert_eq!(catalog.get("WIDGET").unwrap().pack_qty, 4);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_listing_match_uses_listing_pack() {
        let mut catalog = ProductCatalog::new();
        catalog.insert(product("WIDGET", 1)).unwrap();
        catalog
            .insert_listing(Listing {
                marketplace_sku: "WIDGET-BOX".to_string(),
                base_sku: "WIDGET".to_string(),
                pack_qty: 10,
            })
            .unwrap();

        let (hit, pack) = catalog.match_exact("WIDGET-BOX").unwrap();
        assert_eq!(hit.base_sku, "WIDGET");
        assert_eq!(pack, 10);
        assert_eq!(catalog.match_exact("WIDGET").map(|(_, p)| p), Some(1));
        assert!(catalog.match_exact("WIDGET-P04").is_none());
    }

    #[test]
    fn test_listing_rejects_duplicate_and_unknown_base() {
        let mut catalog = ProductCatalog::new();
        catalog.insert(product("WIDGET", 1)).unwrap();
        let listing = |sku: &str, base: &str| Listing {
            marketplace_sku: sku.to_string(),
            base_sku: base.to_string(),
            pack_qty: 2,
        };

        assert!(catalog.insert_listing(listing("W-2", "WIDGET")).is_ok());
        assert!(catalog.insert_listing(listing("W-2", "WIDGET")).is_err());
        assert!(catalog.insert_listing(listing("G-2", "GADGET")).is_err());
        assert_eq!(catalog.listing_count(), 1);
    }

    #[test]
    fn test_multiplier_exact_beats_prefix() {
        let mut table = MultiplierTable::new();
        assert!(table.insert("combo-*", 2));
        assert!(table.insert("COMBO-RED", 5));
        assert_eq!(table.lookup("COMBO-RED"), Some(5));
        assert_eq!(table.lookup("COMBO-BLUE"), Some(2));
        assert_eq!(table.lookup("SINGLE"), None);
    }

    #[test]
    fn test_multiplier_longest_prefix_wins() {
        let mut table = MultiplierTable::new();
        table.insert("KIT-*", 3);
        table.insert("KIT-LARGE-*", 12);
        assert_eq!(table.lookup("KIT-LARGE-01"), Some(12));
        assert_eq!(table.lookup("KIT-SMALL-01"), Some(3));
    }

    #[test]
    fn test_multiplier_duplicate_key() {
        let mut table = MultiplierTable::new();
        assert!(table.insert("A", 2));
        assert!(!table.insert(" a ", 3));
        assert_eq!(table.lookup("A"), Some(2));
    }
}
