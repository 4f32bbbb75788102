// ==========================================
// 多渠道补货计划系统 - 品类分类器
// ==========================================
// 规则: 有序前缀列表，首个命中生效；无命中 → UNCATEGORIZED
// ==========================================

use crate::domain::product::CategoryRule;

pub const UNCATEGORIZED: &str = "UNCATEGORIZED";

pub struct CategoryClassifier {
    rules: Vec<CategoryRule>, // 前缀已 UPPER
}

impl CategoryClassifier {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| CategoryRule {
                prefix: r.prefix.trim().to_uppercase(),
                category: r.category.trim().to_string(),
            })
            .collect();
        Self { rules }
    }

    pub fn classify(&self, base_sku: &str) -> &str {
        let sku = base_sku.trim().to_uppercase();
        self.rules
            .iter()
            .find(|rule| sku.starts_with(&rule.prefix))
            .map_or(UNCATEGORIZED, |rule| rule.category.as_str())
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let classifier = CategoryClassifier::new(vec![
            CategoryRule::new("WID", "TOOL"),
            CategoryRule::new("WIDGET", "GADGET"),
            CategoryRule::new("cab", "ELECTRICAL"),
        ]);

        assert_eq!(classifier.classify("WIDGET"), "TOOL");
        assert_eq!(classifier.classify("cable-usb"), "ELECTRICAL");
        assert_eq!(classifier.classify("SOAP"), UNCATEGORIZED);
    }

    #[test]
    fn test_empty_rules() {
        assert_eq!(CategoryClassifier::default().classify("ANY"), UNCATEGORIZED);
    }
}
