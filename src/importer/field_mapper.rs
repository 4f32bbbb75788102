// ==========================================
// 多渠道补货计划系统 - 字段映射器实现
// ==========================================
// 职责: 标准字段 → 源列名（别名、大小写不敏感）
// 红线: 缺少必需列 → SchemaMismatch；多余列/列顺序不影响解析
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use std::collections::HashMap;

/// 标准字段定义：字段名 + 可接受的源列名
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    pub const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    /// 报错时展示的列名（首个别名）
    pub fn display_name(&self) -> &'static str {
        self.aliases.first().copied().unwrap_or(self.name)
    }
}

fn header_key(header: &str) -> String {
    header.trim().to_lowercase()
}

// ==========================================
// FieldMapper - 表头解析结果
// ==========================================
pub struct FieldMapper {
    columns: HashMap<&'static str, String>, // 标准字段 → 实际列名
}

impl FieldMapper {
    /// 根据表头解析字段位置
    ///
    /// # 参数
    /// - headers: 源文件表头
    /// - required: 必需字段（任一缺失即 SchemaMismatch）
    /// - optional: 可选字段
    /// - source_name: 文件名（用于错误信息）
    pub fn resolve(
        headers: &[String],
        required: &[FieldSpec],
        optional: &[FieldSpec],
        source_name: &str,
    ) -> ImportResult<Self> {
        let by_key: HashMap<String, &String> =
            headers.iter().map(|h| (header_key(h), h)).collect();

        let mut columns = HashMap::new();
        let mut missing = Vec::new();

        for spec in required.iter().chain(optional.iter()) {
            let found = spec
                .aliases
                .iter()
                .find_map(|alias| by_key.get(&header_key(alias)));

            match found {
                Some(header) => {
                    columns.insert(spec.name, (*header).clone());
                }
                None if required.iter().any(|r| r.name == spec.name) => {
                    missing.push(spec.display_name().to_string());
                }
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::SchemaMismatch {
                source_name: source_name.to_string(),
                missing,
            });
        }

        Ok(Self { columns })
    }

    /// 字段是否存在于源文件
    pub fn has(&self, field: &str) -> bool {
        self.columns.contains_key(field)
    }

    /// 提取字符串字段（空白视为缺失）
    pub fn get_string<'a>(&self, row: &'a RawRow, field: &str) -> Option<&'a str> {
        let header = self.columns.get(field)?;
        row.values
            .get(header)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
