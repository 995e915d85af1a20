//! 俱乐部平面图布局
//!
//! 布局以 JSONB 数组整体存储，服务端只做结构校验。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// 默认布局中的电脑数量
pub const DEFAULT_PC_COUNT: usize = 50;
/// 单个布局允许的最大元素数量
pub const MAX_LAYOUT_ITEMS: usize = 500;

/// 布局元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutItemKind {
    Pc,
    Label,
}

/// 布局元素
///
/// 对电脑而言 `id` 即电脑编号，与维修单的 pc_number 对应。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: LayoutItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// 未保存过布局的俱乐部使用 10 列网格排布 50 台电脑
pub fn default_layout() -> Vec<LayoutItem> {
    (0..DEFAULT_PC_COUNT)
        .map(|i| LayoutItem {
            id: (i + 1).to_string(),
            x: 100.0 + (i % 10) as f64 * 60.0,
            y: 100.0 + (i / 10) as f64 * 60.0,
            kind: LayoutItemKind::Pc,
            text: None,
        })
        .collect()
}

/// 校验布局：id 非空且唯一，坐标为有限数，标签必须有文本
pub fn validate_layout(items: &[LayoutItem]) -> Result<()> {
    if items.len() > MAX_LAYOUT_ITEMS {
        return Err(AppError::Validation(format!(
            "布局元素不能超过 {} 个",
            MAX_LAYOUT_ITEMS
        )));
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        let id = item.id.trim();
        if id.is_empty() {
            return Err(AppError::Validation("布局元素 id 不能为空".to_string()));
        }
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("布局元素 id 重复: {}", id)));
        }
        if !item.x.is_finite() || !item.y.is_finite() {
            return Err(AppError::Validation(format!("布局元素坐标无效: {}", id)));
        }
        if item.kind == LayoutItemKind::Label
            && item.text.as_deref().map(str::trim).unwrap_or("").is_empty()
        {
            return Err(AppError::Validation(format!("标签缺少文本: {}", id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc(id: &str) -> LayoutItem {
        LayoutItem {
            id: id.to_string(),
            x: 0.0,
            y: 0.0,
            kind: LayoutItemKind::Pc,
            text: None,
        }
    }

    #[test]
    fn test_default_layout_grid() {
        let layout = default_layout();
        assert_eq!(layout.len(), 50);
        assert_eq!(layout[0].id, "1");
        assert_eq!((layout[0].x, layout[0].y), (100.0, 100.0));
        assert_eq!((layout[9].x, layout[9].y), (640.0, 100.0));
        assert_eq!((layout[10].x, layout[10].y), (100.0, 160.0));
        assert_eq!(layout[49].id, "50");
        assert!(validate_layout(&layout).is_ok());
    }

    #[test]
    fn test_layout_json_shape() {
        let json = serde_json::to_value(pc("3")).unwrap();
        assert_eq!(json, serde_json::json!({"id": "3", "x": 0.0, "y": 0.0, "type": "pc"}));

        let label: LayoutItem =
            serde_json::from_str(r#"{"id":"l1","x":5,"y":6,"type":"label","text":"Бар"}"#).unwrap();
        assert_eq!(label.kind, LayoutItemKind::Label);
        assert_eq!(label.text.as_deref(), Some("Бар"));
    }

    #[test]
    fn test_validate_layout_rejections() {
        assert!(validate_layout(&[pc("1"), pc("1")]).is_err());
        assert!(validate_layout(&[pc(" ")]).is_err());

        let mut label = pc("l1");
        label.kind = LayoutItemKind::Label;
        assert!(validate_layout(&[label.clone()]).is_err());
        label.text = Some("VIP".into());
        assert!(validate_layout(&[label]).is_ok());

        let mut bad = pc("2");
        bad.x = f64::NAN;
        assert!(validate_layout(&[bad]).is_err());

        assert!(validate_layout(&[]).is_ok());
    }
}
