//! 维修单实体与字段校验

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::RepairStatus;
use crate::error::{AppError, Result};

/// 描述最大字符数
pub const DESCRIPTION_MAX_CHARS: usize = 80;

/// 新建维修单时的电脑编号：1-2 位数字或游戏主机
static PC_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2}|PS5|PS4)$").expect("电脑编号正则无效")
});

/// 维修单实体
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Repair {
    pub id: i64,
    pub club_address: String,
    pub description: String,
    pub status: RepairStatus,
    pub pc_number: String,
    /// 创建时的设备类型名称快照
    pub equipment_type: String,
    /// 创建时的设备型号名称快照
    pub model: String,
    /// 快递员是否已确认取件
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// 待插入的维修单
#[derive(Debug, Clone, PartialEq)]
pub struct NewRepair {
    pub club_address: String,
    pub description: String,
    pub pc_number: String,
    pub equipment_type: String,
    pub model: String,
}

/// 一次状态变更需要写入的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEffect {
    pub status: RepairStatus,
    /// None 表示保持原值
    pub approved: Option<bool>,
    pub set_sent_at: bool,
    pub set_closed_at: bool,
}

impl TransitionEffect {
    pub fn status(status: RepairStatus) -> Self {
        Self {
            status,
            approved: None,
            set_sent_at: false,
            set_closed_at: false,
        }
    }
}

/// `SELECT` 维修单时使用的列清单
pub const REPAIR_COLUMNS: &str = "id, club_address, description, status, pc_number, \
     equipment_type, model, approved, created_at, sent_at, closed_at, updated_at";

/// 校验新建维修单的电脑编号，主机编号统一为大写
pub fn normalize_new_pc_number(raw: &str) -> Result<String> {
    let value = raw.trim();
    if !PC_NUMBER_RE.is_match(value) {
        return Err(AppError::Validation(format!(
            "电脑编号无效: \"{}\"，应为 0-99 或 PS5/PS4",
            value
        )));
    }
    Ok(value.to_uppercase())
}

/// 校验编辑时的电脑编号：纯数字且不超过 99，或严格等于 PS5/PS4
///
/// 数字编号去掉前导零后保存，"007" 记为 "7"
pub fn normalize_edited_pc_number(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value == "PS5" || value == "PS4" {
        return Ok(value.to_string());
    }

    let number = if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        value.parse::<u32>().ok().filter(|n| *n <= 99)
    } else {
        None
    };

    number.map(|n| n.to_string()).ok_or_else(|| {
        AppError::Validation(format!(
            "电脑编号无效: \"{}\"，应为 0-99 或 PS5/PS4",
            value
        ))
    })
}

/// 校验新建维修单描述：必填且不超过 80 个字符
pub fn normalize_new_description(raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::Validation("描述不能为空".to_string()));
    }
    if value.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "描述不能超过 {} 个字符",
            DESCRIPTION_MAX_CHARS
        )));
    }
    Ok(value.to_string())
}

/// 编辑描述时超长部分直接截断
pub fn normalize_edited_description(raw: &str) -> Result<String> {
    let value: String = raw.trim().chars().take(DESCRIPTION_MAX_CHARS).collect();
    if value.is_empty() {
        return Err(AppError::Validation("描述不能为空".to_string()));
    }
    Ok(value)
}
