//! 俱乐部与设备目录 API 处理器
//!
//! 管理员维护俱乐部、设备类型、设备型号及其与俱乐部的关联；
//! 俱乐部员工通过 catalog 接口读取本俱乐部可选的类型与型号。

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::info;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, AttachClubTypeRequest, ClubDto, CreateClubRequest, CreateEquipmentModelRequest,
    CreateEquipmentTypeRequest, EquipmentModelDto, EquipmentTypeDto,
};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(sqlx::FromRow)]
struct ClubRow {
    name: String,
    created_at: DateTime<Utc>,
}

impl From<ClubRow> for ClubDto {
    fn from(row: ClubRow) -> Self {
        Self {
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EquipmentTypeRow {
    id: i64,
    name: String,
}

impl From<EquipmentTypeRow> for EquipmentTypeDto {
    fn from(row: EquipmentTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EquipmentModelRow {
    id: i64,
    type_id: i64,
    model_name: String,
}

impl From<EquipmentModelRow> for EquipmentModelDto {
    fn from(row: EquipmentModelRow) -> Self {
        Self {
            id: row.id,
            type_id: row.type_id,
            model_name: row.model_name,
        }
    }
}

/// 去除首尾空白后不能为空
fn required_trimmed<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{}不能为空", field)));
    }
    Ok(trimmed)
}

async fn ensure_type_exists(conn: &mut PgConnection, type_id: i64) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipment_types WHERE id = $1)")
        .bind(type_id)
        .fetch_one(conn)
        .await?;

    if !exists {
        return Err(AppError::EquipmentTypeNotFound(type_id));
    }
    Ok(())
}

async fn link_club_type(conn: &mut PgConnection, club_address: &str, type_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO club_equipment_types (club_address, equipment_type_id)
        VALUES ($1, $2)
        ON CONFLICT (club_address, equipment_type_id) DO NOTHING
        "#,
    )
    .bind(club_address)
    .bind(type_id)
    .execute(conn)
    .await?;

    Ok(())
}

// ==================== 俱乐部 ====================

/// 俱乐部列表
///
/// GET /api/admin/clubs
pub async fn list_clubs(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<ClubDto>>>> {
    let rows = sqlx::query_as::<_, ClubRow>("SELECT name, created_at FROM clubs ORDER BY name")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

/// 新增俱乐部
///
/// POST /api/admin/clubs
pub async fn create_club(
    State(state): State<AppState>,
    Json(req): Json<CreateClubRequest>,
) -> Result<Json<ApiResponse<ClubDto>>> {
    req.validate()?;
    let name = required_trimmed(&req.name, "俱乐部名称")?;

    let row = sqlx::query_as::<_, ClubRow>(
        r#"
        INSERT INTO clubs (name, created_at)
        VALUES ($1, NOW())
        RETURNING name, created_at
        "#,
    )
    .bind(name)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| AppError::on_unique_violation(e, format!("俱乐部已存在: {}", name)))?;

    info!(club = %row.name, "俱乐部已创建");
    Ok(Json(ApiResponse::success(row.into())))
}

// ==================== 设备类型 ====================

/// 全部设备类型
///
/// GET /api/admin/equipment/types
pub async fn list_types(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<EquipmentTypeDto>>>> {
    let rows =
        sqlx::query_as::<_, EquipmentTypeRow>("SELECT id, name FROM equipment_types ORDER BY name")
            .fetch_all(&state.pool)
            .await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

/// 新增设备类型，可同时关联到俱乐部
///
/// POST /api/admin/equipment/types
pub async fn create_type(
    State(state): State<AppState>,
    Json(req): Json<CreateEquipmentTypeRequest>,
) -> Result<Json<ApiResponse<EquipmentTypeDto>>> {
    req.validate()?;
    let name = required_trimmed(&req.name, "设备类型名称")?;
    let club = req
        .club_address
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut tx = state.pool.begin().await?;

    let row = sqlx::query_as::<_, EquipmentTypeRow>(
        "INSERT INTO equipment_types (name) VALUES ($1) RETURNING id, name",
    )
    .bind(name)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::on_unique_violation(e, format!("设备类型已存在: {}", name)))?;

    if let Some(club) = club {
        link_club_type(&mut *tx, club, row.id).await?;
    }

    tx.commit().await?;

    info!(type_id = row.id, name = %row.name, club = ?club, "设备类型已创建");
    Ok(Json(ApiResponse::success(row.into())))
}

/// 为俱乐部关联已有设备类型
///
/// POST /api/admin/clubs/{club}/types
pub async fn attach_club_type(
    State(state): State<AppState>,
    Path(club): Path<String>,
    Json(req): Json<AttachClubTypeRequest>,
) -> Result<Json<ApiResponse<EquipmentTypeDto>>> {
    req.validate()?;
    let club = required_trimmed(&club, "俱乐部地址")?;

    let mut conn = state.pool.acquire().await?;
    let row = sqlx::query_as::<_, EquipmentTypeRow>(
        "SELECT id, name FROM equipment_types WHERE id = $1",
    )
    .bind(req.equipment_type_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::EquipmentTypeNotFound(req.equipment_type_id))?;

    link_club_type(&mut *conn, club, row.id).await?;

    info!(club = %club, type_id = row.id, "设备类型已关联到俱乐部");
    Ok(Json(ApiResponse::success(row.into())))
}

/// 俱乐部已关联的设备类型
///
/// GET /api/admin/clubs/{club}/types
pub async fn list_club_types(
    State(state): State<AppState>,
    Path(club): Path<String>,
) -> Result<Json<ApiResponse<Vec<EquipmentTypeDto>>>> {
    let rows = club_types(&state, club.trim()).await?;
    Ok(Json(ApiResponse::success(rows)))
}

// ==================== 设备型号 ====================

/// 某类型下的全部型号
///
/// GET /api/admin/equipment/types/{id}/models
pub async fn list_models(
    State(state): State<AppState>,
    Path(type_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<EquipmentModelDto>>>> {
    let mut conn = state.pool.acquire().await?;
    ensure_type_exists(&mut *conn, type_id).await?;

    let rows = sqlx::query_as::<_, EquipmentModelRow>(
        r#"
        SELECT id, type_id, model_name
        FROM equipment_models
        WHERE type_id = $1
        ORDER BY model_name
        "#,
    )
    .bind(type_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}

/// 新增型号并关联到俱乐部
///
/// POST /api/admin/equipment/types/{id}/models
///
/// 型号所属类型未关联该俱乐部时一并关联，否则新型号在俱乐部侧不可选
pub async fn create_model(
    State(state): State<AppState>,
    Path(type_id): Path<i64>,
    Json(req): Json<CreateEquipmentModelRequest>,
) -> Result<Json<ApiResponse<EquipmentModelDto>>> {
    req.validate()?;
    let model_name = required_trimmed(&req.model_name, "型号名称")?;
    let club = required_trimmed(&req.club_address, "俱乐部地址")?;

    let mut tx = state.pool.begin().await?;
    ensure_type_exists(&mut *tx, type_id).await?;

    let row = sqlx::query_as::<_, EquipmentModelRow>(
        r#"
        INSERT INTO equipment_models (type_id, model_name)
        VALUES ($1, $2)
        RETURNING id, type_id, model_name
        "#,
    )
    .bind(type_id)
    .bind(model_name)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::on_foreign_key_violation(e, format!("设备类型不存在: {}", type_id)))?;

    sqlx::query(
        r#"
        INSERT INTO club_equipment_models (club_address, equipment_model_id)
        VALUES ($1, $2)
        ON CONFLICT (club_address, equipment_model_id) DO NOTHING
        "#,
    )
    .bind(club)
    .bind(row.id)
    .execute(&mut *tx)
    .await?;

    link_club_type(&mut *tx, club, type_id).await?;
    tx.commit().await?;

    info!(model_id = row.id, type_id, club = %club, "设备型号已创建");
    Ok(Json(ApiResponse::success(row.into())))
}

// ==================== 俱乐部目录 ====================

async fn club_types(state: &AppState, club: &str) -> Result<Vec<EquipmentTypeDto>> {
    let rows = sqlx::query_as::<_, EquipmentTypeRow>(
        r#"
        SELECT et.id, et.name
        FROM equipment_types et
        JOIN club_equipment_types cet ON cet.equipment_type_id = et.id
        WHERE cet.club_address = $1
        ORDER BY et.name
        "#,
    )
    .bind(club)
    .fetch_all(&state.pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// 当前俱乐部可选的设备类型
///
/// GET /api/catalog/types
pub async fn catalog_types(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<EquipmentTypeDto>>>> {
    let club = claims.require_club()?;
    Ok(Json(ApiResponse::success(club_types(&state, club).await?)))
}

/// 当前俱乐部在某类型下可选的型号
///
/// GET /api/catalog/types/{id}/models
pub async fn catalog_models(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(type_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<EquipmentModelDto>>>> {
    let club = claims.require_club()?;

    let rows = sqlx::query_as::<_, EquipmentModelRow>(
        r#"
        SELECT em.id, em.type_id, em.model_name
        FROM equipment_models em
        JOIN club_equipment_models cem ON cem.equipment_model_id = em.id
        WHERE cem.club_address = $1 AND em.type_id = $2
        ORDER BY em.model_name
        "#,
    )
    .bind(club)
    .bind(type_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(Into::into).collect(),
    )))
}
