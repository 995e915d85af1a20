//! 俱乐部状态卡片 API 处理器
//!
//! 卡片记录俱乐部内若干对象（设备、区域等）的现状备注。
//! 删除为软删除，已删除的卡片可在历史中查看但不能再修改。

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::info;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, CardDto, CardObjectDto, CardObjectInput, CardQuery, CreateCardRequest,
    DeletedResponse, UpdateCardRequest,
};
use crate::error::{AppError, Result};
use crate::models::Role;
use crate::state::AppState;

#[derive(sqlx::FromRow)]
struct CardRow {
    id: i64,
    title: String,
    club_address: String,
    created_by: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct CardObjectRow {
    id: i64,
    card_id: i64,
    name: String,
    comment: String,
}

impl From<CardObjectRow> for CardObjectDto {
    fn from(row: CardObjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            comment: row.comment,
        }
    }
}

fn card_dto(row: CardRow, objects: Vec<CardObjectDto>) -> CardDto {
    CardDto {
        id: row.id,
        title: row.title,
        club_address: row.club_address,
        created_by: row.created_by,
        is_deleted: row.is_deleted,
        created_at: row.created_at,
        deleted_at: row.deleted_at,
        objects,
    }
}

/// 非管理员只能查看本俱乐部；管理员可按俱乐部过滤，不传则查看全部
fn card_scope(claims: &Claims, requested: Option<&str>) -> Result<Option<String>> {
    if claims.role == Role::Admin {
        return Ok(requested
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from));
    }
    claims.require_club().map(|club| Some(club.to_string()))
}

/// 批量写入卡片对象，返回写入后的对象（保持请求顺序）
async fn insert_objects(
    conn: &mut PgConnection,
    card_id: i64,
    objects: &[CardObjectInput],
) -> Result<Vec<CardObjectDto>> {
    if objects.is_empty() {
        return Ok(Vec::new());
    }

    let names: Vec<String> = objects.iter().map(|o| o.name.trim().to_string()).collect();
    let comments: Vec<String> = objects.iter().map(|o| o.comment.trim().to_string()).collect();

    let rows = sqlx::query_as::<_, CardObjectRow>(
        r#"
        INSERT INTO card_objects (card_id, name, comment)
        SELECT $1, o.name, o.comment
        FROM UNNEST($2::text[], $3::text[]) WITH ORDINALITY AS o(name, comment, ord)
        ORDER BY o.ord
        RETURNING id, card_id, name, comment
        "#,
    )
    .bind(card_id)
    .bind(&names)
    .bind(&comments)
    .fetch_all(conn)
    .await?;

    let mut objects: Vec<CardObjectDto> = rows.into_iter().map(Into::into).collect();
    objects.sort_by_key(|o| o.id);
    Ok(objects)
}

/// 卡片列表（含对象）
///
/// GET /api/cards?club=&history=&sort=
pub async fn list_cards(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CardQuery>,
) -> Result<Json<ApiResponse<Vec<CardDto>>>> {
    let club = card_scope(&claims, query.club.as_deref())?;
    let order = query.sort.as_sql();

    let sql = format!(
        r#"
        SELECT id, title, club_address, created_by, is_deleted, created_at, deleted_at
        FROM cards
        WHERE ($1::text IS NULL OR club_address = $1)
          AND is_deleted = $2
        ORDER BY created_at {order}, id {order}
        "#
    );
    let cards = sqlx::query_as::<_, CardRow>(&sql)
        .bind(club.as_deref())
        .bind(query.history)
        .fetch_all(&state.pool)
        .await?;

    let ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
    let object_rows = sqlx::query_as::<_, CardObjectRow>(
        r#"
        SELECT id, card_id, name, comment
        FROM card_objects
        WHERE card_id = ANY($1)
        ORDER BY id
        "#,
    )
    .bind(&ids)
    .fetch_all(&state.pool)
    .await?;

    let mut objects_by_card: HashMap<i64, Vec<CardObjectDto>> = HashMap::new();
    for row in object_rows {
        objects_by_card
            .entry(row.card_id)
            .or_default()
            .push(row.into());
    }

    let items = cards
        .into_iter()
        .map(|card| {
            let objects = objects_by_card.remove(&card.id).unwrap_or_default();
            card_dto(card, objects)
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}

/// 创建卡片
///
/// POST /api/admin/cards
pub async fn create_card(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCardRequest>,
) -> Result<Json<ApiResponse<CardDto>>> {
    req.validate()?;

    let mut tx = state.pool.begin().await?;

    let card = sqlx::query_as::<_, CardRow>(
        r#"
        INSERT INTO cards (title, club_address, created_by, is_deleted, created_at)
        VALUES ($1, $2, $3, FALSE, NOW())
        RETURNING id, title, club_address, created_by, is_deleted, created_at, deleted_at
        "#,
    )
    .bind(req.title.trim())
    .bind(req.club_address.trim())
    .bind(&claims.login)
    .fetch_one(&mut *tx)
    .await?;

    let objects = insert_objects(&mut *tx, card.id, &req.objects).await?;
    tx.commit().await?;

    info!(card_id = card.id, club = %card.club_address, objects = objects.len(), "卡片已创建");
    Ok(Json(ApiResponse::success(card_dto(card, objects))))
}

/// 更新卡片：替换标题和全部对象
///
/// PUT /api/admin/cards/{id}
pub async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCardRequest>,
) -> Result<Json<ApiResponse<CardDto>>> {
    req.validate()?;

    let mut tx = state.pool.begin().await?;

    let current = sqlx::query_as::<_, CardRow>(
        r#"
        SELECT id, title, club_address, created_by, is_deleted, created_at, deleted_at
        FROM cards
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::CardNotFound(id))?;

    if current.is_deleted {
        return Err(AppError::CardDeleted(id));
    }

    let card = sqlx::query_as::<_, CardRow>(
        r#"
        UPDATE cards SET title = $2
        WHERE id = $1
        RETURNING id, title, club_address, created_by, is_deleted, created_at, deleted_at
        "#,
    )
    .bind(id)
    .bind(req.title.trim())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM card_objects WHERE card_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let objects = insert_objects(&mut *tx, id, &req.objects).await?;

    tx.commit().await?;

    info!(card_id = id, objects = objects.len(), "卡片已更新");
    Ok(Json(ApiResponse::success(card_dto(card, objects))))
}

/// 软删除卡片
///
/// DELETE /api/admin/cards/{id}
pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    let result = sqlx::query(
        r#"
        UPDATE cards SET is_deleted = TRUE, deleted_at = NOW()
        WHERE id = $1 AND is_deleted = FALSE
        "#,
    )
    .bind(id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cards WHERE id = $1)")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;
        return Err(if exists {
            AppError::CardDeleted(id)
        } else {
            AppError::CardNotFound(id)
        });
    }

    info!(card_id = id, "卡片已删除");
    Ok(Json(ApiResponse::success(DeletedResponse::success())))
}
