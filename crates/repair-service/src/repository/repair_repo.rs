//! 维修单仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::log_repo::insert_log;
use super::traits::RepairRepositoryTrait;
use crate::error::{AppError, Result};
use crate::models::{ActivityLog, NewRepair, REPAIR_COLUMNS, Repair, TransitionEffect};

/// 维修单仓储
#[derive(Clone)]
pub struct RepairRepository {
    pool: PgPool,
}

impl RepairRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取单个维修单
    pub async fn get_repair(&self, id: i64) -> Result<Option<Repair>> {
        let sql = format!("SELECT {REPAIR_COLUMNS} FROM repairs WHERE id = $1");
        let repair = sqlx::query_as::<_, Repair>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(repair)
    }

    /// 俱乐部已关联的设备类型名称
    pub async fn club_type_name(&self, club_address: &str, type_id: i64) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, String>(
            r#"
            SELECT et.name
            FROM equipment_types et
            JOIN club_equipment_types cet ON cet.equipment_type_id = et.id
            WHERE cet.club_address = $1 AND et.id = $2
            "#,
        )
        .bind(club_address)
        .bind(type_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name)
    }

    /// 俱乐部已关联且属于指定类型的设备型号名称
    pub async fn club_model_name(
        &self,
        club_address: &str,
        type_id: i64,
        model_id: i64,
    ) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, String>(
            r#"
            SELECT em.model_name
            FROM equipment_models em
            JOIN club_equipment_models cem ON cem.equipment_model_id = em.id
            WHERE cem.club_address = $1 AND em.type_id = $2 AND em.id = $3
            "#,
        )
        .bind(club_address)
        .bind(type_id)
        .bind(model_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name)
    }

    /// 创建维修单并写入创建日志
    pub async fn create_repair(&self, repair: &NewRepair, actor_login: &str) -> Result<Repair> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO repairs (club_address, description, status, pc_number,
                                 equipment_type, model, approved, created_at, updated_at)
            VALUES ($1, $2, 'Неисправно', $3, $4, $5, FALSE, NOW(), NOW())
            RETURNING {REPAIR_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Repair>(&sql)
            .bind(&repair.club_address)
            .bind(&repair.description)
            .bind(&repair.pc_number)
            .bind(&repair.equipment_type)
            .bind(&repair.model)
            .fetch_one(&mut *tx)
            .await?;

        insert_log(&mut *tx, &ActivityLog::repair_created(actor_login, &created)).await?;
        tx.commit().await?;

        Ok(created)
    }

    /// 应用状态变更并写入日志
    pub async fn apply_transition(
        &self,
        id: i64,
        effect: &TransitionEffect,
        log: &ActivityLog,
    ) -> Result<Repair> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE repairs
            SET status = $2,
                approved = COALESCE($3::boolean, approved),
                sent_at = CASE WHEN $4::boolean THEN NOW() ELSE sent_at END,
                closed_at = CASE WHEN $5::boolean THEN NOW() ELSE closed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REPAIR_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Repair>(&sql)
            .bind(id)
            .bind(effect.status)
            .bind(effect.approved)
            .bind(effect.set_sent_at)
            .bind(effect.set_closed_at)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::RepairNotFound(id))?;

        insert_log(&mut *tx, log).await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn update_pc_number(
        &self,
        id: i64,
        pc_number: &str,
        log: &ActivityLog,
    ) -> Result<Repair> {
        self.update_text_field(id, "pc_number", pc_number, log).await
    }

    pub async fn update_description(
        &self,
        id: i64,
        description: &str,
        log: &ActivityLog,
    ) -> Result<Repair> {
        self.update_text_field(id, "description", description, log)
            .await
    }

    /// 更新单个文本列，列名只来自本模块的固定值
    async fn update_text_field(
        &self,
        id: i64,
        column: &'static str,
        value: &str,
        log: &ActivityLog,
    ) -> Result<Repair> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE repairs
            SET {column} = $2, updated_at = NOW()
            WHERE id = $1 AND status <> 'Закрыт'
            RETURNING {REPAIR_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Repair>(&sql)
            .bind(id)
            .bind(value)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::RepairClosed(id))?;

        insert_log(&mut *tx, log).await?;
        tx.commit().await?;

        Ok(updated)
    }
}

#[async_trait]
impl RepairRepositoryTrait for RepairRepository {
    async fn get_repair(&self, id: i64) -> Result<Option<Repair>> {
        self.get_repair(id).await
    }

    async fn club_type_name(&self, club_address: &str, type_id: i64) -> Result<Option<String>> {
        self.club_type_name(club_address, type_id).await
    }

    async fn club_model_name(
        &self,
        club_address: &str,
        type_id: i64,
        model_id: i64,
    ) -> Result<Option<String>> {
        self.club_model_name(club_address, type_id, model_id).await
    }

    async fn create_repair(&self, repair: &NewRepair, actor_login: &str) -> Result<Repair> {
        self.create_repair(repair, actor_login).await
    }

    async fn apply_transition(
        &self,
        id: i64,
        effect: &TransitionEffect,
        log: &ActivityLog,
    ) -> Result<Repair> {
        self.apply_transition(id, effect, log).await
    }

    async fn update_pc_number(
        &self,
        id: i64,
        pc_number: &str,
        log: &ActivityLog,
    ) -> Result<Repair> {
        self.update_pc_number(id, pc_number, log).await
    }

    async fn update_description(
        &self,
        id: i64,
        description: &str,
        log: &ActivityLog,
    ) -> Result<Repair> {
        self.update_description(id, description, log).await
    }
}
