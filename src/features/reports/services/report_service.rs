use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::agent::models::Address;
use crate::features::audit::AuditService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    ApproveReportRequestDto, CreateReportRequestDto, DeclineReportRequestDto,
    PresignUploadRequestDto, PresignUploadResponseDto, ReportResponseDto, UpdateReportRequestDto,
};
use crate::features::reports::models::{Report, ReportStatus, ReportWithAddress};
use crate::features::users::models::UserType;
use crate::modules::pdf::ReportRenderer;
use crate::modules::storage::StorageClient;
use crate::shared::constants::{
    ACTION_APPROVE, ACTION_CREATE, ACTION_DECLINE, ACTION_DELETE, ACTION_UPDATE, TARGET_REPORT,
};
use crate::shared::types::PaginationQuery;

const REPORT_COLUMNS: &str = "id, address_id, publisher_id, agent_id, report_type, status, \
     form_data, pdf_url, reward, comment, reviewer_id, created_date, review_date";

const REPORT_JOIN_COLUMNS: &str = "r.id, r.address_id, a.address, r.publisher_id, r.agent_id, \
     r.report_type, r.status, r.form_data, r.pdf_url, r.reward, r.comment, r.reviewer_id, \
     r.created_date, r.review_date";

/// Report lifecycle: draft creation with PDF rendering and upload,
/// admin review, and the reward credit that approval triggers.
pub struct ReportService {
    pool: PgPool,
    storage: Arc<StorageClient>,
    renderer: ReportRenderer,
    audit: Arc<AuditService>,
}

impl ReportService {
    pub fn new(pool: PgPool, storage: Arc<StorageClient>, audit: Arc<AuditService>) -> Self {
        Self {
            pool,
            storage,
            renderer: ReportRenderer::new(),
            audit,
        }
    }

    /// Create a draft report: resolve the address, render and upload the
    /// PDF, persist the row. Nothing is persisted if render or upload
    /// fails. When the named agent's address has no active link yet the
    /// assignment is created as a side effect.
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateReportRequestDto,
    ) -> Result<ReportResponseDto> {
        if !dto.has_address() {
            return Err(AppError::Validation(
                "Either address or address_id is required".to_string(),
            ));
        }

        let address = match dto.address_id {
            Some(id) => self.load_address(id).await?,
            None => {
                // has_address() guarantees the string branch is non-empty
                let text = dto.address.as_deref().unwrap_or_default().trim().to_string();
                self.resolve_or_create_address(&text).await?
            }
        };

        if let Some(agent_id) = dto.agent_id {
            self.ensure_agent_exists(agent_id).await?;
        }

        // Render before touching the database so a malformed form or a
        // storage outage leaves no partial state behind.
        let pdf_bytes = self.renderer.render(dto.report_type, &dto.form_data).await?;
        let pdf_url = self.upload_pdf(pdf_bytes).await?;

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (address_id, publisher_id, agent_id, report_type, form_data, pdf_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(address.id)
        .bind(actor.id)
        .bind(dto.agent_id)
        .bind(dto.report_type)
        .bind(&dto.form_data)
        .bind(&pdf_url)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if let Some(agent_id) = dto.agent_id {
            // Best effort: the partial unique index keeps an existing
            // active link in place.
            sqlx::query(
                r#"
                INSERT INTO address_agents (address_id, agent_id)
                VALUES ($1, $2)
                ON CONFLICT (address_id) WHERE active DO NOTHING
                "#,
            )
            .bind(address.id)
            .bind(agent_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        }

        tracing::info!(
            "Report created: id={}, type={}, address={}",
            report.id,
            report.report_type,
            address.id
        );

        self.audit
            .log(actor.id, ACTION_CREATE, Some(TARGET_REPORT), Some(report.id))
            .await;

        self.get_joined(report.id).await
    }

    /// Replace a draft's form data, re-rendering and re-uploading the PDF.
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        report_id: Uuid,
        dto: UpdateReportRequestDto,
    ) -> Result<ReportResponseDto> {
        let report = self.load_report(report_id).await?;

        if !actor.is_admin() && report.publisher_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the publisher or an admin can update this report".to_string(),
            ));
        }
        if report.status != ReportStatus::Draft {
            return Err(AppError::Conflict(format!(
                "Only draft reports can be updated (current status: {})",
                report.status
            )));
        }

        let pdf_bytes = self.renderer.render(report.report_type, &dto.form_data).await?;
        let pdf_url = self.upload_pdf(pdf_bytes).await?;

        sqlx::query("UPDATE reports SET form_data = $1, pdf_url = $2 WHERE id = $3")
            .bind(&dto.form_data)
            .bind(&pdf_url)
            .bind(report_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        // The old PDF object is now unreferenced; removing it is best
        // effort since the row already points at the replacement.
        if let Some(old_key) = self.storage.key_from_url(&report.pdf_url) {
            if let Err(e) = self.storage.delete(&old_key).await {
                tracing::warn!("Failed to delete superseded PDF '{}': {}", old_key, e);
            }
        }

        self.audit
            .log(actor.id, ACTION_UPDATE, Some(TARGET_REPORT), Some(report_id))
            .await;

        self.get_joined(report_id).await
    }

    /// List reports newest-first. Admins see everything; everyone else
    /// sees reports they published or are assigned to.
    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ReportResponseDto>, i64)> {
        let rows = sqlx::query_as::<_, ReportWithAddress>(&format!(
            r#"
            SELECT {}
            FROM reports r
            JOIN addresses a ON a.id = r.address_id
            WHERE $1 OR r.publisher_id = $2 OR r.agent_id = $2
            ORDER BY r.created_date DESC
            LIMIT $3 OFFSET $4
            "#,
            REPORT_JOIN_COLUMNS
        ))
        .bind(actor.is_admin())
        .bind(actor.id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports r WHERE $1 OR r.publisher_id = $2 OR r.agent_id = $2",
        )
        .bind(actor.is_admin())
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((rows.into_iter().map(ReportResponseDto::from).collect(), total))
    }

    /// Fetch one report under the same visibility rule as [`Self::list`].
    /// Hidden reports are indistinguishable from missing ones.
    pub async fn get(&self, actor: &AuthenticatedUser, report_id: Uuid) -> Result<ReportResponseDto> {
        let report = self.get_joined(report_id).await?;

        let visible = actor.is_admin()
            || report.publisher_id == actor.id
            || report.agent_id == Some(actor.id);
        if !visible {
            return Err(AppError::NotFound("Report not found".to_string()));
        }

        Ok(report)
    }

    /// Approve a draft. When the owning agent is a flagged affiliate a
    /// positive reward is mandatory and credited to their balance; the
    /// report update, the credit, and the per-address summary upsert
    /// commit in one transaction.
    pub async fn approve(
        &self,
        admin: &AuthenticatedUser,
        report_id: Uuid,
        dto: ApproveReportRequestDto,
    ) -> Result<ReportResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let report = sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE id = $1 FOR UPDATE",
            REPORT_COLUMNS
        ))
        .bind(report_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

        ensure_draft(report.status)?;

        let is_affiliate = match report.agent_id {
            Some(agent_id) => sqlx::query_scalar::<_, bool>(
                "SELECT is_affiliate FROM users WHERE id = $1 AND user_type = $2",
            )
            .bind(agent_id)
            .bind(UserType::Agent)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .unwrap_or(false),
            None => false,
        };

        let reward = approval_reward(is_affiliate, dto.reward)?;

        sqlx::query(
            r#"
            UPDATE reports
            SET status = 'approved', reviewer_id = $1, review_date = NOW(), reward = $2
            WHERE id = $3
            "#,
        )
        .bind(admin.id)
        .bind(reward)
        .bind(report_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if let (Some(agent_id), Some(amount)) = (report.agent_id, reward) {
            sqlx::query(
                r#"
                INSERT INTO agent_balances (agent_id, balance)
                VALUES ($1, $2)
                ON CONFLICT (agent_id)
                DO UPDATE SET balance = agent_balances.balance + EXCLUDED.balance,
                              updated_at = NOW()
                "#,
            )
            .bind(agent_id)
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        sqlx::query(
            r#"
            INSERT INTO address_reports (address_id, last_inspect_type, last_report_id, last_inspect_time)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (address_id, last_inspect_type)
            DO UPDATE SET last_report_id = EXCLUDED.last_report_id,
                          last_inspect_time = EXCLUDED.last_inspect_time
            "#,
        )
        .bind(report.address_id)
        .bind(report.report_type)
        .bind(report_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Report approved: id={}, reviewer={}, reward={:?}",
            report_id,
            admin.id,
            reward
        );

        self.audit
            .log(admin.id, ACTION_APPROVE, Some(TARGET_REPORT), Some(report_id))
            .await;

        self.get_joined(report_id).await
    }

    /// Decline a draft with an optional comment. No ledger effect.
    pub async fn decline(
        &self,
        admin: &AuthenticatedUser,
        report_id: Uuid,
        dto: DeclineReportRequestDto,
    ) -> Result<ReportResponseDto> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET status = 'declined', reviewer_id = $1, review_date = NOW(), comment = $2
            WHERE id = $3 AND status = 'draft'
            "#,
        )
        .bind(admin.id)
        .bind(&dto.comment)
        .bind(report_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            let report = self.load_report(report_id).await?;
            ensure_draft(report.status)?;
            return Err(AppError::Conflict(
                "Report was decided concurrently".to_string(),
            ));
        }

        self.audit
            .log(admin.id, ACTION_DECLINE, Some(TARGET_REPORT), Some(report_id))
            .await;

        self.get_joined(report_id).await
    }

    /// Delete a report. Approved reports are immutable history: their
    /// reward has already been credited, so deletion is refused.
    pub async fn delete(&self, admin: &AuthenticatedUser, report_id: Uuid) -> Result<()> {
        let report = self.load_report(report_id).await?;

        if report.status == ReportStatus::Approved {
            return Err(AppError::Conflict(
                "Approved reports cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(report_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        self.audit
            .log(admin.id, ACTION_DELETE, Some(TARGET_REPORT), Some(report_id))
            .await;

        Ok(())
    }

    /// Presign a direct image upload under a fresh UUID key.
    pub async fn presign_upload(
        &self,
        dto: PresignUploadRequestDto,
    ) -> Result<PresignUploadResponseDto> {
        let safe_name: String = dto
            .file_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '-'
                }
            })
            .collect();

        let key = self
            .storage
            .generate_public_key(&format!("images/{}-{}", Uuid::new_v4(), safe_name));
        let upload_url = self.storage.presign_put(&key).await?;

        Ok(PresignUploadResponseDto {
            public_url: self.storage.object_url(&key),
            upload_url,
            key,
            expires_in: self.storage.presigned_url_expiry_secs(),
        })
    }

    async fn upload_pdf(&self, bytes: Vec<u8>) -> Result<String> {
        let key = self
            .storage
            .generate_public_key(&format!("reports/{}.pdf", Uuid::new_v4()));
        self.storage.upload(&key, bytes, "application/pdf").await?;
        Ok(self.storage.object_url(&key))
    }

    async fn load_report(&self, id: Uuid) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    async fn get_joined(&self, id: Uuid) -> Result<ReportResponseDto> {
        sqlx::query_as::<_, ReportWithAddress>(&format!(
            r#"
            SELECT {}
            FROM reports r
            JOIN addresses a ON a.id = r.address_id
            WHERE r.id = $1
            "#,
            REPORT_JOIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .map(ReportResponseDto::from)
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    async fn load_address(&self, id: Uuid) -> Result<Address> {
        sqlx::query_as::<_, Address>("SELECT id, address, created_at FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Address not found".to_string()))
    }

    /// Insert-or-fetch by exact string match. The no-op DO UPDATE makes
    /// the RETURNING clause yield the row in both cases.
    async fn resolve_or_create_address(&self, text: &str) -> Result<Address> {
        sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (address) VALUES ($1)
            ON CONFLICT (address) DO UPDATE SET address = EXCLUDED.address
            RETURNING id, address, created_at
            "#,
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn ensure_agent_exists(&self, agent_id: Uuid) -> Result<()> {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 AND user_type = $2")
                .bind(agent_id)
                .bind(UserType::Agent)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        exists
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))
    }
}

/// A review decision is only valid from the draft state; anything else
/// has already been decided.
fn ensure_draft(status: ReportStatus) -> Result<()> {
    if status == ReportStatus::Draft {
        Ok(())
    } else {
        Err(AppError::Conflict(format!("Report is already {}", status)))
    }
}

/// Reward rule applied at approval: an affiliate agent's report must
/// carry a positive reward, anyone else's must carry none.
fn approval_reward(is_affiliate: bool, requested: Option<Decimal>) -> Result<Option<Decimal>> {
    if is_affiliate {
        match requested {
            Some(amount) if amount > Decimal::ZERO => Ok(Some(amount)),
            _ => Err(AppError::BadRequest(
                "A positive reward is required when approving an affiliate agent's report"
                    .to_string(),
            )),
        }
    } else if requested.is_some() {
        Err(AppError::BadRequest(
            "Reward only applies to reports owned by an affiliate agent".to_string(),
        ))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affiliate_approval_requires_positive_reward() {
        assert!(approval_reward(true, None).is_err());
        assert!(approval_reward(true, Some(Decimal::ZERO)).is_err());
        assert!(approval_reward(true, Some(Decimal::from(-5))).is_err());

        let reward = Decimal::new(2550, 2);
        assert_eq!(approval_reward(true, Some(reward)).unwrap(), Some(reward));
    }

    #[test]
    fn non_affiliate_approval_rejects_reward() {
        let err = approval_reward(false, Some(Decimal::from(10))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(approval_reward(false, None).unwrap(), None);
    }

    #[test]
    fn only_drafts_can_be_decided() {
        assert!(ensure_draft(ReportStatus::Draft).is_ok());

        let err = ensure_draft(ReportStatus::Approved).unwrap_err();
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, "Report is already approved"),
            other => panic!("expected conflict, got {:?}", other),
        }

        let err = ensure_draft(ReportStatus::Declined).unwrap_err();
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, "Report is already declined"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }
}
