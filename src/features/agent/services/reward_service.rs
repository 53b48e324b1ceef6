use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::agent::dtos::{
    AgentRewardResponseDto, AgentStatusResponseDto, ApproveWithdrawalRequestDto,
    WithdrawRequestDto, WithdrawalFilter, WithdrawalResponseDto,
};
use crate::features::agent::models::{BalanceWithAgent, WithdrawReward, WithdrawStatus, WithdrawWithAgent};
use crate::features::audit::AuditService;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::{
    ACTION_APPROVE, ACTION_DECLINE, ACTION_WITHDRAW, TARGET_WITHDRAW,
};
use crate::shared::types::PaginationQuery;

const WITHDRAW_JOIN_COLUMNS: &str = "w.id, w.agent_id, u.username AS agent_name, w.amount, \
     w.status, w.submit_datetime, w.review_datetime, w.reviewer_id, w.invoice_pdf";

/// The reward ledger: balance queries, withdrawal submission, and the
/// admin decisions that debit it. The balance is only ever touched
/// incrementally; the conditional debit on approval is the sole guard
/// against overdrawing.
pub struct RewardService {
    pool: PgPool,
    audit: Arc<AuditService>,
}

impl RewardService {
    pub fn new(pool: PgPool, audit: Arc<AuditService>) -> Self {
        Self { pool, audit }
    }

    /// Dashboard numbers for the calling agent.
    pub async fn status(&self, agent: &AuthenticatedUser) -> Result<AgentStatusResponseDto> {
        let balance = self.current_balance(agent.id).await?;

        let (approved, pending): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE status = 'approved'), 0),
                COALESCE(SUM(amount) FILTER (WHERE status = 'pending'), 0)
            FROM withdraw_rewards
            WHERE agent_id = $1
            "#,
        )
        .bind(agent.id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(AgentStatusResponseDto {
            is_affiliate: agent.is_affiliate,
            balance,
            total_approved_withdrawals: approved,
            total_pending_withdrawals: pending,
        })
    }

    /// Submit a withdrawal request. The balance check here is advisory;
    /// the approval-time conditional debit is what actually prevents
    /// overdrawing under concurrency.
    pub async fn withdraw(
        &self,
        agent: &AuthenticatedUser,
        dto: WithdrawRequestDto,
    ) -> Result<WithdrawalResponseDto> {
        let balance = self.current_balance(agent.id).await?;
        validate_withdrawal_amount(dto.amount, balance)?;

        let withdrawal = sqlx::query_as::<_, WithdrawReward>(
            r#"
            INSERT INTO withdraw_rewards (agent_id, amount)
            VALUES ($1, $2)
            RETURNING id, agent_id, amount, status, submit_datetime, review_datetime,
                      reviewer_id, invoice_pdf
            "#,
        )
        .bind(agent.id)
        .bind(dto.amount)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        tracing::info!(
            "Withdrawal submitted: id={}, agent={}, amount={}",
            withdrawal.id,
            agent.id,
            dto.amount
        );

        self.audit
            .log(
                agent.id,
                ACTION_WITHDRAW,
                Some(TARGET_WITHDRAW),
                Some(withdrawal.id),
            )
            .await;

        self.get_withdrawal(withdrawal.id).await
    }

    /// List withdrawals newest-first. Admins see all and may filter by
    /// agent username; agents see their own.
    pub async fn list_withdrawals(
        &self,
        actor: &AuthenticatedUser,
        filter: &WithdrawalFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<WithdrawalResponseDto>, i64)> {
        let agent_name = if actor.is_admin() {
            filter.agent_name.as_deref()
        } else {
            None
        };

        let rows = sqlx::query_as::<_, WithdrawWithAgent>(&format!(
            r#"
            SELECT {}
            FROM withdraw_rewards w
            JOIN users u ON u.id = w.agent_id
            WHERE ($1 OR w.agent_id = $2)
              AND ($3::text IS NULL OR u.username ILIKE '%' || $3 || '%')
            ORDER BY w.submit_datetime DESC
            LIMIT $4 OFFSET $5
            "#,
            WITHDRAW_JOIN_COLUMNS
        ))
        .bind(actor.is_admin())
        .bind(actor.id)
        .bind(agent_name)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM withdraw_rewards w
            JOIN users u ON u.id = w.agent_id
            WHERE ($1 OR w.agent_id = $2)
              AND ($3::text IS NULL OR u.username ILIKE '%' || $3 || '%')
            "#,
        )
        .bind(actor.is_admin())
        .bind(actor.id)
        .bind(agent_name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((rows.into_iter().map(WithdrawalResponseDto::from).collect(), total))
    }

    /// Approve a pending withdrawal. Status change and balance debit
    /// commit together; the debit only succeeds while the balance still
    /// covers the amount, so a concurrent drain turns into a conflict
    /// instead of a negative balance.
    pub async fn approve_withdrawal(
        &self,
        admin: &AuthenticatedUser,
        withdrawal_id: Uuid,
        dto: ApproveWithdrawalRequestDto,
    ) -> Result<WithdrawalResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let withdrawal = sqlx::query_as::<_, WithdrawReward>(
            r#"
            SELECT id, agent_id, amount, status, submit_datetime, review_datetime,
                   reviewer_id, invoice_pdf
            FROM withdraw_rewards WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(withdrawal_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))?;

        ensure_pending(withdrawal.status)?;

        let debit = sqlx::query(
            r#"
            UPDATE agent_balances
            SET balance = balance - $1, updated_at = NOW()
            WHERE agent_id = $2 AND balance >= $1
            "#,
        )
        .bind(withdrawal.amount)
        .bind(withdrawal.agent_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if debit.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Agent balance no longer covers the withdrawal amount".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE withdraw_rewards
            SET status = 'approved', review_datetime = NOW(), reviewer_id = $1, invoice_pdf = $2
            WHERE id = $3
            "#,
        )
        .bind(admin.id)
        .bind(&dto.invoice_pdf)
        .bind(withdrawal_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Withdrawal approved: id={}, agent={}, amount={}",
            withdrawal_id,
            withdrawal.agent_id,
            withdrawal.amount
        );

        self.audit
            .log(
                admin.id,
                ACTION_APPROVE,
                Some(TARGET_WITHDRAW),
                Some(withdrawal_id),
            )
            .await;

        self.get_withdrawal(withdrawal_id).await
    }

    /// Deny a pending withdrawal. No ledger effect.
    pub async fn deny_withdrawal(
        &self,
        admin: &AuthenticatedUser,
        withdrawal_id: Uuid,
    ) -> Result<WithdrawalResponseDto> {
        let result = sqlx::query(
            r#"
            UPDATE withdraw_rewards
            SET status = 'denied', review_datetime = NOW(), reviewer_id = $1
            WHERE id = $2 AND status = 'pending'
            "#,
        )
        .bind(admin.id)
        .bind(withdrawal_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            let withdrawal = self.get_withdrawal(withdrawal_id).await?;
            ensure_pending(withdrawal.status)?;
            return Err(AppError::Conflict(
                "Withdrawal was decided concurrently".to_string(),
            ));
        }

        self.audit
            .log(
                admin.id,
                ACTION_DECLINE,
                Some(TARGET_WITHDRAW),
                Some(withdrawal_id),
            )
            .await;

        self.get_withdrawal(withdrawal_id).await
    }

    /// Admin view over all agent balances, optionally filtered by
    /// username.
    pub async fn list_rewards(
        &self,
        filter: &WithdrawalFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<AgentRewardResponseDto>, i64)> {
        let rows = sqlx::query_as::<_, BalanceWithAgent>(
            r#"
            SELECT b.id, b.agent_id, u.username AS agent_name, u.is_affiliate,
                   b.balance, b.updated_at
            FROM agent_balances b
            JOIN users u ON u.id = b.agent_id
            WHERE $1::text IS NULL OR u.username ILIKE '%' || $1 || '%'
            ORDER BY b.updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.agent_name.as_deref())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM agent_balances b
            JOIN users u ON u.id = b.agent_id
            WHERE $1::text IS NULL OR u.username ILIKE '%' || $1 || '%'
            "#,
        )
        .bind(filter.agent_name.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((rows.into_iter().map(AgentRewardResponseDto::from).collect(), total))
    }

    async fn current_balance(&self, agent_id: Uuid) -> Result<Decimal> {
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM agent_balances WHERE agent_id = $1")
                .bind(agent_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    async fn get_withdrawal(&self, id: Uuid) -> Result<WithdrawalResponseDto> {
        sqlx::query_as::<_, WithdrawWithAgent>(&format!(
            r#"
            SELECT {}
            FROM withdraw_rewards w
            JOIN users u ON u.id = w.agent_id
            WHERE w.id = $1
            "#,
            WITHDRAW_JOIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .map(WithdrawalResponseDto::from)
        .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))
    }
}

/// Submission-time amount check against the balance snapshot. Advisory
/// only; the approval-time conditional debit is the real guard.
fn validate_withdrawal_amount(amount: Decimal, balance: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Withdrawal amount must be positive".to_string(),
        ));
    }
    if amount > balance {
        return Err(AppError::BadRequest(format!(
            "Withdrawal amount exceeds available balance of {}",
            balance
        )));
    }
    Ok(())
}

/// Withdrawals are decided at most once; anything past pending is final.
fn ensure_pending(status: WithdrawStatus) -> Result<()> {
    if status == WithdrawStatus::Pending {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "Withdrawal is already {}",
            status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_amount_must_be_positive() {
        let balance = Decimal::from(100);
        assert!(validate_withdrawal_amount(Decimal::ZERO, balance).is_err());
        assert!(validate_withdrawal_amount(Decimal::from(-1), balance).is_err());
        assert!(validate_withdrawal_amount(Decimal::from(1), balance).is_ok());
    }

    #[test]
    fn withdrawal_cannot_exceed_balance() {
        let balance = Decimal::new(5025, 2);

        let err = validate_withdrawal_amount(Decimal::from(51), balance).unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert_eq!(msg, "Withdrawal amount exceeds available balance of 50.25")
            }
            other => panic!("expected bad request, got {:?}", other),
        }

        // Draining the full balance is allowed
        assert!(validate_withdrawal_amount(balance, balance).is_ok());
    }

    #[test]
    fn decided_withdrawals_cannot_be_redecided() {
        assert!(ensure_pending(WithdrawStatus::Pending).is_ok());

        let err = ensure_pending(WithdrawStatus::Approved).unwrap_err();
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, "Withdrawal is already approved"),
            other => panic!("expected conflict, got {:?}", other),
        }

        assert!(ensure_pending(WithdrawStatus::Denied).is_err());
    }
}
