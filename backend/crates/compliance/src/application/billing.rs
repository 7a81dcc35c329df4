//! Plans & Payments
//!
//! Checkout is two steps: create an order for a paid plan, then verify
//! the gateway's signature over `"{orderId}|{paymentId}"`. A verified
//! payment switches the plan and resets the wallet to the plan's monthly
//! credits.

use std::sync::Arc;

use auth::domain::repository::UserRepository;
use kernel::error::app_error::AppError;
use kernel::id::UserId;
use platform::crypto::verify_hmac_sha256_hex;
use serde_json::json;

use crate::application::audit::record_audit;
use crate::domain::entity::{
    audit_entry::{AuditAction, AuditEntry, AuditTarget},
    payment_order::PaymentOrder,
    plan::Plan,
};
use crate::domain::repository::{AuditRepository, PaymentOrderRepository};
use crate::error::{ComplianceError, ComplianceResult};

#[derive(Debug, Clone)]
pub struct VerifyPaymentInput {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub plan_code: String,
    pub credits: i64,
}

impl PaymentOutcome {
    pub fn message(&self) -> String {
        format!("Successfully upgraded to {} plan", self.plan_code)
    }
}

pub struct BillingUseCase<O, U, A>
where
    O: PaymentOrderRepository,
    U: UserRepository,
    A: AuditRepository,
{
    orders: Arc<O>,
    users: Arc<U>,
    audit: Arc<A>,
    key_secret: String,
}

impl<O, U, A> BillingUseCase<O, U, A>
where
    O: PaymentOrderRepository,
    U: UserRepository,
    A: AuditRepository,
{
    pub fn new(orders: Arc<O>, users: Arc<U>, audit: Arc<A>, key_secret: impl Into<String>) -> Self {
        Self {
            orders,
            users,
            audit,
            key_secret: key_secret.into(),
        }
    }

    pub async fn create_order(
        &self,
        owner: UserId,
        plan_code: &str,
    ) -> ComplianceResult<(PaymentOrder, &'static Plan)> {
        let plan = Plan::find(plan_code)
            .filter(|p| !p.is_free())
            .ok_or_else(|| ComplianceError::InvalidPlan(plan_code.trim().to_string()))?;

        let order = PaymentOrder::new(owner, plan);
        self.orders.create(&order).await?;

        tracing::info!(order_id = %order.id, plan = plan.code, "Payment order created");
        Ok((order, plan))
    }

    pub async fn verify_payment(
        &self,
        owner: UserId,
        input: VerifyPaymentInput,
    ) -> ComplianceResult<PaymentOutcome> {
        let order_id = input.order_id.trim();
        let payment_id = input.payment_id.trim();
        let signature = input.signature.trim();
        if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
            return Err(AppError::bad_request("orderId, paymentId and signature are required").into());
        }

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .filter(|o| o.is_owned_by(&owner))
            .ok_or(ComplianceError::OrderNotFound)?;
        if order.is_paid() {
            return Err(ComplianceError::OrderAlreadyPaid);
        }

        if !self.signature_matches(order_id, payment_id, signature) {
            return Err(ComplianceError::InvalidSignature);
        }

        order.mark_paid(payment_id);
        if !self.orders.mark_paid(&order).await? {
            return Err(ComplianceError::OrderAlreadyPaid);
        }

        // The plan comes from the stored order, never from the request
        let plan = Plan::find(&order.plan_code).ok_or_else(|| {
            ComplianceError::Internal(format!("order {} references unknown plan", order.id))
        })?;

        // Plan and wallet writes are idempotent, so a reopened order can
        // be verified again and finish the upgrade
        if let Err(e) = self.apply_plan(&owner, plan).await {
            tracing::error!(order_id = %order.id, error = %e, "Plan upgrade failed; reopening order");
            if let Err(reopen) = self.orders.reopen(&order.id).await {
                tracing::error!(order_id = %order.id, error = %reopen, "Failed to reopen order");
            }
            return Err(e);
        }

        record_audit(
            self.audit.as_ref(),
            AuditEntry::new(
                owner,
                AuditAction::PlanUpgrade,
                AuditTarget::Subscription,
                Some(order.id.clone()),
                json!({ "plan": plan.code, "payment_id": payment_id }),
            ),
        )
        .await;

        tracing::info!(order_id = %order.id, plan = plan.code, "Plan upgraded");
        Ok(PaymentOutcome {
            plan_code: plan.code.to_string(),
            credits: plan.monthly_credits,
        })
    }

    async fn apply_plan(&self, owner: &UserId, plan: &Plan) -> ComplianceResult<()> {
        let mut user = self
            .users
            .find_by_id(owner)
            .await?
            .ok_or(ComplianceError::UserNotFound)?;
        user.apply_plan(plan.code, plan.monthly_credits);
        self.users.update(&user).await?;
        self.users.set_credits(owner, plan.monthly_credits).await?;
        Ok(())
    }

    fn signature_matches(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        if self.key_secret.is_empty() {
            tracing::error!("Payment key secret is not configured; rejecting signature");
            return false;
        }
        let message = format!("{order_id}|{payment_id}");
        verify_hmac_sha256_hex(self.key_secret.as_bytes(), message.as_bytes(), signature)
    }
}
