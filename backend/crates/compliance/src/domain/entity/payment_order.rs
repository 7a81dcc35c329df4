//! Payment Order
//!
//! Created before checkout; marked paid once the gateway signature checks
//! out. An order is paid at most once.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use nid::Nanoid;
use serde::{Deserialize, Serialize};

use crate::domain::entity::plan::Plan;

pub const CURRENCY: &str = "INR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
}

impl OrderStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "created" => Some(OrderStatus::Created),
            "paid" => Some(OrderStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentOrder {
    /// `order_<nanoid>`
    pub id: String,
    pub owner: UserId,
    pub plan_code: String,
    pub amount_paise: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentOrder {
    pub fn new(owner: UserId, plan: &Plan) -> Self {
        let nanoid: Nanoid = Nanoid::new();
        Self {
            id: format!("order_{nanoid}"),
            owner,
            plan_code: plan.code.to_string(),
            amount_paise: plan.price_paise,
            currency: CURRENCY.to_string(),
            status: OrderStatus::Created,
            payment_id: None,
            created_at: Utc::now(),
            paid_at: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    pub fn mark_paid(&mut self, payment_id: impl Into<String>) {
        self.status = OrderStatus::Paid;
        self.payment_id = Some(payment_id.into());
        self.paid_at = Some(Utc::now());
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order() {
        let plan = Plan::find("PRO").unwrap();
        let order = PaymentOrder::new(UserId::new(), plan);
        assert!(order.id.starts_with("order_"));
        assert_eq!(order.id.len(), "order_".len() + 21);
        assert_eq!(order.amount_paise, 149_900);
        assert_eq!(order.currency, "INR");
        assert!(!order.is_paid());
    }

    #[test]
    fn test_mark_paid() {
        let mut order = PaymentOrder::new(UserId::new(), Plan::find("STARTER").unwrap());
        order.mark_paid("pay_123");
        assert!(order.is_paid());
        assert_eq!(order.payment_id.as_deref(), Some("pay_123"));
        assert!(order.paid_at.is_some());
    }
}
