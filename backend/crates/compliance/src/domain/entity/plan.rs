//! Plan Catalog
//!
//! Plans are fixed at compile time. Prices are in paise (1/100 INR).

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub code: &'static str,
    pub name: &'static str,
    pub price_paise: i64,
    pub monthly_credits: i64,
    pub features: &'static [&'static str],
}

pub const CATALOG: [Plan; 4] = [
    Plan {
        code: "FREE",
        name: "Free",
        price_paise: 0,
        monthly_credits: 5,
        features: &["5 verifications per month", "GST and PAN checks"],
    },
    Plan {
        code: "STARTER",
        name: "Starter",
        price_paise: 49_900,
        monthly_credits: 50,
        features: &["50 verifications per month", "All verification types", "Risk reports"],
    },
    Plan {
        code: "PRO",
        name: "Pro",
        price_paise: 149_900,
        monthly_credits: 200,
        features: &[
            "200 verifications per month",
            "Bulk CSV upload",
            "Priority support",
        ],
    },
    Plan {
        code: "BUSINESS",
        name: "Business",
        price_paise: 299_900,
        monthly_credits: 500,
        features: &[
            "500 verifications per month",
            "API keys",
            "Audit log export",
        ],
    },
];

impl Plan {
    pub fn catalog() -> &'static [Plan] {
        &CATALOG
    }

    /// Case-insensitive lookup by code
    pub fn find(code: &str) -> Option<&'static Plan> {
        let code = code.trim();
        CATALOG.iter().find(|p| p.code.eq_ignore_ascii_case(code))
    }

    pub fn is_free(&self) -> bool {
        self.price_paise == 0
    }

    /// Whole rupees, for display
    pub fn price_inr(&self) -> i64 {
        self.price_paise / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_prices_and_credits() {
        let rows: Vec<_> = Plan::catalog()
            .iter()
            .map(|p| (p.code, p.price_paise, p.monthly_credits))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("FREE", 0, 5),
                ("STARTER", 49_900, 50),
                ("PRO", 149_900, 200),
                ("BUSINESS", 299_900, 500),
            ]
        );
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(Plan::find("pro").map(|p| p.code), Some("PRO"));
        assert!(Plan::find("FREE").unwrap().is_free());
        assert_eq!(Plan::find("STARTER").unwrap().price_inr(), 499);
        assert!(Plan::find("ENTERPRISE").is_none());
    }
}
