use std::borrow::Cow;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::format::{format_currency, format_date};
use crate::search::Searchable;

pub type EpochSeconds = u64;
pub type RecordId = u64;
/// Money amounts in rupiah cents.
pub type Cents = i64;

/// Largest amount a single money field may hold: ten trillion rupiah.
pub const MAX_AMOUNT: Cents = 1_000_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostCategory {
    Audit,
    Consultant,
    Dues,
    Guest,
    Meeting,
}

impl CostCategory {
    pub const ALL: [CostCategory; 5] = [
        CostCategory::Audit,
        CostCategory::Consultant,
        CostCategory::Dues,
        CostCategory::Guest,
        CostCategory::Meeting,
    ];

    pub fn module_key(self) -> &'static str {
        match self {
            CostCategory::Audit => "audit",
            CostCategory::Consultant => "konsultan",
            CostCategory::Dues => "iuran",
            CostCategory::Guest => "tamu",
            CostCategory::Meeting => "rapat",
        }
    }

    /// Category name as stored in the ledger tables.
    pub fn ledger_name(self) -> &'static str {
        match self {
            CostCategory::Audit => "Beban Biaya Audit",
            CostCategory::Consultant => "Beban Biaya Konsultan",
            CostCategory::Dues => "Beban Biaya Iuran",
            CostCategory::Guest => "Beban Biaya Tamu",
            CostCategory::Meeting => "Beban Biaya Rapat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CostCategory::Audit => "Audit",
            CostCategory::Consultant => "Konsultan",
            CostCategory::Dues => "Iuran",
            CostCategory::Guest => "Tamu",
            CostCategory::Meeting => "Rapat",
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ledger_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MasterId(pub u64);

impl fmt::Display for MasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Budget line for one subcategory of a cost category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMaster {
    pub id: MasterId,
    pub category: CostCategory,
    pub subcategory: String,
    pub initial_amount: Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: RecordId,
    pub master_id: MasterId,
    pub activity_date: NaiveDate,
    pub activity_name: String,
    pub headcount: u32,
    pub cost: Cents,
    pub created_at: EpochSeconds,
}

impl Searchable for Transaction {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.activity_name.as_str()),
            Cow::Owned(self.activity_date.to_string()),
            Cow::Owned(format_date(Some(self.activity_date))),
            Cow::Owned(format_currency(self.cost)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    pub master_id: MasterId,
    pub category: CostCategory,
    pub subcategory: String,
    pub initial_amount: Cents,
    pub total_usage: Cents,
    pub final_amount: Cents,
    pub transaction_count: usize,
}

/// One official-travel (BPD) cost row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelCost {
    pub id: RecordId,
    pub audit_name: String,
    pub requester: String,
    pub audit_type: String,
    pub spd_number: String,
    pub bpd_number: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub audit_days: u32,
    pub departure_cost: Cents,
    pub lodging_cost: Cents,
    pub return_cost: Cents,
    pub accommodation_total: Cents,
    pub duty_detail: Cents,
    pub accommodation_duty_total: Cents,
    pub realization: Cents,
    pub created_at: EpochSeconds,
}

impl TravelCost {
    /// Budget year a row is reconciled against.
    pub fn budget_year(&self) -> i32 {
        self.period_start.year()
    }
}

impl Searchable for TravelCost {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.audit_name.as_str()),
            Cow::Borrowed(self.requester.as_str()),
            Cow::Borrowed(self.audit_type.as_str()),
            Cow::Borrowed(self.spd_number.as_str()),
            Cow::Borrowed(self.bpd_number.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelBudget {
    pub year: i32,
    pub allocated: Cents,
    #[serde(default)]
    pub realized: Cents,
}

impl TravelBudget {
    pub fn new(year: i32, allocated: Cents) -> Self {
        Self {
            year,
            allocated,
            realized: 0,
        }
    }

    pub fn remaining(&self) -> Cents {
        self.allocated.saturating_sub(self.realized)
    }
}

/// Total travel cost per audit, used for the breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTotal {
    pub audit_name: String,
    pub total: Cents,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_match_the_ledger() {
        assert_eq!(CostCategory::Consultant.module_key(), "konsultan");
        assert_eq!(CostCategory::Meeting.to_string(), "Beban Biaya Rapat");
    }

    #[test]
    fn travel_cost_roundtrip() {
        let record = TravelCost {
            id: 7,
            audit_name: "Audit Cabang Medan".to_string(),
            requester: "Sari".to_string(),
            audit_type: "Operasional".to_string(),
            spd_number: "SPD-001".to_string(),
            bpd_number: "BPD-001".to_string(),
            period_start: NaiveDate::from_ymd_opt(2024, 12, 30).expect("date"),
            period_end: NaiveDate::from_ymd_opt(2025, 1, 2).expect("date"),
            audit_days: 4,
            departure_cost: 15_000_000,
            lodging_cost: 30_000_000,
            return_cost: 15_000_000,
            accommodation_total: 60_000_000,
            duty_detail: 20_000_000,
            accommodation_duty_total: 80_000_000,
            realization: 75_000_000,
            created_at: 1_725_000_000,
        };

        let ron = ron::ser::to_string_pretty(&record, ron::ser::PrettyConfig::default())
            .expect("serialize RON");
        let decoded: TravelCost = ron::from_str(&ron).expect("deserialize RON");

        assert_eq!(decoded, record);
        assert_eq!(decoded.budget_year(), 2024);
    }

    #[test]
    fn budget_realized_defaults_to_zero() {
        let budget: TravelBudget =
            ron::from_str("(year: 2025, allocated: 100000000)").expect("deserialize RON");
        assert_eq!(budget.realized, 0);
        assert_eq!(budget.remaining(), 100_000_000);
    }
}
