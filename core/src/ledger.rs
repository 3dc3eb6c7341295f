use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::model::{
    AuditTotal, Cents, CostMaster, CostSummary, EpochSeconds, RecordId, Transaction,
    TravelBudget, TravelCost, MAX_AMOUNT,
};
use crate::targets;
use crate::Error;

pub const UNKNOWN_AUDIT: &str = "Unknown";

const AMOUNT_TOO_LARGE: &str = "Amount must not exceed Rp10.000.000.000.000.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDraft {
    pub activity_date: Option<NaiveDate>,
    pub activity_name: String,
    pub headcount: u32,
    pub cost: Cents,
}

impl TransactionDraft {
    pub fn validate(&self) -> Result<(), Error> {
        if self.activity_date.is_none() {
            return Err(Error::validation("activity_date", "Activity date is required."));
        }
        if self.activity_name.trim().is_empty() {
            return Err(Error::validation("activity_name", "Activity name is required."));
        }
        if self.headcount == 0 {
            return Err(Error::validation("headcount", "Headcount must be at least 1."));
        }
        if self.cost <= 0 {
            return Err(Error::validation("cost", "Cost must be greater than zero."));
        }
        if self.cost > MAX_AMOUNT {
            return Err(Error::validation("cost", AMOUNT_TOO_LARGE));
        }
        Ok(())
    }

    pub fn into_transaction(
        self,
        id: RecordId,
        master: &CostMaster,
        created_at: EpochSeconds,
    ) -> Result<Transaction, Error> {
        self.validate()?;
        let activity_date = self
            .activity_date
            .ok_or_else(|| Error::validation("activity_date", "Activity date is required."))?;

        Ok(Transaction {
            id,
            master_id: master.id,
            activity_date,
            activity_name: self.activity_name.trim().to_string(),
            headcount: self.headcount,
            cost: self.cost,
            created_at,
        })
    }
}

pub fn summarize(master: &CostMaster, transactions: &[Transaction]) -> Result<CostSummary, Error> {
    let overflow = || Error::InvalidArgument {
        operation: "summarize",
        details: format!("usage of {} exceeds the representable amount", master.subcategory),
    };

    let (total_usage, transaction_count) = transactions
        .iter()
        .filter(|transaction| transaction.master_id == master.id)
        .try_fold((0 as Cents, 0), |(total, count), transaction| {
            total
                .checked_add(transaction.cost)
                .map(|total| (total, count + 1))
        })
        .ok_or_else(overflow)?;
    let final_amount = master
        .initial_amount
        .checked_sub(total_usage)
        .ok_or_else(overflow)?;

    Ok(CostSummary {
        master_id: master.id,
        category: master.category,
        subcategory: master.subcategory.clone(),
        initial_amount: master.initial_amount,
        total_usage,
        final_amount,
        transaction_count,
    })
}

/// Days covered by an audit period, counting both the first and last day.
pub fn audit_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let span = (end - start).num_days().unsigned_abs() + 1;
    u32::try_from(span).unwrap_or(u32::MAX)
}

/// Form state for creating or editing a BPD row. Totals are always derived
/// from the component costs and never entered directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelCostDraft {
    pub audit_name: String,
    pub requester: String,
    pub audit_type: String,
    pub spd_number: String,
    pub bpd_number: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    /// Overrides the day count derived from the period when set.
    pub audit_days: Option<u32>,
    pub departure_cost: Cents,
    pub lodging_cost: Cents,
    pub return_cost: Cents,
    pub duty_detail: Cents,
    pub realization: Cents,
}

impl TravelCostDraft {
    pub fn from_record(record: &TravelCost) -> Self {
        Self {
            audit_name: record.audit_name.clone(),
            requester: record.requester.clone(),
            audit_type: record.audit_type.clone(),
            spd_number: record.spd_number.clone(),
            bpd_number: record.bpd_number.clone(),
            period_start: Some(record.period_start),
            period_end: Some(record.period_end),
            audit_days: Some(record.audit_days),
            departure_cost: record.departure_cost,
            lodging_cost: record.lodging_cost,
            return_cost: record.return_cost,
            duty_detail: record.duty_detail,
            realization: record.realization,
        }
    }

    /// `None` when the sum does not fit in [`Cents`].
    pub fn accommodation_total(&self) -> Option<Cents> {
        self.departure_cost
            .checked_add(self.lodging_cost)?
            .checked_add(self.return_cost)
    }

    pub fn accommodation_duty_total(&self) -> Option<Cents> {
        self.accommodation_total()?.checked_add(self.duty_detail)
    }

    pub fn derived_audit_days(&self) -> Option<u32> {
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => Some(audit_days(start, end)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("audit_name", &self.audit_name, "Audit name is required."),
            ("requester", &self.requester, "Requester is required."),
            ("audit_type", &self.audit_type, "Audit type is required."),
            ("spd_number", &self.spd_number, "SPD number is required."),
            ("bpd_number", &self.bpd_number, "BPD number is required."),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                return Err(Error::validation(field, message));
            }
        }

        let (Some(start), Some(end)) = (self.period_start, self.period_end) else {
            return Err(Error::validation(
                "period",
                "Period start and end are required.",
            ));
        };
        if end < start {
            return Err(Error::validation(
                "period_end",
                "Period end must be on or after period start.",
            ));
        }

        if let Some(0) = self.audit_days {
            return Err(Error::validation(
                "audit_days",
                "Audit length must be at least 1 day.",
            ));
        }

        let amounts = [
            self.departure_cost,
            self.lodging_cost,
            self.return_cost,
            self.duty_detail,
            self.realization,
        ];
        if amounts.iter().any(|amount| *amount < 0) {
            return Err(Error::validation("amount", "Amounts must not be negative."));
        }
        if amounts.iter().any(|amount| *amount > MAX_AMOUNT) {
            return Err(Error::validation("amount", AMOUNT_TOO_LARGE));
        }
        if self.accommodation_duty_total().is_none() {
            return Err(Error::validation("amount", "Total cost is too large."));
        }

        Ok(())
    }

    pub fn into_record(self, id: RecordId, created_at: EpochSeconds) -> Result<TravelCost, Error> {
        self.validate()?;
        let (Some(period_start), Some(period_end)) = (self.period_start, self.period_end) else {
            return Err(Error::validation(
                "period",
                "Period start and end are required.",
            ));
        };
        let total_too_large = || Error::validation("amount", "Total cost is too large.");
        let accommodation_total = self.accommodation_total().ok_or_else(total_too_large)?;
        let accommodation_duty_total = self
            .accommodation_duty_total()
            .ok_or_else(total_too_large)?;

        Ok(TravelCost {
            id,
            audit_days: self
                .audit_days
                .unwrap_or_else(|| audit_days(period_start, period_end)),
            accommodation_total,
            accommodation_duty_total,
            audit_name: self.audit_name.trim().to_string(),
            requester: self.requester.trim().to_string(),
            audit_type: self.audit_type.trim().to_string(),
            spd_number: self.spd_number.trim().to_string(),
            bpd_number: self.bpd_number.trim().to_string(),
            period_start,
            period_end,
            departure_cost: self.departure_cost,
            lodging_cost: self.lodging_cost,
            return_cost: self.return_cost,
            duty_detail: self.duty_detail,
            realization: self.realization,
            created_at,
        })
    }
}

/// Sums accommodation + duty totals per audit name, largest first.
pub fn aggregate_by_audit(records: &[TravelCost]) -> Vec<AuditTotal> {
    let mut totals: BTreeMap<String, Cents> = BTreeMap::new();
    for record in records {
        let name = record.audit_name.trim();
        let name = if name.is_empty() { UNKNOWN_AUDIT } else { name };
        let total = totals.entry(name.to_string()).or_insert(0);
        *total = total.saturating_add(record.accommodation_duty_total);
    }

    let mut totals: Vec<AuditTotal> = totals
        .into_iter()
        .map(|(audit_name, total)| AuditTotal { audit_name, total })
        .collect();
    totals.sort_by(|left, right| right.total.cmp(&left.total));
    totals
}

pub fn top_costs(records: &[TravelCost], count: usize) -> Vec<TravelCost> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|left, right| {
        right
            .accommodation_duty_total
            .cmp(&left.accommodation_duty_total)
    });
    ranked.truncate(count);
    ranked
}

pub fn bottom_costs(records: &[TravelCost], count: usize) -> Vec<TravelCost> {
    let mut ranked = records.to_vec();
    ranked.sort_by_key(|record| record.accommodation_duty_total);
    ranked.truncate(count);
    ranked
}

#[derive(Debug, Clone, Copy)]
pub enum BudgetChange<'a> {
    Insert(&'a TravelCost),
    Update {
        before: &'a TravelCost,
        after: &'a TravelCost,
    },
    Delete(&'a TravelCost),
}

/// Applies the realization delta of a BPD mutation to the yearly budgets.
/// On error `budgets` may be partially adjusted; callers apply this to a
/// working copy.
pub fn reconcile(budgets: &mut Vec<TravelBudget>, change: BudgetChange<'_>) -> Result<(), Error> {
    match change {
        BudgetChange::Insert(record) => {
            adjust_realized(budgets, record.budget_year(), record.realization)
        }
        BudgetChange::Update { before, after } => {
            adjust_realized(budgets, before.budget_year(), -before.realization)?;
            adjust_realized(budgets, after.budget_year(), after.realization)
        }
        BudgetChange::Delete(record) => {
            adjust_realized(budgets, record.budget_year(), -record.realization)
        }
    }
}

/// Index of the budget for `year`, created with zero allocation if missing.
/// Lookup is linear so budgets loaded out of order are still found.
pub(crate) fn budget_index(budgets: &mut Vec<TravelBudget>, year: i32) -> usize {
    if let Some(index) = budgets.iter().position(|budget| budget.year == year) {
        return index;
    }

    let index = budgets
        .iter()
        .position(|budget| budget.year > year)
        .unwrap_or(budgets.len());
    budgets.insert(index, TravelBudget::new(year, 0));
    index
}

fn adjust_realized(budgets: &mut Vec<TravelBudget>, year: i32, delta: Cents) -> Result<(), Error> {
    if delta == 0 {
        return Ok(());
    }

    if !budgets.iter().any(|budget| budget.year == year) {
        warn!(
            target: targets::LEDGER,
            year,
            "No travel budget allocated for year; tracking realization against zero"
        );
    }
    let index = budget_index(budgets, year);

    let budget = &mut budgets[index];
    budget.realized = budget
        .realized
        .checked_add(delta)
        .ok_or_else(|| Error::InvalidArgument {
            operation: "reconcile",
            details: format!("realization for {year} exceeds the representable amount"),
        })?;
    debug!(
        target: targets::LEDGER,
        year,
        delta,
        realized = budget.realized,
        remaining = budget.remaining(),
        "Travel budget reconciled"
    );
    Ok(())
}
