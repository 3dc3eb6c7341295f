use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use ron::ser::{to_string_pretty, PrettyConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::ledger::{
    aggregate_by_audit, bottom_costs, budget_index, reconcile, summarize, top_costs,
    BudgetChange, TransactionDraft, TravelCostDraft,
};
use crate::model::{
    AuditTotal, Cents, CostCategory, CostMaster, CostSummary, EpochSeconds, MasterId, RecordId,
    Transaction, TravelBudget, TravelCost, MAX_AMOUNT,
};
use crate::targets;
use crate::{Error, StorageAction};

/// Number of entries shown in the highest / lowest travel cost rankings.
pub const RANKING_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct CostView {
    pub summary: CostSummary,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TravelView {
    pub year: Option<i32>,
    pub records: Vec<TravelCost>,
    pub chart: Vec<AuditTotal>,
    pub top: Vec<TravelCost>,
    pub bottom: Vec<TravelCost>,
    pub budget: Option<TravelBudget>,
    pub years: Vec<i32>,
}

/// Everything the dashboard persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerData {
    #[serde(default)]
    pub masters: Vec<CostMaster>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub travel_costs: Vec<TravelCost>,
    #[serde(default)]
    pub travel_budgets: Vec<TravelBudget>,
    #[serde(default)]
    pub next_id: u64,
}

impl LedgerData {
    /// Starter ledger with one or two subcategories per cost category.
    pub fn seeded(budget_year: i32) -> Self {
        let lines = [
            (CostCategory::Audit, "Audit Eksternal", 50_000_000_000),
            (CostCategory::Audit, "Audit Internal", 25_000_000_000),
            (CostCategory::Consultant, "Konsultan Hukum", 30_000_000_000),
            (CostCategory::Consultant, "Konsultan TI", 20_000_000_000),
            (CostCategory::Dues, "Iuran Asosiasi", 5_000_000_000),
            (CostCategory::Guest, "Jamuan Tamu", 7_500_000_000),
            (CostCategory::Meeting, "Rapat Direksi", 12_000_000_000),
            (CostCategory::Meeting, "Rapat Koordinasi", 8_000_000_000),
        ];

        let masters: Vec<CostMaster> = lines
            .into_iter()
            .zip(1..)
            .map(|((category, subcategory, initial_amount), id)| CostMaster {
                id: MasterId(id),
                category,
                subcategory: subcategory.to_string(),
                initial_amount,
            })
            .collect();
        let next_id = masters.len() as u64 + 1;

        Self {
            masters,
            transactions: Vec::new(),
            travel_costs: Vec::new(),
            travel_budgets: vec![TravelBudget::new(budget_year, 100_000_000_000)],
            next_id,
        }
    }

    /// Sorts budgets by year and folds duplicate years into the first entry,
    /// summing their realization.
    pub fn normalize(&mut self) {
        self.travel_budgets.sort_by_key(|budget| budget.year);
        let mut merged: Vec<TravelBudget> = Vec::with_capacity(self.travel_budgets.len());
        for budget in self.travel_budgets.drain(..) {
            match merged.last_mut() {
                Some(previous) if previous.year == budget.year => {
                    warn!(
                        target: targets::STORE,
                        year = budget.year,
                        "Duplicate travel budget merged"
                    );
                    previous.realized = previous.realized.saturating_add(budget.realized);
                }
                _ => merged.push(budget),
            }
        }
        self.travel_budgets = merged;
    }

    fn allocate_id(&mut self) -> u64 {
        let floor = self
            .masters
            .iter()
            .map(|master| master.id.0)
            .chain(self.transactions.iter().map(|transaction| transaction.id))
            .chain(self.travel_costs.iter().map(|record| record.id))
            .max()
            .map_or(1, |id| id + 1);
        let id = self.next_id.max(floor);
        self.next_id = id + 1;
        id
    }

    pub fn subcategories(&self, category: CostCategory) -> Vec<String> {
        let mut names: Vec<String> = self
            .masters
            .iter()
            .filter(|master| master.category == category)
            .map(|master| master.subcategory.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn master(&self, category: CostCategory, subcategory: &str) -> Result<&CostMaster, Error> {
        self.masters
            .iter()
            .find(|master| master.category == category && master.subcategory == subcategory)
            .ok_or_else(|| Error::MasterNotFound {
                category: category.ledger_name().to_string(),
                subcategory: subcategory.to_string(),
            })
    }

    pub fn cost_view(&self, category: CostCategory, subcategory: &str) -> Result<CostView, Error> {
        let master = self.master(category, subcategory)?;
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|transaction| transaction.master_id == master.id)
            .cloned()
            .collect();
        transactions.sort_by(|left, right| {
            right
                .activity_date
                .cmp(&left.activity_date)
                .then(right.id.cmp(&left.id))
        });

        Ok(CostView {
            summary: summarize(master, &transactions)?,
            transactions,
        })
    }

    pub fn insert_transaction(
        &mut self,
        category: CostCategory,
        subcategory: &str,
        draft: TransactionDraft,
        created_at: EpochSeconds,
    ) -> Result<Transaction, Error> {
        draft.validate()?;
        let master = self.master(category, subcategory)?.clone();
        let id = self.allocate_id();
        let transaction = draft.into_transaction(id, &master, created_at)?;
        self.transactions.push(transaction.clone());
        if let Err(error) = summarize(&master, &self.transactions) {
            self.transactions.pop();
            return Err(error);
        }
        Ok(transaction)
    }

    pub fn travel_view(&self, year: Option<i32>) -> TravelView {
        let mut records: Vec<TravelCost> = self
            .travel_costs
            .iter()
            .filter(|record| year.is_none_or(|year| record.budget_year() == year))
            .cloned()
            .collect();
        records.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right.id.cmp(&left.id))
        });

        let mut years: Vec<i32> = self
            .travel_costs
            .iter()
            .map(TravelCost::budget_year)
            .chain(self.travel_budgets.iter().map(|budget| budget.year))
            .collect();
        years.sort_unstable_by(|left, right| right.cmp(left));
        years.dedup();

        TravelView {
            year,
            chart: aggregate_by_audit(&records),
            top: top_costs(&records, RANKING_SIZE),
            bottom: bottom_costs(&records, RANKING_SIZE),
            budget: year.and_then(|year| {
                self.travel_budgets
                    .iter()
                    .find(|budget| budget.year == year)
                    .copied()
            }),
            years,
            records,
        }
    }

    pub fn insert_travel_cost(
        &mut self,
        draft: TravelCostDraft,
        created_at: EpochSeconds,
    ) -> Result<TravelCost, Error> {
        draft.validate()?;
        let id = self.allocate_id();
        let record = draft.into_record(id, created_at)?;
        reconcile(&mut self.travel_budgets, BudgetChange::Insert(&record))?;
        self.travel_costs.push(record.clone());
        Ok(record)
    }

    pub fn update_travel_cost(
        &mut self,
        id: RecordId,
        draft: TravelCostDraft,
    ) -> Result<TravelCost, Error> {
        let index = self.travel_index(id)?;
        let before = self.travel_costs[index].clone();
        let after = draft.into_record(id, before.created_at)?;
        reconcile(
            &mut self.travel_budgets,
            BudgetChange::Update {
                before: &before,
                after: &after,
            },
        )?;
        self.travel_costs[index] = after.clone();
        Ok(after)
    }

    pub fn delete_travel_cost(&mut self, id: RecordId) -> Result<TravelCost, Error> {
        let index = self.travel_index(id)?;
        reconcile(
            &mut self.travel_budgets,
            BudgetChange::Delete(&self.travel_costs[index]),
        )?;
        Ok(self.travel_costs.remove(index))
    }

    pub fn set_travel_budget(&mut self, year: i32, allocated: Cents) -> Result<TravelBudget, Error> {
        if !(0..=MAX_AMOUNT).contains(&allocated) {
            return Err(Error::InvalidArgument {
                operation: "set_travel_budget",
                details: format!("allocation for {year} must be between 0 and {MAX_AMOUNT}"),
            });
        }

        let index = budget_index(&mut self.travel_budgets, year);
        self.travel_budgets[index].allocated = allocated;
        Ok(self.travel_budgets[index])
    }

    fn travel_index(&self, id: RecordId) -> Result<usize, Error> {
        self.travel_costs
            .iter()
            .position(|record| record.id == id)
            .ok_or(Error::RecordNotFound { id })
    }
}

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

/// Data access used by the dashboard views. Every mutation bumps
/// [`revision`](LedgerStore::revision) so open views can tell they are stale.
pub trait LedgerStore: Send + Sync {
    fn subcategories<'a>(&'a self, category: CostCategory) -> StoreFuture<'a, Vec<String>>;

    fn cost_view<'a>(
        &'a self,
        category: CostCategory,
        subcategory: String,
    ) -> StoreFuture<'a, CostView>;

    fn insert_transaction<'a>(
        &'a self,
        category: CostCategory,
        subcategory: String,
        draft: TransactionDraft,
    ) -> StoreFuture<'a, Transaction>;

    fn travel_view<'a>(&'a self, year: Option<i32>) -> StoreFuture<'a, TravelView>;

    fn insert_travel_cost<'a>(&'a self, draft: TravelCostDraft) -> StoreFuture<'a, TravelCost>;

    fn update_travel_cost<'a>(
        &'a self,
        id: RecordId,
        draft: TravelCostDraft,
    ) -> StoreFuture<'a, TravelCost>;

    fn delete_travel_cost<'a>(&'a self, id: RecordId) -> StoreFuture<'a, TravelCost>;

    fn set_travel_budget<'a>(
        &'a self,
        year: i32,
        allocated: Cents,
    ) -> StoreFuture<'a, TravelBudget>;

    fn revision(&self) -> u64;
}

/// Ledger kept in memory and, when a path is set, written back to a RON file
/// after every successful mutation.
///
/// Mutations run one at a time under `writer`: each is applied to a copy of
/// the ledger, saved, and only then swapped in. A failed save leaves both the
/// in-memory ledger and the revision untouched.
#[derive(Debug)]
pub struct FileLedgerStore {
    path: Option<PathBuf>,
    data: Mutex<LedgerData>,
    writer: tokio::sync::Mutex<()>,
    revision: AtomicU64,
}

impl FileLedgerStore {
    pub fn in_memory(mut data: LedgerData) -> Self {
        data.normalize();
        Self {
            path: None,
            data: Mutex::new(data),
            writer: tokio::sync::Mutex::new(()),
            revision: AtomicU64::new(0),
        }
    }

    /// Loads `path`, seeding a fresh ledger when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>, budget_year: i32) -> Result<Self, Error> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let mut data: LedgerData =
                    ron::from_str(&contents).map_err(|source| Error::RonParse {
                        action: StorageAction::Load,
                        path: Some(path.display().to_string()),
                        source,
                    })?;
                data.normalize();
                info!(
                    target: targets::STORE,
                    path = %path.display(),
                    masters = data.masters.len(),
                    transactions = data.transactions.len(),
                    travel_costs = data.travel_costs.len(),
                    "Ledger loaded"
                );
                data
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                info!(
                    target: targets::STORE,
                    path = %path.display(),
                    "Ledger file not found; starting from seed data"
                );
                LedgerData::seeded(budget_year)
            }
            Err(source) => {
                return Err(Error::StorageIo {
                    action: StorageAction::Load,
                    path: Some(path.display().to_string()),
                    source,
                });
            }
        };

        Ok(Self {
            path: Some(path),
            data: Mutex::new(data),
            writer: tokio::sync::Mutex::new(()),
            revision: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> LedgerData {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerData> {
        self.data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read<T>(&self, query: impl FnOnce(&LedgerData) -> T) -> T {
        query(&*self.lock())
    }

    async fn mutate<T, F>(&self, operation: &'static str, apply: F) -> Result<T, Error>
    where
        T: Send,
        F: FnOnce(&mut LedgerData) -> Result<T, Error> + Send,
    {
        let _writer = self.writer.lock().await;

        let mut working = self.snapshot();
        let value = apply(&mut working)?;
        if let Some(path) = &self.path {
            save_ledger(path, &working).await?;
        }

        *self.lock() = working;
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(target: targets::STORE, operation, revision, "Ledger mutated");

        Ok(value)
    }
}

/// Writes `data` next to `path` and renames it into place, so readers never
/// see a partially written ledger.
async fn save_ledger(path: &Path, data: &LedgerData) -> Result<(), Error> {
    let contents = to_string_pretty(data, PrettyConfig::new()).map_err(|source| Error::Ron {
        action: StorageAction::Save,
        path: Some(path.display().to_string()),
        source,
    })?;

    let staging = staging_path(path);
    let written = match tokio::fs::write(&staging, contents).await {
        Ok(()) => tokio::fs::rename(&staging, path).await,
        Err(source) => Err(source),
    };

    if let Err(source) = written {
        let _ = tokio::fs::remove_file(&staging).await;
        error!(
            target: targets::STORE,
            path = %path.display(),
            error = %source,
            "Ledger save failed"
        );
        return Err(Error::StorageIo {
            action: StorageAction::Save,
            path: Some(path.display().to_string()),
            source,
        });
    }

    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("ledger"));
    name.push(".tmp");
    path.with_file_name(name)
}

impl LedgerStore for FileLedgerStore {
    fn subcategories<'a>(&'a self, category: CostCategory) -> StoreFuture<'a, Vec<String>> {
        Box::pin(async move { Ok(self.read(|data| data.subcategories(category))) })
    }

    fn cost_view<'a>(
        &'a self,
        category: CostCategory,
        subcategory: String,
    ) -> StoreFuture<'a, CostView> {
        Box::pin(async move { self.read(|data| data.cost_view(category, &subcategory)) })
    }

    fn insert_transaction<'a>(
        &'a self,
        category: CostCategory,
        subcategory: String,
        draft: TransactionDraft,
    ) -> StoreFuture<'a, Transaction> {
        Box::pin(async move {
            let created_at = now_epoch_seconds();
            self.mutate("insert_transaction", move |data| {
                data.insert_transaction(category, &subcategory, draft, created_at)
            })
            .await
        })
    }

    fn travel_view<'a>(&'a self, year: Option<i32>) -> StoreFuture<'a, TravelView> {
        Box::pin(async move { Ok(self.read(|data| data.travel_view(year))) })
    }

    fn insert_travel_cost<'a>(&'a self, draft: TravelCostDraft) -> StoreFuture<'a, TravelCost> {
        Box::pin(async move {
            let created_at = now_epoch_seconds();
            self.mutate("insert_travel_cost", move |data| {
                data.insert_travel_cost(draft, created_at)
            })
            .await
        })
    }

    fn update_travel_cost<'a>(
        &'a self,
        id: RecordId,
        draft: TravelCostDraft,
    ) -> StoreFuture<'a, TravelCost> {
        Box::pin(async move {
            self.mutate("update_travel_cost", move |data| {
                data.update_travel_cost(id, draft)
            })
            .await
        })
    }

    fn delete_travel_cost<'a>(&'a self, id: RecordId) -> StoreFuture<'a, TravelCost> {
        Box::pin(async move {
            self.mutate("delete_travel_cost", move |data| data.delete_travel_cost(id))
                .await
        })
    }

    fn set_travel_budget<'a>(
        &'a self,
        year: i32,
        allocated: Cents,
    ) -> StoreFuture<'a, TravelBudget> {
        Box::pin(async move {
            self.mutate("set_travel_budget", move |data| {
                data.set_travel_budget(year, allocated)
            })
            .await
        })
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

pub fn now_epoch_seconds() -> EpochSeconds {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;

    fn run_future<T>(future: impl std::future::Future<Output = T>) -> T {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("tokio runtime");
        runtime.block_on(future)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn meeting(name: &str, day: u32, cost: Cents) -> TransactionDraft {
        TransactionDraft {
            activity_date: Some(date(2024, 6, day)),
            activity_name: name.to_string(),
            headcount: 8,
            cost,
        }
    }

    fn trip(name: &str, year: i32, realization: Cents) -> TravelCostDraft {
        TravelCostDraft {
            audit_name: name.to_string(),
            requester: "Budi".to_string(),
            audit_type: "Kepatuhan".to_string(),
            spd_number: format!("SPD-{name}"),
            bpd_number: format!("BPD-{name}"),
            period_start: Some(date(year, 2, 5)),
            period_end: Some(date(year, 2, 7)),
            audit_days: None,
            departure_cost: 1_000_000,
            lodging_cost: 2_000_000,
            return_cost: 1_000_000,
            duty_detail: 500_000,
            realization,
        }
    }

    #[test]
    fn cost_view_orders_transactions_by_date() {
        let store = FileLedgerStore::in_memory(LedgerData::seeded(2024));
        run_future(async {
            let drafts = [
                ("Awal", 3, 1_000_000),
                ("Akhir", 20, 2_000_000),
                ("Tengah", 10, 500_000),
            ];
            for (name, day, cost) in drafts {
                store
                    .insert_transaction(
                        CostCategory::Meeting,
                        "Rapat Direksi".to_string(),
                        meeting(name, day, cost),
                    )
                    .await
                    .expect("insert");
            }

            let view = store
                .cost_view(CostCategory::Meeting, "Rapat Direksi".to_string())
                .await
                .expect("cost view");
            let names: Vec<&str> = view
                .transactions
                .iter()
                .map(|transaction| transaction.activity_name.as_str())
                .collect();
            assert_eq!(names, vec!["Akhir", "Tengah", "Awal"]);
            assert_eq!(view.summary.total_usage, 3_500_000);
            assert_eq!(view.summary.transaction_count, 3);
            assert_eq!(
                view.summary.final_amount,
                view.summary.initial_amount - 3_500_000
            );
        });
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn unknown_subcategory_is_reported() {
        let store = FileLedgerStore::in_memory(LedgerData::seeded(2024));
        let error = run_future(store.cost_view(CostCategory::Guest, "Tidak Ada".to_string()))
            .expect_err("missing master");
        assert!(matches!(error, Error::MasterNotFound { .. }));

        let error = run_future(store.insert_transaction(
            CostCategory::Guest,
            "Tidak Ada".to_string(),
            meeting("Jamuan", 1, 100),
        ))
        .expect_err("missing master");
        assert!(matches!(error, Error::MasterNotFound { .. }));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn invalid_draft_does_not_mutate() {
        let store = FileLedgerStore::in_memory(LedgerData::seeded(2024));
        let error = run_future(store.insert_transaction(
            CostCategory::Meeting,
            "Rapat Direksi".to_string(),
            meeting("Tanpa Biaya", 1, 0),
        ))
        .expect_err("zero cost");
        assert!(matches!(error, Error::Validation { field: "cost", .. }));
        assert!(store.snapshot().transactions.is_empty());
    }

    #[test]
    fn subcategories_are_unique_and_sorted() {
        let mut data = LedgerData::seeded(2024);
        data.masters.push(CostMaster {
            id: MasterId(99),
            category: CostCategory::Meeting,
            subcategory: "Rapat Direksi".to_string(),
            initial_amount: 0,
        });
        let store = FileLedgerStore::in_memory(data);
        let names = run_future(store.subcategories(CostCategory::Meeting)).expect("names");
        assert_eq!(names, vec!["Rapat Direksi", "Rapat Koordinasi"]);
    }

    #[test]
    fn travel_mutations_reconcile_the_year_budget() {
        let store = FileLedgerStore::in_memory(LedgerData::seeded(2024));
        run_future(async {
            let first = store
                .insert_travel_cost(trip("Medan", 2024, 4_000_000))
                .await
                .expect("insert");
            store
                .insert_travel_cost(trip("Bali", 2024, 3_000_000))
                .await
                .expect("insert");

            let view = store.travel_view(Some(2024)).await.expect("view");
            let budget = view.budget.expect("budget");
            assert_eq!(budget.realized, 7_000_000);
            assert_eq!(view.records.len(), 2);
            assert_eq!(view.records[0].audit_name, "Bali");
            assert_eq!(view.top.len(), 2);

            store
                .update_travel_cost(first.id, trip("Medan", 2024, 1_000_000))
                .await
                .expect("update");
            let budget = store
                .travel_view(Some(2024))
                .await
                .expect("view")
                .budget
                .expect("budget");
            assert_eq!(budget.realized, 4_000_000);

            store.delete_travel_cost(first.id).await.expect("delete");
            let view = store.travel_view(Some(2024)).await.expect("view");
            assert_eq!(view.budget.expect("budget").realized, 3_000_000);
            assert_eq!(view.records.len(), 1);

            let error = store
                .delete_travel_cost(first.id)
                .await
                .expect_err("already deleted");
            assert!(matches!(error, Error::RecordNotFound { .. }));
        });
    }

    #[test]
    fn travel_view_scopes_records_to_year() {
        let store = FileLedgerStore::in_memory(LedgerData::seeded(2024));
        run_future(async {
            store
                .insert_travel_cost(trip("Medan", 2023, 1_000_000))
                .await
                .expect("insert");
            store
                .insert_travel_cost(trip("Bali", 2024, 1_000_000))
                .await
                .expect("insert");
            store
                .set_travel_budget(2025, 80_000_000)
                .await
                .expect("budget");

            let all = store.travel_view(None).await.expect("view");
            assert_eq!(all.records.len(), 2);
            assert_eq!(all.years, vec![2025, 2024, 2023]);
            assert!(all.budget.is_none());

            let scoped = store.travel_view(Some(2023)).await.expect("view");
            assert_eq!(scoped.records.len(), 1);
            assert_eq!(scoped.records[0].audit_name, "Medan");
            let budget = scoped.budget.expect("budget created on demand");
            assert_eq!(budget.allocated, 0);
            assert_eq!(budget.realized, 1_000_000);
        });
    }

    #[test]
    fn negative_budget_is_rejected() {
        let store = FileLedgerStore::in_memory(LedgerData::default());
        let error = run_future(store.set_travel_budget(2024, -1)).expect_err("negative");
        assert!(matches!(error, Error::InvalidArgument { .. }));
    }

    #[test]
    fn ids_skip_past_existing_records() {
        let mut data = LedgerData::seeded(2024);
        data.next_id = 0;
        assert_eq!(data.allocate_id(), 9);
        assert_eq!(data.allocate_id(), 10);
    }

    #[test]
    fn file_store_persists_and_reloads() {
        let path = std::env::temp_dir().join(format!(
            "dspi-ledger-{}-{}.ron",
            std::process::id(),
            now_epoch_seconds()
        ));

        run_future(async {
            let store = FileLedgerStore::open(&path, 2024).await.expect("open");
            assert_eq!(store.snapshot().masters.len(), 8);
            store
                .insert_transaction(
                    CostCategory::Audit,
                    "Audit Internal".to_string(),
                    meeting("Audit Gudang", 12, 750_000),
                )
                .await
                .expect("insert");

            let reopened = FileLedgerStore::open(&path, 2024).await.expect("reopen");
            let view = reopened
                .cost_view(CostCategory::Audit, "Audit Internal".to_string())
                .await
                .expect("view");
            assert_eq!(view.transactions.len(), 1);
            assert_eq!(view.transactions[0].activity_name, "Audit Gudang");
        });

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "dspi-ledger-bad-{}-{}.ron",
            std::process::id(),
            now_epoch_seconds()
        ));
        std::fs::write(&path, "(masters: [").expect("write fixture");

        let error = run_future(FileLedgerStore::open(&path, 2024)).expect_err("bad RON");
        assert!(matches!(
            error,
            Error::RonParse {
                action: StorageAction::Load,
                ..
            }
        ));

        let _ = std::fs::remove_file(&path);
    }

    fn scratch_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "dspi-ledger-{label}-{}-{}.ron",
            std::process::id(),
            now_epoch_seconds()
        ))
    }

    #[test]
    fn concurrent_mutations_are_all_persisted() {
        let path = scratch_path("concurrent");
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(8)
            .build()
            .expect("tokio runtime");

        runtime.block_on(async {
            let store = Arc::new(FileLedgerStore::open(&path, 2024).await.expect("open"));
            let tasks: Vec<_> = (0..32)
                .map(|index| {
                    let store = Arc::clone(&store);
                    tokio::spawn(async move {
                        store
                            .insert_travel_cost(trip(&format!("Audit {index}"), 2024, 1_000))
                            .await
                    })
                })
                .collect();
            for task in tasks {
                task.await.expect("task").expect("insert");
            }
            assert_eq!(store.revision(), 32);

            let reopened = FileLedgerStore::open(&path, 2024).await.expect("reopen");
            let view = reopened.travel_view(Some(2024)).await.expect("view");
            assert_eq!(view.records.len(), 32);
            assert_eq!(view.budget.expect("budget").realized, 32_000);
        });

        assert!(!staging_path(&path).exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn failed_save_leaves_the_ledger_untouched() {
        let path = std::env::temp_dir()
            .join(format!("dspi-missing-{}", std::process::id()))
            .join("ledger.ron");

        run_future(async {
            let store = FileLedgerStore::open(&path, 2024).await.expect("seeded");
            let before = store.snapshot();

            let error = store
                .insert_travel_cost(trip("Medan", 2024, 10))
                .await
                .expect_err("directory is missing");
            assert!(matches!(
                error,
                Error::StorageIo {
                    action: StorageAction::Save,
                    ..
                }
            ));
            assert_eq!(store.snapshot(), before);
            assert_eq!(store.revision(), 0);
        });
    }

    #[test]
    fn budgets_loaded_out_of_order_are_normalized() {
        let path = scratch_path("unsorted");
        let mut data = LedgerData::seeded(2025);
        data.travel_budgets = vec![
            TravelBudget::new(2025, 100),
            TravelBudget::new(2023, 50),
            TravelBudget {
                year: 2025,
                allocated: 0,
                realized: 7,
            },
        ];
        let contents = to_string_pretty(&data, PrettyConfig::new()).expect("serialize fixture");
        std::fs::write(&path, contents).expect("write fixture");

        run_future(async {
            let store = FileLedgerStore::open(&path, 2025).await.expect("open");
            let years: Vec<i32> = store
                .snapshot()
                .travel_budgets
                .iter()
                .map(|budget| budget.year)
                .collect();
            assert_eq!(years, vec![2023, 2025]);

            store
                .insert_travel_cost(trip("Medan", 2025, 40))
                .await
                .expect("insert");
            let budget = store
                .travel_view(Some(2025))
                .await
                .expect("view")
                .budget
                .expect("budget");
            assert_eq!(budget.allocated, 100);
            assert_eq!(budget.realized, 47);
            assert_eq!(store.snapshot().travel_budgets.len(), 2);
        });

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn overflowing_realization_is_rejected_without_mutating() {
        let mut data = LedgerData::seeded(2024);
        data.travel_budgets[0].realized = i64::MAX - 10;
        let store = FileLedgerStore::in_memory(data);

        let error = run_future(store.insert_travel_cost(trip("Medan", 2024, 1_000)))
            .expect_err("realization overflows");
        assert!(matches!(
            error,
            Error::InvalidArgument {
                operation: "reconcile",
                ..
            }
        ));
        assert!(store.snapshot().travel_costs.is_empty());
        assert_eq!(store.revision(), 0);
    }
}
