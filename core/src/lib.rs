pub mod config;
pub mod error;
pub mod format;
pub mod ledger;
pub mod model;
pub mod pagination;
pub mod search;
pub mod store;
pub mod targets;

pub use config::DashboardConfig;
pub use error::{Error, StorageAction};
pub use format::{format_currency, format_date};
pub use ledger::{
    aggregate_by_audit, audit_days, bottom_costs, reconcile, summarize, top_costs, BudgetChange,
    TransactionDraft, TravelCostDraft,
};
pub use model::{
    AuditTotal, Cents, CostCategory, CostMaster, CostSummary, EpochSeconds, MasterId, RecordId,
    Transaction, TravelBudget, TravelCost, MAX_AMOUNT,
};
pub use pagination::{
    navigation_items, FilterPredicate, NavItem, PageSize, PageSummary, PaginatedListView,
    RenderCallback, NAVIGATION_WINDOW,
};
pub use search::{filter_by_date_range, SearchTerm, Searchable};
pub use store::{
    now_epoch_seconds, CostView, FileLedgerStore, LedgerData, LedgerStore, StoreFuture,
    TravelView,
};
