use std::fmt;
use std::sync::Arc;

use dspi_core::{
    targets, CostCategory, CostSummary, CostView, Error, FileLedgerStore, PageSize,
    PaginatedListView, RecordId, SearchTerm, Transaction, TransactionDraft, TravelBudget,
    TravelCost, TravelCostDraft, TravelView,
};

use crate::app::helpers::{
    format_amount_input, format_date_input, parse_amount_input, parse_count_input,
    parse_date_input,
};
use crate::logging::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Cost(CostCategory),
    Travel,
    Debug,
}

#[derive(Debug, Clone)]
pub enum Message {
    LogTick,
    LogLevelChanged(LogLevel),
    ToggleTarget(String, bool),
    CopyDiagnostics,
    SelectTab(Tab),
    StoreOpened(Result<Arc<FileLedgerStore>, StoreErrorInfo>),
    SubcategoriesLoaded(CostCategory, Result<Vec<String>, StoreErrorInfo>),
    SubcategorySelected(CostCategory, String),
    CostViewLoaded {
        category: CostCategory,
        subcategory: String,
        result: Result<CostView, StoreErrorInfo>,
    },
    CostSearchChanged(CostCategory, String),
    CostDateFromChanged(CostCategory, String),
    CostDateToChanged(CostCategory, String),
    CostPageSizeChanged(CostCategory, PageSize),
    CostPageSelected(CostCategory, usize),
    ToggleTransactionForm(CostCategory),
    TransactionFormChanged(CostCategory, TransactionField, String),
    SubmitTransaction(CostCategory),
    TransactionSaved(CostCategory, Result<Transaction, StoreErrorInfo>),
    TravelViewLoaded(Result<TravelView, StoreErrorInfo>),
    TravelYearSelected(YearChoice),
    TravelSearchChanged(String),
    TravelPageSizeChanged(PageSize),
    TravelPageSelected(usize),
    SelectTravelRecord(RecordId),
    OpenTravelForm,
    EditSelectedTravel,
    CloseTravelForm,
    TravelFormChanged(TravelField, String),
    SubmitTravelForm,
    TravelSaved(Result<TravelCost, StoreErrorInfo>),
    DeleteSelectedTravel,
    TravelDeleted(Result<TravelCost, StoreErrorInfo>),
    BudgetInputChanged(String),
    SaveBudget,
    BudgetSaved(Result<TravelBudget, StoreErrorInfo>),
}

/// Error rendering that can travel inside a [`Message`].
#[derive(Debug, Clone)]
pub struct StoreErrorInfo {
    pub(crate) summary: String,
    pub(crate) detail: String,
}

impl From<Error> for StoreErrorInfo {
    fn from(error: Error) -> Self {
        Self {
            summary: error.user_summary(),
            detail: error.technical_detail(),
        }
    }
}

impl StoreErrorInfo {
    pub(crate) fn status_line(&self) -> String {
        format!("{} ({})", self.summary, self.detail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearChoice {
    All,
    Year(i32),
}

impl YearChoice {
    pub(crate) fn as_filter(self) -> Option<i32> {
        match self {
            YearChoice::All => None,
            YearChoice::Year(year) => Some(year),
        }
    }
}

impl fmt::Display for YearChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearChoice::All => f.write_str("All years"),
            YearChoice::Year(year) => write!(f, "{year}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionField {
    Date,
    Name,
    Headcount,
    Cost,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionForm {
    pub(crate) date: String,
    pub(crate) name: String,
    pub(crate) headcount: String,
    pub(crate) cost: String,
}

impl TransactionForm {
    pub(crate) fn set(&mut self, field: TransactionField, value: String) {
        match field {
            TransactionField::Date => self.date = value,
            TransactionField::Name => self.name = value,
            TransactionField::Headcount => self.headcount = value,
            TransactionField::Cost => self.cost = value,
        }
    }

    /// Parses the raw inputs. Field rules beyond parsing are checked by
    /// [`TransactionDraft::validate`].
    pub(crate) fn draft(&self) -> Result<TransactionDraft, String> {
        let activity_date = parse_date_input(&self.date)
            .map_err(|_| "Activity date must be YYYY-MM-DD.".to_string())?;
        let headcount = parse_count_input(&self.headcount)
            .map_err(|_| "Headcount must be a whole number.".to_string())?
            .unwrap_or(0);
        let cost = parse_amount_input(&self.cost)
            .map_err(|_| "Cost must be a number.".to_string())?
            .unwrap_or(0);

        Ok(TransactionDraft {
            activity_date,
            activity_name: self.name.trim().to_string(),
            headcount,
            cost,
        })
    }
}

/// Per-category state for one cost tab.
pub(crate) struct CostPanel {
    pub(crate) category: CostCategory,
    pub(crate) subcategories: Vec<String>,
    pub(crate) selected: Option<String>,
    pub(crate) summary: Option<CostSummary>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) list: PaginatedListView<Transaction>,
    pub(crate) search: SearchTerm,
    pub(crate) date_from: String,
    pub(crate) date_to: String,
    pub(crate) form_visible: bool,
    pub(crate) form: TransactionForm,
    pub(crate) status: Option<String>,
}

impl CostPanel {
    pub(crate) fn new(category: CostCategory, page_size: PageSize) -> Self {
        let search = SearchTerm::new();
        let mut list =
            PaginatedListView::with_filter(Vec::new(), search.predicate::<Transaction>())
                .with_page_size(page_size);
        let key = category.module_key();
        list.set_render_callback(move |page: &[Transaction]| {
            tracing::trace!(
                target: targets::UI,
                module = key,
                rows = page.len(),
                "Transaction page rendered"
            );
        });

        Self {
            category,
            subcategories: Vec::new(),
            selected: None,
            summary: None,
            transactions: Vec::new(),
            list,
            search,
            date_from: String::new(),
            date_to: String::new(),
            form_visible: false,
            form: TransactionForm::default(),
            status: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelField {
    AuditName,
    Requester,
    AuditType,
    SpdNumber,
    BpdNumber,
    PeriodStart,
    PeriodEnd,
    AuditDays,
    DepartureCost,
    LodgingCost,
    ReturnCost,
    DutyDetail,
    Realization,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TravelForm {
    pub(crate) audit_name: String,
    pub(crate) requester: String,
    pub(crate) audit_type: String,
    pub(crate) spd_number: String,
    pub(crate) bpd_number: String,
    pub(crate) period_start: String,
    pub(crate) period_end: String,
    pub(crate) audit_days: String,
    pub(crate) departure_cost: String,
    pub(crate) lodging_cost: String,
    pub(crate) return_cost: String,
    pub(crate) duty_detail: String,
    pub(crate) realization: String,
}

impl TravelForm {
    pub(crate) fn from_record(record: &TravelCost) -> Self {
        Self {
            audit_name: record.audit_name.clone(),
            requester: record.requester.clone(),
            audit_type: record.audit_type.clone(),
            spd_number: record.spd_number.clone(),
            bpd_number: record.bpd_number.clone(),
            period_start: format_date_input(record.period_start),
            period_end: format_date_input(record.period_end),
            audit_days: record.audit_days.to_string(),
            departure_cost: format_amount_input(record.departure_cost),
            lodging_cost: format_amount_input(record.lodging_cost),
            return_cost: format_amount_input(record.return_cost),
            duty_detail: format_amount_input(record.duty_detail),
            realization: format_amount_input(record.realization),
        }
    }

    pub(crate) fn value(&self, field: TravelField) -> &str {
        match field {
            TravelField::AuditName => &self.audit_name,
            TravelField::Requester => &self.requester,
            TravelField::AuditType => &self.audit_type,
            TravelField::SpdNumber => &self.spd_number,
            TravelField::BpdNumber => &self.bpd_number,
            TravelField::PeriodStart => &self.period_start,
            TravelField::PeriodEnd => &self.period_end,
            TravelField::AuditDays => &self.audit_days,
            TravelField::DepartureCost => &self.departure_cost,
            TravelField::LodgingCost => &self.lodging_cost,
            TravelField::ReturnCost => &self.return_cost,
            TravelField::DutyDetail => &self.duty_detail,
            TravelField::Realization => &self.realization,
        }
    }

    /// Stores the input. Changing either period date recomputes the audit
    /// day count when both dates parse.
    pub(crate) fn set(&mut self, field: TravelField, value: String) {
        let slot = match field {
            TravelField::AuditName => &mut self.audit_name,
            TravelField::Requester => &mut self.requester,
            TravelField::AuditType => &mut self.audit_type,
            TravelField::SpdNumber => &mut self.spd_number,
            TravelField::BpdNumber => &mut self.bpd_number,
            TravelField::PeriodStart => &mut self.period_start,
            TravelField::PeriodEnd => &mut self.period_end,
            TravelField::AuditDays => &mut self.audit_days,
            TravelField::DepartureCost => &mut self.departure_cost,
            TravelField::LodgingCost => &mut self.lodging_cost,
            TravelField::ReturnCost => &mut self.return_cost,
            TravelField::DutyDetail => &mut self.duty_detail,
            TravelField::Realization => &mut self.realization,
        };
        *slot = value;

        if matches!(field, TravelField::PeriodStart | TravelField::PeriodEnd) {
            if let Some(days) = self.preview().derived_audit_days() {
                self.audit_days = days.to_string();
            }
        }
    }

    pub(crate) fn draft(&self) -> Result<TravelCostDraft, String> {
        let date = |label: &str, value: &str| {
            parse_date_input(value).map_err(|_| format!("{label} must be YYYY-MM-DD."))
        };
        let amount = |label: &str, value: &str| {
            parse_amount_input(value)
                .map(|parsed| parsed.unwrap_or(0))
                .map_err(|_| format!("{label} must be a number."))
        };

        Ok(TravelCostDraft {
            audit_name: self.audit_name.trim().to_string(),
            requester: self.requester.trim().to_string(),
            audit_type: self.audit_type.trim().to_string(),
            spd_number: self.spd_number.trim().to_string(),
            bpd_number: self.bpd_number.trim().to_string(),
            period_start: date("Period start", &self.period_start)?,
            period_end: date("Period end", &self.period_end)?,
            audit_days: parse_count_input(&self.audit_days)
                .map_err(|_| "Audit days must be a whole number.".to_string())?,
            departure_cost: amount("Departure cost", &self.departure_cost)?,
            lodging_cost: amount("Lodging cost", &self.lodging_cost)?,
            return_cost: amount("Return cost", &self.return_cost)?,
            duty_detail: amount("Duty detail", &self.duty_detail)?,
            realization: amount("Realization", &self.realization)?,
        })
    }

    /// Lenient parse for the live totals: unparseable inputs count as empty.
    pub(crate) fn preview(&self) -> TravelCostDraft {
        let amount = |value: &str| parse_amount_input(value).ok().flatten().unwrap_or(0);
        TravelCostDraft {
            period_start: parse_date_input(&self.period_start).ok().flatten(),
            period_end: parse_date_input(&self.period_end).ok().flatten(),
            audit_days: parse_count_input(&self.audit_days).ok().flatten(),
            departure_cost: amount(&self.departure_cost),
            lodging_cost: amount(&self.lodging_cost),
            return_cost: amount(&self.return_cost),
            duty_detail: amount(&self.duty_detail),
            realization: amount(&self.realization),
            ..TravelCostDraft::default()
        }
    }
}

pub(crate) struct TravelPanel {
    pub(crate) year: YearChoice,
    pub(crate) years: Vec<YearChoice>,
    pub(crate) view: Option<TravelView>,
    pub(crate) list: PaginatedListView<TravelCost>,
    pub(crate) search: SearchTerm,
    pub(crate) selected: Option<RecordId>,
    pub(crate) form: Option<TravelForm>,
    pub(crate) editing: Option<RecordId>,
    pub(crate) budget_input: String,
    /// Year whose allocation last prefilled `budget_input`.
    pub(crate) budget_input_year: Option<YearChoice>,
    pub(crate) status: Option<String>,
}

impl TravelPanel {
    pub(crate) fn new(page_size: PageSize) -> Self {
        let search = SearchTerm::new();
        let mut list =
            PaginatedListView::with_filter(Vec::new(), search.predicate::<TravelCost>())
                .with_page_size(page_size);
        list.set_render_callback(|page: &[TravelCost]| {
            tracing::trace!(target: targets::UI, rows = page.len(), "BPD page rendered");
        });

        Self {
            year: YearChoice::All,
            years: vec![YearChoice::All],
            view: None,
            list,
            search,
            selected: None,
            form: None,
            editing: None,
            budget_input: String::new(),
            budget_input_year: None,
            status: None,
        }
    }

    /// Prefills the budget editor when the shown year changes. Refreshes of
    /// the same year keep whatever the user is typing.
    pub(crate) fn sync_budget_input(&mut self, budget: Option<TravelBudget>) {
        if self.budget_input_year == Some(self.year) {
            return;
        }
        self.budget_input = budget
            .map(|budget| format_amount_input(budget.allocated))
            .unwrap_or_default();
        self.budget_input_year = Some(self.year);
    }

    pub(crate) fn selected_record(&self) -> Option<&TravelCost> {
        let id = self.selected?;
        self.list.records().iter().find(|record| record.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn transaction_form_parses_inputs() {
        let mut form = TransactionForm::default();
        form.set(TransactionField::Date, "2024-08-17".to_string());
        form.set(TransactionField::Name, "  Rapat koordinasi ".to_string());
        form.set(TransactionField::Headcount, "12".to_string());
        form.set(TransactionField::Cost, "1.250.000".to_string());

        let draft = form.draft().expect("draft");
        assert_eq!(draft.activity_date, Some(date(2024, 8, 17)));
        assert_eq!(draft.activity_name, "Rapat koordinasi");
        assert_eq!(draft.headcount, 12);
        assert_eq!(draft.cost, 125_000_000);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn transaction_form_rejects_bad_date() {
        let mut form = TransactionForm::default();
        form.set(TransactionField::Date, "17/08/2024".to_string());
        assert!(form.draft().is_err());
    }

    #[test]
    fn travel_form_recomputes_audit_days() {
        let mut form = TravelForm::default();
        form.set(TravelField::PeriodStart, "2024-03-01".to_string());
        assert_eq!(form.audit_days, "");
        form.set(TravelField::PeriodEnd, "2024-03-05".to_string());
        assert_eq!(form.audit_days, "5");

        form.set(TravelField::AuditDays, "3".to_string());
        assert_eq!(form.draft().expect("draft").audit_days, Some(3));
    }

    #[test]
    fn travel_form_preview_ignores_unparseable_amounts() {
        let mut form = TravelForm::default();
        form.set(TravelField::DepartureCost, "500000".to_string());
        form.set(TravelField::LodgingCost, "abc".to_string());
        form.set(TravelField::ReturnCost, "250000".to_string());
        form.set(TravelField::DutyDetail, "100000".to_string());

        let preview = form.preview();
        assert_eq!(preview.accommodation_total(), Some(75_000_000));
        assert_eq!(preview.accommodation_duty_total(), Some(85_000_000));
        assert!(form.draft().is_err());
    }

    #[test]
    fn budget_input_survives_same_year_refresh() {
        let mut panel = TravelPanel::new(PageSize::default());
        panel.year = YearChoice::Year(2024);
        panel.sync_budget_input(Some(TravelBudget::new(2024, 50_000_000)));
        assert_eq!(panel.budget_input, "500000");

        panel.budget_input = "750000".to_string();
        panel.sync_budget_input(Some(TravelBudget::new(2024, 50_000_000)));
        assert_eq!(panel.budget_input, "750000");

        panel.year = YearChoice::Year(2025);
        panel.sync_budget_input(None);
        assert_eq!(panel.budget_input, "");

        panel.budget_input_year = None;
        panel.sync_budget_input(Some(TravelBudget::new(2025, 10_000)));
        assert_eq!(panel.budget_input, "100");
    }

    #[test]
    fn year_choice_display() {
        assert_eq!(YearChoice::All.to_string(), "All years");
        assert_eq!(YearChoice::Year(2024).to_string(), "2024");
        assert_eq!(YearChoice::Year(2024).as_filter(), Some(2024));
        assert_eq!(YearChoice::All.as_filter(), None);
    }
}
