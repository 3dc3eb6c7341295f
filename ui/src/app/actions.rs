use std::sync::Arc;

use iced::Command;

use dspi_core::{
    filter_by_date_range, format_currency, targets, CostCategory, CostView, FileLedgerStore,
    LedgerStore, Transaction, TravelBudget, TravelCost, TravelView,
};

use crate::app::helpers::{parse_amount_input, parse_date_input};
use crate::app::types::{Message, StoreErrorInfo, Tab, TravelForm, YearChoice};
use crate::app::DspiApp;
use crate::logging::{apply_log_level, LogEntry, LogLevel};

const DIAGNOSTIC_LOG_LINES: usize = 50;

impl DspiApp {
    pub(super) fn refresh_logs(&mut self) {
        let entries = self.log_store.snapshot();
        for entry in &entries {
            if self.known_targets.insert(entry.target.clone()) {
                self.enabled_targets.insert(entry.target.clone());
            }
        }
        self.log_entries = entries;
    }

    pub(super) fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
        apply_log_level(&self.reload_handle, level);
        tracing::info!(target: targets::UI, "Log level set to {}", level);
    }

    pub(super) fn sorted_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.known_targets.iter().cloned().collect();
        targets.sort();
        targets
    }

    pub(super) fn visible_entries(&self) -> Vec<&LogEntry> {
        self.log_entries
            .iter()
            .filter(|entry| self.enabled_targets.contains(&entry.target))
            .collect()
    }

    pub(super) fn copy_diagnostics(&self) -> String {
        let text = self.diagnostics_text();
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => {
                tracing::info!(target: targets::UI, "Diagnostics copied to clipboard");
                "Copied".to_string()
            }
            Err(error) => {
                tracing::warn!(target: targets::UI, "Clipboard copy failed: {}", error);
                format!("Failed: {error}")
            }
        }
    }

    pub(super) fn diagnostics_text(&self) -> String {
        let mut output = String::new();
        output.push_str("DSPI dashboard diagnostics\n");
        output.push_str(&format!("Log level: {}\n", self.log_level));
        output.push_str(&format!(
            "Data file: {}\n",
            self.config.data_path.display()
        ));
        output.push_str(&format!(
            "Store: {}\n",
            self.store_status.as_deref().unwrap_or("ready")
        ));
        output.push_str(&format!("Store revision: {}\n", self.seen_revision));
        output.push_str(&format!(
            "Targets enabled: {}\n",
            self.sorted_targets()
                .into_iter()
                .filter(|target| self.enabled_targets.contains(target))
                .collect::<Vec<String>>()
                .join(", ")
        ));
        for category in CostCategory::ALL {
            if let Some(panel) = self.cost_panels.get(&category) {
                output.push_str(&format!(
                    "{}: subcategory {} | {} | page {}/{}\n",
                    category.label(),
                    panel.selected.as_deref().unwrap_or("-"),
                    panel.list.summary(),
                    panel.list.current_page(),
                    panel.list.total_pages()
                ));
            }
        }
        output.push_str(&format!(
            "BPD ({}): {} | page {}/{}\n",
            self.travel.year,
            self.travel.list.summary(),
            self.travel.list.current_page(),
            self.travel.list.total_pages()
        ));
        output.push_str("Recent logs:\n");

        let entries = self.visible_entries();
        let start = entries.len().saturating_sub(DIAGNOSTIC_LOG_LINES);
        for entry in entries.into_iter().skip(start) {
            output.push_str(&entry.format_line());
            output.push('\n');
        }

        output
    }

    pub(super) fn handle_store_opened(
        &mut self,
        result: Result<Arc<FileLedgerStore>, StoreErrorInfo>,
    ) -> Command<Message> {
        match result {
            Ok(store) => {
                let location = store
                    .path()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "memory".to_string());
                tracing::info!(
                    target: targets::STORE,
                    path = %location,
                    "Ledger opened"
                );
                self.seen_revision = store.revision();
                self.store_status = Some(format!("Ledger: {location}"));
                self.store = Some(store);
                self.load_active_tab()
            }
            Err(error) => {
                tracing::error!(
                    target: targets::STORE,
                    detail = %error.detail,
                    "Ledger open failed"
                );
                self.store_status = Some(format!("Ledger unavailable: {}", error.status_line()));
                Command::none()
            }
        }
    }

    pub(super) fn load_active_tab(&mut self) -> Command<Message> {
        match self.active_tab {
            Tab::Cost(category) => self.load_subcategories(category),
            Tab::Travel => self.load_travel_view(),
            Tab::Debug => Command::none(),
        }
    }

    /// Re-fetches the visible tab when another writer bumped the store
    /// revision since the last fetch.
    pub(super) fn refresh_if_stale(&mut self) -> Command<Message> {
        let Some(store) = self.store.as_ref() else {
            return Command::none();
        };
        let revision = store.revision();
        if revision == self.seen_revision {
            return Command::none();
        }
        tracing::debug!(
            target: targets::UI,
            from = self.seen_revision,
            to = revision,
            "Ledger changed, refreshing view"
        );
        self.seen_revision = revision;
        self.load_active_tab()
    }

    fn mark_revision_seen(&mut self) {
        if let Some(store) = self.store.as_ref() {
            self.seen_revision = store.revision();
        }
    }

    fn store_handle(&self) -> Option<Arc<dyn LedgerStore>> {
        self.store.clone()
    }

    pub(super) fn load_subcategories(&mut self, category: CostCategory) -> Command<Message> {
        let Some(store) = self.store_handle() else {
            return Command::none();
        };
        Command::perform(
            async move { store.subcategories(category).await },
            move |result| {
                Message::SubcategoriesLoaded(category, result.map_err(StoreErrorInfo::from))
            },
        )
    }

    pub(super) fn handle_subcategories_loaded(
        &mut self,
        category: CostCategory,
        result: Result<Vec<String>, StoreErrorInfo>,
    ) -> Command<Message> {
        let Some(panel) = self.cost_panels.get_mut(&category) else {
            return Command::none();
        };
        match result {
            Ok(subcategories) => {
                let keep = panel
                    .selected
                    .as_ref()
                    .filter(|selected| subcategories.contains(selected))
                    .cloned();
                panel.selected = keep.or_else(|| subcategories.first().cloned());
                panel.subcategories = subcategories;
                self.load_cost_view(category)
            }
            Err(error) => {
                panel.status = Some(error.status_line());
                Command::none()
            }
        }
    }

    pub(super) fn select_subcategory(
        &mut self,
        category: CostCategory,
        subcategory: String,
    ) -> Command<Message> {
        if let Some(panel) = self.cost_panels.get_mut(&category) {
            tracing::debug!(
                target: targets::UI,
                module = category.module_key(),
                subcategory = %subcategory,
                "Subcategory selected"
            );
            panel.selected = Some(subcategory);
            panel.status = None;
        }
        self.load_cost_view(category)
    }

    fn load_cost_view(&self, category: CostCategory) -> Command<Message> {
        let Some(store) = self.store_handle() else {
            return Command::none();
        };
        let Some(subcategory) = self
            .cost_panels
            .get(&category)
            .and_then(|panel| panel.selected.clone())
        else {
            return Command::none();
        };
        let requested = subcategory.clone();
        Command::perform(
            async move { store.cost_view(category, requested).await },
            move |result| Message::CostViewLoaded {
                category,
                subcategory,
                result: result.map_err(StoreErrorInfo::from),
            },
        )
    }

    pub(super) fn handle_cost_view_loaded(
        &mut self,
        category: CostCategory,
        subcategory: String,
        result: Result<CostView, StoreErrorInfo>,
    ) {
        let Some(panel) = self.cost_panels.get_mut(&category) else {
            return;
        };
        if panel.selected.as_deref() != Some(subcategory.as_str()) {
            tracing::debug!(
                target: targets::UI,
                subcategory = %subcategory,
                "Dropping stale cost view"
            );
            return;
        }
        match result {
            Ok(view) => {
                panel.summary = Some(view.summary);
                panel.transactions = view.transactions;
                self.apply_date_range(category);
            }
            Err(error) => {
                panel.summary = None;
                panel.transactions.clear();
                panel.list.update_data(Vec::new());
                panel.status = Some(error.status_line());
            }
        }
    }

    /// Feeds the fetched transactions through the date range inputs into the
    /// list view. Unparseable bounds leave the range open.
    pub(super) fn apply_date_range(&mut self, category: CostCategory) {
        let Some(panel) = self.cost_panels.get_mut(&category) else {
            return;
        };
        let start = parse_date_input(&panel.date_from).ok().flatten();
        let end = parse_date_input(&panel.date_to).ok().flatten();
        let records = filter_by_date_range(&panel.transactions, start, end, |record: &Transaction| {
            Some(record.activity_date)
        });
        panel.list.update_data(records);
    }

    pub(super) fn submit_transaction(&mut self, category: CostCategory) -> Command<Message> {
        let Some(store) = self.store_handle() else {
            return Command::none();
        };
        let Some(panel) = self.cost_panels.get_mut(&category) else {
            return Command::none();
        };
        let Some(subcategory) = panel.selected.clone() else {
            panel.status = Some("Choose a subcategory first.".to_string());
            return Command::none();
        };
        let draft = match panel.form.draft() {
            Ok(draft) => draft,
            Err(message) => {
                panel.status = Some(message);
                return Command::none();
            }
        };
        if let Err(error) = draft.validate() {
            panel.status = Some(error.user_summary());
            return Command::none();
        }

        panel.status = Some("Saving...".to_string());
        Command::perform(
            async move { store.insert_transaction(category, subcategory, draft).await },
            move |result| Message::TransactionSaved(category, result.map_err(StoreErrorInfo::from)),
        )
    }

    pub(super) fn handle_transaction_saved(
        &mut self,
        category: CostCategory,
        result: Result<Transaction, StoreErrorInfo>,
    ) -> Command<Message> {
        let Some(panel) = self.cost_panels.get_mut(&category) else {
            return Command::none();
        };
        match result {
            Ok(transaction) => {
                tracing::info!(
                    target: targets::UI,
                    module = category.module_key(),
                    id = transaction.id,
                    "Transaction saved"
                );
                panel.form = Default::default();
                panel.form_visible = false;
                panel.status = Some(format!(
                    "Saved {} ({})",
                    transaction.activity_name,
                    format_currency(transaction.cost)
                ));
                self.mark_revision_seen();
                self.load_cost_view(category)
            }
            Err(error) => {
                panel.status = Some(error.status_line());
                Command::none()
            }
        }
    }

    pub(super) fn load_travel_view(&self) -> Command<Message> {
        let Some(store) = self.store_handle() else {
            return Command::none();
        };
        let year = self.travel.year.as_filter();
        Command::perform(
            async move { store.travel_view(year).await },
            |result| Message::TravelViewLoaded(result.map_err(StoreErrorInfo::from)),
        )
    }

    pub(super) fn handle_travel_view_loaded(&mut self, result: Result<TravelView, StoreErrorInfo>) {
        let panel = &mut self.travel;
        let view = match result {
            Ok(view) => view,
            Err(error) => {
                panel.status = Some(error.status_line());
                return;
            }
        };
        if view.year != panel.year.as_filter() {
            tracing::debug!(target: targets::UI, "Dropping stale BPD view");
            return;
        }

        let mut years = vec![YearChoice::All];
        years.extend(view.years.iter().copied().map(YearChoice::Year));
        if !years.contains(&panel.year) {
            years.push(panel.year);
        }
        panel.years = years;
        panel.sync_budget_input(view.budget);
        if let Some(selected) = panel.selected {
            if !view.records.iter().any(|record| record.id == selected) {
                panel.selected = None;
            }
        }
        panel.list.update_data(view.records.clone());
        panel.view = Some(view);
    }

    pub(super) fn open_travel_form(&mut self) {
        self.travel.form = Some(TravelForm::default());
        self.travel.editing = None;
    }

    pub(super) fn edit_selected_travel(&mut self) {
        match self.travel.selected_record().map(TravelForm::from_record) {
            Some(form) => {
                self.travel.form = Some(form);
                self.travel.editing = self.travel.selected;
            }
            None => self.travel.status = Some("Select a row to edit.".to_string()),
        }
    }

    pub(super) fn submit_travel_form(&mut self) -> Command<Message> {
        let Some(store) = self.store_handle() else {
            return Command::none();
        };
        let panel = &mut self.travel;
        let Some(form) = panel.form.as_ref() else {
            return Command::none();
        };
        let draft = match form.draft() {
            Ok(draft) => draft,
            Err(message) => {
                panel.status = Some(message);
                return Command::none();
            }
        };
        if let Err(error) = draft.validate() {
            panel.status = Some(error.user_summary());
            return Command::none();
        }

        panel.status = Some("Saving...".to_string());
        match panel.editing {
            Some(id) => Command::perform(
                async move { store.update_travel_cost(id, draft).await },
                |result| Message::TravelSaved(result.map_err(StoreErrorInfo::from)),
            ),
            None => Command::perform(
                async move { store.insert_travel_cost(draft).await },
                |result| Message::TravelSaved(result.map_err(StoreErrorInfo::from)),
            ),
        }
    }

    pub(super) fn handle_travel_saved(
        &mut self,
        result: Result<TravelCost, StoreErrorInfo>,
    ) -> Command<Message> {
        match result {
            Ok(record) => {
                tracing::info!(
                    target: targets::UI,
                    id = record.id,
                    bpd = %record.bpd_number,
                    "BPD row saved"
                );
                self.travel.form = None;
                self.travel.editing = None;
                self.travel.selected = Some(record.id);
                self.travel.status = Some(format!("Saved BPD {}", record.bpd_number));
                self.mark_revision_seen();
                self.load_travel_view()
            }
            Err(error) => {
                self.travel.status = Some(error.status_line());
                Command::none()
            }
        }
    }

    pub(super) fn delete_selected_travel(&mut self) -> Command<Message> {
        if self.active_tab != Tab::Travel {
            return Command::none();
        }
        let Some(store) = self.store_handle() else {
            return Command::none();
        };
        let Some(id) = self.travel.selected else {
            self.travel.status = Some("Select a row to delete.".to_string());
            return Command::none();
        };
        Command::perform(
            async move { store.delete_travel_cost(id).await },
            |result| Message::TravelDeleted(result.map_err(StoreErrorInfo::from)),
        )
    }

    pub(super) fn handle_travel_deleted(
        &mut self,
        result: Result<TravelCost, StoreErrorInfo>,
    ) -> Command<Message> {
        match result {
            Ok(record) => {
                tracing::info!(target: targets::UI, id = record.id, "BPD row deleted");
                self.travel.selected = None;
                if self.travel.editing == Some(record.id) {
                    self.travel.form = None;
                    self.travel.editing = None;
                }
                self.travel.status = Some(format!("Deleted BPD {}", record.bpd_number));
                self.mark_revision_seen();
                self.load_travel_view()
            }
            Err(error) => {
                self.travel.status = Some(error.status_line());
                Command::none()
            }
        }
    }

    pub(super) fn save_budget(&mut self) -> Command<Message> {
        let Some(store) = self.store_handle() else {
            return Command::none();
        };
        let YearChoice::Year(year) = self.travel.year else {
            self.travel.status = Some("Pick a year to set its budget.".to_string());
            return Command::none();
        };
        let allocated = match parse_amount_input(&self.travel.budget_input) {
            Ok(Some(allocated)) => allocated,
            _ => {
                self.travel.status = Some("Budget must be a non-negative amount.".to_string());
                return Command::none();
            }
        };
        Command::perform(
            async move { store.set_travel_budget(year, allocated).await },
            |result| Message::BudgetSaved(result.map_err(StoreErrorInfo::from)),
        )
    }

    pub(super) fn handle_budget_saved(
        &mut self,
        result: Result<TravelBudget, StoreErrorInfo>,
    ) -> Command<Message> {
        match result {
            Ok(budget) => {
                tracing::info!(
                    target: targets::UI,
                    year = budget.year,
                    allocated = budget.allocated,
                    "Travel budget saved"
                );
                self.travel.status = Some(format!(
                    "Budget {} set to {}",
                    budget.year,
                    format_currency(budget.allocated)
                ));
                self.travel.budget_input_year = None;
                self.mark_revision_seen();
                self.load_travel_view()
            }
            Err(error) => {
                self.travel.status = Some(error.status_line());
                Command::none()
            }
        }
    }
}
