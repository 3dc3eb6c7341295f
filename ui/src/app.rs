use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use iced::keyboard;
use iced::theme;
use iced::widget::{column, container, row, text};
use iced::{Alignment, Application, Color, Command, Element, Length, Subscription, Theme};

use dspi_core::{targets, CostCategory, DashboardConfig, FileLedgerStore, LedgerStore};

use crate::logging::{LogEntry, LogLevel, LogStore, ReloadHandle};

mod actions;
mod helpers;
mod styles;
mod types;
mod views;

pub use types::{Message, StoreErrorInfo, Tab, TransactionField, TravelField, YearChoice};

use helpers::{current_year, delete_key_event};
use types::{CostPanel, TravelPanel};

pub struct Flags {
    pub log_store: LogStore,
    pub reload_handle: ReloadHandle,
    pub log_level: LogLevel,
    pub config: DashboardConfig,
}

pub struct DspiApp {
    log_store: LogStore,
    reload_handle: ReloadHandle,
    log_entries: Vec<LogEntry>,
    log_level: LogLevel,
    known_targets: HashSet<String>,
    enabled_targets: HashSet<String>,
    copy_status: Option<String>,
    config: DashboardConfig,
    store: Option<Arc<dyn LedgerStore>>,
    store_status: Option<String>,
    seen_revision: u64,
    active_tab: Tab,
    cost_panels: HashMap<CostCategory, CostPanel>,
    travel: TravelPanel,
}

impl Application for DspiApp {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = Flags;

    fn new(flags: Flags) -> (Self, Command<Message>) {
        let known_targets: HashSet<String> =
            targets::ALL.iter().map(|value| value.to_string()).collect();
        let enabled_targets = known_targets.clone();
        let page_size = flags.config.default_page_size;
        let cost_panels = CostCategory::ALL
            .into_iter()
            .map(|category| (category, CostPanel::new(category, page_size)))
            .collect();

        let data_path = flags.config.data_path.clone();
        tracing::info!(
            target: targets::STORE,
            path = %data_path.display(),
            "Opening ledger"
        );
        let open = Command::perform(
            FileLedgerStore::open(data_path, current_year()),
            |result| {
                Message::StoreOpened(result.map(Arc::new).map_err(StoreErrorInfo::from))
            },
        );

        (
            Self {
                log_store: flags.log_store,
                reload_handle: flags.reload_handle,
                log_entries: Vec::new(),
                log_level: flags.log_level,
                known_targets,
                enabled_targets,
                copy_status: None,
                config: flags.config,
                store: None,
                store_status: Some("Opening ledger...".to_string()),
                seen_revision: 0,
                active_tab: Tab::Cost(CostCategory::Audit),
                cost_panels,
                travel: TravelPanel::new(page_size),
            },
            open,
        )
    }

    fn title(&self) -> String {
        "DSPI Cost Dashboard".to_string()
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::LogTick => {
                self.refresh_logs();
                self.refresh_if_stale()
            }
            Message::LogLevelChanged(level) => {
                self.set_log_level(level);
                Command::none()
            }
            Message::ToggleTarget(target, enabled) => {
                if enabled {
                    self.enabled_targets.insert(target);
                } else {
                    self.enabled_targets.remove(&target);
                }
                Command::none()
            }
            Message::CopyDiagnostics => {
                self.copy_status = Some(self.copy_diagnostics());
                Command::none()
            }
            Message::SelectTab(tab) => {
                self.active_tab = tab;
                self.load_active_tab()
            }
            Message::StoreOpened(result) => self.handle_store_opened(result),
            Message::SubcategoriesLoaded(category, result) => {
                self.handle_subcategories_loaded(category, result)
            }
            Message::SubcategorySelected(category, subcategory) => {
                self.select_subcategory(category, subcategory)
            }
            Message::CostViewLoaded {
                category,
                subcategory,
                result,
            } => {
                self.handle_cost_view_loaded(category, subcategory, result);
                Command::none()
            }
            Message::CostSearchChanged(category, value) => {
                if let Some(panel) = self.cost_panels.get_mut(&category) {
                    panel.search.set(value);
                    panel.list.set_page(1);
                }
                Command::none()
            }
            Message::CostDateFromChanged(category, value) => {
                if let Some(panel) = self.cost_panels.get_mut(&category) {
                    panel.date_from = value;
                }
                self.apply_date_range(category);
                Command::none()
            }
            Message::CostDateToChanged(category, value) => {
                if let Some(panel) = self.cost_panels.get_mut(&category) {
                    panel.date_to = value;
                }
                self.apply_date_range(category);
                Command::none()
            }
            Message::CostPageSizeChanged(category, size) => {
                if let Some(panel) = self.cost_panels.get_mut(&category) {
                    panel.list.set_page_size(size);
                }
                Command::none()
            }
            Message::CostPageSelected(category, page) => {
                if let Some(panel) = self.cost_panels.get_mut(&category) {
                    panel.list.set_page(page as i64);
                }
                Command::none()
            }
            Message::ToggleTransactionForm(category) => {
                if let Some(panel) = self.cost_panels.get_mut(&category) {
                    panel.form_visible = !panel.form_visible;
                }
                Command::none()
            }
            Message::TransactionFormChanged(category, field, value) => {
                if let Some(panel) = self.cost_panels.get_mut(&category) {
                    panel.form.set(field, value);
                }
                Command::none()
            }
            Message::SubmitTransaction(category) => self.submit_transaction(category),
            Message::TransactionSaved(category, result) => {
                self.handle_transaction_saved(category, result)
            }
            Message::TravelViewLoaded(result) => {
                self.handle_travel_view_loaded(result);
                Command::none()
            }
            Message::TravelYearSelected(year) => {
                self.travel.year = year;
                self.travel.selected = None;
                self.load_travel_view()
            }
            Message::TravelSearchChanged(value) => {
                self.travel.search.set(value);
                self.travel.list.set_page(1);
                Command::none()
            }
            Message::TravelPageSizeChanged(size) => {
                self.travel.list.set_page_size(size);
                Command::none()
            }
            Message::TravelPageSelected(page) => {
                self.travel.list.set_page(page as i64);
                Command::none()
            }
            Message::SelectTravelRecord(id) => {
                self.travel.selected = Some(id);
                Command::none()
            }
            Message::OpenTravelForm => {
                self.open_travel_form();
                Command::none()
            }
            Message::EditSelectedTravel => {
                self.edit_selected_travel();
                Command::none()
            }
            Message::CloseTravelForm => {
                self.travel.form = None;
                self.travel.editing = None;
                Command::none()
            }
            Message::TravelFormChanged(field, value) => {
                if let Some(form) = self.travel.form.as_mut() {
                    form.set(field, value);
                }
                Command::none()
            }
            Message::SubmitTravelForm => self.submit_travel_form(),
            Message::TravelSaved(result) => self.handle_travel_saved(result),
            Message::DeleteSelectedTravel => self.delete_selected_travel(),
            Message::TravelDeleted(result) => self.handle_travel_deleted(result),
            Message::BudgetInputChanged(value) => {
                self.travel.budget_input = value;
                Command::none()
            }
            Message::SaveBudget => self.save_budget(),
            Message::BudgetSaved(result) => self.handle_budget_saved(result),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let log_tick = iced::time::every(Duration::from_millis(250)).map(|_| Message::LogTick);
        let delete_key = keyboard::on_key_press(delete_key_event);
        Subscription::batch(vec![log_tick, delete_key])
    }

    fn view(&self) -> Element<'_, Message> {
        let store_line = self
            .store_status
            .as_deref()
            .unwrap_or("Ledger ready.")
            .to_string();
        let header = row![
            text("DSPI Cost Dashboard")
                .size(28)
                .style(theme::Text::Color(Color::from_rgb8(0x10, 0x1a, 0x24))),
            text(store_line)
                .size(14)
                .style(theme::Text::Color(Color::from_rgb8(0x5f, 0x6b, 0x7a))),
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        let tabs = self.tab_bar();

        let body = match self.active_tab {
            Tab::Cost(category) => self.cost_tab_view(category),
            Tab::Travel => self.travel_tab_view(),
            Tab::Debug => self.debug_tab_view(),
        };

        let content = column![header, tabs, body].spacing(20).padding(16);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}
