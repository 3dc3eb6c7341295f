use iced::alignment::Horizontal;
use iced::theme;
use iced::widget::{
    button, checkbox, column, container, pick_list, progress_bar, row, scrollable, text,
    text_input, Column,
};
use iced::{Alignment, Color, Element, Length};

use dspi_core::{
    format_currency, format_date, Cents, CostCategory, NavItem, PageSize, PageSummary,
    TravelCost, TravelView,
};

use crate::app::helpers::{amount_color, level_color};
use crate::app::styles::{CardStyle, RowStyle, TabStyle};
use crate::app::types::{
    CostPanel, Message, Tab, TransactionField, TravelField, TravelForm, YearChoice,
};
use crate::app::DspiApp;
use crate::logging::LogLevel;

const TRAVEL_FORM_FIELDS: [(TravelField, &str, &str); 13] = [
    (TravelField::AuditName, "Audit name", "Audit Cabang Surabaya"),
    (TravelField::Requester, "Requester", "Name"),
    (TravelField::AuditType, "Audit type", "Reguler"),
    (TravelField::SpdNumber, "SPD number", "SPD/001/2024"),
    (TravelField::BpdNumber, "BPD number", "BPD/001/2024"),
    (TravelField::PeriodStart, "Period start", "YYYY-MM-DD"),
    (TravelField::PeriodEnd, "Period end", "YYYY-MM-DD"),
    (TravelField::AuditDays, "Audit days", "auto"),
    (TravelField::DepartureCost, "Departure cost", "0"),
    (TravelField::LodgingCost, "Lodging cost", "0"),
    (TravelField::ReturnCost, "Return cost", "0"),
    (TravelField::DutyDetail, "Duty allowance", "0"),
    (TravelField::Realization, "Realization", "0"),
];

impl DspiApp {
    pub(super) fn tab_bar(&self) -> Element<'_, Message> {
        let mut tabs = row![].spacing(4).align_items(Alignment::Center);
        for category in CostCategory::ALL {
            tabs = tabs.push(self.tab_button(Tab::Cost(category), category.label()));
        }
        tabs.push(self.tab_button(Tab::Travel, "BPD"))
            .push(self.tab_button(Tab::Debug, "Debug"))
            .into()
    }

    fn tab_button(&self, tab: Tab, label: &str) -> Element<'_, Message> {
        let style = theme::Button::custom(TabStyle {
            active: self.active_tab == tab,
        });

        button(text(label))
            .padding([6, 12])
            .style(style)
            .on_press(Message::SelectTab(tab))
            .into()
    }

    pub(super) fn cost_tab_view(&self, category: CostCategory) -> Element<'_, Message> {
        let Some(panel) = self.cost_panels.get(&category) else {
            return muted_text("No panel for this category.").into();
        };

        let subcategory_picker = pick_list(
            &panel.subcategories[..],
            panel.selected.clone(),
            move |subcategory| Message::SubcategorySelected(category, subcategory),
        )
        .placeholder("Subcategory");

        let form_toggle = if panel.form_visible {
            button("Close form")
                .style(theme::Button::Secondary)
                .on_press(Message::ToggleTransactionForm(category))
        } else {
            button("Add transaction").on_press(Message::ToggleTransactionForm(category))
        };

        let header = row![
            text(category.ledger_name()).size(20).style(theme::Text::Color(title_color())),
            subcategory_picker,
            form_toggle,
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        let mut content = column![header, self.cost_summary_view(panel)].spacing(16);

        if panel.form_visible {
            content = content.push(transaction_form_view(panel));
        }
        if let Some(status) = &panel.status {
            content = content.push(muted_text(status));
        }

        let search = panel.search.get();
        let filters = row![
            text_input("Search activity, date or amount", &search)
                .on_input(move |value| Message::CostSearchChanged(category, value))
                .padding(6)
                .size(12)
                .width(Length::FillPortion(3)),
            text_input("From YYYY-MM-DD", &panel.date_from)
                .on_input(move |value| Message::CostDateFromChanged(category, value))
                .padding(6)
                .size(12)
                .width(Length::FillPortion(1)),
            text_input("To YYYY-MM-DD", &panel.date_to)
                .on_input(move |value| Message::CostDateToChanged(category, value))
                .padding(6)
                .size(12)
                .width(Length::FillPortion(1)),
            page_size_picker(panel.list.page_size(), move |size| {
                Message::CostPageSizeChanged(category, size)
            }),
        ]
        .spacing(8)
        .align_items(Alignment::Center);

        content = content
            .push(filters)
            .push(self.transaction_table(panel))
            .push(pagination_bar(
                panel.list.summary(),
                panel.list.navigation(),
                panel.list.current_page(),
                move |page| Message::CostPageSelected(category, page),
            ));

        scrollable(content).height(Length::Fill).into()
    }

    fn cost_summary_view(&self, panel: &CostPanel) -> Element<'_, Message> {
        let Some(summary) = &panel.summary else {
            return muted_text("Select a subcategory to see its budget.").into();
        };

        row![
            amount_card("Initial budget", summary.initial_amount, Color::from_rgb8(0x3b, 0x82, 0xf6)),
            amount_card("Usage", summary.total_usage, Color::from_rgb8(0xe0, 0xb0, 0x4f)),
            amount_card("Remaining", summary.final_amount, Color::from_rgb8(0x22, 0x7d, 0x64)),
            stat_card(
                "Transactions",
                summary.transaction_count.to_string(),
                Color::from_rgb8(0x6b, 0x72, 0x80)
            ),
        ]
        .spacing(12)
        .into()
    }

    fn transaction_table(&self, panel: &CostPanel) -> Element<'_, Message> {
        let mut rows = column![table_header(&[
            ("Date", 2),
            ("Activity", 4),
            ("Headcount", 1),
            ("Cost", 2),
        ])]
        .spacing(4);

        let page = panel.list.page_records();
        if page.is_empty() {
            rows = rows.push(muted_text("No transactions match."));
        }
        for transaction in page {
            rows = rows.push(
                row![
                    cell(format_date(Some(transaction.activity_date)), 2),
                    cell(transaction.activity_name.clone(), 4),
                    cell(transaction.headcount.to_string(), 1),
                    amount_cell(transaction.cost, 2),
                ]
                .spacing(8)
                .padding([4, 8]),
            );
        }

        container(rows)
            .padding(8)
            .width(Length::Fill)
            .style(theme::Container::Box)
            .into()
    }

    pub(super) fn travel_tab_view(&self) -> Element<'_, Message> {
        let panel = &self.travel;

        let year_picker = pick_list(&panel.years[..], Some(panel.year), Message::TravelYearSelected);
        let header = row![
            text("Biaya Perjalanan Dinas (BPD)")
                .size(20)
                .style(theme::Text::Color(title_color())),
            year_picker,
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        let mut content = column![header, self.budget_view()].spacing(16);

        if let Some(view) = &panel.view {
            content = content.push(
                row![audit_chart_view(view), ranking_view(view)]
                    .spacing(12)
                    .align_items(Alignment::Start),
            );
        }

        let selected = panel.selected.is_some();
        let mut edit_button = button("Edit selected").style(theme::Button::Secondary);
        let mut delete_button = button("Delete selected").style(theme::Button::Destructive);
        if selected {
            edit_button = edit_button.on_press(Message::EditSelectedTravel);
            delete_button = delete_button.on_press(Message::DeleteSelectedTravel);
        }
        content = content.push(
            row![
                button("New BPD").on_press(Message::OpenTravelForm),
                edit_button,
                delete_button,
            ]
            .spacing(8)
            .align_items(Alignment::Center),
        );

        if let Some(form) = &panel.form {
            content = content.push(travel_form_view(form, panel.editing.is_some()));
        }
        if let Some(status) = &panel.status {
            content = content.push(muted_text(status));
        }

        let search = panel.search.get();
        content = content
            .push(
                row![
                    text_input("Search audit, requester, type, SPD or BPD", &search)
                        .on_input(Message::TravelSearchChanged)
                        .padding(6)
                        .size(12)
                        .width(Length::Fill),
                    page_size_picker(panel.list.page_size(), Message::TravelPageSizeChanged),
                ]
                .spacing(8)
                .align_items(Alignment::Center),
            )
            .push(self.travel_table())
            .push(pagination_bar(
                panel.list.summary(),
                panel.list.navigation(),
                panel.list.current_page(),
                Message::TravelPageSelected,
            ));

        scrollable(content).height(Length::Fill).into()
    }

    fn budget_view(&self) -> Element<'_, Message> {
        let panel = &self.travel;
        let budget = panel.view.as_ref().and_then(|view| view.budget);

        let cards: Element<'_, Message> = match (panel.year, budget) {
            (YearChoice::All, _) => {
                muted_text("Pick a year to see its travel budget.").into()
            }
            (YearChoice::Year(year), None) => {
                muted_text(format!("No budget recorded for {year}.")).into()
            }
            (YearChoice::Year(_), Some(budget)) => row![
                amount_card("Budget", budget.allocated, Color::from_rgb8(0x3b, 0x82, 0xf6)),
                amount_card("Realized", budget.realized, Color::from_rgb8(0xe0, 0xb0, 0x4f)),
                amount_card("Remaining", budget.remaining(), Color::from_rgb8(0x22, 0x7d, 0x64)),
            ]
            .spacing(12)
            .into(),
        };

        let mut save = button("Save budget");
        if matches!(panel.year, YearChoice::Year(_)) {
            save = save.on_press(Message::SaveBudget);
        }
        let editor = row![
            text_input("Annual budget", &panel.budget_input)
                .on_input(Message::BudgetInputChanged)
                .padding(6)
                .size(12)
                .width(Length::Fixed(220.0)),
            save,
        ]
        .spacing(8)
        .align_items(Alignment::Center);

        column![cards, editor].spacing(8).into()
    }

    fn travel_table(&self) -> Element<'_, Message> {
        let panel = &self.travel;
        let mut rows = column![table_header(&[
            ("Audit", 3),
            ("BPD number", 2),
            ("Period", 3),
            ("Days", 1),
            ("Total", 2),
            ("Realization", 2),
        ])]
        .spacing(2);

        let page = panel.list.page_records();
        if page.is_empty() {
            rows = rows.push(muted_text("No BPD rows match."));
        }
        for record in page {
            rows = rows.push(travel_row(record, panel.selected == Some(record.id)));
        }

        container(rows)
            .padding(8)
            .width(Length::Fill)
            .style(theme::Container::Box)
            .into()
    }

    pub(super) fn debug_tab_view(&self) -> Element<'_, Message> {
        let level_picker = pick_list(
            &LogLevel::ALL[..],
            Some(self.log_level),
            Message::LogLevelChanged,
        )
        .placeholder("Log level");

        let console_header = row![
            text("Console").size(20).style(theme::Text::Color(title_color())),
            level_picker
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        let console = column![console_header, self.target_filters_view(), self.log_lines_view()]
            .spacing(12)
            .width(Length::FillPortion(2));

        row![console, self.debug_panel_view()]
            .spacing(16)
            .align_items(Alignment::Start)
            .into()
    }

    fn target_filters_view(&self) -> Element<'_, Message> {
        let mut filter_column = column![
            text("Targets")
                .size(14)
                .style(theme::Text::Color(Color::from_rgb8(0x3a, 0x4a, 0x5a)))
        ]
        .spacing(6);

        for target in self.sorted_targets() {
            let enabled = self.enabled_targets.contains(&target);
            filter_column = filter_column.push(
                checkbox(target.clone(), enabled)
                    .on_toggle(move |value| Message::ToggleTarget(target.clone(), value)),
            );
        }

        container(filter_column)
            .padding(8)
            .style(theme::Container::Box)
            .into()
    }

    fn log_lines_view(&self) -> Element<'_, Message> {
        let mut lines = column![].spacing(4);

        for entry in self.visible_entries() {
            let line = text(entry.format_line())
                .size(13)
                .horizontal_alignment(Horizontal::Left)
                .style(theme::Text::Color(level_color(entry.level)));
            lines = lines.push(line);
        }

        scrollable(lines)
            .height(Length::Fill)
            .width(Length::Fill)
            .into()
    }

    fn debug_panel_view(&self) -> Element<'_, Message> {
        let copy_status = self.copy_status.as_deref().unwrap_or("Ready");
        let store_line = self.store_status.as_deref().unwrap_or("Ledger ready.");
        let mut panel = column![
            text("Debug panel").size(20).style(theme::Text::Color(title_color())),
            muted_text(store_line),
            muted_text(format!("Store revision seen: {}", self.seen_revision)),
            muted_text(format!("Data file: {}", self.config.data_path.display())),
        ]
        .spacing(10);

        for category in CostCategory::ALL {
            if let Some(cost) = self.cost_panels.get(&category) {
                panel = panel.push(muted_text(format!(
                    "{}: {}",
                    category.label(),
                    cost.list.summary()
                )));
            }
        }
        panel = panel
            .push(muted_text(format!("BPD: {}", self.travel.list.summary())))
            .push(button("Copy diagnostics").on_press(Message::CopyDiagnostics))
            .push(
                text(format!("Clipboard: {copy_status}"))
                    .size(12)
                    .style(theme::Text::Color(Color::from_rgb8(0x6a, 0x6a, 0x6a))),
            );

        container(panel)
            .padding(12)
            .width(Length::FillPortion(1))
            .style(theme::Container::Box)
            .into()
    }
}

fn transaction_form_view(panel: &CostPanel) -> Element<'_, Message> {
    let category = panel.category;
    let input = |placeholder: &str, value: &str, field: TransactionField| {
        text_input(placeholder, value)
            .on_input(move |value| Message::TransactionFormChanged(category, field, value))
            .padding(6)
            .size(12)
            .width(Length::Fill)
    };

    let content = column![
        text("New transaction").size(16).style(theme::Text::Color(title_color())),
        row![
            labeled("Activity date", input("YYYY-MM-DD", &panel.form.date, TransactionField::Date)),
            labeled("Activity", input("Activity name", &panel.form.name, TransactionField::Name)),
        ]
        .spacing(8),
        row![
            labeled("Headcount", input("0", &panel.form.headcount, TransactionField::Headcount)),
            labeled("Cost", input("Rp0", &panel.form.cost, TransactionField::Cost)),
        ]
        .spacing(8),
        button("Save transaction").on_press(Message::SubmitTransaction(category)),
    ]
    .spacing(8);

    container(content)
        .padding(12)
        .style(theme::Container::Box)
        .into()
}

fn travel_form_view(form: &TravelForm, editing: bool) -> Element<'_, Message> {
    let title = if editing { "Edit BPD" } else { "New BPD" };
    let mut fields = Column::new().spacing(6);
    for pair in TRAVEL_FORM_FIELDS.chunks(2) {
        let mut line = row![].spacing(8);
        for (field, label, placeholder) in pair {
            let field = *field;
            line = line.push(labeled(
                label,
                text_input(placeholder, form.value(field))
                    .on_input(move |value| Message::TravelFormChanged(field, value))
                    .padding(6)
                    .size(12)
                    .width(Length::Fill),
            ));
        }
        fields = fields.push(line);
    }

    let preview = form.preview();
    let days = preview
        .derived_audit_days()
        .map(|days| days.to_string())
        .unwrap_or_else(|| "-".to_string());
    let total = |amount: Option<Cents>| {
        amount
            .map(format_currency)
            .unwrap_or_else(|| "too large".to_string())
    };
    let totals = row![
        muted_text(format!("Derived audit days: {days}")),
        muted_text(format!(
            "Accommodation: {}",
            total(preview.accommodation_total())
        )),
        muted_text(format!(
            "Accommodation + duty: {}",
            total(preview.accommodation_duty_total())
        )),
    ]
    .spacing(16);

    let content = column![
        text(title).size(16).style(theme::Text::Color(title_color())),
        fields,
        totals,
        row![
            button("Save").on_press(Message::SubmitTravelForm),
            button("Cancel")
                .style(theme::Button::Secondary)
                .on_press(Message::CloseTravelForm),
        ]
        .spacing(8),
    ]
    .spacing(10);

    container(content)
        .padding(12)
        .style(theme::Container::Box)
        .into()
}

fn audit_chart_view(view: &TravelView) -> Element<'_, Message> {
    let mut chart = column![text("Cost per audit").size(16).style(theme::Text::Color(title_color()))]
        .spacing(6);
    let max = view.chart.iter().map(|total| total.total).max().unwrap_or(0);
    if view.chart.is_empty() {
        chart = chart.push(muted_text("No BPD rows yet."));
    }
    for total in &view.chart {
        chart = chart.push(
            column![
                row![
                    text(&total.audit_name).size(12).width(Length::Fill),
                    text(format_currency(total.total)).size(12),
                ]
                .spacing(8),
                progress_bar(0.0..=max.max(1) as f32, total.total.max(0) as f32)
                    .height(Length::Fixed(8.0)),
            ]
            .spacing(2),
        );
    }

    container(chart)
        .padding(12)
        .width(Length::FillPortion(2))
        .style(theme::Container::Box)
        .into()
}

fn ranking_view(view: &TravelView) -> Element<'_, Message> {
    let ranking = |title: &'static str, records: &[TravelCost]| {
        let mut list = column![text(title).size(14).style(theme::Text::Color(title_color()))].spacing(4);
        for (index, record) in records.iter().enumerate() {
            list = list.push(
                row![
                    text(format!("{}. {}", index + 1, record.audit_name))
                        .size(12)
                        .width(Length::Fill),
                    text(format_currency(record.accommodation_duty_total)).size(12),
                ]
                .spacing(8),
            );
        }
        list
    };

    container(
        column![
            ranking("Highest cost", &view.top),
            ranking("Lowest cost", &view.bottom),
        ]
        .spacing(12),
    )
    .padding(12)
    .width(Length::FillPortion(1))
    .style(theme::Container::Box)
    .into()
}

fn travel_row(record: &TravelCost, selected: bool) -> Element<'_, Message> {
    let period = format!(
        "{} - {}",
        format_date(Some(record.period_start)),
        format_date(Some(record.period_end))
    );
    let line = row![
        cell(record.audit_name.clone(), 3),
        cell(record.bpd_number.clone(), 2),
        cell(period, 3),
        cell(record.audit_days.to_string(), 1),
        amount_cell(record.accommodation_duty_total, 2),
        amount_cell(record.realization, 2),
    ]
    .spacing(8);

    button(line)
        .padding([4, 8])
        .width(Length::Fill)
        .style(theme::Button::custom(RowStyle { selected }))
        .on_press(Message::SelectTravelRecord(record.id))
        .into()
}

fn pagination_bar<'a>(
    summary: PageSummary,
    navigation: &[NavItem],
    current_page: usize,
    on_page: impl Fn(usize) -> Message,
) -> Element<'a, Message> {
    let mut controls = row![].spacing(4).align_items(Alignment::Center);
    for item in navigation {
        let label = match item {
            NavItem::Previous { .. } => "Previous".to_string(),
            NavItem::Next { .. } => "Next".to_string(),
            NavItem::Page { number, .. } => number.to_string(),
            NavItem::Ellipsis => {
                controls = controls.push(text("...").size(12));
                continue;
            }
        };
        let style = match item {
            NavItem::Page { active: true, .. } => theme::Button::Primary,
            _ => theme::Button::Secondary,
        };
        let mut control = button(text(label).size(12)).padding([4, 10]).style(style);
        if let Some(page) = item.target_page(current_page) {
            control = control.on_press(on_page(page));
        }
        controls = controls.push(control);
    }

    row![
        text(summary.to_string())
            .size(12)
            .width(Length::Fill)
            .style(theme::Text::Color(Color::from_rgb8(0x4a, 0x4a, 0x4a))),
        controls,
    ]
    .spacing(12)
    .align_items(Alignment::Center)
    .into()
}

fn page_size_picker<'a>(
    current: PageSize,
    on_selected: impl Fn(PageSize) -> Message + 'a,
) -> Element<'a, Message> {
    row![
        text("Show").size(12),
        pick_list(&PageSize::OPTIONS[..], Some(current), on_selected),
        text("entries").size(12),
    ]
    .spacing(6)
    .align_items(Alignment::Center)
    .into()
}

fn table_header<'a>(columns: &[(&'static str, u16)]) -> Element<'a, Message> {
    let mut header = row![].spacing(8).padding([4, 8]);
    for (label, portion) in columns {
        header = header.push(
            text(*label)
                .size(12)
                .width(Length::FillPortion(*portion))
                .style(theme::Text::Color(Color::from_rgb8(0x3a, 0x4a, 0x5a))),
        );
    }
    header.into()
}

fn cell<'a>(value: String, portion: u16) -> Element<'a, Message> {
    text(value).size(13).width(Length::FillPortion(portion)).into()
}

fn amount_cell<'a>(amount: Cents, portion: u16) -> Element<'a, Message> {
    text(format_currency(amount))
        .size(13)
        .width(Length::FillPortion(portion))
        .horizontal_alignment(Horizontal::Right)
        .style(theme::Text::Color(amount_color(amount)))
        .into()
}

fn amount_card<'a>(label: &str, amount: Cents, accent: Color) -> Element<'a, Message> {
    stat_card(label, format_currency(amount), accent)
}

fn stat_card<'a>(label: &str, value: String, accent: Color) -> Element<'a, Message> {
    container(
        column![
            text(label)
                .size(12)
                .style(theme::Text::Color(Color::from_rgb8(0x5f, 0x6b, 0x7a))),
            text(value).size(18).style(theme::Text::Color(accent)),
        ]
        .spacing(4),
    )
    .padding(12)
    .width(Length::FillPortion(1))
    .style(theme::Container::Custom(Box::new(CardStyle { accent })))
    .into()
}

fn labeled<'a>(
    label: &str,
    input: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    let input: Element<'a, Message> = input.into();
    column![
        text(label)
            .size(12)
            .style(theme::Text::Color(Color::from_rgb8(0x3a, 0x4a, 0x5a))),
        input,
    ]
    .spacing(4)
    .width(Length::Fill)
    .into()
}

fn title_color() -> Color {
    Color::from_rgb8(0x12, 0x12, 0x12)
}

fn muted_text<'a>(value: impl ToString) -> iced::widget::Text<'a> {
    text(value)
        .size(12)
        .style(theme::Text::Color(Color::from_rgb8(0x6a, 0x6a, 0x6a)))
}
