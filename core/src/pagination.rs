//! Headless pagination for list views.
//!
//! A [`PaginatedListView`] owns a copy of the records a view has loaded, an
//! optional filter predicate, and the page-size selection. Every [`render`]
//! filters the full record set from scratch, clamps the current page, slices
//! out the visible page and hands it to the registered render callback.
//!
//! [`render`]: PaginatedListView::render

use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::targets;
use crate::Error;

/// Maximum number of numbered page controls shown around the current page.
pub const NAVIGATION_WINDOW: usize = 5;

pub type FilterPredicate<T> = Box<dyn Fn(&T) -> bool>;
pub type RenderCallback<T> = Box<dyn FnMut(&[T])>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSize {
    Entries(NonZeroUsize),
    All,
}

const fn fixed(count: usize) -> PageSize {
    match NonZeroUsize::new(count) {
        Some(count) => PageSize::Entries(count),
        None => PageSize::All,
    }
}

impl PageSize {
    pub const OPTIONS: [PageSize; 5] = [fixed(10), fixed(25), fixed(50), fixed(100), PageSize::All];

    pub fn entries(count: usize) -> Result<Self, Error> {
        NonZeroUsize::new(count)
            .map(PageSize::Entries)
            .ok_or_else(|| Error::InvalidArgument {
                operation: "PageSize::entries",
                details: "page size must be greater than zero".to_string(),
            })
    }

    /// Number of records per page, or `None` when every record is shown.
    pub fn limit(self) -> Option<usize> {
        match self {
            PageSize::Entries(count) => Some(count.get()),
            PageSize::All => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        fixed(10)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Entries(count) => write!(f, "{count}"),
            PageSize::All => f.write_str("All"),
        }
    }
}

/// The "Showing A–B of N entries" line. `first` and `last` are 1-based and
/// inclusive; both are 0 when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub first: usize,
    pub last: usize,
    pub total: usize,
    pub show_all: bool,
}

impl fmt::Display for PageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.show_all {
            write!(f, "Showing all {} entries", self.total)
        } else {
            write!(
                f,
                "Showing {}–{} of {} entries",
                self.first, self.last, self.total
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Previous { enabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { enabled: bool },
}

impl NavItem {
    /// Page a click on this control should navigate to, if it is clickable.
    pub fn target_page(self, current_page: usize) -> Option<usize> {
        match self {
            NavItem::Previous { enabled: true } => Some(current_page.saturating_sub(1).max(1)),
            NavItem::Next { enabled: true } => Some(current_page + 1),
            NavItem::Page { number, active: false } => Some(number),
            _ => None,
        }
    }
}

pub fn navigation_items(current_page: usize, total_pages: usize) -> Vec<NavItem> {
    let mut items = vec![NavItem::Previous {
        enabled: current_page > 1,
    }];

    if total_pages > 0 {
        let mut start = current_page.saturating_sub(NAVIGATION_WINDOW / 2).max(1);
        let end = (start + NAVIGATION_WINDOW - 1).min(total_pages);
        start = end.saturating_sub(NAVIGATION_WINDOW - 1).max(1);

        if start > 1 {
            items.push(NavItem::Page {
                number: 1,
                active: current_page == 1,
            });
            if start > 2 {
                items.push(NavItem::Ellipsis);
            }
        }

        for number in start..=end {
            items.push(NavItem::Page {
                number,
                active: number == current_page,
            });
        }

        if end < total_pages {
            if end + 1 < total_pages {
                items.push(NavItem::Ellipsis);
            }
            items.push(NavItem::Page {
                number: total_pages,
                active: current_page == total_pages,
            });
        }
    }

    items.push(NavItem::Next {
        enabled: current_page < total_pages,
    });
    items
}

pub struct PaginatedListView<T> {
    records: Vec<T>,
    filter: Option<FilterPredicate<T>>,
    render_callback: Option<RenderCallback<T>>,
    page_size: PageSize,
    current_page: usize,
    total_pages: usize,
    filtered: Vec<T>,
    page_range: Range<usize>,
    summary: PageSummary,
    navigation: Vec<NavItem>,
}

impl<T: Clone> PaginatedListView<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            filter: None,
            render_callback: None,
            page_size: PageSize::default(),
            current_page: 1,
            total_pages: 1,
            filtered: Vec::new(),
            page_range: 0..0,
            summary: PageSummary::default(),
            navigation: Vec::new(),
        }
    }

    pub fn with_filter(records: Vec<T>, filter: impl Fn(&T) -> bool + 'static) -> Self {
        let mut view = Self::new(records);
        view.filter = Some(Box::new(filter));
        view
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn set_render_callback(&mut self, callback: impl FnMut(&[T]) + 'static) {
        self.render_callback = Some(Box::new(callback));
    }

    pub fn render(&mut self) -> &[T] {
        self.filtered = match &self.filter {
            Some(filter) => self
                .records
                .iter()
                .filter(|record| filter(*record))
                .cloned()
                .collect(),
            None => self.records.clone(),
        };

        let total_entries = self.filtered.len();
        let limit = self.page_size.limit();
        self.total_pages = match limit {
            Some(limit) => total_entries.div_ceil(limit).max(1),
            None => 1,
        };
        self.current_page = self.current_page.clamp(1, self.total_pages);

        self.page_range = match limit {
            Some(limit) => {
                let start = (self.current_page - 1) * limit;
                start..(start + limit).min(total_entries)
            }
            None => 0..total_entries,
        };

        self.summary = PageSummary {
            first: if total_entries == 0 {
                0
            } else {
                self.page_range.start + 1
            },
            last: self.page_range.end,
            total: total_entries,
            show_all: limit.is_none(),
        };
        self.navigation = navigation_items(self.current_page, self.total_pages);

        trace!(
            target: targets::PAGINATION,
            records = self.records.len(),
            filtered = total_entries,
            page = self.current_page,
            total_pages = self.total_pages,
            page_size = %self.page_size,
            "List view rendered"
        );

        if let Some(callback) = self.render_callback.as_mut() {
            callback(&self.filtered[self.page_range.clone()]);
        }

        &self.filtered[self.page_range.clone()]
    }

    /// Out-of-range pages are clamped by the render that follows.
    pub fn set_page(&mut self, page: i64) -> &[T] {
        self.current_page = usize::try_from(page).unwrap_or(0).max(1);
        self.render()
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> &[T] {
        self.page_size = page_size;
        self.current_page = 1;
        self.render()
    }

    pub fn update_data(&mut self, records: Vec<T>) -> &[T] {
        self.records = records;
        self.current_page = 1;
        self.render()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Records that passed the filter during the last render, before slicing.
    pub fn filtered_data(&self) -> &[T] {
        &self.filtered
    }

    /// Records on the current page as of the last render.
    pub fn page_records(&self) -> &[T] {
        &self.filtered[self.page_range.clone()]
    }

    pub fn summary(&self) -> PageSummary {
        self.summary
    }

    pub fn navigation(&self) -> &[NavItem] {
        &self.navigation
    }
}

impl<T> fmt::Debug for PaginatedListView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedListView")
            .field("records", &self.records.len())
            .field("filtered", &self.filtered.len())
            .field("has_filter", &self.filter.is_some())
            .field("has_render_callback", &self.render_callback.is_some())
            .field("page_size", &self.page_size)
            .field("current_page", &self.current_page)
            .field("total_pages", &self.total_pages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: usize,
        name: String,
    }

    fn rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|id| Row {
                id,
                name: format!("row-{id}"),
            })
            .collect()
    }

    fn ids(page: &[Row]) -> Vec<usize> {
        page.iter().map(|row| row.id).collect()
    }

    fn entries(count: usize) -> PageSize {
        PageSize::entries(count).expect("page size")
    }

    #[test]
    fn current_page_stays_within_bounds() {
        for count in [0, 1, 9, 10, 11, 57, 100, 101] {
            for size in PageSize::OPTIONS {
                let mut view = PaginatedListView::new(rows(count)).with_page_size(size);
                for page in [-3, 0, 1, 2, 5, 1_000] {
                    view.set_page(page);
                    let max_page = match size.limit() {
                        Some(limit) => count.div_ceil(limit).max(1),
                        None => 1,
                    };
                    assert!(view.current_page() >= 1);
                    assert!(
                        view.current_page() <= max_page,
                        "count={count} size={size} page={page}"
                    );
                    assert_eq!(view.total_pages(), max_page);
                }
            }
        }
    }

    #[test]
    fn pages_are_half_open_slices() {
        let all = rows(57);
        let mut view = PaginatedListView::new(all.clone()).with_page_size(entries(25));

        assert_eq!(view.set_page(1), &all[0..25]);
        assert_eq!(view.set_page(2), &all[25..50]);
        let tail = view.set_page(3).to_vec();
        assert_eq!(tail.len(), 57 - 2 * 25);
        assert_eq!(tail, &all[50..57]);
    }

    #[test]
    fn filter_is_evaluated_fresh_each_render() {
        let term = Rc::new(RefCell::new("1".to_string()));
        let live = term.clone();
        let mut view = PaginatedListView::with_filter(rows(30), move |row: &Row| {
            row.name.contains(live.borrow().as_str())
        });

        view.render();
        let first: Vec<usize> = ids(view.filtered_data());
        assert_eq!(first, vec![1, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 21]);

        *term.borrow_mut() = "2".to_string();
        view.render();
        let second: Vec<usize> = ids(view.filtered_data());
        assert_eq!(second, vec![2, 12, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29]);
    }

    #[test]
    fn update_data_resets_to_first_page() {
        let mut view = PaginatedListView::new(rows(80));
        view.set_page(6);
        assert_eq!(view.current_page(), 6);

        view.update_data(rows(75));
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn changing_page_size_resets_to_first_page() {
        let mut view = PaginatedListView::new(rows(200));
        view.set_page(7);
        assert_eq!(view.current_page(), 7);

        view.set_page_size(entries(25));
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.total_pages(), 8);
    }

    #[test]
    fn empty_set_renders_single_empty_page() {
        let mut view = PaginatedListView::<Row>::new(Vec::new());
        assert!(view.render().is_empty());
        assert_eq!(view.total_pages(), 1);
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.summary().to_string(), "Showing 0–0 of 0 entries");
        assert_eq!(
            view.navigation(),
            &[
                NavItem::Previous { enabled: false },
                NavItem::Page {
                    number: 1,
                    active: true
                },
                NavItem::Next { enabled: false },
            ]
        );

        view.set_page_size(PageSize::All);
        assert_eq!(view.summary().to_string(), "Showing all 0 entries");
    }

    #[test]
    fn basic_pagination_scenario() {
        let all = rows(25);
        let mut view = PaginatedListView::new(all.clone());

        assert_eq!(view.render(), &all[0..10]);
        assert_eq!(view.summary().to_string(), "Showing 1–10 of 25 entries");
        assert_eq!(view.total_pages(), 3);

        let last = view.set_page(3).to_vec();
        assert_eq!(ids(&last), vec![20, 21, 22, 23, 24]);
        assert_eq!(view.summary().to_string(), "Showing 21–25 of 25 entries");
        assert_eq!(
            view.navigation().last(),
            Some(&NavItem::Next { enabled: false })
        );
        assert_eq!(
            view.navigation().first(),
            Some(&NavItem::Previous { enabled: true })
        );
    }

    #[test]
    fn search_narrows_then_widens() {
        let mut records = Vec::new();
        for id in 0..12 {
            let name = if id < 3 { "Alpha" } else { "Beta" };
            records.push(Row {
                id,
                name: name.to_string(),
            });
        }

        let term = Rc::new(RefCell::new("Alpha".to_string()));
        let live = term.clone();
        let mut view = PaginatedListView::with_filter(records, move |row: &Row| {
            row.name.contains(live.borrow().as_str())
        });

        view.render();
        assert_eq!(view.filtered_data().len(), 3);
        assert_eq!(view.total_pages(), 1);

        *term.borrow_mut() = "Beta".to_string();
        view.render();
        assert_eq!(view.filtered_data().len(), 9);
    }

    #[test]
    fn all_entries_mode_shows_everything() {
        let mut view = PaginatedListView::new(rows(57));
        let page = view.set_page_size(PageSize::All).to_vec();

        assert_eq!(page.len(), 57);
        assert_eq!(view.total_pages(), 1);
        assert_eq!(view.summary().to_string(), "Showing all 57 entries");
    }

    #[test]
    fn update_replaces_data_and_resets_page() {
        let mut view = PaginatedListView::new(rows(100));
        view.set_page(4);
        assert_eq!(view.current_page(), 4);

        let replacement: Vec<Row> = (500..515)
            .map(|id| Row {
                id,
                name: format!("new-{id}"),
            })
            .collect();
        let page = view.update_data(replacement.clone()).to_vec();

        assert_eq!(view.current_page(), 1);
        assert_eq!(page, &replacement[0..10]);
    }

    #[test]
    fn render_callback_receives_current_page() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut view = PaginatedListView::new(rows(12));

        view.render();
        assert!(seen.borrow().is_empty());

        view.set_render_callback(move |page: &[Row]| {
            sink.borrow_mut().push(ids(page));
        });
        assert!(seen.borrow().is_empty());

        view.set_page(2);
        assert_eq!(seen.borrow().as_slice(), &[vec![10, 11]]);
    }

    #[test]
    fn later_render_callback_replaces_earlier() {
        let first = Rc::new(RefCell::new(0));
        let second = Rc::new(RefCell::new(0));
        let mut view = PaginatedListView::new(rows(3));

        let counter = first.clone();
        view.set_render_callback(move |_| *counter.borrow_mut() += 1);
        view.render();

        let counter = second.clone();
        view.set_render_callback(move |_| *counter.borrow_mut() += 1);
        view.render();
        view.render();

        assert_eq!(*first.borrow(), 1);
        assert_eq!(*second.borrow(), 2);
    }

    #[test]
    fn navigation_window_is_centred_with_edges() {
        let pages: Vec<NavItem> = navigation_items(6, 12);
        assert_eq!(
            pages,
            vec![
                NavItem::Previous { enabled: true },
                NavItem::Page {
                    number: 1,
                    active: false
                },
                NavItem::Ellipsis,
                NavItem::Page {
                    number: 4,
                    active: false
                },
                NavItem::Page {
                    number: 5,
                    active: false
                },
                NavItem::Page {
                    number: 6,
                    active: true
                },
                NavItem::Page {
                    number: 7,
                    active: false
                },
                NavItem::Page {
                    number: 8,
                    active: false
                },
                NavItem::Ellipsis,
                NavItem::Page {
                    number: 12,
                    active: false
                },
                NavItem::Next { enabled: true },
            ]
        );
    }

    #[test]
    fn navigation_window_sticks_to_the_ends() {
        let numbers = |items: Vec<NavItem>| -> Vec<Option<usize>> {
            items
                .into_iter()
                .filter_map(|item| match item {
                    NavItem::Page { number, .. } => Some(Some(number)),
                    NavItem::Ellipsis => Some(None),
                    _ => None,
                })
                .collect()
        };

        assert_eq!(
            numbers(navigation_items(1, 10)),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(10)]
        );
        assert_eq!(
            numbers(navigation_items(10, 10)),
            vec![Some(1), None, Some(6), Some(7), Some(8), Some(9), Some(10)]
        );
        assert_eq!(
            numbers(navigation_items(2, 6)),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]
        );
    }

    #[test]
    fn nav_targets_follow_current_page() {
        assert_eq!(NavItem::Previous { enabled: true }.target_page(3), Some(2));
        assert_eq!(NavItem::Previous { enabled: false }.target_page(1), None);
        assert_eq!(NavItem::Next { enabled: true }.target_page(3), Some(4));
        assert_eq!(
            NavItem::Page {
                number: 5,
                active: false
            }
            .target_page(3),
            Some(5)
        );
        assert_eq!(NavItem::Ellipsis.target_page(3), None);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let error = PageSize::entries(0).expect_err("zero page size");
        assert!(matches!(error, Error::InvalidArgument { .. }));
        assert_eq!(PageSize::default(), entries(10));
        assert_eq!(PageSize::OPTIONS[4].to_string(), "All");
        assert_eq!(PageSize::OPTIONS[1].to_string(), "25");
    }
}
