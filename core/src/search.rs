use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;

use crate::pagination::FilterPredicate;

/// Records that can be matched against a free-text search box.
pub trait Searchable {
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

/// Shared handle to the text currently typed into a search box.
///
/// Clones observe the same value, so a predicate built from one handle sees
/// edits made through another at the next render.
#[derive(Debug, Clone, Default)]
pub struct SearchTerm {
    value: Rc<RefCell<String>>,
}

impl SearchTerm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: impl Into<String>) {
        *self.value.borrow_mut() = value.into();
    }

    pub fn get(&self) -> String {
        self.value.borrow().clone()
    }

    pub fn clear(&self) {
        self.value.borrow_mut().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.value.borrow().trim().is_empty()
    }

    /// Case-insensitive substring match. A blank term matches everything.
    pub fn matches<T: Searchable + ?Sized>(&self, record: &T) -> bool {
        let needle = self.value.borrow().trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn predicate<T: Searchable + 'static>(&self) -> FilterPredicate<T> {
        let term = self.clone();
        Box::new(move |record: &T| term.matches(record))
    }
}

/// Keeps records whose date falls within `[start, end]`. Either bound being
/// absent disables the filter entirely; records without a date never match an
/// active range.
pub fn filter_by_date_range<T: Clone>(
    records: &[T],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    date_of: impl Fn(&T) -> Option<NaiveDate>,
) -> Vec<T> {
    let (Some(start), Some(end)) = (start, end) else {
        return records.to_vec();
    };

    records
        .iter()
        .filter(|record| date_of(*record).is_some_and(|date| date >= start && date <= end))
        .cloned()
        .collect()
}
