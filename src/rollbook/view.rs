//! # List View Engine
//!
//! Every list screen (students, attendance roster, bookings, invoices) is the same
//! pipeline: filter the collection by a free-text term, then cut out one page.
//!
//! - Matching is a case-insensitive substring test against the fields a type
//!   exposes through [`Searchable`]. An empty term keeps the whole collection in
//!   its original order.
//! - There is always at least one page, even for an empty result, so navigation
//!   controls stay valid.
//!
//! The screen's own state lives in [`ListState`], a plain serializable struct with
//! pure transitions. Changing the term or the page size sends the user back to
//! page 1. Navigating outside `[1, total_pages]` is refused rather than clamped.

use crate::model::{AttendanceRecord, Booking, Invoice, Record, Student};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Fields the free-text search looks at.
pub trait Searchable {
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

impl Searchable for Student {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.address.as_str()),
            Cow::Borrowed(self.phone.as_str()),
            Cow::Borrowed(self.batch.label()),
        ]
    }
}

impl Searchable for AttendanceRecord {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.student_name.as_str()),
            Cow::Owned(self.date.to_string()),
            Cow::Borrowed(self.status.as_str()),
        ]
    }
}

impl Searchable for Booking {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.student_name.as_str()),
            Cow::Owned(self.date.to_string()),
            Cow::Borrowed(self.status.as_str()),
        ]
    }
}

impl Searchable for Invoice {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.invoice_number.as_str()),
            Cow::Borrowed(self.student_name.as_str()),
        ]
    }
}

impl<T: Searchable> Searchable for Record<T> {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        self.data.search_fields()
    }
}

/// Name and batch only: what the attendance screen filters its roster by.
pub fn roster_fields(student: &Record<Student>) -> Vec<Cow<'_, str>> {
    vec![
        Cow::Borrowed(student.name.as_str()),
        Cow::Borrowed(student.batch.label()),
    ]
}

/// One visible page of a filtered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    /// Number of records that matched the term, across all pages.
    pub total_matches: usize,
}

impl<T> Page<T> {
    /// Page numbers for rendering navigation controls.
    pub fn page_numbers(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.total_pages
    }
}

pub fn total_pages(matches: usize, page_size: usize) -> usize {
    matches.div_ceil(page_size.max(1)).max(1)
}

pub fn filter<'a, T, F>(items: &'a [T], term: &str, fields: F) -> Vec<&'a T>
where
    F: Fn(&'a T) -> Vec<Cow<'a, str>>,
{
    let term = term.to_lowercase();
    if term.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            fields(*item)
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        })
        .collect()
}

/// Filters with a custom field selector, then slices out `page`.
///
/// Pages are 1-based; page 0 and pages past the end hold no items.
pub fn view_by<'a, T, F>(
    items: &'a [T],
    term: &str,
    page: usize,
    page_size: usize,
    fields: F,
) -> Page<&'a T>
where
    F: Fn(&'a T) -> Vec<Cow<'a, str>>,
{
    let filtered = filter(items, term, fields);
    let size = page_size.max(1);
    let total_matches = filtered.len();
    let items = match page.checked_sub(1) {
        Some(index) => filtered
            .into_iter()
            .skip(index.saturating_mul(size))
            .take(size)
            .collect(),
        None => Vec::new(),
    };
    Page {
        items,
        page,
        total_pages: total_pages(total_matches, size),
        total_matches,
    }
}

pub fn view<'a, T: Searchable>(
    items: &'a [T],
    term: &str,
    page: usize,
    page_size: usize,
) -> Page<&'a T> {
    view_by(items, term, page, page_size, |item: &'a T| item.search_fields())
}

/// Search and paging state of one list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListState {
    pub search_term: String,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl ListState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn apply_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    pub fn apply_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Moves to `page` if it exists. Returns whether the page changed hands.
    pub fn apply_page(&mut self, page: usize, total_pages: usize) -> bool {
        if page < 1 || page > total_pages {
            return false;
        }
        self.page = page;
        true
    }

    pub fn view<'a, T: Searchable>(&self, items: &'a [T]) -> Page<&'a T> {
        view(items, &self.search_term, self.page, self.page_size)
    }

    pub fn view_by<'a, T, F>(&self, items: &'a [T], fields: F) -> Page<&'a T>
    where
        F: Fn(&'a T) -> Vec<Cow<'a, str>>,
    {
        view_by(items, &self.search_term, self.page, self.page_size, fields)
    }
}

/// Add/edit form state for one list screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Editor<D> {
    #[default]
    Closed,
    Adding(D),
    Editing(Uuid, D),
}

impl<D> Editor<D> {
    pub fn open_add(&mut self, draft: D) {
        *self = Editor::Adding(draft);
    }

    pub fn open_edit(&mut self, id: Uuid, draft: D) {
        *self = Editor::Editing(id, draft);
    }

    pub fn close(&mut self) {
        *self = Editor::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Editor::Closed)
    }

    /// Id the next save should update; `None` means the save creates.
    pub fn target(&self) -> Option<Uuid> {
        match self {
            Editor::Editing(id, _) => Some(*id),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            Editor::Closed => None,
            Editor::Adding(draft) | Editor::Editing(_, draft) => Some(draft),
        }
    }
}
