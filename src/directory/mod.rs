pub mod view;

use std::fmt::Display;
use std::num::NonZeroUsize;

use crate::normalizer::NormalizedStudent;

pub use view::{
    matches_term, paginate, parse_fields_csv, search, total_pages, Field, PageSlice, ViewState,
    DEFAULT_ITEMS_PER_PAGE,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// The slice of the directory currently on screen.
#[derive(Clone, Debug)]
pub struct DirectoryPage<'a> {
    pub students: Vec<&'a NormalizedStudent>,
    pub page: usize,
    pub total_pages: usize,
    /// Records that passed the search filter, across all pages.
    pub total_matches: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Owns the fetched students and the view state for a single visit.
#[derive(Clone, Debug)]
pub struct Directory {
    students: Vec<NormalizedStudent>,
    load_state: LoadState,
    view: ViewState,
    initial_view: ViewState,
}

impl Directory {
    pub fn new(items_per_page: NonZeroUsize) -> Self {
        Self::with_view(ViewState::new(items_per_page))
    }

    pub fn with_view(view: ViewState) -> Self {
        Self {
            students: Vec::new(),
            load_state: LoadState::Loading,
            initial_view: view.clone(),
            view,
        }
    }

    /// Records the outcome of the one fetch a visit makes. A failure is
    /// terminal for the visit and keeps the user-facing message.
    pub fn finish_loading<E: Display>(&mut self, result: Result<Vec<NormalizedStudent>, E>) {
        match result {
            Ok(students) => {
                self.students = students;
                self.load_state = LoadState::Ready;
            }
            Err(e) => {
                self.students.clear();
                self.load_state = LoadState::Failed(format!("Failed to load data. {e}"));
            }
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn students(&self) -> &[NormalizedStudent] {
        &self.students
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view.set_search_term(term);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.view.set_page(page);
    }

    /// Returns false without moving when already on the last page.
    pub fn next_page(&mut self) -> bool {
        let page = self.visible();
        if !page.has_next {
            return false;
        }
        let next = page.page + 1;
        self.view.set_page(next);
        true
    }

    /// Returns false without moving when already on the first page.
    pub fn previous_page(&mut self) -> bool {
        let current = self.view.current_page();
        if current <= 1 {
            return false;
        }
        self.view.set_page(current - 1);
        true
    }

    pub fn set_items_per_page(&mut self, items_per_page: NonZeroUsize) {
        self.view.set_items_per_page(items_per_page);
    }

    pub fn toggle_field(&mut self, field: Field) {
        self.view.toggle_field(field);
    }

    pub fn is_visible(&self, field: Field) -> bool {
        self.view.is_visible(field)
    }

    pub fn filtered(&self) -> Vec<&NormalizedStudent> {
        search(&self.students, self.view.search_term())
    }

    pub fn visible(&self) -> DirectoryPage<'_> {
        let filtered = self.filtered();
        let slice = paginate(
            &filtered,
            self.view.current_page(),
            self.view.items_per_page(),
        );
        DirectoryPage {
            students: slice.items.to_vec(),
            page: slice.page,
            total_pages: slice.total_pages,
            total_matches: slice.total_items,
            has_previous: slice.has_previous(),
            has_next: slice.has_next(),
        }
    }

    /// Leaving the page: drop the data and start over from the initial view.
    pub fn reset(&mut self) {
        self.students.clear();
        self.load_state = LoadState::Loading;
        self.view = self.initial_view.clone();
    }
}
