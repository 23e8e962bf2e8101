use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;

use crate::normalizer::NormalizedStudent;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// A card section that can be hidden without touching the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    Introduction,
    Quote,
    Courses,
    Links,
    Image,
    Backgrounds,
    Extras,
    Mascot,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Email,
        Field::Introduction,
        Field::Quote,
        Field::Courses,
        Field::Links,
        Field::Image,
        Field::Backgrounds,
        Field::Extras,
        Field::Mascot,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "email" => Some(Self::Email),
            "introduction" | "intro" => Some(Self::Introduction),
            "quote" => Some(Self::Quote),
            "courses" | "course" => Some(Self::Courses),
            "links" | "link" => Some(Self::Links),
            "image" | "avatar" => Some(Self::Image),
            "backgrounds" | "background" => Some(Self::Backgrounds),
            "extras" => Some(Self::Extras),
            "mascot" => Some(Self::Mascot),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Introduction => "introduction",
            Self::Quote => "quote",
            Self::Courses => "courses",
            Self::Links => "links",
            Self::Image => "image",
            Self::Backgrounds => "backgrounds",
            Self::Extras => "extras",
            Self::Mascot => "mascot",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn parse_fields_csv(value: &str) -> Result<Vec<Field>, String> {
    let mut out: Vec<Field> = Vec::new();
    for part in value.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        let field = Field::parse(item).ok_or_else(|| format!("unknown field '{item}'"))?;
        if !out.contains(&field) {
            out.push(field);
        }
    }
    Ok(out)
}

/// Search, page and visibility state for one directory visit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    search_term: String,
    current_page: usize,
    items_per_page: NonZeroUsize,
    field_toggles: BTreeMap<Field, bool>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_ITEMS_PER_PAGE).unwrap_or(NonZeroUsize::MIN))
    }
}

impl ViewState {
    pub fn new(items_per_page: NonZeroUsize) -> Self {
        Self {
            search_term: String::new(),
            current_page: 1,
            items_per_page,
            field_toggles: Field::ALL.into_iter().map(|f| (f, true)).collect(),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> NonZeroUsize {
        self.items_per_page
    }

    pub fn field_toggles(&self) -> &BTreeMap<Field, bool> {
        &self.field_toggles
    }

    /// Any edit to the term sends the view back to the first page.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    /// Moves to `page` as given. Out-of-range pages are not clamped; they
    /// simply yield an empty slice.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Changing the page size starts over from the first page.
    pub fn set_items_per_page(&mut self, items_per_page: NonZeroUsize) {
        self.items_per_page = items_per_page;
        self.current_page = 1;
    }

    pub fn toggle_field(&mut self, field: Field) {
        let visible = self.field_toggles.entry(field).or_insert(true);
        *visible = !*visible;
    }

    pub fn is_visible(&self, field: Field) -> bool {
        self.field_toggles.get(&field).copied().unwrap_or(true)
    }
}

fn contains_term(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

pub fn matches_term(student: &NormalizedStudent, term: &str) -> bool {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    contains_term(Some(&student.name), &needle)
        || contains_term(Some(&student.email), &needle)
        || contains_term(student.introduction.as_deref(), &needle)
        || contains_term(student.quote.as_ref().map(|q| q.text.as_str()), &needle)
}

/// Case-insensitive substring filter over name, email, introduction and
/// quote text. Keeps input order; an empty term keeps everything.
pub fn search<'a>(records: &'a [NormalizedStudent], term: &str) -> Vec<&'a NormalizedStudent> {
    records.iter().filter(|s| matches_term(s, term)).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSlice<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> PageSlice<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn total_pages(count: usize, page_size: NonZeroUsize) -> usize {
    let size = page_size.get();
    count / size + usize::from(count % size != 0)
}

/// One-based page `page` of `records`.
pub fn paginate<T>(records: &[T], page: usize, page_size: NonZeroUsize) -> PageSlice<'_, T> {
    let size = page_size.get();
    let start = page.saturating_sub(1).saturating_mul(size).min(records.len());
    let end = start.saturating_add(size).min(records.len());
    PageSlice {
        items: &records[start..end],
        page,
        total_pages: total_pages(records.len(), page_size),
        total_items: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{NormalizedStudent, Quote};

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn student(name: &str, intro: Option<&str>, quote: Option<&str>) -> NormalizedStudent {
        NormalizedStudent {
            id: name.to_string(),
            name: name.to_string(),
            email: format!("{}@charlotte.edu", name.to_lowercase()),
            introduction: intro.map(str::to_string),
            quote: quote.map(|q| Quote {
                text: q.to_string(),
                author: None,
            }),
            courses: Vec::new(),
            links: Vec::new(),
            image: None,
            backgrounds: None,
            extras: None,
            mascot: None,
        }
    }

    #[test]
    fn paginate_23_records_by_10() {
        let records: Vec<usize> = (0..23).collect();
        let p1 = paginate(&records, 1, size(10));
        let p2 = paginate(&records, 2, size(10));
        let p3 = paginate(&records, 3, size(10));
        assert_eq!(p1.total_pages, 3);
        assert_eq!(p1.items.len(), 10);
        assert_eq!(p2.items.len(), 10);
        assert_eq!(p3.items, &[20, 21, 22]);
        assert!(!p1.has_previous());
        assert!(p3.has_previous());
        assert!(!p3.has_next());
    }

    #[test]
    fn paginate_empty_and_out_of_range() {
        let empty: Vec<u8> = Vec::new();
        let p = paginate(&empty, 1, size(10));
        assert_eq!(p.total_pages, 0);
        assert!(p.items.is_empty());

        let records = [1, 2, 3];
        let far = paginate(&records, 9, size(2));
        assert!(far.items.is_empty());
        assert_eq!(far.page, 9);
        assert_eq!(far.total_pages, 2);
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let records = vec![
            student("Ann", Some("I like Rust"), None),
            student("Bob", None, Some("Carpe DIEM")),
            student("Cy", None, None),
        ];
        let names = |term: &str| -> Vec<String> {
            search(&records, term).iter().map(|s| s.name.clone()).collect()
        };
        assert_eq!(names("rust"), vec!["Ann"]);
        assert_eq!(names("diem"), vec!["Bob"]);
        assert_eq!(names("CY@"), vec!["Cy"]);
        assert_eq!(names(""), vec!["Ann", "Bob", "Cy"]);
        assert!(names("zzz").is_empty());
    }

    #[test]
    fn search_is_idempotent() {
        let records = vec![
            student("Anna", None, None),
            student("Joanna", None, None),
            student("Bo", None, None),
        ];
        let first = search(&records, "anna");
        let second = search(&records, "anna");
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn search_term_change_resets_page() {
        let mut view = ViewState::default();
        view.set_page(3);
        assert_eq!(view.current_page(), 3);
        view.set_search_term("ann");
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.search_term(), "ann");
    }

    #[test]
    fn toggles_default_on_and_flip() {
        let mut view = ViewState::default();
        assert!(Field::ALL.iter().all(|f| view.is_visible(*f)));
        view.toggle_field(Field::Quote);
        assert!(!view.is_visible(Field::Quote));
        view.toggle_field(Field::Quote);
        assert!(view.is_visible(Field::Quote));
    }

    #[test]
    fn parse_fields_csv_rejects_unknown_names() {
        assert_eq!(
            parse_fields_csv("quote, Courses,quote").unwrap(),
            vec![Field::Quote, Field::Courses]
        );
        assert!(parse_fields_csv("quote,shoe_size").is_err());
    }
}
