use std::num::NonZeroUsize;

use serde_json::{json, Value};

use crate::directory::{paginate, search, Directory, Field, LoadState};
use crate::fetcher::{extract_records, FetchError};
use crate::normalizer::{
    clean_quote_text, generate_email, parse_quote_field, NormalizeOptions, Normalizer,
};
use crate::output::{build_report, render_text};

fn per_page(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn normalize(raw: Value) -> crate::normalizer::NormalizedStudent {
    Normalizer::default().normalize(raw.as_object().unwrap(), 0)
}

#[test]
fn record_without_known_keys_still_normalizes() {
    let s = normalize(json!({ "shoe_size": 11 }));
    assert_eq!(s.id, "0");
    assert_eq!(s.name, "Anonymous");
    assert_eq!(s.email, "No Email");
    assert!(s.introduction.is_none());
    assert!(s.quote.is_none());
    assert!(s.courses.is_empty());
    assert!(s.links.is_empty());
    assert!(s.image.is_none());
    assert!(s.backgrounds.is_none());
    assert!(s.extras.is_none());
    assert!(s.mascot.is_none());
}

#[test]
fn generated_emails_follow_initial_and_last_name() {
    assert_eq!(generate_email("Jane Doe", "charlotte.edu"), "jdoe@charlotte.edu");
    assert_eq!(
        generate_email("Mary Ann O'Neil", "charlotte.edu"),
        "moneil@charlotte.edu"
    );
    assert_eq!(generate_email("", "charlotte.edu"), "No Email");
}

#[test]
fn quotes_lose_wrapping_marks_and_split_authors() {
    assert_eq!(clean_quote_text("  \u{201c}Hello\u{201d} "), "Hello");

    let q = parse_quote_field(r#"{"text": "\"Stay hungry\"", "author": "Steve Jobs"}"#, None);
    assert_eq!(q.text, "Stay hungry");
    assert_eq!(q.author.as_deref(), Some("Steve Jobs"));

    let q = parse_quote_field("Just text", Some("Someone"));
    assert_eq!(q.text, "Just text");
    assert_eq!(q.author.as_deref(), Some("Someone"));
}

#[test]
fn wrapped_records_are_found_in_nested_scopes() {
    let s = normalize(json!({
        "acf": { "Favorite Quote": "Be kind" },
        "data": { "full_name": "Ivy Stone", "image": "/uploads/ivy.png" }
    }));
    assert_eq!(s.name, "Ivy Stone");
    assert_eq!(s.quote.unwrap().text, "Be kind");
    assert_eq!(
        s.image.as_deref(),
        Some("https://dvonb.xyz/uploads/ivy.png")
    );
}

#[test]
fn relative_images_follow_the_configured_origin() {
    let normalizer = Normalizer::new(NormalizeOptions {
        api_origin: "http://localhost:8080".to_string(),
        ..NormalizeOptions::default()
    });
    let record = json!({ "image": "/media/a.jpg" });
    let s = normalizer.normalize(record.as_object().unwrap(), 0);
    assert_eq!(s.image.as_deref(), Some("http://localhost:8080/media/a.jpg"));

    let record = json!({ "image": "https://cdn.example.com/a.jpg" });
    let s = normalizer.normalize(record.as_object().unwrap(), 0);
    assert_eq!(s.image.as_deref(), Some("https://cdn.example.com/a.jpg"));
}

#[test]
fn twenty_three_records_make_three_pages() {
    let records: Vec<u32> = (0..23).collect();
    let sizes: Vec<usize> = (1..=3)
        .map(|p| paginate(&records, p, per_page(10)).items.len())
        .collect();
    assert_eq!(sizes, vec![10, 10, 3]);
    assert_eq!(paginate(&records, 1, per_page(10)).total_pages, 3);
}

#[test]
fn search_keeps_order_and_is_stable() {
    let raw = json!([
        { "name": "Zed Rust" },
        { "name": "Amy Cole", "introduction": "I write rust daily" },
        { "name": "Bo Park" }
    ]);
    let students = Normalizer::default().normalize_all(&extract_records(raw));
    let once: Vec<&str> = search(&students, "RUST")
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(once, vec!["Zed Rust", "Amy Cole"]);

    let again: Vec<&str> = search(&students, "RUST")
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(once, again);
}

#[test]
fn end_to_end_three_records() {
    let payload = json!({
        "data": [
            { "id": 7, "name": "Ann Lee", "quote": "\u{201c}Keep going\u{201d}", "quote_author": "Mom" },
            { "id": 8, "name": "Raj Patel", "email": "raj@uncc.edu", "courses": "ITIS 3135, ITSC 1212" },
            { "id": 9, "first_name": "Kim", "last_name": "Ng", "links": { "github": "https://github.com/kimng" } }
        ]
    });
    let students = Normalizer::default().normalize_all(&extract_records(payload));
    assert_eq!(students.len(), 3);

    let ann = &students[0];
    assert_eq!(ann.id, "7");
    assert_eq!(ann.email, generate_email("Ann Lee", "charlotte.edu"));
    let quote = ann.quote.as_ref().unwrap();
    assert_eq!(quote.text, "Keep going");
    assert_eq!(quote.author.as_deref(), Some("Mom"));

    assert_eq!(students[1].email, "raj@uncc.edu");
    assert_eq!(students[1].courses.len(), 2);

    assert_eq!(students[2].name, "Kim Ng");
    assert_eq!(students[2].links.len(), 1);
    assert_eq!(students[2].links[0].url, "https://github.com/kimng");

    let mut dir = Directory::new(per_page(2));
    dir.finish_loading::<FetchError>(Ok(students));
    assert_eq!(dir.load_state(), &LoadState::Ready);
    dir.toggle_field(Field::Email);

    let page = dir.visible();
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next);

    let report = build_report("fixture", &page, dir.view());
    assert_eq!(report.students.len(), 2);
    assert!(report.students[0].get("email").is_none());

    colored::control::set_override(false);
    let text = render_text(&page, dir.view(), "ITIS 3135");
    assert!(text.starts_with("3 Students"));
    assert!(text.contains("Page 1 of 2"));
    assert!(!text.contains("raj@uncc.edu"));
}

#[test]
fn failed_fetch_surfaces_status_message() {
    let mut dir = Directory::new(per_page(10));
    dir.finish_loading(Err(FetchError::Status { status: 404 }));
    assert_eq!(
        dir.load_state(),
        &LoadState::Failed("Failed to load data. HTTP error! status: 404".to_string())
    );
    assert_eq!(dir.visible().total_matches, 0);
}
