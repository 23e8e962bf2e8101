pub mod report;

use std::sync::OnceLock;

use colored::Colorize;
use itertools::Itertools;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::directory::{DirectoryPage, Field, ViewState};
use crate::normalizer::NormalizedStudent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Serializable snapshot of the visible page, hidden fields removed.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryReport {
    pub source: String,
    pub search: String,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub items_per_page: usize,
    pub hidden_fields: Vec<String>,
    pub students: Vec<Value>,
}

fn hidden_fields(view: &ViewState) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|f| !view.is_visible(*f))
        .collect()
}

fn student_value(student: &NormalizedStudent, hidden: &[Field]) -> Value {
    let mut value = serde_json::to_value(student).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        for field in hidden {
            map.remove(field.as_str());
        }
    }
    value
}

pub fn build_report(source: &str, page: &DirectoryPage<'_>, view: &ViewState) -> DirectoryReport {
    let hidden = hidden_fields(view);
    DirectoryReport {
        source: source.to_string(),
        search: view.search_term().to_string(),
        page: page.page,
        total_pages: page.total_pages,
        total_matches: page.total_matches,
        items_per_page: view.items_per_page().get(),
        hidden_fields: hidden.iter().map(|f| f.as_str().to_string()).collect(),
        students: page
            .students
            .iter()
            .map(|s| student_value(s, &hidden))
            .collect(),
    }
}

pub fn render_json(report: &DirectoryReport) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(report).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}

/// Display label for a course path segment, `itis-3135` -> `ITIS 3135`.
pub fn course_label(course: &str) -> String {
    course
        .split(['-', '_', ' '])
        .filter(|part| !part.is_empty())
        .map(str::to_uppercase)
        .join(" ")
}

/// Pills shown under a card. Students without courses get their email and
/// the directory's own course instead.
pub fn card_tags(s: &NormalizedStudent, view: &ViewState, course_label: &str) -> Vec<String> {
    if !s.courses.is_empty() {
        return s.courses.iter().map(ToString::to_string).collect();
    }
    let email = Some(s.email.clone()).filter(|_| view.is_visible(Field::Email));
    email
        .into_iter()
        .chain(Some(course_label.to_string()))
        .filter(|tag| !tag.trim().is_empty())
        .collect()
}

fn tag_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").ok()).as_ref()
}

/// Drops markup from API-supplied introductions for terminal display.
pub fn strip_tags(value: &str) -> String {
    let stripped = match tag_re() {
        Some(re) => re.replace_all(value, " ").to_string(),
        None => value.to_string(),
    };
    stripped.split_whitespace().join(" ")
}

fn push_line(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("  {} {}\n", format!("{label}:").bold().yellow(), value));
}

fn render_card(out: &mut String, s: &NormalizedStudent, view: &ViewState, course_label: &str) {
    out.push_str(&format!("{}", s.name.bold().white()));
    if view.is_visible(Field::Email) {
        out.push_str(&format!("  <{}>", s.email.cyan()));
    }
    out.push('\n');

    if view.is_visible(Field::Image) {
        if let Some(image) = &s.image {
            push_line(out, "Image", image);
        }
    }

    let intro = s
        .introduction
        .as_deref()
        .map(strip_tags)
        .filter(|i| !i.is_empty())
        .filter(|_| view.is_visible(Field::Introduction));
    let quote = s.quote.as_ref().filter(|_| view.is_visible(Field::Quote));
    if let Some(intro) = &intro {
        out.push_str(&format!("  {intro}\n"));
    }
    if let Some(quote) = quote {
        out.push_str(&format!("  {}", format!("\"{}\"", quote.text).italic()));
        if let Some(author) = &quote.author {
            out.push_str(&format!(" - {}", author.yellow()));
        }
        out.push('\n');
    }
    let details_shown = view.is_visible(Field::Introduction) || view.is_visible(Field::Quote);
    if intro.is_none() && quote.is_none() && details_shown {
        out.push_str(&format!("  {}\n", "No details provided.".dimmed()));
    }

    if view.is_visible(Field::Courses) {
        let tags = card_tags(s, view, course_label);
        if !tags.is_empty() {
            push_line(out, "Courses", &tags.join(" | "));
        }
    }
    if view.is_visible(Field::Links) && !s.links.is_empty() {
        let links = s
            .links
            .iter()
            .map(|l| format!("{} {}", l.label, l.url))
            .join(", ");
        push_line(out, "Links", &links);
    }
    if view.is_visible(Field::Backgrounds) {
        if let Some(b) = &s.backgrounds {
            for (label, value) in [
                ("Personal", &b.personal),
                ("Professional", &b.professional),
                ("Academic", &b.academic),
            ] {
                if let Some(value) = value {
                    push_line(out, label, value);
                }
            }
        }
    }
    if view.is_visible(Field::Extras) {
        if let Some(extras) = &s.extras {
            if let Some(computer) = &extras.computer {
                push_line(out, "Computer", computer);
            }
            if let Some(fun_fact) = &extras.fun_fact {
                push_line(out, "Fun fact", fun_fact);
            }
        }
    }
    if view.is_visible(Field::Mascot) {
        if let Some(mascot) = &s.mascot {
            push_line(
                out,
                "Mascot",
                &format!("{} {} {}", s.name, mascot.divider, mascot.name),
            );
        }
    }
}

/// Terminal rendering of one page: count line, cards, then the page footer
/// when results span more than one page.
pub fn render_text(page: &DirectoryPage<'_>, view: &ViewState, course_label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n\n",
        page.total_matches.to_string().bold().cyan(),
        "Students".bold().white()
    ));

    if page.total_matches == 0 {
        out.push_str(&format!("{}\n", "No students found.".yellow()));
        return out;
    }

    for (i, student) in page.students.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_card(&mut out, student, view, course_label);
    }

    if page.total_matches > view.items_per_page().get() {
        out.push('\n');
        out.push_str(&format!(
            "{} Page {} of {} {}\n",
            if page.has_previous { "<" } else { " " },
            page.page,
            page.total_pages,
            if page.has_next { ">" } else { " " },
        ));
    }
    out
}

pub fn render_html(
    report_title: &str,
    course_label: &str,
    page: &DirectoryPage<'_>,
    view: &ViewState,
) -> Vec<u8> {
    report::render_html(report_title, course_label, page, view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::normalizer::Normalizer;
    use serde_json::json;
    use std::num::NonZeroUsize;

    fn directory(raw: Vec<Value>, per_page: usize) -> Directory {
        let mut dir = Directory::new(NonZeroUsize::new(per_page).unwrap());
        dir.finish_loading::<String>(Ok(Normalizer::default().normalize_all(&raw)));
        dir
    }

    #[test]
    fn format_parsing_and_inference() {
        assert_eq!(OutputFormat::parse(" JSON "), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert_eq!(infer_format_from_path("out/Class.HTML"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("out.csv"), None);
    }

    #[test]
    fn strip_tags_collapses_markup() {
        assert_eq!(strip_tags("<p>Howdy <b>there</b></p>\n<p>friend</p>"), "Howdy there friend");
    }

    #[test]
    fn report_omits_hidden_fields() {
        let mut dir = directory(vec![json!({ "name": "Ann Lee", "quote": "Hi" })], 10);
        dir.toggle_field(Field::Quote);
        let report = build_report("test", &dir.visible(), dir.view());
        assert_eq!(report.hidden_fields, vec!["quote"]);
        let student = report.students[0].as_object().unwrap();
        assert!(!student.contains_key("quote"));
        assert_eq!(student["email"], json!("alee@charlotte.edu"));
    }

    #[test]
    fn text_shows_placeholders_and_footer() {
        colored::control::set_override(false);
        let raw: Vec<Value> = (0..3).map(|i| json!({ "name": format!("S {i}") })).collect();
        let dir = directory(raw, 2);
        let text = render_text(&dir.visible(), dir.view(), "ITIS 3135");
        assert!(text.starts_with("3 Students"));
        assert!(text.contains("No details provided."));
        assert!(text.contains("Page 1 of 2 >"));

        let empty = directory(Vec::new(), 2);
        assert!(render_text(&empty.visible(), empty.view(), "ITIS 3135")
            .contains("No students found."));
    }

    #[test]
    fn course_label_from_path_segment() {
        assert_eq!(course_label("itis-3135"), "ITIS 3135");
        assert_eq!(course_label(" itcs_3160 "), "ITCS 3160");
        assert_eq!(course_label(""), "");
    }

    #[test]
    fn students_without_courses_get_fallback_tags() {
        colored::control::set_override(false);
        let mut dir = directory(
            vec![
                json!({ "name": "Ann Lee" }),
                json!({ "name": "Bo Park", "courses": ["ITSC 1212"] }),
            ],
            10,
        );
        let page = dir.visible();
        assert_eq!(
            card_tags(page.students[0], dir.view(), "ITIS 3135"),
            vec!["alee@charlotte.edu", "ITIS 3135"]
        );
        assert_eq!(
            card_tags(page.students[1], dir.view(), "ITIS 3135"),
            vec!["ITSC 1212"]
        );
        let text = render_text(&page, dir.view(), "ITIS 3135");
        assert!(text.contains("Courses: alee@charlotte.edu | ITIS 3135"));

        dir.toggle_field(Field::Email);
        let page = dir.visible();
        assert_eq!(card_tags(page.students[0], dir.view(), "ITIS 3135"), vec!["ITIS 3135"]);
    }
}
