use std::fmt;
use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::aliases;
use super::fields::{
    coerce_text, extract_array, extract_scalar, find_values, get_ignore_case, scopes, RawRecord,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Backgrounds {
    pub personal: Option<String>,
    pub professional: Option<String>,
    pub academic: Option<String>,
}

impl Backgrounds {
    fn is_empty(&self) -> bool {
        self.personal.is_none() && self.professional.is_none() && self.academic.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extras {
    pub computer: Option<String>,
    pub fun_fact: Option<String>,
}

pub const DEFAULT_MASCOT_DIVIDER: &str = "||";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mascot {
    pub name: String,
    pub divider: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Course {
    Plain(String),
    Detailed {
        code: Option<String>,
        title: Option<String>,
        reason: Option<String>,
    },
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Course::Plain(text) => f.write_str(text),
            Course::Detailed {
                code,
                title,
                reason,
            } => {
                let head = [code.as_deref(), title.as_deref()]
                    .into_iter()
                    .flatten()
                    .join(" - ");
                f.write_str(&head)?;
                if let Some(reason) = reason {
                    if head.is_empty() {
                        f.write_str(reason)?;
                    } else {
                        write!(f, ": {reason}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn image_candidate(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(map) => ["url", "guid", "src"]
            .into_iter()
            .filter_map(|k| map.get(k))
            .find_map(coerce_text)
            .map(|s| s.trim().to_string()),
        _ => None,
    }
}

/// Turns a site-relative path into an absolute URL on `origin`.
pub fn absolutize(url: &str, origin: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else if url.starts_with('/') {
        format!("{}{url}", origin.trim_end_matches('/'))
    } else {
        url.to_string()
    }
}

/// Profile image, preferring a `media.src` descriptor over the plain image keys.
pub fn resolve_image(record: &RawRecord, origin: &str) -> Option<String> {
    let from_media = scopes(record).find_map(|scope| {
        scope
            .get(aliases::MEDIA)
            .and_then(Value::as_object)
            .and_then(|media| media.get("src"))
            .and_then(image_candidate)
    });
    let raw = from_media.or_else(|| {
        find_values(record, aliases::IMAGE)
            .into_iter()
            .find_map(image_candidate)
    })?;
    Some(absolutize(&raw, origin))
}

fn http_url(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| s.starts_with("http"))
        .map(str::to_string)
}

fn container_links(container: &Value) -> Vec<Link> {
    match container {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|item| {
                let url = ["url", "href"]
                    .into_iter()
                    .filter_map(|k| item.get(k))
                    .find_map(http_url)?;
                let label = ["label", "name", "title"]
                    .into_iter()
                    .filter_map(|k| item.get(k))
                    .find_map(coerce_text)
                    .unwrap_or_else(|| "Link".to_string());
                Some(Link { label, url })
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(label, value)| {
                http_url(value).map(|url| Link {
                    label: label.clone(),
                    url,
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Outbound links in label-table order, unique by URL.
pub fn resolve_links(record: &RawRecord) -> Vec<Link> {
    let mut links: Vec<Link> = Vec::new();
    for (label, keys) in aliases::LINKS {
        for value in find_values(record, keys) {
            if let Some(url) = http_url(value) {
                links.push(Link {
                    label: label.to_string(),
                    url,
                });
            }
        }
    }
    for scope in scopes(record) {
        if let Some(container) = scope.get(aliases::LINK_CONTAINER) {
            links.extend(container_links(container));
        }
    }
    links.into_iter().unique_by(|link| link.url.clone()).collect()
}

fn backgrounds_from_object(map: &Map<String, Value>) -> Backgrounds {
    let read = |key: &str| get_ignore_case(map, key).and_then(coerce_text);
    Backgrounds {
        personal: read("personal"),
        professional: read("professional"),
        academic: read("academic"),
    }
}

fn background_container(record: &RawRecord) -> Option<Map<String, Value>> {
    for scope in scopes(record) {
        for key in aliases::BACKGROUND_CONTAINER {
            let Some(value) = get_ignore_case(scope, key) else {
                continue;
            };
            match value {
                Value::Object(map) => return Some(map.clone()),
                Value::String(s) if s.trim_start().starts_with('{') => {
                    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(s.trim()) {
                        return Some(map);
                    }
                }
                _ => {}
            }
        }
    }
    None
}

/// Personal, professional and academic background. Reads a single
/// `background(s)` object first, then the flat legacy keys.
pub fn resolve_backgrounds(record: &RawRecord) -> Option<Backgrounds> {
    let nested = background_container(record)
        .map(|map| backgrounds_from_object(&map))
        .filter(|b| !b.is_empty());
    let backgrounds = nested.unwrap_or_else(|| Backgrounds {
        personal: extract_scalar(record, aliases::PERSONAL_BACKGROUND),
        professional: extract_scalar(record, aliases::PROFESSIONAL_BACKGROUND),
        academic: extract_scalar(record, aliases::ACADEMIC_BACKGROUND),
    });
    Some(backgrounds).filter(|b| !b.is_empty())
}

fn course_code_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z]{3,4})[ -]?(\d{3,4}[A-Z]?)\b\s*(.*)$").ok())
        .as_ref()
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn course_from_str(raw: &str) -> Option<Course> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let Some(caps) = course_code_re().and_then(|re| re.captures(raw)) else {
        return Some(Course::Plain(raw.to_string()));
    };
    let code = format!("{} {}", &caps[1], &caps[2]);
    let rest = caps[3].trim_start_matches(|c: char| {
        matches!(c, '-' | ':' | '\u{2013}' | '\u{2014}') || c.is_whitespace()
    });
    let (title, reason) = match rest.split_once(':') {
        Some((title, reason)) => (non_empty(title), non_empty(reason)),
        None => (non_empty(rest), None),
    };
    Some(Course::Detailed {
        code: Some(code),
        title,
        reason,
    })
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find_map(coerce_text)
        .map(|s| s.trim().to_string())
}

fn course_from_object(map: &Map<String, Value>) -> Option<Course> {
    let code = first_text(map, &["code", "course_code"]).or_else(|| {
        let dept = first_text(map, &["dept", "department"])?;
        let num = first_text(map, &["num", "number"])?;
        Some(format!("{dept} {num}"))
    });
    let title = first_text(map, &["title", "course_title", "name", "course_name"]);
    let reason = first_text(map, &["reason", "course_reason", "why"]);
    if code.is_none() && title.is_none() && reason.is_none() {
        return None;
    }
    Some(Course::Detailed {
        code,
        title,
        reason,
    })
}

fn literal_course(value: &Value) -> Option<Course> {
    let text: String = value
        .to_string()
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '[' | ']' | '"'))
        .collect();
    non_empty(&text).map(Course::Plain)
}

/// Courses in listed order. Strings get their leading course code split
/// off, objects are read field by field, anything else is shown literally.
pub fn resolve_courses(record: &RawRecord) -> Vec<Course> {
    extract_array(record, aliases::COURSES)
        .iter()
        .filter_map(|entry| match entry {
            Value::Null => None,
            Value::String(s) => course_from_str(s),
            Value::Object(map) => course_from_object(map).or_else(|| literal_course(entry)),
            other => literal_course(other),
        })
        .collect()
}

pub fn resolve_extras(record: &RawRecord) -> Option<Extras> {
    let extras = Extras {
        computer: extract_scalar(record, aliases::COMPUTER),
        fun_fact: extract_scalar(record, aliases::FUN_FACT),
    };
    (extras.computer.is_some() || extras.fun_fact.is_some()).then_some(extras)
}

pub fn resolve_mascot(record: &RawRecord) -> Option<Mascot> {
    let raw = find_values(record, aliases::MASCOT)
        .into_iter()
        .find(|v| coerce_text(v).is_some())?;
    let nested_divider = raw
        .as_object()
        .and_then(|map| first_text(map, aliases::MASCOT_DIVIDER));
    let name = match raw {
        Value::Object(map) => first_text(map, &["name", "mascot"]).or_else(|| coerce_text(raw))?,
        other => coerce_text(other)?.trim().to_string(),
    };
    let divider = nested_divider
        .or_else(|| extract_scalar(record, aliases::MASCOT_DIVIDER))
        .unwrap_or_else(|| DEFAULT_MASCOT_DIVIDER.to_string());
    Some(Mascot { name, divider })
}
