//! Turns loosely shaped student objects into [`NormalizedStudent`] values.
//!
//! Nothing in here fails: a field that cannot be found under any alias, or
//! whose value has an unexpected shape, comes out as `None` or empty and the
//! rest of the record is still produced.

pub mod aliases;
pub mod email;
pub mod fields;
pub mod quote;
pub mod resolvers;

use serde::Serialize;
use serde_json::Value;

pub use email::{generate_email, ANONYMOUS, DEFAULT_EMAIL_DOMAIN, NO_EMAIL};
pub use fields::{extract_array, extract_scalar, RawRecord};
pub use quote::{clean_quote_text, parse_quote_field, Quote};
pub use resolvers::{
    resolve_backgrounds, resolve_courses, resolve_extras, resolve_image, resolve_links,
    resolve_mascot, Backgrounds, Course, Extras, Link, Mascot,
};

pub const DEFAULT_API_ORIGIN: &str = "https://dvonb.xyz";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStudent {
    pub id: String,
    pub name: String,
    pub email: String,
    /// May hold markup straight from the API; the only field rendered unescaped.
    pub introduction: Option<String>,
    pub quote: Option<Quote>,
    pub courses: Vec<Course>,
    pub links: Vec<Link>,
    pub image: Option<String>,
    pub backgrounds: Option<Backgrounds>,
    pub extras: Option<Extras>,
    pub mascot: Option<Mascot>,
}

#[derive(Clone, Debug)]
pub struct NormalizeOptions {
    /// Scheme and host that relative image paths are resolved against.
    pub api_origin: String,
    pub email_domain: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalizes one record. `index` is its position in the payload and
    /// doubles as the id when the record carries none.
    pub fn normalize(&self, record: &RawRecord, index: usize) -> NormalizedStudent {
        let id = extract_scalar(record, aliases::ID).unwrap_or_else(|| index.to_string());
        let name = resolve_name(record);

        let email = extract_scalar(record, aliases::EMAIL)
            .map(|e| e.trim().to_string())
            .filter(|e| e != NO_EMAIL)
            .unwrap_or_else(|| generate_email(&name, &self.options.email_domain));

        let introduction = extract_scalar(record, aliases::INTRODUCTION);

        let known_author = extract_scalar(record, aliases::QUOTE_AUTHOR);
        let quote = extract_scalar(record, aliases::QUOTE)
            .map(|raw| parse_quote_field(&raw, known_author.as_deref()))
            .filter(|q| !q.text.is_empty());

        NormalizedStudent {
            id,
            name,
            email,
            introduction,
            quote,
            courses: resolve_courses(record),
            links: resolve_links(record),
            image: resolve_image(record, &self.options.api_origin),
            backgrounds: resolve_backgrounds(record),
            extras: resolve_extras(record),
            mascot: resolve_mascot(record),
        }
    }

    /// Normalizes a whole collection, keeping payload order. Entries that are
    /// not JSON objects are skipped but still count toward positional ids.
    pub fn normalize_all(&self, records: &[Value]) -> Vec<NormalizedStudent> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.as_object().map(|r| self.normalize(r, index)))
            .collect()
    }
}

fn resolve_name(record: &RawRecord) -> String {
    if let Some(name) = extract_scalar(record, aliases::NAME) {
        return name.trim().to_string();
    }
    let parts: Vec<String> = [aliases::FIRST_NAME, aliases::LAST_NAME]
        .into_iter()
        .filter_map(|keys| extract_scalar(record, keys))
        .map(|s| s.trim().to_string())
        .collect();
    if parts.is_empty() {
        ANONYMOUS.to_string()
    } else {
        parts.join(" ")
    }
}
