use serde_json::{Map, Value};

/// One student object exactly as the API returned it.
pub type RawRecord = Map<String, Value>;

const NESTED_SCOPES: [&str; 2] = ["acf", "data"];

/// The record itself, then its `acf` and `data` sub-objects when present.
pub fn scopes(record: &RawRecord) -> impl Iterator<Item = &RawRecord> + '_ {
    std::iter::once(record).chain(
        NESTED_SCOPES
            .into_iter()
            .filter_map(move |key| record.get(key).and_then(Value::as_object)),
    )
}

/// Spellings tried for a single alias: verbatim, lower-cased, then
/// lower-cased with spaces turned into underscores.
pub fn key_variants(key: &str) -> Vec<String> {
    let mut out = vec![key.to_string()];
    let lower = key.to_lowercase();
    let snake = lower.replace(' ', "_");
    for variant in [lower, snake] {
        if !out.contains(&variant) {
            out.push(variant);
        }
    }
    out
}

/// Every value stored under one of `keys`, in resolution order
/// (scope first, then alias, then spelling variant).
pub fn find_values<'a>(record: &'a RawRecord, keys: &[&str]) -> Vec<&'a Value> {
    let mut out = Vec::new();
    for scope in scopes(record) {
        for key in keys {
            for variant in key_variants(key) {
                if let Some(value) = scope.get(&variant) {
                    out.push(value);
                }
            }
        }
    }
    out
}

/// Case-insensitive key lookup on a single object.
pub fn get_ignore_case<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Renders a JSON value as display text. Returns `None` for null and for
/// values that come out blank.
pub fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) => value.to_string(),
        Value::Object(map) => coerce_object(map)?,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// A recognised wrapper always yields its unwrapped content, even when that
/// is blank; only unrecognised objects fall back to a JSON literal.
fn coerce_object(map: &Map<String, Value>) -> Option<String> {
    for wrapper in ["rendered", "value"] {
        if let Some(inner) = map.get(wrapper) {
            return coerce_text(inner);
        }
    }
    for pair in [["first", "last"], ["firstName", "lastName"]] {
        if pair.iter().any(|k| map.contains_key(*k)) {
            return join_parts(map, &pair, " ");
        }
    }
    if let Some(inner) = map.get("name") {
        return coerce_text(inner);
    }
    if map.contains_key("device") || map.contains_key("os") {
        return join_parts(map, &["device", "os"], ", ");
    }
    serde_json::to_string(map).ok()
}

fn join_parts(map: &Map<String, Value>, keys: &[&str], sep: &str) -> Option<String> {
    let parts: Vec<String> = keys
        .iter()
        .filter_map(|k| map.get(*k))
        .filter_map(coerce_text)
        .map(|s| s.trim().to_string())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(sep))
    }
}

/// First usable text value stored under any of `keys`.
pub fn extract_scalar(record: &RawRecord, keys: &[&str]) -> Option<String> {
    find_values(record, keys).into_iter().find_map(coerce_text)
}

/// First list stored under any of `keys`. A comma-separated string counts
/// as a list; anything else is skipped.
pub fn extract_array(record: &RawRecord, keys: &[&str]) -> Vec<Value> {
    for value in find_values(record, keys) {
        match value {
            Value::Array(items) => return items.clone(),
            Value::String(s) if s.contains(',') => {
                return s
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| Value::String(part.to_string()))
                    .collect();
            }
            _ => {}
        }
    }
    Vec::new()
}
