pub const DEFAULT_EMAIL_DOMAIN: &str = "charlotte.edu";

/// Placeholder shown when no address can be found or derived.
pub const NO_EMAIL: &str = "No Email";

/// Name used for records whose name cannot be resolved.
pub const ANONYMOUS: &str = "Anonymous";

/// Derives a campus-style address from a display name: first initial plus
/// the letters of the last name token, e.g. `Jane Doe` -> `jdoe@<domain>`.
pub fn generate_email(name: &str, domain: &str) -> String {
    let name = name.trim();
    if name.is_empty() || name == ANONYMOUS {
        return NO_EMAIL.to_string();
    }
    let parts: Vec<&str> = name.split_whitespace().collect();
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return NO_EMAIL.to_string();
    };
    let initial: String = first.chars().take(1).flat_map(char::to_lowercase).collect();
    let surname: String = last
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    format!("{initial}{surname}@{domain}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_initial_and_surname() {
        assert_eq!(
            generate_email("Jane Doe", DEFAULT_EMAIL_DOMAIN),
            "jdoe@charlotte.edu"
        );
        assert_eq!(
            generate_email("  Mary  Ann O'Neil-Smith ", "uni.edu"),
            "moneilsmith@uni.edu"
        );
    }

    #[test]
    fn single_token_uses_same_word_twice() {
        assert_eq!(generate_email("Cher", "uni.edu"), "ccher@uni.edu");
    }

    #[test]
    fn sentinel_for_missing_names() {
        assert_eq!(generate_email("", DEFAULT_EMAIL_DOMAIN), NO_EMAIL);
        assert_eq!(generate_email("   ", DEFAULT_EMAIL_DOMAIN), NO_EMAIL);
        assert_eq!(generate_email("Anonymous", DEFAULT_EMAIL_DOMAIN), NO_EMAIL);
    }
}
