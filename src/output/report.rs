use crate::directory::{DirectoryPage, Field, ViewState};
use crate::normalizer::NormalizedStudent;

use super::card_tags;

const AVATAR_FALLBACK: &str = "https://ui-avatars.com/api/";

pub fn escape_html(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

/// Generated initials avatar used when a student's image fails to load.
fn fallback_avatar_url(name: &str) -> String {
    reqwest::Url::parse_with_params(
        AVATAR_FALLBACK,
        &[("name", name), ("background", "ffb07c"), ("color", "000")],
    )
    .map(|url| url.to_string())
    .unwrap_or_else(|_| AVATAR_FALLBACK.to_string())
}

fn pill(text: &str) -> String {
    format!(
        r#"<span class="rounded-full bg-red-700/80 border border-white/20 px-3 py-1 text-xs">{}</span>"#,
        escape_html(text)
    )
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        r#"<p class="text-sm"><strong class="text-orange-300">{}:</strong> {}</p>"#,
        escape_html(label),
        escape_html(value)
    )
}

fn render_avatar(s: &NormalizedStudent, view: &ViewState) -> String {
    match s.image.as_deref().filter(|_| view.is_visible(Field::Image)) {
        Some(src) => format!(
            r#"<img class="size-24 rounded-lg object-cover border-2 border-orange-300 bg-black" src="{}" alt="{}" onerror="this.onerror=null;this.src='{}';"/>"#,
            escape_html(src),
            escape_html(&s.name),
            escape_html(&fallback_avatar_url(&s.name))
        ),
        None => r#"<div class="size-24 rounded-lg border-2 border-orange-300 bg-black flex items-center justify-center text-3xl text-orange-300">&#128100;</div>"#
            .to_string(),
    }
}

fn render_card(s: &NormalizedStudent, view: &ViewState, course_label: &str) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        r#"<h3 class="text-xl font-bold mb-1">{}</h3>"#,
        escape_html(&s.name)
    ));
    if view.is_visible(Field::Email) {
        body.push_str(&format!(
            r#"<p class="text-sm text-orange-300 mb-2">{}</p>"#,
            escape_html(&s.email)
        ));
    }

    let intro = s
        .introduction
        .as_deref()
        .filter(|_| view.is_visible(Field::Introduction));
    let quote = s.quote.as_ref().filter(|_| view.is_visible(Field::Quote));
    if let Some(intro) = intro {
        // Introductions are authored markup and are emitted as-is.
        body.push_str(&format!(r#"<div class="mb-3 leading-relaxed">{intro}</div>"#));
    }
    if let Some(quote) = quote {
        body.push_str(&format!(
            r#"<blockquote class="italic text-red-100 border-l-4 border-orange-300 pl-3 mb-3">&ldquo;{}&rdquo;"#,
            escape_html(&quote.text)
        ));
        if let Some(author) = &quote.author {
            body.push_str(&format!(
                r#"<span class="not-italic text-orange-300 text-sm ml-2">&mdash; {}</span>"#,
                escape_html(author)
            ));
        }
        body.push_str("</blockquote>");
    }
    let details_shown = view.is_visible(Field::Introduction) || view.is_visible(Field::Quote);
    if intro.is_none() && quote.is_none() && details_shown {
        body.push_str(r#"<p class="italic opacity-70 mb-3">No details provided.</p>"#);
    }

    if view.is_visible(Field::Backgrounds) {
        if let Some(b) = &s.backgrounds {
            for (label, value) in [
                ("Personal Background", &b.personal),
                ("Professional Background", &b.professional),
                ("Academic Background", &b.academic),
            ] {
                if let Some(value) = value {
                    body.push_str(&detail_row(label, value));
                }
            }
        }
    }
    if view.is_visible(Field::Extras) {
        if let Some(extras) = &s.extras {
            if let Some(computer) = &extras.computer {
                body.push_str(&detail_row("Primary Computer", computer));
            }
            if let Some(fun_fact) = &extras.fun_fact {
                body.push_str(&detail_row("Fun Fact", fun_fact));
            }
        }
    }
    if view.is_visible(Field::Mascot) {
        if let Some(mascot) = &s.mascot {
            body.push_str(&detail_row(
                "Mascot",
                &format!("{} {} {}", s.name, mascot.divider, mascot.name),
            ));
        }
    }
    let tags = if view.is_visible(Field::Courses) {
        card_tags(s, view, course_label)
    } else {
        Vec::new()
    };
    if !tags.is_empty() {
        body.push_str(r#"<div class="flex flex-wrap gap-2 mt-3">"#);
        for tag in &tags {
            body.push_str(&pill(tag));
        }
        body.push_str("</div>");
    }
    if view.is_visible(Field::Links) && !s.links.is_empty() {
        body.push_str(r#"<div class="flex flex-wrap gap-4 mt-3 text-sm">"#);
        for link in &s.links {
            body.push_str(&format!(
                r#"<a class="text-orange-300 hover:underline" href="{}" rel="noopener">{}</a>"#,
                escape_html(&link.url),
                escape_html(&link.label)
            ));
        }
        body.push_str("</div>");
    }

    format!(
        r#"<article class="flex gap-6 items-center rounded-xl border border-orange-300/30 bg-black/40 p-6">{}<div class="flex-1">{}</div></article>"#,
        render_avatar(s, view),
        body
    )
}

pub fn render_html(
    title: &str,
    course_label: &str,
    page: &DirectoryPage<'_>,
    view: &ViewState,
) -> Vec<u8> {
    let cards = if page.total_matches == 0 {
        r#"<div class="text-center p-12 border border-dashed border-orange-300 rounded-lg text-orange-300">No students found.</div>"#.to_string()
    } else {
        page.students
            .iter()
            .map(|s| render_card(s, view, course_label))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let footer = if page.total_matches > view.items_per_page().get() {
        format!(
            r#"<nav class="mt-12 flex justify-center text-orange-300">Page {} of {}</nav>"#,
            page.page, page.total_pages
        )
    } else {
        String::new()
    };

    let search = if view.search_term().is_empty() {
        String::new()
    } else {
        format!(
            r#" matching &ldquo;{}&rdquo;"#,
            escape_html(view.search_term())
        )
    };

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="min-h-screen bg-neutral-900 px-4 py-8 font-sans text-white">
  <main class="mx-auto w-[90%] max-w-[1400px] rounded-2xl bg-gradient-to-br from-black to-[#ff5e62] p-8 shadow-2xl">
    <header class="mb-12 text-center">
      <h1 class="text-4xl font-bold">Meet the Class</h1>
      <p class="mt-2 text-lg text-orange-300">{title}</p>
      <p class="mt-4 text-sm text-orange-300">{count} Students{search}</p>
    </header>
    <section class="flex flex-col gap-6">
{cards}
    </section>
    {footer}
  </main>
</body>
</html>
"####,
        title = escape_html(title),
        count = page.total_matches,
    );
    html.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::normalizer::Normalizer;
    use serde_json::json;
    use std::num::NonZeroUsize;

    #[test]
    fn only_introduction_is_unescaped() {
        let raw = vec![json!({
            "name": "<script>x</script>",
            "introduction": "<p>Hi <em>all</em></p>",
            "quote": "a < b"
        })];
        let mut dir = Directory::new(NonZeroUsize::new(10).unwrap());
        dir.finish_loading::<String>(Ok(Normalizer::default().normalize_all(&raw)));
        let html = String::from_utf8(render_html("Directory", "ITIS 3135", &dir.visible(), dir.view())).unwrap();
        assert!(html.contains("<p>Hi <em>all</em></p>"));
        assert!(html.contains("&lt;script&gt;x&lt;"));
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn hidden_sections_are_not_rendered() {
        let raw = vec![json!({ "name": "Ann", "courses": ["ITIS 3135"] })];
        let mut dir = Directory::new(NonZeroUsize::new(10).unwrap());
        dir.finish_loading::<String>(Ok(Normalizer::default().normalize_all(&raw)));
        dir.toggle_field(Field::Courses);
        let html = String::from_utf8(render_html("Directory", "ITIS 3135", &dir.visible(), dir.view())).unwrap();
        assert!(!html.contains("ITIS 3135"));
    }

    #[test]
    fn escapes_quotes_and_ampersands() {
        assert_eq!(
            escape_html(r#"Tom & "Jerry" <3"#),
            "Tom &amp; &quot;Jerry&quot; &lt;3"
        );
    }

    #[test]
    fn cards_without_courses_show_email_and_course() {
        let raw = vec![json!({ "name": "Ann Lee" })];
        let mut dir = Directory::new(NonZeroUsize::new(10).unwrap());
        dir.finish_loading::<String>(Ok(Normalizer::default().normalize_all(&raw)));
        let html = String::from_utf8(render_html("Directory", "ITIS 3135", &dir.visible(), dir.view())).unwrap();
        assert!(html.contains(&pill("alee@charlotte.edu")));
        assert!(html.contains(&pill("ITIS 3135")));
    }

    #[test]
    fn broken_images_fall_back_to_initials_avatar() {
        assert_eq!(
            fallback_avatar_url("Ann Lee"),
            "https://ui-avatars.com/api/?name=Ann+Lee&background=ffb07c&color=000"
        );
        let raw = vec![json!({ "name": "Ann Lee", "image": "https://cdn.example.com/a.png" })];
        let mut dir = Directory::new(NonZeroUsize::new(10).unwrap());
        dir.finish_loading::<String>(Ok(Normalizer::default().normalize_all(&raw)));
        let html = String::from_utf8(render_html("Directory", "ITIS 3135", &dir.visible(), dir.view())).unwrap();
        assert!(html.contains("onerror=\"this.onerror=null;this.src='"));
        assert!(html.contains("ui-avatars.com"));
    }
}
