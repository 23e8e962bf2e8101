//! Accepted key spellings for every normalized field.
//!
//! Lookups walk each list in order and stop at the first key that yields a
//! usable value, so earlier entries win when a record carries several aliases
//! for the same field.

pub const ID: &[&str] = &["id", "ID", "student_id", "uid", "slug"];

pub const NAME: &[&str] = &[
    "name",
    "student_name",
    "firstName",
    "firstname",
    "title",
    "full_name",
    "fullName",
];

pub const FIRST_NAME: &[&str] = &["first_name", "First Name", "given_name"];
pub const LAST_NAME: &[&str] = &["last_name", "Last Name", "family_name", "surname"];

pub const EMAIL: &[&str] = &["email", "user_email", "student_email", "contact_email"];

pub const INTRODUCTION: &[&str] = &[
    "introduction",
    "intro",
    "bio",
    "description",
    "about_me",
    "personalStatement",
    "personal_statement",
];

pub const QUOTE: &[&str] = &["quote", "tagline", "favorite_quote", "Favorite Quote"];
pub const QUOTE_AUTHOR: &[&str] = &["quote_author", "quoteAuthor", "author"];

pub const COURSES: &[&str] = &[
    "courses",
    "classes",
    "enrolled",
    "tags",
    "subjects",
    "course_list",
];

/// Preferred media descriptor, read as `<MEDIA>.src`.
pub const MEDIA: &str = "media";

pub const IMAGE: &[&str] = &[
    "image",
    "avatar",
    "photo",
    "picture",
    "profile_image",
    "profile_picture",
    "headshot",
    "image_url",
    "photo_url",
    "featured_image",
];

/// Label shown for a link, followed by the keys it may live under.
pub const LINKS: &[(&str, &[&str])] = &[
    ("GitHub", &["github", "github_url", "githubUrl", "GitHub"]),
    ("LinkedIn", &["linkedin", "linkedin_url", "linkedinUrl", "LinkedIn"]),
    ("Website", &["website", "personal_website", "site", "homepage", "url"]),
    ("Portfolio", &["portfolio", "portfolio_url", "portfolioUrl"]),
    ("CLT Web", &["clt_web", "cltweb", "cltWeb", "CLT Web", "webpage"]),
    ("Link", &["link", "links_url", "other_link"]),
];

/// Container holding free-form links, read after the fixed table above.
pub const LINK_CONTAINER: &str = "links";

pub const BACKGROUND_CONTAINER: &[&str] = &["background", "backgrounds"];

pub const PERSONAL_BACKGROUND: &[&str] = &[
    "personal_background",
    "personalBackground",
    "Personal Background",
    "background_personal",
    "hometown",
];

pub const PROFESSIONAL_BACKGROUND: &[&str] = &[
    "professional_background",
    "professionalBackground",
    "Professional Background",
    "background_professional",
    "work_experience",
    "workExperience",
    "job",
];

pub const ACADEMIC_BACKGROUND: &[&str] = &[
    "academic_background",
    "academicBackground",
    "Academic Background",
    "background_academic",
    "major",
    "education",
];

pub const COMPUTER: &[&str] = &[
    "primary_computer",
    "primaryComputer",
    "Primary Computer",
    "computer",
    "platform",
];

pub const FUN_FACT: &[&str] = &[
    "fun_fact",
    "funFact",
    "Fun Fact",
    "funny_thing",
    "interesting_item",
    "remember_me",
];

pub const MASCOT: &[&str] = &["mascot", "mascot_name", "mascotName"];
pub const MASCOT_DIVIDER: &[&str] = &["divider", "mascot_divider", "separator"];
