use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rollcall",
    version,
    about = "class directory viewer",
    long_about = "Rollcall fetches a class roster from the directory API, normalizes every student record no matter how it is shaped, and prints one searchable page of it.\n\nExamples:\n  rollcall\n  rollcall --term 2025-fall --course itis-3135 -s rust -p 2\n  rollcall --hide backgrounds,extras -o class.html\n  rollcall --input-file ./students.json --format json\n\nTip: Use --init-config to write ~/.rollcall/config.yml and keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the page to a file instead of the terminal."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'f',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or html (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "raw",
        help_heading = "Output",
        help = "Also print the raw API payload as pretty JSON."
    )]
    pub raw: bool,

    #[arg(
        short = 'e',
        long = "endpoint",
        value_name = "URL",
        help_heading = "Input",
        help = "Full directory endpoint URL (overrides --host/--term/--course)."
    )]
    pub endpoint: Option<String>,

    #[arg(
        long = "host",
        value_name = "HOST",
        help_heading = "Input",
        help = "Directory API host."
    )]
    pub host: Option<String>,

    #[arg(
        long = "term",
        value_name = "TERM",
        help_heading = "Input",
        help = "Academic term segment, e.g. 2025-fall."
    )]
    pub term: Option<String>,

    #[arg(
        long = "course",
        value_name = "COURSE",
        help_heading = "Input",
        help = "Course segment, e.g. itis-3135."
    )]
    pub course: Option<String>,

    #[arg(
        short = 'i',
        long = "input-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Read a saved API payload instead of fetching."
    )]
    pub input_file: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.rollcall/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds (0 = wait indefinitely)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Proxy URL for the directory request."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "email-domain",
        value_name = "DOMAIN",
        help_heading = "Records",
        help = "Domain used when deriving missing email addresses."
    )]
    pub email_domain: Option<String>,

    #[arg(
        short = 's',
        long = "search",
        value_name = "TERM",
        help_heading = "View",
        help = "Case-insensitive filter over name, email, introduction and quote."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "View",
        help = "Page to show, starting at 1."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'n',
        long = "per-page",
        value_name = "N",
        help_heading = "View",
        help = "Students per page."
    )]
    pub per_page: Option<usize>,

    #[arg(
        long = "hide",
        value_name = "FIELDS",
        help_heading = "View",
        help = "Hide card sections (comma-separated: email,introduction,quote,courses,links,image,backgrounds,extras,mascot)."
    )]
    pub hide: Option<String>,

    #[arg(
        short = 'a',
        long = "all",
        help_heading = "View",
        help = "Show every page instead of a single one."
    )]
    pub all: bool,
}
