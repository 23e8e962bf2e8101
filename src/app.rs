use std::num::NonZeroUsize;
use std::time::Duration;

use clap::{error::ErrorKind, Arg, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use serde_json::Value;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::directory::{self, Directory, Field, LoadState, ViewState};
use crate::fetcher::{self, ClientOptions, DirectoryClient, FetchError};
use crate::normalizer::{NormalizeOptions, Normalizer, DEFAULT_API_ORIGIN, DEFAULT_EMAIL_DOMAIN};
use crate::output::{self, OutputFormat};

fn print_banner() {
    const BANNER: &str = r#"
             _ _           _ _
   _ __ ___ | | | ___ __ _| | |
  | '__/ _ \| | |/ __/ _` | | |
  | | | (_) | | | (_| (_| | | |
  |_|  \___/|_|_|\___\__,_|_|_|
      class directory viewer
    "#;
    eprintln!("{}", BANNER);
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn log_tagged(tag: &str, msg: &str) {
    let tag = match tag {
        "WRN" => tag.bold().yellow(),
        _ => tag.bold().blue(),
    };
    eprintln!("{}{}{} {}", "[".bold().white(), tag, "]".bold().white(), msg);
}

fn flag_column(arg: &Arg) -> String {
    let short = arg.get_short().map(|c| format!("-{c}, ")).unwrap_or_default();
    let long = arg.get_long().map(|l| format!("--{l}")).unwrap_or_default();
    let value = if arg.get_action().takes_values() {
        let name = arg
            .get_value_names()
            .and_then(|names| names.first())
            .map(|n| n.as_str())
            .unwrap_or("VALUE");
        format!(" <{name}>")
    } else {
        String::new()
    };
    format!("{short:>4}{long}{value}")
}

/// Help grouped by `help_heading`, flags aligned in one column.
fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let args: Vec<(&str, &Arg)> = cmd
        .get_arguments()
        .filter(|a| !a.is_hide_set())
        .map(|a| (a.get_help_heading().unwrap_or("Options"), a))
        .collect();
    let width = args
        .iter()
        .map(|(_, a)| flag_column(a).len())
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{} {}\n{}\n",
        cmd.get_name(),
        cmd.get_version().unwrap_or_default(),
        cmd.get_about().map(|a| a.to_string()).unwrap_or_default()
    );
    if let Some(long_about) = cmd.get_long_about() {
        out.push_str(&format!("\n{long_about}\n"));
    }
    out.push_str(&format!("\nUsage: {} [OPTIONS]\n", cmd.get_name()));

    let groups = args.iter().group_by(|(heading, _)| *heading);
    for (heading, group) in &groups {
        out.push_str(&format!("\n{heading}:\n"));
        for (_, arg) in group {
            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                flag_column(arg),
                help.trim()
            ));
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Source {
    Endpoint(String),
    File(String),
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: Source,
    title: String,
    course_label: String,
    client: ClientOptions,
    normalize: NormalizeOptions,
    search: String,
    page: usize,
    per_page: NonZeroUsize,
    hidden: Vec<Field>,
    all: bool,
    output: Option<String>,
    format: OutputFormat,
    no_color: bool,
    show_raw: bool,
    verbose: u8,
}

fn directory_title(course_label: &str) -> String {
    if course_label.is_empty() {
        "Student Directory".to_string()
    } else {
        format!("{course_label} Student Directory")
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let show_raw = args.raw || cfg.show_raw.unwrap_or(false);

    let host = args
        .host
        .or(cfg.api_host)
        .unwrap_or_else(|| fetcher::DEFAULT_API_HOST.to_string());
    let term = args
        .term
        .or(cfg.term)
        .unwrap_or_else(|| fetcher::DEFAULT_TERM.to_string());
    let course = args
        .course
        .or(cfg.course)
        .unwrap_or_else(|| fetcher::DEFAULT_COURSE.to_string());

    let cli_source = match (args.endpoint, args.input_file) {
        (Some(endpoint), _) => Some(Source::Endpoint(endpoint.trim().to_string())),
        (None, Some(path)) => Some(Source::File(config::expand_tilde_string(&path))),
        (None, None) => None,
    };
    let source = match cli_source {
        Some(source) => source,
        None => match (cfg.endpoint, cfg.input_file) {
            (Some(_), Some(_)) => {
                return Err("config sets both endpoint and input_file, keep one".to_string())
            }
            (Some(endpoint), None) => Source::Endpoint(endpoint.trim().to_string()),
            (None, Some(path)) => Source::File(config::expand_tilde_string(&path)),
            (None, None) => Source::Endpoint(fetcher::endpoint_url(&host, &term, &course)),
        },
    };

    let api_origin = match &source {
        Source::Endpoint(url) => fetcher::origin_of(url),
        Source::File(_) => fetcher::origin_of(&fetcher::endpoint_url(&host, &term, &course)),
    }
    .unwrap_or_else(|| DEFAULT_API_ORIGIN.to_string());

    let course_label = output::course_label(&course);

    let per_page_raw = args
        .per_page
        .or(cfg.items_per_page)
        .unwrap_or(directory::DEFAULT_ITEMS_PER_PAGE);
    let per_page = NonZeroUsize::new(per_page_raw)
        .ok_or_else(|| "invalid per-page, expected positive integer".to_string())?;

    let page = args.page.or(cfg.page).unwrap_or(1);
    if page == 0 {
        return Err("invalid page, pages start at 1".to_string());
    }

    let hidden = match args.hide {
        Some(raw) => directory::parse_fields_csv(&raw)
            .map_err(|e| format!("invalid --hide '{raw}': {e}"))?,
        None => {
            let raw = cfg.hide_fields.unwrap_or_default().join(",");
            directory::parse_fields_csv(&raw)
                .map_err(|e| format!("invalid hide_fields '{raw}': {e}"))?
        }
    };

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let timeout_seconds = args.timeout.or(cfg.timeout).filter(|t| *t > 0);
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let email_domain = args
        .email_domain
        .or(cfg.email_domain)
        .map(|d| d.trim().trim_start_matches('@').to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string());

    Ok(RunConfig {
        source,
        title: directory_title(&course_label),
        course_label,
        client: ClientOptions {
            timeout_seconds,
            proxy,
        },
        normalize: NormalizeOptions {
            api_origin,
            email_domain,
        },
        search: args.search.or(cfg.search).unwrap_or_default(),
        page,
        per_page,
        hidden,
        all: args.all,
        output,
        format,
        no_color,
        show_raw,
        verbose: args.verbose,
    })
}

fn loading_spinner() -> Result<ProgressBar, String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg} [{elapsed}]")
            .map_err(|e| format!("failed to build spinner style: {e}"))?,
    );
    pb.set_message("Loading directory...");
    Ok(pb)
}

async fn load_payload(run: &RunConfig) -> Result<Value, FetchError> {
    match &run.source {
        Source::Endpoint(url) => {
            let client = DirectoryClient::new(url, &run.client)?;
            client.fetch_payload().await
        }
        Source::File(path) => fetcher::load_payload_file(path).await,
    }
}

fn render(run: &RunConfig, dir: &Directory) -> Vec<u8> {
    let page = dir.visible();
    match run.format {
        OutputFormat::Text => output::render_text(&page, dir.view(), &run.course_label).into_bytes(),
        OutputFormat::Json => {
            let source = match &run.source {
                Source::Endpoint(url) => url.as_str(),
                Source::File(path) => path.as_str(),
            };
            output::render_json(&output::build_report(source, &page, dir.view()))
        }
        OutputFormat::Html => output::render_html(&run.title, &run.course_label, &page, dir.view()),
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color || (run.output.is_some() && run.format == OutputFormat::Text) {
        colored::control::set_override(false);
    }
    if run.verbose > 0 {
        print_banner();
    }

    let source_label = match &run.source {
        Source::Endpoint(url) => url.clone(),
        Source::File(path) => format!("file {path}"),
    };
    format_kv_line("Source", &source_label);
    if run.verbose > 0 {
        format_kv_line(
            "View",
            &format!(
                "search={} page={} per-page={} hidden={}",
                if run.search.is_empty() {
                    "none"
                } else {
                    run.search.as_str()
                },
                if run.all {
                    "all".to_string()
                } else {
                    run.page.to_string()
                },
                run.per_page,
                if run.hidden.is_empty() {
                    "none".to_string()
                } else {
                    run.hidden.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(",")
                },
            ),
        );
    }

    let mut view = ViewState::new(run.per_page);
    for field in &run.hidden {
        view.toggle_field(*field);
    }
    let mut dir = Directory::with_view(view);

    let now = Instant::now();
    let spinner = match run.source {
        Source::Endpoint(_) => Some(loading_spinner()?),
        Source::File(_) => None,
    };
    let payload = load_payload(&run).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if run.show_raw {
        if let Ok(raw) = &payload {
            let pretty = serde_json::to_string_pretty(raw)
                .map_err(|e| format!("failed to render raw payload: {e}"))?;
            eprintln!("{pretty}");
        }
    }

    let normalizer = Normalizer::new(run.normalize.clone());
    let students =
        payload.map(|raw| normalizer.normalize_all(&fetcher::extract_records(raw)));
    dir.finish_loading(students);
    if let LoadState::Failed(message) = dir.load_state() {
        return Err(message.clone());
    }
    if run.verbose > 0 {
        log_tagged(
            "INF",
            &format!(
                "loaded {} students in {}ms",
                dir.students().len(),
                now.elapsed().as_millis()
            ),
        );
    }

    dir.set_search_term(run.search.as_str());
    if run.all {
        let everything = NonZeroUsize::new(dir.filtered().len()).unwrap_or(NonZeroUsize::MIN);
        dir.set_items_per_page(everything);
    } else {
        dir.go_to_page(run.page);
    }

    let page = dir.visible();
    if page.students.is_empty() && page.total_matches > 0 {
        log_tagged(
            "WRN",
            &format!(
                "page {} is past the last page ({})",
                page.page, page.total_pages
            ),
        );
    }

    let rendered = render(&run, &dir);
    match run.output.as_deref() {
        Some(outfile_path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(outfile_path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output file: {e}"))?;
            format_kv_line("Output", outfile_path);
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
        }
    }

    if run.verbose > 0 {
        eprintln!();
        eprintln!(
            ":: Completed :: {} of {} students shown in {}ms ::",
            page.students.len(),
            page.total_matches,
            now.elapsed().as_millis()
        );
    }

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let explicit_config = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = explicit_config
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine home directory for config".to_string())?;
        if config::ensure_default_config_file(&path)? {
            format_kv_line("Config", &format!("wrote {}", path.display()));
        } else {
            format_kv_line("Config", &format!("{} already exists", path.display()));
        }
        return Ok(());
    }

    let cfg = match explicit_config.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
