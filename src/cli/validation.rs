use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.per_page == Some(0) {
        return Err("invalid per-page, expected positive integer".to_string());
    }
    if args.page == Some(0) {
        return Err("invalid page, pages start at 1".to_string());
    }
    if let Some(raw) = args.hide.as_deref() {
        crate::directory::parse_fields_csv(raw).map_err(|e| format!("invalid --hide '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --format '{raw}', expected text, json or html"
            ));
        }
    }
    if args.endpoint.is_some() && args.input_file.is_some() {
        return Err("use either --endpoint or --input-file, not both".to_string());
    }
    if let Some(endpoint) = args.endpoint.as_deref() {
        let parsed = reqwest::Url::parse(endpoint.trim())
            .map_err(|e| format!("invalid --endpoint '{endpoint}': {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!("invalid --endpoint '{endpoint}': expected http(s) URL"));
        }
    }
    Ok(())
}
