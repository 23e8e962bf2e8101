use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub endpoint: Option<String>,
    #[serde(alias = "host")]
    pub api_host: Option<String>,
    pub term: Option<String>,
    pub course: Option<String>,
    pub input_file: Option<String>,
    #[serde(alias = "page_size")]
    pub items_per_page: Option<usize>,
    pub page: Option<usize>,
    pub search: Option<String>,
    pub hide_fields: Option<Vec<String>>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub email_domain: Option<String>,
    pub no_color: Option<bool>,
    pub show_raw: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".rollcall").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str, origin: &Path) -> Result<ConfigFile, String> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
        .map_err(|e| format!("failed to parse config '{}': {e}", origin.display()))
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# Rollcall config
#
# Location (default):
#   ~/.rollcall/config.yml

# Source (either a full endpoint, or host/term/course)
# endpoint: https://dvonb.xyz/api/2025-fall/itis-3135/students?full=1
api_host: dvonb.xyz
term: 2025-fall
course: itis-3135
# input_file: ./students.json

# HTTP (optional)
# timeout: 30
# proxy: http://127.0.0.1:8080

# View
items_per_page: 10
# search: ""
# hide_fields: [backgrounds, extras]

# Records
email_domain: charlotte.edu

# Output (optional)
# output: ./directory.html
# output_format: html
no_color: false
show_raw: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses() {
        let cfg = parse_config(&default_config_yaml(), Path::new("default")).unwrap();
        assert_eq!(cfg.api_host.as_deref(), Some("dvonb.xyz"));
        assert_eq!(cfg.items_per_page, Some(10));
        assert_eq!(cfg.no_color, Some(false));
        assert_eq!(cfg.endpoint, None);
    }

    #[test]
    fn aliases_and_lists() {
        let cfg = parse_config(
            "host: example.edu\npage_size: 25\nhide_fields:\n  - quote\n  - links\n",
            Path::new("inline"),
        )
        .unwrap();
        assert_eq!(cfg.api_host.as_deref(), Some("example.edu"));
        assert_eq!(cfg.items_per_page, Some(25));
        assert_eq!(
            cfg.hide_fields,
            Some(vec!["quote".to_string(), "links".to_string()])
        );
    }

    #[test]
    fn empty_file_is_default_and_bad_yaml_is_an_error() {
        assert_eq!(
            parse_config("  \n", Path::new("empty")).unwrap(),
            ConfigFile::default()
        );
        let err = parse_config("items_per_page: [", Path::new("bad.yml")).unwrap_err();
        assert!(err.contains("bad.yml"));
    }

    #[test]
    fn missing_file_respects_allow_missing() {
        let path = Path::new("/nonexistent/rollcall/config.yml");
        assert_eq!(load_config(path, true).unwrap(), ConfigFile::default());
        assert!(load_config(path, false).is_err());
    }

    #[test]
    fn writes_default_file_once() {
        let dir = env::temp_dir().join(format!("rollcall-cfg-{}", std::process::id()));
        let path = dir.join("config.yml");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        assert!(load_config(&path, false).is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
