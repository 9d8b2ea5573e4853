use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DIR_NAME: &str = ".issuedesk";
pub const DB_FILE: &str = "issuedesk.db";
pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_API_URL: &str = "http://localhost:1337/api";

/// Settings written by `issuedesk init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
        }
    }
}

impl Config {
    /// A missing file means defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(&path, raw + "\n").with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Command line (or environment) wins over the saved URL.
    pub fn api_url<'a>(&'a self, override_url: Option<&'a str>) -> &'a str {
        override_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.api_url)
    }
}

/// Walks up from `start` looking for a `.issuedesk` directory.
pub fn find_dir(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let candidate = current.join(DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not an issuedesk workspace (or any parent). Run 'issuedesk init' first.");
        }
    }
}

/// An explicit directory must already exist; otherwise search upward.
pub fn locate(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    match explicit {
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        Some(dir) => bail!("{} is not a directory. Run 'issuedesk init' first.", dir.display()),
        None => find_dir(cwd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_dir_walks_up() {
        let dir = tempdir().unwrap();
        let root = dir.path().join(DIR_NAME);
        fs::create_dir_all(&root).unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_dir(&nested).unwrap(), root);
    }

    #[test]
    fn test_find_dir_skips_plain_files() {
        let dir = tempdir().unwrap();
        let root = dir.path().join(DIR_NAME);
        fs::create_dir_all(&root).unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join(DIR_NAME), "").unwrap();

        assert_eq!(find_dir(&nested).unwrap(), root);
    }

    #[test]
    fn test_locate_prefers_explicit_dir() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("custom");
        fs::create_dir_all(&explicit).unwrap();
        assert_eq!(locate(Some(&explicit), Path::new("/")).unwrap(), explicit);
        assert!(locate(Some(&dir.path().join("missing")), Path::new("/")).is_err());
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempdir().unwrap();
        let config = Config {
            api_url: "https://issues.example.com/api".to_string(),
        };
        config.save(dir.path()).unwrap();

        let raw = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert!(raw.contains("\"apiUrl\""));
        assert_eq!(Config::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_config_without_url_uses_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
        assert_eq!(Config::load(dir.path()).unwrap().api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_override_url_wins() {
        let config = Config::default();
        assert_eq!(config.api_url(None), DEFAULT_API_URL);
        assert_eq!(config.api_url(Some("  ")), DEFAULT_API_URL);
        assert_eq!(config.api_url(Some("http://other/api")), "http://other/api");
    }
}
