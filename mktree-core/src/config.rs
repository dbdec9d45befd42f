use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::adapter::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::error::{ConfigError, ConfigResult};
use crate::materializer::ContentMode;

pub const CONFIG: &str = r#"[general]
root = "."
content = "template"   # or "empty"

[adapter]
endpoint = "https://api.openai.com/v1/chat/completions"
model = "gpt-4o-mini"
timeout_secs = 30
api_key_env = "OPENAI_API_KEY"
"#;

#[derive(Deserialize, Debug, Default)]
struct RawGeneral {
    root: Option<String>,
    content: Option<ContentMode>,
}

#[derive(Deserialize, Debug, Default)]
struct RawAdapter {
    endpoint: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    api_key_env: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct RawConfig {
    general: Option<RawGeneral>,
    adapter: Option<RawAdapter>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct General {
    pub root: String,
    pub content: ContentMode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Adapter {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    pub api_key_env: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub general: General,
    pub adapter: Adapter,
}

#[derive(Parser, Clone, Debug)]
#[command(about = "Create directories and files from an indented tree listing")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(
        short = 'c',
        long,
        global = true,
        default_value = "mktree.toml",
        help = "Config file path"
    )]
    pub config: String,

    #[arg(short = 'd', long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity (-d, -dd, -ddd)")]
    pub debug: u8,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    #[command(about = "Create the structure described by a tree file ('-' for stdin)")]
    Build {
        #[arg(help = "Tree text file, or '-' for stdin")]
        input: Option<String>,

        #[arg(short = 'r', long, help = "Directory to create the structure in")]
        root: Option<String>,

        #[arg(long, help = "Create empty files instead of templated ones")]
        empty: bool,

        #[arg(long, help = "Show what would be created without touching the disk")]
        dry_run: bool,
    },

    #[command(about = "Print the parsed structure without creating anything")]
    Parse {
        #[arg(help = "Tree text file, or '-' for stdin")]
        input: Option<String>,
    },

    #[command(about = "Ask a language model for a structure from a description")]
    Generate {
        #[arg(short = 'm', long, help = "Natural-language project description")]
        description: String,

        #[arg(long, help = "Model identifier")]
        model: Option<String>,

        #[arg(long, help = "Chat completion endpoint URL")]
        endpoint: Option<String>,

        #[arg(long, hide_env_values = true, env = "MKTREE_API_KEY", help = "API key")]
        api_key: Option<String>,

        #[arg(long, help = "Request timeout in seconds")]
        timeout: Option<u64>,

        #[arg(long, help = "Create the generated structure right away")]
        build: bool,

        #[arg(short = 'r', long, help = "Directory to create the structure in")]
        root: Option<String>,

        #[arg(long, help = "Create empty files instead of templated ones")]
        empty: bool,
    },

    #[command(about = "Print an existing directory as tree text")]
    Snapshot {
        #[arg(default_value = ".", help = "Directory to capture")]
        path: String,

        #[arg(short = 'e', long, help = "Glob of names to leave out (repeatable)")]
        exclude: Vec<String>,

        #[arg(long, help = "Maximum depth to traverse")]
        max_depth: Option<usize>,
    },

    #[command(about = "Print a sample tree")]
    Example,

    #[command(about = "Write a default config file")]
    Init {
        #[arg(long, help = "Overwrite an existing config")]
        force: bool,
    },
}

impl Config {
    pub fn new(config_path: &str, args: &Args) -> Self {
        let mut config = Self::load_config(config_path);

        match &args.command {
            Command::Build { root, empty, .. } => {
                config.apply_build_overrides(root.as_deref(), *empty);
            }
            Command::Generate {
                model,
                endpoint,
                timeout,
                root,
                empty,
                ..
            } => {
                config.apply_build_overrides(root.as_deref(), *empty);
                if let Some(m) = model {
                    config.adapter.model = m.clone();
                }
                if let Some(e) = endpoint {
                    config.adapter.endpoint = e.clone();
                }
                if let Some(t) = timeout {
                    config.adapter.timeout_secs = *t;
                }
            }
            _ => {}
        }

        config
    }

    fn apply_build_overrides(&mut self, root: Option<&str>, empty: bool) {
        if let Some(r) = root {
            self.general.root = r.to_string();
        }
        if empty {
            self.general.content = ContentMode::Empty;
        }
    }

    /// Credential from the environment variable named in `[adapter]`.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.adapter.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn load_config(config_path: &str) -> Self {
        let default_config = Self::default_config();

        if !Path::new(config_path).exists() {
            return default_config;
        }

        let mut file = match File::open(config_path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Cannot load config: {}. Using defaults.", e);
                return default_config;
            }
        };

        let mut contents = String::new();
        if file.read_to_string(&mut contents).is_err() {
            tracing::warn!("Cannot read config. Using defaults.");
            return default_config;
        }

        Self::from_toml(&contents).unwrap_or_else(|e| {
            tracing::warn!("Cannot parse config: {}. Using defaults.", e);
            default_config
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let default_config = Self::default_config();
        let loaded_raw: RawConfig = toml::from_str(contents)?;

        let loaded_general = loaded_raw.general.unwrap_or_default();
        let loaded_adapter = loaded_raw.adapter.unwrap_or_default();

        Ok(Config {
            general: General {
                root: loaded_general.root.unwrap_or(default_config.general.root),
                content: loaded_general
                    .content
                    .unwrap_or(default_config.general.content),
            },
            adapter: Adapter {
                endpoint: loaded_adapter
                    .endpoint
                    .unwrap_or(default_config.adapter.endpoint),
                model: loaded_adapter.model.unwrap_or(default_config.adapter.model),
                timeout_secs: loaded_adapter
                    .timeout_secs
                    .unwrap_or(default_config.adapter.timeout_secs),
                api_key_env: loaded_adapter
                    .api_key_env
                    .unwrap_or(default_config.adapter.api_key_env),
            },
        })
    }

    pub fn default_config() -> Self {
        Config {
            general: General {
                root: ".".to_string(),
                content: ContentMode::Template,
            },
            adapter: Adapter {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                model: DEFAULT_MODEL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                api_key_env: "OPENAI_API_KEY".to_string(),
            },
        }
    }

    pub fn create_config(config_path: &str, force: bool) -> ConfigResult<PathBuf> {
        let path = PathBuf::from(config_path);
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists { path });
        }
        let write_error = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let mut file = File::create(&path).map_err(write_error)?;
        file.write_all(CONFIG.as_bytes()).map_err(write_error)?;
        tracing::info!("wrote config {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn template_config_matches_defaults() {
        assert_eq!(Config::from_toml(CONFIG).unwrap(), Config::default_config());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[general]\ncontent = \"empty\"\n").unwrap();
        assert_eq!(config.general.content, ContentMode::Empty);
        assert_eq!(config.general.root, ".");
        assert_eq!(config.adapter.timeout_secs, 30);
    }

    #[test]
    fn cli_flags_override_file() {
        let args = Args::parse_from([
            "mktree", "generate", "-m", "a cli", "--model", "local", "--timeout", "5", "--empty",
        ]);
        let config = Config::new("does-not-exist.toml", &args);
        assert_eq!(config.adapter.model, "local");
        assert_eq!(config.adapter.timeout_secs, 5);
        assert_eq!(config.general.content, ContentMode::Empty);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.toml");
        assert_eq!(
            Config::load_config(path.to_str().unwrap()),
            Config::default_config()
        );
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mktree.toml");
        fs::write(&path, "[general]\ncontent = \"bogus\"\nroot = \"out\"\n").unwrap();

        assert!(Config::from_toml(&fs::read_to_string(&path).unwrap()).is_err());
        assert_eq!(
            Config::load_config(path.to_str().unwrap()),
            Config::default_config()
        );
    }

    #[test]
    fn valid_file_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mktree.toml");
        fs::write(&path, "[general]\nroot = \"out\"\n[adapter]\nmodel = \"local\"\n").unwrap();

        let config = Config::load_config(path.to_str().unwrap());
        assert_eq!(config.general.root, "out");
        assert_eq!(config.adapter.model, "local");
        assert_eq!(config.adapter.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let mut config = Config::default_config();
        config.adapter.api_key_env = "MKTREE_TEST_BLANK_API_KEY".to_string();
        std::env::set_var("MKTREE_TEST_BLANK_API_KEY", "   ");
        assert_eq!(config.api_key_from_env(), None);

        config.adapter.api_key_env = "MKTREE_TEST_SET_API_KEY".to_string();
        std::env::set_var("MKTREE_TEST_SET_API_KEY", "sk-test");
        assert_eq!(config.api_key_from_env().as_deref(), Some("sk-test"));

        config.adapter.api_key_env = "MKTREE_TEST_UNSET_API_KEY".to_string();
        assert_eq!(config.api_key_from_env(), None);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("conf").join("mktree.toml");
        let path_str = path.to_str().unwrap();

        Config::create_config(path_str, false).unwrap();
        assert!(matches!(
            Config::create_config(path_str, false),
            Err(ConfigError::AlreadyExists { .. })
        ));
        Config::create_config(path_str, true).unwrap();
        assert_eq!(Config::load_config(path_str), Config::default_config());
    }
}
