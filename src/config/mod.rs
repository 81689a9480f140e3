//! Configuration module
//!
//! Settings live in `config.toml`:
//!
//! ```toml
//! [service]
//! authoring_key = "..."
//! resource_name = "my-qna-resource"
//! application_name = "my-qna-app"
//!
//! [knowledge_base]
//! id = "..."                 # written by `qna create --save`
//! query_endpoint_key = "..." # optional, looked up when missing
//!
//! [operations]
//! poll_interval_secs = 5
//! max_attempts = 20
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::monitor::OperationMonitor;
use crate::error::{QnaError, Result};

/// Directory holding a local config, like `.git`
pub const CONFIG_DIR: &str = ".qna";

/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    #[serde(default)]
    pub operations: OperationsConfig,

    #[serde(default)]
    pub input: InputConfig,
}

/// Hosted service identity and endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Subscription key for the authoring API
    #[serde(default)]
    pub authoring_key: String,

    /// Cognitive service resource name (authoring host)
    #[serde(default)]
    pub resource_name: String,

    /// App service name (runtime host)
    #[serde(default)]
    pub application_name: String,

    /// Overrides the authoring URL derived from `resource_name`
    #[serde(default)]
    pub authoring_endpoint: Option<String>,

    /// Overrides the runtime URL derived from `application_name`
    #[serde(default)]
    pub runtime_endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            authoring_key: String::new(),
            resource_name: String::new(),
            application_name: String::new(),
            authoring_endpoint: None,
            runtime_endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl ServiceConfig {
    pub fn authoring_endpoint(&self) -> String {
        self.authoring_endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}.cognitiveservices.azure.com/qnamaker/v4.0",
                self.resource_name
            )
        })
    }

    pub fn runtime_endpoint(&self) -> String {
        self.runtime_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.azurewebsites.net/qnamaker", self.application_name))
    }
}

/// The knowledge base this tool works on
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowledgeBaseConfig {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub query_endpoint_key: Option<String>,
}

/// Operation polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationsConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Refuse to reconcile when the remote base repeats an answer
    #[serde(default)]
    pub reject_duplicate_answers: bool,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
            reject_duplicate_answers: false,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    20
}

impl OperationsConfig {
    pub fn monitor(&self) -> OperationMonitor {
        OperationMonitor::new(
            Duration::from_secs(self.poll_interval_secs),
            self.max_attempts,
        )
    }
}

/// Input file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl InputConfig {
    /// Delimiter as a single byte
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(QnaError::config(format!(
                "input.delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }
}

impl Config {
    /// Find the config file to use
    ///
    /// Priority: explicit path, local `.qna/config.toml` (walking up from the
    /// current directory), global `~/.qna/config.toml`.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Some(local) = Self::find_local_config() {
            return Some(local);
        }

        Self::global_config_path().filter(|p| p.exists())
    }

    /// Load config from the located file, or defaults when there is none
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::locate(explicit) {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| QnaError::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| QnaError::config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Record a knowledge base identity in a config file
    ///
    /// Only `knowledge_base.id` and `knowledge_base.query_endpoint_key` are
    /// touched. The rest of the document, comments included, is kept as is.
    pub fn save_identity(path: &Path, kb_id: &str, query_key: &str) -> Result<()> {
        use toml_edit::{table, value, DocumentMut};

        let content = if path.exists() {
            std::fs::read_to_string(path).map_err(|e| QnaError::io(path, e))?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = content
            .parse()
            .map_err(|e| QnaError::config(format!("invalid config {}: {}", path.display(), e)))?;

        if doc.get("knowledge_base").is_none() {
            doc["knowledge_base"] = table();
        }
        doc["knowledge_base"]["id"] = value(kb_id);
        doc["knowledge_base"]["query_endpoint_key"] = value(query_key);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| QnaError::io(parent, e))?;
        }
        std::fs::write(path, doc.to_string()).map_err(|e| QnaError::io(path, e))
    }

    /// Apply `QNA_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("QNA_AUTHORING_KEY") {
            self.service.authoring_key = key;
        }
        if let Some(id) = lookup("QNA_KB_ID") {
            self.knowledge_base.id = Some(id);
        }
        if let Some(key) = lookup("QNA_QUERY_KEY") {
            self.knowledge_base.query_endpoint_key = Some(key);
        }
    }

    /// Check the fields every command needs
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("service.authoring_key", &self.service.authoring_key),
            ("service.resource_name", &self.service.resource_name),
            ("service.application_name", &self.service.application_name),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(QnaError::config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        self.input.delimiter_byte()?;
        Ok(())
    }

    /// Knowledge base id, treating an empty string as unset
    pub fn kb_id(&self) -> Option<String> {
        non_empty(self.knowledge_base.id.as_deref())
    }

    /// Query key, treating an empty string as unset
    pub fn query_key(&self) -> Option<String> {
        non_empty(self.knowledge_base.query_endpoint_key.as_deref())
    }

    /// Find local .qna/config.toml walking up directories
    pub fn find_local_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Get global config path (~/.qna/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        directories::UserDirs::new().map(|u| u.home_dir().join(CONFIG_DIR).join(CONFIG_FILE))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
