use crate::adapters::sendgrid::{SendGridSettings, DEFAULT_BASE_URL};
use crate::core::ConfigProvider;
use crate::domain::ports::{ConflictPolicy, ReportFormat};
use crate::utils::error::{NotifierError, Result};
use crate::utils::validation::{
    validate_distinct_dirs, validate_email_address, validate_non_empty_string, validate_path,
    validate_positive_number, validate_resolved, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub sendgrid: SendGridConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendGridConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub template_id: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub json: bool,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("data/input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/procesados")
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("app.log"))
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            processed_dir: default_processed_dir(),
        }
    }
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            template_id: String::new(),
            from_email: String::new(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            json: false,
        }
    }
}

impl NotifierConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(NotifierError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| NotifierError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Defaults plus the SendGrid variables from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.sendgrid.api_key = std::env::var("SENDGRID_API_KEY").unwrap_or_default();
        config.sendgrid.template_id = std::env::var("SENDGRID_TEMPLATE_ID").unwrap_or_default();
        config.sendgrid.from_email = std::env::var("EMAIL_FROM").unwrap_or_default();
        if let Ok(base_url) = std::env::var("SENDGRID_BASE_URL") {
            config.sendgrid.base_url = base_url;
        }
        config
    }

    /// 替換環境變數 (例如 ${SENDGRID_API_KEY})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| NotifierError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn sendgrid_settings(&self) -> SendGridSettings {
        SendGridSettings {
            api_key: self.sendgrid.api_key.clone(),
            template_id: self.sendgrid.template_id.clone(),
            from_email: self.sendgrid.from_email.clone(),
            base_url: self.sendgrid.base_url.clone(),
            timeout_seconds: self.sendgrid.timeout_seconds,
        }
    }
}

impl Validate for NotifierConfig {
    fn validate(&self) -> Result<()> {
        validate_path("paths.input_dir", &self.paths.input_dir.to_string_lossy())?;
        validate_path("paths.output_dir", &self.paths.output_dir.to_string_lossy())?;
        validate_path(
            "paths.processed_dir",
            &self.paths.processed_dir.to_string_lossy(),
        )?;
        validate_distinct_dirs(
            "paths.processed_dir",
            &self.paths.processed_dir,
            "paths.input_dir",
            &self.paths.input_dir,
        )?;

        // dry-run 不需要 SendGrid 憑證
        if !self.dry_run {
            validate_resolved("sendgrid.api_key", &self.sendgrid.api_key)?;
            validate_resolved("sendgrid.template_id", &self.sendgrid.template_id)?;
            validate_resolved("sendgrid.from_email", &self.sendgrid.from_email)?;
            validate_non_empty_string("sendgrid.template_id", &self.sendgrid.template_id)?;
            validate_email_address("sendgrid.from_email", &self.sendgrid.from_email)?;
            validate_url("sendgrid.base_url", &self.sendgrid.base_url)?;
            validate_positive_number(
                "sendgrid.timeout_seconds",
                self.sendgrid.timeout_seconds as usize,
                1,
            )?;
        }

        Ok(())
    }
}

impl ConfigProvider for NotifierConfig {
    fn input_dir(&self) -> &Path {
        &self.paths.input_dir
    }

    fn output_dir(&self) -> &Path {
        &self.paths.output_dir
    }

    fn processed_dir(&self) -> &Path {
        &self.paths.processed_dir
    }

    fn on_conflict(&self) -> ConflictPolicy {
        self.archive.on_conflict
    }
}
