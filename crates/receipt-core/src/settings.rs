//! Process settings
//!
//! Settings are read from the environment once at process start and passed
//! into constructors. Nothing in this module is mutated afterwards.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

const SERVER_PORT: u16 = 4000;
const RECAPTCHA_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_BODY_MB: usize = 10;

/// Where the field schema comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// Read from the `inputs` section of the configuration store.
    Table,
    /// Compiled-in receipt schema.
    Static,
}

impl FromStr for SchemaSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(SchemaSource::Table),
            "static" => Ok(SchemaSource::Static),
            _ => Err(anyhow::anyhow!("Invalid field schema source: {}", s)),
        }
    }
}

impl Display for SchemaSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SchemaSource::Table => write!(f, "table"),
            SchemaSource::Static => write!(f, "static"),
        }
    }
}

/// What to do with an image whose leading bytes match no known signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownImagePolicy {
    /// Label it as JPEG (historical behavior).
    #[default]
    FallbackJpeg,
    /// Refuse the payload as invalid input.
    Reject,
}

impl FromStr for UnknownImagePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallback_jpeg" | "jpeg" => Ok(UnknownImagePolicy::FallbackJpeg),
            "reject" => Ok(UnknownImagePolicy::Reject),
            _ => Err(anyhow::anyhow!("Invalid unknown image policy: {}", s)),
        }
    }
}

impl Display for UnknownImagePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UnknownImagePolicy::FallbackJpeg => write!(f, "fallback_jpeg"),
            UnknownImagePolicy::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Abuse verification
    pub recaptcha_secret: String,
    pub recaptcha_verify_url: String,
    pub recaptcha_score_threshold: f64,
    pub recaptcha_timeout_secs: u64,
    // Configuration store and collaborators
    pub config_store_ref: String,
    pub table_store_path: String,
    pub blob_store_path: String,
    pub field_schema_source: SchemaSource,
    pub unknown_image_policy: UnknownImagePolicy,
    pub max_request_body_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_mb = env::var("MAX_REQUEST_BODY_MB")
            .unwrap_or_else(|_| MAX_REQUEST_BODY_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_REQUEST_BODY_MB);

        let settings = Settings {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            recaptcha_secret: env::var("RECAPTCHA_SECRET").unwrap_or_default(),
            recaptcha_verify_url: env::var("RECAPTCHA_VERIFY_URL")
                .unwrap_or_else(|_| DEFAULT_VERIFY_URL.to_string()),
            recaptcha_score_threshold: env::var("RECAPTCHA_SCORE_THRESHOLD")
                .ok()
                .map(|s| {
                    s.parse::<f64>().map_err(|_| {
                        anyhow::anyhow!("RECAPTCHA_SCORE_THRESHOLD must be a number")
                    })
                })
                .transpose()?
                .unwrap_or(DEFAULT_SCORE_THRESHOLD),
            recaptcha_timeout_secs: env::var("RECAPTCHA_TIMEOUT_SECS")
                .unwrap_or_else(|_| RECAPTCHA_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(RECAPTCHA_TIMEOUT_SECS),
            config_store_ref: env::var("CONFIG_STORE_REF")
                .or_else(|_| env::var("SPREADSHEET_ID_CONFIG"))
                .unwrap_or_default(),
            table_store_path: env::var("TABLE_STORE_PATH")
                .unwrap_or_else(|_| "./data/tables".to_string()),
            blob_store_path: env::var("BLOB_STORE_PATH")
                .unwrap_or_else(|_| "./data/blobs".to_string()),
            field_schema_source: env::var("FIELD_SCHEMA_SOURCE")
                .map(|s| s.parse())
                .unwrap_or(Ok(SchemaSource::Table))?,
            unknown_image_policy: env::var("UNKNOWN_IMAGE_POLICY")
                .map(|s| s.parse())
                .unwrap_or(Ok(UnknownImagePolicy::default()))?,
            max_request_body_bytes: max_request_body_mb * 1024 * 1024,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.recaptcha_secret.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "Invalid script properties: RECAPTCHA_SECRET must be set"
            ));
        }

        if self.config_store_ref.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "Invalid script properties: CONFIG_STORE_REF (or SPREADSHEET_ID_CONFIG) must be set"
            ));
        }

        if !(0.0..=1.0).contains(&self.recaptcha_score_threshold) {
            return Err(anyhow::anyhow!(
                "RECAPTCHA_SCORE_THRESHOLD must be within [0, 1], got {}",
                self.recaptcha_score_threshold
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            server_port: 4000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            recaptcha_secret: "secret".to_string(),
            recaptcha_verify_url: DEFAULT_VERIFY_URL.to_string(),
            recaptcha_score_threshold: DEFAULT_SCORE_THRESHOLD,
            recaptcha_timeout_secs: 30,
            config_store_ref: "config".to_string(),
            table_store_path: "./data/tables".to_string(),
            blob_store_path: "./data/blobs".to_string(),
            field_schema_source: SchemaSource::Table,
            unknown_image_policy: UnknownImagePolicy::FallbackJpeg,
            max_request_body_bytes: 10 * 1024 * 1024,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(test_settings().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_secret_and_store_ref() {
        let mut settings = test_settings();
        settings.recaptcha_secret = "  ".to_string();
        assert!(settings.validate().is_err());

        let mut settings = test_settings();
        settings.config_store_ref.clear();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid script properties"));
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut settings = test_settings();
        settings.recaptcha_score_threshold = 1.5;
        assert!(settings.validate().is_err());

        settings.recaptcha_score_threshold = 0.0;
        assert!(settings.validate().is_ok());

        settings.recaptcha_score_threshold = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut settings = test_settings();
        settings.environment = "Production".to_string();
        assert!(settings.is_production());
        assert!(settings.validate().is_err());

        settings.cors_origins = vec!["https://forms.example.com".to_string()];
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("TABLE".parse::<SchemaSource>().unwrap(), SchemaSource::Table);
        assert_eq!(" static ".parse::<SchemaSource>().unwrap(), SchemaSource::Static);
        assert!("sheet".parse::<SchemaSource>().is_err());

        assert_eq!(
            "reject".parse::<UnknownImagePolicy>().unwrap(),
            UnknownImagePolicy::Reject
        );
        assert_eq!(
            "fallback_jpeg".parse::<UnknownImagePolicy>().unwrap(),
            UnknownImagePolicy::FallbackJpeg
        );
        assert_eq!(UnknownImagePolicy::default().to_string(), "fallback_jpeg");
    }
}
