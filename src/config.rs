use serde::Deserialize;

use crate::error::ConfigError;

pub const WEBHOOK_URL_VAR: &str = "COST_REPORT_WEBHOOK_URL";
pub const WINDOW_DAYS_VAR: &str = "COST_REPORT_WINDOW_DAYS";
pub const FOOTER_VAR: &str = "COST_REPORT_FOOTER";
pub const INSTANCES_VAR: &str = "IMAGE_LIFECYCLE_INSTANCES";
pub const RETENTION_DAYS_VAR: &str = "IMAGE_LIFECYCLE_RETENTION_DAYS";

const DEFAULT_WINDOW_DAYS: u32 = 7;
const DEFAULT_RETENTION_DAYS: u32 = 5;
const DEFAULT_FOOTER: &str = "AWS Cost Report";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstanceDescriptor {
    pub id: String,
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostReportConfig {
    pub webhook_url: String,
    pub window_days: u32,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageLifecycleConfig {
    pub instances: Vec<InstanceDescriptor>,
    pub retention_days: u32,
}

impl CostReportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_url = lookup(WEBHOOK_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(WEBHOOK_URL_VAR))?;
        Ok(CostReportConfig {
            webhook_url,
            window_days: positive_days(&lookup, WINDOW_DAYS_VAR, DEFAULT_WINDOW_DAYS)?,
            footer: lookup(FOOTER_VAR).unwrap_or_else(|| DEFAULT_FOOTER.to_string()),
        })
    }
}

impl ImageLifecycleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(INSTANCES_VAR).ok_or(ConfigError::Missing(INSTANCES_VAR))?;
        let instances: Vec<InstanceDescriptor> =
            serde_json::from_str(&raw).map_err(|error| ConfigError::InvalidValue {
                key: INSTANCES_VAR,
                message: error.to_string(),
            })?;
        Ok(ImageLifecycleConfig {
            instances,
            retention_days: positive_days(&lookup, RETENTION_DAYS_VAR, DEFAULT_RETENTION_DAYS)?,
        })
    }
}

fn positive_days<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = match lookup(key) {
        Some(raw) => raw,
        None => return Ok(default),
    };
    match raw.trim().parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(ConfigError::InvalidValue {
            key,
            message: format!("expected a positive number of days, got {:?}", raw),
        }),
    }
}
