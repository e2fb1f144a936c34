use rusoto_ce::{GetCostAndUsageError, GetCostForecastError};
use rusoto_core::region::ParseRegionError;
use rusoto_core::RusotoError;
use rusoto_ec2::{
    CreateImageError, CreateTagsError, DeleteSnapshotError, DeregisterImageError,
    DescribeImagesError,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChoreError>;

#[derive(Debug, Error)]
pub enum ChoreError {
    #[error("Value is None: {0}")]
    NoneValue(&'static str),

    #[error("Failed to convert bigDecimal to primitive")]
    ToPrimitive,

    #[error("Image {0} has no backing snapshot")]
    MissingSnapshot(String),

    #[error("Invalid cost amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidRegion(#[from] ParseRegionError),

    #[error("GetCostAndUsage failed: {0}")]
    GetCostAndUsage(#[from] RusotoError<GetCostAndUsageError>),

    #[error("GetCostForecast failed: {0}")]
    GetCostForecast(#[from] RusotoError<GetCostForecastError>),

    #[error("CreateImage failed: {0}")]
    CreateImage(#[from] RusotoError<CreateImageError>),

    #[error("CreateTags failed: {0}")]
    CreateTags(#[from] RusotoError<CreateTagsError>),

    #[error("DescribeImages failed: {0}")]
    DescribeImages(#[from] RusotoError<DescribeImagesError>),

    #[error("DeregisterImage failed: {0}")]
    DeregisterImage(#[from] RusotoError<DeregisterImageError>),

    #[error("DeleteSnapshot failed: {0}")]
    DeleteSnapshot(#[from] RusotoError<DeleteSnapshotError>),

    #[error("Webhook delivery failed: {0}")]
    Webhook(#[from] reqwest::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}
