//! Daily machine image rotation.
//!
//! For each configured instance an image named `auto-ami-<name>-<date>` is
//! created without rebooting the instance, and the image created
//! `retention_days` ago (found by the same naming convention) is deregistered
//! together with its root snapshot. Every phase of every instance yields an
//! outcome; one instance failing never stops the others.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{ImageLifecycleConfig, InstanceDescriptor};
use crate::error::{ChoreError, Result};
use crate::image_client::ImageService;
use crate::time_range::{date_label, days_before};

pub const IMAGE_PREFIX: &str = "auto-ami";
pub const SOURCE_INSTANCE_TAG: &str = "auto-image:source-instance";
pub const CREATED_ON_TAG: &str = "auto-image:created-on";
const IMAGE_DESCRIPTION: &str = "Created by image-lifecycle";

pub fn image_name(instance_name: &str, date: NaiveDate) -> String {
    format!("{}-{}-{}", IMAGE_PREFIX, instance_name, date_label(date))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreateOutcome {
    Created { image_name: String, image_id: String },
    Failed { image_name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PruneOutcome {
    Pruned {
        image_name: String,
        image_id: String,
        snapshot_id: String,
    },
    NothingToPrune { image_name: String },
    Failed { image_name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceReport {
    pub instance_id: String,
    pub instance_name: String,
    pub region: String,
    pub create: CreateOutcome,
    pub prune: PruneOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleReport {
    pub today: String,
    pub stale_date: String,
    pub instances: Vec<InstanceReport>,
}

impl LifecycleReport {
    /// Number of failed phases across all instances.
    pub fn failures(&self) -> usize {
        self.instances
            .iter()
            .map(|report| {
                usize::from(matches!(report.create, CreateOutcome::Failed { .. }))
                    + usize::from(matches!(report.prune, PruneOutcome::Failed { .. }))
            })
            .sum()
    }
}

pub async fn create_image<S>(
    service: &S,
    instance: &InstanceDescriptor,
    today: NaiveDate,
) -> CreateOutcome
where
    S: ImageService + ?Sized,
{
    let name = image_name(&instance.name, today);
    let image_id = match service
        .create_image(&instance.id, &name, IMAGE_DESCRIPTION)
        .await
    {
        Ok(image_id) => image_id,
        Err(error) => {
            tracing::error!(
                instance = %instance.name,
                image_name = %name,
                %error,
                "error creating image"
            );
            return CreateOutcome::Failed {
                image_name: name,
                reason: error.to_string(),
            };
        }
    };
    tracing::info!(instance = %instance.name, image_name = %name, %image_id, "image created");

    let tags = [
        (SOURCE_INSTANCE_TAG.to_string(), instance.id.clone()),
        (CREATED_ON_TAG.to_string(), date_label(today)),
    ];
    if let Err(error) = service.tag_image(&image_id, &tags).await {
        tracing::warn!(instance = %instance.name, %image_id, %error, "error tagging image");
    }

    CreateOutcome::Created {
        image_name: name,
        image_id,
    }
}

pub async fn prune_image<S>(
    service: &S,
    instance: &InstanceDescriptor,
    stale_date: NaiveDate,
) -> PruneOutcome
where
    S: ImageService + ?Sized,
{
    let name = image_name(&instance.name, stale_date);
    tracing::info!(instance = %instance.name, image_name = %name, "searching for stale image");

    match prune_by_name(service, instance, &name).await {
        Ok(Some((image_id, snapshot_id))) => PruneOutcome::Pruned {
            image_name: name,
            image_id,
            snapshot_id,
        },
        Ok(None) => {
            tracing::info!(instance = %instance.name, image_name = %name, "no stale image found");
            PruneOutcome::NothingToPrune { image_name: name }
        }
        Err(error) => {
            tracing::error!(
                instance = %instance.name,
                image_name = %name,
                %error,
                "error deleting stale image"
            );
            PruneOutcome::Failed {
                image_name: name,
                reason: error.to_string(),
            }
        }
    }
}

/// Deregisters before deleting: a snapshot still backing an image cannot be deleted.
async fn prune_by_name<S>(
    service: &S,
    instance: &InstanceDescriptor,
    name: &str,
) -> Result<Option<(String, String)>>
where
    S: ImageService + ?Sized,
{
    let images = service.find_owned_images(name).await?;
    let image = match images.into_iter().next() {
        Some(image) => image,
        None => return Ok(None),
    };
    let snapshot_id = image
        .snapshot_id
        .ok_or_else(|| ChoreError::MissingSnapshot(image.image_id.clone()))?;

    service.deregister_image(&image.image_id).await?;
    tracing::info!(instance = %instance.name, image_id = %image.image_id, "image deregistered");

    if let Err(error) = service.delete_snapshot(&snapshot_id).await {
        tracing::warn!(
            instance = %instance.name,
            image_id = %image.image_id,
            %snapshot_id,
            "image deregistered but its snapshot was kept"
        );
        return Err(error);
    }
    tracing::info!(instance = %instance.name, %snapshot_id, "snapshot deleted");

    Ok(Some((image.image_id, snapshot_id)))
}

/// Runs create then prune for every instance, in registry order.
pub async fn run_lifecycle<F, S>(
    config: &ImageLifecycleConfig,
    today: NaiveDate,
    client_for: F,
) -> Result<LifecycleReport>
where
    F: Fn(&str) -> Result<S>,
    S: ImageService,
{
    let stale_date = days_before(today, config.retention_days)?;
    tracing::info!(
        today = %today,
        stale_date = %stale_date,
        instances = config.instances.len(),
        "starting image lifecycle"
    );

    let mut instances = Vec::with_capacity(config.instances.len());
    for instance in &config.instances {
        let (create, prune) = match client_for(&instance.region) {
            Ok(service) => (
                create_image(&service, instance, today).await,
                prune_image(&service, instance, stale_date).await,
            ),
            Err(error) => {
                tracing::error!(
                    instance = %instance.name,
                    region = %instance.region,
                    %error,
                    "error creating regional client"
                );
                let reason = error.to_string();
                (
                    CreateOutcome::Failed {
                        image_name: image_name(&instance.name, today),
                        reason: reason.clone(),
                    },
                    PruneOutcome::Failed {
                        image_name: image_name(&instance.name, stale_date),
                        reason,
                    },
                )
            }
        };
        instances.push(InstanceReport {
            instance_id: instance.id.clone(),
            instance_name: instance.name.clone(),
            region: instance.region.clone(),
            create,
            prune,
        });
    }

    Ok(LifecycleReport {
        today: date_label(today),
        stale_date: date_label(stale_date),
        instances,
    })
}
