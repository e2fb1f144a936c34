use std::str::FromStr;

use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_ec2::{
    CreateImageRequest, CreateTagsRequest, DeleteSnapshotRequest, DeregisterImageRequest,
    DescribeImagesRequest, Ec2, Ec2Client, Filter, Image, Tag,
};

use crate::error::{ChoreError, Result};

/// An image owned by the caller, reduced to what pruning needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub image_id: String,
    pub name: Option<String>,
    /// Snapshot behind the first block-device mapping, the root volume.
    pub snapshot_id: Option<String>,
}

impl ImageRecord {
    fn from_image(image: Image) -> Result<Self> {
        let snapshot_id = image
            .block_device_mappings
            .and_then(|mappings| mappings.into_iter().next())
            .and_then(|mapping| mapping.ebs)
            .and_then(|ebs| ebs.snapshot_id);
        Ok(ImageRecord {
            image_id: image.image_id.ok_or(ChoreError::NoneValue("image id"))?,
            name: image.name,
            snapshot_id,
        })
    }
}

#[async_trait]
pub trait ImageService {
    async fn create_image(&self, instance_id: &str, name: &str, description: &str)
        -> Result<String>;
    async fn tag_image(&self, image_id: &str, tags: &[(String, String)]) -> Result<()>;
    async fn find_owned_images(&self, name: &str) -> Result<Vec<ImageRecord>>;
    async fn deregister_image(&self, image_id: &str) -> Result<()>;
    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()>;
}

pub struct Ec2ImageClient {
    client: Ec2Client,
}

impl Ec2ImageClient {
    pub fn for_region(region: &str) -> Result<Self> {
        Ok(Self::new_with_client(Ec2Client::new(Region::from_str(region)?)))
    }

    fn new_with_client(client: Ec2Client) -> Self {
        Ec2ImageClient { client }
    }
}

#[async_trait]
impl ImageService for Ec2ImageClient {
    async fn create_image(
        &self,
        instance_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let result = self
            .client
            .create_image(CreateImageRequest {
                instance_id: instance_id.to_string(),
                name: name.to_string(),
                description: Some(description.to_string()),
                no_reboot: Some(true),
                ..CreateImageRequest::default()
            })
            .await?;
        result.image_id.ok_or(ChoreError::NoneValue("created image id"))
    }

    async fn tag_image(&self, image_id: &str, tags: &[(String, String)]) -> Result<()> {
        self.client
            .create_tags(CreateTagsRequest {
                resources: vec![image_id.to_string()],
                tags: tags
                    .iter()
                    .map(|(key, value)| Tag {
                        key: Some(key.clone()),
                        value: Some(value.clone()),
                    })
                    .collect(),
                ..CreateTagsRequest::default()
            })
            .await?;
        Ok(())
    }

    async fn find_owned_images(&self, name: &str) -> Result<Vec<ImageRecord>> {
        let result = self
            .client
            .describe_images(DescribeImagesRequest {
                filters: Some(vec![Filter {
                    name: Some("name".to_string()),
                    values: Some(vec![name.to_string()]),
                }]),
                owners: Some(vec!["self".to_string()]),
                ..DescribeImagesRequest::default()
            })
            .await?;

        let mut records = Vec::new();
        for image in result.images.unwrap_or_default() {
            records.push(ImageRecord::from_image(image)?);
        }
        Ok(records)
    }

    async fn deregister_image(&self, image_id: &str) -> Result<()> {
        self.client
            .deregister_image(DeregisterImageRequest {
                image_id: image_id.to_string(),
                ..DeregisterImageRequest::default()
            })
            .await?;
        Ok(())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        self.client
            .delete_snapshot(DeleteSnapshotRequest {
                snapshot_id: snapshot_id.to_string(),
                ..DeleteSnapshotRequest::default()
            })
            .await?;
        Ok(())
    }
}
