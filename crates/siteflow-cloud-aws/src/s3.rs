//! S3 object storage

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration, ObjectCannedAcl,
    ObjectOwnership,
};
use siteflow_cloud::{Acl, ObjectStorage};

/// Region S3 creates buckets in when no location constraint is given
const DEFAULT_BUCKET_REGION: &str = "us-east-1";

pub struct S3Storage {
    client: Client,
    region: String,
}

impl S3Storage {
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    async fn head_bucket(&self, bucket: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(AwsError::sdk("HeadBucket", err)),
        }
    }

    /// New buckets block public ACLs, so the bucket is created with
    /// writer-owned objects, unblocked, and only then given its ACL.
    async fn create_public_bucket(&self, bucket: &str, acl: Acl) -> Result<()> {
        let mut request = self
            .client
            .create_bucket()
            .bucket(bucket)
            .object_ownership(ObjectOwnership::from("ObjectWriter"));
        if self.region != DEFAULT_BUCKET_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|e| AwsError::sdk("CreateBucket", e))?;

        self.client
            .delete_public_access_block()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::sdk("DeletePublicAccessBlock", e))?;

        self.client
            .put_bucket_acl()
            .bucket(bucket)
            .acl(BucketCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(|e| AwsError::sdk("PutBucketAcl", e))?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        acl: Acl,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(|e| AwsError::sdk("PutObject", e))?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn bucket_exists(&self, bucket: &str) -> siteflow_cloud::Result<bool> {
        Ok(self.head_bucket(bucket).await?)
    }

    async fn create_bucket(&self, bucket: &str, acl: Acl) -> siteflow_cloud::Result<()> {
        tracing::debug!(bucket, region = %self.region, "CreateBucket");
        Ok(self.create_public_bucket(bucket, acl).await?)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        acl: Acl,
    ) -> siteflow_cloud::Result<()> {
        tracing::debug!(bucket, key, "PutObject");
        Ok(self.upload(bucket, key, body, content_type, acl).await?)
    }
}
