//! Bucket step
//!
//! The bucket is seeded once. Later runs never re-upload, even when the
//! local files changed.

use super::{StepContext, StepResult};
use crate::action::{Action, ActionType};
use crate::outcome::Failure;
use crate::state::{Acl, ResourceKind};

/// Objects uploaded right after the bucket is created
pub const SEED_OBJECTS: [&str; 2] = ["index.html", "404.html"];

const SEED_CONTENT_TYPE: &str = "text/html";

pub async fn run(cx: &mut StepContext<'_>) -> StepResult<()> {
    let config = cx.config;
    let bucket = config.bucket();

    if cx.probe().bucket_exists(bucket).await? {
        cx.record(Action::new(
            ActionType::NoOp,
            ResourceKind::Bucket,
            bucket,
            "bucket exists",
        ));
        return Ok(());
    }

    tracing::info!(bucket, "creating bucket");
    cx.backends
        .storage
        .create_bucket(bucket, Acl::PublicRead)
        .await
        .map_err(|e| Failure::create(ResourceKind::Bucket, e))?;
    cx.record(
        Action::new(
            ActionType::Create,
            ResourceKind::Bucket,
            bucket,
            "created bucket",
        )
        .with_detail("acl", serde_json::json!(Acl::PublicRead.as_str())),
    );

    // No cleanup on failure: a half-seeded bucket stays and is not re-seeded.
    for key in SEED_OBJECTS {
        let body = cx
            .backends
            .assets
            .load(key)
            .await
            .map_err(|e| Failure::create(ResourceKind::Object, e))?;

        tracing::info!(bucket, key, bytes = body.len(), "uploading object");
        cx.backends
            .storage
            .put_object(bucket, key, body, SEED_CONTENT_TYPE, Acl::PublicRead)
            .await
            .map_err(|e| Failure::create(ResourceKind::Object, e))?;
        cx.record(Action::new(
            ActionType::Create,
            ResourceKind::Object,
            format!("{bucket}/{key}"),
            format!("uploaded {key}"),
        ));
    }

    Ok(())
}
