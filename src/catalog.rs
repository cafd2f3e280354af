use crate::config::Config;
use crate::errors::{BackupToolError, Result};
use crate::selector::{sort_newest_first, BackupEntry};
use crate::shared::constants::{BACKUP_SUFFIX, PREFIX_SEPARATOR};
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_sdk_s3::error::DisplayErrorContext;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tracing::debug;

/// Store path prefix, always ending in exactly one `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix(String);

impl Prefix {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim_end_matches(PREFIX_SEPARATOR);
        Prefix(format!("{}{}", trimmed, PREFIX_SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One object from a store listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupObject {
    pub key: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl BackupEntry for BackupObject {
    fn identity(&self) -> &str {
        &self.key
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

/// A single page of a listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<BackupObject>,
    pub next_token: Option<String>,
}

/// Readable body of a fetched object
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// List/get access to the remote object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one listing page under `prefix`, continuing from `token`
    async fn list_page(&self, prefix: &str, token: Option<String>) -> Result<ListPage>;

    /// Open an object for reading, `None` when the response carries no body
    async fn fetch(&self, key: &str) -> Result<Option<ObjectBody>>;
}

/// S3-compatible store (Cloudflare R2, MinIO, AWS)
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub async fn new(config: &Config) -> Self {
        let credentials = s3::config::Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "stream-backup-tools",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(s3::config::Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

fn convert_timestamp(time: &s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(time.secs(), time.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(&self, prefix: &str, token: Option<String>) -> Result<ListPage> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| {
                BackupToolError::from_sdk_message(
                    &DisplayErrorContext(&e).to_string(),
                    &format!("listing s3://{}/{}", self.bucket, prefix),
                )
            })?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|obj| {
                Some(BackupObject {
                    key: obj.key()?.to_string(),
                    size: obj.size().and_then(|s| u64::try_from(s).ok()),
                    last_modified: obj.last_modified().and_then(convert_timestamp),
                })
            })
            .collect();

        Ok(ListPage {
            objects,
            next_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn fetch(&self, key: &str) -> Result<Option<ObjectBody>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                BackupToolError::from_sdk_message(
                    &DisplayErrorContext(&e).to_string(),
                    &format!("retrieving s3://{}/{}", self.bucket, key),
                )
            })?;

        let body: ObjectBody = Box::pin(response.body.into_async_read());
        Ok(Some(body))
    }
}

/// Backup listing under a prefix
pub struct ObjectCatalog<S> {
    store: S,
    prefix: Prefix,
}

impl<S: ObjectStore> ObjectCatalog<S> {
    pub fn new(store: S, prefix: Prefix) -> Self {
        Self { store, prefix }
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every backup artifact under the prefix, newest first.
    ///
    /// Pages are fetched one after another until the store stops returning a
    /// continuation token. Any failed page aborts the whole listing.
    pub async fn list(&self) -> Result<Vec<BackupObject>> {
        let mut backups = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self.store.list_page(self.prefix.as_str(), token.take()).await?;
            pages += 1;
            debug!(page = pages, objects = page.objects.len(), "Fetched listing page");

            backups.extend(
                page.objects
                    .into_iter()
                    .filter(|obj| obj.key.ends_with(BACKUP_SUFFIX)),
            );

            match page.next_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }

        sort_newest_first(&mut backups);
        debug!(pages, backups = backups.len(), prefix = %self.prefix, "Listing complete");
        Ok(backups)
    }
}
