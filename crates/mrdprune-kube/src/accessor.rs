//! Generic resource access by group-version-resource
//!
//! The accessor is the only component that talks to the API server. It lists
//! and deletes objects of arbitrary kinds, decoding nothing beyond the
//! generic [`ResourceRecord`] shape. There are no retries at this layer:
//! callers decide what a failure means.
//!
//! Dry-run deletion is delegated to the server (`dryRun=All`) so admission
//! and validation run against the live cluster without mutating it.

use async_trait::async_trait;
use kube::{
    Client,
    api::{Api, DeleteParams, DynamicObject, ListParams},
    discovery::ApiResource,
};
use tracing::debug;

use mrdprune_core::{GroupVersionResource, InstanceCount, OwnerReference, ResourceRecord};

use crate::config::ConnectionConfig;
use crate::error::{KubeError, Result};
use crate::rate_limit::RateLimiter;

/// List and delete capability over arbitrary resource kinds
///
/// Implementations must be Send + Sync so one accessor can serve many
/// concurrent listers.
#[async_trait]
pub trait ResourceAccessor: Send + Sync {
    /// List every object of a kind, across all namespaces
    async fn list(&self, gvr: &GroupVersionResource) -> Result<Vec<ResourceRecord>>;

    /// Count objects of a kind, reading at most one page
    ///
    /// The count is a lower bound when more pages exist.
    async fn count(&self, gvr: &GroupVersionResource) -> Result<InstanceCount> {
        Ok(InstanceCount::exact(self.list(gvr).await?.len()))
    }

    /// Delete one cluster-scoped object by name
    ///
    /// With `dry_run` the server validates the request and changes nothing.
    async fn delete(&self, gvr: &GroupVersionResource, name: &str, dry_run: bool) -> Result<()>;
}

/// Accessor backed by a live Kubernetes API server
pub struct KubeAccessor {
    client: Client,
    limiter: RateLimiter,
    page_size: u32,
}

impl KubeAccessor {
    /// Build a client from connection settings
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let kube_config = config.kube_config().await?;
        debug!(cluster = %kube_config.cluster_url, "building kube client");
        let client = Client::try_from(kube_config)?;
        Ok(Self::with_client(client, config))
    }

    /// Wrap an existing client
    pub fn with_client(client: Client, config: &ConnectionConfig) -> Self {
        Self {
            client,
            limiter: RateLimiter::new(config.qps, config.burst),
            page_size: config.page_size.max(1),
        }
    }

    fn api(&self, gvr: &GroupVersionResource) -> Api<DynamicObject> {
        Api::all_with(self.client.clone(), &api_resource(gvr))
    }
}

#[async_trait]
impl ResourceAccessor for KubeAccessor {
    async fn list(&self, gvr: &GroupVersionResource) -> Result<Vec<ResourceRecord>> {
        let api = self.api(gvr);
        let mut params = ListParams::default().limit(self.page_size);
        let mut records = Vec::new();

        loop {
            self.limiter.acquire().await;
            let page = api.list(&params).await.map_err(|source| KubeError::List {
                gvr: gvr.to_string(),
                source,
            })?;

            let next = page.metadata.continue_.clone().filter(|t| !t.is_empty());
            records.extend(page.items.into_iter().map(to_record));

            match next {
                Some(token) => params = params.continue_token(&token),
                None => break,
            }
        }

        debug!(gvr = %gvr, items = records.len(), "listed");
        Ok(records)
    }

    async fn count(&self, gvr: &GroupVersionResource) -> Result<InstanceCount> {
        let params = ListParams::default().limit(self.page_size);

        self.limiter.acquire().await;
        let page = self
            .api(gvr)
            .list(&params)
            .await
            .map_err(|source| KubeError::List {
                gvr: gvr.to_string(),
                source,
            })?;

        let seen = page.items.len();
        let has_next = page.metadata.continue_.is_some_and(|t| !t.is_empty());
        let count = match page.metadata.remaining_item_count {
            Some(remaining) if has_next => InstanceCount::exact(seen + remaining.max(0) as usize),
            _ => InstanceCount {
                seen,
                more: has_next,
            },
        };

        debug!(gvr = %gvr, %count, "counted");
        Ok(count)
    }

    async fn delete(&self, gvr: &GroupVersionResource, name: &str, dry_run: bool) -> Result<()> {
        let params = DeleteParams {
            dry_run,
            ..DeleteParams::default()
        };

        self.limiter.acquire().await;
        self.api(gvr)
            .delete(name, &params)
            .await
            .map_err(|source| KubeError::Delete {
                gvr: gvr.to_string(),
                name: name.to_string(),
                source,
            })?;

        debug!(gvr = %gvr, name, dry_run, "delete accepted");
        Ok(())
    }
}

/// Build an `ApiResource` straight from a GVR, without a discovery round trip
///
/// Only group, version and plural shape the request path; the kind is left
/// empty because nothing here creates objects.
pub fn api_resource(gvr: &GroupVersionResource) -> ApiResource {
    ApiResource {
        group: gvr.group.clone(),
        version: gvr.version.clone(),
        api_version: gvr.api_version(),
        kind: String::new(),
        plural: gvr.resource.clone(),
    }
}

/// Flatten a dynamic object into the generic record shape
pub fn to_record(obj: DynamicObject) -> ResourceRecord {
    let owner_references = obj
        .metadata
        .owner_references
        .unwrap_or_default()
        .into_iter()
        .map(|o| OwnerReference {
            api_version: o.api_version,
            kind: o.kind,
            name: o.name,
            uid: o.uid,
        })
        .collect();

    ResourceRecord {
        name: obj.metadata.name.unwrap_or_default(),
        uid: obj.metadata.uid,
        owner_references,
        body: obj.data,
    }
}
