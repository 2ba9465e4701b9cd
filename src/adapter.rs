//! Sync Adapter
//!
//! Entry point for a sync call: derive the request identity, read through the
//! cache, dispatch on a miss, write back on success, and settle exactly once.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheClient, CacheEntry, CacheGateway};
use crate::config::SyncConfig;
use crate::dispatch::{RequestDispatcher, RequestHook};
use crate::error::Result;
use crate::intent::Intent;
use crate::options::SyncOptions;
use crate::request::{derive, RequestDescriptor};
use crate::resolve::{Outcome, ResolverState, Settlement};
use crate::resource::{Model, Resource};
use crate::transport::{HttpTransport, Transport};

// == Sync Adapter ==
/// Configured adapter; cheap to clone and safe to share between tasks.
///
/// Several adapters with different configurations can coexist in one
/// process.
#[derive(Debug, Clone)]
pub struct SyncAdapter {
    config: SyncConfig,
    cache: CacheGateway,
    dispatcher: RequestDispatcher,
}

impl SyncAdapter {
    /// Adapter with default config, the reqwest transport and no cache.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> SyncAdapterBuilder {
        SyncAdapterBuilder::default()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // == Sync ==
    /// Runs `intent` against `resource`.
    ///
    /// The returned result and the callbacks on `options` always agree, and
    /// each fires at most once. On success `options.response` holds the
    /// response headers.
    ///
    /// # Arguments
    /// * `intent` - Operation to perform
    /// * `resource` - Target resource
    /// * `options` - Per-call options; callbacks are taken out and consumed
    ///
    /// # Returns
    /// The response body, or the error the call was rejected with.
    pub async fn sync(
        &self,
        intent: Intent,
        resource: &dyn Resource,
        options: &mut SyncOptions,
    ) -> Result<Value> {
        let mut settlement = Settlement::new(options);

        let descriptor = match derive(intent, resource, options, &self.config, self.cache.is_enabled())
        {
            Ok(descriptor) => descriptor,
            Err(err) => return settlement.settle(Outcome::Failure(err), options),
        };

        debug!(
            %intent,
            url = %descriptor.target_url,
            cache = descriptor.cache_enabled,
            "sync started"
        );
        resource.on_request(intent, options);

        let outcome = self
            .run(&mut settlement, &descriptor, intent, resource, options)
            .await;
        settlement.settle(outcome, options)
    }

    async fn run(
        &self,
        settlement: &mut Settlement,
        descriptor: &RequestDescriptor,
        intent: Intent,
        resource: &dyn Resource,
        options: &SyncOptions,
    ) -> Outcome {
        if descriptor.cache_enabled {
            settlement.transition(ResolverState::CacheCheck);
            match self.cache.lookup(&descriptor.cache_key).await {
                Ok(Some(entry)) => {
                    settlement.transition(ResolverState::CacheHit);
                    return Outcome::Success {
                        response: entry.into(),
                        cached: true,
                    };
                }
                Ok(None) => settlement.transition(ResolverState::CacheMiss),
                Err(err) => return Outcome::Failure(err),
            }
        }

        settlement.transition(ResolverState::Sending);
        match self
            .dispatcher
            .dispatch(descriptor, intent, resource, options)
            .await
        {
            Ok(response) => {
                if descriptor.cache_enabled {
                    self.cache
                        .store(
                            &descriptor.cache_key,
                            &CacheEntry::from(&response),
                            descriptor.cache_ttl,
                        )
                        .await;
                }
                Outcome::Success {
                    response,
                    cached: false,
                }
            }
            Err(err) => Outcome::Failure(err),
        }
    }

    // == Convenience ==
    pub async fn create(&self, resource: &dyn Resource, options: &mut SyncOptions) -> Result<Value> {
        self.sync(Intent::Create, resource, options).await
    }

    pub async fn read(&self, resource: &dyn Resource, options: &mut SyncOptions) -> Result<Value> {
        self.sync(Intent::Read, resource, options).await
    }

    pub async fn update(&self, resource: &dyn Resource, options: &mut SyncOptions) -> Result<Value> {
        self.sync(Intent::Update, resource, options).await
    }

    pub async fn delete(&self, resource: &dyn Resource, options: &mut SyncOptions) -> Result<Value> {
        self.sync(Intent::Delete, resource, options).await
    }

    pub async fn patch(&self, resource: &dyn Resource, options: &mut SyncOptions) -> Result<Value> {
        self.sync(Intent::Patch, resource, options).await
    }

    /// Reads `model` and merges the response body into its attributes.
    pub async fn fetch(&self, model: &mut Model, options: &mut SyncOptions) -> Result<Value> {
        let body = self.sync(Intent::Read, &*model, options).await?;
        model.merge(&body);
        Ok(body)
    }
}

impl Default for SyncAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// == Builder ==
/// Assembles a [`SyncAdapter`] from explicit collaborators.
#[derive(Default)]
pub struct SyncAdapterBuilder {
    config: SyncConfig,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<dyn CacheClient>>,
    hook: Option<RequestHook>,
}

impl SyncAdapterBuilder {
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enables read-through caching for calls that ask for it.
    pub fn cache_client(mut self, cache: Arc<dyn CacheClient>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn request_hook(mut self, hook: RequestHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn build(self) -> SyncAdapter {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));
        let cache = match self.cache {
            Some(client) => CacheGateway::new(client),
            None => CacheGateway::disabled(),
        };

        SyncAdapter {
            config: self.config,
            cache,
            dispatcher: RequestDispatcher::new(transport, self.hook),
        }
    }
}
