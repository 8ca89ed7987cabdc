//! The analysis orchestrator: ties fingerprinting, cache lookup, throttle
//! check, client invocation, normalization, and write-through into one
//! operation with a uniform result contract.
//!
//! No typed error crosses the [`ScreenerService::analyze`] boundary:
//! every failure becomes an [`AnalysisResult`] with `success == false`
//! and a taxonomy discriminant.

pub mod legacy;
pub mod simulation;

use partsight_cache::{AnalysisCache, CacheError};
use partsight_client::{ScreenerClient, ScreenerError, response};
use partsight_core::{AnalysisResult, ErrorKind, ScreenerConfig, query_fingerprint};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Construction-time failures. Per-call failures never surface here.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] partsight_core::ConfigError),
    #[error("cache initialisation failed: {0}")]
    Cache(#[from] CacheError),
    #[error("client initialisation failed: {0}")]
    Client(String),
}

/// Configuration snapshot reported by [`ScreenerService::status`].
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub configured: bool,
    pub cache_ttl_hours: u64,
    pub throttle_minutes: u64,
    pub default_rows: u32,
    pub max_rows: u32,
}

/// Public entry point for patent-risk analysis.
pub struct ScreenerService {
    config: ScreenerConfig,
    client: ScreenerClient,
    cache: AnalysisCache,
}

impl ScreenerService {
    /// Build the service. Fatal if the API key is missing from `config`'s
    /// source or the cache directory cannot be created.
    pub fn new(config: ScreenerConfig) -> Result<Self, ServiceError> {
        let client = ScreenerClient::new(config.clone())
            .map_err(|err| ServiceError::Client(err.to_string()))?;
        let cache = AnalysisCache::open(
            &config.cache_dir,
            config.cache_ttl_hours,
            config.throttle_minutes,
        )?;
        info!(cache_dir = %config.cache_dir.display(), "patent screening service initialised");
        Ok(Self {
            config,
            client,
            cache,
        })
    }

    /// Build the service from `IPS_*` environment variables.
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::new(ScreenerConfig::from_env()?)
    }

    /// Analyze one component against the upstream patent service.
    ///
    /// Order of checks: input validation, cache lookup (hit short-circuits
    /// everything), throttle, then at most one upstream submission with an
    /// optional single token-resolution follow-up. Successful results are
    /// written through to the cache; failures are returned uncached.
    pub async fn analyze(
        &self,
        component_name: &str,
        component_description: &str,
        reference: &str,
    ) -> AnalysisResult {
        if component_name.trim().is_empty() {
            return AnalysisResult::failure(ErrorKind::Validation, "component_name is required");
        }
        if component_description.trim().is_empty() {
            return AnalysisResult::failure(
                ErrorKind::Validation,
                "component_description is required",
            );
        }

        let fingerprint = query_fingerprint(component_name, component_description, reference);

        if let Some(mut cached) = self.cache.get(&fingerprint) {
            info!(component = component_name, "returning cached analysis");
            cached.from_cache = true;
            return cached;
        }

        if self.cache.is_throttled(&fingerprint) {
            warn!(component = component_name, "query throttled");
            return AnalysisResult::throttled(self.config.throttle_window_secs())
                .with_query_info(component_name, component_description, reference);
        }

        // Arm the throttle before the upstream call so failed attempts
        // are rate-limited too.
        self.cache.mark_attempt(&fingerprint);

        match self
            .run_analysis(component_name, component_description, reference)
            .await
        {
            Ok(result) => {
                self.cache.put(&fingerprint, &result);
                result
            }
            Err(err) => {
                warn!(component = component_name, error = %err, "analysis failed");
                AnalysisResult::failure(err.kind(), err.to_string())
                    .with_query_info(component_name, component_description, reference)
            }
        }
    }

    async fn run_analysis(
        &self,
        component_name: &str,
        component_description: &str,
        reference: &str,
    ) -> Result<AnalysisResult, ScreenerError> {
        let (token, initial) = self
            .client
            .submit_query(component_name, component_description, reference, None)
            .await?;

        // When the upstream goes asynchronous, resolve once with the
        // session token. No polling loop: a token whose results are not
        // ready after one follow-up surfaces as whatever that response
        // normalizes to.
        let body = match token {
            Some(token) if !response::has_result_data(&initial) => {
                self.client.get_results(&token, true).await?
            }
            _ => initial,
        };

        let patents = response::normalize_patents(&body)?;
        info!(
            component = component_name,
            count = patents.len(),
            "analysis complete"
        );
        Ok(AnalysisResult::ok(component_name, patents).with_query_info(
            component_name,
            component_description,
            reference,
        ))
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            configured: !self.config.data_key.is_empty(),
            cache_ttl_hours: self.config.cache_ttl_hours,
            throttle_minutes: self.config.throttle_minutes,
            default_rows: self.config.default_rows,
            max_rows: self.config.max_rows,
        }
    }

    /// Drop every cached entry and throttle marker.
    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear()?;
        info!("analysis cache cleared");
        Ok(())
    }
}
