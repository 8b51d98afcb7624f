//! Cache keys and writes for intermediate hazard results.
//!
//! Ground-motion values are written one entry per (rupture, site) pair under
//! keys derived only from the batch's rupture index and the site location, so
//! the key set never depends on execution order. Job-scoped hazard curve keys
//! follow the same rule with a site digest suffix.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::adapters::CacheStore;
use crate::domain::{
    canonical_decimal, BatchReport, EventType, FailurePolicy, GroundMotionFields, HazardCurve,
    RunKind, Site,
};

use super::error::{HazardError, HazardResult};
use super::reporter::{Reporter, RunRecorder, TracingReporter};

/// Derives the cache key of one ground-motion value
pub trait KeyScheme: Send + Sync {
    /// Key for the value at `site` in the batch identified by `rupture_index`
    fn key(&self, rupture_index: i64, site: &Site) -> String;
}

/// `{rupture_index}_{latitude}_{longitude}`
///
/// The rupture index stands in for a model identifier; every rupture in one
/// batch shares it, so the same site in two ruptures maps to the same key.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuptureIndexKeys;

impl KeyScheme for RuptureIndexKeys {
    fn key(&self, rupture_index: i64, site: &Site) -> String {
        format!(
            "{}_{}_{}",
            rupture_index,
            site.latitude_text(),
            site.longitude_text()
        )
    }
}

/// `{prefix}:{rupture_index}:{sha256(lat,lon)[..16]}`
///
/// Fixed-length keys for stores with key size limits.
#[derive(Debug, Clone)]
pub struct DigestKeys {
    prefix: String,
}

impl DigestKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl KeyScheme for DigestKeys {
    fn key(&self, rupture_index: i64, site: &Site) -> String {
        format!("{}:{}:{}", self.prefix, rupture_index, site.digest())
    }
}

/// Job-scoped keys for hazard curves and hazard maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveKeys {
    job_id: String,
}

impl CurveKeys {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// PoEs of one realization's curve
    pub fn realization_curve(&self, realization: u32, site: &Site) -> String {
        format!("{}:hazard_curve_poes:{}:{}", self.job_id, realization, site.digest())
    }

    /// Mean curve across realizations
    pub fn mean_curve(&self, site: &Site) -> String {
        format!("{}:mean_hazard_curve:{}", self.job_id, site.digest())
    }

    /// Quantile curve across realizations
    pub fn quantile_curve(&self, quantile: f64, site: &Site) -> String {
        format!(
            "{}:quantile_hazard_curve:{}:{}",
            self.job_id,
            canonical_decimal(quantile),
            site.digest()
        )
    }

    /// Mean hazard map level at a PoE
    pub fn mean_map(&self, poe: f64, site: &Site) -> String {
        format!(
            "{}:mean_hazard_map:{}:{}",
            self.job_id,
            canonical_decimal(poe),
            site.digest()
        )
    }

    /// Quantile hazard map level at a PoE
    pub fn quantile_map(&self, poe: f64, quantile: f64, site: &Site) -> String {
        format!(
            "{}:quantile_hazard_map:{}:{}:{}",
            self.job_id,
            canonical_decimal(poe),
            canonical_decimal(quantile),
            site.digest()
        )
    }
}

/// A ground-motion write rejected by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheWriteFailure {
    pub key: String,
    pub rupture_index: i64,
    pub site: Site,
    pub error: String,
}

/// A hazard curve write rejected by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveWriteFailure {
    pub key: String,
    pub realization: u32,
    pub site: Site,
    pub error: String,
}

/// Outcome of a persist call
#[derive(Debug, Clone)]
pub struct PersistReport {
    /// Keys written, in write order (collisions appear once per write)
    pub keys: Vec<String>,

    /// Writes the store rejected (only under [`FailurePolicy::Partial`])
    pub failures: Vec<CacheWriteFailure>,

    /// Per-key batch report
    pub report: BatchReport,
}

/// Outcome of a curve persist call
#[derive(Debug, Clone)]
pub struct CurvePersistReport {
    /// Keys written, in site order
    pub keys: Vec<String>,

    /// Writes the store rejected (only under [`FailurePolicy::Partial`])
    pub failures: Vec<CurveWriteFailure>,

    /// Per-key batch report
    pub report: BatchReport,
}

/// Outcome of a release call
#[derive(Debug, Clone)]
pub struct PurgeReport {
    /// Every key purged, in purge order
    pub keys: Vec<String>,

    /// How many of those keys existed in the store
    pub removed: usize,

    pub report: BatchReport,
}

/// Writes hazard results to a cache store
pub struct CacheAdapter {
    scheme: Arc<dyn KeyScheme>,
    reporter: Arc<dyn Reporter>,
    policy: FailurePolicy,
}

impl Default for CacheAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheAdapter {
    /// Adapter using [`RuptureIndexKeys`] and reporting through `tracing`
    pub fn new() -> Self {
        Self {
            scheme: Arc::new(RuptureIndexKeys),
            reporter: Arc::new(TracingReporter),
            policy: FailurePolicy::default(),
        }
    }

    /// Use a different key scheme
    pub fn with_scheme(mut self, scheme: Arc<dyn KeyScheme>) -> Self {
        self.scheme = scheme;
        self
    }

    /// Report through a custom reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Choose how rejected writes affect the batch
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Key the configured scheme derives for a value
    pub fn key_for(&self, rupture_index: i64, site: &Site) -> String {
        self.scheme.key(rupture_index, site)
    }

    /// Write every (rupture, site) value and return the keys used.
    ///
    /// Two values resolving to the same key are both written; the later one
    /// wins in the store and both keys are returned.
    #[instrument(skip_all, fields(rupture_index = rupture_index, ruptures = fields.len()))]
    pub async fn persist(
        &self,
        fields: &GroundMotionFields,
        rupture_index: i64,
        store: &dyn CacheStore,
    ) -> HazardResult<PersistReport> {
        let mut recorder = RunRecorder::start(
            self.reporter.clone(),
            RunKind::CachePersist,
            format!(
                "Persisting {} ground-motion values under rupture index {}",
                fields.value_count(),
                rupture_index
            ),
        );

        let mut keys = Vec::with_capacity(fields.value_count());
        let mut failures = Vec::new();

        for entry in fields {
            for (site, value) in entry.field.iter() {
                let key = self.scheme.key(rupture_index, site);
                let started = Instant::now();

                match store.set(&key, value).await {
                    Ok(()) => {
                        recorder.success(
                            key.clone(),
                            EventType::CacheWritten,
                            format!("Cached rupture {} at {}", entry.rupture.id, site),
                            started.elapsed().as_millis() as u64,
                        );
                        keys.push(key);
                    }
                    Err(source) => {
                        let err = HazardError::CacheWrite {
                            key: key.clone(),
                            rupture_index,
                            site: *site,
                            source,
                        };
                        recorder.failure(
                            key.clone(),
                            EventType::CacheWriteFailed,
                            format!("Cache write rejected for rupture {} at {}", entry.rupture.id, site),
                            err.to_string(),
                        );

                        if self.policy == FailurePolicy::AllOrNothing {
                            recorder.abort(err.to_string());
                            return Err(err);
                        }

                        failures.push(CacheWriteFailure {
                            key,
                            rupture_index,
                            site: *site,
                            error: err.to_string(),
                        });
                    }
                }
            }
        }

        let report = recorder.finish(format!("Wrote {} cache entries", keys.len()));
        Ok(PersistReport {
            keys,
            failures,
            report,
        })
    }

    /// Write the PoE array of each site's curve for one realization.
    ///
    /// Sites without a curve are skipped. Returns the keys written, in site
    /// order, and under [`FailurePolicy::Partial`] the rejected writes.
    #[instrument(skip_all, fields(job_id = keys.job_id(), realization = realization))]
    pub async fn persist_curves(
        &self,
        keys: &CurveKeys,
        realization: u32,
        sites: &[Site],
        curves: &HashMap<Site, HazardCurve>,
        store: &dyn CacheStore,
    ) -> HazardResult<CurvePersistReport> {
        let mut recorder = RunRecorder::start(
            self.reporter.clone(),
            RunKind::CachePersist,
            format!(
                "Persisting hazard curves of realization {} for job {}",
                realization,
                keys.job_id()
            ),
        );

        let mut written = Vec::with_capacity(sites.len());
        let mut failures = Vec::new();

        for site in sites {
            let Some(curve) = curves.get(site) else {
                continue;
            };
            let key = keys.realization_curve(realization, site);
            let started = Instant::now();

            match store.set_json(&key, &curve.poes_json()).await {
                Ok(()) => {
                    recorder.success(
                        key.clone(),
                        EventType::CacheWritten,
                        format!("Cached hazard curve for {}", site),
                        started.elapsed().as_millis() as u64,
                    );
                    written.push(key);
                }
                Err(source) => {
                    let err = HazardError::CacheEntry {
                        key: key.clone(),
                        source,
                    };
                    recorder.failure(
                        key.clone(),
                        EventType::CacheWriteFailed,
                        format!("Cache write rejected for hazard curve at {}", site),
                        err.to_string(),
                    );

                    if self.policy == FailurePolicy::AllOrNothing {
                        recorder.abort(err.to_string());
                        return Err(err);
                    }

                    failures.push(CurveWriteFailure {
                        key,
                        realization,
                        site: *site,
                        error: err.to_string(),
                    });
                }
            }
        }

        let report = recorder.finish(format!("Wrote {} hazard curves", written.len()));
        Ok(CurvePersistReport {
            keys: written,
            failures,
            report,
        })
    }

    /// Delete a block's intermediate curve and map entries.
    ///
    /// Purges per-realization curves, mean curves, quantile curves with their
    /// maps, then mean maps. Returns every key purged, in that order. When a
    /// delete fails, the error lists the keys already purged.
    #[instrument(skip_all, fields(job_id = keys.job_id(), sites = sites.len()))]
    pub async fn release(
        &self,
        keys: &CurveKeys,
        sites: &[Site],
        realizations: u32,
        quantiles: &[f64],
        poes: &[f64],
        store: &dyn CacheStore,
    ) -> HazardResult<PurgeReport> {
        let mut groups: Vec<Vec<String>> = Vec::new();

        for realization in 0..realizations {
            groups.push(
                sites
                    .iter()
                    .map(|site| keys.realization_curve(realization, site))
                    .collect(),
            );
        }

        groups.push(sites.iter().map(|site| keys.mean_curve(site)).collect());

        for &quantile in quantiles {
            let mut group: Vec<String> = sites
                .iter()
                .map(|site| keys.quantile_curve(quantile, site))
                .collect();
            for &poe in poes {
                group.extend(sites.iter().map(|site| keys.quantile_map(poe, quantile, site)));
            }
            groups.push(group);
        }

        for &poe in poes {
            groups.push(sites.iter().map(|site| keys.mean_map(poe, site)).collect());
        }

        let mut recorder = RunRecorder::start(
            self.reporter.clone(),
            RunKind::CachePurge,
            format!("Releasing cache entries of job {}", keys.job_id()),
        );

        let mut purged = Vec::new();
        let mut removed = 0usize;

        for group in groups {
            match store.delete(&group).await {
                Ok(count) => removed += count,
                Err(source) => {
                    if !purged.is_empty() {
                        recorder.note(
                            None,
                            EventType::CachePurged,
                            format!("Purged {} keys before the store failed", purged.len()),
                        );
                    }
                    let err = HazardError::CacheDelete {
                        count: group.len(),
                        purged,
                        source,
                    };
                    recorder.abort(err.to_string());
                    return Err(err);
                }
            }
            purged.extend(group);
        }

        recorder.note(
            None,
            EventType::CachePurged,
            format!(
                "Purged {} keys ({} present) for {} sites",
                purged.len(),
                removed,
                sites.len()
            ),
        );
        let report = recorder.finish(format!("Released {} keys", purged.len()));

        Ok(PurgeReport {
            keys: purged,
            removed,
            report,
        })
    }
}
