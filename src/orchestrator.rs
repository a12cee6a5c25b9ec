//! The bulk-translation job: detached, progress-tracked, per (tenant,
//! target language).
//!
//! The triggering request returns immediately; the job runs under
//! `tokio::spawn` with its own store handle and an outermost error boundary.
//! Polled lifecycle state is the sole observable contract: no job handles
//! are exposed. A single-flight registry rejects a second concurrent job
//! for the same (tenant, language) key.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::enumerator::{collect_units, job_total, UnitTarget};
use crate::lifecycle::TranslationStatus;
use crate::provider::TranslationProvider;
use crate::store::Store;

/// Single-flight guard over running jobs.
///
/// Holding a [`JobPermit`] marks the (tenant, language) key as busy; the key
/// is released when the permit drops, i.e. after the job's final status
/// write.
#[derive(Clone, Default)]
pub struct JobRegistry {
    running: Arc<Mutex<HashSet<(i64, String)>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the key, or `None` if a job for it is already running.
    pub fn try_acquire(&self, tenant_id: i64, language: &str) -> Option<JobPermit> {
        let mut running = self.running.lock().unwrap();
        let key = (tenant_id, language.to_string());
        if running.contains(&key) {
            return None;
        }
        running.insert(key.clone());
        Some(JobPermit {
            registry: Arc::clone(&self.running),
            key,
        })
    }

    pub fn is_running(&self, tenant_id: i64, language: &str) -> bool {
        self.running
            .lock()
            .unwrap()
            .contains(&(tenant_id, language.to_string()))
    }
}

pub struct JobPermit {
    registry: Arc<Mutex<HashSet<(i64, String)>>>,
    key: (i64, String),
}

impl Drop for JobPermit {
    fn drop(&mut self) {
        self.registry.lock().unwrap().remove(&self.key);
    }
}

/// Job-local progress accumulator, passed explicitly through the run.
///
/// Progress is `floor(done / total × 100)` clamped to at most 99 while work
/// remains; only the final status write may say 100. Checkpoints fire on
/// every 5th unit to bound write frequency.
pub struct ProgressTracker {
    total: usize,
    done: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total: total.max(1),
            done: 0,
        }
    }

    /// Count one processed unit; returns the percentage to persist when this
    /// unit closes a checkpoint interval.
    pub fn record_unit(&mut self) -> Option<u8> {
        self.done += 1;
        if self.done % 5 == 0 {
            Some(self.percent())
        } else {
            None
        }
    }

    pub fn percent(&self) -> u8 {
        // Clamp before narrowing: done can exceed total (variant labels are
        // processed but not part of the denominator), so the quotient can
        // pass 255 and a premature cast would wrap.
        (self.done * 100 / self.total).min(99) as u8
    }

    pub fn done(&self) -> usize {
        self.done
    }
}

/// Spawn the job detached from the caller. Fatal errors are caught here,
/// recorded as lifecycle status `Error` (progress left at its last
/// checkpoint) and swallowed so the host process cannot be taken down.
#[allow(clippy::too_many_arguments)]
pub fn spawn_translation_job(
    store: Store,
    provider: Arc<dyn TranslationProvider>,
    per_call_timeout: Duration,
    tenant_id: i64,
    target_language: String,
    ui_snapshot: Option<BTreeMap<String, String>>,
    permit: JobPermit,
) {
    tokio::spawn(async move {
        let language = target_language.clone();
        let result = run_translation_job(
            &store,
            provider.as_ref(),
            per_call_timeout,
            tenant_id,
            target_language,
            ui_snapshot,
        )
        .await;

        if let Err(err) = result {
            error!(
                "Translation job for tenant {} language '{}' failed: {:#}",
                tenant_id, language, err
            );
            if let Err(status_err) =
                store.update_binding_status(tenant_id, &language, TranslationStatus::Error)
            {
                error!("Failed to record Error status: {:#}", status_err);
            }
        }

        drop(permit);
    });
}

/// One full job run for (tenant, target language).
///
/// Units are processed in enumeration order; each provider call is bounded
/// by `per_call_timeout` and a failed or timed-out call skips that unit
/// rather than failing the job. Re-running overwrites prior values per unit.
pub async fn run_translation_job(
    store: &Store,
    provider: &dyn TranslationProvider,
    per_call_timeout: Duration,
    tenant_id: i64,
    target_language: String,
    ui_snapshot: Option<BTreeMap<String, String>>,
) -> Result<()> {
    let Some(tenant) = store.get_tenant(tenant_id)? else {
        warn!(
            "Translation job aborted: tenant {} no longer exists",
            tenant_id
        );
        return Ok(());
    };

    let units = collect_units(store, tenant_id, &tenant.default_language, ui_snapshot.as_ref())?;

    let ui_entries = count_targets(&units, |t| matches!(t, UnitTarget::UiKey(_)));
    let service_fields = count_targets(&units, |t| matches!(t, UnitTarget::ServiceText { .. }));
    let gallery = count_targets(&units, |t| {
        matches!(t, UnitTarget::GalleryCategoryName { .. })
    });
    let total = job_total(ui_entries, service_fields / 3, gallery);

    info!(
        "Translation job started: tenant {} language '{}' ({} units, total {})",
        tenant_id,
        target_language,
        units.len(),
        total
    );

    let mut tracker = ProgressTracker::new(total);
    for unit in &units {
        if let Some(text) = unit.translatable_text() {
            // No lock is held across this await.
            let call = provider.translate(
                text,
                &target_language,
                unit.kind_hint,
                tenant.business_hint(),
            );
            match timeout(per_call_timeout, call).await {
                Ok(Ok(translated)) if !translated.trim().is_empty() => {
                    apply_unit(store, tenant_id, &target_language, &unit.target, &translated)?;
                }
                Ok(Ok(_)) => {
                    warn!("Provider returned empty text, leaving unit untranslated");
                }
                Ok(Err(err)) => {
                    warn!("Unit translation failed, skipping: {:#}", err);
                }
                Err(_) => {
                    warn!(
                        "Unit translation timed out after {:?}, skipping",
                        per_call_timeout
                    );
                }
            }
        }

        if let Some(progress) = tracker.record_unit() {
            store.update_binding_progress(tenant_id, &target_language, progress)?;
        }
    }

    // One final update: ReviewPending at exactly 100.
    store.upsert_binding(
        tenant_id,
        &target_language,
        TranslationStatus::ReviewPending,
        100,
    )?;

    info!(
        "Translation job finished: tenant {} language '{}' ({} units)",
        tenant_id,
        target_language,
        tracker.done()
    );
    Ok(())
}

fn count_targets(units: &[crate::enumerator::TranslationUnit], pred: impl Fn(&UnitTarget) -> bool) -> usize {
    units.iter().filter(|u| pred(&u.target)).count()
}

/// Write one finished translation back to where it belongs.
fn apply_unit(
    store: &Store,
    tenant_id: i64,
    language: &str,
    target: &UnitTarget,
    text: &str,
) -> Result<()> {
    match target {
        UnitTarget::UiKey(key) => store.upsert_override(tenant_id, language, key, text),
        UnitTarget::ServiceText { service_id, field } => {
            store.set_service_text(*service_id, *field, language, text)
        }
        UnitTarget::VariantLabel { variant_id } => {
            store.set_variant_label(*variant_id, language, text)
        }
        UnitTarget::GalleryCategoryName { category_id } => {
            store.set_gallery_category_name(*category_id, language, text)
        }
    }
}
