//! Admission filter: decide whether a change event needs processing.
//!
//! The watch source fires on every write, including no-op resyncs.
//! Without this filter every resync would re-enter the engine and re-run
//! potentially expensive handlers. The filter is pure over the two
//! resource snapshots plus the wall clock.

use std::time::Duration;

use chrono::Utc;

use stratus_common::resource::{ConditionStatus, ConditionedResource, Phase, CONDITION_HEALTH_CHECK};

/// Whether the old→new change warrants invoking the engine
///
/// Decision order, first match wins:
/// 1. Spec changed → process.
/// 2. Phase changed → process.
/// 3. Last condition's status changed → process, except the expected
///    Unknown→False churn of a step that is still Initializing.
/// 4. Last condition unchanged: a standing False is retried on every
///    resync; a True health check is re-probed only once per
///    `health_check_period`; anything else is steady state.
pub fn needs_update<R: ConditionedResource>(
    old: &R,
    new: &R,
    health_check_period: Duration,
) -> bool {
    if old.spec() != new.spec() {
        return true;
    }
    if old.phase() != new.phase() {
        return true;
    }

    match (old.conditions().last(), new.conditions().last()) {
        (None, None) => false,
        (Some(_), None) | (None, Some(_)) => true,
        (Some(last_old), Some(last_new)) => {
            if last_old.status != last_new.status {
                let provisioning_noise = last_old.status == ConditionStatus::Unknown
                    && last_new.status == ConditionStatus::False
                    && new.phase() == Phase::Initializing;
                return !provisioning_noise;
            }

            if last_new.status == ConditionStatus::False {
                // A standing failure must be retried on resync or the
                // resource would wedge.
                return true;
            }

            if last_new.type_ == CONDITION_HEALTH_CHECK
                && last_new.status == ConditionStatus::True
            {
                let period = chrono::Duration::from_std(health_check_period)
                    .unwrap_or_else(|_| chrono::Duration::max_value());
                return Utc::now() - last_new.last_probe_time >= period;
            }

            false
        }
    }
}
