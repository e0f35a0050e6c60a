//! # Process-wide default schedulers.
//!
//! The engine passes schedulers as explicit values, but a process usually
//! wants one shared elastic pool and one shared serial worker. These are
//! built lazily on first use from `Config::default()`, or explicitly (and
//! at most once) via [`install`] — which is how tests inject their own
//! sizing before anything touches the defaults.
//!
//! If a default runtime cannot be built (resource exhaustion at thread
//! spawn), the slot degrades to a rejecting scheduler: every dispatch then
//! surfaces as a `SchedulerRejected` error through the affected channel
//! instead of panicking.

use std::sync::{Arc, OnceLock};

use crate::config::Config;
use crate::error::ScheduleError;

use super::schedule::{Schedule, SchedulerRef, Work};
use super::{ElasticScheduler, WorkerScheduler};

static ELASTIC: OnceLock<SchedulerRef> = OnceLock::new();
static SINGLE: OnceLock<SchedulerRef> = OnceLock::new();

/// Installs the defaults from `config`, if nothing has used them yet.
///
/// Returns `true` when the elastic slot was installed by this call,
/// `false` when a default was already in place.
pub fn install(config: &Config) -> bool {
    let installed = ELASTIC.set(build_elastic(config)).is_ok();
    let _ = SINGLE.set(build_single());
    installed
}

/// The shared elastic scheduler for blocking work.
pub fn elastic() -> SchedulerRef {
    Arc::clone(ELASTIC.get_or_init(|| build_elastic(&Config::default())))
}

/// The shared single-threaded worker scheduler.
pub fn single() -> SchedulerRef {
    Arc::clone(SINGLE.get_or_init(build_single))
}

fn build_elastic(config: &Config) -> SchedulerRef {
    match ElasticScheduler::new("flowvisor-elastic", config.elastic_threads_clamped()) {
        Ok(scheduler) => Arc::new(scheduler),
        Err(error) => reject_slot("flowvisor-elastic", &error),
    }
}

fn build_single() -> SchedulerRef {
    match WorkerScheduler::new("flowvisor-single") {
        Ok(scheduler) => Arc::new(scheduler),
        Err(error) => reject_slot("flowvisor-single", &error),
    }
}

fn reject_slot(name: &'static str, error: &std::io::Error) -> SchedulerRef {
    eprintln!("[flowvisor] failed to build default scheduler '{name}': {error}");
    Arc::new(RejectingScheduler { name })
}

/// Placeholder installed when a default runtime could not be built;
/// rejects everything so faults surface through the signal channel.
struct RejectingScheduler {
    name: &'static str,
}

impl Schedule for RejectingScheduler {
    fn name(&self) -> &str {
        self.name
    }

    fn schedule(&self, _work: Work) -> Result<(), ScheduleError> {
        Err(ScheduleError::Shutdown {
            scheduler: self.name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_shared_instances() {
        assert!(Arc::ptr_eq(&elastic(), &elastic()));
        assert!(Arc::ptr_eq(&single(), &single()));
    }

    #[test]
    fn test_install_after_first_use_is_rejected() {
        let _ = elastic();
        assert!(!install(&Config::default()));
    }
}
