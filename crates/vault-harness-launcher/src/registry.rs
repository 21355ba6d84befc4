// crates/vault-harness-launcher/src/registry.rs
// ============================================================================
// Module: Instance Registry
// Description: Process-wide registry of launched application instances.
// Purpose: Give the exit-all drain a view of every instance this harness
//          started, replacing the OS process-table scan of older harnesses.
// Dependencies: tokio, tracing, vault-harness-core
// ============================================================================

//! ## Overview
//! Each successful launch registers its shared channel here under the child
//! pid. [`InstanceRegistry::exit_all`] asks every live instance to exit, then
//! polls until none remain or the deadline elapses. The registry holds weak
//! references only; an instance whose handle was dropped is reclaimed by
//! kill-on-drop and disappears from the registry on the next prune.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::Weak;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::time::sleep;
use tracing::info;
use tracing::warn;
use vault_harness_core::HarnessError;
use vault_harness_core::timeouts::POLL_INTERVAL;

use crate::app::AppChannel;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// A registered instance: pid plus a weak handle to its channel.
#[derive(Debug)]
struct Registered {
    /// OS process id reported at readiness.
    pid: u32,
    /// Weak reference to the shared channel.
    channel: Weak<AsyncMutex<AppChannel>>,
}

/// Registry of application instances launched by this harness process.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    /// Registered instances; pruned on access.
    inner: Mutex<Vec<Registered>>,
}

impl InstanceRegistry {
    /// Returns the process-wide registry shared by both launch variants.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<InstanceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::default)
    }

    /// Records a launched instance.
    pub(crate) fn register(&self, pid: u32, channel: &Arc<AsyncMutex<AppChannel>>) {
        if let Ok(mut entries) = self.inner.lock() {
            entries.push(Registered { pid, channel: Arc::downgrade(channel) });
        }
    }

    /// Returns the live registered channels, pruning dropped entries.
    fn live(&self) -> Vec<(u32, Arc<AsyncMutex<AppChannel>>)> {
        self.inner.lock().map_or_else(
            |_| Vec::new(),
            |mut entries| {
                entries.retain(|entry| entry.channel.strong_count() > 0);
                entries
                    .iter()
                    .filter_map(|entry| entry.channel.upgrade().map(|arc| (entry.pid, arc)))
                    .collect()
            },
        )
    }

    /// Pids of registered instances whose processes have not exited yet.
    pub async fn live_pids(&self) -> Vec<u32> {
        let mut pids = Vec::new();
        for (pid, channel) in self.live() {
            let mut guard = channel.lock().await;
            if guard.exit_status().is_none() {
                pids.push(pid);
            }
        }
        pids
    }

    /// Asks every registered instance to exit and waits until none remain.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ExitAllTimeout`] with the pids still alive
    /// when the deadline elapses.
    pub async fn exit_all(&self, deadline: Duration) -> Result<(), HarnessError> {
        let instances = self.live();
        if instances.is_empty() {
            return Ok(());
        }
        info!(count = instances.len(), "requesting exit of running instances");
        for (pid, channel) in &instances {
            let mut guard = channel.lock().await;
            if guard.exit_status().is_some() {
                continue;
            }
            if let Err(err) = guard.control.send_exit().await {
                warn!(pid, error = %err, "exit request not delivered");
            }
        }

        let started = tokio::time::Instant::now();
        loop {
            let mut remaining = Vec::new();
            for (pid, channel) in &instances {
                let mut guard = channel.lock().await;
                if guard.exit_status().is_none() {
                    remaining.push(*pid);
                }
            }
            if remaining.is_empty() {
                info!("all registered instances exited");
                return Ok(());
            }
            if started.elapsed() >= deadline {
                return Err(HarnessError::ExitAllTimeout { waited: deadline, remaining });
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
