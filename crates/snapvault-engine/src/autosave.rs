//! Tick-driven autosave.
//!
//! The host owns the timer; the engine owns the decision. Each tick either
//! overwrites the autosave slot or reports exactly why it did not. There are
//! no threads and no sleeps here — failures leave the last-saved mark alone
//! so the next tick retries.

use serde::{Deserialize, Serialize};
use snapvault::{VersionEntry, layout};
use snapvault_host::DocumentHost;
use tracing::debug;

use crate::actions::Vault;
use crate::error::Result;

/// User-facing autosave settings, read every tick so preference changes take
/// effect immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveSettings {
    pub enabled: bool,

    /// Minimum minutes between autosaves; clamped to at least 1.
    pub interval_minutes: u64,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: 5,
        }
    }
}

impl AutosaveSettings {
    pub fn interval_seconds(&self) -> u64 {
        self.interval_minutes.max(1) * 60
    }
}

/// Why a tick declined to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    /// The document has never been saved, so there is no project to save
    /// into.
    Unsaved,
    SnapshotMode,
    /// The host is mid-edit (mesh edit, sculpt, paint).
    UnsafeEditMode,
    RenderActive,
    /// The interval has not elapsed since the last autosave.
    NotDue,
}

/// Outcome of one tick.
#[derive(Debug)]
pub enum TickOutcome {
    Saved(Box<VersionEntry>),
    Skipped(SkipReason),
}

/// The autosave loop's state: when it last saved.
///
/// Drive it from any periodic callback (the reference cadence is every five
/// seconds); the interval check makes the cadence itself uncritical.
///
/// ```rust,no_run
/// use snapvault_engine::{AutosaveScheduler, Vault};
/// use snapvault_host::fakes::MemoryHost;
///
/// let mut vault = Vault::new(MemoryHost::new());
/// let mut scheduler = AutosaveScheduler::new();
/// // from the host's timer:
/// let now = 1_754_550_000;
/// match scheduler.tick(&mut vault, now) {
///     Ok(outcome) => println!("{:?}", outcome),
///     Err(e) => eprintln!("autosave failed, will retry: {}", e),
/// }
/// ```
#[derive(Debug, Default)]
pub struct AutosaveScheduler {
    last_epoch: Option<u64>,
}

impl AutosaveScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with a persisted last-save time.
    pub fn with_last_epoch(mut self, epoch: u64) -> Self {
        self.last_epoch = Some(epoch);
        self
    }

    pub fn last_epoch(&self) -> Option<u64> {
        self.last_epoch
    }

    /// Run one scheduling decision at `now_epoch` (seconds).
    ///
    /// On success the last-saved mark advances to `now_epoch`; on error it
    /// does not, so the failure is retried at the next due tick.
    pub fn tick<H: DocumentHost>(
        &mut self,
        vault: &mut Vault<H>,
        now_epoch: u64,
    ) -> Result<TickOutcome> {
        let settings = vault.config().autosave.clone();
        if !settings.enabled {
            return Ok(TickOutcome::Skipped(SkipReason::Disabled));
        }
        let Some(doc) = vault.host().current_path() else {
            return Ok(TickOutcome::Skipped(SkipReason::Unsaved));
        };
        if layout::is_snapshot_path(&doc) {
            return Ok(TickOutcome::Skipped(SkipReason::SnapshotMode));
        }
        if vault.host().edit_mode().inhibits_autosave() {
            return Ok(TickOutcome::Skipped(SkipReason::UnsafeEditMode));
        }
        if vault.host().is_render_active() {
            return Ok(TickOutcome::Skipped(SkipReason::RenderActive));
        }
        if let Some(last) = self.last_epoch
            && now_epoch.saturating_sub(last) < settings.interval_seconds()
        {
            return Ok(TickOutcome::Skipped(SkipReason::NotDue));
        }

        let entry = vault.autosave_commit()?;
        self.last_epoch = Some(now_epoch);
        debug!("autosaved at {}", now_epoch);
        Ok(TickOutcome::Saved(Box::new(entry)))
    }
}
