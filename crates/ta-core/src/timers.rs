// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Single-slot delayed tasks
//!
//! Each timer purpose owns one [`PendingTask`]. Scheduling again replaces
//! (aborts) the previous task, so the last call wins. Fires carry a
//! generation number: a fire that was already queued when its task got
//! replaced is recognised as stale and dropped.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Purposes of the per-field timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Refresh,
    Hide,
    KeyRepeat,
    CreateLink,
    BindingNotify,
}

#[derive(Debug, Default)]
pub struct PendingTask {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl PendingTask {
    /// Run `fire` with this schedule's generation after `delay`
    pub fn schedule<F>(&mut self, delay: Duration, fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        let generation = self.generation;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire(generation);
        }));
        generation
    }

    /// Run `task` in this slot, replacing whatever ran there before
    pub fn spawn<Fut>(&mut self, task: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(task));
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Accept a fire of `generation`; false for fires of replaced or
    /// cancelled schedules
    pub fn accept(&mut self, generation: u64) -> bool {
        if self.handle.is_some() && generation == self.generation {
            self.handle = None;
            true
        } else {
            false
        }
    }
}

impl Drop for PendingTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// The timers of one field
#[derive(Debug, Default)]
pub struct Timers {
    pub refresh: PendingTask,
    pub hide: PendingTask,
    pub key_repeat: PendingTask,
    pub create_link: PendingTask,
    pub binding_notify: PendingTask,
}

impl Timers {
    pub fn get_mut(&mut self, kind: TimerKind) -> &mut PendingTask {
        match kind {
            TimerKind::Refresh => &mut self.refresh,
            TimerKind::Hide => &mut self.hide,
            TimerKind::KeyRepeat => &mut self.key_repeat,
            TimerKind::CreateLink => &mut self.create_link,
            TimerKind::BindingNotify => &mut self.binding_notify,
        }
    }

    pub fn cancel_all(&mut self) {
        self.refresh.cancel();
        self.hide.cancel();
        self.key_repeat.cancel();
        self.create_link.cancel();
        self.binding_notify.cancel();
    }
}
