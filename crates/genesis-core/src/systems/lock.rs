//! Pointer lock state machine with request debouncing.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LockState {
    Unlocked,
    /// A capture request is in flight
    Pending { since: f64 },
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerLock {
    state: LockState,
    /// Requests before this time are ignored
    cooldown_until: f64,
    cooldown: f64,
    pending_timeout: f64,
}

impl PointerLock {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            state: LockState::Unlocked,
            cooldown_until: f64::NEG_INFINITY,
            cooldown: config.lock_cooldown,
            pending_timeout: config.lock_pending_timeout,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, LockState::Pending { .. })
    }

    pub fn in_cooldown(&self, now: f64) -> bool {
        now < self.cooldown_until
    }

    /// Ask for capture. Returns true when the host should attempt it;
    /// requests while locked, pending or cooling down are dropped.
    pub fn request(&mut self, now: f64) -> bool {
        if self.state != LockState::Unlocked || self.in_cooldown(now) {
            return false;
        }
        self.state = LockState::Pending { since: now };
        true
    }

    /// Host confirmed capture. Returns true on a state change.
    pub fn acquired(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.state = LockState::Locked;
        true
    }

    /// Host released capture. Returns true when this ended a lock.
    pub fn released(&mut self, now: f64) -> bool {
        match self.state {
            LockState::Locked => {
                self.state = LockState::Unlocked;
                self.cooldown_until = now + self.cooldown;
                true
            }
            LockState::Pending { .. } => {
                self.failed(now);
                false
            }
            LockState::Unlocked => false,
        }
    }

    /// Host refused capture
    pub fn failed(&mut self, now: f64) {
        if self.is_pending() {
            self.state = LockState::Unlocked;
            self.cooldown_until = now + self.cooldown;
        }
    }

    /// Expire a pending request nobody answered
    pub fn update(&mut self, now: f64) {
        if let LockState::Pending { since } = self.state {
            if now - since >= self.pending_timeout {
                log::debug!("Pointer lock request timed out");
                self.failed(now);
            }
        }
    }
}
