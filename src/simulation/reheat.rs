//! Reheat scheduling.
//!
//! A reheat raises `alpha_target` for a while and then releases it back to
//! zero. Only one reheat is ever live: scheduling a new one cancels the
//! previous token, so overlapping resizes can't leave a stale target behind.
//! The scheduler has no timers of its own; the driver polls it with the
//! host's frame timestamp.

/// Identifies one scheduled reheat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReheatToken(u64);

impl ReheatToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Result of polling the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReheatPoll {
    /// Nothing scheduled.
    Idle,
    /// A reheat is live and hasn't expired.
    Pending(ReheatToken),
    /// The live reheat expired; `alpha_target` should drop to zero.
    Released(ReheatToken),
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: ReheatToken,
    duration_ms: f64,
    /// Set on the first poll after scheduling.
    deadline_ms: Option<f64>,
}

#[derive(Debug, Default)]
pub struct ReheatScheduler {
    generation: u64,
    pending: Option<Pending>,
}

impl ReheatScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a reheat lasting `duration_ms`, superseding any live one.
    pub fn schedule(&mut self, duration_ms: f64) -> ReheatToken {
        self.generation += 1;
        let token = ReheatToken(self.generation);
        self.pending = Some(Pending {
            token,
            duration_ms: if duration_ms.is_finite() { duration_ms.max(0.0) } else { 0.0 },
            deadline_ms: None,
        });
        token
    }

    /// Cancel the live reheat, returning its token.
    pub fn cancel(&mut self) -> Option<ReheatToken> {
        self.pending.take().map(|p| p.token)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance to `now_ms`.
    ///
    /// The first poll anchors the deadline; a released reheat is consumed.
    pub fn poll(&mut self, now_ms: f64) -> ReheatPoll {
        let Some(pending) = self.pending.as_mut() else {
            return ReheatPoll::Idle;
        };

        let deadline = *pending.deadline_ms.get_or_insert(now_ms + pending.duration_ms);
        if now_ms >= deadline {
            let token = pending.token;
            self.pending = None;
            ReheatPoll::Released(token)
        } else {
            ReheatPoll::Pending(pending.token)
        }
    }
}
