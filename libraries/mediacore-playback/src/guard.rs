//! Feedback guard between store intent and engine reports
//!
//! Two directions can echo:
//! - the controller copies the engine's playing flag into the store, and the
//!   resulting store change would be mirrored straight back to the engine;
//! - the controller commands the engine, and a status report sent before the
//!   command took effect would reconcile the store back to the old value.
//!
//! Each case arms a one-shot token that expires on the next status tick.

/// One-shot guard token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncGuard {
    /// No suppression in effect
    #[default]
    Open,

    /// Store intent was just reconciled to `playing`; skip mirroring it back
    SuppressEcho { playing: bool },

    /// Engine was told to go to `playing`; don't reconcile from older reports
    AwaitingEngine { playing: bool },
}

impl SyncGuard {
    /// Arm after reconciling the store to the engine
    pub fn suppress_echo(&mut self, playing: bool) {
        *self = Self::SuppressEcho { playing };
    }

    /// Arm after issuing a play/pause command
    pub fn await_engine(&mut self, playing: bool) {
        *self = Self::AwaitingEngine { playing };
    }

    /// Consume an echo token matching `intent`
    ///
    /// Returns `true` when the intent change is the controller's own echo and
    /// must not be sent to the engine. A token for a different value means the
    /// user changed intent since; it is dropped and `false` returned.
    pub fn take_echo(&mut self, intent: bool) -> bool {
        match *self {
            Self::SuppressEcho { playing } => {
                *self = Self::Open;
                playing == intent
            }
            _ => false,
        }
    }

    /// Expire the token on a status tick, returning what was armed
    pub fn expire(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn is_awaiting_engine(&self) -> bool {
        matches!(self, Self::AwaitingEngine { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_is_taken_once() {
        let mut guard = SyncGuard::default();
        guard.suppress_echo(false);

        assert!(guard.take_echo(false));
        assert!(!guard.take_echo(false));
        assert_eq!(guard, SyncGuard::Open);
    }

    #[test]
    fn mismatched_echo_is_dropped() {
        let mut guard = SyncGuard::default();
        guard.suppress_echo(false);

        assert!(!guard.take_echo(true));
        assert_eq!(guard, SyncGuard::Open);
    }

    #[test]
    fn awaiting_engine_is_not_an_echo() {
        let mut guard = SyncGuard::default();
        guard.await_engine(true);

        assert!(!guard.take_echo(true));
        assert!(guard.is_awaiting_engine());
    }

    #[test]
    fn expire_returns_previous_and_opens() {
        let mut guard = SyncGuard::default();
        guard.await_engine(false);

        assert_eq!(guard.expire(), SyncGuard::AwaitingEngine { playing: false });
        assert_eq!(guard.expire(), SyncGuard::Open);
    }
}
