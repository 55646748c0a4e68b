//! Single-flight guard for generation requests.
//!
//! At most one generation runs at a time. A caller either waits for the
//! running one ([`GenerationGate::try_begin`] refuses while busy) or
//! replaces it ([`GenerationGate::supersede`] cancels the running solve's
//! token). A [`GenerationTicket`] marks the slot as taken until it is
//! dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cp::CancelToken;

#[derive(Debug, Default)]
struct GateState {
    /// Ticket id and token of the running generation.
    current: Option<(u64, CancelToken)>,
    next_id: u64,
}

/// Allows one generation in flight.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct GenerationGate {
    state: Arc<Mutex<GateState>>,
}

/// Permission to run one generation.
///
/// Pass [`GenerationTicket::token`] to
/// [`TimetableScheduler::generate_with_cancel`](super::TimetableScheduler::generate_with_cancel).
#[derive(Debug)]
pub struct GenerationTicket {
    id: u64,
    token: CancelToken,
    state: Arc<Mutex<GateState>>,
}

impl GenerationGate {
    /// Creates an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a generation is in flight.
    pub fn is_busy(&self) -> bool {
        self.lock().current.is_some()
    }

    /// Takes the slot if it is free.
    pub fn try_begin(&self) -> Option<GenerationTicket> {
        let mut state = self.lock();
        if state.current.is_some() {
            return None;
        }
        Some(self.issue(&mut state))
    }

    /// Cancels any running generation and takes the slot.
    pub fn supersede(&self) -> GenerationTicket {
        let mut state = self.lock();
        if let Some((_, token)) = state.current.take() {
            token.cancel();
        }
        self.issue(&mut state)
    }

    fn issue(&self, state: &mut GateState) -> GenerationTicket {
        let id = state.next_id;
        state.next_id += 1;
        let token = CancelToken::new();
        state.current = Some((id, token.clone()));
        GenerationTicket {
            id,
            token,
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GenerationTicket {
    /// Cancellation token for this generation.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Whether a newer request superseded this one.
    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for GenerationTicket {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        // A superseded ticket no longer owns the slot
        if matches!(state.current, Some((id, _)) if id == self.id) {
            state.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let gate = GenerationGate::new();
        assert!(!gate.is_busy());

        let ticket = gate.try_begin().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());

        drop(ticket);
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_supersede_cancels_running() {
        let gate = GenerationGate::new();
        let first = gate.try_begin().unwrap();
        let second = gate.supersede();

        assert!(first.is_superseded());
        assert!(first.token().is_cancelled());
        assert!(!second.is_superseded());

        // Dropping the old ticket leaves the new one in place
        drop(first);
        assert!(gate.is_busy());
        drop(second);
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_shared_between_clones() {
        let gate = GenerationGate::new();
        let other = gate.clone();
        let _ticket = gate.try_begin().unwrap();
        assert!(other.is_busy());
        assert!(other.try_begin().is_none());
    }
}
