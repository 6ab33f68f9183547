//! Request sequencing per document and capability.
//!
//! Every outgoing request takes a ticket. Only the holder of the most recent
//! ticket for a (document, capability) pair may deliver its response. A pair
//! is tracked only while one of its tickets is alive.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, PoisonError};

use lsp_types::Uri;

use crate::backend::Capability;

type Key = (String, Capability);

#[derive(Debug, Clone, Copy)]
struct Slot {
    latest: u64,
    in_flight: usize,
}

/// Proof that a request was issued, carrying its sequence number.
///
/// Dropping the ticket releases its pair once no other ticket for it is alive.
#[derive(Debug)]
pub struct Ticket<'a> {
    sequencer: &'a RequestSequencer,
    key: Key,
    sequence: u64,
}

impl Ticket<'_> {
    /// Sequence number, starting at 1 whenever a pair becomes active.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Capability the request was issued for.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.key.1
    }

    /// Whether no newer ticket has been issued since this one.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.sequencer
            .slots()
            .get(&self.key)
            .is_some_and(|slot| slot.latest == self.sequence)
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        let mut slots = self.sequencer.slots();
        if let Entry::Occupied(mut entry) = slots.entry(self.key.clone()) {
            let slot = entry.get_mut();
            slot.in_flight = slot.in_flight.saturating_sub(1);
            if slot.in_flight == 0 {
                entry.remove();
            }
        }
    }
}

/// Hands out monotonically increasing tickets.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    slots: Mutex<HashMap<Key, Slot>>,
}

impl RequestSequencer {
    /// Create an empty sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for `uri` and `capability`, superseding any
    /// earlier one.
    pub fn begin(&self, uri: &Uri, capability: Capability) -> Ticket<'_> {
        let key = (uri.to_string(), capability);
        let mut slots = self.slots();
        let slot = slots.entry(key.clone()).or_insert(Slot {
            latest: 0,
            in_flight: 0,
        });
        slot.latest += 1;
        slot.in_flight += 1;
        let sequence = slot.latest;
        drop(slots);

        Ticket {
            sequencer: self,
            key,
            sequence,
        }
    }

    /// Number of (document, capability) pairs with a live ticket.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.slots().len()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<Key, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
