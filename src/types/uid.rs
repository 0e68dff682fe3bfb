// Copyright (c) 2024 Mike Tsao

//! Identifiers for channels, and a factory that keeps them unique.

use core::sync::atomic::{AtomicUsize, Ordering};
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Opaque identity of a [Channel](crate::bank::Channel). Stable for the
/// channel's lifetime, unlike its index, which is only a position.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
// See
// https://doc.rust-lang.org/stable/std/marker/trait.StructuralPartialEq.html
// for explanation why we derive PartialEq rather than letting Synonym do it.
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct ChannelId(pub usize);

/// Generates unique [ChannelId]s.
#[derive(Debug)]
pub struct ChannelIdFactory {
    next_id_value: AtomicUsize,
}
impl Default for ChannelIdFactory {
    fn default() -> Self {
        Self::new(1)
    }
}
impl ChannelIdFactory {
    /// Creates a new [ChannelIdFactory] starting with the given value.
    pub fn new(first_id: usize) -> Self {
        Self {
            next_id_value: AtomicUsize::new(first_id),
        }
    }

    /// Generates the next unique id.
    pub fn mint_next(&self) -> ChannelId {
        ChannelId(self.next_id_value.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn channel_id_factory() {
        let f = ChannelIdFactory::default();

        let id_1 = f.mint_next();
        let id_2 = f.mint_next();
        assert_ne!(id_1, id_2, "Minted ids should not repeat");

        let mut ids: HashSet<ChannelId> = Default::default();
        for _ in 0..64 {
            let id = f.mint_next();
            assert!(!ids.contains(&id), "channels should get unique ids");
            ids.insert(id);
        }
    }
}
