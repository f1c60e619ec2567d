//! Per-vehicle sound-event queue.
//!
//! Stack-allocated so a tick never touches the allocator. A sound fires at
//! most once per tick, so pushing an identifier that is already queued is a
//! no-op.

use alloc::vec::Vec;

use crate::constants::SFX_QUEUE_CAPACITY;
use crate::types::SoundId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SfxQueue {
    events: [SoundId; SFX_QUEUE_CAPACITY],
    count: u8,
}

impl Default for SfxQueue {
    fn default() -> Self {
        Self {
            events: [SoundId::default(); SFX_QUEUE_CAPACITY],
            count: 0,
        }
    }
}

impl SfxQueue {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn contains(&self, sound: SoundId) -> bool {
        self.iter().any(|queued| *queued == sound)
    }

    /// Queue `sound` unless it is already pending. Returns whether it was added.
    pub fn push(&mut self, sound: SoundId) -> bool {
        if self.contains(sound) {
            return false;
        }
        debug_assert!(self.len() < SFX_QUEUE_CAPACITY, "sfx queue overflow");
        if self.len() < SFX_QUEUE_CAPACITY {
            self.events[self.count as usize] = sound;
            self.count += 1;
            true
        } else {
            false
        }
    }

    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = &SoundId> {
        self.events[..self.count as usize].iter()
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Hand the pending events to the audio side and empty the queue.
    pub fn drain(&mut self) -> Vec<SoundId> {
        let drained = self.iter().copied().collect();
        self.clear();
        drained
    }
}
