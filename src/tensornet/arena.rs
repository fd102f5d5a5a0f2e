//! Tensor data arena
//!
//! Gate tensors are owned by the arena that allocated them (the circuit
//! builder's arena). Networks and records only carry `TensorHandle`s and
//! resolve them against a borrowed arena.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use parking_lot::RwLock;
use tracing::trace;

use crate::error::{Result, TensorNetError};

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(0);

/// Non-owning reference to a tensor stored in a `TensorArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TensorHandle {
    arena: u64,
    slot: usize,
    generation: u32,
}

impl TensorHandle {
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for TensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tensor#{}.{}g{}", self.arena, self.slot, self.generation)
    }
}

#[derive(Default)]
struct Slot {
    generation: u32,
    data: Option<Arc<Array2<Complex64>>>,
}

#[derive(Default)]
struct Slots {
    entries: Vec<Slot>,
    free: Vec<usize>,
}

/// Store of gate tensor data.
///
/// Each tensor is a square `2^k × 2^k` matrix. Released slots are reused
/// with a bumped generation, so a stale handle can not resolve to newer data.
pub struct TensorArena {
    id: u64,
    slots: RwLock<Slots>,
}

impl Default for TensorArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TensorArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorArena")
            .field("id", &self.id)
            .field("live", &self.live_count())
            .field("slots", &self.slot_count())
            .finish()
    }
}

impl TensorArena {
    pub fn new() -> Self {
        TensorArena {
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            slots: RwLock::new(Slots::default()),
        }
    }

    /// Store a tensor and return its handle.
    pub fn allocate(&self, data: Array2<Complex64>) -> Result<TensorHandle> {
        let (rows, cols) = data.dim();
        if rows != cols || !rows.is_power_of_two() {
            return Err(TensorNetError::invalid(format!(
                "gate tensor must be a square power-of-two matrix, got {}x{}",
                rows, cols
            )));
        }

        let mut slots = self.slots.write();
        let slot = match slots.free.pop() {
            Some(slot) => slot,
            None => {
                slots.entries.push(Slot::default());
                slots.entries.len() - 1
            }
        };
        let entry = &mut slots.entries[slot];
        entry.data = Some(Arc::new(data));
        let handle = TensorHandle {
            arena: self.id,
            slot,
            generation: entry.generation,
        };
        trace!(%handle, dim = rows, "allocated gate tensor");
        Ok(handle)
    }

    /// Resolve a handle to its (aliased) tensor data.
    pub fn get(&self, handle: TensorHandle) -> Result<Arc<Array2<Complex64>>> {
        if !self.owns(handle) {
            return Err(TensorNetError::invalid(format!(
                "{} does not belong to arena {}",
                handle, self.id
            )));
        }
        self.slots
            .read()
            .entries
            .get(handle.slot)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.data.clone())
            .ok_or_else(|| TensorNetError::invalid(format!("{} has been released", handle)))
    }

    /// Whether the handle was issued by this arena.
    pub fn owns(&self, handle: TensorHandle) -> bool {
        handle.arena == self.id
    }

    /// Drop the arena's reference to a tensor and recycle its slot.
    ///
    /// Releasing a stale or foreign handle does nothing.
    pub fn release(&self, handle: TensorHandle) {
        if !self.owns(handle) {
            return;
        }
        let mut slots = self.slots.write();
        let released = match slots.entries.get_mut(handle.slot) {
            Some(slot) if slot.generation == handle.generation && slot.data.is_some() => {
                slot.data = None;
                slot.generation = slot.generation.wrapping_add(1);
                true
            }
            _ => false,
        };
        if released {
            slots.free.push(handle.slot);
        }
    }

    /// Number of tensors currently stored
    pub fn live_count(&self) -> usize {
        let slots = self.slots.read();
        slots.entries.len() - slots.free.len()
    }

    /// Number of slots ever created, live or free
    pub fn slot_count(&self) -> usize {
        self.slots.read().entries.len()
    }
}

/// Temporary allocations released together when the scope is dropped.
pub struct ArenaScope<'a> {
    arena: &'a TensorArena,
    staged: Vec<TensorHandle>,
}

impl<'a> ArenaScope<'a> {
    pub fn new(arena: &'a TensorArena) -> Self {
        ArenaScope { arena, staged: Vec::new() }
    }

    pub fn arena(&self) -> &'a TensorArena {
        self.arena
    }

    /// Allocate a tensor that lives until the scope ends.
    pub fn stage(&mut self, data: Array2<Complex64>) -> Result<TensorHandle> {
        let handle = self.arena.allocate(data)?;
        self.staged.push(handle);
        Ok(handle)
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }
}

impl Drop for ArenaScope<'_> {
    fn drop(&mut self) {
        for handle in self.staged.drain(..) {
            self.arena.release(handle);
        }
    }
}
