//! Scratch memory pool for contraction workspaces

use std::mem::size_of;
use std::ops::{Deref, DerefMut};

use num_complex::Complex64;
use parking_lot::{Mutex, MutexGuard};

use crate::error::{Result, TensorNetError};

/// Fixed-capacity workspace buffer handed to the contraction backend.
///
/// The buffer is allocated once and never resized. Queries lease it
/// exclusively; a second lease blocks until the first one is dropped.
pub struct ScratchPool {
    capacity: usize,
    buffer: Mutex<Vec<Complex64>>,
}

impl std::fmt::Debug for ScratchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchPool").field("capacity", &self.capacity).finish()
    }
}

impl ScratchPool {
    /// Create a pool of at most `capacity` bytes. Memory is committed on
    /// first use and kept for later leases.
    pub fn new(capacity: usize) -> Self {
        let elements = capacity / size_of::<Complex64>();
        ScratchPool {
            capacity: elements * size_of::<Complex64>(),
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Advertised capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check a workspace request against the capacity without leasing.
    pub fn check(&self, required: usize) -> Result<()> {
        if required > self.capacity {
            return Err(TensorNetError::ResourceExhausted {
                required,
                available: self.capacity,
            });
        }
        Ok(())
    }

    /// Lease `required` bytes of the buffer for the duration of one query.
    pub fn lease(&self, required: usize) -> Result<ScratchLease<'_>> {
        self.check(required)?;
        let len = required.div_ceil(size_of::<Complex64>());
        let mut guard = self.buffer.lock();
        if guard.len() < len {
            guard.resize(len, Complex64::new(0.0, 0.0));
        }
        Ok(ScratchLease { guard, len })
    }
}

/// Exclusive view of the leading part of a scratch pool
pub struct ScratchLease<'p> {
    guard: MutexGuard<'p, Vec<Complex64>>,
    len: usize,
}

impl Deref for ScratchLease<'_> {
    type Target = [Complex64];

    fn deref(&self) -> &[Complex64] {
        &self.guard[..self.len]
    }
}

impl DerefMut for ScratchLease<'_> {
    fn deref_mut(&mut self) -> &mut [Complex64] {
        &mut self.guard[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rounds_to_elements() {
        let pool = ScratchPool::new(100);
        assert_eq!(pool.capacity(), 96);
    }

    #[test]
    fn test_lease_within_capacity() {
        let pool = ScratchPool::new(1024);
        let lease = pool.lease(64).unwrap();
        assert_eq!(lease.len(), 4);
    }

    #[test]
    fn test_lease_exceeding_capacity() {
        let pool = ScratchPool::new(32);
        match pool.lease(64) {
            Err(TensorNetError::ResourceExhausted { required, available }) => {
                assert_eq!(required, 64);
                assert_eq!(available, 32);
            }
            other => panic!("unexpected {:?}", other.map(|l| l.len())),
        };
    }
}
