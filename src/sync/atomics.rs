//! Device-scope atomic operations with relaxed ordering.
//!
//! Kernels run as a grid of workgroups that share memory only through these
//! cells. Ordering is **relaxed** everywhere: the host observes kernel writes
//! after `Event::wait`, and nothing inside a kernel relies on cross-work-item
//! ordering beyond the atomicity of the individual operation.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use atomic_float::AtomicF32;

/// An atomic cell usable from kernels.
///
/// Implementations exist for the unsigned integer atomics and for
/// [`AtomicF32`], whose read-modify-write operations are compare-exchange
/// loops over the bit pattern.
pub trait DeviceAtomic: Default + Send + Sync {
    /// Plain value stored in the cell.
    type Value: Copy + Send + Sync + PartialOrd;

    /// Creates a cell holding `value`.
    fn new(value: Self::Value) -> Self;

    /// Atomic load.
    fn load(&self) -> Self::Value;

    /// Atomic store.
    fn store(&self, value: Self::Value);

    /// Atomic fetch-add; returns the previous value.
    fn fetch_add(&self, value: Self::Value) -> Self::Value;

    /// Atomic fetch-min; returns the previous value.
    fn fetch_min(&self, value: Self::Value) -> Self::Value;

    /// Atomic fetch-max; returns the previous value.
    fn fetch_max(&self, value: Self::Value) -> Self::Value;

    /// Atomic compare-and-swap.
    ///
    /// Returns whether the swap occurred; on failure the observed value is
    /// written back into `expected`.
    fn cas(&self, expected: &mut Self::Value, desired: Self::Value) -> bool;
}

macro_rules! impl_device_atomic_int {
    ($atomic:ty, $value:ty) => {
        impl DeviceAtomic for $atomic {
            type Value = $value;

            fn new(value: $value) -> Self {
                <$atomic>::new(value)
            }

            fn load(&self) -> $value {
                <$atomic>::load(self, Ordering::Relaxed)
            }

            fn store(&self, value: $value) {
                <$atomic>::store(self, value, Ordering::Relaxed);
            }

            fn fetch_add(&self, value: $value) -> $value {
                <$atomic>::fetch_add(self, value, Ordering::Relaxed)
            }

            fn fetch_min(&self, value: $value) -> $value {
                <$atomic>::fetch_min(self, value, Ordering::Relaxed)
            }

            fn fetch_max(&self, value: $value) -> $value {
                <$atomic>::fetch_max(self, value, Ordering::Relaxed)
            }

            fn cas(&self, expected: &mut $value, desired: $value) -> bool {
                match <$atomic>::compare_exchange(
                    self,
                    *expected,
                    desired,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => true,
                    Err(observed) => {
                        *expected = observed;
                        false
                    }
                }
            }
        }
    };
}

impl_device_atomic_int!(AtomicU32, u32);
impl_device_atomic_int!(AtomicU64, u64);
impl_device_atomic_int!(AtomicUsize, usize);

impl DeviceAtomic for AtomicF32 {
    type Value = f32;

    fn new(value: f32) -> Self {
        AtomicF32::new(value)
    }

    fn load(&self) -> f32 {
        AtomicF32::load(self, Ordering::Relaxed)
    }

    fn store(&self, value: f32) {
        AtomicF32::store(self, value, Ordering::Relaxed);
    }

    fn fetch_add(&self, value: f32) -> f32 {
        AtomicF32::fetch_add(self, value, Ordering::Relaxed)
    }

    fn fetch_min(&self, value: f32) -> f32 {
        AtomicF32::fetch_min(self, value, Ordering::Relaxed)
    }

    fn fetch_max(&self, value: f32) -> f32 {
        AtomicF32::fetch_max(self, value, Ordering::Relaxed)
    }

    fn cas(&self, expected: &mut f32, desired: f32) -> bool {
        match AtomicF32::compare_exchange(
            self,
            *expected,
            desired,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => true,
            Err(observed) => {
                *expected = observed;
                false
            }
        }
    }
}

/// Atomic load from `cell`.
#[inline(always)]
pub fn load<A: DeviceAtomic>(cell: &A) -> A::Value {
    cell.load()
}

/// Atomic store into `cell`.
#[inline(always)]
pub fn store<A: DeviceAtomic>(cell: &A, value: A::Value) {
    cell.store(value);
}

/// Atomic fetch-add; returns the previous value.
#[inline(always)]
pub fn fetch_add<A: DeviceAtomic>(cell: &A, value: A::Value) -> A::Value {
    cell.fetch_add(value)
}

/// Atomic fetch-min; returns the previous value.
#[inline(always)]
pub fn fetch_min<A: DeviceAtomic>(cell: &A, value: A::Value) -> A::Value {
    cell.fetch_min(value)
}

/// Atomic fetch-max; returns the previous value.
#[inline(always)]
pub fn fetch_max<A: DeviceAtomic>(cell: &A, value: A::Value) -> A::Value {
    cell.fetch_max(value)
}

/// Atomic compare-and-swap; on failure writes the observed value back into
/// `expected`.
#[inline(always)]
pub fn cas<A: DeviceAtomic>(cell: &A, expected: &mut A::Value, desired: A::Value) -> bool {
    cell.cas(expected, desired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_ops() {
        let cell = AtomicU32::new(10);
        assert_eq!(fetch_add(&cell, 5), 10);
        assert_eq!(load(&cell), 15);
        assert_eq!(fetch_min(&cell, 3), 15);
        assert_eq!(load(&cell), 3);
        assert_eq!(fetch_max(&cell, 7), 3);
        assert_eq!(load(&cell), 7);
    }

    #[test]
    fn test_cas_writes_back_observed() {
        let cell = AtomicU32::new(42);
        let mut expected = 0;
        assert!(!cas(&cell, &mut expected, 1));
        assert_eq!(expected, 42);
        assert!(cas(&cell, &mut expected, 1));
        assert_eq!(load(&cell), 1);
    }

    #[test]
    fn test_float_fetch_min() {
        let cell = AtomicF32::new(9.0);
        assert_eq!(fetch_min(&cell, 2.5), 9.0);
        assert_eq!(load(&cell), 2.5);
        assert_eq!(fetch_min(&cell, 4.0), 2.5);
        assert_eq!(load(&cell), 2.5);
    }

    #[test]
    fn test_concurrent_fetch_add() {
        let cell = AtomicU64::new(0);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..1000 {
                        fetch_add(&cell, 1);
                    }
                });
            }
        });
        assert_eq!(load(&cell), 8000);
    }
}
