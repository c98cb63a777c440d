//! Lock-free primitives used by kernels and user functors.
//!
//! These are the only way kernels mutate shared per-vertex arrays.

mod atomics;

pub use atomics::{cas, fetch_add, fetch_max, fetch_min, load, store, DeviceAtomic};
