//! CPU emulation of the data-parallel device.
//!
//! The accelerator model is a 1-D grid of independent workgroups. On this
//! backend a [`Queue`] dispatches workgroups over a scoped thread pool and one
//! worker thread owns all lanes of a workgroup, so SIMT barriers become phase
//! boundaries inside the kernel body. Device-scope atomics stay real atomics;
//! workgroup-scope state collapses to per-group locals.
//!
//! Memory is unified: every [`DeviceBuffer`] is reachable from host and
//! kernels alike, and the requested [`MemorySpace`] is recorded so host-facing
//! accessors can keep the explicit-copy discipline the model prescribes.

mod queue;

pub use queue::{Event, Queue, WorkGroup};

use std::str::FromStr;

use crate::error::{Error, Result};

/// Residence requested for an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemorySpace {
    /// Host-resident memory.
    Host,
    /// Device-resident memory; host access goes through explicit copies.
    Device,
    /// Coherently accessible from both sides between kernels.
    #[default]
    Shared,
}

impl FromStr for MemorySpace {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        match text {
            "host" => Ok(Self::Host),
            "device" => Ok(Self::Device),
            "shared" => Ok(Self::Shared),
            other => Err(Error::InvalidInput(format!(
                "unknown memory space `{other}` (expected host, device or shared)"
            ))),
        }
    }
}

/// A single-owner device allocation of `len` elements.
///
/// Dropping the buffer releases the memory. Kernels receive `&[T]` views and
/// mutate only through atomic element types.
#[derive(Debug)]
pub struct DeviceBuffer<T> {
    data: Box<[T]>,
    space: MemorySpace,
}

impl<T> DeviceBuffer<T> {
    /// Allocates `len` default-initialized elements.
    ///
    /// Surfaces allocation failure as [`Error::ResourceExhaustion`] instead of
    /// aborting.
    pub fn try_new(len: usize, space: MemorySpace) -> Result<Self>
    where
        T: Default,
    {
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| Error::ResourceExhaustion {
            bytes: len * std::mem::size_of::<T>(),
        })?;
        data.resize_with(len, T::default);
        Ok(Self {
            data: data.into_boxed_slice(),
            space,
        })
    }

    /// Allocates a buffer holding a copy of `source`.
    pub fn from_slice(source: &[T], space: MemorySpace) -> Result<Self>
    where
        T: Copy,
    {
        let mut data = Vec::new();
        data.try_reserve_exact(source.len())
            .map_err(|_| Error::ResourceExhaustion {
                bytes: source.len() * std::mem::size_of::<T>(),
            })?;
        data.extend_from_slice(source);
        Ok(Self {
            data: data.into_boxed_slice(),
            space,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Residence the buffer was allocated in.
    pub fn space(&self) -> MemorySpace {
        self.space
    }

    /// View of the elements, shared with kernels.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Explicit copy of the contents back to host memory.
    pub fn copy_to_host(&self) -> Vec<T>
    where
        T: Copy,
    {
        self.data.to_vec()
    }
}
