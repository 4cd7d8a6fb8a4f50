//! Owned byte buffers that can be handed across the host/guest boundary.
//!
//! Every buffer the guest gives to the host comes from [`GuestBuffer`]. The
//! capacity is stored in an 8-byte header in front of the returned pointer,
//! so a buffer can be released given nothing but its address.
//!
//! ```text
//! base                 data (pointer seen by the host)
//! |  capacity: u64 LE  |  capacity bytes ...  |
//! ```
//!
//! Ownership transfer is explicit: [`GuestBuffer::into_raw`] gives the
//! allocation away and [`GuestBuffer::from_raw`] takes it back.

use alloc::alloc::{alloc_zeroed, dealloc, Layout};
use core::fmt;
use core::mem;
use core::ptr::NonNull;
use core::slice;

use crate::cstr;
use crate::error::{TallyError, TallyResult};

/// Size of the capacity header placed before every buffer.
pub const HEADER_LEN: usize = 8;

/// Alignment of every allocation (the header is a u64).
const BUFFER_ALIGN: usize = 8;

/// A zero-initialised, header-prefixed heap buffer.
pub struct GuestBuffer {
    data: NonNull<u8>,
}

impl GuestBuffer {
    /// Allocate `capacity` zeroed bytes.
    ///
    /// Fails with `AllocationFailure` instead of aborting when the request
    /// cannot be satisfied.
    pub fn allocate(capacity: usize) -> TallyResult<Self> {
        let failure = TallyError::AllocationFailure { requested: capacity };
        let layout = layout_for(capacity).ok_or_else(|| failure.clone())?;

        // SAFETY: `layout` always has a non-zero size (it includes the header).
        let base = NonNull::new(unsafe { alloc_zeroed(layout) }).ok_or(failure)?;

        // SAFETY: `base` is 8-aligned and at least HEADER_LEN bytes long.
        unsafe {
            base.as_ptr()
                .cast::<[u8; HEADER_LEN]>()
                .write((capacity as u64).to_le_bytes());
        }

        // SAFETY: the data region starts HEADER_LEN bytes into the allocation.
        let data = unsafe { NonNull::new_unchecked(base.as_ptr().add(HEADER_LEN)) };
        Ok(Self { data })
    }

    /// Number of usable bytes in the buffer.
    pub fn capacity(&self) -> usize {
        // SAFETY: every GuestBuffer was created by `allocate`, which wrote the header.
        let header = unsafe { self.base().cast::<[u8; HEADER_LEN]>().read() };
        u64::from_le_bytes(header) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.capacity() == 0
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `data` points at `capacity` initialised bytes owned by self.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.capacity()) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let len = self.capacity();
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), len) }
    }

    /// The bytes before the first NUL, or the whole buffer if it has none.
    pub fn c_str(&self) -> &[u8] {
        let bytes = self.as_slice();
        &bytes[..cstr::string_length(bytes)]
    }

    /// Give up ownership. The caller must eventually pass the pointer back
    /// to [`GuestBuffer::from_raw`] exactly once.
    pub fn into_raw(self) -> NonNull<u8> {
        let data = self.data;
        mem::forget(self);
        data
    }

    /// Reclaim a buffer previously given away with [`GuestBuffer::into_raw`].
    ///
    /// # Safety
    /// - `data` must come from `into_raw` on a `GuestBuffer`
    /// - it must not have been reclaimed already
    pub unsafe fn from_raw(data: NonNull<u8>) -> Self {
        Self { data }
    }

    fn base(&self) -> *mut u8 {
        // SAFETY: the header sits immediately before `data` in the same allocation.
        unsafe { self.data.as_ptr().sub(HEADER_LEN) }
    }
}

impl Drop for GuestBuffer {
    fn drop(&mut self) {
        if let Some(layout) = layout_for(self.capacity()) {
            // SAFETY: `base` and `layout` match the original `alloc_zeroed` call.
            unsafe { dealloc(self.base(), layout) }
        }
    }
}

impl fmt::Debug for GuestBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestBuffer")
            .field("data", &self.data)
            .field("capacity", &self.capacity())
            .finish()
    }
}

fn layout_for(capacity: usize) -> Option<Layout> {
    let total = capacity.checked_add(HEADER_LEN)?;
    Layout::from_size_align(total, BUFFER_ALIGN).ok()
}
