//! Result buffer handed to the host

use std::ptr;

/// Buffer returned across the C ABI
///
/// Rust allocates and fills the buffer; the host copies the bytes out and
/// hands it back through `webworks_free_buffer`. Invocation results are
/// UTF-8 strings, so the data is never null-terminated; use `len`.
#[repr(C)]
pub struct FfiBuffer {
    /// Pointer to the data
    pub data: *mut u8,
    /// Length of valid data in bytes
    pub len: usize,
    /// Total capacity of the allocation
    pub capacity: usize,
    /// Error code (0 = success)
    pub error_code: u32,
}

impl FfiBuffer {
    /// Create an empty buffer
    pub fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            len: 0,
            capacity: 0,
            error_code: 0,
        }
    }

    /// Take ownership of a Vec's allocation
    pub fn from_vec(vec: Vec<u8>) -> Self {
        let mut vec = std::mem::ManuallyDrop::new(vec);
        Self {
            data: vec.as_mut_ptr(),
            len: vec.len(),
            capacity: vec.capacity(),
            error_code: 0,
        }
    }

    /// Successful result carrying a string
    pub fn from_string(value: String) -> Self {
        Self::from_vec(value.into_bytes())
    }

    /// Error result; the message is stored as the data
    pub fn error(code: u32, message: &str) -> Self {
        let mut buffer = Self::from_vec(message.as_bytes().to_vec());
        buffer.error_code = code;
        buffer
    }

    pub fn is_error(&self) -> bool {
        self.error_code != 0
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_null() || self.len == 0
    }

    /// Get the data as a slice
    ///
    /// # Safety
    ///
    /// The buffer must not have been freed.
    pub unsafe fn as_slice(&self) -> &[u8] {
        if self.data.is_null() {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.data, self.len) }
        }
    }

    /// Copy the data out as a string, replacing invalid UTF-8
    ///
    /// # Safety
    ///
    /// The buffer must not have been freed.
    pub unsafe fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(unsafe { self.as_slice() }).into_owned()
    }

    /// Free the buffer's memory
    ///
    /// # Safety
    ///
    /// Only the first call releases memory; the buffer is reset to empty so
    /// repeated calls are harmless, but the host must not read it afterwards.
    pub unsafe fn free(&mut self) {
        if !self.data.is_null() && self.capacity > 0 {
            // SAFETY: data/len/capacity come from a Vec leaked in from_vec
            drop(unsafe { Vec::from_raw_parts(self.data, self.len, self.capacity) });
        }
        self.data = ptr::null_mut();
        self.len = 0;
        self.capacity = 0;
    }
}

impl Default for FfiBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

// FfiBuffer owns its data
unsafe impl Send for FfiBuffer {}

#[cfg(test)]
#[path = "buffer/buffer_tests.rs"]
mod buffer_tests;
