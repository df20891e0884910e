//! Executable memory for finished instruction streams.
//!
//! A region is a dedicated page-aligned anonymous mapping, never part of the
//! general heap: allocators do not hand out execute permission. The bytes
//! are copied in while the mapping is read+write, the permissions are
//! flipped once to read+execute, and they are never widened back. The
//! matching `munmap` runs on drop.

use std::io;
use std::mem;
use std::ptr;
use std::slice;

use crate::object::Object;

use super::trampoline::{EntryFn, EvalStack};
use super::{CompileError, RuntimeError};

/// A page-aligned read+execute mapping holding finished code, plus the
/// immediates table the code references by index.
///
/// Regions may be moved but not copied; dropping one releases the mapping.
#[derive(Debug)]
pub struct ExecutableRegion {
    code_ptr: *const u8,
    code_len: usize,
    map_len: usize,
    immediates: Vec<Object>,
}

// Safety: the mapping is read+execute and never written after construction,
// and the immediates table is immutable. `invoke` builds a private
// evaluation stack per call, so concurrent invocations do not share mutable
// state through the region.
unsafe impl Send for ExecutableRegion {}
unsafe impl Sync for ExecutableRegion {}

impl ExecutableRegion {
    /// Map `code` into fresh executable pages and take ownership of its
    /// immediates.
    pub(crate) fn new(code: &[u8], immediates: Vec<Object>) -> Result<Self, CompileError> {
        let page = page_size()?;
        let map_len = code
            .len()
            .checked_add(page - 1)
            .map(|n| n / page * page)
            .ok_or(CompileError::Capacity(code.len()))?;

        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(CompileError::OsResource(io::Error::last_os_error()));
        }

        unsafe {
            ptr::copy_nonoverlapping(code.as_ptr(), base.cast::<u8>(), code.len());
        }

        if unsafe { libc::mprotect(base, map_len, libc::PROT_READ | libc::PROT_EXEC) } != 0 {
            let error = io::Error::last_os_error();
            unsafe {
                libc::munmap(base, map_len);
            }
            return Err(CompileError::Permission(error));
        }

        Ok(ExecutableRegion {
            code_ptr: base.cast_const().cast::<u8>(),
            code_len: code.len(),
            map_len,
            immediates,
        })
    }

    /// Run the region against a fresh evaluation stack and return the single
    /// stack survivor.
    ///
    /// A fault recorded by a built-in, or any stack size other than one on
    /// return, surfaces as a [`RuntimeError`]. The region itself is
    /// unaffected by runtime failures and may be invoked again.
    pub fn invoke(&self) -> Result<Object, RuntimeError> {
        let mut stack = EvalStack::new();
        // Safety: the mapping holds a complete instruction stream whose
        // entry point is offset zero and whose signature is EntryFn; the
        // stack and region pointers outlive the call.
        unsafe {
            let entry: EntryFn = mem::transmute(self.code_ptr);
            entry(&mut stack, self);
        }
        stack.finish()
    }

    /// The `index`-th immediate.
    ///
    /// Indices are assigned during code generation; an out-of-range index
    /// means the emitted code is corrupt, which panics rather than
    /// continuing.
    pub fn immediate(&self, index: u32) -> &Object {
        &self.immediates[index as usize]
    }

    /// Number of immediates owned by this region.
    pub fn immediate_count(&self) -> usize {
        self.immediates.len()
    }

    /// The finished instruction stream (without the page-rounding tail).
    pub fn code(&self) -> &[u8] {
        // Safety: code_ptr..code_ptr+code_len lies inside the live mapping
        // and is readable.
        unsafe { slice::from_raw_parts(self.code_ptr, self.code_len) }
    }
}

impl Drop for ExecutableRegion {
    fn drop(&mut self) {
        // Safety: base and length are exactly what mmap returned.
        unsafe {
            libc::munmap(self.code_ptr.cast_mut().cast(), self.map_len);
        }
    }
}

fn page_size() -> Result<usize, CompileError> {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        return Err(CompileError::OsResource(io::Error::last_os_error()));
    }
    Ok(size as usize)
}
