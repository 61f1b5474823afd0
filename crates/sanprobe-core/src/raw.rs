//! Fault primitives that execute real undefined behavior.
//!
//! Everything here exists to be observed by an external instrument
//! (MemorySanitizer, AddressSanitizer, Miri, Valgrind). None of the `unsafe`
//! functions can be called soundly with the inputs the probe feeds them.

use std::ffi::{CStr, CString, c_char};
use std::io::{self, Write};
use std::mem::MaybeUninit;

use crate::buffer::print_array;
use crate::error::ProbeError;

/// Print a 4-slot stack buffer that was never written.
///
/// # Safety
///
/// Never sound: reads indeterminate memory.
#[inline(never)]
pub unsafe fn print_uninit_array<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    let buffer = MaybeUninit::<[i32; 4]>::uninit();
    // SAFETY: none; this read is the probed fault.
    let values = unsafe { buffer.assume_init_ref() };
    print_array(out, values)
}

/// Compute `dividend / divisor`, raising `SIGFPE` first when `divisor` is 0.
///
/// With the default disposition the signal kills the process the way an
/// x86 `idiv` trap would. If the signal is ignored or handled and returns,
/// the division itself panics.
pub fn divide_or_trap(dividend: i32, divisor: i32) -> i32 {
    if divisor == 0 {
        // SAFETY: raise(3) only delivers a signal to the calling thread.
        unsafe {
            libc::raise(libc::SIGFPE);
        }
    }
    dividend / divisor
}

/// A C-style argument vector: `argc` pointers followed by a NULL terminator.
pub struct CArgv {
    _owned: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl CArgv {
    pub fn new<A: AsRef<[u8]>>(args: &[A]) -> Result<Self, ProbeError> {
        let owned = args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                CString::new(arg.as_ref()).map_err(|_| ProbeError::InteriorNul { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ptrs = owned
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        Ok(Self {
            _owned: owned,
            ptrs,
        })
    }

    #[must_use]
    pub fn argc(&self) -> usize {
        self.ptrs.len() - 1
    }

    #[must_use]
    pub fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }
}

/// Write `argv[index]` without a bounds check.
///
/// `argv[argc]` is the NULL terminator, so `index == argc` dereferences NULL;
/// negative or larger indices read outside the pointer array.
///
/// # Safety
///
/// Sound only for `0 <= index < argv.argc()`.
#[inline(never)]
pub unsafe fn write_arg_unchecked<W: Write + ?Sized>(
    out: &mut W,
    argv: &CArgv,
    index: i32,
) -> io::Result<()> {
    let slot = argv.as_ptr().wrapping_offset(index as isize);
    // SAFETY: caller contract; out-of-range slots are the probed fault.
    let arg = unsafe { CStr::from_ptr(*slot) };
    out.write_all(arg.to_bytes())
}
