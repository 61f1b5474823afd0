//! The four-slot integer buffer and its printer.

use std::io::{self, Write};

/// Fill byte used in place of indeterminate memory when running memory-safe.
pub const POISON_BYTE: u8 = 0xbe;

/// One `i32` made of [`POISON_BYTE`]s (`0xbebebebe`).
pub const POISON: i32 = i32::from_ne_bytes([POISON_BYTE; 4]);

/// Write each element followed by `", "`, then a newline.
///
/// Prints whatever the slots hold; nothing is validated.
pub fn print_array<W: Write + ?Sized>(out: &mut W, values: &[i32; 4]) -> io::Result<()> {
    for value in values {
        write!(out, "{value}, ")?;
    }
    out.write_all(b"\n")
}

/// A buffer standing in for uninitialized stack memory.
#[must_use]
pub const fn poisoned() -> [i32; 4] {
    [POISON; 4]
}
