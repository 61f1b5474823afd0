//! Best-effort decimal conversion with C `atoi` semantics.
//!
//! Non-numeric input converts to 0 rather than failing: the probe feeds that 0
//! straight into the division fault point.

/// Outcome of a decimal scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    Success,
    /// No digits after optional whitespace and sign. Value is 0.
    NoDigits,
    /// Saturated at `i64::MAX`.
    Overflow,
    /// Saturated at `i64::MIN`.
    Underflow,
}

/// Result of [`strtol_base10`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub value: i64,
    /// Bytes consumed, 0 when no digits were found.
    pub consumed: usize,
    pub status: ConversionStatus,
}

/// Convert like `(int) strtol(s, NULL, 10)`.
///
/// The `long` result is truncated to 32 bits, so out-of-range input wraps the
/// same way it does on an LP64 libc.
pub fn atoi(s: &[u8]) -> i32 {
    strtol_base10(s).value as i32
}

/// Decimal `strtol`: whitespace, optional sign, longest digit run.
pub fn strtol_base10(s: &[u8]) -> Conversion {
    let len = s.len();
    let mut i = 0;

    while i < len && s[i].is_ascii_whitespace() {
        i += 1;
    }

    let mut negative = false;
    if i < len && (s[i] == b'-' || s[i] == b'+') {
        negative = s[i] == b'-';
        i += 1;
    }

    let abs_max = if negative {
        i64::MIN.unsigned_abs()
    } else {
        i64::MAX as u64
    };
    let cutoff = abs_max / 10;
    let cutlim = abs_max % 10;

    let mut acc: u64 = 0;
    let mut any_digits = false;
    let mut overflow = false;

    while i < len && s[i].is_ascii_digit() {
        let digit = u64::from(s[i] - b'0');
        any_digits = true;
        if !overflow {
            if acc > cutoff || (acc == cutoff && digit > cutlim) {
                overflow = true;
            } else {
                acc = acc * 10 + digit;
            }
        }
        i += 1;
    }

    if !any_digits {
        return Conversion {
            value: 0,
            consumed: 0,
            status: ConversionStatus::NoDigits,
        };
    }

    if overflow {
        let (value, status) = if negative {
            (i64::MIN, ConversionStatus::Underflow)
        } else {
            (i64::MAX, ConversionStatus::Overflow)
        };
        return Conversion {
            value,
            consumed: i,
            status,
        };
    }

    let value = if negative {
        (acc as i64).wrapping_neg()
    } else {
        acc as i64
    };

    Conversion {
        value,
        consumed: i,
        status: ConversionStatus::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoi_basic() {
        assert_eq!(atoi(b"2"), 2);
        assert_eq!(atoi(b"-1"), -1);
        assert_eq!(atoi(b"+7"), 7);
        assert_eq!(atoi(b"   123"), 123);
        assert_eq!(atoi(b"\t\n 42"), 42);
    }

    #[test]
    fn atoi_non_numeric_is_zero() {
        assert_eq!(atoi(b"abc"), 0);
        assert_eq!(atoi(b""), 0);
        assert_eq!(atoi(b"-"), 0);
        assert_eq!(atoi(b"  +"), 0);
        assert_eq!(atoi(b"--5"), 0);
    }

    #[test]
    fn atoi_stops_at_first_non_digit() {
        assert_eq!(atoi(b"12abc"), 12);
        assert_eq!(atoi(b"3.9"), 3);
        // Base 10 only: no hex prefix handling.
        assert_eq!(atoi(b"0x10"), 0);
    }

    #[test]
    fn atoi_truncates_long_to_int() {
        assert_eq!(atoi(b"4294967298"), 2);
        assert_eq!(atoi(b"2147483648"), i32::MIN);
        // Saturated i64::MAX truncates to -1.
        assert_eq!(atoi(b"99999999999999999999"), -1);
        // Saturated i64::MIN truncates to 0.
        assert_eq!(atoi(b"-99999999999999999999"), 0);
    }

    #[test]
    fn strtol_reports_consumed_and_status() {
        let c = strtol_base10(b"  -15xyz");
        assert_eq!(c.value, -15);
        assert_eq!(c.consumed, 5);
        assert_eq!(c.status, ConversionStatus::Success);

        let c = strtol_base10(b"abc");
        assert_eq!(c.consumed, 0);
        assert_eq!(c.status, ConversionStatus::NoDigits);
    }

    #[test]
    fn strtol_overflow_saturates() {
        let max = format!("{}", i64::MAX);
        let c = strtol_base10(max.as_bytes());
        assert_eq!(c.value, i64::MAX);
        assert_eq!(c.status, ConversionStatus::Success);

        let c = strtol_base10(b"9223372036854775808");
        assert_eq!(c.value, i64::MAX);
        assert_eq!(c.status, ConversionStatus::Overflow);

        let min = format!("{}", i64::MIN);
        let c = strtol_base10(min.as_bytes());
        assert_eq!(c.value, i64::MIN);
        assert_eq!(c.status, ConversionStatus::Success);

        let c = strtol_base10(b"-9223372036854775809");
        assert_eq!(c.value, i64::MIN);
        assert_eq!(c.status, ConversionStatus::Underflow);
    }
}
