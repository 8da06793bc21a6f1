//! ASCII character classes used when printing bus data

/// Printable ASCII, space through `~`.
#[inline]
pub const fn is_print(c: u8) -> bool {
    matches!(c, 0x20..=0x7e)
}

#[inline]
pub const fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Space, tab, LF, VT, FF or CR.
#[inline]
pub const fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t'..=b'\r')
}
