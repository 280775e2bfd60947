/// Folds one ASCII character into a 4-bit value.
///
/// Characters above `'9'` are pulled down by 7 so that `'A'..='F'` land on
/// `0x3A..=0x3F`, then the low nibble is kept. Lowercase `'a'..='f'` lands on
/// `0x5A..=0x5F` and decodes the same way. Nothing is rejected: a character
/// that is not a hex digit still produces some nibble.
#[inline]
pub fn fold(byte: u8) -> u8 {
    let byte = if byte > b'9' { byte.wrapping_sub(7) } else { byte };
    byte & 0x0F
}
