//! CRC-32 checksum (ISO-HDLC / ITU-T V.42), the variant used by ZIP and gzip.
//!
//! The lookup table is built at compile time, so there is no runtime
//! initialization and nothing mutable is shared between callers.

/// Reversed representation of the CRC-32 polynomial 0x04C11DB7.
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// 256-entry lookup table, one value per possible low byte of the accumulator.
static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// Compute the CRC-32 of `data`.
///
/// # Examples
///
/// ```
/// use storezip::zip::crc32;
///
/// assert_eq!(crc32(b""), 0);
/// assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
/// ```
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc = TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}
