//! LEB128-style varints as used by Sponge `BlockData`.

use bytes::{Buf, BufMut};
use schemview_common::{Result, SchemError};

/// Decodes exactly `count` varints from `buf`.
///
/// Each value takes 7 bits per byte, least significant group first, and
/// continues while the high bit is set. Bits shifted past 32 are dropped;
/// keeping values inside the palette range is the writer's job.
pub fn decode_varints<B: Buf>(mut buf: B, count: usize) -> Result<Vec<i32>> {
    // Every varint is at least one byte, so this caps the allocation for
    // bogus dimensions.
    let mut values = Vec::with_capacity(count.min(buf.remaining()));
    for decoded in 0..count {
        let value = read_varint(&mut buf).ok_or_else(|| {
            SchemError::truncated(format!(
                "varint stream ended after {} of {} values",
                decoded, count
            ))
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Reads a single varint, or `None` if the buffer runs dry mid-value.
pub fn read_varint<B: Buf>(buf: &mut B) -> Option<i32> {
    let mut value = 0i32;
    let mut shift = 0u32;
    loop {
        if !buf.has_remaining() {
            return None;
        }
        let byte = buf.get_u8();
        if shift < 32 {
            value |= i32::from(byte & 0x7F) << shift;
        }
        shift = shift.saturating_add(7);
        if byte & 0x80 == 0 {
            return Some(value);
        }
    }
}

/// Appends `value` as a varint. Negative values take five bytes.
pub fn write_varint<B: BufMut>(buf: &mut B, value: i32) {
    let mut value = value as u32;
    while value & !0x7F != 0 {
        buf.put_u8((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}
