//! Fixed-width palette indices packed into 64-bit words.
//!
//! Litematica has written two layouts over time. Newer files pack entries
//! back to back so an entry may straddle two words ("spanning"). Older ones
//! fit only whole entries into each word and leave the leftover high bits
//! unused ("non-spanning"). The files don't say which one they use, so the
//! layout is inferred from the word count.

use crate::options::LayoutPreference;
use schemview_common::{Result, SchemError};
use schemview_logger::LogSeverity::{Debug, Warning};
use schemview_logger::log;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitLayout {
    Spanning,
    NonSpanning,
}

/// Outcome of layout detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutChoice {
    pub layout: BitLayout,
    /// Both layouts predict the same word count yet place some entries
    /// differently, so the word count cannot tell them apart.
    pub ambiguous: bool,
}

/// `max(2, ceil(log2(palette_size)))`
pub fn bits_per_entry(palette_size: usize) -> u32 {
    let needed = match palette_size {
        0 | 1 => 0,
        n => usize::BITS - (n - 1).leading_zeros(),
    };
    needed.max(2)
}

fn mask(bits: u32) -> u64 {
    u64::MAX >> (64 - bits)
}

/// Fails with `MalformedDimensions` when `count * bits` overflows.
pub fn spanning_word_count(count: usize, bits: u32) -> Result<usize> {
    count
        .checked_mul(bits as usize)
        .map(|total| total.div_ceil(64))
        .ok_or_else(|| {
            SchemError::MalformedDimensions(format!(
                "{} entries at {} bits overflow the bit index",
                count, bits
            ))
        })
}

pub fn non_spanning_word_count(count: usize, bits: u32) -> usize {
    count.div_ceil(64 / bits as usize)
}

/// Picks a layout from the actual word count. Spanning is chosen only when
/// the two predictions differ and the array length matches the spanning one.
pub fn detect_layout(
    word_count: usize,
    palette_size: usize,
    count: usize,
) -> Result<LayoutChoice> {
    let bits = bits_per_entry(palette_size);
    let spanning = spanning_word_count(count, bits)?;
    let non_spanning = non_spanning_word_count(count, bits);

    if spanning != non_spanning && word_count == spanning {
        return Ok(LayoutChoice {
            layout: BitLayout::Spanning,
            ambiguous: false,
        });
    }

    // When the entry width divides 64 the layouts are bit-identical. Otherwise
    // they diverge once an entry lands past the first word.
    let entries_per_long = 64 / bits as usize;
    let layouts_differ = 64 % bits != 0 && count > entries_per_long;
    Ok(LayoutChoice {
        layout: BitLayout::NonSpanning,
        ambiguous: spanning == non_spanning && layouts_differ,
    })
}

/// Extracts `count` entries that may straddle word boundaries. Words past the
/// end of `words` read as zero, which tolerates truncated trailing data.
pub fn unpack_spanning(words: &[i64], bits: u32, count: usize) -> Vec<u32> {
    let mask = mask(bits);
    let word = |i: usize| words.get(i).map_or(0u64, |&w| w as u64);
    let bits = bits as usize;

    (0..count)
        .map(|i| {
            let bit_index = i * bits;
            let start_long = bit_index / 64;
            let start_offset = bit_index % 64;
            let end_long = (bit_index + bits - 1) / 64;

            let value = if start_long == end_long {
                word(start_long) >> start_offset
            } else {
                (word(start_long) >> start_offset) | (word(end_long) << (64 - start_offset))
            };
            (value & mask) as u32
        })
        .collect()
}

/// Extracts `count` entries from words that each hold `64 / bits` whole
/// entries. Fails if the array is too short for `count` entries.
pub fn unpack_non_spanning(words: &[i64], bits: u32, count: usize) -> Result<Vec<u32>> {
    let expected = non_spanning_word_count(count, bits);
    if words.len() < expected {
        return Err(SchemError::truncated(format!(
            "block states hold {} words, {} needed for {} entries",
            words.len(),
            expected,
            count
        )));
    }

    let mask = mask(bits);
    let entries_per_long = 64 / bits as usize;
    Ok((0..count)
        .map(|i| {
            let long = words[i / entries_per_long] as u64;
            let offset = (i % entries_per_long) * bits as usize;
            ((long >> offset) & mask) as u32
        })
        .collect())
}

/// Decodes `count` palette indices for a palette of `palette_size` entries.
pub fn unpack_indices(
    words: &[i64],
    palette_size: usize,
    count: usize,
    preference: LayoutPreference,
) -> Result<Vec<u32>> {
    let bits = bits_per_entry(palette_size);
    // Bit offsets of every entry must be addressable, whatever the layout
    spanning_word_count(count, bits)?;
    let layout = match preference {
        LayoutPreference::Spanning => BitLayout::Spanning,
        LayoutPreference::NonSpanning => BitLayout::NonSpanning,
        LayoutPreference::Auto => {
            let choice = detect_layout(words.len(), palette_size, count)?;
            if choice.ambiguous {
                log(
                    format!(
                        "{} words fit both layouts ({} bits, {} entries), assuming non-spanning",
                        words.len(),
                        bits,
                        count
                    ),
                    Warning,
                );
            }
            choice.layout
        }
    };

    log(
        format!(
            "Unpacking {} entries at {} bits from {} words ({:?})",
            count,
            bits,
            words.len(),
            layout
        ),
        Debug,
    );

    match layout {
        BitLayout::Spanning => Ok(unpack_spanning(words, bits, count)),
        BitLayout::NonSpanning => unpack_non_spanning(words, bits, count),
    }
}

/// Packs `values` in the given layout. The inverse of [`unpack_indices`],
/// used to build fixtures and by writers.
pub fn pack_indices(values: &[u32], palette_size: usize, layout: BitLayout) -> Vec<i64> {
    let bits = bits_per_entry(palette_size);
    let mask = mask(bits);
    let bits = bits as usize;

    match layout {
        BitLayout::Spanning => {
            let mut words = vec![0u64; (values.len() * bits).div_ceil(64)];
            for (i, &value) in values.iter().enumerate() {
                let value = u64::from(value) & mask;
                let bit_index = i * bits;
                let start_long = bit_index / 64;
                let start_offset = bit_index % 64;
                words[start_long] |= value << start_offset;
                if start_offset + bits > 64 {
                    words[start_long + 1] |= value >> (64 - start_offset);
                }
            }
            words.into_iter().map(|w| w as i64).collect()
        }
        BitLayout::NonSpanning => {
            let entries_per_long = 64 / bits;
            let mut words = vec![0u64; values.len().div_ceil(entries_per_long)];
            for (i, &value) in values.iter().enumerate() {
                let offset = (i % entries_per_long) * bits;
                words[i / entries_per_long] |= (u64::from(value) & mask) << offset;
            }
            words.into_iter().map(|w| w as i64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_bits_per_entry() {
        assert_eq!(bits_per_entry(0), 2);
        assert_eq!(bits_per_entry(1), 2);
        assert_eq!(bits_per_entry(2), 2);
        assert_eq!(bits_per_entry(4), 2);
        assert_eq!(bits_per_entry(5), 3);
        assert_eq!(bits_per_entry(8), 3);
        assert_eq!(bits_per_entry(9), 4);
        assert_eq!(bits_per_entry(16), 4);
        assert_eq!(bits_per_entry(17), 5);
        assert_eq!(bits_per_entry(4096), 12);
    }

    #[test]
    fn test_word_counts() {
        // 3 bits: 21 entries per word in the non-spanning layout
        assert_eq!(spanning_word_count(100, 3).unwrap(), 5);
        assert_eq!(non_spanning_word_count(100, 3), 5);
        assert_eq!(spanning_word_count(1000, 5).unwrap(), 79);
        assert_eq!(non_spanning_word_count(1000, 5), 84);
    }

    #[test]
    fn test_non_spanning_hand_built_4_bits() {
        // Palette of 16: nibble i of word 0 holds entry i
        let word0: u64 = 0xFEDC_BA98_7654_3210;
        let word1: u64 = 0x0000_0000_0000_00A5;
        let words = [word0 as i64, word1 as i64];

        let decoded = unpack_indices(&words, 16, 18, LayoutPreference::Auto).unwrap();
        let mut expected: Vec<u32> = (0..16).collect();
        expected.extend([5, 10]);
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_spanning_hand_built_3_bits() {
        // Palette of 5 at 3 bits: entry 21 occupies bits 63..66, straddling
        // words 0 and 1.
        let count = 30;
        let values: Vec<u32> = (0..count as u32).map(|i| (i * 3 + 1) % 5).collect();
        let mut word0 = 0u64;
        let mut word1 = 0u64;
        for (i, &v) in values.iter().enumerate() {
            let bit = i * 3;
            if bit < 64 {
                word0 |= u64::from(v) << bit;
                if bit + 3 > 64 {
                    word1 |= u64::from(v) >> (64 - bit);
                }
            } else {
                word1 |= u64::from(v) << (bit - 64);
            }
        }
        let words = [word0 as i64, word1 as i64];
        assert_eq!(spanning_word_count(count, 3).unwrap(), 2);
        assert_eq!(non_spanning_word_count(count, 3), 2);

        let decoded = unpack_indices(&words, 5, count, LayoutPreference::Spanning).unwrap();
        assert_eq!(decoded, values);
        assert_eq!(decoded[21], values[21]);
    }

    #[test]
    fn test_spanning_detected_from_length() {
        let values: Vec<u32> = (0..200).map(|i| i % 27).collect();
        let words = pack_indices(&values, 27, BitLayout::Spanning);
        assert_eq!(words.len(), spanning_word_count(200, 5).unwrap());

        let choice = detect_layout(words.len(), 27, 200).unwrap();
        assert_eq!(choice.layout, BitLayout::Spanning);
        assert!(!choice.ambiguous);
        assert_eq!(
            unpack_indices(&words, 27, 200, LayoutPreference::Auto).unwrap(),
            values
        );
    }

    #[test]
    fn test_non_spanning_detected_from_length() {
        let values: Vec<u32> = (0..200).map(|i| (i * 7) % 27).collect();
        let words = pack_indices(&values, 27, BitLayout::NonSpanning);
        assert_eq!(words.len(), non_spanning_word_count(200, 5));

        let choice = detect_layout(words.len(), 27, 200).unwrap();
        assert_eq!(choice.layout, BitLayout::NonSpanning);
        assert_eq!(
            unpack_indices(&words, 27, 200, LayoutPreference::Auto).unwrap(),
            values
        );
    }

    #[test]
    fn test_ambiguity_flag() {
        // 3 bits, 30 entries: both layouts need 2 words but differ from entry 21
        let choice = detect_layout(2, 5, 30).unwrap();
        assert_eq!(choice.layout, BitLayout::NonSpanning);
        assert!(choice.ambiguous);

        // 4 bits divide 64, so equal counts are harmless
        assert!(!detect_layout(2, 16, 30).unwrap().ambiguous);
        // Everything fits in the first word
        assert!(!detect_layout(1, 5, 21).unwrap().ambiguous);
    }

    #[test]
    fn test_negative_words_are_unsigned() {
        let words = [-1i64];
        assert_eq!(unpack_spanning(&words, 4, 16), vec![15; 16]);
        assert_eq!(unpack_non_spanning(&words, 3, 21).unwrap(), vec![7; 21]);
    }

    #[test]
    fn test_spanning_missing_words_read_as_zero() {
        let words = [-1i64];
        let decoded = unpack_spanning(&words, 4, 20);
        assert_eq!(&decoded[..16], &[15; 16]);
        assert_eq!(&decoded[16..], &[0; 4]);
    }

    #[test]
    fn test_overflowing_count_is_malformed() {
        assert_matches!(
            spanning_word_count(usize::MAX / 2, 3),
            Err(SchemError::MalformedDimensions(_))
        );
        assert_matches!(
            detect_layout(1, 5, usize::MAX / 2),
            Err(SchemError::MalformedDimensions(_))
        );
        for preference in [
            LayoutPreference::Auto,
            LayoutPreference::Spanning,
            LayoutPreference::NonSpanning,
        ] {
            assert_matches!(
                unpack_indices(&[0], 5, usize::MAX / 2, preference),
                Err(SchemError::MalformedDimensions(_))
            );
        }
    }

    #[test]
    fn test_non_spanning_truncated() {
        assert_matches!(
            unpack_indices(&[0], 16, 17, LayoutPreference::NonSpanning),
            Err(SchemError::TruncatedData(_))
        );
        assert_matches!(
            unpack_indices(&[], 2, 1, LayoutPreference::Auto),
            Err(SchemError::TruncatedData(_))
        );
    }
}
