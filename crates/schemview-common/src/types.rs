use crate::error::SchemError;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, SchemError>;

/// Widest packed entry a cell may take; one full 64-bit word.
pub const MAX_BITS_PER_CELL: usize = 64;

/// Extent of a voxel grid. Y is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub length: u32,
}

impl Dimensions {
    /// Validates raw signed extents. Every axis must be positive and the
    /// cell count must fit in memory addressing.
    pub fn new(width: i64, height: i64, length: i64) -> Result<Self> {
        let axis = |name: &str, value: i64| -> Result<u32> {
            if value <= 0 {
                return Err(SchemError::MalformedDimensions(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
            u32::try_from(value).map_err(|_| {
                SchemError::MalformedDimensions(format!("{} too large: {}", name, value))
            })
        };

        let dims = Dimensions {
            width: axis("width", width)?,
            height: axis("height", height)?,
            length: axis("length", length)?,
        };
        dims.checked_bit_length().ok_or_else(|| {
            SchemError::MalformedDimensions(format!(
                "{}x{}x{} overflows the cell count",
                width, height, length
            ))
        })?;
        Ok(dims)
    }

    /// Bits needed to pack every cell at the widest entry size. Keeping this
    /// in range lets packed decoders index bits without overflow.
    fn checked_bit_length(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.length as usize)?
            .checked_mul(MAX_BITS_PER_CELL)
    }

    /// Total number of cells. Always representable once constructed via `new`.
    pub fn volume(&self) -> usize {
        self.width as usize * self.height as usize * self.length as usize
    }

    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.width
            && (y as u32) < self.height
            && (z as u32) < self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_dimensions_volume() {
        let dims = Dimensions::new(3, 4, 5).unwrap();
        assert_eq!(dims.volume(), 60);
        assert!(dims.contains(2, 3, 4));
        assert!(!dims.contains(3, 0, 0));
        assert!(!dims.contains(0, -1, 0));
    }

    #[test]
    fn test_dimensions_reject_non_positive() {
        assert_matches!(
            Dimensions::new(0, 1, 1),
            Err(SchemError::MalformedDimensions(_))
        );
        assert_matches!(
            Dimensions::new(1, -4, 1),
            Err(SchemError::MalformedDimensions(_))
        );
    }

    #[test]
    fn test_dimensions_reject_unpackable_volume() {
        // Fits in usize as a cell count, but not once every cell takes bits
        assert_matches!(
            Dimensions::new(i64::from(i32::MAX), i64::from(i32::MAX), 2),
            Err(SchemError::MalformedDimensions(_))
        );
        let dims = Dimensions::new(1 << 20, 1 << 20, 1 << 10).unwrap();
        assert_eq!(dims.volume(), 1 << 50);
    }

    #[test]
    fn test_dimensions_reject_oversized_axis() {
        assert_matches!(
            Dimensions::new(i64::from(u32::MAX) + 1, 1, 1),
            Err(SchemError::MalformedDimensions(_))
        );
    }
}
