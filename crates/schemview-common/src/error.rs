use thiserror::Error;

/// Every way a schematic decode can fail. Decoding is all-or-nothing: any of
/// these aborts the attempt and no partial grid is produced.
#[derive(Debug, Error)]
pub enum SchemError {
    /// A required compound-tree key is absent or has the wrong tag type.
    #[error("missing field: {0}")]
    MissingField(String),
    /// A varint buffer or word array ran out before every cell was decoded.
    #[error("truncated data: {0}")]
    TruncatedData(String),
    #[error("malformed dimensions: {0}")]
    MalformedDimensions(String),
    #[error("palette index {index} out of range for palette of {palette_len} entries")]
    PaletteIndexOutOfRange { index: i64, palette_len: usize },
    #[error("unknown schematic format: {0}")]
    UnknownFormat(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemError {
    pub fn missing(field: impl Into<String>) -> Self {
        SchemError::MissingField(field.into())
    }

    pub fn truncated(what: impl Into<String>) -> Self {
        SchemError::TruncatedData(what.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SchemError::missing("Regions").to_string(),
            "missing field: Regions"
        );
        assert_eq!(
            SchemError::truncated("BlockData").to_string(),
            "truncated data: BlockData"
        );
        assert_eq!(
            SchemError::PaletteIndexOutOfRange {
                index: 7,
                palette_len: 3
            }
            .to_string(),
            "palette index 7 out of range for palette of 3 entries"
        );
    }

    #[test]
    fn test_io_error_conversion_keeps_source() {
        let err: SchemError = io::Error::new(io::ErrorKind::NotFound, "nope").into();
        assert_matches!(err, SchemError::Io(_));
        assert!(err.source().is_some());
    }
}
