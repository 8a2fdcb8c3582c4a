//! Translation errors with line/column diagnostics.

/// Error raised by either translation direction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Ill-formed input; positions are 1-based.
    #[error("{line}:{col}: {message}")]
    Parse {
        line: u32,
        col: u32,
        message: String,
    },
}

impl SurfaceError {
    /// Build a parse error pointing at a byte offset of `input`.
    pub(crate) fn at(input: &str, offset: usize, message: impl Into<String>) -> SurfaceError {
        let (line, col) = line_col(input, offset);
        SurfaceError::Parse {
            line,
            col,
            message: message.into(),
        }
    }
}

/// 1-based line and column of a byte offset.
pub(crate) fn line_col(input: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;
    for byte in input.as_bytes().iter().take(offset) {
        if *byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn offsets_map_to_lines_and_columns() {
        let input = "ab\ncde\nf";
        assert_eq!(line_col(input, 0), (1, 1));
        assert_eq!(line_col(input, 1), (1, 2));
        assert_eq!(line_col(input, 3), (2, 1));
        assert_eq!(line_col(input, 7), (3, 1));
    }

    #[test]
    fn display_includes_position() {
        let error = SurfaceError::at("x\nyz", 2, "expected a term");
        assert_eq!(error.to_string(), "2:1: expected a term");
    }
}
