//! ASCII text tokenization primitives.
//!
//! Shared by every line-oriented decoder: non-empty line splitting,
//! delimiter sniffing (tab beats comma beats whitespace runs), numeric
//! coercion that returns `Option` instead of panicking, and the
//! header-row heuristic built on top of it.

/// Delimiter detected for a body of delimiter-separated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Tab character. Wins whenever any line contains one.
    Tab,
    /// Comma.
    Comma,
    /// One or more whitespace characters.
    Whitespace,
}

impl Delimiter {
    /// The byte for the `csv` crate's delimiter setting, when fixed-width.
    pub fn as_byte(self) -> Option<u8> {
        match self {
            Delimiter::Tab => Some(b'\t'),
            Delimiter::Comma => Some(b','),
            Delimiter::Whitespace => None,
        }
    }
}

/// Decode a byte buffer as text, replacing invalid UTF-8 losslessly enough
/// for tokenization. ASCII formats pass through unchanged.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Split text into trimmed, non-empty lines.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Sniff the delimiter for the whole body of text.
pub fn detect_delimiter(text: &str) -> Delimiter {
    if text.contains('\t') {
        Delimiter::Tab
    } else if text.contains(',') {
        Delimiter::Comma
    } else {
        Delimiter::Whitespace
    }
}

/// Split one line into tokens by the given delimiter.
///
/// Tab/comma splits keep empty cells (a missing CSV cell is positional);
/// whitespace splitting collapses runs and never yields empty tokens.
pub fn split_tokens(line: &str, delimiter: Delimiter) -> Vec<&str> {
    match delimiter {
        Delimiter::Tab => line.split('\t').map(str::trim).collect(),
        Delimiter::Comma => line.split(',').map(str::trim).collect(),
        Delimiter::Whitespace => line.split_whitespace().collect(),
    }
}

/// Coerce a token to a float. Returns `None` instead of panicking so the
/// caller decides, per field, whether the failure is fatal or skippable.
pub fn coerce_f64(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok()
}

/// Header-row heuristic: a line looks like a header iff at least one of
/// its non-empty tokens fails numeric coercion.
pub fn looks_like_header(line: &str, delimiter: Delimiter) -> bool {
    split_tokens(line, delimiter)
        .into_iter()
        .filter(|t| !t.is_empty())
        .any(|t| coerce_f64(t).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_wins_over_comma() {
        assert_eq!(detect_delimiter("a\tb,c"), Delimiter::Tab);
        assert_eq!(detect_delimiter("a,b c"), Delimiter::Comma);
        assert_eq!(detect_delimiter("1 2 3"), Delimiter::Whitespace);
    }

    #[test]
    fn whitespace_split_collapses_runs() {
        assert_eq!(
            split_tokens("  1.0   2.0\t 3.0 ", Delimiter::Whitespace),
            vec!["1.0", "2.0", "3.0"]
        );
    }

    #[test]
    fn comma_split_keeps_empty_cells() {
        assert_eq!(split_tokens("a,,b", Delimiter::Comma), vec!["a", "", "b"]);
    }

    #[test]
    fn coercion_never_panics() {
        assert_eq!(coerce_f64("3.25"), Some(3.25));
        assert_eq!(coerce_f64("-1e-3"), Some(-0.001));
        assert_eq!(coerce_f64("volts"), None);
        assert_eq!(coerce_f64(""), None);
    }

    #[test]
    fn header_heuristic() {
        assert!(looks_like_header("time,value", Delimiter::Comma));
        assert!(!looks_like_header("0.0,1.5", Delimiter::Comma));
        assert!(looks_like_header("t, 1.0", Delimiter::Comma));
    }
}
