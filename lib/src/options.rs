//! Shared option types that replace boolean flag parameters in the Rust API.

/// Controls how a loader reacts to a statement it cannot parse.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ParseMode {
    /// Abort the load at the first parse error.
    Strict,
    /// Log the error, skip the statement and keep reading.
    #[default]
    Lenient,
}

impl ParseMode {
    pub fn is_strict(self) -> bool {
        matches!(self, ParseMode::Strict)
    }
}

impl From<bool> for ParseMode {
    fn from(strict: bool) -> Self {
        if strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }
}

impl From<ParseMode> for bool {
    fn from(value: ParseMode) -> Self {
        value.is_strict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode_from_bool() {
        assert_eq!(ParseMode::from(true), ParseMode::Strict);
        assert_eq!(ParseMode::from(false), ParseMode::Lenient);
        assert!(bool::from(ParseMode::Strict));
        assert_eq!(ParseMode::default(), ParseMode::Lenient);
    }
}
