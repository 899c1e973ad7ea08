//! Cursor over `Label: value` lines.

use super::{DecodeError, DecodeErrorKind};
use crate::constants::RECORD_SEPARATOR;
use std::iter::{Enumerate, Peekable};
use std::str::{FromStr, Lines};

pub(crate) struct LineCursor<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    total: usize,
}

/// Returns the value of `line` if it carries `label`.
///
/// The single space after the colon belongs to the layout; any further whitespace is part of
/// the value.
fn field_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(label)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

impl<'a> LineCursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate().peekable(),
            total: text.lines().count(),
        }
    }

    /// 1-based number of the next line, if any.
    pub(crate) fn peek_line_number(&mut self) -> Option<usize> {
        self.lines.peek().map(|(index, _)| index + 1)
    }

    pub(crate) fn next_is(&mut self, label: &str) -> bool {
        matches!(self.lines.peek(), Some((_, line)) if field_value(line, label).is_some())
    }

    pub(crate) fn skip_blank(&mut self) {
        while matches!(self.lines.peek(), Some((_, line)) if line.trim().is_empty()) {
            self.lines.next();
        }
    }

    /// Consumes the next line, which must carry `label`. Returns its line number and value.
    pub(crate) fn field(&mut self, label: &'static str) -> Result<(usize, &'a str), DecodeError> {
        match self.lines.next() {
            None => Err(DecodeError::new(
                self.total + 1,
                DecodeErrorKind::UnexpectedEof { expected: label },
            )),
            Some((index, line)) => field_value(line, label)
                .map(|value| (index + 1, value))
                .ok_or_else(|| {
                    DecodeError::new(
                        index + 1,
                        DecodeErrorKind::UnexpectedLine {
                            expected: label,
                            found: line.to_string(),
                        },
                    )
                }),
        }
    }

    /// Consumes the next line and parses its value.
    pub(crate) fn parsed<T: FromStr>(&mut self, label: &'static str) -> Result<T, DecodeError> {
        let (line, value) = self.field(label)?;
        value.parse::<T>().map_err(|_| {
            DecodeError::new(
                line,
                DecodeErrorKind::InvalidValue {
                    field: label,
                    value: value.to_string(),
                },
            )
        })
    }

    pub(crate) fn separator(&mut self) -> Result<(), DecodeError> {
        match self.lines.next() {
            Some((_, line)) if line.trim_end() == RECORD_SEPARATOR => Ok(()),
            Some((index, line)) => Err(DecodeError::new(
                index + 1,
                DecodeErrorKind::MissingSeparator {
                    found: Some(line.to_string()),
                },
            )),
            None => Err(DecodeError::new(
                self.total + 1,
                DecodeErrorKind::MissingSeparator { found: None },
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_keeps_extra_whitespace() {
        assert_eq!(field_value("Name: Alice", "Name"), Some("Alice"));
        assert_eq!(field_value("Name: ", "Name"), Some(""));
        assert_eq!(field_value("Name:  Al ", "Name"), Some(" Al "));
        assert_eq!(field_value("Name:Alice", "Name"), Some("Alice"));
        assert_eq!(field_value("Medication Time: 08:00", "Medication"), None);
        assert_eq!(field_value("Names: x", "Name"), None);
    }

    #[test]
    fn parsed_reports_line_of_bad_value() {
        let mut cursor = LineCursor::new("Age: 30\nAge: thirty\n");
        assert_eq!(cursor.parsed::<u32>("Age").unwrap(), 30);
        let err = cursor.parsed::<u32>("Age").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
