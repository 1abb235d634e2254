//! Human-readable rendering of decode failures.

use crate::decoder::DecodeFailure;

/// One line per error, `<path>: expected <expected>, got <actual>`, in the
/// order the errors were recorded.
pub fn lines(failure: &DecodeFailure) -> Vec<String> {
    failure.errors().iter().map(ToString::to_string).collect()
}

/// All of [`lines`] joined with newlines.
pub fn draw(failure: &DecodeFailure) -> String {
    lines(failure).join("\n")
}
