//! Redaction of secrets in logs and debug output.
//!
//! Wrap private keys in [`Redacted`] before they reach a `Debug` impl or a
//! tracing field; both `Debug` and `Display` print `<redacted>`.

use std::fmt::{self, Debug, Display};

/// Wrapper that hides its inner value when formatted.
///
/// ```
/// use bridge_admin::redact::Redacted;
///
/// let key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
/// assert_eq!(format!("{}", Redacted(key)), "<redacted>");
/// ```
#[derive(Clone, Copy)]
pub struct Redacted<T>(pub T);

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
