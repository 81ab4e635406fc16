//! ISO-8601 date strings carried by [`EncryptedDate`](crate::field::EncryptedDate).

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

/// Layout used by [`IsoDate::now`] and [`IsoDate::from_datetime`].
pub const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// A pre-formatted ISO-8601 timestamp.
///
/// The string is opaque to field encryption: it is stored and restored
/// byte-for-byte and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct IsoDate(String);

impl IsoDate {
    /// Wraps an already formatted timestamp.
    #[must_use]
    pub fn new(formatted: impl Into<String>) -> Self {
        Self(formatted.into())
    }

    /// Formats the current UTC time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(&Utc::now())
    }

    /// Formats `datetime` with [`ISO8601_FORMAT`].
    #[must_use]
    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(datetime.format(ISO8601_FORMAT).to_string())
    }

    /// Returns the formatted string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the date, returning the formatted string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IsoDate {
    fn from(formatted: String) -> Self {
        Self(formatted)
    }
}

impl From<&str> for IsoDate {
    fn from(formatted: &str) -> Self {
        Self(formatted.to_string())
    }
}

impl AsRef<str> for IsoDate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
