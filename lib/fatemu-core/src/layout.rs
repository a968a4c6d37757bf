//! How things are named and laid out in the record store.
//!
//! Every logical file is one entry record plus zero or more block records:
//!
//! - the entry record is named `{name}.fat` and holds the file metadata
//!   and a reference to the first block (see `entry.rs`);
//! - block `i` of the file is named `{name}.{i}.blk` and holds up to
//!   MAX_BLOCK characters of content plus a reference to block `i + 1`
//!   (see `block.rs`).
//!
//! A block name ends in a single decimal index before the suffix, so
//! `{name}.{i}.blk` can never be produced by two different (name, i) pairs.
//! Entry and block records are told apart by their suffix.
//!
//! Records are TOML documents. Timestamps are RFC 3339 strings in UTC,
//! e.g. `2026-10-16T09:30:00.123456789Z`.
use std::fmt;

use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::{FatError, Result};

/// Max number of characters (Unicode scalar values) in a block payload.
pub const MAX_BLOCK: usize = 20;

pub const ENTRY_SUFFIX: &str = ".fat";
pub const BLOCK_SUFFIX: &str = ".blk";

pub(crate) fn entry_record_name(name: &str) -> String {
    format!("{name}{ENTRY_SUFFIX}")
}

pub(crate) fn block_record_name(base_name: &str, index: usize) -> String {
    format!("{base_name}.{index}{BLOCK_SUFFIX}")
}

/// File names end up inside record names, so on top of being non-blank
/// they may not contain path separators or NUL.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(FatError::validation("file name cannot be empty"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(FatError::validation(format!(
            "file name {name:?} contains a path separator or NUL"
        )));
    }

    Ok(())
}

/// Opaque reference to a block record. "No block" is expressed as
/// `Option<BlockRef>::None`, persisted as an empty string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockRef(String);

impl BlockRef {
    pub(crate) fn new(record_name: String) -> Self {
        debug_assert!(!record_name.is_empty());
        Self(record_name)
    }

    /// Decode the persisted form: the empty string means "none".
    pub(crate) fn from_persisted(raw: String) -> Option<Self> {
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    pub(crate) fn to_persisted(this: Option<&BlockRef>) -> String {
        this.map(|r| r.0.clone()).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point in time, always kept in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn parse(raw: &str) -> std::result::Result<Self, time::error::Parse> {
        let ts = OffsetDateTime::parse(raw, &Rfc3339)?;
        Ok(Self(ts.to_offset(UtcOffset::UTC)))
    }

    pub fn to_rfc3339(&self) -> std::result::Result<String, time::error::Format> {
        self.0.format(&Rfc3339)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_names() {
        assert_eq!("note.fat", entry_record_name("note"));
        assert_eq!("note.0.blk", block_record_name("note", 0));
        assert_eq!("a.1.12.blk", block_record_name("a.1", 12));
        assert_ne!(block_record_name("a.1", 2), block_record_name("a", 12));
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("note").is_ok());
        assert!(validate_name("my notes.txt").is_ok());
        for bad in ["", "   ", "\t", "a/b", "a\\b", "a\0"] {
            assert!(
                matches!(validate_name(bad), Err(FatError::Validation(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn timestamps() {
        let ts = Timestamp::parse("2026-10-16T09:30:00.5Z").unwrap();
        assert_eq!("2026-10-16T09:30:00.5Z", ts.to_rfc3339().unwrap());

        // Offsets are normalized to UTC.
        let shifted = Timestamp::parse("2026-10-16T11:30:00.5+02:00").unwrap();
        assert_eq!(ts, shifted);

        for bad in ["", "yesterday", "2026-10-16", "16/10/2026 09:30:00"] {
            assert!(Timestamp::parse(bad).is_err(), "{bad:?}");
        }

        let now = Timestamp::now();
        assert_eq!(now, Timestamp::parse(&now.to_rfc3339().unwrap()).unwrap());
    }
}
