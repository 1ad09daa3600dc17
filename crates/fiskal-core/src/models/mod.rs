//! Receipt, payload and configuration models.

pub mod amount;
pub mod config;
pub mod payload;
pub mod receipt;

use chrono::{DateTime, FixedOffset, Offset, TimeZone};

/// Pin a timestamp to the offset it has in its own zone.
pub(crate) fn to_fixed_offset<Tz: TimeZone>(date: DateTime<Tz>) -> DateTime<FixedOffset> {
    let offset = date.offset().fix();
    date.with_timezone(&offset)
}
