//! Date/time parsing
//!
//! Directory records carry a 7-byte binary recording time.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

/// Seconds per GMT offset step (15 minutes)
const GMT_OFFSET_UNIT: i32 = 15 * 60;

/// 7-byte directory record datetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTime7 {
    /// Years since 1900
    pub year: u8,

    /// Month (1-12)
    pub month: u8,

    /// Day (1-31)
    pub day: u8,

    /// Hour (0-23)
    pub hour: u8,

    /// Minute (0-59)
    pub minute: u8,

    /// Second (0-59)
    pub second: u8,

    /// GMT offset in 15-minute intervals (-48 to +52)
    pub gmt_offset: i8,
}

impl DateTime7 {
    /// Parse from 7-byte array
    pub fn from_bytes(bytes: &[u8; 7]) -> Self {
        Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
            gmt_offset: bytes[6] as i8,
        }
    }

    /// Get full year (1900 + year)
    pub fn full_year(&self) -> u16 {
        1900 + self.year as u16
    }

    /// Recording time in the zone it was recorded in
    ///
    /// The fields are local time at `gmt_offset`. Returns `None` for an unset
    /// (all-zero) stamp or one with out-of-range fields.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let naive = NaiveDate::from_ymd_opt(
            i32::from(self.full_year()),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )?;
        let offset = FixedOffset::east_opt(i32::from(self.gmt_offset) * GMT_OFFSET_UNIT)?;
        offset.from_local_datetime(&naive).single()
    }

    /// Seconds since the Unix epoch
    pub fn unix_timestamp(&self) -> Option<i64> {
        self.to_datetime().map(|dt| dt.timestamp())
    }

    /// Recording time as a `SystemTime`, `UNIX_EPOCH` when unset
    pub fn to_system_time(&self) -> SystemTime {
        self.to_datetime()
            .map(SystemTime::from)
            .unwrap_or(UNIX_EPOCH)
    }
}
