// ABOUTME: Service centre timestamp (TP-SCTS) decoding with validated components
// ABOUTME: Seven semi-octet swapped fields: year, month, day, hour, minute, second, time zone

use crate::codec::{Decodable, PduError, decode_bytes, decode_semi_octet};
use std::fmt;
use std::io::Cursor;

/// A service centre timestamp with a quarter-hour UTC offset
///
/// The year is kept as the two digits carried on the wire; use
/// [`ServiceCentreTimestamp::full_year`] for a four-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceCentreTimestamp {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Offset from UTC in quarter hours, negative west of Greenwich
    pub offset_quarters: i8,
}

impl ServiceCentreTimestamp {
    /// Size of the encoded field in octets
    pub const SIZE: usize = 7;

    const SIGN_BIT: u8 = 0b0000_1000;

    /// Creates a timestamp from components, validating their ranges
    pub fn new(
        year: u8,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        offset_quarters: i8,
    ) -> Result<Self, PduError> {
        let timestamp = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            offset_quarters,
        };
        timestamp.validate()?;
        Ok(timestamp)
    }

    /// Decode the seven raw octets of a timestamp field
    pub fn from_octets(octets: [u8; 7]) -> Result<Self, PduError> {
        let zone = octets[6];
        let units = zone >> 4;
        if units > 9 {
            return Err(PduError::InvalidTimestamp {
                field: "time zone",
                value: zone,
            });
        }
        let quarters = ((zone & 0b0111) * 10 + units) as i8;
        let offset_quarters = if zone & Self::SIGN_BIT != 0 {
            -quarters
        } else {
            quarters
        };

        Self::new(
            decode_semi_octet(octets[0], "year")?,
            decode_semi_octet(octets[1], "month")?,
            decode_semi_octet(octets[2], "day")?,
            decode_semi_octet(octets[3], "hour")?,
            decode_semi_octet(octets[4], "minute")?,
            decode_semi_octet(octets[5], "second")?,
            offset_quarters,
        )
    }

    /// Encode back into the seven semi-octet swapped octets
    pub fn to_octets(&self) -> [u8; 7] {
        let swap = |value: u8| ((value % 10) << 4) | (value / 10);
        let quarters = self.offset_quarters.unsigned_abs();
        let mut zone = swap(quarters);
        if self.offset_quarters < 0 {
            zone |= Self::SIGN_BIT;
        }
        [
            swap(self.year),
            swap(self.month),
            swap(self.day),
            swap(self.hour),
            swap(self.minute),
            swap(self.second),
            zone,
        ]
    }

    /// Four-digit year, assuming the 2000s
    pub fn full_year(&self) -> u16 {
        2000 + self.year as u16
    }

    /// Offset from UTC in seconds
    pub fn utc_offset_seconds(&self) -> i32 {
        self.offset_quarters as i32 * 15 * 60
    }

    fn validate(&self) -> Result<(), PduError> {
        let checks: [(&'static str, u8, std::ops::RangeInclusive<u8>); 6] = [
            ("year", self.year, 0..=99),
            ("month", self.month, 1..=12),
            ("day", self.day, 1..=31),
            ("hour", self.hour, 0..=23),
            ("minute", self.minute, 0..=59),
            ("second", self.second, 0..=59),
        ];
        for (field, value, range) in checks {
            if !range.contains(&value) {
                return Err(PduError::InvalidTimestamp { field, value });
            }
        }
        if !(-79..=79).contains(&self.offset_quarters) {
            return Err(PduError::InvalidTimestamp {
                field: "time zone",
                value: self.offset_quarters.unsigned_abs(),
            });
        }
        Ok(())
    }
}

impl Decodable for ServiceCentreTimestamp {
    fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, PduError> {
        let bytes = decode_bytes(buf, Self::SIZE, "service centre timestamp")?;
        let mut octets = [0u8; 7];
        octets.copy_from_slice(&bytes);
        Self::from_octets(octets)
    }
}

impl fmt::Display for ServiceCentreTimestamp {
    /// Formats as `yy/MM/dd,hh:mm:ss±zz`, the layout used by `+CCLK`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.offset_quarters < 0 { '-' } else { '+' };
        write!(
            f,
            "{:02}/{:02}/{:02},{:02}:{:02}:{:02}{}{:02}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            sign,
            self.offset_quarters.unsigned_abs()
        )
    }
}
