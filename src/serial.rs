//! Time-derived certificate serial numbers.

use std::fmt;

use time::OffsetDateTime;

/// An 8-byte big-endian serial number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Serial([u8; 8]);

impl Serial {
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes())
    }

    pub fn value(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Seconds since the Unix epoch at `now`.
///
/// Serials must be positive, so instants at or before the epoch map to 1.
pub fn time_serial(now: OffsetDateTime) -> Serial {
    let seconds = u64::try_from(now.unix_timestamp()).unwrap_or(0);
    Serial::from_u64(seconds.max(1))
}

pub trait SerialNumberGenerator {
    fn next(&mut self, now: OffsetDateTime) -> Serial;
}

/// Issues [`time_serial`] values, bumped past the previous one when two
/// certificates are issued within the same second (or the clock goes back),
/// so serials from one generator never repeat.
#[derive(Debug, Clone, Default)]
pub struct TimeSerialGenerator {
    last: Option<u64>,
}

impl TimeSerialGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SerialNumberGenerator for TimeSerialGenerator {
    fn next(&mut self, now: OffsetDateTime) -> Serial {
        let candidate = time_serial(now).value();
        let value = match self.last {
            Some(last) if candidate <= last => last.saturating_add(1),
            _ => candidate,
        };
        self.last = Some(value);
        Serial::from_u64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn serial_is_big_endian_unix_seconds() {
        let serial = time_serial(datetime!(2024-01-01 0:00 UTC));
        assert_eq!(serial.value(), 1_704_067_200);
        assert_eq!(serial.as_bytes(), &[0, 0, 0, 0, 0x65, 0x92, 0x00, 0x80]);
        assert_eq!(serial.to_string(), "0000000065920080");
    }

    #[test]
    fn instants_up_to_the_epoch_get_serial_one() {
        assert_eq!(time_serial(datetime!(1969-07-20 20:17 UTC)).value(), 1);
        assert_eq!(time_serial(datetime!(1970-01-01 0:00 UTC)).value(), 1);
        assert_eq!(time_serial(datetime!(1970-01-01 0:00:02 UTC)).value(), 2);

        let mut serials = TimeSerialGenerator::new();
        let first = serials.next(datetime!(1960-01-01 0:00 UTC));
        let second = serials.next(datetime!(1960-01-01 0:00 UTC));
        assert_eq!((first.value(), second.value()), (1, 2));
    }

    #[test]
    fn same_second_does_not_collide() {
        let now = datetime!(2024-01-01 0:00 UTC);
        let mut serials = TimeSerialGenerator::new();
        let first = serials.next(now);
        let second = serials.next(now);
        let third = serials.next(now - time::Duration::seconds(30));
        assert_eq!(first.value() + 1, second.value());
        assert_eq!(second.value() + 1, third.value());
    }

    #[test]
    fn later_seconds_follow_the_clock() {
        let now = datetime!(2024-01-01 0:00 UTC);
        let mut serials = TimeSerialGenerator::new();
        serials.next(now);
        let later = serials.next(now + time::Duration::seconds(10));
        assert_eq!(later, time_serial(now + time::Duration::seconds(10)));
    }
}
