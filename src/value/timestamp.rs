//! Timestamp codec.
//!
//! Decoding tries a fixed list of layouts in order: RFC 3339 first (what
//! [`encode`](crate::Value::encode) writes), then PostgreSQL's own output
//! forms with and without zone, then bare times and dates.

use bytes::BytesMut;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};

use super::{mismatch, Codec};
use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;
use crate::source::{Native, Source};

/// Date given to time-only input.
const TIME_ONLY_DATE: &str = "0000-01-01 ";

#[derive(Debug, Clone, Copy)]
enum Layout {
    Rfc3339,
    Zoned(&'static str),
    Naive(&'static str),
    /// Time of day, dated [`TIME_ONLY_DATE`].
    ZonedTime(&'static str),
    NaiveTime(&'static str),
    Date(&'static str),
}

const LAYOUTS: [Layout; 7] = [
    Layout::Rfc3339,
    Layout::Zoned("%Y-%m-%d %H:%M:%S%.f%#z"),
    Layout::Naive("%Y-%m-%d %H:%M:%S%.f"),
    Layout::Naive("%Y-%m-%d %H:%M"),
    Layout::ZonedTime("%Y-%m-%d %H:%M:%S%.f%#z"),
    Layout::NaiveTime("%H:%M:%S%.f"),
    Layout::Date("%Y-%m-%d"),
];

impl Layout {
    fn parse(self, text: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(text).ok(),
            Layout::Zoned(fmt) => DateTime::parse_from_str(text, fmt).ok(),
            Layout::Naive(fmt) => NaiveDateTime::parse_from_str(text, fmt)
                .ok()
                .map(|t| t.and_utc().fixed_offset()),
            Layout::ZonedTime(fmt) => {
                DateTime::parse_from_str(&format!("{TIME_ONLY_DATE}{text}"), fmt).ok()
            }
            Layout::NaiveTime(fmt) => {
                let time = NaiveTime::parse_from_str(text, fmt).ok()?;
                let date = NaiveDate::from_ymd_opt(0, 1, 1)?;
                Some(date.and_time(time).and_utc().fixed_offset())
            }
            Layout::Date(fmt) => NaiveDate::parse_from_str(text, fmt)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN).and_utc().fixed_offset()),
        }
    }
}

/// Parse timestamp text against the known layouts.
///
/// A single trailing fractional digit (`12:00:00.5`) gets a `0` appended
/// before matching.
///
/// # Example
/// ```
/// use pgvalue::value::parse_timestamp;
///
/// let t = parse_timestamp("2024-01-02 03:04:05.5+02").unwrap();
/// assert_eq!(t.to_rfc3339(), "2024-01-02T03:04:05.500+02:00");
/// ```
pub fn parse_timestamp(input: &str) -> ValueResult<DateTime<FixedOffset>> {
    let mut text = input.trim().to_string();
    if text.len() >= 2 && text.as_bytes()[text.len() - 2] == b'.' {
        text.push('0');
    }
    LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(&text))
        .ok_or_else(|| ValueError::parse(input, "timestamp"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampValue {
    value: Option<DateTime<FixedOffset>>,
}

impl TimestampValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<DateTime<FixedOffset>> {
        self.value
    }
}

impl Codec for TimestampValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.value = match src {
            Source::Null => None,
            Source::Timestamp(t) => Some(t),
            Source::Str(s) => Some(parse_timestamp(&s)?),
            Source::Bytes(b) => {
                let text = std::str::from_utf8(&b).map_err(|_| ValueError::parse(&b, "timestamp"))?;
                Some(parse_timestamp(text)?)
            }
            other => return Err(mismatch(&Kind::Timestamp, &other)),
        };
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        if let Some(t) = self.value {
            buf.extend_from_slice(t.to_rfc3339_opts(SecondsFormat::AutoSi, true).as_bytes());
        }
    }

    fn is_null(&self) -> bool {
        self.value.is_none()
    }

    fn kind(&self) -> Kind {
        Kind::Timestamp
    }

    fn to_native(&self) -> Native {
        self.value.map_or(Native::Null, Native::Timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike, Utc};

    fn utc(s: &str) -> String {
        parse_timestamp(s).unwrap().with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    #[test]
    fn test_postgres_output_forms() {
        assert_eq!(utc("2024-01-02 03:04:05+00"), "2024-01-02T03:04:05Z");
        assert_eq!(utc("2024-01-02 03:04:05.123456+05:30"), "2024-01-01T21:34:05.123456Z");
        assert_eq!(utc("2024-01-02 03:04:05"), "2024-01-02T03:04:05Z");
        assert_eq!(utc("2024-01-02 03:04"), "2024-01-02T03:04:00Z");
        assert_eq!(utc("2024-01-02"), "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(utc("2024-01-02T03:04:05Z"), "2024-01-02T03:04:05Z");
        assert_eq!(utc("2024-01-02T03:04:05.250-01:00"), "2024-01-02T04:04:05.250Z");
    }

    #[test]
    fn test_single_fraction_digit() {
        let t = parse_timestamp("2024-01-02 03:04:05.5").unwrap();
        assert_eq!(t.nanosecond(), 500_000_000);
    }

    #[test]
    fn test_time_only() {
        let t = parse_timestamp("13:14:15").unwrap();
        assert_eq!((t.year(), t.hour(), t.minute(), t.second()), (0, 13, 14, 15));
        let t = parse_timestamp("13:14:15+02").unwrap();
        assert_eq!(t.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_garbage() {
        assert!(matches!(parse_timestamp("yesterday"), Err(ValueError::Parse { .. })));
        assert!(matches!(
            Kind::Timestamp.construct(5),
            Err(ValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_decode() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let v = Kind::Timestamp.construct(t).unwrap();
        assert_eq!(&v.encode()[..], b"2024-03-01T12:00:00Z");
        let again = Kind::Timestamp.construct(&v.encode()[..]).unwrap();
        assert_eq!(again, v);
    }
}
