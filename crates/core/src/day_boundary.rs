//! "Has this happened today?" in the facility's reference timezone.
//!
//! Today is a civil date in the facility's zone, never the zone of the device making the call.
//! Instants are converted to a `(year, month, day)` triple in that zone and compared exactly;
//! there is no UTC-day arithmetic, so offsets that are not whole days from UTC and daylight
//! saving transitions are handled by the timezone database.

use crate::error::{WorklistError, WorklistResult};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// The fixed timezone "today" is evaluated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceZone {
    /// A constant UTC offset such as `+07:00`.
    Fixed(FixedOffset),
    /// An IANA zone such as `Asia/Ho_Chi_Minh` or `Europe/London`, DST rules included.
    Named(Tz),
}

impl ReferenceZone {
    pub fn utc() -> Self {
        ReferenceZone::Fixed(Utc.fix())
    }

    /// Civil date of `instant` in this zone.
    pub fn civil_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            ReferenceZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
            ReferenceZone::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    /// First instant of the civil date `date` in this zone.
    ///
    /// When local midnight falls inside a DST gap, the first valid local time after it is used.
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        match self {
            ReferenceZone::Fixed(offset) => first_valid_local(offset, midnight),
            ReferenceZone::Named(tz) => first_valid_local(tz, midnight),
        }
    }

    /// Last millisecond of the civil day containing `now` (23:59:59.999 local).
    ///
    /// Computed as one millisecond before the next local midnight so short and long DST days
    /// are both covered. Falls back to `now` only if the calendar runs out.
    pub fn end_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.civil_date(now)
            .succ_opt()
            .and_then(|tomorrow| self.start_of_day(tomorrow))
            .map(|next_midnight| next_midnight - Duration::milliseconds(1))
            .unwrap_or(now)
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        ReferenceZone::Named(Tz::Asia__Ho_Chi_Minh)
    }
}

impl fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceZone::Fixed(offset) => write!(f, "{offset}"),
            ReferenceZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

impl FromStr for ReferenceZone {
    type Err = WorklistError;

    /// Accepts `UTC`, `Z`, a signed offset (`+07:00`, `-0330`, `+07`) or an IANA zone name.
    fn from_str(input: &str) -> WorklistResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(WorklistError::UnknownTimezone("empty timezone".into()));
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Ok(ReferenceZone::utc());
        }
        if trimmed.starts_with('+') || trimmed.starts_with('-') {
            return parse_offset(trimmed)
                .map(ReferenceZone::Fixed)
                .ok_or_else(|| WorklistError::UnknownTimezone(trimmed.to_string()));
        }

        trimmed
            .parse::<Tz>()
            .map(ReferenceZone::Named)
            .map_err(|_| WorklistError::UnknownTimezone(trimmed.to_string()))
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, digits) = raw.split_at(1);
    let sign = if sign == "-" { -1 } else { 1 };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn first_valid_local<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    // Real-world gaps are at most a couple of hours; step through them in 15-minute slices.
    (0..=16)
        .map(|step| local + Duration::minutes(15 * step))
        .find_map(|candidate| zone.from_local_datetime(&candidate).earliest())
        .map(|resolved| resolved.with_timezone(&Utc))
}

/// Whether `candidate` falls on the same civil day as `reference` in `zone`.
///
/// An absent candidate is never "today".
pub fn same_local_day(
    reference: DateTime<Utc>,
    candidate: Option<DateTime<Utc>>,
    zone: &ReferenceZone,
) -> bool {
    candidate.is_some_and(|candidate| zone.civil_date(reference) == zone.civil_date(candidate))
}

/// [`same_local_day`] for a raw RFC 3339 candidate. Malformed input is "not today", never an
/// error.
pub fn same_local_day_str(
    reference: DateTime<Utc>,
    candidate: Option<&str>,
    zone: &ReferenceZone,
) -> bool {
    let parsed = candidate
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|parsed| parsed.with_timezone(&Utc));
    same_local_day(reference, parsed, zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn zone(name: &str) -> ReferenceZone {
        name.parse().unwrap()
    }

    #[test]
    fn an_instant_is_on_its_own_day() {
        for name in ["+07:00", "UTC", "Asia/Ho_Chi_Minh", "Europe/London", "-09:30"] {
            let t = at("2024-06-15T12:34:56Z");
            assert!(same_local_day(t, Some(t), &zone(name)), "{name}");
        }
    }

    #[test]
    fn two_seconds_across_local_midnight_are_different_days() {
        let reference = at("2024-01-01T23:59:59+07:00");
        let candidate = at("2024-01-02T00:00:01+07:00");
        assert!(!same_local_day(reference, Some(candidate), &zone("+07:00")));
    }

    #[test]
    fn local_midnight_belongs_to_the_new_day() {
        let tz = zone("+07:00");
        let midnight = at("2024-01-02T00:00:00+07:00");
        assert!(same_local_day(midnight, Some(at("2024-01-02T23:59:59.999+07:00")), &tz));
        assert!(!same_local_day(midnight, Some(at("2024-01-01T23:59:59.999+07:00")), &tz));
    }

    #[test]
    fn plus_and_minus_a_day_are_not_today() {
        let tz = zone("Asia/Ho_Chi_Minh");
        let reference = at("2024-03-10T08:00:00+07:00");
        assert!(!same_local_day(reference, Some(reference + Duration::hours(24)), &tz));
        assert!(!same_local_day(reference, Some(reference - Duration::hours(24)), &tz));
    }

    #[test]
    fn uses_local_date_not_utc_date() {
        // 2023-12-31T18:00Z and 2024-01-01T16:00Z are different UTC days but both fall on
        // 2024-01-01 in +07:00.
        let tz = zone("+07:00");
        let early = at("2024-01-01T01:00:00+07:00");
        let late = at("2024-01-01T23:00:00+07:00");
        assert!(same_local_day(early, Some(late), &tz));
        assert!(!same_local_day(early, Some(late), &ReferenceZone::utc()));
    }

    #[test]
    fn absent_or_garbled_candidate_is_not_today() {
        let tz = zone("+07:00");
        let reference = at("2024-01-01T10:00:00+07:00");
        assert!(!same_local_day(reference, None, &tz));
        assert!(!same_local_day_str(reference, None, &tz));
        assert!(!same_local_day_str(reference, Some(""), &tz));
        assert!(!same_local_day_str(reference, Some("01/01/2024"), &tz));
        assert!(same_local_day_str(
            reference,
            Some(" 2024-01-01T02:00:00Z "),
            &tz
        ));
    }

    #[test]
    fn end_of_day_is_last_local_millisecond() {
        let tz = zone("+07:00");
        let now = at("2024-01-01T09:00:00+07:00");
        assert_eq!(tz.end_of_day(now), at("2024-01-01T23:59:59.999+07:00"));

        let just_before_midnight = at("2024-01-01T23:59:59.999+07:00");
        assert_eq!(tz.end_of_day(just_before_midnight), just_before_midnight);
    }

    #[test]
    fn end_of_day_on_dst_transition_days() {
        let london = zone("Europe/London");
        // Clocks go forward at 01:00 UTC on 2024-03-31; the next midnight is in BST.
        let spring = at("2024-03-31T12:00:00Z");
        assert_eq!(london.end_of_day(spring), at("2024-03-31T22:59:59.999Z"));
        // Clocks go back at 01:00 UTC on 2024-10-27; the next midnight is in GMT.
        let autumn = at("2024-10-27T12:00:00Z");
        assert_eq!(london.end_of_day(autumn), at("2024-10-27T23:59:59.999Z"));
        assert!(same_local_day(
            at("2024-10-26T23:30:00Z"),
            Some(at("2024-10-27T00:30:00Z")),
            &london
        ));
    }

    #[test]
    fn start_of_day_skips_a_midnight_gap() {
        // Cuba springs forward from 00:00 to 01:00 local on 2024-03-10.
        let havana = zone("America/Havana");
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(havana.start_of_day(date), Some(at("2024-03-10T05:00:00Z")));
        assert_eq!(
            havana.end_of_day(at("2024-03-09T18:00:00Z")),
            at("2024-03-10T04:59:59.999Z")
        );
    }

    #[test]
    fn parses_zone_strings() {
        assert_eq!(zone("+07:00").to_string(), "+07:00");
        assert_eq!(zone("+0700"), zone("+07"));
        assert_eq!(zone("utc"), ReferenceZone::utc());
        assert_eq!(zone(" Asia/Ho_Chi_Minh ").to_string(), "Asia/Ho_Chi_Minh");
        assert_eq!(ReferenceZone::default(), zone("Asia/Ho_Chi_Minh"));

        for bad in ["", "+25:00", "+7:0:0", "Mars/Olympus", "+ab:cd"] {
            assert!(bad.parse::<ReferenceZone>().is_err(), "{bad:?}");
        }
    }
}
