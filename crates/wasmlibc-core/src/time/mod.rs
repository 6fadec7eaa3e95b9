//! Calendar conversion for `localtime`.
//!
//! The target has no timezone database. Local time is UTC shifted by one
//! offset, either configured or sampled from the host for the instant being
//! converted. Conversion is closed-form (days-from-civil), so any `time_t` is
//! handled in constant time.

/// Broken-down time representation (like `struct tm`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokenDownTime {
    /// Seconds (0-59).
    pub tm_sec: i32,
    /// Minutes (0-59).
    pub tm_min: i32,
    /// Hours (0-23).
    pub tm_hour: i32,
    /// Day of month (1-31).
    pub tm_mday: i32,
    /// Month (0-11).
    pub tm_mon: i32,
    /// Years since 1900.
    pub tm_year: i32,
    /// Day of week (0-6, Sunday = 0).
    pub tm_wday: i32,
    /// Day of year (0-365).
    pub tm_yday: i32,
    /// Daylight saving time flag. Always 0 under a fixed offset.
    pub tm_isdst: i32,
    /// Seconds east of UTC.
    pub tm_gmtoff: i64,
}

/// Largest offset accepted, in seconds (UTC+18:00 / UTC-18:00).
pub const MAX_OFFSET_SECS: i32 = 18 * 3600;

const SECS_PER_DAY: i64 = 86_400;

/// Returns `true` if `year` is a leap year (Gregorian).
#[inline]
#[must_use]
pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days before the first of each month in a non-leap year.
const CUMULATIVE_DAYS: [i32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Civil date (year, month 1-12, day 1-31) for a day count relative to 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Convert seconds since the Unix epoch to broken-down UTC time.
///
/// Returns `None` when the year does not fit `tm_year` (an `int` counting from
/// 1900), which is the C `EOVERFLOW` case.
#[must_use]
pub fn epoch_to_broken_down(epoch_secs: i64) -> Option<BrokenDownTime> {
    let days = epoch_secs.div_euclid(SECS_PER_DAY);
    let rem = epoch_secs.rem_euclid(SECS_PER_DAY);

    let (year, month, mday) = civil_from_days(days);
    let tm_year = i32::try_from(year.checked_sub(1900)?).ok()?;

    let mon = month as usize - 1;
    let leap_shift = i32::from(mon >= 2 && is_leap_year(year));

    Some(BrokenDownTime {
        tm_sec: (rem % 60) as i32,
        tm_min: ((rem / 60) % 60) as i32,
        tm_hour: (rem / 3600) as i32,
        tm_mday: mday as i32,
        tm_mon: mon as i32,
        tm_year,
        // 1970-01-01 was a Thursday.
        tm_wday: (days + 4).rem_euclid(7) as i32,
        tm_yday: CUMULATIVE_DAYS[mon] + leap_shift + mday as i32 - 1,
        tm_isdst: 0,
        tm_gmtoff: 0,
    })
}

/// Broken-down local time under a fixed UTC offset (seconds east of UTC).
///
/// The offset is clamped to [`MAX_OFFSET_SECS`]. `tm_isdst` is always 0.
#[must_use]
pub fn localtime_fixed(epoch_secs: i64, offset_secs: i32) -> Option<BrokenDownTime> {
    let offset = offset_secs.clamp(-MAX_OFFSET_SECS, MAX_OFFSET_SECS);
    let shifted = epoch_secs.checked_add(i64::from(offset))?;
    let mut tm = epoch_to_broken_down(shifted)?;
    tm.tm_gmtoff = i64::from(offset);
    Some(tm)
}

/// Local time under a host-reported zone: `offset_secs` in effect at
/// `epoch_secs`, with `isdst` as the host classified it.
#[must_use]
pub fn localtime_zoned(epoch_secs: i64, offset_secs: i32, isdst: bool) -> Option<BrokenDownTime> {
    let mut tm = localtime_fixed(epoch_secs, offset_secs)?;
    tm.tm_isdst = i32::from(isdst);
    Some(tm)
}

/// Daylight saving is in effect when the zone's January and July offsets
/// differ and the current offset is the larger (further east) of the two.
/// All offsets are seconds east of UTC, so this holds in both hemispheres.
#[must_use]
pub fn dst_in_effect(current: i32, january: i32, july: i32) -> bool {
    january != july && current == january.max(july)
}

/// NUL-terminated zone abbreviation for a fixed offset.
///
/// `"UTC"` for zero, otherwise `"+HHMM"` / `"-HHMM"` (POSIX `%z` form).
#[must_use]
pub fn zone_name(offset_secs: i32) -> [u8; 8] {
    let mut out = [0u8; 8];
    if offset_secs == 0 {
        out[..3].copy_from_slice(b"UTC");
        return out;
    }
    let offset = offset_secs.clamp(-MAX_OFFSET_SECS, MAX_OFFSET_SECS);
    let abs = offset.unsigned_abs();
    let (hours, minutes) = (abs / 3600, (abs / 60) % 60);
    out[0] = if offset < 0 { b'-' } else { b'+' };
    for (slot, digit) in out[1..5]
        .iter_mut()
        .zip([hours / 10, hours % 10, minutes / 10, minutes % 10])
    {
        *slot = b'0' + digit as u8;
    }
    out
}

/// Parse an offset given as seconds (`"-18000"`) or `±HH:MM` / `±HHMM`.
#[must_use]
pub fn parse_offset(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if !raw.is_ascii() {
        return None;
    }
    if raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
        return Some(0);
    }
    let (sign, body) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => (1, raw),
    };
    let secs = if let Some((h, m)) = body.split_once(':') {
        hm_to_secs(h, m)?
    } else if body.len() == 4 && (raw.starts_with('+') || raw.starts_with('-')) {
        let (h, m) = body.split_at_checked(2)?;
        hm_to_secs(h, m)?
    } else {
        body.parse::<i32>().ok()?
    };
    let secs = secs.checked_mul(sign)?;
    (secs.unsigned_abs() <= MAX_OFFSET_SECS.unsigned_abs()).then_some(secs)
}

fn hm_to_secs(h: &str, m: &str) -> Option<i32> {
    let hours: i32 = h.parse().ok()?;
    let minutes: i32 = m.parse().ok()?;
    if !(0..60).contains(&minutes) || hours < 0 {
        return None;
    }
    hours.checked_mul(3600)?.checked_add(minutes * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(epoch: i64) -> BrokenDownTime {
        epoch_to_broken_down(epoch).expect("representable year")
    }

    #[test]
    fn epoch_zero() {
        let t = utc(0);
        assert_eq!(t.tm_year, 70);
        assert_eq!(t.tm_mon, 0);
        assert_eq!(t.tm_mday, 1);
        assert_eq!(t.tm_hour, 0);
        assert_eq!(t.tm_min, 0);
        assert_eq!(t.tm_sec, 0);
        assert_eq!(t.tm_wday, 4); // Thursday
        assert_eq!(t.tm_yday, 0);
    }

    #[test]
    fn known_timestamp() {
        // 2024-01-01 00:00:00 UTC
        let t = utc(1_704_067_200);
        assert_eq!(t.tm_year, 124);
        assert_eq!(t.tm_mon, 0);
        assert_eq!(t.tm_mday, 1);
        assert_eq!(t.tm_wday, 1); // Monday
        assert_eq!(t.tm_yday, 0);
    }

    #[test]
    fn december_2024() {
        // 2024-12-12 04:12:12 UTC
        let t = utc(1_733_976_732);
        assert_eq!(t.tm_year, 124);
        assert_eq!(t.tm_mon, 11);
        assert_eq!(t.tm_mday, 12);
        assert_eq!((t.tm_hour, t.tm_min, t.tm_sec), (4, 12, 12));
        assert_eq!(t.tm_wday, 4);
        assert_eq!(t.tm_yday, 346);
    }

    #[test]
    fn leap_year_feb29() {
        // 2024-02-29 12:00:00 UTC
        let t = utc(1_709_208_000);
        assert_eq!(t.tm_year, 124);
        assert_eq!(t.tm_mon, 1);
        assert_eq!(t.tm_mday, 29);
        assert_eq!(t.tm_hour, 12);
        assert_eq!(t.tm_yday, 59);
    }

    #[test]
    fn negative_epoch() {
        // 1969-12-31 23:59:59 UTC
        let t = utc(-1);
        assert_eq!(t.tm_year, 69);
        assert_eq!(t.tm_mon, 11);
        assert_eq!(t.tm_mday, 31);
        assert_eq!((t.tm_hour, t.tm_min, t.tm_sec), (23, 59, 59));
        assert_eq!(t.tm_wday, 3); // Wednesday
        assert_eq!(t.tm_yday, 364);
    }

    #[test]
    fn year_2000_boundary() {
        let t = utc(946_684_800);
        assert_eq!(t.tm_year, 100);
        assert_eq!(t.tm_mon, 0);
        assert_eq!(t.tm_mday, 1);
        assert_eq!(t.tm_wday, 6); // Saturday
    }

    #[test]
    fn end_of_year() {
        // 2023-12-31 23:59:59 UTC
        let t = utc(1_704_067_199);
        assert_eq!(t.tm_year, 123);
        assert_eq!(t.tm_mon, 11);
        assert_eq!(t.tm_mday, 31);
        assert_eq!(t.tm_yday, 364);
    }

    #[test]
    fn leap_year_end_is_day_365() {
        // 2024-12-31 00:00:00 UTC
        assert_eq!(utc(1_735_603_200).tm_yday, 365);
    }

    #[test]
    fn is_leap_year_check() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(2400));
    }

    #[test]
    fn unrepresentable_years_overflow() {
        assert!(epoch_to_broken_down(i64::MAX).is_none());
        assert!(epoch_to_broken_down(i64::MIN).is_none());
        // Year 2^31 - 1 + 1900 is still out of range for tm_year.
        assert!(epoch_to_broken_down(67_768_036_191_676_800).is_none());
    }

    #[test]
    fn fixed_offset_shifts_fields() {
        let t = localtime_fixed(0, -5 * 3600).expect("in range");
        assert_eq!(t.tm_year, 69);
        assert_eq!(t.tm_mday, 31);
        assert_eq!(t.tm_hour, 19);
        assert_eq!(t.tm_gmtoff, -18_000);
        assert_eq!(t.tm_isdst, 0);

        let t = localtime_fixed(0, 5 * 3600 + 1800).expect("in range");
        assert_eq!((t.tm_hour, t.tm_min), (5, 30));
    }

    #[test]
    fn offset_is_clamped() {
        let t = localtime_fixed(0, 100 * 3600).expect("in range");
        assert_eq!(t.tm_gmtoff, i64::from(MAX_OFFSET_SECS));
    }

    #[test]
    fn zone_names() {
        assert_eq!(&zone_name(0)[..4], b"UTC\0");
        assert_eq!(&zone_name(19_800)[..6], b"+0530\0");
        assert_eq!(&zone_name(-3600)[..6], b"-0100\0");
    }

    #[test]
    fn offset_parsing() {
        assert_eq!(parse_offset("0"), Some(0));
        assert_eq!(parse_offset("UTC"), Some(0));
        assert_eq!(parse_offset("-18000"), Some(-18_000));
        assert_eq!(parse_offset("+05:30"), Some(19_800));
        assert_eq!(parse_offset("-0100"), Some(-3600));
        assert_eq!(parse_offset("+19:00"), None);
        assert_eq!(parse_offset("05:75"), None);
        assert_eq!(parse_offset("soon"), None);
    }

    #[test]
    fn malformed_offsets_are_rejected() {
        assert_eq!(parse_offset("+a\u{20ac}"), None);
        assert_eq!(parse_offset("-\u{e9}\u{e9}"), None);
        assert_eq!(parse_offset("+1193047:00"), None);
        assert_eq!(parse_offset("+2147483647:59"), None);
        assert_eq!(parse_offset("--2147483648"), None);
        assert_eq!(parse_offset("-2147483648"), None);
    }

    #[test]
    fn dst_rule_both_hemispheres() {
        // Europe/Berlin: +1 h in January, +2 h in July.
        assert!(dst_in_effect(7200, 3600, 7200));
        assert!(!dst_in_effect(3600, 3600, 7200));
        // Australia/Sydney: +11 h in January (summer), +10 h in July.
        assert!(dst_in_effect(39_600, 39_600, 36_000));
        assert!(!dst_in_effect(36_000, 39_600, 36_000));
        // No DST at all.
        assert!(!dst_in_effect(19_800, 19_800, 19_800));
    }

    #[test]
    fn zoned_localtime_carries_host_flags() {
        let t = localtime_zoned(1_700_000_000, -18_000, false).expect("in range");
        assert_eq!((t.tm_mday, t.tm_hour), (14, 17));
        assert_eq!((t.tm_gmtoff, t.tm_isdst), (-18_000, 0));

        let t = localtime_zoned(1_690_000_000, 7200, true).expect("in range");
        assert_eq!(t.tm_isdst, 1);
        assert_eq!(t.tm_gmtoff, 7200);
    }
}
