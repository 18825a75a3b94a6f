//! Formatting helpers for sizes, ratios and durations.
//!
//! Pure functions with no shared state. Used by the extraction engine
//! (`drop_trailing_zeros`) and directly by hosts.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Round `x / y` to `decimals` places. `None` when `y` is zero.
pub fn divide(x: f64, y: f64, decimals: u32) -> Option<f64> {
    if y == 0.0 {
        return None;
    }
    Some(round_to(x / y, decimals))
}

/// `x * 100` with exactly `decimals` places and a `%` suffix:
/// `percent(0.5, 2) == "50.00%"`.
pub fn percent(x: f64, decimals: u32) -> String {
    format!("{:.*}%", decimals as usize, x * 100.0)
}

/// Strip trailing zero digits after a decimal point, and the point
/// itself when nothing else remains. Other text is returned untouched.
pub fn drop_trailing_zeros(text: &str) -> Cow<'_, str> {
    let Some((int, frac)) = text.split_once('.') else {
        return Cow::Borrowed(text);
    };
    let int_digits = int.strip_prefix('-').unwrap_or(int);
    if int_digits.is_empty()
        || !int_digits.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return Cow::Borrowed(text);
    }
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        Cow::Borrowed(int)
    } else {
        Cow::Borrowed(&text[..int.len() + 1 + frac.len()])
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

/// Size units, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    const ALL: [SizeUnit; 5] = [SizeUnit::B, SizeUnit::KB, SizeUnit::MB, SizeUnit::GB, SizeUnit::TB];

    pub fn as_str(self) -> &'static str {
        match self {
            SizeUnit::B => "B",
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
            SizeUnit::TB => "TB",
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeUnit::ALL
            .iter()
            .copied()
            .find(|u| u.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("unknown size unit: {}", s)))
    }
}

/// Human-readable size: `human_size(5982664375, None, 2, true) == "5.57 GB"`.
///
/// Divides by 1024 (`binary`) or 1000 until `unit` is reached, or, with
/// no explicit unit, until the value drops below the factor.
pub fn human_size(bytes: u64, unit: Option<SizeUnit>, decimals: u32, binary: bool) -> String {
    let factor = if binary { 1024.0 } else { 1000.0 };
    let mut value = bytes as f64;
    let mut current = SizeUnit::B;

    for next in &SizeUnit::ALL[1..] {
        let done = match unit {
            Some(target) => current >= target,
            None => value < factor,
        };
        if done {
            break;
        }
        value /= factor;
        current = *next;
    }

    format!("{:.*} {}", decimals as usize, value, current)
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Output style for [`format_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationStyle {
    /// `HH:MM:SS.mmm`
    #[default]
    Clock,
    /// `H h M m S s MMM ms`
    Hmsm,
    /// `H h M m S s`
    Hms,
    /// `H h M m`
    Hm,
}

impl FromStr for DurationStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(DurationStyle::Clock),
            "hmsm" => Ok(DurationStyle::Hmsm),
            "hms" => Ok(DurationStyle::Hms),
            "hm" => Ok(DurationStyle::Hm),
            other => Err(Error::InvalidInput(format!("unknown duration style: {}", other))),
        }
    }
}

/// Format a millisecond count: `format_duration(5025678, Clock) == "01:23:45.678"`.
pub fn format_duration(milliseconds: u64, style: DurationStyle) -> String {
    let millis = milliseconds % 1000;
    let total_secs = milliseconds / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    match style {
        DurationStyle::Clock => {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
        }
        DurationStyle::Hmsm => {
            format!("{} h {} m {} s {:03} ms", hours, minutes, seconds, millis)
        }
        DurationStyle::Hms => format!("{} h {} m {} s", hours, minutes, seconds),
        DurationStyle::Hm => format!("{} h {} m", hours, minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_trailing_zeros_cases() {
        assert_eq!(drop_trailing_zeros("12.4000"), "12.4");
        assert_eq!(drop_trailing_zeros("12.000"), "12");
        assert_eq!(drop_trailing_zeros("abc"), "abc");
        assert_eq!(drop_trailing_zeros("100"), "100");
        assert_eq!(drop_trailing_zeros("-0.50"), "-0.5");
        assert_eq!(drop_trailing_zeros("v1.0"), "v1.0");
        assert_eq!(drop_trailing_zeros("1.0 GB"), "1.0 GB");
    }

    #[test]
    fn format_duration_styles() {
        assert_eq!(format_duration(5_025_678, DurationStyle::Clock), "01:23:45.678");
        assert_eq!(format_duration(5_025_678, DurationStyle::Hms), "1 h 23 m 45 s");
        assert_eq!(format_duration(5_025_678, DurationStyle::Hmsm), "1 h 23 m 45 s 678 ms");
        assert_eq!(format_duration(5_025_678, DurationStyle::Hm), "1 h 23 m");
    }

    #[test]
    fn format_duration_spans_many_hours() {
        // 27 h 46 m 40 s
        assert_eq!(format_duration(100_000_000, DurationStyle::Clock), "27:46:40.000");
        assert_eq!(format_duration(0, DurationStyle::Clock), "00:00:00.000");
    }

    #[test]
    fn duration_style_parsing() {
        assert_eq!("".parse::<DurationStyle>().unwrap(), DurationStyle::Clock);
        assert_eq!("hms".parse::<DurationStyle>().unwrap(), DurationStyle::Hms);
        assert!("days".parse::<DurationStyle>().is_err());
    }

    #[test]
    fn human_size_binary_auto_unit() {
        assert_eq!(human_size(5_982_664_375, None, 2, true), "5.57 GB");
        assert_eq!(human_size(512, None, 2, true), "512.00 B");
        assert_eq!(human_size(1536, None, 2, true), "1.50 KB");
        assert_eq!(human_size(1_153_434, None, 2, true), "1.10 MB");
    }

    #[test]
    fn human_size_decimal_and_explicit_unit() {
        assert_eq!(human_size(5_982_664_375, None, 2, false), "5.98 GB");
        assert_eq!(human_size(5_982_664_375, Some(SizeUnit::MB), 1, true), "5705.5 MB");
        assert_eq!(human_size(2048, Some(SizeUnit::B), 0, true), "2048 B");
    }

    #[test]
    fn divide_and_percent() {
        assert_eq!(divide(10.0, 3.0, 3), Some(3.333));
        assert_eq!(divide(1.0, 0.0, 3), None);
        assert_eq!(percent(0.1234, 2), "12.34%");
        assert_eq!(percent(0.5, 2), "50.00%");
        assert_eq!(percent(0.5, 0), "50%");
    }
}
