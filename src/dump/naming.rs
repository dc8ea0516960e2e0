//! Dump file naming.
//!
//! A format string is either a literal file stem or a time layout written
//! against the reference moment `Mon Jan 2 15:04:05 MST 2006`. The decision is
//! a heuristic: the digit runs of the format, concatenated, must contain
//! [`REFERENCE_DIGITS`]. A literal name that happens to contain those digits
//! is rendered as a layout as well.

use chrono::{DateTime, Datelike, Local, Offset, TimeZone, Timelike};
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

/// Year, month, day, hour, minute and second of the reference moment.
pub static REFERENCE_DIGITS: &str = "20060102150405";

static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit run regex"));

pub fn is_time_format<S: AsRef<str>>(format: S) -> bool {
    DIGIT_RUNS
        .find_iter(format.as_ref())
        .map(|m| m.as_str())
        .collect::<String>()
        .contains(REFERENCE_DIGITS)
}

/// Renders `format` against `now` if it is a time layout, otherwise returns it verbatim.
pub fn resolve_name<Tz>(format: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if is_time_format(format) {
        format_layout(format, now)
    } else {
        format.to_string()
    }
}

pub fn resolve_name_now(format: &str) -> String {
    resolve_name(format, &Local::now())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutToken {
    LongMonth,
    Month,
    NumMonth,
    ZeroMonth,
    LongWeekDay,
    WeekDay,
    Day,
    UnderDay,
    ZeroDay,
    ZeroYearDay,
    UnderYearDay,
    Hour,
    Hour12,
    ZeroHour12,
    Minute,
    ZeroMinute,
    Second,
    ZeroSecond,
    LongYear,
    Year,
    UpperPm,
    LowerPm,
    ZoneName,
    /// `Z07:00` family, prints `Z` at UTC.
    IsoZone(ZoneStyle),
    /// `-07:00` family.
    NumZone(ZoneStyle),
    Fraction { sep: char, digits: usize, trim: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ZoneStyle {
    colon: bool,
    minutes: bool,
    seconds: bool,
}

impl ZoneStyle {
    const HOURS: Self = Self::new(false, false, false);
    const HHMM: Self = Self::new(false, true, false);
    const HH_MM: Self = Self::new(true, true, false);
    const HHMMSS: Self = Self::new(false, true, true);
    const HH_MM_SS: Self = Self::new(true, true, true);

    const fn new(colon: bool, minutes: bool, seconds: bool) -> Self {
        Self {
            colon,
            minutes,
            seconds,
        }
    }
}

/// `Jan` and `Mon` stay literal when a lowercase letter follows, as in `Janet`.
fn lower_after(s: &str, len: usize) -> bool {
    s.as_bytes().get(len).is_some_and(u8::is_ascii_lowercase)
}

/// Finds the layout token at the start of `s` and its byte length.
fn token_at(s: &str) -> Option<(LayoutToken, usize)> {
    use LayoutToken::*;

    let b = s.as_bytes();
    let starts = |p: &str| s.starts_with(p);
    let token = match *b.first()? {
        b'J' if starts("January") => (LongMonth, 7),
        b'J' if starts("Jan") && !lower_after(s, 3) => (Month, 3),
        b'M' if starts("Monday") => (LongWeekDay, 6),
        b'M' if starts("Mon") && !lower_after(s, 3) => (WeekDay, 3),
        b'M' if starts("MST") => (ZoneName, 3),
        b'0' => match b.get(1) {
            Some(b'1') => (ZeroMonth, 2),
            Some(b'2') => (ZeroDay, 2),
            Some(b'3') => (ZeroHour12, 2),
            Some(b'4') => (ZeroMinute, 2),
            Some(b'5') => (ZeroSecond, 2),
            Some(b'6') => (Year, 2),
            Some(b'0') if b.get(2) == Some(&b'2') => (ZeroYearDay, 3),
            _ => return None,
        },
        b'1' if starts("15") => (Hour, 2),
        b'1' => (NumMonth, 1),
        b'2' if starts("2006") => (LongYear, 4),
        b'2' => (Day, 1),
        b'_' if starts("_2") && !starts("_2006") => (UnderDay, 2),
        b'_' if starts("__2") => (UnderYearDay, 3),
        b'3' => (Hour12, 1),
        b'4' => (Minute, 1),
        b'5' => (Second, 1),
        b'P' if starts("PM") => (UpperPm, 2),
        b'p' if starts("pm") => (LowerPm, 2),
        b'-' if starts("-070000") => (NumZone(ZoneStyle::HHMMSS), 7),
        b'-' if starts("-07:00:00") => (NumZone(ZoneStyle::HH_MM_SS), 9),
        b'-' if starts("-0700") => (NumZone(ZoneStyle::HHMM), 5),
        b'-' if starts("-07:00") => (NumZone(ZoneStyle::HH_MM), 6),
        b'-' if starts("-07") => (NumZone(ZoneStyle::HOURS), 3),
        b'Z' if starts("Z070000") => (IsoZone(ZoneStyle::HHMMSS), 7),
        b'Z' if starts("Z07:00:00") => (IsoZone(ZoneStyle::HH_MM_SS), 9),
        b'Z' if starts("Z0700") => (IsoZone(ZoneStyle::HHMM), 5),
        b'Z' if starts("Z07:00") => (IsoZone(ZoneStyle::HH_MM), 6),
        b'Z' if starts("Z07") => (IsoZone(ZoneStyle::HOURS), 3),
        sep @ (b'.' | b',') => {
            let fill = *b.get(1).filter(|c| **c == b'0' || **c == b'9')?;
            let digits = b[1..].iter().take_while(|c| **c == fill).count();
            if b.get(1 + digits).is_some_and(u8::is_ascii_digit) {
                return None;
            }
            let token = Fraction {
                sep: sep as char,
                digits,
                trim: fill == b'9',
            };
            (token, 1 + digits)
        }
        _ => return None,
    };
    Some(token)
}

fn push_offset(out: &mut String, offset_secs: i32, style: ZoneStyle) {
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let abs = offset_secs.unsigned_abs();
    out.push(sign);
    out.push_str(&format!("{:02}", abs / 3600));
    let mut push_part = |value: u32| {
        if style.colon {
            out.push(':');
        }
        out.push_str(&format!("{:02}", value));
    };
    if style.minutes {
        push_part(abs / 60 % 60);
    }
    if style.seconds {
        push_part(abs % 60);
    }
}

impl LayoutToken {
    fn render<Tz>(self, now: &DateTime<Tz>, out: &mut String)
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        use LayoutToken::*;

        let (is_pm, hour12) = now.hour12();
        let offset_secs = now.offset().fix().local_minus_utc();
        let rendered = match self {
            LongMonth => now.format("%B").to_string(),
            Month => now.format("%b").to_string(),
            NumMonth => now.month().to_string(),
            ZeroMonth => format!("{:02}", now.month()),
            LongWeekDay => now.format("%A").to_string(),
            WeekDay => now.format("%a").to_string(),
            Day => now.day().to_string(),
            UnderDay => format!("{:>2}", now.day()),
            ZeroDay => format!("{:02}", now.day()),
            ZeroYearDay => format!("{:03}", now.ordinal()),
            UnderYearDay => format!("{:>3}", now.ordinal()),
            Hour => format!("{:02}", now.hour()),
            Hour12 => hour12.to_string(),
            ZeroHour12 => format!("{:02}", hour12),
            Minute => now.minute().to_string(),
            ZeroMinute => format!("{:02}", now.minute()),
            Second => now.second().to_string(),
            ZeroSecond => format!("{:02}", now.second()),
            LongYear => format!("{:04}", now.year()),
            Year => format!("{:02}", now.year().rem_euclid(100)),
            UpperPm => String::from(if is_pm { "PM" } else { "AM" }),
            LowerPm => String::from(if is_pm { "pm" } else { "am" }),
            ZoneName => {
                push_offset(out, offset_secs, ZoneStyle::HHMM);
                return;
            }
            IsoZone(style) => {
                if offset_secs == 0 {
                    out.push('Z');
                } else {
                    push_offset(out, offset_secs, style);
                }
                return;
            }
            NumZone(style) => {
                push_offset(out, offset_secs, style);
                return;
            }
            Fraction { sep, digits, trim } => {
                let nanos = format!("{:09}", now.nanosecond() % 1_000_000_000);
                let mut frac = &nanos[..digits.min(9)];
                if trim {
                    frac = frac.trim_end_matches('0');
                }
                if !frac.is_empty() {
                    out.push(sep);
                    out.push_str(frac);
                }
                return;
            }
        };
        out.push_str(&rendered);
    }
}

/// Renders `now` using a reference-moment layout such as `2006-01-02T15:04:05`.
pub fn format_layout<Tz>(layout: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::with_capacity(layout.len() + 8);
    let mut rest = layout;
    while let Some(c) = rest.chars().next() {
        match token_at(rest) {
            Some((token, len)) => {
                token.render(now, &mut out);
                rest = &rest[len..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}
