//! Parses time keys produced by [`crate::Granularity::time_key`] back into
//! something that sorts chronologically.
//!
//! Keys like `"09/11"` and `"30/10"` do not sort by plain string comparison,
//! so merged rows are ordered by the date they name instead.

use chrono::{Datelike, NaiveDate, NaiveTime};
use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::char,
    combinator::{all_consuming, map, map_res},
    sequence::separated_pair,
    IResult,
};

/// A parsed time key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeLabel {
    /// (day, month)
    pub date: Option<(u32, u32)>,

    /// (hour, minute)
    pub clock: Option<(u32, u32)>,
}

fn two_digits(input: &str) -> IResult<&str, u32> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_digit()), str::parse::<u32>)(input)
}

fn day_month(input: &str) -> IResult<&str, (u32, u32)> {
    separated_pair(two_digits, char('/'), two_digits)(input)
}

fn clock(input: &str) -> IResult<&str, (u32, u32)> {
    separated_pair(two_digits, char(':'), two_digits)(input)
}

fn time_label(input: &str) -> IResult<&str, TimeLabel> {
    alt((
        map(separated_pair(day_month, char(' '), clock), |(date, clock)| {
            TimeLabel {
                date: Some(date),
                clock: Some(clock),
            }
        }),
        map(day_month, |date| TimeLabel {
            date: Some(date),
            clock: None,
        }),
        map(clock, |clock| TimeLabel {
            date: None,
            clock: Some(clock),
        }),
    ))(input)
}

/// Year used to validate day and month, so that `29/02` is always accepted.
const LEAP_YEAR: i32 = 2000;

/// Chronological position of a time label.
///
/// Field order is significant, the derived `Ord` compares year first.
/// Unlike a calendar date, this can hold `29/02` of any year.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl TimeLabel {
    pub fn parse(input: &str) -> crate::Result<Self> {
        all_consuming(time_label)(input)
            .map(|(_, label)| label)
            .map_err(|_| crate::Error::InvalidTimeLabel(input.to_owned()))
    }

    /// Places the label in time relative to a reference date.
    ///
    /// Labels without a date fall on the reference date. Labels whose day
    /// and month precede the reference date belong to the following year.
    pub fn resolve(&self, reference: NaiveDate, raw: &str) -> crate::Result<SortKey> {
        let invalid = || crate::Error::InvalidTimeLabel(raw.to_owned());

        let (hour, minute) = self.clock.unwrap_or_default();
        NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;

        let (year, month, day) = match self.date {
            Some((day, month)) => {
                NaiveDate::from_ymd_opt(LEAP_YEAR, month, day).ok_or_else(invalid)?;

                let year = if (month, day) < (reference.month(), reference.day()) {
                    reference.year() + 1
                } else {
                    reference.year()
                };
                (year, month, day)
            }
            None => (reference.year(), reference.month(), reference.day()),
        };

        Ok(SortKey {
            year,
            month,
            day,
            hour,
            minute,
        })
    }
}

/// Chronological sort key of a time label.
pub fn sort_key(label: &str, reference: NaiveDate) -> crate::Result<SortKey> {
    TimeLabel::parse(label)?.resolve(reference, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{date, naive},
        Granularity,
    };

    fn key(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> SortKey {
        SortKey {
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    #[test_log::test]
    fn parse_all_formats() -> crate::Result<()> {
        assert_eq!(
            TimeLabel {
                date: None,
                clock: Some((0, 30))
            },
            TimeLabel::parse("00:30")?,
        );
        assert_eq!(
            TimeLabel {
                date: Some((9, 11)),
                clock: Some((15, 0))
            },
            TimeLabel::parse("09/11 15:00")?,
        );
        assert_eq!(
            TimeLabel {
                date: Some((30, 10)),
                clock: None
            },
            TimeLabel::parse("30/10")?,
        );
        Ok(())
    }

    #[test_log::test]
    fn parse_rejects_garbage() {
        for input in ["", "1/1", "01/01 ", "01/01 1:00", "aa:bb", "01-01", "01/01/2024"] {
            assert!(
                matches!(TimeLabel::parse(input), Err(crate::Error::InvalidTimeLabel(_))),
                "{input:?} should not parse",
            );
        }
    }

    #[test_log::test]
    fn sort_key_across_month_boundary() -> crate::Result<()> {
        let reference = date(2024, 10, 20);

        assert!(sort_key("30/10", reference)? < sort_key("09/11", reference)?);
        assert!("30/10" > "09/11");

        Ok(())
    }

    #[test_log::test]
    fn sort_key_rolls_over_new_year() -> crate::Result<()> {
        let reference = date(2023, 12, 20);

        assert_eq!(key(2024, 1, 2, 0, 0), sort_key("02/01", reference)?);
        assert!(sort_key("31/12", reference)? < sort_key("02/01", reference)?);

        Ok(())
    }

    #[test_log::test]
    fn sort_key_clock_only_uses_reference_date() -> crate::Result<()> {
        let reference = date(2024, 1, 1);
        assert_eq!(key(2024, 1, 1, 13, 30), sort_key("13:30", reference)?);
        Ok(())
    }

    #[test_log::test]
    fn sort_key_leap_day_in_common_year() -> crate::Result<()> {
        let reference = date(2025, 2, 20);

        assert_eq!(key(2025, 2, 29, 0, 0), sort_key("29/02", reference)?);
        assert!(sort_key("28/02", reference)? < sort_key("29/02", reference)?);
        assert!(sort_key("29/02", reference)? < sort_key("01/03", reference)?);
        assert!(sort_key("29/02 21:00", reference)? < sort_key("01/03 00:00", reference)?);

        Ok(())
    }

    #[test_log::test]
    fn sort_key_impossible_date() {
        assert!(sort_key("31/02", date(2024, 1, 1)).is_err());
        assert!(sort_key("30/02", date(2025, 1, 1)).is_err());
        assert!(sort_key("25:00", date(2024, 1, 1)).is_err());
    }

    #[test_log::test]
    fn every_granularity_round_trips() -> crate::Result<()> {
        let t = naive("2024-05-17T08:45:00");

        for g in [Granularity::Minutes30, Granularity::Hours3, Granularity::Daily] {
            TimeLabel::parse(&g.time_key(&t))?;
        }

        Ok(())
    }
}
