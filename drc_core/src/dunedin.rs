//! The Dunedin City Council collection tables.
//!
//! The council's calendar doesn't start on January 1st, so each year lists the date its "week one"
//! starts for every collection day. A year that does not start with a complete week needs an
//! exception so the collection days keep the right phase.
//! Only add a year once its exceptions are known.
//!
//! The 2021 and 2022 rows are transcribed from the council's printed calendars. The 2023 and 2024
//! rows are not: their first days are the Mondays to Fridays that keep the yellow and blue weeks
//! alternating across the year boundary, each bound is the Sunday before the next cycle starts,
//! and Good Friday moves to Saturday as it did in 2021 and 2022. Replace them with the published
//! dates when checking a new year against the council's calendar.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    error::ConfigError,
    schedule::{CollectionDay, Exception, Schedule},
};

type Ymd = (i32, u32, u32);

/// If a collection would normally be on the first date, it happens on the second one instead.
static EXCEPTIONS: [(Ymd, Option<Ymd>); 5] = [
    ((2021, 4, 2), Some((2021, 4, 3))),
    ((2022, 1, 31), None),
    ((2022, 4, 15), Some((2022, 4, 16))),
    ((2023, 4, 7), Some((2023, 4, 8))),
    ((2024, 3, 29), Some((2024, 3, 30))),
];

/// The first collection of each year's cycle, Monday to Friday.
static FIRST_DAYS: [(i32, [Ymd; 5]); 4] = [
    (
        2021,
        [
            (2021, 2, 1),
            (2021, 2, 2),
            (2021, 2, 3),
            (2021, 2, 4),
            (2021, 2, 5),
        ],
    ),
    (
        2022,
        [
            (2022, 1, 31),
            (2022, 2, 1),
            (2022, 2, 2),
            (2022, 2, 3),
            (2022, 2, 4),
        ],
    ),
    (
        2023,
        [
            (2023, 1, 30),
            (2023, 1, 31),
            (2023, 2, 1),
            (2023, 2, 2),
            (2023, 2, 3),
        ],
    ),
    (
        2024,
        [
            (2024, 1, 29),
            (2024, 1, 30),
            (2024, 1, 31),
            (2024, 2, 1),
            (2024, 2, 2),
        ],
    ),
];

/// Stop generating a year's collections after this date.
static LAST_DAYS: [(i32, Ymd); 4] = [
    (2021, (2022, 1, 31)),
    (2022, (2023, 1, 29)),
    (2023, (2024, 1, 28)),
    (2024, (2025, 1, 26)),
];

/// Food scraps collection started with this date, which changed what goes out each week.
static CUTOVER: Ymd = (2024, 7, 1);

/// Build the validated Dunedin schedule.
pub fn schedule() -> Result<Schedule, ConfigError> {
    let mut exceptions = BTreeMap::new();
    for (from, to) in EXCEPTIONS {
        let exception = match to {
            Some(to) => Exception::MovedTo(date(to)?),
            None => Exception::Cancelled,
        };
        exceptions.insert(date(from)?, exception);
    }
    let mut first_days = BTreeMap::new();
    for (year, dates) in FIRST_DAYS {
        let mut days = BTreeMap::new();
        for (day, ymd) in CollectionDay::ALL.into_iter().zip(dates) {
            days.insert(day, date(ymd)?);
        }
        first_days.insert(year, days);
    }
    let mut last_days = BTreeMap::new();
    for (year, ymd) in LAST_DAYS {
        last_days.insert(year, date(ymd)?);
    }
    Schedule::new(exceptions, first_days, last_days, date(CUTOVER)?)
}

fn date((year, month, day): Ymd) -> Result<NaiveDate, ConfigError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(ConfigError::InvalidDate { year, month, day })
}
