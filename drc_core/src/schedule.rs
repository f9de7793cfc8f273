//! The collection tables: when each year's cycle starts, where it ends and which dates move.

use std::{collections::BTreeMap, fmt};

use bitmask_enum::bitmask;
use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{ConfigError, Result, ScheduleError};

/// A weekday on which the council collects kerbside recycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl CollectionDay {
    pub const ALL: [CollectionDay; 5] = [
        CollectionDay::Monday,
        CollectionDay::Tuesday,
        CollectionDay::Wednesday,
        CollectionDay::Thursday,
        CollectionDay::Friday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CollectionDay::Monday => "Monday",
            CollectionDay::Tuesday => "Tuesday",
            CollectionDay::Wednesday => "Wednesday",
            CollectionDay::Thursday => "Thursday",
            CollectionDay::Friday => "Friday",
        }
    }

    pub fn weekday(self) -> Weekday {
        match self {
            CollectionDay::Monday => Weekday::Mon,
            CollectionDay::Tuesday => Weekday::Tue,
            CollectionDay::Wednesday => Weekday::Wed,
            CollectionDay::Thursday => Weekday::Thu,
            CollectionDay::Friday => Weekday::Fri,
        }
    }

    pub fn flag(self) -> CollectionDays {
        match self {
            CollectionDay::Monday => CollectionDays::Monday,
            CollectionDay::Tuesday => CollectionDays::Tuesday,
            CollectionDay::Wednesday => CollectionDays::Wednesday,
            CollectionDay::Thursday => CollectionDays::Thursday,
            CollectionDay::Friday => CollectionDays::Friday,
        }
    }
}

impl fmt::Display for CollectionDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[bitmask]
pub enum CollectionDays {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl CollectionDays {
    /// Iterate the days contained in this set, Monday first.
    pub fn days(self) -> impl Iterator<Item = CollectionDay> {
        CollectionDay::ALL
            .into_iter()
            .filter(move |day| self.contains(day.flag()))
    }
}

impl From<CollectionDay> for CollectionDays {
    fn from(value: CollectionDay) -> Self {
        value.flag()
    }
}

/// One of the two recycling rotations, offset from each other by a week.
///
/// The council calls them "week one" and "week two".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BinType {
    WeekOne,
    WeekTwo,
}

impl BinType {
    pub const ALL: [BinType; 2] = [BinType::WeekOne, BinType::WeekTwo];

    /// Zero-based index used for the colour rotation.
    pub fn index(self) -> usize {
        match self {
            BinType::WeekOne => 0,
            BinType::WeekTwo => 1,
        }
    }

    /// One-based number used in file names, identifiers and product ids.
    pub fn number(self) -> usize {
        self.index() + 1
    }
}

/// What happens to a collection that would normally fall on a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    MovedTo(NaiveDate),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct YearTable {
    first_days: BTreeMap<CollectionDay, NaiveDate>,
    last_day: NaiveDate,
}

/// The validated collection tables.
///
/// A `Schedule` can only be built through [`Schedule::new`], so every year it knows about has a
/// first occurrence for every collection day and an inclusive last day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    exceptions: BTreeMap<NaiveDate, Exception>,
    years: BTreeMap<i32, YearTable>,
    cutover: NaiveDate,
}

impl Schedule {
    pub fn new(
        exceptions: BTreeMap<NaiveDate, Exception>,
        first_days: BTreeMap<i32, BTreeMap<CollectionDay, NaiveDate>>,
        last_days: BTreeMap<i32, NaiveDate>,
        cutover: NaiveDate,
    ) -> std::result::Result<Self, ConfigError> {
        validate_exceptions(&exceptions)?;
        if let Some(year) = last_days.keys().find(|year| !first_days.contains_key(year)) {
            return Err(ConfigError::MissingFirstDays(*year));
        }
        let mut years = BTreeMap::new();
        for (year, days) in first_days {
            let Some(last_day) = last_days.get(&year).copied() else {
                return Err(ConfigError::MissingLastDay(year));
            };
            validate_first_days(year, &days)?;
            years.insert(
                year,
                YearTable {
                    first_days: days,
                    last_day,
                },
            );
        }
        Ok(Self {
            exceptions,
            years,
            cutover,
        })
    }

    /// The configured years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// The first day on which the new collection scheme applies.
    pub fn cutover(&self) -> NaiveDate {
        self.cutover
    }

    pub fn first_day(&self, year: i32, day: CollectionDay) -> Result<NaiveDate> {
        let table = self.year(year)?;
        table.first_days.get(&day).copied().ok_or(ScheduleError::Config(
            ConfigError::MissingCollectionDay { year, day },
        ))
    }

    pub fn last_day(&self, year: i32) -> Result<NaiveDate> {
        Ok(self.year(year)?.last_day)
    }

    pub fn exception(&self, date: NaiveDate) -> Option<Exception> {
        self.exceptions.get(&date).copied()
    }

    pub(crate) fn exceptions(&self) -> &BTreeMap<NaiveDate, Exception> {
        &self.exceptions
    }

    fn year(&self, year: i32) -> Result<&YearTable> {
        self.years.get(&year).ok_or(ScheduleError::MissingYear(year))
    }
}

fn validate_first_days(
    year: i32,
    days: &BTreeMap<CollectionDay, NaiveDate>,
) -> std::result::Result<(), ConfigError> {
    let mut present = CollectionDays::none();
    for (day, date) in days {
        if date.weekday() != day.weekday() {
            return Err(ConfigError::WrongWeekday {
                year,
                day: *day,
                date: *date,
                actual: date.weekday(),
            });
        }
        present |= day.flag();
    }
    match CollectionDay::ALL
        .into_iter()
        .find(|day| !present.contains(day.flag()))
    {
        Some(day) => Err(ConfigError::MissingCollectionDay { year, day }),
        None => Ok(()),
    }
}

/// Shifts must land on a plain date and no two shifts may land on the same one, otherwise the
/// result would depend on lookup order or produce the same collection twice.
fn validate_exceptions(
    exceptions: &BTreeMap<NaiveDate, Exception>,
) -> std::result::Result<(), ConfigError> {
    let mut targets: BTreeMap<NaiveDate, NaiveDate> = BTreeMap::new();
    for (from, exception) in exceptions {
        let Exception::MovedTo(to) = exception else {
            continue;
        };
        if exceptions.contains_key(to) {
            return Err(ConfigError::ChainedException {
                from: *from,
                to: *to,
            });
        }
        if let Some(first) = targets.insert(*to, *from) {
            return Err(ConfigError::DuplicateTarget {
                first,
                second: *from,
                to: *to,
            });
        }
    }
    Ok(())
}
