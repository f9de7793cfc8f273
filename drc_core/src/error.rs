//! Errors raised while validating the collection tables or writing calendars.

use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};
use thiserror::Error;

use crate::schedule::CollectionDay;

/// An authoring mistake in the collection tables, found before anything is generated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("year {0} has first collection days but no last day")]
    MissingLastDay(i32),

    #[error("year {0} has a last day but no first collection days")]
    MissingFirstDays(i32),

    #[error("year {year} has no first {day} collection")]
    MissingCollectionDay { year: i32, day: CollectionDay },

    #[error("first {day} collection of {year} is {date}, which is a {actual}")]
    WrongWeekday {
        year: i32,
        day: CollectionDay,
        date: NaiveDate,
        actual: Weekday,
    },

    #[error("exception for {from} moves to {to}, which has an exception itself")]
    ChainedException { from: NaiveDate, to: NaiveDate },

    #[error("exceptions for {first} and {second} both move to {to}")]
    DuplicateTarget {
        first: NaiveDate,
        second: NaiveDate,
        to: NaiveDate,
    },
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("year {0} is not configured")]
    MissingYear(i32),

    #[error("collection on {0} has no following day to end on")]
    DateOutOfRange(NaiveDate),

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
