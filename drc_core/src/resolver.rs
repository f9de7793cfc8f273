//! Walks a year's collection cycle week by week and applies the exceptions.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::{
    error::Result,
    schedule::{CollectionDay, Exception, Schedule},
};

/// A collection that actually happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Occurrence {
    /// Zero-based week of the year's cycle, counted before any exception is applied.
    pub week: u32,
    pub date: NaiveDate,
}

/// The collections of one collection day within one configured year, in date order.
///
/// The walk is finite and pure: a clone taken before iterating replays exactly the same dates.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    exceptions: &'a BTreeMap<NaiveDate, Exception>,
    first: NaiveDate,
    last_day: NaiveDate,
    week: u32,
    finished: bool,
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let week = self.week;
            self.week += 1;
            let Some(nominal) = self
                .first
                .checked_add_days(Days::new(7 * u64::from(week)))
            else {
                break;
            };
            // A cancelled week still counts, so the colours after it keep their phase.
            let Some(date) = apply(self.exceptions, nominal) else {
                continue;
            };
            if date > self.last_day {
                break;
            }
            return Some(Occurrence { week, date });
        }
        self.finished = true;
        None
    }
}

impl std::iter::FusedIterator for Occurrences<'_> {}

fn apply(exceptions: &BTreeMap<NaiveDate, Exception>, date: NaiveDate) -> Option<NaiveDate> {
    match exceptions.get(&date) {
        Some(Exception::MovedTo(moved)) => Some(*moved),
        Some(Exception::Cancelled) => None,
        None => Some(date),
    }
}

impl Schedule {
    /// Get the collections of `day` in the cycle configured for `year`.
    ///
    /// The walk starts at the year's first occurrence and stops at the first resolved date after
    /// the year's last day.
    pub fn occurrences(&self, day: CollectionDay, year: i32) -> Result<Occurrences<'_>> {
        Ok(Occurrences {
            exceptions: self.exceptions(),
            first: self.first_day(year, day)?,
            last_day: self.last_day(year)?,
            week: 0,
            finished: false,
        })
    }

    /// Get the date a collection nominally due on `date` really happens, if at all.
    pub fn resolve(&self, date: NaiveDate) -> Option<NaiveDate> {
        apply(self.exceptions(), date)
    }
}
