//! This crate generates iCalendar files for Dunedin City Council's kerbside recycling collection.
//! Every collection day and bin rotation gets its own calendar, so a household can subscribe to
//! exactly the one that matches its street.
//!
//! The dates come from the council's "Let's Sort It Out" calendar
//! <https://www.dunedin.govt.nz/services/rubbish-and-recycling/collection-days>
//! and are embedded in [`dunedin`].

pub use ical;

pub mod dunedin;
pub mod error;
pub mod render;
pub mod resolver;
pub mod schedule;
pub mod writer;

pub use error::{ConfigError, Result, ScheduleError};
pub use schedule::{BinType, CollectionDay, CollectionDays, Exception, Schedule};
