//! Turns resolved collections into calendar events.

use chrono::{Days, NaiveDate};
use ical::{
    generator::{IcalEvent, IcalEventBuilder, Property},
    ical_param, ical_property,
};

use crate::{
    error::{Result, ScheduleError},
    resolver::Occurrence,
    schedule::BinType,
};

pub static TIMEZONE: &str = "Pacific/Auckland";
static FORMAT: &str = "%Y%m%d";

/// The colour of the bin collected in a given week.
///
/// The council talks about "week one" and "week two"; the colour of the bin collected on the
/// first Monday, Tuesday, ... is easier to remember since they alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    Yellow,
    Blue,
}

pub static ROTATION: [Colour; 2] = [Colour::Yellow, Colour::Blue];

impl Colour {
    pub fn of(bin_type: BinType, week: u32) -> Self {
        let week = week as usize % ROTATION.len();
        ROTATION[(bin_type.index() + week) % ROTATION.len()]
    }
}

/// Whether a collection happens before or after the cutover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Era {
    Old,
    New,
}

impl Era {
    pub fn of(date: NaiveDate, cutover: NaiveDate) -> Self {
        if date >= cutover {
            Era::New
        } else {
            Era::Old
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub summary: &'static str,
    pub description: &'static str,
}

static OLD_YELLOW: Template = Template {
    summary: "📦 Yellow bin",
    description: "YELLOW WEEK: Rinsed rigid plastics
1, 2 and 5 only, tins, cans, and clean
paper and cardboard. No caps, lids,
pumps or trigger sprays.

Place all recycling and DCC black bags
kerbside by 7am on your collection day.",
};

static OLD_BLUE: Template = Template {
    summary: "🍾 Blue bin",
    description: "BLUE WEEK: Unbroken glass
bottles and jars, with NO lids.
No mirror glass.

Place all recycling and DCC black bags
kerbside by 7am on your collection day.",
};

static NEW_YELLOW: Template = Template {
    summary: "📦 Yellow bin and 🍏 food scraps",
    description: "YELLOW WEEK: Yellow-lid mixed recycling.
Rinsed plastics 1, 2 and 5 only, tins,
cans, and clean paper and cardboard.
No lids.

Put out your green-lid food scraps bin
as well.

Place all bins kerbside by 7am on your
collection day.",
};

static NEW_BLUE: Template = Template {
    summary: "🍾 Blue crate and 🍏 food scraps",
    description: "BLUE WEEK: Blue-lid glass crate.
Unbroken glass bottles and jars, with
NO lids. No mirror glass.

Put out your green-lid food scraps bin
as well.

Place all bins kerbside by 7am on your
collection day.",
};

pub fn template(colour: Colour, era: Era) -> &'static Template {
    match (era, colour) {
        (Era::Old, Colour::Yellow) => &OLD_YELLOW,
        (Era::Old, Colour::Blue) => &OLD_BLUE,
        (Era::New, Colour::Yellow) => &NEW_YELLOW,
        (Era::New, Colour::Blue) => &NEW_BLUE,
    }
}

/// Build the event for one collection.
///
/// Fails only for the last date chrono can represent, which has no following day to end on.
pub fn event(
    bin_type: BinType,
    occurrence: &Occurrence,
    cutover: NaiveDate,
) -> Result<IcalEvent> {
    let date = occurrence.date;
    let template = template(
        Colour::of(bin_type, occurrence.week),
        Era::of(date, cutover),
    );
    let end = date
        .checked_add_days(Days::new(1))
        .ok_or(ScheduleError::DateOutOfRange(date))?;
    Ok(IcalEventBuilder::tzid(TIMEZONE)
        .uid(uid(bin_type, date))
        .changed_utc(format!("{}T000000Z", date.format(FORMAT)))
        .one_day(date.format(FORMAT).to_string())
        .set(ical_property!(
            "DTEND",
            end.format(FORMAT).to_string(),
            ical_param!("VALUE", "DATE")
        ))
        .set(ical_property!("SUMMARY", escape_text(template.summary)))
        .set(ical_property!(
            "DESCRIPTION",
            escape_text(template.description)
        ))
        .build())
}

/// Get a unique id for the collection of a bin type on a date.
///
/// Calendar clients use it to recognise regenerated events as updates.
/// Changing this function is a breaking change!
pub fn uid(bin_type: BinType, date: NaiveDate) -> String {
    format!("recycling-week{}-{}", bin_type.number(), date)
}

/// Escape a TEXT value as RFC 5545 section 3.3.11 requires.
pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
