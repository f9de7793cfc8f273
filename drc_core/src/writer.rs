//! Collects the events of one bin type and collection day into a calendar and writes it.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use ical::{
    generator::{Emitter, IcalCalendar, IcalCalendarBuilder, Property},
    ical_property,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{
    error::{Result, ScheduleError},
    render::{self, TIMEZONE},
    schedule::{BinType, CollectionDay, CollectionDays, Schedule},
};

static COUNCIL: &str = "Dunedin City Council";

/// A generated calendar and the file name it belongs in.
#[derive(Debug)]
pub struct CalendarFile {
    pub file_name: String,
    pub calendar: IcalCalendar,
}

/// Build the calendar of a bin type's collections on one day over all configured years.
pub fn calendar(
    schedule: &Schedule,
    bin_type: BinType,
    day: CollectionDay,
) -> Result<IcalCalendar> {
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(render::escape_text(&prod_id(bin_type, day)))
        .build();
    calendar
        .properties
        .push(ical_property!("X-WR-TIMEZONE", TIMEZONE));
    for year in schedule.years() {
        let before = calendar.events.len();
        for occurrence in schedule.occurrences(day, year)? {
            calendar
                .events
                .push(render::event(bin_type, &occurrence, schedule.cutover())?);
        }
        debug!(
            year,
            %day,
            week = bin_type.number(),
            events = calendar.events.len() - before,
            "resolved year"
        );
    }
    Ok(calendar)
}

/// Build every calendar except those for the excluded days.
///
/// Either all calendars are built or none is.
pub fn calendars(
    schedule: &Schedule,
    excluded_days: CollectionDays,
) -> Result<Vec<CalendarFile>> {
    let mut files = vec![];
    for bin_type in BinType::ALL {
        for day in CollectionDay::ALL {
            if excluded_days.contains(day.flag()) {
                continue;
            }
            files.push(CalendarFile {
                file_name: file_name(bin_type, day),
                calendar: calendar(schedule, bin_type, day)?,
            });
        }
    }
    if files.is_empty() {
        warn!("every collection day is excluded, no calendar to generate");
    }
    Ok(files)
}

/// Build every calendar and write them into `dir`, replacing older versions.
///
/// Nothing is written unless every calendar could be built first.
pub fn write_all(
    schedule: &Schedule,
    dir: &Path,
    excluded_days: CollectionDays,
) -> Result<Vec<PathBuf>> {
    let files = calendars(schedule, excluded_days)?;
    fs::create_dir_all(dir).map_err(|source| ScheduleError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = vec![];
    for file in files {
        let path = dir.join(&file.file_name);
        let contents = ics(&file.calendar);
        write_atomically(dir, &path, contents.as_bytes()).map_err(|source| ScheduleError::Io {
            path: path.clone(),
            source,
        })?;
        info!(
            path = %path.display(),
            events = file.calendar.events.len(),
            "wrote calendar"
        );
        paths.push(path);
    }
    Ok(paths)
}

/// Serialize a calendar with CRLF line endings.
///
/// The `ical` emitter ends lines with a bare LF. Newlines inside TEXT values are already escaped,
/// so every LF left in its output is a line break, including those of folded lines.
pub fn ics(calendar: &IcalCalendar) -> String {
    let mut ics = String::new();
    for line in calendar.generate().lines() {
        ics.push_str(line);
        ics.push_str("\r\n");
    }
    ics
}

/// Write through a temporary file in the same directory, so readers never see a partial calendar.
fn write_atomically(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Get the file name of a calendar, e.g. `week-1-monday.ics`.
pub fn file_name(bin_type: BinType, day: CollectionDay) -> String {
    format!(
        "week-{}-{}.ics",
        bin_type.number(),
        day.name().to_lowercase()
    )
}

fn prod_id(bin_type: BinType, day: CollectionDay) -> String {
    format!(
        "-//{COUNCIL}//Rubbish Collection week {}, {day} pickup//EN",
        bin_type.number()
    )
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        fs,
        io::{BufReader, Cursor},
    };

    use ical::{generator::IcalCalendar, IcalParser};
    use tempfile::tempdir;

    use crate::{
        dunedin,
        error::ScheduleError,
        schedule::{BinType, CollectionDay, CollectionDays},
        writer::{calendar, calendars, file_name, ics, prod_id, write_all},
    };

    fn parse(ics: &str) -> IcalCalendar {
        let mut parser = IcalParser::new(BufReader::new(Cursor::new(ics)));
        parser.next().unwrap().unwrap()
    }

    fn values<'a>(calendar: &'a IcalCalendar, name: &str) -> Vec<&'a str> {
        calendar
            .events
            .iter()
            .flat_map(|event| event.properties.iter())
            .filter(|property| property.name == name)
            .filter_map(|property| property.value.as_deref())
            .collect()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(BinType::WeekOne, CollectionDay::Monday),
            "week-1-monday.ics"
        );
        assert_eq!(
            file_name(BinType::WeekTwo, CollectionDay::Wednesday),
            "week-2-wednesday.ics"
        );
    }

    #[test]
    fn test_prod_id() {
        assert_eq!(
            prod_id(BinType::WeekTwo, CollectionDay::Friday),
            "-//Dunedin City Council//Rubbish Collection week 2, Friday pickup//EN"
        );
    }

    #[test]
    fn test_calendar() {
        let schedule = dunedin::schedule().unwrap();
        let ics = ics(&calendar(&schedule, BinType::WeekOne, CollectionDay::Monday).unwrap());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("X-WR-TIMEZONE:Pacific/Auckland\r\n"));
        assert!(ics.contains("VERSION:2.0\r\n"));
        assert!(ics.contains("\r\nDTSTAMP:20210201T000000Z\r\n"));
        assert_eq!(ics.matches('\n').count(), ics.matches("\r\n").count());

        let parsed = parse(&ics);
        let starts = values(&parsed, "DTSTART");
        assert_eq!(starts.first(), Some(&"20210201"));
        // Cancelled on 2022-01-31 in both the 2021 and the 2022 cycle.
        assert!(!starts.contains(&"20220131"));
        assert!(starts.contains(&"20220207"));

        let uids = values(&parsed, "UID");
        let unique: HashSet<&str> = uids.iter().copied().collect();
        assert_eq!(unique.len(), uids.len());
        assert_eq!(uids.len(), parsed.events.len());
    }

    #[test]
    fn test_calendar_summaries() {
        let schedule = dunedin::schedule().unwrap();
        let ics = ics(&calendar(&schedule, BinType::WeekTwo, CollectionDay::Friday).unwrap());
        let parsed = parse(&ics);
        let summaries = values(&parsed, "SUMMARY");
        assert_eq!(summaries[0], "🍾 Blue bin");
        assert_eq!(summaries[1], "📦 Yellow bin");
        assert_eq!(summaries.last(), Some(&"📦 Yellow bin and 🍏 food scraps"));
        assert!(summaries.contains(&"🍾 Blue crate and 🍏 food scraps"));
    }

    #[test]
    fn test_calendars_excluded() {
        let schedule = dunedin::schedule().unwrap();
        assert_eq!(
            calendars(&schedule, CollectionDays::none()).unwrap().len(),
            10
        );
        let files = calendars(&schedule, CollectionDays::Monday | CollectionDays::Tuesday).unwrap();
        assert_eq!(files.len(), 6);
        assert!(files
            .iter()
            .all(|file| !file.file_name.ends_with("monday.ics")
                && !file.file_name.ends_with("tuesday.ics")));
    }

    #[test]
    fn test_write_all() {
        let schedule = dunedin::schedule().unwrap();
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("week-1-monday.ics"), "stale").unwrap();

        let paths = write_all(&schedule, dir.path(), CollectionDays::none()).unwrap();
        assert_eq!(paths.len(), 10);
        for bin_type in BinType::ALL {
            for day in CollectionDay::ALL {
                assert!(dir.path().join(file_name(bin_type, day)).is_file());
            }
        }
        let first = fs::read(dir.path().join("week-1-monday.ics")).unwrap();
        assert!(first.starts_with(b"BEGIN:VCALENDAR\r\n"));
        let lf = first.iter().filter(|byte| **byte == b'\n').count();
        let crlf = first.windows(2).filter(|pair| *pair == b"\r\n").count();
        assert_eq!(lf, crlf);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 10);

        write_all(&schedule, dir.path(), CollectionDays::none()).unwrap();
        let second = fs::read(dir.path().join("week-1-monday.ics")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_all_creates_dir() {
        let schedule = dunedin::schedule().unwrap();
        let dir = tempdir().unwrap();
        let nested = dir.path().join("calendars").join("dunedin");
        let paths = write_all(&schedule, &nested, CollectionDays::Friday).unwrap();
        assert_eq!(paths.len(), 8);
        assert!(nested.join("week-2-thursday.ics").is_file());
    }

    #[test]
    fn test_write_all_fails_on_file() {
        let schedule = dunedin::schedule().unwrap();
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let result = write_all(&schedule, &blocker, CollectionDays::none());
        assert!(matches!(result, Err(ScheduleError::Io { .. })));
    }
}
