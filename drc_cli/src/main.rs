//! Writes the Dunedin recycling collection calendars, one per bin rotation and collection day.

use std::{env::current_dir, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use drc_core::{dunedin, writer, CollectionDays};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Arguments {
    /// the directory to write the calendars into, defaults to the current directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// only validate the collection tables and build the calendars, write nothing
    #[arg(long)]
    pub check: bool,
    /// skip the Monday calendars
    #[arg(long)]
    pub exclude_monday: bool,
    /// skip the Tuesday calendars
    #[arg(long)]
    pub exclude_tuesday: bool,
    /// skip the Wednesday calendars
    #[arg(long)]
    pub exclude_wednesday: bool,
    /// skip the Thursday calendars
    #[arg(long)]
    pub exclude_thursday: bool,
    /// skip the Friday calendars
    #[arg(long)]
    pub exclude_friday: bool,
}

impl From<&Arguments> for CollectionDays {
    fn from(value: &Arguments) -> Self {
        let mut collection_days = CollectionDays::none();
        if value.exclude_monday {
            collection_days |= CollectionDays::Monday;
        }
        if value.exclude_tuesday {
            collection_days |= CollectionDays::Tuesday;
        }
        if value.exclude_wednesday {
            collection_days |= CollectionDays::Wednesday;
        }
        if value.exclude_thursday {
            collection_days |= CollectionDays::Thursday;
        }
        if value.exclude_friday {
            collection_days |= CollectionDays::Friday;
        }
        collection_days
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Arguments::parse();
    let schedule = dunedin::schedule().context("invalid collection tables")?;
    let excluded_days = CollectionDays::from(&args);
    if args.check {
        let files = writer::calendars(&schedule, excluded_days)?;
        let events: usize = files.iter().map(|file| file.calendar.events.len()).sum();
        info!(calendars = files.len(), events, "collection tables are valid");
        return Ok(());
    }
    let dir = match args.output_dir {
        Some(dir) => dir,
        None => current_dir()?,
    };
    let paths = writer::write_all(&schedule, &dir, excluded_days)
        .with_context(|| format!("writing calendars into {}", dir.display()))?;
    info!(calendars = paths.len(), "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use drc_core::CollectionDays;

    use crate::Arguments;

    #[test]
    fn test_from_arguments_for_collection_days() {
        let args = Arguments::parse_from(["drc"]);
        assert_eq!(CollectionDays::from(&args), CollectionDays::none());
        assert_eq!(args.output_dir, None);
        assert!(!args.check);

        let args = Arguments::parse_from(["drc", "--exclude-monday"]);
        assert_eq!(CollectionDays::from(&args), CollectionDays::Monday);

        let args = Arguments::parse_from([
            "drc",
            "--exclude-wednesday",
            "--exclude-thursday",
            "--exclude-friday",
            "--output-dir",
            "out",
        ]);
        assert_eq!(
            CollectionDays::from(&args),
            CollectionDays::Wednesday
                .or(CollectionDays::Thursday)
                .or(CollectionDays::Friday)
        );
        assert_eq!(args.output_dir, Some("out".into()));
    }
}
