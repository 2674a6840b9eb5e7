use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use crate::config::PAGE_SIZE;
use crate::console::prompt::{ask, parse_yes_no};
use crate::console::render::{format_page, separator, write_section};
use crate::data::filter::{City, DayFilter, FilterSelection, MonthFilter};
use crate::data::loader::load_data;
use crate::data::model::TripTable;
use crate::stats;

const GREETING: &str = "Hello! Let's explore some US bike share data!";
const CITY_PROMPT: &str = "Would you like to see data for Chicago, New York City, or Washington?";
const MONTH_PROMPT: &str = "Please enter a month: January, February, March, April, May, or June? \
     or just say 'all' to see all months.";
const DAY_PROMPT: &str = "Please enter a day: Monday, Tuesday, Wednesday, Thursday, Friday, \
     Saturday, or Sunday? or just say 'all' to see all days.";
const VIEW_ROWS_PROMPT: &str = "Would you like to view 5 rows of individual trip data? Enter yes or no.";
const CONTINUE_PROMPT: &str = "Do you wish to continue? Enter yes or no.";
const RESTART_PROMPT: &str = "Would you like to restart? Enter yes or no.";
const NO_MORE_ROWS: &str = "No more rows to display.";

/// Whether the session should keep going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input was exhausted.
    Quit,
}

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

/// The interactive explore/restart loop over a console.
pub struct Session<R, W> {
    input: R,
    output: W,
    data_dir: PathBuf,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            data_dir: data_dir.into(),
        }
    }

    /// Run until the user declines to restart or input ends.
    ///
    /// A city source that is missing or malformed ends the session with an error.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(selection) = self.get_filters()? else {
                return Ok(());
            };
            log::info!(
                "exploring {} (month={}, day={})",
                selection.city.name(),
                selection.month,
                selection.day
            );

            let table = load_data(&self.data_dir, &selection)?;
            if self.explore(&table)? == Flow::Quit {
                return Ok(());
            }

            match self.ask_yes_no(RESTART_PROMPT)? {
                Some(true) => continue,
                _ => return Ok(()),
            }
        }
    }

    fn get_filters(&mut self) -> Result<Option<FilterSelection>> {
        writeln!(self.output, "{GREETING}")?;

        let Some(city) = ask(&mut self.input, &mut self.output, CITY_PROMPT, City::parse)? else {
            return Ok(None);
        };
        let Some(month) = ask(&mut self.input, &mut self.output, MONTH_PROMPT, MonthFilter::parse)?
        else {
            return Ok(None);
        };
        let Some(day) = ask(&mut self.input, &mut self.output, DAY_PROMPT, DayFilter::parse)? else {
            return Ok(None);
        };

        writeln!(self.output, "{}", separator())?;
        Ok(Some(FilterSelection { city, month, day }))
    }

    /// Print the four reports in order, then offer the raw rows.
    fn explore(&mut self, table: &TripTable) -> Result<Flow> {
        let started = Instant::now();
        let report = stats::time_stats(table);
        self.section("Calculating The Most Frequent Times of Travel...", report.as_ref(), started)?;

        let started = Instant::now();
        let report = stats::station_stats(table);
        self.section("Calculating The Most Popular Stations and Trip...", report.as_ref(), started)?;

        let started = Instant::now();
        let report = stats::trip_duration_stats(table);
        self.section("Calculating Trip Duration...", report.as_ref(), started)?;

        let started = Instant::now();
        let report = stats::user_stats(table);
        self.section("Calculating User Stats...", report.as_ref(), started)?;

        self.view_rows(table)
    }

    fn section<T: std::fmt::Display>(
        &mut self,
        heading: &str,
        report: Option<&T>,
        started: Instant,
    ) -> Result<()> {
        let elapsed = started.elapsed();
        log::debug!("{heading} took {elapsed:?}");
        write_section(&mut self.output, heading, report, elapsed)?;
        Ok(())
    }

    /// Page through the table five rows at a time until declined or exhausted.
    fn view_rows(&mut self, table: &TripTable) -> Result<Flow> {
        match self.ask_yes_no(VIEW_ROWS_PROMPT)? {
            None => return Ok(Flow::Quit),
            Some(false) => return Ok(Flow::Continue),
            Some(true) => {}
        }

        let mut offset = 0;
        loop {
            let page = table.page(offset, PAGE_SIZE);
            if page.is_empty() {
                writeln!(self.output, "{NO_MORE_ROWS}")?;
                return Ok(Flow::Continue);
            }
            writeln!(self.output, "{}", format_page(&table.columns, page)?)?;
            offset += PAGE_SIZE;

            match self.ask_yes_no(CONTINUE_PROMPT)? {
                None => return Ok(Flow::Quit),
                Some(false) => return Ok(Flow::Continue),
                Some(true) => {}
            }
        }
    }

    fn ask_yes_no(&mut self, question: &str) -> Result<Option<bool>> {
        writeln!(self.output)?;
        Ok(ask(&mut self.input, &mut self.output, question, parse_yes_no)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::prompt::INVALID_INPUT;
    use crate::console::render::NO_DATA;
    use crate::data::error::DataError;
    use std::path::Path;

    const CHICAGO: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
0,2017-03-06 08:00:00,2017-03-06 08:10:00,600,Clark St,State St,Subscriber,Male,1989.0
1,2017-01-02 09:00:00,2017-01-02 09:05:00,300,State St,Clark St,Customer,,
2,2017-03-07 17:30:00,2017-03-07 17:40:00,600,Clark St,Lake St,Subscriber,Female,1975.0
3,2017-06-04 12:00:00,2017-06-04 12:20:00,1200,Lake St,State St,Subscriber,Male,1990.0
4,2017-03-13 08:15:00,2017-03-13 08:30:00,900,Lake St,State St,Customer,Male,1990.0
5,2017-04-11 18:00:00,2017-04-11 18:10:00,600,Clark St,State St,Subscriber,Female,1982.0
6,2017-05-20 10:00:00,2017-05-20 10:30:00,1800,State St,Lake St,Subscriber,Male,1990.0
";

    const WASHINGTON: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
0,2017-02-01 07:00:00,2017-02-01 07:10:00,600.5,Union Station,Dupont Circle,Registered
1,2017-02-02 07:30:00,2017-02-02 07:40:00,620.25,Union Station,Dupont Circle,Casual
";

    fn data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chicago.csv"), CHICAGO).unwrap();
        std::fs::write(dir.path().join("washington.csv"), WASHINGTON).unwrap();
        dir
    }

    fn run(dir: &Path, input: &str) -> (Result<()>, String) {
        let mut output = Vec::new();
        let result = Session::new(input.as_bytes(), &mut output, dir).run();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn chicago_in_march() {
        let dir = data_dir();
        let (result, out) = run(dir.path(), "boston\nchicago\nmarch\nall\nno\nno\n");
        result.unwrap();

        assert_eq!(out.matches(INVALID_INPUT).count(), 1);
        assert!(out.contains("Most Frequent Month is : 3"));
        assert!(out.contains("Most Frequent Start Hour is : 8"));
        assert!(out.contains("Most Commonly used Start Station is: Clark St"));
        // 600 + 600 + 900 over the three March trips
        assert!(out.contains("Total Travel Time: 2100"));
        assert!(out.contains("Mean Travel Time: 700"));
        assert!(out.contains("The earliest birth year: 1975"));
        assert_eq!(out.matches("This took").count(), 4);
    }

    #[test]
    fn washington_has_no_demographics() {
        let dir = data_dir();
        let (result, out) = run(dir.path(), "Washington\nall\nall\nno\nno\n");
        result.unwrap();

        assert!(out.contains("Registered"));
        assert!(out.contains("Gender and birth year stats can't be determined for this city."));
        assert!(out.contains(
            "Most Frequent Combination of Start Station and End Station trip : Union Station, Dupont Circle"
        ));
    }

    #[test]
    fn pages_until_table_is_exhausted() {
        let dir = data_dir();
        let (result, out) = run(dir.path(), "chicago\nall\nall\nyes\nyes\nyes\nno\n");
        result.unwrap();

        assert_eq!(out.matches("Do you wish to continue?").count(), 2);
        assert!(out.contains(NO_MORE_ROWS));
        // row 6 only appears on the second page
        assert!(out.contains("2017-05-20 10:00:00"));
        assert!(out.contains("Would you like to restart?"));
    }

    #[test]
    fn declining_stops_paging() {
        let dir = data_dir();
        let (result, out) = run(dir.path(), "chicago\nall\nall\nyes\nno\nno\n");
        result.unwrap();

        assert_eq!(out.matches("Do you wish to continue?").count(), 1);
        assert!(!out.contains("2017-05-20 10:00:00"));
        assert!(!out.contains(NO_MORE_ROWS));
    }

    #[test]
    fn empty_selection_reports_no_data() {
        let dir = data_dir();
        let (result, out) = run(dir.path(), "chicago\nfebruary\nall\nyes\nno\n");
        result.unwrap();

        assert_eq!(out.matches(NO_DATA).count(), 4);
        assert!(out.contains(NO_MORE_ROWS));
    }

    #[test]
    fn restart_runs_another_iteration() {
        let dir = data_dir();
        let (result, out) = run(
            dir.path(),
            "chicago\nall\nsunday\nno\ny\nwashington\nall\nall\nno\nn\n",
        );
        result.unwrap();

        assert_eq!(out.matches(GREETING).count(), 2);
        assert!(out.contains("Most Frequent Day is : Sunday"));
        assert!(out.contains("Casual"));
    }

    #[test]
    fn missing_source_ends_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let (result, _) = run(dir.path(), "new york city\nall\nall\n");
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::MissingSource { .. })
        ));
    }

    #[test]
    fn end_of_input_ends_quietly() {
        let dir = data_dir();
        let (result, out) = run(dir.path(), "chicago\nmar");
        result.unwrap();
        assert!(!out.contains("Calculating"));
    }
}
