//! The fifteen recession windows used by the employment peak plot.
//!
//! Each search range is the span in which the pre-recession employment peak is
//! looked for: usually two months either side of the NBER peak month. The 1937
//! window is a single month because only the July 1 annual average exists
//! there, and the 1990 and 1973 windows are wider because payrolls kept rising
//! well past the NBER peak.

use chrono::NaiveDate;

use crate::domain::RecessionWindow;
use crate::error::AppError;

/// (year label, year-month label, begin month, search from (y, m), search to (y, m))
type WindowRow = (&'static str, &'static str, &'static str, (i32, u32), (i32, u32));

const WINDOWS: [WindowRow; 15] = [
    ("1929-1933", "Aug 1929 - Mar 1933", "Aug 1929", (1929, 7), (1929, 10)),
    ("1937-1938", "May 1937 - Jun 1938", "May 1937", (1937, 7), (1937, 7)),
    ("1945", "Feb 1945 - Oct 1945", "Feb 1945", (1945, 1), (1945, 3)),
    ("1948-1949", "Nov 1948 - Oct 1949", "Nov 1948", (1948, 9), (1949, 1)),
    ("1953-1954", "Jul 1953 - May 1954", "Jul 1953", (1953, 6), (1953, 8)),
    ("1957-1958", "Aug 1957 - Apr 1958", "Aug 1957", (1957, 7), (1957, 9)),
    ("1960-1961", "Apr 1960 - Feb 1961", "Apr 1960", (1960, 3), (1960, 5)),
    ("1969-1970", "Dec 1969 - Nov 1970", "Dec 1969", (1969, 11), (1970, 3)),
    ("1973-1975", "Nov 1973 - Mar 1975", "Nov 1973", (1973, 10), (1974, 7)),
    ("1980", "Jan 1980 - Jul 1980", "Jan 1980", (1979, 12), (1980, 3)),
    ("1981-1982", "Jul 1981 - Nov 1982", "Jul 1981", (1981, 6), (1981, 8)),
    ("1990-1991", "Jul 1990 - Mar 1991", "Jul 1990", (1990, 6), (1991, 8)),
    ("2001", "Mar 2001 - Nov 2001", "Mar 2001", (2001, 2), (2001, 4)),
    ("2007-2009", "Dec 2007 - Jun 2009", "Dec 2007", (2007, 11), (2008, 1)),
    ("2020-2020", "Feb 2020 - Apr 2020", "Feb 2020", (2020, 1), (2020, 3)),
];

/// The employment pipeline's recession windows, oldest first.
pub fn employment_windows() -> Result<Vec<RecessionWindow>, AppError> {
    WINDOWS
        .iter()
        .map(|&(label, label_yrmth, begin_yrmth, from, to)| {
            Ok(RecessionWindow {
                label: label.to_string(),
                label_yrmth: label_yrmth.to_string(),
                begin_yrmth: begin_yrmth.to_string(),
                search_from: month_start(from)?,
                search_to: month_start(to)?,
            })
        })
        .collect()
}

fn month_start((year, month): (i32, u32)) -> Result<NaiveDate, AppError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::input(format!("Invalid recession window month {year}-{month:02}.")))
}
