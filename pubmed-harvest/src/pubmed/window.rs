//! Date windows for ESearch `mindate`/`maxdate` filtering
//!
//! A [`DateWindow`] is an inclusive `[min, max]` range at day precision. The
//! partitioner splits a window along one [`Granularity`] at a time, always the
//! coarsest one whose bounds differ.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{PubMedError, Result};

/// One end of a date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DateBound {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

impl DateBound {
    /// Create a validated bound (month 1-12, day 1-31)
    pub fn new(year: u32, month: u32, day: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(PubMedError::InvalidDateWindow {
                message: format!("month {} out of range 1-12", month),
            });
        }
        if !(1..=31).contains(&day) {
            return Err(PubMedError::InvalidDateWindow {
                message: format!("day {} out of range 1-31", day),
            });
        }
        Ok(Self { year, month, day })
    }

    /// Parse `YYYY`, `YYYY/MM` or `YYYY/MM/DD`, filling missing parts with the
    /// earliest month/day
    ///
    /// ```
    /// use pubmed_harvest::DateBound;
    ///
    /// assert_eq!(DateBound::parse_lower("2020/03").unwrap().to_pubmed_string(), "2020/03/01");
    /// assert_eq!(DateBound::parse_upper("2020").unwrap().to_pubmed_string(), "2020/12/31");
    /// ```
    pub fn parse_lower(s: &str) -> Result<Self> {
        Self::parse_with_defaults(s, 1, 1)
    }

    /// Parse like [`DateBound::parse_lower`], filling missing parts with the
    /// latest month/day
    pub fn parse_upper(s: &str) -> Result<Self> {
        Self::parse_with_defaults(s, 12, 31)
    }

    fn parse_with_defaults(s: &str, month: u32, day: u32) -> Result<Self> {
        let invalid = || PubMedError::InvalidDateWindow {
            message: format!("cannot parse date '{}', expected YYYY[/MM[/DD]]", s),
        };

        let parts = s
            .trim()
            .split('/')
            .map(|part| part.trim().parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        match parts.as_slice() {
            [year] => Self::new(*year, month, day),
            [year, month] => Self::new(*year, *month, day),
            [year, month, day] => Self::new(*year, *month, *day),
            _ => Err(invalid()),
        }
    }

    /// Format as an E-utilities date (`YYYY/MM/DD`)
    pub fn to_pubmed_string(&self) -> String {
        format!("{}/{:02}/{:02}", self.year, self.month, self.day)
    }

    fn component(&self, granularity: Granularity) -> u32 {
        match granularity {
            Granularity::Year => self.year,
            Granularity::Month => self.month,
            Granularity::Day => self.day,
        }
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pubmed_string())
    }
}

impl FromStr for DateBound {
    type Err = PubMedError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_lower(s)
    }
}

/// Date component a window is split along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
    Day,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Day => "day",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive date range attached to a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateWindow {
    min: DateBound,
    max: DateBound,
}

/// Result of splitting a window along one granularity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSplit {
    /// Sub-windows in ascending order of their start
    pub windows: Vec<DateWindow>,
    /// Inclusive ranges of the split component that no sub-window covers
    pub uncovered: Vec<(u32, u32)>,
}

impl DateWindow {
    /// Create a window, rejecting `min > max`
    pub fn new(min: DateBound, max: DateBound) -> Result<Self> {
        if min > max {
            return Err(PubMedError::InvalidDateWindow {
                message: format!("start {} is after end {}", min, max),
            });
        }
        Ok(Self { min, max })
    }

    /// Whole years `start..=end`
    ///
    /// ```
    /// use pubmed_harvest::DateWindow;
    ///
    /// let window = DateWindow::years(2019, 2021).unwrap();
    /// assert_eq!(window.to_string(), "2019/01/01:2021/12/31");
    /// ```
    pub fn years(start: u32, end: u32) -> Result<Self> {
        Self::new(DateBound::new(start, 1, 1)?, DateBound::new(end, 12, 31)?)
    }

    pub fn min(&self) -> DateBound {
        self.min
    }

    pub fn max(&self) -> DateBound {
        self.max
    }

    pub fn contains(&self, date: &DateBound) -> bool {
        self.min <= *date && *date <= self.max
    }

    /// Coarsest granularity whose bounds differ, `None` for a single day
    pub fn split_granularity(&self) -> Option<Granularity> {
        if self.min.year != self.max.year {
            Some(Granularity::Year)
        } else if self.min.month != self.max.month {
            Some(Granularity::Month)
        } else if self.min.day != self.max.day {
            Some(Granularity::Day)
        } else {
            None
        }
    }

    /// Split into roughly `batch_count` sub-windows along `granularity`
    ///
    /// With span `lo..=hi` and `step = (hi - lo) / batch_count`, boundaries are
    /// `lo + step * i` for `i < batch_count`. The first sub-window starts at
    /// `lo`, every later one at `boundary + 1`, and each ends at
    /// `boundary + step`. One extra sub-window pinned to `hi` is always
    /// appended; when the division is exact it repeats the last value of the
    /// final boundary window. Values this scheme skips are reported in
    /// [`WindowSplit::uncovered`] rather than patched in.
    pub fn split(&self, granularity: Granularity, batch_count: usize) -> WindowSplit {
        let lo = self.min.component(granularity);
        // Only meaningful for the level `split_granularity` picks; clamp otherwise
        let hi = self.max.component(granularity).max(lo);
        let count = u32::try_from(batch_count.max(1)).unwrap_or(u32::MAX);

        let gap = hi - lo;
        let step = gap / count;

        let boundaries: Vec<u32> = if step == 0 {
            vec![lo]
        } else {
            (0..count)
                .map(|i| lo.saturating_add(step.saturating_mul(i)))
                .collect()
        };

        let mut ranges: Vec<(u32, u32)> = boundaries
            .into_iter()
            .map(|b| {
                let from = if b == lo { lo } else { b.saturating_add(1) };
                (from, b.saturating_add(step))
            })
            .collect();
        ranges.push((hi, hi));

        // First value not covered yet; `None` once coverage reaches u32::MAX
        let mut uncovered = Vec::new();
        let mut next = Some(lo);
        for &(from, to) in &ranges {
            let Some(pending) = next else { break };
            if from > pending {
                uncovered.push((pending, from - 1));
            }
            if to >= pending {
                next = to.checked_add(1);
            }
        }
        if let Some(pending) = next.filter(|&pending| pending <= hi) {
            uncovered.push((pending, hi));
        }

        let windows = ranges
            .into_iter()
            .map(|(from, to)| self.sub_window(granularity, from, to))
            .collect();

        WindowSplit { windows, uncovered }
    }

    /// Sub-window covering `from..=to` of `granularity`; outer edges keep the
    /// parent's finer bounds
    fn sub_window(&self, granularity: Granularity, from: u32, to: u32) -> DateWindow {
        let (min, max) = match granularity {
            Granularity::Year => (
                if from == self.min.year {
                    self.min
                } else {
                    DateBound { year: from, month: 1, day: 1 }
                },
                if to == self.max.year {
                    self.max
                } else {
                    DateBound { year: to, month: 12, day: 31 }
                },
            ),
            Granularity::Month => {
                let year = self.min.year;
                (
                    if from == self.min.month {
                        self.min
                    } else {
                        DateBound { year, month: from, day: 1 }
                    },
                    if to == self.max.month {
                        self.max
                    } else {
                        DateBound { year, month: to, day: 31 }
                    },
                )
            }
            Granularity::Day => {
                let (year, month) = (self.min.year, self.min.month);
                (
                    DateBound { year, month, day: from },
                    DateBound { year, month, day: to },
                )
            }
        };

        DateWindow { min, max }
    }
}

impl Default for DateWindow {
    /// 1000/01/01 through 3000/12/31
    fn default() -> Self {
        Self {
            min: DateBound { year: 1000, month: 1, day: 1 },
            max: DateBound { year: 3000, month: 12, day: 31 },
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.min, self.max)
    }
}
