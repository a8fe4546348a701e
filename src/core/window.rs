//! Update-time window - restricts which records are listed and analyzed

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::record::{Component, Workflow};

/// Inclusive `updated_at` range; an absent bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl UpdateWindow {
    /// Window from calendar dates: start of `since` through end of `until` (UTC)
    pub fn from_dates(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self {
            start: since
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
            end: until
                .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
                .map(|dt| dt.and_utc()),
        }
    }

    /// No bound set - every record passes, even without a timestamp
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a record with this `updated_at` falls in the window
    ///
    /// Once any bound is set, records without a timestamp are excluded.
    pub fn contains(&self, updated_at: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(ts) = updated_at else {
            return false;
        };
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts <= end)
    }

    /// Components whose `updated_at` falls in the window, in input order
    pub fn filter_components<'c, I>(&self, components: I) -> Vec<&'c Component>
    where
        I: IntoIterator<Item = &'c Component>,
    {
        components
            .into_iter()
            .filter(|c| self.contains(c.updated_at))
            .collect()
    }

    pub fn filter_workflows(&self, workflows: &[Workflow]) -> Vec<Workflow> {
        workflows
            .iter()
            .filter(|w| self.contains(w.component.updated_at))
            .cloned()
            .collect()
    }
}
