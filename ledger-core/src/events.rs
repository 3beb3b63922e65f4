//! Group events: drafts, ordering and month grouping

use crate::store::EventStore;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Location used when none is given
pub const DEFAULT_LOCATION: &str = "Non spécifié";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// An event not yet stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    name: String,
    starts_on: NaiveDate,
    time: Option<String>,
    location: String,
}

impl EventDraft {
    /// Build a draft. The name must not be blank; a blank location becomes
    /// [`DEFAULT_LOCATION`].
    pub fn new(
        name: impl Into<String>,
        starts_on: NaiveDate,
        time: Option<String>,
        location: Option<String>,
    ) -> crate::Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Event name must not be empty".to_string(),
            ));
        }

        let location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        Ok(Self {
            name,
            starts_on,
            time: time.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            location,
        })
    }

    /// Event name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start date
    pub fn starts_on(&self) -> NaiveDate {
        self.starts_on
    }

    /// Start time as entered
    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    /// Location, never blank
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// A stored event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned ID
    pub id: Uuid,

    /// Event name
    pub name: String,

    /// Start date
    pub starts_on: NaiveDate,

    /// Start time as entered (free text)
    pub time: Option<String>,

    /// Where it happens
    pub location: String,
}

impl Event {
    /// Materialize a draft with a store-assigned ID
    pub fn from_draft(draft: EventDraft, id: Uuid) -> Self {
        Self {
            id,
            name: draft.name,
            starts_on: draft.starts_on,
            time: draft.time,
            location: draft.location,
        }
    }

    /// Month bucket this event falls in
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.starts_on)
    }
}

/// Calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    /// Year
    pub year: i32,
    /// Month, 1-12
    pub month: u32,
}

impl YearMonth {
    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        write!(f, "{} {}", name, self.year)
    }
}

/// Order events by start date, earliest first (stable)
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(|e| e.starts_on);
}

/// Group events by month, months in chronological order.
///
/// Within a month events keep the order they were given in.
pub fn group_by_month(events: &[Event]) -> Vec<(YearMonth, Vec<Event>)> {
    let mut groups: Vec<(YearMonth, Vec<Event>)> = Vec::new();
    let mut months: Vec<YearMonth> = events.iter().map(Event::month).collect();
    months.sort();
    months.dedup();

    for month in months {
        let in_month = events.iter().filter(|e| e.month() == month).cloned().collect();
        groups.push((month, in_month));
    }

    groups
}

/// Events starting strictly after `today`, in the order given.
///
/// An event happening today is no longer listed as upcoming.
pub fn upcoming(events: &[Event], today: NaiveDate) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.starts_on > today)
        .cloned()
        .collect()
}

/// Fetch every event from `store`, grouped by month
pub async fn agenda<E>(store: &E) -> crate::Result<Vec<(YearMonth, Vec<Event>)>>
where
    E: EventStore + ?Sized,
{
    let events = store.list_events().await?;
    tracing::debug!(count = events.len(), "Events fetched");
    Ok(group_by_month(&events))
}

/// Fetch the events starting after `today`, grouped by month
pub async fn upcoming_agenda<E>(
    store: &E,
    today: NaiveDate,
) -> crate::Result<Vec<(YearMonth, Vec<Event>)>>
where
    E: EventStore + ?Sized,
{
    let events = upcoming(&store.list_events().await?, today);
    tracing::debug!(count = events.len(), %today, "Upcoming events fetched");
    Ok(group_by_month(&events))
}
