use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;
use crate::core::job::{TrainingJob, TrainingJobStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    Name,
    #[default]
    CreationTime,
    Status,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Name" => Ok(Self::Name),
            "CreationTime" => Ok(Self::CreationTime),
            "Status" => Ok(Self::Status),
            other => Err(format!(
                "Value '{}' at 'sortBy' failed to satisfy constraint: Member must satisfy enum value set: [Name, CreationTime, Status]",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ascending" => Ok(Self::Ascending),
            "Descending" => Ok(Self::Descending),
            other => Err(format!(
                "Value '{}' at 'sortOrder' failed to satisfy constraint: Member must satisfy enum value set: [Ascending, Descending]",
                other
            )),
        }
    }
}

/// Filter and sort parameters for listing training jobs.
///
/// Every predicate is optional; set predicates are AND-combined and the time
/// bounds are strict.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub name_contains: Option<String>,
    pub status_equals: Option<TrainingJobStatus>,
    pub creation_time_before: Option<DateTime<Utc>>,
    pub creation_time_after: Option<DateTime<Utc>>,
    pub last_modified_time_before: Option<DateTime<Utc>>,
    pub last_modified_time_after: Option<DateTime<Utc>>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl ListQuery {
    pub fn matches(&self, job: &TrainingJob) -> bool {
        if let Some(fragment) = &self.name_contains {
            if !job.name().contains(fragment.as_str()) {
                return false;
            }
        }
        if let Some(status) = self.status_equals {
            if job.status != status {
                return false;
            }
        }
        if self.creation_time_before.is_some_and(|t| job.creation_time >= t) {
            return false;
        }
        if self.creation_time_after.is_some_and(|t| job.creation_time <= t) {
            return false;
        }
        if self.last_modified_time_before.is_some_and(|t| job.last_modified_time >= t) {
            return false;
        }
        if self.last_modified_time_after.is_some_and(|t| job.last_modified_time <= t) {
            return false;
        }
        true
    }

    pub fn compare(&self, a: &TrainingJob, b: &TrainingJob) -> Ordering {
        let ordering = match self.sort_by {
            SortBy::Name => a.name().cmp(b.name()),
            SortBy::CreationTime => a.creation_time.cmp(&b.creation_time),
            SortBy::Status => a
                .status
                .as_str()
                .cmp(b.status.as_str())
                .then_with(|| a.creation_time.cmp(&b.creation_time)),
        };
        match self.sort_order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}
