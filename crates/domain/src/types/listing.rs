//! Server-owned list rows for the project and report dashboards
//!
//! Rows are read-only on the client. Every change goes through the API and
//! is followed by a refetch.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::serde_helpers::{id_string, opt_id_string};
use crate::impl_domain_status_conversions;

/// Project summary row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "title", alias = "projectName")]
    pub name: String,
    #[serde(default, alias = "createdAt", alias = "created_at")]
    pub date: String,
    #[serde(default, alias = "user", alias = "ownerName")]
    pub owner: String,
    #[serde(default, alias = "canArchive", alias = "isArchivable")]
    pub archivable: bool,
    #[serde(default, alias = "reportsCount")]
    pub report_count: Option<u64>,
}

/// Report summary row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub project_id: Option<String>,
    #[serde(alias = "name", alias = "reportName")]
    pub title: String,
    #[serde(default, alias = "createdAt", alias = "created_at")]
    pub date: String,
    #[serde(default, alias = "owner", alias = "userName")]
    pub user: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "canArchive", alias = "isArchivable")]
    pub archivable: bool,
}

/// Column a list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Title,
    Date,
    Owner,
    Count,
}

/// Comparable projection of a row field
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Date(Option<DateTime<Utc>>),
    Number(f64),
    Absent,
}

impl SortValue {
    /// Build a date value; unparseable input becomes `Date(None)`.
    pub fn date(raw: &str) -> Self {
        Self::Date(parse_instant(raw))
    }

    /// Total ordering used by list views.
    ///
    /// Text compares case-insensitively, dates by instant (unparseable dates
    /// first), numbers numerically. `Absent` orders before everything.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Absent, Self::Absent) => Ordering::Equal,
            (Self::Absent, _) => Ordering::Less,
            (_, Self::Absent) => Ordering::Greater,
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Absent => 0,
            Self::Number(_) => 1,
            Self::Date(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Behaviour shared by every dashboard row type
pub trait ListRow: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn archivable(&self) -> bool;
    fn sort_value(&self, key: SortKey) -> SortValue;
}

impl ListRow for ProjectSummary {
    fn id(&self) -> &str {
        &self.id
    }

    fn archivable(&self) -> bool {
        self.archivable
    }

    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Title => SortValue::Text(self.name.clone()),
            SortKey::Date => SortValue::date(&self.date),
            SortKey::Owner => SortValue::Text(self.owner.clone()),
            SortKey::Count => {
                self.report_count.map_or(SortValue::Absent, |n| SortValue::Number(n as f64))
            }
        }
    }
}

impl ListRow for ReportSummary {
    fn id(&self) -> &str {
        &self.id
    }

    fn archivable(&self) -> bool {
        self.archivable
    }

    fn sort_value(&self, key: SortKey) -> SortValue {
        match key {
            SortKey::Title => SortValue::Text(self.title.clone()),
            SortKey::Date => SortValue::date(&self.date),
            SortKey::Owner => SortValue::Text(self.user.clone()),
            SortKey::Count => SortValue::Absent,
        }
    }
}

/// Active or archived collection of a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListTab {
    #[default]
    Active,
    Archived,
}

impl_domain_status_conversions!(ListTab {
    Active => "active",
    Archived => "archived",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_row_accepts_numeric_id_and_aliases() {
        let row: ProjectSummary = serde_json::from_value(serde_json::json!({
            "id": 12,
            "title": "Leadership 2024",
            "createdAt": "2024-03-01T10:00:00Z",
            "user": "dana",
            "canArchive": true
        }))
        .unwrap();

        assert_eq!(row.id, "12");
        assert_eq!(row.name, "Leadership 2024");
        assert!(row.archivable);
        assert_eq!(row.report_count, None);
    }

    #[test]
    fn text_comparison_ignores_case() {
        let a = SortValue::Text("A".into());
        let b = SortValue::Text("b".into());
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
    }

    #[test]
    fn dates_compare_by_instant_across_formats() {
        let day = SortValue::date("2024-01-02");
        let earlier = SortValue::date("2024-01-01T23:59:59+00:00");
        assert_eq!(earlier.compare(&day), Ordering::Less);

        let garbage = SortValue::date("yesterday");
        assert_eq!(garbage, SortValue::Date(None));
        assert_eq!(garbage.compare(&earlier), Ordering::Less);
    }

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(SortValue::Number(9.0).compare(&SortValue::Number(10.0)), Ordering::Less);
        assert_eq!(SortValue::Absent.compare(&SortValue::Number(0.0)), Ordering::Less);
    }

    #[test]
    fn list_tab_parses_case_insensitively() {
        assert_eq!("Archived".parse::<ListTab>().unwrap(), ListTab::Archived);
        assert_eq!(ListTab::Active.to_string(), "active");
    }
}
