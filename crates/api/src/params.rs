//! Shared query-parameter parsing for the analytics, repo, and research
//! endpoints (spec.md §6). Every endpoint reaches these helpers instead of
//! parsing `start_date`/`end_date`/`page`/`page_size` inline, so validation
//! errors (spec.md §7: `ValidationError` -> 400) look identical everywhere.

use chrono::{NaiveDate, TimeZone, Utc};
use sdlc_synth_domain::{ApiError, DateRange, PageRequest, QueryPredicate};
use serde::Deserialize;

/// Raw query-string shape every team/by-user/repo-scoped endpoint accepts.
/// Fields are all optional at the wire level; validity is enforced in
/// [`CommonQuery::into_predicate`] and [`CommonQuery::page_request`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommonQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    pub repo_name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub format: Option<String>,
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation(format!("{field} must be YYYY-MM-DD, got {raw:?}")))
}

impl CommonQuery {
    /// Builds the half-open `[start_date, end_date)` date range at UTC
    /// midnight (spec.md §6). `None` when neither bound is given.
    pub fn date_range(&self) -> Result<Option<DateRange>, ApiError> {
        if self.start_date.is_none() && self.end_date.is_none() {
            return Ok(None);
        }

        let from = match &self.start_date {
            Some(raw) => Utc.from_utc_datetime(
                &parse_date(raw, "start_date")?.and_hms_opt(0, 0, 0).expect("valid midnight"),
            ),
            None => chrono::DateTime::<Utc>::MIN_UTC,
        };
        let to = match &self.end_date {
            Some(raw) => Utc.from_utc_datetime(
                &parse_date(raw, "end_date")?.and_hms_opt(0, 0, 0).expect("valid midnight"),
            ),
            None => chrono::DateTime::<Utc>::MAX_UTC,
        };

        Ok(Some(DateRange { from, to }))
    }

    pub fn into_predicate(&self, repo_name_override: Option<String>) -> Result<QueryPredicate, ApiError> {
        Ok(QueryPredicate {
            date_range: self.date_range()?,
            user_id: self.user_id.clone(),
            repo_name: repo_name_override.or_else(|| self.repo_name.clone()),
        })
    }

    pub fn page_request(&self) -> Result<PageRequest, ApiError> {
        PageRequest::new(self.page, self.page_size)
    }

    /// `{start_date, end_date, user_id, repo_name, page, page_size}` echoed
    /// verbatim into the response envelope's `params` field (spec.md §6).
    pub fn echo(&self) -> serde_json::Value {
        serde_json::json!({
            "start_date": self.start_date,
            "end_date": self.end_date,
            "user_id": self.user_id,
            "repo_name": self.repo_name,
            "page": self.page,
            "page_size": self.page_size,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FormatQuery {
    pub fn export_format(&self) -> Result<ExportFormat, ApiError> {
        match self.format.as_deref() {
            None | Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            Some(other) => Err(ApiError::Validation(format!(
                "format must be csv or json, got {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_date() {
        let q = CommonQuery {
            start_date: Some("not-a-date".to_string()),
            ..Default::default()
        };
        assert!(matches!(q.date_range(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn empty_query_has_no_date_range() {
        let q = CommonQuery::default();
        assert!(q.date_range().unwrap().is_none());
    }

    #[test]
    fn page_zero_is_a_validation_error() {
        let q = CommonQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(q.page_request(), Err(ApiError::Validation(_))));
    }
}
