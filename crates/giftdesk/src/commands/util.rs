//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::{DateTime, NaiveDate, Utc};

use giftdesk_core::ListQuery;

use crate::cli::ListArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "--yes".into(),
            reason: format!("'{message}' needs confirmation; pass --yes when not interactive"),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Translate list flags into a backend query.
pub fn list_query(args: &ListArgs) -> ListQuery {
    let mut query = ListQuery::new(args.page, args.limit);
    if let Some(ref sort) = args.sort {
        query = query.with_sort(sort.as_str());
    }
    for (key, value) in &args.filter {
        query = query.with_filter(key.as_str(), value.as_str());
    }
    query
}

/// Parse `YYYY-MM-DD` (end of that day, UTC) or an RFC 3339 timestamp.
pub fn parse_expiration(raw: &str) -> Result<DateTime<Utc>, CliError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| CliError::Validation {
            field: "expires".into(),
            reason: format!("expected YYYY-MM-DD or RFC 3339, got '{raw}'"),
        })
}

/// `-` for absent values in detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn expiration_accepts_date_and_timestamp() {
        let day = parse_expiration("2027-05-01").unwrap();
        assert_eq!((day.year(), day.month(), day.day()), (2027, 5, 1));
        assert_eq!(day.hour(), 23);

        let ts = parse_expiration("2027-05-01T10:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 8);

        assert!(parse_expiration("next week").is_err());
    }

    #[test]
    fn list_flags_become_query() {
        let args = ListArgs {
            page: 2,
            limit: 25,
            sort: Some("-createdAt".into()),
            filter: vec![("storeId".into(), "s1".into())],
        };
        let query = list_query(&args);
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, 25);
        assert_eq!(query.sort.as_deref(), Some("-createdAt"));
        assert_eq!(query.filters.get("storeId").map(String::as_str), Some("s1"));
    }
}
