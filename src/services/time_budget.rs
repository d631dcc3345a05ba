//! Which unread items fit into a spare moment.

use thiserror::Error;
use tracing::warn;

use crate::db::entities::tsundoku;

/// Only web articles carry a duration worth filtering on.
pub const TIMED_CATEGORY: &str = "site";
pub const MINUTE_SUFFIX: &str = "min";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequiredTimeError {
    #[error("required time is empty")]
    Empty,
    #[error("required time {0:?} is not a whole number of minutes like \"30min\"")]
    Malformed(String),
}

/// Parses `"30min"`, `"30 min"` or a bare `"30"` into minutes.
pub fn parse_required_minutes(raw: &str) -> Result<u32, RequiredTimeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RequiredTimeError::Empty);
    }
    let digits = trimmed
        .strip_suffix(MINUTE_SUFFIX)
        .map(str::trim_end)
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RequiredTimeError::Malformed(raw.to_string()));
    }
    digits
        .parse::<u32>()
        .map_err(|_| RequiredTimeError::Malformed(raw.to_string()))
}

/// Canonical stored form, e.g. `"30 min"` becomes `"30min"`.
pub fn normalize_required_time(raw: &str) -> Result<String, RequiredTimeError> {
    parse_required_minutes(raw).map(|minutes| format!("{minutes}{MINUTE_SUFFIX}"))
}

/// True when the item is a "site" that can be read within `budget_minutes`.
pub fn fits_budget(item: &tsundoku::Model, budget_minutes: u32) -> bool {
    if item.category != TIMED_CATEGORY {
        return false;
    }
    match parse_required_minutes(&item.required_time) {
        Ok(minutes) => minutes <= budget_minutes,
        Err(e) => {
            // Stored values are validated on insert; anything else predates that.
            warn!(tsundoku_id = item.id, error = %e, "Skipping tsundoku with unparseable required time.");
            false
        }
    }
}

/// Stable filter: keeps input order.
pub fn free_items<T: AsRef<tsundoku::Model>>(items: Vec<T>, budget_minutes: u32) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| fits_budget(item.as_ref(), budget_minutes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: i32, category: &str, required_time: &str) -> tsundoku::Model {
        let now = Utc::now();
        tsundoku::Model {
            id,
            user_id: 1,
            title: format!("item {id}"),
            category: category.to_string(),
            required_time: required_time.to_string(),
            deadline: None,
            url: None,
            author: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(items: &[tsundoku::Model]) -> Vec<i32> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_parse_required_minutes() {
        assert_eq!(parse_required_minutes("30min"), Ok(30));
        assert_eq!(parse_required_minutes(" 30 min "), Ok(30));
        assert_eq!(parse_required_minutes("0min"), Ok(0));
        assert_eq!(parse_required_minutes("45"), Ok(45));
    }

    #[test]
    fn test_parse_required_minutes_rejects_garbage() {
        assert_eq!(parse_required_minutes(""), Err(RequiredTimeError::Empty));
        assert_eq!(parse_required_minutes("   "), Err(RequiredTimeError::Empty));
        for raw in ["min", "abc", "-5min", "1.5min", "30h", "30minmin", "99999999999min"] {
            assert!(
                matches!(parse_required_minutes(raw), Err(RequiredTimeError::Malformed(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn test_normalize_required_time() {
        assert_eq!(normalize_required_time("15").unwrap(), "15min");
        assert_eq!(normalize_required_time("15 min").unwrap(), "15min");
        assert!(normalize_required_time("soon").is_err());
    }

    #[test]
    fn test_budget_boundary_scenario() {
        let items = vec![item(1, "site", "45min")];
        assert!(free_items(items.clone(), 30).is_empty());
        assert_eq!(ids(&free_items(items.clone(), 45)), vec![1]);
        assert_eq!(ids(&free_items(items, 60)), vec![1]);
    }

    #[test]
    fn test_non_site_categories_never_qualify() {
        let items = vec![item(1, "book", "1min"), item(2, "video", "0min")];
        assert!(free_items(items.clone(), 0).is_empty());
        assert!(free_items(items, u32::MAX).is_empty());
    }

    #[test]
    fn test_filter_keeps_input_order() {
        let items = vec![
            item(3, "site", "10min"),
            item(1, "site", "50min"),
            item(2, "book", "5min"),
            item(5, "site", "5min"),
            item(4, "site", "20min"),
        ];
        assert_eq!(ids(&free_items(items, 20)), vec![3, 5, 4]);
    }

    #[test]
    fn test_unparseable_stored_value_is_skipped() {
        let items = vec![item(1, "site", "later"), item(2, "site", "5min")];
        assert_eq!(ids(&free_items(items, 100)), vec![2]);
    }

    #[test]
    fn test_inclusion_matches_comparison_for_every_budget() {
        for n in [0u32, 1, 29, 30, 31, 120] {
            let items = vec![item(1, "site", &format!("{n}min"))];
            for budget in [0u32, 1, 30, 60, 200] {
                assert_eq!(free_items(items.clone(), budget).len() == 1, n <= budget);
            }
        }
    }
}
