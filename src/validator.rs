use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::data_models::SearchRequest;
use crate::errors::InvalidArgument;

pub const DEFAULT_DELAY_SECS: f64 = 2.0;

/// Turns raw query-string pairs into a [`SearchRequest`].
///
/// Pure: nothing is fetched and nothing is logged, so validating the same input
/// twice gives the same answer.
pub fn validate(raw: &HashMap<String, String>) -> Result<SearchRequest, InvalidArgument> {
    let query = raw
        .get("q")
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .ok_or(InvalidArgument::MissingQuery)?
        .to_string();

    let start_page: i64 = parse_or(raw, "page", "an integer", 1)?;
    let page_count: i64 = parse_or(raw, "pages", "an integer", 1)?;
    if start_page < 1 || page_count < 1 {
        return Err(InvalidArgument::NonPositivePageRange);
    }
    let start_page = u32::try_from(start_page).map_err(|_| InvalidArgument::PageRangeOverflow)?;
    let page_count = u32::try_from(page_count).map_err(|_| InvalidArgument::PageRangeOverflow)?;
    if start_page.checked_add(page_count - 1).is_none() {
        return Err(InvalidArgument::PageRangeOverflow);
    }

    let detail = raw
        .get("detail")
        .map(|d| matches!(d.trim().to_lowercase().as_str(), "true" | "1"))
        .unwrap_or(false);

    let limit = match non_empty(raw, "limit") {
        None => None,
        Some(value) => Some(value.parse::<usize>().map_err(|_| InvalidArgument::Malformed {
            name: "limit",
            expected: "a non-negative integer",
            value: value.to_string(),
        })?),
    };

    let delay_secs: f64 = parse_or(raw, "delay", "a number of seconds", DEFAULT_DELAY_SECS)?;
    if delay_secs.is_nan() || delay_secs.is_infinite() {
        return Err(InvalidArgument::Malformed {
            name: "delay",
            expected: "a finite number of seconds",
            value: delay_secs.to_string(),
        });
    }
    if delay_secs < 0.0 {
        return Err(InvalidArgument::NegativeDelay);
    }
    if Duration::try_from_secs_f64(delay_secs).is_err() {
        return Err(InvalidArgument::Malformed {
            name: "delay",
            expected: "a representable number of seconds",
            value: delay_secs.to_string(),
        });
    }

    Ok(SearchRequest {
        query,
        start_page,
        page_count,
        detail,
        limit,
        delay_secs,
    })
}

fn non_empty<'a>(raw: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    raw.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(
    raw: &HashMap<String, String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, InvalidArgument> {
    match non_empty(raw, name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| InvalidArgument::Malformed {
            name,
            expected,
            value: value.to_string(),
        }),
    }
}
