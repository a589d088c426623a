//! Label selector matching for list and delete-collection filters
//!
//! Selector strings are parsed into `kube::core::Selector` and matched with
//! `SelectorExt`. Supported requirements, joined by commas with AND semantics:
//! `key=value`, `key==value`, `key!=value`, `key in (a,b)`, `key notin (a,b)`,
//! `key` and `!key`.

use crate::{Error, Result};
use kube::core::{Expression, Selector, SelectorExt};
use std::collections::{BTreeMap, BTreeSet};

/// Split on commas that are not inside a value set
fn requirements(selector: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0usize;
    selector
        .split(move |c: char| match c {
            '(' => {
                depth += 1;
                false
            }
            ')' => {
                depth = depth.saturating_sub(1);
                false
            }
            ',' => depth == 0,
            _ => false,
        })
        .map(str::trim)
        .filter(|r| !r.is_empty())
}

fn invalid(requirement: &str, reason: &str) -> Error {
    Error::InvalidRequest(format!(
        "unable to parse label selector requirement {:?}: {}",
        requirement, reason
    ))
}

fn value_set(requirement: &str, values: &str) -> Result<BTreeSet<String>> {
    let inner = values
        .trim()
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| invalid(requirement, "expected a parenthesized value set"))?;

    Ok(inner
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

fn parse_requirement(requirement: &str) -> Result<Expression> {
    if let Some(key) = requirement.strip_prefix('!') {
        return Ok(Expression::DoesNotExist(key.trim().to_string()));
    }

    let mut words = requirement.splitn(2, char::is_whitespace);
    let head = words.next().unwrap_or_default();
    if let Some(rest) = words.next() {
        let rest = rest.trim_start();
        if let Some(values) = rest.strip_prefix("notin") {
            return Ok(Expression::NotIn(
                head.to_string(),
                value_set(requirement, values)?,
            ));
        }
        if let Some(values) = rest.strip_prefix("in") {
            return Ok(Expression::In(
                head.to_string(),
                value_set(requirement, values)?,
            ));
        }
    }

    let (key, value, negated) = if let Some((k, v)) = requirement.split_once("!=") {
        (k, v, true)
    } else if let Some((k, v)) = requirement.split_once("==") {
        (k, v, false)
    } else if let Some((k, v)) = requirement.split_once('=') {
        (k, v, false)
    } else {
        if requirement.contains(char::is_whitespace) {
            return Err(invalid(requirement, "unknown operator"));
        }
        return Ok(Expression::Exists(requirement.to_string()));
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(invalid(requirement, "missing key"));
    }
    let values = BTreeSet::from([value.trim().to_string()]);
    Ok(if negated {
        Expression::NotIn(key.to_string(), values)
    } else {
        Expression::In(key.to_string(), values)
    })
}

/// Parse a label selector string; an empty string selects everything
pub fn parse_label_selector(selector: &str) -> Result<Selector> {
    requirements(selector)
        .map(parse_requirement)
        .collect::<Result<Vec<_>>>()
        .map(Selector::from_iter)
}

/// Match a label set against a selector string
///
/// ```
/// use std::collections::BTreeMap;
/// use kube_error_injector::label_selector::matches_label_selector;
///
/// let labels = BTreeMap::from([("test-label".to_string(), "label-value".to_string())]);
///
/// assert!(matches_label_selector(&labels, "test-label=label-value").unwrap());
/// assert!(matches_label_selector(&labels, "test-label").unwrap());
/// assert!(!matches_label_selector(&labels, "!test-label").unwrap());
/// ```
pub fn matches_label_selector(labels: &BTreeMap<String, String>, selector: &str) -> Result<bool> {
    Ok(parse_label_selector(selector)?.matches(labels))
}
