use chrono::{DateTime, Utc};

use crate::common::error::{CurateError, Result};

/// One capture listed by a TimeMap.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMapEntry {
    pub urim: String,
    pub datetime: Option<DateTime<Utc>>,
}

/// Structured form of an RFC 7089 link-format TimeMap body.
#[derive(Debug, Clone, Default)]
pub struct TimeMap {
    pub original_uri: Option<String>,
    pub timemap_uri: Option<String>,
    pub mementos: Vec<TimeMapEntry>,
}

/// Parses an application/link-format TimeMap body into a [`TimeMap`].
///
/// Entries with unknown rels are ignored; mementos with a missing or
/// malformed datetime attribute are kept with `datetime: None`.
pub fn parse_link_timemap(body: &str) -> Result<TimeMap> {
    let mut timemap = TimeMap::default();

    for entry in split_outside_quotes(body, ',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let mut parts = split_outside_quotes(entry, ';').into_iter();
        let uri = match parts.next() {
            Some(target) => {
                let target = target.trim();
                if !target.starts_with('<') || !target.ends_with('>') {
                    continue;
                }
                target[1..target.len() - 1].to_string()
            }
            None => continue,
        };

        let mut rel = String::new();
        let mut datetime = None;
        for attr in parts {
            let Some((key, value)) = attr.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match key.trim() {
                "rel" => rel = value.to_string(),
                "datetime" => datetime = parse_memento_datetime(value),
                _ => {}
            }
        }

        let rels: Vec<&str> = rel.split_whitespace().collect();
        if rels.contains(&"original") {
            timemap.original_uri = Some(uri);
        } else if rels.contains(&"self") || rels.contains(&"timemap") {
            timemap.timemap_uri = Some(uri);
        } else if rels.contains(&"memento") {
            timemap.mementos.push(TimeMapEntry { urim: uri, datetime });
        }
    }

    if timemap.original_uri.is_none() && timemap.timemap_uri.is_none() && timemap.mementos.is_empty()
    {
        return Err(CurateError::TimeMapParse(
            "no link-format entries found".to_string(),
        ));
    }

    Ok(timemap)
}

/// Parses an RFC 1123 `Memento-Datetime` value, e.g.
/// `Tue, 21 Mar 2016 18:00:00 GMT`.
pub fn parse_memento_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Splits on `separator` while respecting double-quoted spans, since
/// link-format datetime attributes contain both commas and the separator
/// characters of the surrounding grammar.
fn split_outside_quotes(input: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            c if c == separator && !in_quotes => {
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
