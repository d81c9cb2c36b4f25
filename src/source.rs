//! Reading search result pages into track records.
//!
//! Accepts the shapes the search backend produces: the relay response
//! `{"songs": [...]}`, a raw API page `{"data": {"items": [...]}}`, or a bare
//! array of items. A relay error body `{"error": "..."}` is reported as an
//! error rather than read as an empty page.
//!
//! Items are read one at a time. An item that cannot be read at all (a
//! non-string performer, a number in place of an object) is kept as an empty
//! record, so the pipeline counts it as malformed and the rest of the page
//! survives.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::models::TrackRecord;

/// Pages fetched per query upstream; more than this is refused.
pub const MAX_PAGES: usize = 3;

#[derive(Deserialize)]
struct ApiData {
    #[serde(default)]
    items: Option<Vec<Value>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Relay { songs: Vec<Value> },
    Failure { error: String },
    // `data` is a required `Value` so unrelated objects do not read as empty pages
    Page { data: Value },
    Items(Vec<Value>),
}

/// Read one item; unreadable items become empty (malformed) records.
fn read_item(position: usize, item: Value) -> TrackRecord {
    match serde_json::from_value(item) {
        Ok(record) => record,
        Err(e) => {
            log::warn!("Unreadable item {}: {}", position, e);
            TrackRecord::default()
        }
    }
}

/// Parse one JSON document into records, in document order.
pub fn parse_records(json: &str) -> Result<Vec<TrackRecord>> {
    let payload: Payload =
        serde_json::from_str(json).context("Unrecognized search payload")?;
    let items = match payload {
        Payload::Relay { songs } => songs,
        Payload::Failure { error } => bail!("Search backend returned an error: {}", error),
        Payload::Page { data } => {
            let data: Option<ApiData> =
                serde_json::from_value(data).context("Malformed data field")?;
            data.and_then(|d| d.items).unwrap_or_default()
        }
        Payload::Items(items) => items,
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(position, item)| read_item(position, item))
        .collect())
}

fn read_page(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Read and concatenate pages in the order given. No paths means stdin.
pub fn read_records(paths: &[PathBuf]) -> Result<Vec<TrackRecord>> {
    if paths.len() > MAX_PAGES {
        bail!(
            "At most {} pages per query, got {}",
            MAX_PAGES,
            paths.len()
        );
    }

    let stdin = [PathBuf::from("-")];
    let paths = if paths.is_empty() { &stdin[..] } else { paths };

    let mut records = Vec::new();
    for path in paths {
        let json = read_page(path)?;
        let page = parse_records(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!("Read {} records from {}", page.len(), path.display());
        records.extend(page);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_relay_shape() {
        let json = r#"{"songs": [{"n": "Hello", "k": "A Minor", "as": ["Adele"]}]}"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records, vec![TrackRecord::new("Hello", "A Minor", &["Adele"])]);
    }

    #[test]
    fn test_parse_api_page_shape() {
        let json = r#"{"data": {"count": 2, "items": [
            {"n": "Hello", "k": "A Minor", "as": ["Adele"]},
            {"n": "Skyfall", "k": "C Minor", "as": ["Adele"]}
        ]}}"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "Skyfall");
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_records(r#"{"data": null}"#).unwrap().is_empty());
        assert!(parse_records(r#"{"data": {}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_bare_array_with_long_names() {
        let json = r#"[{"title": "Hello", "key": "A Minor", "artists": ["Adele"]}]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records, vec![TrackRecord::new("Hello", "A Minor", &["Adele"])]);
    }

    #[test]
    fn test_parse_relay_error() {
        let err = parse_records(r#"{"error": "Failed to fetch from Tunebat."}"#).unwrap_err();
        assert!(err.to_string().contains("Failed to fetch from Tunebat."));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_records("not json").is_err());
        assert!(parse_records(r#""just a string""#).is_err());
        assert!(parse_records(r#"{"whatever": 1}"#).is_err());
        assert!(parse_records(r#"{"data": "nope"}"#).is_err());
    }

    fn titles_and_performers(records: &[TrackRecord]) -> Vec<(&str, usize)> {
        records
            .iter()
            .map(|r| (r.title.as_str(), r.performers.len()))
            .collect()
    }

    #[test]
    fn test_parse_relay_keeps_page_with_bad_items() {
        let json = r#"{"songs": [
            {"n": "Hello", "k": "A Minor", "as": ["Adele"]},
            {"n": null, "k": "C Major", "as": ["Adele"]},
            {"n": "Skyfall", "k": "C Minor", "as": null},
            {"n": "Lovesong", "k": "F Major", "as": [null]},
            {"n": "Remedy", "k": "A Minor", "as": [7]},
            {"n": "Easy on Me", "k": "F Major", "as": ["Adele"]}
        ]}"#;
        let records = parse_records(json).unwrap();
        assert_eq!(
            titles_and_performers(&records),
            vec![
                ("Hello", 1),
                ("", 1),
                ("Skyfall", 0),
                ("", 0),
                ("", 0),
                ("Easy on Me", 1),
            ]
        );
    }

    #[test]
    fn test_parse_bare_array_keeps_page_with_bad_items() {
        let json = r#"[
            {"n": "Hello", "k": "A Minor", "as": ["Adele"]},
            {"n": null, "as": ["Adele"]},
            {"n": "Skyfall", "as": null},
            {"n": "Lovesong", "as": [null]},
            "not an item",
            {"n": "Easy on Me", "k": "F Major", "as": ["Adele"]}
        ]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].title, "Hello");
        assert_eq!(records[2].title, "Skyfall");
        assert_eq!(records[3], TrackRecord::default());
        assert_eq!(records[4], TrackRecord::default());
        assert_eq!(records[5].title, "Easy on Me");
    }

    #[test]
    fn test_bad_items_are_counted_as_malformed() {
        let json = r#"[
            {"n": "Hello", "k": "A Minor", "as": ["Adele"]},
            {"n": null, "k": "C Major", "as": ["Adele"]},
            {"n": "Lovesong", "k": "F Major", "as": [null]}
        ]"#;
        let records = parse_records(json).unwrap();
        let output = crate::pipeline::run(&records, "adele", &Default::default());
        assert_eq!(output.stats.input_records, 3);
        assert_eq!(output.stats.malformed_records, 2);
        assert_eq!(output.stats.accepted_tracks, 1);
    }

    #[test]
    fn test_read_records_concatenates_pages() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("page1.json");
        let second = dir.path().join("page2.json");
        std::fs::File::create(&first)
            .unwrap()
            .write_all(br#"{"songs": [{"n": "Hello", "k": "A Minor", "as": ["Adele"]}]}"#)
            .unwrap();
        std::fs::File::create(&second)
            .unwrap()
            .write_all(br#"[{"n": "Skyfall", "k": "C Minor", "as": ["Adele"]}]"#)
            .unwrap();

        let records = read_records(&[first, second]).unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Hello", "Skyfall"]);
    }

    #[test]
    fn test_read_records_too_many_pages() {
        let paths: Vec<PathBuf> = (0..=MAX_PAGES)
            .map(|i| PathBuf::from(format!("page{}.json", i)))
            .collect();
        let err = read_records(&paths).unwrap_err();
        assert!(err.to_string().contains("At most 3 pages"));
    }

    #[test]
    fn test_read_records_missing_file() {
        let err = read_records(&[PathBuf::from("/nonexistent/page.json")]).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
