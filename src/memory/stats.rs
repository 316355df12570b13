use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::convert::is_highlight;
use super::types::MemoryRecord;

/// Catalog statistics for the memory document.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_memories: usize,
    pub highlights: usize,
    pub dated: usize,
    pub undated: usize,
    pub by_category: BTreeMap<String, usize>,
    pub emotions: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<NaiveDate>,
}

const UNCATEGORIZED: &str = "uncategorized";

/// Compute statistics over the full record list.
///
/// Dates that are not valid `YYYY-MM-DD` count as undated.
pub fn memory_stats(records: &[MemoryRecord], highlight_keywords: &[String]) -> CatalogStats {
    let mut by_category = BTreeMap::new();
    let mut emotions = BTreeMap::new();
    let mut highlights = 0;
    let mut dates = Vec::with_capacity(records.len());

    for record in records {
        let category = record
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNCATEGORIZED);
        *by_category.entry(category.to_string()).or_insert(0) += 1;

        for emotion in &record.emotions {
            *emotions.entry(emotion.clone()).or_insert(0) += 1;
        }

        if is_highlight(record, highlight_keywords) {
            highlights += 1;
        }

        if let Some(date) = record.date.as_deref().and_then(parse_date) {
            dates.push(date);
        }
    }

    CatalogStats {
        total_memories: records.len(),
        highlights,
        dated: dates.len(),
        undated: records.len() - dates.len(),
        by_category,
        emotions,
        earliest: dates.iter().min().copied(),
        latest: dates.iter().max().copied(),
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, date: Option<&str>, category: Option<&str>) -> MemoryRecord {
        MemoryRecord {
            id,
            title: format!("m{id}"),
            date: date.map(String::from),
            category: category.map(String::from),
            content: String::new(),
            emotions: vec![],
            images: vec![],
            significance: None,
            is_highlight: None,
        }
    }

    #[test]
    fn counts_categories_dates_and_highlights() {
        let mut first = record(1, Some("2021-03-04"), Some("travel"));
        first.emotions = vec!["joy".into(), "awe".into()];
        first.is_highlight = Some(true);
        let mut second = record(2, Some("2023-11-30"), Some("travel"));
        second.emotions = vec!["joy".into()];
        let third = record(3, Some("sometime in spring"), None);
        let fourth = record(4, None, Some(""));

        let stats = memory_stats(&[first, second, third, fourth], &["high".into()]);

        assert_eq!(stats.total_memories, 4);
        assert_eq!(stats.highlights, 1);
        assert_eq!(stats.dated, 2);
        assert_eq!(stats.undated, 2);
        assert_eq!(stats.by_category["travel"], 2);
        assert_eq!(stats.by_category[UNCATEGORIZED], 2);
        assert_eq!(stats.emotions["joy"], 2);
        assert_eq!(stats.emotions["awe"], 1);
        assert_eq!(stats.earliest, NaiveDate::from_ymd_opt(2021, 3, 4));
        assert_eq!(stats.latest, NaiveDate::from_ymd_opt(2023, 11, 30));
    }

    #[test]
    fn empty_catalog() {
        let stats = memory_stats(&[], &[]);
        assert_eq!(stats.total_memories, 0);
        assert!(stats.earliest.is_none());
        assert!(stats.by_category.is_empty());
    }
}
