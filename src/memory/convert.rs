//! Record-to-event conversion and page-local ordering.

use std::cmp::Ordering;

use super::types::{MemoryRecord, TimelineEvent};

/// Whether a record is a highlight: the explicit flag, or a significance that
/// contains one of `keywords` (case-insensitive).
pub fn is_highlight(record: &MemoryRecord, keywords: &[String]) -> bool {
    if record.is_highlight == Some(true) {
        return true;
    }
    let Some(significance) = record.significance.as_deref() else {
        return false;
    };
    let significance = significance.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| significance.contains(&k.to_lowercase()))
}

/// Project a record into its display shape. The image is left empty.
pub fn to_timeline_event(record: &MemoryRecord, keywords: &[String]) -> TimelineEvent {
    TimelineEvent {
        id: record.id.to_string(),
        title: record.title.clone(),
        date: record.date.clone().unwrap_or_default(),
        description: record.content.clone(),
        image: String::new(),
        is_highlight: is_highlight(record, keywords),
        category: record.category.clone(),
        emotions: record.emotions.clone(),
    }
}

/// Date order for timeline events: present dates ascending, empty dates last.
pub fn compare_event_dates(a: &TimelineEvent, b: &TimelineEvent) -> Ordering {
    match (a.date.is_empty(), b.date.is_empty()) {
        (false, false) => a.date.cmp(&b.date),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}

/// Convert a page of records and sort it by date.
///
/// The sort is stable and scoped to this page only; order across pages
/// follows the document.
pub fn to_sorted_events(records: &[MemoryRecord], keywords: &[String]) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = records
        .iter()
        .map(|r| to_timeline_event(r, keywords))
        .collect();
    events.sort_by(compare_event_dates);
    events
}
