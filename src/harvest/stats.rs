//! Frequency statistics over harvested opportunity details.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::model::OpportunityDetail;

/// Running totals updated once per successfully fetched opportunity.
#[derive(Debug, Default, Clone)]
pub struct StatisticsAccumulator {
    total: usize,
    mime_type_counts: HashMap<String, usize>,
    attachment_count_distribution: BTreeMap<usize, usize>,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts an opportunity once per distinct mime type it carries.
    pub fn record(&mut self, detail: &OpportunityDetail) {
        self.total += 1;
        *self
            .attachment_count_distribution
            .entry(detail.attachment_count)
            .or_insert(0) += 1;

        let unique: BTreeSet<&str> = detail.mime_types.iter().map(String::as_str).collect();
        for mime in unique {
            *self.mime_type_counts.entry(mime.to_string()).or_insert(0) += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn summary(&self, generated_at: DateTime<Utc>) -> StatisticsSummary {
        let mut mime: Vec<(String, usize)> = self
            .mime_type_counts
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        mime.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        StatisticsSummary {
            total_opportunities_processed: self.total,
            mime_type_counts: MimeTypeCounts(mime),
            attachment_count_distribution: self.attachment_count_distribution.clone(),
            generated_at,
        }
    }
}

/// Statistics file contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub total_opportunities_processed: usize,
    /// Emitted in descending count order
    pub mime_type_counts: MimeTypeCounts,
    /// Keys serialize as strings in ascending numeric order
    pub attachment_count_distribution: BTreeMap<usize, usize>,
    pub generated_at: DateTime<Utc>,
}

/// Mime type counts kept in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeTypeCounts(pub Vec<(String, usize)>);

impl MimeTypeCounts {
    pub fn get(&self, mime: &str) -> Option<usize> {
        self.0.iter().find(|(m, _)| m == mime).map(|(_, c)| *c)
    }
}

impl Serialize for MimeTypeCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (mime, count) in &self.0 {
            map.serialize_entry(mime, count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawAttachment, RawOpportunity};

    fn detail(id: &str, attachments: &[(Option<&str>, &str)]) -> OpportunityDetail {
        OpportunityDetail::from(RawOpportunity {
            opportunity_id: id.to_string(),
            opportunity_title: None,
            attachments: attachments
                .iter()
                .map(|(mime, path)| RawAttachment {
                    mime_type: mime.map(str::to_string),
                    file_description: None,
                    download_path: Some(path.to_string()),
                })
                .collect(),
        })
    }

    #[test]
    fn test_mime_type_counted_once_per_opportunity() {
        let mut stats = StatisticsAccumulator::new();
        stats.record(&detail(
            "1",
            &[(Some("pdf"), "x"), (Some("pdf"), "y"), (Some("docx"), "")],
        ));

        let summary = stats.summary(Utc::now());
        assert_eq!(summary.total_opportunities_processed, 1);
        assert_eq!(summary.mime_type_counts.get("pdf"), Some(1));
        assert_eq!(summary.mime_type_counts.get("docx"), None);
        assert_eq!(summary.attachment_count_distribution.get(&2), Some(&1));
    }

    #[test]
    fn test_zero_attachment_records_still_counted() {
        let mut stats = StatisticsAccumulator::new();
        stats.record(&detail("1", &[]));
        stats.record(&detail("2", &[(None, "a")]));

        let summary = stats.summary(Utc::now());
        assert_eq!(summary.total_opportunities_processed, 2);
        assert_eq!(summary.attachment_count_distribution.get(&0), Some(&1));
        assert_eq!(summary.attachment_count_distribution.get(&1), Some(&1));
        assert_eq!(summary.mime_type_counts.get("unknown"), Some(1));
    }

    #[test]
    fn test_summary_serialization_order() {
        let mut stats = StatisticsAccumulator::new();
        stats.record(&detail("1", &[(Some("docx"), "a")]));
        for id in ["2", "3"] {
            stats.record(&detail(id, &[(Some("pdf"), "a"), (Some("zip"), "b")]));
        }
        for n in 0..10 {
            let paths: Vec<(Option<&str>, &str)> = (0..=n).map(|_| (Some("pdf"), "p")).collect();
            stats.record(&detail("many", &paths));
        }

        let generated_at = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_string(&stats.summary(generated_at)).unwrap();

        // pdf (12) before zip (2) before docx (1)
        let pdf = json.find("\"pdf\"").unwrap();
        let zip = json.find("\"zip\"").unwrap();
        let docx = json.find("\"docx\"").unwrap();
        assert!(pdf < zip && zip < docx);

        // "2" before "10": numeric, not lexicographic
        let dist = &json[json.find("attachment_count_distribution").unwrap()..];
        assert!(dist.find("\"2\"").unwrap() < dist.find("\"10\"").unwrap());

        assert!(json.contains("\"generated_at\":\"2026-03-01T12:00:00Z\""));
        assert!(json.contains("\"total_opportunities_processed\":13"));
    }
}
