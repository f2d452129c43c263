use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier assigned to an opportunity by the remote system.
pub type OpportunityId = String;

/// Mime type recorded for attachments that do not declare one.
pub const UNKNOWN_MIME_TYPE: &str = "unknown";

// ============================================================================
// Wire Types
// ============================================================================

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpportunityPage {
    pub ids: Vec<OpportunityId>,
    /// Authoritative page count reported by the server.
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub filters: SearchFilters,
    pub pagination: SearchPagination,
}

impl SearchRequest {
    /// Posted grants, sorted ascending by opportunity id.
    pub fn posted_grants(page_offset: u32, page_size: u32) -> Self {
        Self {
            filters: SearchFilters {
                opportunity_status: OneOf::single("posted"),
                funding_instrument: OneOf::single("grant"),
            },
            pagination: SearchPagination {
                page_offset,
                page_size,
                sort_order: vec![SortOrder {
                    order_by: "opportunity_id".to_string(),
                    sort_direction: "ascending".to_string(),
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchFilters {
    pub opportunity_status: OneOf,
    pub funding_instrument: OneOf,
}

#[derive(Debug, Clone, Serialize)]
pub struct OneOf {
    pub one_of: Vec<String>,
}

impl OneOf {
    fn single(value: &str) -> Self {
        Self {
            one_of: vec![value.to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPagination {
    pub page_offset: u32,
    pub page_size: u32,
    pub sort_order: Vec<SortOrder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SortOrder {
    pub order_by: String,
    pub sort_direction: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<SearchHit>,
    pub pagination_info: PaginationInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(deserialize_with = "opaque_id")]
    pub opportunity_id: OpportunityId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationInfo {
    pub total_pages: u32,
    #[serde(default)]
    pub total_records: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailResponse {
    #[serde(default)]
    pub data: Option<RawOpportunity>,
}

/// Opportunity record as returned by the detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawOpportunity {
    #[serde(deserialize_with = "opaque_id")]
    pub opportunity_id: OpportunityId,
    #[serde(default)]
    pub opportunity_title: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attachments: Vec<RawAttachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawAttachment {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_description: Option<String>,
    #[serde(default)]
    pub download_path: Option<String>,
}

impl RawAttachment {
    /// Only attachments with a non-empty download path are downloadable.
    pub fn is_downloadable(&self) -> bool {
        self.download_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

// ============================================================================
// Derived Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    pub mime_type: String,
    pub file_description: Option<String>,
}

/// Per-opportunity result of the detail stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityDetail {
    pub opportunity_id: OpportunityId,
    pub opportunity_title: Option<String>,
    pub attachment_count: usize,
    pub mime_types: Vec<String>,
    pub attachments: Vec<AttachmentSummary>,
    /// Promoted from the sole attachment when `attachment_count == 1`.
    pub download_path: Option<String>,
    pub file_description: Option<String>,
}

impl From<RawOpportunity> for OpportunityDetail {
    fn from(raw: RawOpportunity) -> Self {
        let kept: Vec<RawAttachment> = raw
            .attachments
            .into_iter()
            .filter(RawAttachment::is_downloadable)
            .collect();

        let mime_types: Vec<String> = kept
            .iter()
            .map(|a| {
                a.mime_type
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| UNKNOWN_MIME_TYPE.to_string())
            })
            .collect();

        let attachments = kept
            .iter()
            .zip(&mime_types)
            .map(|(a, mime)| AttachmentSummary {
                mime_type: mime.clone(),
                file_description: a.file_description.clone(),
            })
            .collect();

        let (download_path, file_description) = match kept.as_slice() {
            [sole] => (sole.download_path.clone(), sole.file_description.clone()),
            _ => (None, None),
        };

        Self {
            opportunity_id: raw.opportunity_id,
            opportunity_title: raw.opportunity_title,
            attachment_count: kept.len(),
            mime_types,
            attachments,
            download_path,
            file_description,
        }
    }
}

impl OpportunityDetail {
    /// Projection kept in the filtered output; only single-attachment records qualify.
    pub fn as_filtered(&self) -> Option<FilteredOpportunity> {
        if self.attachment_count != 1 {
            return None;
        }
        Some(FilteredOpportunity {
            opportunity_id: self.opportunity_id.clone(),
            opportunity_title: self.opportunity_title.clone(),
            download_path: self.download_path.clone().unwrap_or_default(),
            file_description: self.file_description.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredOpportunity {
    pub opportunity_id: OpportunityId,
    pub opportunity_title: Option<String>,
    pub download_path: String,
    pub file_description: Option<String>,
}

// ============================================================================
// Serde helpers
// ============================================================================

// Ids arrive as strings or integers depending on the API version.
fn opaque_id<'de, D>(deserializer: D) -> Result<OpportunityId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
