//! Protocol Messages
//!
//! Wire format of the HTTP query API. The live feed has no envelope: each
//! frame is a serialized [`DrawResult`] carrying its own `lottery_type`.

use serde::{Deserialize, Serialize};

use crate::store::DrawResult;

/// Query string of `GET /history/{type}`.
///
/// `page` stays a raw string so a malformed value can fall back to 0
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    /// Zero-based page number.
    pub page: Option<String>,
}

impl HistoryParams {
    /// Page number; absent, non-numeric or negative values mean page 0.
    pub fn page_number(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }
}

/// One page of a variant's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Results, most recent first.
    pub data: Vec<DrawResult>,
    /// Total results recorded for the variant.
    pub total: u64,
}

/// Jackpot counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinsResponse {
    /// Results with a perfect score, all variants.
    pub wins: u64,
}

/// Body of a rejected query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}
