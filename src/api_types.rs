use serde::{Deserialize, Deserializer};

/// `videos.list` response body (only the parts the pipeline reads).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVideoListResponse {
    #[serde(default)]
    pub items: Vec<ApiVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVideo {
    pub id: String,
    #[serde(default)]
    pub snippet: ApiSnippet,
    #[serde(default)]
    pub statistics: ApiStatistics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub published_at: String, // "2025-10-18T14:03:11Z"
}

/// Counts arrive as decimal strings ("viewCount": "123456"); hidden or
/// disabled counters are simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatistics {
    #[serde(default, deserialize_with = "lenient_count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comment_count: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountRepr {
    Number(u64),
    Text(String),
    Other(serde_json::Value),
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Option::<CountRepr>::deserialize(deserializer)? {
        Some(CountRepr::Number(n)) => n,
        Some(CountRepr::Text(s)) => s.trim().parse().unwrap_or(0),
        Some(CountRepr::Other(_)) | None => 0,
    };
    Ok(count)
}
