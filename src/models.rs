use chrono::{DateTime, FixedOffset};

/// One trending video as delivered by a region fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub category_id: String,
    pub publish_time: String, // RFC 3339, e.g. "2025-10-18T14:03:11Z"
    pub views: u64,
    pub likes: u64,
    pub comment_count: u64,
    pub region: String, // "IN", "US", ...
}

/// A video plus everything the pipeline derives from it.
///
/// Field order matches the output file's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub video_id: String,
    pub title: String,
    pub category_id: String,
    pub publish_time: DateTime<FixedOffset>,
    pub views: u64,
    pub likes: u64,
    pub comment_count: u64,
    pub region: String,
    pub language: String,
    pub publish_hour: u32,         // 0..=23
    pub like_ratio: f64,           // likes / views
    pub comment_ratio: f64,        // comment_count / views
    pub engagement_score: f64,     // (likes + comment_count) / views
    pub title_sentiment: f64,      // [-1.0, 1.0]
    pub viral: u8,                 // 0 | 1
}

impl EnrichedRecord {
    /// Start an enriched row from a fetched video; derived fields are zeroed
    /// until their stage runs.
    pub fn from_video(video: VideoRecord, publish_time: DateTime<FixedOffset>, language: String) -> Self {
        Self {
            video_id: video.video_id,
            title: video.title,
            category_id: video.category_id,
            publish_time,
            views: video.views,
            likes: video.likes,
            comment_count: video.comment_count,
            region: video.region,
            language,
            publish_hour: 0,
            like_ratio: 0.0,
            comment_ratio: 0.0,
            engagement_score: 0.0,
            title_sentiment: 0.0,
            viral: 0,
        }
    }
}

/// One run's table. Replaced wholesale on every run.
pub type Dataset = Vec<EnrichedRecord>;
