use tracing::info;

use crate::models::Dataset;

pub const VIRAL_QUANTILE: f64 = 0.75;

/// Quantile with linear interpolation between closest ranks
/// (`q` in [0, 1]). `None` for empty input.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Label every row against the pooled 75th percentile of `views`.
/// Returns the threshold used.
pub fn label_viral(dataset: &mut Dataset) -> Option<f64> {
    let views: Vec<f64> = dataset.iter().map(|r| r.views as f64).collect();
    let threshold = quantile(&views, VIRAL_QUANTILE)?;

    for r in dataset.iter_mut() {
        r.viral = u8::from(r.views as f64 > threshold);
    }

    let positives = dataset.iter().filter(|r| r.viral == 1).count();
    info!(
        "Viral labels - threshold={:.1}, viral={}, not_viral={}",
        threshold,
        positives,
        dataset.len() - positives
    );
    Some(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrichedRecord;
    use chrono::DateTime;

    fn rows(views: &[u64]) -> Dataset {
        let ts = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap();
        views
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut r = EnrichedRecord::from_video(
                    crate::models::VideoRecord {
                        video_id: format!("v{i}"),
                        title: String::new(),
                        category_id: "1".into(),
                        publish_time: String::new(),
                        views: v,
                        likes: 0,
                        comment_count: 0,
                        region: if i % 2 == 0 { "US".into() } else { "IN".into() },
                    },
                    ts,
                    "en".into(),
                );
                r.viral = 9;
                r
            })
            .collect()
    }

    #[test]
    fn quantile_interpolates() {
        assert_eq!(quantile(&[], 0.75), None);
        assert_eq!(quantile(&[5.0], 0.75), Some(5.0));
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.75), Some(3.25));
        assert_eq!(quantile(&[4.0, 1.0, 3.0, 2.0, 5.0], 0.75), Some(4.0));
        assert_eq!(quantile(&[10.0, 20.0], 0.5), Some(15.0));
    }

    #[test]
    fn strictly_above_threshold_is_viral() {
        let mut ds = rows(&[100, 200, 300, 400, 500, 600, 700, 800]);
        let t = label_viral(&mut ds).unwrap();
        assert_eq!(t, 625.0);
        let viral: Vec<u8> = ds.iter().map(|r| r.viral).collect();
        assert_eq!(viral, vec![0, 0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn ties_at_threshold_are_not_viral() {
        let mut ds = rows(&[5, 5, 5, 5, 5]);
        assert_eq!(label_viral(&mut ds), Some(5.0));
        assert!(ds.iter().all(|r| r.viral == 0));
    }

    #[test]
    fn threshold_is_pooled_across_regions() {
        // US rows are small, IN rows large; a per-region cut would label both
        let mut ds = rows(&[1, 1000, 2, 2000, 3, 3000, 4, 4000]);
        let t = label_viral(&mut ds).unwrap();
        for r in &ds {
            assert_eq!(r.viral, u8::from(r.views as f64 > t));
        }
        assert!(ds.iter().filter(|r| r.region == "US").all(|r| r.viral == 0));
        assert_eq!(ds.iter().filter(|r| r.viral == 1).count(), 2);
    }

    #[test]
    fn empty_dataset_has_no_threshold() {
        let mut ds = Dataset::new();
        assert_eq!(label_viral(&mut ds), None);
    }
}
