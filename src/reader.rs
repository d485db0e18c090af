use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::language::detect_language;

/// Region assumed for files written before the `region` column existed.
pub const LEGACY_REGION: &str = "IN";
const FLOAT_DECIMALS: i32 = 6;

/// Columns served verbatim as strings whatever they look like.
const TEXT_COLUMNS: [&str; 5] = ["video_id", "title", "publish_time", "region", "language"];

/// What the serving layer returns for the trends endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrendsPayload {
    pub trends: Vec<Map<String, Value>>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Int,
    Float,
    Text,
}

fn infer_kind(name: &str, values: &[&str]) -> ColumnKind {
    if TEXT_COLUMNS.contains(&name) {
        return ColumnKind::Text;
    }
    if !values.is_empty() && values.iter().all(|v| v.trim().parse::<i64>().is_ok()) {
        return ColumnKind::Int;
    }
    // empty cells read as missing floats
    if values.iter().all(|v| v.trim().is_empty() || v.trim().parse::<f64>().is_ok()) {
        return ColumnKind::Float;
    }
    ColumnKind::Text
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}

fn to_value(kind: ColumnKind, raw: &str) -> Value {
    match kind {
        ColumnKind::Int => raw.trim().parse::<i64>().map(Value::from).unwrap_or(Value::Null),
        ColumnKind::Float => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|v| Number::from_f64(round_to(v, FLOAT_DECIMALS)))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ColumnKind::Text => Value::String(raw.to_string()),
    }
}

/// Load the dataset the way the serving layer does: backfill `region` and
/// `language` for older files, `publish_time` as text, floats rounded to 6
/// places. A missing file is an empty payload.
pub fn read_trends(path: &Path) -> Result<TrendsPayload> {
    if !path.is_file() {
        debug!("No dataset file - path={}", path.display());
        return Ok(TrendsPayload::default());
    }

    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("open {:?}", path))?;
    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("read header of {:?}", path))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<csv::StringRecord> = rdr
        .records()
        .collect::<Result<_, _>>()
        .with_context(|| format!("read rows of {:?}", path))?;

    let kinds: Vec<ColumnKind> = headers
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let col: Vec<&str> = rows.iter().map(|r| r.get(j).unwrap_or("")).collect();
            infer_kind(name, &col)
        })
        .collect();

    let has_region = headers.iter().any(|h| h == "region");
    let has_language = headers.iter().any(|h| h == "language");
    let title_col = headers.iter().position(|h| h == "title");

    let mut trends = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut obj = Map::new();
        for (j, name) in headers.iter().enumerate() {
            obj.insert(name.clone(), to_value(kinds[j], row.get(j).unwrap_or("")));
        }
        if !has_region {
            obj.insert("region".into(), Value::String(LEGACY_REGION.into()));
        }
        if !has_language {
            let title = title_col.and_then(|j| row.get(j)).unwrap_or("");
            obj.insert("language".into(), Value::String(detect_language(title)));
        }
        trends.push(obj);
    }

    let count = trends.len();
    debug!("Loaded trends - path={}, rows={}", path.display(), count);
    Ok(TrendsPayload { trends, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let payload = read_trends(&dir.path().join("nope.csv")).unwrap();
        assert_eq!(payload.count, 0);
        assert!(payload.trends.is_empty());
    }

    #[test]
    fn legacy_file_gets_backfilled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.csv");
        fs::write(
            &path,
            "video_id,title,category_id,publish_time,views,like_ratio\n\
             x1,The official trailer for the new season is finally here,24,2024-01-02 03:04:05+00:00,100,0.123456789\n",
        )
        .unwrap();

        let payload = read_trends(&path).unwrap();
        assert_eq!(payload.count, 1);
        let row = &payload.trends[0];
        assert_eq!(row["region"], "IN");
        assert_eq!(row["language"], "en");
        assert_eq!(row["publish_time"], "2024-01-02 03:04:05+00:00");
        assert_eq!(row["views"], 100);
        assert_eq!(row["category_id"], 24);
        assert_eq!(row["like_ratio"].as_f64().unwrap(), 0.123457);
    }

    #[test]
    fn numeric_looking_text_columns_stay_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "video_id,title,region,language,views\n12345,1984,US,en,5\n").unwrap();
        let payload = read_trends(&path).unwrap();
        let row = &payload.trends[0];
        assert_eq!(row["video_id"], "12345");
        assert_eq!(row["title"], "1984");
        assert_eq!(row["views"], 5);
    }

    #[test]
    fn empty_float_cells_are_null() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.csv");
        fs::write(&path, "video_id,title,region,language,title_sentiment\na,t,US,en,\nb,t,US,en,0.5\n").unwrap();
        let payload = read_trends(&path).unwrap();
        assert!(payload.trends[0]["title_sentiment"].is_null());
        assert_eq!(payload.trends[1]["title_sentiment"], 0.5);
    }
}
