//! Detection data model — one template-match event as persisted by the
//! external collector in `matches.json`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::timestamp;

/// Sentinel run id for detections whose `run_id` field is absent or not an
/// integer. The collector only assigns ids starting at 1, so the sentinel
/// cannot collide with a real run.
pub const UNASSIGNED_RUN_ID: i64 = -1;

/// Pixel position of a template match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i64,
    pub y: i64,
}

/// One observed template match.
///
/// Field names mirror the collector's JSON exactly. Unknown fields (`id`,
/// `screensize`, `livesplit_attempt_count`, ...) are carried through
/// `extra` so a detection serializes back out without loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub template: String,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub coordinates: Coordinates,
    /// Wall-clock timestamp when the detection occurred.
    pub time: String,
    /// The speedrun timer's displayed value at detection time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livesplit_current_time: Option<String>,
    /// Assigned run, if any. Non-integer JSON values decode as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_run_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub run_id: Option<i64>,
    /// Human label for the detection point; empty or absent falls back to
    /// the template name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Detection {
    /// Normalized run id: absent or non-integer values map to
    /// [`UNASSIGNED_RUN_ID`].
    pub fn run_id_or_default(&self) -> i64 {
        self.run_id.unwrap_or(UNASSIGNED_RUN_ID)
    }

    /// LiveSplit seconds, when the timer value is present and parseable.
    pub fn livesplit_seconds(&self) -> Option<f64> {
        timestamp::parse_livesplit_opt(self.livesplit_current_time.as_deref())
    }

    /// Wall-clock timestamp in epoch milliseconds, when parseable.
    pub fn wall_clock_ms(&self) -> Option<i64> {
        timestamp::parse_wall_clock_ms(&self.time)
    }

    /// Segment label: `marker` when present and non-empty, else `template`.
    pub fn marker_or_template(&self) -> &str {
        match self.marker.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => &self.template,
        }
    }
}

/// Accepts any JSON value in `run_id` and keeps only integers. Older
/// collector versions occasionally wrote nulls and strings here; those all
/// count as unassigned.
fn lenient_run_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Detection {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_minimal_detection() {
        let det = decode(r#"{"template": "checkpoint/1.png", "time": "2025-12-18 08:33:57"}"#);
        assert_eq!(det.run_id_or_default(), UNASSIGNED_RUN_ID);
        assert_eq!(det.marker_or_template(), "checkpoint/1.png");
        assert_eq!(det.livesplit_seconds(), None);
    }

    #[test]
    fn test_non_integer_run_id_is_unassigned() {
        for raw in [r#""7""#, "null", "1.5", "true"] {
            let det = decode(&format!(
                r#"{{"template": "t", "time": "2025-12-18 08:33:57", "run_id": {raw}}}"#
            ));
            assert_eq!(det.run_id_or_default(), UNASSIGNED_RUN_ID, "run_id {raw}");
        }
        let det = decode(r#"{"template": "t", "time": "2025-12-18 08:33:57", "run_id": 3}"#);
        assert_eq!(det.run_id_or_default(), 3);
    }

    #[test]
    fn test_empty_marker_falls_back_to_template() {
        let det = decode(r#"{"template": "boss.png", "time": "x", "marker": ""}"#);
        assert_eq!(det.marker_or_template(), "boss.png");
        let det = decode(r#"{"template": "boss.png", "time": "x", "marker": "boss"}"#);
        assert_eq!(det.marker_or_template(), "boss");
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let det = decode(
            r#"{"template": "t", "time": "2025-12-18 08:33:57",
                "id": "abc", "screensize": {"width": 1920, "height": 1080}}"#,
        );
        let out = serde_json::to_value(&det).unwrap();
        assert_eq!(out["id"], "abc");
        assert_eq!(out["screensize"]["width"], 1920);
    }
}
