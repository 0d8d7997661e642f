//! Run grouper — partitions the flat detection list into runs and derives
//! per-run summaries, plus the enriched single-run detail view.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::detection::Detection;
use crate::screenshots::ScreenshotIndex;
use crate::segments::{segment_key, SegmentStat};
use crate::timestamp;

/// Summary of one run for the runs listing.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: i64,
    /// Number of detections with a parseable LiveSplit time.
    pub count: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    /// Distinct templates across every detection of the run, first-seen order.
    pub templates: Vec<String>,
    pub first_timestamp: String,
    pub last_timestamp: String,
    pub preview_screenshot: Option<String>,
}

#[derive(Debug)]
struct RunAccum {
    count: usize,
    start: f64,
    end: f64,
    templates: Vec<String>,
    first_ts: Option<(String, Option<i64>)>,
    last_ts: Option<(String, Option<i64>)>,
    first_screenshot_path: Option<String>,
    saw_member: bool,
}

impl RunAccum {
    fn new(seconds: f64) -> Self {
        Self {
            count: 0,
            start: seconds,
            end: seconds,
            templates: Vec::new(),
            first_ts: None,
            last_ts: None,
            first_screenshot_path: None,
            saw_member: false,
        }
    }
}

/// Group detections by normalized run id.
///
/// A run only materializes from detections carrying a parseable LiveSplit
/// time; `count`, `start_time`, `end_time` and `duration` cover those
/// qualifying detections. `templates` and the wall-clock timestamp range
/// cover every detection of the partition. Output is sorted descending by
/// run id (newest attempt first).
pub fn group_runs(detections: &[Detection], screenshots: &ScreenshotIndex) -> Vec<RunSummary> {
    let mut runs: BTreeMap<i64, RunAccum> = BTreeMap::new();

    for det in detections {
        let Some(secs) = det.livesplit_seconds() else {
            continue;
        };
        let acc = runs
            .entry(det.run_id_or_default())
            .or_insert_with(|| RunAccum::new(secs));
        acc.count += 1;
        acc.start = acc.start.min(secs);
        acc.end = acc.end.max(secs);
    }

    // Second pass over the full partition: templates, wall-clock bounds,
    // and the first member's stored screenshot path.
    for det in detections {
        let Some(acc) = runs.get_mut(&det.run_id_or_default()) else {
            continue;
        };
        if !acc.templates.contains(&det.template) {
            acc.templates.push(det.template.clone());
        }
        if !acc.saw_member {
            acc.saw_member = true;
            acc.first_screenshot_path = det.screenshot_path.clone();
        }

        // bounds update only when both sides have a parseable wall clock;
        // an unparseable initial member pins the bound
        let ms = det.wall_clock_ms();
        let replace_first = match &acc.first_ts {
            None => true,
            Some((_, Some(first_ms))) => ms.map_or(false, |m| m < *first_ms),
            Some((_, None)) => false,
        };
        if replace_first {
            acc.first_ts = Some((det.time.clone(), ms));
        }
        let replace_last = match &acc.last_ts {
            None => true,
            Some((_, Some(last_ms))) => ms.map_or(false, |m| m > *last_ms),
            Some((_, None)) => false,
        };
        if replace_last {
            acc.last_ts = Some((det.time.clone(), ms));
        }
    }

    runs.into_iter()
        .rev()
        .map(|(run_id, acc)| {
            let (first_timestamp, first_ms) = acc.first_ts.unwrap_or_default();
            let (last_timestamp, _) = acc.last_ts.unwrap_or_default();
            // stored path wins; nearest-mtime match against the run's
            // earliest wall-clock timestamp is the fallback
            let preview_screenshot = acc.first_screenshot_path.or_else(|| {
                first_ms
                    .and_then(|ms| screenshots.closest_to(ms))
                    .map(|shot| shot.name.clone())
            });
            RunSummary {
                run_id,
                count: acc.count,
                start_time: acc.start,
                end_time: acc.end,
                duration: acc.end - acc.start,
                templates: acc.templates,
                first_timestamp,
                last_timestamp,
                preview_screenshot,
            }
        })
        .collect()
}

/// A detection enriched for the run detail view. Serializes the original
/// detection fields inline plus the derived ones.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedMatch {
    #[serde(flatten)]
    pub detection: Detection,
    pub livesplit_seconds: f64,
    /// Seconds since the run's first qualifying detection.
    pub time_elapsed: f64,
    /// Resolution chain: stored path → nearest mtime → `image` → `template`.
    pub screenshot_filename: String,
}

/// A run-detail segment, expressed over elapsed time and annotated with the
/// cross-run average for its marker transition.
#[derive(Debug, Clone, Serialize)]
pub struct DetailSegment {
    pub segment_index: usize,
    pub from_marker: String,
    pub to_marker: String,
    pub duration: f64,
    pub from_time: f64,
    pub to_time: f64,
    pub avg_duration: Option<f64>,
    pub is_faster: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunDetail {
    pub run_id: i64,
    pub matches: Vec<EnrichedMatch>,
    pub count: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub segments: Vec<DetailSegment>,
}

/// Detail view of one run: its qualifying detections ordered by LiveSplit
/// time, enriched with screenshots and elapsed offsets, and its segments
/// compared against the cross-run averages in `stats`. `None` when the run
/// has no qualifying detections.
pub fn run_detail(
    detections: &[Detection],
    run_id: i64,
    screenshots: &ScreenshotIndex,
    stats: &[SegmentStat],
) -> Option<RunDetail> {
    let mut members: Vec<(Detection, f64)> = detections
        .iter()
        .filter(|det| det.run_id_or_default() == run_id)
        .filter_map(|det| det.livesplit_seconds().map(|secs| (det.clone(), secs)))
        .collect();
    if members.is_empty() {
        return None;
    }
    members.sort_by(|a, b| a.1.total_cmp(&b.1));

    let first_time = members[0].1;
    let matches: Vec<EnrichedMatch> = members
        .into_iter()
        .map(|(detection, secs)| {
            let screenshot_filename = detection
                .screenshot_path
                .clone()
                .or_else(|| {
                    timestamp::parse_wall_clock_ms(&detection.time)
                        .and_then(|ms| screenshots.closest_to(ms))
                        .map(|shot| shot.name.clone())
                })
                .or_else(|| detection.image.clone())
                .unwrap_or_else(|| detection.template.clone());
            EnrichedMatch {
                livesplit_seconds: secs,
                time_elapsed: secs - first_time,
                screenshot_filename,
                detection,
            }
        })
        .collect();

    let segments = matches
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let from = &pair[0];
            let to = &pair[1];
            let duration = to.time_elapsed - from.time_elapsed;
            let key = segment_key(
                from.detection.marker_or_template(),
                to.detection.marker_or_template(),
            );
            let avg_duration = stats
                .iter()
                .find(|s| s.segment_key == key)
                .map(|s| s.avg_duration);
            DetailSegment {
                segment_index: i,
                from_marker: from.detection.marker_or_template().to_string(),
                to_marker: to.detection.marker_or_template().to_string(),
                duration,
                from_time: from.time_elapsed,
                to_time: to.time_elapsed,
                avg_duration,
                is_faster: avg_duration.map(|avg| duration < avg),
            }
        })
        .collect();

    let start_time = matches.first().map(|m| m.livesplit_seconds)?;
    let end_time = matches.last().map(|m| m.livesplit_seconds)?;
    Some(RunDetail {
        run_id,
        count: matches.len(),
        start_time,
        end_time,
        duration: end_time - start_time,
        matches,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screenshots::Screenshot;
    use crate::segments::compute_report;
    use serde_json::json;

    fn det(value: serde_json::Value) -> Detection {
        serde_json::from_value(value).unwrap()
    }

    fn simple(run_id: i64, livesplit: &str) -> Detection {
        det(json!({
            "template": "checkpoint/1.png",
            "time": "2025-12-18 08:33:57",
            "livesplit_current_time": livesplit,
            "run_id": run_id,
        }))
    }

    #[test]
    fn test_groups_and_durations() {
        let detections = vec![
            simple(1, "00:00:10"),
            simple(1, "00:00:30"),
            simple(2, "00:01:00"),
        ];
        let runs = group_runs(&detections, &ScreenshotIndex::default());
        assert_eq!(runs.len(), 2);
        // descending by run_id
        assert_eq!(runs[0].run_id, 2);
        assert_eq!(runs[0].duration, 0.0);
        assert_eq!(runs[0].count, 1);
        assert_eq!(runs[1].run_id, 1);
        assert_eq!(runs[1].duration, 20.0);
        assert_eq!(runs[1].start_time, 10.0);
        assert_eq!(runs[1].end_time, 30.0);
    }

    #[test]
    fn test_run_without_parseable_times_not_materialized() {
        let detections = vec![det(json!({
            "template": "t",
            "time": "2025-12-18 08:33:57",
            "run_id": 5,
        }))];
        assert!(group_runs(&detections, &ScreenshotIndex::default()).is_empty());
    }

    #[test]
    fn test_missing_run_id_goes_to_sentinel() {
        let detections = vec![det(json!({
            "template": "t",
            "time": "2025-12-18 08:33:57",
            "livesplit_current_time": "00:00:05",
        }))];
        let runs = group_runs(&detections, &ScreenshotIndex::default());
        assert_eq!(runs[0].run_id, -1);
    }

    #[test]
    fn test_templates_cover_non_qualifying_members() {
        let detections = vec![
            simple(1, "00:00:10"),
            det(json!({
                "template": "no_timer.png",
                "time": "2025-12-18 08:34:00",
                "run_id": 1,
            })),
        ];
        let runs = group_runs(&detections, &ScreenshotIndex::default());
        assert_eq!(runs[0].count, 1);
        assert_eq!(runs[0].templates, vec!["checkpoint/1.png", "no_timer.png"]);
        assert_eq!(runs[0].last_timestamp, "2025-12-18 08:34:00");
    }

    #[test]
    fn test_wall_clock_bounds() {
        let detections = vec![
            det(json!({
                "template": "t", "run_id": 1,
                "time": "2025-12-18 08:34:00",
                "livesplit_current_time": "00:00:20",
            })),
            det(json!({
                "template": "t", "run_id": 1,
                "time": "2025-12-18 08:33:00",
                "livesplit_current_time": "00:00:10",
            })),
        ];
        let runs = group_runs(&detections, &ScreenshotIndex::default());
        assert_eq!(runs[0].first_timestamp, "2025-12-18 08:33:00");
        assert_eq!(runs[0].last_timestamp, "2025-12-18 08:34:00");
    }

    #[test]
    fn test_preview_prefers_stored_path() {
        let detections = vec![det(json!({
            "template": "t", "run_id": 1,
            "time": "2025-12-18 08:33:57",
            "livesplit_current_time": "00:00:10",
            "screenshot_path": "stored.png",
        }))];
        let index = ScreenshotIndex::from_entries(vec![Screenshot {
            name: "near.png".into(),
            mtime: timestamp::parse_wall_clock_ms("2025-12-18 08:33:57").unwrap(),
            size: 1,
        }]);
        let runs = group_runs(&detections, &index);
        assert_eq!(runs[0].preview_screenshot.as_deref(), Some("stored.png"));
    }

    #[test]
    fn test_preview_falls_back_to_nearest_mtime() {
        let detections = vec![simple(1, "00:00:10")];
        let base = timestamp::parse_wall_clock_ms("2025-12-18 08:33:57").unwrap();
        let index = ScreenshotIndex::from_entries(vec![
            Screenshot { name: "far.png".into(), mtime: base + 60_000, size: 1 },
            Screenshot { name: "near.png".into(), mtime: base + 1_000, size: 1 },
        ]);
        let runs = group_runs(&detections, &index);
        assert_eq!(runs[0].preview_screenshot.as_deref(), Some("near.png"));
    }

    #[test]
    fn test_detail_missing_run_is_none() {
        assert!(run_detail(&[], 7, &ScreenshotIndex::default(), &[]).is_none());
    }

    #[test]
    fn test_detail_elapsed_and_annotations() {
        let detections = vec![
            det(json!({
                "template": "A", "run_id": 1, "time": "2025-12-18 08:33:00",
                "livesplit_current_time": "00:00:10",
            })),
            det(json!({
                "template": "B", "run_id": 1, "time": "2025-12-18 08:33:20",
                "livesplit_current_time": "00:00:30",
            })),
            det(json!({
                "template": "A", "run_id": 2, "time": "2025-12-18 09:00:00",
                "livesplit_current_time": "00:00:00",
            })),
            det(json!({
                "template": "B", "run_id": 2, "time": "2025-12-18 09:00:10",
                "livesplit_current_time": "00:00:10",
            })),
        ];
        let stats = compute_report(&detections).segment_statistics;

        let detail = run_detail(&detections, 2, &ScreenshotIndex::default(), &stats).unwrap();
        assert_eq!(detail.count, 2);
        assert_eq!(detail.duration, 10.0);
        assert_eq!(detail.matches[0].time_elapsed, 0.0);
        assert_eq!(detail.matches[1].time_elapsed, 10.0);

        let seg = &detail.segments[0];
        assert_eq!(seg.duration, 10.0);
        // avg over durations 20 (run 1) and 10 (run 2)
        assert_eq!(seg.avg_duration, Some(15.0));
        assert_eq!(seg.is_faster, Some(true));
    }

    #[test]
    fn test_detail_screenshot_resolution_chain() {
        let base = timestamp::parse_wall_clock_ms("2025-12-18 08:33:00").unwrap();
        let index = ScreenshotIndex::from_entries(vec![Screenshot {
            name: "near.png".into(),
            mtime: base,
            size: 1,
        }]);
        let detections = vec![
            det(json!({
                "template": "A", "run_id": 1, "time": "2025-12-18 08:33:00",
                "livesplit_current_time": "00:00:10",
                "screenshot_path": "stored.png",
            })),
            det(json!({
                "template": "B", "run_id": 1, "time": "2025-12-18 08:33:01",
                "livesplit_current_time": "00:00:20",
            })),
            det(json!({
                "template": "C", "run_id": 1, "time": "2026-01-01 00:00:00",
                "livesplit_current_time": "00:00:30",
                "image": "fallback.png",
            })),
        ];
        let detail = run_detail(&detections, 1, &index, &[]).unwrap();
        assert_eq!(detail.matches[0].screenshot_filename, "stored.png");
        assert_eq!(detail.matches[1].screenshot_filename, "near.png");
        assert_eq!(detail.matches[2].screenshot_filename, "fallback.png");
    }
}
