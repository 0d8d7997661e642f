//! Segment calculator — inter-detection intervals within a run and their
//! aggregation across runs by marker transition.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::detection::Detection;

/// Aggregation key for a marker transition: `"<from> → <to>"`.
pub fn segment_key(from: &str, to: &str) -> String {
    format!("{from} → {to}")
}

/// One interval between two consecutive detections of a run, in absolute
/// LiveSplit seconds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSegment {
    pub segment_index: usize,
    pub from_marker: String,
    pub to_marker: String,
    pub duration: f64,
    pub from_time: f64,
    pub to_time: f64,
}

/// All segments of one run plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct RunSegments {
    pub run_id: i64,
    pub segments: Vec<RunSegment>,
    pub total_duration: f64,
    /// Segments sit between detections, so this is `segments + 1`.
    pub detection_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentSample {
    pub run_id: i64,
    pub duration: f64,
}

/// Cross-run statistics for one marker transition.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentStat {
    pub segment_key: String,
    pub count: usize,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub durations: Vec<SegmentSample>,
}

/// Response body of the segments endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SegmentsReport {
    pub runs: Vec<RunSegments>,
    pub segment_statistics: Vec<SegmentStat>,
}

/// Compute per-run segments and cross-run statistics over the whole
/// detection list. Detections without a parseable LiveSplit time are
/// excluded; runs are ordered descending by id, statistics descending by
/// occurrence count (ties keep first-seen key order).
pub fn compute_report(detections: &[Detection]) -> SegmentsReport {
    // Partition qualifying detections by run, ordered by LiveSplit seconds.
    let mut per_run: BTreeMap<i64, Vec<(String, f64)>> = BTreeMap::new();
    for det in detections {
        let Some(secs) = det.livesplit_seconds() else {
            continue;
        };
        per_run
            .entry(det.run_id_or_default())
            .or_default()
            .push((det.marker_or_template().to_string(), secs));
    }

    let mut runs = Vec::with_capacity(per_run.len());
    let mut stats: Vec<SegmentStat> = Vec::new();

    // BTreeMap iterates ascending; reverse for newest-run-first output.
    for (run_id, mut points) in per_run.into_iter().rev() {
        points.sort_by(|a, b| a.1.total_cmp(&b.1));
        let segments = segments_between(&points);

        for segment in &segments {
            let key = segment_key(&segment.from_marker, &segment.to_marker);
            let idx = match stats.iter().position(|s| s.segment_key == key) {
                Some(idx) => idx,
                None => {
                    stats.push(SegmentStat {
                        segment_key: key,
                        count: 0,
                        avg_duration: 0.0,
                        min_duration: f64::INFINITY,
                        max_duration: f64::NEG_INFINITY,
                        durations: Vec::new(),
                    });
                    stats.len() - 1
                }
            };
            let stat = &mut stats[idx];
            stat.count += 1;
            stat.min_duration = stat.min_duration.min(segment.duration);
            stat.max_duration = stat.max_duration.max(segment.duration);
            stat.durations.push(SegmentSample {
                run_id,
                duration: segment.duration,
            });
        }

        let total_duration = segments.iter().map(|s| s.duration).sum();
        runs.push(RunSegments {
            run_id,
            detection_count: segments.len() + 1,
            total_duration,
            segments,
        });
    }

    for stat in &mut stats {
        let sum: f64 = stat.durations.iter().map(|d| d.duration).sum();
        stat.avg_duration = sum / stat.count as f64;
    }
    // stable sort: equal counts keep first-seen order
    stats.sort_by(|a, b| b.count.cmp(&a.count));

    SegmentsReport {
        runs,
        segment_statistics: stats,
    }
}

/// `N-1` segments linking each detection to its successor. `points` must
/// already be sorted ascending by time.
fn segments_between(points: &[(String, f64)]) -> Vec<RunSegment> {
    points
        .windows(2)
        .enumerate()
        .map(|(i, pair)| RunSegment {
            segment_index: i,
            from_marker: pair[0].0.clone(),
            to_marker: pair[1].0.clone(),
            duration: pair[1].1 - pair[0].1,
            from_time: pair[0].1,
            to_time: pair[1].1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(run_id: i64, marker: &str, livesplit: &str) -> Detection {
        serde_json::from_value(serde_json::json!({
            "template": marker,
            "time": "2025-12-18 08:33:57",
            "livesplit_current_time": livesplit,
            "run_id": run_id,
        }))
        .unwrap()
    }

    #[test]
    fn test_segments_from_ordered_detections() {
        let detections = vec![
            det(1, "a", "00:00:10"),
            det(1, "b", "00:00:30"),
            det(1, "c", "00:00:45"),
        ];
        let report = compute_report(&detections);
        assert_eq!(report.runs.len(), 1);
        let run = &report.runs[0];
        assert_eq!(run.detection_count, 3);
        let durations: Vec<f64> = run.segments.iter().map(|s| s.duration).collect();
        assert_eq!(durations, vec![20.0, 15.0]);
        assert_eq!(run.total_duration, 35.0);
        assert_eq!(run.segments[0].from_time, 10.0);
        assert_eq!(run.segments[0].to_time, 30.0);
    }

    #[test]
    fn test_unsorted_input_sorted_by_livesplit_time() {
        let detections = vec![
            det(1, "b", "00:00:30"),
            det(1, "a", "00:00:10"),
        ];
        let report = compute_report(&detections);
        let seg = &report.runs[0].segments[0];
        assert_eq!(seg.from_marker, "a");
        assert_eq!(seg.to_marker, "b");
        assert_eq!(seg.duration, 20.0);
    }

    #[test]
    fn test_statistics_across_runs() {
        let detections = vec![
            det(1, "A", "00:00:00"),
            det(1, "B", "00:00:10"),
            det(2, "A", "00:01:00"),
            det(2, "B", "00:01:20"),
        ];
        let report = compute_report(&detections);
        assert_eq!(report.segment_statistics.len(), 1);
        let stat = &report.segment_statistics[0];
        assert_eq!(stat.segment_key, "A → B");
        assert_eq!(stat.count, 2);
        assert_eq!(stat.avg_duration, 15.0);
        assert_eq!(stat.min_duration, 10.0);
        assert_eq!(stat.max_duration, 20.0);
        let samples: Vec<(i64, f64)> = stat.durations.iter().map(|d| (d.run_id, d.duration)).collect();
        // runs are processed newest-first
        assert_eq!(samples, vec![(2, 20.0), (1, 10.0)]);
    }

    #[test]
    fn test_statistics_sorted_by_count_desc() {
        let detections = vec![
            det(1, "A", "00:00:00"),
            det(1, "B", "00:00:10"),
            det(1, "C", "00:00:15"),
            det(2, "A", "00:01:00"),
            det(2, "B", "00:01:20"),
        ];
        let report = compute_report(&detections);
        assert_eq!(report.segment_statistics[0].segment_key, "A → B");
        assert_eq!(report.segment_statistics[0].count, 2);
        assert_eq!(report.segment_statistics[1].segment_key, "B → C");
    }

    #[test]
    fn test_runs_ordered_descending() {
        let detections = vec![
            det(1, "a", "00:00:10"),
            det(3, "a", "00:00:10"),
            det(2, "a", "00:00:10"),
        ];
        let report = compute_report(&detections);
        let ids: Vec<i64> = report.runs.iter().map(|r| r.run_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_single_detection_run_has_no_segments() {
        let report = compute_report(&[det(1, "a", "00:00:10")]);
        assert_eq!(report.runs.len(), 1);
        assert!(report.runs[0].segments.is_empty());
        assert_eq!(report.runs[0].detection_count, 1);
        assert_eq!(report.runs[0].total_duration, 0.0);
        assert!(report.segment_statistics.is_empty());
    }

    #[test]
    fn test_unparseable_times_excluded() {
        let mut bad = det(1, "x", "00:00:10");
        bad.livesplit_current_time = Some("garbage".into());
        let report = compute_report(&[bad]);
        assert!(report.runs.is_empty());
    }

    #[test]
    fn test_marker_fallback_to_template() {
        let mut a = det(1, "tmpl_a.png", "00:00:10");
        a.marker = None;
        let mut b = det(1, "tmpl_b.png", "00:00:20");
        b.marker = Some("boss".into());
        let report = compute_report(&[a, b]);
        let seg = &report.runs[0].segments[0];
        assert_eq!(seg.from_marker, "tmpl_a.png");
        assert_eq!(seg.to_marker, "boss");
    }
}
