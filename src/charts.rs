use crate::models::DashboardTables;
use crate::table::{Cell, FlatTable, RecordKind, DURATION_COLUMN};
use serde::Serialize;

const X_COLUMN: &str = "start";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

pub struct ChartSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub y_label: &'static str,
    pub kind: ChartKind,
    pub source: RecordKind,
    pub column: &'static str,
}

pub const CHARTS: [ChartSpec; 4] = [
    ChartSpec {
        id: "sleep-duration",
        title: "Sleep Duration Over Time",
        y_label: "Duration (hours)",
        kind: ChartKind::Line,
        source: RecordKind::Sleep,
        column: DURATION_COLUMN,
    },
    ChartSpec {
        id: "sleep-performance",
        title: "Sleep Performance Percentage Over Time",
        y_label: "Performance (%)",
        kind: ChartKind::Bar,
        source: RecordKind::Sleep,
        column: "score.sleep_performance_percentage",
    },
    ChartSpec {
        id: "workout-strain",
        title: "Workout Strain Over Time",
        y_label: "Strain",
        kind: ChartKind::Line,
        source: RecordKind::Workout,
        column: "score.strain",
    },
    ChartSpec {
        id: "workout-heart-rate",
        title: "Average Heart Rate During Workouts",
        y_label: "Average Heart Rate",
        kind: ChartKind::Line,
        source: RecordKind::Workout,
        column: "score.average_heart_rate",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub x: String,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub id: &'static str,
    pub title: &'static str,
    pub y_label: &'static str,
    pub kind: ChartKind,
    pub column: &'static str,
    pub points: Vec<ChartPoint>,
}

/// Series for every chart whose column exists; absent columns are skipped.
pub fn build_charts(tables: &DashboardTables) -> Vec<ChartSeries> {
    CHARTS
        .iter()
        .filter_map(|spec| {
            let table = match spec.source {
                RecordKind::Sleep => &tables.sleep,
                RecordKind::Workout => &tables.workout,
            };
            build_chart(spec, table)
        })
        .collect()
}

pub fn build_chart(spec: &ChartSpec, table: &FlatTable) -> Option<ChartSeries> {
    let xs = table.column(X_COLUMN)?;
    let ys = table.column(spec.column)?;

    let mut points: Vec<_> = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| match (x, y.as_f64()) {
            (Cell::Timestamp(ts), Some(value)) => Some((*ts, value)),
            _ => None,
        })
        .collect();
    points.sort_by_key(|(ts, _)| *ts);

    Some(ChartSeries {
        id: spec.id,
        title: spec.title,
        y_label: spec.y_label,
        kind: spec.kind,
        column: spec.column,
        points: points
            .into_iter()
            .map(|(ts, value)| ChartPoint {
                x: ts.to_rfc3339(),
                label: ts.format("%m-%d").to_string(),
                value,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::flatten;
    use serde_json::json;

    fn tables(sleep: &[serde_json::Value], workout: &[serde_json::Value]) -> DashboardTables {
        DashboardTables {
            sleep: flatten(sleep, RecordKind::Sleep).unwrap(),
            workout: flatten(workout, RecordKind::Workout).unwrap(),
        }
    }

    #[test]
    fn empty_tables_have_no_charts() {
        assert!(build_charts(&tables(&[], &[])).is_empty());
    }

    #[test]
    fn charts_follow_column_presence() {
        let tables = tables(
            &[json!({ "start": "2024-01-01T22:00:00Z", "end": "2024-01-02T06:00:00Z" })],
            &[json!({ "start": "2024-01-02T18:00:00Z", "score": { "strain": 12.5 } })],
        );
        let ids: Vec<_> = build_charts(&tables).iter().map(|chart| chart.id).collect();
        assert_eq!(ids, ["sleep-duration", "workout-strain"]);
    }

    #[test]
    fn points_skip_missing_values_and_sort_by_start() {
        let tables = tables(
            &[],
            &[
                json!({ "start": "2024-01-03T18:00:00Z", "score": { "average_heart_rate": 140 } }),
                json!({ "start": "2024-01-02T18:00:00Z", "score_state": "UNSCORABLE" }),
                json!({ "start": "2024-01-01T18:00:00Z", "score": { "average_heart_rate": 120 } }),
            ],
        );
        let charts = build_charts(&tables);
        assert_eq!(charts.len(), 1);
        let values: Vec<_> = charts[0].points.iter().map(|point| point.value).collect();
        assert_eq!(values, [120.0, 140.0]);
        assert_eq!(charts[0].points[0].label, "01-01");
    }
}
