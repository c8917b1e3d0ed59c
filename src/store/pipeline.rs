//! Aggregation pipeline execution
//!
//! A pipeline is an ordered list of stages, each consuming the rows produced
//! by the previous one:
//!
//! - `Match` keeps rows accepted by a filter
//! - `Unwind` expands an array field into one row per element
//! - `Group` folds rows sharing a key and computes accumulators
//! - `Count` replaces the rows with a single `{name: n}` row
//!
//! `Count` over zero rows yields zero rows, not `{name: 0}`. Callers that
//! want a number must treat the empty result as zero.

use serde_json::{Map, Number, Value};

use super::filter::{lookup, values_equal, Filter};
use super::ID_FIELD;

/// Group accumulator
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Arithmetic mean of the numeric values at a field path.
    /// Non-numeric and missing values are ignored; no numeric values gives null.
    Avg(String),
}

/// Group stage definition
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Field path whose value becomes the output `_id`
    pub by: String,
    /// Output field name and accumulator, in output order
    pub accumulators: Vec<(String, Accumulator)>,
}

/// Pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    Unwind(String),
    Group(Group),
    Count(String),
}

/// Ordered aggregation pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching(mut self, filter: Filter) -> Self {
        self.stages.push(Stage::Match(filter));
        self
    }

    pub fn unwind(mut self, field: impl Into<String>) -> Self {
        self.stages.push(Stage::Unwind(field.into()));
        self
    }

    pub fn group(mut self, by: impl Into<String>, accumulators: Vec<(String, Accumulator)>) -> Self {
        self.stages.push(Stage::Group(Group {
            by: by.into(),
            accumulators,
        }));
        self
    }

    pub fn count(mut self, name: impl Into<String>) -> Self {
        self.stages.push(Stage::Count(name.into()));
        self
    }

    /// Run the pipeline over an input row set
    pub fn execute(&self, input: Vec<Value>) -> Vec<Value> {
        self.stages
            .iter()
            .fold(input, |rows, stage| run_stage(stage, rows))
    }
}

fn run_stage(stage: &Stage, rows: Vec<Value>) -> Vec<Value> {
    match stage {
        Stage::Match(filter) => rows.into_iter().filter(|row| filter.matches(row)).collect(),
        Stage::Unwind(field) => rows.into_iter().flat_map(|row| unwind_row(row, field)).collect(),
        Stage::Group(group) => group_rows(group, rows),
        Stage::Count(name) => {
            if rows.is_empty() {
                return Vec::new();
            }
            let mut out = Map::new();
            out.insert(name.clone(), Value::from(rows.len() as u64));
            vec![Value::Object(out)]
        }
    }
}

fn unwind_row(row: Value, field: &str) -> Vec<Value> {
    let elements = match row.get(field) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        // Scalars pass through as a single row
        Some(_) => return vec![row],
    };

    elements
        .into_iter()
        .map(|element| {
            let mut expanded = row.clone();
            if let Some(obj) = expanded.as_object_mut() {
                obj.insert(field.to_string(), element);
            }
            expanded
        })
        .collect()
}

/// Running state for one group key. Averages are kept as a running mean
/// and count so large scores never overflow an intermediate sum.
struct GroupState {
    key: Value,
    averages: Vec<(f64, u64)>,
}

fn group_rows(group: &Group, rows: Vec<Value>) -> Vec<Value> {
    // Groups keep first-seen order
    let mut states: Vec<GroupState> = Vec::new();

    for row in &rows {
        let key = lookup(row, &group.by).cloned().unwrap_or(Value::Null);
        let idx = match states.iter().position(|s| values_equal(&s.key, &key)) {
            Some(idx) => idx,
            None => {
                states.push(GroupState {
                    key,
                    averages: vec![(0.0, 0); group.accumulators.len()],
                });
                states.len() - 1
            }
        };

        for (slot, (_, acc)) in group.accumulators.iter().enumerate() {
            match acc {
                Accumulator::Avg(path) => {
                    if let Some(n) = lookup(row, path).and_then(Value::as_f64) {
                        let (mean, count) = &mut states[idx].averages[slot];
                        *count += 1;
                        *mean += (n - *mean) / *count as f64;
                    }
                }
            }
        }
    }

    states
        .into_iter()
        .map(|state| {
            let mut out = Map::new();
            out.insert(ID_FIELD.to_string(), state.key);
            for ((name, _), (mean, count)) in group.accumulators.iter().zip(state.averages) {
                let value = if count == 0 {
                    Value::Null
                } else {
                    Number::from_f64(mean)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                };
                out.insert(name.clone(), value);
            }
            Value::Object(out)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn students() -> Vec<Value> {
        vec![
            json!({"_id": "a", "assignments": [
                {"assignmentId": 1, "score": 80},
                {"assignmentId": 2, "score": 100}
            ]}),
            json!({"_id": "b", "assignments": []}),
            json!({"_id": "c"}),
        ]
    }

    fn average_for(id: &str) -> Pipeline {
        Pipeline::new()
            .matching(Filter::by_id(id))
            .unwind("assignments")
            .group(
                "_id",
                vec![(
                    "overallGrade".to_string(),
                    Accumulator::Avg("assignments.score".into()),
                )],
            )
    }

    #[test]
    fn test_count_rows() {
        let out = Pipeline::new().count("studentCount").execute(students());
        assert_eq!(out, vec![json!({"studentCount": 3})]);
    }

    #[test]
    fn test_count_on_empty_input_yields_nothing() {
        let out = Pipeline::new().count("studentCount").execute(Vec::new());
        assert!(out.is_empty());
    }

    #[test]
    fn test_unwind_expands_arrays() {
        let out = Pipeline::new().unwind("assignments").execute(students());
        // Only "a" has assignments; empty and missing arrays drop the row
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["assignments"]["score"], 80);
        assert_eq!(out[1]["assignments"]["score"], 100);
        assert_eq!(out[1]["_id"], "a");
    }

    #[test]
    fn test_unwind_passes_scalars_through() {
        let out = Pipeline::new()
            .unwind("tag")
            .execute(vec![json!({"tag": "x"})]);
        assert_eq!(out, vec![json!({"tag": "x"})]);
    }

    #[test]
    fn test_average_grade() {
        let out = average_for("a").execute(students());
        assert_eq!(out, vec![json!({"_id": "a", "overallGrade": 90.0})]);
    }

    #[test]
    fn test_average_for_student_without_assignments_is_empty() {
        assert!(average_for("b").execute(students()).is_empty());
        assert!(average_for("c").execute(students()).is_empty());
    }

    #[test]
    fn test_average_for_missing_student_is_empty() {
        assert!(average_for("zzz").execute(students()).is_empty());
    }

    #[test]
    fn test_average_keeps_full_precision() {
        let rows = vec![json!({"_id": "x", "assignments": [
            {"score": 1}, {"score": 2}, {"score": 2}
        ]})];
        let out = average_for("x").execute(rows);
        let avg = out[0]["overallGrade"].as_f64().unwrap();
        assert!((avg - 5.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_ignores_non_numeric() {
        let rows = vec![json!({"_id": "x", "assignments": [
            {"score": "n/a"}, {"score": 50}
        ]})];
        let out = average_for("x").execute(rows);
        assert_eq!(out[0]["overallGrade"], 50.0);
    }

    #[test]
    fn test_group_keeps_first_seen_order() {
        let rows = vec![
            json!({"k": "b", "v": 1}),
            json!({"k": "a", "v": 3}),
            json!({"k": "b", "v": 3}),
        ];
        let out = Pipeline::new()
            .group("k", vec![("avg".to_string(), Accumulator::Avg("v".into()))])
            .execute(rows);
        assert_eq!(
            out,
            vec![
                json!({"_id": "b", "avg": 2.0}),
                json!({"_id": "a", "avg": 3.0}),
            ]
        );
    }

    #[test]
    fn test_average_of_huge_scores_stays_finite() {
        let rows = vec![json!({"_id": "x", "assignments": [
            {"score": 1e308}, {"score": 1e308}
        ]})];
        let out = average_for("x").execute(rows);
        assert_eq!(out[0]["overallGrade"], 1e308);
    }
}
