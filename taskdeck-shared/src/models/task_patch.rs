/// Partial-update payload and update planner
///
/// A `PATCH /tasks/:id` body is a sparse JSON object; only the keys that
/// are actually present count as "supplied". The planner turns the payload
/// into an [`UpdatePlan`]: the exact ordered list of columns to set and the
/// values to bind, from which the task gateway renders one parameterized
/// `UPDATE` statement.
///
/// Presence and null are different things here and the distinction is
/// load-bearing: `{"priority": null}` clears the priority column, while a
/// payload without the key leaves it untouched. The `priority` field is
/// therefore a double `Option`: the outer layer is presence, the inner
/// layer is the SQL null.
///
/// # Field rules
///
/// - `name`: planned only when supplied and non-empty; an empty or null
///   name is silently omitted (it neither clears the column nor errors)
/// - `priority`: planned whenever the key is present, null binding SQL NULL
/// - `is_completed`: planned whenever the key is present, bound as boolean
///
/// Plan order is the struct's declaration order (name, priority,
/// is_completed), not the payload's key order: a typed payload cannot
/// observe how the JSON keys were arranged, and a fixed order keeps the
/// rendered SQL reproducible either way.
///
/// # Example
///
/// ```
/// use taskdeck_shared::models::task_patch::{BindValue, TaskPatch};
///
/// let patch: TaskPatch = serde_json::from_str(r#"{"priority": null}"#).unwrap();
/// let plan = patch.into_plan();
/// assert_eq!(
///     plan.assignments(),
///     &[("priority", BindValue::Int(None))]
/// );
/// assert_eq!(plan.set_clause(3), "priority = $3");
/// ```
use serde::{Deserialize, Deserializer};

/// Sparse partial-update payload for a task
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    /// New task name; empty and null are treated as "not supplied"
    #[serde(default)]
    pub name: Option<String>,

    /// New priority; outer `Option` is key presence, inner is SQL null
    #[serde(default, deserialize_with = "present_maybe_null")]
    pub priority: Option<Option<i32>>,

    /// New completion flag
    #[serde(default)]
    pub is_completed: Option<bool>,
}

/// Deserializer invoked only when the key is present, so a JSON null
/// becomes `Some(None)` instead of collapsing into "absent".
fn present_maybe_null<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

/// A value bound into one planned column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    /// Text column
    Text(String),

    /// Nullable integer column; `None` binds SQL NULL
    Int(Option<i32>),

    /// Boolean column
    Bool(bool),
}

/// Ordered list of `(column, value)` assignments for one UPDATE
///
/// Column order is the patch struct's declaration order (name, priority,
/// is_completed), so the rendered SQL is reproducible. An empty plan means
/// the caller should skip the statement entirely and report zero affected
/// rows; it is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlan {
    assignments: Vec<(&'static str, BindValue)>,
}

impl UpdatePlan {
    /// True when no column was supplied
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of planned columns
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// The planned assignments in bind order
    pub fn assignments(&self) -> &[(&'static str, BindValue)] {
        &self.assignments
    }

    /// Renders the `SET` fragment with placeholders numbered from
    /// `first_placeholder`, e.g. `"name = $3, priority = $4"`.
    pub fn set_clause(&self, first_placeholder: usize) -> String {
        self.assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ${}", column, first_placeholder + i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Consumes the plan, yielding the values in bind order
    pub fn into_values(self) -> impl Iterator<Item = BindValue> {
        self.assignments.into_iter().map(|(_, value)| value)
    }
}

impl TaskPatch {
    /// Computes the update plan for this payload
    ///
    /// Pure function; downstream execution errors are the gateway's
    /// concern.
    pub fn into_plan(self) -> UpdatePlan {
        let mut assignments = Vec::new();

        if let Some(name) = self.name {
            if !name.is_empty() {
                assignments.push(("name", BindValue::Text(name)));
            }
        }

        if let Some(priority) = self.priority {
            assignments.push(("priority", BindValue::Int(priority)));
        }

        if let Some(is_completed) = self.is_completed {
            assignments.push(("is_completed", BindValue::Bool(is_completed)));
        }

        UpdatePlan { assignments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TaskPatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_payload_plans_nothing() {
        let plan = parse("{}").into_plan();
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }

    #[test]
    fn test_explicit_null_priority_is_planned_as_sql_null() {
        let plan = parse(r#"{"priority": null}"#).into_plan();
        assert_eq!(plan.assignments(), &[("priority", BindValue::Int(None))]);
    }

    #[test]
    fn test_absent_priority_is_not_planned() {
        let plan = parse(r#"{"is_completed": true}"#).into_plan();
        assert_eq!(
            plan.assignments(),
            &[("is_completed", BindValue::Bool(true))]
        );
    }

    #[test]
    fn test_empty_name_is_silently_omitted() {
        let plan = parse(r#"{"name": "", "priority": 5}"#).into_plan();
        assert_eq!(plan.assignments(), &[("priority", BindValue::Int(Some(5)))]);
    }

    #[test]
    fn test_null_name_is_silently_omitted() {
        let plan = parse(r#"{"name": null, "priority": 5}"#).into_plan();
        assert_eq!(plan.assignments(), &[("priority", BindValue::Int(Some(5)))]);
    }

    #[test]
    fn test_full_payload_is_ordered_by_field() {
        let plan =
            parse(r#"{"is_completed": false, "priority": 2, "name": "Buy milk"}"#).into_plan();
        assert_eq!(
            plan.assignments(),
            &[
                ("name", BindValue::Text("Buy milk".to_string())),
                ("priority", BindValue::Int(Some(2))),
                ("is_completed", BindValue::Bool(false)),
            ]
        );
    }

    #[test]
    fn test_set_clause_numbering_is_deterministic() {
        let plan = parse(r#"{"name": "x", "priority": 1, "is_completed": true}"#).into_plan();
        assert_eq!(
            plan.set_clause(3),
            "name = $3, priority = $4, is_completed = $5"
        );

        let plan = parse(r#"{"is_completed": true}"#).into_plan();
        assert_eq!(plan.set_clause(3), "is_completed = $3");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let plan = parse(r#"{"color": "red", "priority": 1}"#).into_plan();
        assert_eq!(plan.assignments(), &[("priority", BindValue::Int(Some(1)))]);
    }

    #[test]
    fn test_into_values_matches_assignment_order() {
        let plan = parse(r#"{"name": "x", "is_completed": true}"#).into_plan();
        let values: Vec<BindValue> = plan.into_values().collect();
        assert_eq!(
            values,
            vec![BindValue::Text("x".to_string()), BindValue::Bool(true)]
        );
    }
}
