//! Rollup of completion percents from employees to departments and companies.
//!
//! Completion flows upwards in four steps:
//!
//! 1. an employee's completion is the mean of their metric completions;
//! 2. a department's average is the mean over its linked users, employees and
//!    supervisors alike, truncated toward zero;
//! 3. a root department's average is the rounded mean of its direct
//!    children's averages, or its own average when it has no children;
//! 4. the company average is the mean over employees that have metrics.

use crate::aggregator::MetricPreview;
use crate::calculation::MetricCalculation;
use perfdash_core::{Department, DepartmentId, DepartmentMember, HierarchyEdge, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Completion of one employee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeScore {
    /// Employee id.
    pub user_id: UserId,
    /// Employee name.
    pub name: String,
    /// Mean completion percent of the employee's metrics.
    pub completion_percent: f64,
    /// Number of metrics the employee owns.
    pub metric_count: usize,
}

/// Average completion of one department.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentScore {
    /// Department id.
    pub department_id: DepartmentId,
    /// Department name.
    pub name: String,
    /// Average completion percent.
    pub average: i64,
    /// Number of distinct users linked to the department.
    pub member_count: usize,
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean completion percent of `items`, 0 with no items.
#[must_use]
pub fn employee_completion(items: &[MetricPreview]) -> f64 {
    mean(items.iter().map(|item| item.completion_percent)).unwrap_or(0.0)
}

/// Mean of `completions` truncated toward zero, 0 when empty.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn department_average(completions: impl IntoIterator<Item = f64>) -> i64 {
    mean(completions).map_or(0, |avg| avg.trunc() as i64)
}

/// Average of every department that has members, with the number of
/// distinct users behind it.
///
/// A user linked twice to the same department, for example as employee and
/// as supervisor, counts once. Users without a completion entry count as 0.
#[must_use]
pub fn department_averages(
    members: &[DepartmentMember],
    completions: &HashMap<UserId, f64>,
) -> HashMap<DepartmentId, (i64, usize)> {
    let mut users: HashMap<&DepartmentId, Vec<&UserId>> = HashMap::new();
    let mut seen: HashSet<(&DepartmentId, &UserId)> = HashSet::new();
    for member in members {
        if seen.insert((&member.department_id, &member.user_id)) {
            users
                .entry(&member.department_id)
                .or_default()
                .push(&member.user_id);
        }
    }

    users
        .into_iter()
        .map(|(department, users)| {
            let average = department_average(
                users
                    .iter()
                    .map(|user| completions.get(*user).copied().unwrap_or(0.0)),
            );
            (department.clone(), (average, users.len()))
        })
        .collect()
}

/// Departments that are nobody's descendant, in input order.
#[must_use]
pub fn root_departments<'a>(
    departments: &'a [Department],
    edges: &[HierarchyEdge],
) -> Vec<&'a Department> {
    let nested: HashSet<&DepartmentId> = edges
        .iter()
        .filter(|edge| edge.depth > 0)
        .map(|edge| &edge.descendant)
        .collect();
    departments
        .iter()
        .filter(|dept| !nested.contains(&dept.id))
        .collect()
}

/// Rounded mean of the averages of `root`'s direct children; the root's own
/// average when it has none. Departments missing from `averages` count as 0.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn root_average(
    root: &DepartmentId,
    edges: &[HierarchyEdge],
    averages: &HashMap<DepartmentId, i64>,
) -> i64 {
    let average_of = |id: &DepartmentId| averages.get(id).copied().unwrap_or(0);
    let children = edges
        .iter()
        .filter(|edge| edge.depth == 1 && &edge.ancestor == root)
        .map(|edge| average_of(&edge.descendant) as f64);
    mean(children).map_or_else(|| average_of(root), |avg| avg.round() as i64)
}

/// Mean completion over the calculations with a non-zero plan average,
/// 0 when none qualify.
#[must_use]
pub fn key_indicator_average<'a>(
    calculations: impl IntoIterator<Item = &'a MetricCalculation>,
) -> f64 {
    mean(
        calculations
            .into_iter()
            .filter(|calc| calc.plan_average() != 0.0)
            .map(MetricCalculation::completion_percent),
    )
    .unwrap_or(0.0)
}

/// Mean completion of the employees that own at least one metric.
#[must_use]
pub fn company_average(scores: &[EmployeeScore]) -> f64 {
    mean(
        scores
            .iter()
            .filter(|score| score.metric_count > 0)
            .map(|score| score.completion_percent),
    )
    .unwrap_or(0.0)
}

/// Best and worst `size` employees among those that own metrics.
///
/// Ties are broken by ascending employee id in both lists.
#[must_use]
pub fn leaderboards(
    scores: &[EmployeeScore],
    size: usize,
) -> (Vec<EmployeeScore>, Vec<EmployeeScore>) {
    let mut ranked: Vec<&EmployeeScore> = scores
        .iter()
        .filter(|score| score.metric_count > 0)
        .collect();

    ranked.sort_by(|a, b| {
        b.completion_percent
            .total_cmp(&a.completion_percent)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    let best = ranked.iter().take(size).map(|s| (*s).clone()).collect();

    ranked.sort_by(|a, b| {
        a.completion_percent
            .total_cmp(&b.completion_percent)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    let worst = ranked.iter().take(size).map(|s| (*s).clone()).collect();

    (best, worst)
}
