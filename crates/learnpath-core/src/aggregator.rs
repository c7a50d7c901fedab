//! Completion aggregation.
//!
//! Counts how many of a module's tasks appear in a student's completion
//! record. Completed ids are matched per kind with set semantics, so a
//! lesson id listed twice, or an id that also names an exercise, is never
//! double-counted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{CompletionRecord, TaskKind, TaskRef};
use crate::statistics::{whole_percentage, RoundingPolicy};

/// Completion counts for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub progress_percentage: u8,
    /// Completed lessons of this module, in task order.
    pub completed_lessons: Vec<String>,
    /// Completed exercises of this module, in task order.
    pub completed_exercises: Vec<String>,
}

/// Aggregate with round-half-up percentages.
pub fn aggregate(tasks: &[TaskRef], completion: &CompletionRecord) -> Aggregate {
    aggregate_with(tasks, completion, RoundingPolicy::default())
}

pub fn aggregate_with(
    tasks: &[TaskRef],
    completion: &CompletionRecord,
    rounding: RoundingPolicy,
) -> Aggregate {
    let lessons: HashSet<&str> = completion
        .completed(TaskKind::Lesson)
        .iter()
        .map(String::as_str)
        .collect();
    let exercises: HashSet<&str> = completion
        .completed(TaskKind::Exercise)
        .iter()
        .map(String::as_str)
        .collect();

    let mut completed_tasks = 0usize;
    let mut completed_lessons = Vec::new();
    let mut completed_exercises = Vec::new();
    let mut listed: HashSet<(TaskKind, &str)> = HashSet::new();

    for task in tasks {
        let (done, out) = match task.kind {
            TaskKind::Lesson => (lessons.contains(task.id.as_str()), &mut completed_lessons),
            TaskKind::Exercise => (
                exercises.contains(task.id.as_str()),
                &mut completed_exercises,
            ),
        };
        if !done {
            continue;
        }
        completed_tasks += 1;
        if listed.insert((task.kind, task.id.as_str())) {
            out.push(task.id.clone());
        }
    }

    let total_tasks = tasks.len();
    let progress_percentage = whole_percentage(completed_tasks, total_tasks, rounding);

    tracing::debug!(
        total_tasks,
        completed_tasks,
        progress_percentage,
        "aggregated completion"
    );

    Aggregate {
        total_tasks,
        completed_tasks,
        progress_percentage,
        completed_lessons,
        completed_exercises,
    }
}
