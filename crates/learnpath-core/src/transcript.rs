//! Markdown transcript of a submission, for teacher review.

use crate::model::{ExerciseDefinition, ScoringResult, Submission};

/// Render each content item with the student's answer.
///
/// Correctness lines are only included for instant-scored exercises, for
/// every item that collects an answer.
pub fn render_transcript(
    exercise: &ExerciseDefinition,
    submission: &Submission,
    result: &ScoringResult,
) -> String {
    let mut md = String::new();

    for (position, item) in exercise.content.iter().enumerate() {
        if let Some(question) = &item.question {
            md.push_str(&format!("**Question**: {question}\n"));
        }
        if let Some(context) = &item.context {
            md.push_str(&format!("**Context**: {context}\n"));
        }
        if item.answer_type.is_gradable() {
            md.push_str(&format!(
                "**Student's Answer**: {}\n",
                submission.answer(position)
            ));
            if exercise.is_instant_scored {
                // Items without an expected answer accept anything.
                let correct = result
                    .per_item_correctness
                    .get(position)
                    .copied()
                    .flatten()
                    .unwrap_or(true);
                md.push_str(&format!("**Is Correct**: {correct}\n"));
            }
        }
        md.push('\n');
    }

    md
}
