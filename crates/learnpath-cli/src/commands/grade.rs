//! The `learnpath grade` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use learnpath_core::model::{ContentItem, RawExercise, ScoringResult, StudentView, Submission};
use learnpath_core::transcript::render_transcript;
use learnpath_core::Evaluator;
use learnpath_store::config::load_config_from;

pub fn execute(
    exercise_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let raw = load_exercise(&exercise_path)?;
    let answers = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers: {}", answers_path.display()))?;
    let submission: Submission = serde_json::from_str(&answers)
        .with_context(|| format!("failed to parse answers: {}", answers_path.display()))?;

    let exercise = raw.definition()?;
    let result = Evaluator::new(config.evaluator_config()).evaluate(&exercise, &submission);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result.student_view())?);
        }
        "markdown" | "md" => {
            print!("{}", render_transcript(&exercise, &submission, &result));
            if !result.pending_review {
                println!("**Score**: {}/{}", result.final_score, result.max_score);
            }
        }
        _ => print_text(&exercise.title, &exercise.content, &result),
    }

    Ok(())
}

fn load_exercise(path: &Path) -> Result<RawExercise> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exercise: {}", path.display()))?;

    let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
    if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse exercise TOML: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse exercise JSON: {}", path.display()))
    }
}

fn print_text(title: &str, content: &[ContentItem], result: &ScoringResult) {
    if !title.is_empty() {
        println!("Exercise: {title}");
    }

    match result.student_view() {
        StudentView::PendingReview => {
            println!("Submitted. This exercise is reviewed by the teacher.");
        }
        StudentView::Scored {
            final_score,
            max_score,
            score_percentage,
            per_item_correctness,
        } => {
            println!(
                "Score: {final_score}/{max_score} ({score_percentage:.2}% of {} gradable item(s))",
                result.gradable_count
            );
            for (i, correct) in per_item_correctness.iter().enumerate() {
                let label = content
                    .get(i)
                    .and_then(|item| item.question.as_deref().or(item.context.as_deref()))
                    .unwrap_or("");
                let mark = match correct {
                    Some(true) => "correct",
                    Some(false) => "incorrect",
                    None => "not graded",
                };
                println!("  {}. [{mark}] {label}", i + 1);
            }
            if result.is_perfect() {
                println!("Perfect score!");
            }
        }
    }
}
