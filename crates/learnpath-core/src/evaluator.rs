//! Exercise evaluator.
//!
//! Scores one submission against an exercise definition. Grading is a pure
//! function of its inputs: malformed answers and short answer keys degrade to
//! defaults, and the same inputs always produce the same result, including
//! for teacher-reviewed exercises (those are tagged `pending_review`).

use anyhow::{Context, Result};

use crate::error::EngineError;
use crate::model::{ExerciseDefinition, ExerciseType, RawExercise, ScoringResult, Submission};
use crate::statistics::{normalize_max_score, ratio_percentage, scale_score, RoundingPolicy};
use crate::traits::ExerciseDefinitionStore;

/// How a single answer is compared with its expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingRule {
    /// Exact match after trimming surrounding whitespace and lowercasing.
    NormalizedExact,
}

impl GradingRule {
    pub fn for_type(exercise_type: ExerciseType) -> Self {
        match exercise_type {
            ExerciseType::MultipleChoice
            | ExerciseType::CrosswordPuzzle
            | ExerciseType::DragAndDrop
            | ExerciseType::FillInTheBlanks
            | ExerciseType::ImagesWithInput
            | ExerciseType::TextWithInput
            | ExerciseType::TextWithQuestions => GradingRule::NormalizedExact,
        }
    }

    pub fn matches(self, submitted: &str, expected: &str) -> bool {
        match self {
            GradingRule::NormalizedExact => {
                submitted.trim().to_lowercase() == expected.trim().to_lowercase()
            }
        }
    }
}

/// Configuration for the evaluator.
#[derive(Debug, Clone, Default)]
pub struct EvaluatorConfig {
    pub rounding: RoundingPolicy,
}

/// Grades submissions with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Score `submission` against `exercise`.
    pub fn evaluate(&self, exercise: &ExerciseDefinition, submission: &Submission) -> ScoringResult {
        let rounding = self.config.rounding;
        let rule = GradingRule::for_type(exercise.exercise_type);

        let mut per_item_correctness = Vec::with_capacity(exercise.content.len());
        let mut correct_count = 0usize;
        let mut gradable_count = 0usize;

        for (position, item) in exercise.content.iter().enumerate() {
            if !item.answer_type.is_gradable() {
                per_item_correctness.push(None);
                continue;
            }
            gradable_count += 1;

            match exercise.expected(position) {
                // No objective answer: any response is accepted.
                None => {
                    correct_count += 1;
                    per_item_correctness.push(None);
                }
                Some(expected) => {
                    let correct = rule.matches(submission.answer(position), expected);
                    if correct {
                        correct_count += 1;
                    }
                    per_item_correctness.push(Some(correct));
                }
            }
        }

        let score_percentage = ratio_percentage(correct_count, gradable_count);
        let max_score = normalize_max_score(exercise.max_score, rounding);
        let final_score = if gradable_count == 0 || max_score == 0 {
            0
        } else {
            scale_score(score_percentage, exercise.max_score, rounding).min(max_score)
        };

        tracing::debug!(
            exercise = %exercise.id,
            exercise_type = %exercise.exercise_type,
            correct_count,
            gradable_count,
            final_score,
            max_score,
            "evaluated submission"
        );

        ScoringResult {
            final_score,
            max_score,
            score_percentage,
            correct_count,
            gradable_count,
            per_item_correctness,
            pending_review: !exercise.is_instant_scored,
        }
    }

    /// Check the type tag of a stored exercise, then score it.
    pub fn evaluate_raw(
        &self,
        exercise: &RawExercise,
        submission: &Submission,
    ) -> Result<ScoringResult, EngineError> {
        let definition = exercise.definition()?;
        Ok(self.evaluate(&definition, submission))
    }

    /// Look up an exercise by id and score the submission against it.
    pub async fn grade(
        &self,
        store: &dyn ExerciseDefinitionStore,
        exercise_id: &str,
        submission: &Submission,
    ) -> Result<ScoringResult> {
        let raw = store
            .exercise(exercise_id)
            .await
            .with_context(|| format!("failed to fetch exercise {exercise_id}"))?
            .ok_or_else(|| anyhow::anyhow!("exercise not found: {exercise_id}"))?;
        Ok(self.evaluate_raw(&raw, submission)?)
    }
}

/// Score with the default configuration (round-half-up).
pub fn evaluate(exercise: &ExerciseDefinition, submission: &Submission) -> ScoringResult {
    Evaluator::default().evaluate(exercise, submission)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::model::{AnswerMode, ContentItem};

    fn exercise(answers: &[Option<&str>], items: usize, max_score: f64) -> ExerciseDefinition {
        ExerciseDefinition {
            id: "ex".into(),
            title: "Capitals".into(),
            exercise_type: ExerciseType::TextWithInput,
            content: (0..items).map(|i| ContentItem::question(format!("Q{i}"))).collect(),
            correct_answers: answers.iter().map(|a| a.map(str::to_string)).collect(),
            max_score,
            is_instant_scored: true,
        }
    }

    #[test]
    fn half_right_scores_half() {
        let ex = exercise(&[Some("paris"), Some("london")], 2, 10.0);
        let sub = Submission::new()
            .with_answer(0, "Paris")
            .with_answer(1, "madrid");
        let result = evaluate(&ex, &sub);
        assert_eq!(result.final_score, 5);
        assert_eq!(result.max_score, 10);
        assert_eq!(result.per_item_correctness, vec![Some(true), Some(false)]);
        assert!(!result.pending_review);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let ex = exercise(&[Some(" paris ")], 1, 1.0);
        let sub = Submission::new().with_answer(0, "Paris");
        let result = evaluate(&ex, &sub);
        assert_eq!(result.per_item_correctness, vec![Some(true)]);
        assert!(result.is_perfect());
    }

    #[test]
    fn no_partial_or_fuzzy_credit() {
        let ex = exercise(&[Some("london")], 1, 10.0);
        let sub = Submission::new().with_answer(0, "londn");
        assert_eq!(evaluate(&ex, &sub).final_score, 0);
        let sub = Submission::new().with_answer(0, "london bridge");
        assert_eq!(evaluate(&ex, &sub).final_score, 0);
    }

    #[test]
    fn missing_expected_answer_is_always_correct() {
        let ex = exercise(&[Some("paris")], 3, 3.0);
        let sub = Submission::new()
            .with_answer(0, "paris")
            .with_answer(1, "anything at all");
        let result = evaluate(&ex, &sub);
        assert_eq!(result.correct_count, 3);
        assert_eq!(result.per_item_correctness, vec![Some(true), None, None]);
        assert_eq!(result.final_score, 3);
    }

    #[test]
    fn zero_answer_key_accepts_anything() {
        let raw: RawExercise = serde_json::from_str(
            r#"{
                "exercise_type": "text_with_input",
                "exercise_content": [{"question": "How many?"}],
                "correct_answers": [0],
                "max_score": 10,
                "is_instant_scored": true
            }"#,
        )
        .unwrap();
        let result = Evaluator::default()
            .evaluate_raw(&raw, &Submission::new().with_answer(0, "five"))
            .unwrap();
        assert_eq!(result.per_item_correctness, vec![None]);
        assert_eq!(result.final_score, 10);
    }

    #[test]
    fn missing_submission_reads_as_empty() {
        let ex = exercise(&[Some("paris"), Some("rome")], 2, 4.0);
        let result = evaluate(&ex, &Submission::new());
        assert_eq!(result.per_item_correctness, vec![Some(false), Some(false)]);
        assert_eq!(result.final_score, 0);
    }

    #[test]
    fn informational_items_are_excluded() {
        let mut ex = exercise(&[None, Some("blue"), Some("green")], 3, 10.0);
        ex.content[0] = ContentItem::informational("Read the passage.");
        let sub = Submission::new()
            .with_answer(1, "Blue")
            .with_answer(2, "red");
        let result = evaluate(&ex, &sub);
        assert_eq!(result.gradable_count, 2);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.per_item_correctness, vec![None, Some(true), Some(false)]);
        assert_eq!(result.final_score, 5);
    }

    #[test]
    fn no_gradable_items_scores_zero() {
        let mut ex = exercise(&[], 2, 10.0);
        for item in &mut ex.content {
            item.answer_type = AnswerMode::NoInput;
        }
        let result = evaluate(&ex, &Submission::new());
        assert_eq!(result.final_score, 0);
        assert_eq!(result.score_percentage, 0.0);
        assert_eq!(result.per_item_correctness, vec![None, None]);
    }

    #[test]
    fn empty_content_scores_zero() {
        let ex = exercise(&[Some("x")], 0, 10.0);
        let result = evaluate(&ex, &Submission::new().with_answer(0, "x"));
        assert_eq!(result.final_score, 0);
        assert!(result.per_item_correctness.is_empty());
    }

    #[test]
    fn surplus_expected_answers_are_ignored() {
        let ex = exercise(&[Some("a"), Some("b"), Some("c")], 1, 2.0);
        let result = evaluate(&ex, &Submission::new().with_answer(0, "A"));
        assert_eq!(result.per_item_correctness, vec![Some(true)]);
        assert_eq!(result.final_score, 2);
    }

    #[test]
    fn score_rounds_half_up() {
        // 1 of 2 correct on a 5-point exercise is 2.5 points.
        let ex = exercise(&[Some("a"), Some("b")], 2, 5.0);
        let sub = Submission::new().with_answer(0, "a");
        assert_eq!(evaluate(&ex, &sub).final_score, 3);

        let bankers = Evaluator::new(EvaluatorConfig {
            rounding: RoundingPolicy::HalfEven,
        });
        assert_eq!(bankers.evaluate(&ex, &sub).final_score, 2);
    }

    #[test]
    fn score_never_exceeds_max() {
        for max in [0.0, 0.4, 1.0, 2.5, 3.0, 7.0, 10.0, 99.5] {
            for correct in 0..=3usize {
                let ex = exercise(&[Some("a"), Some("a"), Some("a")], 3, max);
                let sub: Submission = (0..correct).map(|i| (i, "a")).collect();
                let result = evaluate(&ex, &sub);
                assert!(
                    result.final_score <= result.max_score,
                    "max {max}, correct {correct}: {result:?}"
                );
            }
        }
    }

    #[test]
    fn negative_max_score_scores_zero() {
        let ex = exercise(&[Some("a")], 1, -10.0);
        let result = evaluate(&ex, &Submission::new().with_answer(0, "a"));
        assert_eq!(result.max_score, 0);
        assert_eq!(result.final_score, 0);
        assert!(!result.is_perfect());
    }

    #[test]
    fn deferred_exercise_is_pending_but_scored() {
        let mut ex = exercise(&[Some("paris")], 1, 10.0);
        ex.is_instant_scored = false;
        let result = evaluate(&ex, &Submission::new().with_answer(0, "paris"));
        assert!(result.pending_review);
        assert_eq!(result.final_score, 10);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let ex = exercise(&[Some("paris"), None, Some("rome")], 3, 7.0);
        let sub = Submission::new().with_answer(0, "PARIS").with_answer(2, "milan");
        assert_eq!(evaluate(&ex, &sub), evaluate(&ex, &sub));
    }

    #[test]
    fn every_type_uses_normalized_exact() {
        for t in ExerciseType::ALL {
            let rule = GradingRule::for_type(t);
            assert!(rule.matches("  Hello ", "hello"));
            assert!(!rule.matches("hell", "hello"));
        }
    }

    #[test]
    fn evaluate_raw_rejects_unknown_type() {
        let raw = RawExercise {
            exercise_type: "word_search".into(),
            ..Default::default()
        };
        let err = Evaluator::default()
            .evaluate_raw(&raw, &Submission::new())
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownExerciseType("word_search".into()));
    }

    struct FixedStore(HashMap<String, RawExercise>);

    #[async_trait]
    impl ExerciseDefinitionStore for FixedStore {
        async fn exercise(&self, exercise_id: &str) -> anyhow::Result<Option<RawExercise>> {
            Ok(self.0.get(exercise_id).cloned())
        }
    }

    #[tokio::test]
    async fn grade_looks_up_exercise() {
        let raw = RawExercise {
            id: "0001E0001".into(),
            exercise_type: "fill_in_the_blanks".into(),
            exercise_content: vec![ContentItem::question("The sky is ___")],
            correct_answers: vec![Some("blue".into())],
            max_score: 4.0,
            is_instant_scored: true,
            ..Default::default()
        };
        let store = FixedStore(HashMap::from([(raw.id.clone(), raw)]));
        let evaluator = Evaluator::default();

        let result = evaluator
            .grade(&store, "0001E0001", &Submission::new().with_answer(0, "Blue"))
            .await
            .unwrap();
        assert_eq!(result.final_score, 4);

        let missing = evaluator
            .grade(&store, "nope", &Submission::new())
            .await
            .unwrap_err();
        assert!(missing.to_string().contains("exercise not found"));
    }
}
