//! Core data model types for learnpath.
//!
//! Learning modules, exercises and submissions are authored or captured
//! elsewhere and arrive here as immutable inputs. Progress records and
//! scoring results are derived values, recomputed on every request.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Which kind of assignable unit a task is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Lesson,
    Exercise,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Lesson => write!(f, "lesson"),
            TaskKind::Exercise => write!(f, "exercise"),
        }
    }
}

/// One assignable unit of a module.
///
/// `order` is unique within its kind inside a module. That is checked when
/// modules are authored (see [`crate::parser::validate_module`]), not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef {
    pub kind: TaskKind,
    pub id: String,
    pub order: u32,
}

impl TaskRef {
    pub fn lesson(id: impl Into<String>, order: u32) -> Self {
        Self {
            kind: TaskKind::Lesson,
            id: id.into(),
            order,
        }
    }

    pub fn exercise(id: impl Into<String>, order: u32) -> Self {
        Self {
            kind: TaskKind::Exercise,
            id: id.into(),
            order,
        }
    }
}

/// The task list of one module, in authoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTasks {
    pub module_code: String,
    #[serde(default)]
    pub lessons: Vec<TaskRef>,
    #[serde(default)]
    pub exercises: Vec<TaskRef>,
}

impl ModuleTasks {
    /// Lessons first, then exercises.
    pub fn iter(&self) -> impl Iterator<Item = &TaskRef> + '_ {
        self.lessons.iter().chain(self.exercises.iter())
    }

    pub fn all(&self) -> Vec<TaskRef> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lessons.len() + self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

/// The closed set of exercise types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    MultipleChoice,
    CrosswordPuzzle,
    DragAndDrop,
    FillInTheBlanks,
    ImagesWithInput,
    TextWithInput,
    TextWithQuestions,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 7] = [
        ExerciseType::MultipleChoice,
        ExerciseType::CrosswordPuzzle,
        ExerciseType::DragAndDrop,
        ExerciseType::FillInTheBlanks,
        ExerciseType::ImagesWithInput,
        ExerciseType::TextWithInput,
        ExerciseType::TextWithQuestions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::MultipleChoice => "multiple_choice",
            ExerciseType::CrosswordPuzzle => "crossword_puzzle",
            ExerciseType::DragAndDrop => "drag_and_drop",
            ExerciseType::FillInTheBlanks => "fill_in_the_blanks",
            ExerciseType::ImagesWithInput => "images_with_input",
            ExerciseType::TextWithInput => "text_with_input",
            ExerciseType::TextWithQuestions => "text_with_questions",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        ExerciseType::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| EngineError::UnknownExerciseType(tag.to_string()))
    }
}

/// How the student enters an answer for a content item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerMode {
    /// Multi-line free text.
    #[serde(rename = "textarea")]
    Textarea,
    /// Single-line free text.
    #[default]
    #[serde(rename = "input")]
    Input,
    /// Informational item; no answer is collected.
    #[serde(rename = "none")]
    NoInput,
}

impl AnswerMode {
    pub fn is_gradable(&self) -> bool {
        !matches!(self, AnswerMode::NoInput)
    }
}

/// One gradable unit inside an exercise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, rename = "answerType", alias = "answer_type")]
    pub answer_type: AnswerMode,
}

impl ContentItem {
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            question: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn informational(text: impl Into<String>) -> Self {
        Self {
            context: Some(text.into()),
            question: None,
            answer_type: AnswerMode::NoInput,
        }
    }
}

/// An exercise as stored: the type tag has not been checked yet and expected
/// answers have only been normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExercise {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub exercise_type: String,
    #[serde(default, alias = "content")]
    pub exercise_content: Vec<ContentItem>,
    #[serde(default, deserialize_with = "deserialize_expected_answers")]
    pub correct_answers: Vec<Option<String>>,
    #[serde(default)]
    pub max_score: f64,
    #[serde(default)]
    pub is_instant_scored: bool,
    #[serde(default)]
    pub order: u32,
}

impl RawExercise {
    /// Check the type tag and produce a gradable definition.
    pub fn definition(&self) -> Result<ExerciseDefinition, EngineError> {
        ExerciseDefinition::try_from(self.clone())
    }
}

/// A type-checked exercise ready for grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub title: String,
    pub exercise_type: ExerciseType,
    pub content: Vec<ContentItem>,
    /// Parallel to `content`; `None` (or a missing tail) accepts any answer.
    pub correct_answers: Vec<Option<String>>,
    pub max_score: f64,
    pub is_instant_scored: bool,
}

impl ExerciseDefinition {
    /// Expected answer at `position`, if one exists.
    pub fn expected(&self, position: usize) -> Option<&str> {
        self.correct_answers
            .get(position)
            .and_then(|a| a.as_deref())
    }
}

impl TryFrom<RawExercise> for ExerciseDefinition {
    type Error = EngineError;

    fn try_from(raw: RawExercise) -> Result<Self, Self::Error> {
        let exercise_type = raw.exercise_type.parse()?;
        Ok(Self {
            id: raw.id,
            title: raw.title,
            exercise_type,
            content: raw.exercise_content,
            correct_answers: raw.correct_answers,
            max_score: raw.max_score,
            is_instant_scored: raw.is_instant_scored,
        })
    }
}

/// Expected answers are loosely typed in stored exercises. Blank strings,
/// `null`, `false`, `0` and non-scalar values carry no objective answer.
fn deserialize_expected_answers<'de, D>(deserializer: D) -> Result<Vec<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values.into_iter().map(expected_from_value).collect())
}

fn expected_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Null | Value::Bool(false) | Value::Array(_) | Value::Object(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// A student's answers keyed by content-item position.
///
/// Sparse: missing positions read as the empty string. When deserializing,
/// non-string answers become empty strings and keys that are not positions
/// are dropped, so a malformed payload never fails to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Submission(BTreeMap<usize, String>);

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, position: usize, answer: impl Into<String>) -> Self {
        self.insert(position, answer);
        self
    }

    pub fn insert(&mut self, position: usize, answer: impl Into<String>) {
        self.0.insert(position, answer.into());
    }

    /// The raw answer at `position`, or `""` when none was given.
    pub fn answer(&self, position: usize) -> &str {
        self.0.get(&position).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a submission from loosely typed JSON: an object keyed by
    /// position or an array of answers.
    pub fn from_value(value: Value) -> Self {
        let answer_text = |v: Value| match v {
            Value::String(s) => s,
            _ => String::new(),
        };
        let answers = match value {
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(k, v)| k.trim().parse::<usize>().ok().map(|i| (i, answer_text(v))))
                .collect(),
            Value::Array(items) => items.into_iter().map(answer_text).enumerate().collect(),
            _ => BTreeMap::new(),
        };
        Self(answers)
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for Submission {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(i, s)| (i, s.into())).collect())
    }
}

impl<'de> Deserialize<'de> for Submission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Submission::from_value(Value::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// Completion and progress
// ---------------------------------------------------------------------------

/// Which tasks of a module a student has marked complete.
///
/// Ids are treated as sets: duplicates are tolerated and never double-count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    #[serde(default)]
    pub completed_exercises: Vec<String>,
    /// Score obtained per scored exercise.
    #[serde(default)]
    pub scores: BTreeMap<String, u32>,
}

impl CompletionRecord {
    pub fn completed(&self, kind: TaskKind) -> &[String] {
        match kind {
            TaskKind::Lesson => &self.completed_lessons,
            TaskKind::Exercise => &self.completed_exercises,
        }
    }
}

/// A student's progress through one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// `0..=100`; always `0` when `total_tasks == 0`.
    pub progress_percentage: u8,
    pub completed_lessons: Vec<String>,
    pub completed_exercises: Vec<String>,
    pub module_code: String,
}

impl ProgressRecord {
    /// The record reported when a student has no completion record at all.
    pub fn zero_state(module_code: impl Into<String>) -> Self {
        Self {
            total_tasks: 0,
            completed_tasks: 0,
            progress_percentage: 0,
            completed_lessons: Vec::new(),
            completed_exercises: Vec::new(),
            module_code: module_code.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress_percentage == 100
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub final_score: u32,
    pub max_score: u32,
    /// Unrounded `correct / gradable * 100`.
    pub score_percentage: f64,
    pub correct_count: usize,
    pub gradable_count: usize,
    /// One entry per content item; `None` where there is no objective answer.
    pub per_item_correctness: Vec<Option<bool>>,
    /// The exercise is teacher-reviewed; do not show the score to the student.
    pub pending_review: bool,
}

impl ScoringResult {
    /// Full marks on an exercise that is worth something.
    pub fn is_perfect(&self) -> bool {
        self.max_score > 0 && self.final_score == self.max_score
    }

    /// What the student is allowed to see right after submitting.
    pub fn student_view(&self) -> StudentView {
        if self.pending_review {
            StudentView::PendingReview
        } else {
            StudentView::Scored {
                final_score: self.final_score,
                max_score: self.max_score,
                score_percentage: self.score_percentage,
                per_item_correctness: self.per_item_correctness.clone(),
            }
        }
    }
}

/// A scoring result filtered for the student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StudentView {
    #[serde(rename_all = "camelCase")]
    Scored {
        final_score: u32,
        max_score: u32,
        score_percentage: f64,
        per_item_correctness: Vec<Option<bool>>,
    },
    PendingReview,
}

// ---------------------------------------------------------------------------
// Learning modules
// ---------------------------------------------------------------------------

/// Module difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// Presentation style of a lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Flashcard,
    #[default]
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub lesson_type: LessonType,
    pub order: u32,
}

/// A named collection of lessons and exercises assigned to classrooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningModule {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub exercises: Vec<RawExercise>,
}

impl LearningModule {
    /// Task references in authoring order.
    pub fn tasks(&self) -> ModuleTasks {
        ModuleTasks {
            module_code: self.code.clone(),
            lessons: self
                .lessons
                .iter()
                .map(|l| TaskRef::lesson(l.id.clone(), l.order))
                .collect(),
            exercises: self
                .exercises
                .iter()
                .map(|e| TaskRef::exercise(e.id.clone(), e.order))
                .collect(),
        }
    }

    pub fn exercise(&self, id: &str) -> Option<&RawExercise> {
        self.exercises.iter().find(|e| e.id == id)
    }
}
