//! TOML learning module parser.
//!
//! Loads learning modules from TOML files and directories, and validates
//! authoring invariants the engine relies on (unique task orders, known
//! exercise types, sensible answer keys).

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Difficulty, ExerciseType, LearningModule, Lesson, RawExercise};

/// Intermediate TOML structure for parsing module files.
#[derive(Debug, Deserialize)]
struct TomlModuleFile {
    module: TomlModuleHeader,
    #[serde(default)]
    lessons: Vec<Lesson>,
    #[serde(default)]
    exercises: Vec<RawExercise>,
}

#[derive(Debug, Deserialize)]
struct TomlModuleHeader {
    code: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    is_premium: bool,
}

/// Parse a single TOML file into a `LearningModule`.
pub fn parse_module(path: &Path) -> Result<LearningModule> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read module file: {}", path.display()))?;

    parse_module_str(&content, path)
}

/// Parse a TOML string into a `LearningModule`.
pub fn parse_module_str(content: &str, source_path: &Path) -> Result<LearningModule> {
    let parsed: TomlModuleFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(LearningModule {
        code: parsed.module.code,
        name: parsed.module.name,
        description: parsed.module.description,
        difficulty: parsed.module.difficulty,
        skills: parsed.module.skills,
        is_premium: parsed.module.is_premium,
        lessons: parsed.lessons,
        exercises: parsed.exercises,
    })
}

/// Recursively load all `.toml` module files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_module_directory(dir: &Path) -> Result<Vec<LearningModule>> {
    let mut modules = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            modules.extend(load_module_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_module(&path) {
                Ok(module) => modules.push(module),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(modules)
}

/// Load a single file or every module under a directory.
pub fn load_modules(path: &Path) -> Result<Vec<LearningModule>> {
    if path.is_dir() {
        load_module_directory(path)
    } else {
        Ok(vec![parse_module(path)?])
    }
}

/// A warning from module validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The lesson or exercise ID (if applicable).
    pub task_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn task(id: &str, message: impl Into<String>) -> Self {
        Self {
            task_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a module for authoring mistakes.
pub fn validate_module(module: &LearningModule) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if module.code.trim().is_empty() {
        warnings.push(ValidationWarning {
            task_id: None,
            message: "module code is empty".into(),
        });
    }

    // Orders and ids must be unique within each kind
    let mut lesson_ids = HashSet::new();
    let mut lesson_orders = HashSet::new();
    for lesson in &module.lessons {
        if !lesson_ids.insert(&lesson.id) {
            warnings.push(ValidationWarning::task(
                &lesson.id,
                format!("duplicate lesson ID: {}", lesson.id),
            ));
        }
        if !lesson_orders.insert(lesson.order) {
            warnings.push(ValidationWarning::task(
                &lesson.id,
                format!("duplicate lesson order: {}", lesson.order),
            ));
        }
    }

    let mut exercise_ids = HashSet::new();
    let mut exercise_orders = HashSet::new();
    for exercise in &module.exercises {
        if !exercise_ids.insert(&exercise.id) {
            warnings.push(ValidationWarning::task(
                &exercise.id,
                format!("duplicate exercise ID: {}", exercise.id),
            ));
        }
        if !exercise_orders.insert(exercise.order) {
            warnings.push(ValidationWarning::task(
                &exercise.id,
                format!("duplicate exercise order: {}", exercise.order),
            ));
        }
    }

    for exercise in &module.exercises {
        warnings.extend(validate_exercise(exercise));
    }

    warnings
}

fn validate_exercise(exercise: &RawExercise) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let id = exercise.id.as_str();

    if let Err(e) = exercise.exercise_type.parse::<ExerciseType>() {
        warnings.push(ValidationWarning::task(id, e.to_string()));
    }

    if exercise.exercise_content.is_empty() {
        warnings.push(ValidationWarning::task(id, "exercise has no content items"));
    }

    if exercise.correct_answers.len() > exercise.exercise_content.len() {
        warnings.push(ValidationWarning::task(
            id,
            format!(
                "{} expected answers for {} content items; extra answers are ignored",
                exercise.correct_answers.len(),
                exercise.exercise_content.len()
            ),
        ));
    }

    if !exercise.max_score.is_finite() || exercise.max_score < 0.0 {
        warnings.push(ValidationWarning::task(
            id,
            format!("max_score must be non-negative, got {}", exercise.max_score),
        ));
    }

    let gradable = exercise
        .exercise_content
        .iter()
        .any(|c| c.answer_type.is_gradable());
    if exercise.is_instant_scored && !gradable {
        warnings.push(ValidationWarning::task(
            id,
            "instant-scored exercise has no gradable items and always scores 0",
        ));
    }

    warnings
}
