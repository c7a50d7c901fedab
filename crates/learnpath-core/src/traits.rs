//! Collaborator traits the engine reads from.
//!
//! The engine owns no storage. These async traits are implemented by the
//! `learnpath-store` crate (and by test doubles); every fetch is read-only.

use async_trait::async_trait;

use crate::model::{CompletionRecord, ModuleTasks, RawExercise};

/// Supplies the task list of a module.
#[async_trait]
pub trait ModuleTaskProvider: Send + Sync {
    /// Lesson and exercise references of `module_code`, in authoring order.
    async fn module_tasks(&self, module_code: &str) -> anyhow::Result<ModuleTasks>;
}

/// Supplies per-student completion records.
#[async_trait]
pub trait CompletionRecordStore: Send + Sync {
    /// `Ok(None)` means the student has no record for the module at all,
    /// which is reported differently from a record with zero completions.
    async fn completion_record(
        &self,
        student_id: &str,
        module_code: &str,
    ) -> anyhow::Result<Option<CompletionRecord>>;
}

/// Supplies stored exercise definitions.
#[async_trait]
pub trait ExerciseDefinitionStore: Send + Sync {
    async fn exercise(&self, exercise_id: &str) -> anyhow::Result<Option<RawExercise>>;
}
