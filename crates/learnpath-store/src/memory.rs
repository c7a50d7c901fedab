//! In-memory store backing the engine's collaborator traits.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use learnpath_core::model::{CompletionRecord, LearningModule, ModuleTasks, RawExercise};
use learnpath_core::parser::load_modules;
use learnpath_core::traits::{CompletionRecordStore, ExerciseDefinitionStore, ModuleTaskProvider};

use crate::error::StoreError;

/// A classroom as far as progress reporting is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    #[serde(default)]
    pub classroom_name: String,
    /// Module codes, in the order the classroom lists them.
    #[serde(default)]
    pub learning_modules: Vec<String>,
    #[serde(default)]
    pub today_lesson: Option<String>,
}

/// Contents of a completion-records JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsFile {
    /// Student id → module code → completion record.
    #[serde(default)]
    pub students: BTreeMap<String, BTreeMap<String, CompletionRecord>>,
    /// Classroom code → classroom.
    #[serde(default)]
    pub classrooms: BTreeMap<String, Classroom>,
}

impl RecordsFile {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Modules, exercises and completion records held in memory.
///
/// Counts fetches so callers and tests can see which lookups happened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    modules: HashMap<String, LearningModule>,
    exercises: HashMap<String, RawExercise>,
    records: HashMap<(String, String), CompletionRecord>,
    classrooms: BTreeMap<String, Classroom>,
    task_fetches: AtomicU32,
    record_fetches: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from parsed modules and a records file.
    pub fn from_parts(modules: Vec<LearningModule>, records: RecordsFile) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for module in modules {
            store.insert_module(module)?;
        }
        for (student_id, per_module) in records.students {
            for (module_code, record) in per_module {
                store.insert_record(&student_id, &module_code, record);
            }
        }
        store.classrooms = records.classrooms;
        Ok(store)
    }

    /// Load modules from `modules_path` (file or directory) and records from
    /// `records_path`. A missing records file means nobody has progress yet.
    pub fn load(modules_path: &Path, records_path: &Path) -> Result<Self> {
        let modules = if modules_path.exists() {
            load_modules(modules_path)?
        } else {
            tracing::warn!("modules path {} does not exist", modules_path.display());
            Vec::new()
        };

        let records = if records_path.exists() {
            RecordsFile::load(records_path)?
        } else {
            tracing::warn!("records file {} does not exist", records_path.display());
            RecordsFile::default()
        };

        let store = Self::from_parts(modules, records)?;
        tracing::info!(
            modules = store.modules.len(),
            exercises = store.exercises.len(),
            records = store.records.len(),
            "store loaded"
        );
        Ok(store)
    }

    pub fn insert_module(&mut self, module: LearningModule) -> Result<(), StoreError> {
        if self.modules.contains_key(&module.code) {
            return Err(StoreError::DuplicateModule(module.code));
        }
        for exercise in &module.exercises {
            if self.exercises.contains_key(&exercise.id) {
                tracing::warn!(
                    "exercise {} in module {} shadows an earlier exercise with the same id",
                    exercise.id,
                    module.code
                );
                continue;
            }
            self.exercises.insert(exercise.id.clone(), exercise.clone());
        }
        self.modules.insert(module.code.clone(), module);
        Ok(())
    }

    pub fn insert_record(&mut self, student_id: &str, module_code: &str, record: CompletionRecord) {
        self.records
            .insert((student_id.to_string(), module_code.to_string()), record);
    }

    pub fn module(&self, code: &str) -> Option<&LearningModule> {
        self.modules.get(code)
    }

    /// All loaded module codes, sorted.
    pub fn module_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.modules.keys().cloned().collect();
        codes.sort();
        codes
    }

    pub fn classroom(&self, classroom_code: &str) -> Option<&Classroom> {
        self.classrooms.get(classroom_code)
    }

    /// Number of task-list fetches served.
    pub fn task_fetches(&self) -> u32 {
        self.task_fetches.load(Ordering::Relaxed)
    }

    /// Number of completion-record fetches served.
    pub fn record_fetches(&self) -> u32 {
        self.record_fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ModuleTaskProvider for MemoryStore {
    async fn module_tasks(&self, module_code: &str) -> anyhow::Result<ModuleTasks> {
        self.task_fetches.fetch_add(1, Ordering::Relaxed);
        self.modules
            .get(module_code)
            .map(LearningModule::tasks)
            .ok_or_else(|| StoreError::ModuleNotFound(module_code.to_string()).into())
    }
}

#[async_trait]
impl CompletionRecordStore for MemoryStore {
    async fn completion_record(
        &self,
        student_id: &str,
        module_code: &str,
    ) -> anyhow::Result<Option<CompletionRecord>> {
        self.record_fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .records
            .get(&(student_id.to_string(), module_code.to_string()))
            .cloned())
    }
}

#[async_trait]
impl ExerciseDefinitionStore for MemoryStore {
    async fn exercise(&self, exercise_id: &str) -> anyhow::Result<Option<RawExercise>> {
        Ok(self.exercises.get(exercise_id).cloned())
    }
}
