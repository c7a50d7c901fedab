//! Module progress reporter.
//!
//! Fetches a student's completion record and a module's task list from the
//! collaborator traits, aggregates them, and shapes the result into the
//! progress record dashboards consume. Classroom reports fan out one fetch
//! per module and always return records in the input module order.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::aggregator::aggregate_with;
use crate::model::ProgressRecord;
use crate::statistics::{ProgressSummary, RoundingPolicy};
use crate::traits::{CompletionRecordStore, ModuleTaskProvider};

/// Configuration for the reporter.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Maximum concurrent module fetches in a classroom report.
    pub parallelism: usize,
    pub rounding: RoundingPolicy,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            rounding: RoundingPolicy::HalfUp,
        }
    }
}

/// Builds progress records from the task provider and completion store.
pub struct ModuleProgressReporter {
    tasks: Arc<dyn ModuleTaskProvider>,
    completions: Arc<dyn CompletionRecordStore>,
    config: ReporterConfig,
}

impl ModuleProgressReporter {
    pub fn new(
        tasks: Arc<dyn ModuleTaskProvider>,
        completions: Arc<dyn CompletionRecordStore>,
        config: ReporterConfig,
    ) -> Self {
        Self {
            tasks,
            completions,
            config,
        }
    }

    /// Progress of `student_id` through `module_code`.
    ///
    /// A student with no completion record gets the zero-state record, even
    /// if the module has tasks; the task list is not fetched in that case.
    pub async fn report(&self, student_id: &str, module_code: &str) -> Result<ProgressRecord> {
        report_module(
            self.tasks.as_ref(),
            self.completions.as_ref(),
            self.config.rounding,
            student_id,
            module_code,
        )
        .await
    }

    /// Progress of `student_id` through each of `module_codes`, in order.
    pub async fn report_classroom(
        &self,
        student_id: &str,
        module_codes: &[String],
    ) -> Result<ClassroomProgress> {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));
        let rounding = self.config.rounding;

        let mut futures = FuturesUnordered::new();

        for (index, module_code) in module_codes.iter().enumerate() {
            let tasks = Arc::clone(&self.tasks);
            let completions = Arc::clone(&self.completions);
            let semaphore = Arc::clone(&semaphore);
            let module_code = module_code.clone();
            let student_id = student_id.to_string();

            futures.push(async move {
                let result = async {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    report_module(
                        tasks.as_ref(),
                        completions.as_ref(),
                        rounding,
                        &student_id,
                        &module_code,
                    )
                    .await
                }
                .await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<ProgressRecord>> = vec![None; module_codes.len()];
        while let Some((index, result)) = futures.next().await {
            slots[index] = Some(result?);
        }

        // Every slot was filled by exactly one future above.
        let progress: Vec<ProgressRecord> = slots.into_iter().flatten().collect();

        tracing::info!(
            student = student_id,
            modules = progress.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "classroom progress computed"
        );

        Ok(ClassroomProgress { progress })
    }
}

async fn report_module(
    tasks: &dyn ModuleTaskProvider,
    completions: &dyn CompletionRecordStore,
    rounding: RoundingPolicy,
    student_id: &str,
    module_code: &str,
) -> Result<ProgressRecord> {
    let record = completions
        .completion_record(student_id, module_code)
        .await
        .with_context(|| {
            format!("failed to fetch completion record for {student_id} in module {module_code}")
        })?;

    let Some(record) = record else {
        tracing::debug!(
            student = student_id,
            module = module_code,
            "no completion record, reporting zero state"
        );
        return Ok(ProgressRecord::zero_state(module_code));
    };

    let module_tasks = tasks
        .module_tasks(module_code)
        .await
        .with_context(|| format!("failed to fetch tasks for module {module_code}"))?;

    let agg = aggregate_with(&module_tasks.all(), &record, rounding);

    Ok(ProgressRecord {
        total_tasks: agg.total_tasks,
        completed_tasks: agg.completed_tasks,
        progress_percentage: agg.progress_percentage,
        completed_lessons: agg.completed_lessons,
        completed_exercises: agg.completed_exercises,
        module_code: module_code.to_string(),
    })
}

/// A student's progress across a classroom's modules, in module order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomProgress {
    pub progress: Vec<ProgressRecord>,
}

impl ClassroomProgress {
    pub fn find(&self, module_code: &str) -> Option<&ProgressRecord> {
        self.progress.iter().find(|p| p.module_code == module_code)
    }

    /// Percentage for `module_code`, or 0 when the module is not listed.
    pub fn percentage_for(&self, module_code: &str) -> u8 {
        self.find(module_code)
            .map(|p| p.progress_percentage)
            .unwrap_or(0)
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::from_records(&self.progress)
    }
}
