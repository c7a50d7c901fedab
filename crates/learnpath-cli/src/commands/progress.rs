//! The `learnpath progress` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use learnpath_core::model::ProgressRecord;
use learnpath_core::statistics::ProgressSummary;
use learnpath_core::{ClassroomProgress, ModuleProgressReporter};
use learnpath_store::config::load_config_from;
use learnpath_store::MemoryStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressOutput<'a> {
    student_id: &'a str,
    progress: &'a [ProgressRecord],
    summary: ProgressSummary,
}

pub async fn execute(
    student_id: String,
    modules: Option<String>,
    classroom: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = Arc::new(MemoryStore::load(&config.modules_dir, &config.records_path)?);

    let mut today = None;
    let module_codes: Vec<String> = if let Some(list) = &modules {
        list.split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    } else if let Some(code) = &classroom {
        let Some(classroom) = store.classroom(code) else {
            anyhow::bail!("classroom not found: {code}");
        };
        today = classroom.today_lesson.clone();
        classroom.learning_modules.clone()
    } else {
        store.module_codes()
    };
    anyhow::ensure!(!module_codes.is_empty(), "no modules to report");
    tracing::debug!(student = %student_id, modules = ?module_codes, "reporting progress");

    let reporter =
        ModuleProgressReporter::new(store.clone(), store.clone(), config.reporter_config());
    let report = reporter.report_classroom(&student_id, &module_codes).await?;

    match format.as_str() {
        "json" => {
            let output = ProgressOutput {
                student_id: &student_id,
                progress: &report.progress,
                summary: report.summary(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => print_table(&store, &student_id, &report, today.as_deref()),
    }

    Ok(())
}

fn print_table(
    store: &MemoryStore,
    student_id: &str,
    report: &ClassroomProgress,
    today: Option<&str>,
) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Module", "Name", "Completed", "Progress", "Status"]);

    for record in &report.progress {
        let name = store
            .module(&record.module_code)
            .map(|m| m.name.as_str())
            .unwrap_or("");
        let status = if record.is_complete() {
            "Review"
        } else if record.completed_tasks > 0 {
            "Continue"
        } else {
            "Start"
        };
        table.add_row(vec![
            Cell::new(&record.module_code),
            Cell::new(name),
            Cell::new(format!("{}/{}", record.completed_tasks, record.total_tasks)),
            Cell::new(format!("{}%", record.progress_percentage)),
            Cell::new(status),
        ]);
    }

    println!("Student: {student_id}");
    println!("{table}");

    let summary = report.summary();
    println!(
        "{} module(s), {} started, {} completed, average {:.1}%",
        summary.modules, summary.modules_started, summary.modules_completed, summary.average_percentage
    );

    if let Some(code) = today {
        println!("Today: {code} ({}%)", report.percentage_for(code));
    }
}
