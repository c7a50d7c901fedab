//! The `learnpath init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("learnpath.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("modules")?;
    write_if_missing(Path::new("modules/example.toml"), EXAMPLE_MODULE)?;

    write_if_missing(Path::new("records.json"), EXAMPLE_RECORDS)?;

    println!("\nNext steps:");
    println!("  1. Run: learnpath validate --modules modules");
    println!("  2. Run: learnpath progress --student demo --classroom 100001");
    println!("  3. Add modules under modules/ and records to records.json");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# learnpath configuration

# half_up (12.5 -> 13) or half_even (12.5 -> 12)
rounding = "half_up"
parallelism = 4
modules_dir = "./modules"
records_path = "./records.json"
"#;

const EXAMPLE_MODULE: &str = r#"[module]
code = "0001"
name = "Around the City"
description = "Places, directions and transport"
difficulty = "easy"
skills = ["vocabulary", "reading"]

[[lessons]]
id = "0001L0001"
title = "Places in town"
lesson_type = "flashcard"
order = 1

[[lessons]]
id = "0001L0002"
title = "Asking for directions"
lesson_type = "text"
order = 2

[[exercises]]
id = "0001E0001"
title = "Capitals"
instruction = "Write the capital city."
exercise_type = "text_with_input"
max_score = 10
is_instant_scored = true
order = 1
correct_answers = ["Paris", "London"]

[[exercises.exercise_content]]
question = "What is the capital of France?"
answerType = "input"

[[exercises.exercise_content]]
question = "What is the capital of England?"
answerType = "input"

[[exercises]]
id = "0001E0002"
title = "My town"
instruction = "Describe your town in a few sentences."
exercise_type = "text_with_questions"
max_score = 20
is_instant_scored = false
order = 2

[[exercises.exercise_content]]
context = "Think about shops, parks and transport."
answerType = "none"

[[exercises.exercise_content]]
question = "What do you like about your town?"
answerType = "textarea"
"#;

const EXAMPLE_RECORDS: &str = r#"{
  "students": {
    "demo": {
      "0001": {
        "completedLessons": ["0001L0001"],
        "completedExercises": [],
        "scores": {}
      }
    }
  },
  "classrooms": {
    "100001": {
      "classroomName": "Demo classroom",
      "learningModules": ["0001"],
      "todayLesson": "0001"
    }
  }
}
"#;
