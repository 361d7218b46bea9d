//! The `quizline init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizline.toml").exists() {
        println!("quizline.toml already exists, skipping.");
    } else {
        std::fs::write("quizline.toml", SAMPLE_CONFIG)?;
        println!("Created quizline.toml");
    }

    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add questions to banks/example.toml");
    println!("  2. Run: quizline validate --bank banks");
    println!("  3. Run: quizline play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizline configuration

# Bank file or directory of .toml/.json banks
bank = "banks"

# Filter used when a quiz starts ("all" means every question)
default_filter = "all"

# Filters offered by :restart <tag>. Leave empty to offer every tag in the bank.
filters = []

# Fixed seed for a reproducible question order
# seed = 42

# Also forget missed questions on a plain :restart
reset_missed_on_restart = false
"#;

const EXAMPLE_BANK: &str = r#"[bank]
name = "Example Quiz"

[[questions]]
id = 1
stem = "Which keyword declares an immutable binding in Rust?"
choices = ["var", "let", "const mut", "static mut"]
answer_index = 1
tags = ["basics"]
rationale = "`let` introduces a binding that is immutable unless marked `mut`."

[[questions]]
id = 2
stem = "What does the `?` operator do on a `Result`?"
choices = [
    "Panics on `Err`",
    "Returns early with the `Err` value",
    "Ignores the error",
    "Converts the value to `Option`",
]
answer_index = 1
tags = ["errors"]
rationale = "`?` unwraps `Ok` and returns early from the function on `Err`, converting the error with `From`."

[[questions]]
id = 3
stem = "Which trait lets a type be duplicated with an implicit bitwise copy?"
choices = ["Clone", "Copy", "Default", "Send"]
answer_index = 1
tags = ["basics", "traits"]
rationale = "`Copy` types are duplicated implicitly on assignment; `Clone` requires an explicit call."
"#;
