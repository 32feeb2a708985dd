//! Ask command - answer one question against the dataset.

use colored::Colorize;
use sieve::{Confidence, QueryResponse, Sieve, SieveConfig, Value};

pub fn run(
    config: &SieveConfig,
    question: &str,
    spec: Option<&str>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let sieve = Sieve::open(config)?;

    if spec.is_none() && !sieve.has_llm() {
        return Err("No LLM provider configured. Pass --llm or supply --spec.".into());
    }

    let response = match spec {
        Some(text) => sieve.answer_with_spec(question, text),
        None => sieve.ask(question),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    if let Some(error) = &response.error {
        return Err(format!("{} ({})", error.message, error.kind).into());
    }
    Ok(())
}

fn print_response(response: &QueryResponse) {
    println!("{} {}", "Question:".cyan().bold(), response.question.white());
    println!();

    if response.is_error() {
        println!("{}", response.answer.red());
        if let Some(error) = &response.error {
            for violation in &error.violations {
                println!("  {} {}", "•".red(), violation);
            }
        }
        return;
    }

    println!("{}", response.answer.white().bold());
    println!(
        "Confidence: {}",
        match response.confidence {
            Confidence::High => "high".green(),
            Confidence::Medium => "medium".yellow(),
            Confidence::Low => "low".red(),
            Confidence::None => "none".dimmed(),
        }
    );

    if response.sources.is_empty() {
        return;
    }

    println!();
    println!("{}", "Sources:".yellow().bold());
    for (i, record) in response.sources.iter().enumerate() {
        let cells: Vec<String> = record
            .iter()
            .map(|(column, value)| format!("{}={}", column.dimmed(), display(value)))
            .collect();
        println!("  {:>3}. {}", i + 1, cells.join("  "));
    }

    if let Some(stats) = response.statistics.as_ref().filter(|s| s.total_rows > s.rows_shown) {
        println!();
        println!(
            "{}",
            format!(
                "Showing {} of {} matching rows.",
                stats.rows_shown, stats.total_rows
            )
            .dimmed()
        );
    }
}

fn display(value: &Value) -> String {
    if value.is_null() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
