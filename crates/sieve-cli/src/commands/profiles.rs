//! Profiles command - list the built-in dataset profiles.

use colored::Colorize;
use sieve::Profile;
use sieve::profile::builtin_names;

pub fn run(json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let profiles = builtin_names()
        .into_iter()
        .map(Profile::builtin)
        .collect::<Result<Vec<_>, _>>()?;

    if json_output {
        let listing: Vec<_> = profiles
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "description": p.description,
                    "columns": p.schema.column_names(),
                    "sensitive": p.schema.sensitive_columns().into_keys().collect::<Vec<_>>(),
                    "data_path": p.data_path,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for profile in &profiles {
        println!("{} {}", profile.name.cyan().bold(), profile.description.dimmed());
        println!("  Columns:   {}", profile.schema.column_names().join(", "));
        let sensitive: Vec<String> = profile
            .schema
            .sensitive_columns()
            .iter()
            .map(|(column, kind)| format!("{} ({})", column, kind))
            .collect();
        println!("  Sensitive: {}", sensitive.join(", ").yellow());
        if let Some(path) = &profile.data_path {
            println!("  Data:      {}", path.display());
        }
        println!();
    }
    Ok(())
}
