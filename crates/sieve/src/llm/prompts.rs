//! Prompt templates for specification generation.

use crate::censor::pseudonym_for;
use crate::input::{Dataset, Value};
use crate::profile::Profile;

use super::provider::SpecPrompt;

/// Build the prompt asking a model to turn `question` into a specification.
pub fn spec_prompt(profile: &Profile, dataset: &Dataset, question: &str) -> SpecPrompt {
    let sample = sample_rows(profile, dataset);
    let mut user = profile.schema_hints(&sample);

    if !profile.terminology.is_empty() {
        let terms: Vec<String> = profile
            .terminology
            .iter()
            .map(|(term, meaning)| format!("{} = {}", term, meaning))
            .collect();
        user.push_str(&format!("Domain terminology: {}.\n", terms.join("; ")));
    }

    if !profile.example_queries.is_empty() {
        user.push_str("Example questions:\n");
        for example in profile.example_queries.iter().take(4) {
            user.push_str(&format!("- {}\n", example));
        }
    }

    user.push_str(&format!(
        "The user writes in {}.\n\nQuestion: {}\n\nRespond with the JSON specification only.",
        profile.language,
        question.trim()
    ));

    SpecPrompt {
        system: profile.system_prompt.clone(),
        user,
        question: question.trim().to_string(),
    }
}

/// First rows of the dataset as comma-separated text, sensitive values pseudonymized.
fn sample_rows(profile: &Profile, dataset: &Dataset) -> String {
    let sensitive = profile.schema.sensitive_columns();
    let headers = dataset.headers();

    let mut out = headers.join(",");
    out.push('\n');

    for row in dataset.rows().iter().take(profile.sample_rows) {
        let cells: Vec<String> = row
            .iter()
            .zip(headers)
            .map(|(value, header)| match (sensitive.get(header.as_str()), value) {
                (_, Value::Null) => String::new(),
                (Some(kind), value) => pseudonym_for(value.to_string().trim(), *kind),
                (None, value) => quote(&value.to_string()),
            })
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
