//! Salvage parsing for raw model output. Models return clean JSON most of the
//! time; the remainder is fenced, prefixed with prose, or both. Three
//! deterministic attempts, then the caller escalates to a repair re-prompt.

use anyhow::{anyhow, Result};
use giftroute_core::GiftPlan;

pub fn parse_gift_plan(content: &str) -> Result<GiftPlan> {
    let mut last_error = None;

    for candidate in candidates(content) {
        match serde_json::from_str::<GiftPlan>(&candidate) {
            Ok(plan) => return Ok(plan),
            Err(error) => last_error = Some(error.to_string()),
        }
    }

    Err(anyhow!(
        "model output did not match the gifts schema: {}",
        last_error.unwrap_or_else(|| "no JSON object found".to_string())
    ))
}

fn candidates(content: &str) -> Vec<String> {
    let mut out = vec![content.trim().to_string()];
    if let Some(stripped) = strip_markdown_fences(content) {
        push_unique(&mut out, stripped);
    }
    if let Some(extracted) = first_balanced_object(content) {
        push_unique(&mut out, extracted);
    }
    out
}

fn push_unique(candidates: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !candidates.iter().any(|existing| *existing == candidate) {
        candidates.push(candidate);
    }
}

fn strip_markdown_fences(content: &str) -> Option<String> {
    let trimmed = content.trim();
    let without_open = trimmed.strip_prefix("```")?;
    let after_header = match without_open.find('\n') {
        Some(newline) => &without_open[newline + 1..],
        None => without_open,
    };
    let end = after_header.rfind("```")?;
    Some(after_header[..end].trim().to_string())
}

/// First balanced `{...}` in the text, string-literal aware.
fn first_balanced_object(content: &str) -> Option<String> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, character) in content[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if character == '\\' {
                escaped = true;
            } else if character == '"' {
                in_string = false;
            }
            continue;
        }
        match character {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return Some(content[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}
