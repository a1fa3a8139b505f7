//! Rendering of ranked matches and per-match drill-down.
//!
//! Presentation rules: at most [`DISPLAY_LIMIT`] entries, in whatever order
//! the backend returned them (no client-side re-sort, ties kept); scores as
//! percentages with two fraction digits; a missing or non-finite score
//! renders as `"N/A"` instead of failing.

use crate::models::{Match, QueryOutcome};

/// Display cap for ranked matches.
pub const DISPLAY_LIMIT: usize = 5;

/// Format a similarity score as a percentage with two fraction digits,
/// e.g. `0.8734` → `"87.34%"`.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_finite() => format!("{:.2}%", s * 100.0),
        _ => "N/A".to_string(),
    }
}

/// The slice of matches that is actually shown: the first [`DISPLAY_LIMIT`]
/// entries, backend order untouched.
pub fn display_window(matches: &[Match]) -> &[Match] {
    &matches[..matches.len().min(DISPLAY_LIMIT)]
}

/// One-line label for a match row: the metadata summary when present,
/// otherwise the content, collapsed to a single line.
fn row_label(m: &Match) -> String {
    let text = m
        .metadata_pairs()
        .find(|(k, _)| k.as_str() == "summary")
        .and_then(|(_, v)| v.as_str())
        .unwrap_or(&m.content);
    let line = text.replace('\n', " ");
    let line = line.trim();
    if line.is_empty() {
        "(no content)".to_string()
    } else if line.chars().count() > 96 {
        let truncated: String = line.chars().take(96).collect();
        format!("{}...", truncated)
    } else {
        line.to_string()
    }
}

/// Print the summary and the ranked match list to stdout.
pub fn render_outcome(outcome: &QueryOutcome) {
    if let Some(summary) = outcome.summary.as_deref() {
        if !summary.trim().is_empty() {
            println!("--- Summary ---");
            println!("{}", summary);
            println!();
        }
    }

    if outcome.matches.is_empty() {
        println!("No matches.");
        return;
    }

    let shown = display_window(&outcome.matches);
    println!("--- Top {} Matches ---", shown.len());
    for (i, m) in shown.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, format_score(m.score), row_label(m));
        println!("    dataset: {}", m.dataset_name);
        println!("    id: {}", m.id.as_deref().unwrap_or("(none)"));
        println!();
    }

    let hidden = outcome.matches.len() - shown.len();
    if hidden > 0 {
        println!("({} more not shown)", hidden);
    }
}

/// Print the drill-down view for one match: every metadata pair in backend
/// order, the owning dataset, and the id.
pub fn render_detail(m: &Match) {
    println!("--- Match Detail ---");
    println!("id:      {}", m.id.as_deref().unwrap_or("(none)"));
    println!("score:   {}", format_score(m.score));
    println!("dataset: {}", m.dataset_name);
    println!();

    println!("--- Metadata ---");
    let mut any = false;
    for (key, value) in m.metadata_pairs() {
        any = true;
        match value.as_str() {
            Some(s) => println!("{}: {}", key, s),
            None => println!("{}: {}", key, value),
        }
    }
    if !any {
        println!("(none)");
    }
    println!();

    println!("--- Content ---");
    println!("{}", m.content);
}
