//! Console preview of a freshly built catalog.
//!
//! ```text
//! Parsed categories:
//! [1/12] Web Frameworks (9 entries)
//!   - Django: Batteries-included web framework.
//!   - Flask: Microframework based on Werkzeug.
//!   - FastAPI: Modern async API framework.
//!     …and 6 more entries
//! [2/12] HTTP Clients (2 entries)
//!   - httpx: Async-capable HTTP client.
//!   - requests: HTTP for humans.
//! ```
//!
//! In [`PreviewMode::Step`] the preview waits for Enter between categories.
//! Whether stdin is a terminal is decided by the caller and passed in as
//! `interactive`, along with the input and output streams, so the prompt
//! logic runs the same under tests as it does in a shell.

use crate::types::{Category, PreviewMode, PreviewSettings};
use std::io::{self, BufRead, Write};

/// Entries shown per category before the "…and N more" line.
pub const ENTRIES_PER_CATEGORY: usize = 3;

pub const STEP_PROMPT: &str = "Press Enter for next category (or q to quit): ";

/// Lines for one category block. `index` is 1-based.
pub fn format_category(index: usize, total: usize, category: &Category) -> Vec<String> {
    let mut lines = vec![format!(
        "[{index}/{total}] {} ({} entries)",
        category.title,
        category.items.len()
    )];
    for entry in category.items.iter().take(ENTRIES_PER_CATEGORY) {
        lines.push(format!("  - {}: {}", entry.name, entry.description));
    }
    let remaining = category.items.len().saturating_sub(ENTRIES_PER_CATEGORY);
    if remaining > 0 {
        lines.push(format!("    …and {remaining} more entries"));
    }
    lines
}

/// Print the first `settings.limit` categories to `out`.
///
/// Step mode only prompts when `interactive` is true; otherwise it prints
/// like list mode. Answering `q` or closing the input ends the preview early.
pub fn run_preview<R: BufRead, W: Write>(
    categories: &[Category],
    settings: &PreviewSettings,
    interactive: bool,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    let shown = settings.limit.min(categories.len());
    if shown == 0 {
        return Ok(());
    }

    let stepwise = settings.mode == PreviewMode::Step && interactive;
    let total = categories.len();

    writeln!(out, "Parsed categories:")?;
    for (i, category) in categories.iter().take(shown).enumerate() {
        for line in format_category(i + 1, total, category) {
            writeln!(out, "{line}")?;
        }
        if stepwise && i + 1 < shown && !wait_for_next(input, out)? {
            break;
        }
    }
    Ok(())
}

/// Prompt and read one line. `false` means stop.
fn wait_for_next<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<bool> {
    write!(out, "{STEP_PROMPT}")?;
    out.flush()?;
    let mut response = String::new();
    if input.read_line(&mut response)? == 0 {
        // End of input: finish the line the prompt left open
        writeln!(out)?;
        return Ok(false);
    }
    Ok(!response.trim().eq_ignore_ascii_case("q"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Entry;
    use std::io::Cursor;

    fn category(title: &str, names: &[&str]) -> Category {
        Category {
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            items: names
                .iter()
                .map(|n| Entry {
                    name: n.to_string(),
                    url: format!("https://example.com/{}", n.to_lowercase()),
                    description: format!("{n} lib"),
                    stats: None,
                })
                .collect(),
        }
    }

    fn sample() -> Vec<Category> {
        vec![
            category("Category One", &["Alpha", "Beta", "Gamma", "Delta"]),
            category("Category Two", &["Echo"]),
            category("Category Three", &["Foxtrot"]),
        ]
    }

    fn preview(mode: PreviewMode, limit: usize, interactive: bool, input: &str) -> String {
        let mut out = Vec::new();
        run_preview(
            &sample(),
            &PreviewSettings { limit, mode },
            interactive,
            &mut Cursor::new(input.as_bytes()),
            &mut out,
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn list_mode_output() {
        let output = preview(PreviewMode::List, 2, false, "");
        assert_eq!(
            output,
            "Parsed categories:\n\
             [1/3] Category One (4 entries)\n\
             \x20 - Alpha: Alpha lib\n\
             \x20 - Beta: Beta lib\n\
             \x20 - Gamma: Gamma lib\n\
             \x20   …and 1 more entries\n\
             [2/3] Category Two (1 entries)\n\
             \x20 - Echo: Echo lib\n"
        );
    }

    #[test]
    fn zero_limit_prints_nothing() {
        assert_eq!(preview(PreviewMode::List, 0, false, ""), "");
    }

    #[test]
    fn limit_larger_than_catalog() {
        let output = preview(PreviewMode::List, 10, false, "");
        assert!(output.contains("[3/3] Category Three"));
    }

    #[test]
    fn step_mode_quits_on_q() {
        let output = preview(PreviewMode::Step, 3, true, "q\n");
        assert!(output.contains("[1/3] Category One"));
        assert!(output.contains(STEP_PROMPT));
        assert!(!output.contains("[2/3] Category Two"));
    }

    #[test]
    fn step_mode_quit_is_case_insensitive() {
        let output = preview(PreviewMode::Step, 3, true, "  Q \n");
        assert!(!output.contains("[2/3]"));
    }

    #[test]
    fn step_mode_stops_at_end_of_input() {
        let output = preview(PreviewMode::Step, 3, true, "");
        assert!(output.contains("[1/3] Category One"));
        assert!(!output.contains("[2/3] Category Two"));
    }

    #[test]
    fn step_mode_advances_on_enter() {
        let output = preview(PreviewMode::Step, 3, true, "\n\n");
        assert!(output.contains("[3/3] Category Three"));
        // No prompt after the last previewed category
        assert_eq!(output.matches(STEP_PROMPT).count(), 2);
    }

    #[test]
    fn non_interactive_step_falls_back_to_list() {
        let output = preview(PreviewMode::Step, 2, false, "");
        assert!(!output.contains("Press Enter for next category"));
        assert!(output.contains("[1/3] Category One"));
        assert!(output.contains("[2/3] Category Two"));
    }

    #[test]
    fn category_block_without_overflow() {
        let lines = format_category(2, 5, &category("Tools", &["A", "B"]));
        assert_eq!(lines, vec!["[2/5] Tools (2 entries)", "  - A: A lib", "  - B: B lib"]);
    }
}
