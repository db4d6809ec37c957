//! # README Rendering
//!
//! Turns pyco's Markdown README into styled transcript rows. Headings,
//! fenced code, lists, quotes and tables are laid out for a fixed-width
//! screen; inline `code`, **bold** and links keep their text without the
//! markup.

use crate::repl::models::{LineStyle, Segment};
use regex::Regex;
use std::sync::OnceLock;
use unicode_width::UnicodeWidthStr;

const CODE_INDENT: &str = "    ";
const RULE_WIDTH: usize = 40;
const TABLE_SEPARATOR: &str = " │ ";

pub type StyledRow = Vec<Segment>;

fn segment(style: LineStyle, text: impl Into<String>) -> Segment {
    Segment {
        style,
        text: text.into(),
    }
}

fn row_width(row: &[Segment]) -> usize {
    row.iter().map(|s| s.text.width()).sum()
}

fn inline_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"`([^`]+)`|\*\*([^*]+)\*\*|__([^_]+)__|\*([^*\s][^*]*)\*|~~([^~]+)~~|\[([^\]]+)\]\(([^)]+)\)",
            )
            .ok()
        })
        .as_ref()
}

/// Inline markup of one line, with `base` for unmarked text
pub fn inline(text: &str, base: LineStyle) -> StyledRow {
    let Some(pattern) = inline_pattern() else {
        return vec![segment(base, text)];
    };

    let mut row = Vec::new();
    let mut last = 0;
    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            row.push(segment(base, &text[last..whole.start()]));
        }
        if let Some(code) = caps.get(1) {
            row.push(segment(LineStyle::Code, code.as_str()));
        } else if let Some(bold) = caps.get(2).or_else(|| caps.get(3)) {
            row.push(segment(LineStyle::Emphasis, bold.as_str()));
        } else if let Some(plain) = caps.get(4).or_else(|| caps.get(5)) {
            row.push(segment(base, plain.as_str()));
        } else if let (Some(label), Some(url)) = (caps.get(6), caps.get(7)) {
            row.push(segment(base, label.as_str()));
            if label.as_str() != url.as_str() {
                row.push(segment(base, format!(" <{}>", url.as_str())));
            }
        }
        last = whole.end();
    }
    if last < text.len() {
        row.push(segment(base, &text[last..]));
    }
    row
}

fn heading_level(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    line[level..].strip_prefix(' ').map(|rest| (level, rest.trim()))
}

fn is_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&mark| compact.chars().all(|c| c == mark))
}

fn list_item(line: &str) -> Option<(&str, &str)> {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| body.strip_prefix(marker))
        .map(|rest| (indent, rest))
}

fn is_table_row(line: &str) -> bool {
    line.starts_with('|')
}

fn is_table_separator(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

fn table_cells(line: &str) -> Vec<StyledRow> {
    line.trim_matches('|')
        .split('|')
        .map(|cell| inline(cell.trim(), LineStyle::System))
        .collect()
}

/// Columns padded to their widest cell; the header row is bold
fn table(lines: &[&str]) -> Vec<StyledRow> {
    let rows: Vec<Vec<StyledRow>> = lines
        .iter()
        .filter(|line| !is_table_separator(line))
        .map(|line| table_cells(line))
        .collect();

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(row_width(cell));
        }
    }

    let has_header = lines.get(1).is_some_and(|line| is_table_separator(line));
    rows.into_iter()
        .enumerate()
        .map(|(index, cells)| {
            let mut out = Vec::new();
            let count = cells.len();
            for (i, mut cell) in cells.into_iter().enumerate() {
                if index == 0 && has_header {
                    for part in cell.iter_mut() {
                        part.style = LineStyle::Emphasis;
                    }
                }
                let pad = widths[i] - row_width(&cell);
                out.extend(cell);
                if i + 1 < count {
                    out.push(segment(LineStyle::System, " ".repeat(pad)));
                    out.push(segment(LineStyle::System, TABLE_SEPARATOR));
                }
            }
            out
        })
        .collect()
}

/// Styled rows for a Markdown document
pub fn render(markdown: &str) -> Vec<StyledRow> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut out = Vec::new();
    let mut in_code = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim_end();
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            in_code = !in_code;
            i += 1;
            continue;
        }
        if in_code {
            out.push(vec![segment(LineStyle::Code, format!("{CODE_INDENT}{line}"))]);
            i += 1;
            continue;
        }

        if is_table_row(trimmed) {
            let start = i;
            while i < lines.len() && is_table_row(lines[i].trim()) {
                i += 1;
            }
            let block: Vec<&str> = lines[start..i].iter().map(|l| l.trim()).collect();
            out.extend(table(&block));
            continue;
        }

        if let Some((level, title)) = heading_level(trimmed) {
            let heading = inline(title, LineStyle::Heading);
            let width = row_width(&heading);
            out.push(heading);
            match level {
                1 => out.push(vec![segment(LineStyle::Heading, "═".repeat(width))]),
                2 => out.push(vec![segment(LineStyle::Heading, "─".repeat(width))]),
                _ => {}
            }
        } else if is_rule(trimmed) {
            out.push(vec![segment(LineStyle::System, "─".repeat(RULE_WIDTH))]);
        } else if let Some((indent, item)) = list_item(line) {
            let mut row = vec![segment(LineStyle::System, format!("{indent}• "))];
            row.extend(inline(item, LineStyle::System));
            out.push(row);
        } else if let Some(quote) = trimmed.strip_prefix('>') {
            let mut row = vec![segment(LineStyle::System, "│ ")];
            row.extend(inline(quote.trim_start(), LineStyle::System));
            out.push(row);
        } else {
            out.push(inline(line, LineStyle::System));
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(row: &[Segment]) -> String {
        row.iter().map(|s| s.text.as_str()).collect()
    }

    fn styles(row: &[Segment]) -> Vec<LineStyle> {
        row.iter().map(|s| s.style).collect()
    }

    #[test]
    fn headings_lose_their_hashes_and_top_levels_are_underlined() {
        let rows = render("# Pyco\n## Usage\n### Keys\nplain");
        let texts: Vec<String> = rows.iter().map(|r| text(r)).collect();
        assert_eq!(texts, vec!["Pyco", "════", "Usage", "─────", "Keys", "plain"]);
        assert_eq!(styles(&rows[0]), vec![LineStyle::Heading]);
        assert_eq!(styles(&rows[5]), vec![LineStyle::System]);
    }

    #[test]
    fn fenced_code_is_indented_and_keeps_markup() {
        let rows = render("Try:\n```python\nx = 2 ** 8  # **not bold**\n```\ndone");
        assert_eq!(rows.len(), 3);
        assert_eq!(text(&rows[1]), "    x = 2 ** 8  # **not bold**");
        assert_eq!(styles(&rows[1]), vec![LineStyle::Code]);
        assert_eq!(text(&rows[2]), "done");
    }

    #[test]
    fn unclosed_fence_runs_to_the_end() {
        let rows = render("```\n# not a heading");
        assert_eq!(rows.len(), 1);
        assert_eq!(styles(&rows[0]), vec![LineStyle::Code]);
    }

    #[test]
    fn inline_code_bold_and_links_drop_their_markup() {
        let row = inline(
            "Use `sqrt(2)` for **roots**, see [docs](https://example.com) or [x](x)",
            LineStyle::System,
        );
        assert_eq!(
            text(&row),
            "Use sqrt(2) for roots, see docs <https://example.com> or x"
        );
        assert_eq!(row[1].style, LineStyle::Code);
        assert_eq!(row[3].style, LineStyle::Emphasis);
    }

    #[test]
    fn snake_case_names_are_not_italicised() {
        let row = inline("call my_func_name()", LineStyle::System);
        assert_eq!(text(&row), "call my_func_name()");
    }

    #[test]
    fn lists_quotes_and_rules() {
        let rows = render("- one\n  * two\n> quoted\n---");
        let texts: Vec<String> = rows.iter().map(|r| text(r)).collect();
        assert_eq!(texts[0], "• one");
        assert_eq!(texts[1], "  • two");
        assert_eq!(texts[2], "│ quoted");
        assert_eq!(texts[3], "─".repeat(RULE_WIDTH));
    }

    #[test]
    fn tables_are_aligned_without_the_separator_row() {
        let rows = render("| Key | Action |\n|-----|--------|\n| F1 | help |\n| Ctrl+L | clear |");
        let texts: Vec<String> = rows.iter().map(|r| text(r)).collect();
        assert_eq!(
            texts,
            vec!["Key    │ Action", "F1     │ help", "Ctrl+L │ clear"]
        );
        assert!(rows[0]
            .iter()
            .filter(|s| s.text.trim() == "Key")
            .all(|s| s.style == LineStyle::Emphasis));
    }

    #[test]
    fn blank_lines_survive() {
        let rows = render("a\n\nb");
        assert_eq!(rows.len(), 3);
        assert!(rows[1].is_empty() || text(&rows[1]).is_empty());
    }
}
