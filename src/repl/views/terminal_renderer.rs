//! # Terminal Renderer
//!
//! Draws the whole CRT screen from the view model on every render:
//!
//! ```text
//! row 0        ▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒  top bezel
//! rows 1..H-2  ▒▒ transcript      ▒▒  scrolled to the newest, odd rows scanlined
//!              ▒▒ >>> input_      ▒▒
//! row H-2      ▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒▒  bottom bezel
//! row H-1             pyco            status bar
//! ```
//!
//! Rows are overwritten in place rather than cleared to avoid flicker.

use super::ansi_escape_codes::{CURSOR_BLOCK, CURSOR_DEFAULT, RESET};
use super::theme::{self, Rgb, TextStyle, BEZEL_STEPS};
use crate::repl::highlight::{highlight_input, highlight_json, HighlightSpan, TokenKind};
use crate::repl::io::RenderStream;
use crate::repl::models::{LineStyle, TranscriptLine};
use crate::repl::view_models::ViewModel;
use anyhow::Result;
use unicode_width::UnicodeWidthChar;

/// Columns taken by the bezel on each side
const BEZEL_WIDTH: u16 = 2;
/// Top bezel, bottom bezel and status bar
const CHROME_ROWS: u16 = 3;

const STATUS_TITLE: &str = "pyco";

/// Trait for rendering views
pub trait ViewRenderer {
    /// Initialize the terminal for rendering
    fn initialize(&mut self) -> Result<()>;

    /// Render the full application state
    fn render(&mut self, view_model: &ViewModel) -> Result<()>;

    /// Cleanup terminal on exit
    fn cleanup(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    style: TextStyle,
}

impl Cell {
    fn new(ch: char, style: TextStyle) -> Self {
        let ch = if ch.is_control() { ' ' } else { ch };
        Self { ch, style }
    }

    fn width(&self) -> usize {
        self.ch.width().unwrap_or(0)
    }
}

type Row = Vec<Cell>;

/// Result of wrapping one logical line
struct Wrapped {
    rows: Vec<Row>,
    /// (row, column) of every cell, plus one past the last cell
    positions: Vec<(usize, usize)>,
}

fn wrap(cells: &[Cell], width: usize) -> Wrapped {
    let width = width.max(1);
    let mut rows = vec![Row::new()];
    let mut positions = Vec::with_capacity(cells.len() + 1);
    let mut col = 0;

    for cell in cells {
        let w = cell.width();
        if col + w > width && col > 0 {
            rows.push(Row::new());
            col = 0;
        }
        positions.push((rows.len() - 1, col));
        if let Some(row) = rows.last_mut() {
            row.push(*cell);
        }
        col += w;
    }

    if col >= width {
        rows.push(Row::new());
        col = 0;
    }
    positions.push((rows.len() - 1, col));
    Wrapped { rows, positions }
}

fn push_spans(
    out: &mut Vec<Cell>,
    text: &str,
    spans: &[HighlightSpan],
    style_of: fn(TokenKind) -> TextStyle,
) {
    let chars: Vec<char> = text.chars().collect();
    for span in spans {
        let style = style_of(span.kind);
        for &ch in chars.get(span.start..span.end).unwrap_or_default() {
            out.push(Cell::new(ch, style));
        }
    }
}

fn push_segment(out: &mut Vec<Cell>, style: LineStyle, text: &str) {
    if style == LineStyle::Input {
        push_spans(out, text, &highlight_input(text), theme::input_token_style);
    } else {
        let base = theme::line_style(style);
        out.extend(text.chars().map(|ch| Cell::new(ch, base)));
    }
}

fn styled_line(line: &TranscriptLine) -> Vec<Cell> {
    let mut cells = Vec::new();
    let segments = line.segments();

    if !segments.is_empty() && segments.iter().all(|s| s.style == LineStyle::Output) {
        let text = line.text();
        if let Some(spans) = highlight_json(&text) {
            push_spans(&mut cells, &text, &spans, theme::json_token_style);
            return cells;
        }
    }

    for segment in segments {
        push_segment(&mut cells, segment.style, &segment.text);
    }
    cells
}

/// Terminal-based view renderer over any render stream
pub struct TerminalRenderer<RS: RenderStream> {
    render_stream: RS,
    terminal_size: (u16, u16),
    fade: [Rgb; BEZEL_STEPS],
}

impl<RS: RenderStream> TerminalRenderer<RS> {
    pub fn with_render_stream(render_stream: RS) -> Result<Self> {
        let terminal_size = render_stream.get_size()?;
        Ok(Self {
            render_stream,
            terminal_size,
            fade: theme::border_fade(),
        })
    }

    pub fn update_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Columns available to text inside the bezel
    pub fn content_width(&self) -> usize {
        self.terminal_size.0.saturating_sub(BEZEL_WIDTH * 2).max(1) as usize
    }

    /// Rows available to text between the bezels
    pub fn content_height(&self) -> usize {
        self.terminal_size.1.saturating_sub(CHROME_ROWS) as usize
    }

    pub fn render_stream(&self) -> &RS {
        &self.render_stream
    }

    /// The newest visual rows of the content area, oldest first, and the
    /// cursor position among them. Transcript lines are wrapped from the
    /// newest backwards until `visible` rows are filled.
    fn layout(&self, view_model: &ViewModel, visible: usize) -> (Vec<Row>, (usize, usize)) {
        let width = self.content_width();

        let mut live = view_model
            .transcript()
            .open_line()
            .map(styled_line)
            .unwrap_or_default();
        push_segment(&mut live, LineStyle::Prompt, view_model.prompt());
        let input_start = live.len();
        push_segment(&mut live, LineStyle::Input, &view_model.line().text());

        let wrapped = wrap(&live, width);
        let (cursor_row, cursor_col) = wrapped
            .positions
            .get(input_start + view_model.line().cursor())
            .copied()
            .unwrap_or((0, 0));

        // Newest first while collecting
        let mut rows: Vec<Row> = Vec::new();
        for line in view_model.transcript().lines().rev() {
            if rows.len() + wrapped.rows.len() >= visible {
                break;
            }
            rows.extend(wrap(&styled_line(line), width).rows.into_iter().rev());
        }
        rows.reverse();

        let cursor = (rows.len() + cursor_row, cursor_col);
        rows.extend(wrapped.rows);
        (rows, cursor)
    }

    fn side_bezel(&self, left: bool) -> String {
        let (first, second) = if left {
            (self.fade[0], self.fade[BEZEL_STEPS - 1])
        } else {
            (self.fade[BEZEL_STEPS - 1], self.fade[0])
        };
        format!("{} {} ", first.bg(), second.bg())
    }

    /// Full-width bezel row; the corners use the outer shade
    fn bezel_row(&self) -> String {
        let width = self.terminal_size.0 as usize;
        let middle = self.fade[BEZEL_STEPS / 2];
        let inner = width.saturating_sub(2);
        format!(
            "{outer} {middle}{fill}{outer} ",
            outer = self.fade[0].bg(),
            middle = middle.bg(),
            fill = " ".repeat(inner),
        )
    }

    fn content_row(&self, cells: &[Cell], bg: Rgb) -> String {
        let width = self.content_width();
        let mut out = self.side_bezel(true);
        out.push_str(&bg.bg());

        let mut current: Option<TextStyle> = None;
        let mut used = 0;
        for cell in cells {
            let w = cell.width();
            if used + w > width {
                break;
            }
            if current != Some(cell.style) {
                out.push_str(&cell.style.escape());
                current = Some(cell.style);
            }
            out.push(cell.ch);
            used += w;
        }
        out.push_str(&" ".repeat(width - used));
        out.push_str(&self.side_bezel(false));
        out
    }

    fn status_row(&self) -> String {
        let width = self.terminal_size.0 as usize;
        let title_width = STATUS_TITLE.chars().count().min(width);
        let left = (width - title_width) / 2;
        let right = width - title_width - left;
        format!(
            "{bg}{fg}{pad_l}{title}{pad_r}{RESET}",
            bg = theme::STATUS_BG.bg(),
            fg = TextStyle {
                color: theme::STATUS_FG,
                bold: true
            }
            .escape(),
            pad_l = " ".repeat(left),
            title = &STATUS_TITLE[..title_width],
            pad_r = " ".repeat(right),
        )
    }

    fn write_row(&mut self, y: u16, text: &str) -> Result<()> {
        self.render_stream.move_cursor(0, y)?;
        self.render_stream.write_all(text.as_bytes())?;
        self.render_stream.write_all(RESET.as_bytes())?;
        Ok(())
    }
}

impl<RS: RenderStream> ViewRenderer for TerminalRenderer<RS> {
    fn initialize(&mut self) -> Result<()> {
        self.render_stream.enable_raw_mode()?;
        self.render_stream.enter_alternate_screen()?;
        self.render_stream.write_all(CURSOR_BLOCK.as_bytes())?;
        self.render_stream.clear_screen()?;
        self.render_stream.flush()?;
        tracing::info!("Terminal initialized at {:?}", self.terminal_size);
        Ok(())
    }

    fn render(&mut self, view_model: &ViewModel) -> Result<()> {
        let (width, height) = self.terminal_size;
        self.render_stream.hide_cursor()?;

        if width <= BEZEL_WIDTH * 2 || height <= CHROME_ROWS {
            tracing::debug!("Terminal too small to draw: {}x{}", width, height);
            self.render_stream.clear_screen()?;
            self.render_stream.flush()?;
            return Ok(());
        }

        let visible = self.content_height();
        let (rows, (cursor_row, cursor_col)) = self.layout(view_model, visible);
        let first = rows.len().saturating_sub(visible);

        let top = self.bezel_row();
        self.write_row(0, &top)?;
        for screen_row in 0..visible {
            let cells = rows.get(first + screen_row).map(Vec::as_slice).unwrap_or(&[]);
            let bg = if screen_row % 2 == 1 {
                theme::SCANLINE_BG
            } else {
                theme::SCREEN_BG
            };
            let text = self.content_row(cells, bg);
            self.write_row(1 + screen_row as u16, &text)?;
        }
        let bottom = self.bezel_row();
        self.write_row(height - 2, &bottom)?;
        let status = self.status_row();
        self.write_row(height - 1, &status)?;

        if cursor_row >= first && cursor_row - first < visible {
            let x = BEZEL_WIDTH + cursor_col as u16;
            let y = 1 + (cursor_row - first) as u16;
            self.render_stream.move_cursor(x, y)?;
            self.render_stream.show_cursor()?;
        }
        self.render_stream.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        self.render_stream.write_all(RESET.as_bytes())?;
        self.render_stream.write_all(CURSOR_DEFAULT.as_bytes())?;
        self.render_stream.show_cursor()?;
        self.render_stream.leave_alternate_screen()?;
        self.render_stream.disable_raw_mode()?;
        self.render_stream.flush()?;
        tracing::info!("Terminal restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::io::{MockRenderStream, RenderCommand};

    fn renderer(width: u16, height: u16) -> TerminalRenderer<MockRenderStream> {
        TerminalRenderer::with_render_stream(MockRenderStream::with_size((width, height))).unwrap()
    }

    fn cells(text: &str) -> Vec<Cell> {
        text.chars()
            .map(|ch| Cell::new(ch, theme::line_style(LineStyle::Output)))
            .collect()
    }

    #[test]
    fn wrap_should_place_cursor_after_full_row_on_next_row() {
        let wrapped = wrap(&cells("abcd"), 4);
        assert_eq!(wrapped.rows.len(), 2);
        assert_eq!(wrapped.positions[4], (1, 0));
        assert_eq!(wrapped.positions[3], (0, 3));
    }

    #[test]
    fn wrap_should_not_split_wide_characters() {
        let wrapped = wrap(&cells("ab数"), 3);
        assert_eq!(wrapped.rows.len(), 2);
        assert_eq!(wrapped.positions[2], (1, 0));
    }

    #[test]
    fn content_area_excludes_bezel_and_status_bar() {
        let renderer = renderer(40, 10);
        assert_eq!(renderer.content_width(), 36);
        assert_eq!(renderer.content_height(), 7);
    }

    #[test]
    fn render_should_draw_prompt_status_and_cursor() {
        let mut renderer = renderer(30, 8);
        let mut vm = ViewModel::new();
        vm.insert_text("1+1");
        renderer.render(&vm).unwrap();

        let screen = renderer.render_stream().screen();
        assert_eq!(screen.row_text(1).trim(), ">>> 1+1");
        assert_eq!(screen.row_text(7).trim(), "pyco");
        assert_eq!(screen.cursor(), (2 + 7, 1));
        assert!(renderer.render_stream().has_command(&RenderCommand::ShowCursor));
    }

    #[test]
    fn render_should_scroll_to_the_newest_lines() {
        let mut renderer = renderer(20, 6);
        let mut vm = ViewModel::new();
        for i in 0..10 {
            vm.append_output(LineStyle::Output, &format!("line {i}\n"));
        }
        renderer.render(&vm).unwrap();

        let screen = renderer.render_stream().screen();
        assert_eq!(screen.row_text(1).trim(), "line 8");
        assert_eq!(screen.row_text(2).trim(), "line 9");
        assert_eq!(screen.row_text(3).trim(), ">>>");
    }

    #[test]
    fn layout_should_wrap_only_the_rows_that_fit() {
        let renderer = renderer(20, 8);
        let mut vm = ViewModel::new();
        for i in 0..3000 {
            vm.append_output(LineStyle::Output, &format!("line {i}\n"));
        }
        let visible = renderer.content_height();
        let (rows, cursor) = renderer.layout(&vm, visible);

        assert_eq!(rows.len(), visible);
        let first: String = rows[0].iter().map(|c| c.ch).collect();
        assert_eq!(first, format!("line {}", 3000 - (visible - 1)));
        assert_eq!(cursor, (visible - 1, 4));
    }

    #[test]
    fn layout_should_keep_the_tail_of_a_long_wrapped_line() {
        let renderer = renderer(14, 7);
        let mut vm = ViewModel::new();
        vm.append_output(LineStyle::Output, &format!("{}\n", "x".repeat(95)));
        let visible = renderer.content_height();
        let (rows, _) = renderer.layout(&vm, visible);

        // The whole line is wrapped even though only its end is shown
        assert_eq!(rows.len(), 95 / renderer.content_width() + 2);
        let shown = rows.len().saturating_sub(visible);
        assert!(rows[shown..].iter().take(visible - 1).all(|row| !row.is_empty()));
    }

    #[test]
    fn json_output_brackets_render_bold_white() {
        let mut renderer = renderer(40, 6);
        let mut vm = ViewModel::new();
        vm.append_output(LineStyle::Output, "{\"a\": 1}\n");
        renderer.render(&vm).unwrap();

        let raw = renderer.render_stream().written_text();
        assert!(raw.contains(&format!("{}{{", theme::json_token_style(TokenKind::Bracket).escape())));
    }

    #[test]
    fn tiny_terminal_renders_nothing() {
        let mut renderer = renderer(4, 3);
        renderer.render(&ViewModel::new()).unwrap();
        assert!(renderer.render_stream().has_command(&RenderCommand::ClearScreen));
        assert!(!renderer.render_stream().has_command(&RenderCommand::ShowCursor));
    }

    #[test]
    fn initialize_and_cleanup_toggle_terminal_modes() {
        let mut renderer = renderer(40, 10);
        renderer.initialize().unwrap();
        renderer.cleanup().unwrap();
        let commands = renderer.render_stream().get_commands();
        assert!(commands.contains(&RenderCommand::EnableRawMode));
        assert!(commands.contains(&RenderCommand::EnterAlternateScreen));
        assert!(commands.contains(&RenderCommand::LeaveAlternateScreen));
        assert!(commands.contains(&RenderCommand::DisableRawMode));
    }
}
