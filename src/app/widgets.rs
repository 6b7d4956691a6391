use crate::client::{Method, RequestError};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::text::{Line, Text};
use serde::Serialize;

/// Follow-up command a widget hands back to the mode controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The widget confirmed its value (url field on enter).
    Submitted,
    /// The widget gave up focus on its own (method field on esc/enter).
    Dismissed,
}

/// Anything that can hold exclusive keyboard focus. `handle` must be a
/// no-op while unfocused; dimensions always come from the controller,
/// a widget never queries the terminal itself.
pub trait FocusableInput {
    fn focus(&mut self);
    fn blur(&mut self);
    fn focused(&self) -> bool;
    fn handle(&mut self, key: &KeyEvent) -> Option<Effect>;
    fn render(&self, width: u16) -> Text<'static>;
}

fn clip(line: &str, start: usize, width: usize) -> String {
    line.chars().skip(start).take(width).collect()
}

/// Single-line text editor for the request URL.
#[derive(Debug, Default)]
pub struct TextField {
    value: String,
    cursor: usize,
    has_focus: bool,
}

impl TextField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    /// Returns the byte index based on the character position.
    ///
    /// Since each character in a string can contain multiple bytes, it's
    /// necessary to calculate the byte index based on the index of the
    /// character.
    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor)
            .unwrap_or(self.value.len())
    }

    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.value.chars().count())
    }

    fn enter_char(&mut self, c: char) {
        let index = self.byte_index();
        self.value.insert(index, c);
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let index = self.byte_index();
        self.value.remove(index);
    }

    fn delete_char_forward(&mut self) {
        if self.cursor < self.value.chars().count() {
            let index = self.byte_index();
            self.value.remove(index);
        }
    }

    /// Column of the cursor within a window of `width` columns, for
    /// placing the terminal cursor while this field is focused.
    pub fn cursor_column(&self, width: u16) -> u16 {
        let start = self.window_start(width as usize);
        (self.cursor - start) as u16
    }

    fn window_start(&self, width: usize) -> usize {
        if width == 0 {
            return 0;
        }
        self.cursor.saturating_sub(width - 1)
    }
}

impl FocusableInput for TextField {
    fn focus(&mut self) {
        self.has_focus = true;
    }

    fn blur(&mut self) {
        self.has_focus = false;
    }

    fn focused(&self) -> bool {
        self.has_focus
    }

    fn handle(&mut self, key: &KeyEvent) -> Option<Effect> {
        if !self.has_focus {
            return None;
        }
        match key.code {
            KeyCode::Enter => return Some(Effect::Submitted),
            KeyCode::Char(c) => self.enter_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Delete => self.delete_char_forward(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = self.clamp_cursor(self.cursor.saturating_add(1)),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => {}
        }
        None
    }

    fn render(&self, width: u16) -> Text<'static> {
        let start = self.window_start(width as usize);
        Text::from(clip(&self.value, start, width as usize))
    }
}

/// Selector over the closed method set. Unlike the other inputs it blurs
/// itself once a choice is confirmed, the controller only observes that.
#[derive(Debug, Default)]
pub struct MethodField {
    method: Method,
    has_focus: bool,
}

impl MethodField {
    pub fn value(&self) -> Method {
        self.method
    }
}

impl FocusableInput for MethodField {
    fn focus(&mut self) {
        self.has_focus = true;
    }

    fn blur(&mut self) {
        self.has_focus = false;
    }

    fn focused(&self) -> bool {
        self.has_focus
    }

    fn handle(&mut self, key: &KeyEvent) -> Option<Effect> {
        if !self.has_focus {
            return None;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.has_focus = false;
                return Some(Effect::Dismissed);
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') | KeyCode::Char('k') | KeyCode::Char(' ') => {
                self.method = self.method.next();
            }
            _ => {}
        }
        None
    }

    fn render(&self, width: u16) -> Text<'static> {
        Text::from(clip(self.method.as_str(), 0, width as usize))
    }
}

/// Multi-line editor for the request body.
#[derive(Debug)]
pub struct BodyEditor {
    lines: Vec<String>,
    row: usize,
    col: usize,
    height: u16,
    has_focus: bool,
}

impl Default for BodyEditor {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            height: 0,
            has_focus: false,
        }
    }
}

impl BodyEditor {
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height;
    }

    pub fn cursor_position(&self) -> (u16, u16) {
        (self.col as u16, self.row as u16)
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .map(|(i, _)| i)
            .nth(col)
            .unwrap_or(line.len())
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn enter_char(&mut self, c: char) {
        let index = Self::byte_index(&self.lines[self.row], self.col);
        self.lines[self.row].insert(index, c);
        self.col += 1;
    }

    fn insert_newline(&mut self) {
        let index = Self::byte_index(&self.lines[self.row], self.col);
        let rest = self.lines[self.row].split_off(index);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    fn delete_char(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let index = Self::byte_index(&self.lines[self.row], self.col);
            self.lines[self.row].remove(index);
        } else if self.row > 0 {
            // Join with the previous line.
            let tail = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&tail);
        }
    }
}

impl FocusableInput for BodyEditor {
    fn focus(&mut self) {
        self.has_focus = true;
    }

    fn blur(&mut self) {
        self.has_focus = false;
    }

    fn focused(&self) -> bool {
        self.has_focus
    }

    fn handle(&mut self, key: &KeyEvent) -> Option<Effect> {
        if !self.has_focus {
            return None;
        }
        match key.code {
            KeyCode::Char(c) => self.enter_char(c),
            KeyCode::Enter => self.insert_newline(),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.col = self.col.saturating_sub(1),
            KeyCode::Right => self.col = self.col.saturating_add(1).min(self.line_len(self.row)),
            KeyCode::Up => {
                self.row = self.row.saturating_sub(1);
                self.col = self.col.min(self.line_len(self.row));
            }
            KeyCode::Down => {
                self.row = self.row.saturating_add(1).min(self.lines.len() - 1);
                self.col = self.col.min(self.line_len(self.row));
            }
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.line_len(self.row),
            _ => {}
        }
        None
    }

    fn render(&self, width: u16) -> Text<'static> {
        let lines = self
            .lines
            .iter()
            .take(self.height.max(1) as usize)
            .map(|l| Line::from(clip(l, 0, width as usize)))
            .collect::<Vec<_>>();
        Text::from(lines)
    }
}

/// Scrollable view over the last accepted response body or error. This
/// widget owns the displayed content; only the event-merge step writes
/// to it, and only for results whose tag is still current.
#[derive(Debug, Default)]
pub struct ResponseViewer {
    content: String,
    scroll: usize,
    height: u16,
    has_focus: bool,
}

impl ResponseViewer {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Accept a successful body. JSON objects get re-indented, anything
    /// else is shown verbatim.
    pub fn set_body(&mut self, raw: &str) {
        self.content = prettify(raw);
        self.scroll = 0;
    }

    /// Accept a failed request; the message becomes the displayed content.
    pub fn set_error(&mut self, error: &RequestError) {
        self.content = error.to_string();
        self.scroll = 0;
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn max_scroll(&self) -> usize {
        self.content
            .lines()
            .count()
            .saturating_sub(self.height as usize)
    }
}

impl FocusableInput for ResponseViewer {
    fn focus(&mut self) {
        self.has_focus = true;
    }

    fn blur(&mut self) {
        self.has_focus = false;
    }

    fn focused(&self) -> bool {
        self.has_focus
    }

    fn handle(&mut self, key: &KeyEvent) -> Option<Effect> {
        if !self.has_focus {
            return None;
        }
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1).min(self.max_scroll());
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => {
                self.scroll = self
                    .scroll
                    .saturating_add(self.height as usize)
                    .min(self.max_scroll());
            }
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(self.height as usize),
            _ => {}
        }
        None
    }

    fn render(&self, width: u16) -> Text<'static> {
        let lines = self
            .content
            .lines()
            .skip(self.scroll)
            .take(self.height.max(1) as usize)
            .map(|l| Line::from(clip(l, 0, width as usize)))
            .collect::<Vec<_>>();
        Text::from(lines)
    }
}

/// Re-serialize a JSON object with 4-space indentation. Anything that is
/// not a JSON object (arrays and scalars included) comes back untouched.
pub fn prettify(raw: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return raw.to_string();
    };
    if !value.is_object() {
        return raw.to_string();
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut ser).is_err() {
        return raw.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| raw.to_string())
}
