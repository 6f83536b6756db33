use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::menu::{Session, Step};

use super::helpers::{key_hint_line, visible_range};

/// Footer space reserved for key hints.
const FOOTER_HEIGHT: u16 = 2;
/// Width of the menu panel on the left.
const MENU_WIDTH: u16 = 36;
/// Height of the input box, borders included.
const INPUT_HEIGHT: u16 = 3;
/// Lines moved per PageUp/PageDown.
const SCROLL_STEP: usize = 5;

/// State of the full-screen front-end: the store, the menu session, and what
/// has been printed so far.
pub struct App {
    conn: Connection,
    session: Session,
    transcript: Vec<String>,
    input: String,
    scroll: usize,
}

impl App {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            session: Session::new(),
            transcript: Vec::new(),
            input: String::new(),
            scroll: 0,
        }
    }

    /// Everything echoed or printed so far, oldest first.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Give the store back so the caller can close it.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Apply one key press. Returns `true` once the operator chose to exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Enter => return self.submit_input(),
            KeyCode::Char(ch) if !ch.is_control() => self.input.push(ch),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => self.input.clear(),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_add(SCROLL_STEP),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_sub(SCROLL_STEP),
            _ => {}
        }
        Ok(false)
    }

    /// Hand the typed line to the session, echoing it into the transcript.
    pub fn submit_input(&mut self) -> Result<bool> {
        let line = std::mem::take(&mut self.input);
        self.transcript
            .push(format!("{}{}", self.session.prompt().trim_end(), format_echo(&line)));
        let step = self.session.submit(&self.conn, &line, &mut self.transcript)?;
        self.scroll = 0;
        Ok(step == Step::Exit)
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(MENU_WIDTH), Constraint::Min(0)])
            .split(content_area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(INPUT_HEIGHT)])
            .split(columns[1]);

        self.draw_menu(frame, columns[0]);
        self.draw_transcript(frame, rows[0]);
        self.draw_input(frame, rows[1]);

        if area.height > footer_height {
            self.draw_footer(frame, footer_area);
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let highlight = if self.session.at_menu() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let lines: Vec<Line> = self
            .session
            .menu_lines()
            .iter()
            .map(|line| Line::from(Span::styled(*line, highlight)))
            .collect();
        let block = Block::default().borders(Borders::ALL).title("Bookstore");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_transcript(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Inventory");
        let inner = block.inner(area);
        let range = visible_range(self.transcript.len(), inner.height as usize, self.scroll);
        let lines: Vec<Line> = self.transcript[range]
            .iter()
            .map(|line| Line::from(line.as_str()))
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let prompt = self.session.prompt();
        let block = Block::default().borders(Borders::ALL);
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled(prompt, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(self.input.as_str()),
        ]))
        .block(block.clone())
        .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);

        let inner = block.inner(area);
        let offset = (prompt.chars().count() + self.input.chars().count()) as u16;
        let cursor_x = (inner.x + offset).min(inner.right().saturating_sub(1));
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let hints = key_hint_line(&[
            ("Enter", "Submit"),
            ("Esc", "Clear"),
            ("PgUp/PgDn", "Scroll"),
            ("Ctrl-C", "Quit"),
        ]);
        frame.render_widget(Paragraph::new(hints), block.inner(area));
    }
}

fn format_echo(line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!(" {line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn app() -> App {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        App::new(conn)
    }

    fn type_line(app: &mut App, text: &str) -> bool {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
        app.handle_key(KeyCode::Enter).unwrap()
    }

    #[test]
    fn typed_lines_are_echoed_and_answered() {
        let mut app = app();
        assert!(!type_line(&mut app, "7"));
        assert_eq!(
            app.transcript(),
            ["Please enter one of the following numbers: 7", "Invalid choice"]
        );
        assert!(app.input().is_empty());
    }

    #[test]
    fn editing_keys_change_the_input() {
        let mut app = app();
        for ch in "12".chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
        app.handle_key(KeyCode::Backspace).unwrap();
        assert_eq!(app.input(), "1");
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.input(), "");
    }

    #[test]
    fn zero_requests_exit() {
        let mut app = app();
        assert!(!type_line(&mut app, "5"));
        assert!(type_line(&mut app, "0"));
    }
}
