//! Full-screen terminal interface built on Ratatui.
//!
//! # Layout
//! Title, attempts counter, tip, word tiles, guess box, used letters and a
//! key help line, top to bottom. Notices and the restart question are drawn
//! as a modal popup on top of the board and block until answered.
//!
//! # Keys
//! - Letters: set the pending guess (one letter, the last key wins)
//! - `BACKSPACE`: clear the pending guess
//! - `ENTER`: confirm the guess
//! - `CTRL+R`: restart (asks for confirmation)
//! - `ESC`: quit

use crate::game_state::{GameInterface, GameSession, Notice, UserAction};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;
const POPUP_WIDTH_PERCENT: u16 = 60;
const POPUP_HEIGHT: u16 = 7;
const INSTRUCTIONS: &str = "Letra: palpite | ENTER: Confirmar | CTRL+R: Reiniciar | ESC: Sair";

const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const TIP_STYLE: Style = Style::new().fg(Color::Yellow);
const REVEALED_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Green);
const HIDDEN_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);
const CORRECT_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const WRONG_STYLE: Style = Style::new().fg(Color::Red);
const POPUP_STYLE: Style = Style::new().fg(Color::White).bg(Color::Blue);

#[derive(Clone, Debug, PartialEq, Eq)]
enum Popup {
    Notice(String),
    Question(String),
}

impl Popup {
    fn title(&self) -> &'static str {
        match self {
            Self::Notice(_) => "Aviso",
            Self::Question(_) => "Confirmação",
        }
    }

    fn lines(&self) -> Vec<Line<'_>> {
        match self {
            Self::Notice(text) => vec![
                Line::from(text.as_str()),
                Line::from(""),
                Line::from("Pressione qualquer tecla"),
            ],
            Self::Question(text) => vec![
                Line::from(text.as_str()),
                Line::from(""),
                Line::from("S: sim | N: não"),
            ],
        }
    }
}

/// Maps a key press on the board to the action it stands for.
fn action_for_key(key: KeyEvent) -> Option<UserAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Esc => Some(UserAction::Exit),
        KeyCode::Enter => Some(UserAction::Confirm),
        KeyCode::Char('r' | 'R') if ctrl => Some(UserAction::Restart),
        KeyCode::Backspace | KeyCode::Delete => Some(UserAction::Input(String::new())),
        KeyCode::Char(c) if c.is_alphabetic() && !ctrl && !alt => {
            Some(UserAction::Input(c.to_string()))
        }
        _ => None,
    }
}

/// Answer to the restart question, if the key is one.
fn answer_for_key(key: KeyEvent) -> Option<bool> {
    match key.code {
        KeyCode::Char('s' | 'S' | 'y' | 'Y') | KeyCode::Enter => Some(true),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(false),
        _ => None,
    }
}

/// Pulls keys until one maps to an action. Exits once no key can be read.
fn next_key_action<F: FnMut() -> Option<KeyEvent>>(mut next_key: F) -> Option<UserAction> {
    loop {
        let Some(key) = next_key() else {
            return Some(UserAction::Exit);
        };
        if let Some(action) = action_for_key(key) {
            return Some(action);
        }
    }
}

/// Replacement and control characters show up when the terminal loses focus.
fn is_garbage(key: &KeyEvent) -> bool {
    if let KeyCode::Char(c) = key.code {
        c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD
    } else {
        false
    }
}

fn centered_rect(area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(POPUP_HEIGHT)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Percentage(POPUP_WIDTH_PERCENT)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

fn render_frame(f: &mut Frame, session: &GameSession, popup: Option<&Popup>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + attempts
            Constraint::Length(3), // Tip
            Constraint::Length(3), // Word
            Constraint::Length(3), // Guess
            Constraint::Min(3),    // Used letters
            Constraint::Length(3), // Instructions
        ])
        .split(f.area());

    render_header(f, chunks[0], session);
    render_tip(f, chunks[1], session);
    render_word(f, chunks[2], session);
    render_guess(f, chunks[3], session);
    render_letters_used(f, chunks[4], session);
    render_instructions(f, chunks[5]);

    if let Some(popup) = popup {
        render_popup(f, popup);
    }
}

fn render_header(f: &mut Frame, area: Rect, session: &GameSession) {
    let text = format!(
        "FORCA    Tentativas: {} de {}",
        session.attempts_used(),
        session.max_attempts()
    );
    let paragraph = Paragraph::new(text)
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_tip(f: &mut Frame, area: Rect, session: &GameSession) {
    let tip = session.challenge().map_or("", |challenge| challenge.tip());
    let paragraph = Paragraph::new(tip)
        .style(TIP_STYLE)
        .block(Block::default().title("Dica").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_word(f: &mut Frame, area: Rect, session: &GameSession) {
    let mut spans = vec![Span::raw(" ")];
    for tile in session.tiles() {
        match tile {
            Some(letter) => spans.push(Span::styled(format!(" {letter} "), REVEALED_STYLE)),
            None => spans.push(Span::styled(" _ ", HIDDEN_STYLE)),
        }
        spans.push(Span::raw(" "));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Palavra").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_guess(f: &mut Frame, area: Rect, session: &GameSession) {
    let pending = session.pending_input();
    let shown = if pending.is_empty() { "?" } else { pending };
    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(format!(" {shown} "), HIDDEN_STYLE),
    ]);
    let paragraph =
        Paragraph::new(line).block(Block::default().title("Palpite").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_letters_used(f: &mut Frame, area: Rect, session: &GameSession) {
    let mut spans = vec![Span::raw(" ")];
    for used in session.letters_used() {
        let style = if used.correct { CORRECT_STYLE } else { WRONG_STYLE };
        spans.push(Span::styled(used.value.to_string(), style));
        spans.push(Span::raw(" "));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Letras utilizadas").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_instructions(f: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(INSTRUCTIONS)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_popup(f: &mut Frame, popup: &Popup) {
    let area = centered_rect(f.area());
    let paragraph = Paragraph::new(popup.lines())
        .style(POPUP_STYLE)
        .block(Block::default().title(popup.title()).borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// Ratatui implementation of `GameInterface`.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    session: GameSession,
    popup: Option<Popup>,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete");

        Ok(Self {
            terminal,
            session: GameSession::new(),
            popup: None,
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let session = &self.session;
        let popup = self.popup.as_ref();
        self.terminal.draw(|f| render_frame(f, session, popup))?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    /// Reads one key press within `timeout`, dropping everything else.
    fn read_key(timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press && !is_garbage(&key) => {
                debug_log!("read_key() - {:?} {:?}", key.code, key.modifiers);
                Ok(Some(key))
            }
            other => {
                debug_log!("read_key() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }

    /// Blocks until a key press arrives. `None` if the terminal fails.
    fn wait_for_key(&mut self) -> Option<KeyEvent> {
        loop {
            match Self::read_key(Duration::from_millis(EVENT_POLL_TIMEOUT_MS)) {
                Ok(Some(key)) => return Some(key),
                Ok(None) => {}
                Err(e) => {
                    debug_log!("wait_for_key() - Input error: {}", e);
                    return None;
                }
            }
        }
    }
}

impl GameInterface for TuiInterface {
    fn render(&mut self, session: &GameSession) {
        self.session.clone_from(session);
        self.draw_or_log();
    }

    fn next_action(&mut self, timeout: Option<Duration>) -> Option<UserAction> {
        let Some(timeout) = timeout else {
            return next_key_action(|| self.wait_for_key());
        };
        match Self::read_key(timeout) {
            Ok(key) => key.and_then(action_for_key),
            Err(e) => {
                debug_log!("next_action() - Input error: {}", e);
                Some(UserAction::Exit)
            }
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.popup = Some(Popup::Question(question.to_string()));
        self.draw_or_log();
        let answer = loop {
            let Some(key) = self.wait_for_key() else {
                break false;
            };
            if let Some(answer) = answer_for_key(key) {
                break answer;
            }
        };
        info_log!("confirm() - answer: {}", answer);
        self.popup = None;
        self.draw_or_log();
        answer
    }

    fn notify(&mut self, notice: &Notice) {
        info_log!("notify() - {}", notice);
        self.popup = Some(Popup::Notice(notice.to_string()));
        self.draw_or_log();
        if self.wait_for_key().is_none() {
            debug_log!("notify() - No key read, dismissing notice");
        }
        self.popup = None;
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordbank::Challenge;
    use ratatui::backend::TestBackend;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn sample_session() -> GameSession {
        let mut session = GameSession::new();
        session.start(Challenge::new("GATO", "Animal doméstico que mia").unwrap());
        session.set_pending_input("a");
        session.confirm_guess().unwrap();
        session.set_pending_input("z");
        session.confirm_guess().unwrap();
        session.set_pending_input("t");
        session
    }

    #[test]
    fn test_letter_keys_set_pending_input() {
        assert_eq!(
            action_for_key(press(KeyCode::Char('a'))),
            Some(UserAction::Input("a".to_string()))
        );
        assert_eq!(
            action_for_key(press(KeyCode::Backspace)),
            Some(UserAction::Input(String::new()))
        );
        assert_eq!(action_for_key(press(KeyCode::Char('1'))), None);
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(action_for_key(press(KeyCode::Enter)), Some(UserAction::Confirm));
        assert_eq!(action_for_key(press(KeyCode::Esc)), Some(UserAction::Exit));
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(action_for_key(ctrl_r), Some(UserAction::Restart));
        let alt_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT);
        assert_eq!(action_for_key(alt_a), None);
    }

    #[test]
    fn test_closed_input_exits() {
        assert_eq!(next_key_action(|| None), Some(UserAction::Exit));
    }

    #[test]
    fn test_non_action_keys_are_skipped() {
        let mut keys = vec![press(KeyCode::Enter), press(KeyCode::Char('1')), press(KeyCode::Tab)];
        assert_eq!(next_key_action(|| keys.pop()), Some(UserAction::Confirm));
        assert!(keys.is_empty());
    }

    #[test]
    fn test_answer_keys() {
        assert_eq!(answer_for_key(press(KeyCode::Char('s'))), Some(true));
        assert_eq!(answer_for_key(press(KeyCode::Enter)), Some(true));
        assert_eq!(answer_for_key(press(KeyCode::Char('N'))), Some(false));
        assert_eq!(answer_for_key(press(KeyCode::Esc)), Some(false));
        assert_eq!(answer_for_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_garbage_keys() {
        assert!(is_garbage(&press(KeyCode::Char('\u{FFFD}'))));
        assert!(is_garbage(&press(KeyCode::Char('\u{1b}'))));
        assert!(!is_garbage(&press(KeyCode::Char('a'))));
        assert!(!is_garbage(&press(KeyCode::Enter)));
    }

    #[test]
    fn test_render_board() {
        let session = sample_session();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render_frame(f, &session, None)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Tentativas: 2 de 9"));
        assert!(text.contains("Animal doméstico que mia"));
        assert!(text.contains(" _   A   _   _ "));
        assert!(text.contains(" t "));
        assert!(text.contains("A Z"));
    }

    #[test]
    fn test_render_popup() {
        let session = sample_session();
        let popup = Popup::Notice(Notice::Lost.to_string());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render_frame(f, &session, Some(&popup))).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Aviso"));
        assert!(text.contains("Que pena, você usou todas as tentativas!"));
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 4);
        let popup = centered_rect(area);
        assert!(popup.height <= area.height);
        assert!(popup.x + popup.width <= area.width);
    }
}
