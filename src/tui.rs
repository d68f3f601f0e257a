use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};

use crate::app::App;
use crate::domain::{ConfigPatch, ConnectionConfig, LoadOutcome};
use crate::fetch::RemoteFetcher;
use crate::source::SourceUrl;
use crate::view::{self, ViewLine};

const BOOKMARK_HINTS: &str = "r refresh | l local copy | F2 settings | Up/Down scroll | q quit";
const SETTINGS_HINTS: &str =
    "Up/Down field | Space mirror | Ctrl+T show token | Enter save | F1 bookmarks | Esc quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Bookmarks,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Repo,
    FilePath,
    Token,
    Mirror,
}

impl Field {
    const ALL: [Field; 5] = [
        Field::Username,
        Field::Repo,
        Field::FilePath,
        Field::Token,
        Field::Mirror,
    ];

    fn label(self) -> &'static str {
        match self {
            Field::Username => "Username",
            Field::Repo => "Repository",
            Field::FilePath => "File path",
            Field::Token => "Token",
            Field::Mirror => "Use mirror",
        }
    }

    fn index(self) -> usize {
        match self {
            Field::Username => 0,
            Field::Repo => 1,
            Field::FilePath => 2,
            Field::Token => 3,
            Field::Mirror => 4,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SettingsForm {
    username: String,
    repo: String,
    file_path: String,
    token: String,
    use_mirror: bool,
    focus: Field,
    show_token: bool,
}

impl SettingsForm {
    fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            username: config.username.clone(),
            repo: config.repo.clone(),
            file_path: config.file_path.clone(),
            token: config.token.clone(),
            use_mirror: config.use_mirror,
            focus: Field::Username,
            show_token: false,
        }
    }

    fn to_patch(&self) -> ConfigPatch {
        ConfigPatch {
            username: Some(self.username.clone()),
            repo: Some(self.repo.clone()),
            file_path: Some(self.file_path.clone()),
            token: Some(self.token.clone()),
            use_mirror: Some(self.use_mirror),
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Username => Some(&mut self.username),
            Field::Repo => Some(&mut self.repo),
            Field::FilePath => Some(&mut self.file_path),
            Field::Token => Some(&mut self.token),
            Field::Mirror => None,
        }
    }

    fn input(&mut self, ch: char) {
        if self.focus == Field::Mirror {
            if ch == ' ' {
                self.use_mirror = !self.use_mirror;
            }
            return;
        }
        if let Some(text) = self.focused_text() {
            text.push(ch);
        }
    }

    fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    fn display_value(&self, field: Field) -> String {
        match field {
            Field::Username => self.username.clone(),
            Field::Repo => self.repo.clone(),
            Field::FilePath => self.file_path.clone(),
            Field::Token if self.show_token => self.token.clone(),
            Field::Token => "*".repeat(self.token.chars().count()),
            Field::Mirror => (if self.use_mirror { "[x]" } else { "[ ]" }).to_string(),
        }
    }
}

/// Interactive two-tab viewer: bookmarks and connection settings.
pub struct Tui<F: RemoteFetcher + 'static> {
    app: Arc<App<F>>,
    tab: Tab,
    form: SettingsForm,
    lines: Vec<ViewLine>,
    scroll: u16,
    status: String,
    level: StatusLevel,
    status_at: DateTime<Local>,
    in_flight: usize,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
}

impl<F: RemoteFetcher + 'static> Tui<F> {
    pub fn new(app: Arc<App<F>>) -> Self {
        let form = SettingsForm::from_config(&app.get_config());
        let (tx, rx) = mpsc::channel();
        Self {
            app,
            tab: Tab::Bookmarks,
            form,
            lines: Vec::new(),
            scroll: 0,
            status: "ready".to_string(),
            level: StatusLevel::Info,
            status_at: Local::now(),
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn run(mut self) -> miette::Result<()> {
        self.start_load();

        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> miette::Result<()> {
        loop {
            self.drain_results();
            terminal
                .draw(|frame| draw_ui(frame, self))
                .into_diagnostic()?;

            if event::poll(Duration::from_millis(120)).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn set_status(&mut self, level: StatusLevel, status: impl Into<String>) {
        self.level = level;
        self.status = status.into();
        self.status_at = Local::now();
    }

    /// Starts a remote load on a worker thread using the saved config.
    /// Overlapping loads are not coalesced; whichever settles last is shown.
    fn start_load(&mut self) {
        let config = self.app.get_config();
        if !config.is_configured() {
            self.tab = Tab::Settings;
            self.set_status(
                StatusLevel::Error,
                "Configure the GitHub username and repository first",
            );
            return;
        }

        self.in_flight += 1;
        self.set_status(StatusLevel::Info, "Loading bookmarks...");
        let app = Arc::clone(&self.app);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let _ = tx.send(app.load_from_remote(&config));
        });
    }

    fn load_local(&mut self) {
        let outcome = LoadOutcome::from(self.app.local_reader().read_local());
        self.apply_outcome(outcome, "local copy");
    }

    fn drain_results(&mut self) {
        while let Ok(outcome) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply_outcome(outcome, "GitHub");
        }
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome, source: &str) {
        match outcome {
            LoadOutcome::Success { data } => {
                self.lines = view::flatten_document(&data);
                self.scroll = 0;
                let count = view::count_bookmarks(&self.lines);
                self.set_status(
                    StatusLevel::Ok,
                    format!("Loaded {count} bookmarks from {source}"),
                );
            }
            LoadOutcome::Failure { message, .. } => {
                self.set_status(StatusLevel::Error, format!("Load failed: {message}"));
            }
        }
    }

    fn save_settings(&mut self) {
        let response = self.app.save_config(self.form.to_patch());
        if response.success {
            let focus = self.form.focus;
            self.form = SettingsForm::from_config(&self.app.get_config());
            self.form.focus = focus;
            self.set_status(StatusLevel::Ok, "Settings saved");
            self.tab = Tab::Bookmarks;
            self.start_load();
        } else {
            let error = response.error.unwrap_or_default();
            self.set_status(
                StatusLevel::Error,
                format!("Failed to save settings: {error}"),
            );
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c')) {
            return true;
        }
        match key.code {
            KeyCode::F(1) => {
                self.tab = Tab::Bookmarks;
                return false;
            }
            KeyCode::F(2) => {
                self.tab = Tab::Settings;
                return false;
            }
            _ => {}
        }

        match self.tab {
            Tab::Bookmarks => self.handle_bookmarks_key(key),
            Tab::Settings => self.handle_settings_key(key, ctrl),
        }
    }

    fn handle_bookmarks_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('r') => self.start_load(),
            KeyCode::Char('l') => self.load_local(),
            KeyCode::Char('s') => self.tab = Tab::Settings,
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-10),
            KeyCode::PageDown => self.scroll_by(10),
            _ => {}
        }
        false
    }

    fn handle_settings_key(&mut self, key: KeyEvent, ctrl: bool) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::BackTab => self.form.focus = self.form.focus.prev(),
            KeyCode::Down | KeyCode::Tab => self.form.focus = self.form.focus.next(),
            KeyCode::Enter => self.save_settings(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char('t') if ctrl => self.form.show_token = !self.form.show_token,
            KeyCode::Char(ch) if !ctrl => self.form.input(ch),
            _ => {}
        }
        false
    }

    fn scroll_by(&mut self, delta: i32) {
        self.scroll = scrolled(self.scroll, delta, self.lines.len());
    }
}

/// Paragraph scroll offsets are `u16`; rows past `u16::MAX` are unreachable.
fn scrolled(current: u16, delta: i32, rows: usize) -> u16 {
    let max = rows.saturating_sub(1).min(usize::from(u16::MAX)) as i32;
    let next = (i32::from(current) + delta).clamp(0, max);
    next as u16
}

fn draw_ui<F: RemoteFetcher + 'static>(frame: &mut ratatui::Frame, tui: &Tui<F>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = match tui.tab {
        Tab::Bookmarks => 0,
        Tab::Settings => 1,
    };
    let tabs = Tabs::new(vec![Line::from(" Bookmarks "), Line::from(" Settings ")])
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("GITMARKS"))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    match tui.tab {
        Tab::Bookmarks => draw_bookmarks(frame, tui, chunks[1]),
        Tab::Settings => draw_settings(frame, tui, chunks[1]),
    }

    draw_status(frame, tui, chunks[2]);
}

fn draw_bookmarks<F: RemoteFetcher + 'static>(
    frame: &mut ratatui::Frame,
    tui: &Tui<F>,
    area: Rect,
) {
    let count = view::count_bookmarks(&tui.lines);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Bookmarks ({count})"));

    if tui.lines.is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "No bookmarks loaded. Press r to refresh or l for the local copy.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let lines = tui
        .lines
        .iter()
        .map(|line| {
            let indent = Span::raw("  ".repeat(line.depth));
            if line.folder {
                return Line::from(vec![
                    indent,
                    Span::styled(
                        format!("+ {}", line.label),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]);
            }
            match &line.url {
                Some(url) if *url != line.label => Line::from(vec![
                    indent,
                    Span::raw(line.label.clone()),
                    Span::raw("  "),
                    Span::styled(url.clone(), Style::default().fg(Color::DarkGray)),
                ]),
                Some(_) => Line::from(vec![indent, Span::raw(line.label.clone())]),
                None => Line::from(vec![
                    indent,
                    Span::styled(line.label.clone(), Style::default().fg(Color::Gray)),
                ]),
            }
        })
        .collect::<Vec<_>>();

    let body = Paragraph::new(lines).block(block).scroll((tui.scroll, 0));
    frame.render_widget(body, area);
}

fn draw_settings<F: RemoteFetcher + 'static>(
    frame: &mut ratatui::Frame,
    tui: &Tui<F>,
    area: Rect,
) {
    let mut lines = Field::ALL
        .iter()
        .map(|field| {
            let focused = *field == tui.form.focus;
            let marker = if focused { "> " } else { "  " };
            let value_style = if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{:<12}", field.label()),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(tui.form.display_value(*field), value_style),
            ])
        })
        .collect::<Vec<_>>();

    let preview = ConnectionConfig::from_patch(tui.form.to_patch());
    let url = if preview.is_configured() {
        SourceUrl::build(&preview)
            .map(|url| url.to_string())
            .unwrap_or_else(|err| err.to_string())
    } else {
        "n/a".to_string()
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Source URL  ", Style::default().fg(Color::Gray)),
        Span::styled(url, Style::default().fg(Color::DarkGray)),
    ]));

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .wrap(Wrap { trim: false });
    frame.render_widget(body, area);
}

fn draw_status<F: RemoteFetcher + 'static>(
    frame: &mut ratatui::Frame,
    tui: &Tui<F>,
    area: Rect,
) {
    let color = match tui.level {
        StatusLevel::Info => Color::White,
        StatusLevel::Ok => Color::Green,
        StatusLevel::Error => Color::Red,
    };
    let spinner = if tui.in_flight > 0 { " ..." } else { "" };
    let hints = match tui.tab {
        Tab::Bookmarks => BOOKMARK_HINTS,
        Tab::Settings => SETTINGS_HINTS,
    };
    let status = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!("[{}] ", tui.status_at.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format!("{}{spinner}", tui.status), Style::default().fg(color)),
        ]),
        Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray))),
    ])
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, area);
}
