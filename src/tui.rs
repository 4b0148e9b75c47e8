use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::io::stdout;
use std::path::Path;

use crate::models::SavedReport;
use crate::report::list_reports;

struct AppState {
    reports: Vec<SavedReport>,
    selected: usize,
    scroll_offset: u16,
    body: String,
}

impl AppState {
    fn new(reports: Vec<SavedReport>) -> Self {
        let mut state = Self {
            reports,
            selected: 0,
            scroll_offset: 0,
            body: String::new(),
        };
        state.load_body();
        state
    }

    fn load_body(&mut self) {
        self.body = match self.reports.get(self.selected) {
            Some(report) => std::fs::read_to_string(&report.path).unwrap_or_else(|e| {
                format!("Could not read {}: {}", report.path.display(), e)
            }),
            None => String::new(),
        };
    }

    fn next(&mut self) {
        if !self.reports.is_empty() && self.selected < self.reports.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
            self.load_body();
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
            self.load_body();
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

/// Two-pane browser over saved reports: list on the left, report body on
/// the right.
pub fn run_browse(output_dir: &Path) -> Result<()> {
    let reports = list_reports(output_dir)?;
    if reports.is_empty() {
        println!("No reports found in {}.", output_dir.display());
        return Ok(());
    }

    let mut state = AppState::new(reports);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('g') => state.scroll_offset = 0,
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(frame.area());

    // Left panel: saved reports, newest first
    let items: Vec<ListItem> = state
        .reports
        .iter()
        .map(|report| {
            let company = if report.company.len() > 24 {
                format!("{}...", &report.company[..21])
            } else {
                report.company.clone()
            };
            ListItem::new(format!("{:<24} {}", company, report.display_timestamp()))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Reports ({}) ",
            state.reports.len()
        )))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: report body, wrapped to the pane
    let width = chunks[1].width.saturating_sub(2).max(20) as usize;
    let wrapped = textwrap::fill(&state.body, width);
    let detail = Paragraph::new(wrapped)
        .block(Block::default().borders(Borders::ALL).title(" Report "))
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail, chunks[1]);

    // Footer help
    let help_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let help = Paragraph::new(" j/k:navigate  J/K:scroll  g:top  q:quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area[1]);
}
