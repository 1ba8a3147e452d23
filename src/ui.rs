use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    config::TICKS_PER_SEC,
    problem::Token,
    session::SessionSummary,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const GAUGE_HEIGHT: u16 = 3;
// the answer box never shrinks below this many cells
const MIN_BLANK_WIDTH: usize = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Drilling => render_drill(self, area, buf),
            AppState::Results => {
                let summary = self.board.completed.unwrap_or_default();
                render_results(&summary, self.board.starting, area, buf);
            }
        }
    }
}

fn render_drill(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(GAUGE_HEIGHT),
            Constraint::Length(GAUGE_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);

    // vertically centre the single question line
    let question_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(chunks[0])[1];

    Paragraph::new(question_line(app))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(question_area, buf);

    timer_gauge(app).render(chunks[1], buf);

    let solved = app.board.starting - app.board.remaining;
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(app.progress_ratio().clamp(0.0, 1.0))
        .label(format!("{solved}/{}", app.board.starting))
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "type the missing number, (enter) to answer, (esc)ape to quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}

fn question_line(app: &App) -> Line<'static> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let input = &app.board.input;
    let blank_style = if app.board.missed {
        bold_style.fg(Color::Red).add_modifier(Modifier::UNDERLINED)
    } else {
        bold_style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
    };
    let pad = MIN_BLANK_WIDTH.saturating_sub(input.width());

    let spans: Vec<Span<'static>> = app
        .board
        .tokens
        .iter()
        .flat_map(|token| {
            let span = match token {
                Token::Number(n) => Span::styled(n.to_string(), bold_style),
                Token::Operator(_) | Token::Equals => Span::styled(token.to_string(), dim_style),
                Token::Blank => Span::styled(format!("{input}{}", " ".repeat(pad)), blank_style),
            };
            [span, Span::raw(" ")]
        })
        .collect();

    Line::from(spans)
}

fn timer_gauge(app: &App) -> Gauge<'static> {
    let block = Block::default().borders(Borders::ALL).title("time");

    match (app.timer_ratio(), app.session.timer_remaining()) {
        (None, _) => Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::DarkGray))
            .ratio(1.0)
            .label("untimed"),
        (Some(_), None) => Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::DarkGray))
            .ratio(0.0)
            .label("stopped"),
        (Some(ratio), Some(ticks)) => Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(format!("{:.1}s", f64::from(ticks) / f64::from(TICKS_PER_SEC))),
    }
}

fn render_results(summary: &SessionSummary, starting: usize, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!("set complete: {starting} problems"),
        bold_style.fg(Color::Green),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} answers   {} wrong   {} timeouts",
            summary.submissions, summary.wrong_answers, summary.timeouts
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled("(n)ew set / (q)uit", italic_style)).render(chunks[4], buf);
}
