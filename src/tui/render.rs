use std::borrow::Cow;

use super::state::AppState;
use crate::feed::types::{BetType, GameOdds};
use crate::format::{format_start_time, market_lines};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Borders, header row, two snapshot rows of two lines each, one spare line.
const CARD_HEIGHT: u16 = 8;

pub fn draw(f: &mut Frame, state: &AppState, spinner_frame: u8) {
    if state.log_focus {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        draw_header(f, state, chunks[0], spinner_frame);
        draw_logs(f, state, chunks[1]);
        draw_footer(f, state, chunks[2]);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, chunks[0], spinner_frame);
    draw_tabs(f, state, chunks[1]);
    draw_games(f, state, chunks[2]);
    draw_logs(f, state, chunks[3]);
    draw_footer(f, state, chunks[4]);
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect, spinner_frame: u8) {
    let activity = if state.is_refreshing {
        let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
        Span::styled(format!(" {} refreshing", ch), Style::default().fg(Color::Cyan))
    } else {
        Span::styled(" idle", Style::default().fg(Color::DarkGray))
    };

    let source_color = match state.source {
        crate::board::BoardSource::Live(_) => Color::Green,
        crate::board::BoardSource::Demo => Color::Yellow,
        crate::board::BoardSource::Empty => Color::DarkGray,
    };

    let line = Line::from(vec![
        Span::styled(
            " MLB Odds",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | Book: ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.bookmaker.to_uppercase(), Style::default().fg(Color::Cyan)),
        Span::styled(" | Source: ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.source_label(), Style::default().fg(source_color)),
        Span::styled(" | Updated: ", Style::default().fg(Color::DarkGray)),
        Span::raw(state.refresh_age()),
        Span::styled(" | Up: ", Style::default().fg(Color::DarkGray)),
        Span::raw(state.uptime()),
        activity,
    ]);

    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_tabs(f: &mut Frame, state: &AppState, area: Rect) {
    let titles: Vec<Line> = state
        .tab_titles()
        .into_iter()
        .zip([state.today.len(), state.tomorrow.len()])
        .map(|(title, n)| Line::from(format!(" {} | {} Games ", title, n)))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .select(state.active_tab);
    f.render_widget(tabs, area);
}

fn draw_games(f: &mut Frame, state: &AppState, area: Rect) {
    let games = state.active_games();

    if games.is_empty() {
        let msg = if state.is_refreshing || state.last_refresh.is_none() {
            "Loading odds..."
        } else {
            "No games scheduled"
        };
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                msg,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
        ];
        let block = Block::default().borders(Borders::ALL);
        f.render_widget(Paragraph::new(lines).block(block).alignment(Alignment::Center), area);
        return;
    }

    let visible = (area.height / CARD_HEIGHT).max(1) as usize;
    let offset = state.scroll_offset.min(games.len().saturating_sub(1));
    let shown: Vec<&GameOdds> = games.iter().skip(offset).take(visible).collect();

    let constraints: Vec<Constraint> = shown
        .iter()
        .map(|_| Constraint::Length(CARD_HEIGHT))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (game, slot) in shown.into_iter().zip(slots.iter()) {
        draw_card(f, state, game, *slot);
    }
}

/// One game card: matchup title, venue and start time, then opening and
/// current lines for each market.
fn draw_card(f: &mut Frame, state: &AppState, game: &GameOdds, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let info = &game.info;

    let start = format_start_time(info.start_time.as_deref(), state.display_offset, &state.tz_label);
    let subtitle = match &info.venue {
        Some(venue) => format!("{} \u{2022} {}", venue, start),
        None => start,
    };

    let col_width = inner_width.saturating_sub(16) / 3;
    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(BetType::ALL.iter().map(|b| Cell::from(b.label())))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan));

    let snapshot_row = |label: &'static str, current: bool| {
        let mut cells = vec![Cell::from(label).style(Style::default().fg(Color::DarkGray))];
        for bet_type in BetType::ALL {
            let market = game.odds.market(bet_type);
            let snap = if current { &market.current } else { &market.opening };
            let [away, home] = market_lines(info, snap, bet_type);
            cells.push(Cell::from(vec![
                Line::from(clip(&away, col_width).into_owned()),
                Line::from(clip(&home, col_width).into_owned()),
            ]));
        }
        Row::new(cells).height(2)
    };

    let rows = vec![snapshot_row("Opening Lines", false), snapshot_row("Current Lines", true)];
    let widths = [
        Constraint::Length(14),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ];

    let title = clip(&game.matchup(), inner_width.saturating_sub(2)).into_owned();
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", clip(&subtitle, inner_width.saturating_sub(2))),
            Style::default().fg(Color::DarkGray),
        )))
        .borders(Borders::ALL);

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}

fn level_style(level: &str) -> Style {
    match level {
        "ERROR" => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        "WARN" => Style::default().fg(Color::Yellow),
        "EXPORT" => Style::default().fg(Color::Cyan),
        "INFO" => Style::default().fg(Color::Green),
        _ => Style::default().fg(Color::Gray),
    }
}

/// Newest entry first. Focused, the pane scrolls and shows its position;
/// otherwise the title counts warnings and errors still in the buffer.
fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;
    let rows = area.height.saturating_sub(2) as usize;
    let total = state.logs.len();
    let skip = if state.log_focus {
        state.log_scroll_offset.min(total.saturating_sub(rows))
    } else {
        0
    };

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .skip(skip)
        .take(rows)
        .map(|entry| {
            // HH:MM:SS, milliseconds only matter in the log file
            let time = entry.time.get(..8).unwrap_or(entry.time.as_str());
            let badge = format!("{:<6}", entry.level);
            let used = time.chars().count() + badge.chars().count() + 3;
            let style = level_style(&entry.level);
            let text_style = match entry.level.as_str() {
                "WARN" | "ERROR" => style,
                _ => Style::default(),
            };
            Line::from(vec![
                Span::styled(format!(" {} ", time), Style::default().fg(Color::DarkGray)),
                Span::styled(badge, style),
                Span::raw(" "),
                Span::styled(clip(&entry.message, width.saturating_sub(used)).into_owned(), text_style),
            ])
        })
        .collect();

    let title = if state.log_focus {
        let first = if total == 0 { 0 } else { skip + 1 };
        format!(" Log {}-{} of {} ", first, skip + lines.len(), total)
    } else {
        let count = |level: &str| state.logs.iter().filter(|l| l.level == level).count();
        match (count("WARN"), count("ERROR")) {
            (0, 0) => " Log ".to_string(),
            (warn, error) => format!(" Log ({} warn, {} error) ", warn, error),
        }
    };

    let block = Block::default().title(title).borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let line = if state.log_focus {
        Line::from(vec![
            key("  [Esc]"),
            Span::raw(" back  "),
            key("[j/k]"),
            Span::raw(" scroll  "),
        ])
    } else {
        Line::from(vec![
            key("  [q]"),
            Span::raw("uit  "),
            key("[Tab]"),
            Span::raw(" day  "),
            key("[j/k]"),
            Span::raw(" scroll  "),
            key("[r]"),
            Span::raw("efresh  "),
            key("[e]"),
            Span::raw("xport  "),
            key("[l]"),
            Span::raw("ogs  "),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Cut `s` to at most `width` characters, marking the cut with "…".
fn clip(s: &str, width: usize) -> Cow<'_, str> {
    if s.chars().count() <= width {
        return Cow::Borrowed(s);
    }
    match width {
        0 => Cow::Borrowed(""),
        _ => {
            let mut out: String = s.chars().take(width - 1).collect();
            out.push('…');
            Cow::Owned(out)
        }
    }
}
