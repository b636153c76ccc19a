use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::card::CardView;
use crate::classify::{BadgeStyle, ChangeClass};
use crate::dashboard::{Card, Status};
use crate::format::format_clock;
use crate::series::PriceSeries;

const GOLD: Color = Color::Rgb(241, 196, 15);
const MUTED: Color = Color::Rgb(148, 163, 184);
const GREEN: Color = Color::Rgb(46, 204, 113);
const RED: Color = Color::Rgb(231, 76, 60);
const BORDER: Color = Color::Rgb(51, 51, 51);

const CHART_HEIGHT: u16 = 7;
/// Header lines + chart + trading line + borders.
const COLLAPSED_HEIGHT: u16 = 3 + CHART_HEIGHT + 1 + 2;

pub fn draw(frame: &mut Frame, app: &App, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Query input
            Constraint::Length(1), // Status
            Constraint::Min(0),    // Cards
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], app, now);
    draw_query(frame, chunks[1], app);
    draw_status(frame, chunks[2], app);
    draw_cards(frame, chunks[3], app, now);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App, now: DateTime<Utc>) {
    let line = Line::from(vec![
        Span::styled(
            format_clock(&now.with_timezone(&Local)),
            Style::default().fg(MUTED),
        ),
        Span::raw("  "),
        Span::styled("STOCK RESEARCH TERMINAL", Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("[{}]", app.backend_name()), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_query(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Query;
    let border = if focused { GREEN } else { BORDER };
    let title = if app.dashboard.is_loading() {
        " Natural language query (running) "
    } else {
        " Natural language query "
    };

    let text = if app.dashboard.query().is_empty() && !focused {
        Span::styled("Show me tech stocks...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.dashboard.query())
    };

    let input = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(Span::styled(title, Style::default().fg(GOLD))),
    );
    frame.render_widget(input, area);

    if focused {
        let typed = u16::try_from(app.dashboard.query().chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(typed);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let dashboard = &app.dashboard;
    let mut spans = match dashboard.status() {
        Status::Idle => vec![Span::styled(
            "Type a query and press Enter. Tab switches to results, Esc quits.",
            Style::default().fg(MUTED),
        )],
        Status::Loading => vec![Span::styled("Processing query...", Style::default().fg(GREEN))],
        Status::Failed(msg) => vec![Span::styled(msg.to_string(), Style::default().fg(RED))],
        Status::NoResults => vec![Span::styled("No matching results", Style::default().fg(MUTED))],
        Status::Showing(n) => vec![Span::styled(
            format!(
                "{} result{}  ↑/↓ select  Enter expand  r refresh",
                n,
                if n == 1 { "" } else { "s" }
            ),
            Style::default().fg(MUTED),
        )],
    };
    if let Some(key) = dashboard.refreshing() {
        spans.push(Span::styled(
            format!("  Refreshing {}...", key.symbol),
            Style::default().fg(GOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_cards(frame: &mut Frame, area: Rect, app: &App, now: DateTime<Utc>) {
    let cards = app.dashboard.cards();
    if cards.is_empty() || area.height == 0 {
        return;
    }

    let selected = app.dashboard.selected().min(cards.len() - 1);
    let inner_width = area.width.saturating_sub(2);
    let views: Vec<(&Card, CardView)> = cards
        .iter()
        .map(|card| (card, CardView::build(&card.record, now)))
        .collect();
    let heights: Vec<u16> = views
        .iter()
        .map(|(card, view)| card_height(view, card.expanded, inner_width))
        .collect();

    let first = first_visible(&heights, selected, area.height);

    let mut y = area.y;
    for (index, ((card, view), height)) in views.iter().zip(&heights).enumerate().skip(first) {
        let remaining = area.bottom().saturating_sub(y);
        if remaining == 0 || (index != first && *height > remaining) {
            break;
        }
        let rect = Rect::new(area.x, y, area.width, (*height).min(remaining));
        draw_card(frame, rect, view, card.expanded, index == selected && app.focus == Focus::Results);
        y += rect.height;
    }
}

/// First card to draw so that the selected card is fully on screen.
fn first_visible(heights: &[u16], selected: usize, available: u16) -> usize {
    let mut used = 0u16;
    let mut first = selected;
    for index in (0..=selected).rev() {
        used = used.saturating_add(heights[index]);
        if used > available {
            break;
        }
        first = index;
    }
    first
}

fn card_height(view: &CardView, expanded: bool, width: u16) -> u16 {
    if !expanded {
        return COLLAPSED_HEIGHT;
    }
    COLLAPSED_HEIGHT + analysis_height(view, width)
}

/// Rows the analysis block takes once wrapped at `width`.
fn analysis_height(view: &CardView, width: u16) -> u16 {
    let lines = analysis_paragraph(view, width).line_count(width);
    u16::try_from(lines).unwrap_or(u16::MAX)
}

fn change_color(class: ChangeClass) -> Color {
    match class {
        ChangeClass::Positive => GREEN,
        ChangeClass::Negative => RED,
        ChangeClass::Neutral => MUTED,
    }
}

fn badge_color(style: BadgeStyle) -> Color {
    match style {
        BadgeStyle::Positive => GREEN,
        BadgeStyle::Negative => RED,
        BadgeStyle::Neutral => MUTED,
    }
}

fn draw_card(frame: &mut Frame, area: Rect, view: &CardView, expanded: bool, selected: bool) {
    let marker = if expanded { "▾" } else { "▸" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if selected { GOLD } else { BORDER }))
        .title(Line::from(vec![
            Span::raw(format!(" {} ", marker)),
            Span::styled(view.symbol.clone(), Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
        ]));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(CHART_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let change_style = Style::default().fg(change_color(view.change_class));
    let summary = vec![
        Line::from(vec![
            Span::styled(view.symbol.clone(), Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(view.name.clone(), Style::default().fg(MUTED)),
        ]),
        Line::from(Span::styled(
            view.subtitle.clone().unwrap_or_default(),
            Style::default().fg(MUTED),
        )),
        Line::from(vec![
            Span::styled(view.price.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(view.change.clone(), change_style),
            Span::styled("   Market Cap ", Style::default().fg(MUTED)),
            Span::raw(view.market_cap.clone()),
        ]),
    ];
    frame.render_widget(Paragraph::new(summary), rows[0]);

    match &view.series {
        Some(series) => draw_chart(frame, rows[1], view, series),
        None => frame.render_widget(
            Paragraph::new("No historical data available")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            Rect {
                y: rows[1].y + rows[1].height / 2,
                height: 1.min(rows[1].height),
                ..rows[1]
            },
        ),
    }

    let trading = Line::from(vec![
        Span::styled("Volume ", Style::default().fg(MUTED)),
        Span::raw(view.volume.clone()),
        Span::styled("   Day Range ", Style::default().fg(MUTED)),
        Span::raw(view.day_range.clone()),
    ]);
    frame.render_widget(Paragraph::new(trading), rows[2]);

    if expanded {
        draw_analysis(frame, rows[3], view);
    }
}

fn draw_chart(frame: &mut Frame, area: Rect, view: &CardView, series: &PriceSeries) {
    let data = series.xy();
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(view.palette.line))
        .data(&data);

    let [x_min, x_max] = series.x_bounds();
    let [y_min, y_max] = series.y_bounds();
    let label_style = Style::default().fg(Color::DarkGray);

    let chart = Chart::new(vec![dataset])
        .style(Style::default().bg(view.palette.fill))
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .style(label_style)
                .labels(vec![
                    series.first().at.format("%b %Y").to_string(),
                    series.last().at.format("%b %Y").to_string(),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .style(label_style)
                .labels(vec![format!("${:.0}", y_min), format!("${:.0}", y_max)]),
        );
    frame.render_widget(chart, area);
}

fn draw_analysis(frame: &mut Frame, area: Rect, view: &CardView) {
    frame.render_widget(analysis_paragraph(view, area.width), area);
}

/// Separator, badges and sections. Shared by layout and rendering so the
/// card is always sized for what gets drawn.
fn analysis_paragraph(view: &CardView, width: u16) -> Paragraph<'static> {
    let mut lines = vec![Line::from(Span::styled(
        "─".repeat(usize::from(width)),
        Style::default().fg(BORDER),
    ))];

    if !view.has_analysis() {
        lines.push(Line::from(Span::styled(
            "No analysis available",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if !view.badges.is_empty() {
        let mut spans = Vec::new();
        for badge in &view.badges {
            spans.push(Span::styled(
                format!("[{}]", badge.text()),
                Style::default().fg(badge_color(badge.style())),
            ));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    for section in &view.sections {
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            section.body.clone(),
            Style::default().fg(MUTED),
        )));
    }

    Paragraph::new(lines).wrap(Wrap { trim: true })
}
