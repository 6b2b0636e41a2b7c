//! Dashboard rendering: ticker banner, stat cards, RVOL heatmap and alerts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use cryptopedia_core::models::market::{stat_cards, AlertKind};
use cryptopedia_core::models::{RvolEntry, RvolTier};

use crate::app::App;

use super::styles;

/// Width of the RVOL intensity bar in cells
const BAR_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Ticker banner
            Constraint::Length(5), // Stat cards
            Constraint::Min(8),    // Heatmap + alerts
        ])
        .split(area);

    render_ticker_banner(frame, app, chunks[0]);
    render_stat_cards(frame, app, chunks[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[2]);

    render_heatmap(frame, &app.heatmap, columns[0]);
    render_alerts(frame, app, columns[1]);
}

fn render_ticker_banner(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, quote) in app.tickers.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  │  ", styles::muted_style()));
        }
        spans.push(Span::styled(
            quote.symbol.clone(),
            styles::list_item_style().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {} ", quote.price_display())));
        spans.push(Span::styled(
            quote.change_display(),
            styles::change_style(quote.is_up()),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_stat_cards(frame: &mut Frame, app: &App, area: Rect) {
    let cards = stat_cards(app.snapshot.as_ref(), &app.heatmap);
    let constraints = vec![Constraint::Ratio(1, cards.len().max(1) as u32); cards.len()];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        let lines = vec![
            Line::from(Span::styled(
                format!(" {}", card.value),
                styles::list_item_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(" {}", card.change),
                styles::change_style(card.is_positive()),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false))
            .title(Span::styled(format!(" {} ", card.title), styles::muted_style()));
        frame.render_widget(Paragraph::new(lines).block(block), *column);
    }
}

fn intensity_bar(entry: &RvolEntry) -> (String, String) {
    let filled = (entry.bar_fraction() * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    ("█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn render_heatmap(frame: &mut Frame, heatmap: &[RvolEntry], area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        format!(
            " {:<7}{:<w$}  {:>6}  {:>7}  {:>6}",
            "Symbol",
            "Intensity",
            "RVOL",
            "24h",
            "Volume",
            w = BAR_WIDTH
        ),
        styles::muted_style(),
    ))];

    for entry in heatmap {
        let tier_style = styles::tier_style(entry.tier());
        let (filled, empty) = intensity_bar(entry);
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<7}", entry.symbol), styles::list_item_style()),
            Span::styled(filled, tier_style),
            Span::styled(empty, styles::muted_style()),
            Span::styled(format!("  {:>6}", entry.rvol_display()), tier_style),
            Span::styled(
                format!("  {:>7}", entry.change_display()),
                styles::change_style(entry.change_pct >= 0.0),
            ),
            Span::styled(format!("  {:>6}", entry.volume), styles::muted_style()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(" RVOL Heatmap ", styles::title_style()));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_alerts(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    for alert in &app.alerts {
        let symbol_style = match alert.kind {
            AlertKind::Surge => styles::tier_style(RvolTier::Surge),
            AlertKind::Info => styles::highlight_style(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {}", alert.symbol), symbol_style),
            Span::styled(format!("  {}", alert.age), styles::muted_style()),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   {}", alert.message),
            styles::list_item_style(),
        )));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
        .title(Span::styled(" Alerts ", styles::title_style()));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
