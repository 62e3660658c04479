use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::event::WsConnectionStatus;
use crate::model::coin::{format_price, Coin};
use crate::theme::{Palette, ThemeMode};

pub struct CoinCard<'a> {
    coin: Option<&'a Coin>,
    loading: bool,
    palette: Palette,
}

impl<'a> CoinCard<'a> {
    pub fn new(coin: Option<&'a Coin>, loading: bool, palette: Palette) -> Self {
        Self {
            coin,
            loading,
            palette,
        }
    }
}

impl Widget for CoinCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.palette;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.subtle))
            .style(Style::default().bg(p.card));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.loading && self.coin.is_none() {
            Paragraph::new(Line::from(Span::styled(
                "Loading coins...",
                Style::default().fg(p.accent),
            )))
            .render(inner, buf);
            return;
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(9), Constraint::Min(10)])
            .split(inner);

        // logo badge: no image support in a terminal, always initials
        let (badge, tag) = match self.coin {
            Some(c) => (c.initials(3), c.symbol.to_uppercase()),
            None => ("?".to_string(), "--".to_string()),
        };
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!(" {} ", badge),
                Style::default()
                    .fg(p.text)
                    .bg(p.subtle)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(tag, Style::default().fg(p.muted))),
        ])
        .render(cols[0], buf);

        let (name, price, subtitle) = match self.coin {
            Some(c) => (
                c.name.clone(),
                format!("${}", format_price(c.current_price)),
                format!("{} • Live", c.symbol.to_uppercase()),
            ),
            None => ("Choose a coin".to_string(), "$-".to_string(), String::new()),
        };

        let width = cols[1].width as usize;
        let pad = width.saturating_sub(name.chars().count() + price.chars().count());
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    name,
                    Style::default().fg(p.text).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" ".repeat(pad)),
                Span::styled(
                    price,
                    Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(subtitle, Style::default().fg(p.muted))),
        ];
        Paragraph::new(lines).render(cols[1], buf);
    }
}

pub struct SuggestionPanel<'a> {
    text: Option<&'a str>,
    loading: bool,
    palette: Palette,
}

impl<'a> SuggestionPanel<'a> {
    pub fn new(text: Option<&'a str>, loading: bool, palette: Palette) -> Self {
        Self {
            text,
            loading,
            palette,
        }
    }
}

impl Widget for SuggestionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.palette;
        let lines: Vec<Line> = if self.loading {
            vec![Line::from(Span::styled(
                "Thinking...",
                Style::default().fg(p.accent),
            ))]
        } else {
            match self.text {
                Some(t) if !t.trim().is_empty() => t
                    .lines()
                    .map(|l| Line::from(Span::styled(l, Style::default().fg(p.text))))
                    .collect(),
                _ => vec![Line::from(Span::styled(
                    "Press [N] for a short educational suggestion.",
                    Style::default().fg(p.muted),
                ))],
            }
        };

        let block = Block::default()
            .title(" Need Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent));

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
    palette: Palette,
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String], palette: Palette) -> Self {
        Self { messages, palette }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.palette;
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|m| {
                let color = if m.contains("[ERR]") {
                    p.down
                } else if m.contains("[WARN]") {
                    ratatui::style::Color::Yellow
                } else {
                    p.muted
                };
                Line::from(Span::styled(m.as_str(), Style::default().fg(color)))
            })
            .collect();

        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.subtle));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub pair: &'a str,
    pub interval: &'a str,
    pub stream: &'a WsConnectionStatus,
    pub theme: ThemeMode,
    pub palette: Palette,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.palette;
        let conn_status = match self.stream {
            WsConnectionStatus::Connected => Span::styled("LIVE", Style::default().fg(p.accent)),
            WsConnectionStatus::Disconnected => {
                Span::styled("OFFLINE", Style::default().fg(p.down))
            }
            WsConnectionStatus::Reconnecting { attempt, .. } => Span::styled(
                format!("RETRY #{}", attempt),
                Style::default().fg(ratatui::style::Color::Yellow),
            ),
        };

        let line = Line::from(vec![
            Span::styled(
                " coin-spark ",
                Style::default().fg(p.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(p.muted)),
            Span::styled(self.pair, Style::default().fg(p.accent)),
            Span::styled(" | ", Style::default().fg(p.muted)),
            Span::styled(self.interval, Style::default().fg(p.text)),
            Span::styled(" | ", Style::default().fg(p.muted)),
            conn_status,
            Span::styled(" | ", Style::default().fg(p.muted)),
            Span::styled(self.theme.label(), Style::default().fg(p.muted)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct KeybindBar {
    pub palette: Palette,
}

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = Style::default().fg(self.palette.accent);
        let txt = Style::default().fg(self.palette.muted);
        let line = Line::from(vec![
            Span::styled(" [Q]", key),
            Span::styled("uit  ", txt),
            Span::styled("[C]", key),
            Span::styled("hange coin  ", txt),
            Span::styled("[N]", key),
            Span::styled("eed help  ", txt),
            Span::styled("[O]", key),
            Span::styled(" theme  ", txt),
            Span::styled("[1/5/H/D]", key),
            Span::styled(" interval", txt),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
