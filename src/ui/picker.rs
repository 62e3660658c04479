use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::model::coin::{format_price, Coin};
use crate::theme::Palette;

pub struct CoinPicker<'a> {
    coins: &'a [Coin],
    selected: usize,
    query: &'a str,
    palette: Palette,
}

impl<'a> CoinPicker<'a> {
    pub fn new(coins: &'a [Coin], selected: usize, query: &'a str, palette: Palette) -> Self {
        Self {
            coins,
            selected,
            query,
            palette,
        }
    }
}

impl Widget for CoinPicker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.palette;
        Clear.render(area, buf);

        let block = Block::default()
            .title(" Select coin ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .style(Style::default().bg(p.card));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(inner);

        let search = if self.query.is_empty() {
            Span::styled("Search coin name or symbol", Style::default().fg(p.muted))
        } else {
            Span::styled(self.query, Style::default().fg(p.text))
        };
        let cursor = Span::styled("▏", Style::default().fg(p.accent));
        let hint = Line::from(Span::styled(" [Del] Clear ", Style::default().fg(p.muted)));
        Paragraph::new(Line::from(vec![search, cursor]))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title_bottom(hint.right_aligned())
                    .border_style(Style::default().fg(p.subtle))
                    .style(Style::default().bg(p.input_bg)),
            )
            .render(rows[0], buf);

        let list_area = rows[1];
        if self.coins.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No coins found",
                Style::default().fg(p.muted),
            )))
            .alignment(ratatui::layout::Alignment::Center)
            .render(list_area, buf);
            return;
        }

        let visible = list_area.height.max(1) as usize;
        let offset = self.selected.saturating_sub(visible.saturating_sub(1));
        let width = list_area.width as usize;
        let lines: Vec<Line> = self
            .coins
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, coin)| {
                let is_selected = i == self.selected;
                let marker = if is_selected { "▶ " } else { "  " };
                let left = format!("{}{} {}", marker, coin.initials(2), coin.name);
                let price = format!("${}", format_price(coin.current_price));
                let sym = format!(" {}", coin.symbol.to_uppercase());
                let used = left.chars().count() + sym.chars().count() + price.chars().count();
                let pad = width.saturating_sub(used);
                let name_style = if is_selected {
                    Style::default().fg(p.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(p.text)
                };
                Line::from(vec![
                    Span::styled(left, name_style),
                    Span::styled(sym, Style::default().fg(p.muted)),
                    Span::raw(" ".repeat(pad)),
                    Span::styled(price, Style::default().fg(p.muted)),
                ])
            })
            .collect();

        Paragraph::new(lines).render(list_area, buf);
    }
}
