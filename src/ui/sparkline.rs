use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Paragraph, Widget,
    },
};

use crate::curve::{CurveGeometry, Dimensions};
use crate::model::coin::format_price;
use crate::theme::Palette;

/// Samples per cubic segment when rasterising the curve.
const CURVE_STEPS: usize = 6;

pub struct SparklineChart<'a> {
    geometry: Option<&'a CurveGeometry>,
    dims: Dimensions,
    palette: Palette,
    pair: &'a str,
    latest: Option<f64>,
    loading: bool,
    error: Option<String>,
}

impl<'a> SparklineChart<'a> {
    pub fn new(geometry: Option<&'a CurveGeometry>, dims: Dimensions, palette: Palette) -> Self {
        Self {
            geometry,
            dims,
            palette,
            pair: "",
            latest: None,
            loading: false,
            error: None,
        }
    }

    pub fn pair(mut self, pair: &'a str) -> Self {
        self.pair = pair;
        self
    }

    pub fn latest(mut self, latest: Option<f64>) -> Self {
        self.latest = latest;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Shown in place of the curve when there is nothing to draw.
    pub fn error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

impl Widget for SparklineChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let p = self.palette;
        let trend_up = self.geometry.map(|g| g.trend_up).unwrap_or(true);
        let stroke = p.trend(trend_up);
        let label = self
            .latest
            .map(format_price)
            .unwrap_or_else(|| "--".to_string());

        let block = Block::default()
            .title(format!(" {} ", self.pair))
            .title_top(
                Line::from(Span::styled(
                    format!(" {} ", label),
                    Style::default().fg(stroke),
                ))
                .right_aligned(),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.subtle))
            .style(Style::default().bg(p.card));

        let geometry = match self.geometry.filter(|g| !g.is_empty()) {
            Some(g) if !self.loading => g,
            _ => {
                let (msg, color) = match (self.loading, self.error) {
                    (true, _) => ("loading...".to_string(), p.accent),
                    (false, Some(e)) => (e, p.down),
                    (false, None) => ("no data".to_string(), p.muted),
                };
                let inner = block.inner(area);
                block.render(area, buf);
                let mid = Rect {
                    y: inner.y + inner.height / 2,
                    height: 1.min(inner.height),
                    ..inner
                };
                Paragraph::new(Span::styled(msg, Style::default().fg(color)))
                    .alignment(Alignment::Center)
                    .render(mid, buf);
                return;
            }
        };

        // Geometry y grows downward, canvas y grows upward.
        let h = self.dims.height;
        let base = h - self.dims.baseline();
        let line = geometry.flatten(CURVE_STEPS);

        Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .background_color(p.card)
            .x_bounds([0.0, self.dims.width])
            .y_bounds([0.0, h])
            .paint(|ctx| {
                for pt in &line {
                    ctx.draw(&CanvasLine::new(pt.x, h - pt.y, pt.x, base, p.subtle));
                }
                ctx.layer();
                if line.len() == 1 {
                    let pt = line[0];
                    ctx.draw(&CanvasLine::new(pt.x, h - pt.y, pt.x, h - pt.y, stroke));
                }
                for seg in line.windows(2) {
                    ctx.draw(&CanvasLine::new(
                        seg[0].x,
                        h - seg[0].y,
                        seg[1].x,
                        h - seg[1].y,
                        stroke,
                    ));
                }
            })
            .render(area, buf);
    }
}
