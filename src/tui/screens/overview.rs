//! Overview section: summary metrics and LOB distribution.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph};

use crate::presenter::ViewState;

pub struct OverviewScreen;

impl OverviewScreen {
    #[allow(clippy::unused_self)] // Kept as a method for symmetry with the other screens.
    pub fn render(&self, frame: &mut Frame, area: Rect, state: &ViewState) {
        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let strong = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let metrics = &state.metrics;
        let coverage = if metrics.headcount_requirement > 0.0 {
            (metrics.headcount_conversion / metrics.headcount_requirement * 100.0).round()
        } else {
            0.0
        };

        let mut lines = vec![
            metric_line(
                "Resources allocated",
                metrics.total_resources_allocated.to_string(),
                muted,
                strong,
            ),
            metric_line(
                "Headcount conversion",
                format!("{:.2} FTE", metrics.headcount_conversion),
                muted,
                strong,
            ),
            metric_line(
                "Headcount requirement",
                format!("{:.2} FTE", metrics.headcount_requirement),
                muted,
                strong,
            ),
            metric_line(
                "Aligned outside tracking",
                metrics.aligned_outside_count.to_string(),
                muted,
                strong,
            ),
            Line::from(vec![
                Span::styled(format!("{:<26}", "Coverage"), muted),
                Span::styled(coverage_bar(coverage), normal),
                Span::styled(format!("  {coverage:.0}%"), strong),
            ]),
            Line::default(),
            Line::from(Span::styled("Active by line of business:", muted)),
        ];

        for prefix in &state.unique_lobs {
            let count = state
                .active
                .iter()
                .filter(|r| r.lob.split_whitespace().next() == Some(prefix.as_str()))
                .count();
            lines.push(Line::from(vec![
                Span::styled(format!("  {prefix:<12}"), normal),
                Span::styled("■ ".repeat(count), strong),
                Span::styled(format!("{count}"), muted),
            ]));
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!(
                "{} terminated resource(s) retained on the roster",
                state.terminated.len()
            ),
            muted,
        )));

        let content =
            Paragraph::new(lines).block(Block::default().padding(Padding::new(2, 2, 1, 0)));
        frame.render_widget(content, area);
    }
}

fn metric_line(label: &str, value: String, muted: Style, strong: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<26}"), muted),
        Span::styled(value, strong),
    ])
}

/// A fixed-width bar, filled proportionally, capped at 100%.
fn coverage_bar(percent: f64) -> String {
    const WIDTH: usize = 24;
    let filled = ((percent / 100.0 * WIDTH as f64).round() as usize).min(WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(WIDTH - filled))
}
