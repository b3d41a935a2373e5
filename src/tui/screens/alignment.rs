//! Alignment section: the resource table with filters and inline errors.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, Padding, Paragraph};

use crate::model::{Resource, SkillLevel, allocation_key};
use crate::presenter::ViewState;

/// What the alignment screen renders specially this frame.
pub enum AlignmentOverlay<'a> {
    None,

    /// The search box has focus.
    Search,

    /// The selected resource's allocation is being retyped.
    AllocationInput { id: &'a str, buffer: &'a str },
}

pub struct AlignmentScreen {
    selected: usize,
}

impl AlignmentScreen {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self, state: &ViewState) {
        if self.selected + 1 < state.resources.len() {
            self.selected += 1;
        }
    }

    /// Filter changes can shrink the list under the cursor.
    pub fn clamp_selection(&mut self, state: &ViewState) {
        if !state.resources.is_empty() && self.selected >= state.resources.len() {
            self.selected = state.resources.len() - 1;
        }
    }

    /// The id of the resource under the cursor, if any.
    pub fn selected_id(&self, state: &ViewState) -> Option<String> {
        state.resources.get(self.selected).map(|r| r.id.clone())
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        state: &ViewState,
        overlay: &AlignmentOverlay,
    ) {
        let chunks = Layout::vertical([
            Constraint::Length(2), // filter line
            Constraint::Min(0),    // table
        ])
        .split(area);

        render_filters(frame, chunks[0], state, overlay);
        self.render_rows(frame, chunks[1], state, overlay);
    }

    fn render_rows(
        &self,
        frame: &mut Frame,
        area: Rect,
        state: &ViewState,
        overlay: &AlignmentOverlay,
    ) {
        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let error = Style::default().fg(Color::Red);

        if state.resources.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "(no resources match the current filters)",
                muted,
            )))
            .block(Block::default().padding(Padding::new(2, 2, 1, 0)));
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = state
            .resources
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let style = if i == self.selected { highlight } else { normal };
                let pointer = if i == self.selected { "› " } else { "  " };

                let mut spans = vec![
                    Span::styled(pointer.to_string(), style),
                    Span::styled(
                        format!(
                            "{:<22} {:<16} {:<9}",
                            r.name,
                            r.role,
                            r.skill_level.label()
                        ),
                        style,
                    ),
                    allocation_span(r, i == self.selected, overlay, style),
                ];
                if r.is_terminated {
                    spans.push(Span::styled("  [terminated]", muted));
                }
                if let Some(message) = state.validation_errors.get(&allocation_key(&r.id)) {
                    spans.push(Span::styled(format!("  ⚠ {message}"), error));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items).block(Block::default().padding(Padding::new(2, 2, 0, 0)));
        frame.render_widget(list, area);
    }
}

fn render_filters(frame: &mut Frame, area: Rect, state: &ViewState, overlay: &AlignmentOverlay) {
    let muted = Style::default().fg(Color::DarkGray);
    let active = Style::default().fg(Color::White);

    let mut spans = vec![Span::styled("Search: ", muted)];
    spans.push(Span::styled(state.filter.search.clone(), active));
    if matches!(overlay, AlignmentOverlay::Search) {
        spans.push(Span::styled("█", muted));
    }
    spans.push(Span::styled(
        format!(
            "   Skill: {}   LOB: {}",
            state.filter.skill_level.map_or("All", SkillLevel::label),
            state.filter.lob.as_deref().unwrap_or("All"),
        ),
        muted,
    ));

    let line = Paragraph::new(Line::from(spans))
        .block(Block::default().padding(Padding::new(2, 2, 0, 0)));
    frame.render_widget(line, area);
}

/// The allocation cell: the live input buffer for the row being edited,
/// the stored value otherwise.
fn allocation_span(
    resource: &Resource,
    is_selected: bool,
    overlay: &AlignmentOverlay,
    style: Style,
) -> Span<'static> {
    if let AlignmentOverlay::AllocationInput { id, buffer } = overlay
        && is_selected
        && *id == resource.id
    {
        return Span::styled(
            format!("{buffer}█"),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        );
    }
    Span::styled(format!("{:>4}%", resource.percent_allocated), style)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::directory::{FixtureDirectory, ResourceDirectory};
    use crate::model::SummaryMetrics;
    use crate::store::ResourceFilter;

    fn view_state(resource_count: usize) -> ViewState {
        let seed = FixtureDirectory.load().unwrap();
        let resources: Vec<Resource> = seed.resources.into_iter().take(resource_count).collect();
        ViewState {
            section: 1,
            section_count: 3,
            progress_percent: 67,
            edit_mode: false,
            dirty: false,
            saving: false,
            filter: ResourceFilter::default(),
            active: resources.clone(),
            terminated: Vec::new(),
            unique_lobs: Vec::new(),
            gaps: seed.gaps,
            metrics: SummaryMetrics {
                total_resources_allocated: resource_count,
                headcount_conversion: 0.0,
                headcount_requirement: 10.0,
                aligned_outside_count: 2,
            },
            validation_errors: BTreeMap::new(),
            resources,
        }
    }

    #[test]
    fn selection_stays_in_bounds() {
        let state = view_state(3);
        let mut screen = AlignmentScreen::new();

        screen.move_up();
        assert_eq!(screen.selected_id(&state).unwrap(), "1");

        screen.move_down(&state);
        screen.move_down(&state);
        screen.move_down(&state);
        assert_eq!(screen.selected_id(&state).unwrap(), "3");
    }

    #[test]
    fn clamp_follows_a_shrinking_list() {
        let mut screen = AlignmentScreen::new();
        let full = view_state(5);
        for _ in 0..4 {
            screen.move_down(&full);
        }

        let narrowed = view_state(2);
        screen.clamp_selection(&narrowed);
        assert_eq!(screen.selected_id(&narrowed).unwrap(), "2");
    }

    #[test]
    fn empty_list_has_no_selection() {
        let state = view_state(0);
        let screen = AlignmentScreen::new();
        assert!(screen.selected_id(&state).is_none());
    }
}
