//! Gaps section: staffing shortfalls and the add-gap form.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, Padding, Paragraph};

use crate::model::{GapDraft, GapPriority, SkillLevel};
use crate::presenter::ViewState;

pub struct GapsScreen {
    selected: usize,
}

impl GapsScreen {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self, state: &ViewState) {
        if self.selected + 1 < state.gaps.len() {
            self.selected += 1;
        }
    }

    pub fn clamp_selection(&mut self, state: &ViewState) {
        if !state.gaps.is_empty() && self.selected >= state.gaps.len() {
            self.selected = state.gaps.len() - 1;
        }
    }

    pub fn selected_id(&self, state: &ViewState) -> Option<String> {
        state.gaps.get(self.selected).map(|g| g.id.clone())
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        state: &ViewState,
        flow: Option<&GapFlow>,
    ) {
        if let Some(flow) = flow {
            flow.render(frame, area);
            return;
        }

        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        if state.gaps.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled("No staffing gaps", muted)))
                .block(Block::default().padding(Padding::new(2, 2, 1, 0)));
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = state
            .gaps
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let style = if i == self.selected { highlight } else { normal };
                let pointer = if i == self.selected { "› " } else { "  " };

                ListItem::new(Line::from(vec![
                    Span::styled(pointer.to_string(), style),
                    Span::styled(
                        format!(
                            "{:<18} {:<9} filled {}/{}",
                            g.role,
                            g.skill_level.label(),
                            g.current_count,
                            g.required_count,
                        ),
                        style,
                    ),
                    Span::styled(
                        format!("  short {}", g.shortfall()),
                        if g.shortfall() > 0 {
                            Style::default().fg(Color::Yellow)
                        } else {
                            muted
                        },
                    ),
                    Span::styled(
                        format!("  [{}] [{}]", g.priority.label(), g.status.label()),
                        muted,
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(Block::default().padding(Padding::new(2, 2, 1, 0)));
        frame.render_widget(list, area);
    }
}

/// Where in the add-gap form we are.
enum Step {
    Role,
    Skill,
    Required,
    Current,
    Priority,
}

const PRIORITIES: [GapPriority; 3] = [GapPriority::High, GapPriority::Medium, GapPriority::Low];

/// The add-gap form, driven step by step. Text steps type into a buffer;
/// choice steps cycle with up/down. Enter advances and finally yields the
/// draft.
pub struct GapFlow {
    step: Step,
    role: String,
    skill_index: usize,
    required: String,
    current: String,
    priority_index: usize,
}

impl GapFlow {
    pub fn new() -> Self {
        Self {
            step: Step::Role,
            role: String::new(),
            skill_index: 0,
            required: String::new(),
            current: String::new(),
            priority_index: 0,
        }
    }

    /// Handle a character being typed. Count steps accept digits only.
    pub fn on_char(&mut self, c: char) {
        match self.step {
            Step::Role => self.role.push(c),
            Step::Required => {
                if c.is_ascii_digit() {
                    self.required.push(c);
                }
            }
            Step::Current => {
                if c.is_ascii_digit() {
                    self.current.push(c);
                }
            }
            Step::Skill | Step::Priority => {}
        }
    }

    pub fn on_backspace(&mut self) {
        match self.step {
            Step::Role => {
                self.role.pop();
            }
            Step::Required => {
                self.required.pop();
            }
            Step::Current => {
                self.current.pop();
            }
            Step::Skill | Step::Priority => {}
        }
    }

    pub fn on_up(&mut self) {
        match self.step {
            Step::Skill => {
                if self.skill_index > 0 {
                    self.skill_index -= 1;
                }
            }
            Step::Priority => {
                if self.priority_index > 0 {
                    self.priority_index -= 1;
                }
            }
            _ => {}
        }
    }

    pub fn on_down(&mut self) {
        match self.step {
            Step::Skill => {
                if self.skill_index + 1 < SkillLevel::ALL.len() {
                    self.skill_index += 1;
                }
            }
            Step::Priority => {
                if self.priority_index + 1 < PRIORITIES.len() {
                    self.priority_index += 1;
                }
            }
            _ => {}
        }
    }

    /// Handle Enter. Returns Some(draft) when the form is complete.
    pub fn on_enter(&mut self) -> Option<GapDraft> {
        match self.step {
            Step::Role => {
                if self.role.trim().is_empty() {
                    return None; // Need a role before moving on.
                }
                self.step = Step::Skill;
                None
            }
            Step::Skill => {
                self.step = Step::Required;
                None
            }
            Step::Required => {
                if self.required.is_empty() {
                    return None; // Need a required count.
                }
                self.step = Step::Current;
                None
            }
            Step::Current => {
                self.step = Step::Priority;
                None
            }
            Step::Priority => Some(GapDraft {
                role: self.role.trim().to_string(),
                skill_level: SkillLevel::ALL[self.skill_index],
                required_count: self.required.parse().unwrap_or(0),
                // An empty current count means none filled yet.
                current_count: self.current.parse().unwrap_or(0),
                priority: PRIORITIES[self.priority_index],
            }),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(Span::styled("Add staffing gap", highlight)),
            Line::default(),
            self.text_line("Role", &self.role, matches!(self.step, Step::Role), muted, normal),
            self.choice_line(
                "Skill",
                SkillLevel::ALL[self.skill_index].label(),
                matches!(self.step, Step::Skill),
                muted,
                normal,
            ),
            self.text_line(
                "Required",
                &self.required,
                matches!(self.step, Step::Required),
                muted,
                normal,
            ),
            self.text_line(
                "Current",
                &self.current,
                matches!(self.step, Step::Current),
                muted,
                normal,
            ),
            self.choice_line(
                "Priority",
                PRIORITIES[self.priority_index].label(),
                matches!(self.step, Step::Priority),
                muted,
                normal,
            ),
        ];

        let hint = match self.step {
            Step::Role => "type the role, ⏎ continue",
            Step::Skill => "↑↓ choose, ⏎ continue",
            Step::Required => "digits, ⏎ continue",
            Step::Current => "digits (empty = 0), ⏎ continue",
            Step::Priority => "↑↓ choose, ⏎ add gap",
        };
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(format!("{hint}  esc cancel"), muted)));

        let content =
            Paragraph::new(lines).block(Block::default().padding(Padding::new(2, 2, 1, 0)));
        frame.render_widget(content, area);
    }

    #[allow(clippy::unused_self)]
    fn text_line(
        &self,
        label: &str,
        value: &str,
        active: bool,
        muted: Style,
        normal: Style,
    ) -> Line<'static> {
        let pointer = if active { "› " } else { "  " };
        let mut spans = vec![
            Span::styled(pointer.to_string(), normal),
            Span::styled(format!("{label:<10}"), muted),
            Span::styled(
                value.to_string(),
                if active {
                    Style::default().fg(Color::White)
                } else {
                    normal
                },
            ),
        ];
        if active {
            spans.push(Span::styled("█", muted));
        }
        Line::from(spans)
    }

    #[allow(clippy::unused_self)]
    fn choice_line(
        &self,
        label: &str,
        value: &str,
        active: bool,
        muted: Style,
        normal: Style,
    ) -> Line<'static> {
        let pointer = if active { "› " } else { "  " };
        Line::from(vec![
            Span::styled(pointer.to_string(), normal),
            Span::styled(format!("{label:<10}"), muted),
            Span::styled(
                value.to_string(),
                if active {
                    Style::default().fg(Color::White)
                } else {
                    normal
                },
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(flow: &mut GapFlow, s: &str) {
        for c in s.chars() {
            flow.on_char(c);
        }
    }

    #[test]
    fn full_flow_produces_draft() {
        let mut flow = GapFlow::new();

        type_str(&mut flow, "Platform Engineer");
        assert!(flow.on_enter().is_none()); // role → skill

        flow.on_down(); // Basic → Advanced
        flow.on_down(); // Advanced → Expert
        assert!(flow.on_enter().is_none()); // skill → required

        type_str(&mut flow, "2");
        assert!(flow.on_enter().is_none()); // required → current

        assert!(flow.on_enter().is_none()); // empty current → priority

        let draft = flow.on_enter().unwrap();
        assert_eq!(draft.role, "Platform Engineer");
        assert_eq!(draft.skill_level, SkillLevel::Expert);
        assert_eq!(draft.required_count, 2);
        assert_eq!(draft.current_count, 0);
        assert_eq!(draft.priority, GapPriority::High);
    }

    #[test]
    fn empty_role_is_rejected() {
        let mut flow = GapFlow::new();
        assert!(flow.on_enter().is_none());

        // Still on the role step: typing works and then advances.
        type_str(&mut flow, "Tester");
        assert!(flow.on_enter().is_none());
    }

    #[test]
    fn count_steps_ignore_non_digits() {
        let mut flow = GapFlow::new();
        type_str(&mut flow, "Tester");
        flow.on_enter(); // role → skill
        flow.on_enter(); // skill → required

        type_str(&mut flow, "a2b");
        flow.on_enter(); // required → current
        flow.on_enter(); // current → priority

        let draft = flow.on_enter().unwrap();
        assert_eq!(draft.required_count, 2);
    }

    #[test]
    fn required_count_must_be_entered() {
        let mut flow = GapFlow::new();
        type_str(&mut flow, "Tester");
        flow.on_enter(); // role → skill
        flow.on_enter(); // skill → required

        // No digits typed: stays on the required step.
        assert!(flow.on_enter().is_none());
        type_str(&mut flow, "1");
        assert!(flow.on_enter().is_none()); // now advances
    }

    #[test]
    fn choice_selection_is_bounded() {
        let mut flow = GapFlow::new();
        type_str(&mut flow, "Tester");
        flow.on_enter(); // role → skill

        flow.on_up(); // already at the top
        flow.on_down();
        flow.on_down();
        flow.on_down(); // past the end, clamped
        flow.on_enter();

        type_str(&mut flow, "1");
        flow.on_enter();
        flow.on_enter();

        let draft = flow.on_enter().unwrap();
        assert_eq!(draft.skill_level, SkillLevel::Expert);
    }
}
