//! Application loop and section routing.

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph};

use crate::config::Config;
use crate::directory::DirectorySeed;
use crate::model::SkillLevel;
use crate::notify::{Notice, NoticeLevel, NoticeQueue};
use crate::operator::resolve_operator;
use crate::persist::{FileBackend, FlakyBackend, PersistenceBackend};
use crate::presenter::{EditToggle, Presenter, SECTION_TITLES, SaveStart, ViewState};
use crate::store::AlignmentStore;

use super::screens::{AlignmentOverlay, AlignmentScreen, GapFlow, GapsScreen, OverviewScreen};

/// What keystrokes currently mean.
enum Mode {
    Browse,

    /// Typing into the search box.
    Search { input: String },

    /// Retyping the selected resource's allocation.
    EditAllocation { id: String, input: String },

    /// Waiting on a y/n answer.
    Confirm(ConfirmAction),

    /// Stepping through the add-gap form.
    AddGap(GapFlow),
}

enum ConfirmAction {
    /// Leave edit mode, dropping session flags (and optionally the app).
    DiscardEdits { then_quit: bool },

    /// Roll every mutation back to the directory seed.
    RevertToSeed,
}

enum Next {
    Continue(Mode),
    Quit,
}

/// Runs the console until the user quits.
pub fn run(config: &Config, seed: DirectorySeed, operator_flag: Option<&str>) -> Result<(), String> {
    let operator = resolve_operator(operator_flag, config)?;

    let root = FileBackend::default_root().ok_or("could not determine home directory")?;
    let file =
        FileBackend::new(root).map_err(|e| format!("failed to initialize snapshot store: {e}"))?;
    let backend: Arc<dyn PersistenceBackend> = if config.simulate_save {
        Arc::new(FlakyBackend::new(
            file,
            Duration::from_millis(config.simulated_latency_ms),
            config.simulated_failure_chance,
        ))
    } else {
        Arc::new(file)
    };

    let store = AlignmentStore::new(
        seed,
        config.headcount_requirement,
        config.aligned_outside_count,
    );
    let mut presenter = Presenter::new(
        store,
        backend,
        operator,
        Duration::from_millis(config.save_timeout_ms),
    );

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut presenter);
    ratatui::restore();
    // The renderer is gone; drop its subscription with it.
    presenter.unsubscribe();
    result.map_err(|e| e.to_string())
}

fn event_loop(terminal: &mut DefaultTerminal, presenter: &mut Presenter) -> io::Result<()> {
    // The one render subscriber: any presenter-side change schedules a
    // redraw for the next loop turn.
    let redraw = Rc::new(Cell::new(true));
    let signal = Rc::clone(&redraw);
    presenter.subscribe(Box::new(move || signal.set(true)));

    let mut notices = NoticeQueue::default();
    let mut toast: Option<Notice> = None;
    let mut mode = Mode::Browse;
    let mut alignment = AlignmentScreen::new();
    let mut gaps = GapsScreen::new();
    let overview = OverviewScreen;

    loop {
        // Settle a finished background save before drawing.
        presenter.poll_save(&mut notices);
        if !notices.is_empty() {
            toast = notices.take_latest();
            redraw.set(true);
        }

        if redraw.get() {
            let state = presenter.current_state();
            alignment.clamp_selection(&state);
            gaps.clamp_selection(&state);
            terminal.draw(|frame| {
                draw(
                    frame,
                    &state,
                    &mode,
                    toast.as_ref(),
                    &alignment,
                    &gaps,
                    &overview,
                );
            })?;
            redraw.set(false);
        }

        // Short poll so save completion is noticed without a keypress.
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                redraw.set(true);
                match handle_key(
                    mode,
                    key.code,
                    presenter,
                    &mut alignment,
                    &mut gaps,
                    &mut notices,
                    &mut toast,
                ) {
                    Next::Continue(next) => mode = next,
                    Next::Quit => return Ok(()),
                }
            }
            Event::Resize(..) => redraw.set(true),
            _ => {}
        }
    }
}

#[allow(clippy::too_many_lines)]
fn handle_key(
    mode: Mode,
    code: KeyCode,
    presenter: &mut Presenter,
    alignment: &mut AlignmentScreen,
    gaps: &mut GapsScreen,
    notices: &mut NoticeQueue,
    toast: &mut Option<Notice>,
) -> Next {
    match mode {
        Mode::Browse => handle_browse(code, presenter, alignment, gaps, notices, toast),

        Mode::Search { mut input } => match code {
            KeyCode::Esc | KeyCode::Enter => Next::Continue(Mode::Browse),
            KeyCode::Backspace => {
                input.pop();
                presenter.search_changed(&input);
                Next::Continue(Mode::Search { input })
            }
            KeyCode::Char(c) => {
                input.push(c);
                presenter.search_changed(&input);
                Next::Continue(Mode::Search { input })
            }
            _ => Next::Continue(Mode::Search { input }),
        },

        Mode::EditAllocation { id, mut input } => match code {
            KeyCode::Esc => Next::Continue(Mode::Browse),
            KeyCode::Enter => {
                // The literal input is applied even when out of range;
                // validation reports it inline.
                if let Ok(value) = input.parse::<i32>() {
                    presenter.allocation_changed(&id, value);
                }
                Next::Continue(Mode::Browse)
            }
            KeyCode::Backspace => {
                input.pop();
                Next::Continue(Mode::EditAllocation { id, input })
            }
            KeyCode::Char(c) if c.is_ascii_digit() && input.len() < 4 => {
                input.push(c);
                Next::Continue(Mode::EditAllocation { id, input })
            }
            KeyCode::Char('-') if input.is_empty() => {
                input.push('-');
                Next::Continue(Mode::EditAllocation { id, input })
            }
            _ => Next::Continue(Mode::EditAllocation { id, input }),
        },

        Mode::Confirm(action) => match code {
            KeyCode::Char('y') => {
                match action {
                    ConfirmAction::DiscardEdits { then_quit } => {
                        presenter.confirm_discard(true);
                        if then_quit {
                            return Next::Quit;
                        }
                    }
                    ConfirmAction::RevertToSeed => {
                        presenter.reset();
                        *toast = Some(Notice::info("Reverted to the directory seed"));
                    }
                }
                Next::Continue(Mode::Browse)
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                presenter.confirm_discard(false);
                Next::Continue(Mode::Browse)
            }
            _ => Next::Continue(Mode::Confirm(action)),
        },

        Mode::AddGap(mut flow) => match code {
            KeyCode::Esc => Next::Continue(Mode::Browse),
            KeyCode::Enter => {
                if let Some(draft) = flow.on_enter() {
                    if presenter.gap_added(&draft).is_valid() {
                        *toast = Some(Notice::success("Staffing gap added"));
                    }
                    Next::Continue(Mode::Browse)
                } else {
                    Next::Continue(Mode::AddGap(flow))
                }
            }
            KeyCode::Backspace => {
                flow.on_backspace();
                Next::Continue(Mode::AddGap(flow))
            }
            KeyCode::Up => {
                flow.on_up();
                Next::Continue(Mode::AddGap(flow))
            }
            KeyCode::Down => {
                flow.on_down();
                Next::Continue(Mode::AddGap(flow))
            }
            KeyCode::Char(c) => {
                flow.on_char(c);
                Next::Continue(Mode::AddGap(flow))
            }
            _ => Next::Continue(Mode::AddGap(flow)),
        },
    }
}

#[allow(clippy::too_many_lines)]
fn handle_browse(
    code: KeyCode,
    presenter: &mut Presenter,
    alignment: &mut AlignmentScreen,
    gaps: &mut GapsScreen,
    notices: &mut NoticeQueue,
    toast: &mut Option<Notice>,
) -> Next {
    let state = presenter.current_state();

    match code {
        KeyCode::Char('q') => {
            if presenter.is_saving() {
                presenter.cancel_save(notices);
            }
            if state.edit_mode && state.dirty {
                return Next::Continue(Mode::Confirm(ConfirmAction::DiscardEdits {
                    then_quit: true,
                }));
            }
            return Next::Quit;
        }
        KeyCode::Tab => presenter.next_section(),
        KeyCode::BackTab => presenter.previous_section(),
        KeyCode::Char('1') => presenter.go_to_section(0),
        KeyCode::Char('2') => presenter.go_to_section(1),
        KeyCode::Char('3') => presenter.go_to_section(2),
        KeyCode::Up | KeyCode::Char('k') => match state.section {
            1 => alignment.move_up(),
            2 => gaps.move_up(),
            _ => {}
        },
        KeyCode::Down | KeyCode::Char('j') => match state.section {
            1 => alignment.move_down(&state),
            2 => gaps.move_down(&state),
            _ => {}
        },
        KeyCode::Char('e') => match presenter.edit_toggle() {
            EditToggle::ConfirmationRequired => {
                return Next::Continue(Mode::Confirm(ConfirmAction::DiscardEdits {
                    then_quit: false,
                }));
            }
            EditToggle::Ignored => {
                *toast = Some(Notice::info("Save in progress; wait for it to finish"));
            }
            EditToggle::Entered | EditToggle::Exited => {}
        },
        KeyCode::Char('s') => match presenter.save() {
            SaveStart::Started => *toast = Some(Notice::info("Saving…")),
            SaveStart::AlreadySaving => {
                *toast = Some(Notice::info("A save is already in progress"));
            }
            // Inline errors carry the detail; no duplicate toast.
            SaveStart::ValidationFailed => {}
        },
        KeyCode::Esc if presenter.is_saving() => presenter.cancel_save(notices),
        KeyCode::Char('/') if state.section == 1 => {
            return Next::Continue(Mode::Search {
                input: state.filter.search.clone(),
            });
        }
        KeyCode::Char('f') if state.section == 1 => {
            presenter.skill_filter_changed(next_skill(state.filter.skill_level));
        }
        KeyCode::Char('l') if state.section == 1 => {
            presenter.lob_filter_changed(next_lob(&state));
        }
        KeyCode::Char('c') if state.section == 1 => {
            presenter.search_changed("");
            presenter.skill_filter_changed(None);
            presenter.lob_filter_changed(None);
        }
        KeyCode::Enter if state.section == 1 && state.edit_mode => {
            if let Some(id) = alignment.selected_id(&state) {
                let input = state
                    .resources
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| r.percent_allocated.to_string())
                    .unwrap_or_default();
                return Next::Continue(Mode::EditAllocation { id, input });
            }
        }
        KeyCode::Char('t') if state.section == 1 && state.edit_mode => {
            if let Some(id) = alignment.selected_id(&state) {
                presenter.termination_toggled(&id);
            }
        }
        KeyCode::Char('a') if state.section == 2 && state.edit_mode => {
            return Next::Continue(Mode::AddGap(GapFlow::new()));
        }
        KeyCode::Char('u') if state.section == 2 && state.edit_mode => {
            if let Some(id) = gaps.selected_id(&state) {
                presenter.gap_status_cycled(&id);
            }
        }
        KeyCode::Char('R') if state.edit_mode => {
            return Next::Continue(Mode::Confirm(ConfirmAction::RevertToSeed));
        }
        _ => {}
    }
    Next::Continue(Mode::Browse)
}

/// Cycle the skill filter: All → Basic → Advanced → Expert → All.
fn next_skill(current: Option<SkillLevel>) -> Option<SkillLevel> {
    match current {
        None => Some(SkillLevel::Basic),
        Some(SkillLevel::Basic) => Some(SkillLevel::Advanced),
        Some(SkillLevel::Advanced) => Some(SkillLevel::Expert),
        Some(SkillLevel::Expert) => None,
    }
}

/// Cycle the LOB filter through the known prefixes and back to All.
fn next_lob(state: &ViewState) -> Option<String> {
    let lobs = &state.unique_lobs;
    match &state.filter.lob {
        None => lobs.first().cloned(),
        Some(current) => {
            let index = lobs.iter().position(|l| l == current)?;
            lobs.get(index + 1).cloned()
        }
    }
}

fn draw(
    frame: &mut Frame,
    state: &ViewState,
    mode: &Mode,
    toast: Option<&Notice>,
    alignment: &AlignmentScreen,
    gaps: &GapsScreen,
    overview: &OverviewScreen,
) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(3), // header
        Constraint::Length(1), // separator
        Constraint::Min(0),    // section content
        Constraint::Length(1), // toast / confirm prompt
        Constraint::Length(1), // help
    ])
    .split(area);

    render_header(frame, chunks[0], state);
    render_separator(frame, chunks[1], area.width);

    match state.section {
        0 => overview.render(frame, chunks[2], state),
        1 => {
            let overlay = match mode {
                Mode::Search { .. } => AlignmentOverlay::Search,
                Mode::EditAllocation { id, input } => AlignmentOverlay::AllocationInput {
                    id,
                    buffer: input,
                },
                _ => AlignmentOverlay::None,
            };
            alignment.render(frame, chunks[2], state, &overlay);
        }
        _ => {
            let flow = match mode {
                Mode::AddGap(flow) => Some(flow),
                _ => None,
            };
            gaps.render(frame, chunks[2], state, flow);
        }
    }

    render_status_line(frame, chunks[3], mode, toast);
    render_help(frame, chunks[4], state, mode);
}

fn render_header(frame: &mut Frame, area: Rect, state: &ViewState) {
    let muted = Style::default().fg(Color::DarkGray);
    let strong = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![Span::styled("Roster", strong), Span::styled("   ", muted)];
    for (i, title) in SECTION_TITLES.iter().enumerate() {
        let style = if i == state.section { strong } else { muted };
        spans.push(Span::styled(format!("{} {title}  ", i + 1), style));
    }

    if state.saving {
        spans.push(Span::styled("· saving…", Style::default().fg(Color::Yellow)));
    } else if state.edit_mode {
        spans.push(Span::styled("· editing", Style::default().fg(Color::Cyan)));
        if state.dirty {
            spans.push(Span::styled(
                "  · unsaved",
                Style::default().fg(Color::Yellow),
            ));
        }
    }
    spans.push(Span::styled(
        format!("  · {}%", state.progress_percent),
        muted,
    ));

    let header =
        Paragraph::new(Line::from(spans)).block(Block::default().padding(Padding::new(2, 0, 1, 0)));
    frame.render_widget(header, area);
}

fn render_separator(frame: &mut Frame, area: Rect, width: u16) {
    let muted = Style::default().fg(Color::DarkGray);
    let sep = Paragraph::new(Line::from(Span::styled(
        "─".repeat(width.saturating_sub(4) as usize),
        muted,
    )))
    .block(Block::default().padding(Padding::new(2, 2, 0, 0)));
    frame.render_widget(sep, area);
}

fn render_status_line(frame: &mut Frame, area: Rect, mode: &Mode, toast: Option<&Notice>) {
    if let Mode::Confirm(action) = mode {
        let prompt = match action {
            ConfirmAction::DiscardEdits { .. } => "Discard unsaved changes? (y/n)",
            ConfirmAction::RevertToSeed => "Revert all edits to the directory seed? (y/n)",
        };
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {prompt}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(line, area);
        return;
    }

    if let Some(notice) = toast {
        let color = match notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Info => Color::Gray,
            NoticeLevel::Error => Color::Red,
        };
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {}", notice.message),
            Style::default().fg(color),
        )));
        frame.render_widget(line, area);
    }
}

fn render_help(frame: &mut Frame, area: Rect, state: &ViewState, mode: &Mode) {
    let muted = Style::default().fg(Color::DarkGray);

    let help = match mode {
        Mode::Search { .. } => " type to search  ⏎/esc done",
        Mode::EditAllocation { .. } => " digits  ⏎ apply  esc cancel",
        Mode::Confirm(_) => " y confirm  n cancel",
        Mode::AddGap(_) => " see form hints above",
        Mode::Browse => match (state.section, state.edit_mode) {
            (1, false) => " ⇥/1-3 sections  ↑↓ navigate  / search  f skill  l lob  c clear  e edit  q quit",
            (1, true) => " ↑↓ navigate  ⏎ allocation  t terminate  s save  R revert  e done  q quit",
            (2, true) => " ↑↓ navigate  a add gap  u cycle status  s save  e done  q quit",
            _ => " ⇥/1-3 sections  ↑↓ navigate  e edit  q quit",
        },
    };

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(help, muted))),
        area,
    );
}
