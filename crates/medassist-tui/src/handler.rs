use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use medassist_core::SearchView;
use crate::app::{App, AppointmentStatus, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::ChatReply { turn, result } => app.on_chat_reply(turn, result),
        AppEvent::SpeechFinished(turn) => app.on_speech_finished(turn),
        AppEvent::VoiceFinished(turn) => app.on_voice_finished(turn),
        AppEvent::MedicineResults { query, result } => app.on_medicine_results(query, result),
        AppEvent::AppointmentSubmitted(result) => app.on_appointment_submitted(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Screen switching
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.switch_screen(app.screen.next());
            return;
        }
        KeyCode::Char('1') => {
            app.switch_screen(Screen::Chat);
            return;
        }
        KeyCode::Char('2') => {
            app.switch_screen(Screen::Medicine);
            return;
        }
        KeyCode::Char('3') => {
            app.switch_screen(Screen::Appointment);
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Chat => handle_chat_normal(app, key),
        Screen::Medicine => handle_medicine_normal(app, key),
        Screen::Appointment => handle_appointment_normal(app, key),
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down(app.chat_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up(app.chat_height / 2);
        }
        KeyCode::Char('G') => app.follow_chat = true,
        KeyCode::Char('g') => app.scroll_chat_up(u16::MAX),
        // New conversation
        KeyCode::Char('n') => app.reset_chat(),
        KeyCode::Char('v') => app.toggle_voice(),
        _ => {}
    }
}

fn handle_medicine_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        KeyCode::Char('c') | KeyCode::Esc => app.clear_medicine_search(),
        KeyCode::Char('r') => app.remote_medicine = !app.remote_medicine,
        KeyCode::Char('j') | KeyCode::Down => app.medicine_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.medicine_nav_up(),
        KeyCode::Enter => {
            if matches!(app.medicine.view(), SearchView::Popular(_)) {
                app.show_selected_medicine();
            }
        }
        _ => {}
    }
}

fn handle_appointment_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.category_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.category_nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') => app.select_category(),
        KeyCode::Char('i') | KeyCode::Char('e') => {
            app.input_mode = InputMode::Editing;
        }
        // Book another appointment
        KeyCode::Char('n') => {
            if matches!(app.appointment_status, Some(AppointmentStatus::Submitted(_))) {
                app.reset_appointment();
            }
        }
        KeyCode::Char('R') => app.reset_appointment(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Chat => handle_chat_editing(app, key),
        Screen::Medicine => handle_medicine_editing(app, key),
        Screen::Appointment => handle_form_editing(app, key),
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_chat();
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_medicine_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_medicine_search();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.medicine_input.pop();
        }
        KeyCode::Char(c) => {
            app.medicine_input.push(c);
        }
        _ => {}
    }
}

fn handle_form_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab | KeyCode::Down => app.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.prev_field(),
        KeyCode::Enter => app.submit_appointment(),
        KeyCode::Backspace => {
            let field = app.current_field();
            app.form.field_mut(field).pop();
        }
        KeyCode::Char(c) => {
            let field = app.current_field();
            app.form.field_mut(field).push(c);
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::Chat {
        return;
    }

    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(3),
        MouseEventKind::ScrollUp => app.scroll_chat_up(3),
        _ => {}
    }
}
