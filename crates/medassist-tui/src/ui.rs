use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use medassist_core::appointment::DOCTOR_CATEGORIES;
use medassist_core::medicine::MEDICINE_DISCLAIMER;
use medassist_core::{AvatarStatus, FormField, Medicine, MessageKind, SearchView};
use crate::app::{App, AppointmentStatus, InputMode, Screen};

const CHAT_NOTICE: &str = "Important: This AI assistant provides general health information only. \
Always consult with qualified healthcare professionals for medical advice, diagnosis, or treatment.";

/// Word-wraps `text` to `width` columns. Words longer than a whole line
/// (URLs, drug codes) are split across lines.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(width) {
            if line_len > 0 && line_len + 1 + piece.len() > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(piece);
            line_len += piece.len();
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Largest scroll offset that still fills a view of `height` rows.
fn max_scroll(total_lines: usize, height: u16) -> u16 {
    u16::try_from(total_lines)
        .unwrap_or(u16::MAX)
        .saturating_sub(height)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Medicine => render_medicine_screen(app, frame, body_area),
        Screen::Appointment => render_appointment_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(" AI Medical Assistant ", Style::default().fg(Color::Cyan).bold())];

    for (i, screen) in Screen::all().iter().enumerate() {
        let label = format!(" {} {} ", i + 1, screen.title());
        let style = if *screen == app.screen {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(label, style));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    let hints = match (app.screen, app.input_mode) {
        (Screen::Chat, InputMode::Editing) => " Enter send | Esc normal mode | Ctrl-C quit",
        (Screen::Chat, InputMode::Normal) => " i type | j/k scroll | v voice | n new chat | Tab/1-3 screens | q quit",
        (Screen::Medicine, InputMode::Editing) => " Enter search | Esc normal mode",
        (Screen::Medicine, InputMode::Normal) => {
            " / search | j/k + Enter details | c clear | r toggle online search | Tab/1-3 screens | q quit"
        }
        (Screen::Appointment, InputMode::Editing) => " Tab/Up/Down field | Enter submit | Esc done",
        (Screen::Appointment, InputMode::Normal) => {
            " j/k + Enter category | i edit form | R reset | Tab/1-3 screens | q quit"
        }
    };

    let footer = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}

fn avatar_icon(status: AvatarStatus) -> &'static str {
    match status {
        AvatarStatus::Idle => "💬",
        AvatarStatus::Listening => "👂",
        AvatarStatus::Speaking => "🗣️",
    }
}

fn avatar_color(status: AvatarStatus) -> Color {
    match status {
        AvatarStatus::Idle => Color::Green,
        AvatarStatus::Listening => Color::Yellow,
        AvatarStatus::Speaking => Color::Cyan,
    }
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [avatar_area, chat_column] = Layout::horizontal([
        Constraint::Length(28),
        Constraint::Min(0),
    ])
    .areas(area);

    render_avatar(app, frame, avatar_area);

    let [chat_area, input_area, notice_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(2),
    ])
    .areas(chat_column);

    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    let inner_width = chat_area.width.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.session.store().messages() {
        let (label, color) = match msg.kind {
            MessageKind::User => ("You", Color::Cyan),
            MessageKind::Assistant => ("Assistant", Color::Yellow),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}:", label), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", msg.display_time()), Style::default().fg(Color::DarkGray)),
        ]));

        for paragraph in msg.content.split('\n') {
            let style = if paragraph.starts_with(medassist_core::state::DISCLAIMER_MARKER) {
                Style::default().fg(Color::LightRed).add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };
            if paragraph.trim().is_empty() {
                lines.push(Line::default());
                continue;
            }
            for wrapped in wrap_text_to_width(paragraph, inner_width) {
                lines.push(Line::from(Span::styled(wrapped, style)));
            }
        }
        lines.push(Line::default());
    }

    if app.session.is_loading() {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Keep the newest message in view unless the user scrolled away
    let bottom = max_scroll(lines.len(), app.chat_height);
    if app.follow_chat || app.chat_scroll >= bottom {
        app.chat_scroll = bottom;
        app.follow_chat = true;
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", Screen::Chat.title()));

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_chat_input(app, frame, input_area);

    let notice = Paragraph::new(CHAT_NOTICE)
        .style(Style::default().fg(Color::Blue))
        .wrap(Wrap { trim: true });
    frame.render_widget(notice, notice_area);
}

fn render_avatar(app: &App, frame: &mut Frame, area: Rect) {
    let status = app.session.avatar();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(avatar_color(status)));

    let text = Text::from(vec![
        Line::default(),
        Line::from("👨‍⚕️").alignment(Alignment::Center),
        Line::default(),
        Line::from(vec![
            Span::styled("● ", Style::default().fg(avatar_color(status))),
            Span::raw(format!("{} {}", avatar_icon(status), status.label())),
        ])
        .alignment(Alignment::Center),
        if app.session.is_voice_active() {
            Line::from(Span::styled("⏹️ Recording (v to stop)", Style::default().fg(Color::LightRed)))
                .alignment(Alignment::Center)
        } else {
            Line::default()
        },
        Line::from(Span::styled("AI Medical Assistant", Style::default().fg(Color::Cyan).bold()))
            .alignment(Alignment::Center),
        Line::from(Span::styled(
            "Always here to help with your health questions",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
    ]);

    let avatar = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(avatar, area);
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if app.session.is_loading() { " Sending... " } else { " Type your health question here " };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_medicine_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [search_area, notice_area, results_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let editing = app.input_mode == InputMode::Editing;
    let source = if app.remote_medicine { "online" } else { "offline" };
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(format!(" 🔍 Search for medicine name ({}) ", source));
    let search = Paragraph::new(app.medicine_input.as_str()).block(search_block);
    frame.render_widget(search, search_area);

    if editing {
        let cursor_x = app.medicine_input.chars().count() as u16;
        frame.set_cursor_position((search_area.x + cursor_x + 1, search_area.y + 1));
    }

    let notice = if app.medicine_loading {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        Span::styled(format!("Searching{}", dots), Style::default().fg(Color::DarkGray))
    } else if let Some(notice) = &app.medicine_notice {
        Span::styled(notice.clone(), Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(Line::from(notice)), notice_area);

    match app.medicine.view() {
        SearchView::Popular(medicines) => {
            let items: Vec<ListItem> = medicines
                .iter()
                .map(|m| {
                    ListItem::new(vec![
                        Line::from(Span::styled(m.name.clone(), Style::default().fg(Color::Cyan).bold())),
                        Line::from(Span::styled(m.usage_preview(100), Style::default().fg(Color::DarkGray))),
                        Line::default(),
                    ])
                })
                .collect();
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Popular Medicines (Enter to view details) "),
                )
                .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, results_area, &mut app.medicine_state);
        }
        SearchView::Results(medicines) => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" Search Results ({}) ", medicines.len()));
            let text = medicine_cards(medicines);
            frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), results_area);
        }
        SearchView::NoResults { query } => {
            let text = Text::from(vec![
                Line::default(),
                Line::from(Span::styled("No Results Found", Style::default().bold())),
                Line::from(Span::styled(
                    format!(
                        "We couldn't find any medicine matching \"{}\". Please try a different search term or consult with a pharmacist.",
                        query
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ]);
            let block = Block::default().borders(Borders::ALL);
            frame.render_widget(
                Paragraph::new(text).block(block).alignment(Alignment::Center).wrap(Wrap { trim: true }),
                results_area,
            );
        }
    }
}

fn medicine_cards(medicines: &[Medicine]) -> Text<'static> {
    let mut lines = Vec::new();
    for medicine in medicines {
        lines.push(Line::from(Span::styled(
            medicine.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled("Usage Information", Style::default().bold())));
        lines.push(Line::from(medicine.usage.clone()));
        lines.push(Line::from(Span::styled("Important Precautions", Style::default().bold())));
        for precaution in &medicine.precautions {
            lines.push(Line::from(format!("  • {}", precaution)));
        }
        lines.push(Line::from(Span::styled(
            format!("Disclaimer: {}", MEDICINE_DISCLAIMER),
            Style::default().fg(Color::LightRed),
        )));
        lines.push(Line::default());
    }
    Text::from(lines)
}

fn render_appointment_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [status_area, body_area] = Layout::vertical([
        Constraint::Length(if app.appointment_status.is_some() || app.appointment_loading { 4 } else { 0 }),
        Constraint::Min(0),
    ])
    .areas(area);

    render_appointment_status(app, frame, status_area);

    let [categories_area, form_area] = Layout::horizontal([
        Constraint::Percentage(45),
        Constraint::Percentage(55),
    ])
    .areas(body_area);

    let selected = app.form.category;
    let items: Vec<ListItem> = DOCTOR_CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let marker = if selected == Some(i) { "✔ " } else { "  " };
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!("{}{}", marker, category.name),
                    Style::default().fg(Color::Cyan).bold(),
                )),
                Line::from(Span::styled(
                    format!("  {}", category.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let categories_focused = app.input_mode == InputMode::Normal;
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if categories_focused { Color::Cyan } else { Color::DarkGray }))
                .title(" Select Doctor Category "),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, categories_area, &mut app.category_state);

    let editing = app.input_mode == InputMode::Editing;
    let mut lines = vec![match app.form.selected_category() {
        Some(category) => Line::from(vec![
            Span::styled("Selected: ", Style::default().bold()),
            Span::raw(category.name),
        ]),
        None => Line::from(Span::styled(
            "Please select a doctor category to proceed with booking.",
            Style::default().fg(Color::Blue),
        )),
    }];
    lines.push(Line::default());

    for (i, field) in FormField::all().iter().enumerate() {
        let active = editing && i == app.form_field;
        let label_style = if active {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().bold()
        };
        lines.push(Line::from(Span::styled(field.label(), label_style)));
        let value = app.form.field(*field);
        let cursor = if active { "▏" } else { "" };
        lines.push(Line::from(format!("  {}{}", value, cursor)));
    }

    let form = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
                .title(" Appointment Details "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(form, form_area);
}

fn render_appointment_status(app: &App, frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }

    let (text, color) = if app.appointment_loading {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        (format!("Submitting request{}", dots), Color::DarkGray)
    } else {
        match &app.appointment_status {
            Some(AppointmentStatus::Submitted(response)) => {
                let category = app.form.selected_category().map(|c| c.name).unwrap_or("your doctor");
                let mut text = format!(
                    "Appointment Request Submitted! {} ({})",
                    response.message, category
                );
                if let Some(note) = &response.note {
                    text.push(' ');
                    text.push_str(note);
                }
                text.push_str(" Press n to book another appointment.");
                (text, Color::Green)
            }
            Some(AppointmentStatus::Invalid(message)) => (message.clone(), Color::Yellow),
            Some(AppointmentStatus::Failed(message)) => {
                (format!("Could not submit appointment request: {}", message), Color::Red)
            }
            None => return,
        }
    };

    let status = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_text_to_width("Try rest and hydration today", 10);
        assert_eq!(lines, vec!["Try rest", "and", "hydration", "today"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text_to_width("see https://example.org/abc", 10);
        assert_eq!(lines, vec!["see", "https://ex", "ample.org/", "abc"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_max_scroll_saturates_on_long_sessions() {
        assert_eq!(max_scroll(5, 20), 0);
        assert_eq!(max_scroll(120, 20), 100);
        assert_eq!(max_scroll(70_000, 20), u16::MAX - 20);
    }

    #[test]
    fn test_wrap_empty_text() {
        assert_eq!(wrap_text_to_width("", 10), vec![String::new()]);
    }
}
