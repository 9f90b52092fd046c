use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::{App, Focus, Mode, ThemePalette};

const PROMPT: &str = "> ";

pub(super) fn draw(f: &mut Frame, app: &App) {
    let theme = app.theme_palette();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    match app.mode {
        Mode::AwaitingConnectionChoice => {
            draw_panes(f, app, chunks[0], theme);
            draw_popup(f, app, theme);
        }
        Mode::PickingConfig => draw_picker(f, app, chunks[0], theme),
        Mode::Interacting => draw_panes(f, app, chunks[0], theme),
    }
    draw_status(f, app, chunks[1], theme);
}

fn panel_block(theme: ThemePalette, title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(focused))
        .title(Span::styled(format!(" {} ", title), theme.title_style()))
        .padding(Padding::horizontal(1))
        .style(theme.panel_surface_style())
}

fn draw_panes(f: &mut Frame, app: &App, area: Rect, theme: ThemePalette) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
    let interacting = app.mode == Mode::Interacting;
    draw_list(f, app, panes[0], theme, interacting && app.focus == Focus::List);
    draw_repl(f, app, panes[1], theme, interacting && app.focus == Focus::Repl);
}

fn draw_list(f: &mut Frame, app: &App, area: Rect, theme: ThemePalette, focused: bool) {
    let list = &app.list;
    let block = panel_block(theme, "items", focused);
    let inner_h = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line<'static>> = if let Some(err) = &list.error {
        vec![Line::from(Span::styled(err.clone(), theme.error_style()))]
    } else if list.items.is_empty() {
        let text = if app.connected { "(no items)" } else { "(not connected)" };
        vec![Line::from(Span::styled(text, theme.muted_style()))]
    } else {
        let offset = list.selected.saturating_sub(inner_h.saturating_sub(1));
        list.items
            .iter()
            .enumerate()
            .skip(offset)
            .take(inner_h.max(1))
            .map(|(idx, item)| {
                let style = if idx == list.selected {
                    theme.selected_style()
                } else {
                    theme.body_style()
                };
                Line::from(vec![
                    Span::styled(item.title.clone(), style),
                    Span::styled(format!("  {}", item.author), theme.muted_style()),
                ])
            })
            .collect()
    };

    let panel = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn draw_repl(f: &mut Frame, app: &App, area: Rect, theme: ThemePalette, focused: bool) {
    let repl = &app.repl;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for record in repl.records() {
        lines.push(Line::from(vec![
            Span::styled(PROMPT, theme.prompt_style()),
            Span::styled(record.input.clone(), theme.input_style()),
        ]));
        let style = if record.success {
            theme.body_style()
        } else {
            theme.error_style()
        };
        for out in record.output.lines() {
            lines.push(Line::from(Span::styled(out.to_string(), style)));
        }
    }
    if let Some(err) = &repl.error {
        lines.push(Line::from(Span::styled(format!("error: {err}"), theme.error_style())));
    }
    let inner_h = rows[0].height.saturating_sub(2) as usize;
    let scroll = lines
        .len()
        .saturating_sub(inner_h)
        .saturating_sub(repl.scroll_back)
        .min(u16::MAX as usize) as u16;

    let history = Paragraph::new(Text::from(lines))
        .block(
            panel_block(theme, "repl", focused).border_style(theme.outcome_style(repl.last_ok)),
        )
        .scroll((scroll, 0));
    f.render_widget(history, rows[0]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled(PROMPT, theme.prompt_style()),
        Span::styled(repl.input.clone(), theme.input_style()),
    ]))
    .block(panel_block(theme, "statement", focused));
    f.render_widget(input, rows[1]);

    if focused {
        let typed = UnicodeWidthStr::width(&repl.input[..repl.cursor]) as u16;
        let x = rows[1].x + 2 + UnicodeWidthStr::width(PROMPT) as u16 + typed;
        let max_x = rows[1].right().saturating_sub(2);
        f.set_cursor_position((x.min(max_x), rows[1].y + 1));
    }
}

fn draw_picker(f: &mut Frame, app: &App, area: Rect, theme: ThemePalette) {
    let picker = &app.picker;
    let title = format!("select configuration: {}", picker.dir.display());
    let inner_h = area.height.saturating_sub(3) as usize;

    let mut lines: Vec<Line<'static>> = Vec::new();
    if let Some(err) = &picker.error {
        lines.push(Line::from(Span::styled(err.clone(), theme.error_style())));
    } else if picker.entries.is_empty() {
        lines.push(Line::from(Span::styled("(empty)", theme.muted_style())));
    }
    let offset = picker.selected.saturating_sub(inner_h.saturating_sub(1));
    for (idx, entry) in picker
        .entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(inner_h.max(1))
    {
        let (label, base) = if entry.is_dir {
            (format!("{}/", entry.name), theme.directory_style())
        } else {
            (entry.name.clone(), theme.body_style())
        };
        let style = if idx == picker.selected {
            theme.selected_style()
        } else {
            base
        };
        lines.push(Line::from(Span::styled(label, style)));
    }
    lines.push(Line::from(Span::styled(
        "enter open/select   backspace up   ctrl+c quit",
        theme.muted_style(),
    )));

    let panel = Paragraph::new(Text::from(lines)).block(panel_block(theme, &title, true));
    f.render_widget(panel, area);
}

fn draw_popup(f: &mut Frame, app: &App, theme: ThemePalette) {
    let width_pct = if app.popup.size.0 < 60 { 90 } else { 50 };
    let area = centered_rect(width_pct, 30, f.area());
    let choice = |label: &'static str, active: bool| {
        if active {
            Span::styled(format!("[ {label} ]"), theme.selected_style())
        } else {
            Span::styled(format!("  {label}  "), theme.muted_style())
        }
    };
    let lines = vec![
        Line::from(Span::styled(app.popup.question.clone(), theme.body_style())),
        Line::from(""),
        Line::from(vec![
            choice("Yes", app.popup.highlighted),
            Span::raw("   "),
            choice("No", !app.popup.highlighted),
        ]),
        Line::from(""),
        Line::from(Span::styled("y / n / enter   h l to switch", theme.muted_style())),
    ];
    let panel = Paragraph::new(lines)
        .block(panel_block(theme, "server", true))
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(panel, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect, theme: ThemePalette) {
    let session = app.repl.session();
    let config = session
        .config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    let server = if app.connected {
        "connected"
    } else {
        "disconnected"
    };
    let mut text = format!(
        " {} | engine {} | config {} | {}",
        app.mode.as_str(),
        session.engine_path().display(),
        config,
        server
    );
    if app.focus == Focus::List {
        if let Some(item) = app.list.selected_item() {
            text.push_str(" | ");
            text.push_str(&item.title);
        }
    } else if !app.repl.status.is_empty() {
        text.push_str(" | ");
        text.push_str(&app.repl.status);
    }
    f.render_widget(Paragraph::new(Span::styled(text, theme.muted_style())), area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
