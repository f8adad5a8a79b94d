use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::ui::catppuccin::{self, colors};
use crate::users::models::Field;

use super::app::{App, FormSlot, Pane};

const FORM_WIDTH: u16 = 56;

pub fn draw(f: &mut Frame, app: &App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .areas(f.area());

    let title = Paragraph::new(Line::from(vec![Span::styled(
        "User Management Application",
        catppuccin::title(),
    )]))
    .alignment(Alignment::Center);
    f.render_widget(title, header);

    let [form_area, table_area] =
        Layout::horizontal([Constraint::Length(FORM_WIDTH), Constraint::Min(30)]).areas(body);

    draw_form(f, app, form_area);
    draw_table(f, app, table_area);
    f.render_widget(Paragraph::new(key_hints(app)), footer);
}

fn draw_form(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.pane == Pane::Form;
    let draft = app.manager.draft();
    let errors = app.manager.errors();

    let mut lines = Vec::new();
    for field in Field::ALL {
        let active = focused && app.slot == FormSlot::Input(field);
        let locked = app.manager.is_locked(field);

        let marker = if active { "▌" } else { " " };
        let label_style = if active {
            catppuccin::fg(colors::MAUVE).add_modifier(Modifier::BOLD)
        } else {
            catppuccin::fg(colors::SUBTEXT0)
        };
        let value = draft.get(field);
        let value_span = if locked {
            Span::styled(format!("{value} (locked)"), catppuccin::muted())
        } else if value.is_empty() && !active {
            Span::styled(field.label(), catppuccin::muted())
        } else {
            let cursor = if active { "_" } else { "" };
            Span::styled(format!("{value}{cursor}"), catppuccin::fg(colors::TEXT))
        };

        lines.push(Line::from(vec![
            Span::styled(marker, catppuccin::fg(colors::MAUVE)),
            Span::styled(format!("{:<7}", field.label()), label_style),
            value_span,
        ]));

        if let Some(message) = errors.get(field) {
            lines.push(Line::from(Span::styled(
                format!("        {message}"),
                catppuccin::error(),
            )));
        }
    }

    lines.push(Line::from(""));
    let button_label = if draft.is_editing() {
        " Update User "
    } else {
        " Add User "
    };
    let button_active = focused && app.slot == FormSlot::Submit;
    lines.push(
        Line::from(Span::styled(button_label, catppuccin::button(button_active)))
            .alignment(Alignment::Center),
    );

    let title = if draft.is_editing() {
        " Edit user "
    } else {
        " New user "
    };
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(catppuccin::border(focused))
            .title(title),
    );
    f.render_widget(form, area);
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.pane == Pane::Table;

    let header = Row::new(["Name", "Email", "Phone"].map(|h| {
        Cell::from(h).style(catppuccin::fg(colors::BLUE).add_modifier(Modifier::BOLD))
    }))
    .bottom_margin(1);

    let rows: Vec<Row> = if app.manager.is_loading() {
        vec![Row::new([Cell::from(""), Cell::from("Loading...").style(catppuccin::muted())])]
    } else {
        app.visible()
            .into_iter()
            .map(|user| {
                let editing = app.manager.draft().editing == Some(user.id);
                let style = if editing {
                    catppuccin::fg(colors::PEACH)
                } else {
                    catppuccin::fg(colors::TEXT)
                };
                Row::new([
                    Cell::from(user.name.clone()),
                    Cell::from(user.email.clone()),
                    Cell::from(user.phone.clone()),
                ])
                .style(style)
            })
            .collect()
    };

    let title = if app.filter.is_empty() && !app.filtering {
        " Users ".to_string()
    } else {
        let cursor = if app.filtering { "_" } else { "" };
        format!(" Users  /{}{} ", app.filter, cursor)
    };

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ],
    )
    .header(header)
    .row_highlight_style(if focused {
        catppuccin::selected_row()
    } else {
        Style::default()
    })
    .highlight_symbol("▌ ")
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(catppuccin::border(focused))
            .title(title),
    );

    let mut state = app.table_state.clone();
    f.render_stateful_widget(table, area, &mut state);
}

fn key_hints(app: &App) -> Line<'static> {
    let hints: &[(&str, &str)] = match app.pane {
        Pane::Form => &[
            ("Tab", "next"),
            ("Enter", "submit"),
            ("Esc", "cancel edit"),
            ("F2", "table"),
            ("Ctrl-C", "quit"),
        ],
        Pane::Table if app.filtering => &[("Enter", "apply filter"), ("Esc", "clear filter")],
        Pane::Table => &[
            ("↑/↓", "select"),
            ("e", "edit"),
            ("d", "delete"),
            ("/", "filter"),
            ("r", "reload"),
            ("F2", "form"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  •  ", catppuccin::muted()));
        }
        spans.push(Span::styled(key.to_string(), catppuccin::key_hint()));
        spans.push(Span::styled(format!(" {action}"), catppuccin::muted()));
    }
    Line::from(spans)
}
