use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, FormFocus, RegionColumn, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new("ecoleta – recycling collection points")
        .block(Block::default().borders(Borders::ALL).title("Ecoleta"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::RegionSelect => draw_region_select(frame, app, *content_area),
        Screen::PointBrowse => draw_point_browse(frame, app, *content_area),
        Screen::RegisterForm => draw_register_form(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::RegionSelect => {
            "↑/↓ move · Tab switch column · Enter select · g reload · q/Ctrl-C quit"
        }
        Screen::PointBrowse => {
            "↑/↓ points · ←/→ categories · Space toggle filter · n new point · Esc back · q quit"
        }
        Screen::RegisterForm => "Tab next field · Space toggle category · Enter submit · Esc cancel",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.status_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.status_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_region_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [province_area, city_area] = chunks else {
        return;
    };

    let province_focus = app.region_column == RegionColumn::Provinces;
    let city_focus = app.region_column == RegionColumn::Cities;

    let province_items = app
        .provinces
        .iter()
        .map(|region| {
            let marker = if Some(region.id) == app.selection.province() {
                "● "
            } else {
                "  "
            };
            ListItem::new(format!("{marker}{region_name}", region_name = region.name))
        })
        .collect::<Vec<ListItem<'_>>>();

    let province_list = List::new(province_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(column_style(province_focus))
                .title("Province"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut province_state = ListState::default();
    if !app.provinces.is_empty() {
        province_state.select(Some(app.province_index));
    }
    frame.render_stateful_widget(province_list, *province_area, &mut province_state);

    let city_items = if app.cities.is_empty() {
        let placeholder = if app.selection.province().is_some() {
            "No cities loaded yet. Re-select the province to retry."
        } else {
            "Pick a province first."
        };
        vec![ListItem::new(placeholder)]
    } else {
        app.cities
            .iter()
            .map(|region| {
                let marker = if Some(region.id) == app.selection.city() {
                    "● "
                } else {
                    "  "
                };
                ListItem::new(format!("{marker}{region_name}", region_name = region.name))
            })
            .collect()
    };

    let city_list = List::new(city_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(column_style(city_focus))
                .title("City"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut city_state = ListState::default();
    if !app.cities.is_empty() {
        city_state.select(Some(app.city_index));
    }
    frame.render_stateful_widget(city_list, *city_area, &mut city_state);
}

fn draw_point_browse(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [chip_area, table_area] = chunks else {
        return;
    };

    // Category filter chips; empty selection means "any category".
    let mut spans = Vec::new();
    for (index, category) in app.categories.iter().enumerate() {
        let selected = app.selection.categories().contains(&category.id);
        let mut style = if selected {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if index == app.category_index {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!("[{}] ", category.title), style));
    }
    if spans.is_empty() {
        spans.push(Span::raw("No categories loaded. Press g to reload."));
    }

    let chips = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Filter (Space toggles, empty = any)"),
    );
    frame.render_widget(chips, *chip_area);

    let city_name = app
        .selected_city_region()
        .map_or("<city>", |region| region.name.as_str());
    let title = format!("Points in {city_name}");

    if app.points.is_empty() {
        let paragraph = Paragraph::new("No collection points for this selection.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, *table_area);
        return;
    }

    let rows = app.points.iter().enumerate().map(|(index, point)| {
        let mut style = Style::default();
        if index == app.point_index {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        Row::new(vec![
            Cell::from(point.name.clone()),
            Cell::from(format!("{:.4}", point.latitude)),
            Cell::from(format!("{:.4}", point.longitude)),
            Cell::from(point.email.clone()),
            Cell::from(point.whatsapp.clone()),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(18),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Name", "Lat", "Long", "E-mail", "WhatsApp"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, *table_area);
}

fn draw_register_form(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let fields: [(&str, &str, FormFocus); 6] = [
        ("Name", app.form.name.as_str(), FormFocus::Name),
        ("E-mail", app.form.email.as_str(), FormFocus::Email),
        ("WhatsApp", app.form.whatsapp.as_str(), FormFocus::Whatsapp),
        ("Latitude", app.form.latitude.as_str(), FormFocus::Latitude),
        ("Longitude", app.form.longitude.as_str(), FormFocus::Longitude),
        ("Image file (optional)", app.form.image_path.as_str(), FormFocus::ImagePath),
    ];

    for (chunk, (label, value, focus)) in layout_chunks.iter().zip(fields) {
        let field = Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(column_style(app.form.focus == focus))
                .title(label),
        );
        frame.render_widget(field, *chunk);
    }

    let Some(category_area) = layout_chunks.get(6) else {
        return;
    };

    let items = app
        .categories
        .iter()
        .map(|category| {
            let marker = if app.form.categories.contains(&category.id) {
                "[x] "
            } else {
                "[ ] "
            };
            ListItem::new(format!("{marker}{title}", title = category.title))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(column_style(app.form.focus == FormFocus::Categories))
                .title("Accepted categories (Space toggles)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.categories.is_empty() && app.form.focus == FormFocus::Categories {
        state.select(Some(app.form.category_index));
    }
    frame.render_stateful_widget(list, *category_area, &mut state);
}

fn column_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}
