use ratatui::{prelude::*, widgets::*};

use crate::app::form::TurfForm;
use crate::app::state::StatusKind;
use crate::models::{format_price, Turf};
use crate::store::Phase;

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Green).bold())
        .divider("|")
}

/// Renders a listing form, one bordered line per field
pub fn render_form(form: &TurfForm, editing: bool) -> Vec<Line<'static>> {
    form.fields()
        .iter()
        .map(|field| {
            let focused = *field == form.focus;
            let label_style = if focused {
                Style::default().fg(Color::Green).bold()
            } else {
                Style::default().fg(Color::Gray)
            };

            let value = form.value(*field);
            let (text, value_style) = if value.is_empty() {
                (placeholder(field.label()), Style::default().fg(Color::DarkGray))
            } else {
                (value.to_string(), Style::default())
            };
            let cursor = if focused && editing { "_" } else { "" };

            Line::from(vec![
                Span::styled(format!("{:>12}  ", field.label()), label_style),
                Span::styled(text, value_style),
                Span::styled(cursor, Style::default().fg(Color::Yellow)),
            ])
        })
        .collect()
}

fn placeholder(label: &str) -> String {
    match label {
        "Image" => String::from("path to an image file (optional)"),
        "Pitches" => String::from("number of pitches (optional)"),
        other => format!("<{}>", other.to_lowercase()),
    }
}

/// Table row for a listing
pub fn turf_row(turf: &Turf) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!("#{}", turf.id)),
        Cell::from(turf.name.clone()),
        Cell::from(turf.location.clone()),
        Cell::from(format_price(turf.price)).style(Style::default().fg(Color::Yellow)),
    ])
}

/// Detail lines for the selected listing
pub fn turf_details(turf: &Turf) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(turf.name.clone(), Style::default().fg(Color::Green).bold())),
        Line::from(turf.location.clone()),
        Line::from(""),
        Line::from(turf.description.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("Price: ", Style::default().fg(Color::Gray)),
            Span::styled(format_price(turf.price), Style::default().fg(Color::Yellow)),
        ]),
    ];

    if let Some(pitches) = turf.number_of_pitches {
        lines.push(Line::from(format!("Pitches: {}", pitches)));
    }
    if !turf.image_url.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Image: {}", turf.image_url),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(updated) = turf.updated_at.or(turf.created_at) {
        lines.push(Line::from(Span::styled(
            format!("Updated {}", updated.format("%Y-%m-%d %H:%M")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

/// Footer line describing pagination progress
pub fn pagination_label(phase: Phase, is_loading: bool, count: usize) -> String {
    if is_loading {
        return String::from(" Loading more... ");
    }
    match phase {
        Phase::Empty => String::from(" Nothing loaded "),
        Phase::Loaded => format!(" {} loaded, scroll for more ", count),
        Phase::Exhausted => format!(" All {} turfs loaded ", count),
    }
}

/// Status message color
pub fn status_color(kind: StatusKind) -> Color {
    match kind {
        StatusKind::Info => Color::Cyan,
        StatusKind::Success => Color::Green,
        StatusKind::Error => Color::Red,
    }
}
