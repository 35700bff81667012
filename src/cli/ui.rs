use crate::core::config::Theme;
use crate::core::{ConversionState, RateStatus};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Value,
    Error,
    Subtle,
}

/// Applies a consistent style to a string for the given theme.
pub fn style_text(text: &str, style_type: StyleType, theme: Theme) -> String {
    let base = match (style_type, theme) {
        (StyleType::Title, Theme::Dark) => Style::new().bold().white(),
        (StyleType::Title, Theme::Light) => Style::new().bold().black(),
        (StyleType::Label, Theme::Dark) => Style::new().white(),
        (StyleType::Label, Theme::Light) => Style::new().black(),
        (StyleType::Value, _) => Style::new().green().bold(),
        (StyleType::Error, _) => Style::new().red(),
        (StyleType::Subtle, _) => Style::new().dim(),
    };
    base.apply_to(text).to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right aligned value cell; `N/A` is greyed out.
pub fn value_cell(text: &str) -> Cell {
    if text == "N/A" {
        Cell::new(text)
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(text)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right)
    }
}

/// Creates a spinner shown while a one-shot request is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Formats `1 USD = R$5.2317 BRL`, with `N/A` when no rate is known.
pub fn rate_line(state: &ConversionState) -> String {
    let pair = state.pair();
    format!(
        "1 {} = {}{} {}",
        pair.source(),
        pair.destination().symbol(),
        state.display_rate(),
        pair.destination()
    )
}

/// Renders the interactive converter panel.
pub fn render_panel(state: &ConversionState, theme: Theme, notice: Option<&str>) -> String {
    let pair = state.pair();
    let mut lines = vec![
        style_text("Currency Converter", StyleType::Title, theme),
        style_text(
            &format!("theme: {}", theme_name(theme)),
            StyleType::Subtle,
            theme,
        ),
        String::new(),
    ];

    match state.status() {
        RateStatus::Loading => {
            lines.push(style_text(
                "Loading exchange rate...",
                StyleType::Subtle,
                theme,
            ));
        }
        RateStatus::Error(message) => {
            lines.push(style_text(message, StyleType::Error, theme));
        }
        RateStatus::Ready(_) => {
            lines.push(format!(
                "1 {} = {}",
                style_text(pair.source().code(), StyleType::Label, theme),
                style_text(
                    &format!(
                        "{}{} {}",
                        pair.destination().symbol(),
                        state.display_rate(),
                        pair.destination()
                    ),
                    StyleType::Value,
                    theme
                )
            ));
        }
    }
    lines.push(style_text(
        &format!("Last updated: {}", state.display_updated_at()),
        StyleType::Subtle,
        theme,
    ));
    lines.push(String::new());

    lines.push(format!(
        "{} {} ({}) -> {} ({})",
        style_text("Pair:", StyleType::Label, theme),
        pair.source(),
        pair.source().name(),
        pair.destination(),
        pair.destination().name()
    ));
    let amount = if state.amount().is_empty() {
        style_text("-", StyleType::Subtle, theme)
    } else {
        format!("{}{}", pair.source().symbol(), state.amount())
    };
    lines.push(format!(
        "{} {}",
        style_text("Amount:", StyleType::Label, theme),
        amount
    ));
    let converted = state.converted().map_or_else(
        || style_text("-", StyleType::Subtle, theme),
        |value| {
            style_text(
                &format!("{}{}", pair.destination().symbol(), value),
                StyleType::Value,
                theme,
            )
        },
    );
    lines.push(format!(
        "{} {}",
        style_text("Converted:", StyleType::Label, theme),
        converted
    ));

    if let Some(notice) = notice {
        lines.push(String::new());
        lines.push(style_text(notice, StyleType::Error, theme));
    }

    lines.push(String::new());
    lines.push(style_text(
        "Type an amount to convert | from <USD|EUR|GBP> | to <BRL|USD|EUR> | theme | quit",
        StyleType::Subtle,
        theme,
    ));
    lines.join("\n")
}

fn theme_name(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "dark",
        Theme::Light => "light",
    }
}
