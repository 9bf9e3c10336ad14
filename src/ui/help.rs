use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::centered_rect;

fn key_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<8}", key), Style::default().fg(Color::Green)),
        Span::raw(desc),
    ])
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

pub fn render_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());

    // Clear the background
    f.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![
            Span::styled("fitchart", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" - FIT file data analysis"),
        ]),
        Line::from(""),
        section("Navigation"),
        key_line("←/→", "Switch between tabs"),
        key_line("↑/↓", "Move cursor / selected row"),
        key_line("PgUp/Dn", "Move by 10"),
        Line::from(""),
        section("Files"),
        key_line("Enter", "Load selected file"),
        key_line("d", "Hide file from list"),
        key_line("r", "Rescan directory"),
        Line::from(""),
        section("Axes"),
        key_line("x", "Use column as X-axis"),
        key_line("Space", "Toggle column as Y-axis (up to 2)"),
        key_line("s", "Toggle shared Y-axis"),
        key_line("m", "Toggle smoothing"),
        key_line("+/-", "Moving average window size (1-100)"),
        Line::from(""),
        section("General"),
        key_line("c", "Close loaded file"),
        key_line("?", "Toggle this help"),
        key_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}
