use crate::tui::app::AppState;
use ratatui::prelude::*;
use ratatui::widgets::*;

use super::layout::{centered_rect, inner};

const LOGO: &str = r#"
  __ _  __ _
 / _(_)/ _| |_ _  _
|  _| |  _|  _| || |
|_| |_|_|  \__|\_, |
               |__/
  __ ___ _  _ _ _| |_ ___ _ _
 / _/ _ \ || | ' \  _/ -_) '_|
 \__\___/\_,_|_||_\__\___|_|
"#;

pub(super) fn draw_menu(f: &mut Frame, app: &AppState) {
    let area = centered_rect(80, 80, f.area());
    let block = Block::default().title("fifty-counter").borders(Borders::ALL);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    let inner_all = inner(area);

    let logo_lines: Vec<Line> = LOGO
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Cyan))))
        .collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(logo_lines.len() as u16 + 1),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(inner_all);

    let logo_para = Paragraph::new(logo_lines).alignment(Alignment::Center);
    f.render_widget(logo_para, rows[0]);

    let rules = vec![
        Line::from("Play a card without taking the table past 50."),
        Line::from("2-8 count face value, 9 counts 0, 10 counts 10, J Q K take 10 away."),
        Line::from("An Ace counts 10, or 1 when 10 would go over. Stuck players are out."),
    ];
    let rules_para = Paragraph::new(rules)
        .style(Style::default().add_modifier(Modifier::DIM))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(rules_para, rows[1]);

    let mut cfg_lines: Vec<Line> = Vec::new();
    cfg_lines.push(Line::from(Span::styled(
        "Configuration:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (i, it) in app.menu_items_display().into_iter().enumerate() {
        let style = if i == app.menu_index {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        cfg_lines.push(Line::from(Span::styled(it, style)));
    }
    cfg_lines.push(Line::from(""));
    cfg_lines.push(Line::from(Span::styled(
        "[Enter] Deal  [Q] Quit  [↑/↓] Move  [+/-] Adjust",
        Style::default().add_modifier(Modifier::DIM),
    )));
    if let Some(err) = app.action_error() {
        cfg_lines.push(Line::from(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    let cfg_para = Paragraph::new(cfg_lines).wrap(Wrap { trim: true }).alignment(Alignment::Center);
    f.render_widget(cfg_para, rows[2]);
}
