use crate::cards::{Card, MAX_SUM};
use crate::coordinator::{SeatView, TableSnapshot};
use crate::game::{TurnEvent, TurnRecord};
use crate::tui::app::AppState;
use ratatui::prelude::*;
use ratatui::widgets::*;

use super::layout::{card_row, centered_rect, inner};

const CARD_WIDTH: u16 = 7;

pub(super) fn draw_table(f: &mut Frame, app: &AppState) {
    let Some(table) = app.table() else {
        let para = Paragraph::new("Dealing...").alignment(Alignment::Center);
        f.render_widget(para, f.area());
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(5), // opponents
            Constraint::Length(5), // table card
            Constraint::Length(6), // human hand
            Constraint::Min(4),    // log + status
        ])
        .split(f.area());

    draw_header(f, chunks[0], table);
    draw_opponents(f, chunks[1], table);
    draw_pile(f, chunks[2], table);
    draw_hand(f, chunks[3], app, table);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[4]);
    draw_log(f, bottom[0], table);
    draw_status(f, bottom[1], app, table);

    if app.help_open() {
        draw_help(f);
    } else if table.is_finished() {
        draw_winner(f, table);
    }
}

fn draw_header(f: &mut Frame, area: Rect, table: &TableSnapshot) {
    let sum_style = if table.table_sum >= MAX_SUM - 5 {
        Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let turn = table.seats.get(table.current).map(|s| s.name.as_str()).unwrap_or("-");
    let line = Line::from(vec![
        Span::raw("Sum: "),
        Span::styled(format!("{}/{MAX_SUM}", table.table_sum), sum_style),
        Span::raw(format!(
            "   Deck: {}   Discard: {}   Turn: {turn}",
            table.deck_len, table.discard_len
        )),
    ]);
    let header =
        Paragraph::new(line).block(Block::default().title("fifty-counter").borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_opponents(f: &mut Frame, area: Rect, table: &TableSnapshot) {
    let cpus: Vec<(usize, &SeatView)> =
        table.seats.iter().enumerate().filter(|(_, s)| !s.human).collect();
    if cpus.is_empty() {
        return;
    }
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(cpus.iter().map(|_| Constraint::Ratio(1, cpus.len() as u32)))
        .split(area);
    for ((idx, seat), col) in cpus.into_iter().zip(cols.iter()) {
        let mut title = seat.name.clone();
        if idx == table.current && !table.is_finished() {
            title.push_str(" [Act]");
        }
        let border = seat_border(table, idx, seat);
        let block = Block::default().title(title).borders(Borders::ALL).border_style(border);
        let body = if seat.eliminated {
            Line::from(Span::styled("OUT", Style::default().fg(Color::DarkGray)))
        } else {
            let backs = "[##] ".repeat(seat.hand.len());
            Line::from(vec![
                Span::styled(backs, Style::default().fg(Color::Blue)),
                Span::raw(format!("{} cards", seat.hand.len())),
            ])
        };
        let para = Paragraph::new(body).block(block).alignment(Alignment::Center);
        f.render_widget(para, *col);
    }
}

fn seat_border(table: &TableSnapshot, idx: usize, seat: &SeatView) -> Style {
    if table.winner == Some(idx) {
        Style::default().fg(Color::Green)
    } else if seat.eliminated {
        Style::default().fg(Color::DarkGray)
    } else if idx == table.current {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_pile(f: &mut Frame, area: Rect, table: &TableSnapshot) {
    let block = Block::default().title("Table").borders(Borders::ALL);
    let slots = card_row(inner(area), 1, CARD_WIDTH);
    f.render_widget(block, area);
    if let Some(slot) = slots.first() {
        render_card_widget(f, *slot, table.last_played, Some(Color::Yellow), false);
    }
}

fn draw_hand(f: &mut Frame, area: Rect, app: &AppState, table: &TableSnapshot) {
    let Some((idx, seat)) = table.seats.iter().enumerate().find(|(_, s)| s.human) else {
        return;
    };
    let mut title = String::from("Your hand");
    if seat.eliminated {
        title.push_str(" [OUT]");
    } else if table.is_human_turn() {
        title.push_str(" [Your turn]");
    }
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(seat_border(table, idx, seat));
    let hand_area = inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(hand_area);
    let slots = card_row(rows[0], seat.hand.len(), CARD_WIDTH);
    for (i, (card, slot)) in seat.hand.iter().zip(slots.iter()).enumerate() {
        let selected = i == app.selected();
        let border = if selected { Some(Color::Yellow) } else { None };
        let dim = !card.is_playable(table.table_sum);
        render_card_widget(f, *slot, Some(*card), border, dim);
    }
    let hint = match app.selected_card() {
        Some(card) if table.is_human_turn() => {
            let value = card.value_when_played(table.table_sum);
            if card.is_playable(table.table_sum) {
                format!("{} counts {value:+}", card.face())
            } else {
                format!("{} would go past {MAX_SUM}", card.face())
            }
        }
        _ => String::new(),
    };
    let para = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Center);
    f.render_widget(para, rows[1]);
}

fn draw_log(f: &mut Frame, area: Rect, table: &TableSnapshot) {
    let lines: Vec<Line> = if table.recent.is_empty() {
        let dim = Style::default().add_modifier(Modifier::DIM);
        vec![Line::from(Span::styled("No moves yet.", dim))]
    } else {
        table.recent.iter().map(|r| Line::from(event_text(table, r))).collect()
    };
    let para = Paragraph::new(lines)
        .block(Block::default().title("Recent").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn event_text(table: &TableSnapshot, record: &TurnRecord) -> String {
    let seat = table.seats.get(record.seat);
    let name = seat.map(|s| s.name.as_str()).unwrap_or("?");
    match record.event {
        TurnEvent::Played { card, value, sum } => {
            format!("{name} played {} ({value:+}), sum {sum}", card.face())
        }
        TurnEvent::Drew { card } if seat.is_some_and(|s| s.human) => {
            format!("{name} drew {}", card.face())
        }
        TurnEvent::Drew { .. } => format!("{name} drew a card"),
        TurnEvent::Refilled { cards } => format!("Deck refilled with {cards} cards"),
        TurnEvent::Eliminated { returned } => {
            format!("{name} is out, {returned} cards back to the deck")
        }
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &AppState, table: &TableSnapshot) {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = app.status() {
        lines.push(Line::from(Span::styled(
            status.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(err) = app.action_error() {
        lines.push(Line::from(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    if app.fold_pending() {
        lines.push(Line::from(Span::styled(
            "Leave this game? Press F or Esc again.",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    let action_style = if table.is_human_turn() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    lines.push(Line::from(vec![
        Span::styled("←/→ select • Enter play", action_style),
        Span::raw(" • F fold • ? help • Q quit"),
    ]));
    let para = Paragraph::new(lines)
        .block(Block::default().title("Status").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn draw_winner(f: &mut Frame, table: &TableSnapshot) {
    let area = centered_rect(50, 25, f.area());
    let name = table.winner_name().unwrap_or("Nobody");
    let headline = if name == "You" { "You win!".to_string() } else { format!("{name} wins") };
    let lines = vec![
        Line::from(Span::styled(
            headline,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("F or Esc: back to menu • Q: quit"),
    ];
    let block = Block::default().title("Game over").borders(Borders::ALL);
    let para = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(para, inner(area));
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(70, 70, f.area());
    let block = Block::default().title("Help").borders(Borders::ALL);
    let lines = vec![
        Line::from(Span::styled("Table:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("- Left / Right: move selection"),
        Line::from("- 1-9: select card"),
        Line::from("- Enter / Space: play selected card"),
        Line::from("- F / Esc twice: fold and return to menu"),
        Line::from(""),
        Line::from(Span::styled("Rules:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("- The sum may never pass 50"),
        Line::from("- 9 counts 0, J Q K count -10"),
        Line::from("- Ace counts 10 unless that passes 50, then 1"),
        Line::from("- No playable card: you are out"),
        Line::from(""),
        Line::from("Close help: ? or Esc"),
    ];
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(para, inner(area));
}

fn suit_style(card: Card) -> Style {
    if card.suit().is_red() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_card_widget(
    f: &mut Frame,
    area: Rect,
    card: Option<Card>,
    border: Option<Color>,
    dim: bool,
) {
    let mut block = Block::default().borders(Borders::ALL);
    if let Some(color) = border {
        block = block.border_style(Style::default().fg(color));
    }
    let inner = inner(area);
    f.render_widget(block, area);
    let content = match card {
        Some(c) => {
            let mut style = suit_style(c);
            if dim {
                style = style.add_modifier(Modifier::DIM);
            }
            Line::from(Span::styled(c.face(), style))
        }
        None => Line::from("[  ]"),
    };
    let para = Paragraph::new(content).alignment(Alignment::Center);
    f.render_widget(para, inner);
}
