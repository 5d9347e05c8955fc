//! Music Runner scene.
//!
//! The play field is drawn into a cell buffer scaled from playfield units to
//! terminal cells, then stamped row-by-row as Paragraph widgets.

use super::game_common::{
    create_game_layout, info_line, render_game_over_banner, render_info_panel_frame,
    render_status_bar, truncate_name,
};
use crate::game::{GameController, GameOverCause, GameStatus, JumpRule, RunnerGame};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const NOTE_CHARS: [char; 4] = ['♪', '♫', '♩', '♬'];
const INFO_PANEL_WIDTH: u16 = 26;

#[derive(Clone, Copy)]
struct Cell {
    ch: char,
    fg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
        }
    }
}

pub fn render_runner_scene(frame: &mut Frame, area: Rect, ctrl: &GameController) {
    let layout = create_game_layout(
        frame,
        area,
        " Music Runner ",
        Color::Magenta,
        10,
        INFO_PANEL_WIDTH,
    );

    let game = ctrl.game();
    render_play_field(frame, layout.content, game);

    match game.status {
        GameStatus::Menu => render_start_prompt(frame, layout.content),
        GameStatus::GameOver => render_game_over(frame, layout.content, ctrl),
        GameStatus::Playing => {}
    }

    render_status_bar_content(frame, layout.status_bar, ctrl);
    render_info_panel(frame, layout.info_panel, ctrl);
}

fn render_play_field(frame: &mut Frame, area: Rect, game: &RunnerGame) {
    if area.height < 4 || area.width < 10 {
        return;
    }

    let rows = area.height as usize;
    let cols = area.width as usize;
    let x_scale = cols as f64 / game.config.playfield_width;
    let y_scale = rows as f64 / game.config.playfield_height;

    let to_col = |x: f64| (x * x_scale).floor() as i64;
    let to_row = |y: f64| (y * y_scale).floor() as i64;

    let mut buffer = vec![vec![Cell::default(); cols]; rows];

    // Drifting notes in the background
    let drift = (game.tick_count as f64 * game.speed * x_scale * 0.25) as usize;
    for (i, ch) in NOTE_CHARS.iter().enumerate() {
        let row = (i * 2 + 1) % rows;
        let col = (cols + i * cols / 4 + cols - drift % cols) % cols;
        buffer[row][col] = Cell {
            ch: *ch,
            fg: Color::Rgb(70, 60, 90),
        };
    }

    // Obstacles: solid columns above and below the gap
    for obstacle in &game.obstacles {
        let left = to_col(obstacle.x).max(0);
        let right = to_col(obstacle.right()).min(cols as i64 - 1);
        let gap_top = to_row(obstacle.gap_y);
        let gap_bottom = to_row(obstacle.gap_end());
        for col in left..=right {
            for row in 0..rows as i64 {
                let cell = &mut buffer[row as usize][col as usize];
                if row < gap_top || row > gap_bottom {
                    *cell = Cell {
                        ch: '█',
                        fg: Color::Green,
                    };
                } else if row == gap_top || row == gap_bottom {
                    *cell = Cell {
                        ch: '▒',
                        fg: Color::DarkGray,
                    };
                }
            }
        }
    }

    // Floor line
    let floor_row = rows - 1;
    let floor_color = if game.config.jump_rule == JumpRule::Flap {
        Color::Red
    } else {
        Color::Rgb(90, 70, 50)
    };
    for cell in buffer[floor_row].iter_mut() {
        if cell.ch == ' ' {
            *cell = Cell {
                ch: '▁',
                fg: floor_color,
            };
        }
    }

    // Player last so it is never hidden
    let player_left = to_col(game.config.player_x).max(0) as usize;
    let player_right = (to_col(game.config.player_x + game.config.player_size) as usize)
        .max(player_left)
        .min(cols - 1);
    let player_top = to_row(game.player_y).clamp(0, floor_row as i64) as usize;
    let player_bottom = (to_row(game.player_y + game.config.player_size) as usize)
        .max(player_top)
        .min(floor_row);
    let player_ch = if game.velocity < -1.0 {
        '▲'
    } else if game.velocity > 2.0 {
        '▼'
    } else {
        '■'
    };
    let player_color = if game.status == GameStatus::GameOver {
        Color::Red
    } else {
        Color::Yellow
    };
    for row in buffer.iter_mut().take(player_bottom + 1).skip(player_top) {
        for cell in row.iter_mut().take(player_right + 1).skip(player_left) {
            *cell = Cell {
                ch: player_ch,
                fg: player_color,
            };
        }
    }

    for (i, row) in buffer.into_iter().enumerate() {
        let spans: Vec<Span> = row
            .into_iter()
            .map(|c| Span::styled(c.ch.to_string(), Style::default().fg(c.fg)))
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(spans)),
            Rect::new(area.x, area.y + i as u16, area.width, 1),
        );
    }
}

fn render_start_prompt(frame: &mut Frame, area: Rect) {
    if area.height < 3 {
        return;
    }
    let prompt = Paragraph::new(Line::from(Span::styled(
        "♪ Press Space to start ♪",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(
        prompt,
        Rect::new(area.x, area.y + area.height / 2, area.width, 1),
    );
}

fn render_game_over(frame: &mut Frame, area: Rect, ctrl: &GameController) {
    let game = ctrl.game();
    let final_score = game.final_score.unwrap_or(game.score);
    let title = match game.game_over_cause {
        Some(GameOverCause::Floor) => "GAME OVER - you hit the floor",
        _ => "GAME OVER - you hit an obstacle",
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("Score ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            final_score.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Best ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            ctrl.high_score().to_string(),
            Style::default().fg(Color::Yellow),
        ),
    ])];

    if ctrl.is_new_record() {
        lines.push(Line::from(Span::styled(
            "★ New high score! ★",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(message) = ctrl.status_message() {
        let color = if ctrl.last_rank().is_some() {
            Color::Cyan
        } else {
            Color::Red
        };
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(color),
        )));
    }

    render_game_over_banner(frame, area, Color::Red, title, lines);
}

fn render_status_bar_content(frame: &mut Frame, area: Rect, ctrl: &GameController) {
    let game = ctrl.game();
    match game.status {
        GameStatus::Menu => render_status_bar(
            frame,
            area,
            &format!("Ready, {}?", ctrl.player_name()),
            Color::Yellow,
            &[("[Space]", "Start"), ("[L]", "Leaderboard"), ("[Q]", "Quit")],
        ),
        GameStatus::Playing => render_status_bar(
            frame,
            area,
            &format!("Score: {}", game.score),
            Color::Green,
            &[("[Space/Up]", "Jump"), ("[Q]", "Quit")],
        ),
        GameStatus::GameOver => {
            let mut controls = vec![("[Space/Enter]", "Play again")];
            if ctrl.can_retry_submission() {
                controls.push(("[R]", "Retry submit"));
            }
            controls.push(("[Q]", "Quit"));
            render_status_bar(
                frame,
                area,
                &format!("Final score: {}", game.final_score.unwrap_or(game.score)),
                Color::Red,
                &controls,
            );
        }
    }
}

fn render_info_panel(frame: &mut Frame, area: Rect, ctrl: &GameController) {
    let inner = render_info_panel_frame(frame, area);
    if inner.height < 2 || inner.width < 4 {
        return;
    }

    let game = ctrl.game();
    let name_width = inner.width.saturating_sub(12) as usize;

    let mut lines = vec![
        info_line(
            "Player",
            truncate_name(ctrl.player_name(), name_width.max(4)),
            Color::Cyan,
        ),
        Line::from(""),
        info_line("Score", game.score.to_string(), Color::White),
        info_line("Best", ctrl.high_score().to_string(), Color::Yellow),
        info_line("Passed", game.obstacles_passed.to_string(), Color::Green),
        info_line("Speed", format!("{:.1}", game.speed), Color::Magenta),
        Line::from(""),
    ];

    if !ctrl.is_online() {
        lines.push(Line::from(Span::styled(
            " Offline",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " Top Scores",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        if ctrl.leaderboard().is_empty() {
            lines.push(Line::from(Span::styled(
                " (none yet)",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for (i, row) in ctrl.leaderboard().iter().enumerate() {
            let highlight = row.name == ctrl.player_name();
            let style = if highlight {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(
                format!(
                    " {:>2}. {:<w$} {:>6}",
                    i + 1,
                    truncate_name(&row.name, name_width.max(4)),
                    row.score,
                    w = name_width.max(4)
                ),
                style,
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
