mod game_common;
mod runner_scene;

use crate::game::GameController;
use ratatui::Frame;

/// Draw one frame of the game.
pub fn draw_ui(frame: &mut Frame, ctrl: &GameController) {
    let area = frame.size();
    runner_scene::render_runner_scene(frame, area, ctrl);
}
