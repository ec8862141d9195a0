//! Frame drawing onto a host canvas
//!
//! The simulation state is turned into flat draw calls against the
//! [`Canvas`] trait. The host decides what a rect or an image actually looks
//! like; draw failures are the host's business and never reach the game.

pub mod shapes;

use glam::IVec2;

use crate::assets::{ImageHandle, LevelAssets};
use crate::sim::combo::ComboChallenge;
use crate::sim::rect::Rect;
use crate::sim::state::{GameState, Obstacle, ObstacleKind, Outcome};

pub type Rgb = [u8; 3];

const SKY: Rgb = [30, 30, 40];
const GROUND: Rgb = [80, 80, 100];
const PLATFORM_FILL: Rgb = [120, 120, 140];
const PLATFORM_EDGE: Rgb = [200, 200, 220];
const BLOCK_FILL: Rgb = [90, 60, 60];
const PLAYER_FILL: Rgb = [255, 100, 100];
const WHITE: Rgb = [255, 255, 255];

/// Host drawing surface
pub trait Canvas {
    /// Fill the whole surface
    fn clear(&mut self, color: Rgb);
    /// Filled rect when `outline` is 0, otherwise a border that many pixels wide
    fn draw_rect(&mut self, rect: Rect, color: Rgb, outline: u32);
    fn draw_polygon(&mut self, points: &[IVec2], color: Rgb, outline: u32);
    /// Stretch an image over `rect`
    fn draw_image(&mut self, image: ImageHandle, rect: Rect);
    fn draw_text(&mut self, text: &str, pos: IVec2, color: Rgb);
}

/// Draw one frame of the run
pub fn draw_frame(canvas: &mut dyn Canvas, state: &GameState, assets: &LevelAssets) {
    let level = &state.level;
    let sky = level.bg_layers.first().and_then(|l| l.color).unwrap_or(SKY);
    canvas.clear(sky);

    // Background layers as static bands
    for (i, layer) in level.bg_layers.iter().enumerate() {
        let top = (level.height as f32 * layer.y_factor(i)) as i32;
        let band = Rect::new(0, top, level.width, level.height - top);
        match assets.layer_image(i) {
            Some(image) => canvas.draw_image(image, band),
            None => canvas.draw_rect(band, layer.color(), 0),
        }
    }

    let ground_y = state.ground_y();
    canvas.draw_rect(Rect::new(0, ground_y, level.width, level.height - ground_y), GROUND, 0);

    for obstacle in &level.obstacles {
        draw_obstacle(canvas, obstacle, assets);
    }

    let player = state.player.rect;
    match assets.player {
        Some(image) => canvas.draw_image(image, player),
        None => canvas.draw_rect(player, PLAYER_FILL, 0),
    }

    draw_hud(canvas, state);
}

fn draw_obstacle(canvas: &mut dyn Canvas, obstacle: &Obstacle, assets: &LevelAssets) {
    let rect = obstacle.rect;
    match obstacle.kind {
        ObstacleKind::Spike => {
            let points = shapes::spike_triangle(&rect);
            canvas.draw_polygon(&points, shapes::rainbow(rect.x), 0);
            canvas.draw_polygon(&points, WHITE, 2);
        }
        ObstacleKind::Platform => {
            canvas.draw_rect(rect, PLATFORM_FILL, 0);
            canvas.draw_rect(rect, PLATFORM_EDGE, 3);
        }
        ObstacleKind::Normal => match assets.obstacle_image(rect.x) {
            Some(image) => canvas.draw_image(image, rect),
            None => canvas.draw_rect(rect, BLOCK_FILL, 0),
        },
    }
}

fn draw_hud(canvas: &mut dyn Canvas, state: &GameState) {
    let corner = IVec2::new(20, 20);
    match state.outcome() {
        Outcome::Won => canvas.draw_text("You win! Press R to play again", corner, [200, 255, 200]),
        Outcome::Lost => canvas.draw_text("Game over! Press R to retry", corner, [255, 120, 120]),
        Outcome::Playing => {
            if let Some(timer) = state.run.victory_timer {
                canvas.draw_text(&format!("Victory in {:.1}s!", timer.max(0.0)), corner, [255, 255, 100]);
            }
        }
    }

    if let Some(combo) = state.combo.as_ref().filter(|c| c.is_active()) {
        draw_combo(canvas, combo, state.run.elapsed);
    }
}

fn draw_combo(canvas: &mut dyn Canvas, combo: &ComboChallenge, now: f32) {
    let panel = Rect::new(10, 60, 220, 70);
    canvas.draw_rect(panel, WHITE, 3);
    canvas.draw_text(&format!("COMBO: {}", combo.label()), IVec2::new(20, 70), WHITE);
    canvas.draw_text(
        &format!("{:.1}s", combo.remaining(now)),
        IVec2::new(20, 100),
        [255, 200, 80],
    );
}
