#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the arcade games.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::Result;
use arcade_rendering::{
    Banner, FrameDirective, FrameInput, GridPresentation, HudPlacement, KeyPress, PiecePreview,
    Presentation, RectSprite, RenderingBackend, Scene,
};
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use std::time::Duration;
use tracing::info;

const HUD_FONT_SIZE: f32 = 30.0;
const BANNER_FONT_SIZE: f32 = 60.0;
const HUD_MARGIN: f32 = 20.0;
const HUD_LINE_SPACING: f32 = 40.0;
const PREVIEW_CELL_FRACTION: f32 = 0.8;

const KEY_BINDINGS: [(KeyCode, KeyPress); 5] = [
    (KeyCode::Left, KeyPress::Left),
    (KeyCode::Right, KeyPress::Right),
    (KeyCode::Up, KeyPress::Up),
    (KeyCode::Down, KeyPress::Down),
    (KeyCode::Space, KeyPress::Fire),
];

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average frame rate once one
    /// second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        if seconds <= f32::EPSILON {
            return None;
        }
        Some(frames as f32 / seconds)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameDirective + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let window_width = presentation.window_width().round().max(1.0) as i32;
        let window_height = presentation.window_height().round().max(1.0) as i32;
        let Presentation {
            window_title,
            clear_color,
            hud,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(is_key_pressed);

                let directive = update_scene(frame_dt, frame_input, &mut scene);

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::from_scene(
                    &scene,
                    hud,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_cells(&scene, &metrics);
                draw_grid_lines(&scene.grid, &metrics);
                draw_rects(&scene.rects, &metrics);
                draw_hud(&scene.hud, hud, &metrics);
                if let Some(preview) = &scene.preview {
                    draw_preview(preview, scene.hud.len(), &metrics);
                }
                if let Some(banner) = &scene.banner {
                    draw_banner(banner, &metrics);
                }

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        info!(fps = format_args!("{per_second:.2}"), "frame rate");
                    }
                }

                macroquad::window::next_frame().await;

                if directive == FrameDirective::Exit {
                    break;
                }
            }
        });

        Ok(())
    }
}

fn gather_frame_input<F>(is_pressed: F) -> FrameInput
where
    F: Fn(KeyCode) -> bool,
{
    FrameInput {
        presses: KEY_BINDINGS
            .iter()
            .filter(|(code, _)| is_pressed(*code))
            .map(|(_, key)| *key)
            .collect(),
    }
}

/// Pixel layout of the play area after fitting it to the window.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    offset_x: f32,
    offset_y: f32,
    cell_step: f32,
    grid_width_scaled: f32,
    grid_height_scaled: f32,
    sidebar_x: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, hud: HudPlacement, screen_width: f32, screen_height: f32) -> Self {
        let grid = scene.grid;
        let sidebar_width = match hud {
            HudPlacement::Sidebar { width } => width.max(0.0),
            HudPlacement::Overlay => 0.0,
        };
        let world_width = grid.width() + sidebar_width;
        let world_height = grid.height();
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        let offset_x = ((screen_width - world_width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - world_height * scale) * 0.5).max(0.0);
        let grid_width_scaled = grid.width() * scale;
        let grid_height_scaled = grid.height() * scale;

        Self {
            offset_x,
            offset_y,
            cell_step: grid.cell_length * scale,
            grid_width_scaled,
            grid_height_scaled,
            sidebar_x: offset_x + grid_width_scaled,
        }
    }

    fn cell_origin(&self, column: u32, row: u32) -> Vec2 {
        Vec2::new(
            self.offset_x + column as f32 * self.cell_step,
            self.offset_y + row as f32 * self.cell_step,
        )
    }

    /// Top-left corner and pixel size of a rectangle sprite.
    fn rect_bounds(&self, rect: &RectSprite) -> (Vec2, Vec2) {
        let size = rect.size * self.cell_step;
        let center = Vec2::new(self.offset_x, self.offset_y) + rect.center * self.cell_step;
        (center - size * 0.5, size)
    }

    fn grid_center(&self) -> Vec2 {
        Vec2::new(
            self.offset_x + self.grid_width_scaled * 0.5,
            self.offset_y + self.grid_height_scaled * 0.5,
        )
    }
}

fn draw_cells(scene: &Scene, metrics: &SceneMetrics) {
    for cell in &scene.cells {
        let origin = metrics.cell_origin(cell.column, cell.row);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            metrics.cell_step,
            metrics.cell_step,
            to_macroquad_color(cell.color),
        );
    }
}

fn draw_grid_lines(grid: &GridPresentation, metrics: &SceneMetrics) {
    let Some(line_color) = grid.line_color else {
        return;
    };
    let color = to_macroquad_color(line_color);

    for column in 0..=grid.columns {
        let x = metrics.offset_x + column as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(
            x,
            metrics.offset_y,
            x,
            metrics.offset_y + metrics.grid_height_scaled,
            1.0,
            color,
        );
    }

    for row in 0..=grid.rows {
        let y = metrics.offset_y + row as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(
            metrics.offset_x,
            y,
            metrics.offset_x + metrics.grid_width_scaled,
            y,
            1.0,
            color,
        );
    }
}

fn draw_rects(rects: &[RectSprite], metrics: &SceneMetrics) {
    for rect in rects {
        let (origin, size) = metrics.rect_bounds(rect);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x,
            size.y,
            to_macroquad_color(rect.color),
        );
    }
}

fn hud_line_origin(
    placement: HudPlacement,
    line: usize,
    line_count: usize,
    metrics: &SceneMetrics,
) -> Vec2 {
    match placement {
        HudPlacement::Sidebar { .. } => Vec2::new(
            metrics.sidebar_x + HUD_MARGIN,
            metrics.offset_y + HUD_MARGIN + HUD_FONT_SIZE + line as f32 * HUD_LINE_SPACING,
        ),
        HudPlacement::Overlay => {
            let from_bottom = (line_count - line) as f32;
            Vec2::new(
                metrics.offset_x + HUD_MARGIN * 0.5,
                metrics.offset_y + metrics.grid_height_scaled - HUD_MARGIN * 0.5
                    - (from_bottom - 1.0) * HUD_LINE_SPACING,
            )
        }
    }
}

fn draw_hud(lines: &[String], placement: HudPlacement, metrics: &SceneMetrics) {
    for (index, line) in lines.iter().enumerate() {
        let origin = hud_line_origin(placement, index, lines.len(), metrics);
        let _ = macroquad::text::draw_text(
            line,
            origin.x,
            origin.y,
            HUD_FONT_SIZE,
            macroquad::color::WHITE,
        );
    }
}

fn draw_preview(preview: &PiecePreview, hud_lines: usize, metrics: &SceneMetrics) {
    let label_y = metrics.offset_y
        + HUD_MARGIN
        + HUD_FONT_SIZE
        + (hud_lines as f32 + 0.5) * HUD_LINE_SPACING;
    let _ = macroquad::text::draw_text(
        &preview.label,
        metrics.sidebar_x + HUD_MARGIN,
        label_y,
        HUD_FONT_SIZE,
        macroquad::color::WHITE,
    );

    let min_column = preview.cells.iter().map(|(column, _)| *column).min().unwrap_or(0);
    let min_row = preview.cells.iter().map(|(_, row)| *row).min().unwrap_or(0);
    let step = metrics.cell_step * PREVIEW_CELL_FRACTION;
    let origin = Vec2::new(metrics.sidebar_x + HUD_MARGIN, label_y + HUD_MARGIN);
    let color = to_macroquad_color(preview.color);

    for (column, row) in &preview.cells {
        let x = origin.x + (column - min_column) as f32 * step;
        let y = origin.y + (row - min_row) as f32 * step;
        macroquad::shapes::draw_rectangle(x, y, step - 1.0, step - 1.0, color);
    }
}

fn draw_banner(banner: &Banner, metrics: &SceneMetrics) {
    let dimensions =
        macroquad::text::measure_text(&banner.text, None, BANNER_FONT_SIZE as u16, 1.0);
    let center = metrics.grid_center();
    let _ = macroquad::text::draw_text(
        &banner.text,
        center.x - dimensions.width * 0.5,
        center.y + dimensions.offset_y * 0.5,
        BANNER_FONT_SIZE,
        to_macroquad_color(banner.color),
    );
}

fn to_macroquad_color(color: arcade_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_rendering::Color;

    fn scene(columns: u32, rows: u32, cell_length: f32) -> Scene {
        Scene::new(GridPresentation::new(columns, rows, cell_length, None).expect("valid grid"))
    }

    fn assert_vec2_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).length() <= 1e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn metrics_fit_grid_and_sidebar_into_window() {
        let scene = scene(10, 20, 30.0);
        let metrics =
            SceneMetrics::from_scene(&scene, HudPlacement::Sidebar { width: 200.0 }, 500.0, 600.0);

        assert!((metrics.cell_step - 30.0).abs() <= 1e-4);
        assert_eq!(metrics.offset_x, 0.0);
        assert_eq!(metrics.sidebar_x, 300.0);
    }

    #[test]
    fn metrics_scale_down_and_center_in_larger_windows() {
        let scene = scene(20, 20, 32.0);
        let metrics = SceneMetrics::from_scene(&scene, HudPlacement::Overlay, 960.0, 640.0);

        assert!((metrics.cell_step - 32.0).abs() <= 1e-4);
        assert_eq!(metrics.offset_x, 160.0);
        assert_vec2_close(metrics.grid_center(), Vec2::new(480.0, 320.0));
    }

    #[test]
    fn rect_bounds_center_sprite_on_cell() {
        let scene = scene(20, 20, 32.0);
        let metrics = SceneMetrics::from_scene(&scene, HudPlacement::Overlay, 640.0, 640.0);
        let tank = RectSprite::new(
            Vec2::new(1.5, 1.5),
            Vec2::splat(28.0 / 32.0),
            Color::from_rgb_u8(50, 200, 50),
        );

        let (origin, size) = metrics.rect_bounds(&tank);

        assert_vec2_close(origin, Vec2::new(34.0, 34.0));
        assert_vec2_close(size, Vec2::new(28.0, 28.0));
    }

    #[test]
    fn overlay_hud_stacks_lines_above_bottom_edge() {
        let scene = scene(20, 20, 32.0);
        let metrics = SceneMetrics::from_scene(&scene, HudPlacement::Overlay, 640.0, 640.0);

        let last = hud_line_origin(HudPlacement::Overlay, 1, 2, &metrics);
        let first = hud_line_origin(HudPlacement::Overlay, 0, 2, &metrics);

        assert_vec2_close(last, Vec2::new(10.0, 630.0));
        assert_vec2_close(first, Vec2::new(10.0, 630.0 - HUD_LINE_SPACING));
    }

    #[test]
    fn frame_input_maps_bound_keys_in_binding_order() {
        let input = gather_frame_input(|code| matches!(code, KeyCode::Space | KeyCode::Left));

        assert_eq!(input.presses, vec![KeyPress::Left, KeyPress::Fire]);
        assert!(input.pressed(KeyPress::Fire));
        assert!(!input.pressed(KeyPress::Up));
    }

    #[test]
    fn fps_counter_reports_average_frames_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);
        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());

        let per_second = counter
            .record_frame(frame)
            .expect("should report FPS after one second of samples");
        assert!((per_second - 4.0).abs() <= 1e-3);
        assert!(counter.record_frame(frame).is_none());
    }
}
