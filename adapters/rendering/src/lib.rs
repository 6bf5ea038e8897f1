#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for arcade adapters.

use anyhow::Result as AnyResult;
use arcade_core::CellColor;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

impl From<CellColor> for Color {
    fn from(color: CellColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Logical keys the games react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPress {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Space bar.
    Fire,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Keys pressed since the previous frame, in the order they were observed.
    pub presses: Vec<KeyPress>,
}

impl FrameInput {
    /// Reports whether `key` was pressed on this frame.
    #[must_use]
    pub fn pressed(&self, key: KeyPress) -> bool {
        self.presses.contains(&key)
    }
}

/// Decision returned by the per-frame update closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDirective {
    /// Keep running.
    Continue,
    /// Close the window after presenting the current frame.
    Exit,
}

/// Describes the cell grid that composes the play area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell in pixels.
    pub cell_length: f32,
    /// Color used when drawing grid lines, or `None` to omit them.
    pub line_color: Option<Color>,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when either dimension is zero or the cell length is
    /// not a positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
        line_color: Option<Color>,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            line_color,
        })
    }

    /// Calculates the total width of the grid in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }
}

/// Grid cell filled with a solid color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSprite {
    /// Zero-based column of the cell.
    pub column: u32,
    /// Zero-based row of the cell.
    pub row: u32,
    /// Fill color.
    pub color: Color,
}

impl CellSprite {
    /// Creates a new cell sprite.
    #[must_use]
    pub const fn new(column: u32, row: u32, color: Color) -> Self {
        Self { column, row, color }
    }
}

/// Axis-aligned rectangle positioned in cell units.
///
/// `(0.5, 0.5)` is the center of the top-left cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectSprite {
    /// Rectangle center in cell units.
    pub center: Vec2,
    /// Rectangle extent in cell units.
    pub size: Vec2,
    /// Fill color.
    pub color: Color,
}

impl RectSprite {
    /// Creates a new rectangle sprite.
    #[must_use]
    pub const fn new(center: Vec2, size: Vec2, color: Color) -> Self {
        Self {
            center,
            size,
            color,
        }
    }
}

/// Small piece diagram shown beside the play area.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecePreview {
    /// Caption drawn above the diagram.
    pub label: String,
    /// Cell offsets relative to the diagram origin.
    pub cells: Vec<(i32, i32)>,
    /// Fill color.
    pub color: Color,
}

/// Text centered over the play area.
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    /// Text to display.
    pub text: String,
    /// Text color.
    pub color: Color,
}

/// Scene description combining the grid, its contents and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Filled cells, drawn first.
    pub cells: Vec<CellSprite>,
    /// Rectangles drawn over the cells.
    pub rects: Vec<RectSprite>,
    /// Text lines of the heads-up display.
    pub hud: Vec<String>,
    /// Optional next-piece preview.
    pub preview: Option<PiecePreview>,
    /// Optional banner drawn last.
    pub banner: Option<Banner>,
}

impl Scene {
    /// Creates an empty scene over the provided grid.
    #[must_use]
    pub fn new(grid: GridPresentation) -> Self {
        Self {
            grid,
            cells: Vec::new(),
            rects: Vec::new(),
            hud: Vec::new(),
            preview: None,
            banner: None,
        }
    }

    /// Removes every per-frame element while keeping the grid.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.rects.clear();
        self.hud.clear();
        self.preview = None;
        self.banner = None;
    }
}

/// Where the heads-up display is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HudPlacement {
    /// In a sidebar of the given pixel width to the right of the grid.
    Sidebar {
        /// Sidebar width in pixels.
        width: f32,
    },
    /// Over the bottom-left corner of the grid.
    Overlay,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Placement of the heads-up display.
    pub hud: HudPlacement,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, hud: HudPlacement, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            hud,
            scene,
        }
    }

    /// Width of the window required by the presentation.
    #[must_use]
    pub fn window_width(&self) -> f32 {
        match self.hud {
            HudPlacement::Sidebar { width } => self.scene.grid.width() + width,
            HudPlacement::Overlay => self.scene.grid.width(),
        }
    }

    /// Height of the window required by the presentation.
    #[must_use]
    pub fn window_height(&self) -> f32 {
        self.scene.grid.height()
    }
}

/// Rendering backend capable of presenting arcade scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the closure or the player asks to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rewrites the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameDirective + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Both grid dimensions must be positive.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cell length must be a positive finite number of pixels.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must have cells (received {columns}x{rows})")
            }
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}
