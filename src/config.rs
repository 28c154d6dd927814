//! Window and display mode configuration.

use glutin::config::ConfigTemplateBuilder;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowAttributes};

/// Initial framebuffer width in pixels.
pub const DEFAULT_WIDTH: u32 = 600;

/// Initial framebuffer height in pixels.
pub const DEFAULT_HEIGHT: u32 = 600;

/// `env_logger` filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Window title.
pub const DEFAULT_TITLE: &str = "cookie";

/// How the window and its GL config are requested.
///
/// The defaults describe a double buffered RGBA window with a depth buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub alpha_size: u8,
    pub depth_size: u8,
    pub double_buffered: bool,
    /// Wait for vblank on swap. Off, so redraws run back to back.
    pub vsync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            alpha_size: 8,
            depth_size: 24,
            double_buffered: true,
            vsync: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sizes of `0` are raised to `1`.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Attributes for the window carrying the surface.
    pub fn window_attributes(&self) -> WindowAttributes {
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.inner_size())
    }

    /// The template used to pick the GL config.
    pub fn config_template(&self) -> ConfigTemplateBuilder {
        ConfigTemplateBuilder::new()
            .with_alpha_size(self.alpha_size)
            .with_depth_size(self.depth_size)
            .with_single_buffering(!self.double_buffered)
    }

    pub fn inner_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.width, self.height)
    }
}
