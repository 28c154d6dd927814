//! The render driver: startup checks and the resize/display callbacks.

use std::io::Write;

use log::{debug, info};

use crate::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::{Error, Result};
use crate::loader::{self, Capabilities};
use crate::renderer::{ClearMask, Color, GlCommands, GlString};
use crate::version::GlVersion;

/// Clear color used every frame.
pub const DISPLAY_CLEAR_COLOR: Color = [1.0, 0.2, 0.7, 1.0];

/// Clear color set on resize.
pub const RESIZE_CLEAR_COLOR: Color = [0.0, 0.0, 0.0, 0.0];

/// Window system events the driver reacts to.
pub trait Callbacks {
    /// The framebuffer was resized.
    fn on_resize(&mut self, width: i32, height: i32);

    /// A frame has to be drawn and presented on `target`.
    fn on_display(&mut self, target: &dyn Present) -> Result<()>;
}

/// Presentation side of the window system.
pub trait Present {
    /// Show the back buffer.
    fn swap_buffers(&self) -> Result<()>;

    /// Ask for another [`Callbacks::on_display`].
    fn request_redisplay(&self);
}

/// Where the driver is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A window with a current context exists, nothing is loaded yet.
    WindowCreated,
    FunctionsLoaded(GlVersion),
    CapabilityOk(GlVersion),
    EventLoopRunning(GlVersion),
    LoaderFailed,
    CapabilityFailed(GlVersion),
}

/// Owns the GL commands and the framebuffer size.
#[derive(Debug)]
pub struct Driver<G> {
    gl: G,
    width: i32,
    height: i32,
    stage: Stage,
    capabilities: Option<Capabilities>,
}

impl<G: GlCommands> Driver<G> {
    /// Create a driver for a window whose context is current.
    pub fn new(gl: G) -> Self {
        Self {
            gl,
            width: DEFAULT_WIDTH as i32,
            height: DEFAULT_HEIGHT as i32,
            stage: Stage::WindowCreated,
            capabilities: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn capabilities(&self) -> Option<Capabilities> {
        self.capabilities
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    /// Run the startup sequence and write the version report to `out`.
    ///
    /// The decoded version is written before the capability check, the
    /// version strings after it.
    pub fn startup<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<GlVersion> {
        let version = self.load_gl_functions()?;
        writeln!(out, "OpenGL {}.{}", version.encoded() / 10, version.encoded() % 10)?;
        self.check_capability()?;
        self.report_versions(out)?;
        Ok(version)
    }

    /// Detect the version of the loaded functions.
    pub fn load_gl_functions(&mut self) -> Result<GlVersion> {
        let encoded = loader::load_version(&self.gl);
        match GlVersion::from_encoded(encoded) {
            Some(version) => {
                debug!("loaded OpenGL {version}");
                self.capabilities = Some(Capabilities::new(version));
                self.stage = Stage::FunctionsLoaded(version);
                Ok(version)
            },
            None => {
                self.stage = Stage::LoaderFailed;
                Err(Error::Loader)
            },
        }
    }

    /// Require the OpenGL 2.0 feature set.
    pub fn check_capability(&mut self) -> Result<()> {
        let Some(capabilities) = self.capabilities else {
            self.stage = Stage::LoaderFailed;
            return Err(Error::Loader);
        };

        let version = capabilities.version();
        if capabilities.gl_2_0() {
            self.stage = Stage::CapabilityOk(version);
            Ok(())
        } else {
            self.stage = Stage::CapabilityFailed(version);
            Err(Error::Capability { version })
        }
    }

    /// Write the driver reported version strings.
    pub fn report_versions<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        let version = self.gl.get_string(GlString::Version).unwrap_or_default();
        let glsl = self.gl.get_string(GlString::ShadingLanguageVersion).unwrap_or_default();
        writeln!(out, "OpenGL {version}, GLSL {glsl}")?;

        if let Some(renderer) = self.gl.get_string(GlString::Renderer) {
            info!("running on {renderer}");
        }

        Ok(())
    }

    /// Mark the startup as complete. Only valid after a passed capability
    /// check.
    pub fn enter_event_loop(&mut self) {
        if let Stage::CapabilityOk(version) = self.stage {
            self.stage = Stage::EventLoopRunning(version);
        }
        debug_assert!(matches!(self.stage, Stage::EventLoopRunning(_)));
    }
}

impl<G: GlCommands> Callbacks for Driver<G> {
    fn on_resize(&mut self, width: i32, height: i32) {
        self.width = width.max(1);
        self.height = height.max(1);
        debug!("resized to {}x{}", self.width, self.height);

        self.gl.viewport(0, 0, self.width, self.height);
        self.gl.clear_depth(1.0);
        self.gl.clear_color(RESIZE_CLEAR_COLOR);
        self.gl.enable_depth_test();
    }

    fn on_display(&mut self, target: &dyn Present) -> Result<()> {
        self.gl.clear_color(DISPLAY_CLEAR_COLOR);
        self.gl.clear(ClearMask::COLOR | ClearMask::DEPTH);
        target.swap_buffers()?;
        target.request_redisplay();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        ClearColor(Color),
        ClearDepth(f64),
        Clear(ClearMask),
        Viewport(i32, i32, i32, i32),
        EnableDepthTest,
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Call>>,
    }

    impl Recorder {
        fn take(&self) -> Vec<Call> {
            self.calls.take()
        }
    }

    impl GlCommands for Recorder {
        fn clear_color(&self, color: Color) {
            self.calls.borrow_mut().push(Call::ClearColor(color));
        }

        fn clear_depth(&self, depth: f64) {
            self.calls.borrow_mut().push(Call::ClearDepth(depth));
        }

        fn clear(&self, mask: ClearMask) {
            self.calls.borrow_mut().push(Call::Clear(mask));
        }

        fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
            self.calls.borrow_mut().push(Call::Viewport(x, y, width, height));
        }

        fn enable_depth_test(&self) {
            self.calls.borrow_mut().push(Call::EnableDepthTest);
        }

        fn get_string(&self, _: GlString) -> Option<String> {
            None
        }
    }

    #[derive(Default)]
    struct Window {
        swaps: Cell<usize>,
        redisplays: Cell<usize>,
    }

    impl Present for Window {
        fn swap_buffers(&self) -> Result<()> {
            self.swaps.set(self.swaps.get() + 1);
            Ok(())
        }

        fn request_redisplay(&self) {
            self.redisplays.set(self.redisplays.get() + 1);
        }
    }

    #[test]
    fn starts_at_600_by_600() {
        let driver = Driver::new(Recorder::default());
        assert_eq!((driver.width(), driver.height()), (600, 600));
        assert_eq!(driver.stage(), Stage::WindowCreated);
    }

    #[test]
    fn resize_stores_positive_sizes() {
        let mut driver = Driver::new(Recorder::default());
        for (w, h) in [(1, 1), (800, 600), (1920, 1080), (3, 7000)] {
            driver.on_resize(w, h);
            assert_eq!((driver.width(), driver.height()), (w, h));
        }
    }

    #[test]
    fn resize_clamps_to_one() {
        let mut driver = Driver::new(Recorder::default());
        driver.on_resize(0, 300);
        assert_eq!((driver.width(), driver.height()), (1, 300));
        driver.on_resize(300, -5);
        assert_eq!((driver.width(), driver.height()), (300, 1));
        driver.on_resize(i32::MIN, 0);
        assert_eq!((driver.width(), driver.height()), (1, 1));
    }

    #[test]
    fn resize_resets_context_state() {
        let mut driver = Driver::new(Recorder::default());
        for (w, h) in [(640, 480), (-1, 0)] {
            driver.on_resize(w, h);
            let (width, height) = (driver.width(), driver.height());
            assert_eq!(driver.gl().take(), vec![
                Call::Viewport(0, 0, width, height),
                Call::ClearDepth(1.0),
                Call::ClearColor(RESIZE_CLEAR_COLOR),
                Call::EnableDepthTest,
            ]);
        }
    }

    #[test]
    fn display_clears_swaps_and_requests_more() {
        let mut driver = Driver::new(Recorder::default());
        let window = Window::default();
        driver.on_display(&window).unwrap();
        driver.on_display(&window).unwrap();

        assert_eq!(window.swaps.get(), 2);
        assert_eq!(window.redisplays.get(), 2);
        let frame = vec![
            Call::ClearColor([1.0, 0.2, 0.7, 1.0]),
            Call::Clear(ClearMask::COLOR | ClearMask::DEPTH),
        ];
        assert_eq!(driver.gl().take(), [frame.clone(), frame].concat());
    }

    #[test]
    fn failed_swap_skips_redisplay() {
        struct Lost;

        impl Present for Lost {
            fn swap_buffers(&self) -> Result<()> {
                Err(Error::Window("surface lost".into()))
            }

            fn request_redisplay(&self) {
                panic!("redisplay after failed swap");
            }
        }

        let mut driver = Driver::new(Recorder::default());
        assert!(driver.on_display(&Lost).is_err());
    }

    #[test]
    fn capability_check_needs_loaded_functions() {
        let mut driver = Driver::new(Recorder::default());
        assert!(matches!(driver.check_capability(), Err(Error::Loader)));
        assert_eq!(driver.stage(), Stage::LoaderFailed);
    }

    #[test]
    fn no_version_string_fails_loading() {
        let mut driver = Driver::new(Recorder::default());
        let mut out = Vec::new();
        assert!(matches!(driver.startup(&mut out), Err(Error::Loader)));
        assert!(out.is_empty());
        assert_eq!(driver.capabilities(), None);
    }
}
