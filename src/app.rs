//! Adapter between the `winit` event loop and the [`Driver`] callbacks.

use std::io;
use std::num::NonZeroU32;

use log::{debug, info, warn};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use glutin::config::{Config as GlConfig, GetGlConfig, GlConfig as _};
use glutin::context::{ContextApi, ContextAttributesBuilder, NotCurrentContext, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};

use glutin_winit::{DisplayBuilder, GlWindow};

use crate::config::Config;
use crate::driver::{Callbacks, Driver, Present};
use crate::error::{Error, Result};
use crate::loader;
use crate::renderer::Renderer;

/// Open the window and run the render loop until it is asked to exit.
///
/// Startup failures end the loop and are returned here.
pub fn run(event_loop: EventLoop<()>, config: Config) -> Result<()> {
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    app.exit_state()
}

struct App {
    config: Config,
    state: Option<AppState>,
    exit_state: Result<()>,
}

impl App {
    fn new(config: Config) -> Self {
        Self { config, state: Some(AppState::Uninitialized), exit_state: Ok(()) }
    }

    fn exit_state(self) -> Result<()> {
        self.exit_state
    }

    fn transition<F: FnOnce(AppState, &Config) -> Result<AppState>>(
        &mut self,
        event_loop: &ActiveEventLoop,
        f: F,
    ) {
        let Some(state) = self.state.take() else {
            // Already failed, the loop is on its way out.
            return;
        };

        match f(state, &self.config) {
            Ok(state) => self.state = Some(state),
            Err(error) => {
                event_loop.exit();
                self.exit_state = Err(error);
            },
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.transition(event_loop, |state, config| match state {
            AppState::Uninitialized => initialize(event_loop, config).map(AppState::Running),
            AppState::Running(state) => Ok(AppState::Running(state)),
            AppState::Suspended(state) => state.resume(event_loop, config).map(AppState::Running),
        });
    }

    fn suspended(&mut self, event_loop: &ActiveEventLoop) {
        self.transition(event_loop, |state, _| match state {
            AppState::Running(state) => state.suspend().map(AppState::Suspended),
            state => Ok(state),
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.transition(event_loop, |mut state, _| {
                    // A suspended driver has no current context, `resume` resizes
                    // it again.
                    if let AppState::Running(state) = &mut state {
                        state.resize(size);
                    }
                    Ok(state)
                });
            },
            WindowEvent::RedrawRequested => {
                self.transition(event_loop, |mut state, _| {
                    if let AppState::Running(state) = &mut state {
                        state.redraw()?;
                    }
                    Ok(state)
                });
            },
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent { logical_key: Key::Named(NamedKey::Escape), .. },
                ..
            } => {
                debug!("exit requested");
                event_loop.exit()
            },
            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let gl_display = match self.state.take() {
            Some(AppState::Running(AppStateRunning { driver, gl_context, gl_surface, window })) => {
                drop(driver);
                drop(gl_surface);
                drop(window);
                Some(gl_context.display())
            },
            Some(AppState::Suspended(AppStateSuspended { driver, gl_context })) => {
                drop(driver);
                Some(gl_context.display())
            },
            Some(AppState::Uninitialized) | None => None,
        };

        #[cfg(egl_backend)]
        #[allow(irrefutable_let_patterns)]
        if let Some(glutin::display::Display::Egl(display)) = gl_display {
            unsafe {
                display.terminate();
            }
        }
        #[cfg(not(egl_backend))]
        drop(gl_display);
    }
}

enum AppState {
    Uninitialized,
    Running(AppStateRunning),
    Suspended(AppStateSuspended),
}

/// Create the window and context, then run the startup checks.
fn initialize(event_loop: &ActiveEventLoop, config: &Config) -> Result<AppStateRunning> {
    let display_builder =
        DisplayBuilder::new().with_window_attributes(Some(config.window_attributes()));
    let (window, gl_config) =
        display_builder.build(event_loop, config.config_template(), gl_config_picker)?;
    let window = window.ok_or_else(|| Error::Window("no window was created".into()))?;
    info!(
        "picked a config with {} depth bits and {} alpha bits",
        gl_config.depth_size(),
        gl_config.alpha_size()
    );

    let gl_context = create_gl_context(&window, &gl_config)?;
    let gl_surface = create_gl_surface(&window, &gl_config)?;
    let gl_context = gl_context.make_current(&gl_surface)?;
    if config.vsync {
        enable_vsync(&gl_surface, &gl_context);
    }

    let mut driver = Driver::new(Renderer::new(loader::load_with(&gl_config.display())));
    driver.startup(&mut io::stdout().lock())?;
    driver.enter_event_loop();

    let mut state = AppStateRunning { driver, gl_context, gl_surface, window };
    state.resize(state.window.inner_size());
    state.window.request_redraw();
    Ok(state)
}

struct AppStateRunning {
    driver: Driver<Renderer>,
    gl_context: PossiblyCurrentContext,
    // Must go before `window`, which owns the native handle.
    gl_surface: Surface<WindowSurface>,
    window: Window,
}

impl AppStateRunning {
    fn suspend(self) -> Result<AppStateSuspended> {
        let AppStateRunning { driver, gl_context, gl_surface, window } = self;
        debug!("window removed, keeping the context");
        drop(gl_surface);
        drop(window);
        let gl_context = gl_context.make_not_current()?;
        Ok(AppStateSuspended { driver, gl_context })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        // EGL, Wayland and macOS need the surface resized explicitly, it's a
        // no-op elsewhere.
        if let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        {
            self.gl_surface.resize(&self.gl_context, width, height);
        }

        self.driver.on_resize(clamp_dimension(size.width), clamp_dimension(size.height));
    }

    fn redraw(&mut self) -> Result<()> {
        self.window.pre_present_notify();
        let target = SurfaceTarget {
            gl_context: &self.gl_context,
            gl_surface: &self.gl_surface,
            window: &self.window,
        };
        self.driver.on_display(&target)
    }
}

struct AppStateSuspended {
    driver: Driver<Renderer>,
    gl_context: NotCurrentContext,
}

impl AppStateSuspended {
    fn resume(self, event_loop: &ActiveEventLoop, config: &Config) -> Result<AppStateRunning> {
        let AppStateSuspended { driver, gl_context } = self;
        debug!("recreating the window");

        // Pick the config which we already use for the context.
        let gl_config = gl_context.config();
        let window =
            glutin_winit::finalize_window(event_loop, config.window_attributes(), &gl_config)?;
        let gl_surface = create_gl_surface(&window, &gl_config)?;
        let gl_context = gl_context.make_current(&gl_surface)?;
        if config.vsync {
            enable_vsync(&gl_surface, &gl_context);
        }

        let mut state = AppStateRunning { driver, gl_context, gl_surface, window };
        state.resize(state.window.inner_size());
        state.window.request_redraw();
        Ok(state)
    }
}

/// The surface of a running window as a [`Present`] target.
struct SurfaceTarget<'a> {
    gl_context: &'a PossiblyCurrentContext,
    gl_surface: &'a Surface<WindowSurface>,
    window: &'a Window,
}

impl Present for SurfaceTarget<'_> {
    fn swap_buffers(&self) -> Result<()> {
        self.gl_surface.swap_buffers(self.gl_context)?;
        Ok(())
    }

    fn request_redisplay(&self) {
        self.window.request_redraw();
    }
}

fn create_gl_surface(window: &Window, gl_config: &GlConfig) -> Result<Surface<WindowSurface>> {
    let attrs = window
        .build_surface_attributes(Default::default())
        .map_err(|err| Error::Window(err.to_string()))?;
    let gl_surface = unsafe { gl_config.display().create_window_surface(gl_config, &attrs)? };
    Ok(gl_surface)
}

fn create_gl_context(window: &Window, gl_config: &GlConfig) -> Result<NotCurrentContext> {
    let raw_window_handle = window.window_handle().ok().map(|wh| wh.as_raw());

    let context_attributes = ContextAttributesBuilder::new().build(raw_window_handle);

    // Old drivers may only offer a 2.1 context.
    let legacy_context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(2, 1))))
        .build(raw_window_handle);

    let gl_display = gl_config.display();

    let gl_context = unsafe {
        gl_display.create_context(gl_config, &context_attributes).or_else(|err| {
            warn!("default context creation failed ({err}), trying OpenGL 2.1");
            gl_display.create_context(gl_config, &legacy_context_attributes)
        })?
    };

    Ok(gl_context)
}

fn enable_vsync(gl_surface: &Surface<WindowSurface>, gl_context: &PossiblyCurrentContext) {
    if let Err(err) =
        gl_surface.set_swap_interval(gl_context, SwapInterval::Wait(NonZeroU32::MIN))
    {
        warn!("error setting vsync: {err}");
    }
}

/// Prefer the deepest depth buffer, then the most alpha bits.
fn gl_config_picker(configs: Box<dyn Iterator<Item = GlConfig> + '_>) -> GlConfig {
    configs
        .reduce(|accum, config| {
            if outranks(config_rank(&config), config_rank(&accum)) {
                config
            } else {
                accum
            }
        })
        .expect("the display offered no matching config")
}

fn config_rank(config: &GlConfig) -> (u8, u8) {
    (config.depth_size(), config.alpha_size())
}

/// Depth bits decide first, alpha bits break ties.
fn outranks(candidate: (u8, u8), current: (u8, u8)) -> bool {
    candidate > current
}

fn clamp_dimension(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
