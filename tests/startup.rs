use std::cell::{Cell, RefCell};

use cookie::driver::{Callbacks, Driver, Present, Stage};
use cookie::renderer::{ClearMask, Color, GlCommands, GlString};
use cookie::{Error, GlVersion, Result};

/// GL commands answering string queries from a script and counting state
/// changes.
#[derive(Default)]
struct ScriptedGl {
    version: Option<&'static str>,
    glsl: Option<&'static str>,
    queries: RefCell<Vec<GlString>>,
    depth_test_enabled: Cell<bool>,
    clear_depth: Cell<Option<f64>>,
    viewport: Cell<Option<(i32, i32, i32, i32)>>,
    clears: Cell<usize>,
}

impl ScriptedGl {
    fn new(version: Option<&'static str>, glsl: Option<&'static str>) -> Self {
        Self { version, glsl, ..Default::default() }
    }
}

impl GlCommands for ScriptedGl {
    fn clear_color(&self, _: Color) {}

    fn clear_depth(&self, depth: f64) {
        self.clear_depth.set(Some(depth));
    }

    fn clear(&self, _: ClearMask) {
        self.clears.set(self.clears.get() + 1);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport.set(Some((x, y, width, height)));
    }

    fn enable_depth_test(&self) {
        self.depth_test_enabled.set(true);
    }

    fn get_string(&self, name: GlString) -> Option<String> {
        self.queries.borrow_mut().push(name);
        match name {
            GlString::Version => self.version,
            GlString::ShadingLanguageVersion => self.glsl,
            GlString::Vendor | GlString::Renderer => None,
        }
        .map(str::to_owned)
    }
}

struct NullWindow;

impl Present for NullWindow {
    fn swap_buffers(&self) -> Result<()> {
        Ok(())
    }

    fn request_redisplay(&self) {}
}

fn startup(gl: ScriptedGl) -> (Driver<ScriptedGl>, Result<GlVersion>, String) {
    let mut driver = Driver::new(gl);
    let mut out = Vec::new();
    let result = driver.startup(&mut out);
    (driver, result, String::from_utf8(out).unwrap())
}

#[test]
fn reports_versions_on_success() {
    let gl = ScriptedGl::new(Some("3.3.0 NVIDIA 535.54.03"), Some("3.30 NVIDIA via Cg compiler"));
    let (mut driver, result, out) = startup(gl);

    assert_eq!(result.unwrap(), GlVersion::new(3, 3));
    assert_eq!(
        out,
        "OpenGL 3.3\nOpenGL 3.3.0 NVIDIA 535.54.03, GLSL 3.30 NVIDIA via Cg compiler\n"
    );
    assert_eq!(driver.stage(), Stage::CapabilityOk(GlVersion::new(3, 3)));
    assert!(driver.capabilities().unwrap().has(3, 3));

    driver.enter_event_loop();
    assert_eq!(driver.stage(), Stage::EventLoopRunning(GlVersion::new(3, 3)));
}

#[test]
fn es_contexts_report_the_stripped_version() {
    let gl = ScriptedGl::new(Some("OpenGL ES 3.2 Mesa 23.1.4"), Some("OpenGL ES GLSL ES 3.20"));
    let (_, result, out) = startup(gl);

    assert_eq!(result.unwrap(), GlVersion::new(3, 2));
    assert!(out.starts_with("OpenGL 3.2\n"));
}

#[test]
fn loader_failure_stops_before_capability_check() {
    let (driver, result, out) = startup(ScriptedGl::new(None, Some("1.10")));

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Loader));
    assert_eq!(err.to_string(), "Something went wrong!");
    assert_ne!(err.exit_code(), 0);
    assert!(out.is_empty());
    assert_eq!(driver.stage(), Stage::LoaderFailed);
    // Only the version was queried, the GLSL string never was.
    assert_eq!(*driver.gl().queries.borrow(), vec![GlString::Version]);
}

#[test]
fn old_gl_fails_the_capability_check() {
    let (driver, result, out) = startup(ScriptedGl::new(Some("1.4 Mesa 7.0"), None));

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Capability { version } if version == GlVersion::new(1, 4)));
    assert_eq!(err.to_string(), "Your system doesn't support OpenGL >= 2!");
    assert_ne!(err.exit_code(), 0);
    // The decoded version is still printed first.
    assert_eq!(out, "OpenGL 1.4\n");
    assert_eq!(driver.stage(), Stage::CapabilityFailed(GlVersion::new(1, 4)));
}

#[test]
fn exactly_2_0_passes() {
    let (_, result, out) = startup(ScriptedGl::new(Some("2.0"), Some("1.10")));

    assert_eq!(result.unwrap(), GlVersion::new(2, 0));
    assert_eq!(out, "OpenGL 2.0\nOpenGL 2.0, GLSL 1.10\n");
}

#[test]
fn callbacks_after_startup() {
    let (mut driver, result, _) = startup(ScriptedGl::new(Some("4.6"), Some("4.60")));
    result.unwrap();
    driver.enter_event_loop();

    driver.on_resize(1024, 0);
    assert_eq!((driver.width(), driver.height()), (1024, 1));
    assert_eq!(driver.gl().viewport.get(), Some((0, 0, 1024, 1)));
    assert_eq!(driver.gl().clear_depth.get(), Some(1.0));
    assert!(driver.gl().depth_test_enabled.get());

    for _ in 0..3 {
        driver.on_display(&NullWindow).unwrap();
    }
    assert_eq!(driver.gl().clears.get(), 3);
}
