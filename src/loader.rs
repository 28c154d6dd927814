//! Entry point resolution and version detection.

use std::ffi::CString;

use glutin::display::GlDisplay;
use log::{debug, warn};

use crate::gl;
use crate::renderer::{GlCommands, GlString};
use crate::version::GlVersion;

/// Core versions with a capability flag, oldest first.
pub const KNOWN_VERSIONS: [GlVersion; 19] = [
    GlVersion::new(1, 0),
    GlVersion::new(1, 1),
    GlVersion::new(1, 2),
    GlVersion::new(1, 3),
    GlVersion::new(1, 4),
    GlVersion::new(1, 5),
    GlVersion::new(2, 0),
    GlVersion::new(2, 1),
    GlVersion::new(3, 0),
    GlVersion::new(3, 1),
    GlVersion::new(3, 2),
    GlVersion::new(3, 3),
    GlVersion::new(4, 0),
    GlVersion::new(4, 1),
    GlVersion::new(4, 2),
    GlVersion::new(4, 3),
    GlVersion::new(4, 4),
    GlVersion::new(4, 5),
    GlVersion::new(4, 6),
];

/// Resolve every generated entry point through the display.
///
/// The context the functions will be called with must be current.
pub fn load_with<D: GlDisplay>(gl_display: &D) -> gl::Gl {
    let mut missing = 0usize;
    let gl = gl::Gl::load_with(|symbol| {
        let address = match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()),
            Err(_) => std::ptr::null(),
        };
        if address.is_null() {
            missing += 1;
        }
        address.cast()
    });

    if missing > 0 {
        debug!("{missing} GL symbol lookups failed");
    }

    gl
}

/// Detect the version of the loaded functions as `major * 10 + minor`.
///
/// `0` means loading failed: `glGetString` is missing or the version string
/// could not be read.
pub fn load_version<G: GlCommands + ?Sized>(gl: &G) -> i32 {
    let Some(version) = gl.get_string(GlString::Version) else {
        warn!("glGetString(GL_VERSION) returned nothing");
        return 0;
    };

    match GlVersion::parse(&version) {
        Some(parsed) => parsed.encoded(),
        None => {
            warn!("unrecognized GL_VERSION string {version:?}");
            0
        },
    }
}

/// Per-version capability flags derived from the loaded version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    version: GlVersion,
}

impl Capabilities {
    pub fn new(version: GlVersion) -> Self {
        Self { version }
    }

    /// The version the flags were derived from.
    pub fn version(&self) -> GlVersion {
        self.version
    }

    /// Whether the flag for `major.minor` is set.
    ///
    /// Only versions in [`KNOWN_VERSIONS`] have a flag.
    pub fn has(&self, major: u8, minor: u8) -> bool {
        KNOWN_VERSIONS.contains(&GlVersion::new(major, minor))
            && self.version.supports(major, minor)
    }

    /// The OpenGL 2.0 flag.
    pub fn gl_2_0(&self) -> bool {
        self.has(2, 0)
    }

    /// All set flags, oldest first.
    pub fn supported(&self) -> impl Iterator<Item = GlVersion> + '_ {
        KNOWN_VERSIONS.iter().copied().filter(move |known| self.version.supports(known.major, known.minor))
    }
}
