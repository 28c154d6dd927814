//! The handful of GL commands the render loop issues.
//!
//! The driver talks to OpenGL only through [`GlCommands`], so its logic can be
//! exercised without a context. [`Renderer`] is the implementation backed by
//! the loaded function table.

use std::ffi::CStr;
use std::fmt;

use bitflags::bitflags;

use crate::gl;
use crate::gl::types::{GLenum, GLfloat};

/// An RGBA clear color.
pub type Color = [GLfloat; 4];

bitflags! {
    /// Buffers cleared by [`GlCommands::clear`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearMask: u32 {
        /// `GL_COLOR_BUFFER_BIT`.
        const COLOR = gl::COLOR_BUFFER_BIT;
        /// `GL_DEPTH_BUFFER_BIT`.
        const DEPTH = gl::DEPTH_BUFFER_BIT;
    }
}

/// Strings that can be queried with `glGetString`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlString {
    Vendor,
    Renderer,
    Version,
    ShadingLanguageVersion,
}

impl GlString {
    fn as_raw(self) -> GLenum {
        match self {
            GlString::Vendor => gl::VENDOR,
            GlString::Renderer => gl::RENDERER,
            GlString::Version => gl::VERSION,
            GlString::ShadingLanguageVersion => gl::SHADING_LANGUAGE_VERSION,
        }
    }
}

/// GL state changes and queries used by the driver.
///
/// All methods assume the context owning the functions is current on the
/// calling thread.
pub trait GlCommands {
    /// `glClearColor`.
    fn clear_color(&self, color: Color);

    /// `glClearDepth`.
    fn clear_depth(&self, depth: f64);

    /// `glClear`.
    fn clear(&self, mask: ClearMask);

    /// `glViewport`.
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);

    /// `glEnable(GL_DEPTH_TEST)`.
    fn enable_depth_test(&self);

    /// `glGetString`, `None` when the entry point is missing or the driver
    /// returned a null pointer.
    fn get_string(&self, name: GlString) -> Option<String>;
}

/// [`GlCommands`] over the generated function table.
pub struct Renderer {
    gl: gl::Gl,
}

impl Renderer {
    pub fn new(gl: gl::Gl) -> Self {
        Self { gl }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer").field("get_string_loaded", &self.gl.GetString.is_loaded()).finish()
    }
}

impl GlCommands for Renderer {
    fn clear_color(&self, [red, green, blue, alpha]: Color) {
        unsafe { self.gl.ClearColor(red, green, blue, alpha) }
    }

    fn clear_depth(&self, depth: f64) {
        unsafe { self.gl.ClearDepth(depth) }
    }

    fn clear(&self, mask: ClearMask) {
        unsafe { self.gl.Clear(mask.bits()) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.Viewport(x, y, width, height) }
    }

    fn enable_depth_test(&self) {
        unsafe { self.gl.Enable(gl::DEPTH_TEST) }
    }

    fn get_string(&self, name: GlString) -> Option<String> {
        if !self.gl.GetString.is_loaded() {
            return None;
        }

        unsafe {
            let s = self.gl.GetString(name.as_raw());
            (!s.is_null()).then(|| CStr::from_ptr(s.cast()).to_string_lossy().into_owned())
        }
    }
}
