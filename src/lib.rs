//! Opens a window with an OpenGL context, checks the loaded OpenGL version and
//! clears the window in a continuous redraw loop.
//!
//! The program is split in two halves. The [`driver`] holds the logic: the
//! startup checks, the framebuffer size and the resize/display callbacks, all
//! written against the [`GlCommands`] trait. The [`app`] module drives a
//! [`winit`] event loop, creates the [`glutin`] display, context and surface,
//! and forwards window events into the driver.
//!
//! [`GlCommands`]: crate::renderer::GlCommands

#![deny(rust_2018_idioms)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(clippy::all)]

pub mod app;
pub mod config;
pub mod driver;
pub mod error;
pub mod loader;
pub mod renderer;
pub mod version;

pub mod gl {
    #![allow(clippy::all, rust_2018_idioms)]
    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

pub use crate::app::run;
pub use crate::config::Config;
pub use crate::driver::{Callbacks, Driver, Present, Stage};
pub use crate::error::{Error, Result};
pub use crate::version::GlVersion;

#[cfg(all(not(egl_backend), not(glx_backend), not(wgl_backend), not(cgl_backend)))]
compile_error!("Please select at least one api backend");
