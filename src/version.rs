//! OpenGL version numbers as the loader reports them.

use std::fmt;

/// Prefixes OpenGL ES implementations put in front of the `GL_VERSION`
/// string.
const ES_PREFIXES: [&str; 3] = ["OpenGL ES-CM ", "OpenGL ES-CL ", "OpenGL ES "];

/// A decoded `major.minor` OpenGL version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
}

impl GlVersion {
    /// Create a new version.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Decode an `major * 10 + minor` value.
    ///
    /// Returns `None` for `0`, which the loader uses to signal failure, and
    /// for values which can't be a version.
    pub fn from_encoded(encoded: i32) -> Option<Self> {
        if encoded <= 0 || encoded / 10 > i32::from(u8::MAX) {
            return None;
        }

        Some(Self::new((encoded / 10) as u8, (encoded % 10) as u8))
    }

    /// The `major * 10 + minor` form of the version.
    ///
    /// Lossy for minor versions of 10 and above: `4.10` encodes as `50`.
    pub fn encoded(&self) -> i32 {
        i32::from(self.major) * 10 + i32::from(self.minor)
    }

    /// Parse the leading `<major>.<minor>` of a `GL_VERSION` string.
    ///
    /// OpenGL ES prefixes are skipped and everything after the minor number
    /// (release number, vendor information) is ignored. A missing minor number
    /// reads as `0`. Strings without a leading major number, and `0.0`, yield
    /// `None`.
    pub fn parse(version: &str) -> Option<Self> {
        let version = ES_PREFIXES
            .iter()
            .find_map(|prefix| version.strip_prefix(prefix))
            .unwrap_or(version)
            .trim_start();

        let (major, rest) = split_number(version)?;
        let minor = rest.strip_prefix('.').and_then(split_number).map_or(0, |(minor, _)| minor);

        let version = Self::new(major, minor);
        (version.encoded() != 0).then_some(version)
    }

    /// Whether this version provides the feature set of `major.minor`.
    pub fn supports(&self, major: u8, minor: u8) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn split_number(text: &str) -> Option<(u8, &str)> {
    let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    let number = text[..end].parse().ok()?;
    Some((number, &text[end..]))
}
