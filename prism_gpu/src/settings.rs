//! Context configuration
//!
//! `Settings` is supplied by the application once, resolved when a context is
//! created (`Guess` becomes a concrete API) and never mutated afterwards.

use std::fmt;

use crate::log::MessageCallback;

/// GPU API a context runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiType {
    /// No GPU API: windows are created without a client API and the context
    /// only records what it is asked to do
    Headless,
    /// Let the library pick the best API for this platform
    #[default]
    Guess,
    OpenGl,
    Vulkan,
}

impl ApiType {
    /// Replace `Guess` with a concrete API, keep anything else as is
    pub fn resolve(self) -> ApiType {
        match self {
            ApiType::Guess => best_api(),
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ApiType::Headless => "Headless",
            ApiType::Guess => "Guess",
            ApiType::OpenGl => "OpenGL",
            ApiType::Vulkan => "Vulkan",
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The platform-appropriate API picked for `ApiType::Guess`
///
/// OpenGL is the only backend with complete resource support, so it wins everywhere.
pub fn best_api() -> ApiType {
    ApiType::OpenGl
}

/// Context configuration
#[derive(Clone)]
pub struct Settings {
    /// Requested API (`Guess` is resolved at context creation)
    pub preferred_api: ApiType,

    /// Enable the API's validation/debug layers
    pub enable_validation: bool,

    /// Enable alpha blending (SRC_ALPHA, ONE_MINUS_SRC_ALPHA)
    pub blending: bool,

    /// Client log sink; diagnostics go to the console until one is installed
    pub message_func: Option<MessageCallback>,

    /// Number of frames the CPU may record ahead of the GPU (Vulkan)
    pub frames_in_flight: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preferred_api: ApiType::Guess,
            enable_validation: cfg!(debug_assertions),
            blending: true,
            message_func: None,
            frames_in_flight: 2,
        }
    }
}

impl Settings {
    /// Copy of these settings with `Guess` replaced by a concrete API
    pub fn resolved(&self) -> Settings {
        let mut resolved = self.clone();
        resolved.preferred_api = self.preferred_api.resolve();
        resolved.frames_in_flight = self.frames_in_flight.max(1);
        resolved
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("preferred_api", &self.preferred_api)
            .field("enable_validation", &self.enable_validation)
            .field("blending", &self.blending)
            .field("message_func", &self.message_func.as_ref().map(|_| "<callback>"))
            .field("frames_in_flight", &self.frames_in_flight)
            .finish()
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
