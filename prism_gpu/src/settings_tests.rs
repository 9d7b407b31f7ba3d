//! Unit tests for settings.rs

use crate::settings::{best_api, ApiType, Settings};
use crate::log::LogSeverity;
use std::sync::Arc;

#[test]
fn test_guess_resolves_to_best_api() {
    assert_eq!(ApiType::Guess.resolve(), best_api());
    assert_eq!(best_api(), ApiType::OpenGl);
}

#[test]
fn test_concrete_apis_resolve_to_themselves() {
    for api in [ApiType::Headless, ApiType::OpenGl, ApiType::Vulkan] {
        assert_eq!(api.resolve(), api);
    }
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.preferred_api, ApiType::Guess);
    assert_eq!(settings.enable_validation, cfg!(debug_assertions));
    assert!(settings.message_func.is_none());
    assert_eq!(settings.frames_in_flight, 2);
}

#[test]
fn test_resolved_settings_never_contain_guess() {
    let settings = Settings {
        preferred_api: ApiType::Guess,
        blending: false,
        ..Settings::default()
    };
    let resolved = settings.resolved();
    assert_eq!(resolved.preferred_api, ApiType::OpenGl);
    assert!(!resolved.blending);
    // the original is left untouched
    assert_eq!(settings.preferred_api, ApiType::Guess);
}

#[test]
fn test_resolved_settings_keep_at_least_one_frame_in_flight() {
    let settings = Settings { frames_in_flight: 0, ..Settings::default() };
    assert_eq!(settings.resolved().frames_in_flight, 1);
}

#[test]
fn test_resolved_settings_keep_message_callback() {
    let settings = Settings {
        message_func: Some(Arc::new(|_: &str, _: LogSeverity| {})),
        ..Settings::default()
    };
    assert!(settings.resolved().message_func.is_some());
}

#[test]
fn test_api_display_names() {
    assert_eq!(ApiType::OpenGl.to_string(), "OpenGL");
    assert_eq!(ApiType::Vulkan.to_string(), "Vulkan");
    assert_eq!(ApiType::Headless.to_string(), "Headless");
}

#[test]
fn test_settings_debug_hides_callback() {
    let settings = Settings {
        message_func: Some(Arc::new(|_: &str, _: LogSeverity| {})),
        ..Settings::default()
    };
    assert!(format!("{:?}", settings).contains("<callback>"));
}
