//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};
use crate::render::ShaderStage;
use crate::settings::ApiType;

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::Backend("glCreateBuffer failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("glCreateBuffer failed"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("vertex array has no index buffer".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("no index buffer"));
}

#[test]
fn test_shader_compilation_display_names_stage() {
    let err = Error::ShaderCompilation {
        stage: ShaderStage::Fragment,
        log: "0:3(1): error: syntax error".to_string(),
    };
    let display = format!("{}", err);
    assert!(display.contains("Fragment"));
    assert!(display.contains("syntax error"));
}

#[test]
fn test_unsupported_display_names_backend_and_operation() {
    let err = Error::Unsupported {
        api: ApiType::Vulkan,
        operation: "create_texture",
    };
    let display = format!("{}", err);
    assert!(display.contains("create_texture"));
    assert!(display.contains("Vulkan"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_keeps_message() {
    let err = Error::ShaderLink("undefined varying".to_string());
    let cloned = err.clone();
    assert_eq!(format!("{}", err), format!("{}", cloned));
}

#[test]
fn test_result_question_mark_propagates() {
    fn inner() -> Result<u32> {
        Err(Error::ShaderSource("missing newline".to_string()))
    }
    fn outer() -> Result<u32> {
        let value = inner()?;
        Ok(value + 1)
    }
    assert!(matches!(outer(), Err(Error::ShaderSource(_))));
}
