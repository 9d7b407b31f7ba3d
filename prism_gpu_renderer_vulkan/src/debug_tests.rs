//! Unit tests for the validation message routing

use ash::vk;
use prism_gpu::prism::log::LogSeverity;
use serial_test::serial;

use crate::debug::*;

#[test]
fn test_severity_mapping() {
    use vk::DebugUtilsMessageSeverityFlagsEXT as S;
    assert_eq!(severity_to_log(S::VERBOSE), LogSeverity::Trace);
    assert_eq!(severity_to_log(S::INFO), LogSeverity::Info);
    assert_eq!(severity_to_log(S::WARNING), LogSeverity::Warn);
    assert_eq!(severity_to_log(S::ERROR), LogSeverity::Error);
    assert_eq!(severity_to_log(S::WARNING | S::ERROR), LogSeverity::Error);
}

#[test]
fn test_message_type_names() {
    use vk::DebugUtilsMessageTypeFlagsEXT as T;
    assert_eq!(message_type_name(T::VALIDATION), "Validation");
    assert_eq!(message_type_name(T::PERFORMANCE), "Performance");
    assert_eq!(message_type_name(T::GENERAL), "General");
}

#[test]
#[serial]
fn test_stats_count_per_severity_and_repeats() {
    reset_validation_stats();
    assert_eq!(get_validation_stats().total(), 0);

    assert_eq!(record_message(LogSeverity::Error, "bad layout"), 1);
    assert_eq!(record_message(LogSeverity::Error, "bad layout"), 2);
    record_message(LogSeverity::Warn, "slow path");
    record_message(LogSeverity::Trace, "loader message");

    let stats = get_validation_stats();
    assert_eq!(stats, ValidationStats { errors: 2, warnings: 1, info: 0, verbose: 1 });
    assert_eq!(stats.total(), 4);

    reset_validation_stats();
    assert_eq!(record_message(LogSeverity::Error, "bad layout"), 1);
    reset_validation_stats();
}

#[test]
#[serial]
fn test_repeat_tracker_is_capped() {
    reset_validation_stats();
    for index in 0..MAX_TRACKED_MESSAGES + 10 {
        assert_eq!(record_message(LogSeverity::Warn, &format!("message {}", index)), 1);
    }
    assert_eq!(tracked_messages(), MAX_TRACKED_MESSAGES);
    assert_eq!(get_validation_stats().warnings as usize, MAX_TRACKED_MESSAGES + 10);

    // Tracked texts keep counting, untracked ones stay at 1
    assert_eq!(record_message(LogSeverity::Warn, "message 0"), 2);
    assert_eq!(record_message(LogSeverity::Warn, &format!("message {}", MAX_TRACKED_MESSAGES + 5)), 1);
    assert_eq!(tracked_messages(), MAX_TRACKED_MESSAGES);
    reset_validation_stats();
}

#[test]
#[serial]
fn test_release_message_tracker_keeps_counters() {
    reset_validation_stats();
    record_message(LogSeverity::Error, "bad layout");
    record_message(LogSeverity::Error, "bad layout");
    assert_eq!(tracked_messages(), 1);

    release_message_tracker();
    assert_eq!(tracked_messages(), 0);
    assert_eq!(get_validation_stats().errors, 2);
    reset_validation_stats();
}
