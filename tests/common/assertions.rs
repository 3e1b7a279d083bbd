//! Custom assertion macros and utilities
//!
//! Provides assertion macros for sync-core tests with descriptive failure
//! messages.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

/// Assert the statuses of the events received so far, in order
#[macro_export]
macro_rules! assert_events {
    ($receiver:expr, [$($status:expr),* $(,)?]) => {
        let received = $crate::common::received_statuses(&mut $receiver);
        let expected: Vec<timetrack::shared::SyncStatus> = vec![$($status),*];
        pretty_assertions::assert_eq!(received, expected, "unexpected sync events");
    };
}

/// Assert that a cache record carries the pending marker
#[macro_export]
macro_rules! assert_pending {
    ($record:expr) => {
        assert!(
            timetrack::shared::project::is_pending(&$record),
            "Expected pendingSync on {}",
            $record
        );
    };
    ($record:expr, false) => {
        assert!(
            !timetrack::shared::project::is_pending(&$record),
            "Expected no pendingSync on {}",
            $record
        );
    };
}
