//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: PostgreSQL container with automatic cleanup (feature: "postgres")
//! - `TestDataBuilder`: deterministic test data
//! - `assertions`: assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore] // Requires Docker
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let actor = builder.actor_id();
//!     let title = builder.title("list", "main");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Deterministic test data derived from a seed.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seeds from the test name, so each test gets stable but distinct data.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_list");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A positive user id, stable for this seed.
    pub fn actor_id(&self) -> i64 {
        (self.seed % i32::MAX as u64) as i64 + 1
    }

    /// A title unique to this seed.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.title("list", "main"), "test-list-7-main");
    /// ```
    pub fn title(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

/// Test assertion helpers
pub mod assertions {
    use std::fmt::Debug;

    /// Unwraps a `Some`, naming what was expected on failure.
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Unwraps an `Ok`, printing the error on failure.
    pub fn assert_ok<T, E: Debug>(value: Result<T, E>, context: &str) -> T {
        value.unwrap_or_else(|e| panic!("{}: expected Ok, got {:?}", context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.actor_id(), builder2.actor_id());
        assert_eq!(builder1.title("list", "a"), builder2.title("list", "a"));
    }

    #[test]
    fn test_actor_id_is_positive() {
        assert!(TestDataBuilder::new(0).actor_id() >= 1);
        assert!(TestDataBuilder::new(u64::MAX).actor_id() >= 1);
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.title("list", "a"), builder2.title("list", "a"));
    }

    #[test]
    #[should_panic(expected = "missing row: expected Some")]
    fn test_assert_some_panics_with_context() {
        assertions::assert_some::<i64>(None, "missing row");
    }
}
