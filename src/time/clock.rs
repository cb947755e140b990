use chrono::NaiveDateTime;

/// A port that provides the **current time** for the application.
///
/// Repositories stamp `inserted_at` / `updated_at` through this trait, so
/// persistence logic does not read the system clock directly and tests can
/// pin time to a known value.
///
/// # Typical Implementations
/// - [`SystemClock`](crate::time::system_clock::SystemClock): the OS clock, in UTC
/// - `FixedClock`: returns a constant instant (for testing)
pub trait Clock: Send + Sync {
    /// Returns the current instant as a UTC [`NaiveDateTime`].
    fn now(&self) -> NaiveDateTime;
}
