use chrono::Utc;

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// System frozen at a fixed timestamp, for tests of lead-time and
/// skew-validation logic
pub struct StaticSys(pub i64);
impl ISys for StaticSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}
