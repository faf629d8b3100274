pub mod awg;
pub mod geocache;
pub mod geocoding;
pub mod metrics;
pub mod rainfall;
pub mod solar;
