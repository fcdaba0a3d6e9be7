pub mod cells;
pub mod clock;
pub mod ids;
pub mod jwt;
pub mod tracing;
