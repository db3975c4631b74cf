//! Outbound admission control for the upstream API.

pub mod sliding_window;

pub use sliding_window::SlidingWindowLimiter;
