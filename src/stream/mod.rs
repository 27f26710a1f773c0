//! Stream combinators for session event delivery

mod throttle;

pub use throttle::{Throttle, ThrottleExt};
