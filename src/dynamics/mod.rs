//! Numeric integration primitives: a generic RK4 step and the spring-damper
//! acceleration functions the chain trackers use.

mod rk4;
mod spring;

pub use rk4::{rk4, Interpolatable};
pub use spring::{AdditionMode, SpringDamper, Tracked};
