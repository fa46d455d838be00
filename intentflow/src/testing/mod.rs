//! Testing utilities: mock stages with call tracking, canned failures,
//! and configurable delays.

mod mocks;

pub use mocks::{FailingStage, MockStage, ProducerStage, SlowStage};
