pub mod fake_driver;
pub mod fixtures;

pub use fake_driver::FakeDriver;
