mod driver;

pub use driver::RedisDriver;
