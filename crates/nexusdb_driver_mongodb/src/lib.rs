mod driver;

pub use driver::MongoDriver;
