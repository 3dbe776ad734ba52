pub mod filter;
pub mod joiner;
pub mod locator;
pub mod model;
pub mod probe;
