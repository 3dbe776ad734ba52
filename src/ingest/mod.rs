pub mod delimited;
pub mod fetch;
