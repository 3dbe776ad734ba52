pub mod config;

#[cfg(test)]
pub mod canned_http;
