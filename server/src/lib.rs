pub mod config;
pub mod http;
pub mod proxy;

#[cfg(test)]
mod testing;
