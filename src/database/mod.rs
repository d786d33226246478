pub mod connection;
#[cfg(test)]
pub(crate) mod mock;

pub use connection::*;
