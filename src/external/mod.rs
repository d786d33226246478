pub mod ton_api;

pub use ton_api::*;
