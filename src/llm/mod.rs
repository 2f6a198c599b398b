pub mod client;
pub mod forecasting;
pub mod prompts;
pub mod types;

pub use client::*;
pub use forecasting::*;
pub use types::*;
