pub mod controller;
pub mod state;

pub use controller::{Offer, PromptController};
pub use state::{PromptSnapshot, PromptStatus};
