pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Board, Fetch, History, Init, Post, Version};
