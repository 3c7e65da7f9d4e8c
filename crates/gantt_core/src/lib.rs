pub mod completion;
pub mod config;
pub mod error;
pub mod extract;
pub mod font;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod render;
