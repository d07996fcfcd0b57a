pub mod discover;
pub mod engine;
pub mod error;
pub mod io;
pub mod model;
pub mod parse;
