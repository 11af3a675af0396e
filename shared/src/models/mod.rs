pub mod character;
pub mod settings;
pub mod story;

pub use character::*;
pub use settings::*;
pub use story::*;
