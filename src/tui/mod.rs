pub mod app;
pub mod input;
pub mod keymap;
pub mod mouse;
pub mod render;
pub mod theme;

pub use app::run;
