pub mod column;
pub mod config;
pub mod feature;
pub mod icon;
pub mod project;
pub mod user;
pub mod view;

pub use column::Column;
pub use config::*;
pub use feature::*;
pub use icon::IconKey;
pub use project::*;
pub use user::*;
pub use view::*;
