pub mod board;
pub mod debounce;
pub mod drag;
pub mod notes;
pub mod store;
pub mod undo;
pub mod visibility;

pub use board::{Board, BoardOptions, DropOutcome, TickReport};
pub use undo::{UNDO_STACK_LIMIT, UndoKind, UndoReport};
