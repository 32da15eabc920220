// Game engine modules

pub mod board;
pub mod engine;
pub mod table;
pub mod turn;

pub use board::Board;
pub use engine::GameEngine;
pub use table::GameTable;
pub use turn::TurnPolicy;
