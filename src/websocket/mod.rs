pub mod handler;
pub mod messages;

pub use handler::{broadcast_state, handle_websocket};
