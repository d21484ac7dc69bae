//! External chess engine connector
//!
//! Drives a UCI-speaking engine over a line channel. The game loop calls
//! [`EngineSession::query_next_move`] once per engine turn and blocks on the
//! answer, which is acceptable because play is strictly turn based.
//!
//! # Protocol
//!
//! ```text
//! <- Stockfish 16 by the Stockfish developers
//! -> setoption name Skill Level value 5
//! -> isready
//! <- readyok
//! -> position startpos moves e2e4
//! -> go
//! <- info depth 10 ...
//! <- bestmove e7e5 ponder g1f3
//! -> quit
//! ```

pub mod channel;
pub mod error;
pub mod protocol;
pub mod session;

pub use channel::{ChildProcessChannel, LineChannel, ScriptedChannel, Transcript};
pub use error::{EngineError, EngineResult};
pub use protocol::EngineReply;
pub use session::EngineSession;
