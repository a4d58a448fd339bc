pub mod types;
pub mod error;
pub mod board;
pub mod movegen;
pub mod attacks;
pub mod executor;
pub mod notation;
pub mod store;
pub mod config;
pub mod controller;
pub mod replay;

pub use types::*;
pub use error::{BoardError, ConfigError, MoveError, NotationError, StoreError};
pub use board::BoardState;
pub use movegen::MoveGenerator;
pub use attacks::{is_attacked, is_in_check, AttackMap, SquareSet};
pub use executor::{ApplyOutcome, AppliedMove};
pub use notation::RecordedMove;
pub use store::{GameId, GameRecord, GameSummary, InMemoryStore, JsonFileStore, MatchStore, PlayerId};
pub use config::Config;
pub use controller::{IgnoreReason, MatchContext, Selection, TurnController, TurnEvent, TurnState};
pub use replay::Replay;
