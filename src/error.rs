//////////////////////////
// error.rs
//////////////////////////

use thiserror::Error;

use crate::store::GameId;
use crate::types::{PieceType, Square};

/// Failures while building or applying a move on a board.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("No piece at starting square {0}")]
    NoPieceAtSource(Square),

    #[error("Cannot capture your own piece on {0}")]
    CaptureOwnPiece(Square),

    #[error("Captured piece is not standing on {0}")]
    CaptureMismatch(Square),

    #[error("Rook is not in position for castling on {0}")]
    CastlingRookMissing(Square),

    #[error("Piece on {0} is not a pawn")]
    NotAPawn(Square),

    #[error("Pawn on {0} has not reached its promotion rank")]
    NotOnPromotionRank(Square),

    #[error("Cannot promote to {0}")]
    InvalidPromotion(PieceType),

    #[error("Piece has already been captured")]
    PieceNotAlive,
}

/// Problems with a hand-built board position.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Square {0} is already occupied")]
    Occupied(Square),

    #[error("Invalid number of kings: white={white}, black={black}")]
    TooManyKings { white: usize, black: usize },

    #[error("Board and piece list disagree about {0}")]
    Inconsistent(Square),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("The string specified does not contain a valid square: {0:?}")]
    InvalidSquare(String),

    #[error("Invalid move notation: {0:?}")]
    InvalidMove(String),

    #[error("Invalid promotion piece in {0:?}")]
    InvalidPromotion(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Match store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Match store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown game {0}")]
    UnknownGame(GameId),

    #[error("Game {0} has already finished")]
    AlreadyFinished(GameId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} is not a piece a pawn can promote to")]
    InvalidDefaultPromotion(PieceType),
}
