//////////////////////////
// replay.rs
//////////////////////////

use log::{debug, warn};

use crate::board::BoardState;
use crate::error::NotationError;
use crate::executor::{self, ApplyOutcome};
use crate::notation::RecordedMove;
use crate::types::PieceType;

/// Steps through a recorded game on a private board.
///
/// Moves are replayed through the executor, so captures and castling are
/// re-derived from the position. Going back rebuilds from the start.
#[derive(Clone, Debug)]
pub struct Replay {
    moves: Vec<RecordedMove>,
    board: BoardState,
    position: usize,
}

impl Replay {
    pub fn new<S: AsRef<str>>(notations: &[S]) -> Result<Self, NotationError> {
        let moves = notations
            .iter()
            .map(|n| n.as_ref().parse::<RecordedMove>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Replay {
            moves,
            board: BoardState::new(),
            position: 0,
        })
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Number of moves applied so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[RecordedMove] {
        &self.moves
    }

    /// The move the next `step_forward` would play.
    pub fn next_move(&self) -> Option<&RecordedMove> {
        self.moves.get(self.position)
    }

    pub fn reset(&mut self) {
        self.board = BoardState::new();
        self.position = 0;
    }

    /// Plays the next move. Returns false at the end of the game.
    pub fn step_forward(&mut self) -> bool {
        let Some(recorded) = self.moves.get(self.position).copied() else {
            return false;
        };
        replay_move(&mut self.board, &recorded);
        self.position += 1;
        true
    }

    /// Undoes the last move. Returns false at the start of the game.
    pub fn step_back(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.seek(self.position - 1);
        true
    }

    /// Jumps to the position after `target` moves, clamped to the game length.
    pub fn seek(&mut self, target: usize) {
        let target = target.min(self.moves.len());
        if target < self.position {
            self.reset();
        }
        while self.position < target {
            self.step_forward();
        }
    }
}

fn replay_move(board: &mut BoardState, recorded: &RecordedMove) {
    if !board.is_occupied(recorded.from) {
        warn!("Skipping {}: no piece on {}", recorded, recorded.from);
        return;
    }

    let applied = match executor::build_move(board, recorded.from, recorded.to)
        .and_then(|mv| executor::apply(board, &mv))
    {
        Ok(applied) => applied,
        Err(e) => {
            warn!("Skipping {}: {}", recorded, e);
            return;
        }
    };

    if let ApplyOutcome::AwaitingPromotion { pawn, .. } = applied.outcome {
        let kind = recorded.promotion.unwrap_or(PieceType::Queen);
        if let Err(e) = executor::promote(board, pawn, kind) {
            warn!("Could not promote on {}: {}", recorded.to, e);
        }
    }
    debug!("Replayed {}", recorded);
}
