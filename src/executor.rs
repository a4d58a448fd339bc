//////////////////////////
// executor.rs
//////////////////////////

use log::{debug, info};

use crate::attacks::is_in_check;
use crate::board::BoardState;
use crate::error::MoveError;
use crate::types::*;

/// What the game should do after a move has landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Turn has passed to the other side.
    Continue,
    /// A pawn reached its last rank; the turn stays put until a piece is chosen.
    AwaitingPromotion { pawn: PieceId, square: Square },
    /// The opponent's king was taken.
    GameOver { winner: Color },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    pub mover: PieceId,
    pub flags: MoveFlags,
    pub outcome: ApplyOutcome,
}

/// Builds the `Move` for relocating whatever stands on `from` to `to`.
///
/// Capture and castling are read off the board: a live opponent on `to` is
/// captured, and a king travelling two files along its rank castles with the
/// rook on that side.
pub fn build_move(board: &BoardState, from: Square, to: Square) -> Result<Move, MoveError> {
    let mover = board.piece_at(from).ok_or(MoveError::NoPieceAtSource(from))?;

    let captured = match board.piece_at(to) {
        Some(target) if target.color == mover.color => return Err(MoveError::CaptureOwnPiece(to)),
        Some(target) => Some(target.id),
        None => None,
    };

    let mut castle = None;
    if mover.piece_type == PieceType::King && from.rank() == to.rank() {
        let side = match to.file() as i8 - from.file() as i8 {
            2 => Some(CastleSide::Kingside),
            -2 => Some(CastleSide::Queenside),
            _ => None,
        };
        if let Some(side) = side {
            let rook_from = Square::new(side.rook_file(), from.rank())
                .ok_or(MoveError::CastlingRookMissing(to))?;
            let rook_to = to
                .offset(-side.direction(), 0)
                .ok_or(MoveError::CastlingRookMissing(rook_from))?;
            castle = Some(RookShift { rook_from, rook_to });
        }
    }

    Ok(Move {
        from,
        to,
        captured,
        promotion: None,
        castle,
    })
}

/// Applies `mv` to the board.
///
/// Every precondition is checked before the first write, so an `Err` leaves
/// the board untouched.
pub fn apply(board: &mut BoardState, mv: &Move) -> Result<AppliedMove, MoveError> {
    let mover = *board.piece_at(mv.from).ok_or(MoveError::NoPieceAtSource(mv.from))?;

    let victim = match mv.captured {
        Some(id) => {
            let victim = *board.get(id).ok_or(MoveError::PieceNotAlive)?;
            if !victim.alive {
                return Err(MoveError::PieceNotAlive);
            }
            if victim.square() != Some(mv.to) {
                return Err(MoveError::CaptureMismatch(mv.to));
            }
            if victim.color == mover.color {
                return Err(MoveError::CaptureOwnPiece(mv.to));
            }
            Some(victim)
        }
        None => match board.piece_at(mv.to) {
            Some(occupant) if occupant.color == mover.color => {
                return Err(MoveError::CaptureOwnPiece(mv.to))
            }
            // capture derived from occupancy
            Some(occupant) => Some(*occupant),
            None => None,
        },
    };

    let rook = match mv.castle {
        Some(shift) => {
            let rook = board
                .piece_at(shift.rook_from)
                .filter(|r| r.piece_type == PieceType::Rook && r.color == mover.color)
                .ok_or(MoveError::CastlingRookMissing(shift.rook_from))?;
            if shift.rook_to != mv.from && board.is_occupied(shift.rook_to) {
                return Err(MoveError::CastlingRookMissing(shift.rook_from));
            }
            Some((rook.id, shift.rook_to))
        }
        None => None,
    };

    // ---------- all checks passed, mutate ----------

    let mut flags = MoveFlags::empty();
    if let Some(victim) = victim {
        board.retire(victim.id);
        flags |= MoveFlags::CAPTURE;
        if victim.piece_type == PieceType::King {
            flags |= MoveFlags::KING_CAPTURE;
        }
        debug!("{} {} captured on {}", victim.color, victim.piece_type, mv.to);
    }

    board.relocate(mover.id, mv.to);
    board.mark_moved(mover.id);

    if let Some((rook_id, rook_to)) = rook {
        board.relocate(rook_id, rook_to);
        board.mark_moved(rook_id);
        flags |= MoveFlags::CASTLE;
    }

    let outcome = if flags.contains(MoveFlags::KING_CAPTURE) {
        info!("{} captured the king on {}", mover.color, mv.to);
        ApplyOutcome::GameOver { winner: mover.color }
    } else if mover.piece_type == PieceType::Pawn && mv.to.rank() == mover.color.promotion_rank() {
        flags |= MoveFlags::PROMOTION;
        ApplyOutcome::AwaitingPromotion { pawn: mover.id, square: mv.to }
    } else {
        board.set_turn(mover.color.opposite());
        if is_in_check(board, mover.color.opposite()) {
            flags |= MoveFlags::CHECK;
        }
        ApplyOutcome::Continue
    };

    let mut applied = mv.clone();
    applied.captured = victim.map(|v| v.id);
    Ok(AppliedMove {
        mv: applied,
        mover: mover.id,
        flags,
        outcome,
    })
}

/// Replaces a pawn waiting on its last rank with a new piece and passes the
/// turn.
pub fn promote(board: &mut BoardState, pawn: PieceId, kind: PieceType) -> Result<PieceId, MoveError> {
    if !kind.is_promotion_choice() {
        return Err(MoveError::InvalidPromotion(kind));
    }
    let piece = *board.get(pawn).ok_or(MoveError::PieceNotAlive)?;
    let square = piece.square().ok_or(MoveError::PieceNotAlive)?;
    if !piece.alive {
        return Err(MoveError::PieceNotAlive);
    }
    if piece.piece_type != PieceType::Pawn {
        return Err(MoveError::NotAPawn(square));
    }
    if square.rank() != piece.color.promotion_rank() {
        return Err(MoveError::NotOnPromotionRank(square));
    }

    board.retire(pawn);
    let new_id = board.spawn(kind, piece.color, square);
    board.mark_moved(new_id);
    board.set_turn(piece.color.opposite());
    info!("{} pawn on {} promoted to {}", piece.color, square, kind);
    Ok(new_id)
}
