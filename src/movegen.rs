//////////////////////////
// movegen.rs
//////////////////////////

use crate::attacks::AttackMap;
use crate::board::BoardState;
use crate::types::*;

// Constants for piece movements, as (file, rank) steps
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1),
    (0, -1), (-1, -1), (-1, 0), (-1, 1),
];
pub const KNIGHT_MOVES: [(i8, i8); 8] = [
    (1, 2), (2, 1), (-1, 2), (-2, 1),
    (1, -2), (2, -1), (-1, -2), (-2, -1),
];
pub const KING_MOVES: [(i8, i8); 8] = QUEEN_DIRECTIONS;

/// Produces pseudo-legal destinations for a single piece.
///
/// With `king_safety` on, king destinations attacked by the opponent are
/// dropped. No other piece is filtered, so pinned pieces may still expose
/// their own king.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveGenerator {
    pub king_safety: bool,
}

impl Default for MoveGenerator {
    fn default() -> Self {
        MoveGenerator { king_safety: true }
    }
}

impl MoveGenerator {
    pub fn new(king_safety: bool) -> Self {
        MoveGenerator { king_safety }
    }

    pub fn generate(&self, board: &BoardState, id: PieceId) -> Vec<Destination> {
        let piece = board.piece(id);
        let Some(from) = piece.square() else {
            return Vec::new();
        };
        if !piece.alive {
            return Vec::new();
        }

        let mut moves = Vec::new();
        match piece.piece_type {
            PieceType::Pawn => pawn_moves(board, piece, from, &mut moves),
            PieceType::Knight => step_moves(board, piece.color, from, &KNIGHT_MOVES, &mut moves),
            PieceType::Bishop => slide_moves(board, piece.color, from, &BISHOP_DIRECTIONS, &mut moves),
            PieceType::Rook => slide_moves(board, piece.color, from, &ROOK_DIRECTIONS, &mut moves),
            PieceType::Queen => slide_moves(board, piece.color, from, &QUEEN_DIRECTIONS, &mut moves),
            PieceType::King => {
                step_moves(board, piece.color, from, &KING_MOVES, &mut moves);
                for side in [CastleSide::Kingside, CastleSide::Queenside] {
                    if let Some((king_to, _)) = castle_candidate(board, piece, side) {
                        moves.push(Destination { square: king_to, is_capture: false });
                    }
                }
                if self.king_safety {
                    // second pass over a finished attack map, so king safety
                    // never feeds back into attack generation
                    let threats = AttackMap::build(board, piece.color.opposite());
                    moves.retain(|d| !threats.contains(d.square));
                }
            }
        }
        moves
    }
}

fn pawn_moves(board: &BoardState, pawn: &Piece, from: Square, moves: &mut Vec<Destination>) {
    let forward = pawn.color.forward();

    if let Some(one) = from.offset(0, forward) {
        if !board.is_occupied(one) {
            moves.push(Destination { square: one, is_capture: false });

            if !pawn.has_moved {
                if let Some(two) = from.offset(0, 2 * forward) {
                    if !board.is_occupied(two) {
                        moves.push(Destination { square: two, is_capture: false });
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        if let Some(target) = from.offset(df, forward) {
            if let Some(victim) = board.piece_at(target) {
                if victim.color != pawn.color {
                    moves.push(Destination { square: target, is_capture: true });
                }
            }
        }
    }
}

fn step_moves(board: &BoardState, color: Color, from: Square, offsets: &[(i8, i8)], moves: &mut Vec<Destination>) {
    for &(df, dr) in offsets {
        let Some(target) = from.offset(df, dr) else {
            continue;
        };
        match board.piece_at(target) {
            None => moves.push(Destination { square: target, is_capture: false }),
            Some(other) if other.color != color => {
                moves.push(Destination { square: target, is_capture: true })
            }
            Some(_) => {}
        }
    }
}

fn slide_moves(board: &BoardState, color: Color, from: Square, directions: &[(i8, i8)], moves: &mut Vec<Destination>) {
    for &(df, dr) in directions {
        let mut cur = from;
        while let Some(next) = cur.offset(df, dr) {
            match board.piece_at(next) {
                None => moves.push(Destination { square: next, is_capture: false }),
                Some(other) => {
                    if other.color != color {
                        moves.push(Destination { square: next, is_capture: true });
                    }
                    break;
                }
            }
            cur = next;
        }
    }
}

/// King destination and rook shift for castling on `side`, if allowed by
/// the occupancy and moved flags alone.
pub fn castle_candidate(board: &BoardState, king: &Piece, side: CastleSide) -> Option<(Square, RookShift)> {
    if king.piece_type != PieceType::King || king.has_moved || !king.alive {
        return None;
    }
    let from = king.square()?;
    let rook_from = Square::new(side.rook_file(), from.rank())?;
    let rook = board.piece_at(rook_from)?;
    if rook.piece_type != PieceType::Rook || rook.color != king.color || rook.has_moved {
        return None;
    }

    let step = side.direction();
    let mut cur = from.offset(step, 0)?;
    while cur != rook_from {
        if board.is_occupied(cur) {
            return None;
        }
        cur = cur.offset(step, 0)?;
    }

    let king_to = from.offset(2 * step, 0)?;
    let rook_to = king_to.offset(-step, 0)?;
    Some((king_to, RookShift { rook_from, rook_to }))
}

/// Squares the piece could capture on if an enemy stood there.
///
/// Pawns attack only their two forward diagonals. Rays stop at, and
/// include, the first occupied square of either color. Castling is never
/// an attack, so this never needs to ask whether a square is attacked.
pub fn attack_squares(board: &BoardState, piece: &Piece) -> Vec<Square> {
    let Some(from) = piece.square() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    match piece.piece_type {
        PieceType::Pawn => {
            let forward = piece.color.forward();
            jumps(from, &[(-1, forward), (1, forward)], &mut out);
        }
        PieceType::Knight => jumps(from, &KNIGHT_MOVES, &mut out),
        PieceType::King => jumps(from, &KING_MOVES, &mut out),
        PieceType::Bishop => rays(board, from, &BISHOP_DIRECTIONS, &mut out),
        PieceType::Rook => rays(board, from, &ROOK_DIRECTIONS, &mut out),
        PieceType::Queen => rays(board, from, &QUEEN_DIRECTIONS, &mut out),
    }
    out
}

fn jumps(from: Square, offsets: &[(i8, i8)], out: &mut Vec<Square>) {
    out.extend(offsets.iter().filter_map(|&(df, dr)| from.offset(df, dr)));
}

fn rays(board: &BoardState, from: Square, directions: &[(i8, i8)], out: &mut Vec<Square>) {
    for &(df, dr) in directions {
        let mut cur = from;
        while let Some(next) = cur.offset(df, dr) {
            out.push(next);
            if board.is_occupied(next) {
                break;
            }
            cur = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn knight_in_corner_has_two_moves() {
        let mut board = BoardState::empty(Color::White);
        let n = board.place(PieceType::Knight, Color::White, sq("a1")).unwrap();
        let mut squares: Vec<_> = MoveGenerator::default()
            .generate(&board, n)
            .into_iter()
            .map(|d| d.square)
            .collect();
        squares.sort();
        assert_eq!(squares, vec![sq("b3"), sq("c2")]);
    }

    #[test]
    fn rook_attacks_include_friendly_blocker() {
        let mut board = BoardState::empty(Color::White);
        let r = board.place(PieceType::Rook, Color::White, sq("a1")).unwrap();
        board.place(PieceType::Pawn, Color::White, sq("a3")).unwrap();
        let attacks = attack_squares(&board, board.piece(r));
        assert!(attacks.contains(&sq("a2")));
        assert!(attacks.contains(&sq("a3")));
        assert!(!attacks.contains(&sq("a4")));
        assert!(attacks.contains(&sq("h1")));
    }

    #[test]
    fn pawn_never_attacks_straight_ahead() {
        let mut board = BoardState::empty(Color::Black);
        let p = board.place(PieceType::Pawn, Color::Black, sq("d5")).unwrap();
        let mut attacks = attack_squares(&board, board.piece(p));
        attacks.sort();
        assert_eq!(attacks, vec![sq("c4"), sq("e4")]);
    }
}
