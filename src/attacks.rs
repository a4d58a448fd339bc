//////////////////////////
// attacks.rs
//////////////////////////

use std::fmt;

use crate::board::BoardState;
use crate::movegen::attack_squares;
use crate::types::*;

/// A set of squares packed into one bit per square.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SquareSet(u64);

impl SquareSet {
    pub const EMPTY: SquareSet = SquareSet(0);

    #[inline]
    pub fn insert(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.index();
    }

    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        (self.0 >> sq.index()) & 1 == 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(move |&sq| self.contains(sq))
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut set = SquareSet::EMPTY;
        for sq in iter {
            set.insert(sq);
        }
        set
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|sq| sq.to_string())).finish()
    }
}

/// Every square one color currently attacks.
///
/// Built from raw attack patterns only; nothing here consults king safety,
/// which is what lets the king filter in `MoveGenerator` sit on top of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackMap {
    by: Color,
    squares: SquareSet,
}

impl AttackMap {
    pub fn build(board: &BoardState, by: Color) -> Self {
        let squares = board
            .live_pieces(by)
            .flat_map(|piece| attack_squares(board, piece))
            .collect();
        AttackMap { by, squares }
    }

    pub fn color(&self) -> Color {
        self.by
    }

    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        self.squares.contains(sq)
    }

    pub fn squares(&self) -> SquareSet {
        self.squares
    }
}

/// True iff a live piece of `by` could capture on `target`.
pub fn is_attacked(board: &BoardState, target: Square, by: Color) -> bool {
    board
        .live_pieces(by)
        .any(|piece| attack_squares(board, piece).contains(&target))
}

/// True iff `color`'s king stands on a square the opponent attacks.
/// A side without a live king is never in check.
pub fn is_in_check(board: &BoardState, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => is_attacked(board, king, color.opposite()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_set_basics() {
        let a1 = Square::new(0, 0).unwrap();
        let h8 = Square::new(7, 7).unwrap();
        let set: SquareSet = [a1, h8, a1].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(h8));
        assert!(!set.contains(Square::new(3, 3).unwrap()));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![a1, h8]);
    }

    #[test]
    fn starting_position_attacks_third_rank() {
        let board = BoardState::new();
        let white = AttackMap::build(&board, Color::White);
        for file in 0..8 {
            assert!(white.contains(Square::new(file, 2).unwrap()));
            assert!(!white.contains(Square::new(file, 3).unwrap()));
        }
        assert!(!is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
    }
}
