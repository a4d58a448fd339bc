//////////////////////////
// board.rs
//////////////////////////

use colored::Colorize;
use std::fmt;

use crate::error::BoardError;
use crate::types::*;

const BACK_ROW: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Square occupancy plus every piece that ever existed in the game.
///
/// Pieces live in an arena indexed by `PieceId`; the grid only holds ids of
/// live pieces. `live` keeps, per color, the ids of pieces still on the
/// board so attack queries never rescan the grid.
#[derive(Clone, Debug)]
pub struct BoardState {
    squares: [[Option<PieceId>; 8]; 8],
    pieces: Vec<Piece>,
    live: [Vec<PieceId>; 2],
    turn: Color,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    /// The standard starting position, White to move.
    pub fn new() -> Self {
        let mut board = Self::empty(Color::White);
        board.setup_initial_position();
        board
    }

    pub fn empty(turn: Color) -> Self {
        BoardState {
            squares: [[None; 8]; 8],
            pieces: Vec::with_capacity(32),
            live: [Vec::with_capacity(16), Vec::with_capacity(16)],
            turn,
        }
    }

    fn setup_initial_position(&mut self) {
        for (file, &kind) in BACK_ROW.iter().enumerate() {
            let file = file as u8;
            self.spawn(kind, Color::White, square(file, 0));
            self.spawn(PieceType::Pawn, Color::White, square(file, 1));
            self.spawn(PieceType::Pawn, Color::Black, square(file, 6));
            self.spawn(kind, Color::Black, square(file, 7));
        }
    }

    /// Puts a fresh, unmoved piece on an empty square.
    pub fn place(&mut self, piece_type: PieceType, color: Color, sq: Square) -> Result<PieceId, BoardError> {
        if self.is_occupied(sq) {
            return Err(BoardError::Occupied(sq));
        }
        Ok(self.spawn(piece_type, color, sq))
    }

    /// Flags a piece as having moved. Never cleared again.
    pub fn mark_moved(&mut self, id: PieceId) {
        self.pieces[id.0].has_moved = true;
    }

    pub fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    /// Like `piece`, for ids that may come from elsewhere.
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0)
    }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.file() as usize][sq.rank() as usize].map(|id| &self.pieces[id.0])
    }

    #[inline]
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.squares[sq.file() as usize][sq.rank() as usize].is_some()
    }

    pub fn live_pieces(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.live[color.index()].iter().map(move |id| &self.pieces[id.0])
    }

    pub fn live_count(&self, color: Color) -> usize {
        self.live[color.index()].len()
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.live_pieces(color)
            .find(|p| p.piece_type == PieceType::King)
            .and_then(|p| p.square)
    }

    /// Checks the grid, the arena and the live index agree, and that no color
    /// has more than one live king.
    pub fn validate(&self) -> Result<(), BoardError> {
        for sq in Square::all() {
            if let Some(id) = self.squares[sq.file() as usize][sq.rank() as usize] {
                let piece = &self.pieces[id.0];
                if !piece.alive || piece.square != Some(sq) || !self.live[piece.color.index()].contains(&id) {
                    return Err(BoardError::Inconsistent(sq));
                }
            }
        }
        for color in ALL_COLORS {
            for piece in self.live_pieces(color) {
                match piece.square {
                    Some(sq) if self.squares[sq.file() as usize][sq.rank() as usize] == Some(piece.id) => {}
                    Some(sq) => return Err(BoardError::Inconsistent(sq)),
                    None => return Err(BoardError::Inconsistent(square(0, 0))),
                }
            }
        }

        let kings = |color: Color| {
            self.live_pieces(color)
                .filter(|p| p.piece_type == PieceType::King)
                .count()
        };
        let (white, black) = (kings(Color::White), kings(Color::Black));
        if white > 1 || black > 1 {
            return Err(BoardError::TooManyKings { white, black });
        }
        Ok(())
    }

    // ---------- mutation, reserved for the executor ----------

    pub(crate) fn spawn(&mut self, piece_type: PieceType, color: Color, sq: Square) -> PieceId {
        let id = PieceId(self.pieces.len());
        self.pieces.push(Piece {
            id,
            piece_type,
            color,
            has_moved: false,
            alive: true,
            square: Some(sq),
        });
        self.squares[sq.file() as usize][sq.rank() as usize] = Some(id);
        self.live[color.index()].push(id);
        id
    }

    pub(crate) fn relocate(&mut self, id: PieceId, to: Square) {
        if let Some(from) = self.pieces[id.0].square {
            self.squares[from.file() as usize][from.rank() as usize] = None;
        }
        self.squares[to.file() as usize][to.rank() as usize] = Some(id);
        self.pieces[id.0].square = Some(to);
    }

    /// Takes a piece off the board for good.
    pub(crate) fn retire(&mut self, id: PieceId) {
        let piece = &mut self.pieces[id.0];
        if let Some(sq) = piece.square.take() {
            if self.squares[sq.file() as usize][sq.rank() as usize] == Some(id) {
                self.squares[sq.file() as usize][sq.rank() as usize] = None;
            }
        }
        piece.alive = false;
        let color = piece.color;
        self.live[color.index()].retain(|&other| other != id);
    }
}

#[inline]
fn square(file: u8, rank: u8) -> Square {
    Square::new(file, rank).unwrap_or_else(|| unreachable!("square {file},{rank} is off the board"))
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for file in 0..8 {
            write!(f, " {} ", ((file as u8 + b'a') as char).to_string().cyan())?;
        }
        writeln!(f)?;
        writeln!(f, "  {}", "─".repeat(24).bright_magenta())?;

        for rank in (0..8u8).rev() {
            write!(f, "{}{}", (rank + 1).to_string().cyan(), "│".bright_magenta())?;
            for file in 0..8u8 {
                let symbol = match self.piece_at(square(file, rank)) {
                    Some(piece) if piece.color == Color::White => piece.symbol().to_string().bright_red(),
                    Some(piece) => piece.symbol().to_string().bright_blue(),
                    None => "·".bright_magenta(),
                };
                write!(f, " {} ", symbol)?;
            }
            writeln!(f, "{}{}", "│".bright_magenta(), (rank + 1).to_string().cyan())?;
        }

        writeln!(f, "  {}", "─".repeat(24).bright_magenta())?;
        write!(f, "  ")?;
        for file in 0..8 {
            write!(f, " {} ", ((file as u8 + b'a') as char).to_string().cyan())?;
        }
        writeln!(f)?;
        write!(f, "\nTurn: {}", self.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn initial_position_has_32_pieces() {
        let board = BoardState::new();
        assert_eq!(board.live_count(Color::White), 16);
        assert_eq!(board.live_count(Color::Black), 16);
        assert_eq!(board.king_square(Color::White), Some(sq("e1")));
        assert_eq!(board.king_square(Color::Black), Some(sq("e8")));
        assert_eq!(board.piece_at(sq("d8")).map(|p| p.piece_type), Some(PieceType::Queen));
        assert!(board.validate().is_ok());
    }

    #[test]
    fn place_rejects_occupied_square() {
        let mut board = BoardState::empty(Color::White);
        board.place(PieceType::Rook, Color::White, sq("a1")).unwrap();
        assert_eq!(
            board.place(PieceType::Knight, Color::Black, sq("a1")),
            Err(BoardError::Occupied(sq("a1")))
        );
    }

    #[test]
    fn retire_updates_live_index() {
        let mut board = BoardState::new();
        let id = board.piece_at(sq("b8")).unwrap().id;
        board.retire(id);
        assert_eq!(board.live_count(Color::Black), 15);
        assert!(!board.piece(id).alive);
        assert!(board.piece_at(sq("b8")).is_none());
        assert!(board.validate().is_ok());
    }

    #[test]
    fn validate_reports_two_kings() {
        let mut board = BoardState::empty(Color::White);
        board.place(PieceType::King, Color::White, sq("e1")).unwrap();
        board.place(PieceType::King, Color::White, sq("e2")).unwrap();
        assert_eq!(
            board.validate(),
            Err(BoardError::TooManyKings { white: 2, black: 0 })
        );
    }
}
