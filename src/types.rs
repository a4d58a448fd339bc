//////////////////////////
// types.rs
//////////////////////////

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NotationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

pub const ALL_COLORS: [Color; 2] = [Color::White, Color::Black];

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Rank step a pawn of this color advances by.
    #[inline]
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    #[inline]
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// The farthest rank from this color's side; pawns promote here.
    #[inline]
    pub fn promotion_rank(self) -> u8 {
        self.opposite().back_rank()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Piece types a pawn may promote to.
pub const PROMOTION_CHOICES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

impl PieceType {
    #[inline]
    pub fn is_promotion_choice(self) -> bool {
        PROMOTION_CHOICES.contains(&self)
    }

    /// Upper-case letter used in notation. Knight is `N`.
    pub fn initial(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    pub fn from_initial(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Parses a promotion answer: a full name ("rook") or an initial ("r").
    pub fn parse_promotion(input: &str) -> Option<PieceType> {
        let input = input.trim().to_ascii_lowercase();
        let kind = match input.as_str() {
            "queen" => PieceType::Queen,
            "rook" => PieceType::Rook,
            "bishop" => PieceType::Bishop,
            "knight" => PieceType::Knight,
            s if s.chars().count() == 1 => PieceType::from_initial(s.chars().next()?)?,
            _ => return None,
        };
        kind.is_promotion_choice().then_some(kind)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::Pawn => "Pawn",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Rook => "Rook",
            PieceType::Queen => "Queen",
            PieceType::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// A board square. Rank 0 is White's back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        (file < 8 && rank < 8).then_some(Square { file, rank })
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.file
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }

    #[inline]
    pub fn index(self) -> usize {
        self.rank as usize * 8 + self.file as usize
    }

    pub fn from_index(index: usize) -> Option<Square> {
        if index < 64 {
            Square::new((index % 8) as u8, (index / 8) as u8)
        } else {
            None
        }
    }

    /// The square `(df, dr)` away, if it is still on the board.
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file as i8 + df;
        let rank = self.rank as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Square::new(file as u8, rank as u8)
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).filter_map(Square::from_index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(NotationError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| NotationError::InvalidSquare(s.to_string()))
    }
}

/// Stable handle of a piece inside a `BoardState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: PieceId,
    pub piece_type: PieceType,
    pub color: Color,
    pub has_moved: bool,
    pub alive: bool,
    pub(crate) square: Option<Square>,
}

impl Piece {
    /// Where the piece stands; `None` once captured or promoted away.
    pub fn square(&self) -> Option<Square> {
        self.square
    }

    pub fn symbol(&self) -> char {
        let c = self.piece_type.initial();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub fn rook_file(self) -> u8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    /// File step from the king toward the rook.
    pub fn direction(self) -> i8 {
        match self {
            CastleSide::Kingside => 1,
            CastleSide::Queenside => -1,
        }
    }
}

/// The rook half of a castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RookShift {
    pub rook_from: Square,
    pub rook_to: Square,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceId>,
    pub promotion: Option<PieceType>,
    pub castle: Option<RookShift>,
}

impl Move {
    pub fn is_castle(&self) -> bool {
        self.castle.is_some()
    }
}

/// A square a selected piece may move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub square: Square,
    pub is_capture: bool,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MoveFlags: u8 {
        const CAPTURE      = 0b00000001;
        const CASTLE       = 0b00000010;
        const PROMOTION    = 0b00000100;
        const CHECK        = 0b00001000;
        const KING_CAPTURE = 0b00010000;
    }
}
