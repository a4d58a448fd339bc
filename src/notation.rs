//////////////////////////
// notation.rs
//////////////////////////

use std::fmt;
use std::str::FromStr;

use crate::error::NotationError;
use crate::types::{Move, PieceType, Square};

/// Persisted form of a move: `e2e4`, or `e7e8=Q` for a promotion.
pub fn encode(from: Square, to: Square, promotion: Option<PieceType>) -> String {
    match promotion {
        Some(kind) => format!("{}{}={}", from, to, kind.initial()),
        None => format!("{}{}", from, to),
    }
}

pub fn encode_move(mv: &Move) -> String {
    encode(mv.from, mv.to, mv.promotion)
}

/// A move read back from the match history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl fmt::Display for RecordedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode(self.from, self.to, self.promotion))
    }
}

impl FromStr for RecordedMove {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || (s.len() != 4 && s.len() != 6) {
            return Err(NotationError::InvalidMove(s.to_string()));
        }

        let from = Square::from_str(&s[0..2])?;
        let to = Square::from_str(&s[2..4])?;

        let promotion = if s.len() == 6 {
            let mut suffix = s[4..].chars();
            if suffix.next() != Some('=') {
                return Err(NotationError::InvalidMove(s.to_string()));
            }
            let kind = suffix
                .next()
                .and_then(PieceType::from_initial)
                .filter(|k| k.is_promotion_choice())
                .ok_or_else(|| NotationError::InvalidPromotion(s.to_string()))?;
            Some(kind)
        } else {
            None
        };

        Ok(RecordedMove { from, to, promotion })
    }
}
