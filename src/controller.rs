//////////////////////////
// controller.rs
//////////////////////////

use log::{debug, error, info, warn};

use crate::attacks::is_in_check;
use crate::board::BoardState;
use crate::config::Config;
use crate::error::StoreError;
use crate::executor::{self, ApplyOutcome};
use crate::movegen::MoveGenerator;
use crate::notation;
use crate::store::{GameId, MatchStore, PlayerId};
use crate::types::*;

/// Who is playing which game. Passed in explicitly rather than looked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchContext {
    pub game_id: GameId,
    pub white: PlayerId,
    pub black: PlayerId,
}

impl MatchContext {
    /// Registers a new game with the store.
    pub fn start(store: &mut dyn MatchStore, white: PlayerId, black: PlayerId) -> Result<Self, StoreError> {
        let game_id = store.create_game(white, black)?;
        Ok(MatchContext { game_id, white, black })
    }

    pub fn player(&self, color: Color) -> PlayerId {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

/// Input from whatever turns clicks or typing into board references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Square(Square),
    Piece(PieceId),
}

impl From<Square> for Selection {
    fn from(sq: Square) -> Self {
        Selection::Square(sq)
    }
}

impl From<PieceId> for Selection {
    fn from(id: PieceId) -> Self {
        Selection::Piece(id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Selected { piece: PieceId, destinations: Vec<Destination> },
    AwaitingPromotionChoice { pawn: PieceId, square: Square },
    CheckAnnounced(Color),
    GameOver { winner: Color },
}

/// Why an input changed nothing (or only cleared the selection).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    InvalidSelection,
    IllegalDestination,
    AwaitingPromotion,
    NotAwaitingPromotion,
    NoCheckToAcknowledge,
    GameOver,
}

/// Notifications for the rendering side, returned from every input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnEvent {
    Selected { piece: PieceId, destinations: Vec<Destination> },
    Deselected,
    Ignored(IgnoreReason),
    Moved { mv: Move, flags: MoveFlags },
    PromotionRequired { square: Square, color: Color },
    Promoted { square: Square, piece_type: PieceType },
    CheckStateChanged { color: Color, active: bool },
    GameOver { winner: Color },
}

struct Recorder {
    context: MatchContext,
    store: Box<dyn MatchStore>,
}

/// Owns the board and sequences turns.
///
/// All board writes go through `executor`, driven from here. One input
/// produces at most one move, and the move is finished (captures, rook shift,
/// turn flip, check evaluation) before the call returns.
pub struct TurnController {
    board: BoardState,
    state: TurnState,
    generator: MoveGenerator,
    default_promotion: PieceType,
    recorder: Option<Recorder>,
    /// Kings currently in check, indexed by `Color::index`.
    in_check: [bool; 2],
    pending_promotion: Option<(Square, Square)>,
    history: Vec<String>,
}

impl TurnController {
    pub fn new(config: &Config) -> Self {
        Self::with_board(BoardState::new(), config)
    }

    /// Starts from an arbitrary position; the side to move is `board.turn()`.
    pub fn with_board(board: BoardState, config: &Config) -> Self {
        let default_promotion = if config.default_promotion.is_promotion_choice() {
            config.default_promotion
        } else {
            PieceType::Queen
        };
        TurnController {
            board,
            state: TurnState::Idle,
            generator: MoveGenerator::new(config.king_safety),
            default_promotion,
            recorder: None,
            in_check: [false; 2],
            pending_promotion: None,
            history: Vec::new(),
        }
    }

    /// Sends every completed move and the result to `store`.
    pub fn with_match(mut self, context: MatchContext, store: Box<dyn MatchStore>) -> Self {
        self.recorder = Some(Recorder { context, store });
        self
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn turn(&self) -> Color {
        self.board.turn()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, TurnState::GameOver { .. })
    }

    /// Notation of every completed move this session.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn match_context(&self) -> Option<&MatchContext> {
        self.recorder.as_ref().map(|r| &r.context)
    }

    pub fn store(&self) -> Option<&dyn MatchStore> {
        self.recorder.as_ref().map(|r| &*r.store as &dyn MatchStore)
    }

    /// Destinations of the selected piece, for highlighting. Empty when
    /// nothing is selected.
    pub fn legal_destinations(&self) -> &[Destination] {
        match &self.state {
            TurnState::Selected { destinations, .. } => destinations.as_slice(),
            _ => &[],
        }
    }

    /// Every live piece of the side to move that has somewhere to go.
    pub fn movable_pieces(&self) -> Vec<(PieceId, Vec<Destination>)> {
        self.board
            .live_pieces(self.board.turn())
            .map(|p| (p.id, self.generator.generate(&self.board, p.id)))
            .filter(|(_, dests)| !dests.is_empty())
            .collect()
    }

    /// A square or piece was picked.
    ///
    /// Own piece: select it (or deselect it if already selected). Anything
    /// else while a piece is selected is treated as a destination choice,
    /// except an opponent piece that cannot be captured, which is ignored
    /// without clearing the selection.
    pub fn select(&mut self, selection: impl Into<Selection>) -> Vec<TurnEvent> {
        match self.state {
            TurnState::GameOver { .. } => return vec![TurnEvent::Ignored(IgnoreReason::GameOver)],
            TurnState::AwaitingPromotionChoice { .. } => {
                return vec![TurnEvent::Ignored(IgnoreReason::AwaitingPromotion)]
            }
            TurnState::CheckAnnounced(_) => self.state = TurnState::Idle,
            _ => {}
        }

        let Some((square, occupant)) = self.resolve(selection.into()) else {
            return vec![TurnEvent::Ignored(IgnoreReason::InvalidSelection)];
        };
        let side = self.board.turn();

        match occupant {
            Some(piece) if piece.color == side => {
                if matches!(&self.state, TurnState::Selected { piece: current, .. } if *current == piece.id) {
                    debug!("Deselected {} on {}", piece.piece_type, square);
                    self.state = TurnState::Idle;
                    vec![TurnEvent::Deselected]
                } else {
                    self.select_piece(piece.id, square)
                }
            }
            Some(_) => {
                let capturable = self.legal_destinations().iter().any(|d| d.square == square);
                if capturable {
                    self.choose(square)
                } else {
                    vec![TurnEvent::Ignored(IgnoreReason::InvalidSelection)]
                }
            }
            None if matches!(self.state, TurnState::Selected { .. }) => self.choose(square),
            None => vec![TurnEvent::Ignored(IgnoreReason::InvalidSelection)],
        }
    }

    /// Moves the selected piece to `square`. A square outside the cached
    /// destinations clears the selection and does nothing else.
    pub fn choose(&mut self, square: Square) -> Vec<TurnEvent> {
        let (piece, destinations) = match &self.state {
            TurnState::Selected { piece, destinations } => (*piece, destinations),
            TurnState::GameOver { .. } => return vec![TurnEvent::Ignored(IgnoreReason::GameOver)],
            TurnState::AwaitingPromotionChoice { .. } => {
                return vec![TurnEvent::Ignored(IgnoreReason::AwaitingPromotion)]
            }
            _ => return vec![TurnEvent::Ignored(IgnoreReason::InvalidSelection)],
        };

        let legal = destinations.iter().any(|d| d.square == square);
        self.state = TurnState::Idle;
        if !legal {
            debug!("{} is not a legal destination, selection cleared", square);
            return vec![TurnEvent::Ignored(IgnoreReason::IllegalDestination)];
        }

        let Some(from) = self.board.piece(piece).square() else {
            return vec![TurnEvent::Ignored(IgnoreReason::IllegalDestination)];
        };
        let applied = match executor::build_move(&self.board, from, square)
            .and_then(|mv| executor::apply(&mut self.board, &mv))
        {
            Ok(applied) => applied,
            Err(e) => {
                warn!("Move {}{} rejected by executor: {}", from, square, e);
                return vec![TurnEvent::Ignored(IgnoreReason::IllegalDestination)];
            }
        };

        let mut events = vec![TurnEvent::Moved {
            mv: applied.mv.clone(),
            flags: applied.flags,
        }];

        match applied.outcome {
            ApplyOutcome::GameOver { winner } => {
                self.record(notation::encode_move(&applied.mv));
                self.finish(winner, &mut events);
            }
            ApplyOutcome::AwaitingPromotion { pawn, square } => {
                let color = self.board.piece(pawn).color;
                info!("{} pawn reached {}, waiting for promotion choice", color, square);
                self.pending_promotion = Some((from, square));
                self.state = TurnState::AwaitingPromotionChoice { pawn, square };
                events.push(TurnEvent::PromotionRequired { square, color });
            }
            ApplyOutcome::Continue => {
                info!("{} played {}{}", self.board.turn().opposite(), from, square);
                self.record(notation::encode_move(&applied.mv));
                self.turn_passed(&mut events);
            }
        }
        events
    }

    /// Finishes a pending promotion. Pawn and king are not valid answers and
    /// fall back to the configured default.
    pub fn choose_promotion(&mut self, piece_type: PieceType) -> Vec<TurnEvent> {
        let (pawn, square) = match self.state {
            TurnState::AwaitingPromotionChoice { pawn, square } => (pawn, square),
            TurnState::GameOver { .. } => return vec![TurnEvent::Ignored(IgnoreReason::GameOver)],
            _ => return vec![TurnEvent::Ignored(IgnoreReason::NotAwaitingPromotion)],
        };

        let piece_type = if piece_type.is_promotion_choice() {
            piece_type
        } else {
            warn!("Cannot promote to {}, using {}", piece_type, self.default_promotion);
            self.default_promotion
        };

        let color = self.board.piece(pawn).color;
        if let Err(e) = executor::promote(&mut self.board, pawn, piece_type) {
            // never leave the game stuck waiting on a choice
            error!("Promotion on {} failed: {}", square, e);
            self.board.set_turn(color.opposite());
        }

        let from = self
            .pending_promotion
            .take()
            .map(|(from, _)| from)
            .unwrap_or(square);
        self.record(notation::encode(from, square, Some(piece_type)));
        self.state = TurnState::Idle;

        let mut events = vec![TurnEvent::Promoted { square, piece_type }];
        self.turn_passed(&mut events);
        events
    }

    /// Promotion answer as typed or clicked ("queen", "n", ...).
    pub fn choose_promotion_named(&mut self, choice: &str) -> Vec<TurnEvent> {
        let piece_type = PieceType::parse_promotion(choice).unwrap_or_else(|| {
            warn!("Unknown piece type for promotion: {:?}", choice);
            self.default_promotion
        });
        self.choose_promotion(piece_type)
    }

    /// Dismisses a check announcement. The check stays active and is not
    /// announced again until another move has been made.
    pub fn acknowledge_check(&mut self) -> Vec<TurnEvent> {
        match self.state {
            TurnState::CheckAnnounced(_) => {
                self.state = TurnState::Idle;
                Vec::new()
            }
            _ => vec![TurnEvent::Ignored(IgnoreReason::NoCheckToAcknowledge)],
        }
    }

    /// `color` gives up. The opponent wins and the result is recorded.
    pub fn resign(&mut self, color: Color) -> Vec<TurnEvent> {
        if self.is_over() {
            return vec![TurnEvent::Ignored(IgnoreReason::GameOver)];
        }
        info!("{} resigns", color);
        self.pending_promotion = None;
        let mut events = Vec::new();
        self.finish(color.opposite(), &mut events);
        events
    }

    fn resolve(&self, selection: Selection) -> Option<(Square, Option<Piece>)> {
        match selection {
            Selection::Square(sq) => Some((sq, self.board.piece_at(sq).copied())),
            Selection::Piece(id) => {
                let piece = self.board.get(id).filter(|p| p.alive)?;
                Some((piece.square()?, Some(*piece)))
            }
        }
    }

    fn select_piece(&mut self, piece: PieceId, square: Square) -> Vec<TurnEvent> {
        let destinations = self.generator.generate(&self.board, piece);
        debug!(
            "Selected {} on {}: {} destinations",
            self.board.piece(piece).piece_type,
            square,
            destinations.len()
        );
        self.state = TurnState::Selected {
            piece,
            destinations: destinations.clone(),
        };
        vec![TurnEvent::Selected { piece, destinations }]
    }

    /// Runs once per completed move, after the turn has flipped.
    ///
    /// Reports every change in either king's check status. Pinned pieces are
    /// not filtered, so a move can leave the mover's own king attacked; that
    /// check stays active until a later move resolves it.
    fn turn_passed(&mut self, events: &mut Vec<TurnEvent>) {
        for color in ALL_COLORS {
            let attacked = is_in_check(&self.board, color);
            if attacked != self.in_check[color.index()] {
                self.in_check[color.index()] = attacked;
                events.push(TurnEvent::CheckStateChanged { color, active: attacked });
            }
        }
        let side = self.board.turn();
        if self.in_check[side.index()] {
            info!("{} king is in check", side);
            self.state = TurnState::CheckAnnounced(side);
        }
    }

    fn clear_checks(&mut self, events: &mut Vec<TurnEvent>) {
        for color in ALL_COLORS {
            if std::mem::take(&mut self.in_check[color.index()]) {
                events.push(TurnEvent::CheckStateChanged { color, active: false });
            }
        }
    }

    fn record(&mut self, notation: String) {
        if let Some(recorder) = self.recorder.as_mut() {
            let game = recorder.context.game_id;
            match recorder.store.record_move(game, &notation) {
                Ok(()) => debug!("Move recorded: {} for game {}", notation, game),
                Err(e) => error!("Could not record move {} for game {}: {}", notation, game, e),
            }
        }
        self.history.push(notation);
    }

    fn finish(&mut self, winner: Color, events: &mut Vec<TurnEvent>) {
        info!("Game over, {} wins", winner);
        self.clear_checks(events);
        self.state = TurnState::GameOver { winner };
        events.push(TurnEvent::GameOver { winner });
        if let Some(recorder) = self.recorder.as_mut() {
            let game = recorder.context.game_id;
            let player = recorder.context.player(winner);
            if let Err(e) = recorder.store.end_game(game, player) {
                error!("Could not close game {}: {}", game, e);
            }
        }
    }
}
