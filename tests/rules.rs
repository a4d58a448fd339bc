use chess_turns::executor::{self, ApplyOutcome};
use chess_turns::movegen::attack_squares;
use chess_turns::*;

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn squares(dests: &[Destination]) -> Vec<Square> {
    let mut out: Vec<Square> = dests.iter().map(|d| d.square).collect();
    out.sort();
    out
}

fn play(board: &mut BoardState, from: &str, to: &str) -> AppliedMove {
    let mv = executor::build_move(board, sq(from), sq(to)).unwrap();
    executor::apply(board, &mv).unwrap()
}

#[test]
fn pawn_opening_double_step() {
    let mut board = BoardState::new();
    let pawn = board.piece_at(sq("e2")).unwrap().id;
    let dests = MoveGenerator::default().generate(&board, pawn);
    assert_eq!(squares(&dests), vec![sq("e3"), sq("e4")]);

    let applied = play(&mut board, "e2", "e4");
    assert_eq!(applied.outcome, ApplyOutcome::Continue);
    assert_eq!(board.turn(), Color::Black);
    assert!(board.piece(pawn).has_moved);
    assert_eq!(board.piece(pawn).square(), Some(sq("e4")));
    assert!(board.piece_at(sq("e2")).is_none());
}

#[test]
fn pawn_double_step_needs_both_squares_empty() {
    let generator = MoveGenerator::default();

    let mut board = BoardState::empty(Color::White);
    let pawn = board.place(PieceType::Pawn, Color::White, sq("e2")).unwrap();
    board.place(PieceType::Knight, Color::Black, sq("e3")).unwrap();
    assert!(generator.generate(&board, pawn).is_empty());

    let mut board = BoardState::empty(Color::White);
    let pawn = board.place(PieceType::Pawn, Color::White, sq("e2")).unwrap();
    board.place(PieceType::Knight, Color::Black, sq("e4")).unwrap();
    assert_eq!(squares(&generator.generate(&board, pawn)), vec![sq("e3")]);

    let mut board = BoardState::empty(Color::White);
    let pawn = board.place(PieceType::Pawn, Color::White, sq("e3")).unwrap();
    board.mark_moved(pawn);
    assert_eq!(squares(&generator.generate(&board, pawn)), vec![sq("e4")]);
}

#[test]
fn pawn_captures_diagonally_only() {
    let mut board = BoardState::empty(Color::Black);
    let pawn = board.place(PieceType::Pawn, Color::Black, sq("d7")).unwrap();
    board.place(PieceType::Bishop, Color::White, sq("c6")).unwrap();
    board.place(PieceType::Knight, Color::Black, sq("e6")).unwrap();
    board.place(PieceType::Rook, Color::White, sq("d5")).unwrap();

    let dests = MoveGenerator::default().generate(&board, pawn);
    assert_eq!(squares(&dests), vec![sq("c6"), sq("d6")]);
    assert!(dests.iter().any(|d| d.square == sq("c6") && d.is_capture));
}

#[test]
fn sliding_pieces_stop_at_first_blocker() {
    let mut board = BoardState::empty(Color::White);
    let rook = board.place(PieceType::Rook, Color::White, sq("d4")).unwrap();
    board.place(PieceType::Pawn, Color::White, sq("d6")).unwrap();
    board.place(PieceType::Pawn, Color::Black, sq("f4")).unwrap();

    let dests = MoveGenerator::default().generate(&board, rook);
    let got = squares(&dests);

    assert!(got.contains(&sq("d5")));
    assert!(!got.contains(&sq("d6")));
    assert!(!got.contains(&sq("d7")));
    assert!(got.contains(&sq("e4")));
    assert!(got.contains(&sq("f4")));
    assert!(!got.contains(&sq("g4")));
    assert!(dests.iter().any(|d| d.square == sq("f4") && d.is_capture));
    // down to d1 and left to a4
    assert!(got.contains(&sq("d1")));
    assert!(got.contains(&sq("a4")));
    assert_eq!(got.len(), 1 + 2 + 3 + 3);
}

#[test]
fn queen_sees_bishop_along_diagonal() {
    let mut board = BoardState::empty(Color::Black);
    let queen = board.place(PieceType::Queen, Color::Black, sq("d8")).unwrap();
    let bishop = board.place(PieceType::Bishop, Color::White, sq("a5")).unwrap();

    let dests = MoveGenerator::default().generate(&board, queen);
    assert!(dests.contains(&Destination { square: sq("a5"), is_capture: true }));

    let white_before = board.live_count(Color::White);
    let applied = play(&mut board, "d8", "a5");
    assert!(applied.flags.contains(MoveFlags::CAPTURE));
    assert_eq!(applied.mv.captured, Some(bishop));
    assert_eq!(board.live_count(Color::White), white_before - 1);
    assert_eq!(board.piece_at(sq("a5")).map(|p| p.id), Some(queen));
    assert_eq!(board.piece(bishop).square(), None);
    assert!(!board.piece(bishop).alive);
}

#[test]
fn queenside_castle_moves_both_pieces() {
    let mut board = BoardState::empty(Color::White);
    let king = board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    let rook = board.place(PieceType::Rook, Color::White, sq("a1")).unwrap();
    board.place(PieceType::King, Color::Black, sq("e8")).unwrap();

    let dests = MoveGenerator::default().generate(&board, king);
    assert!(squares(&dests).contains(&sq("c1")));

    let applied = play(&mut board, "e1", "c1");
    assert!(applied.flags.contains(MoveFlags::CASTLE));
    assert_eq!(board.piece(king).square(), Some(sq("c1")));
    assert_eq!(board.piece(rook).square(), Some(sq("d1")));
    assert!(board.piece(rook).has_moved);
    assert!(board.piece_at(sq("a1")).is_none());
    assert_eq!(board.turn(), Color::Black);
    assert!(board.validate().is_ok());
}

#[test]
fn castling_requires_unmoved_pieces_and_clear_path() {
    let generator = MoveGenerator::default();

    let mut board = BoardState::empty(Color::White);
    let king = board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    board.place(PieceType::Rook, Color::White, sq("a1")).unwrap();
    board.place(PieceType::Knight, Color::White, sq("b1")).unwrap();
    assert!(!squares(&generator.generate(&board, king)).contains(&sq("c1")));

    let mut board = BoardState::empty(Color::White);
    let king = board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    let rook = board.place(PieceType::Rook, Color::White, sq("h1")).unwrap();
    assert!(squares(&generator.generate(&board, king)).contains(&sq("g1")));
    board.mark_moved(rook);
    assert!(!squares(&generator.generate(&board, king)).contains(&sq("g1")));

    let mut board = BoardState::empty(Color::White);
    let king = board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    board.place(PieceType::Rook, Color::White, sq("h1")).unwrap();
    board.mark_moved(king);
    assert!(!squares(&generator.generate(&board, king)).contains(&sq("g1")));
}

#[test]
fn king_safety_filters_attacked_castle_destination() {
    let mut board = BoardState::empty(Color::White);
    let king = board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    board.place(PieceType::Rook, Color::White, sq("h1")).unwrap();
    board.place(PieceType::Rook, Color::Black, sq("g8")).unwrap();

    let safe = MoveGenerator::new(true).generate(&board, king);
    assert!(!squares(&safe).contains(&sq("g1")));

    let loose = MoveGenerator::new(false).generate(&board, king);
    assert!(squares(&loose).contains(&sq("g1")));
}

#[test]
fn king_safety_keeps_king_off_attacked_squares() {
    let mut board = BoardState::empty(Color::White);
    let king = board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    board.place(PieceType::Rook, Color::Black, sq("d8")).unwrap();
    board.place(PieceType::Knight, Color::Black, sq("g3")).unwrap();

    let got = squares(&MoveGenerator::new(true).generate(&board, king));
    // d-file by the rook, f1 and e2 by the knight
    assert_eq!(got, vec![sq("f2")]);

    let all = squares(&MoveGenerator::new(false).generate(&board, king));
    assert_eq!(all.len(), 5);
}

#[test]
fn rook_on_open_file_gives_check() {
    let mut board = BoardState::empty(Color::White);
    board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    board.place(PieceType::Rook, Color::Black, sq("e8")).unwrap();
    assert!(is_in_check(&board, Color::White));

    board.place(PieceType::Pawn, Color::White, sq("e4")).unwrap();
    assert!(!is_in_check(&board, Color::White));
}

#[test]
fn missing_king_is_never_in_check() {
    let mut board = BoardState::empty(Color::White);
    board.place(PieceType::Queen, Color::Black, sq("e8")).unwrap();
    assert!(!is_in_check(&board, Color::White));
}

#[test]
fn attacked_squares_are_union_of_attack_patterns() {
    let mut board = BoardState::new();
    play(&mut board, "e2", "e4");
    play(&mut board, "d7", "d5");
    play(&mut board, "g1", "f3");
    play(&mut board, "c8", "g4");

    for color in ALL_COLORS {
        let map = AttackMap::build(&board, color);
        for target in Square::all() {
            let expected = board
                .live_pieces(color)
                .any(|p| attack_squares(&board, p).contains(&target));
            assert_eq!(is_attacked(&board, target, color), expected, "{} on {}", color, target);
            assert_eq!(map.contains(target), expected);
        }
    }
}

#[test]
fn every_destination_is_on_the_board() {
    let mut board = BoardState::new();
    play(&mut board, "e2", "e4");
    play(&mut board, "e7", "e5");
    let generator = MoveGenerator::new(false);
    for color in ALL_COLORS {
        let ids: Vec<PieceId> = board.live_pieces(color).map(|p| p.id).collect();
        for id in ids {
            for dest in generator.generate(&board, id) {
                assert!(dest.square.file() < 8 && dest.square.rank() < 8);
                assert!(Square::all().any(|s| s == dest.square));
            }
        }
    }
}

#[test]
fn pawn_on_last_rank_waits_for_promotion() {
    let mut board = BoardState::empty(Color::White);
    board.place(PieceType::King, Color::White, sq("a1")).unwrap();
    board.place(PieceType::King, Color::Black, sq("h6")).unwrap();
    let pawn = board.place(PieceType::Pawn, Color::White, sq("e7")).unwrap();

    let applied = play(&mut board, "e7", "e8");
    assert_eq!(applied.outcome, ApplyOutcome::AwaitingPromotion { pawn, square: sq("e8") });
    assert_eq!(board.turn(), Color::White);

    let rook = executor::promote(&mut board, pawn, PieceType::Rook).unwrap();
    assert_eq!(board.turn(), Color::Black);
    let promoted = board.piece_at(sq("e8")).unwrap();
    assert_eq!(promoted.id, rook);
    assert_eq!(promoted.piece_type, PieceType::Rook);
    assert_eq!(promoted.color, Color::White);
    assert!(!board.piece(pawn).alive);
    assert_eq!(board.live_count(Color::White), 2);
}

#[test]
fn capturing_the_king_ends_the_game() {
    let mut board = BoardState::empty(Color::White);
    board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    board.place(PieceType::Rook, Color::White, sq("a1")).unwrap();
    board.place(PieceType::King, Color::Black, sq("a8")).unwrap();

    let applied = play(&mut board, "a1", "a8");
    assert!(applied.flags.contains(MoveFlags::KING_CAPTURE));
    assert_eq!(applied.outcome, ApplyOutcome::GameOver { winner: Color::White });
    assert_eq!(board.king_square(Color::Black), None);
}

#[test]
fn king_safety_does_not_filter_pinned_pieces() {
    let mut board = BoardState::empty(Color::White);
    board.place(PieceType::King, Color::White, sq("e1")).unwrap();
    let bishop = board.place(PieceType::Bishop, Color::White, sq("e2")).unwrap();
    board.place(PieceType::Rook, Color::Black, sq("e8")).unwrap();

    let got = squares(&MoveGenerator::new(true).generate(&board, bishop));
    assert!(got.contains(&sq("d3")));
    assert!(got.contains(&sq("f3")));
    assert!(got.contains(&sq("a6")));
    assert!(got.contains(&sq("h5")));
    // d1 f1 d3 c4 b5 a6 f3 g4 h5
    assert_eq!(got.len(), 9);
}
