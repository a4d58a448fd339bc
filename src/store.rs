//////////////////////////
// store.rs
//////////////////////////

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn new() -> Self {
        GameId(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(GameId)
    }
}

/// Account id handed to us by the login collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub white: PlayerId,
    pub black: PlayerId,
    pub moves: Vec<String>,
    pub winner: Option<PlayerId>,
    pub finished: bool,
}

/// One line of the match history listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub id: GameId,
    pub white: PlayerId,
    pub black: PlayerId,
    pub winner: Option<PlayerId>,
    pub move_count: usize,
}

impl From<&GameRecord> for GameSummary {
    fn from(record: &GameRecord) -> Self {
        GameSummary {
            id: record.id,
            white: record.white,
            black: record.black,
            winner: record.winner,
            move_count: record.moves.len(),
        }
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {} - {} moves", self.white, self.black, self.move_count)?;
        if let Some(winner) = self.winner {
            write!(f, ", won by {}", winner)?;
        }
        Ok(())
    }
}

/// External record of matches and their moves.
pub trait MatchStore {
    fn create_game(&mut self, white: PlayerId, black: PlayerId) -> Result<GameId, StoreError>;
    fn record_move(&mut self, game: GameId, notation: &str) -> Result<(), StoreError>;
    fn end_game(&mut self, game: GameId, winner: PlayerId) -> Result<(), StoreError>;
    /// Notation strings of a game, oldest first.
    fn game_moves(&self, game: GameId) -> Result<Vec<String>, StoreError>;
    /// Finished games, in creation order.
    fn completed_games(&self) -> Result<Vec<GameSummary>, StoreError>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InMemoryStore {
    games: Vec<GameRecord>,
    #[serde(skip)]
    index: HashMap<GameId, usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .games
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id, i))
            .collect();
    }

    fn game(&self, id: GameId) -> Result<&GameRecord, StoreError> {
        self.index
            .get(&id)
            .map(|&i| &self.games[i])
            .ok_or(StoreError::UnknownGame(id))
    }

    fn open_game_mut(&mut self, id: GameId) -> Result<&mut GameRecord, StoreError> {
        let i = *self.index.get(&id).ok_or(StoreError::UnknownGame(id))?;
        let game = &mut self.games[i];
        if game.finished {
            return Err(StoreError::AlreadyFinished(id));
        }
        Ok(game)
    }
}

impl MatchStore for InMemoryStore {
    fn create_game(&mut self, white: PlayerId, black: PlayerId) -> Result<GameId, StoreError> {
        let id = GameId::new();
        self.index.insert(id, self.games.len());
        self.games.push(GameRecord {
            id,
            white,
            black,
            moves: Vec::new(),
            winner: None,
            finished: false,
        });
        Ok(id)
    }

    fn record_move(&mut self, game: GameId, notation: &str) -> Result<(), StoreError> {
        self.open_game_mut(game)?.moves.push(notation.to_string());
        Ok(())
    }

    fn end_game(&mut self, game: GameId, winner: PlayerId) -> Result<(), StoreError> {
        let record = self.open_game_mut(game)?;
        record.winner = Some(winner);
        record.finished = true;
        Ok(())
    }

    fn game_moves(&self, game: GameId) -> Result<Vec<String>, StoreError> {
        Ok(self.game(game)?.moves.clone())
    }

    fn completed_games(&self) -> Result<Vec<GameSummary>, StoreError> {
        Ok(self
            .games
            .iter()
            .filter(|g| g.finished)
            .map(GameSummary::from)
            .collect())
    }
}

/// `InMemoryStore` mirrored to a JSON file after every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl JsonFileStore {
    /// Opens the history file, starting empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut inner = if path.exists() {
            let mut file = File::open(&path)?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            serde_json::from_str::<InMemoryStore>(&contents)?
        } else {
            InMemoryStore::new()
        };
        inner.rebuild_index();
        Ok(JsonFileStore { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let serialized = serde_json::to_string_pretty(&self.inner)?;
        let mut file = File::create(&self.path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }
}

impl MatchStore for JsonFileStore {
    fn create_game(&mut self, white: PlayerId, black: PlayerId) -> Result<GameId, StoreError> {
        let id = self.inner.create_game(white, black)?;
        self.save()?;
        Ok(id)
    }

    fn record_move(&mut self, game: GameId, notation: &str) -> Result<(), StoreError> {
        self.inner.record_move(game, notation)?;
        self.save()
    }

    fn end_game(&mut self, game: GameId, winner: PlayerId) -> Result<(), StoreError> {
        self.inner.end_game(game, winner)?;
        self.save()
    }

    fn game_moves(&self, game: GameId) -> Result<Vec<String>, StoreError> {
        self.inner.game_moves(game)
    }

    fn completed_games(&self) -> Result<Vec<GameSummary>, StoreError> {
        self.inner.completed_games()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_game_rejects_more_moves() {
        let mut store = InMemoryStore::new();
        let id = store.create_game(PlayerId(1), PlayerId(2)).unwrap();
        store.record_move(id, "e2e4").unwrap();
        store.end_game(id, PlayerId(2)).unwrap();
        assert!(matches!(
            store.record_move(id, "e7e5"),
            Err(StoreError::AlreadyFinished(_))
        ));
        assert_eq!(store.game_moves(id).unwrap(), vec!["e2e4".to_string()]);
    }

    #[test]
    fn unknown_game_is_an_error() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.game_moves(GameId::new()),
            Err(StoreError::UnknownGame(_))
        ));
    }

    #[test]
    fn game_id_parses_back() {
        let id = GameId::new();
        assert_eq!(id.to_string().parse::<GameId>().unwrap(), id);
    }
}
