//! WebAssembly bindings for the tic-tac-toe engine.
//!
//! This module exposes the game engine to JavaScript through wasm-bindgen.
//! The wrapper owns the current `Game` and swaps it after every successful
//! call, which is the job the engine leaves to its host.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::actions::GameAction;
#[cfg(feature = "wasm")]
use crate::bot::{Agent, RandomAgent};
#[cfg(feature = "wasm")]
use crate::coord::Coordinate;
#[cfg(feature = "wasm")]
use crate::game::Game;

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
    agent: RandomAgent,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            game: Game::new(),
            agent: RandomAgent::new(),
        }
    }

    /// Get the current game snapshot as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.game.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// "X" or "O"
    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> String {
        self.game.current_player().to_string()
    }

    /// Occupant of a cell, `undefined` when empty
    #[wasm_bindgen(js_name = playerAt)]
    pub fn player_at(&self, row: i32, column: i32) -> Result<Option<String>, JsValue> {
        self.game
            .grid()
            .get_cell(Coordinate::new(row, column))
            .map(|cell| cell.occupant.map(|p| p.to_string()))
            .ok_or_else(|| JsValue::from_str("Invalid cell coordinate"))
    }

    /// Mark a cell for the current player, returns events JSON or error
    #[wasm_bindgen(js_name = markCell)]
    pub fn mark_cell(&mut self, row: i32, column: i32) -> Result<String, JsValue> {
        self.apply(GameAction::Mark(Coordinate::new(row, column)))
    }

    /// Take back the last move, returns events JSON or error
    #[wasm_bindgen(js_name = undo)]
    pub fn undo(&mut self) -> Result<String, JsValue> {
        self.apply(GameAction::Undo)
    }

    /// Suggested move for the current player as `{"row":..,"column":..}`
    #[wasm_bindgen(js_name = getBotMove)]
    pub fn get_bot_move(&mut self) -> String {
        match self.agent.choose_move(&self.game) {
            Ok(coord) => serde_json::to_string(&coord).unwrap_or_else(|_| "null".to_string()),
            Err(_) => "null".to_string(),
        }
    }

    /// Discard the current game and start over
    #[wasm_bindgen(js_name = restart)]
    pub fn restart(&mut self) {
        self.game = Game::new();
    }
}

#[cfg(feature = "wasm")]
impl WasmGame {
    fn apply(&mut self, action: GameAction) -> Result<String, JsValue> {
        match self.game.apply_action(action) {
            Ok((game, events)) => {
                self.game = game;
                Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
            }
            Err(e) => Err(JsValue::from_str(&e.to_string())),
        }
    }
}

#[cfg(feature = "wasm")]
impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
