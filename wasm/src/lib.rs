use minesweeper as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(width: u8, height: u8, mines: u16) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let board =
        ms::Board::new(width as usize, height as usize, mines as usize).map_err(|e| e.to_string())?;
    board.to_bytes().map_err(|e| e.to_string())
}

/// 0 while playing, 1 when won, 2 when lost.
#[wasm_bindgen]
pub fn status(bts: Vec<u8>) -> Result<u8, String> {
    console_error_panic_hook::set_once();

    let board = ms::Board::from_bytes(&bts).map_err(|e| e.to_string())?;
    Ok(match board.state() {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    })
}

#[wasm_bindgen]
pub fn act(bts: Vec<u8>, x: usize, y: usize, flag: bool) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut board = ms::Board::from_bytes(&bts).map_err(|e| e.to_string())?;
    let action = if flag {
        ms::Action::Flag
    } else {
        ms::Action::Reveal
    };
    board
        .act(ms::Point { x, y }, action)
        .map_err(|e| e.to_string())?;
    board.to_bytes().map_err(|e| e.to_string())
}

/// Row-major cells: -1 hidden, -2 flagged, -3 revealed mine, otherwise the adjacent mine count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let board = ms::Board::from_bytes(&bts).map_err(|e| e.to_string())?;
    Ok(board
        .snapshot()
        .rows()
        .iter()
        .flatten()
        .map(|cell| match cell {
            ms::Cell::Hidden => -1,
            ms::Cell::Flagged => -2,
            ms::Cell::Mine => -3,
            ms::Cell::Revealed(n) => *n as i8,
        })
        .collect())
}

/// Asks a fresh bot for a move: `[x, y, action]` with action 0 = reveal, 1 = flag.
#[wasm_bindgen]
pub fn bot_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let board = ms::Board::from_bytes(&bts).map_err(|e| e.to_string())?;
    let next = ms::Bot::new().next_move(&board.snapshot(), &mut rand::rng());
    let action = match next.action {
        ms::Action::Reveal => 0,
        ms::Action::Flag => 1,
    };
    Ok(vec![next.at.x as u32, next.at.y as u32, action])
}
