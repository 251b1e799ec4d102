pub mod game;

// Canvas the playfield is letterboxed into, in terminal cells.
pub const WIDTH: u16 = 92;
pub const HEIGHT: u16 = 36;
