//! Reader for Cadence Allegro `.brd` binary board-layout files.
//!
//! Allegro `.brd` is an undocumented, version-dependent, little-endian
//! binary container whose structure is an in-memory object graph
//! serialised to disk. This crate memory-maps the file, walks its records
//! in file order while interning each by its 32-bit key, then traverses the
//! resulting key→record map to reconstruct a neutral board model.
//!
//! The pipeline is [`filemap::FileMap`] → [`parser::parse`] →
//! [`graph_builder::build`], wired together by [`load_board`].

pub mod board;
pub mod cursor;
pub mod error;
pub mod filemap;
pub mod graph_builder;
pub mod parser;
pub mod types;

pub use board::{BoardSink, InMemoryBoard};
pub use error::{BrdError, Result};
pub use filemap::FileMap;
pub use parser::Index;

use std::path::Path;

/// Loads a `.brd` file and builds its board entities into `board`.
///
/// Graph building only ever appends: callers that want to merge a loaded
/// file into an existing board model can pre-populate `board` themselves
/// before calling this function.
pub fn load_board<P: AsRef<Path>, S: BoardSink>(path: P, board: &mut S) -> Result<()> {
    let map = FileMap::open(path)?;
    let index = parser::parse(map.as_slice())?;
    graph_builder::build(&index, board);
    Ok(())
}

/// Loads a `.brd` file and returns a populated [`InMemoryBoard`], for
/// callers that don't already have a board model of their own (the CLI
/// host, and this crate's own integration tests).
pub fn load_board_in_memory<P: AsRef<Path>>(path: P) -> Result<InMemoryBoard> {
    let mut board = InMemoryBoard::default();
    load_board(path, &mut board)?;
    Ok(board)
}
