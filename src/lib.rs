//! umu-front - Game launcher front-end for umu-run
//!
//! Library crate holding the game collection, its persistence and the
//! runner invocation, shared with the CLI binary.

pub mod paths;

pub mod artwork;
pub mod catalog;
pub mod config;
pub mod error;
pub mod game;
pub mod launch;
pub mod library;
pub mod logging;
pub mod proton;
pub mod store;

pub use error::{LaunchError, LibraryError, StoreError};
pub use game::{Game, GameFields};
pub use library::Library;
pub use store::GameStore;
