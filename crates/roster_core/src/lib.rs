//! Student roster page core: storage-backed roster, seed sources, rendering,
//! and the controllers that drive the roster and registration pages.

pub mod controller;
pub mod registration;
pub mod render;
pub mod seed;
pub mod store;

pub use controller::{ControllerOptions, ControllerState, RosterController, ViewUpdate};
pub use registration::{RegistrationPage, RegistrationView};
pub use render::{render, DisplayTree, StudentCard};
pub use seed::{BuiltinSeedSource, FileSeedSource, HttpSeedSource, SeedSource};
pub use store::{filter, sort, LoadError, LoadOutcome, Matches, RosterStore};
