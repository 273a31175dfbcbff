//! Outcome generators
//!
//! Each game is a pure function of validated parameters and draws from a
//! [`crate::rng::RandomSource`]. [`resolve`] is the single entry point for
//! one-shot rounds; the interactive games also expose round state machines
//! held in [`ActiveRounds`] between player actions.

pub mod arcade;
pub mod blackjack;
pub mod crash;
pub mod keno;
pub mod mines;
pub mod pending_pool;
pub mod plinko;
pub mod processor;
pub mod roulette;
pub mod rules;
pub mod slots;
pub mod threshold;
pub mod types;
pub mod weighted;
pub mod wheel;

pub use pending_pool::{ActiveRound, ActiveRounds, RoundState};
pub use processor::{resolve, GameProcessor, PreparedGame};
pub use rules::GameRules;
pub use types::*;
