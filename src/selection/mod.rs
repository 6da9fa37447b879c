pub mod difficulty;
pub mod machine;

pub use difficulty::Difficulty;
pub use machine::{
    CompletedGesture, PhaseTransition, PointerTarget, SelectionMachine, SelectionPhase,
};
