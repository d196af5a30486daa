//! Gesture interpretation: raw pointer, touch, wheel and keyboard events in,
//! normalized transform intents out.
//!
//! # Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`input`] | Host-facing event types (keys, touch lists) |
//! | [`intent`] | [`Intent`] and [`Change`], the interpreter's output vocabulary |
//! | [`interpreter`] | [`GestureInterpreter`] and its transient [`GestureContext`] |
//!
//! The interpreter never mutates transform state itself. It reads the current
//! state, updates its own per-gesture bookkeeping, and returns an [`Intent`]
//! that the owner applies through the commit protocol in [`crate::history`].

pub mod input;
pub mod intent;
pub mod interpreter;

pub use input::Key;
pub use intent::{Change, Intent};
pub use interpreter::{GestureContext, GestureInterpreter, GestureSettings};
