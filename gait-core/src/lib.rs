#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

// Control-plan scheduling for the four-key running rig.
//
// This crate stays portable by avoiding the Rust standard library; growable
// plan storage sits behind the `alloc` feature so the allocation-free pieces
// (key sets, holds, the REPL grammar) remain usable anywhere.

pub mod driver;
pub mod gaits;
pub mod hold;
pub mod keys;
pub mod plan;
#[cfg(feature = "alloc")]
pub mod queue;
pub mod repl;
pub mod telemetry;
#[cfg(feature = "alloc")]
pub mod wire;
