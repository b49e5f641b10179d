// This is free and unencumbered software released into the public domain.

//! Front-facing depth (time-of-flight) camera capture.
//!
//! The crate opens one depth-capable camera, drives a single repeating
//! DEPTH16 capture request and hands each frame to the registered sinks.

extern crate alloc;

pub mod cli;
pub mod shared;
