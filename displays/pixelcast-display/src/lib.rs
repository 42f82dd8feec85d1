//! Canvas abstraction and screen renderer for PixelCast
//!
//! This crate provides:
//! - `Canvas` trait for pixel surfaces (HUB75 panel DMA buffer, test doubles)
//! - `Renderer` that turns a controller [`Frame`](pixelcast_core::Frame)
//!   into draw calls
//!
//! # Architecture
//!
//! The render loop owns a `pixelcast_core::Controller` and a panel driver
//! that implements `Canvas`. Each iteration it ticks the controller, asks it
//! for a frame and passes the frame to the renderer together with the wall
//! clock time for the clock and date screens.

#![cfg_attr(not(test), no_std)]

pub mod canvas;
pub mod renderer;

// Re-export key types
pub use canvas::{Canvas, CanvasError};
pub use renderer::{Renderer, WallTime};
