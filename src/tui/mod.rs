//! Terminal dashboard: state machine, layout, rendering and the render loop.
//!
//! Seams follow the data flow of one tick:
//! `input` → `update` → `model`, then `layout` → `downsample` → `render`,
//! driven by `runtime` over a `surface`.

#![allow(missing_docs)]

pub mod downsample;
pub mod input;
pub mod layout;
pub mod model;
pub mod render;
pub mod runtime;
pub mod signals;
pub mod surface;
pub mod terminal_guard;
pub mod theme;
pub mod update;
pub mod widgets;

#[cfg(test)]
mod test_properties;

pub use runtime::CancellationToken;
pub use surface::{HeadlessKeys, Surface};
