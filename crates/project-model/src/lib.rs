//! SlideKit Project Model
//!
//! Defines the core data contracts for carousel projects:
//! - **Frame:** one slide's text, typography, colors, background and overlays
//! - **Project:** ordered frames plus shared defaults, margins and signature
//! - **Editor:** the mutable state container with a current-frame cursor
//! - **Store:** persistence of whole projects as single records
//!
//! Frames are described in design units, independent of any render scale.
//! Overlay elements are positioned inside a fixed 400×400 reference box.

pub mod color;
pub mod editor;
pub mod frame;
pub mod project;
pub mod store;

pub use color::*;
pub use editor::*;
pub use frame::*;
pub use project::*;
pub use store::*;
