//! tessel-core: the terminal UI runtime underneath any widget or DSL layer.
//!
//! Turns a tree of declarative layout nodes into a styled character grid,
//! renders incremental updates, routes input by geometry, and coordinates
//! keyboard focus.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │     (node tree construction, components, styling)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Measure (bottom-up sizing)                   │
//! │   BoxConstraints → flex grow/shrink → measured sizes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Layout (top-down placement)                   │
//! │   justify/align/gap, absolute pass → LayoutResult boxes     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Render (z-ordered painting)                 │
//! │   component views → CellBuffer, styled-text runs, clipping  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Diff (dirty rectangles)                     │
//! │   previous frame vs current → merged repaint regions        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                ANSI encoder (byte stream)                   │
//! │   SGR collapsing, selection overlay, cursor addressing      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input events enter through the [`dispatch::Dispatcher`], which hit-tests
//! the cached layout boxes and hands events to the focused or hit component;
//! [`focus::FocusManager`] keeps at most one component focused and traps
//! traversal inside modal subtrees.
//!
//! The whole pipeline is single-threaded and cooperative: one frame is
//! *input → layout → render → present*, and no core call blocks or yields.
//!
//! ## Key Types
//!
//! - [`node::LayoutNode`] / [`node::NodeArena`]: the declarative tree
//! - [`component::Component`]: the contract widgets implement
//! - [`buffer::CellBuffer`]: the z-index-aware virtual character grid
//! - [`layout::LayoutResult`]: per-frame boxes for painting and hit-testing
//! - [`runtime::Runtime`]: the facade orchestrating the pipeline

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod component;
pub mod constraints;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod focus;
pub mod geometry;
pub mod layout;
pub mod measure;
pub mod node;
pub mod render;
pub mod runtime;
pub mod selection;
pub mod style;
pub mod text;

pub use ansi::{build_sgr, encode_frame, encode_regions};
pub use buffer::{acquire_buffer, clear_buffer_pool, release_buffer, CellBuffer};
pub use cell::{Cell, CellStyle};
pub use color::{Color, NamedColor};
pub use component::{Component, EventOutcome};
pub use constraints::BoxConstraints;
pub use diff::{diff, diff_with_slack, DiffResult};
pub use dispatch::Dispatcher;
pub use error::{Result, TesselError};
pub use event::{
    BlurEvent, Event, FocusEvent, FocusReason, KeyCode, KeyEvent, Modifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
pub use focus::{FocusDirection, FocusManager, FocusState};
pub use geometry::{Position, Rect, Size};
pub use layout::{layout, LayoutBox, LayoutResult};
pub use measure::measure;
pub use node::{
    LayoutNode, NodeArena, NodeId, NodeKind, Offsets, PositionKind, Priority, PropValue,
};
pub use render::render;
pub use runtime::{Frame, Runtime, RuntimeConfig};
pub use selection::{SelectionManager, SelectionMode};
pub use style::{AlignItems, Dimension, Direction, Insets, Justify, Overflow, Style};
