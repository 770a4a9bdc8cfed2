//! # rf-reels — Reel animation and spin orchestration for FluxForge Studio
//!
//! Simulates the visual reels of a multi-reel slot game: continuous
//! wrap-around scrolling, blurred/sharp symbol swapping and the staggered
//! cascade stop. Rendering, asset loading and tweening stay outside; the
//! core hands out textured rectangles and consumes a per-frame `dt`.
//!
//! ## Architecture
//!
//! ```text
//! SpinOrchestrator
//!     │
//!     ├── GameState (Idle → Spinning → Stopping → Idle)
//!     ├── TimerQueue (minimum-spin auto-stop)
//!     ├── StopTracker (completion counter, shared with reel callbacks)
//!     └── ReelSimulator × N
//!           │
//!           ├── SymbolSlot × 3 (offset, symbol, blurred)
//!           ├── TimerQueue (delayed settles)
//!           └── Arc<TextureTable> (sharp + blurred, shared)
//!           │
//!           v
//!     SymbolQuad → RenderSurface
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rf_reels::{GameConfig, PathTextureProvider, SpinOrchestrator, SymbolSet, TextureTable};
//!
//! let textures = TextureTable::load(&PathTextureProvider, &SymbolSet::classic())?;
//! let mut game = SpinOrchestrator::new(GameConfig::default(), Arc::new(textures))?;
//!
//! game.press_button();            // Idle → Spinning
//! game.advance(1.0 / 60.0);       // once per frame
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod reel;
pub mod render;
pub mod symbols;
pub mod texture;
pub mod timer;
pub mod timing;

pub use config::*;
pub use error::{ReelError, ReelResult};
pub use orchestrator::*;
pub use reel::*;
pub use render::*;
pub use symbols::*;
pub use texture::*;
pub use timer::{ScheduledTimer, TimerId, TimerQueue};
pub use timing::*;
