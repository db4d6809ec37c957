//! # pycoterm - CRT-Styled Terminal for the pyco Calculator
//!
//! A retro green-phosphor front-end around the pyco "every day calculator"
//! plus the offline asset cache used by its web variant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   keys    ┌──────────────┐   lines   ┌──────────────┐
//! │   Terminal   │──────────▶│     repl     │──────────▶│ pyco engine  │
//! │  (crossterm) │◀──────────│  MVVM + CRT  │◀──────────│  (python3)   │
//! └──────────────┘   frames  └──────────────┘   output  └──────────────┘
//!
//! ┌──────────────┐           ┌──────────────┐
//! │ cache command│──────────▶│   offline    │──▶ HttpNetwork / DiskCacheStore
//! └──────────────┘           └──────────────┘
//! ```

pub mod cmd_args;
pub mod config;
pub mod offline;
pub mod repl;
pub mod subcommands;

pub use repl::AppController;
