//! # Terminal Front-End
//!
//! A CRT-styled line editor in front of the pyco calculator engine,
//! organised the MVVM way:
//!
//! ```text
//! ┌─────────────┐  KeyEvent  ┌──────────────┐  CommandEvent  ┌──────────────┐
//! │ EventStream │───────────▶│   Commands   │───────────────▶│  Controller  │
//! └─────────────┘            └──────────────┘                └──────┬───────┘
//!                                                                  │ applies
//! ┌─────────────┐   render   ┌──────────────┐   owns         ┌──────▼───────┐
//! │RenderStream │◀───────────│   Renderer   │◀───────────────│  ViewModel   │
//! └─────────────┘            └──────────────┘                └──────────────┘
//!                                   engine stdin / stdout ▲▼ CalculatorEngine
//! ```

pub mod commands;
pub mod completion;
pub mod controllers;
pub mod highlight;
pub mod io;
pub mod markdown;
pub mod models;
pub mod services;
pub mod view_models;
pub mod views;

pub use commands::{Command, CommandContext, CommandEvent, CommandRegistry, ViewModelSnapshot};
pub use controllers::AppController;
pub use view_models::ViewModel;
