//! # Services Layer
//!
//! Resources outside the process: the engine and its download.

pub mod engine;
pub mod installer;

pub use engine::{
    CalculatorEngine, EngineCommand, EngineOutput, ProcessEngine, ScriptedEngine, DEFAULT_PYTHON,
};
pub use installer::{
    DownloadError, EngineInstaller, DEFAULT_DOWNLOAD_URL, ENGINE_SCRIPT, README_FILE,
};
