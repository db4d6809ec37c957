//! # REPL Application Controller
//!
//! The controller orchestrates the REPL components and manages the event loop.
//! Key events go through the command registry and come back as
//! `CommandEvent`s applied here; engine output is drained between polls.

use crate::repl::{
    commands::{CommandContext, CommandEvent, CommandRegistry, ViewModelSnapshot},
    io::{EventStream, RenderStream, TerminalEventStream, TerminalRenderStream},
    markdown,
    models::LineStyle,
    services::{CalculatorEngine, EngineInstaller, EngineOutput, ENGINE_SCRIPT, README_FILE},
    view_models::{InputMode, Submission, ViewModel},
    views::{TerminalRenderer, ViewRenderer},
};
use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const DOWNLOAD_QUESTION: &str = "pyco.py not found in application directory.\n\
Would you like to download pyco.py and README.md from GitHub? (y/n): ";
const DOWNLOAD_REASK: &str = "Please enter 'y' for yes or 'n' for no: ";
const DOWNLOAD_CANCELLED: &str = "Download cancelled.\n";

fn about_text() -> String {
    format!(
        "### Pyco - Happy Calculating!\n\
         Your fully featured EDC - Every Day Calculator\n\n\
         pycoterm {}\n\
         {}\n\
         {}\n",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
        env!("CARGO_PKG_REPOSITORY"),
    )
}

/// What a typed answer to the download question means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadAnswer {
    Yes,
    No,
    Unclear,
}

impl DownloadAnswer {
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => DownloadAnswer::Yes,
            "n" | "no" => DownloadAnswer::No,
            _ => DownloadAnswer::Unclear,
        }
    }
}

/// The main application controller
pub struct AppController<ES: EventStream, RS: RenderStream> {
    view_model: ViewModel,
    view_renderer: TerminalRenderer<RS>,
    command_registry: CommandRegistry,
    event_stream: ES,
    engine: Box<dyn CalculatorEngine>,
    installer: EngineInstaller,
    /// Engine output before the first submission is pyco's banner
    loading_banner: bool,
    should_quit: bool,
}

impl AppController<TerminalEventStream, TerminalRenderStream> {
    /// Controller on the real terminal
    pub fn new(engine: Box<dyn CalculatorEngine>, installer: EngineInstaller) -> Result<Self> {
        Self::with_io_streams(
            TerminalEventStream::new(),
            TerminalRenderStream::new(),
            engine,
            installer,
        )
    }
}

impl<ES: EventStream, RS: RenderStream> AppController<ES, RS> {
    /// Create new application controller with injected I/O streams
    pub fn with_io_streams(
        event_stream: ES,
        render_stream: RS,
        engine: Box<dyn CalculatorEngine>,
        installer: EngineInstaller,
    ) -> Result<Self> {
        let mut view_model = ViewModel::new();
        let view_renderer = TerminalRenderer::with_render_stream(render_stream)?;

        let (width, height) = view_renderer.terminal_size();
        view_model.update_terminal_size(width, height);

        Ok(Self {
            view_model,
            view_renderer,
            command_registry: CommandRegistry::new(),
            event_stream,
            engine,
            installer,
            loading_banner: false,
            should_quit: false,
        })
    }

    /// Run the main application loop; the terminal is restored even when
    /// the loop fails
    pub async fn run(&mut self) -> Result<()> {
        self.view_renderer.initialize()?;
        let result = self.event_loop().await;
        if let Err(e) = &result {
            tracing::error!("Event loop failed: {:#}", e);
        }
        self.view_renderer.cleanup()?;
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        self.start_session().await;
        self.render()?;

        while !self.should_quit {
            if self.event_stream.poll(POLL_INTERVAL)? {
                let event = self.event_stream.read()?;
                self.process_event(event).await?;
            }
            if self.drain_engine_output() {
                self.render()?;
            }
        }
        Ok(())
    }

    /// Start the engine, or ask to download it when it is missing
    pub async fn start_session(&mut self) {
        if self.installer.is_installed() {
            self.start_engine().await;
        } else {
            tracing::info!(
                "{} missing from {}",
                ENGINE_SCRIPT,
                self.installer.install_dir().display()
            );
            self.view_model.system_message(DOWNLOAD_QUESTION);
            self.view_model.set_input_mode(InputMode::DownloadPrompt);
        }
    }

    async fn start_engine(&mut self) -> bool {
        match self.engine.start().await {
            Ok(()) => {
                self.loading_banner = true;
                true
            }
            Err(e) => {
                tracing::error!("Engine failed to start: {:#}", e);
                self.view_model
                    .system_message(&format!("Error loading {ENGINE_SCRIPT}: {e:#}\n"));
                false
            }
        }
    }

    /// Handle one terminal event and re-render
    pub async fn process_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key_event) => self.process_key_event(key_event).await,
            Event::Resize(width, height) => {
                self.apply_command_event(CommandEvent::TerminalResizeRequested { width, height })
                    .await?;
                self.render()
            }
            _ => Ok(()),
        }
    }

    /// Process a single key event without running the full event loop
    pub async fn process_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        if key_event.kind == KeyEventKind::Release {
            return Ok(());
        }
        tracing::debug!("Received key event: {:?}", key_event);

        let context = CommandContext::new(ViewModelSnapshot::from_view_model(&self.view_model));
        let events = self.command_registry.process_event(key_event, &context)?;
        if events.is_empty() {
            return Ok(());
        }

        tracing::debug!("Command events generated: {:?}", events);
        for event in events {
            self.apply_command_event(event).await?;
        }
        if !self.should_quit {
            self.render()?;
        }
        Ok(())
    }

    /// Apply a command event to the view model
    async fn apply_command_event(&mut self, event: CommandEvent) -> Result<()> {
        match event {
            CommandEvent::CursorMoveRequested { direction } => {
                self.view_model.move_cursor(direction);
            }
            CommandEvent::TextInsertRequested { text } => {
                self.view_model.insert_text(&text);
            }
            CommandEvent::TextDeleteRequested { direction } => {
                self.view_model.delete(direction);
            }
            CommandEvent::KillRequested { scope } => {
                self.view_model.kill(scope);
            }
            CommandEvent::YankRequested => {
                self.view_model.yank();
            }
            CommandEvent::HistoryNavigationRequested { direction } => {
                self.view_model.navigate_history(direction);
            }
            CommandEvent::SubmitRequested => {
                self.submit().await;
            }
            CommandEvent::CompletionRequested => {
                let width = self.view_renderer.content_width();
                let outcome = self.view_model.complete(width);
                tracing::debug!("Completion: {:?}", outcome);
            }
            CommandEvent::InterruptRequested => {
                self.interrupt();
            }
            CommandEvent::ClearScreenRequested => {
                self.view_model.clear_transcript();
            }
            CommandEvent::ShowReadmeRequested => {
                self.show_readme().await;
            }
            CommandEvent::UpdateEngineRequested => {
                self.update_engine().await?;
            }
            CommandEvent::ShowAboutRequested => {
                self.view_model.styled_message(&markdown::render(&about_text()));
            }
            CommandEvent::TerminalResizeRequested { width, height } => {
                self.view_model.update_terminal_size(width, height);
                self.view_renderer.update_size(width, height);
            }
            CommandEvent::QuitRequested => {
                tracing::info!("Quit requested");
                self.should_quit = true;
            }
            CommandEvent::NoAction => {}
        }
        Ok(())
    }

    async fn submit(&mut self) {
        match self.view_model.submit() {
            Submission::Blank => {}
            Submission::Line(line) => {
                self.loading_banner = false;
                if let Err(e) = self.engine.submit(&line).await {
                    tracing::error!("Engine submit failed: {:#}", e);
                    self.view_model.error_message(&format!("Engine error: {e:#}"));
                }
            }
            Submission::Answer(answer) => self.answer_download(&answer).await,
        }
    }

    async fn answer_download(&mut self, answer: &str) {
        match DownloadAnswer::parse(answer) {
            DownloadAnswer::Yes => {
                self.view_model.set_input_mode(InputMode::Calculator);
                if self.download_engine().await {
                    self.load_engine().await;
                }
            }
            DownloadAnswer::No => {
                self.view_model.system_message(DOWNLOAD_CANCELLED);
                self.view_model.set_input_mode(InputMode::Calculator);
            }
            DownloadAnswer::Unclear => {
                self.view_model.system_message(DOWNLOAD_REASK);
            }
        }
    }

    /// Download the engine files, reporting progress and failures in the
    /// transcript
    async fn download_engine(&mut self) -> bool {
        self.view_model
            .system_message(&format!("Downloading {ENGINE_SCRIPT} and {README_FILE}...\n"));
        if let Err(e) = self.render() {
            tracing::warn!("Render before download failed: {:#}", e);
        }

        match self.installer.install().await {
            Ok(message) => {
                tracing::info!("{}", message);
                true
            }
            Err(e) => {
                tracing::warn!("Engine download failed: {}", e);
                self.view_model.system_message(&format!(" {e}\n"));
                false
            }
        }
    }

    /// Load freshly downloaded engine code: start the engine, or re-run the
    /// script inside the running one so session state survives
    async fn load_engine(&mut self) {
        if !self.engine.is_running() {
            if !self.start_engine().await {
                self.view_model.system_message(&format!(
                    "Error: Could not load {ENGINE_SCRIPT} after download\n"
                ));
            }
            return;
        }

        let path = self.installer.script_path().display().to_string();
        let reload = format!("exec(compile(open({path:?}, encoding='utf-8').read(), {path:?}, 'exec'))");
        self.loading_banner = true;
        if let Err(e) = self.engine.submit(&reload).await {
            tracing::error!("Engine reload failed: {:#}", e);
            self.view_model.system_message(&format!(
                "Error: Could not load {ENGINE_SCRIPT} after download\n"
            ));
        }
    }

    async fn update_engine(&mut self) -> Result<()> {
        if self.view_model.input_mode() == InputMode::DownloadPrompt {
            self.view_model.set_input_mode(InputMode::Calculator);
        }
        if self.download_engine().await {
            self.load_engine().await;
        }
        Ok(())
    }

    async fn show_readme(&mut self) {
        match self.installer.readme().await {
            Ok(text) => self.view_model.styled_message(&markdown::render(&text)),
            Err(message) => self.view_model.system_message(&format!("{message}\n")),
        }
    }

    /// Ctrl+C: a typed line is abandoned locally; on an empty line the
    /// running engine gets the interrupt and reports it itself
    fn interrupt(&mut self) {
        if self.view_model.line().is_empty() && self.engine.is_running() {
            if let Err(e) = self.engine.interrupt() {
                tracing::warn!("Engine interrupt failed: {:#}", e);
                self.view_model.interrupt_line();
            }
        } else {
            self.view_model.interrupt_line();
        }
    }

    /// Move pending engine output into the transcript; true when anything
    /// arrived
    pub fn drain_engine_output(&mut self) -> bool {
        let mut changed = false;
        while let Some(output) = self.engine.try_recv() {
            changed = true;
            match output {
                EngineOutput::Stdout(text) if self.loading_banner => {
                    // Leading blank lines of the banner are dropped
                    let text = if self.view_model.transcript().is_empty() {
                        text.trim_start_matches('\n').to_string()
                    } else {
                        text
                    };
                    self.view_model.append_output(LineStyle::System, &text);
                }
                EngineOutput::Stdout(text) => {
                    self.view_model.append_output(LineStyle::Output, &text);
                }
                EngineOutput::Stderr(text) => {
                    self.view_model.append_output(LineStyle::Error, &text);
                }
                EngineOutput::Exited(code) => {
                    let status = code.map_or_else(|| "by signal".to_string(), |c| format!("with code {c}"));
                    self.view_model.system_message(&format!(
                        "Engine exited {status}; it restarts on the next line.\n"
                    ));
                }
            }
        }
        changed
    }

    fn render(&mut self) -> Result<()> {
        self.view_renderer.render(&self.view_model)
    }

    /// Get reference to view model (for testing)
    pub fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    /// Get mutable reference to view model (for testing)
    pub fn view_model_mut(&mut self) -> &mut ViewModel {
        &mut self.view_model
    }

    /// Check if the application should quit (for testing)
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
