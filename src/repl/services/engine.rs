//! # Calculator Engine Service
//!
//! Runs the pyco engine as a child Python process and streams its output
//! back over a channel the controller drains between key events.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::sync::mpsc;

/// Capacity of the output channel
const OUTPUT_CHANNEL_SIZE: usize = 64;
const READ_CHUNK_SIZE: usize = 4096;

/// Loads `pyco.py` from the directory passed as the first argument, then
/// runs one input line at a time: expressions go through `sys.displayhook`,
/// anything else is executed, errors go through `sys.excepthook`.
///
/// Every line is complete on its own, so one-line compound statements run
/// without a closing blank line.
const BOOTSTRAP: &str = r#"import sys, os
g = {'__name__': '__main__', '__builtins__': __builtins__}

def run(src, name):
    try:
        try:
            code = compile(src, name, 'eval')
        except SyntaxError:
            exec(compile(src, name, 'exec'), g)
        else:
            result = eval(code, g)
            if result is not None:
                sys.displayhook(result)
    except SystemExit:
        raise
    except KeyboardInterrupt:
        sys.stderr.write('KeyboardInterrupt\n')
    except BaseException:
        sys.excepthook(*sys.exc_info())
    sys.stdout.flush()
    sys.stderr.flush()

p = os.path.join(sys.argv[1], 'pyco.py')
try:
    with open(p, encoding='utf-8') as f:
        src = f.read()
except OSError as e:
    sys.stderr.write('Error loading pyco.py: %s\n' % e)
else:
    run(src, p)

while True:
    try:
        line = sys.stdin.readline()
    except KeyboardInterrupt:
        sys.stderr.write('KeyboardInterrupt\n')
        continue
    if not line:
        break
    line = line.rstrip('\r\n')
    if line.strip():
        run(line, '<input>')
"#;

#[cfg(windows)]
pub const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_PYTHON: &str = "python3";

/// A chunk of engine output, or its exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutput {
    Stdout(String),
    Stderr(String),
    /// Exit code, when the process exited normally
    Exited(Option<i32>),
}

/// Program and arguments used to start the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Python running the line loop with `pyco.py` from `install_dir`
    pub fn python(program: impl Into<String>, install_dir: &Path) -> Self {
        let args = ["-u", "-c", BOOTSTRAP]
            .iter()
            .map(|s| s.to_string())
            .chain(std::iter::once(install_dir.display().to_string()))
            .collect();
        Self::new(program, args)
    }
}

/// The external calculator the front-end talks to
#[async_trait]
pub trait CalculatorEngine: Send {
    /// Start the engine if it is not already running
    async fn start(&mut self) -> Result<()>;

    /// Send one line of input, starting the engine first if needed
    async fn submit(&mut self, line: &str) -> Result<()>;

    /// Next pending output chunk, without blocking
    fn try_recv(&mut self) -> Option<EngineOutput>;

    /// Ask the engine to abandon what it is doing
    fn interrupt(&mut self) -> Result<()>;

    fn is_running(&self) -> bool;
}

/// Take the longest valid UTF-8 prefix out of `carry`, leaving an
/// incomplete trailing sequence for the next read
fn take_utf8(carry: &mut Vec<u8>) -> String {
    match std::str::from_utf8(carry) {
        Ok(text) => {
            let text = text.to_string();
            carry.clear();
            text
        }
        Err(e) if e.error_len().is_none() => {
            let valid = e.valid_up_to();
            let text = String::from_utf8_lossy(&carry[..valid]).into_owned();
            carry.drain(..valid);
            text
        }
        Err(_) => {
            let text = String::from_utf8_lossy(carry).into_owned();
            carry.clear();
            text
        }
    }
}

async fn forward_output<R>(
    mut reader: R,
    sender: mpsc::Sender<EngineOutput>,
    wrap: fn(String) -> EngineOutput,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; READ_CHUNK_SIZE];
    let mut carry = Vec::new();
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Engine output read failed: {}", e);
                break;
            }
        };
        carry.extend_from_slice(&buf[..n]);
        let text = take_utf8(&mut carry);
        if !text.is_empty() && sender.send(wrap(text)).await.is_err() {
            return;
        }
    }
    if !carry.is_empty() {
        let _ = sender
            .send(wrap(String::from_utf8_lossy(&carry).into_owned()))
            .await;
    }
}

/// Engine backed by a child process
pub struct ProcessEngine {
    command: EngineCommand,
    stdin: Option<ChildStdin>,
    pid: Option<u32>,
    running: Arc<AtomicBool>,
    sender: mpsc::Sender<EngineOutput>,
    receiver: mpsc::Receiver<EngineOutput>,
}

impl ProcessEngine {
    pub fn new(command: EngineCommand) -> Self {
        let (sender, receiver) = mpsc::channel(OUTPUT_CHANNEL_SIZE);
        Self {
            command,
            stdin: None,
            pid: None,
            running: Arc::new(AtomicBool::new(false)),
            sender,
            receiver,
        }
    }

    pub fn command(&self) -> &EngineCommand {
        &self.command
    }
}

#[async_trait]
impl CalculatorEngine for ProcessEngine {
    async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to start engine '{}'", self.command.program))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Engine stdout is not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("Engine stderr is not piped"))?;
        self.stdin = child.stdin.take();
        self.pid = child.id();
        self.running.store(true, Ordering::SeqCst);
        tracing::info!(
            "Engine started: {} (pid {:?})",
            self.command.program,
            self.pid
        );

        let out_task = tokio::spawn(forward_output(
            stdout,
            self.sender.clone(),
            EngineOutput::Stdout,
        ));
        let err_task = tokio::spawn(forward_output(
            stderr,
            self.sender.clone(),
            EngineOutput::Stderr,
        ));

        let sender = self.sender.clone();
        let running = Arc::clone(&self.running);
        tokio::spawn(async move {
            let status = child.wait().await;
            // Exit is reported after every byte of output
            let _ = out_task.await;
            let _ = err_task.await;
            running.store(false, Ordering::SeqCst);
            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    tracing::error!("Waiting on engine failed: {}", e);
                    None
                }
            };
            tracing::info!("Engine exited with {:?}", code);
            let _ = sender.send(EngineOutput::Exited(code)).await;
        });
        Ok(())
    }

    async fn submit(&mut self, line: &str) -> Result<()> {
        if !self.is_running() {
            self.start().await?;
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("Engine stdin is closed"))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        tracing::debug!("Sent to engine: {:?}", line);
        Ok(())
    }

    fn try_recv(&mut self) -> Option<EngineOutput> {
        let output = self.receiver.try_recv().ok()?;
        if matches!(output, EngineOutput::Exited(_)) {
            self.stdin = None;
            self.pid = None;
        }
        Some(output)
    }

    #[cfg(unix)]
    fn interrupt(&mut self) -> Result<()> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.pid.filter(|_| self.is_running()) else {
            return Ok(());
        };
        let pid = i32::try_from(pid).context("Engine pid out of range")?;
        kill(Pid::from_raw(pid), Signal::SIGINT).context("Failed to interrupt engine")?;
        tracing::debug!("Sent SIGINT to engine pid {}", pid);
        Ok(())
    }

    #[cfg(not(unix))]
    fn interrupt(&mut self) -> Result<()> {
        tracing::debug!("Engine interrupt is not supported on this platform");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Replies produced by a `ScriptedEngine` for one submitted line
pub type Responder = Box<dyn Fn(&str) -> Vec<EngineOutput> + Send>;

/// In-process engine for tests: records submissions and answers from a
/// responder function
pub struct ScriptedEngine {
    responder: Responder,
    pending: std::collections::VecDeque<EngineOutput>,
    submitted: Arc<Mutex<Vec<String>>>,
    interrupts: Arc<Mutex<usize>>,
    running: bool,
}

impl ScriptedEngine {
    pub fn new(responder: impl Fn(&str) -> Vec<EngineOutput> + Send + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            pending: Default::default(),
            submitted: Arc::new(Mutex::new(Vec::new())),
            interrupts: Arc::new(Mutex::new(0)),
            running: false,
        }
    }

    /// Engine that prints nothing
    pub fn silent() -> Self {
        Self::new(|_| Vec::new())
    }

    /// Queue output as if the engine printed it unprompted
    pub fn push_output(&mut self, output: EngineOutput) {
        self.pending.push_back(output);
    }

    /// Shared view of every submitted line
    pub fn submitted(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.submitted)
    }

    /// Shared count of interrupts received
    pub fn interrupts(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.interrupts)
    }
}

#[async_trait]
impl CalculatorEngine for ScriptedEngine {
    async fn start(&mut self) -> Result<()> {
        self.running = true;
        Ok(())
    }

    async fn submit(&mut self, line: &str) -> Result<()> {
        self.running = true;
        self.submitted
            .lock()
            .map_err(|_| anyhow!("submission log poisoned"))?
            .push(line.to_string());
        let replies = (self.responder)(line);
        self.pending.extend(replies);
        Ok(())
    }

    fn try_recv(&mut self) -> Option<EngineOutput> {
        let output = self.pending.pop_front()?;
        if matches!(output, EngineOutput::Exited(_)) {
            self.running = false;
        }
        Some(output)
    }

    fn interrupt(&mut self) -> Result<()> {
        *self
            .interrupts
            .lock()
            .map_err(|_| anyhow!("interrupt count poisoned"))? += 1;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn collect_until_exit(engine: &mut impl CalculatorEngine) -> Vec<EngineOutput> {
        let mut outputs = Vec::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while tokio::time::Instant::now() < deadline {
            match engine.try_recv() {
                Some(output) => {
                    let done = matches!(output, EngineOutput::Exited(_));
                    outputs.push(output);
                    if done {
                        break;
                    }
                }
                None => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        outputs
    }

    fn stdout_text(outputs: &[EngineOutput]) -> String {
        outputs
            .iter()
            .filter_map(|o| match o {
                EngineOutput::Stdout(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn take_utf8_keeps_incomplete_sequence_for_next_read() {
        let bytes = "π=3".as_bytes();
        let mut carry = bytes[..1].to_vec();
        assert_eq!(take_utf8(&mut carry), "");
        assert_eq!(carry.len(), 1);

        carry.extend_from_slice(&bytes[1..]);
        assert_eq!(take_utf8(&mut carry), "π=3");
        assert!(carry.is_empty());
    }

    #[test]
    fn take_utf8_replaces_invalid_bytes() {
        let mut carry = vec![b'a', 0xff, b'b'];
        assert_eq!(take_utf8(&mut carry), "a\u{fffd}b");
        assert!(carry.is_empty());
    }

    #[test]
    fn python_command_passes_install_dir_after_bootstrap() {
        let command = EngineCommand::python("python3", Path::new("/opt/pyco"));
        assert_eq!(command.program, "python3");
        assert_eq!(&command.args[..2], ["-u", "-c"]);
        assert!(command.args[2].contains("pyco.py"));
        assert_eq!(command.args[3], "/opt/pyco");
        assert!(!command.args.iter().any(|arg| arg == "-i"));
    }

    fn python_available() -> bool {
        std::process::Command::new(DEFAULT_PYTHON)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Collect output until stdout ends with `stdout_suffix` or time runs out
    async fn collect_until_stdout(
        engine: &mut impl CalculatorEngine,
        stdout_suffix: &str,
    ) -> (String, String) {
        let (mut stdout, mut stderr) = (String::new(), String::new());
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while tokio::time::Instant::now() < deadline && !stdout.ends_with(stdout_suffix) {
            match engine.try_recv() {
                Some(EngineOutput::Stdout(text)) => stdout.push_str(&text),
                Some(EngineOutput::Stderr(text)) => stderr.push_str(&text),
                Some(EngineOutput::Exited(code)) => panic!("engine exited with {code:?}"),
                None => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        (stdout, stderr)
    }

    #[tokio::test]
    async fn python_engine_runs_one_line_compound_statements() {
        if !python_available() {
            eprintln!("skipping: {DEFAULT_PYTHON} not found");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pyco.py"), "base = 20\n").unwrap();
        let mut engine = ProcessEngine::new(EngineCommand::python(DEFAULT_PYTHON, dir.path()));

        engine.submit("for i in range(3): print(i)").await.unwrap();
        engine.submit("def double(x): return x * 2").await.unwrap();
        engine.submit("1/0").await.unwrap();
        engine.submit("double(base) + 2").await.unwrap();

        let (stdout, stderr) = collect_until_stdout(&mut engine, "42\n").await;
        assert_eq!(stdout, "0\n1\n2\n42\n");
        assert!(stderr.contains("ZeroDivisionError"));
        assert!(!stderr.contains("SyntaxError"));
        assert!(engine.is_running());
    }

    #[tokio::test]
    async fn python_engine_reloads_script_in_place() {
        if !python_available() {
            eprintln!("skipping: {DEFAULT_PYTHON} not found");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("pyco.py");
        std::fs::write(&script, "VERSION = 1\n").unwrap();
        let mut engine = ProcessEngine::new(EngineCommand::python(DEFAULT_PYTHON, dir.path()));

        engine.submit("kept = 'yes'").await.unwrap();
        std::fs::write(&script, "VERSION = 2\n").unwrap();
        let path = script.display().to_string();
        engine
            .submit(&format!("exec(compile(open({path:?}).read(), {path:?}, 'exec'))"))
            .await
            .unwrap();
        engine.submit("print(VERSION, kept)").await.unwrap();

        let (stdout, _) = collect_until_stdout(&mut engine, "2 yes\n").await;
        assert_eq!(stdout, "2 yes\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_engine_echoes_submitted_lines() {
        let mut engine = ProcessEngine::new(EngineCommand::new(
            "sh",
            vec!["-c".into(), "read line; echo \"got $line\"".into()],
        ));
        engine.submit("2+2").await.unwrap();

        let outputs = collect_until_exit(&mut engine).await;
        assert_eq!(stdout_text(&outputs), "got 2+2\n");
        assert_eq!(outputs.last(), Some(&EngineOutput::Exited(Some(0))));
        assert!(!engine.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_engine_reports_stderr_and_exit_code() {
        let mut engine = ProcessEngine::new(EngineCommand::new(
            "sh",
            vec!["-c".into(), "echo oops >&2; exit 3".into()],
        ));
        engine.start().await.unwrap();

        let outputs = collect_until_exit(&mut engine).await;
        assert!(outputs.contains(&EngineOutput::Stderr("oops\n".into())));
        assert_eq!(outputs.last(), Some(&EngineOutput::Exited(Some(3))));
    }

    #[tokio::test]
    async fn missing_program_fails_to_start() {
        let mut engine = ProcessEngine::new(EngineCommand::new(
            "pycoterm-no-such-engine",
            Vec::new(),
        ));
        assert!(engine.start().await.is_err());
        assert!(!engine.is_running());
    }

    #[tokio::test]
    async fn scripted_engine_answers_from_responder() {
        let mut engine = ScriptedEngine::new(|line| vec![EngineOutput::Stdout(format!("{line}!\n"))]);
        let submitted = engine.submitted();
        engine.submit("1").await.unwrap();
        assert_eq!(engine.try_recv(), Some(EngineOutput::Stdout("1!\n".into())));
        assert_eq!(engine.try_recv(), None);
        assert_eq!(*submitted.lock().unwrap(), ["1"]);
    }
}
