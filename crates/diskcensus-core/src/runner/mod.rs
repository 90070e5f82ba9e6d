/// Bounded execution of the external partitioning tool.
///
/// Each call writes the command script to a private temp file, points the
/// tool's stdout at a second temp file (the sink), and polls the child
/// until it exits or the deadline passes. Both temp files are owned by
/// `NamedTempFile` guards, so they are removed on every exit path:
/// success, timeout, launch failure, or an unwinding panic.
///
/// The lifecycle is an explicit [`ProcessState`] machine advanced one poll
/// tick at a time by [`ProcessRunner::step`]. Forced termination happens
/// only on the transition into `TimedOut`.
pub mod script;

use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Anything that can execute a command script and return its captured lines.
///
/// [`ProcessRunner`] is the real implementation; tests substitute canned
/// captures.
pub trait CommandRunner {
    fn run(&self, script: &str, timeout: Duration) -> Result<Vec<String>>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, script: &str, timeout: Duration) -> Result<Vec<String>> {
        (**self).run(script, timeout)
    }
}

/// Lifecycle of a single tool invocation.
#[derive(Debug)]
pub enum ProcessState {
    /// Script and sink are ready; the process has not been spawned.
    Starting,
    /// The process is alive and must finish before `deadline`.
    Running { child: Child, deadline: Instant },
    /// The process exited. Unreadable exit codes are reported as 0.
    Completed { exit_code: i32 },
    /// The deadline passed and the process was terminated.
    TimedOut,
    /// The process could not be spawned or supervised.
    Failed(std::io::Error),
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::TimedOut | Self::Failed(_)
        )
    }
}

/// Files and limits for one call, alive for the duration of the call.
pub struct Invocation {
    script: NamedTempFile,
    sink: NamedTempFile,
    timeout: Duration,
}

impl Invocation {
    /// Path of the stdout capture file.
    pub fn sink_path(&self) -> &std::path::Path {
        self.sink.path()
    }
}

/// Runs the configured tool against generated scripts, one process per call.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    script_flag: Option<String>,
    poll_interval: Duration,
    settle_grace: Duration,
}

impl ProcessRunner {
    pub fn new(config: &InventoryConfig) -> Self {
        Self {
            program: config.tool.clone(),
            script_flag: config.script_flag.clone(),
            poll_interval: config.poll_interval,
            settle_grace: config.settle_grace,
        }
    }

    fn tool_name(&self) -> String {
        self.program.display().to_string()
    }

    fn launch_error(&self, source: std::io::Error) -> InventoryError {
        InventoryError::Launch {
            tool: self.tool_name(),
            source,
        }
    }

    /// Write `script` to a fresh temp file and create an empty sink.
    pub fn prepare(&self, script: &str, timeout: Duration) -> Result<Invocation> {
        let mut script_file = tempfile::Builder::new()
            .prefix("diskcensus-script-")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| self.launch_error(e))?;
        std::io::Write::write_all(&mut script_file, script.as_bytes())
            .and_then(|()| script_file.as_file().sync_all())
            .map_err(|e| self.launch_error(e))?;

        let sink = tempfile::Builder::new()
            .prefix("diskcensus-out-")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| self.launch_error(e))?;

        Ok(Invocation {
            script: script_file,
            sink,
            timeout,
        })
    }

    /// Advance `state` by one poll tick.
    ///
    /// `Running` either stays `Running` (after sleeping one poll interval,
    /// clipped to the deadline), completes, or times out. Terminal states
    /// are returned unchanged.
    pub fn step(&self, state: ProcessState, inv: &Invocation) -> ProcessState {
        match state {
            ProcessState::Starting => match self.spawn(inv) {
                Ok(child) => {
                    debug!(pid = child.id(), tool = %self.tool_name(), "tool started");
                    ProcessState::Running {
                        child,
                        deadline: Instant::now() + inv.timeout,
                    }
                }
                Err(e) => ProcessState::Failed(e),
            },
            ProcessState::Running { mut child, deadline } => match child.try_wait() {
                Ok(Some(status)) => {
                    thread::sleep(self.settle_grace);
                    let exit_code = status.code().unwrap_or(0);
                    ProcessState::Completed { exit_code }
                }
                Ok(None) => {
                    let now = Instant::now();
                    if now >= deadline {
                        Self::time_out(child)
                    } else {
                        thread::sleep(self.poll_interval.min(deadline - now));
                        ProcessState::Running { child, deadline }
                    }
                }
                Err(e) => {
                    Self::terminate(&mut child);
                    ProcessState::Failed(e)
                }
            },
            terminal => terminal,
        }
    }

    fn spawn(&self, inv: &Invocation) -> std::io::Result<Child> {
        let stdout = inv.sink.reopen()?;
        let mut cmd = Command::new(&self.program);
        if let Some(flag) = &self.script_flag {
            cmd.arg(flag);
        }
        cmd.arg(inv.script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::null())
            .spawn()
    }

    fn time_out(mut child: Child) -> ProcessState {
        Self::terminate(&mut child);
        ProcessState::TimedOut
    }

    /// Best-effort kill and reap. Failures are logged and otherwise ignored.
    fn terminate(child: &mut Child) {
        if let Err(e) = child.kill() {
            warn!(pid = child.id(), "failed to terminate tool: {e}");
        }
        if let Err(e) = child.wait() {
            debug!(pid = child.id(), "failed to reap tool: {e}");
        }
    }

    /// Read the sink as lines. A missing sink is a capture failure; an
    /// empty one is a valid, empty capture.
    pub fn collect(&self, inv: &Invocation) -> Result<Vec<String>> {
        let bytes = std::fs::read(inv.sink_path()).map_err(|source| InventoryError::Capture {
            tool: self.tool_name(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_owned)
            .collect())
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, script: &str, timeout: Duration) -> Result<Vec<String>> {
        let inv = self.prepare(script, timeout)?;
        let started = Instant::now();

        let mut state = ProcessState::Starting;
        let exit_code = loop {
            state = match self.step(state, &inv) {
                ProcessState::Completed { exit_code } => break exit_code,
                ProcessState::TimedOut => {
                    return Err(InventoryError::Timeout {
                        tool: self.tool_name(),
                        timeout,
                    })
                }
                ProcessState::Failed(source) => return Err(self.launch_error(source)),
                pending => pending,
            };
        };

        if exit_code != 0 {
            warn!(exit_code, tool = %self.tool_name(), "tool exited with non-zero code");
        }
        let lines = self.collect(&inv)?;
        debug!(
            lines = lines.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tool output captured"
        );
        Ok(lines)
    }
}
