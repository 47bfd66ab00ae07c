//! Remote execution over ssh/scp
//!
//! Each remote command is a local `ssh` (or `scp`) child process. Its stdout
//! and stderr share one pipe, drained line by line by a small reader thread
//! so polling the handle never blocks.

use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use rollkit::{RemoteExecutor, RemoteHandle};

use crate::config::Settings;

/// Executor that reaches hosts with the system `ssh` and `scp` clients
pub struct SshExecutor {
    pem_file: PathBuf,
    port: u16,
    user: String,
}

impl SshExecutor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            pem_file: settings.pem_file.clone(),
            port: settings.port,
            user: settings.ssh_user.clone(),
        }
    }

    fn ssh_args(&self, host: &str, command: &str) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.pem_file.display().to_string(),
            "-p".to_string(),
            self.port.to_string(),
            format!("{}@{}", self.user, host),
            command.to_string(),
        ]
    }

    fn scp_args(&self, local_path: &Path, host: &str, remote_dir: &str) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.pem_file.display().to_string(),
            "-P".to_string(),
            self.port.to_string(),
            local_path.display().to_string(),
            format!("{}@{}:{}", self.user, host, remote_dir),
        ]
    }

    fn spawn(
        &self,
        host: &str,
        program: &str,
        args: &[String],
    ) -> rollkit::Result<Box<dyn RemoteHandle>> {
        log::debug!("Launching: {} {}", program, args.join(" "));
        let handle =
            ProcessHandle::spawn(program, args).map_err(|source| rollkit::Error::Launch {
                host: host.to_string(),
                source,
            })?;
        Ok(Box::new(handle))
    }
}

impl RemoteExecutor for SshExecutor {
    fn launch(&self, host: &str, command: &str) -> rollkit::Result<Box<dyn RemoteHandle>> {
        self.spawn(host, "ssh", &self.ssh_args(host, command))
    }

    fn copy(
        &self,
        local_path: &Path,
        host: &str,
        remote_dir: &str,
    ) -> rollkit::Result<Box<dyn RemoteHandle>> {
        self.spawn(host, "scp", &self.scp_args(local_path, host, remote_dir))
    }
}

/// How long a finished process may take to flush its remaining output.
///
/// Helpers the child started (an ssh control master, a backgrounded job) can
/// keep the pipe open long after the child itself exited.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(200);

/// A running local process with merged, non-blocking output
pub struct ProcessHandle {
    child: Child,
    lines: Receiver<String>,
    // Lines collected while draining after exit
    pending: Vec<String>,
    exit_code: Option<i32>,
}

impl ProcessHandle {
    /// Spawn `program` with stdout and stderr merged into one stream
    pub fn spawn(program: &str, args: &[String]) -> io::Result<Self> {
        let (pipe_reader, pipe_writer) = io::pipe()?;
        let child = {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(pipe_writer.try_clone()?)
                .stderr(pipe_writer);
            command.spawn()?
            // `command` drops here, closing our copies of the write end
        };

        let (tx, lines) = mpsc::channel();
        // Detached: it ends on EOF, or once the handle is dropped.
        thread::spawn(move || {
            let mut reader = BufReader::new(pipe_reader);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf)
                            .trim_end_matches(['\n', '\r'])
                            .to_string();
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            child,
            lines,
            pending: Vec::new(),
            exit_code: None,
        })
    }

    /// Collect output until the pipe closes or [`DRAIN_TIMEOUT`] passes.
    fn drain(&mut self) {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => self.pending.push(line),
                Err(RecvTimeoutError::Timeout) => {
                    log::debug!("Output still open after exit, continuing without it");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl RemoteHandle for ProcessHandle {
    fn completed(&mut self) -> bool {
        if self.exit_code.is_some() {
            return true;
        }
        let code = match self.child.try_wait() {
            Ok(Some(status)) => status.code().unwrap_or(-1),
            Ok(None) => return false,
            Err(e) => {
                log::warn!("Failed to poll child process: {e}");
                -1
            }
        };
        self.drain();
        self.exit_code = Some(code);
        true
    }

    fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    fn read_lines(&mut self) -> Vec<String> {
        let mut lines = std::mem::take(&mut self.pending);
        lines.extend(self.lines.try_iter());
        lines
    }
}
