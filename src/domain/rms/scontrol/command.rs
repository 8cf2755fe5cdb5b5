use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long the pipe readers may lag behind the exited child. A descendant
/// that inherited stdout can keep the pipe open long after scontrol is gone.
const READER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

/// Joins a pipe reader, abandoning it once `deadline` passes.
fn join_reader(handle: JoinHandle<String>, deadline: Instant, command_line: &str) -> String {
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            log::warn!("Output of `{}` still held open by a descendant, ignoring it", command_line);
            return String::new();
        }
        thread::sleep(POLL_INTERVAL);
    }
    handle.join().unwrap_or_default()
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Runs `program args..` to completion, killing it once `timeout` has elapsed.
/// Both pipes are drained on helper threads so a chatty child cannot stall on
/// a full pipe while we poll it.
pub fn run_with_timeout(program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
    let command_line = format!("{} {}", program, args.join(" "));
    log::debug!("Running Slurm command `{}`", command_line);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                kill_and_reap(&mut child);
                log::error!("Slurm command `{}` timed out after {:?}", command_line, timeout);
                return Err(Error::CommandTimeout { command: command_line, timeout });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(Error::IoError(e));
            }
        }
    };

    let join_deadline = Instant::now() + READER_JOIN_TIMEOUT;
    let stdout = join_reader(stdout_reader, join_deadline, &command_line);
    let stderr = join_reader(stderr_reader, join_deadline, &command_line);

    Ok(CommandOutput { status, stdout, stderr })
}
