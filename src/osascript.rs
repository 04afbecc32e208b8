//! Execution engine for AppleScript automation.
//!
//! Mail corrupts state under concurrent automation, so every script in the
//! process funnels through one injected execution lock. A request holds the
//! lock for its whole retry sequence: up to `max_retries` attempts, each a
//! deadline-bounded `osascript` invocation, with exponential backoff between
//! timed-out attempts. Only timeouts are retried — a script that errored
//! will error identically on the next run, and a missing interpreter will
//! still be missing.

use std::fmt;
use std::io::{self, BufReader, Read};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::{build_interpreter_command, kill_process_tree, RuntimeConfig};

const PIPE_POLL_MS: u64 = 25;
/// Grace period after exit for reader threads to drain remaining pipe data.
const PIPE_DRAIN_MS: u64 = 50;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ExecError {
    InterpreterMissing,
    Script { code: i32, message: String },
    Timeout { attempts: u32 },
    Unknown(String),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::InterpreterMissing => write!(
                f,
                "osascript not found. Mail automation requires macOS with AppleScript support."
            ),
            ExecError::Script { code, message } => {
                write!(f, "AppleScript error (code {code}): {message}")
            }
            ExecError::Timeout { attempts } => write!(
                f,
                "AppleScript execution timed out after {attempts} attempts. \
                 Mail may be unresponsive."
            ),
            ExecError::Unknown(message) => {
                write!(f, "AppleScript execution failed: {message}")
            }
        }
    }
}

impl std::error::Error for ExecError {}

/// Per-attempt outcome before retry policy is applied. Timeouts are the only
/// transient class; everything else ends the request.
enum AttemptError {
    TimedOut,
    Fatal(ExecError),
}

/// Retry control flow as explicit states rather than a sleep inside a catch.
enum RetryState {
    Attempting(u32),
    Backoff(u32),
}

pub(crate) struct ScriptRunner {
    interpreter: Vec<String>,
    lock: Arc<Mutex<()>>,
    timeout: Duration,
    max_retries: u32,
    backoff_base: Duration,
}

impl ScriptRunner {
    pub(crate) fn new(
        interpreter: Vec<String>,
        lock: Arc<Mutex<()>>,
        timeout: Duration,
        max_retries: u32,
        backoff_base: Duration,
    ) -> Self {
        ScriptRunner {
            interpreter,
            lock,
            timeout,
            max_retries: max_retries.max(1),
            backoff_base,
        }
    }

    pub(crate) fn from_config(cfg: &RuntimeConfig, lock: Arc<Mutex<()>>) -> Self {
        ScriptRunner::new(
            cfg.interpreter.clone(),
            lock,
            cfg.script_timeout,
            cfg.max_retries,
            cfg.backoff_base,
        )
    }

    /// Run one script to completion under the execution lock.
    ///
    /// The lock is held across the full retry sequence so interleaved
    /// attempts from different callers can never reach Mail. Returns the
    /// interpreter's stdout with surrounding whitespace trimmed.
    pub(crate) fn execute(&self, script: &str) -> Result<String, ExecError> {
        let _guard = self.lock.lock().unwrap_or_else(|err| err.into_inner());

        let mut state = RetryState::Attempting(1);
        loop {
            state = match state {
                RetryState::Attempting(attempt) => match self.run_attempt(script) {
                    Ok(stdout) => {
                        if attempt > 1 {
                            eprintln!(
                                "[osascript] succeeded on attempt {attempt}/{}",
                                self.max_retries
                            );
                        }
                        return Ok(stdout);
                    }
                    Err(AttemptError::TimedOut) if attempt < self.max_retries => {
                        RetryState::Backoff(attempt)
                    }
                    Err(AttemptError::TimedOut) => {
                        return Err(ExecError::Timeout { attempts: attempt });
                    }
                    Err(AttemptError::Fatal(err)) => return Err(err),
                },
                RetryState::Backoff(attempt) => {
                    let wait = self.backoff_base * (1u32 << (attempt - 1));
                    eprintln!(
                        "[osascript] timeout on attempt {attempt}/{}; retrying in {:.1}s",
                        self.max_retries,
                        wait.as_secs_f64()
                    );
                    thread::sleep(wait);
                    RetryState::Attempting(attempt + 1)
                }
            };
        }
    }

    fn run_attempt(&self, script: &str) -> Result<String, AttemptError> {
        let mut cmd = build_interpreter_command(&self.interpreter);
        cmd.arg("-e")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(AttemptError::Fatal(ExecError::InterpreterMissing));
            }
            Err(err) => {
                return Err(AttemptError::Fatal(ExecError::Unknown(format!(
                    "spawn failed: {err}"
                ))));
            }
        };

        match wait_with_deadline(&mut child, self.timeout) {
            WaitOutcome::Completed {
                status,
                stdout,
                stderr,
            } => {
                if status.success() {
                    Ok(stdout.trim().to_string())
                } else {
                    let trimmed = stderr.trim();
                    let message = if trimmed.is_empty() {
                        "Unknown AppleScript error".to_string()
                    } else {
                        trimmed.to_string()
                    };
                    Err(AttemptError::Fatal(ExecError::Script {
                        code: status.code().unwrap_or(-1),
                        message,
                    }))
                }
            }
            WaitOutcome::DeadlineExceeded => Err(AttemptError::TimedOut),
            WaitOutcome::WaitFailed(message) => {
                Err(AttemptError::Fatal(ExecError::Unknown(message)))
            }
        }
    }
}

enum WaitOutcome {
    Completed {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    DeadlineExceeded,
    WaitFailed(String),
}

/// Spawn a reader that appends everything from `pipe` into `buf`. The child
/// keeps its pipes drained even while we only poll `try_wait`, so a chatty
/// script can never deadlock on a full pipe buffer.
fn drain_pipe<R: Read + Send + 'static>(pipe: R, buf: Arc<Mutex<Vec<u8>>>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut chunk = [0u8; 4096];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Ok(mut guard) = buf.lock() {
                        guard.extend_from_slice(&chunk[..n]);
                    }
                }
            }
        }
    });
}

fn buffer_to_string(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8_lossy(&buf.lock().unwrap_or_else(|err| err.into_inner())).to_string()
}

/// Wait for the child with a hard wall-clock ceiling. On the deadline the
/// whole process group is killed; an attempt already in flight cannot be
/// cancelled any other way.
fn wait_with_deadline(child: &mut Child, deadline: Duration) -> WaitOutcome {
    let start = Instant::now();

    let stdout_buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let stderr_buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    if let Some(pipe) = child.stdout.take() {
        drain_pipe(pipe, stdout_buf.clone());
    }
    if let Some(pipe) = child.stderr.take() {
        drain_pipe(pipe, stderr_buf.clone());
    }

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                thread::sleep(Duration::from_millis(PIPE_DRAIN_MS));
                return WaitOutcome::Completed {
                    status,
                    stdout: buffer_to_string(&stdout_buf),
                    stderr: buffer_to_string(&stderr_buf),
                };
            }
            Ok(None) => {
                if start.elapsed() >= deadline {
                    kill_process_tree(child);
                    return WaitOutcome::DeadlineExceeded;
                }
                thread::sleep(Duration::from_millis(PIPE_POLL_MS));
            }
            Err(err) => return WaitOutcome::WaitFailed(format!("wait failed: {err}")),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static SCRATCH_SEQ: AtomicU32 = AtomicU32::new(0);

    /// Unique scratch file for fake-interpreter side effects.
    fn scratch_path(tag: &str) -> PathBuf {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("mailpilot-test-{}-{tag}-{seq}", std::process::id()))
    }

    /// Runner whose "interpreter" is a shell one-liner. The engine appends
    /// `-e <script>` which lands in unused positional parameters.
    fn shell_runner(body: &str, timeout_ms: u64, retries: u32, backoff_ms: u64) -> ScriptRunner {
        ScriptRunner::new(
            vec!["sh".to_string(), "-c".to_string(), body.to_string()],
            Arc::new(Mutex::new(())),
            Duration::from_millis(timeout_ms),
            retries,
            Duration::from_millis(backoff_ms),
        )
    }

    #[test]
    fn success_returns_trimmed_stdout_after_one_invocation() {
        let marker = scratch_path("count");
        let body = format!("echo run >> {}; printf '  hello world \\n'", marker.display());
        let runner = shell_runner(&body, 5_000, 3, 10);

        let out = runner.execute("ignored").expect("success");
        assert_eq!(out, "hello world");
        let invocations = fs::read_to_string(&marker).unwrap_or_default();
        assert_eq!(invocations.lines().count(), 1);
        let _ = fs::remove_file(&marker);
    }

    #[test]
    fn nonzero_exit_is_a_script_error_and_never_retried() {
        let marker = scratch_path("count");
        let body = format!("echo run >> {}; echo boom >&2; exit 3", marker.display());
        let runner = shell_runner(&body, 5_000, 3, 10);

        let err = runner.execute("ignored").expect_err("must fail");
        assert_eq!(
            err,
            ExecError::Script {
                code: 3,
                message: "boom".to_string()
            }
        );
        let invocations = fs::read_to_string(&marker).unwrap_or_default();
        assert_eq!(invocations.lines().count(), 1);
        let _ = fs::remove_file(&marker);
    }

    #[test]
    fn empty_stderr_gets_placeholder_message() {
        let runner = shell_runner("exit 7", 5_000, 1, 10);
        let err = runner.execute("ignored").expect_err("must fail");
        assert_eq!(
            err,
            ExecError::Script {
                code: 7,
                message: "Unknown AppleScript error".to_string()
            }
        );
    }

    #[test]
    fn missing_interpreter_fails_immediately() {
        let runner = ScriptRunner::new(
            vec!["mailpilot-no-such-interpreter".to_string()],
            Arc::new(Mutex::new(())),
            Duration::from_secs(5),
            3,
            Duration::from_millis(10),
        );
        let err = runner.execute("ignored").expect_err("must fail");
        assert_eq!(err, ExecError::InterpreterMissing);
    }

    #[test]
    fn timeouts_retry_with_backoff_then_succeed() {
        let counter = scratch_path("attempts");
        // Attempts 1 and 2 hang past the deadline; attempt 3 answers.
        let body = format!(
            "n=$(cat {p} 2>/dev/null || echo 0); n=$((n+1)); echo $n > {p}; \
             if [ $n -lt 3 ]; then sleep 30; fi; echo ok",
            p = counter.display()
        );
        let backoff_ms = 80u64;
        let runner = shell_runner(&body, 300, 3, backoff_ms);

        let started = Instant::now();
        let out = runner.execute("ignored").expect("third attempt succeeds");
        assert_eq!(out, "ok");
        let attempts: u32 = fs::read_to_string(&counter)
            .expect("counter written")
            .trim()
            .parse()
            .expect("counter numeric");
        assert_eq!(attempts, 3);
        // Backoff waits of 1x then 2x the base happened between attempts.
        assert!(started.elapsed() >= Duration::from_millis(backoff_ms * 3));
        let _ = fs::remove_file(&counter);
    }

    #[test]
    fn exhausted_timeouts_surface_attempt_count() {
        let counter = scratch_path("attempts");
        let body = format!(
            "n=$(cat {p} 2>/dev/null || echo 0); echo $((n+1)) > {p}; sleep 30",
            p = counter.display()
        );
        let runner = shell_runner(&body, 200, 2, 20);

        let err = runner.execute("ignored").expect_err("must time out");
        assert_eq!(err, ExecError::Timeout { attempts: 2 });
        let attempts: u32 = fs::read_to_string(&counter)
            .expect("counter written")
            .trim()
            .parse()
            .expect("counter numeric");
        assert_eq!(attempts, 2);
        let _ = fs::remove_file(&counter);
    }

    #[test]
    fn concurrent_executions_never_overlap() {
        let trace = scratch_path("trace");
        let body = format!(
            "echo start >> {p}; sleep 0.2; echo end >> {p}; echo done",
            p = trace.display()
        );
        let lock = Arc::new(Mutex::new(()));
        let make_runner = || {
            ScriptRunner::new(
                vec!["sh".to_string(), "-c".to_string(), body.clone()],
                lock.clone(),
                Duration::from_secs(10),
                1,
                Duration::from_millis(10),
            )
        };

        let mut handles = Vec::new();
        for _ in 0..3 {
            let runner = make_runner();
            handles.push(thread::spawn(move || runner.execute("ignored")));
        }
        for handle in handles {
            assert_eq!(handle.join().expect("no panic").expect("success"), "done");
        }

        // Serialized invocations interleave as start,end,start,end,... —
        // a start directly following a start would mean overlap.
        let events: Vec<String> = fs::read_to_string(&trace)
            .expect("trace written")
            .lines()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(events.len(), 6);
        for pair in events.chunks(2) {
            assert_eq!(pair[0], "start");
            assert_eq!(pair[1], "end");
        }
        let _ = fs::remove_file(&trace);
    }
}
