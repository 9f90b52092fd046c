use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use super::EngineError;

const EXIT_POLL: Duration = Duration::from_millis(10);

pub(crate) struct Invocation<'a> {
    pub(crate) program: &'a Path,
    pub(crate) config: Option<&'a Path>,
}

pub(crate) trait EngineRunner {
    /// Runs the engine once and returns stdout and stderr interleaved as written.
    fn run(&mut self, invocation: &Invocation<'_>) -> Result<Vec<u8>, EngineError>;

    fn binary(&self) -> &Path;
}

pub(crate) struct ProcessRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl ProcessRunner {
    pub(crate) fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    fn unavailable(&self) -> impl FnOnce(std::io::Error) -> EngineError {
        let path = self.binary.clone();
        move |source| EngineError::Unavailable { path, source }
    }

    fn timed_out(&self, child: &mut Child) -> EngineError {
        tracing::warn!(pid = child.id(), "engine timed out, killing");
        stop(child);
        EngineError::Timeout {
            after: self.timeout,
        }
    }
}

fn stop(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl EngineRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation<'_>) -> Result<Vec<u8>, EngineError> {
        // One pipe shared by stdout and stderr keeps the streams in the order the engine wrote them.
        let (mut reader, writer) = std::io::pipe().map_err(self.unavailable())?;
        let stderr_writer = writer.try_clone().map_err(self.unavailable())?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg(invocation.program);
        if let Some(config) = invocation.config {
            cmd.arg(config);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(writer);
        cmd.stderr(stderr_writer);
        let spawned = cmd.spawn();
        // The command still owns our copies of the write end; EOF only arrives once they close.
        drop(cmd);
        let mut child = spawned.map_err(self.unavailable())?;
        tracing::debug!(pid = child.id(), binary = %self.binary.display(), "engine started");

        let (tx, rx) = crossbeam_channel::bounded(1);
        thread::spawn(move || {
            let mut out = Vec::new();
            let res = reader.read_to_end(&mut out).map(|_| out);
            let _ = tx.send(res);
        });

        // Draining output and waiting for exit share one deadline: an engine may close its
        // streams and keep running.
        let deadline = Instant::now() + self.timeout;
        let out = match rx.recv_deadline(deadline) {
            Ok(Ok(out)) => out,
            Ok(Err(source)) => {
                stop(&mut child);
                return Err(EngineError::Output(source));
            }
            Err(RecvTimeoutError::Timeout) => return Err(self.timed_out(&mut child)),
            Err(RecvTimeoutError::Disconnected) => {
                stop(&mut child);
                return Err(EngineError::Output(std::io::Error::other(
                    "engine output reader stopped",
                )));
            }
        };

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!(?status, bytes = out.len(), "engine finished");
                    return Ok(out);
                }
                Ok(None) if Instant::now() >= deadline => return Err(self.timed_out(&mut child)),
                Ok(None) => thread::sleep(EXIT_POLL),
                Err(source) => {
                    stop(&mut child);
                    return Err(EngineError::Output(source));
                }
            }
        }
    }

    fn binary(&self) -> &Path {
        &self.binary
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    // The engine receives the program file as its first argument, so `/bin/sh` can stand in
    // for a real engine and interpret the program text itself.
    fn sh_program(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("prog.rw");
        fs::write(&path, format!("{body}\n")).expect("write program");
        path
    }

    fn sh_runner(timeout: Duration) -> ProcessRunner {
        ProcessRunner::new(PathBuf::from("/bin/sh"), timeout)
    }

    #[test]
    fn process_runner_captures_both_streams() {
        let dir = tempfile::tempdir().expect("tempdir");
        let program = sh_program(dir.path(), "echo out\necho err 1>&2");

        let out = sh_runner(Duration::from_secs(5))
            .run(&Invocation {
                program: &program,
                config: None,
            })
            .expect("run engine");
        assert_eq!(String::from_utf8_lossy(&out), "out\nerr\n");
    }

    #[test]
    fn process_runner_passes_program_and_config_args() {
        let dir = tempfile::tempdir().expect("tempdir");
        let program = sh_program(dir.path(), "printf '%s|%s' \"$0\" \"$1\"");
        let config = dir.path().join("leds.json");

        let out = sh_runner(Duration::from_secs(5))
            .run(&Invocation {
                program: &program,
                config: Some(&config),
            })
            .expect("run engine");
        assert_eq!(
            String::from_utf8_lossy(&out),
            format!("{}|{}", program.display(), config.display())
        );
    }

    #[test]
    fn process_runner_reports_missing_binary() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut runner = ProcessRunner::new(dir.path().join("nope"), Duration::from_secs(1));
        let err = runner
            .run(&Invocation {
                program: &dir.path().join("prog.rw"),
                config: None,
            })
            .expect_err("missing binary must fail");
        assert!(matches!(err, EngineError::Unavailable { .. }));
    }

    #[test]
    fn process_runner_times_out_hung_engine() {
        let dir = tempfile::tempdir().expect("tempdir");
        let program = sh_program(dir.path(), "exec sleep 30");

        let err = sh_runner(Duration::from_millis(200))
            .run(&Invocation {
                program: &program,
                config: None,
            })
            .expect_err("hung engine must time out");
        assert!(matches!(err, EngineError::Timeout { .. }));
    }

    #[test]
    fn process_runner_times_out_engine_that_closes_its_streams() {
        let dir = tempfile::tempdir().expect("tempdir");
        let program = sh_program(dir.path(), "exec >&- 2>&-\nsleep 4");

        let started = Instant::now();
        let err = sh_runner(Duration::from_millis(200))
            .run(&Invocation {
                program: &program,
                config: None,
            })
            .expect_err("engine still running after its streams close must time out");

        assert!(matches!(err, EngineError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn process_runner_waits_for_exit_after_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let program = sh_program(dir.path(), "echo done\nexec >&- 2>&-\nsleep 1");

        let out = sh_runner(Duration::from_secs(5))
            .run(&Invocation {
                program: &program,
                config: None,
            })
            .expect("engine exits before the deadline");
        assert_eq!(String::from_utf8_lossy(&out), "done\n");
    }
}
