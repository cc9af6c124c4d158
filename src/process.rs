//! Blocking child-process execution with a timeout.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use crate::error::{Error, Failure, Result, Tool};

/// Render `cmd` as the argv we report in errors.
pub fn argv(cmd: &Command) -> Vec<String> {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Run `cmd` to completion, killing it if it is still running after
/// `timeout`. Returns the combined stdout/stderr of a successful run.
///
/// The deadline also covers collecting output: a background process that
/// inherited the pipes cannot keep us waiting after the child exits.
pub fn run(tool: Tool, cmd: &mut Command, timeout: Duration) -> Result<String> {
    let argv = argv(cmd);
    log::debug!("running {}", argv.join(" "));

    let failed = |failure: Failure| Error::Compiler {
        tool,
        argv: argv.clone(),
        failure,
    };

    let deadline = Instant::now() + timeout;
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => failed(Failure::NotFound),
            _ => failed(Failure::Launch(e)),
        })?;

    // Drain both pipes on their own threads so a chatty child can't block
    // on a full pipe while we wait for it.
    let (tx, rx) = mpsc::channel();
    drain(Stream::Stdout, child.stdout.take(), tx.clone());
    drain(Stream::Stderr, child.stderr.take(), tx);

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill(&mut child);
            return Err(failed(Failure::Timeout(timeout)));
        }
        Err(e) => {
            kill(&mut child);
            return Err(failed(Failure::Launch(e)));
        }
    };

    let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((Stream::Stdout, buf)) => stdout = buf,
            Ok((Stream::Stderr, buf)) => stderr = buf,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("{} exited but its output pipes are still open", tool);
                return Err(failed(Failure::Timeout(timeout)));
            }
        }
    }
    let output = combine(&stdout, &stderr);

    if !status.success() {
        return Err(failed(Failure::Exit {
            code: status.code(),
            output,
        }));
    }
    Ok(output)
}

/// Kill and reap `child`.
fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("failed to kill child {}: {}", child.id(), e);
    }
    if let Err(e) = child.wait() {
        log::warn!("failed to reap child {}: {}", child.id(), e);
    }
}

fn drain(stream: Stream, pipe: Option<impl Read + Send + 'static>, tx: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                log::debug!("reading child {:?}: {}", stream, e);
            }
        }
        // The receiver is gone once `run` has given up on us.
        let _ = tx.send((stream, buf));
    });
}

/// Combine stdout and stderr for full error context.
fn combine(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    if stdout.is_empty() {
        stderr.into_owned()
    } else if stderr.is_empty() {
        stdout.into_owned()
    } else {
        format!("{}\n{}", stdout, stderr)
    }
}

#[cfg(all(test, unix))]
mod test {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn test_success_collects_output() {
        let out = run(Tool::Protoc, &mut sh("echo hello"), Duration::from_secs(10)).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_nonzero_exit() {
        let err = run(
            Tool::Protoc,
            &mut sh("echo 'bad schema' >&2; exit 3"),
            Duration::from_secs(10),
        )
        .unwrap_err();
        match err {
            Error::Compiler {
                tool,
                argv,
                failure: Failure::Exit { code, output },
            } => {
                assert_eq!(tool, Tool::Protoc);
                assert_eq!(argv[0], "sh");
                assert_eq!(code, Some(3));
                assert_eq!(output.trim(), "bad schema");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_binary() {
        let mut cmd = Command::new("definitely-not-a-real-protoc-binary");
        let err = run(Tool::Protoc, &mut cmd, Duration::from_secs(10)).unwrap_err();
        assert!(matches!(
            err,
            Error::Compiler {
                failure: Failure::NotFound,
                ..
            }
        ));
    }

    #[test]
    fn test_timeout_kills_child() {
        let started = Instant::now();
        let err = run(
            Tool::NanopbGenerator,
            &mut sh("exec sleep 30"),
            Duration::from_millis(200),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Compiler {
                failure: Failure::Timeout(_),
                ..
            }
        ));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_covers_inherited_pipes() {
        // The shell exits at once, but `sleep` keeps stdout and stderr open.
        let started = Instant::now();
        let err = run(
            Tool::NanopbGenerator,
            &mut sh("sleep 8 & exit 0"),
            Duration::from_millis(300),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Compiler {
                failure: Failure::Timeout(_),
                ..
            }
        ));
        assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
    }

    #[test]
    fn test_background_child_with_closed_pipes_succeeds() {
        let out = run(
            Tool::Protoc,
            &mut sh("echo done; sleep 8 >/dev/null 2>&1 &"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(out.trim(), "done");
    }

    #[test]
    fn test_argv_rendering() {
        let mut cmd = Command::new("protoc");
        cmd.arg("-I/in").arg("/in/a.proto").arg("-o/tmp/a.pb");
        assert_eq!(argv(&cmd), ["protoc", "-I/in", "/in/a.proto", "-o/tmp/a.pb"]);
    }
}
