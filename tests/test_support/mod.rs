#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Sidecar {
    pub child: Child,
    pub stdin: ChildStdin,
    pub reader: BufReader<ChildStdout>,
}

impl Drop for Sidecar {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn command() -> Command {
    let exe = env!("CARGO_BIN_EXE_attendlyd");
    let mut cmd = Command::new(exe);
    cmd.env_remove("ATTENDLY_API_KEY")
        .env_remove("ATTENDLY_SEED")
        .env_remove("ATTENDLY_MODEL")
        .env_remove("ATTENDLY_API_BASE")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    cmd
}

fn spawn_with(mut cmd: Command) -> Sidecar {
    let mut child = cmd.spawn().expect("spawn attendlyd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    Sidecar {
        child,
        stdin,
        reader: BufReader::new(stdout),
    }
}

pub fn spawn_sidecar() -> Sidecar {
    spawn_with(command())
}

pub fn spawn_sidecar_with_seed(seed: &Path) -> Sidecar {
    let mut cmd = command();
    cmd.arg("--seed").arg(seed);
    spawn_with(cmd)
}

pub fn send_line(sc: &mut Sidecar, line: &str) -> serde_json::Value {
    writeln!(sc.stdin, "{}", line).expect("write request");
    sc.stdin.flush().expect("flush request");

    let mut out = String::new();
    sc.reader.read_line(&mut out).expect("read response line");
    assert!(!out.trim().is_empty(), "empty response for {}", line);
    serde_json::from_str(out.trim()).expect("parse response json")
}

pub fn request(sc: &mut Sidecar, id: &str, method: &str, params: serde_json::Value) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    let value = send_line(sc, &payload.to_string());
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(sc: &mut Sidecar, id: &str, method: &str, params: serde_json::Value) -> serde_json::Value {
    let value = request(sc, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().expect("result")
}

/// Returns the error code of a failed request.
pub fn request_err(sc: &mut Sidecar, id: &str, method: &str, params: serde_json::Value) -> String {
    let value = request(sc, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .expect("error code")
        .to_string()
}

/// Feeds `requests` to a fresh sidecar, closes stdin, and returns the
/// response lines together with everything logged to stderr.
pub fn run_to_exit(args: &[&str], requests: &[serde_json::Value]) -> (Vec<serde_json::Value>, String) {
    let mut cmd = command();
    cmd.args(args).stderr(Stdio::piped());
    let mut child = cmd.spawn().expect("spawn attendlyd");
    {
        let mut stdin = child.stdin.take().expect("child stdin");
        for req in requests {
            writeln!(stdin, "{}", req).expect("write request");
        }
    }
    let output = child.wait_with_output().expect("wait for attendlyd");
    assert!(output.status.success(), "attendlyd exited with {}", output.status);
    let responses = String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("parse response json"))
        .collect();
    (responses, String::from_utf8_lossy(&output.stderr).into_owned())
}
