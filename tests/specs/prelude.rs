//! Shared test harness for the `tests/specs/*` suite: an isolated
//! `Workspace` (its own state dir, workspace root, and socket path, all
//! under a throwaway tempdir) plus thin `Run` assertions over a spawned
//! `oj`/`ojd` invocation.
//!
//! Every env var is passed per-invocation (`Command::envs`), never through
//! `std::env::set_var` — tests run in parallel by default and a process-
//! global env mutation would race across threads.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use tempfile::TempDir;

/// How long `wait_for` polls before giving up.
pub const WAIT_MAX_MS: u64 = 15_000;

/// `cargo_bin("oj")` only builds the `oj` binary target (and its library
/// dependencies, which does not include a dependency crate's *other* `[[bin]]`
/// targets) — `ojd` lives in the separate `oj-daemon` package and needs its
/// own build trigger, or `oj daemon start` has nothing to exec. Build it once
/// up front rather than racing every test's first daemon start against it.
static ENSURE_OJD_BUILT: std::sync::Once = std::sync::Once::new();

fn ensure_ojd_built() {
    ENSURE_OJD_BUILT.call_once(|| {
        Command::cargo_bin("ojd").unwrap_or_else(|err| panic!("cargo_bin(ojd) failed to build: {err}"));
    });
}

pub struct Workspace {
    dir: TempDir,
}

/// Output of a finished child process, with assertion helpers chained the
/// way the rest of this suite reads them: `.passes().stdout_has("...")`.
pub struct Run {
    status_ok: bool,
    stdout: String,
    stderr: String,
}

impl Run {
    pub fn passes(self) -> Self {
        assert!(self.status_ok, "expected success, stderr:\n{}\nstdout:\n{}", self.stderr, self.stdout);
        self
    }

    pub fn fails(self) -> Self {
        assert!(!self.status_ok, "expected failure, stdout:\n{}", self.stdout);
        self
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "expected stdout to contain {needle:?}, got:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "expected stderr to contain {needle:?}, got:\n{}", self.stderr);
        self
    }

    /// Parse stdout as JSON (every command in this suite is invoked with
    /// `--output json`).
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim()).unwrap_or_else(|err| {
            panic!("stdout was not valid JSON ({err}):\n{}", self.stdout)
        })
    }
}

impl Workspace {
    pub fn new() -> Self {
        ensure_ojd_built();
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("state")).expect("state dir");
        std::fs::create_dir_all(dir.path().join("workspace")).expect("workspace root");
        Self { dir }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn workspace_root(&self) -> PathBuf {
        self.dir.path().join("workspace")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.state_dir().join("daemon.sock")
    }

    fn envs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("OJ_STATE_DIR", self.state_dir().to_string_lossy().into_owned()),
            ("OJ_WORKSPACE_ROOT", self.workspace_root().to_string_lossy().into_owned()),
            ("OJ_SOCKET_PATH", self.socket_path().to_string_lossy().into_owned()),
            ("OJ_CONFIG_PATH", self.state_dir().join("config.toml").to_string_lossy().into_owned()),
        ]
    }

    /// Build an `oj` invocation against this workspace's isolated env.
    /// Always runs `--output json` so test assertions parse a value
    /// instead of matching against `{:?}` debug text.
    pub fn oj(&self, args: &[&str]) -> Run {
        self.run_bin("oj", args)
    }

    /// Same as `oj`, but without forcing `--output json` — for help/version
    /// text and other commands whose stdout this suite matches verbatim.
    pub fn oj_raw(&self, args: &[&str]) -> Run {
        self.run_bin_raw("oj", args)
    }

    pub fn ojd(&self, args: &[&str]) -> Run {
        self.run_bin_raw("ojd", args)
    }

    fn run_bin(&self, bin: &str, args: &[&str]) -> Run {
        let mut full: Vec<&str> = args.to_vec();
        full.push("--output");
        full.push("json");
        self.run_bin_raw(bin, &full)
    }

    fn run_bin_raw(&self, bin: &str, args: &[&str]) -> Run {
        let mut cmd = Command::cargo_bin(bin).unwrap_or_else(|err| panic!("cargo_bin({bin}) failed: {err}"));
        cmd.envs(self.envs());
        cmd.args(args);
        let output = cmd.output().unwrap_or_else(|err| panic!("failed to run {bin} {args:?}: {err}"));
        Run {
            status_ok: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn start_daemon(&self) {
        self.oj_raw(&["daemon", "start"]).passes();
        let up = wait_for(WAIT_MAX_MS, || self.oj_raw(&["daemon", "status"]).passes().stdout().contains("running"));
        assert!(up, "daemon did not report running status in time");
    }

    pub fn stop_daemon(&self) {
        let _ = self.oj_raw(&["daemon", "stop"]).passes();
    }

    /// Create an approved session with no tasks yet: `session.create` ->
    /// `plan.setPath` (any path — the plan file's own contents are owned by
    /// the external planning subsystem and never read by this core) ->
    /// `session.approve`. Returns the session id.
    pub fn approved_session(&self) -> String {
        let created = self.oj(&["session", "create"]).passes().json();
        let session = created.get("id").and_then(|v| v.as_str()).expect("session id").to_string();
        self.oj(&["plan", "set-path", &session, "plan.md"]).passes();
        self.oj(&["session", "approve", &session]).passes();
        session
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // Best-effort, and deliberately not `.passes()`: a test that
        // panicked mid-way is already unwinding, and a second panic here
        // (from a failed assertion) would abort the process instead of
        // reporting the original failure.
        let mut cmd = match Command::cargo_bin("oj") {
            Ok(cmd) => cmd,
            Err(_) => return,
        };
        cmd.envs(self.envs());
        cmd.args(["daemon", "stop"]);
        let _ = cmd.output();
    }
}

/// Poll `check` every 100ms until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}
