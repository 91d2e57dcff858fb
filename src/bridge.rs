//! Process Bridge — spawn and supervise the protocol-server subprocess.
//!
//! The bridge connects an IDE or agent to a local `reelbrief-mcp` by
//! spawning it with all three standard streams inherited (the protocol
//! is newline-delimited JSON-RPC and must pass through byte-for-byte,
//! so no relay buffering is introduced) and supervising it until it
//! exits. SIGINT and SIGTERM are forwarded to the child; the bridge
//! only returns once the child has exited, so nothing is orphaned.

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Name of the protocol-server executable resolved next to the bridge.
const SERVER_BIN: &str = "reelbrief-mcp";

/// Pid of the supervised child, readable from the signal handler.
static CHILD_PID: AtomicI32 = AtomicI32::new(0);
/// One bridged session per process.
static BRIDGE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Connection parameters forwarded into the child's environment.
#[derive(Debug, Default)]
pub struct BridgeConfig {
    /// Explicit server executable; defaults to a sibling of the
    /// current executable.
    pub server_bin: Option<PathBuf>,
    pub db_url: Option<String>,
    pub db_name: Option<String>,
    /// Session bearer the child authenticates every request with.
    pub token: Option<String>,
}

/// Spawn the protocol server and bridge its stdio until it exits.
///
/// Blocks for the lifetime of the session and returns the child's exit
/// code (`128 + signal` when the child died by signal, shell
/// convention) so the caller can exit with the same status.
pub fn connect(config: BridgeConfig) -> Result<i32> {
    if BRIDGE_ACTIVE
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(Error::BridgeActive);
    }

    let result = supervise(config);
    CHILD_PID.store(0, Ordering::SeqCst);
    BRIDGE_ACTIVE.store(false, Ordering::SeqCst);
    result
}

fn supervise(config: BridgeConfig) -> Result<i32> {
    let server_bin = resolve_server_bin(&config)?;
    debug!(server = %server_bin.display(), "spawning protocol server");

    let mut command = Command::new(&server_bin);
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some(db_url) = &config.db_url {
        command.env("REELBRIEF_DB_URL", db_url);
    }
    if let Some(db_name) = &config.db_name {
        command.env("REELBRIEF_DB_NAME", db_name);
    }
    if let Some(token) = &config.token {
        command.env("REELBRIEF_API_TOKEN", token);
    }

    let mut child = command.spawn()?;
    CHILD_PID.store(child.id() as i32, Ordering::SeqCst);
    register_signal_forwarding();

    // Child::wait retries on EINTR, so a forwarded signal keeps the
    // bridge waiting until the child has actually exited.
    let status = child.wait()?;
    info!(status = %status, "protocol server exited");
    Ok(exit_code(status))
}

/// Locate the server executable, failing fast instead of attempting to
/// spawn a program that is not there.
fn resolve_server_bin(config: &BridgeConfig) -> Result<PathBuf> {
    let path = match &config.server_bin {
        Some(explicit) => explicit.clone(),
        None => {
            let me = std::env::current_exe()?;
            me.parent()
                .map(|dir| dir.join(SERVER_BIN))
                .unwrap_or_else(|| PathBuf::from(SERVER_BIN))
        }
    };
    if !path.is_file() {
        return Err(Error::ServerBinaryMissing(path));
    }
    Ok(path)
}

/// Forward SIGINT/SIGTERM to the child so both halves of the session
/// shut down together. The parent keeps waiting; it exits with the
/// child's status, never before it.
fn register_signal_forwarding() {
    unsafe {
        libc::signal(
            libc::SIGINT,
            forward_signal as *const () as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGTERM,
            forward_signal as *const () as libc::sighandler_t,
        );
    }
}

extern "C" fn forward_signal(signo: libc::c_int) {
    let pid = CHILD_PID.load(Ordering::SeqCst);
    if pid > 0 {
        unsafe {
            libc::kill(pid, signo);
        }
    }
}

/// Shell-convention exit code for a child status.
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}
