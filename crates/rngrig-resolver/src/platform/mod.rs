//! Platform-specific process termination.
//!
//! Cancellation and analyzer-triggered aborts must stop not just the tool
//! process but anything it spawned underneath itself (batteries fork
//! workers; WSL dispatch interposes the layer runtime). On Unix that is a
//! process-group signal; on Windows the process handle is terminated.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

/// Request termination of a process and its group, without blocking.
///
/// Status finalization never waits on actual process death: the engine
/// marks the job terminal immediately and a later natural-exit event is a
/// no-op. The Unix grace sequence (TERM, wait, KILL) runs on a detached
/// task.
pub fn terminate_group(pid: u32) {
    #[cfg(unix)]
    {
        tokio::spawn(unix::terminate_group_unix(pid));
    }

    #[cfg(windows)]
    {
        windows::terminate_process_windows(pid);
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = pid;
    }
}
