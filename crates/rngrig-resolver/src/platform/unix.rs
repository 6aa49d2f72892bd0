use std::time::Duration;

pub(crate) async fn terminate_group_unix(pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(pid as i32);

    // Send TERM to the process group first.
    let _ = killpg(pgid, Signal::SIGTERM);

    // Wait for graceful termination, then make sure.
    let grace_period = Duration::from_secs(5);
    tokio::time::sleep(grace_period).await;

    let _ = killpg(pgid, Signal::SIGKILL);
}
