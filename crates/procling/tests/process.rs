//! End-to-end process lifecycle scenarios

#![cfg(unix)]

use std::time::{Duration, Instant};

use procling::{Process, ProcessConfig, ProcessError, Stream, WaitOutcome};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn sh(script: &str) -> ProcessConfig {
    ProcessConfig::new("sh").args(["-c", script])
}

/// Read the selected stream until end-of-stream.
fn drain(process: &mut Process, stream: Stream) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 512];
    loop {
        let n = process.read(stream, &mut buf).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    out
}

#[test]
fn exit_status_is_reported() {
    init_tracing();
    let mut process = Process::spawn(sh("exit 3")).unwrap();

    let outcome = process.wait(None).unwrap();
    assert_eq!(outcome.exit_status().unwrap().code(), Some(3));
}

#[test]
fn noop_child_exits_zero_within_the_deadline() {
    init_tracing();
    let mut process = Process::spawn(ProcessConfig::new("true")).unwrap();

    let outcome = process.wait(Some(Duration::from_millis(1000))).unwrap();
    assert!(outcome.exit_status().unwrap().success());
}

#[test]
fn stdin_to_stdout_round_trip_is_exact() {
    init_tracing();
    let mut process = Process::spawn(ProcessConfig::new("cat")).unwrap();

    let payload: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    let mut written = 0;
    while written < payload.len() {
        written += process.write(&payload[written..]).unwrap();
    }
    process.close(Stream::Stdin);

    assert_eq!(drain(&mut process, Stream::Stdout), payload);

    let outcome = process.wait(Some(Duration::from_secs(2))).unwrap();
    assert!(outcome.exit_status().unwrap().success());
}

#[test]
fn short_wait_times_out_and_a_longer_wait_succeeds() {
    init_tracing();
    let mut process = Process::spawn(sh("sleep 1")).unwrap();

    let outcome = process.wait(Some(Duration::from_millis(100))).unwrap();
    assert_eq!(outcome, WaitOutcome::TimedOut);
    // The timeout must not have disturbed the child
    assert!(process.is_running());

    let outcome = process.wait(Some(Duration::from_secs(5))).unwrap();
    assert!(outcome.exit_status().unwrap().success());
}

#[test]
fn terminate_ends_a_cooperative_child() {
    init_tracing();
    let mut process = Process::spawn(sh("sleep 10")).unwrap();

    let outcome = process.terminate(Duration::from_secs(2)).unwrap();
    let status = outcome.exit_status().unwrap();
    assert!(!status.success());
}

#[test]
fn terminate_times_out_on_an_ignoring_child_and_kill_ends_it() {
    init_tracing();
    // The child reports readiness only after the trap is installed, so the
    // SIGTERM below cannot race the shell's startup.
    let mut process = Process::spawn(sh("trap '' TERM; echo ready; sleep 10")).unwrap();

    let mut buf = [0u8; 32];
    let n = process.read(Stream::Stdout, &mut buf).unwrap();
    assert!(n > 0);

    let outcome = process.terminate(Duration::from_millis(300)).unwrap();
    assert!(outcome.timed_out());
    assert!(process.is_running());

    let outcome = process.kill(Duration::from_secs(2)).unwrap();
    assert!(outcome.exit_status().is_some());
    assert!(!process.is_running());
}

#[test]
fn spawn_failure_leaves_no_usable_instance() {
    init_tracing();
    let err = Process::spawn(ProcessConfig::new("/definitely/not/a/binary")).unwrap_err();
    assert!(matches!(err, ProcessError::Spawn(_)));
    assert!(err.raw_os_error().is_some());
}

#[test]
fn read_blocks_until_the_child_produces_data() {
    init_tracing();
    let mut process = Process::spawn(sh("sleep 0.3; printf hi")).unwrap();

    let start = Instant::now();
    let mut buf = [0u8; 64];
    let n = process.read(Stream::Stdout, &mut buf).unwrap();

    assert!(n >= 1);
    assert_eq!(buf[0], b'h');
    assert!(start.elapsed() >= Duration::from_millis(200));

    process.wait(Some(Duration::from_secs(2))).unwrap();
}

#[test]
fn stderr_is_read_independently_of_stdout() {
    init_tracing();
    let mut process = Process::spawn(sh("echo oops >&2")).unwrap();

    assert_eq!(drain(&mut process, Stream::Stderr), b"oops\n");
    assert_eq!(drain(&mut process, Stream::Stdout), b"");

    process.wait(Some(Duration::from_secs(2))).unwrap();
}

#[test]
fn write_after_close_fails_cleanly() {
    init_tracing();
    let mut process = Process::spawn(ProcessConfig::new("cat")).unwrap();

    process.close(Stream::Stdin);
    // Redundant close is tolerated
    process.close(Stream::Stdin);

    let err = process.write(b"late").unwrap_err();
    assert!(matches!(err, ProcessError::StreamClosed(Stream::Stdin)));

    // cat exits once its input reaches end-of-stream
    let outcome = process.wait(Some(Duration::from_secs(2))).unwrap();
    assert!(outcome.exit_status().unwrap().success());
}

#[test]
fn read_after_close_fails_cleanly() {
    init_tracing();
    let mut process = Process::spawn(ProcessConfig::new("true")).unwrap();

    process.close(Stream::Stdout);
    let mut buf = [0u8; 8];
    let err = process.read(Stream::Stdout, &mut buf).unwrap_err();
    assert!(matches!(err, ProcessError::StreamClosed(Stream::Stdout)));

    process.wait(Some(Duration::from_secs(2))).unwrap();
}

#[test]
fn environment_entries_reach_the_child() {
    init_tracing();
    let config = sh("printf \"$PROCLING_TEST_VALUE\"").env("PROCLING_TEST_VALUE", "marker");
    let mut process = Process::spawn(config).unwrap();

    assert_eq!(drain(&mut process, Stream::Stdout), b"marker");
    process.wait(Some(Duration::from_secs(2))).unwrap();
}

#[test]
fn working_directory_is_applied() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let expected = std::fs::canonicalize(dir.path()).unwrap();

    let mut process = Process::spawn(sh("pwd").working_dir(dir.path())).unwrap();
    let output = drain(&mut process, Stream::Stdout);
    let reported = std::fs::canonicalize(String::from_utf8(output).unwrap().trim_end()).unwrap();
    assert_eq!(reported, expected);

    process.wait(Some(Duration::from_secs(2))).unwrap();
}
