//! Concurrency Tests
//!
//! Overlapping actions against shared state: the token store under
//! concurrent readers, repeated API auth, and the accepted double-launch
//! race when two Terminal boots overlap.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use kabuboot_core::application::{
    BootOrchestrator, BootPorts, BootSettings, BootTiming, TokenStore, TradeAppSettings,
};
use kabuboot_core::domain::{ApiPassword, SessionToken, TargetSpec};
use kabuboot_core::port::delay::mocks::RecordingDelay;
use kabuboot_core::port::process_launcher::mocks::MockProcessLauncher;
use kabuboot_core::port::process_probe::mocks::MockProcessProbe;
use kabuboot_core::port::script_runner::mocks::MockScriptRunner;
use kabuboot_core::port::token_gateway::mocks::MockTokenGateway;
use kabuboot_core::port::ProcessProbe;
use tempfile::TempDir;

/// Probe that snapshots the table, then answers late
///
/// Overlapping callers all get the snapshot taken before any of them acted.
struct SlowProbe {
    inner: MockProcessProbe,
    latency: Duration,
}

#[async_trait]
impl ProcessProbe for SlowProbe {
    async fn find_pids(&self, image_name: &str) -> kabuboot_core::Result<Vec<u32>> {
        let snapshot = self.inner.find_pids(image_name).await;
        tokio::time::sleep(self.latency).await;
        snapshot
    }

    async fn is_alive(&self, pid: u32) -> bool {
        self.inner.is_alive(pid).await
    }
}

struct Setup {
    _dir: TempDir,
    probe: MockProcessProbe,
    launcher: MockProcessLauncher,
    gateway: MockTokenGateway,
    token_store: Arc<TokenStore>,
    orchestrator: Arc<BootOrchestrator>,
}

fn setup(probe_latency: Duration, gateway: MockTokenGateway) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let kabus_exe = dir.path().join("KabuS.exe");
    let script = dir.path().join("login.ps1");
    let trade_exe = dir.path().join("tradeapp.exe");
    for path in [&kabus_exe, &script, &trade_exe] {
        std::fs::write(path, b"").unwrap();
    }

    let probe = MockProcessProbe::new();
    let launcher = MockProcessLauncher::new_surviving().with_probe(probe.clone());
    let token_store = Arc::new(TokenStore::new());

    let orchestrator = BootOrchestrator::new(
        BootPorts {
            probe: Arc::new(SlowProbe {
                inner: probe.clone(),
                latency: probe_latency,
            }),
            launcher: Arc::new(launcher.clone()),
            script_runner: Arc::new(MockScriptRunner::new_success()),
            token_gateway: Arc::new(gateway.clone()),
            delay: Arc::new(RecordingDelay::new()),
        },
        token_store.clone(),
        BootSettings {
            kabus: TargetSpec::new("KabuStation").candidate(kabus_exe),
            login_script: script,
            api_password: ApiPassword::new("secret"),
            trade_app: TradeAppSettings {
                target: TargetSpec::new("TradeApp").candidate(trade_exe),
                ..Default::default()
            },
            timing: BootTiming::default(),
        },
    );

    Setup {
        _dir: dir,
        probe,
        launcher,
        gateway,
        token_store,
        orchestrator: Arc::new(orchestrator),
    }
}

/// Readers racing a writer only ever see complete tokens
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_token_store_readers_never_see_partial_values() {
    let store = Arc::new(TokenStore::new());
    let written: Vec<String> = (0..200)
        .map(|i| format!("{}-{}", i, "x".repeat(64 + i)))
        .collect();
    let valid: Arc<HashSet<String>> = Arc::new(written.iter().cloned().collect());

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for token in written {
                store.set(SessionToken::new(token).unwrap());
                tokio::task::yield_now().await;
            }
        })
    };

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let valid = valid.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    if let Some(token) = store.get() {
                        assert!(valid.contains(token.expose()), "torn read");
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}

/// Two API auths in a row: two independent successes, the later token wins
#[tokio::test]
async fn test_repeated_api_auth_overwrites_token() {
    let s = setup(Duration::ZERO, MockTokenGateway::new_tokens(["tok-a", "tok-b"]));

    s.orchestrator.authenticate_api().await.unwrap();
    assert_eq!(s.token_store.get().unwrap().expose(), "tok-a");

    s.orchestrator.authenticate_api().await.unwrap();
    assert_eq!(s.token_store.get().unwrap().expose(), "tok-b");
    assert_eq!(s.gateway.call_count(), 2);
}

/// Known hazard: overlapping Terminal boots both see "not running" and both launch
#[tokio::test]
async fn test_overlapping_terminal_boots_double_launch() {
    let s = setup(
        Duration::from_millis(50),
        MockTokenGateway::new_tokens(["tok"]),
    );

    let (first, second) = tokio::join!(
        s.orchestrator.authenticate_kabus(),
        s.orchestrator.authenticate_kabus()
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(s.launcher.call_count(), 2);
    assert_eq!(first.started, Some(true));
    assert_eq!(second.started, Some(true));
    assert_ne!(first.pid, second.pid);

    // Last writer wins in the PID book
    let recorded = s.orchestrator.pid_report().await.kabus.pid;
    assert!(recorded == first.pid || recorded == second.pid);
    assert_eq!(s.probe.find_pids("KabuS.exe").await.unwrap().len(), 2);
}

/// Sequential boots do not double-launch
#[tokio::test]
async fn test_sequential_terminal_boots_launch_once() {
    let s = setup(Duration::ZERO, MockTokenGateway::new_tokens(["tok"]));

    let first = s.orchestrator.authenticate_kabus().await.unwrap();
    let second = s.orchestrator.authenticate_kabus().await.unwrap();

    assert_eq!(s.launcher.call_count(), 1);
    assert_eq!(first.started, Some(true));
    assert_eq!(second.started, Some(false));
    assert_eq!(second.pids, Some(vec![first.pid.unwrap()]));
}

/// TradeApp launches racing a token refresh always carry a complete token
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_launch_during_token_refresh() {
    let s = setup(
        Duration::ZERO,
        MockTokenGateway::new_tokens(["tok-1", "tok-2", "tok-3"]),
    );
    s.orchestrator.authenticate_api().await.unwrap();

    let auth = {
        let orchestrator = s.orchestrator.clone();
        tokio::spawn(async move {
            for _ in 0..2 {
                orchestrator.authenticate_api().await.unwrap();
            }
        })
    };
    let launches: Vec<_> = (0..4)
        .map(|_| {
            let orchestrator = s.orchestrator.clone();
            tokio::spawn(async move { orchestrator.launch_trade_app().await })
        })
        .collect();

    auth.await.unwrap();
    for launch in launches {
        assert!(launch.await.unwrap().is_ok());
    }

    for spec in s.launcher.launches() {
        let token = spec.args.last().unwrap();
        assert!(["tok-1", "tok-2", "tok-3"].contains(&token.as_str()));
    }
    assert_eq!(s.launcher.call_count(), 4);
}
