use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use brainbox::leaderboard::{open_repository, run_server, ServerConfig};
use brainbox::submit::{ScoreSubmitter, SubmitOutcome};

fn wait_for_outcome(submitter: &ScoreSubmitter) -> SubmitOutcome {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(outcome) = submitter.poll() {
            return outcome;
        }
        assert!(Instant::now() < deadline, "no submission outcome");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn submitter_reports_rank_from_a_live_server() {
    let server_rt = tokio::runtime::Runtime::new().unwrap();
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    let repo = open_repository(&config).unwrap();
    let (ready_tx, ready_rx) = oneshot::channel();
    server_rt.spawn(run_server(config, repo, Some(ready_tx), std::future::pending()));
    let addr = server_rt.block_on(ready_rx).unwrap();

    let submitter = ScoreSubmitter::new(addr.to_string(), "tester").unwrap();
    assert_eq!(submitter.player(), "tester");
    assert_eq!(submitter.poll(), None);

    submitter.submit(12_340);
    assert_eq!(
        wait_for_outcome(&submitter),
        SubmitOutcome::Ranked {
            rank: 1,
            time_ms: 12_340
        }
    );

    submitter.submit(99_000);
    assert_eq!(
        wait_for_outcome(&submitter),
        SubmitOutcome::Ranked {
            rank: 2,
            time_ms: 99_000
        }
    );
}

#[test]
fn submitter_reports_failure_when_server_is_down() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let submitter = ScoreSubmitter::new(addr.to_string(), "tester").unwrap();
    submitter.submit(1_000);
    assert!(matches!(wait_for_outcome(&submitter), SubmitOutcome::Failed(_)));
}
