//! End-to-end scans through the public API against loopback services.

use netdiag::config::WorkerPoolConfig;
use netdiag::scanner::{
    http_check, ping_sweep_with, port_scan, run_scan, FnProbe, NullSink, PingProbe, ProbeKind,
    ProbeOutcome, ScanContext, ScanReport, ScanRequest, SweepRange, WorkerPool,
};
use netdiag::{CancelToken, Port, ScanError};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

fn quiet() -> ScanContext {
    ScanContext::new(CancelToken::new(), Arc::new(NullSink))
}

fn config() -> WorkerPoolConfig {
    WorkerPoolConfig::new(16)
        .unwrap()
        .with_timeout(ProbeKind::Connect, Duration::from_secs(2))
        .with_timeout(ProbeKind::Http, Duration::from_secs(5))
}

/// Answer `count` requests, each with the given status line.
async fn http_server(status_line: &'static str, count: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for _ in 0..count {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let response =
                format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn port_scan_reports_only_listening_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();
    let closed = {
        let scratch = TcpListener::bind("127.0.0.1:0").await.unwrap();
        scratch.local_addr().unwrap().port()
    };

    let request = ScanRequest::PortScan {
        host: "127.0.0.1".to_string(),
        ports: format!("{closed}, {open}"),
    };
    let report = assert_ok!(run_scan(request, &config(), &quiet()).await);

    match report {
        ScanReport::PortScan(scan) => {
            assert_eq!(scan.open_ports, vec![Port::new(open).unwrap()]);
            assert_eq!(scan.tally.total, 2);
            assert_eq!(scan.tally.succeeded, 1);
        }
        other => panic!("unexpected report: {other:?}"),
    }
}

#[tokio::test]
async fn port_scan_resolves_hostname_to_ipv4() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();
    let closed = {
        let scratch = TcpListener::bind("127.0.0.1:0").await.unwrap();
        scratch.local_addr().unwrap().port()
    };

    let report = port_scan("localhost", &format!("{open},{closed}"), &config(), &quiet())
        .await
        .unwrap();

    assert_eq!(report.host, "localhost");
    assert!(report.ip.is_ipv4(), "resolved to {}", report.ip);
    assert!(report.ip.is_loopback());
    assert_eq!(report.open_ports, vec![Port::new(open).unwrap()]);
    assert!(report
        .probed
        .iter()
        .all(|p| p.target.ip() == report.ip));
}

#[tokio::test]
async fn port_scan_rejects_bad_specs_before_probing() {
    for spec in ["0", "70000", "22,ssh", "1-x"] {
        let err = port_scan("127.0.0.1", spec, &config(), &quiet())
            .await
            .unwrap_err();
        assert!(
            matches!(err, ScanError::InvalidPortSpec(_)),
            "{spec}: {err}"
        );
    }
}

#[tokio::test]
async fn port_scan_unresolvable_host() {
    let err = port_scan("no-such-host.invalid", "80", &config(), &quiet())
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::ResolutionFailed { .. }));
}

#[tokio::test]
async fn http_check_classifies_each_url() {
    let ok = http_server("200 OK", 1).await;
    let broken = http_server("503 Service Unavailable", 1).await;
    let refused = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let urls = format!("{ok}, {broken},,{refused}");
    let report = http_check(&urls, &config(), &quiet()).await.unwrap();
    let lines: Vec<String> = report.checks.iter().map(|c| c.to_string()).collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], format!("{ok} OK (status=200)"));
    assert_eq!(lines[1], format!("{broken} FAIL (status=503)"));
    assert!(lines[2].starts_with(&format!("{refused} ERROR (")));
    assert_eq!(report.tally.succeeded, 1);
}

#[tokio::test]
async fn sweep_rejects_inverted_unterminated_and_oversized_ranges() {
    let inverted = SweepRange::Linear {
        prefix: "10.0.0.".to_string(),
        start: 20,
        end: 1,
    };
    let unterminated = SweepRange::Linear {
        prefix: "10.0.0".to_string(),
        start: 1,
        end: 20,
    };
    let oversized = SweepRange::Linear {
        prefix: "10.0.0.".to_string(),
        start: 0,
        end: u32::MAX,
    };

    for range in [inverted, unterminated, oversized] {
        let err = run_scan(ScanRequest::PingSweep(range), &config(), &quiet())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidRange(_)));
    }

    let err = run_scan(
        ScanRequest::PingSweep(SweepRange::Cidr("10.0.0.0/8".to_string())),
        &config(),
        &quiet(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ScanError::InvalidRange(_)));
}

#[cfg(unix)]
#[tokio::test]
async fn ping_sweep_with_stand_in_program() {
    let range = SweepRange::Cidr("192.0.2.0/29".to_string());
    let cfg = config().with_timeout(ProbeKind::Ping, Duration::from_secs(1));

    let report = ping_sweep_with(PingProbe::with_program("true"), &range, &cfg, &quiet())
        .await
        .unwrap();
    assert_eq!(report.live_hosts.len(), 6);
    assert_eq!(report.live_hosts[0], "192.0.2.1");
    assert_eq!(report.live_hosts[5], "192.0.2.6");

    let report = ping_sweep_with(PingProbe::with_program("false"), &range, &cfg, &quiet())
        .await
        .unwrap();
    assert!(report.live_hosts.is_empty());
    assert_eq!(report.tally.failed, 6);
}

#[tokio::test]
async fn pool_returns_one_outcome_per_target_in_order() {
    let probe = FnProbe::new(ProbeKind::Connect, |n: u32, _timeout| async move {
        tokio::time::sleep(Duration::from_millis(u64::from(n % 7))).await;
        match n % 3 {
            0 => ProbeOutcome::Up,
            1 => ProbeOutcome::Down,
            _ => panic!("probe {n} blew up"),
        }
    });
    let pool = WorkerPool::new(
        probe,
        NonZeroUsize::new(8).unwrap(),
        Duration::from_secs(1),
        CancelToken::new(),
        Arc::new(NullSink),
    );

    let results = pool.run((0..300).collect()).await.unwrap();

    assert_eq!(results.len(), 300);
    for (i, probed) in results.iter().enumerate() {
        assert_eq!(probed.index, i);
        assert_eq!(probed.target, i as u32);
        match i % 3 {
            0 => assert_eq!(probed.outcome, ProbeOutcome::Up),
            1 => assert_eq!(probed.outcome, ProbeOutcome::Down),
            _ => assert!(probed.outcome.is_error()),
        }
    }
}
