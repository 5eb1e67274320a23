//! Integration tests against a fake HAProxy admin socket.
//!
//! The fake answers one command per connection like HAProxy does in
//! non-interactive mode and records every command it receives.

use haproxy_stats::{HAProxy, ResourceKind, StatsError, StatsSource};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

const INFO: &str = "Name: HAProxy\nVersion: 2.8.3\nNode: lb-test\nSessRateLimit: 50\n";

const STAT: &str = "\
# pxname,svname,qcur,qmax,scur,smax,slim,stot,bin,bout,dreq,dresp,ereq,econ,eresp,status,type,rate,rate_lim,rate_max,hrsp_1xx,hrsp_2xx,hrsp_3xx,hrsp_4xx,hrsp_5xx,hrsp_other,req_rate,req_tot,qtime,rtime,
public,FRONTEND,,,12,40,100,900,1048576,2097152,3,0,7,,,OPEN,0,4,0,25,0,950,0,50,0,0,9,1000,,,
web-pool,web01,0,4,3,10,50,300,0,0,,0,,1,2,UP,2,1,,5,0,300,0,20,1,0,,,2,40,
web-pool,web02,1,4,2,10,50,300,0,0,,0,,0,0,DOWN,2,1,,5,0,300,0,20,1,0,,,4,60,
web-pool,BACKEND,1,8,5,20,200,600,0,0,0,0,,1,2,UP,1,2,,10,0,600,0,40,2,0,,,3,50,
";

/// Helper to create a unique socket path for a test
fn test_socket_path(test_name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "haproxy-stats-test-{}-{}.sock",
        test_name,
        std::process::id()
    ))
}

/// Spawn a fake admin socket. `clear_reply` is sent for `clear counters`.
fn spawn_fake_haproxy(path: &PathBuf, clear_reply: &'static str) -> Arc<Mutex<Vec<String>>> {
    let _ = std::fs::remove_file(path);
    let listener = UnixListener::bind(path).expect("Failed to bind fake socket");
    let commands = Arc::new(Mutex::new(Vec::new()));
    let seen = commands.clone();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            let mut line = String::new();
            if reader.read_line(&mut line).await.is_err() {
                continue;
            }

            let command = line.trim().to_string();
            let reply = match command.as_str() {
                "show info" => INFO,
                "show stat" => STAT,
                "clear counters all" => clear_reply,
                _ => "Unknown command.\n",
            };
            seen.lock().unwrap().push(command);

            let _ = writer.write_all(reply.as_bytes()).await;
            let _ = writer.shutdown().await;
        }
    });

    commands
}

#[tokio::test]
async fn test_snapshot_over_socket() {
    let path = test_socket_path("snapshot");
    let commands = spawn_fake_haproxy(&path, "");

    let haproxy = HAProxy::new(&path, Duration::from_secs(1));
    let snapshot = haproxy.snapshot().await.expect("snapshot failed");

    assert_eq!(snapshot.node_name(), "lb-test");
    assert_eq!(snapshot.session_rate_limit(), 50.0);
    assert_eq!(snapshot.list_frontends(), vec!["public"]);
    assert_eq!(snapshot.list_backends(), vec!["web-pool"]);
    assert_eq!(snapshot.list_servers(), vec!["web01", "web02"]);
    assert_eq!(
        snapshot.counter(ResourceKind::Frontend, "public", "req_tot").unwrap(),
        1000.0
    );
    assert_eq!(
        snapshot.counter(ResourceKind::Server, "web-pool/web02", "qcur").unwrap(),
        1.0
    );

    assert_eq!(*commands.lock().unwrap(), vec!["show info", "show stat"]);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_clear_counters() {
    let path = test_socket_path("clear");
    let commands = spawn_fake_haproxy(&path, "");

    let haproxy = HAProxy::new(&path, Duration::from_secs(1));
    haproxy.clear_counters().await.expect("clear failed");

    assert_eq!(*commands.lock().unwrap(), vec!["clear counters all"]);
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_clear_counters_refused() {
    let path = test_socket_path("clear-refused");
    spawn_fake_haproxy(&path, "Permission denied\n");

    let haproxy = HAProxy::new(&path, Duration::from_secs(1));
    let err = haproxy.clear_counters().await.unwrap_err();

    assert!(matches!(err, StatsError::Transport(_)));
    assert!(err.to_string().contains("Permission denied"));
    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_socket_dir_merges_processes() {
    let dir = std::env::temp_dir().join(format!("haproxy-stats-dir-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    spawn_fake_haproxy(&dir.join("proc1.sock"), "");
    spawn_fake_haproxy(&dir.join("proc2.sock"), "");

    let haproxy = HAProxy::from_socket_dir(&dir, Duration::from_secs(1)).unwrap();
    assert_eq!(haproxy.sockets().len(), 2);

    let snapshot = haproxy.snapshot().await.unwrap();
    assert_eq!(
        snapshot.counter(ResourceKind::Frontend, "public", "scur").unwrap(),
        24.0
    );
    assert_eq!(
        snapshot.counter(ResourceKind::Backend, "web-pool", "rtime").unwrap(),
        50.0
    );
    assert_eq!(snapshot.session_rate_limit(), 100.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let haproxy = HAProxy::new(test_socket_path("absent"), Duration::from_millis(200));
    let err = haproxy.snapshot().await.unwrap_err();
    assert!(matches!(err, StatsError::Transport(_)));
}
