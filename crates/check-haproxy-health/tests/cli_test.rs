//! End-to-end runs of the plugin binary against a fake HAProxy admin socket.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::process::Command;

const INFO: &str = "Name: HAProxy\nVersion: 2.8.3\nNode: lb-test\nSessRateLimit: 0\n";

const STAT: &str = "\
# pxname,svname,scur,slim,stot,status,type,hrsp_1xx,hrsp_2xx,hrsp_3xx,hrsp_4xx,hrsp_5xx,hrsp_other,req_tot,rate,
public,FRONTEND,12,100,900,OPEN,0,0,950,0,50,0,0,1000,4,
web-pool,web01,3,50,300,UP,2,0,300,0,20,1,0,,1,
web-pool,web02,2,50,300,DOWN,2,0,300,0,20,1,0,,1,
web-pool,BACKEND,5,200,600,UP,1,0,600,0,40,2,0,,2,
";

struct Fixture {
    dir: PathBuf,
    socket: PathBuf,
    config: PathBuf,
    commands: Arc<Mutex<Vec<String>>>,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "check-haproxy-health-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let socket = dir.join("haproxy.sock");
        let config = dir.join("config.yaml");
        std::fs::write(
            &config,
            format!("socket:\n  file: {}\n  timeout: 1s\n", socket.display()),
        )
        .unwrap();

        let commands = spawn_fake_haproxy(&socket);
        Self {
            dir,
            socket,
            config,
            commands,
        }
    }

    async fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_check_haproxy_health"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .await
            .expect("failed to run plugin")
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn spawn_fake_haproxy(path: &Path) -> Arc<Mutex<Vec<String>>> {
    let listener = UnixListener::bind(path).expect("Failed to bind fake socket");
    let commands = Arc::new(Mutex::new(Vec::new()));
    let seen = commands.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let (reader, mut writer) = stream.into_split();
            let mut line = String::new();
            if BufReader::new(reader).read_line(&mut line).await.is_err() {
                continue;
            }

            let command = line.trim().to_string();
            let reply = match command.as_str() {
                "show info" => INFO,
                "show stat" => STAT,
                "clear counters all" => "",
                _ => "Unknown command.\n",
            };
            seen.lock().unwrap().push(command);

            let _ = writer.write_all(reply.as_bytes()).await;
            let _ = writer.shutdown().await;
        }
    });

    commands
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[tokio::test]
async fn test_ok_check_resets_counters() {
    let fixture = Fixture::new("ok");
    let output = fixture
        .run(&["--frontend", "public", "--metric", "http_4XX_pct"])
        .await;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "OK - Frontend \"public\" reports: 5.0% of all requests returned HTTP 4XX | http_4XX_pct=5.0%;;;0;100\n"
    );
    assert_eq!(
        fixture.commands(),
        vec!["show info", "show stat", "clear counters all"]
    );
}

#[tokio::test]
async fn test_warning_with_details() {
    let fixture = Fixture::new("warning");
    let output = fixture
        .run(&[
            "--backend",
            "web-pool",
            "--metric",
            "active_servers",
            "-w",
            "75:",
            "-c",
            "25:",
            "-v",
            "--nozerocounters",
        ])
        .await;

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some(
            "WARNING - Backend \"web-pool\" reports: 50.0% of all servers available are active (outside range 75:) | active_servers=50.0%;75:;25:;0;100"
        )
    );
    assert_eq!(
        lines.next(),
        Some("active_servers: WARNING - 50.0% of all servers available are active (outside range 75:)")
    );
    assert_eq!(fixture.commands(), vec!["show info", "show stat"]);
}

#[tokio::test]
async fn test_critical_exit_code() {
    let fixture = Fixture::new("critical");
    let output = fixture
        .run(&["--server", "web-pool/web01", "--metric", "new_sessions", "-c", "0"])
        .await;

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).starts_with("CRITICAL - Server \"web-pool/web01\" reports: Counted 1 new sessions"));
}

#[tokio::test]
async fn test_missing_resource_is_unknown() {
    let fixture = Fixture::new("missing");
    let output = fixture
        .run(&["--frontend", "nope", "--metric", "new_sessions"])
        .await;

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(
        stdout(&output),
        "UNKNOWN - Frontend \"nope\" was not found. Use --scan to check for resources available.\n"
    );
    assert!(!fixture.commands().contains(&"clear counters all".to_string()));
}

#[tokio::test]
async fn test_invalid_range_never_connects() {
    let fixture = Fixture::new("range");
    let output = fixture
        .run(&["--frontend", "public", "--metric", "new_sessions", "-w", "10:1"])
        .await;

    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).starts_with("UNKNOWN - "));
    assert!(fixture.commands().is_empty());
}

#[tokio::test]
async fn test_no_session_rate_limit() {
    let fixture = Fixture::new("ratelimit");
    let output = fixture
        .run(&["--frontend", "public", "--metric", "session_rate_capacity_pct"])
        .await;

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(
        stdout(&output),
        "UNKNOWN - No session rate limit defined in haproxy config.\n"
    );
}

#[tokio::test]
async fn test_scan_listing() {
    let fixture = Fixture::new("scan");
    let output = fixture.run(&["--scan"]).await;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "Available assets on this node (lb-test):\n\
         \n\
         Backend: web-pool (UP)\n \
         Server 0:  web01 (UP)\n \
         Server 1:  web02 (DOWN)\n\
         \n\
         Frontend: public (OPEN)\n"
    );
    assert_eq!(fixture.commands(), vec!["show info", "show stat"]);
}

#[tokio::test]
async fn test_argument_errors_are_unknown() {
    let fixture = Fixture::new("args");
    let output = fixture.run(&["--frontend", "public"]).await;
    assert_eq!(output.status.code(), Some(3));

    let output = fixture
        .run(&["--frontend", "public", "--backend", "web-pool", "--metric", "new_sessions"])
        .await;
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test]
async fn test_unreachable_socket() {
    let fixture = Fixture::new("unreachable");
    let missing = fixture.dir.join("missing.sock");
    let output = fixture
        .run(&[
            "--frontend",
            "public",
            "--metric",
            "new_sessions",
            "-f",
            missing.to_str().unwrap(),
        ])
        .await;

    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).starts_with("UNKNOWN - "));
    assert!(fixture.socket.exists());
}
