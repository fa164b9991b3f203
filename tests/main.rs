#![allow(missing_docs)]

//! End-to-end tests: a real server on an ephemeral port, driven over raw
//! control and data TCP connections.

use pretty_assertions::assert_eq;
use rstest::rstest;
use sandftp::auth::InMemoryAuthenticator;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

static TESTPORT: AtomicU16 = AtomicU16::new(3121);

struct Harness {
    root: PathBuf,
    _tempdir: tempfile::TempDir,
    addr: String,
}

async fn custom_server_harness<F>(configure: F) -> Harness
where
    F: Fn(sandftp::ServerBuilder) -> sandftp::ServerBuilder,
{
    let port = TESTPORT.fetch_add(1, Ordering::Relaxed);
    let addr = format!("127.0.0.1:{}", port);
    let tempdir = tempfile::TempDir::new().unwrap();
    let root = tempdir.path().to_path_buf();

    let users = InMemoryAuthenticator::new();
    users.add_user("alice", "secret");
    let builder = sandftp::Server::with_root(root.clone()).authenticator(Arc::new(users));
    let server = configure(builder).build().unwrap().listen(addr.clone());
    tokio::spawn(server);

    // Probe until the listener is up, and let the probe session die down
    // again before the tests connect for real.
    loop {
        match TcpStream::connect(&addr).await {
            Ok(probe) => {
                let mut probe = BufReader::new(probe);
                let mut banner = String::new();
                probe.read_line(&mut banner).await.unwrap();
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    Harness {
        root,
        _tempdir: tempdir,
        addr,
    }
}

async fn server_harness() -> Harness {
    custom_server_harness(|builder| builder).await
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: &str) -> TestClient {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        let mut client = TestClient {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        client.expect("220 ").await;
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(format!("{}\r\n", line).as_bytes()).await.unwrap();
    }

    async fn read_reply(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line
    }

    async fn cmd(&mut self, line: &str) -> String {
        self.send(line).await;
        self.read_reply().await
    }

    async fn expect(&mut self, prefix: &str) -> String {
        let reply = self.read_reply().await;
        assert!(
            reply.starts_with(prefix),
            "expected reply starting with {:?}, got {:?}",
            prefix,
            reply
        );
        reply
    }

    async fn login(&mut self) {
        assert_eq!(self.cmd("USER alice").await, "331 Password required\r\n");
        assert_eq!(self.cmd("PASS secret").await, "230 User logged in, proceed\r\n");
    }

    /// Issues PASV and connects a data socket to the advertised endpoint.
    async fn open_passive(&mut self) -> TcpStream {
        let reply = self.cmd("PASV").await;
        assert!(reply.starts_with("227 "), "unexpected PASV reply: {:?}", reply);
        TcpStream::connect(parse_pasv_addr(&reply)).await.unwrap()
    }
}

fn parse_pasv_addr(reply: &str) -> String {
    let open = reply.find('(').unwrap();
    let close = reply.find(')').unwrap();
    let numbers: Vec<u16> = reply[open + 1..close].split(',').map(|s| s.trim().parse().unwrap()).collect();
    assert_eq!(numbers.len(), 6);
    format!(
        "{}.{}.{}.{}:{}",
        numbers[0],
        numbers[1],
        numbers[2],
        numbers[3],
        numbers[4] * 256 + numbers[5]
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn login_pwd_quit() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    assert_eq!(client.cmd("PWD").await, "257 \"/\" is current directory\r\n");
    assert_eq!(client.cmd("QUIT").await, "221 Goodbye\r\n");
}

#[rstest]
#[case("PWD")]
#[case("CWD dir1")]
#[case("SIZE hello.txt")]
#[case("PASV")]
#[case("LIST")]
#[case("MLSD")]
#[tokio::test(flavor = "multi_thread")]
async fn commands_require_login(#[case] command: &str) {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    assert_eq!(client.cmd(command).await, "530 Not logged in\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn noop_and_quit_work_without_login() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    assert_eq!(client.cmd("NOOP").await, "200 Successfully did nothing\r\n");
    client.send("QUIT").await;
    client.expect("221 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn pass_without_user_is_a_sequence_error() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.send("PASS whatever").await;
    client.expect("503 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn bad_password_keeps_session_unauthenticated() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.send("USER alice").await;
    client.expect("331 ").await;
    assert_eq!(client.cmd("PASS nope").await, "530 Authentication failed\r\n");
    assert_eq!(client.cmd("PWD").await, "530 Not logged in\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn fresh_user_drops_authentication() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    client.send("USER alice").await;
    client.expect("331 ").await;
    assert_eq!(client.cmd("PWD").await, "530 Not logged in\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn syst_and_type() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    assert_eq!(client.cmd("SYST").await, "215 UNIX Type: L8\r\n");
    assert_eq!(client.cmd("TYPE I").await, "200 Type set to binary\r\n");
    assert_eq!(client.cmd("TYPE a").await, "200 Type set to ASCII\r\n");
    client.send("TYPE E").await;
    client.expect("504 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_verb_gets_502() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    assert_eq!(client.cmd("MLSD /tmp").await, "502 Command not implemented: MLSD\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn size_reports_bytes_of_regular_files_only() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    std::fs::create_dir(harness.root.join("dir1")).unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    assert_eq!(client.cmd("SIZE hello.txt").await, "213 12\r\n");
    client.send("SIZE dir1").await;
    client.expect("550 ").await;
    client.send("SIZE nope.txt").await;
    client.expect("550 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn mdtm_is_a_utc_timestamp() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    let reply = client.cmd("MDTM hello.txt").await;
    let timestamp = reply.strip_prefix("213 ").unwrap().trim_end();
    assert_eq!(timestamp.len(), 14);
    assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test(flavor = "multi_thread")]
async fn passive_retr_streams_the_file() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    let mut data = client.open_passive().await;
    client.send("RETR hello.txt").await;
    client.expect("150 ").await;
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"Hello, FTP!\n");
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn rest_resumes_retr_and_is_single_shot() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    assert_eq!(client.cmd("REST 7").await, "350 Restart position accepted (7)\r\n");
    let mut data = client.open_passive().await;
    client.send("RETR hello.txt").await;
    client.expect("150 ").await;
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"FTP!\n");
    client.expect("226 ").await;

    // The marker was consumed; the next transfer starts from byte zero.
    let mut data = client.open_passive().await;
    client.send("RETR hello.txt").await;
    client.expect("150 ").await;
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"Hello, FTP!\n");
    client.expect("226 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn rest_rejects_garbage() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    client.send("REST minus-five").await;
    client.expect("501 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stor_roundtrips_bytes() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    let mut data = client.open_passive().await;
    client.send("STOR up.txt").await;
    client.expect("150 ").await;
    data.write_all(b"uploaded contents").await.unwrap();
    drop(data);
    assert_eq!(client.read_reply().await, "226 Transfer complete\r\n");
    assert_eq!(std::fs::read(harness.root.join("up.txt")).unwrap(), b"uploaded contents");
}

#[tokio::test(flavor = "multi_thread")]
async fn stor_with_rest_truncates_to_the_marker() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("up.txt"), b"Hello, world!").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    client.send("REST 5").await;
    client.expect("350 ").await;
    let mut data = client.open_passive().await;
    client.send("STOR up.txt").await;
    client.expect("150 ").await;
    data.write_all(b"XYZ").await.unwrap();
    drop(data);
    client.expect("226 ").await;
    assert_eq!(std::fs::read(harness.root.join("up.txt")).unwrap(), b"HelloXYZ");
}

#[tokio::test(flavor = "multi_thread")]
async fn appe_appends_and_ignores_rest() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("log.txt"), b"abc").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    let mut data = client.open_passive().await;
    client.send("APPE log.txt").await;
    client.expect("150 ").await;
    data.write_all(b"def").await.unwrap();
    drop(data);
    client.expect("226 ").await;
    assert_eq!(std::fs::read(harness.root.join("log.txt")).unwrap(), b"abcdef");

    client.send("REST 1").await;
    client.expect("350 ").await;
    let mut data = client.open_passive().await;
    client.send("APPE log.txt").await;
    client.expect("150 ").await;
    data.write_all(b"XY").await.unwrap();
    drop(data);
    client.expect("226 ").await;
    assert_eq!(std::fs::read(harness.root.join("log.txt")).unwrap(), b"abcdefXY");
}

#[tokio::test(flavor = "multi_thread")]
async fn active_mode_connects_back_to_the_client() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let reply = client
        .cmd(&format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff))
        .await;
    assert_eq!(reply, "200 PORT command successful\r\n");

    client.send("RETR hello.txt").await;
    client.expect("150 ").await;
    let (mut data, _) = listener.accept().await.unwrap();
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"Hello, FTP!\n");
    client.expect("226 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_port_argument_is_rejected() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    assert_eq!(client.cmd("PORT 1,2,3").await, "501 Illegal PORT command\r\n");
    assert_eq!(client.cmd("PORT 300,0,0,1,0,21").await, "501 Illegal PORT command\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn cwd_updates_and_normalizes_the_virtual_directory() {
    let harness = server_harness().await;
    std::fs::create_dir_all(harness.root.join("dir1/sub")).unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    client.send("CWD dir1").await;
    client.expect("250 ").await;
    assert_eq!(client.cmd("PWD").await, "257 \"/dir1\" is current directory\r\n");

    client.send("CWD sub//./").await;
    client.expect("250 ").await;
    assert_eq!(client.cmd("PWD").await, "257 \"/dir1/sub\" is current directory\r\n");

    client.send("CDUP").await;
    client.expect("250 ").await;
    assert_eq!(client.cmd("PWD").await, "257 \"/dir1\" is current directory\r\n");

    client.send("CWD /dir1/sub").await;
    client.expect("250 ").await;
    assert_eq!(client.cmd("PWD").await, "257 \"/dir1/sub\" is current directory\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn cwd_cannot_escape_the_sandbox() {
    let harness = server_harness().await;
    std::fs::create_dir(harness.root.join("dir1")).unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    client.send("CWD dir1").await;
    client.expect("250 ").await;
    client.send("CWD ../../etc").await;
    client.expect("550 ").await;
    // The working directory is untouched by the failed change.
    assert_eq!(client.cmd("PWD").await, "257 \"/dir1\" is current directory\r\n");

    // Climbing out via an absolute argument fails the containment check too.
    client.send("CWD /..").await;
    client.expect("550 ").await;
    assert_eq!(client.cmd("PWD").await, "257 \"/dir1\" is current directory\r\n");

    client.send("CWD ..").await;
    client.expect("250 ").await;
    assert_eq!(client.cmd("PWD").await, "257 \"/\" is current directory\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn cdup_stops_at_the_root() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    client.send("CDUP").await;
    client.expect("250 ").await;
    assert_eq!(client.cmd("PWD").await, "257 \"/\" is current directory\r\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn mkd_rmd_and_dele() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("junk.txt"), b"x").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    assert_eq!(client.cmd("MKD newdir").await, "257 \"/newdir\" directory created\r\n");
    assert!(harness.root.join("newdir").is_dir());
    client.send("MKD newdir").await;
    client.expect("550 ").await;

    std::fs::write(harness.root.join("newdir/inner.txt"), b"y").unwrap();
    client.send("RMD newdir").await;
    client.expect("250 ").await;
    assert!(!harness.root.join("newdir").exists());

    client.send("DELE junk.txt").await;
    client.expect("250 ").await;
    assert!(!harness.root.join("junk.txt").exists());
    client.send("DELE junk.txt").await;
    client.expect("550 ").await;

    client.send("RMD /").await;
    client.expect("550 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn rename_moves_files() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    client.send("RNFR hello.txt").await;
    client.expect("350 ").await;
    assert_eq!(client.cmd("RNTO hi.txt").await, "250 Rename successful\r\n");
    assert!(!harness.root.join("hello.txt").exists());
    assert_eq!(std::fs::read(harness.root.join("hi.txt")).unwrap(), b"Hello, FTP!\n");

    client.send("RNTO again.txt").await;
    client.expect("503 ").await;
    client.send("RNFR missing.txt").await;
    client.expect("550 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn list_is_unix_style_with_directories_first() {
    let harness = server_harness().await;
    std::fs::create_dir(harness.root.join("dir1")).unwrap();
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    let mut data = client.open_passive().await;
    client.send("LIST").await;
    client.expect("150 ").await;
    let mut payload = String::new();
    data.read_to_string(&mut payload).await.unwrap();
    client.expect("226 ").await;

    let lines: Vec<&str> = payload.split_inclusive("\r\n").collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert!(line.ends_with("\r\n"), "line not CRLF terminated: {:?}", line);
    }
    assert!(lines[0].starts_with("drwxrwxrwx"), "directory should come first: {:?}", lines[0]);
    assert!(lines[0].trim_end().ends_with(" dir1"));
    assert!(lines[1].starts_with("-rw-rw-rw-"));
    assert!(lines[1].trim_end().ends_with(" hello.txt"));

    // Fixed columns: permissions, links, owner, group, size, then a date.
    let fields: Vec<&str> = lines[1].split_whitespace().collect();
    assert_eq!(fields[1], "1");
    assert_eq!(fields[2], "owner");
    assert_eq!(fields[3], "group");
    assert_eq!(fields[4], "12");
}

#[tokio::test(flavor = "multi_thread")]
async fn nlst_sends_bare_names() {
    let harness = server_harness().await;
    std::fs::create_dir(harness.root.join("dir1")).unwrap();
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    let mut data = client.open_passive().await;
    client.send("NLST").await;
    client.expect("150 ").await;
    let mut payload = String::new();
    data.read_to_string(&mut payload).await.unwrap();
    client.expect("226 ").await;

    let mut names: Vec<&str> = payload.lines().map(str::trim_end).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["dir1", "hello.txt"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn transfer_without_data_channel_is_rejected() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    client.send("RETR hello.txt").await;
    client.expect("425 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_transfer_spends_the_data_channel() {
    let harness = server_harness().await;
    std::fs::write(harness.root.join("hello.txt"), b"Hello, FTP!\n").unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;

    let _data = client.open_passive().await;
    client.send("RETR missing.txt").await;
    client.expect("550 ").await;

    // The PASV intent was consumed by the failed RETR; a new transfer needs
    // a fresh PASV or PORT.
    client.send("RETR hello.txt").await;
    client.expect("425 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn retr_rejects_directories() {
    let harness = server_harness().await;
    std::fs::create_dir(harness.root.join("dir1")).unwrap();
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    let _data = client.open_passive().await;
    client.send("RETR dir1").await;
    client.expect("550 ").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stor_cannot_escape_the_sandbox() {
    let harness = server_harness().await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    let _data = client.open_passive().await;
    client.send("STOR ../evil.txt").await;
    client.expect("550 ").await;
    assert!(!harness.root.parent().unwrap().join("evil.txt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn session_limit_refuses_extra_connections() {
    let harness = custom_server_harness(|builder| builder.max_sessions(1)).await;
    let mut first = TestClient::connect(&harness.addr).await;
    first.login().await;

    let second = TcpStream::connect(&harness.addr).await.unwrap();
    let mut second = BufReader::new(second);
    let mut banner = String::new();
    second.read_line(&mut banner).await.unwrap();
    assert!(banner.starts_with("421 "), "expected a 421 refusal, got {:?}", banner);
}

#[tokio::test(flavor = "multi_thread")]
async fn idle_sessions_time_out() {
    let harness = custom_server_harness(|builder| builder.idle_session_timeout(Duration::from_millis(200))).await;
    let mut client = TestClient::connect(&harness.addr).await;
    client.login().await;
    // Don't send anything; the server should hang up on us.
    client.expect("421 ").await;
    let mut rest = String::new();
    client.reader.read_to_string(&mut rest).await.unwrap();
    assert_eq!(rest, "");
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_indicator_winds_sessions_down() {
    let port = TESTPORT.fetch_add(1, Ordering::Relaxed);
    let addr = format!("127.0.0.1:{}", port);
    let tempdir = tempfile::TempDir::new().unwrap();

    let users = InMemoryAuthenticator::new();
    users.add_user("alice", "secret");
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = sandftp::Server::with_root(tempdir.path())
        .authenticator(Arc::new(users))
        .shutdown_indicator(async move {
            let _ = shutdown_rx.await;
        })
        .build()
        .unwrap();
    let server_handle = tokio::spawn(server.listen(addr.clone()));

    while TcpStream::connect(&addr).await.is_err() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let mut client = TestClient::connect(&addr).await;
    client.login().await;

    shutdown_tx.send(()).unwrap();
    client.expect("421 ").await;
    server_handle.await.unwrap().unwrap();
}
