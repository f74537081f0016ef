//! Full sessions against a scripted server on a loopback socket.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::JoinHandle;

use pretty_assertions::assert_eq;

use rfb_auth::{challenge_response, derive_key, ChallengeCipher, DesCipher};
use rfb_remote::{keys, Config, ControllerState, ErrorCode, RemoteController};

fn read_exact(stream: &mut TcpStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    stream.read_exact(&mut buf).unwrap();
    buf
}

fn server_init(width: u16, height: u16, bits_per_pixel: u8, name: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.push(bits_per_pixel);
    out.extend_from_slice(&[0u8; 15]);
    out.extend_from_slice(&(name.len() as u32).to_be_bytes());
    out.extend_from_slice(name);
    out
}

/// Spawn a scripted server; returns its port and the join handle whose
/// value is whatever the script chose to report back.
fn scripted_server<F>(script: F) -> (u16, JoinHandle<Vec<u8>>)
where
    F: FnOnce(TcpStream) -> Vec<u8> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        script(stream)
    });
    (port, handle)
}

fn config(port: u16) -> Config {
    Config::new("127.0.0.1").with_port(port)
}

#[test]
fn session_without_authentication_delivers_keys() {
    let (port, server) = scripted_server(|mut stream| {
        stream.write_all(b"RFB 003.008\n").unwrap();
        assert_eq!(read_exact(&mut stream, 12), b"RFB 003.008\n");
        stream.write_all(&[1, 1]).unwrap();
        assert_eq!(read_exact(&mut stream, 1), [1]);
        stream.write_all(&[0, 0, 0, 0]).unwrap();
        assert_eq!(read_exact(&mut stream, 1), [1]); // ClientInit, shared
        stream.write_all(&server_init(1280, 720, 32, b"loopback")).unwrap();
        assert_eq!(read_exact(&mut stream, 8), [2, 0, 0, 1, 0, 0, 0, 0]);
        // Press plus release of one key.
        read_exact(&mut stream, 16)
    });

    let mut remote = RemoteController::new(config(port)).unwrap();
    remote.connect().unwrap();
    assert_eq!(remote.state(), ControllerState::Connected);
    assert_eq!(remote.server_name().as_deref(), Some("loopback"));
    assert_eq!(remote.screen_size(), Some((1280, 720)));

    remote.toggle_key(keys::OK);
    let key_bytes = server.join().unwrap();
    assert_eq!(
        key_bytes,
        vec![4, 1, 0, 0, 0, 0, 0xe0, 0x01, 4, 0, 0, 0, 0, 0, 0xe0, 0x01]
    );
    remote.disconnect();
    assert_eq!(remote.state(), ControllerState::Disconnected);
}

#[test]
fn vnc_authenticated_session_with_preset_password() {
    let challenge = *b"abcdefghABCDEFGH";
    let (port, server) = scripted_server(move |mut stream| {
        stream.write_all(b"RFB 003.008\n").unwrap();
        read_exact(&mut stream, 12);
        stream.write_all(&[1, 2]).unwrap();
        assert_eq!(read_exact(&mut stream, 1), [2]);
        stream.write_all(&challenge).unwrap();
        let response = read_exact(&mut stream, 16);
        let cipher = DesCipher::with_key(derive_key(b"hunter2"));
        assert_eq!(response, challenge_response(&cipher, &challenge).to_vec());
        stream.write_all(&[0, 0, 0, 0]).unwrap();
        read_exact(&mut stream, 1);
        stream.write_all(&server_init(640, 360, 16, b"auth")).unwrap();
        read_exact(&mut stream, 8)
    });

    let mut remote =
        RemoteController::new(config(port).with_password("hunter2")).unwrap();
    remote.connect().unwrap();
    server.join().unwrap();
    assert_eq!(remote.state(), ControllerState::Connected);
}

#[test]
fn missing_password_stalls_then_resumes() {
    let challenge = [7u8; 16];
    let (port, server) = scripted_server(move |mut stream| {
        stream.write_all(b"RFB 003.008\n").unwrap();
        read_exact(&mut stream, 12);
        stream.write_all(&[1, 2]).unwrap();
        read_exact(&mut stream, 1);
        stream.write_all(&challenge).unwrap();
        // The response only arrives after the caller supplies a password.
        let response = read_exact(&mut stream, 16);
        let cipher = DesCipher::with_key(derive_key(b"late"));
        assert_eq!(response, challenge_response(&cipher, &challenge).to_vec());
        stream.write_all(&[0, 0, 0, 0]).unwrap();
        read_exact(&mut stream, 1);
        stream.write_all(&server_init(4, 4, 32, b"x")).unwrap();
        read_exact(&mut stream, 8)
    });

    let mut remote = RemoteController::new(config(port)).unwrap();
    remote.connect().unwrap();
    assert_eq!(remote.state(), ControllerState::Connecting);
    assert!(remote.needs_credentials());
    assert_eq!(remote.error_code(), Some(ErrorCode::PasswordRequired));

    remote.set_password("late");
    remote.resume();
    server.join().unwrap();
    assert_eq!(remote.state(), ControllerState::Connected);
}

#[test]
fn refused_connection_reports_failure_reason() {
    let (port, server) = scripted_server(|mut stream| {
        stream.write_all(b"RFB 003.008\n").unwrap();
        read_exact(&mut stream, 12);
        stream.write_all(&[0]).unwrap();
        stream.write_all(&4u32.to_be_bytes()).unwrap();
        stream.write_all(b"busy").unwrap();
        Vec::new()
    });

    let mut remote = RemoteController::new(config(port)).unwrap();
    remote.connect().unwrap();
    server.join().unwrap();
    assert_eq!(remote.state(), ControllerState::Failure);
    assert_eq!(remote.error_code(), Some(ErrorCode::ProtocolError));
}

#[test]
fn pushed_updates_fill_the_retained_screen() {
    let (port, server) = scripted_server(|mut stream| {
        stream.write_all(b"RFB 003.008\n").unwrap();
        read_exact(&mut stream, 12);
        stream.write_all(&[1, 1]).unwrap();
        read_exact(&mut stream, 1);
        stream.write_all(&[0, 0, 0, 0]).unwrap();
        read_exact(&mut stream, 1);
        stream.write_all(&server_init(2, 2, 32, b"px")).unwrap();
        read_exact(&mut stream, 8);

        // Full-screen update request, then the update itself.
        assert_eq!(read_exact(&mut stream, 10), [3, 0, 0, 0, 0, 0, 0, 2, 0, 2]);
        let mut update = vec![0u8, 0, 0, 1];
        update.extend_from_slice(&[0, 0, 0, 0, 0, 2, 0, 2]);
        update.extend_from_slice(&0i32.to_be_bytes());
        update.extend_from_slice(&[0x11; 2 * 2 * 4]);
        stream.write_all(&update).unwrap();
        Vec::new()
    });

    let mut remote = RemoteController::new(
        config(port).with_keep_framebuffer(true),
    )
    .unwrap();
    remote.connect().unwrap();
    assert_eq!(remote.state(), ControllerState::Connected);

    remote.request_screen(false);
    server.join().unwrap();
    for _ in 0..50 {
        remote.poll();
        if remote.screen_version() > 0 {
            break;
        }
    }

    assert_eq!(remote.screen_version(), 1);
    assert_eq!(remote.screen_data(), Some(&[0x11u8; 16][..]));
}

#[test]
fn connect_to_closed_port_is_an_error() {
    // Bind then drop, so the port is very likely unoccupied.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut remote = RemoteController::new(
        config(port).with_connect_timeout(std::time::Duration::from_millis(500)),
    )
    .unwrap();
    assert!(remote.connect().is_err());
    assert_eq!(remote.state(), ControllerState::Disconnected);
}
