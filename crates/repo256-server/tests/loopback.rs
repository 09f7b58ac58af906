//! Live loopback tests: a served repository answered over real sockets.

use std::fs;
use std::time::Duration;

use tokio::net::{UdpSocket, UnixDatagram};
use tokio::sync::watch;
use tokio::time::timeout;

use repo256_core::Digest;
use repo256_server::{run, Interface};
use repo256_store::{import, Mode, Repository};
use repo256_wire::{decode_frame, ndntlv};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// An ndx-mode repository serving one nameless object; returns its root
/// guard, the repository, the object bytes and the object digest.
fn served_repo() -> (tempfile::TempDir, Repository, Vec<u8>, Digest) {
    let root = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();

    let object = ndntlv::encode_content(&[], b"over the wire");
    fs::write(src.path().join("obj.bin"), &object).unwrap();
    import(root.path(), src.path()).unwrap();

    let mut repo = Repository::new(root.path(), Mode::Ndx);
    repo.scan().unwrap();

    let mut offset = 0;
    let digest = decode_frame(&object, &mut offset).unwrap().digest;
    (root, repo, object, digest)
}

#[tokio::test]
async fn test_udp_round_trip_and_halt() {
    let (_root, repo, object, digest) = served_repo();

    let iface = Interface::udp(0).await.unwrap();
    let port = iface.local_udp_addr().unwrap().port();

    let (halt_tx, halt_rx) = watch::channel(false);
    let server = tokio::spawn(run(repo, vec![iface], halt_rx));

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let interest = ndntlv::encode_interest(&[], Some(&digest));
    client
        .send_to(&interest, ("127.0.0.1", port))
        .await
        .unwrap();

    let mut buf = vec![0u8; 64 * 1024];
    let (len, _) = timeout(RECV_TIMEOUT, client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf[..len], &object[..]);

    halt_tx.send(true).unwrap();
    timeout(RECV_TIMEOUT, server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_udp_two_interests_in_one_datagram() {
    let root = tempfile::tempdir().unwrap();
    let src = tempfile::tempdir().unwrap();

    let one = ndntlv::encode_content(&[], b"first object");
    let two = ndntlv::encode_content(&[], b"second object");
    fs::write(src.path().join("1.bin"), &one).unwrap();
    fs::write(src.path().join("2.bin"), &two).unwrap();
    import(root.path(), src.path()).unwrap();

    let mut repo = Repository::new(root.path(), Mode::Ndx);
    repo.scan().unwrap();

    let digest = |frame: &[u8]| {
        let mut offset = 0;
        decode_frame(frame, &mut offset).unwrap().digest
    };

    let iface = Interface::udp(0).await.unwrap();
    let port = iface.local_udp_addr().unwrap().port();
    let (halt_tx, halt_rx) = watch::channel(false);
    let server = tokio::spawn(run(repo, vec![iface], halt_rx));

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let mut datagram = ndntlv::encode_interest(&[], Some(&digest(&one)));
    datagram.extend_from_slice(&ndntlv::encode_interest(&[], Some(&digest(&two))));
    client
        .send_to(&datagram, ("127.0.0.1", port))
        .await
        .unwrap();

    // Two replies, in resolution order.
    let mut buf = vec![0u8; 64 * 1024];
    let (len, _) = timeout(RECV_TIMEOUT, client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf[..len], &one[..]);
    let (len, _) = timeout(RECV_TIMEOUT, client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf[..len], &two[..]);

    halt_tx.send(true).unwrap();
    timeout(RECV_TIMEOUT, server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_unix_round_trip() {
    let (_root, repo, object, digest) = served_repo();

    let sockets = tempfile::tempdir().unwrap();
    let server_path = sockets.path().join("repo.sock");
    let client_path = sockets.path().join("client.sock");

    let iface = Interface::unix(&server_path).unwrap();
    let (halt_tx, halt_rx) = watch::channel(false);
    let server = tokio::spawn(run(repo, vec![iface], halt_rx));

    // The client binds its own path so the reply has somewhere to go.
    let client = UnixDatagram::bind(&client_path).unwrap();
    let interest = ndntlv::encode_interest(&[], Some(&digest));
    client.send_to(&interest, &server_path).await.unwrap();

    let mut buf = vec![0u8; 64 * 1024];
    let (len, _) = timeout(RECV_TIMEOUT, client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&buf[..len], &object[..]);

    halt_tx.send(true).unwrap();
    timeout(RECV_TIMEOUT, server).await.unwrap().unwrap().unwrap();
}
