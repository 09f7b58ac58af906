//! # I/O Event Loop
//!
//! One reader task and one bounded transmit queue per interface; one
//! dispatcher loop that owns the `Repository` and the `FaceTable`. All
//! request handling happens on the dispatcher, synchronously, so the index
//! tables need no locking. Datagrams from one interface are processed in
//! arrival order and replies drain FIFO from the originating interface's
//! queue.
//!
//! Shutdown is cooperative: the halt flag is observed between datagrams.
//! A reader that keeps failing gives up on its socket; the loop ends when
//! the halt flag flips or when every reader is gone.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, trace, warn};

use repo256_core::RepoError;
use repo256_store::Repository;

use crate::dispatch::dispatch;
use crate::face::FaceTable;
use crate::iface::{Interface, PeerAddr, MAX_DATAGRAM};

/// Receive queue depth, shared by all interfaces.
const RX_QUEUE: usize = 64;
/// Transmit queue depth per interface; overflow drops the reply.
const TX_QUEUE: usize = 64;
/// Consecutive receive failures after which a reader abandons its socket.
const MAX_RECV_FAILURES: u32 = 16;
/// Period of the housekeeping timer slot.
const HOUSEKEEPING_PERIOD: Duration = Duration::from_secs(60);

struct RxFrame {
    ifindex: usize,
    bytes: Vec<u8>,
    peer: PeerAddr,
}

/// Serve the repository on the given interfaces until `halt` flips.
pub async fn run(
    mut repo: Repository,
    interfaces: Vec<Interface>,
    mut halt: watch::Receiver<bool>,
) -> Result<(), RepoError> {
    if interfaces.is_empty() {
        return Err(RepoError::Config("no interface to serve on".into()));
    }
    info!(
        mode = %repo.mode(),
        interfaces = interfaces.len(),
        "starting main event and I/O loop"
    );

    let (rx_tx, mut rx_rx) = mpsc::channel::<RxFrame>(RX_QUEUE);
    let mut tx_queues = Vec::with_capacity(interfaces.len());

    for (ifindex, iface) in interfaces.into_iter().enumerate() {
        let iface = Arc::new(iface);
        let (tx_tx, mut tx_rx) = mpsc::channel::<(PeerAddr, Vec<u8>)>(TX_QUEUE);
        tx_queues.push(tx_tx);

        let writer = Arc::clone(&iface);
        tokio::spawn(async move {
            while let Some((peer, bytes)) = tx_rx.recv().await {
                match writer.send(&bytes, &peer).await {
                    Ok(sent) => trace!(label = writer.label(), sent, %peer, "reply sent"),
                    Err(err) => warn!(label = writer.label(), %err, %peer, "send failed"),
                }
            }
        });

        let reader_tx = rx_tx.clone();
        let mut reader_halt = halt.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            let mut failures: u32 = 0;
            loop {
                tokio::select! {
                    _ = reader_halt.changed() => break,
                    received = iface.recv(&mut buf) => match received {
                        Ok((len, Some(peer))) => {
                            failures = 0;
                            let frame = RxFrame {
                                ifindex,
                                bytes: buf[..len].to_vec(),
                                peer,
                            };
                            if reader_tx.send(frame).await.is_err() {
                                break;
                            }
                        }
                        Ok((_, None)) => {
                            debug!(label = iface.label(), "unreplyable peer, datagram dropped");
                        }
                        Err(err) => {
                            warn!(label = iface.label(), %err, "receive error");
                            failures += 1;
                            if failures >= MAX_RECV_FAILURES {
                                error!(label = iface.label(), "socket keeps failing, giving up");
                                break;
                            }
                        }
                    }
                }
            }
        });
    }
    // The readers hold the only other senders; when all of them are gone
    // the receive channel closes and the loop below notices.
    drop(rx_tx);

    let mut faces = FaceTable::new();
    let mut housekeeping = tokio::time::interval(HOUSEKEEPING_PERIOD);
    loop {
        tokio::select! {
            changed = halt.changed() => {
                if changed.is_err() || *halt.borrow() {
                    info!("halt flag set, leaving event loop");
                    break;
                }
            }
            _ = housekeeping.tick() => {
                // The timer slot. Aging is not exercised by this server,
                // so the tick only reports.
                let stats = repo.stats();
                trace!(
                    replies = stats.replies,
                    drops = stats.drops,
                    faces = faces.len(),
                    "housekeeping"
                );
            }
            frame = rx_rx.recv() => match frame {
                Some(frame) => {
                    let replies =
                        dispatch(&mut repo, &mut faces, frame.ifindex, &frame.bytes, &frame.peer);
                    for reply in replies {
                        let queued = tx_queues[frame.ifindex]
                            .try_send((frame.peer.clone(), reply));
                        if queued.is_err() {
                            warn!(ifindex = frame.ifindex, "transmit queue full, reply dropped");
                        }
                    }
                }
                None => {
                    error!("all interfaces failed, leaving event loop");
                    return Err(RepoError::Io(std::io::Error::other(
                        "all interfaces failed",
                    )));
                }
            }
        }
    }
    Ok(())
}
