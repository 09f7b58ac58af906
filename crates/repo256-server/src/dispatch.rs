//! # Datagram Dispatcher
//!
//! Walks one received datagram, frame by frame, resolving each Interest
//! through the repository. A datagram may carry several concatenated
//! Interests; each gets its reply, in order. The first undecodable frame
//! discards the rest of the datagram.

use tracing::{debug, trace, warn};

use repo256_core::DecodeError;
use repo256_store::Repository;
use repo256_wire::{decode_frame, PacketType};

use crate::face::FaceTable;
use crate::iface::PeerAddr;

/// Process one datagram; returns the reply buffers to enqueue on the
/// originating interface, in resolution order.
pub fn dispatch(
    repo: &mut Repository,
    faces: &mut FaceTable,
    ifindex: usize,
    payload: &[u8],
    peer: &PeerAddr,
) -> Vec<Vec<u8>> {
    let face = faces.get_or_create(ifindex, peer);
    trace!(face, ifindex, len = payload.len(), "datagram received");

    let mut replies = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        match decode_frame(payload, &mut offset) {
            Ok(pkt) => {
                if pkt.ptype != PacketType::Interest {
                    debug!(face, suite = %pkt.suite, "non-interest frame, discarding rest");
                    break;
                }
                if let Some(reply) = repo.resolve(&pkt) {
                    replies.push(reply);
                }
                if offset < payload.len() {
                    warn!(face, left = payload.len() - offset, "bytes left in datagram");
                }
            }
            Err(DecodeError::UnknownSuite { first_byte }) => {
                warn!(
                    face,
                    offset,
                    "unknown packet format (first byte 0x{first_byte:02x}), discarding rest"
                );
                break;
            }
            Err(err) => {
                debug!(face, %err, offset, "frame decode failed, discarding rest");
                break;
            }
        }
    }
    replies
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use repo256_core::Digest;
    use repo256_store::{import, Mode, Repository};
    use repo256_wire::ndntlv;

    fn peer() -> PeerAddr {
        PeerAddr::Udp(([127, 0, 0, 1], 9999).into())
    }

    /// An ndx-mode repository holding the given objects.
    fn repo_with(objects: &[Vec<u8>]) -> (tempfile::TempDir, Repository) {
        let root = tempfile::tempdir().unwrap();
        let src = tempfile::tempdir().unwrap();
        for (i, obj) in objects.iter().enumerate() {
            fs::write(src.path().join(format!("{i}.bin")), obj).unwrap();
        }
        import(root.path(), src.path()).unwrap();
        let mut repo = Repository::new(root.path(), Mode::Ndx);
        repo.scan().unwrap();
        (root, repo)
    }

    fn digest_of(frame: &[u8]) -> Digest {
        let mut offset = 0;
        decode_frame(frame, &mut offset).unwrap().digest
    }

    #[test]
    fn test_two_concatenated_interests_two_replies_in_order() {
        let one = ndntlv::encode_content(&[], b"object one");
        let two = ndntlv::encode_content(&[], b"object two");
        let (_root, mut repo) = repo_with(&[one.clone(), two.clone()]);
        let mut faces = FaceTable::new();

        let mut datagram = ndntlv::encode_interest(&[], Some(&digest_of(&one)));
        datagram.extend_from_slice(&ndntlv::encode_interest(&[], Some(&digest_of(&two))));

        let replies = dispatch(&mut repo, &mut faces, 0, &datagram, &peer());
        assert_eq!(replies, vec![one, two]);
    }

    #[test]
    fn test_empty_datagram_is_harmless() {
        let (_root, mut repo) = repo_with(&[]);
        let mut faces = FaceTable::new();
        let replies = dispatch(&mut repo, &mut faces, 0, &[], &peer());
        assert!(replies.is_empty());
    }

    #[test]
    fn test_trailing_garbage_after_valid_interest() {
        let obj = ndntlv::encode_content(&[], b"served anyway");
        let (_root, mut repo) = repo_with(&[obj.clone()]);
        let mut faces = FaceTable::new();

        let mut datagram = ndntlv::encode_interest(&[], Some(&digest_of(&obj)));
        datagram.extend_from_slice(&[0x42, 0x42, 0x42]);

        let replies = dispatch(&mut repo, &mut faces, 0, &datagram, &peer());
        assert_eq!(replies, vec![obj]);
    }

    #[test]
    fn test_unknown_suite_discards_datagram() {
        let (_root, mut repo) = repo_with(&[]);
        let mut faces = FaceTable::new();
        let replies = dispatch(&mut repo, &mut faces, 0, &[0x42, 0x00], &peer());
        assert!(replies.is_empty());
    }

    #[test]
    fn test_content_frame_is_not_a_request() {
        let obj = ndntlv::encode_content(&[], b"pushed at us");
        let (_root, mut repo) = repo_with(&[obj.clone()]);
        let mut faces = FaceTable::new();
        let replies = dispatch(&mut repo, &mut faces, 0, &obj, &peer());
        assert!(replies.is_empty());
    }

    #[test]
    fn test_unresolved_interest_elicits_no_reply() {
        let (_root, mut repo) = repo_with(&[]);
        let mut faces = FaceTable::new();
        let datagram = ndntlv::encode_interest(&[], Some(&Digest::of(b"missing")));
        let replies = dispatch(&mut repo, &mut faces, 0, &datagram, &peer());
        assert!(replies.is_empty());
        assert_eq!(repo.stats().drops, 1);
    }
}
