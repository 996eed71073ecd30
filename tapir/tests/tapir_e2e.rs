//! End-to-end TAPIR scenarios (spec §8: S1-S6) and the white-box
//! invariants they're meant to exercise.

use dbplane::{Database, Update};
use tapir::{Client, Server, VcKind};

fn two_servers(db: Database, q: usize, vc_kind: VcKind) -> (Server, Server) {
    let db1 = db.clone();
    (Server::new(db, q, 0, vc_kind), Server::new(db1, q, 1, vc_kind))
}

fn offline_phase(server0: &mut Server, server1: &mut Server, client: &mut Client) {
    let d0 = server0.gen_digest().unwrap();
    let d1 = server1.gen_digest().unwrap();
    let (hq0, hq1) = client.request_hint();
    let r0 = server0.gen_hint(&hq0).unwrap();
    let r1 = server1.gen_hint(&hq1).unwrap();
    client.ver_setup(d0, d1, r0, r1).unwrap();
}

fn do_query(server0: &Server, server1: &Server, client: &mut Client, idx: usize) -> Vec<u8> {
    let (q0, q1) = client.query(idx).unwrap();
    let a0 = server0.answer(&q0).unwrap();
    let a1 = server1.answer(&q1).unwrap();
    client.reconstruct(&a0, &a1).unwrap()
}

/// S1: smoke test over a deterministic "number DB".
#[test]
fn s1_smoke_number_db() {
    let n = 100;
    let r = 16;
    let q = 4;
    let db = Database::number_db(n, r);
    let (mut server0, mut server1) = two_servers(db, q, VcKind::MerkleTree);
    let mut client = Client::new(n, q, r, VcKind::MerkleTree);

    offline_phase(&mut server0, &mut server1, &mut client);
    let out = do_query(&server0, &server1, &mut client, 37);
    assert_eq!(out, vec![37u8; 16]);
}

/// S2: full sweep of every index, point-proof back-end.
#[test]
fn s2_full_sweep_pointproof() {
    let n = 256;
    let r = 16;
    let q = 16;
    let db = Database::new_random([3u8; 32], n, r);
    let (mut server0, mut server1) = two_servers(db.clone(), q, VcKind::PointProof);
    let mut client = Client::new(n, q, r, VcKind::PointProof);

    offline_phase(&mut server0, &mut server1, &mut client);
    for i in 0..n {
        let out = do_query(&server0, &server1, &mut client, i);
        assert_eq!(out, db.get(i).unwrap(), "mismatch at index {i}");

        // Property 2/3: hint invariant and permutation bijectivity after
        // every successful reconstruct.
        let hint = client.hint().unwrap();
        for s in 0..client.m() {
            let mut expected = vec![0u8; r];
            for part in 0..client.q() {
                let idx = part * client.m() + hint.idx_to_set_idx[part][s] as usize;
                dbplane::xor::xor_into(&mut expected, &db.get(idx).unwrap()).unwrap();
            }
            assert_eq!(hint.parities[s], expected, "parity invariant broken at slot {s}");
        }
        for part in 0..client.q() {
            let mut seen = hint.idx_to_set_idx[part].clone();
            seen.sort();
            assert_eq!(seen, (0..client.m() as u32).collect::<Vec<_>>());
            for (pos, &col) in hint.idx_to_set_idx[part].iter().enumerate() {
                assert_eq!(hint.set_idx_to_idx[part][col as usize], pos as u32);
            }
        }
    }
}

/// S3: updates applied one at a time, queried immediately after each.
#[test]
fn s3_updates_single() {
    let n = 1024;
    let r = 16;
    let q = 32;
    let db = Database::new_random([42u8; 32], n, r);
    let (mut server0, mut server1) = two_servers(db, q, VcKind::MerkleTree);
    let mut client = Client::new(n, q, r, VcKind::MerkleTree);
    offline_phase(&mut server0, &mut server1, &mut client);

    let mut expected_n = n;
    for step in 0..10 {
        let update = if step % 2 == 0 {
            Update::edit(step % expected_n, vec![(100 + step) as u8; r])
        } else {
            Update::add(vec![(200 + step) as u8; r])
        };
        let (n0, q0, d0, ops0) = server0.update(vec![update.clone()]).unwrap();
        let (n1, q1, d1, ops1) = server1.update(vec![update]).unwrap();
        client.update_hint(n0, n1, q0, q1, d0, d1, ops0.clone(), ops1).unwrap();

        if ops0[0].op == dbplane::OpKind::Add {
            expected_n += 1;
        }
        let touched_idx = ops0[0].idx;
        let out = do_query(&server0, &server1, &mut client, touched_idx);
        assert_eq!(out, server0.db().get(touched_idx).unwrap());
        assert_eq!(server0.db().n(), expected_n);
    }
}

/// S4: the same ten ops applied as a single batch.
#[test]
fn s4_updates_batch() {
    let n = 1024;
    let r = 16;
    let q = 32;
    let db = Database::new_random([42u8; 32], n, r);
    let (mut server0, mut server1) = two_servers(db, q, VcKind::MerkleTree);
    let mut client = Client::new(n, q, r, VcKind::MerkleTree);
    offline_phase(&mut server0, &mut server1, &mut client);

    let batch: Vec<Update> = (0..10u8)
        .map(|i| {
            if i % 2 == 0 {
                Update::edit(i as usize, vec![(100 + i) as u8; r])
            } else {
                Update::add(vec![(200 + i) as u8; r])
            }
        })
        .collect();

    let (n0, q0, d0, ops0) = server0.update(batch.clone()).unwrap();
    let (n1, q1, d1, ops1) = server1.update(batch).unwrap();
    client.update_hint(n0, n1, q0, q1, d0, d1, ops0.clone(), ops1).unwrap();

    for op in &ops0 {
        let out = do_query(&server0, &server1, &mut client, op.idx);
        assert_eq!(out, server0.db().get(op.idx).unwrap());
    }
}

/// S5: tampering with an answer byte must trigger an auth failure, never
/// a silently-wrong reconstruction.
#[test]
fn s5_tamper_triggers_auth_failure() {
    let n = 256;
    let r = 16;
    let q = 16;
    let db = Database::new_random([3u8; 32], n, r);
    let (mut server0, mut server1) = two_servers(db, q, VcKind::PointProof);
    let mut client = Client::new(n, q, r, VcKind::PointProof);
    offline_phase(&mut server0, &mut server1, &mut client);

    let (q0, q1) = client.query(10).unwrap();
    let a0 = server0.answer(&q0).unwrap();
    let mut a1 = server1.answer(&q1).unwrap();
    a1.flat_records[0] ^= 0x01;

    let result = client.reconstruct(&a0, &a1);
    assert!(matches!(result, Err(tapir::TapirError::AuthFailure(_))));
}

/// S6: a server serialized after `gen_digest` and replayed in a fresh
/// process reproduces the same digest.
#[test]
fn s6_replay_persistence() {
    let n = 256;
    let r = 16;
    let q = 16;
    let db = Database::new_random([3u8; 32], n, r);
    let mut server0 = Server::new(db, q, 0, VcKind::PointProof);
    let digest = server0.gen_digest().unwrap();

    let bytes = tapir::persist::encode(&server0).unwrap();
    let mut replayed = tapir::persist::decode(&bytes).unwrap();
    let replayed_digest = replayed.gen_digest().unwrap();

    assert_eq!(digest.coms, replayed_digest.coms);
}

/// Property 4: two independently constructed servers from the same seed
/// produce byte-identical digests.
#[test]
fn digest_equality_under_replication() {
    let n = 128;
    let r = 16;
    let q = 8;
    let db0 = Database::new_random([77u8; 32], n, r);
    let db1 = Database::new_random([77u8; 32], n, r);
    let mut s0 = Server::new(db0, q, 0, VcKind::MerkleTree);
    let mut s1 = Server::new(db1, q, 1, VcKind::MerkleTree);
    assert_eq!(s0.gen_digest().unwrap().coms, s1.gen_digest().unwrap().coms);
}
