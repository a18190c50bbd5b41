use super::*;

const MS: Duration = Duration::from_millis(1);

fn fake_face() -> Vec<u8> {
    let mut v = vec![0x00, 0x01, 0x00, 0x00];
    v.extend_from_slice(&[0u8; 12]);
    v
}

fn book() -> FontBook {
    FontBook::new(
        vec!["Impact".to_owned(), "Arial".to_owned()],
        Duration::from_millis(2000),
    )
}

#[test]
fn pending_family_waits_then_falls_back() {
    let mut b = book();
    b.provide("Arial", 400, fake_face()).unwrap();
    assert!(b.request("Comic Neue", 700, 100 * MS));

    match b.resolve("Comic Neue", 700, 500 * MS) {
        FontResolution::Waiting { until } => assert_eq!(until, 2100 * MS),
        other => panic!("expected waiting, got {other:?}"),
    }
    match b.resolve("Comic Neue", 700, 2100 * MS) {
        FontResolution::Fallback(f) => assert_eq!(f.family, "Arial"),
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[test]
fn provided_family_resolves_at_nearest_weight() {
    let mut b = book();
    b.request("Impact", 900, Duration::ZERO);
    b.provide("Impact", 400, fake_face()).unwrap();
    b.provide("impact", 700, fake_face()).unwrap();

    let FontResolution::Ready(f) = b.resolve("IMPACT", 900, Duration::ZERO) else {
        panic!("expected ready");
    };
    assert_eq!(f.weight, 700);
    assert!(!b.request("Impact", 900, Duration::ZERO));
}

#[test]
fn failed_family_falls_back_immediately() {
    let mut b = book();
    b.provide("Impact", 900, fake_face()).unwrap();
    b.request("Nope", 400, Duration::ZERO);
    b.fail("Nope", 400);
    let FontResolution::Fallback(f) = b.resolve("Nope", 400, Duration::ZERO) else {
        panic!("expected fallback");
    };
    assert_eq!(f.family, "Impact");
}

#[test]
fn empty_book_is_unavailable() {
    let b = book();
    assert!(matches!(
        b.resolve("Impact", 900, Duration::ZERO),
        FontResolution::Unavailable
    ));
    assert!(b.fallback_face(400).is_none());
}

#[test]
fn non_font_bytes_are_rejected() {
    let mut b = book();
    assert!(b.provide("Impact", 900, b"<html>".to_vec()).is_err());
    assert!(b.fallback_face(900).is_none());
}

#[test]
fn settle_deadline_reports_latest_waiting_face() {
    let mut b = book();
    b.request("A", 400, Duration::ZERO);
    b.request("B", 400, 500 * MS);
    let d = b.settle_deadline([("A", 400), ("B", 400), ("C", 400)], 100 * MS);
    assert_eq!(d, Some(2500 * MS));
    assert_eq!(b.settle_deadline([("A", 400)], 3000 * MS), None);
}

#[test]
fn provided_face_shares_its_bytes() {
    let mut b = book();
    b.provide("Arial", 400, fake_face()).unwrap();
    let f = b.fallback_face(400).unwrap();
    assert_eq!(f.data.data.data().as_ptr(), f.bytes.as_ptr());
    assert_eq!(f.data.data.len(), f.bytes.len());
}
