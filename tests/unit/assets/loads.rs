use super::*;

#[test]
fn last_requested_source_wins_regardless_of_completion_order() {
    let mut t = LoadTracker::new();
    let slot = LoadSlot::OverlaySource(OverlayId(3));
    let a = t.begin(slot, SourceKey::new("a.png"), None);
    let b = t.begin(slot, SourceKey::new("b.png"), None);

    assert!(!t.accept(&a));
    assert!(t.accept(&b));
    // Slot is consumed once accepted.
    assert!(!t.accept(&b));
}

#[test]
fn re_requesting_an_earlier_source_revives_it() {
    let mut t = LoadTracker::new();
    let a1 = t.begin(LoadSlot::Base, SourceKey::new("a"), None);
    let b = t.begin(LoadSlot::Base, SourceKey::new("b"), None);
    let _a2 = t.begin(LoadSlot::Base, SourceKey::new("a"), None);

    assert!(!t.accept(&b));
    assert!(t.accept(&a1));
}

#[test]
fn new_overlay_loads_do_not_supersede_each_other() {
    let mut t = LoadTracker::new();
    let a = t.begin_new_overlay(SourceKey::new("a"), Some("image/png".into()));
    let b = t.begin_new_overlay(SourceKey::new("b"), None);
    assert_ne!(a.slot, b.slot);
    assert_eq!(t.pending(), 2);
    assert!(t.accept(&b));
    assert!(t.accept(&a));
}

#[test]
fn forgotten_slots_reject_late_results() {
    let mut t = LoadTracker::new();
    let slot = LoadSlot::OverlaySource(OverlayId(1));
    let a = t.begin(slot, SourceKey::new("a"), None);
    t.forget(slot);
    assert!(!t.is_current(&a));
    assert!(!t.accept(&a));
}
