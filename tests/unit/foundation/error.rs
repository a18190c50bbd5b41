use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CaptionError::input("x")
            .to_string()
            .contains("input error:")
    );
    assert!(
        CaptionError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        CaptionError::capability("x")
            .to_string()
            .contains("capability error:")
    );
    assert!(
        CaptionError::invariant("x")
            .to_string()
            .contains("invariant violation:")
    );
    assert!(
        CaptionError::config("x")
            .to_string()
            .contains("config error:")
    );
}

#[test]
fn kinds_follow_variants() {
    assert_eq!(CaptionError::input("x").kind(), ErrorKind::Input);
    assert_eq!(CaptionError::decode("x").kind(), ErrorKind::Decode);
    assert_eq!(CaptionError::capability("x").kind(), ErrorKind::Capability);
    assert_eq!(CaptionError::invariant("x").kind(), ErrorKind::Invariant);
    assert_eq!(CaptionError::encode("x").kind(), ErrorKind::Encode);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CaptionError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
