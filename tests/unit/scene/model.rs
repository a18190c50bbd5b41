use super::*;

#[test]
fn template_json_uses_catalogue_field_names() {
    let t = Template::from_json_str(
        r#"{
            "image": "/temp1.jpg",
            "textBoxes": [
                { "x": 100, "y": 370, "width": 600, "height": 400, "fontSize": 100, "minFont": 40, "align": "center" },
                { "x": 9, "y": 425, "width": 700, "height": 100, "fontSize": 40, "align": "left", "id": "bottom" }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(t.image, "/temp1.jpg");
    assert_eq!(t.text_boxes.len(), 2);
    assert_eq!(t.text_boxes[0].min_font, Some(40.0));
    assert_eq!(t.text_boxes[1].min_font, None);
    assert_eq!(t.text_boxes[1].align, Align::Left);
    assert_eq!(t.text_boxes[1].id.as_deref(), Some("bottom"));

    assert!(Template::from_json_str(r#"{ "image": 3 }"#).is_err());
}

#[test]
fn upload_defaults_follow_image_size() {
    let t = Template::for_image("upload", 1000, 800);
    let [top, bottom] = t.text_boxes.as_slice() else {
        panic!("expected two boxes");
    };
    assert_eq!(top.x, 50.0);
    assert_eq!(top.y, 80.0);
    assert_eq!(top.width, 900.0);
    assert_eq!(top.height, 150.0);
    assert_eq!(top.font_size, 64.0);
    assert_eq!(top.min_font, Some(20.0));
    assert_eq!(bottom.y, 600.0);

    let small = Template::for_image("small", 200, 100);
    assert_eq!(small.text_boxes[0].x, 20.0);
    assert_eq!(small.text_boxes[0].y, 50.0);
    assert_eq!(small.text_boxes[0].width, 160.0);
    assert_eq!(small.text_boxes[0].font_size, 30.0);
}

#[test]
fn text_case_serde_accepts_both_spellings() {
    let c: TextCase = serde_json::from_str(r#""uppercase""#).unwrap();
    assert_eq!(c, TextCase::Upper);
    let c: TextCase = serde_json::from_str(r#""asWritten""#).unwrap();
    assert_eq!(c, TextCase::AsWritten);
    assert_eq!(TextCase::Lower.apply("HeLLo"), "hello");
    assert_eq!(TextCase::Upper.apply("straße"), "STRASSE");
}

#[test]
fn handle_edges_are_consistent_with_anchors() {
    for h in OverlayHandle::ALL {
        let (ux, uy) = h.unit_anchor();
        assert_eq!(h.moves_left(), ux == 0.0);
        assert_eq!(h.moves_right(), ux == 1.0);
        assert_eq!(h.moves_top(), uy == 0.0);
        assert_eq!(h.moves_bottom(), uy == 1.0);
    }
}

#[test]
fn set_font_size_keeps_min_below_max() {
    let mut style = TextStyle::default();
    style.font_size = 60.0;
    let mut tb = TextBox {
        id: TextBoxId(0),
        origin: BoxOrigin::User,
        label: None,
        x: 0.0,
        y: 60.0,
        width: 100.0,
        height: 50.0,
        max_font_size: 60.0,
        min_font_size: 40.0,
        align: Align::Center,
        vertical_align: None,
        style,
        text: String::new(),
    };
    tb.set_font_size(30.0);
    assert_eq!(tb.max_font_size, 30.0);
    assert_eq!(tb.min_font_size, 30.0);
    assert_eq!(tb.style.font_size, 30.0);
    assert_eq!(tb.body_rect(), Rect::new(0.0, 30.0, 100.0, 110.0));
}
