use serde_json::json;

use super::*;

#[test]
fn new_layer_has_editor_defaults() {
    let l = TextLayer::new(LayerId(1));
    assert_eq!(l.text, "edit");
    assert_eq!(l.typography.font_family, "Inter");
    assert_eq!(l.typography.font_size, 200.0);
    assert_eq!(l.typography.font_weight, 800);
    assert_eq!(l.paint.fill_color, Color::WHITE);
    assert_eq!(l.paint.stroke_color, Color::BLACK);
    assert_eq!(l.paint.stroke_width, 0.0);
    assert_eq!(l.paint.shadow_size, 4.0);
    assert_eq!(l.paint.shadow_color.to_rgba8(), [0, 0, 0, 204]);
    assert_eq!(l.paint.blend_mode, BlendMode::Normal);
    assert_eq!(l.transform, LayerTransform::default());
    assert_eq!(l.group, LayerGroup::Behind);
}

#[test]
fn normalization_clamps_out_of_range_values() {
    let mut l = TextLayer::new(LayerId(1));
    l.transform.scale_x = -2.0;
    l.transform.scale_y = f64::NAN;
    l.paint.opacity = 3.0;
    l.paint.stroke_width = -1.0;
    l.paint.shadow_size = f64::INFINITY;
    l.typography.font_size = 0.0;
    l.typography.font_weight = 1000;
    l.position.left = f64::NAN;

    let n = l.normalized();
    assert_eq!(n.transform.scale_x, 1.0);
    assert_eq!(n.transform.scale_y, 1.0);
    assert_eq!(n.paint.opacity, 1.0);
    assert_eq!(n.paint.stroke_width, 0.0);
    assert_eq!(n.paint.shadow_size, 0.0);
    assert_eq!(n.typography.font_size, DEFAULT_FONT_SIZE);
    assert_eq!(n.typography.font_weight, 900);
    assert_eq!(n.position.left, 0.0);
}

#[test]
fn deserializes_flat_editor_record_with_missing_optionals() {
    let l: TextLayer = serde_json::from_value(json!({
        "id": 42,
        "text": "HELLO",
        "fontFamily": "Inter",
        "top": 10,
        "left": -5,
        "color": "#ff0000",
        "strokeColor": "black",
        "strokeWidth": 2,
        "fontSize": 120,
        "fontWeight": 700,
        "opacity": 0.5,
        "shadowColor": "rgba(0, 0, 0, 0.8)",
        "shadowSize": 0,
        "rotation": 15,
        "tiltX": 0,
        "tiltY": 0,
        "letterSpacing": 3,
        "layer": "front",
        "blendMode": "glow"
    }))
    .unwrap();

    assert_eq!(l.id, LayerId(42));
    assert_eq!(l.position, Position { left: -5.0, top: 10.0 });
    assert_eq!(l.transform.scale_x, 1.0);
    assert_eq!(l.transform.scale_y, 1.0);
    assert_eq!(l.paint.blend_mode, BlendMode::Normal);
    assert_eq!(l.group, LayerGroup::Front);
    assert_eq!(l.typography.font_weight, 700);
}

#[test]
fn serializes_flat_camel_case() {
    let v = serde_json::to_value(TextLayer::new(LayerId(3))).unwrap();
    assert_eq!(v["id"], json!(3));
    assert_eq!(v["fontFamily"], json!("Inter"));
    assert_eq!(v["scaleX"], json!(1.0));
    assert_eq!(v["blendMode"], json!("normal"));
    assert_eq!(v["layer"], json!("behind"));
    assert_eq!(v["color"], json!("#ffffff"));
}

#[test]
fn attribute_parse_accepts_editor_events() {
    assert_eq!(
        LayerAttribute::parse("fontSize", json!(64)).unwrap(),
        LayerAttribute::FontSize(64.0)
    );
    assert_eq!(
        LayerAttribute::parse("opacity", json!("0.25")).unwrap(),
        LayerAttribute::Opacity(0.25)
    );
    assert_eq!(
        LayerAttribute::parse("blendMode", json!("glow")).unwrap(),
        LayerAttribute::BlendMode(BlendMode::Normal)
    );
    assert_eq!(
        LayerAttribute::parse("layer", json!("front")).unwrap(),
        LayerAttribute::Group(LayerGroup::Front)
    );
    assert!(LayerAttribute::parse("fontSize", json!(true)).is_err());
    assert!(LayerAttribute::parse("color", json!("nope")).is_err());
    assert!(LayerAttribute::parse("bogus", json!(1)).is_err());
}

#[test]
fn unknown_group_is_behind() {
    assert_eq!(LayerGroup::from_name("sideways"), LayerGroup::Behind);
    assert_eq!(LayerGroup::from_name(" FRONT "), LayerGroup::Front);
}
