use super::*;

fn canvas() -> Canvas {
    Canvas::new(800, 600).unwrap()
}

#[test]
fn zero_position_anchors_at_canvas_center() {
    let p = anchor(canvas(), Position::default());
    assert_eq!(p, Point::new(400.0, 300.0));
}

#[test]
fn positive_top_moves_up_and_positive_left_moves_right() {
    let p = anchor(
        canvas(),
        Position {
            left: 25.0,
            top: 25.0,
        },
    );
    assert_eq!(p, Point::new(600.0, 150.0));
}

#[test]
fn tilt_shortens_the_opposite_axis() {
    let t = LayerTransform {
        tilt_y: 60.0,
        scale_y: 2.0,
        ..LayerTransform::default()
    };
    let c = tilt_scale(&t).as_coeffs();
    assert!((c[0] - 0.5).abs() < 1e-12);
    assert!((c[3] - 2.0).abs() < 1e-12);
    assert_eq!(c[1], 0.0);
    assert_eq!(c[2], 0.0);
}

#[test]
fn tilt_sign_does_not_mirror() {
    let a = tilt_scale(&LayerTransform {
        tilt_x: 30.0,
        ..LayerTransform::default()
    });
    let b = tilt_scale(&LayerTransform {
        tilt_x: -30.0,
        ..LayerTransform::default()
    });
    assert_eq!(a, b);
}

#[test]
fn glyph_origin_lands_on_the_anchor() {
    let mut layer = TextLayer::new(crate::document::layer::LayerId(1));
    layer.position = Position {
        left: -10.0,
        top: 20.0,
    };
    layer.transform.rotation = 33.0;
    layer.transform.scale_x = 3.0;
    let at = layer_transform(&layer, canvas()) * Point::ORIGIN;
    let want = anchor(canvas(), layer.position);
    assert!((at - want).hypot() < 1e-9);
}

#[test]
fn rotation_is_applied_before_scale() {
    let mut layer = TextLayer::new(crate::document::layer::LayerId(1));
    layer.transform.rotation = 90.0;
    layer.transform.scale_x = 2.0;
    let c = canvas().center();

    // Glyph-space +x rotates onto +y first, so the x scale leaves it alone.
    let p = layer_transform(&layer, canvas()) * Point::new(10.0, 0.0);
    assert!((p.x - c.x).abs() < 1e-9);
    assert!((p.y - (c.y + 10.0)).abs() < 1e-9);

    // The other order would have stretched it to 20.
    let swapped = Affine::translate(c.to_vec2())
        * Affine::rotate(90f64.to_radians())
        * tilt_scale(&layer.transform);
    let q = swapped * Point::new(10.0, 0.0);
    assert!((q.y - (c.y + 20.0)).abs() < 1e-9);
}
