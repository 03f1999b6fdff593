// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

use super::*;
use yare::parameterized;

fn crease(position: f64, radius: f64, gain: f64) -> Crease {
    Crease { position, radius, gain, priority: 0, enabled: true }
}

#[test]
fn empty_field_is_identity() {
    let field = FoldingField::new();
    for x in [-10.0, 0.0, 0.5, 42.0] {
        assert_eq!(field.evaluate(x), x);
        assert_eq!(field.derivative(x), 1.0);
    }
}

#[test]
fn disabled_creases_are_identity() {
    let field = FoldingField::new();
    let mut c = crease(0.0, 1.0, 1.0);
    c.enabled = false;
    field.set_crease("off", c).unwrap();
    assert_eq!(field.evaluate(0.25), 0.25);
}

#[parameterized(
    linear = { Kernel::Linear },
    smooth = { Kernel::Smooth },
    cosine = { Kernel::Cosine },
    hermite = { Kernel::Hermite },
)]
fn kernel_endpoints(kernel: Kernel) {
    assert!((kernel.weight(0.0) - 1.0).abs() < 1e-12);
    assert_eq!(kernel.weight(1.0), 0.0);
    assert_eq!(kernel.weight(2.0), 0.0);
}

#[test]
fn no_effect_at_radius_boundary() {
    let field = FoldingField::new();
    field.set_crease("pull", crease(0.0, 2.0, 1.0)).unwrap();
    // |x - pos| == radius exactly: kernel weight is 0.
    assert_eq!(field.evaluate(2.0), 2.0);
    assert_eq!(field.evaluate(-2.0), -2.0);
}

#[test]
fn full_gain_at_center_snaps_to_position() {
    let field = FoldingField::new();
    field.set_crease("pull", crease(3.0, 1.0, 1.0)).unwrap();
    // At the center K(0)=1, so y + 1*1*(pos-y) == pos.
    assert_eq!(field.evaluate(3.0), 3.0);
    let near = field.evaluate(3.0 + 1e-9);
    assert!((near - 3.0).abs() < 1e-6);
}

#[test]
fn pull_moves_toward_position() {
    let field = FoldingField::new();
    field.set_crease("pull", crease(0.0, 1.0, 0.5)).unwrap();
    let y = field.evaluate(0.5);
    assert!(y < 0.5 && y > 0.0);
}

#[test]
fn priority_orders_application() {
    // Two creases whose composition is order-dependent.
    let field = FoldingField::new();
    field.set_kernel(Kernel::Linear);
    let mut a = crease(1.0, 10.0, 1.0);
    a.priority = 1;
    let mut b = crease(-1.0, 10.0, 1.0);
    b.priority = 2;
    field.set_crease("a", a.clone()).unwrap();
    field.set_crease("b", b.clone()).unwrap();
    let low_then_high = field.evaluate(0.5);

    let field2 = FoldingField::new();
    field2.set_kernel(Kernel::Linear);
    let mut a2 = a;
    a2.priority = 2;
    let mut b2 = b;
    b2.priority = 1;
    field2.set_crease("a", a2).unwrap();
    field2.set_crease("b", b2).unwrap();
    let high_then_low = field2.evaluate(0.5);

    assert_ne!(low_then_high, high_then_low);
}

#[test]
fn name_breaks_priority_ties_deterministically() {
    let field = FoldingField::new();
    field.set_kernel(Kernel::Linear);
    field.set_crease("zed", crease(1.0, 10.0, 0.9)).unwrap();
    field.set_crease("ack", crease(-1.0, 10.0, 0.9)).unwrap();
    // Same priority: "ack" applies before "zed" every time.
    let first = field.evaluate(0.25);
    for _ in 0..5 {
        assert_eq!(field.evaluate(0.25), first);
    }
}

#[test]
fn derivative_matches_finite_difference() {
    let field = FoldingField::new();
    field.set_kernel(Kernel::Smooth);
    field.set_crease("a", crease(0.5, 2.0, 0.7)).unwrap();
    field.set_crease("b", crease(-0.25, 1.5, 0.3)).unwrap();
    let h = 1e-6;
    for x in [-1.0, -0.3, 0.0, 0.4, 1.2] {
        let analytic = field.derivative(x);
        let numeric = (field.evaluate(x + h) - field.evaluate(x - h)) / (2.0 * h);
        assert!(
            (analytic - numeric).abs() < 1e-4,
            "x={x}: analytic {analytic} vs numeric {numeric}"
        );
    }
}

#[test]
fn evaluate_many_matches_scalar() {
    let field = FoldingField::new();
    field.set_crease("a", crease(0.0, 1.0, 0.5)).unwrap();
    let xs = [-0.5, 0.0, 0.5, 2.0];
    let ys = field.evaluate_many(&xs);
    for (x, y) in xs.iter().zip(&ys) {
        assert_eq!(field.evaluate(*x), *y);
    }
}

#[test]
fn rejects_non_positive_radius() {
    let field = FoldingField::new();
    assert!(matches!(
        field.set_crease("bad", crease(0.0, 0.0, 1.0)),
        Err(FoldError::InvalidRadius { .. })
    ));
    assert!(field.set_crease("bad", crease(0.0, -1.0, 1.0)).is_err());
}

#[test]
fn configure_snapshot_round_trip() {
    let field = FoldingField::new();
    let config = serde_json::json!({
        "kernel": "cosine",
        "creases": {
            "mid": {"position": 1.0, "radius": 2.0, "gain": 0.5, "priority": 3},
            "edge": {"position": -1.0, "radius": 0.5}
        }
    });
    field.configure(&config).unwrap();
    assert_eq!(field.kernel(), Kernel::Cosine);
    assert_eq!(field.crease_count(), 2);

    let snap = field.snapshot();
    let field2 = FoldingField::new();
    field2.configure(&snap).unwrap();
    assert_eq!(field2.snapshot(), snap);
}

#[test]
fn configure_rejects_bad_radius() {
    let field = FoldingField::new();
    let config = serde_json::json!({
        "creases": {"bad": {"position": 0.0, "radius": 0.0}}
    });
    assert!(field.configure(&config).is_err());
    // Failed configure leaves the field untouched.
    assert_eq!(field.crease_count(), 0);
}
