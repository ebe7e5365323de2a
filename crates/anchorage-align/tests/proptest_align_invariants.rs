//! Property-based invariant tests for the alignment solver.
//!
//! 1. Containment: with flip and shift on, a popup smaller than the region
//!    ends up fully inside it
//! 2. Flip optimality: a taken flip never covers less of the region
//! 3. Idempotence: repeating a pass yields the same result and flip cache
//! 4. Shift bound: a zero-threshold shift moves no further than the overflow
//! 5. Arrow containment: on overlapping axes the arrow lies on the popup
//! 6. Scale invariance: uniformly scaled geometry gives the same CSS offsets

use anchorage_align::{
    Direction, FlipCache, OverflowPolicy, Placement, PlacementRegistry, Regions, SolverInput,
    solve,
};
use anchorage_core::{AnchorCode, Rect, Region, Size};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

const REGION: f64 = 400.0;

const CODES: &[&str] = &["tl", "tc", "tr", "cl", "cc", "cr", "bl", "bc", "br"];

fn code() -> impl Strategy<Value = AnchorCode> {
    prop::sample::select(CODES).prop_map(AnchorCode::parse)
}

// Even sizes keep every anchor point on whole pixels, so output rounding
// never moves the popup.

/// Popup at the origin, at most 100×100.
fn popup_rect() -> impl Strategy<Value = Rect> {
    (1u32..=50, 1u32..=50)
        .prop_map(|(w, h)| Rect::new(0.0, 0.0, f64::from(w * 2), f64::from(h * 2)))
}

/// Target fully inside the region, at most 50 tall.
fn target_rect() -> impl Strategy<Value = Rect> {
    (1u32..=60, 1u32..=25).prop_map(|(w, h)| (w * 2, h * 2)).prop_flat_map(|(w, h)| {
        let max_x = REGION as u32 - w;
        let max_y = REGION as u32 - h;
        (0..=max_x, 0..=max_y).prop_map(move |(x, y)| {
            Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h))
        })
    })
}

fn preset() -> impl Strategy<Value = Placement> {
    let registry = PlacementRegistry::builtin();
    let placements: Vec<Placement> = registry
        .names()
        .filter_map(|name| registry.get(name).cloned())
        .collect();
    prop::sample::select(placements)
}

fn region() -> Region {
    Region::new(0.0, 0.0, REGION, REGION)
}

fn input(target: Rect, popup: Rect, placement: Placement) -> SolverInput {
    SolverInput {
        target,
        popup,
        popup_css_size: popup.size(),
        popup_mirror: Rect::new(REGION - popup.width, REGION - popup.height, popup.width, popup.height),
        placement,
        regions: Regions {
            visible: region(),
            scroll: region(),
        },
        direction: Direction::Ltr,
    }
}

fn placed(popup: &Rect, x: f64, y: f64) -> Rect {
    popup.translate(x, y)
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn popup_is_contained(target in target_rect(), popup in popup_rect()) {
        let placement = Placement::new("tc", "bc")
            .offset(0.0, 4.0)
            .overflow(
                OverflowPolicy::default()
                    .adjust_x(true)
                    .adjust_y(true)
                    .shift_x(true),
            );
        let mut flips = FlipCache::new();
        let result = solve(&input(target, popup, placement), &mut flips).unwrap();
        let rect = placed(&popup, result.offset_x, result.offset_y);
        prop_assert!(region().contains_rect(&rect), "{rect:?} escapes for target {target:?}");
    }

    #[test]
    fn flip_never_loses_area(
        target in target_rect(),
        popup in popup_rect(),
        from in code(),
        to in code(),
    ) {
        let policy = OverflowPolicy::default().adjust_x(true).adjust_y(true);
        let flipping = Placement::new(from, to).overflow(policy);
        let fixed = Placement::new(from, to);

        let mut flips = FlipCache::new();
        let chosen = solve(&input(target, popup, flipping), &mut flips).unwrap();
        let plain = solve(&input(target, popup, fixed), &mut FlipCache::new()).unwrap();

        let chosen_area = region().overlap_area(&placed(&popup, chosen.offset_x, chosen.offset_y));
        let plain_area = region().overlap_area(&placed(&popup, plain.offset_x, plain.offset_y));
        prop_assert!(chosen_area >= plain_area);
    }

    #[test]
    fn repeated_pass_is_stable(
        target in target_rect(),
        popup in popup_rect(),
        placement in preset(),
    ) {
        let pass = input(target, popup, placement);
        let mut flips = FlipCache::new();
        let first = solve(&pass, &mut flips).unwrap();
        let after_first = flips;
        let second = solve(&pass, &mut flips).unwrap();
        let after_second = flips;
        let third = solve(&pass, &mut flips).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&second, &third);
        prop_assert_eq!(after_first, after_second);
        prop_assert_eq!(after_second, flips);
    }

    #[test]
    fn shift_moves_at_most_the_overflow(target in target_rect(), popup in popup_rect()) {
        let shifting = Placement::new("tc", "bc")
            .overflow(OverflowPolicy::default().shift_x(true));
        let fixed = Placement::new("tc", "bc");

        let shifted = solve(&input(target, popup, shifting), &mut FlipCache::new()).unwrap();
        let plain = solve(&input(target, popup, fixed), &mut FlipCache::new()).unwrap();

        let before = placed(&popup, plain.offset_x, plain.offset_y);
        let overflow = (0.0 - before.left()).max(0.0) + (before.right() - REGION).max(0.0);
        prop_assert!((shifted.offset_x - plain.offset_x).abs() <= overflow + 1.0);
        prop_assert_eq!(shifted.offset_y, plain.offset_y);
    }

    #[test]
    fn arrow_lies_on_popup(
        target in target_rect(),
        popup in popup_rect(),
        placement in preset(),
    ) {
        let result = solve(&input(target, popup, placement), &mut FlipCache::new()).unwrap();
        let rect = placed(&popup, result.offset_x, result.offset_y);

        // Target translated by the resolved target offset; presets have none.
        if rect.left() < target.right() && target.left() < rect.right() {
            prop_assert!(result.arrow_x >= 0.0 && result.arrow_x <= popup.width);
        }
        if rect.top() < target.bottom() && target.top() < rect.bottom() {
            prop_assert!(result.arrow_y >= 0.0 && result.arrow_y <= popup.height);
        }
    }

    #[test]
    fn uniform_scale_keeps_css_offsets(
        half_w in 10u32..=50,
        half_h in 10u32..=50,
        tx in 0u32..=100,
        ty in 0u32..=100,
        target_half in 5u32..=25,
        from in code(),
        to in code(),
        k in prop::sample::select(vec![0.5, 0.75, 1.25, 1.5, 2.0, 3.0]),
    ) {
        let css = Size::new(f64::from(half_w * 2), f64::from(half_h * 2));
        let side = f64::from(target_half * 2);
        let target = Rect::new(f64::from(tx * 2), f64::from(ty * 2), side, side);
        let huge = Region::new(0.0, 0.0, 10_000.0, 10_000.0);

        let run = |factor: f64| {
            let popup = Rect::new(0.0, 0.0, css.width * factor, css.height * factor);
            let pass = SolverInput {
                target: target.scale(factor),
                popup,
                popup_css_size: css,
                popup_mirror: popup,
                placement: Placement::new(from, to),
                regions: Regions { visible: huge, scroll: huge },
                direction: Direction::Ltr,
            };
            solve(&pass, &mut FlipCache::new()).unwrap()
        };

        let baseline = run(1.0);
        let scaled = run(k);
        prop_assert!((scaled.scale_x - k).abs() < 1e-9);
        prop_assert!((scaled.offset_x - baseline.offset_x).abs() < 1e-6);
        prop_assert!((scaled.offset_y - baseline.offset_y).abs() < 1e-6);
    }
}
