use lightdesk::image::ImageMeta;
use lightdesk::overlay::{
    classify, glyph_at, render_overlays, DrawCmd, Geometry, Glyph, StarFill, ZoomMode,
    DECORATION_SIZE_LIMIT,
};

fn single(px: f32, py: f32) -> Geometry {
    Geometry::new(400.0, 400.0, ZoomMode::Single, px, py)
}

fn grid(px: f32, py: f32) -> Geometry {
    Geometry::new(400.0, 300.0, ZoomMode::Grid, px, py)
}

fn meta(rating: u8) -> ImageMeta {
    ImageMeta {
        id: 1,
        group_id: 1,
        rating,
        rejected: false,
        has_audio: false,
        grouped: false,
        altered: false,
    }
}

// On a 400 px single-mode thumbnail the base radius caps at 10, the star
// row sits at y = 90 and star k is centered at x = 30 + (k + 1.5) * 25.
fn star_center_x(index: usize) -> f32 {
    30.0 + (index as f32 + 1.5) * 25.0
}

#[test]
fn pointer_on_a_star_center_addresses_only_that_star() {
    let geom = single(star_center_x(2), 90.0);
    for (index, star) in Glyph::STARS.iter().enumerate() {
        let hit = classify(*star, true, &geom, None, false);
        assert_eq!(hit.hovered, index == 2, "star index {index}");
    }
    assert_eq!(glyph_at(&geom, false, false), Glyph::Star3);
}

#[test]
fn dragging_right_raises_the_preview() {
    // pointer on star 3: stars 1..3 preview-fill, stars 4..5 stay empty
    let geom = single(star_center_x(2), 90.0);
    let img = meta(0);
    for index in 0..5 {
        let hit = classify(Glyph::STARS[index], true, &geom, Some(&img), false);
        let fill = match &hit.draw[0] {
            DrawCmd::Star { fill, .. } => *fill,
            other => panic!("expected a star, got {other:?}"),
        };
        if index <= 2 {
            assert_eq!(fill, StarFill::Preview, "star index {index}");
        } else {
            assert_eq!(fill, StarFill::Empty, "star index {index}");
        }
    }
}

#[test]
fn static_fill_reflects_the_persisted_rating() {
    let geom = single(-100.0, -100.0);
    let img = meta(2);
    for index in 0..5 {
        let hit = classify(Glyph::STARS[index], false, &geom, Some(&img), false);
        let fill = match &hit.draw[0] {
            DrawCmd::Star { fill, .. } => *fill,
            other => panic!("expected a star, got {other:?}"),
        };
        let expected = if index < 2 { StarFill::Set } else { StarFill::Empty };
        assert_eq!(fill, expected, "star index {index}");
    }
}

#[test]
fn tiny_thumbnails_suppress_every_glyph() {
    for glyph in Glyph::SCAN_ORDER {
        // pointer dead-center, where several glyphs would otherwise hit
        let geom = Geometry::new(
            DECORATION_SIZE_LIMIT,
            DECORATION_SIZE_LIMIT,
            ZoomMode::Single,
            DECORATION_SIZE_LIMIT / 2.0,
            DECORATION_SIZE_LIMIT / 2.0,
        );
        let hit = classify(glyph, true, &geom, Some(&meta(5)), false);
        assert!(!hit.hovered, "{glyph:?}");
        assert!(hit.draw.is_empty(), "{glyph:?}");
    }
    let geom = Geometry::new(40.0, 40.0, ZoomMode::Single, 20.0, 20.0);
    assert_eq!(glyph_at(&geom, true, false), Glyph::None);
}

#[test]
fn reject_is_found_by_the_scan() {
    // single mode reject sits at (3 r1, 9 r1)
    let geom = single(30.0, 90.0);
    assert_eq!(glyph_at(&geom, false, false), Glyph::Reject);
}

#[test]
fn grid_overlays_need_the_metadata_zone_or_the_global_switch() {
    // star row in grid mode is in the lower half, outside the metadata zone
    let geom = grid(200.0, 0.955 * 300.0 - 9.05);
    assert_eq!(glyph_at(&geom, false, false), Glyph::None);
    assert_ne!(glyph_at(&geom, true, false), Glyph::None);
}

#[test]
fn single_mode_is_always_in_the_metadata_zone() {
    assert!(single(390.0, 390.0).in_metadata_zone());
    assert!(!grid(200.0, 290.0).in_metadata_zone());
    assert!(grid(200.0, 10.0).in_metadata_zone());
}

#[test]
fn extended_overlay_moves_the_grid_row_down() {
    let plain = grid(200.0, 150.0);
    let (draw_plain, _) = render_overlays(Some(&meta(1)), &plain, true, true, false, true);
    let (draw_extended, _) = render_overlays(Some(&meta(1)), &plain, true, true, true, true);
    let star_y = |draw: &[DrawCmd]| {
        draw.iter()
            .find_map(|c| match c {
                DrawCmd::Star { center, .. } => Some(center.y),
                _ => None,
            })
            .unwrap()
    };
    // 0.93 h is below 0.955 h - r1 for this thumbnail height
    assert!(star_y(&draw_extended) > star_y(&draw_plain));
}

#[test]
fn render_reports_the_hovered_glyph() {
    let geom = single(star_center_x(3), 90.0);
    let (_, over) = render_overlays(Some(&meta(0)), &geom, true, false, false, true);
    assert_eq!(over, Glyph::Star4);

    let far = single(200.0, 300.0);
    let (_, over) = render_overlays(Some(&meta(0)), &far, true, false, false, true);
    assert_eq!(over, Glyph::None);
}

#[test]
fn missing_image_is_a_neutral_placeholder() {
    let geom = single(star_center_x(1), 90.0);
    let (draw, over) = render_overlays(None, &geom, true, false, false, true);
    // stars and the reject cross are drawn empty, badges are absent
    assert_eq!(over, Glyph::Star2);
    assert!(draw
        .iter()
        .all(|c| !matches!(c, DrawCmd::AudioBadge { .. } | DrawCmd::GroupBadge { .. })));
    assert!(draw.iter().any(|c| matches!(
        c,
        DrawCmd::RejectCross {
            emphasized: false,
            ..
        }
    )));
}
