//! Thumbnail overlay hit-testing and decoration.
//!
//! Everything in this module is pure geometry: given a thumbnail box, the
//! zoom mode and the pointer position, it decides which overlay glyph (star,
//! reject, group, audio, altered) is addressed and which draw commands a
//! renderer should emit. No drawing happens here, so the same call can be
//! made once as "check only" and once as "check and draw" within a frame.

use egui::{pos2, vec2, Pos2, Rect};

use crate::image::ImageMeta;

/// Thumbnails at or below this width get no decorations at all; the glyphs
/// would be unreadable.
pub const DECORATION_SIZE_LIMIT: f32 = 40.0;

/// One interactive overlay glyph on a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    None,
    Star1,
    Star2,
    Star3,
    Star4,
    Star5,
    Reject,
    Group,
    Audio,
    Altered,
}

impl Glyph {
    pub const STARS: [Glyph; 5] = [
        Glyph::Star1,
        Glyph::Star2,
        Glyph::Star3,
        Glyph::Star4,
        Glyph::Star5,
    ];

    /// Exhaustive scan order for "what is under the pointer": stars 1..5,
    /// then reject, group, audio, altered. First match wins.
    pub const SCAN_ORDER: [Glyph; 9] = [
        Glyph::Star1,
        Glyph::Star2,
        Glyph::Star3,
        Glyph::Star4,
        Glyph::Star5,
        Glyph::Reject,
        Glyph::Group,
        Glyph::Audio,
        Glyph::Altered,
    ];

    /// Zero-based ordinal for star glyphs, `None` for everything else.
    pub fn star_index(self) -> Option<usize> {
        match self {
            Glyph::Star1 => Some(0),
            Glyph::Star2 => Some(1),
            Glyph::Star3 => Some(2),
            Glyph::Star4 => Some(3),
            Glyph::Star5 => Some(4),
            _ => None,
        }
    }
}

/// How the thumbnail is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    /// One image filling the center area.
    Single,
    /// One cell among many in the grid browser.
    Grid,
}

/// Geometry inputs for one classification: thumbnail box, zoom mode and the
/// pointer in thumbnail-local coordinates. `scale` maps device-independent
/// sizes to pixels (1.0 on a plain 96 dpi screen).
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    pub zoom: ZoomMode,
    pub px: f32,
    pub py: f32,
    pub scale: f32,
}

impl Geometry {
    pub fn new(width: f32, height: f32, zoom: ZoomMode, px: f32, py: f32) -> Self {
        Self {
            width,
            height,
            zoom,
            px,
            py,
            scale: 1.0,
        }
    }

    /// Base unit radius. Five stars plus two symbols have to fit on one
    /// thumbnail width: 14 r1 of content plus 6 r1 of spacing, with 0.045 w
    /// margins, which caps r1 at 0.91 w / 20.
    pub fn base_radius(&self) -> f32 {
        (10.0 * self.scale).min(0.91 * self.width / 20.0)
    }

    /// Vertical position of the star/reject row.
    fn row_y(&self, extended: bool) -> f32 {
        let r1 = self.base_radius();
        match self.zoom {
            ZoomMode::Grid => {
                if extended {
                    0.93 * self.height
                } else {
                    0.955 * self.height - r1
                }
            }
            ZoomMode::Single => 9.0 * r1,
        }
    }

    fn star_center(&self, index: usize, extended: bool) -> Pos2 {
        let r1 = self.base_radius();
        let x = match self.zoom {
            ZoomMode::Grid => 0.5 * self.width - 5.0 * r1 + index as f32 * 2.5 * r1,
            ZoomMode::Single => 3.0 * r1 + (index as f32 + 1.5) * 2.5 * r1,
        };
        pos2(x, self.row_y(extended))
    }

    fn reject_center(&self, extended: bool) -> Pos2 {
        let r1 = self.base_radius();
        let x = match self.zoom {
            ZoomMode::Grid => 0.045 * self.width + r1,
            ZoomMode::Single => 3.0 * r1,
        };
        pos2(x, self.row_y(extended))
    }

    /// Top-left corner of the 2 r1 square group badge; right-aligned, left of
    /// the altered badge.
    fn group_origin(&self, extended: bool) -> Pos2 {
        let r1 = self.base_radius();
        match self.zoom {
            ZoomMode::Grid => pos2(0.955 * self.width - 4.5 * r1, 0.045 * self.height),
            ZoomMode::Single => pos2(22.5 * r1, self.row_y(extended) - r1),
        }
    }

    fn audio_center(&self, extended: bool) -> Pos2 {
        let r1 = self.base_radius();
        match self.zoom {
            ZoomMode::Grid => pos2(0.955 * self.width - 6.0 * r1, 0.045 * self.height + r1),
            ZoomMode::Single => pos2(26.5 * r1, self.row_y(extended)),
        }
    }

    fn altered_center(&self, extended: bool) -> Pos2 {
        let r1 = self.base_radius();
        match self.zoom {
            ZoomMode::Grid => pos2(0.955 * self.width - r1, 0.045 * self.height + r1),
            ZoomMode::Single => pos2(20.5 * r1, self.row_y(extended)),
        }
    }

    /// Metadata-relevant part of the thumbnail: upper half in grid mode, the
    /// whole area in single mode.
    pub fn in_metadata_zone(&self) -> bool {
        (self.px < self.width && self.py < self.height / 2.0) || self.zoom == ZoomMode::Single
    }
}

/// Fill state for a star glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarFill {
    Empty,
    /// Filled because the persisted rating covers this star.
    Set,
    /// Filled because the pointer is previewing a rating at or above this
    /// star ("drag across stars" raises the preview).
    Preview,
}

/// A single geometric drawing instruction. The renderer decides colors,
/// stroke widths and actual paths.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Clear the whole area to the background color.
    Background { rect: Rect },
    Star {
        center: Pos2,
        outer: f32,
        inner: f32,
        fill: StarFill,
    },
    /// Ring highlighting a hovered circular glyph.
    HoverRing { center: Pos2, radius: f32 },
    RejectCross {
        center: Pos2,
        half: f32,
        /// Draw in the rejected style (red, heavier stroke).
        emphasized: bool,
    },
    GroupBadge {
        rect: Rect,
        /// The image is a member of the group but not its representative.
        member: bool,
    },
    AudioBadge { center: Pos2, radius: f32 },
    AlteredBadge { center: Pos2, radius: f32 },
}

/// Draw-command sink handed to view expose and module post-expose hooks.
#[derive(Default)]
pub struct Surface {
    pub commands: Vec<DrawCmd>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }

    pub fn extend(&mut self, cmds: impl IntoIterator<Item = DrawCmd>) {
        self.commands.extend(cmds);
    }

    pub fn fill_background(&mut self, width: f32, height: f32) {
        self.commands.push(DrawCmd::Background {
            rect: Rect::from_min_size(pos2(0.0, 0.0), vec2(width, height)),
        });
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

/// Result of classifying one glyph against the pointer.
#[derive(Debug, Default)]
pub struct OverlayHit {
    pub hovered: bool,
    pub draw: Vec<DrawCmd>,
}

/// The highest-ordinal star whose distance test against the pointer passes,
/// if any. Moving the pointer to the right across the row raises the result.
fn effective_star(geom: &Geometry, extended: bool) -> Option<usize> {
    let r1 = geom.base_radius();
    let mut best = None;
    for index in 0..5 {
        let c = geom.star_center(index, extended);
        if (geom.px - c.x).powi(2) + (geom.py - c.y).powi(2) < r1 * r1 {
            best = Some(index);
        }
    }
    best
}

/// Classify one glyph: is the pointer addressing it, and what should be drawn
/// for it. `active` enables hover handling (a pointer actually present on
/// this thumbnail); with `active == false` only the static decoration is
/// produced. A missing `img` yields a neutral, non-interactive rendering.
pub fn classify(
    glyph: Glyph,
    active: bool,
    geom: &Geometry,
    img: Option<&ImageMeta>,
    extended: bool,
) -> OverlayHit {
    let mut hit = OverlayHit::default();
    if glyph == Glyph::None || geom.width <= DECORATION_SIZE_LIMIT {
        return hit;
    }
    let r1 = geom.base_radius();

    if let Some(index) = glyph.star_index() {
        let center = geom.star_center(index, extended);
        let star = if active {
            effective_star(geom, extended)
        } else {
            None
        };
        hit.hovered = star == Some(index);
        let rating = img.map_or(0, |i| i.rating) as usize;
        let fill = if active && star.is_some_and(|s| s >= index) {
            StarFill::Preview
        } else if rating > index && star.map_or(true, |s| s >= index) {
            StarFill::Set
        } else {
            StarFill::Empty
        };
        hit.draw.push(DrawCmd::Star {
            center,
            outer: r1,
            inner: r1 / 2.5,
            fill,
        });
        return hit;
    }

    match glyph {
        Glyph::Reject => {
            let center = geom.reject_center(extended);
            let d2 = (geom.px - center.x).powi(2) + (geom.py - center.y).powi(2);
            hit.hovered = active && d2 < r1 * r1;
            if hit.hovered {
                hit.draw.push(DrawCmd::HoverRing { center, radius: r1 });
            }
            hit.draw.push(DrawCmd::RejectCross {
                center,
                half: (r1 / std::f32::consts::SQRT_2) * 0.95,
                emphasized: img.is_some_and(|i| i.rejected),
            });
        }
        Glyph::Group => {
            let origin = geom.group_origin(extended);
            hit.hovered = active
                && (geom.px - origin.x - r1).abs() <= 0.9 * r1
                && (geom.py - origin.y - r1).abs() <= 0.9 * r1;
            hit.draw.push(DrawCmd::GroupBadge {
                rect: Rect::from_min_size(origin, vec2(2.0 * r1, 2.0 * r1)),
                member: img.is_some_and(|i| i.id != i.group_id),
            });
        }
        Glyph::Audio => {
            let center = geom.audio_center(extended);
            hit.hovered = active
                && (geom.px - center.x).abs() <= 1.2 * r1
                && (geom.py - center.y).abs() <= 1.2 * r1;
            hit.draw.push(DrawCmd::AudioBadge { center, radius: r1 });
        }
        Glyph::Altered => {
            let center = geom.altered_center(extended);
            hit.hovered = active
                && (geom.px - center.x).abs() <= 1.2 * r1
                && (geom.py - center.y).abs() <= 1.2 * r1;
            hit.draw.push(DrawCmd::AlteredBadge { center, radius: r1 });
        }
        Glyph::None | Glyph::Star1 | Glyph::Star2 | Glyph::Star3 | Glyph::Star4 | Glyph::Star5 => {
            unreachable!("handled above")
        }
    }
    hit
}

/// Which glyph is under the pointer, ignoring image state. Gated by the
/// overlay visibility rule and the minimum decoration size.
pub fn glyph_at(geom: &Geometry, show_overlays: bool, extended: bool) -> Glyph {
    if !(show_overlays || geom.in_metadata_zone()) || geom.width <= DECORATION_SIZE_LIMIT {
        return Glyph::None;
    }
    for glyph in Glyph::SCAN_ORDER {
        if classify(glyph, true, geom, None, extended).hovered {
            return glyph;
        }
    }
    Glyph::None
}

/// Full decoration pass for one thumbnail: emits the draw commands for every
/// applicable glyph and reports which glyph the pointer addresses. Rejected
/// images draw no stars; the audio, group and altered badges appear only when
/// the image state calls for them.
pub fn render_overlays(
    img: Option<&ImageMeta>,
    geom: &Geometry,
    mouse_over: bool,
    show_overlays: bool,
    extended: bool,
    grouping: bool,
) -> (Vec<DrawCmd>, Glyph) {
    let mut draw = Vec::new();
    let mut over = Glyph::None;

    let wanted = mouse_over || show_overlays || geom.zoom == ZoomMode::Single;
    let visible = show_overlays || geom.in_metadata_zone();
    if !wanted || !visible || geom.width <= DECORATION_SIZE_LIMIT {
        return (draw, over);
    }

    let active = mouse_over || geom.zoom == ZoomMode::Single;
    let rejected = img.is_some_and(|i| i.rejected);

    if !rejected {
        for star in Glyph::STARS {
            let hit = classify(star, active, geom, img, extended);
            if hit.hovered {
                over = star;
            }
            draw.extend(hit.draw);
        }
    }

    let hit = classify(Glyph::Reject, active, geom, img, extended);
    if hit.hovered {
        over = Glyph::Reject;
    }
    draw.extend(hit.draw);

    if img.is_some_and(|i| i.has_audio) {
        let hit = classify(Glyph::Audio, active, geom, img, extended);
        if hit.hovered {
            over = Glyph::Audio;
        }
        draw.extend(hit.draw);
    }

    if grouping && img.is_some_and(|i| i.grouped) {
        let hit = classify(Glyph::Group, img.is_some(), geom, img, extended);
        if hit.hovered {
            over = Glyph::Group;
        }
        draw.extend(hit.draw);
    }

    if img.is_some_and(|i| i.altered) {
        let hit = classify(Glyph::Altered, img.is_some(), geom, img, extended);
        if hit.hovered {
            over = Glyph::Altered;
        }
        draw.extend(hit.draw);
    }

    (draw, over)
}
