//! Shape and color helpers for 2D primitives

use glam::IVec2;

use crate::sim::rect::Rect;

/// Triangle for a spike: apex at the top center, base along the bottom edge
pub fn spike_triangle(rect: &Rect) -> [IVec2; 3] {
    [
        IVec2::new(rect.center_x(), rect.top()),
        IVec2::new(rect.left(), rect.bottom()),
        IVec2::new(rect.right(), rect.bottom()),
    ]
}

/// Rainbow color keyed on horizontal position (one full cycle every 600px)
pub fn rainbow(x: i32) -> [u8; 3] {
    let hue = (x as f32 / 100.0).rem_euclid(6.0);
    let channel = |t: f32| (255.0 * t.clamp(0.0, 1.0)) as u8;

    // red -> yellow -> green -> cyan -> blue -> magenta -> red
    if hue < 1.0 {
        [255, channel(hue), 0]
    } else if hue < 2.0 {
        [channel(2.0 - hue), 255, 0]
    } else if hue < 3.0 {
        [0, 255, channel(hue - 2.0)]
    } else if hue < 4.0 {
        [0, channel(4.0 - hue), 255]
    } else if hue < 5.0 {
        [channel(hue - 4.0), 0, 255]
    } else {
        [255, 0, channel(6.0 - hue)]
    }
}
