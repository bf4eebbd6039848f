use palette::{convert::FromColorUnclamped, Lab, Srgb};

use super::leading_number;

/// A computed-style color as reported by `getComputedStyle`, channels in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parses the first `rgb(...)`/`rgba(...)` found anywhere in `raw`.
    ///
    /// Box shadows embed their color ("rgba(0, 0, 0, 0.1) 0px 1px 2px"), so the
    /// function call is searched for rather than anchored. Both the legacy comma
    /// syntax and the space/slash syntax are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut rest = raw;
        loop {
            let idx = rest.find("rgb")?;
            let after = &rest[idx + 3..];
            let after = after.strip_prefix('a').unwrap_or(after);
            if let Some(body) = after.strip_prefix('(') {
                let close = body.find(')')?;
                if close > 0 {
                    return Some(parse_channels(&body[..close]));
                }
            }
            rest = &rest[idx + 3..];
        }
    }

    /// Largest absolute difference across the RGB channels.
    pub fn channel_distance(&self, other: &Rgba) -> f64 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }

    pub fn is_near_rgb(&self, rgb: [u8; 3], epsilon: f64) -> bool {
        let other = Rgba::new(rgb[0] as f64, rgb[1] as f64, rgb[2] as f64, 1.0);
        self.channel_distance(&other) <= epsilon
    }

    pub fn is_transparent(&self, below: f64) -> bool {
        self.a < below
    }

    /// CIE L* (0..100) of the opaque color.
    pub fn lightness(&self) -> f32 {
        let srgb = Srgb::new(
            (self.r / 255.0).clamp(0.0, 1.0) as f32,
            (self.g / 255.0).clamp(0.0, 1.0) as f32,
            (self.b / 255.0).clamp(0.0, 1.0) as f32,
        );
        let lab: Lab = Lab::from_color_unclamped(srgb);
        lab.l
    }
}

fn parse_channels(body: &str) -> Rgba {
    let parts: Vec<&str> = if body.contains(',') {
        body.split(',').map(str::trim).collect()
    } else {
        body.split(|c: char| c.is_whitespace() || c == '/')
            .filter(|p| !p.is_empty())
            .collect()
    };
    let channel = |i: usize| parts.get(i).and_then(|p| leading_number(p)).unwrap_or(0.0);
    let alpha = parts
        .get(3)
        .and_then(|p| {
            let value = leading_number(p)?;
            Some(if p.trim_end().ends_with('%') {
                value / 100.0
            } else {
                value
            })
        })
        .unwrap_or(1.0);
    Rgba::new(channel(0), channel(1), channel(2), alpha)
}

/// Channel and alpha closeness used by the sample-point comparisons.
///
/// Unparseable values fall back to string equality; two nearly transparent
/// colors are always close.
pub fn colors_close(a: &str, b: &str, channel: f64, alpha: f64, transparent_below: f64) -> bool {
    match (Rgba::parse(a), Rgba::parse(b)) {
        (Some(ca), Some(cb)) => {
            if ca.is_transparent(transparent_below) && cb.is_transparent(transparent_below) {
                return true;
            }
            ca.channel_distance(&cb) <= channel && (ca.a - cb.a).abs() <= alpha
        }
        _ => a == b,
    }
}
