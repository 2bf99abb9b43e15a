//! Line rasterization and profile sampling.
//!
//! # Overview
//!
//! Lines are clipped to the buffer bounds first, then walked with the
//! Bresenham midpoint traversal. The clipper normalizes endpoints left to
//! right and dispatches on the sign of the implicit-form coefficients
//! (`ax + by + c = 0`); the traversal dispatches on the slope into four
//! stepping cases, two per axis. Drawing and sampling share the same
//! traversal, so a sampled profile visits exactly the pixels a draw of
//! the same segment would touch.
//!
//! - [`draw_line`] writes an RGBA pixel along the line (byte buffers)
//! - [`draw_line_f32`] writes a float value (float luminance buffers)
//! - [`sample_line`] collects [`LineSample`] entries in caller point
//!   order, even when clipping swapped the endpoints

use tex_core::{ChannelLayout, ElementType, PixelBuffer};

use crate::error::{OpsError, OpsResult};

/// One sampled pixel of a line profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSample {
    /// Caller-supplied line identifier.
    pub id: i32,
    /// Pixel x coordinate.
    pub x: f32,
    /// Pixel y coordinate.
    pub y: f32,
    /// Sampled luminance value.
    pub value: f32,
}

fn fx(a: f32, b: f32, c: f32, y: f32) -> f32 {
    -(b / a) * y - c / a
}

fn fy(a: f32, b: f32, c: f32, x: f32) -> f32 {
    -(a / b) * x - c / b
}

fn max3(a: f32, b: f32, c: f32) -> f32 {
    a.max(b).max(c)
}

fn min3(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).min(c)
}

/// Clips a line against the buffer bounds.
///
/// Returns the clipped endpoints (left to right) and the traversal
/// direction, -1 when the endpoints were swapped. `None` means nothing of
/// the line is visible; a degenerate point is also rejected.
fn clip_line(
    width: u32,
    height: u32,
    mut x0: f32,
    mut y0: f32,
    mut x1: f32,
    mut y1: f32,
) -> Option<(f32, f32, f32, f32, i32)> {
    let t = 0.0f32;
    let l = 0.0f32;
    let b = (height - 1) as f32;
    let r = (width - 1) as f32;

    // normalize so clipping always runs left to right
    let mut direction = 1;
    if x1 - x0 < 0.0 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
        direction = -1;
    }

    // implicit form ax + by + c = 0
    let ca = y1 - y0;
    let cb = x0 - x1;
    let cc = x0 * (y0 - y1) + y0 * (x1 - x0);

    if ca == 0.0 && cb == 0.0 {
        // not a line
        return None;
    } else if x1 < l || x0 > r {
        return None;
    } else if ca >= 0.0 && (y0 > b || y1 < t) {
        // increasing or horizontal lines
        return None;
    } else if ca < 0.0 && (y0 < t || y1 > b) {
        // decreasing lines
        return None;
    } else if ca == 0.0 {
        // horizontal
        x0 = x0.max(l);
        x1 = x1.min(r);
    } else if ca > 0.0 && cb == 0.0 {
        // vertical, top to bottom
        y0 = y0.max(t);
        y1 = y1.min(b);
    } else if ca < 0.0 && cb == 0.0 {
        // vertical, bottom to top
        y0 = y0.min(b);
        y1 = y1.max(t);
    } else if ca > 0.0 {
        // top-left to bottom-right
        x0 = max3(x0, l, fx(ca, cb, cc, t));
        y0 = max3(y0, t, fy(ca, cb, cc, l));
        x1 = min3(x1, r, fx(ca, cb, cc, b));
        y1 = min3(y1, b, fy(ca, cb, cc, r));
    } else {
        // bottom-left to top-right
        x0 = max3(x0, l, fx(ca, cb, cc, b));
        y0 = min3(y0, b, fy(ca, cb, cc, l));
        x1 = min3(x1, r, fx(ca, cb, cc, t));
        y1 = max3(y1, t, fy(ca, cb, cc, r));
    }

    // sloped lines may still miss the bounding box entirely
    if !(l..=r).contains(&x0)
        || !(l..=r).contains(&x1)
        || !(t..=b).contains(&y0)
        || !(t..=b).contains(&y1)
    {
        return None;
    }

    Some((x0, y0, x1, y1, direction))
}

/// Walks the clipped line with the midpoint traversal and returns the
/// visited pixels in left-to-right order.
fn traverse(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<(i32, i32)> {
    let px0 = x0 as i32;
    let py0 = y0 as i32;
    let px1 = x1 as i32;
    let py1 = y1 as i32;

    let dx = px1 - px0;
    let dy = py1 - py0;
    let mut px = px0;
    let mut py = py0;

    let d;
    let incr1;
    let incr2;
    let step1;
    let step2;
    let track_y;

    let m = dy as f32 / dx as f32;
    if dx == 0 || m > 1.0 || m < -1.0 {
        track_y = true;
        if dy > 0 {
            // slope m > 1
            d = dy - 2 * dx;
            incr1 = 2 * (dy - dx); // north east
            incr2 = 2 * -dx; // north
            step1 = (1, 1);
            step2 = (0, 1);
        } else {
            // slope m < -1
            d = dy + 2 * dx;
            incr1 = 2 * dx; // south
            incr2 = 2 * (dy + dx); // south east
            step1 = (0, -1);
            step2 = (1, -1);
        }
    } else if (0.0..=1.0).contains(&m) {
        // slope 0 <= m <= 1
        track_y = false;
        d = 2 * dy - dx;
        incr1 = 2 * dy; // east
        incr2 = 2 * (dy - dx); // north east
        step1 = (1, 0);
        step2 = (1, 1);
    } else {
        // slope -1 <= m < 0
        track_y = false;
        d = 2 * dy + dx;
        incr1 = 2 * (dy + dx); // south east
        incr2 = 2 * dy; // east
        step1 = (1, -1);
        step2 = (1, 0);
    }

    let finalpos = if track_y { py1 } else { px1 };
    let mut d = d;
    let mut pixels = vec![(px, py)];
    while (if track_y { py } else { px }) != finalpos {
        let (sx, sy) = if d <= 0 {
            d += incr1;
            step1
        } else {
            d += incr2;
            step2
        };
        px += sx;
        py += sy;
        pixels.push((px, py));
    }
    pixels
}

/// Draws an RGBA pixel along a line, clipped to the buffer.
///
/// Works on byte luminance, RGB and RGBA buffers. Fully clipped lines are
/// a silent no-op.
pub fn draw_line(
    buf: &mut PixelBuffer,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    pixel: [u8; 4],
) -> OpsResult<()> {
    let ok = buf.element() == ElementType::U8
        && matches!(
            buf.layout(),
            ChannelLayout::Rgb | ChannelLayout::Rgba | ChannelLayout::Luminance
        );
    if !ok {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (byte luminance, RGB or RGBA required)",
            buf.element(),
            buf.layout()
        )));
    }

    let Some((x0, y0, x1, y1, _)) = clip_line(buf.width(), buf.height(), x0, y0, x1, y1) else {
        return Ok(());
    };
    for (px, py) in traverse(x0, y0, x1, y1) {
        buf.set_pixel(px as u32, py as u32, pixel)?;
    }
    Ok(())
}

/// Draws a float value along a line in a float luminance buffer.
pub fn draw_line_f32(
    buf: &mut PixelBuffer,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    value: f32,
) -> OpsResult<()> {
    if buf.format() != tex_core::F32_LUMINANCE {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (float luminance required)",
            buf.element(),
            buf.layout()
        )));
    }

    let Some((x0, y0, x1, y1, _)) = clip_line(buf.width(), buf.height(), x0, y0, x1, y1) else {
        return Ok(());
    };
    for (px, py) in traverse(x0, y0, x1, y1) {
        buf.set_pixel_f32(px as u32, py as u32, [value, 0.0, 0.0, 0.0])?;
    }
    Ok(())
}

/// Collects the luminance profile along a line.
///
/// Samples come back in the caller's point order: when clipping swapped
/// the endpoints the traversal output is reversed before returning. A
/// fully clipped line yields an empty profile.
pub fn sample_line(
    buf: &PixelBuffer,
    id: i32,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
) -> OpsResult<Vec<LineSample>> {
    if buf.format() != tex_core::F32_LUMINANCE {
        return Err(OpsError::Unsupported(format!(
            "{:?}/{:?} (float luminance required)",
            buf.element(),
            buf.layout()
        )));
    }

    let Some((x0, y0, x1, y1, direction)) = clip_line(buf.width(), buf.height(), x0, y0, x1, y1)
    else {
        return Ok(Vec::new());
    };

    let mut samples = Vec::new();
    for (px, py) in traverse(x0, y0, x1, y1) {
        let value = buf.pixel_f32(px as u32, py as u32)?[0];
        samples.push(LineSample {
            id,
            x: px as f32,
            y: py as f32,
            value,
        });
    }
    if direction < 0 {
        samples.reverse();
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tex_core::{F32_LUMINANCE, U8_LUMINANCE, U8_RGBA};

    fn drawn_pixels(buf: &PixelBuffer) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for y in 0..buf.height() {
            for x in 0..buf.width() {
                if buf.pixel(x, y).unwrap()[0] != 0 {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_horizontal_line() {
        let mut buf = PixelBuffer::new(5, 3, 5, 3, U8_LUMINANCE).unwrap();
        draw_line(&mut buf, 0.0, 1.0, 4.0, 1.0, [255, 0, 0, 0]).unwrap();
        assert_eq!(
            drawn_pixels(&buf),
            vec![(0, 1), (1, 1), (2, 1), (3, 1), (4, 1)]
        );
    }

    #[test]
    fn test_vertical_line() {
        let mut buf = PixelBuffer::new(3, 5, 3, 5, U8_LUMINANCE).unwrap();
        draw_line(&mut buf, 1.0, 0.0, 1.0, 4.0, [255, 0, 0, 0]).unwrap();
        assert_eq!(
            drawn_pixels(&buf),
            vec![(1, 0), (1, 1), (1, 2), (1, 3), (1, 4)]
        );
    }

    #[test]
    fn test_diagonal_line() {
        let mut buf = PixelBuffer::new(4, 4, 4, 4, U8_LUMINANCE).unwrap();
        draw_line(&mut buf, 0.0, 0.0, 3.0, 3.0, [255, 0, 0, 0]).unwrap();
        assert_eq!(drawn_pixels(&buf), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn test_decreasing_line() {
        let mut buf = PixelBuffer::new(4, 4, 4, 4, U8_LUMINANCE).unwrap();
        draw_line(&mut buf, 0.0, 3.0, 3.0, 0.0, [255, 0, 0, 0]).unwrap();
        assert_eq!(drawn_pixels(&buf), vec![(3, 0), (2, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn test_clipped_line() {
        // the line runs off both sides; only the in-bounds span remains
        let mut buf = PixelBuffer::new(4, 4, 4, 4, U8_LUMINANCE).unwrap();
        draw_line(&mut buf, -10.0, 2.0, 10.0, 2.0, [255, 0, 0, 0]).unwrap();
        assert_eq!(drawn_pixels(&buf), vec![(0, 2), (1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_offscreen_line_is_noop() {
        let mut buf = PixelBuffer::new(4, 4, 4, 4, U8_LUMINANCE).unwrap();
        draw_line(&mut buf, -5.0, -5.0, -1.0, -1.0, [255, 0, 0, 0]).unwrap();
        draw_line(&mut buf, 1.0, 1.0, 1.0, 1.0, [255, 0, 0, 0]).unwrap(); // a point
        assert!(drawn_pixels(&buf).is_empty());
    }

    #[test]
    fn test_draw_line_format_check() {
        let mut buf = PixelBuffer::new(4, 4, 4, 4, F32_LUMINANCE).unwrap();
        assert!(draw_line(&mut buf, 0.0, 0.0, 3.0, 3.0, [255, 0, 0, 0]).is_err());
        assert!(draw_line_f32(&mut buf, 0.0, 0.0, 3.0, 3.0, 1.0).is_ok());

        let mut rgba = PixelBuffer::new(4, 4, 4, 4, U8_RGBA).unwrap();
        assert!(draw_line_f32(&mut rgba, 0.0, 0.0, 3.0, 3.0, 1.0).is_err());
    }

    #[test]
    fn test_sample_line_values_and_order() {
        let mut buf = PixelBuffer::new(4, 1, 4, 1, F32_LUMINANCE).unwrap();
        for x in 0..4 {
            buf.set_pixel_f32(x, 0, [x as f32 * 10.0, 0.0, 0.0, 0.0])
                .unwrap();
        }

        let forward = sample_line(&buf, 7, 0.0, 0.0, 3.0, 0.0).unwrap();
        let values: Vec<f32> = forward.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0.0, 10.0, 20.0, 30.0]);
        assert!(forward.iter().all(|s| s.id == 7));

        // reversed endpoints keep the caller's order
        let backward = sample_line(&buf, 7, 3.0, 0.0, 0.0, 0.0).unwrap();
        let values: Vec<f32> = backward.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![30.0, 20.0, 10.0, 0.0]);
    }

    #[test]
    fn test_sample_line_offscreen_is_empty() {
        let buf = PixelBuffer::new(4, 4, 4, 4, F32_LUMINANCE).unwrap();
        assert!(sample_line(&buf, 0, -9.0, -9.0, -1.0, -1.0)
            .unwrap()
            .is_empty());
    }
}
