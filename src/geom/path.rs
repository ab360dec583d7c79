//! Bounding boxes of SVG path data and point lists.

use geo::{Coord, Rect};
use lyon::algorithms::aabb::bounding_box;
use lyon::geom::{ArcFlags, SvgArc};
use lyon::math::{point, vector, Angle, Point};
use lyon::path::Path;

use super::Bounds;

/// Scanner over SVG path/points syntax: commands, numbers and arc flags,
/// separated by optional whitespace and commas.
struct Cursor<'a> {
    s: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self { Self { s: s.as_bytes(), pos: 0 } }

    fn skip_separators(&mut self) {
        while let Some(&b) = self.s.get(self.pos) {
            if b.is_ascii_whitespace() || b == b',' { self.pos += 1 } else { break }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.s.len()
    }

    /// Consume a command letter if one is next.
    fn command(&mut self) -> Option<u8> {
        self.skip_separators();
        let b = *self.s.get(self.pos)?;
        if b.is_ascii_alphabetic() && b != b'e' && b != b'E' {
            self.pos += 1;
            Some(b)
        } else {
            None
        }
    }

    /// Consume a number (sign, digits, fraction, exponent).
    fn number(&mut self) -> Option<f64> {
        self.skip_separators();
        let start = self.pos;
        let mut i = self.pos;
        let digits = |i: &mut usize, s: &[u8]| {
            let from = *i;
            while s.get(*i).is_some_and(u8::is_ascii_digit) { *i += 1 }
            *i > from
        };

        if matches!(self.s.get(i), Some(b'+' | b'-')) { i += 1 }
        let int = digits(&mut i, self.s);
        let mut frac = false;
        if self.s.get(i) == Some(&b'.') {
            i += 1;
            frac = digits(&mut i, self.s);
        }
        if !int && !frac { return None }
        if matches!(self.s.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(self.s.get(j), Some(b'+' | b'-')) { j += 1 }
            if digits(&mut j, self.s) { i = j }
        }

        let text = std::str::from_utf8(&self.s[start..i]).ok()?;
        let value = text.parse::<f64>().ok()?;
        self.pos = i;
        Some(value)
    }

    /// Consume an arc flag, which may be packed without separators ("011").
    fn flag(&mut self) -> Option<bool> {
        self.skip_separators();
        let flag = match self.s.get(self.pos)? {
            b'0' => false,
            b'1' => true,
            _ => return None,
        };
        self.pos += 1;
        Some(flag)
    }

    fn point(&mut self) -> Option<Coord<f64>> {
        let x = self.number()?;
        let y = self.number()?;
        Some(Coord { x, y })
    }
}

/// Parse a `points` attribute (polygon/polyline). Stops at the first
/// malformed pair, keeping what was parsed before it.
pub(crate) fn parse_points(points: &str) -> Vec<Coord<f64>> {
    let mut cursor = Cursor::new(points);
    let mut out = Vec::new();
    while let Some(p) = cursor.point() { out.push(p) }
    out
}

/// Bounding box of a path `d` attribute.
///
/// The path is rebuilt as a lyon path (arcs become cubic segments) and
/// measured with its tight bounding box, so curves contribute their
/// extrema rather than their control points. Malformed path data stops
/// rendering at the first error; the bounds cover the well-formed prefix.
pub(crate) fn path_bounds(d: &str) -> Option<Rect<f64>> {
    let path = build_path(d);
    let mut bounds = Bounds::default();
    if path.iter().next().is_some() {
        let aabb = bounding_box(&path);
        if aabb.min.x <= aabb.max.x && aabb.min.y <= aabb.max.y {
            bounds.add(Coord { x: aabb.min.x as f64, y: aabb.min.y as f64 });
            bounds.add(Coord { x: aabb.max.x as f64, y: aabb.max.y as f64 });
        }
    }
    bounds.to_rect()
}

#[inline]
fn to_point(c: Coord<f64>) -> Point { point(c.x as f32, c.y as f32) }

#[inline]
fn reflect(ctrl: Coord<f64>, about: Coord<f64>) -> Coord<f64> {
    Coord { x: 2.0 * about.x - ctrl.x, y: 2.0 * about.y - ctrl.y }
}

/// Translate SVG path commands into a lyon path in absolute coordinates.
fn build_path(d: &str) -> Path {
    let mut builder = Path::builder();
    let mut cursor = Cursor::new(d);

    let mut cur = Coord { x: 0.0, y: 0.0 };
    let mut start = cur;
    let mut open = false;
    let mut command: Option<u8> = None;
    let mut prev_cubic: Option<Coord<f64>> = None;
    let mut prev_quad: Option<Coord<f64>> = None;

    while !cursor.at_end() {
        let cmd = match cursor.command() {
            Some(c) => c,
            // Implicit repetition; a moveto repeats as a lineto.
            None => match command {
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(c) if !matches!(c, b'Z' | b'z') => c,
                _ => break,
            },
        };
        let rel = cmd.is_ascii_lowercase();
        let origin = if rel { cur } else { Coord { x: 0.0, y: 0.0 } };
        let offset = |p: Coord<f64>| Coord { x: p.x + origin.x, y: p.y + origin.y };

        let upper = cmd.to_ascii_uppercase();
        // Drawing after a closepath continues from the subpath start.
        if !open && matches!(upper, b'L' | b'H' | b'V' | b'C' | b'S' | b'Q' | b'T' | b'A') {
            builder.begin(to_point(cur));
            open = true;
        }

        let parsed = match upper {
            b'M' => cursor.point().map(|p| {
                let p = offset(p);
                if open { builder.end(false); }
                builder.begin(to_point(p));
                open = true;
                start = p;
                cur = p;
                prev_cubic = None;
                prev_quad = None;
            }),
            b'L' => cursor.point().map(|p| {
                cur = offset(p);
                builder.line_to(to_point(cur));
                prev_cubic = None;
                prev_quad = None;
            }),
            b'H' => cursor.number().map(|x| {
                cur = Coord { x: if rel { cur.x + x } else { x }, y: cur.y };
                builder.line_to(to_point(cur));
                prev_cubic = None;
                prev_quad = None;
            }),
            b'V' => cursor.number().map(|y| {
                cur = Coord { x: cur.x, y: if rel { cur.y + y } else { y } };
                builder.line_to(to_point(cur));
                prev_cubic = None;
                prev_quad = None;
            }),
            b'C' => (|| Some((cursor.point()?, cursor.point()?, cursor.point()?)))().map(|(c1, c2, p)| {
                let (c1, c2, p) = (offset(c1), offset(c2), offset(p));
                builder.cubic_bezier_to(to_point(c1), to_point(c2), to_point(p));
                prev_cubic = Some(c2);
                prev_quad = None;
                cur = p;
            }),
            b'S' => (|| Some((cursor.point()?, cursor.point()?)))().map(|(c2, p)| {
                let c1 = prev_cubic.map_or(cur, |c| reflect(c, cur));
                let (c2, p) = (offset(c2), offset(p));
                builder.cubic_bezier_to(to_point(c1), to_point(c2), to_point(p));
                prev_cubic = Some(c2);
                prev_quad = None;
                cur = p;
            }),
            b'Q' => (|| Some((cursor.point()?, cursor.point()?)))().map(|(c, p)| {
                let (c, p) = (offset(c), offset(p));
                builder.quadratic_bezier_to(to_point(c), to_point(p));
                prev_quad = Some(c);
                prev_cubic = None;
                cur = p;
            }),
            b'T' => cursor.point().map(|p| {
                let c = prev_quad.map_or(cur, |q| reflect(q, cur));
                let p = offset(p);
                builder.quadratic_bezier_to(to_point(c), to_point(p));
                prev_quad = Some(c);
                prev_cubic = None;
                cur = p;
            }),
            b'A' => (|| {
                let rx = cursor.number()?;
                let ry = cursor.number()?;
                let rotation = cursor.number()?;
                let large_arc = cursor.flag()?;
                let sweep = cursor.flag()?;
                let p = cursor.point()?;
                Some((rx, ry, rotation, ArcFlags { large_arc, sweep }, p))
            })().map(|(rx, ry, rotation, flags, p)| {
                let p = offset(p);
                let arc = SvgArc {
                    from: to_point(cur),
                    to: to_point(p),
                    radii: vector(rx.abs() as f32, ry.abs() as f32),
                    x_rotation: Angle::degrees(rotation as f32),
                    flags,
                };
                if arc.is_straight_line() {
                    builder.line_to(arc.to);
                } else {
                    arc.to_arc().for_each_cubic_bezier(&mut |segment| {
                        builder.cubic_bezier_to(segment.ctrl1, segment.ctrl2, segment.to);
                    });
                }
                prev_cubic = None;
                prev_quad = None;
                cur = p;
            }),
            b'Z' => {
                if open {
                    builder.close();
                    open = false;
                }
                cur = start;
                prev_cubic = None;
                prev_quad = None;
                Some(())
            }
            _ => None,
        };

        if parsed.is_none() { break }
        command = Some(cmd);
    }

    if open { builder.end(false); }
    builder.build()
}
