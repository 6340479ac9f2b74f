//! Outline decomposition into closed polygons.
//!
//! [`PolyArgs`] receives the move/line/conic/cubic callbacks produced while
//! walking a glyph contour (26.6 fixed point, y up) and accumulates them
//! into closed polygons whose curve segments are all cubic.

/// A point in 26.6 fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedPoint {
    pub x: i64,
    pub y: i64,
}

impl FixedPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Receiver of outline decomposition callbacks.
pub trait OutlineSink {
    fn move_to(&mut self, to: FixedPoint);
    fn line_to(&mut self, to: FixedPoint);
    fn conic_to(&mut self, control: FixedPoint, to: FixedPoint);
    fn cubic_to(&mut self, control1: FixedPoint, control2: FixedPoint, to: FixedPoint);
}

/// Whether a polygon point lies on the curve or steers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointFlag {
    Normal,
    Control,
}

/// A closed contour in fixed point.
///
/// Every curve segment is cubic: two `Control` points between `Normal` ones.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polygon {
    pub points: Vec<FixedPoint>,
    pub flags: Vec<PointFlag>,
}

impl Polygon {
    pub fn has_curves(&self) -> bool {
        self.flags.contains(&PointFlag::Control)
    }
}

/// Accumulates decomposition callbacks into [`Polygon`]s.
#[derive(Debug)]
pub struct PolyArgs {
    polygons: Vec<Polygon>,
    points: Vec<FixedPoint>,
    flags: Vec<PointFlag>,
    max_points: usize,
    position: FixedPoint,
    contours_started: usize,
}

impl PolyArgs {
    /// A builder for an outline with `outline_points` native points.
    ///
    /// Conic segments expand to three output points each, so
    /// `3 * outline_points + 1` always suffices.
    pub fn new(outline_points: usize) -> Self {
        let max_points = 3 * outline_points + 1;
        Self {
            polygons: Vec::new(),
            points: Vec::with_capacity(max_points),
            flags: Vec::with_capacity(max_points),
            max_points,
            position: FixedPoint::default(),
            contours_started: 0,
        }
    }

    fn add_point(&mut self, point: FixedPoint, flag: PointFlag) {
        if self.points.len() >= self.max_points {
            log::debug!("Outline point buffer full, dropping point");
            return;
        }
        self.position = point;
        self.points.push(point);
        self.flags.push(flag);
    }

    /// Finish the contour in progress.
    ///
    /// The first call only marks that a contour has begun. Later calls drop
    /// the duplicated start point the decomposer appends and re-close the
    /// polygon explicitly if the remaining points don't end on the start.
    pub fn close_polygon(&mut self) {
        self.contours_started += 1;
        if self.contours_started == 1 {
            return;
        }

        let mut points = std::mem::take(&mut self.points);
        let mut flags = std::mem::take(&mut self.flags);
        points.pop();
        flags.pop();
        let (Some(&first), Some(&last), Some(&last_flag)) =
            (points.first(), points.last(), flags.last())
        else {
            return;
        };
        if last_flag == PointFlag::Control || last != first {
            points.push(first);
            flags.push(PointFlag::Normal);
        }
        self.polygons.push(Polygon { points, flags });
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }
}

impl OutlineSink for PolyArgs {
    fn move_to(&mut self, to: FixedPoint) {
        self.close_polygon();
        self.add_point(to, PointFlag::Normal);
    }

    fn line_to(&mut self, to: FixedPoint) {
        self.add_point(to, PointFlag::Normal);
    }

    fn conic_to(&mut self, control: FixedPoint, to: FixedPoint) {
        // Degree elevation of the quadratic (p0, c, p2) to a cubic.
        let p0 = self.position;
        let c1 = FixedPoint::new(
            (2 * p0.x + 4 * control.x + 3) / 6,
            (2 * p0.y + 4 * control.y + 3) / 6,
        );
        let c2 = FixedPoint::new(
            (2 * to.x + 4 * control.x + 3) / 6,
            (2 * to.y + 4 * control.y + 3) / 6,
        );
        self.add_point(c1, PointFlag::Control);
        self.add_point(c2, PointFlag::Control);
        self.add_point(to, PointFlag::Normal);
    }

    fn cubic_to(&mut self, control1: FixedPoint, control2: FixedPoint, to: FixedPoint) {
        self.add_point(control1, PointFlag::Control);
        self.add_point(control2, PointFlag::Control);
        self.add_point(to, PointFlag::Normal);
    }
}

/// A point of a device-independent outline, in pixels with y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlinePoint {
    pub x: f64,
    pub y: f64,
    pub flag: PointFlag,
}

/// A glyph outline as closed cubic contours, in pixels with y down.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphOutline {
    pub contours: Vec<Vec<OutlinePoint>>,
}

impl GlyphOutline {
    /// Scale fixed-point polygons by 1/64 and flip them to y down.
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let contours = polygons
            .iter()
            .map(|poly| {
                poly.points
                    .iter()
                    .zip(&poly.flags)
                    .map(|(p, &flag)| OutlinePoint {
                        x: p.x as f64 / 64.0,
                        y: -(p.y as f64) / 64.0,
                        flag,
                    })
                    .collect()
            })
            .collect();
        Self { contours }
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i64, y: i64) -> FixedPoint {
        FixedPoint::new(x, y)
    }

    /// Feed closed contours the way the decomposer does: move, segments, and
    /// a final line back to the start.
    fn decompose(args: &mut PolyArgs, contour: &[FixedPoint]) {
        args.move_to(contour[0]);
        for &pt in &contour[1..] {
            args.line_to(pt);
        }
        args.line_to(contour[0]);
    }

    #[test]
    fn test_line_contour_round_trip() {
        let square = [p(0, 0), p(640, 0), p(640, 640), p(0, 640)];
        let mut args = PolyArgs::new(square.len());
        decompose(&mut args, &square);
        args.close_polygon();

        let polys = args.into_polygons();
        assert_eq!(polys.len(), 1);
        let mut expected = square.to_vec();
        expected.push(square[0]);
        assert_eq!(polys[0].points, expected, "one explicit closing point");
        assert!(polys[0].flags.iter().all(|&f| f == PointFlag::Normal));
    }

    #[test]
    fn test_two_contours() {
        let a = [p(0, 0), p(64, 0), p(64, 64)];
        let b = [p(128, 0), p(192, 0), p(192, 64), p(128, 64)];
        let mut args = PolyArgs::new(a.len() + b.len());
        decompose(&mut args, &a);
        decompose(&mut args, &b);
        args.close_polygon();

        let polys = args.polygons();
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[0].points[..a.len()], a);
        assert_eq!(polys[1].points[..b.len()], b);
        assert_eq!(polys[0].points.len(), a.len() + 1);
        assert_eq!(polys[1].points.last(), Some(&b[0]));
    }

    #[test]
    fn test_conic_degree_elevation() {
        let (p0, pc, p2) = (p(0, 0), p(300, 600), p(600, 0));
        let mut args = PolyArgs::new(3);
        args.move_to(p0);
        args.conic_to(pc, p2);
        args.line_to(p0);
        args.close_polygon();

        let poly = &args.polygons()[0];
        assert_eq!(
            poly.flags,
            vec![
                PointFlag::Normal,
                PointFlag::Control,
                PointFlag::Control,
                PointFlag::Normal,
                PointFlag::Normal
            ]
        );
        let c1 = poly.points[1];
        let c2 = poly.points[2];
        assert_eq!(c1, p((2 * p0.x + 4 * pc.x + 3) / 6, (2 * p0.y + 4 * pc.y + 3) / 6));
        assert_eq!(c2, p((2 * p2.x + 4 * pc.x + 3) / 6, (2 * p2.y + 4 * pc.y + 3) / 6));
        assert_eq!(c1, p(200, 400));
        assert_eq!(c2, p(400, 400));
        assert_eq!(poly.points[3], p2);
        assert_eq!(poly.points[4], p0, "closing line re-added as a normal point");
    }

    #[test]
    fn test_contour_ending_on_curve_is_reclosed() {
        // A contour whose last segment is a curve into the start point,
        // followed by nothing: after dropping the duplicate the polygon ends
        // on a control point and must be closed explicitly.
        let mut args = PolyArgs::new(4);
        args.move_to(p(0, 0));
        args.line_to(p(640, 0));
        args.cubic_to(p(640, 320), p(320, 640), p(0, 0));
        args.close_polygon();

        let poly = &args.polygons()[0];
        assert_eq!(poly.points.first(), poly.points.last());
        assert_eq!(poly.flags.last(), Some(&PointFlag::Normal));
        assert_eq!(poly.points.len(), 5);
    }

    #[test]
    fn test_empty_outline() {
        let mut args = PolyArgs::new(0);
        args.close_polygon();
        assert!(args.polygons().is_empty());
    }

    #[test]
    fn test_capacity_is_respected() {
        let mut args = PolyArgs::new(1);
        args.move_to(p(0, 0));
        for i in 1..10 {
            args.line_to(p(i, i));
        }
        assert_eq!(args.points.len(), 4);
    }

    #[test]
    fn test_scaled_outline_flips_y() {
        let poly = Polygon {
            points: vec![p(64, 128), p(-32, -64)],
            flags: vec![PointFlag::Normal, PointFlag::Control],
        };
        let outline = GlyphOutline::from_polygons(&[poly]);
        let pts = &outline.contours[0];
        assert_eq!((pts[0].x, pts[0].y), (1.0, -2.0));
        assert_eq!((pts[1].x, pts[1].y), (-0.5, 1.0));
        assert_eq!(pts[1].flag, PointFlag::Control);
    }
}
