use serde::{Deserialize, Serialize};

/// * `control_points` - (x, z) control points of the centerline, interpolated by a centripetal
/// Catmull-Rom spline (open curve)
/// * `segments` - Number of segments the centerline is sampled with
/// * `half_width` - Half edge length of the square around a sample in which a vehicle counts as
/// on track
/// * `finish_half_extent` - (x, z) half extents of the finish box around the origin
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrackPars {
    pub control_points: Vec<[f64; 2]>,
    pub segments: usize,
    pub half_width: f64,
    pub finish_half_extent: [f64; 2],
}

impl Default for TrackPars {
    fn default() -> Self {
        TrackPars {
            control_points: vec![
                [0.0, 0.0],
                [0.0, -50.0],
                [40.0, -50.0],
                [40.0, 0.0],
                [70.0, 10.0],
                [65.0, 30.0],
                [40.0, 80.0],
                [0.0, 90.0],
                [0.0, 0.0],
            ],
            segments: 1000,
            half_width: 5.0,
            finish_half_extent: [5.0, 1.0],
        }
    }
}

/// Cubic polynomial of one curve coordinate on one spline segment.
#[derive(Debug, Clone, Copy, Default)]
struct CubicPoly {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl CubicPoly {
    /// Hermite form for x0 -> x1 with tangents t0 and t1.
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> CubicPoly {
        CubicPoly {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    /// Catmull-Rom with non-uniform knot spacing dt0, dt1, dt2 between x0..x3.
    fn nonuniform_catmull_rom(
        x0: f64,
        x1: f64,
        x2: f64,
        x3: f64,
        dt0: f64,
        dt1: f64,
        dt2: f64,
    ) -> CubicPoly {
        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;
        CubicPoly::hermite(x1, x2, t1, t2)
    }

    fn calc(&self, t: f64) -> f64 {
        let t2 = t * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t2 * t
    }
}

fn dist_sq(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

/// Centripetal Catmull-Rom curve through a list of points. The curve is open, its end
/// segments use mirrored phantom points.
#[derive(Debug, Clone)]
pub struct CatmullRomCurve {
    points: Vec<[f64; 2]>,
}

impl CatmullRomCurve {
    pub fn new(points: Vec<[f64; 2]>) -> CatmullRomCurve {
        debug_assert!(points.len() >= 2, "Curve requires at least 2 points!");
        CatmullRomCurve { points }
    }

    /// point returns the curve point at parameter t in [0, 1].
    pub fn point(&self, t: f64) -> [f64; 2] {
        let pts = &self.points;
        let l = pts.len();

        let p = (l - 1) as f64 * t;
        let mut int_point = p.floor() as usize;
        let mut weight = p - int_point as f64;

        if int_point >= l - 1 {
            int_point = l - 2;
            weight = 1.0;
        }

        let p0 = if int_point > 0 {
            pts[int_point - 1]
        } else {
            [2.0 * pts[0][0] - pts[1][0], 2.0 * pts[0][1] - pts[1][1]]
        };
        let p1 = pts[int_point];
        let p2 = pts[int_point + 1];
        let p3 = if int_point + 2 < l {
            pts[int_point + 2]
        } else {
            [
                2.0 * pts[l - 1][0] - pts[l - 2][0],
                2.0 * pts[l - 1][1] - pts[l - 2][1],
            ]
        };

        // centripetal parametrization
        let mut dt0 = dist_sq(p0, p1).powf(0.25);
        let mut dt1 = dist_sq(p1, p2).powf(0.25);
        let mut dt2 = dist_sq(p2, p3).powf(0.25);

        // safety check for repeated points
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let px = CubicPoly::nonuniform_catmull_rom(p0[0], p1[0], p2[0], p3[0], dt0, dt1, dt2);
        let pz = CubicPoly::nonuniform_catmull_rom(p0[1], p1[1], p2[1], p3[1], dt0, dt1, dt2);

        [px.calc(weight), pz.calc(weight)]
    }

    /// sample returns `divisions + 1` points at evenly spaced curve parameters, both ends
    /// included.
    pub fn sample(&self, divisions: usize) -> Vec<[f64; 2]> {
        (0..=divisions)
            .map(|d| self.point(d as f64 / divisions as f64))
            .collect()
    }
}

/// The track holds the sampled centerline used for off-track detection and the finish box used
/// for lap detection. The curve is built in a mirrored frame, world x equals minus curve x.
#[derive(Debug, Clone)]
pub struct Track {
    samples: Vec<[f64; 2]>,
    half_width: f64,
    finish_half_extent: [f64; 2],
}

impl Track {
    pub fn new(track_pars: &TrackPars) -> Track {
        let curve = CatmullRomCurve::new(track_pars.control_points.to_owned());

        Track {
            samples: curve.sample(track_pars.segments),
            half_width: track_pars.half_width,
            finish_half_extent: track_pars.finish_half_extent,
        }
    }

    /// The sampled centerline in curve coordinates.
    pub fn samples(&self) -> &[[f64; 2]] {
        &self.samples
    }

    /// to_world converts a centerline sample into world coordinates.
    pub fn to_world(sample: [f64; 2]) -> [f64; 2] {
        [-sample[0], sample[1]]
    }

    /// is_on_track returns true if any centerline sample lies within the tolerance square
    /// around the world position (x, z).
    pub fn is_on_track(&self, x: f64, z: f64) -> bool {
        self.samples.iter().any(|p| {
            (-p[0] - x).abs() < self.half_width && (p[1] - z).abs() < self.half_width
        })
    }

    pub fn is_in_finish_box(&self, x: f64, z: f64) -> bool {
        x.abs() < self.finish_half_extent[0] && z.abs() < self.finish_half_extent[1]
    }

    /// nearest_sample_idx returns the index of the centerline sample closest to the world
    /// position (x, z).
    pub fn nearest_sample_idx(&self, x: f64, z: f64) -> usize {
        let mut idx_min = 0;
        let mut d_min = f64::INFINITY;

        for (i, p) in self.samples.iter().enumerate() {
            let d = dist_sq(Track::to_world(*p), [x, z]);
            if d < d_min {
                d_min = d;
                idx_min = i;
            }
        }
        idx_min
    }
}
