use helpers::general::{signed_angle_diff, wrap_angle, InputValueError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Normal,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Normal
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difficulty::Normal => write!(f, "normal"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = InputValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(InputValueError::new(format!(
                "Unknown difficulty {}, expected normal or hard!",
                s
            ))),
        }
    }
}

/// * `key_points` - (x, z) positions the opponent passes, first and last are usually equal
/// * `key_headings_deg` - (deg) Heading of the opponent at each key point
/// * `legs_normal` - (s) Time between consecutive key points on difficulty normal, the first
/// entry is the time of the first key point
/// * `legs_hard` - (s) Same as `legs_normal` for difficulty hard
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoutePars {
    pub key_points: Vec<[f64; 2]>,
    pub key_headings_deg: Vec<f64>,
    pub legs_normal: Vec<f64>,
    pub legs_hard: Vec<f64>,
}

impl Default for RoutePars {
    fn default() -> Self {
        RoutePars {
            key_points: vec![
                [2.0, 5.0],
                [2.0, -51.0],
                [-42.0, -52.0],
                [-42.0, -2.0],
                [-72.0, 8.0],
                [-67.0, 32.0],
                [-40.0, 82.0],
                [0.0, 92.0],
                [2.0, 5.0],
            ],
            key_headings_deg: vec![0.0, 90.0, 180.0, 90.0, 200.0, 220.0, 250.0, 0.0, 0.0],
            legs_normal: vec![0.0, 4.0, 3.0, 3.0, 2.0, 2.0, 2.0, 2.0, 4.0],
            legs_hard: vec![0.0, 3.5, 2.5, 2.5, 1.5, 1.5, 1.5, 1.5, 3.5],
        }
    }
}

impl RoutePars {
    pub fn legs(&self, difficulty: Difficulty) -> &[f64] {
        match difficulty {
            Difficulty::Normal => &self.legs_normal,
            Difficulty::Hard => &self.legs_hard,
        }
    }

    /// key_times returns the cumulative time offsets (s) of the key points.
    pub fn key_times(&self, difficulty: Difficulty) -> Vec<f64> {
        let mut sum = 0.0;
        self.legs(difficulty)
            .iter()
            .map(|leg| {
                sum += leg;
                sum
            })
            .collect()
    }

    /// duration returns the length (s) of one loop around the route, i.e. the offset of the
    /// last key point.
    pub fn duration(&self, difficulty: Difficulty) -> f64 {
        self.legs(difficulty).iter().sum()
    }

    pub fn validate(&self) -> Result<(), InputValueError> {
        if self.key_points.len() < 2 {
            return Err(InputValueError::new("Route requires at least 2 key points!"));
        }
        if self.key_headings_deg.len() != self.key_points.len() {
            return Err(InputValueError::new(format!(
                "Route has {} key points but {} key headings!",
                self.key_points.len(),
                self.key_headings_deg.len()
            )));
        }

        for difficulty in [Difficulty::Normal, Difficulty::Hard] {
            if self.legs(difficulty).len() != self.key_points.len() {
                return Err(InputValueError::new(format!(
                    "Route requires one leg duration per key point for difficulty {}!",
                    difficulty
                )));
            }

            let times = self.key_times(difficulty);
            if times.windows(2).any(|w| w[1] <= w[0]) {
                return Err(InputValueError::new(format!(
                    "Route key times must be strictly increasing for difficulty {}!",
                    difficulty
                )));
            }
        }
        Ok(())
    }
}

/// Pose of the route-driven vehicle. `position` is None while the position track is disabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePose {
    pub position: Option<[f64; 2]>,
    pub heading: f64,
}

/// RouteAnimator replays the opponent's route. The pose is a pure function of the path time;
/// pausing only stops the path time from advancing. Playback loops over the route duration.
#[derive(Debug, Clone)]
pub struct RouteAnimator {
    times: Vec<f64>,
    positions: Vec<[f64; 2]>,
    headings: Vec<f64>,
    duration: f64,
    time: f64,
    playing: bool,
    paused: bool,
    position_enabled: bool,
}

impl RouteAnimator {
    pub fn new(
        route_pars: &RoutePars,
        difficulty: Difficulty,
    ) -> Result<RouteAnimator, InputValueError> {
        route_pars.validate()?;

        Ok(RouteAnimator {
            times: route_pars.key_times(difficulty),
            positions: route_pars.key_points.to_owned(),
            headings: route_pars
                .key_headings_deg
                .iter()
                .map(|h| h.to_radians())
                .collect(),
            duration: route_pars.duration(difficulty),
            time: 0.0,
            playing: false,
            paused: false,
            position_enabled: true,
        })
    }

    // ---------------------------------------------------------------------------------------------
    // PLAYBACK CONTROL ----------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// play starts playback from the beginning of the route.
    pub fn play(&mut self) {
        self.playing = true;
        self.paused = false;
        self.time = 0.0;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.time = 0.0;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// set_time scrubs to the given path time (s), wrapped into the route duration.
    pub fn set_time(&mut self, time: f64) {
        self.time = self.wrap_time(time);
    }

    /// advance moves the path time forward by dt (s) unless playback is stopped or paused.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing || self.paused {
            return;
        }
        self.time = self.wrap_time(self.time + dt);
    }

    pub fn set_position_enabled(&mut self, enabled: bool) {
        self.position_enabled = enabled;
    }

    fn wrap_time(&self, time: f64) -> f64 {
        if self.duration > 0.0 {
            time.rem_euclid(self.duration)
        } else {
            0.0
        }
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (GETTERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn position_enabled(&self) -> bool {
        self.position_enabled
    }

    /// pose returns the current pose, None as long as playback has not been started.
    pub fn pose(&self) -> Option<RoutePose> {
        if !self.playing {
            return None;
        }
        let (position, heading) = self.sample(self.time);

        Some(RoutePose {
            position: if self.position_enabled {
                Some(position)
            } else {
                None
            },
            heading,
        })
    }

    // ---------------------------------------------------------------------------------------------
    // INTERPOLATION -------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// sample evaluates the route at path time t (s), returning the (x, z) position and the
    /// heading (rad).
    pub fn sample(&self, t: f64) -> ([f64; 2], f64) {
        let n = self.times.len();

        if t <= self.times[0] {
            return (self.positions[0], wrap_angle(self.headings[0]));
        }
        if t >= self.times[n - 1] {
            return (self.positions[n - 1], wrap_angle(self.headings[n - 1]));
        }

        // index of the first key time after t
        let i1 = self.times.iter().position(|&key| key > t).unwrap_or(n - 1);
        let t0 = self.times[i1 - 1];
        let t1 = self.times[i1];
        let p = (t - t0) / (t1 - t0);

        let position = [
            self.smooth(i1, p, |k| self.positions[k][0]),
            self.smooth(i1, p, |k| self.positions[k][1]),
        ];
        let h0 = self.headings[i1 - 1];
        let heading = wrap_angle(h0 + signed_angle_diff(h0, self.headings[i1]) * p);

        (position, heading)
    }

    /// smooth interpolates one coordinate between keys i1 - 1 and i1 with a cubic spline whose
    /// ends have zero curvature.
    fn smooth<F>(&self, i1: usize, p: f64, value: F) -> f64
    where
        F: Fn(usize) -> f64,
    {
        let n = self.times.len();
        let t0 = self.times[i1 - 1];
        let t1 = self.times[i1];

        let (i_prev, t_prev) = if i1 >= 2 {
            (i1 - 2, self.times[i1 - 2])
        } else {
            (i1, t1)
        };
        let (i_next, t_next) = if i1 + 1 < n {
            (i1 + 1, self.times[i1 + 1])
        } else {
            (i1 - 1, t0)
        };

        let half_dt = (t1 - t0) * 0.5;
        let w_p = half_dt / (t0 - t_prev);
        let w_n = half_dt / (t_next - t1);

        let pp = p * p;
        let ppp = pp * p;

        let s_p = -w_p * ppp + 2.0 * w_p * pp - w_p * p;
        let s_0 = (1.0 + w_p) * ppp + (-1.5 - 2.0 * w_p) * pp + (-0.5 + w_p) * p + 1.0;
        let s_1 = (-1.0 - w_n) * ppp + (1.5 + w_n) * pp + 0.5 * p;
        let s_n = w_n * ppp - w_n * pp;

        s_p * value(i_prev) + s_0 * value(i1 - 1) + s_1 * value(i1) + s_n * value(i_next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn animator(difficulty: Difficulty) -> RouteAnimator {
        RouteAnimator::new(&RoutePars::default(), difficulty).unwrap()
    }

    #[test]
    fn durations_differ_per_difficulty() {
        let pars = RoutePars::default();
        assert_abs_diff_eq!(pars.duration(Difficulty::Normal), 22.0);
        assert_abs_diff_eq!(pars.duration(Difficulty::Hard), 18.0);
        assert_eq!(
            pars.key_times(Difficulty::Hard),
            vec![0.0, 3.5, 6.0, 8.5, 10.0, 11.5, 13.0, 14.5, 18.0]
        );
    }

    #[test]
    fn non_increasing_key_times_are_rejected() {
        let mut pars = RoutePars::default();
        pars.legs_normal[3] = 0.0;
        assert!(pars.validate().is_err());
        assert!(RouteAnimator::new(&pars, Difficulty::Hard).is_err());

        let mut pars = RoutePars::default();
        pars.key_headings_deg.pop();
        assert!(pars.validate().is_err());
    }

    #[test]
    fn sample_hits_key_frames() {
        let route = animator(Difficulty::Normal);
        let times = RoutePars::default().key_times(Difficulty::Normal);

        for (i, t) in times.iter().enumerate() {
            let (pos, heading) = route.sample(*t);
            assert_abs_diff_eq!(pos[0], RoutePars::default().key_points[i][0], epsilon = 1e-9);
            assert_abs_diff_eq!(pos[1], RoutePars::default().key_points[i][1], epsilon = 1e-9);
            assert_abs_diff_eq!(
                heading,
                wrap_angle(RoutePars::default().key_headings_deg[i].to_radians()),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn headings_take_the_shortest_arc() {
        let route = animator(Difficulty::Normal);

        // 250 deg -> 0 deg between t = 16 s and t = 18 s passes 305 deg at half time
        let (_, heading) = route.sample(17.0);
        assert_abs_diff_eq!(heading, 305f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn pose_requires_play_and_pause_freezes_time() {
        let mut route = animator(Difficulty::Normal);
        assert!(route.pose().is_none());
        route.advance(1.0);
        assert_abs_diff_eq!(route.time(), 0.0);

        route.play();
        route.advance(1.0);
        route.pause();
        route.advance(1.0);
        assert_abs_diff_eq!(route.time(), 1.0);
        route.resume();
        route.advance(0.5);
        assert_abs_diff_eq!(route.time(), 1.5);
        assert!(route.pose().is_some());
    }

    #[test]
    fn playback_loops_and_scrubs() {
        let mut route = animator(Difficulty::Hard);
        route.play();
        route.set_time(17.5);
        route.advance(1.0);
        assert_abs_diff_eq!(route.time(), 0.5, epsilon = 1e-9);

        route.set_time(-1.0);
        assert_abs_diff_eq!(route.time(), 17.0, epsilon = 1e-9);
    }

    #[test]
    fn disabled_position_keeps_heading() {
        let mut route = animator(Difficulty::Normal);
        route.play();
        route.set_time(4.0);
        route.set_position_enabled(false);

        let pose = route.pose().unwrap();
        assert!(pose.position.is_none());
        assert_abs_diff_eq!(pose.heading, 90f64.to_radians(), epsilon = 1e-9);
    }
}
