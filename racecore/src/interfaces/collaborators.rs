use crate::core::effects::EffectKind;
use crate::core::route::Difficulty;

/// Entities the core attaches to and detaches from the scene. The core only refers to them by
/// identity, building their visual representation is up to the scene collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEntity {
    Menu,
    Track,
    // index into the vehicle catalog
    Vehicle(usize),
    // highlight shown on a selected catalog vehicle
    SelectionMarker(usize),
    RouteVisual,
    PowerUp(usize),
    ObstacleTemplate(EffectKind),
    // id of a placed obstacle
    Obstacle(u32),
    OverScreen,
}

/// Scene collaborator. Entities added remain visible until they are removed again.
pub trait Scene {
    fn add(&mut self, entity: SceneEntity);
    fn remove(&mut self, entity: SceneEntity);
}

/// Camera and orbit controls collaborator. Positions are (x, y, z) with y pointing up.
pub trait CameraRig {
    fn set_position(&mut self, position: [f64; 3]);
    fn look_at(&mut self, target: [f64; 3]);
    fn set_controls_enabled(&mut self, enabled: bool);
}

/// Things a click can hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickTarget {
    Difficulty(Difficulty),
    Vehicle(usize),
    StartButton,
    ObstacleTemplate(EffectKind),
    // ground point (x, z) of the click
    TrackPoint { x: f64, z: f64 },
    RestartButton,
    MenuButton,
}

/// Picker maps a click in screen coordinates to the entity under the cursor.
pub trait Picker {
    fn pick(&self, screen_x: f64, screen_y: f64) -> Option<PickTarget>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullScene;

impl Scene for NullScene {
    fn add(&mut self, _entity: SceneEntity) {}
    fn remove(&mut self, _entity: SceneEntity) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullCamera;

impl CameraRig for NullCamera {
    fn set_position(&mut self, _position: [f64; 3]) {}
    fn look_at(&mut self, _target: [f64; 3]) {}
    fn set_controls_enabled(&mut self, _enabled: bool) {}
}

/// A rectangular screen region resolving to a fixed pick target.
#[derive(Debug, Clone, Copy)]
pub struct Hotspot {
    pub center: [f64; 2],
    pub half_size: [f64; 2],
    pub target: PickTarget,
}

/// HotspotPicker resolves clicks against a list of screen hotspots. Clicks that miss every
/// hotspot are optionally treated as a top-down view of the ground plane, i.e. the screen
/// coordinates are the (x, z) world position.
#[derive(Debug, Clone, Default)]
pub struct HotspotPicker {
    hotspots: Vec<Hotspot>,
    ground_fallback: bool,
}

impl HotspotPicker {
    pub fn new(hotspots: Vec<Hotspot>, ground_fallback: bool) -> HotspotPicker {
        HotspotPicker {
            hotspots,
            ground_fallback,
        }
    }

    /// Builds a picker in which every target sits at its own unit square, so that a click at
    /// `hotspot_position(i)` hits `targets[i]`.
    pub fn with_grid(targets: &[PickTarget], ground_fallback: bool) -> HotspotPicker {
        let hotspots = targets
            .iter()
            .enumerate()
            .map(|(i, target)| Hotspot {
                center: HotspotPicker::hotspot_position(i),
                half_size: [0.5, 0.5],
                target: *target,
            })
            .collect();
        HotspotPicker::new(hotspots, ground_fallback)
    }

    /// Screen position of grid hotspot `idx`. Grid hotspots lie far outside the world so that
    /// they never shadow ground clicks.
    pub fn hotspot_position(idx: usize) -> [f64; 2] {
        [10_000.0 + idx as f64 * 2.0, 10_000.0]
    }
}

impl Picker for HotspotPicker {
    fn pick(&self, screen_x: f64, screen_y: f64) -> Option<PickTarget> {
        let hit = self.hotspots.iter().find(|h| {
            (h.center[0] - screen_x).abs() <= h.half_size[0]
                && (h.center[1] - screen_y).abs() <= h.half_size[1]
        });

        match hit {
            Some(h) => Some(h.target),
            None if self.ground_fallback => Some(PickTarget::TrackPoint {
                x: screen_x,
                z: screen_y,
            }),
            None => None,
        }
    }
}
