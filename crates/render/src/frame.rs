use diamond_common::{DiamondColor, Transform, Viewport};
use diamond_scene::{LightRig, LightingProfile, ProgramState, SceneManifest};
use glam::{Mat4, Vec3};

/// Number of separable blur passes per frame.
pub const BLUR_PASSES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyboxLayer {
    /// Outer layer.
    Sunset,
    /// Inner layer, blended over the sunset.
    Universe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurDirection {
    Horizontal,
    Vertical,
}

/// Input of one blur pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurSource {
    /// The HDR target's bright attachment.
    Bright,
    /// One of the two ping-pong buffers.
    PingPong(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pass {
    Clear { color: Vec3 },
    Opaque,
    Models,
    Transparent,
    Skybox(SkyboxLayer),
    Blur {
        direction: BlurDirection,
        source: BlurSource,
        target: usize,
    },
    Composite {
        bloom: bool,
        exposure: f32,
        blurred: usize,
    },
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawKind {
    /// Environment-mapped cube sampling the given skybox.
    ReflectiveCube { environment: SkyboxLayer },
    Diamond(DiamondColor),
    /// Index into the manifest's orbit table.
    Planet(usize),
    Window,
    /// Emissive box at a point light, drawn straight into HDR range.
    LightMarker(usize),
}

/// Edge length of the boxes marking point lights.
pub const LIGHT_MARKER_SCALE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub kind: DrawKind,
    pub model: Mat4,
    pub alpha: f32,
    pub lighting: Option<LightingProfile>,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub viewport: Viewport,
    pub time: f32,
    pub camera_position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    /// View with translation removed, for skyboxes.
    pub sky_view: Mat4,
    pub passes: Vec<Pass>,
    pub opaque: Vec<DrawItem>,
    pub models: Vec<DrawItem>,
    pub transparent: Vec<DrawItem>,
    pub diamond_lights: LightRig,
    pub planet_lights: LightRig,
}

impl Frame {
    pub fn draw_count(&self) -> usize {
        self.opaque.len() + self.models.len() + self.transparent.len()
    }

    pub fn diamond(&self) -> Option<DiamondColor> {
        self.models.iter().find_map(|d| match d.kind {
            DrawKind::Diamond(color) => Some(color),
            _ => None,
        })
    }

    pub fn lights_for(&self, profile: LightingProfile) -> &LightRig {
        match profile {
            LightingProfile::Diamond => &self.diamond_lights,
            LightingProfile::Planet => &self.planet_lights,
        }
    }
}

/// Blur passes alternating horizontal and vertical between two ping-pong
/// buffers. The first pass reads the bright attachment, every later pass
/// reads the previous pass's target. Returns the passes and the index of
/// the buffer holding the final result.
pub fn blur_schedule(count: usize) -> (Vec<Pass>, usize) {
    let mut passes = Vec::with_capacity(count);
    let mut horizontal = true;
    let mut last_target = 0;
    for i in 0..count {
        let target = usize::from(horizontal);
        let source = if i == 0 {
            BlurSource::Bright
        } else {
            BlurSource::PingPong(last_target)
        };
        let direction = if horizontal {
            BlurDirection::Horizontal
        } else {
            BlurDirection::Vertical
        };
        passes.push(Pass::Blur {
            direction,
            source,
            target,
        });
        last_target = target;
        horizontal = !horizontal;
    }
    (passes, last_target)
}

/// Order positions far to near from `eye`.
pub fn sort_back_to_front(eye: Vec3, positions: &[Vec3]) -> Vec<Vec3> {
    let mut sorted = positions.to_vec();
    sorted.sort_by(|a, b| b.distance_squared(eye).total_cmp(&a.distance_squared(eye)));
    sorted
}

/// Build the frame for `state` at `time` seconds since start.
pub fn plan_frame(
    state: &ProgramState,
    manifest: &SceneManifest,
    viewport: Viewport,
    time: f32,
) -> Frame {
    let camera = &state.camera;

    let environment = if state.in_special_zone {
        SkyboxLayer::Universe
    } else {
        SkyboxLayer::Sunset
    };
    let planet_lights = state.lights(LightingProfile::Planet);
    let mut opaque = vec![DrawItem {
        kind: DrawKind::ReflectiveCube { environment },
        model: Mat4::IDENTITY,
        alpha: 1.0,
        lighting: None,
    }];
    opaque.extend(planet_lights.points.iter().enumerate().map(|(i, light)| DrawItem {
        kind: DrawKind::LightMarker(i),
        model: Transform::from_position(light.position)
            .with_uniform_scale(LIGHT_MARKER_SCALE)
            .matrix(),
        alpha: 1.0,
        lighting: None,
    }));

    let mut models = Vec::with_capacity(1 + manifest.orbits.len());
    models.push(DrawItem {
        kind: DrawKind::Diamond(state.diamond_color),
        model: Transform::default()
            .with_uniform_scale(state.diamond_scale)
            .matrix(),
        alpha: state.diamond_transparency,
        lighting: Some(LightingProfile::Diamond),
    });
    models.extend(manifest.orbits.iter().enumerate().map(|(i, body)| DrawItem {
        kind: DrawKind::Planet(i),
        model: body.transform_at(time).matrix(),
        alpha: 1.0,
        lighting: Some(LightingProfile::Planet),
    }));

    let transparent: Vec<DrawItem> = sort_back_to_front(camera.position, &manifest.windows)
        .into_iter()
        .map(|position| DrawItem {
            kind: DrawKind::Window,
            model: Mat4::from_translation(position),
            alpha: 1.0,
            lighting: None,
        })
        .collect();

    let mut passes = vec![
        Pass::Clear {
            color: state.clear_color,
        },
        Pass::Opaque,
        Pass::Models,
        Pass::Transparent,
        Pass::Skybox(SkyboxLayer::Sunset),
        Pass::Skybox(SkyboxLayer::Universe),
    ];
    let (blur, blurred) = blur_schedule(BLUR_PASSES);
    passes.extend(blur);
    passes.push(Pass::Composite {
        bloom: state.bloom_enabled,
        exposure: state.exposure,
        blurred,
    });
    if state.settings_panel_enabled || state.info_panel_enabled {
        passes.push(Pass::Overlay);
    }

    tracing::trace!(
        passes = passes.len(),
        draws = opaque.len() + models.len() + transparent.len(),
        "frame planned"
    );

    Frame {
        viewport,
        time,
        camera_position: camera.position,
        view: camera.view_matrix(),
        projection: camera.projection_matrix(viewport.aspect()),
        sky_view: camera.rotation_only_view(),
        passes,
        opaque,
        models,
        transparent,
        diamond_lights: state.lights(LightingProfile::Diamond),
        planet_lights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(state: &ProgramState) -> Frame {
        plan_frame(state, &SceneManifest::default(), Viewport::default(), 1.5)
    }

    #[test]
    fn pass_sequence_is_fixed() {
        let frame = plan(&ProgramState::default());
        assert!(matches!(frame.passes[0], Pass::Clear { .. }));
        assert_eq!(frame.passes[1], Pass::Opaque);
        assert_eq!(frame.passes[2], Pass::Models);
        assert_eq!(frame.passes[3], Pass::Transparent);
        assert_eq!(frame.passes[4], Pass::Skybox(SkyboxLayer::Sunset));
        assert_eq!(frame.passes[5], Pass::Skybox(SkyboxLayer::Universe));
        let blurs = frame
            .passes
            .iter()
            .filter(|p| matches!(p, Pass::Blur { .. }))
            .count();
        assert_eq!(blurs, BLUR_PASSES);
        assert!(matches!(
            frame.passes[6 + BLUR_PASSES],
            Pass::Composite { .. }
        ));
        assert_eq!(frame.passes.len(), 7 + BLUR_PASSES);
    }

    #[test]
    fn blur_alternates_and_chains() {
        let (passes, result) = blur_schedule(BLUR_PASSES);
        let mut previous_target = None;
        for (i, pass) in passes.iter().enumerate() {
            let Pass::Blur {
                direction,
                source,
                target,
            } = *pass
            else {
                panic!("expected blur pass");
            };
            let expected = if i % 2 == 0 {
                BlurDirection::Horizontal
            } else {
                BlurDirection::Vertical
            };
            assert_eq!(direction, expected);
            match previous_target {
                None => assert_eq!(source, BlurSource::Bright),
                Some(prev) => {
                    assert_eq!(source, BlurSource::PingPong(prev));
                    assert_ne!(target, prev);
                }
            }
            previous_target = Some(target);
        }
        assert_eq!(Some(result), previous_target);
    }

    #[test]
    fn exactly_one_diamond_matches_color() {
        let mut state = ProgramState::default();
        state.set_diamond_color(DiamondColor::Pink);
        let frame = plan(&state);
        let diamonds: Vec<_> = frame
            .models
            .iter()
            .filter(|d| matches!(d.kind, DrawKind::Diamond(_)))
            .collect();
        assert_eq!(diamonds.len(), 1);
        assert_eq!(frame.diamond(), Some(DiamondColor::Pink));
        assert_eq!(diamonds[0].alpha, state.diamond_transparency);
    }

    #[test]
    fn windows_are_far_to_near() {
        let frame = plan(&ProgramState::default());
        let eye = frame.camera_position;
        let distances: Vec<f32> = frame
            .transparent
            .iter()
            .map(|d| d.model.w_axis.truncate().distance(eye))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn planets_follow_time_deterministically() {
        let state = ProgramState::default();
        let manifest = SceneManifest::default();
        let a = plan_frame(&state, &manifest, Viewport::default(), 4.0);
        let b = plan_frame(&state, &manifest, Viewport::default(), 4.0);
        let c = plan_frame(&state, &manifest, Viewport::default(), 5.0);
        assert_eq!(a.models, b.models);
        assert_ne!(a.models[1].model, c.models[1].model);
    }

    #[test]
    fn resize_changes_projection_only() {
        let state = ProgramState::default();
        let before = state.clone();
        let manifest = SceneManifest::default();
        let small = plan_frame(&state, &manifest, Viewport::new(800, 600), 0.0);
        let wide = plan_frame(&state, &manifest, Viewport::new(1920, 600), 0.0);
        assert_ne!(small.projection, wide.projection);
        assert_eq!(small.view, wide.view);
        assert_eq!(small.passes, wide.passes);
        assert_eq!(state, before);
    }

    #[test]
    fn overlay_only_when_a_panel_is_open() {
        let mut state = ProgramState::default();
        assert!(!plan(&state).passes.contains(&Pass::Overlay));
        state.toggle_info_panel();
        assert_eq!(plan(&state).passes.last(), Some(&Pass::Overlay));
    }

    #[test]
    fn light_markers_sit_on_point_lights() {
        let frame = plan(&ProgramState::default());
        let markers: Vec<_> = frame
            .opaque
            .iter()
            .filter(|d| matches!(d.kind, DrawKind::LightMarker(_)))
            .collect();
        assert_eq!(markers.len(), diamond_scene::POINT_LIGHT_COUNT);
        for marker in markers {
            let DrawKind::LightMarker(i) = marker.kind else {
                unreachable!()
            };
            let p = marker.model.w_axis.truncate();
            assert_eq!(p, frame.planet_lights.points[i].position);
        }
    }

    #[test]
    fn special_zone_switches_cube_environment() {
        let mut state = ProgramState::default();
        state.camera.position = Vec3::ZERO;
        state.update_special_zone();
        let frame = plan(&state);
        assert_eq!(
            frame.opaque[0].kind,
            DrawKind::ReflectiveCube {
                environment: SkyboxLayer::Universe
            }
        );
    }
}
