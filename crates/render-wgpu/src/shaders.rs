//! WGSL sources for the eight scene programs.
//!
//! Scene programs share two preludes: the per-frame/per-object uniform
//! blocks and the two-attachment HDR output (`color` plus `bright`, the
//! latter holding only fragments brighter than 1.0 luminance).

/// Every program the renderer compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    Cube,
    Skybox,
    Diamond,
    Window,
    Planet,
    Hdr,
    Bloom,
    Blur,
}

impl ShaderProgram {
    pub const ALL: [ShaderProgram; 8] = [
        ShaderProgram::Cube,
        ShaderProgram::Skybox,
        ShaderProgram::Diamond,
        ShaderProgram::Window,
        ShaderProgram::Planet,
        ShaderProgram::Hdr,
        ShaderProgram::Bloom,
        ShaderProgram::Blur,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShaderProgram::Cube => "cube",
            ShaderProgram::Skybox => "skybox",
            ShaderProgram::Diamond => "diamond",
            ShaderProgram::Window => "window",
            ShaderProgram::Planet => "planet",
            ShaderProgram::Hdr => "hdr",
            ShaderProgram::Bloom => "bloom",
            ShaderProgram::Blur => "blur",
        }
    }

    /// Full WGSL source with preludes prepended.
    pub fn source(self) -> String {
        let parts: &[&str] = match self {
            ShaderProgram::Cube => &[FRAME_PRELUDE, OBJECT_PRELUDE, HDR_OUTPUT, CUBE_SHADER],
            ShaderProgram::Skybox => &[FRAME_PRELUDE, HDR_OUTPUT, SKYBOX_SHADER],
            ShaderProgram::Diamond => &[
                FRAME_PRELUDE,
                OBJECT_PRELUDE,
                HDR_OUTPUT,
                LIGHTING,
                MESH_VERTEX,
                DIAMOND_SHADER,
            ],
            ShaderProgram::Window => &[FRAME_PRELUDE, OBJECT_PRELUDE, HDR_OUTPUT, WINDOW_SHADER],
            ShaderProgram::Planet => &[
                FRAME_PRELUDE,
                OBJECT_PRELUDE,
                HDR_OUTPUT,
                LIGHTING,
                MESH_VERTEX,
                PLANET_SHADER,
            ],
            ShaderProgram::Hdr => &[FRAME_PRELUDE, OBJECT_PRELUDE, HDR_OUTPUT, LIGHT_MARKER_SHADER],
            ShaderProgram::Bloom => &[FULLSCREEN, BLOOM_SHADER],
            ShaderProgram::Blur => &[FULLSCREEN, BLUR_SHADER],
        };
        parts.concat()
    }
}

/// Compiled shader modules, one per program.
pub struct ShaderBundle {
    modules: Vec<wgpu::ShaderModule>,
}

impl ShaderBundle {
    pub fn compile(device: &wgpu::Device) -> Self {
        let modules = ShaderProgram::ALL
            .iter()
            .map(|program| {
                device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(program.name()),
                    source: wgpu::ShaderSource::Wgsl(program.source().into()),
                })
            })
            .collect();
        tracing::debug!("compiled {} shader programs", ShaderProgram::ALL.len());
        Self { modules }
    }

    pub fn get(&self, program: ShaderProgram) -> &wgpu::ShaderModule {
        let index = ShaderProgram::ALL
            .iter()
            .position(|p| *p == program)
            .unwrap_or_default();
        &self.modules[index]
    }
}

const FRAME_PRELUDE: &str = r#"
struct FrameUniforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    sky_view: mat4x4<f32>,
    camera_position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;
"#;

const OBJECT_PRELUDE: &str = r#"
struct ObjectUniforms {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>,
    specular: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> object: ObjectUniforms;
"#;

const HDR_OUTPUT: &str = r#"
struct SceneOutput {
    @location(0) color: vec4<f32>,
    @location(1) bright: vec4<f32>,
};

fn scene_output(color: vec3<f32>, alpha: f32) -> SceneOutput {
    var out: SceneOutput;
    out.color = vec4<f32>(color, alpha);
    let brightness = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    if (brightness > 1.0) {
        out.bright = vec4<f32>(color, alpha);
    } else {
        out.bright = vec4<f32>(0.0, 0.0, 0.0, alpha);
    }
    return out;
}
"#;

const LIGHTING: &str = r#"
struct PointLight {
    position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    attenuation: vec4<f32>,
};

struct DirLight {
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
};

struct SpotLight {
    position: vec4<f32>,
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    attenuation: vec4<f32>,
    cone: vec4<f32>,
};

struct Lights {
    points: array<PointLight, 4>,
    directional: DirLight,
    spot: SpotLight,
};

@group(2) @binding(0)
var<uniform> lights: Lights;

fn attenuate(att: vec4<f32>, distance: f32) -> f32 {
    return 1.0 / (att.x + att.y * distance + att.z * distance * distance);
}

fn phong(
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
    normal: vec3<f32>,
    light_dir: vec3<f32>,
    view_dir: vec3<f32>,
    base: vec3<f32>,
    spec_color: vec3<f32>,
    shininess: f32,
) -> vec3<f32> {
    let diff = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), shininess);
    return ambient * base + diffuse * diff * base + specular * spec * spec_color;
}

fn shade(
    normal: vec3<f32>,
    frag_pos: vec3<f32>,
    view_dir: vec3<f32>,
    base: vec3<f32>,
    spec_color: vec3<f32>,
    shininess: f32,
) -> vec3<f32> {
    let dir = lights.directional;
    var result = phong(
        dir.ambient.xyz, dir.diffuse.xyz, dir.specular.xyz,
        normal, normalize(-dir.direction.xyz), view_dir, base, spec_color, shininess,
    );

    for (var i = 0u; i < 4u; i = i + 1u) {
        let light = lights.points[i];
        let to_light = light.position.xyz - frag_pos;
        let falloff = attenuate(light.attenuation, length(to_light));
        result += phong(
            light.ambient.xyz, light.diffuse.xyz, light.specular.xyz,
            normal, normalize(to_light), view_dir, base, spec_color, shininess,
        ) * falloff;
    }

    let spot = lights.spot;
    let to_spot = spot.position.xyz - frag_pos;
    let spot_dir = normalize(to_spot);
    let theta = dot(spot_dir, normalize(-spot.direction.xyz));
    let epsilon = spot.cone.x - spot.cone.y;
    let intensity = clamp((theta - spot.cone.y) / epsilon, 0.0, 1.0);
    let lit = phong(
        vec3<f32>(0.0), spot.diffuse.xyz, spot.specular.xyz,
        normal, spot_dir, view_dir, base, spec_color, shininess,
    );
    result += (spot.ambient.xyz * base + lit * intensity) * attenuate(spot.attenuation, length(to_spot));

    return result;
}
"#;

const MESH_VERTEX: &str = r#"
struct MeshInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct MeshOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_mesh(in: MeshInput) -> MeshOutput {
    let world = object.model * vec4<f32>(in.position, 1.0);
    var out: MeshOutput;
    out.clip_position = frame.projection * frame.view * world;
    out.world_position = world.xyz;
    out.normal = (object.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}
"#;

const CUBE_SHADER: &str = r#"
@group(2) @binding(0) var environment: texture_cube<f32>;
@group(2) @binding(1) var environment_sampler: sampler;

struct CubeOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_cube(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> CubeOutput {
    let world = object.model * vec4<f32>(position, 1.0);
    var out: CubeOutput;
    out.clip_position = frame.projection * frame.view * world;
    out.world_position = world.xyz;
    out.normal = (object.normal_matrix * vec4<f32>(normal, 0.0)).xyz;
    return out;
}

@fragment
fn fs_cube(in: CubeOutput) -> SceneOutput {
    let incident = normalize(in.world_position - frame.camera_position.xyz);
    let reflected = reflect(incident, normalize(in.normal));
    let color = textureSample(environment, environment_sampler, reflected).rgb;
    return scene_output(color, 1.0);
}
"#;

const SKYBOX_SHADER: &str = r#"
@group(1) @binding(0) var sky: texture_cube<f32>;
@group(1) @binding(1) var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_skybox(@location(0) position: vec3<f32>) -> SkyOutput {
    let clip = frame.projection * frame.sky_view * vec4<f32>(position, 1.0);
    var out: SkyOutput;
    // z = w puts every skybox fragment on the far plane.
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_skybox(in: SkyOutput) -> SceneOutput {
    let color = textureSample(sky, sky_sampler, in.direction).rgb;
    return scene_output(color, 1.0);
}
"#;

const DIAMOND_SHADER: &str = r#"
@group(3) @binding(0) var environment: texture_cube<f32>;
@group(3) @binding(1) var environment_sampler: sampler;

@fragment
fn fs_diamond(in: MeshOutput) -> SceneOutput {
    let normal = normalize(in.normal);
    let view_dir = normalize(frame.camera_position.xyz - in.world_position);
    let base = object.color.rgb;
    let lit = shade(normal, in.world_position, view_dir, base, object.specular.rgb, object.params.x);
    let sparkle = textureSample(environment, environment_sampler, reflect(-view_dir, normal)).rgb;
    return scene_output(mix(lit, sparkle * base, 0.35), object.color.a);
}
"#;

const PLANET_SHADER: &str = r#"
@group(3) @binding(0) var diffuse_map: texture_2d<f32>;
@group(3) @binding(1) var material_sampler: sampler;
@group(3) @binding(2) var specular_map: texture_2d<f32>;

@fragment
fn fs_planet(in: MeshOutput) -> SceneOutput {
    var texel = textureSample(diffuse_map, material_sampler, in.uv);
    if (object.params.y > 0.5) {
        texel = vec4<f32>(texel.rrr, 1.0);
    }
    let base = texel.rgb * object.color.rgb;
    let normal = normalize(in.normal);
    let view_dir = normalize(frame.camera_position.xyz - in.world_position);
    let spec_color = object.specular.rgb * textureSample(specular_map, material_sampler, in.uv).rgb;
    let color = shade(normal, in.world_position, view_dir, base, spec_color, object.params.x);
    return scene_output(color, object.color.a);
}
"#;

const WINDOW_SHADER: &str = r#"
@group(2) @binding(0) var window_texture: texture_2d<f32>;
@group(2) @binding(1) var window_sampler: sampler;

struct WindowOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_window(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> WindowOutput {
    var out: WindowOutput;
    out.clip_position = frame.projection * frame.view * object.model * vec4<f32>(position, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_window(in: WindowOutput) -> SceneOutput {
    let texel = textureSample(window_texture, window_sampler, in.uv);
    if (texel.a < 0.1) {
        discard;
    }
    return scene_output(texel.rgb, texel.a * object.color.a);
}
"#;

const LIGHT_MARKER_SHADER: &str = r#"
@vertex
fn vs_marker(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return frame.projection * frame.view * object.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_marker() -> SceneOutput {
    return scene_output(object.color.rgb, 1.0);
}
"#;

const FULLSCREEN: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}
"#;

const BLUR_SHADER: &str = r#"
struct BlurParams {
    horizontal: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
};

@group(0) @binding(0) var<uniform> params: BlurParams;
@group(1) @binding(0) var source: texture_2d<f32>;
@group(1) @binding(1) var source_sampler: sampler;

@fragment
fn fs_blur(in: VertexOutput) -> @location(0) vec4<f32> {
    var weights = array<f32, 5>(0.2270270270, 0.1945945946, 0.1216216216, 0.0540540541, 0.0162162162);
    let texel = 1.0 / vec2<f32>(textureDimensions(source));
    let direction = select(vec2<f32>(0.0, texel.y), vec2<f32>(texel.x, 0.0), params.horizontal != 0u);

    var result = textureSample(source, source_sampler, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i = i + 1) {
        let offset = direction * f32(i);
        result += textureSample(source, source_sampler, in.uv + offset).rgb * weights[i];
        result += textureSample(source, source_sampler, in.uv - offset).rgb * weights[i];
    }
    return vec4<f32>(result, 1.0);
}
"#;

const BLOOM_SHADER: &str = r#"
struct CompositeParams {
    bloom: u32,
    exposure: f32,
    _pad: vec2<f32>,
};

@group(0) @binding(0) var<uniform> params: CompositeParams;
@group(1) @binding(0) var scene: texture_2d<f32>;
@group(1) @binding(1) var scene_sampler: sampler;
@group(2) @binding(0) var blurred: texture_2d<f32>;
@group(2) @binding(1) var blurred_sampler: sampler;

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {
    let hdr = textureSample(scene, scene_sampler, in.uv).rgb;
    let glow = textureSample(blurred, blurred_sampler, in.uv).rgb;
    let color = hdr + select(vec3<f32>(0.0), glow, params.bloom != 0u);
    // Exposure tone mapping; the sRGB surface applies gamma.
    let mapped = vec3<f32>(1.0) - exp(-color * params.exposure);
    return vec4<f32>(mapped, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_program_has_a_distinct_name() {
        let mut names: Vec<_> = ShaderProgram::ALL.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn scene_programs_write_both_attachments() {
        for program in [
            ShaderProgram::Cube,
            ShaderProgram::Skybox,
            ShaderProgram::Diamond,
            ShaderProgram::Window,
            ShaderProgram::Planet,
            ShaderProgram::Hdr,
        ] {
            let src = program.source();
            assert!(src.contains("fn scene_output"), "{}", program.name());
            assert!(src.contains("@location(1) bright"), "{}", program.name());
        }
    }

    #[test]
    fn post_programs_use_fullscreen_triangle() {
        assert!(ShaderProgram::Bloom.source().contains("fn vs_fullscreen"));
        assert!(ShaderProgram::Blur.source().contains("fn vs_fullscreen"));
        assert!(!ShaderProgram::Blur.source().contains("SceneOutput"));
    }

    #[test]
    fn planet_samples_a_specular_map() {
        let src = ShaderProgram::Planet.source();
        assert!(src.contains("@group(3) @binding(2) var specular_map"));
        assert!(src.contains("params: vec4<f32>,\n    specular: vec4<f32>,"));
    }

    #[test]
    fn lit_programs_include_lighting() {
        assert!(ShaderProgram::Diamond.source().contains("fn shade("));
        assert!(ShaderProgram::Planet.source().contains("fn shade("));
        assert!(!ShaderProgram::Cube.source().contains("fn shade("));
    }
}
