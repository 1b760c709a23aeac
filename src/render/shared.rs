use bytemuck::{Pod, Zeroable};

use crate::camera::CameraState;
use crate::scene::{ItemShading, SceneItem};
use crate::shading::MaterialKind;

/// Fragment entry point an item is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PipelineKind {
    Plastic,
    Metal,
    Glow,
}

impl PipelineKind {
    pub(crate) fn of(shading: &ItemShading) -> Self {
        match shading {
            ItemShading::Glow { .. } => Self::Glow,
            ItemShading::Lit {
                material: MaterialKind::Plastic,
                ..
            } => Self::Plastic,
            ItemShading::Lit {
                material: MaterialKind::Metal,
                ..
            } => Self::Metal,
        }
    }

    pub(crate) fn entry_point(self) -> &'static str {
        match self {
            Self::Plastic => "fs_plastic",
            Self::Metal => "fs_metal",
            Self::Glow => "fs_glow",
        }
    }

    /// Glow is blended additively over the lit glyphs and must be drawn last.
    pub(crate) fn is_transparent(self) -> bool {
        matches!(self, Self::Glow)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
}

impl GlobalUniform {
    pub(crate) fn new(camera: &CameraState, aspect: f32) -> Self {
        Self {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).into(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct ItemUniform {
    pub model: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    /// rgb base colour, w ambient intensity.
    pub base_color: [f32; 4],
    /// x specular exponent, y glow intensity scale.
    pub params: [f32; 4],
}

impl ItemUniform {
    pub(crate) fn from_item(item: &SceneItem) -> Self {
        let model = item.model.to_cols_array_2d();
        match item.shading {
            ItemShading::Glow { intensity_scale } => Self {
                model,
                light_position: [0.0; 4],
                base_color: [1.0, 1.0, 1.0, 0.0],
                params: [0.0, intensity_scale, 0.0, 0.0],
            },
            ItemShading::Lit { uniforms, .. } => Self {
                model,
                light_position: uniforms.light_position.extend(1.0).into(),
                base_color: uniforms.base_color.extend(uniforms.ambient_intensity).into(),
                params: [uniforms.specular_exponent, 0.0, 0.0, 0.0],
            },
        }
    }
}

pub(crate) const SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
}

struct Item {
    model: mat4x4<f32>,
    light_position: vec4<f32>,
    base_color: vec4<f32>,
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> item: Item;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) local_pos: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = item.model * vec4<f32>(input.position, 1.0);
    out.clip_position = globals.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = (item.model * vec4<f32>(input.normal, 0.0)).xyz;
    out.local_pos = input.position;
    return out;
}

fn safe_normalize(v: vec3<f32>) -> vec3<f32> {
    let len = length(v);
    if (len > 0.0) {
        return v / len;
    }
    return vec3<f32>(0.0);
}

fn shade(input: VertexOutput, specular_color: vec3<f32>) -> vec4<f32> {
    let normal = safe_normalize(input.normal);
    let light_dir = safe_normalize(item.light_position.xyz - input.world_pos);
    let lambert = max(dot(normal, light_dir), 0.0);

    var highlight = 0.0;
    if (lambert > 0.0) {
        let view_dir = safe_normalize(-input.world_pos);
        let reflect_dir = reflect(-light_dir, normal);
        highlight = pow(max(dot(view_dir, reflect_dir), 0.0), item.params.x);
    }

    let base = item.base_color.rgb;
    let ambient = base * item.base_color.w;
    let diffuse = base * lambert;
    let specular = specular_color * highlight;
    return vec4<f32>(ambient + diffuse + specular, 1.0);
}

@fragment
fn fs_plastic(input: VertexOutput) -> @location(0) vec4<f32> {
    return shade(input, vec3<f32>(1.0));
}

@fragment
fn fs_metal(input: VertexOutput) -> @location(0) vec4<f32> {
    return shade(input, item.base_color.rgb);
}

@fragment
fn fs_glow(input: VertexOutput) -> @location(0) vec4<f32> {
    let intensity = item.params.y / length(input.local_pos);
    return vec4<f32>(vec3<f32>(1.0), intensity);
}
"#;
