use nalgebra_glm::TVec3;

/// The room scene's fixed light rig: one point light and one spot light,
/// passed to the fragment shader as positions.
#[derive(Clone, Copy, Debug)]
pub struct LightRig {
    pub point_position: TVec3<f32>,
    pub spot_position: TVec3<f32>,
}

/// Per-object Phong terms, re-uploaded before each object is drawn.
#[derive(Clone, Copy, Debug)]
pub struct Material {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shine: f32,
    pub specular_intensity: [f32; 3],
}

impl Material {
    pub fn matte(ambient: f32, diffuse: f32, shine: f32) -> Self {
        Material {
            ambient,
            diffuse,
            specular: 1.0,
            shine,
            specular_intensity: [1.0, 1.0, 1.0],
        }
    }
}
