pub mod figure;
pub mod room;

use crate::camera::InputState;
use crate::geometry::VertexRange;
use crate::lighting::Material;
use crate::render_system::RenderSystem;
use crate::transform::TransformRecipe;

/// How a vertex range is assembled into triangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    TriangleFan,
}

/// One draw call: a window of the shared buffer, its topology, and the
/// texture slot bound for it.
#[derive(Clone, Copy, Debug)]
pub struct DrawSpan {
    pub range: VertexRange,
    pub topology: Topology,
    pub texture: usize,
}

/// One entry of a scene's object table.
pub struct SceneObject {
    pub transform: TransformRecipe,
    pub material: Option<Material>,
    pub parts: Vec<DrawSpan>,
}

/// Everything a scene sees for one frame.
pub struct FrameContext<'a> {
    pub wall_seconds: f32,
    pub delta_seconds: f32,
    pub input: &'a InputState,
}

pub trait Scene {
    fn update(&mut self, frame: &FrameContext);
    fn draw(&mut self, renderer: &mut RenderSystem);
}

pub struct SceneManager {
    scenes: Vec<Box<dyn Scene>>,
    active_scene_index: u32,
}

impl SceneManager {
    pub fn new() -> Self {
        SceneManager {
            active_scene_index: 0,
            scenes: Vec::new(),
        }
    }

    pub fn add_scene(&mut self, scene: Box<dyn Scene>) {
        self.scenes.push(scene);
    }

    pub fn set_active(&mut self, index: u32) {
        self.active_scene_index = index;
    }

    /// Digit keys select scenes; winit numbers Key1 as discriminant zero,
    /// so the key value indexes the scene list directly.
    pub fn switch_scene_by_key(&mut self, input: winit::event::KeyboardInput) {
        if input.state != winit::event::ElementState::Pressed {
            return;
        }

        if let Some(key) = input.virtual_keycode {
            let key_number = key as u32;
            if key_number < self.scenes.len() as u32 && key_number != self.active_scene_index {
                log::info!("switching to scene {}", key_number + 1);
                self.set_active(key_number);
            }
        }
    }

    pub fn active_scene(&mut self) -> &mut dyn Scene {
        &mut *self.scenes[self.active_scene_index as usize]
    }
}
