use nalgebra_glm::vec3;

use crate::animation::{AnimationState, CheckpointScript, SawtoothClock};
use crate::camera::{Camera, FlyController};
use crate::geometry::{CUBE, CUBE_BACK, CUBE_FRONT, CUBE_SIDES, HAT, QUAD};
use crate::lighting::{LightRig, Material};
use crate::render_system::RenderSystem;
use crate::textures;
use crate::transform::TransformRecipe;

use super::{DrawSpan, FrameContext, Scene, SceneObject, Topology};

const CAMERA_SPEED: f32 = 2.5;

fn list_span(range: crate::geometry::VertexRange, texture: usize) -> DrawSpan {
    DrawSpan {
        range,
        topology: Topology::TriangleList,
        texture,
    }
}

/// The bobbing figure inside a large textured room with a picture on the
/// wall, lit by a point light and a spot light, explored with a fly
/// camera (W/A/S/D to move, E/Q to rise and sink).
pub struct RoomScene {
    camera: Camera,
    controller: FlyController,
    lights: LightRig,
    clock: SawtoothClock,
    script: CheckpointScript,
    animation: AnimationState,
    objects: Vec<SceneObject>,
}

impl RoomScene {
    pub fn new() -> RoomScene {
        let picture = SceneObject {
            transform: TransformRecipe::still(vec3(5.0, 3.0, -9.9))
                .rotated(0.0, vec3(1.0, 0.0, 0.0))
                .scaled(vec3(3.0, 3.0, 3.0)),
            material: Some(Material::matte(0.1, 0.1, 0.5)),
            parts: vec![list_span(QUAD, textures::PAINT)],
        };

        let room = SceneObject {
            transform: TransformRecipe::still(vec3(0.0, 9.0, 0.0))
                .scaled(vec3(10.0, 10.0, 10.0)),
            material: Some(Material::matte(0.1, 5.0, 1.0)),
            parts: vec![list_span(CUBE, textures::BRICKS)],
        };

        let body = SceneObject {
            transform: TransformRecipe::still(vec3(-3.0, -0.5, -5.0))
                .following_body()
                .rotated(90.0, vec3(0.0, 1.0, 0.0))
                .scaled(vec3(0.25, 0.5, 0.25)),
            material: Some(Material::matte(0.1, 0.1, 1.0)),
            parts: vec![list_span(CUBE, textures::POSTER)],
        };

        // The head keeps its painted face separate from the other five.
        let head = SceneObject {
            transform: TransformRecipe::still(vec3(-3.0, 0.5, -5.0))
                .following_body()
                .following_head()
                .scaled(vec3(0.5, 0.5, 0.5)),
            material: Some(Material::matte(0.1, 0.1, 0.5)),
            parts: vec![
                list_span(CUBE_BACK, textures::PAINT),
                list_span(CUBE_FRONT, textures::POSTER),
                list_span(CUBE_SIDES, textures::POSTER),
            ],
        };

        let hat = SceneObject {
            transform: TransformRecipe::still(vec3(-3.0, 0.5, -5.0))
                .following_body()
                .following_head(),
            material: Some(Material::matte(0.1, 0.1, 0.5)),
            parts: vec![list_span(HAT, textures::POSTER)],
        };

        RoomScene {
            camera: Camera {
                position: vec3(0.0, 0.0, 0.0),
                target: vec3(0.0, 0.0, -1.0),
                up: vec3(0.0, 1.0, 0.0),
                fovy_degrees: 45.0,
                near: 0.1,
                far: 30.0,
            },
            controller: FlyController::new(CAMERA_SPEED),
            lights: LightRig {
                point_position: vec3(0.0, 1.0, 0.0),
                spot_position: vec3(3.0, 3.0, -1.0),
            },
            clock: SawtoothClock::new(),
            script: CheckpointScript::new(),
            animation: AnimationState::default(),
            objects: vec![picture, room, body, head, hat],
        }
    }
}

impl Scene for RoomScene {
    fn update(&mut self, frame: &FrameContext) {
        let timer = self.clock.sample(frame.wall_seconds);
        self.animation = self.script.advance(timer);
        self.controller
            .apply(&mut self.camera, frame.input, frame.delta_seconds);
    }

    fn draw(&mut self, renderer: &mut RenderSystem) {
        let aspect_ratio = renderer.aspect_ratio();
        renderer.set_camera(
            self.camera.view_matrix(),
            self.camera.projection_matrix(aspect_ratio),
        );
        renderer.set_lights(&self.lights, self.camera.position);
        for object in &self.objects {
            renderer.draw_object(object, &self.animation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::VERTEX_COUNT;

    #[test]
    fn every_object_is_lit() {
        let scene = RoomScene::new();
        assert!(scene.objects.iter().all(|o| o.material.is_some()));
    }

    #[test]
    fn table_spans_stay_inside_the_shared_buffer() {
        let scene = RoomScene::new();
        for object in &scene.objects {
            for span in &object.parts {
                assert!(((span.range.first + span.range.count) as usize) <= VERTEX_COUNT);
            }
        }
    }

    #[test]
    fn head_and_hat_follow_both_flags() {
        let scene = RoomScene::new();
        let head = &scene.objects[3];
        let hat = &scene.objects[4];
        for object in [head, hat] {
            assert!(object.transform.follows_body && object.transform.follows_head);
        }
        // The room and picture never move.
        assert!(!scene.objects[0].transform.follows_body);
        assert!(!scene.objects[1].transform.follows_body);
    }

    #[test]
    fn input_moves_the_fly_camera() {
        let mut scene = RoomScene::new();
        let mut input = crate::camera::InputState::default();
        input.forward = true;
        let frame = FrameContext {
            wall_seconds: 0.1,
            delta_seconds: 0.2,
            input: &input,
        };
        scene.update(&frame);
        assert!((scene.camera.position.z - (-0.5)).abs() < 1e-6);
    }
}
