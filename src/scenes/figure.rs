use nalgebra_glm::vec3;

use crate::animation::{AnimationState, CheckpointScript, SawtoothClock};
use crate::camera::Camera;
use crate::geometry::{CRATE_FACES, HAT};
use crate::render_system::RenderSystem;
use crate::textures;
use crate::transform::TransformRecipe;

use super::{DrawSpan, FrameContext, Scene, SceneObject, Topology};

/// A textured crate on the ground and a second crate wearing the hat,
/// both bobbing on the scripted cycle, seen from a fixed camera.
pub struct FigureScene {
    camera: Camera,
    clock: SawtoothClock,
    script: CheckpointScript,
    animation: AnimationState,
    objects: Vec<SceneObject>,
}

fn crate_fans(texture: usize) -> Vec<DrawSpan> {
    CRATE_FACES
        .iter()
        .map(|&range| DrawSpan {
            range,
            topology: Topology::TriangleFan,
            texture,
        })
        .collect()
}

impl FigureScene {
    pub fn new() -> FigureScene {
        let base_crate = SceneObject {
            transform: TransformRecipe::still(vec3(0.0, 0.0, 0.0))
                .following_body()
                .rotated(90.0, vec3(0.0, 1.0, 0.0))
                .scaled(vec3(0.5, 1.0, 0.5)),
            material: None,
            parts: crate_fans(textures::CHECKER),
        };

        // The upper crate paints its front face differently and carries
        // the hat on top.
        let mut parts = vec![DrawSpan {
            range: CRATE_FACES[0],
            topology: Topology::TriangleFan,
            texture: textures::PAINT,
        }];
        parts.extend(
            CRATE_FACES[1..]
                .iter()
                .map(|&range| DrawSpan {
                    range,
                    topology: Topology::TriangleFan,
                    texture: textures::POSTER,
                }),
        );
        parts.push(DrawSpan {
            range: HAT,
            topology: Topology::TriangleList,
            texture: textures::POSTER,
        });

        let hatted_crate = SceneObject {
            transform: TransformRecipe::still(vec3(0.0, 1.0, 0.0))
                .following_body()
                .following_head()
                .rotated(90.0, vec3(0.0, 1.0, 0.0)),
            material: None,
            parts,
        };

        FigureScene {
            camera: Camera {
                position: vec3(2.0, 1.0, 4.0),
                target: vec3(0.0, 0.0, 0.0),
                up: vec3(0.0, 1.0, 0.0),
                fovy_degrees: 45.0,
                near: 0.1,
                far: 10.0,
            },
            clock: SawtoothClock::new(),
            script: CheckpointScript::new(),
            animation: AnimationState::default(),
            objects: vec![base_crate, hatted_crate],
        }
    }
}

impl Scene for FigureScene {
    fn update(&mut self, frame: &FrameContext) {
        let timer = self.clock.sample(frame.wall_seconds);
        self.animation = self.script.advance(timer);
    }

    fn draw(&mut self, renderer: &mut RenderSystem) {
        let aspect_ratio = renderer.aspect_ratio();
        renderer.set_camera(
            self.camera.view_matrix(),
            self.camera.projection_matrix(aspect_ratio),
        );
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
    fn table_spans_stay_inside_the_shared_buffer() {
        let scene = FigureScene::new();
        for object in &scene.objects {
            for span in &object.parts {
                assert!(((span.range.first + span.range.count) as usize) <= VERTEX_COUNT);
            }
        }
    }

    #[test]
    fn crate_faces_draw_as_fans() {
        let scene = FigureScene::new();
        for span in &scene.objects[0].parts {
            assert_eq!(span.topology, Topology::TriangleFan);
            assert_eq!(span.range.count, 4);
        }
    }

    #[test]
    fn only_the_upper_crate_follows_the_head() {
        let scene = FigureScene::new();
        assert!(!scene.objects[0].transform.follows_head);
        assert!(scene.objects[1].transform.follows_head);
        assert!(scene.objects.iter().all(|o| o.transform.follows_body));
    }
}
