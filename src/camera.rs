use nalgebra_glm::{identity, look_at, perspective, translate, TMat4, TVec3};
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode};

/// Where the camera sits and what it looks at. `target` doubles as the
/// forward axis for fly movement.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: TVec3<f32>,
    pub target: TVec3<f32>,
    pub up: TVec3<f32>,
    pub fovy_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// The view is the world pushed away from the eye, then oriented:
    /// translate(-position) * lookAt(position, target, up).
    pub fn view_matrix(&self) -> TMat4<f32> {
        let moved: TMat4<f32> = translate(&identity(), &-self.position);
        moved * look_at(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> TMat4<f32> {
        perspective(aspect_ratio, self.fovy_degrees.to_radians(), self.near, self.far)
    }
}

/// Keys currently held, snapshotted from winit keyboard events.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub rise: bool,
    pub sink: bool,
}

impl InputState {
    pub fn process_keyboard(&mut self, input: &KeyboardInput) {
        let held = input.state == ElementState::Pressed;
        match input.virtual_keycode {
            Some(VirtualKeyCode::W) => self.forward = held,
            Some(VirtualKeyCode::S) => self.back = held,
            Some(VirtualKeyCode::A) => self.left = held,
            Some(VirtualKeyCode::D) => self.right = held,
            Some(VirtualKeyCode::E) => self.rise = held,
            Some(VirtualKeyCode::Q) => self.sink = held,
            _ => {}
        }
    }
}

/// Moves a camera along its forward/right/up axes at a fixed speed.
#[derive(Clone, Copy, Debug)]
pub struct FlyController {
    pub speed: f32,
}

impl FlyController {
    pub fn new(speed: f32) -> Self {
        FlyController { speed }
    }

    pub fn apply(&self, camera: &mut Camera, input: &InputState, delta_seconds: f32) {
        let step = self.speed * delta_seconds;
        let forward = camera.target;
        let right = forward.cross(&camera.up).normalize();

        if input.forward {
            camera.position += forward * step;
        }
        if input.back {
            camera.position -= forward * step;
        }
        if input.left {
            camera.position -= right * step;
        }
        if input.right {
            camera.position += right * step;
        }
        if input.rise {
            camera.position += camera.up * step;
        }
        if input.sink {
            camera.position -= camera.up * step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_glm::vec3;

    fn assert_mat_eq(actual: &TMat4<f32>, expected: &TMat4<f32>) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (actual[(i, j)] - expected[(i, j)]).abs() < 1e-5,
                    "entry ({i},{j}): {} vs {}",
                    actual[(i, j)],
                    expected[(i, j)]
                );
            }
        }
    }

    /// lookAt assembled by hand from the camera basis.
    fn reference_look_at(eye: TVec3<f32>, target: TVec3<f32>, up: TVec3<f32>) -> TMat4<f32> {
        let f = (target - eye).normalize();
        let s = f.cross(&up).normalize();
        let u = s.cross(&f);

        let mut look: TMat4<f32> = identity();
        look[(0, 0)] = s.x;
        look[(0, 1)] = s.y;
        look[(0, 2)] = s.z;
        look[(0, 3)] = -s.dot(&eye);
        look[(1, 0)] = u.x;
        look[(1, 1)] = u.y;
        look[(1, 2)] = u.z;
        look[(1, 3)] = -u.dot(&eye);
        look[(2, 0)] = -f.x;
        look[(2, 1)] = -f.y;
        look[(2, 2)] = -f.z;
        look[(2, 3)] = f.dot(&eye);
        look
    }

    #[test]
    fn view_is_negative_translation_times_look_at() {
        let camera = Camera {
            position: vec3(2.0, 1.0, 4.0),
            target: vec3(0.0, 0.0, 0.0),
            up: vec3(0.0, 1.0, 0.0),
            fovy_degrees: 45.0,
            near: 0.1,
            far: 10.0,
        };

        let expected = translate(&identity(), &vec3(-2.0, -1.0, -4.0))
            * reference_look_at(camera.position, camera.target, camera.up);
        assert_mat_eq(&camera.view_matrix(), &expected);
    }

    #[test]
    fn projection_matches_the_perspective_formula() {
        let camera = Camera {
            position: vec3(0.0, 0.0, 0.0),
            target: vec3(0.0, 0.0, -1.0),
            up: vec3(0.0, 1.0, 0.0),
            fovy_degrees: 45.0,
            near: 0.1,
            far: 10.0,
        };
        let aspect = 800.0 / 600.0;
        let projection = camera.projection_matrix(aspect);

        let focal = 1.0 / (45.0f32.to_radians() / 2.0).tan();
        let (near, far) = (0.1f32, 10.0f32);
        let mut expected: TMat4<f32> = TMat4::zeros();
        expected[(0, 0)] = focal / aspect;
        expected[(1, 1)] = focal;
        expected[(2, 2)] = -(far + near) / (far - near);
        expected[(2, 3)] = -(2.0 * far * near) / (far - near);
        expected[(3, 2)] = -1.0;
        assert_mat_eq(&projection, &expected);
    }

    #[test]
    fn fly_controller_moves_along_the_axes() {
        let mut camera = Camera {
            position: vec3(0.0, 0.0, 0.0),
            target: vec3(0.0, 0.0, -1.0),
            up: vec3(0.0, 1.0, 0.0),
            fovy_degrees: 45.0,
            near: 0.1,
            far: 30.0,
        };
        let controller = FlyController::new(2.5);

        let mut input = InputState::default();
        input.forward = true;
        controller.apply(&mut camera, &input, 0.5);
        assert!((camera.position.z - (-1.25)).abs() < 1e-6);

        let mut input = InputState::default();
        input.right = true;
        controller.apply(&mut camera, &input, 0.2);
        assert!((camera.position.x - 0.5).abs() < 1e-6);

        let mut input = InputState::default();
        input.sink = true;
        controller.apply(&mut camera, &input, 0.4);
        assert!((camera.position.y - (-1.0)).abs() < 1e-6);
    }
}
