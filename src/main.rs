pub mod animation;
pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod render_system;
pub mod scenes;
pub mod shaders;
pub mod textures;
pub mod transform;

use std::time::Instant;

use fast_log::Config;
use winit::event::{Event, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

use camera::InputState;
use render_system::RenderSystem;
use scenes::{figure::FigureScene, room::RoomScene, FrameContext, SceneManager};

fn main() {
    fast_log::init(Config::new().console()).expect("Failed to initialise logging");

    let event_loop = EventLoop::new();
    let (mut render_system, mut previous_frame_end) = RenderSystem::new(&event_loop);

    let mut scene_manager = SceneManager::new();
    scene_manager.add_scene(Box::new(FigureScene::new()));
    scene_manager.add_scene(Box::new(RoomScene::new()));

    let mut input = InputState::default();
    let started = Instant::now();
    let mut last_frame = started;

    log::info!("entering render loop");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                *control_flow = ControlFlow::Exit;
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(_),
                ..
            } => {
                render_system.mark_needs_redraw();
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput {
                    input: key_input, ..
                },
                ..
            } => {
                if key_input.virtual_keycode == Some(VirtualKeyCode::Escape) {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                input.process_keyboard(&key_input);
                scene_manager.switch_scene_by_key(key_input);
            }
            Event::MainEventsCleared => {
                let now = Instant::now();
                let frame = FrameContext {
                    wall_seconds: now.duration_since(started).as_secs_f32(),
                    delta_seconds: now.duration_since(last_frame).as_secs_f32(),
                    input: &input,
                };
                last_frame = now;

                let scene = scene_manager.active_scene();
                scene.update(&frame);

                render_system.start_frame();
                scene.draw(&mut render_system);
                render_system.finish_frame(&mut previous_frame_end);
            }
            _ => {}
        }
    });
}
