use nalgebra_glm::{TMat4, TVec3};

use std::sync::Arc;
use vulkano_win::VkSurfaceBuild;

use winit::{
    dpi::LogicalSize,
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

use vulkano::{
    buffer::{
        allocator::{SubbufferAllocator, SubbufferAllocatorCreateInfo},
        Buffer, BufferCreateInfo, BufferUsage, Subbuffer,
    },
    command_buffer::{
        allocator::{StandardCommandBufferAllocator, StandardCommandBufferAllocatorCreateInfo},
        AutoCommandBufferBuilder, CommandBufferUsage, PrimaryAutoCommandBuffer,
        RenderPassBeginInfo, SubpassContents,
    },
    descriptor_set::{
        allocator::StandardDescriptorSetAllocator, PersistentDescriptorSet, WriteDescriptorSet,
    },
    device::{
        physical::PhysicalDeviceType, Device, DeviceCreateInfo, DeviceExtensions, Queue,
        QueueCreateInfo, QueueFlags,
    },
    format::{ClearValue, Format},
    image::{view::ImageView, AttachmentImage, ImageAccess, ImageUsage, SwapchainImage},
    instance::{Instance, InstanceCreateInfo},
    memory::allocator::{AllocationCreateInfo, MemoryUsage, StandardMemoryAllocator},
    pipeline::{
        graphics::{
            depth_stencil::DepthStencilState,
            input_assembly::{InputAssemblyState, PrimitiveTopology},
            rasterization::RasterizationState,
            vertex_input::Vertex,
            viewport::{Viewport, ViewportState},
        },
        GraphicsPipeline, Pipeline, PipelineBindPoint,
    },
    render_pass::{Framebuffer, FramebufferCreateInfo, RenderPass, Subpass},
    swapchain::{
        self, AcquireError, PresentMode, Swapchain, SwapchainAcquireFuture, SwapchainCreateInfo,
        SwapchainCreationError, SwapchainPresentInfo,
    },
    sync::{self, FlushError, GpuFuture},
    VulkanLibrary,
};

use crate::{
    animation::AnimationState,
    geometry::{self, Vert},
    lighting::{LightRig, Material},
    scenes::{SceneObject, Topology},
    shaders::{mesh_frag, mesh_vert, phong_frag, phong_vert},
    textures::TextureLibrary,
};

const TITLE: &str = "RS SCENE";
const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

const UNCAPPED_FPS: bool = false;

pub fn gen_framebuffers(
    images: &[Arc<SwapchainImage>],
    render_pass: &Arc<RenderPass>,
    depth_buffer: &Arc<ImageView<AttachmentImage>>,
) -> Vec<Arc<Framebuffer>> {
    images
        .iter()
        .map(|image| {
            let view = ImageView::new_default(image.clone()).unwrap();
            Framebuffer::new(
                render_pass.clone(),
                FramebufferCreateInfo {
                    attachments: vec![view, depth_buffer.clone()],
                    ..Default::default()
                },
            )
            .unwrap()
        })
        .collect::<Vec<_>>()
}

pub fn build_mesh_pipeline(
    device: Arc<Device>,
    subpass: Subpass,
    viewport: Viewport,
    topology: PrimitiveTopology,
) -> Arc<GraphicsPipeline> {
    let mesh_vert_s = mesh_vert::load(device.clone()).unwrap();
    let mesh_frag_s = mesh_frag::load(device.clone()).unwrap();
    GraphicsPipeline::start()
        .vertex_input_state(Vert::per_vertex())
        .vertex_shader(mesh_vert_s.entry_point("main").unwrap(), ())
        .input_assembly_state(InputAssemblyState::new().topology(topology))
        .viewport_state(ViewportState::viewport_fixed_scissor_irrelevant([viewport]))
        .fragment_shader(mesh_frag_s.entry_point("main").unwrap(), ())
        .depth_stencil_state(DepthStencilState::simple_depth_test())
        .rasterization_state(RasterizationState::new())
        .render_pass(subpass)
        .build(device)
        .unwrap()
}

pub fn build_phong_pipeline(
    device: Arc<Device>,
    subpass: Subpass,
    viewport: Viewport,
    topology: PrimitiveTopology,
) -> Arc<GraphicsPipeline> {
    let phong_vert_s = phong_vert::load(device.clone()).unwrap();
    let phong_frag_s = phong_frag::load(device.clone()).unwrap();
    GraphicsPipeline::start()
        .vertex_input_state(Vert::per_vertex())
        .vertex_shader(phong_vert_s.entry_point("main").unwrap(), ())
        .input_assembly_state(InputAssemblyState::new().topology(topology))
        .viewport_state(ViewportState::viewport_fixed_scissor_irrelevant([viewport]))
        .fragment_shader(phong_frag_s.entry_point("main").unwrap(), ())
        .depth_stencil_state(DepthStencilState::simple_depth_test())
        .rasterization_state(RasterizationState::new())
        .render_pass(subpass)
        .build(device)
        .unwrap()
}

pub struct RenderSystem {
    pub constants: RendererConstants,
    pub render_stage: RenderStage,

    window: Arc<Window>,
    viewport: Viewport,
    device: Arc<Device>,
    queue: Arc<Queue>,
    swapchain: Arc<Swapchain>,
    images: Vec<Arc<SwapchainImage>>,
    framebuffers: Vec<Arc<Framebuffer>>,

    render_pass: Arc<RenderPass>,
    subpass: Subpass,

    mesh_list_pipeline: Arc<GraphicsPipeline>,
    mesh_fan_pipeline: Arc<GraphicsPipeline>,
    phong_list_pipeline: Arc<GraphicsPipeline>,
    phong_fan_pipeline: Arc<GraphicsPipeline>,

    memory_allocator: Arc<StandardMemoryAllocator>,
    descriptor_set_allocator: StandardDescriptorSetAllocator,
    command_buffer_allocator: StandardCommandBufferAllocator,

    vp_buffer_allocator: SubbufferAllocator,
    model_buffer_allocator: SubbufferAllocator,
    light_buffer_allocator: SubbufferAllocator,
    material_buffer_allocator: SubbufferAllocator,

    vertex_buffer: Subbuffer<[Vert]>,
    textures: TextureLibrary,

    depth_buffer: Arc<ImageView<AttachmentImage>>,

    frame_matrices: Option<(TMat4<f32>, TMat4<f32>)>,
    mesh_frame_set: Option<Arc<PersistentDescriptorSet>>,
    phong_frame_set: Option<Arc<PersistentDescriptorSet>>,

    commands: Option<AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>>,
    current_image_index: u32,
    acquire_future: Option<SwapchainAcquireFuture>,
}

pub struct RendererConstants {
    /// Clear values matching the render pass attachments, in order.
    clear_values: Vec<Option<ClearValue>>,

    /// The extensions we want to make use of within Vulkan.
    default_vulkan_extensions: DeviceExtensions,
}

#[derive(Debug, Clone)]
pub enum RenderStage {
    Stopped,
    Drawing,
    NeedsRedraw,
}

impl RenderSystem {
    const GLOBAL_CLEAR_COLOUR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    const INITIAL_RENDER_STAGE: RenderStage = RenderStage::Stopped;

    ///
    /// Create a new RenderSystem on the given EventLoop: Vulkan instance,
    /// device, swapchain, the four scene pipelines, and the one shared
    /// vertex buffer and texture set, uploaded before the first frame.
    ///
    pub fn new(event_loop: &EventLoop<()>) -> (Self, Option<Box<dyn GpuFuture>>) {
        let library = VulkanLibrary::new().expect("Failed to load vulkan library");
        let required_extensions = vulkano_win::required_extensions(&library);

        let instance = Instance::new(
            library,
            InstanceCreateInfo {
                enabled_extensions: required_extensions,
                ..Default::default()
            },
        )
        .unwrap();

        let constants = RendererConstants {
            clear_values: vec![
                Some(Self::GLOBAL_CLEAR_COLOUR.into()), // colour, 0
                Some(1.0.into()),                       // depth, 1
            ],
            default_vulkan_extensions: DeviceExtensions {
                khr_swapchain: true,
                ..DeviceExtensions::empty()
            },
        };

        let surface = WindowBuilder::new()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(WIDTH, HEIGHT))
            .build_vk_surface(event_loop, instance.clone())
            .unwrap();

        let window = surface
            .object()
            .unwrap()
            .clone()
            .downcast::<Window>()
            .unwrap();

        let viewport = Viewport {
            origin: [0.0, 0.0],
            dimensions: window.inner_size().into(),
            depth_range: 0.0..1.0,
        };

        let (physical_device, queue_index) = instance
            .enumerate_physical_devices()
            .expect("Failed to enumerate physical devices")
            .filter(|device| {
                device
                    .supported_extensions()
                    .contains(&constants.default_vulkan_extensions)
            })
            .filter_map(|device| {
                device
                    .queue_family_properties()
                    .iter()
                    .enumerate()
                    .position(|(index, queue_props)| {
                        queue_props.queue_flags.contains(QueueFlags::GRAPHICS)
                            && device
                                .surface_support(index as u32, &surface)
                                .unwrap_or(false)
                    })
                    .map(|queue_index| (device, queue_index as u32))
            })
            .min_by_key(|(device, _)| match device.properties().device_type {
                PhysicalDeviceType::DiscreteGpu => 0,
                PhysicalDeviceType::IntegratedGpu => 1,
                PhysicalDeviceType::VirtualGpu => 2,
                PhysicalDeviceType::Cpu => 3,
                _ => 4,
            })
            .expect("No device found");

        let (device, mut queues) = Device::new(
            physical_device.clone(),
            DeviceCreateInfo {
                queue_create_infos: vec![QueueCreateInfo {
                    queue_family_index: queue_index,
                    ..Default::default()
                }],
                enabled_extensions: constants.default_vulkan_extensions,
                ..Default::default()
            },
        )
        .expect("Failed to create device");

        let queue = queues.next().unwrap();

        let (swapchain, images) = {
            let image_format = Some(
                physical_device
                    .surface_formats(&surface, Default::default())
                    .unwrap()[0]
                    .0,
            );

            let window_dimensions = window.inner_size();

            let device_capabilities = physical_device
                .surface_capabilities(&surface, Default::default())
                .expect("Failed to get surface capabilities.");

            let alpha = device_capabilities
                .supported_composite_alpha
                .into_iter()
                .next()
                .unwrap();

            Swapchain::new(
                device.clone(),
                surface.clone(),
                SwapchainCreateInfo {
                    min_image_count: device_capabilities.min_image_count + 1,
                    image_format,
                    image_extent: window_dimensions.into(),
                    image_usage: ImageUsage::COLOR_ATTACHMENT,
                    composite_alpha: alpha,
                    present_mode: if UNCAPPED_FPS {
                        PresentMode::Immediate
                    } else {
                        PresentMode::Fifo
                    },
                    ..Default::default()
                },
            )
            .unwrap()
        };

        // Allocators
        let memory_allocator = Arc::new(StandardMemoryAllocator::new_default(device.clone()));
        let descriptor_set_allocator = StandardDescriptorSetAllocator::new(device.clone());

        let command_buffer_allocator = StandardCommandBufferAllocator::new(
            device.clone(),
            StandardCommandBufferAllocatorCreateInfo::default(),
        );

        let uniform_allocator = || {
            SubbufferAllocator::new(
                memory_allocator.clone(),
                SubbufferAllocatorCreateInfo {
                    buffer_usage: BufferUsage::UNIFORM_BUFFER,
                    memory_usage: MemoryUsage::Upload,
                    ..Default::default()
                },
            )
        };

        let vp_buffer_allocator = uniform_allocator();
        let model_buffer_allocator = uniform_allocator();
        let light_buffer_allocator = uniform_allocator();
        let material_buffer_allocator = uniform_allocator();

        // The one shared vertex buffer both scenes draw ranges of.
        let vertex_buffer = Buffer::from_iter(
            &memory_allocator,
            BufferCreateInfo {
                usage: BufferUsage::VERTEX_BUFFER,
                ..Default::default()
            },
            AllocationCreateInfo {
                usage: MemoryUsage::Upload,
                ..Default::default()
            },
            geometry::scene_vertices(),
        )
        .unwrap();

        // Textures go to device memory through a one-off upload submission.
        let mut uploads = AutoCommandBufferBuilder::primary(
            &command_buffer_allocator,
            queue.queue_family_index(),
            CommandBufferUsage::OneTimeSubmit,
        )
        .expect("Unable to create Command Buffer Builder!");

        let textures = TextureLibrary::load(device.clone(), &memory_allocator, &mut uploads);

        let upload_buffer = uploads.build().unwrap();
        sync::now(device.clone())
            .then_execute(queue.clone(), upload_buffer)
            .unwrap()
            .then_signal_fence_and_flush()
            .unwrap()
            .wait(None)
            .expect("Failed to upload textures");

        let render_pass = vulkano::single_pass_renderpass!(
            device.clone(),
            attachments: {
                color: {
                    load: Clear,
                    store: Store,
                    format: swapchain.image_format(),
                    samples: 1,
                },
                depth: {
                    load: Clear,
                    store: DontCare,
                    format: Format::D16_UNORM,
                    samples: 1,
                }
            },
            pass: {
                color: [color],
                depth_stencil: {depth},
            }
        )
        .unwrap();
        let subpass = Subpass::from(render_pass.clone(), 0).unwrap();

        let image_dimensions = images[0].dimensions().width_height();

        let depth_buffer = ImageView::new_default(
            AttachmentImage::transient(&memory_allocator, image_dimensions, Format::D16_UNORM)
                .unwrap(),
        )
        .unwrap();

        let framebuffers = gen_framebuffers(&images, &render_pass, &depth_buffer);

        let mesh_list_pipeline = build_mesh_pipeline(
            device.clone(),
            subpass.clone(),
            viewport.clone(),
            PrimitiveTopology::TriangleList,
        );
        let mesh_fan_pipeline = build_mesh_pipeline(
            device.clone(),
            subpass.clone(),
            viewport.clone(),
            PrimitiveTopology::TriangleFan,
        );
        let phong_list_pipeline = build_phong_pipeline(
            device.clone(),
            subpass.clone(),
            viewport.clone(),
            PrimitiveTopology::TriangleList,
        );
        let phong_fan_pipeline = build_phong_pipeline(
            device.clone(),
            subpass.clone(),
            viewport.clone(),
            PrimitiveTopology::TriangleFan,
        );

        let previous_frame_end = Some(Box::new(sync::now(device.clone())) as Box<dyn GpuFuture>);

        let rs = RenderSystem {
            window,
            viewport,
            queue,
            device,
            swapchain,
            images,
            framebuffers,

            render_pass,
            subpass,

            mesh_list_pipeline,
            mesh_fan_pipeline,
            phong_list_pipeline,
            phong_fan_pipeline,

            memory_allocator,
            descriptor_set_allocator,
            command_buffer_allocator,

            vp_buffer_allocator,
            model_buffer_allocator,
            light_buffer_allocator,
            material_buffer_allocator,

            vertex_buffer,
            textures,

            depth_buffer,

            frame_matrices: None,
            mesh_frame_set: None,
            phong_frame_set: None,

            constants,

            render_stage: Self::INITIAL_RENDER_STAGE,
            commands: None,
            current_image_index: 0,
            acquire_future: None,
        };

        (rs, previous_frame_end)
    }

    pub fn aspect_ratio(&self) -> f32 {
        let extent: [u32; 2] = self.window.inner_size().into();
        extent[0] as f32 / extent[1] as f32
    }

    /// Queue a swapchain rebuild before the next frame starts.
    pub fn mark_needs_redraw(&mut self) {
        self.render_stage = RenderStage::NeedsRedraw;
    }

    pub fn start_frame(&mut self) {
        match self.render_stage {
            RenderStage::Stopped => {
                self.render_stage = RenderStage::Drawing;
            }
            RenderStage::NeedsRedraw => {
                self.recreate_swapchain();
                self.commands = None;
                self.render_stage = RenderStage::Stopped;
                return;
            }
            _ => {
                log::error!("Render system is in an invalid state. Stopping frame.");
                self.render_stage = RenderStage::Stopped;
                self.commands = None;
                return;
            }
        }

        self.frame_matrices = None;
        self.mesh_frame_set = None;
        self.phong_frame_set = None;

        let (image_index, suboptimal, acquire_future) =
            match swapchain::acquire_next_image(self.swapchain.clone(), None) {
                Ok(r) => r,
                Err(AcquireError::OutOfDate) => {
                    self.recreate_swapchain();
                    self.render_stage = RenderStage::Stopped;
                    return;
                }
                Err(e) => panic!("Failed to acquire next image: {e}"),
            };

        if suboptimal {
            log::warn!("Suboptimal swapchain. Recreate next frame.");
            self.recreate_swapchain();
        }

        let mut command_buffer = AutoCommandBufferBuilder::primary(
            &self.command_buffer_allocator,
            self.queue.queue_family_index(),
            CommandBufferUsage::OneTimeSubmit,
        )
        .expect("Unable to create Command Buffer Builder!");

        command_buffer
            .begin_render_pass(
                RenderPassBeginInfo {
                    clear_values: self.constants.clear_values.clone(),
                    ..RenderPassBeginInfo::framebuffer(
                        self.framebuffers[image_index as usize].clone(),
                    )
                },
                SubpassContents::Inline,
            )
            .unwrap();

        self.commands = Some(command_buffer);
        self.current_image_index = image_index;
        self.acquire_future = Some(acquire_future);
    }

    /// Upload the view and projection matrices for this frame. Must be
    /// called before any object is drawn.
    pub fn set_camera(&mut self, view: TMat4<f32>, projection: TMat4<f32>) {
        if !matches!(self.render_stage, RenderStage::Drawing) {
            return;
        }

        let vp_buffer: Subbuffer<mesh_vert::VpData> =
            self.vp_buffer_allocator.allocate_sized().unwrap();
        *vp_buffer.write().unwrap() = mesh_vert::VpData {
            view: view.into(),
            projection: projection.into(),
        };

        let vp_layout = self.mesh_list_pipeline.layout().set_layouts().get(0).unwrap();
        self.mesh_frame_set = Some(
            PersistentDescriptorSet::new(
                &self.descriptor_set_allocator,
                vp_layout.clone(),
                [WriteDescriptorSet::buffer(0, vp_buffer)],
            )
            .unwrap(),
        );

        self.frame_matrices = Some((view, projection));
        self.phong_frame_set = None;
    }

    /// Upload the light rig and eye position for this frame. Lit objects
    /// drawn without this are skipped.
    pub fn set_lights(&mut self, rig: &LightRig, camera_position: TVec3<f32>) {
        if !matches!(self.render_stage, RenderStage::Drawing) {
            return;
        }

        let (view, projection) = match self.frame_matrices {
            Some(matrices) => matrices,
            None => {
                log::error!("set_lights called before set_camera");
                return;
            }
        };

        let vp_buffer: Subbuffer<phong_vert::VpData> =
            self.vp_buffer_allocator.allocate_sized().unwrap();
        *vp_buffer.write().unwrap() = phong_vert::VpData {
            view: view.into(),
            projection: projection.into(),
        };

        let light_buffer: Subbuffer<phong_frag::LightData> =
            self.light_buffer_allocator.allocate_sized().unwrap();
        *light_buffer.write().unwrap() = phong_frag::LightData {
            camera_position: [camera_position.x, camera_position.y, camera_position.z, 1.0],
            point_position: [
                rig.point_position.x,
                rig.point_position.y,
                rig.point_position.z,
                1.0,
            ],
            spot_position: [
                rig.spot_position.x,
                rig.spot_position.y,
                rig.spot_position.z,
                1.0,
            ],
        };

        let frame_layout = self
            .phong_list_pipeline
            .layout()
            .set_layouts()
            .get(0)
            .unwrap();
        self.phong_frame_set = Some(
            PersistentDescriptorSet::new(
                &self.descriptor_set_allocator,
                frame_layout.clone(),
                [
                    WriteDescriptorSet::buffer(0, vp_buffer),
                    WriteDescriptorSet::buffer(1, light_buffer),
                ],
            )
            .unwrap(),
        );
    }

    /// Draw one entry of a scene table: build its model matrix from the
    /// recipe and the animation flags, then issue every span with its
    /// own texture and topology.
    pub fn draw_object(&mut self, object: &SceneObject, animation: &AnimationState) {
        if !matches!(self.render_stage, RenderStage::Drawing) {
            return;
        }

        let (model, normals) = object.transform.matrices(animation);

        let mut commands = self.commands.take().unwrap();
        match &object.material {
            Some(material) => {
                self.record_phong_spans(&mut commands, object, model, normals, material)
            }
            None => self.record_mesh_spans(&mut commands, object, model),
        }
        self.commands = Some(commands);
    }

    fn record_mesh_spans(
        &self,
        commands: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        object: &SceneObject,
        model: TMat4<f32>,
    ) {
        let frame_set = match &self.mesh_frame_set {
            Some(set) => set.clone(),
            None => {
                log::error!("object drawn before set_camera; skipping");
                return;
            }
        };

        let model_buffer: Subbuffer<mesh_vert::ModelData> =
            self.model_buffer_allocator.allocate_sized().unwrap();
        *model_buffer.write().unwrap() = mesh_vert::ModelData {
            model: model.into(),
        };

        for span in &object.parts {
            let pipeline = match span.topology {
                Topology::TriangleList => self.mesh_list_pipeline.clone(),
                Topology::TriangleFan => self.mesh_fan_pipeline.clone(),
            };

            let span_layout = pipeline.layout().set_layouts().get(1).unwrap();
            let span_set = PersistentDescriptorSet::new(
                &self.descriptor_set_allocator,
                span_layout.clone(),
                [
                    WriteDescriptorSet::buffer(0, model_buffer.clone()),
                    WriteDescriptorSet::image_view_sampler(
                        1,
                        self.textures.view(span.texture),
                        self.textures.sampler(),
                    ),
                ],
            )
            .unwrap();

            commands
                .bind_pipeline_graphics(pipeline.clone())
                .bind_descriptor_sets(
                    PipelineBindPoint::Graphics,
                    pipeline.layout().clone(),
                    0,
                    (frame_set.clone(), span_set),
                )
                .bind_vertex_buffers(0, self.vertex_buffer.clone())
                .draw(span.range.count, 1, span.range.first, 0)
                .expect("Failed to draw vertex range!");
        }
    }

    fn record_phong_spans(
        &self,
        commands: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        object: &SceneObject,
        model: TMat4<f32>,
        normals: TMat4<f32>,
        material: &Material,
    ) {
        let frame_set = match &self.phong_frame_set {
            Some(set) => set.clone(),
            None => {
                log::error!("lit object drawn before set_lights; skipping");
                return;
            }
        };

        let model_buffer: Subbuffer<phong_vert::ModelData> =
            self.model_buffer_allocator.allocate_sized().unwrap();
        *model_buffer.write().unwrap() = phong_vert::ModelData {
            model: model.into(),
            normals: normals.into(),
        };

        let material_buffer: Subbuffer<phong_frag::MaterialData> =
            self.material_buffer_allocator.allocate_sized().unwrap();
        *material_buffer.write().unwrap() = phong_frag::MaterialData {
            specular_intensity: [
                material.specular_intensity[0],
                material.specular_intensity[1],
                material.specular_intensity[2],
                1.0,
            ],
            ambient_component: material.ambient,
            diffuse_component: material.diffuse,
            specular_component: material.specular,
            shine: material.shine,
        };

        for span in &object.parts {
            let pipeline = match span.topology {
                Topology::TriangleList => self.phong_list_pipeline.clone(),
                Topology::TriangleFan => self.phong_fan_pipeline.clone(),
            };

            let span_layout = pipeline.layout().set_layouts().get(1).unwrap();
            let span_set = PersistentDescriptorSet::new(
                &self.descriptor_set_allocator,
                span_layout.clone(),
                [
                    WriteDescriptorSet::buffer(0, model_buffer.clone()),
                    WriteDescriptorSet::buffer(1, material_buffer.clone()),
                    WriteDescriptorSet::image_view_sampler(
                        2,
                        self.textures.view(span.texture),
                        self.textures.sampler(),
                    ),
                ],
            )
            .unwrap();

            commands
                .bind_pipeline_graphics(pipeline.clone())
                .bind_descriptor_sets(
                    PipelineBindPoint::Graphics,
                    pipeline.layout().clone(),
                    0,
                    (frame_set.clone(), span_set),
                )
                .bind_vertex_buffers(0, self.vertex_buffer.clone())
                .draw(span.range.count, 1, span.range.first, 0)
                .expect("Failed to draw vertex range!");
        }
    }

    pub fn finish_frame(&mut self, previous_frame_end: &mut Option<Box<dyn GpuFuture>>) {
        match self.render_stage {
            RenderStage::Drawing => {}
            RenderStage::NeedsRedraw => {
                self.recreate_swapchain();
                self.commands = None;
                self.render_stage = RenderStage::Stopped;
                return;
            }
            _ => {
                self.commands = None;
                self.render_stage = RenderStage::Stopped;
                return;
            }
        }

        let mut commands = self.commands.take().unwrap();
        commands.end_render_pass().unwrap();
        let command_buffer = commands.build().unwrap();

        let af = self.acquire_future.take().unwrap();

        let mut local_future: Option<Box<dyn GpuFuture>> =
            Some(Box::new(sync::now(self.device.clone())) as Box<dyn GpuFuture>);

        std::mem::swap(&mut local_future, previous_frame_end);

        let future = local_future
            .take()
            .unwrap()
            .join(af)
            .then_execute(self.queue.clone(), command_buffer)
            .unwrap()
            .then_swapchain_present(
                self.queue.clone(),
                SwapchainPresentInfo::swapchain_image_index(
                    self.swapchain.clone(),
                    self.current_image_index,
                ),
            )
            .then_signal_fence_and_flush();

        match future {
            Ok(future) => {
                *previous_frame_end = Some(Box::new(future) as Box<_>);
            }
            Err(FlushError::OutOfDate) => {
                self.recreate_swapchain();
                *previous_frame_end = Some(Box::new(sync::now(self.device.clone())) as Box<_>);
            }
            Err(e) => {
                log::error!("Failed to flush future: {:?}", e);
                *previous_frame_end = Some(Box::new(sync::now(self.device.clone())) as Box<_>);
            }
        }

        self.commands = None;
        self.render_stage = RenderStage::Stopped;
    }

    pub fn recreate_swapchain(&mut self) {
        let new_dimensions = self.window.inner_size();

        let (new_swapchain, new_images) = match self.swapchain.recreate(SwapchainCreateInfo {
            image_extent: new_dimensions.into(),
            ..self.swapchain.create_info()
        }) {
            Ok(r) => r,
            Err(SwapchainCreationError::ImageExtentNotSupported { .. }) => return,
            Err(e) => panic!("Failed to recreate swapchain: {e}"),
        };

        self.swapchain = new_swapchain;
        self.images = new_images;

        let new_depth_dimensions = self.images[0].dimensions().width_height();

        self.depth_buffer = ImageView::new_default(
            AttachmentImage::transient(
                &self.memory_allocator,
                new_depth_dimensions,
                Format::D16_UNORM,
            )
            .unwrap(),
        )
        .unwrap();

        self.framebuffers = gen_framebuffers(&self.images, &self.render_pass, &self.depth_buffer);

        self.viewport.dimensions = new_dimensions.into();

        self.mesh_list_pipeline = build_mesh_pipeline(
            self.device.clone(),
            self.subpass.clone(),
            self.viewport.clone(),
            PrimitiveTopology::TriangleList,
        );
        self.mesh_fan_pipeline = build_mesh_pipeline(
            self.device.clone(),
            self.subpass.clone(),
            self.viewport.clone(),
            PrimitiveTopology::TriangleFan,
        );
        self.phong_list_pipeline = build_phong_pipeline(
            self.device.clone(),
            self.subpass.clone(),
            self.viewport.clone(),
            PrimitiveTopology::TriangleList,
        );
        self.phong_fan_pipeline = build_phong_pipeline(
            self.device.clone(),
            self.subpass.clone(),
            self.viewport.clone(),
            PrimitiveTopology::TriangleFan,
        );
    }
}
