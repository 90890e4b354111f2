pub mod mesh_vert {
    vulkano_shaders::shader! {
        ty: "vertex",
        path: "src/shaders/mesh.vert"
    }
}

pub mod mesh_frag {
    vulkano_shaders::shader! {
        ty: "fragment",
        path: "src/shaders/mesh.frag"
    }
}

pub mod phong_vert {
    vulkano_shaders::shader! {
        ty: "vertex",
        path: "src/shaders/phong.vert"
    }
}

pub mod phong_frag {
    vulkano_shaders::shader! {
        ty: "fragment",
        path: "src/shaders/phong.frag"
    }
}
