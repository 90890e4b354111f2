use bytemuck::{Pod, Zeroable};
use std::f32::consts::FRAC_1_SQRT_2;
use vulkano::pipeline::graphics::vertex_input::Vertex;

/// One entry of the shared vertex buffer. The byte layout (size 36,
/// offsets 0/12/16/24) is what the pipelines declare via `per_vertex`,
/// so the two can never drift apart.
#[derive(Clone, Copy, Debug, Default, Vertex, Zeroable, Pod)]
#[repr(C)]
pub struct Vert {
    #[format(R32G32B32_SFLOAT)]
    pub position: [f32; 3],
    #[format(R8G8B8A8_UNORM)]
    pub colour: [u8; 4],
    #[format(R32G32_SFLOAT)]
    pub uv: [f32; 2],
    #[format(R32G32B32_SFLOAT)]
    pub normal: [f32; 3],
}

/// A window into the shared vertex buffer, addressed in vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexRange {
    pub first: u32,
    pub count: u32,
}

pub const VERTEX_COUNT: usize = 78;

/// Unit cube (±1), six faces of two triangles.
pub const CUBE: VertexRange = VertexRange { first: 0, count: 36 };
pub const CUBE_FRONT: VertexRange = VertexRange { first: 0, count: 6 };
pub const CUBE_BACK: VertexRange = VertexRange { first: 6, count: 6 };
pub const CUBE_SIDES: VertexRange = VertexRange { first: 12, count: 24 };
/// Trapezoid quad in the z = 0 plane.
pub const QUAD: VertexRange = VertexRange { first: 36, count: 6 };
/// Crate (±0.5), six faces of four vertices, each drawn as a triangle fan.
pub const CRATE_FACES: [VertexRange; 6] = [
    VertexRange { first: 42, count: 4 },
    VertexRange { first: 46, count: 4 },
    VertexRange { first: 50, count: 4 },
    VertexRange { first: 54, count: 4 },
    VertexRange { first: 58, count: 4 },
    VertexRange { first: 62, count: 4 },
];
/// Four-triangle pyramid roof sharing the apex (0, 1, 0).
pub const HAT: VertexRange = VertexRange { first: 66, count: 12 };

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const GREY: [u8; 4] = [128, 128, 128, 255];
const MAGENTA: [u8; 4] = [255, 0, 255, 255];

const HAT_APEX: [f32; 3] = [0.0, 1.0, 0.0];

const fn v(position: [f32; 3], colour: [u8; 4], uv: [f32; 2], normal: [f32; 3]) -> Vert {
    Vert {
        position,
        colour,
        uv,
        normal,
    }
}

/// Two triangles for one rectangular face, emitted in the order
/// bl, br, tr, bl, tl, tr. Colours are given per corner role.
fn tri_face(
    bl: [f32; 3],
    br: [f32; 3],
    tr: [f32; 3],
    tl: [f32; 3],
    colours: [[u8; 4]; 4],
    normal: [f32; 3],
) -> [Vert; 6] {
    [
        v(bl, colours[0], [0.0, 0.0], normal),
        v(br, colours[1], [1.0, 0.0], normal),
        v(tr, colours[2], [1.0, 1.0], normal),
        v(bl, colours[0], [0.0, 0.0], normal),
        v(tl, colours[3], [0.0, 1.0], normal),
        v(tr, colours[2], [1.0, 1.0], normal),
    ]
}

/// Four corners of one face, fanned around the first vertex.
fn fan_face(
    bl: [f32; 3],
    br: [f32; 3],
    tr: [f32; 3],
    tl: [f32; 3],
    colours: [[u8; 4]; 4],
    normal: [f32; 3],
) -> [Vert; 4] {
    [
        v(bl, colours[0], [0.0, 0.0], normal),
        v(br, colours[1], [1.0, 0.0], normal),
        v(tr, colours[2], [1.0, 1.0], normal),
        v(tl, colours[3], [0.0, 1.0], normal),
    ]
}

/// One slope of the hat: two base corners and the shared apex.
fn hat_tri(a: [f32; 3], b: [f32; 3], normal: [f32; 3]) -> [Vert; 3] {
    [
        v(a, BLACK, [0.0, 0.0], normal),
        v(b, BLACK, [0.0, 1.0], normal),
        v(HAT_APEX, BLUE, [0.5, 1.0], normal),
    ]
}

/// The full 78-vertex table shared by both scenes, in buffer order.
pub fn scene_vertices() -> Vec<Vert> {
    let cube = [RED, GREEN, BLUE, GREEN];
    let s = FRAC_1_SQRT_2;

    let mut verts = Vec::with_capacity(VERTEX_COUNT);

    // Unit cube, ±1 on every axis.
    verts.extend(tri_face(
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        cube,
        [0.0, 0.0, -1.0],
    ));
    verts.extend(tri_face(
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
        cube,
        [0.0, 0.0, 1.0],
    ));
    verts.extend(tri_face(
        [-1.0, -1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, 1.0, 1.0],
        [-1.0, 1.0, -1.0],
        cube,
        [-1.0, 0.0, 0.0],
    ));
    verts.extend(tri_face(
        [1.0, -1.0, 1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [1.0, 1.0, 1.0],
        cube,
        [1.0, 0.0, 0.0],
    ));
    verts.extend(tri_face(
        [-1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        cube,
        [0.0, 1.0, 0.0],
    ));
    verts.extend(tri_face(
        [1.0, -1.0, 1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        cube,
        [0.0, -1.0, 0.0],
    ));

    // Trapezoid quad.
    verts.extend(tri_face(
        [-0.5, -1.0, 0.0],
        [0.5, -1.0, 0.0],
        [0.3, 0.0, 0.0],
        [-0.3, 0.0, 0.0],
        [GREY; 4],
        [0.0, 0.0, 1.0],
    ));

    // Crate, ±0.5, one fan per face.
    verts.extend(fan_face(
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
        [MAGENTA, GREEN, BLUE, BLACK],
        [0.0, 0.0, 1.0],
    ));
    verts.extend(fan_face(
        [0.5, -0.5, 0.5],
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [0.5, 0.5, 0.5],
        [RED, BLUE, GREEN, BLACK],
        [1.0, 0.0, 0.0],
    ));
    verts.extend(fan_face(
        [0.5, -0.5, -0.5],
        [-0.5, -0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [0.5, 0.5, -0.5],
        [BLUE, BLACK, BLUE, BLACK],
        [0.0, 0.0, -1.0],
    ));
    verts.extend(fan_face(
        [-0.5, -0.5, -0.5],
        [-0.5, -0.5, 0.5],
        [-0.5, 0.5, 0.5],
        [-0.5, 0.5, -0.5],
        [BLUE, BLACK, BLUE, BLACK],
        [-1.0, 0.0, 0.0],
    ));
    verts.extend(fan_face(
        [-0.5, 0.5, 0.5],
        [0.5, 0.5, 0.5],
        [0.5, 0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [BLUE, BLACK, BLUE, BLACK],
        [0.0, 1.0, 0.0],
    ));
    verts.extend(fan_face(
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, -0.5, 0.5],
        [-0.5, -0.5, 0.5],
        [BLUE, BLACK, BLUE, BLACK],
        [0.0, -1.0, 0.0],
    ));

    // Hat slopes, wound around the apex.
    verts.extend(hat_tri([-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.0, s, s]));
    verts.extend(hat_tri([0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [s, s, 0.0]));
    verts.extend(hat_tri([0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [0.0, s, -s]));
    verts.extend(hat_tri([-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5], [-s, s, 0.0]));

    verts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn table_has_expected_length() {
        assert_eq!(scene_vertices().len(), VERTEX_COUNT);
    }

    #[test]
    fn ranges_are_contiguous_and_in_bounds() {
        let mut covered = 0u32;
        let mut runs: Vec<VertexRange> = vec![CUBE, QUAD];
        runs.extend(CRATE_FACES);
        runs.push(HAT);
        for range in runs {
            assert_eq!(range.first, covered);
            covered += range.count;
        }
        assert_eq!(covered as usize, VERTEX_COUNT);

        // The cube sub-ranges tile the cube run.
        assert_eq!(CUBE_FRONT.first + CUBE_FRONT.count, CUBE_BACK.first);
        assert_eq!(CUBE_BACK.first + CUBE_BACK.count, CUBE_SIDES.first);
        assert_eq!(
            CUBE_SIDES.first + CUBE_SIDES.count,
            CUBE.first + CUBE.count
        );
    }

    #[test]
    fn vertex_layout_matches_declared_offsets() {
        assert_eq!(size_of::<Vert>(), 36);
        assert_eq!(offset_of!(Vert, position), 0);
        assert_eq!(offset_of!(Vert, colour), 12);
        assert_eq!(offset_of!(Vert, uv), 16);
        assert_eq!(offset_of!(Vert, normal), 24);
    }

    #[test]
    fn hat_slopes_share_the_apex() {
        let verts = scene_vertices();
        for slope in 0..4 {
            let apex = verts[(HAT.first + slope * 3 + 2) as usize];
            assert_eq!(apex.position, HAT_APEX);
        }
    }

    #[test]
    fn crate_faces_are_fans_of_four() {
        for face in CRATE_FACES {
            assert_eq!(face.count, 4);
        }
    }
}
