use bytemuck::{Pod, Zeroable};

/// Position plus texture coordinate, tightly packed.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GeometryVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2], // origin top-left
}

impl GeometryVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub const fn new(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            tex_coord,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GeometryVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub const QUAD_VERTICES: [GeometryVertex; 4] = [
    GeometryVertex::new([-1.0, -1.0, 0.0], [0.0, 1.0]), // bottom left
    GeometryVertex::new([-1.0, 1.0, 0.0], [0.0, 0.0]),  // top left
    GeometryVertex::new([1.0, -1.0, 0.0], [1.0, 1.0]),  // bottom right
    GeometryVertex::new([1.0, 1.0, 0.0], [1.0, 0.0]),   // top right
];

/// Two clockwise triangles sharing the top-left/bottom-right diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

pub const QUAD_TOPOLOGY: wgpu::PrimitiveTopology = wgpu::PrimitiveTopology::TriangleList;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        let layout = GeometryVertex::layout();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.attributes.len(), 2);

        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);

        assert_eq!(layout.attributes[1].shader_location, 1);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x2);
    }

    #[test]
    fn quad_indices_reference_existing_vertices() {
        assert_eq!(QUAD_INDICES, [0, 1, 2, 2, 1, 3]);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_VERTICES.len()));
    }

    #[test]
    fn quad_lies_in_the_xy_plane_with_unit_uvs() {
        for v in QUAD_VERTICES {
            assert_eq!(v.position[2], 0.0);
            assert!(v.tex_coord.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn triangles_wind_clockwise_seen_from_negative_z() {
        // Viewed down +Z with +Y up (left-handed), clockwise means a negative
        // signed area in the XY plane.
        for tri in QUAD_INDICES.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| QUAD_VERTICES[tri[k] as usize].position);
            let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(area < 0.0, "triangle {tri:?} is counter-clockwise");
        }
    }

    #[test]
    fn top_left_vertex_samples_texture_origin() {
        let top_left = QUAD_VERTICES
            .iter()
            .find(|v| v.position[0] < 0.0 && v.position[1] > 0.0)
            .unwrap();
        assert_eq!(top_left.tex_coord, [0.0, 0.0]);
    }
}
