use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Per-frame transforms as the vertex stage reads them: three column-major
/// `mat4x4<f32>`, 192 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniformBlock {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl TransformUniformBlock {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(world: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;

    #[test]
    fn block_holds_three_matrices() {
        assert_eq!(TransformUniformBlock::SIZE, 192);
        assert_eq!(TransformUniformBlock::SIZE % 16, 0);
    }

    #[test]
    fn matrices_are_packed_column_by_column() {
        let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let block = TransformUniformBlock::new(world, Mat4::IDENTITY, Mat4::IDENTITY);

        // Translation lives in the last column, which is the last 16 bytes of
        // the world matrix.
        assert_eq!(block.world[3], [1.0, 2.0, 3.0, 1.0]);

        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&block));
        assert_eq!(&floats[12..16], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(&floats[16..20], &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn columns_reproduce_the_cpu_transform() {
        let world = Mat4::from_rotation_y(0.3) * Mat4::from_translation(Vec3::new(0.5, -1.0, 2.0));
        let view = Mat4::look_at_lh(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_lh(std::f32::consts::FRAC_PI_4, 4.0 / 3.0, 0.1, 1000.0);
        let block = TransformUniformBlock::new(world, view, projection);

        // What the vertex stage computes: projection * view * world * position.
        let from_gpu = |m: [[f32; 4]; 4]| Mat4::from_cols_array_2d(&m);
        let p = Vec4::new(1.0, 1.0, 0.0, 1.0);
        let gpu = from_gpu(block.projection) * from_gpu(block.view) * from_gpu(block.world) * p;
        let cpu = projection * view * world * p;
        assert!(gpu.abs_diff_eq(cpu, 1e-5));
    }
}
