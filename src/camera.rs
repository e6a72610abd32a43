//! Camera math and GPU uniforms.
//!
//! A camera is an ordinary scene node: its position and orientation live in the
//! node's [`Instance`] and its lens in a [`Projection`]. The helpers here move
//! and aim such a transform the way a perspective camera does: it looks down
//! its local -Z axis with +Y up.

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

use crate::data_structures::instance::Instance;

// cgmath produces OpenGL clip space (z in -1..1), wgpu expects z in 0..1
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Perspective lens: vertical field of view, aspect ratio and clip planes.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Recomputes the aspect ratio for a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// The camera's local X axis in world space.
pub fn right(transform: &Instance) -> Vector3<f32> {
    transform.rotation_matrix().x
}

/// The direction the camera looks at (its local -Z axis) in world space.
pub fn forward(transform: &Instance) -> Vector3<f32> {
    -transform.rotation_matrix().z
}

/// Moves along the camera's local X axis, like a sideways step.
pub fn translate_x(transform: &mut Instance, distance: f32) {
    transform.position += right(transform) * distance;
}

/// Rotates the camera so that its -Z axis points at `target`, keeping world +Y up.
///
/// Does nothing when the camera sits on the target.
pub fn look_at(transform: &mut Instance, target: Point3<f32>) {
    let eye = Point3::new(
        transform.position.x,
        transform.position.y,
        transform.position.z,
    );
    let back = eye - target;
    if back.magnitude2() == 0.0 {
        return;
    }
    let z = back.normalize();
    let mut x = Vector3::unit_y().cross(z);
    if x.magnitude2() == 0.0 {
        // looking straight up or down: nudge z so that "up" is defined again
        let nudged = Vector3::new(z.x + 0.0001, z.y, z.z).normalize();
        x = Vector3::unit_y().cross(nudged);
    }
    let x = x.normalize();
    let y = z.cross(x);
    transform.set_rotation_from_matrix(&Matrix3::from_cols(x, y, z));
}

/// Inverse of the camera's world transform (scale is ignored).
pub fn view_matrix(transform: &Instance) -> Matrix4<f32> {
    Matrix4::from(transform.rotation_matrix().transpose())
        * Matrix4::from_translation(-transform.position)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, transform: &Instance, projection: &Projection) {
        self.view_position = transform.position.extend(1.0).into();
        self.view_proj = (projection.calc_matrix() * view_matrix(transform)).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU resources holding the camera uniform.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = CameraUniform::new();

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, transform: &Instance, projection: &Projection) {
        self.uniform.update_view_proj(transform, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
