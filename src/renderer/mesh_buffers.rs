use anyhow::{Result, bail};
use surface3d::Mesh;

const NUM_BUFFERS: usize = 2;

/// Position and color vertex buffers for the graph mesh. Uploads go to the
/// buffer pair that is not being drawn, then become current.
pub struct MeshBuffers {
    positions: [wgpu::Buffer; NUM_BUFFERS],
    colors: [wgpu::Buffer; NUM_BUFFERS],

    current_buffer: usize,
    vertex_count: usize,
    capacity: usize,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Result<Self> {
        let size = buffer_size(capacity, device.limits().max_buffer_size)?;

        let positions = std::array::from_fn(|_| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Graph Position Buffer"),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let colors = std::array::from_fn(|_| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Graph Color Buffer"),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        Ok(Self {
            positions,
            colors,
            current_buffer: 0,
            vertex_count: 0,
            capacity,
        })
    }

    pub fn upload(&mut self, queue: &wgpu::Queue, mesh: &Mesh) {
        let vertex_count = mesh.vertex_count().min(self.capacity);
        if vertex_count < mesh.vertex_count() {
            tracing::warn!(
                vertices = mesh.vertex_count(),
                capacity = self.capacity,
                "mesh larger than vertex buffers, truncating"
            );
        }
        if vertex_count == 0 {
            self.vertex_count = 0;
            return;
        }

        let next_buffer = (self.current_buffer + 1) % NUM_BUFFERS;
        let floats = vertex_count * 3;

        queue.write_buffer(
            &self.positions[next_buffer],
            0,
            bytemuck::cast_slice(&mesh.positions[..floats]),
        );
        queue.write_buffer(
            &self.colors[next_buffer],
            0,
            bytemuck::cast_slice(&mesh.colors[..floats]),
        );

        self.current_buffer = next_buffer;
        self.vertex_count = vertex_count;
    }

    pub fn clear(&mut self) {
        self.vertex_count = 0;
    }

    pub fn current_positions(&self) -> &wgpu::Buffer {
        &self.positions[self.current_buffer]
    }

    pub fn current_colors(&self) -> &wgpu::Buffer {
        &self.colors[self.current_buffer]
    }

    pub fn vertex_count(&self) -> u32 {
        u32::try_from(self.vertex_count).unwrap_or(u32::MAX)
    }
}

/// Bytes needed for `capacity` vertices of three `f32`s, if the device allows it.
fn buffer_size(capacity: usize, max_buffer_size: u64) -> Result<u64> {
    let bytes = (capacity.max(1) as u64).checked_mul(3 * std::mem::size_of::<f32>() as u64);
    match bytes {
        Some(bytes) if bytes <= max_buffer_size && capacity <= u32::MAX as usize => Ok(bytes),
        _ => bail!(
            "{capacity} vertices do not fit a vertex buffer (device limit {max_buffer_size} bytes); \
             lower --rings or --segments"
        ),
    }
}

pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}

pub fn color_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        }],
    }
}
