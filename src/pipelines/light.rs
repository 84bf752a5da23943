use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

/// A directional sun light plus an ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Points from the scene towards the light, normalized on upload.
    pub direction: Vector3<f32>,
    pub colour: [f32; 3],
    pub intensity: f32,
    pub ambient_colour: [f32; 3],
    pub ambient_intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vector3::new(3.5, 2.0, 0.0),
            colour: [1.0, 1.0, 1.0],
            intensity: 1.0,
            ambient_colour: [1.0, 1.0, 1.0],
            ambient_intensity: 0.3,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    // vec4 everywhere to satisfy the 16 byte uniform alignment; w carries intensity
    direction: [f32; 4],
    colour: [f32; 4],
    ambient: [f32; 4],
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        let direction = if light.direction.magnitude2() > 0.0 {
            light.direction.normalize()
        } else {
            Vector3::unit_y()
        };
        let [r, g, b] = light.colour;
        let [ar, ag, ab] = light.ambient_colour;
        Self {
            direction: [direction.x, direction.y, direction.z, 0.0],
            colour: [r, g, b, light.intensity],
            ambient: [ar, ag, ab, light.ambient_intensity],
        }
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
        label: Some("light_bind_group_layout"),
    })
}

#[derive(Debug)]
pub struct LightResources {
    pub light: Light,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, light: Light) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::from(&light)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            light,
            buffer,
            bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[LightUniform::from(&self.light)]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_normalizes_direction_and_packs_intensity() {
        let light = Light {
            direction: Vector3::new(0.0, 4.0, 0.0),
            intensity: 4.0,
            ambient_intensity: 2.25,
            ..Default::default()
        };
        let uniform = LightUniform::from(&light);
        assert_eq!(uniform.direction, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(uniform.colour[3], 4.0);
        assert_eq!(uniform.ambient[3], 2.25);
    }

    #[test]
    fn zero_direction_falls_back_to_up() {
        let light = Light {
            direction: Vector3::new(0.0, 0.0, 0.0),
            ..Default::default()
        };
        assert_eq!(LightUniform::from(&light).direction, [0.0, 1.0, 0.0, 0.0]);
    }
}
