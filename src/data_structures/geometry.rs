//! CPU-side procedural geometry.
//!
//! Every constructor produces counter-clockwise triangles with unit normals
//! and UVs in `0..1`, matching the conventions of the usual web 3D geometries:
//! planes lie in XY facing +Z, boxes and spheres are centred on the origin.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::{Mesh, ModelVertex};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// A `width` x `height` plane subdivided into a grid of segments.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let mut geometry = Self::default();
        geometry.push_grid(
            Vector3::unit_x() * width,
            Vector3::unit_y() * height,
            Vector3::unit_z(),
            Vector3::new(0.0, 0.0, 0.0),
            width_segments,
            height_segments,
        );
        geometry
    }

    /// An axis aligned box, each face subdivided independently.
    pub fn cuboid(
        width: f32,
        height: f32,
        depth: f32,
        width_segments: u32,
        height_segments: u32,
        depth_segments: u32,
    ) -> Self {
        let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
        let mut geometry = Self::default();
        // (u axis, v axis, normal, segments along u, segments along v)
        let faces = [
            (-Vector3::unit_z() * depth, Vector3::unit_y() * height, Vector3::unit_x() * hw, depth_segments, height_segments),
            (Vector3::unit_z() * depth, Vector3::unit_y() * height, -Vector3::unit_x() * hw, depth_segments, height_segments),
            (Vector3::unit_x() * width, -Vector3::unit_z() * depth, Vector3::unit_y() * hh, width_segments, depth_segments),
            (Vector3::unit_x() * width, Vector3::unit_z() * depth, -Vector3::unit_y() * hh, width_segments, depth_segments),
            (Vector3::unit_x() * width, Vector3::unit_y() * height, Vector3::unit_z() * hd, width_segments, height_segments),
            (-Vector3::unit_x() * width, Vector3::unit_y() * height, -Vector3::unit_z() * hd, width_segments, height_segments),
        ];
        for (u_axis, v_axis, offset, u_segments, v_segments) in faces {
            geometry.push_grid(u_axis, v_axis, offset.normalize(), offset, u_segments, v_segments);
        }
        geometry
    }

    /// UV sphere. `width_segments` >= 3 and `height_segments` >= 2 are enforced.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut vertices = Vec::new();
        for y in 0..=height_segments {
            let v = y as f32 / height_segments as f32;
            let phi = v * PI;
            for x in 0..=width_segments {
                let u = x as f32 / width_segments as f32;
                let theta = u * 2.0 * PI;
                let normal = Vector3::new(
                    -theta.cos() * phi.sin(),
                    phi.cos(),
                    theta.sin() * phi.sin(),
                );
                vertices.push(ModelVertex {
                    position: (normal * radius).into(),
                    tex_coords: [u, v],
                    normal: normal.into(),
                });
            }
        }
        let row = width_segments + 1;
        let mut indices = Vec::new();
        for y in 0..height_segments {
            for x in 0..width_segments {
                let a = y * row + x + 1;
                let b = y * row + x;
                let c = (y + 1) * row + x;
                let d = (y + 1) * row + x + 1;
                // the poles collapse to a point, skip the degenerate half
                if y != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if y != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        Self { vertices, indices }
    }

    /// Torus around the Z axis.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial_segments = radial_segments.max(3);
        let tubular_segments = tubular_segments.max(3);
        let mut vertices = Vec::new();
        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * 2.0 * PI;
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * 2.0 * PI;
                let position = Vector3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let centre = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
                vertices.push(ModelVertex {
                    position: position.into(),
                    tex_coords: [
                        i as f32 / tubular_segments as f32,
                        j as f32 / radial_segments as f32,
                    ],
                    normal: (position - centre).normalize().into(),
                });
            }
        }
        let row = tubular_segments + 1;
        let mut indices = Vec::new();
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn upload(&self, device: &wgpu::Device, name: &str) -> Mesh {
        Mesh::new(device, name, &self.vertices, &self.indices, 0)
    }

    /// Appends a grid spanning `u_axis` x `v_axis`, centred on `offset`.
    fn push_grid(
        &mut self,
        u_axis: Vector3<f32>,
        v_axis: Vector3<f32>,
        normal: Vector3<f32>,
        offset: Vector3<f32>,
        u_segments: u32,
        v_segments: u32,
    ) {
        let u_segments = u_segments.max(1);
        let v_segments = v_segments.max(1);
        let start = self.vertices.len() as u32;
        for iy in 0..=v_segments {
            let v = iy as f32 / v_segments as f32;
            for ix in 0..=u_segments {
                let u = ix as f32 / u_segments as f32;
                let position = offset + u_axis * (u - 0.5) + v_axis * (v - 0.5);
                self.vertices.push(ModelVertex {
                    position: position.into(),
                    tex_coords: [u, 1.0 - v],
                    normal: normal.into(),
                });
            }
        }
        let row = u_segments + 1;
        for iy in 0..v_segments {
            for ix in 0..u_segments {
                let a = start + iy * row + ix;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                self.indices.extend_from_slice(&[a, b, d, a, d, c]);
            }
        }
    }
}
