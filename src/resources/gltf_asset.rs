//! glTF 2.0 loading: asynchronous CPU decode, then a GPU upload that flattens the node tree.

use std::path::Path;

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::{
    context::Context,
    data_structures::{
        material::Material,
        model::{Mesh, Model, ModelVertex},
        texture::Texture,
    },
    error::ResourceError,
    resources::loader::{load_binary, sibling_path},
};

/// A parsed glTF document with every buffer and image it references already fetched.
#[derive(Debug, Clone)]
pub struct GltfAsset {
    pub document: gltf::Document,
    pub buffers: Vec<Vec<u8>>,
    /// Decoded images, indexed like `document.images()`.
    pub images: Vec<image::DynamicImage>,
}

impl GltfAsset {
    /// Fetch `file_name` (`.gltf` or `.glb`) and everything it references.
    pub async fn load(root: &Path, file_name: &str) -> anyhow::Result<Self> {
        let bytes = load_binary(root, file_name).await?;
        let gltf = gltf::Gltf::from_slice(&bytes)?;

        let mut buffers = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => {
                    let blob = gltf.blob.as_deref().ok_or_else(|| ResourceError::MissingBuffer {
                        file: file_name.to_string(),
                        index: buffer.index(),
                    })?;
                    buffers.push(blob.to_vec());
                }
                gltf::buffer::Source::Uri(uri) => {
                    let bin = load_binary(root, &resolve_uri(file_name, uri)?).await?;
                    buffers.push(bin);
                }
            }
        }

        let mut images = Vec::new();
        for image in gltf.images() {
            let decoded = match image.source() {
                gltf::image::Source::View { view, mime_type: _ } => {
                    let buffer = buffers.get(view.buffer().index()).ok_or_else(|| {
                        ResourceError::MissingBuffer {
                            file: file_name.to_string(),
                            index: view.buffer().index(),
                        }
                    })?;
                    let start = view.offset();
                    let end = start + view.length();
                    let bytes = buffer.get(start..end).ok_or_else(|| ResourceError::MissingBuffer {
                        file: file_name.to_string(),
                        index: view.buffer().index(),
                    })?;
                    image::load_from_memory(bytes)?
                }
                gltf::image::Source::Uri { uri, mime_type: _ } => {
                    let bytes = load_binary(root, &resolve_uri(file_name, uri)?).await?;
                    image::load_from_memory(&bytes)?
                }
            };
            images.push(decoded);
        }

        log::info!(
            "loaded {file_name}: {} meshes, {} materials, {} images",
            gltf.meshes().len(),
            gltf.materials().len(),
            images.len()
        );
        Ok(Self {
            document: gltf.document,
            buffers,
            images,
        })
    }

    /// Upload to the GPU. Node transforms are baked into the vertices, so the
    /// result renders correctly with a single identity instance.
    pub fn to_model(&self, ctx: &Context) -> anyhow::Result<Model> {
        let textures: Vec<Texture> = self
            .images
            .iter()
            .enumerate()
            .map(|(idx, img)| {
                Texture::from_image(&ctx.device, &ctx.queue, img, Some(&format!("gltf image {idx}")), false)
            })
            .collect();

        let mut materials: Vec<Material> = self
            .document
            .materials()
            .map(|material| {
                let pbr = material.pbr_metallic_roughness();
                let map = pbr
                    .base_color_texture()
                    .and_then(|info| textures.get(info.texture().source().index()));
                let name = material.name().unwrap_or("gltf material");
                let mut out = Material::standard(ctx, name, pbr.base_color_factor(), map);
                let [r, g, b] = material.emissive_factor();
                out.set_emissive([r, g, b, 1.0]);
                out.write(&ctx.queue);
                out
            })
            .collect();
        // primitives without a material use this one
        let default_material = materials.len();
        materials.push(Material::standard(ctx, "gltf default", [1.0; 4], None));

        let mut meshes = Vec::new();
        let scene = self
            .document
            .default_scene()
            .or_else(|| self.document.scenes().next());
        if let Some(scene) = scene {
            for node in scene.nodes() {
                self.collect_meshes(ctx, node, Matrix4::identity(), default_material, &mut meshes);
            }
        }
        Ok(Model { meshes, materials })
    }

    fn collect_meshes(
        &self,
        ctx: &Context,
        node: gltf::Node,
        parent: Matrix4<f32>,
        default_material: usize,
        meshes: &mut Vec<Mesh>,
    ) {
        let world = parent * Matrix4::from(node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!("skipping non-triangle primitive in mesh {:?}", mesh.name());
                    continue;
                }
                let (vertices, indices) = self.read_primitive(&primitive, world);
                if vertices.is_empty() {
                    continue;
                }
                let material = primitive.material().index().unwrap_or(default_material);
                let name = mesh.name().unwrap_or("unknown_mesh");
                meshes.push(Mesh::new(&ctx.device, name, &vertices, &indices, material));
            }
        }
        for child in node.children() {
            self.collect_meshes(ctx, child, world, default_material, meshes);
        }
    }

    fn read_primitive(
        &self,
        primitive: &gltf::Primitive,
        world: Matrix4<f32>,
    ) -> (Vec<ModelVertex>, Vec<u32>) {
        let reader = primitive.reader(|buffer| self.buffers.get(buffer.index()).map(|b| b.as_slice()));
        let normal_matrix = normal_matrix(world);

        let mut vertices: Vec<ModelVertex> = match reader.read_positions() {
            Some(positions) => positions
                .map(|p| {
                    let p = world * Vector4::new(p[0], p[1], p[2], 1.0);
                    ModelVertex {
                        position: [p.x, p.y, p.z],
                        ..Default::default()
                    }
                })
                .collect(),
            None => return (Vec::new(), Vec::new()),
        };
        if let Some(normals) = reader.read_normals() {
            for (vertex, n) in vertices.iter_mut().zip(normals) {
                vertex.normal = (normal_matrix * Vector3::from(n)).into();
            }
        }
        if let Some(tex_coords) = reader.read_tex_coords(0) {
            for (vertex, uv) in vertices.iter_mut().zip(tex_coords.into_f32()) {
                vertex.tex_coords = uv;
            }
        }
        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };
        (vertices, indices)
    }
}

fn resolve_uri(file_name: &str, uri: &str) -> Result<String, ResourceError> {
    if uri.starts_with("data:") || uri.contains("://") {
        return Err(ResourceError::UnsupportedUri(uri.to_string()));
    }
    Ok(sibling_path(file_name, uri))
}

fn normal_matrix(world: Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    linear
        .invert()
        .map(|m| m.transpose())
        .unwrap_or(linear)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_and_remote_uris_are_rejected() {
        assert!(matches!(
            resolve_uri("a.gltf", "data:application/octet-stream;base64,AAAA"),
            Err(ResourceError::UnsupportedUri(_))
        ));
        assert!(matches!(
            resolve_uri("a.gltf", "https://example.org/a.bin"),
            Err(ResourceError::UnsupportedUri(_))
        ));
        assert_eq!(resolve_uri("models/a.gltf", "a.bin").ok().as_deref(), Some("models/a.bin"));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let world = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let n = normal_matrix(world) * Vector3::new(1.0, 0.0, 0.0);
        assert!((n.x - 0.5).abs() < 1e-6);
    }
}
