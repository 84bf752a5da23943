//! The retained-mode scene: drawable objects, an environment background and the sun light.

use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        instance::{Instance, InstanceRaw},
        material::{FrameUniforms, Material},
        model::{Mesh, Model},
        texture::Texture,
    },
    layers::Layers,
    reflector::{Reflector, ReflectorOptions},
    pipelines::{
        light::{Light, LightResources},
        sky,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

/// A mesh drawn with one material for every instance it holds.
#[derive(Debug)]
pub struct Object {
    pub name: String,
    pub mesh: Mesh,
    pub material: Material,
    pub layers: Layers,
    pub visible: bool,
    instances: Vec<Instance>,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    dirty: bool,
}

impl Object {
    fn new(device: &wgpu::Device, name: &str, mesh: Mesh, material: Material, instances: Vec<Instance>) -> Self {
        let raw: Vec<InstanceRaw> = instances.iter().map(Instance::to_raw).collect();
        let capacity = instances.len().max(1);
        let instance_buffer = mk_instance_buffer(device, name, &raw, capacity);
        Self {
            name: name.to_string(),
            mesh,
            material,
            layers: Layers::new(),
            visible: true,
            instances,
            instance_buffer,
            capacity,
            dirty: false,
        }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Mutable access marks the GPU copy stale; it is rewritten before the next draw.
    pub fn instances_mut(&mut self) -> &mut Vec<Instance> {
        self.dirty = true;
        &mut self.instances
    }

    /// The first instance, the usual case of a single placed mesh.
    pub fn transform_mut(&mut self) -> Option<&mut Instance> {
        self.dirty = true;
        self.instances.first_mut()
    }

    pub fn set_transform(&mut self, instance: Instance) {
        self.dirty = true;
        match self.instances.first_mut() {
            Some(first) => *first = instance,
            None => self.instances.push(instance),
        }
    }

    fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let raw: Vec<InstanceRaw> = self.instances.iter().map(Instance::to_raw).collect();
        if raw.len() > self.capacity {
            self.capacity = raw.len().next_power_of_two();
            self.instance_buffer = mk_instance_buffer(device, &self.name, &raw, self.capacity);
        } else if !raw.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
        }
    }

    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, material: &Material) {
        if self.instances.is_empty() {
            return;
        }
        material.bind(render_pass);
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        self.mesh
            .draw_instanced(render_pass, 0..self.instances.len() as u32);
    }
}

fn mk_instance_buffer(device: &wgpu::Device, name: &str, raw: &[InstanceRaw], capacity: usize) -> wgpu::Buffer {
    let mut contents = vec![0u8; capacity * std::mem::size_of::<InstanceRaw>()];
    let bytes: &[u8] = bytemuck::cast_slice(raw);
    contents[..bytes.len()].copy_from_slice(bytes);
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name} Instance Buffer")),
        contents: &contents,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// What fills the pixels no object covers.
#[derive(Debug)]
pub enum Background {
    /// The renderer's clear colour.
    Colour(wgpu::Color),
    /// Equirectangular HDR map.
    Equirect { texture: Texture, bind_group: wgpu::BindGroup },
    Cube { texture: Texture, bind_group: wgpu::BindGroup },
}

impl Background {
    pub fn equirect(ctx: &Context, texture: Texture) -> Self {
        let bind_group = sky::mk_equirect_bind_group(&ctx.device, &ctx.layouts.equirect, &texture);
        Self::Equirect { texture, bind_group }
    }

    pub fn cube(ctx: &Context, texture: Texture) -> Self {
        let bind_group = sky::mk_cube_bind_group(&ctx.device, &ctx.layouts.cube, &texture);
        Self::Cube { texture, bind_group }
    }
}

/// Per-draw switches.
#[derive(Clone, Copy, Debug)]
pub struct DrawOptions<'a> {
    /// Objects must share a layer with this mask to be drawn.
    pub layers: Layers,
    /// Skip one object, a reflector never sees itself.
    pub skip: Option<ObjectId>,
    /// Draw every object outside `layers` of the pair with this material instead.
    pub darken: Option<(Layers, &'a Material)>,
    pub background: bool,
}

impl Default for DrawOptions<'_> {
    fn default() -> Self {
        Self {
            layers: Layers::all(),
            skip: None,
            darken: None,
            background: true,
        }
    }
}

#[derive(Debug)]
pub struct Scene {
    objects: Vec<(ObjectId, Object)>,
    next_id: u64,
    reflectors: Vec<Reflector>,
    pub background: Background,
    pub light: LightResources,
}

impl Scene {
    pub fn new(ctx: &Context, clear_colour: wgpu::Color) -> Self {
        Self {
            objects: Vec::new(),
            next_id: 0,
            reflectors: Vec::new(),
            background: Background::Colour(clear_colour),
            light: LightResources::new(&ctx.device, &ctx.layouts.light, Light::default()),
        }
    }

    pub fn add(&mut self, ctx: &Context, name: &str, mesh: Mesh, material: Material) -> ObjectId {
        self.add_instanced(ctx, name, mesh, material, vec![Instance::new()])
    }

    pub fn add_instanced(
        &mut self,
        ctx: &Context,
        name: &str,
        mesh: Mesh,
        material: Material,
        instances: Vec<Instance>,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        log::debug!("adding {name} as {id:?} with {} instance(s)", instances.len());
        self.objects
            .push((id, Object::new(&ctx.device, name, mesh, material, instances)));
        id
    }

    /// Adds every mesh of a model as its own object, all sharing `transform`.
    pub fn add_model(&mut self, ctx: &Context, name: &str, model: &Model, transform: Instance) -> Vec<ObjectId> {
        model
            .meshes
            .iter()
            .enumerate()
            .filter_map(|(idx, mesh)| {
                let Some(material) = model.materials.get(mesh.material) else {
                    log::warn!("mesh {idx} of {name} references missing material {}", mesh.material);
                    return None;
                };
                let object_name = format!("{name}/{}", mesh.name);
                Some(self.add_instanced(ctx, &object_name, mesh.clone(), material.clone(), vec![transform.clone()]))
            })
            .collect()
    }

    /// Adds a mirror drawn with `mesh`. Its normal is the local +z axis of `transform`,
    /// so [`Geometry::plane`](crate::data_structures::geometry::Geometry::plane) fits as is.
    pub fn add_reflector(
        &mut self,
        ctx: &Context,
        name: &str,
        mesh: Mesh,
        transform: Instance,
        options: ReflectorOptions,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        let reflector = Reflector::new(ctx, name, id, options);
        let material = reflector.material(ctx, name);
        let added = self.add_instanced(ctx, name, mesh, material, vec![transform]);
        debug_assert_eq!(added, id);
        self.reflectors.push(reflector);
        id
    }

    pub fn reflectors(&self) -> &[Reflector] {
        &self.reflectors
    }

    pub fn reflector_mut(&mut self, id: ObjectId) -> Option<&mut Reflector> {
        self.reflectors.iter_mut().find(|r| r.object == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find(|(oid, _)| *oid == id).map(|(_, o)| o)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects
            .iter_mut()
            .find(|(oid, _)| *oid == id)
            .map(|(_, o)| o)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        let idx = self.objects.iter().position(|(oid, _)| *oid == id)?;
        self.reflectors.retain(|r| r.object != id);
        Some(self.objects.remove(idx).1)
    }

    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, o)| o.name == name)
            .map(|(id, _)| *id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter().map(|(id, o)| (*id, o))
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut Object)> {
        self.objects.iter_mut().map(|(id, o)| (*id, o))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear_colour(&self) -> Option<wgpu::Color> {
        match self.background {
            Background::Colour(colour) => Some(colour),
            _ => None,
        }
    }

    /// Upload changed instances, shader frame uniforms and the light.
    pub fn prepare(&mut self, ctx: &Context, frame: &FrameUniforms) {
        for (_, object) in self.objects.iter_mut() {
            object.flush(&ctx.device, &ctx.queue);
            if let Some(uniforms) = object.material.shader_uniforms_mut() {
                frame.apply(uniforms);
            }
            object.material.write(&ctx.queue);
        }
        self.light.write(&ctx.queue);
    }

    pub fn draw(&self, ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>, camera: &wgpu::BindGroup, options: &DrawOptions) {
        if options.background {
            self.draw_background(ctx, render_pass, camera);
        }
        // opaque first, transparent materials blend over the finished depth buffer
        for transparent in [false, true] {
            for (id, object) in &self.objects {
                if object.material.transparent != transparent
                    || !object.visible
                    || options.skip == Some(*id)
                    || !object.layers.test(&options.layers)
                {
                    continue;
                }
                let material = match options.darken {
                    Some((keep, black)) if !object.layers.test(&keep) => black,
                    _ => &object.material,
                };
                render_pass.set_bind_group(1, camera, &[]);
                render_pass.set_bind_group(2, &self.light.bind_group, &[]);
                object.draw(render_pass, material);
            }
        }
    }

    fn draw_background(&self, ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>, camera: &wgpu::BindGroup) {
        let (pipeline, bind_group) = match &self.background {
            Background::Colour(_) => return,
            Background::Equirect { bind_group, .. } => (&ctx.pipelines.sky_equirect, bind_group),
            Background::Cube { bind_group, .. } => (&ctx.pipelines.sky_cube, bind_group),
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.set_bind_group(1, camera, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
