//! Asset loading for an Experience.
//!
//! [`Resources`] is created from a fixed list of [`Source`]s. Each source is loaded
//! asynchronously (tokio natively, `spawn_local` on the web) and sent back over a
//! channel that the frame loop drains with [`Resources::poll`]. Once every declared
//! source has arrived, a single [`Ready`] notification fires.
//!
//! Loaded items are CPU-side [`Asset`]s; worlds upload what they need in `on_ready`.

pub mod gltf_asset;
pub mod loader;

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
};

pub use gltf_asset::GltfAsset;

use crate::{
    context::Context,
    data_structures::{model::Model, texture::Texture},
    error::ResourceError,
    events::EventEmitter,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Gltf,
    Texture,
    HdrTexture,
    /// Six faces in the order +x, -x, +y, -y, +z, -z.
    CubeTexture,
}

impl SourceKind {
    pub fn expected_paths(&self) -> usize {
        match self {
            SourceKind::CubeTexture => 6,
            _ => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub kind: SourceKind,
    /// Paths relative to the asset root.
    pub paths: Vec<String>,
}

impl Source {
    pub fn new(name: &str, kind: SourceKind, paths: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind,
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn gltf(name: &str, path: &str) -> Self {
        Self::new(name, SourceKind::Gltf, &[path])
    }

    pub fn texture(name: &str, path: &str) -> Self {
        Self::new(name, SourceKind::Texture, &[path])
    }

    pub fn hdr(name: &str, path: &str) -> Self {
        Self::new(name, SourceKind::HdrTexture, &[path])
    }

    pub fn cube(name: &str, faces: [&str; 6]) -> Self {
        Self::new(name, SourceKind::CubeTexture, &faces)
    }

    pub fn validate(&self) -> Result<(), ResourceError> {
        let expected = self.kind.expected_paths();
        if self.paths.len() != expected {
            return Err(ResourceError::WrongPathCount {
                name: self.name.clone(),
                expected,
                actual: self.paths.len(),
            });
        }
        Ok(())
    }
}

/// A decoded Radiance HDR image, RGBA with alpha set to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl HdrImage {
    pub fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)?;
        Ok(Self::from_image(&img))
    }

    pub fn from_image(img: &image::DynamicImage) -> Self {
        let rgba = img.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .into_raw()
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

pub type CubeFaces = [image::DynamicImage; 6];

#[derive(Clone, Debug)]
pub enum Asset {
    Gltf(GltfAsset),
    Texture(image::DynamicImage),
    Hdr(HdrImage),
    Cube(Box<CubeFaces>),
}

impl Asset {
    pub fn kind(&self) -> SourceKind {
        match self {
            Asset::Gltf(_) => SourceKind::Gltf,
            Asset::Texture(_) => SourceKind::Texture,
            Asset::Hdr(_) => SourceKind::HdrTexture,
            Asset::Cube(_) => SourceKind::CubeTexture,
        }
    }
}

/// Fired once, when the last declared source has been stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ready {
    pub loaded: usize,
}

type Completion = (String, anyhow::Result<Asset>);

#[derive(Debug)]
pub struct Resources {
    sources: Vec<Source>,
    items: HashMap<String, Asset>,
    failed_names: HashSet<String>,
    root: PathBuf,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    started: bool,
    ready: bool,
    ready_pending: bool,
    pub to_load: usize,
    pub loaded: usize,
    pub failed: usize,
    pub events: EventEmitter<Ready>,
}

impl Resources {
    /// Validates every source. Names must be unique.
    pub fn new(sources: Vec<Source>, root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let mut names = HashSet::new();
        for source in &sources {
            source.validate()?;
            if !names.insert(source.name.as_str()) {
                anyhow::bail!("source `{}` is declared twice", source.name);
            }
        }
        let (sender, receiver) = mpsc::channel();
        Ok(Self {
            to_load: sources.len(),
            sources,
            items: HashMap::new(),
            failed_names: HashSet::new(),
            root: root.into(),
            sender,
            receiver,
            started: false,
            ready: false,
            ready_pending: false,
            loaded: 0,
            failed: 0,
            events: EventEmitter::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Spawn one load per source. Calling it again does nothing.
    pub fn start_loading(
        &mut self,
        #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    ) {
        if self.started {
            return;
        }
        self.started = true;
        log::info!("loading {} sources from {}", self.to_load, self.root.display());
        if self.to_load == 0 {
            self.fire_ready();
            return;
        }
        for source in self.sources.clone() {
            let sender = self.sender.clone();
            let root = self.root.clone();
            let fut = async move {
                let result = load_source(&root, &source).await;
                // the receiver only disappears together with the Resources, nobody is left to tell
                let _ = sender.send((source.name, result));
            };
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime.spawn(fut);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(fut);
        }
    }

    /// Drain finished loads. Returns true exactly once: on the call that observes readiness.
    pub fn poll(&mut self) -> bool {
        while let Ok((name, result)) = self.receiver.try_recv() {
            match result {
                Ok(asset) => {
                    self.source_loaded(&name, asset);
                }
                Err(e) => self.source_failed(&name, &e),
            }
        }
        std::mem::take(&mut self.ready_pending)
    }

    /// Store a finished item. Returns true if this completion made the set ready.
    pub fn source_loaded(&mut self, name: &str, asset: Asset) -> bool {
        let Some(source) = self.sources.iter().find(|s| s.name == name) else {
            log::warn!("{}", ResourceError::UnknownSource(name.to_string()));
            return false;
        };
        if self.items.contains_key(name) || self.failed_names.contains(name) {
            log::debug!("ignoring repeated completion of {name}");
            return false;
        }
        if source.kind != asset.kind() {
            let error = ResourceError::WrongKind {
                name: name.to_string(),
                expected: source.kind,
                actual: asset.kind(),
            };
            self.source_failed(name, &error.into());
            return false;
        }
        self.items.insert(name.to_string(), asset);
        self.loaded += 1;
        log::debug!("loaded {name} ({}/{})", self.loaded, self.to_load);
        if self.loaded == self.to_load && !self.ready {
            self.fire_ready();
            return true;
        }
        false
    }

    /// Record a failed load. Readiness can no longer be reached.
    pub fn source_failed(&mut self, name: &str, error: &anyhow::Error) {
        log::error!("failed to load source {name}: {error:#}");
        if !self.items.contains_key(name) && self.failed_names.insert(name.to_string()) {
            self.failed += 1;
        }
    }

    fn fire_ready(&mut self) {
        self.ready = true;
        self.ready_pending = true;
        log::info!("all {} sources ready", self.loaded);
        self.events.trigger(&Ready {
            loaded: self.loaded,
        });
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Fraction of sources stored, 1 for an empty list.
    pub fn progress(&self) -> f32 {
        if self.to_load == 0 {
            1.0
        } else {
            self.loaded as f32 / self.to_load as f32
        }
    }

    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.items.get(name)
    }

    pub fn gltf(&self, name: &str) -> Result<&GltfAsset, ResourceError> {
        match self.items.get(name) {
            Some(Asset::Gltf(gltf)) => Ok(gltf),
            Some(_) => Err(ResourceError::NotAGltf(name.to_string())),
            None => Err(ResourceError::UnknownSource(name.to_string())),
        }
    }

    /// Upload a loaded model.
    pub fn create_model(&self, ctx: &Context, name: &str) -> anyhow::Result<Model> {
        self.gltf(name)?.to_model(ctx)
    }

    /// Upload a loaded texture, HDR map or cube map.
    pub fn create_texture(&self, ctx: &Context, name: &str) -> anyhow::Result<Texture> {
        match self.items.get(name) {
            Some(Asset::Texture(img)) => Ok(Texture::from_image(&ctx.device, &ctx.queue, img, Some(name), false)),
            Some(Asset::Hdr(hdr)) => Ok(Texture::from_hdr(&ctx.device, &ctx.queue, hdr, name)),
            Some(Asset::Cube(faces)) => Ok(Texture::from_cube_faces(&ctx.device, &ctx.queue, faces, name)),
            Some(Asset::Gltf(_)) => anyhow::bail!("source `{name}` is a gltf model, not a texture"),
            None => Err(ResourceError::UnknownSource(name.to_string()).into()),
        }
    }
}

pub async fn load_source(root: &Path, source: &Source) -> anyhow::Result<Asset> {
    source.validate()?;
    let asset = match source.kind {
        SourceKind::Gltf => Asset::Gltf(GltfAsset::load(root, &source.paths[0]).await?),
        SourceKind::Texture => {
            let bytes = loader::load_binary(root, &source.paths[0]).await?;
            Asset::Texture(image::load_from_memory(&bytes)?)
        }
        SourceKind::HdrTexture => {
            let bytes = loader::load_binary(root, &source.paths[0]).await?;
            Asset::Hdr(HdrImage::decode(&bytes)?)
        }
        SourceKind::CubeTexture => {
            let loads = source.paths.iter().map(|path| loader::load_binary(root, path));
            let faces = futures::future::try_join_all(loads)
                .await?
                .iter()
                .map(|bytes| image::load_from_memory(bytes))
                .collect::<Result<Vec<_>, _>>()?;
            let faces: CubeFaces = faces.try_into().map_err(|faces: Vec<_>| ResourceError::WrongPathCount {
                name: source.name.clone(),
                expected: 6,
                actual: faces.len(),
            })?;
            Asset::Cube(Box::new(faces))
        }
    };
    Ok(asset)
}
