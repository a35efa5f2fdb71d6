//! Image registry
//!
//! Images are loaded once before the loop starts, from a directory of PNGs or
//! generated in code. Each image carries its opacity mask (and the mirrored
//! one) so hit tests never rebuild them per frame.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::level::LevelError;
use crate::sim::mask::Mask;

/// Handle into [`Assets`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(pub u32);

/// RGBA image with precomputed masks
#[derive(Debug, Clone)]
pub struct Image {
    width: i32,
    height: i32,
    pixels: Vec<[u8; 4]>,
    mask: Mask,
    mask_flipped: Mask,
}

impl Image {
    /// Build from row-major RGBA pixels; missing pixels are transparent
    pub fn new(width: i32, height: i32, mut pixels: Vec<[u8; 4]>) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        pixels.resize((width * height) as usize, [0; 4]);
        let mask = Mask::from_rgba(width, height, &pixels);
        let mask_flipped = mask.flipped_x();
        Self {
            width,
            height,
            pixels,
            mask,
            mask_flipped,
        }
    }

    /// Decode a PNG (or any format the `image` crate was built with)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| LevelError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| p.0).collect();
        Ok(Self::new(width as i32, height as i32, pixels))
    }

    /// Single-colour image
    pub fn solid(width: i32, height: i32, color: [u8; 4]) -> Self {
        Self::new(width, height, vec![color; (width.max(0) * height.max(0)) as usize])
    }

    /// Solid body surrounded by a transparent margin
    pub fn framed(width: i32, height: i32, margin: i32, color: [u8; 4]) -> Self {
        let margin = margin.max(0);
        let mut pixels = vec![[0; 4]; (width.max(0) * height.max(0)) as usize];
        for y in margin..height - margin {
            for x in margin..width - margin {
                pixels[(y * width + x) as usize] = color;
            }
        }
        Self::new(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    /// Pixel at (x, y), read through a horizontal mirror when `flip_x` is set
    pub fn pixel(&self, x: i32, y: i32, flip_x: bool) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return [0; 4];
        }
        let sx = if flip_x { self.width - 1 - x } else { x };
        self.pixels[(y * self.width + sx) as usize]
    }

    /// Opacity mask of the image as currently drawn
    pub fn mask(&self, flip_x: bool) -> &Mask {
        if flip_x { &self.mask_flipped } else { &self.mask }
    }
}

/// Named image store
#[derive(Debug, Default)]
pub struct Assets {
    images: Vec<Image>,
    names: HashMap<String, ImageId>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image; re-using a name replaces the lookup, not the old image
    pub fn insert(&mut self, name: impl Into<String>, image: Image) -> ImageId {
        let id = ImageId(self.images.len() as u32);
        self.images.push(image);
        self.names.insert(name.into(), id);
        id
    }

    pub fn get(&self, id: ImageId) -> Option<&Image> {
        self.images.get(id.0 as usize)
    }

    pub fn id(&self, name: &str) -> Option<ImageId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Load every `.png` in `dir`, named by file stem. Files load in path
    /// order so ids are stable between runs.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, LevelError> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        paths.sort();

        let mut assets = Self::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("Skipping image with non-UTF-8 name: {}", path.display());
                continue;
            };
            let image = Image::from_file(&path)?;
            log::debug!("Loaded `{name}` ({}x{})", image.width(), image.height());
            assets.insert(name, image);
        }
        log::info!("Loaded {} images from {}", assets.len(), dir.display());
        Ok(assets)
    }

    /// Solid-colour stand-ins for every image the demo level references
    pub fn placeholder() -> Self {
        let mut assets = Self::new();
        assets.insert("terrain", Image::solid(64, 64, [96, 64, 48, 255]));
        assets.insert("bg", Image::solid(64, 64, [120, 150, 170, 255]));
        assets.insert("bg_detail", Image::framed(64, 64, 16, [90, 130, 90, 255]));
        assets.insert("fg_detail", Image::framed(64, 64, 24, [40, 90, 40, 255]));
        assets.insert("platform", Image::solid(192, 32, [140, 140, 160, 255]));
        assets.insert("player", Image::framed(48, 88, 4, [230, 210, 60, 255]));
        assets.insert("enemy", Image::framed(48, 88, 4, [200, 60, 60, 255]));
        assets.insert("bullet", Image::solid(12, 6, [255, 240, 120, 255]));
        assets.insert("heart", Image::framed(16, 16, 2, [220, 30, 50, 255]));
        assets.insert("bg_sky", Image::solid(1024, 256, [250, 200, 160, 255]));
        assets.insert("fg_sky", Image::framed(1024, 256, 32, [255, 170, 130, 200]));
        assets
    }
}
