//! Bridge between `image` buffers and pixel grids, plus the image handling the
//! detector and classifier need around the core pipeline: downscaling,
//! sampling a region at a fixed size, drawing outlines and writing progress
//! previews.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbImage;
use log::debug;

use crate::colour::HueSaturation;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::regions::Component;
use crate::types::{Rectangle, Rgb, Size};

/// Filter used for every resize.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

pub fn grid_from_image(image: &RgbImage) -> Result<Grid<Rgb>> {
    let values = image
        .pixels()
        .map(|pixel| Rgb::new(pixel[0], pixel[1], pixel[2]))
        .collect();
    Grid::new(image.width() as usize, image.height() as usize, values)
}

pub fn image_from_grid(grid: &Grid<Rgb>) -> RgbImage {
    RgbImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        let colour = grid.values()[y as usize * grid.width() + x as usize];
        image::Rgb([colour.r, colour.g, colour.b])
    })
}

pub fn image_size(image: &RgbImage) -> Size {
    Size::new(image.width() as usize, image.height() as usize)
}

/// How much an image must shrink so its longest side is at most
/// `maximum_dimension`. One when no shrinking is needed.
pub fn downscale_factor(size: Size, maximum_dimension: usize) -> f64 {
    let largest = size.width.max(size.height);
    if largest > maximum_dimension {
        largest as f64 / maximum_dimension as f64
    } else {
        1.0
    }
}

/// Resize to `round(w / factor) × round(h / factor)`, never below 1×1.
pub fn shrink_by(image: &RgbImage, factor: f64) -> Result<RgbImage> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "resize factor must be positive, got {}",
            factor
        )));
    }
    let scaled = |value: u32| ((value as f64 / factor).round_ties_even() as u32).max(1);
    Ok(imageops::resize(
        image,
        scaled(image.width()),
        scaled(image.height()),
        RESIZE_FILTER,
    ))
}

/// Cut `region` out of `image` and fit it into exactly `destination` pixels.
///
/// The region first grows (clipped to the image) toward the destination's
/// aspect ratio so the sample includes surrounding context rather than being
/// stretched. What is cut out is then scaled to fit while keeping its aspect
/// ratio and centred on a black canvas.
pub fn extract_section_and_resize(
    image: &RgbImage,
    region: Rectangle,
    destination: Size,
) -> Result<RgbImage> {
    let bounds = image_size(image);
    if region.is_empty() || !region.fits_within(bounds) {
        return Err(Error::RectangleOutOfBounds {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
            limit_width: bounds.width,
            limit_height: bounds.height,
        });
    }
    if destination.width == 0 || destination.height == 0 {
        return Err(Error::InvalidArgument(format!(
            "destination size must be positive, got {}x{}",
            destination.width, destination.height
        )));
    }

    let sample_aspect_ratio = destination.width as f64 / destination.height as f64;
    let aspect_ratio = region.width as f64 / region.height as f64;
    let region = if aspect_ratio >= sample_aspect_ratio {
        let ideal_height = (region.width as f64 / sample_aspect_ratio).round_ties_even() as i64;
        region.inflate_within(0, ideal_height - region.height as i64, bounds)
    } else {
        let ideal_width = (region.height as f64 * sample_aspect_ratio).round_ties_even() as i64;
        region.inflate_within(ideal_width - region.width as i64, 0, bounds)
    };

    let section = imageops::crop_imm(
        image,
        region.x as u32,
        region.y as u32,
        region.width as u32,
        region.height as u32,
    )
    .to_image();

    let aspect_ratio = region.width as f64 / region.height as f64;
    let (width, height) = if aspect_ratio >= sample_aspect_ratio {
        let height = (destination.width as f64 / aspect_ratio).round_ties_even() as usize;
        (destination.width, height.clamp(1, destination.height))
    } else {
        let width = (destination.height as f64 * aspect_ratio).round_ties_even() as usize;
        (width.clamp(1, destination.width), destination.height)
    };
    let resized = imageops::resize(&section, width as u32, height as u32, RESIZE_FILTER);

    let mut canvas = RgbImage::new(destination.width as u32, destination.height as u32);
    let offset_x = (destination.width - width) / 2;
    let offset_y = (destination.height - height) / 2;
    imageops::overlay(&mut canvas, &resized, offset_x as i64, offset_y as i64);
    Ok(canvas)
}

/// Draw the outline of `area` with the given line thickness. Lines are drawn
/// inside the rectangle and clipped to the image.
pub fn draw_rectangle(image: &mut RgbImage, area: Rectangle, colour: Rgb, thickness: usize) {
    let area = area.intersect(&Rectangle::covering(image_size(image)));
    if area.is_empty() || thickness == 0 {
        return;
    }
    let pixel = image::Rgb([colour.r, colour.g, colour.b]);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let from_edge = (x - area.left())
                .min(area.right() - 1 - x)
                .min(y - area.top())
                .min(area.bottom() - 1 - y);
            if from_edge < thickness {
                image.put_pixel(x as u32, y as u32, pixel);
            }
        }
    }
}

/// Colours cycled through when previewing skin objects.
const OBJECT_PREVIEW_COLOURS: [Rgb; 6] = [
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(128, 128, 0),
    Rgb::new(0, 128, 128),
    Rgb::new(128, 0, 128),
];

/// Writes intermediate pipeline stages as PNG files into one directory.
#[derive(Debug, Clone)]
pub struct ProgressImages {
    directory: PathBuf,
}

impl ProgressImages {
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn save(&self, name: &str, grid: &Grid<Rgb>) -> Result<PathBuf> {
        let path = self.directory.join(format!("{}.png", name));
        image_from_grid(grid).save(&path)?;
        debug!("Wrote progress image {}", path.display());
        Ok(path)
    }

    /// Hue, saturation and texture amplitude as greyscale images.
    pub fn save_hue_saturation(&self, hues: &Grid<HueSaturation>) -> Result<()> {
        // Hue is in (-180, 180], halved after shifting to fit a byte
        self.save(
            "SkinMaskGeneration-Hue",
            &hues.transform(|v| Rgb::grey(((v.hue + 180.0) / 2.0) as u8)),
        )?;
        self.save(
            "SkinMaskGeneration-Saturation",
            &hues.transform(|v| Rgb::grey(v.saturation as u8)),
        )?;
        self.save(
            "SkinMaskGeneration-TextureAmplitude",
            &hues.transform(|v| Rgb::grey((v.texture_amplitude * 16.0) as u8)),
        )?;
        Ok(())
    }

    pub fn save_mask(&self, name: &str, mask: &Grid<bool>) -> Result<()> {
        self.save(
            name,
            &mask.transform(|is_skin| Rgb::grey(if *is_skin { 255 } else { 0 })),
        )?;
        Ok(())
    }

    /// Each object in its own colour on black.
    pub fn save_skin_objects(&self, mask: &Grid<bool>, objects: &[Component]) -> Result<()> {
        let mut values = vec![Rgb::default(); mask.len()];
        for (index, object) in objects.iter().enumerate() {
            let colour = OBJECT_PREVIEW_COLOURS[index % OBJECT_PREVIEW_COLOURS.len()];
            for position in &object.positions {
                values[position.y * mask.width() + position.x] = colour;
            }
        }
        self.save("SkinObjects", &Grid::new(mask.width(), mask.height(), values)?)?;
        Ok(())
    }
}
