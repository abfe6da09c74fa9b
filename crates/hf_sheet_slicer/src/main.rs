//! Cuts named regions out of raw sprite sheets and packs them into one atlas.
//!
//! The manifest lists each sheet and the regions to take from it. Every
//! region is cropped (offsets may fall outside the sheet; that area stays
//! transparent), optionally flipped, scaled to the manifest's cell size and
//! colour keyed. Cells are packed row-major into a grid and written as an
//! atlas PNG plus the metadata JSON `hf_game` loads.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_VERSION: &str = "0.1";
const ATLAS_FILE_VERSION: &str = "0.1";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SliceManifest {
    version: String,
    atlas_id: String,
    cell: CellSize,
    /// RGB colour made fully transparent after scaling.
    #[serde(default)]
    colour_key: Option<[u8; 3]>,
    #[serde(default = "default_columns")]
    columns: u32,
    #[serde(default = "default_padding")]
    padding: u32,
    sheets: Vec<SheetSpec>,
}

fn default_columns() -> u32 {
    8
}

fn default_padding() -> u32 {
    1
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
struct CellSize {
    w: u32,
    h: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SheetSpec {
    path: PathBuf,
    /// Opt out of the manifest's colour key for this sheet.
    #[serde(default = "default_colour_keyed")]
    colour_keyed: bool,
    regions: Vec<RegionSpec>,
}

fn default_colour_keyed() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct RegionSpec {
    sprite_id: String,
    #[serde(default)]
    x: i64,
    #[serde(default)]
    y: i64,
    /// Defaults to the rest of the sheet right of `x`.
    #[serde(default)]
    w: Option<u32>,
    #[serde(default)]
    h: Option<u32>,
    #[serde(default)]
    flip_x: bool,
    #[serde(default)]
    flip_y: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct AtlasMetadata {
    version: String,
    atlas_id: String,
    texture: AtlasTexture,
    content_hash: String,
    sprites: Vec<AtlasSprite>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AtlasTexture {
    path: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct AtlasSprite {
    sprite_id: String,
    rect_px: AtlasRectPx,
    uv: AtlasUvRect,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
struct AtlasRectPx {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
struct AtlasUvRect {
    u0: f32,
    v0: f32,
    u1: f32,
    v1: f32,
}

struct Cell {
    sprite_id: String,
    image: RgbaImage,
}

fn usage() -> String {
    "Usage: cargo run -p hf_sheet_slicer -- <manifest_json> <atlas_png_output> <atlas_json_output>\nExample: cargo run -p hf_sheet_slicer -- assets/slices/sprites.json assets/generated/sprites.png assets/generated/sprites.json".to_string()
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        return Err(usage());
    }

    let manifest_path = PathBuf::from(&args[1]);
    let atlas_png_output = PathBuf::from(&args[2]);
    let atlas_json_output = PathBuf::from(&args[3]);

    let manifest = load_manifest(&manifest_path)?;
    let count = run(&manifest, &atlas_png_output, &atlas_json_output)?;

    println!(
        "Sliced {} sprites -> {} and {}",
        count,
        atlas_png_output.display(),
        atlas_json_output.display()
    );
    Ok(())
}

fn load_manifest(path: &Path) -> Result<SliceManifest, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read manifest '{}': {e}", path.display()))?;
    let manifest: SliceManifest = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse manifest '{}': {e}", path.display()))?;
    validate_manifest(&manifest).map_err(|e| format!("{} ({})", e, path.display()))?;
    Ok(manifest)
}

fn validate_manifest(manifest: &SliceManifest) -> Result<(), String> {
    if manifest.version != MANIFEST_VERSION {
        return Err(format!(
            "Manifest validation failed: unsupported version '{}'",
            manifest.version
        ));
    }
    if manifest.atlas_id.trim().is_empty() {
        return Err("Manifest validation failed: atlas_id is empty".to_string());
    }
    if manifest.cell.w == 0 || manifest.cell.h == 0 {
        return Err("Manifest validation failed: cell size must be > 0".to_string());
    }
    if manifest.columns == 0 {
        return Err("Manifest validation failed: columns must be > 0".to_string());
    }

    let mut ids = HashSet::new();
    for region in manifest.sheets.iter().flat_map(|s| &s.regions) {
        if !ids.insert(region.sprite_id.as_str()) {
            return Err(format!(
                "Manifest validation failed: duplicate sprite_id '{}'",
                region.sprite_id
            ));
        }
        if region.w == Some(0) || region.h == Some(0) {
            return Err(format!(
                "Manifest validation failed: region '{}' is zero-sized",
                region.sprite_id
            ));
        }
    }
    if ids.is_empty() {
        return Err("Manifest validation failed: no regions".to_string());
    }
    Ok(())
}

/// Slices, packs and writes both outputs. Returns the sprite count.
fn run(manifest: &SliceManifest, png_output: &Path, json_output: &Path) -> Result<usize, String> {
    let mut cells = Vec::new();
    for sheet_spec in &manifest.sheets {
        let sheet = image::open(&sheet_spec.path)
            .map_err(|e| format!("Failed to open sheet '{}': {e}", sheet_spec.path.display()))?
            .to_rgba8();
        let colour_key = manifest.colour_key.filter(|_| sheet_spec.colour_keyed);
        for region in &sheet_spec.regions {
            let image = slice_region(&sheet, region, manifest.cell, colour_key);
            log::debug!(
                "Sliced '{}' from {}",
                region.sprite_id,
                sheet_spec.path.display()
            );
            cells.push(Cell {
                sprite_id: region.sprite_id.clone(),
                image,
            });
        }
    }

    let (atlas, rects) = pack_cells(&cells, manifest.cell, manifest.columns, manifest.padding);
    let (atlas_w, atlas_h) = atlas.dimensions();
    let sprites = cells
        .iter()
        .zip(&rects)
        .map(|(cell, rect)| AtlasSprite {
            sprite_id: cell.sprite_id.clone(),
            rect_px: *rect,
            uv: uv_for(*rect, atlas_w, atlas_h),
        })
        .collect::<Vec<_>>();

    for output in [png_output, json_output] {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                format!("Failed to create output dir '{}': {e}", parent.display())
            })?;
        }
    }

    let png_tmp = temporary_output_path(png_output);
    atlas
        .save_with_format(&png_tmp, image::ImageFormat::Png)
        .map_err(|e| format!("Failed to write '{}': {e}", png_tmp.display()))?;

    let metadata = AtlasMetadata {
        version: ATLAS_FILE_VERSION.to_string(),
        atlas_id: manifest.atlas_id.clone(),
        texture: AtlasTexture {
            path: normalize_path_for_json(png_output),
            width: atlas_w,
            height: atlas_h,
        },
        content_hash: hash_cells(&cells),
        sprites,
    };
    let json = serde_json::to_string_pretty(&metadata)
        .map_err(|e| format!("Failed to serialize atlas metadata: {e}"))?;
    let json_tmp = temporary_output_path(json_output);
    fs::write(&json_tmp, json)
        .map_err(|e| format!("Failed to write '{}': {e}", json_tmp.display()))?;

    promote_outputs_transactional(&[(&png_tmp, png_output), (&json_tmp, json_output)])?;
    log::info!(
        "Atlas '{}' is {}x{} ({})",
        metadata.atlas_id,
        atlas_w,
        atlas_h,
        metadata.content_hash
    );
    Ok(metadata.sprites.len())
}

fn slice_region(
    sheet: &RgbaImage,
    region: &RegionSpec,
    cell: CellSize,
    colour_key: Option<[u8; 3]>,
) -> RgbaImage {
    let (sheet_w, sheet_h) = sheet.dimensions();
    let w = region
        .w
        .unwrap_or_else(|| (i64::from(sheet_w) - region.x).max(1) as u32);
    let h = region
        .h
        .unwrap_or_else(|| (i64::from(sheet_h) - region.y).max(1) as u32);

    // Pasting the whole sheet at a negative offset clips it to the region.
    let mut image = RgbaImage::new(w, h);
    imageops::replace(&mut image, sheet, -region.x, -region.y);

    if region.flip_x {
        imageops::flip_horizontal_in_place(&mut image);
    }
    if region.flip_y {
        imageops::flip_vertical_in_place(&mut image);
    }
    if (w, h) != (cell.w, cell.h) {
        image = imageops::resize(&image, cell.w, cell.h, FilterType::Nearest);
    }
    if let Some(key) = colour_key {
        key_out(&mut image, key);
    }
    image
}

fn key_out(image: &mut RgbaImage, key: [u8; 3]) {
    for pixel in image.pixels_mut() {
        let Rgba([r, g, b, _]) = *pixel;
        if [r, g, b] == key {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

fn pack_cells(
    cells: &[Cell],
    cell: CellSize,
    columns: u32,
    padding: u32,
) -> (RgbaImage, Vec<AtlasRectPx>) {
    let count = cells.len().max(1) as u32;
    let columns = columns.min(count);
    let rows = count.div_ceil(columns);
    let pitch_x = cell.w + padding;
    let pitch_y = cell.h + padding;
    let mut atlas = RgbaImage::new(columns * pitch_x + padding, rows * pitch_y + padding);

    let rects = cells
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let i = i as u32;
            let x = padding + (i % columns) * pitch_x;
            let y = padding + (i / columns) * pitch_y;
            imageops::replace(&mut atlas, &c.image, i64::from(x), i64::from(y));
            AtlasRectPx {
                x,
                y,
                w: cell.w,
                h: cell.h,
            }
        })
        .collect();
    (atlas, rects)
}

fn uv_for(rect: AtlasRectPx, atlas_w: u32, atlas_h: u32) -> AtlasUvRect {
    AtlasUvRect {
        u0: rect.x as f32 / atlas_w as f32,
        v0: rect.y as f32 / atlas_h as f32,
        u1: (rect.x + rect.w) as f32 / atlas_w as f32,
        v1: (rect.y + rect.h) as f32 / atlas_h as f32,
    }
}

fn normalize_path_for_json(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Hashes cell pixels in packing order, so the value changes only when a
/// sprite does.
fn hash_cells(cells: &[Cell]) -> String {
    let mut hasher = Sha256::new();
    for cell in cells {
        hasher.update(cell.sprite_id.as_bytes());
        hasher.update(cell.image.as_raw());
    }
    format!("{:x}", hasher.finalize())
}

fn temporary_output_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    path.with_file_name(format!("{file_name}.tmp"))
}

fn promote_temporary_file(temp_path: &Path, final_path: &Path) -> Result<(), String> {
    if final_path.exists() {
        fs::remove_file(final_path).map_err(|e| {
            format!(
                "Failed to replace existing output '{}': {e}",
                final_path.display()
            )
        })?;
    }
    fs::rename(temp_path, final_path).map_err(|e| {
        format!(
            "Failed to move temporary output '{}' -> '{}': {e}",
            temp_path.display(),
            final_path.display()
        )
    })
}

/// Moves every temp file into place, or none of them. Existing outputs are
/// parked as `.bak.tmp` and restored if any move fails, so the game never
/// sees a PNG from one run next to metadata from another.
fn promote_outputs_transactional(pairs: &[(&Path, &Path)]) -> Result<(), String> {
    let mut backups: Vec<(PathBuf, PathBuf)> = Vec::new();
    for (_, final_path) in pairs {
        if final_path.exists() {
            let backup_path = final_path.with_extension("bak.tmp");
            fs::rename(final_path, &backup_path).map_err(|e| {
                format!(
                    "Failed to stage backup '{}' -> '{}': {e}",
                    final_path.display(),
                    backup_path.display()
                )
            })?;
            backups.push((final_path.to_path_buf(), backup_path));
        }
    }

    let mut promoted: Vec<&Path> = Vec::new();
    for (temp_path, final_path) in pairs {
        if let Err(err) = promote_temporary_file(temp_path, final_path) {
            for path in promoted {
                let _ = fs::remove_file(path);
            }
            for (final_path, backup_path) in &backups {
                let _ = fs::rename(backup_path, final_path);
            }
            return Err(err);
        }
        promoted.push(*final_path);
    }

    for (_, backup_path) in backups {
        let _ = fs::remove_file(backup_path);
    }
    Ok(())
}
