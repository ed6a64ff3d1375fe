//! Occupancy rasters.
//!
//! Two resolutions are kept: the fine pixel bitmap the geometry kernel ray
//! casts against (`OccupancyGrid`), and the coarse box grid the semantic
//! graph is built on (`BoxGrid`, one cell per `BOX_SIZE` pixel block).

use crate::constants::*;
use crate::error::{Error, Result};
use bitflags::*;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use std::path::Path;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        const NONE = 0;
        const WALL = 1;
    }
}

/// Binary occupancy bitmap at map-pixel resolution.
#[derive(Clone)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl OccupancyGrid {
    pub fn new(width: u32, height: u32, buffer: Vec<u8>) -> Result<OccupancyGrid> {
        if width == 0 || height == 0 {
            return Err(Error::Map("map raster is empty".to_string()));
        }
        if buffer.len() != (width as usize) * (height as usize) {
            return Err(Error::Map(format!(
                "raster buffer length {} does not match {}x{}",
                buffer.len(),
                width,
                height
            )));
        }
        let grid = OccupancyGrid {
            width,
            height,
            buffer,
        };
        if grid.free_cells() == 0 {
            return Err(Error::Map("map is fully occupied".to_string()));
        }
        Ok(grid)
    }

    /// Load a grayscale raster and threshold it: pixels >= 128 are free.
    pub fn from_image<P: AsRef<Path>>(path: P) -> Result<OccupancyGrid> {
        let image = image::open(path)?.into_luma8();
        let (width, height) = image.dimensions();
        let buffer = image
            .pixels()
            .map(|p| {
                if p.0[0] >= FREE_THRESHOLD {
                    CellFlags::NONE.bits()
                } else {
                    CellFlags::WALL.bits()
                }
            })
            .collect();
        OccupancyGrid::new(width, height, buffer)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && x < self.width as i64 && y >= 0 && y < self.height as i64
    }

    fn get_xy(&self, x: u32, y: u32) -> CellFlags {
        let index = (y as usize) * (self.width as usize) + (x as usize);
        CellFlags::from_bits_truncate(self.buffer[index])
    }

    /// Out-of-bounds pixels read as solid.
    pub fn is_wall(&self, x: i64, y: i64) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        self.get_xy(x as u32, y as u32).contains(CellFlags::WALL)
    }

    pub fn free_cells(&self) -> usize {
        self.buffer
            .iter()
            .filter(|&&b| !CellFlags::from_bits_truncate(b).contains(CellFlags::WALL))
            .count()
    }
}

/// State of one coarse cell. Markers are annotation cells from map tooling
/// and traversable like free space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxCell {
    Solid,
    Free,
    Marker,
}

impl BoxCell {
    #[inline]
    pub fn is_free(self) -> bool {
        !matches!(self, BoxCell::Solid)
    }
}

/// Coarse grid of `BOX_SIZE`-pixel blocks; the substrate of the cell graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxGrid {
    width: u32,
    height: u32,
    cells: Vec<BoxCell>,
}

impl BoxGrid {
    /// Build from a row-major matrix of cell values (0 solid, 1 free,
    /// 2 marker), the layout map-authoring tools emit.
    pub fn from_matrix(rows: &[Vec<u8>]) -> Result<BoxGrid> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        if width == 0 || height == 0 {
            return Err(Error::Map("box matrix is empty".to_string()));
        }
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for row in rows {
            if row.len() as u32 != width {
                return Err(Error::Map("box matrix rows have uneven lengths".to_string()));
            }
            for &value in row {
                cells.push(match value {
                    0 => BoxCell::Solid,
                    1 => BoxCell::Free,
                    2 => BoxCell::Marker,
                    other => {
                        return Err(Error::Map(format!("invalid box cell value {}", other)))
                    }
                });
            }
        }
        Ok(BoxGrid {
            width,
            height,
            cells,
        })
    }

    /// Downsample a fine bitmap: a box is free iff every pixel in its
    /// `box_size` block is free. Trailing partial blocks are dropped.
    pub fn downsample(grid: &OccupancyGrid, box_size: u32) -> Result<BoxGrid> {
        let width = grid.width() / box_size;
        let height = grid.height() / box_size;
        if width == 0 || height == 0 {
            return Err(Error::Map(format!(
                "map raster {}x{} is smaller than one {} pixel box",
                grid.width(),
                grid.height(),
                box_size
            )));
        }
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for by in 0..height {
            for bx in 0..width {
                let mut free = true;
                'block: for py in 0..box_size {
                    for px in 0..box_size {
                        if grid.is_wall((bx * box_size + px) as i64, (by * box_size + py) as i64) {
                            free = false;
                            break 'block;
                        }
                    }
                }
                cells.push(if free { BoxCell::Free } else { BoxCell::Solid });
            }
        }
        Ok(BoxGrid {
            width,
            height,
            cells,
        })
    }

    /// Expand back to a pixel bitmap, one `box_size` block per cell.
    pub fn rasterize(&self, box_size: u32) -> OccupancyGrid {
        let width = self.width * box_size;
        let height = self.height * box_size;
        let mut buffer = vec![CellFlags::WALL.bits(); (width as usize) * (height as usize)];
        for by in 0..self.height {
            for bx in 0..self.width {
                if self.get(bx as i64, by as i64).is_free() {
                    for py in 0..box_size {
                        let row = ((by * box_size + py) * width + bx * box_size) as usize;
                        for px in 0..box_size as usize {
                            buffer[row + px] = CellFlags::NONE.bits();
                        }
                    }
                }
            }
        }
        OccupancyGrid {
            width,
            height,
            buffer,
        }
    }

    /// Write a grayscale visualization (solid black, free white, markers
    /// mid-gray), one pixel per box cell.
    pub fn render_image<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let pixels: Vec<u8> = self
            .cells
            .iter()
            .map(|c| match c {
                BoxCell::Solid => 0u8,
                BoxCell::Free => 255,
                BoxCell::Marker => 128,
            })
            .collect();
        let image = image::GrayImage::from_raw(self.width, self.height, pixels)
            .expect("pixel buffer matches grid dimensions");
        image.save(path)?;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: i64, y: i64) -> BoxCell {
        if x < 0 || x >= self.width as i64 || y < 0 || y >= self.height as i64 {
            return BoxCell::Solid;
        }
        self.cells[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Out-of-bounds cells read as solid.
    #[inline]
    pub fn is_free(&self, x: i64, y: i64) -> bool {
        self.get(x, y).is_free()
    }

    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_free()).count()
    }

    /// Stable fingerprint of the grid contents; persisted graph blobs are
    /// keyed against it.
    pub fn digest(&self) -> u64 {
        let mut hasher = fnv::FnvHasher::default();
        hasher.write_u32(self.width);
        hasher.write_u32(self.height);
        for cell in &self.cells {
            hasher.write_u8(match cell {
                BoxCell::Solid => 0,
                BoxCell::Free => 1,
                BoxCell::Marker => 2,
            });
        }
        hasher.finish()
    }
}
