//! Plane location inside frame buffers
//!
//! Turns a [`FrameLayout`] into views on individual planes, optionally
//! restricted to one field of an interlaced frame. A field view keeps every
//! other physical scanline: half the height, twice the stride, and the
//! bottom field starts one scanline further into the plane.

use crate::error::{Error, Result};
use crate::format::PlaneRole;
use crate::geometry::{FrameLayout, PlaneGeometry};

/// One field of an interlaced frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Even scanlines (field 0)
    Top,
    /// Odd scanlines (field 1)
    Bottom,
}

/// Effective geometry of a plane (or one field of it) inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneView {
    pub role: PlaneRole,
    /// Byte offset of the first row within the frame buffer
    pub offset: usize,
    pub width: u32,
    pub height: u32,
    /// Bytes between consecutive rows of this view
    pub stride: usize,
    /// One past the last byte the plane owns in the buffer
    pub end: usize,
}

impl PlaneView {
    fn check(&self, len: usize) -> Result<()> {
        if self.end > len {
            return Err(Error::GeometryMismatch(format!(
                "{:?} plane ends at byte {} but buffer holds {}",
                self.role, self.end, len
            )));
        }
        Ok(())
    }

    /// Borrow the viewed plane from a frame buffer
    pub fn plane<'a>(&self, buf: &'a [u8]) -> Result<Plane<'a>> {
        self.check(buf.len())?;
        Ok(Plane {
            data: &buf[self.offset..self.end],
            width: self.width,
            height: self.height,
            stride: self.stride,
        })
    }

    /// Mutably borrow the viewed plane from a frame buffer
    pub fn plane_mut<'a>(&self, buf: &'a mut [u8]) -> Result<PlaneMut<'a>> {
        self.check(buf.len())?;
        Ok(PlaneMut {
            data: &mut buf[self.offset..self.end],
            width: self.width,
            height: self.height,
            stride: self.stride,
        })
    }
}

/// Locate a plane of `layout`, restricted to `field` when given
///
/// Field heights are split per plane using that plane's own height: the
/// top field takes the extra row of an odd height.
pub fn locate(layout: &FrameLayout, role: PlaneRole, field: Option<Field>) -> Result<PlaneView> {
    let plane = layout.plane(role).ok_or_else(|| {
        Error::GeometryMismatch(format!("{} has no {:?} plane", layout.format, role))
    })?;
    Ok(view(plane, field))
}

/// Views of every plane of `layout`, in memory order
pub fn locate_all(layout: &FrameLayout, field: Option<Field>) -> Vec<PlaneView> {
    layout.planes.iter().map(|p| view(p, field)).collect()
}

fn view(plane: &PlaneGeometry, field: Option<Field>) -> PlaneView {
    match field {
        None => PlaneView {
            role: plane.role,
            offset: plane.offset,
            width: plane.width,
            height: plane.height,
            stride: plane.stride,
            end: plane.end(),
        },
        Some(field) => {
            let odd = plane.height % 2 == 1;
            let (height, offset) = match field {
                Field::Top => (plane.height / 2 + odd as u32, plane.offset),
                Field::Bottom => (plane.height / 2, plane.offset + plane.stride),
            };
            PlaneView {
                role: plane.role,
                offset,
                width: plane.width,
                height,
                stride: plane.stride * 2,
                end: plane.end(),
            }
        }
    }
}

/// Read-only strided plane
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub stride: usize,
}

impl<'a> Plane<'a> {
    /// Wrap a raw slice holding `height` rows `stride` bytes apart
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: usize) -> Self {
        Self {
            data,
            width,
            height,
            stride,
        }
    }

    /// Bytes of row `y`, from its start up to the next row or the end of the
    /// plane
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride;
        let end = (start + self.stride).min(self.data.len());
        &self.data[start..end]
    }
}

/// Writable strided plane
#[derive(Debug)]
pub struct PlaneMut<'a> {
    data: &'a mut [u8],
    pub width: u32,
    pub height: u32,
    pub stride: usize,
}

impl<'a> PlaneMut<'a> {
    /// Wrap a raw slice holding `height` rows `stride` bytes apart
    pub fn new(data: &'a mut [u8], width: u32, height: u32, stride: usize) -> Self {
        Self {
            data,
            width,
            height,
            stride,
        }
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        let end = (start + self.stride).min(self.data.len());
        &self.data[start..end]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let end = (start + self.stride).min(self.data.len());
        &mut self.data[start..end]
    }
}
