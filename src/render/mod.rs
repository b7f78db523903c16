//! Rendering backends.
//!
//! Both backends consume the same display list: [`pdf`] writes the
//! primary vector PDF page, [`raster`] paints the optional PNG
//! preview. Geometry decisions all happen upstream in the builders;
//! the backends only translate coordinates.

pub mod pdf;
pub mod raster;
