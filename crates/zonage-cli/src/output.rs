#![forbid(unsafe_code)]

use std::io::Write;

use serde::Serialize;
use zonage::Vec3;

use crate::error::Result;

pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn point(v: Vec3) -> String {
    format!("({:.1}, {:.1}, {:.1})", v.x, v.y, v.z)
}

pub fn extent(v: Vec3) -> String {
    format!("{:.1} x {:.1} x {:.1}", v.x, v.y, v.z)
}
