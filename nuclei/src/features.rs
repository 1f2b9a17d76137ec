//! CSV feature file: one row per accepted nucleus.
//!
//! ```text
//! AreaInPixels,PhysicalSize,Polygon
//! 9,36,[1001.5:2001.5:1001.5:2002.5:1002.5:2002.5]
//! ```

use std::fmt::Write as _;
use std::io::Write;

use csv::Writer;
use glam::DVec2;

use crate::nucleus::Nucleus;

pub const FEATURES_CSV_HEADER: [&str; 3] = ["AreaInPixels", "PhysicalSize", "Polygon"];

/// Streams nuclei into a CSV writer.
#[derive(Debug)]
pub struct FeatureWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> FeatureWriter<W> {
    /// Wrap `inner` and write the header row.
    pub fn new(inner: W) -> csv::Result<Self> {
        let mut writer = Writer::from_writer(inner);
        writer.write_record(FEATURES_CSV_HEADER)?;
        Ok(Self { writer })
    }

    pub fn write_nucleus(&mut self, nucleus: &Nucleus) -> csv::Result<()> {
        self.writer.write_record([
            nucleus.native_area.to_string(),
            nucleus.pixel_area.to_string(),
            format_polygon(&nucleus.polygon),
        ])
    }

    /// Flush and hand back the inner writer.
    pub fn finish(self) -> csv::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

/// `[x1:y1:x2:y2:...]` with one decimal digit per coordinate.
pub fn format_polygon(polygon: &[DVec2]) -> String {
    let mut out = String::with_capacity(polygon.len() * 16 + 2);
    out.push('[');
    for (i, p) in polygon.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{:.1}:{:.1}", p.x, p.y);
    }
    out.push(']');
    out
}

/// Render a complete feature file into memory.
pub fn render_features(nuclei: &[Nucleus]) -> csv::Result<Vec<u8>> {
    let mut writer = FeatureWriter::new(Vec::new())?;
    for nucleus in nuclei {
        writer.write_nucleus(nucleus)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_polygon() {
        let polygon = vec![
            DVec2::new(1001.5, 2001.5),
            DVec2::new(3.0, -0.26),
            DVec2::new(12.04, 7.96),
        ];
        assert_eq!(format_polygon(&polygon), "[1001.5:2001.5:3.0:-0.3:12.0:8.0]");
        assert_eq!(format_polygon(&[]), "[]");
    }

    #[test]
    fn test_header_only_for_no_nuclei() {
        let bytes = render_features(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "AreaInPixels,PhysicalSize,Polygon\n");
    }

    #[test]
    fn test_rows_follow_header() {
        let nuclei = vec![
            Nucleus::new(
                vec![DVec2::new(1.0, 2.0), DVec2::new(1.0, 3.0), DVec2::new(2.0, 3.0)],
                36,
                2,
            ),
            Nucleus::new(
                vec![DVec2::new(0.5, 0.5), DVec2::new(0.5, 1.5), DVec2::new(1.5, 1.5)],
                25,
                1,
            ),
        ];
        let text = String::from_utf8(render_features(&nuclei).unwrap()).unwrap();
        assert_eq!(
            text,
            "AreaInPixels,PhysicalSize,Polygon\n\
             9,36,[1.0:2.0:1.0:3.0:2.0:3.0]\n\
             25,25,[0.5:0.5:0.5:1.5:1.5:1.5]\n"
        );
    }
}
