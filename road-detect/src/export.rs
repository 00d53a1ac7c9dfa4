use crate::FrameError;
use image::RgbImage;
use ply_rs::{
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use road_core::{nalgebra::Point3, PointCloud};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// The file formats a point cloud can be dumped in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointFormat {
    /// ASCII PLY with a colour per point.
    Ply,
    /// One `X Y Z` line per point.
    Xyz,
}

impl PointFormat {
    /// PLY for a `.ply` extension, plain coordinates otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("ply") => Self::Ply,
            _ => Self::Xyz,
        }
    }
}

/// Writes colored points as an ASCII PLY file.
pub fn export_ply(
    mut writer: impl Write,
    points_and_colors: impl IntoIterator<Item = (Point3<f64>, [u8; 3])>,
) -> io::Result<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header
        .comments
        .push("Exported from road-detect".to_string());

    let mut point_element = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        let p = PropertyDef::new(axis.to_string(), PropertyType::Scalar(ScalarType::Double));
        point_element.properties.add(p);
    }
    for channel in ["red", "green", "blue"] {
        let p = PropertyDef::new(channel.to_string(), PropertyType::Scalar(ScalarType::UChar));
        point_element.properties.add(p);
    }
    ply.header.elements.add(point_element);

    let vertices: Vec<DefaultElement> = points_and_colors
        .into_iter()
        .map(|(p, [r, g, b])| {
            let mut point = DefaultElement::new();
            point.insert("x".to_string(), Property::Double(p.x));
            point.insert("y".to_string(), Property::Double(p.y));
            point.insert("z".to_string(), Property::Double(p.z));
            point.insert("red".to_string(), Property::UChar(r));
            point.insert("green".to_string(), Property::UChar(g));
            point.insert("blue".to_string(), Property::UChar(b));
            point
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices);

    Writer::new().write_ply(&mut writer, &mut ply)?;
    writer.flush()
}

/// Writes one space separated `X Y Z` line per point.
pub fn export_xyz(
    mut writer: impl Write,
    points: impl IntoIterator<Item = Point3<f64>>,
) -> io::Result<()> {
    for p in points {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    writer.flush()
}

/// Dumps a frame's point cloud to `path`, replacing what was there.
///
/// In PLY format each point takes the colour of its pixel in `image`.
pub fn write_point_cloud(
    path: &Path,
    cloud: &PointCloud,
    image: &RgbImage,
) -> Result<(), FrameError> {
    let write_error = |source| FrameError::Write {
        path: path.to_owned(),
        source,
    };
    let writer = BufWriter::new(File::create(path).map_err(write_error)?);
    let written = match PointFormat::from_path(path) {
        PointFormat::Ply => export_ply(
            writer,
            cloud.iter().map(|p| {
                let (x, y) = (p.pixel.col as u32, p.pixel.row as u32);
                let color = if x < image.width() && y < image.height() {
                    image.get_pixel(x, y).0
                } else {
                    [0; 3]
                };
                (p.point, color)
            }),
        ),
        PointFormat::Xyz => export_xyz(writer, cloud.points()),
    };
    written.map_err(write_error)
}
