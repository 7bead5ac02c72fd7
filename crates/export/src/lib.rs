//! Export helpers for CZML documents, injection payloads and CSV artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Pretty-print any serializable payload as JSON to `path` (or stdout for `-`).
pub fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let mut writer = writer_for_path(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}

pub mod czml {
    use deflector_core::trajectory::TrajectorySegment;
    use serde::{Deserialize, Serialize};

    pub const DOCUMENT_ID: &str = "document";
    pub const CZML_VERSION: &str = "1.0";

    /// One CZML packet. Only the properties the trajectory document uses are modelled.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Packet {
        pub id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub clock: Option<Clock>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub availability: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub model: Option<Model>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub path: Option<PathGraphics>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub position: Option<Position>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Clock {
        pub interval: String,
        pub current_time: String,
        pub multiplier: f64,
        pub range: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Model {
        pub gltf: String,
        pub scale: f64,
        pub minimum_pixel_size: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PathGraphics {
        pub material: Material,
        pub width: f64,
        pub resolution: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Material {
        pub solid_color: SolidColor,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SolidColor {
        pub color: Rgba,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Rgba {
        pub rgba: [u8; 4],
    }

    /// Sampled position property: flat `[t, x, y, z, ...]` in seconds from `epoch` and metres.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Position {
        pub interpolation_algorithm: String,
        pub interpolation_degree: u32,
        pub reference_frame: String,
        pub epoch: String,
        pub cartesian: Vec<f64>,
    }

    /// Cosmetic settings for [`trajectory_document`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct DocumentStyle {
        pub document_name: String,
        pub entity_id: String,
        pub entity_name: String,
        pub clock_multiplier: f64,
        pub model_uri: String,
        pub model_scale: f64,
        pub model_minimum_pixel_size: f64,
        pub path_color_rgba: [u8; 4],
        pub path_width: f64,
        pub path_resolution: f64,
        pub interpolation_degree: u32,
    }

    /// Document packet plus one vehicle packet carrying the whole segment.
    ///
    /// `start_iso` must be the UTC rendering of the segment epoch and
    /// `end_iso` that of its last sample.
    pub fn trajectory_document(
        style: &DocumentStyle,
        segment: &TrajectorySegment,
        start_iso: &str,
        end_iso: &str,
    ) -> Vec<Packet> {
        let interval = format!("{start_iso}/{end_iso}");
        let document = Packet {
            id: DOCUMENT_ID.to_string(),
            name: Some(style.document_name.clone()),
            version: Some(CZML_VERSION.to_string()),
            clock: Some(Clock {
                interval: interval.clone(),
                current_time: start_iso.to_string(),
                multiplier: style.clock_multiplier,
                range: "LOOP_STOP".to_string(),
            }),
            availability: None,
            model: None,
            path: None,
            position: None,
        };
        let vehicle = Packet {
            id: style.entity_id.clone(),
            name: Some(style.entity_name.clone()),
            version: None,
            clock: None,
            availability: Some(interval),
            model: Some(Model {
                gltf: style.model_uri.clone(),
                scale: style.model_scale,
                minimum_pixel_size: style.model_minimum_pixel_size,
            }),
            path: Some(PathGraphics {
                material: Material {
                    solid_color: SolidColor {
                        color: Rgba {
                            rgba: style.path_color_rgba,
                        },
                    },
                },
                width: style.path_width,
                resolution: style.path_resolution,
            }),
            position: Some(Position {
                interpolation_algorithm: "LAGRANGE".to_string(),
                interpolation_degree: style.interpolation_degree,
                reference_frame: "INERTIAL".to_string(),
                epoch: start_iso.to_string(),
                cartesian: segment.flat_cartesian(),
            }),
        };
        vec![document, vehicle]
    }
}

pub mod injection {
    use deflector_core::vector::Vector3;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Xyz {
        pub x: f64,
        pub y: f64,
        pub z: f64,
    }

    impl From<Vector3> for Xyz {
        fn from(v: Vector3) -> Self {
            Self {
                x: v[0],
                y: v[1],
                z: v[2],
            }
        }
    }

    /// Heliocentric injection state as consumed by the visualisation client (km, km/s).
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct InjectionPayload {
        pub epoch: String,
        pub position: Xyz,
        pub velocity: Xyz,
        pub reference_body_position: Xyz,
    }
}

pub mod trajectory_csv {
    use std::io::{self, Write};

    use deflector_core::trajectory::TrajectorySegment;

    pub const HEADER: &str = "time_s,x_m,y_m,z_m";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// Write every sample of `segment` as one CSV row, header first.
    pub fn write_segment(writer: &mut dyn Write, segment: &TrajectorySegment) -> io::Result<()> {
        write_header(writer)?;
        for sample in segment.samples() {
            writeln!(
                writer,
                "{:.6},{:.3},{:.3},{:.3}",
                sample.time_s, sample.position_m[0], sample.position_m[1], sample.position_m[2]
            )?;
        }
        writer.flush()
    }
}
