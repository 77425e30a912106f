//! Tactical camera profiles.
//!
//! A tactical camera is a named preset for the RTS camera controller:
//! curves for distance, field of view and (optionally) pitch over the zoom
//! level, a yaw range, and clip distances. Profiles are loaded from an XML
//! configuration file; all angles are stored in degrees there and converted
//! to radians on load.

use super::rts_camera::{FreeProperty, PitchProperty, Range, RtsCameraController, ZoomProperty};

use crate::assets::AssetLoader;
use crate::error::Result;
use crate::io::xml::{self, Node};
use crate::math::{CubicInterpolator, Point};
use crate::renderer::Camera;

use log::error;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
struct FreePropertyConfig {
    range: Range,
    sensitivity: f64,
    smooth_time: f64,
}

#[derive(Debug, Clone)]
struct ZoomPropertyConfig {
    points: Vec<Point>,
    smooth_time: f64,
}

#[derive(Debug, Clone)]
enum PitchConfig {
    Free(FreePropertyConfig),
    Zoom(ZoomPropertyConfig),
}

#[derive(Debug, Clone)]
struct TacticalCameraConfig {
    pitch: PitchConfig,
    distance: ZoomPropertyConfig,
    fov: ZoomPropertyConfig,
    yaw: FreePropertyConfig,
    zoom_sensitivity: f64,
    near_clip: f64,
    far_clip: f64,
}

fn identity(value: f64) -> f64 {
    value
}

fn read_free_property(
    node: &Node,
    name: &str,
    convert: fn(f64) -> f64,
) -> Result<FreePropertyConfig> {
    let mut min = convert(xml::optional_child_value(node, &format!("{name}_Min"), 0.0)?);
    let mut max = convert(xml::optional_child_value(node, &format!("{name}_Max"), 0.0)?);
    let sensitivity = xml::optional_child_value(node, &format!("{name}_Per_Mouse_Unit"), 1.0)?;
    let smooth_time = xml::optional_child_value(node, &format!("{name}_Smooth_Time"), 0.1)?;
    if min > max {
        std::mem::swap(&mut min, &mut max);
    }
    Ok(FreePropertyConfig {
        range: Range { min, max },
        sensitivity,
        smooth_time,
    })
}

fn read_zoom_property(
    node: &Node,
    name: &str,
    use_spline: bool,
    convert: fn(f64) -> f64,
) -> Result<ZoomPropertyConfig> {
    let smooth_time = xml::optional_child_value(node, &format!("{name}_Smooth_Time"), 0.1)?;

    let points = if use_spline {
        // Zoom-based spline: a flat list of x,y control points
        let mut points: Vec<Point> =
            xml::optional_child_value(node, &format!("{name}_Spline"), Vec::new())?;
        for point in &mut points {
            point.y = convert(point.y);
        }
        points
    } else {
        // A plain range becomes a two-point curve over the zoom level
        let mut min = convert(xml::optional_child_value(node, &format!("{name}_Min"), 0.0)?);
        let mut max = convert(xml::optional_child_value(node, &format!("{name}_Max"), 0.0)?);
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        vec![Point::new(0.0, min), Point::new(1.0, max)]
    };

    Ok(ZoomPropertyConfig {
        points,
        smooth_time,
    })
}

fn read_tactical_camera(node: &Node) -> Result<(String, TacticalCameraConfig)> {
    let name = xml::require_attribute(node, "Name")?.to_string();

    let use_splines = xml::optional_child_value(node, "Use_Splines", false)?;
    let zoom_sensitivity = if use_splines {
        1.0 / f64::from(xml::optional_child_value(node, "Spline_Steps", 10u32)?.max(1))
    } else {
        0.1
    };

    let pitch = if use_splines {
        PitchConfig::Zoom(read_zoom_property(node, "Pitch", true, f64::to_radians)?)
    } else {
        PitchConfig::Free(read_free_property(node, "Pitch", f64::to_radians)?)
    };

    let mut yaw = read_free_property(node, "Yaw", f64::to_radians)?;
    // Yaw isn't smoothed in the original engine.
    yaw.smooth_time = 0.0;

    let config = TacticalCameraConfig {
        pitch,
        distance: read_zoom_property(node, "Distance", use_splines, identity)?,
        fov: read_zoom_property(node, "Fov", false, f64::to_radians)?,
        yaw,
        zoom_sensitivity,
        near_clip: xml::optional_child_value(node, "Near_Clip", 10.0)?,
        far_clip: xml::optional_child_value(node, "Far_Clip", 10000.0)?,
    };
    Ok((name, config))
}

/// Loads and stores tactical camera profiles and creates configured
/// [`RtsCameraController`] objects from them.
pub struct TacticalCameraStore {
    cameras: FxHashMap<String, TacticalCameraConfig>,
}

impl TacticalCameraStore {
    /// Loads all profiles from an XML configuration file. Profiles that
    /// fail to parse are logged and skipped.
    #[must_use]
    pub fn load(asset_loader: &AssetLoader, filename: &str) -> Self {
        let mut cameras = FxHashMap::default();

        if let Some(text) = asset_loader.open_config(filename) {
            match xml::parse(&text) {
                Ok(doc) => {
                    for node in xml::elements(&doc.root_element()) {
                        match read_tactical_camera(&node) {
                            Ok((name, config)) => {
                                cameras.insert(name.to_ascii_uppercase(), config);
                            }
                            Err(err) => error!("error reading tactical cameras: {err}"),
                        }
                    }
                }
                Err(err) => error!("error reading tactical cameras: {err}"),
            }
        }
        Self { cameras }
    }

    /// Number of loaded profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Creates a camera controller from the named profile (lookup is
    /// case-insensitive), configuring `camera`'s clip planes and snapping
    /// the controller to its initial pose.
    #[must_use]
    pub fn create(&self, name: &str, camera: &mut Camera) -> Option<RtsCameraController> {
        let config = self.cameras.get(&name.to_ascii_uppercase())?;

        let interpolator = |points: &[Point]| -> Option<CubicInterpolator> {
            CubicInterpolator::new(points.to_vec())
                .map_err(|err| error!("bad tactical camera curve for \"{name}\": {err}"))
                .ok()
        };

        let mut controller = RtsCameraController::new(camera, glam::Vec2::ZERO);
        controller.set_zoom_sensitivity(config.zoom_sensitivity);
        controller.set_distance_property(
            camera,
            ZoomProperty {
                interpolator: interpolator(&config.distance.points)?.into(),
                smooth_time: config.distance.smooth_time,
            },
        );
        controller.set_fov_property(
            camera,
            ZoomProperty {
                interpolator: interpolator(&config.fov.points)?.into(),
                smooth_time: config.fov.smooth_time,
            },
        );
        controller.set_yaw_property(
            camera,
            FreeProperty {
                constraint: config.yaw.range,
                sensitivity: config.yaw.sensitivity,
                smooth_time: config.yaw.smooth_time,
            },
        );
        match &config.pitch {
            PitchConfig::Free(free) => controller.set_pitch_property(
                camera,
                PitchProperty::Free(FreeProperty {
                    constraint: free.range,
                    sensitivity: free.sensitivity,
                    smooth_time: free.smooth_time,
                }),
            ),
            PitchConfig::Zoom(zoom) => controller.set_pitch_property(
                camera,
                PitchProperty::Zoom(ZoomProperty {
                    interpolator: interpolator(&zoom.points)?.into(),
                    smooth_time: zoom.smooth_time,
                }),
            ),
        }

        camera.set_znear(config.near_clip as f32);
        camera.set_zfar(config.far_clip as f32);

        // Snap to the configured pose before handing the controller out
        controller.update_immediate(camera);
        Some(controller)
    }
}
