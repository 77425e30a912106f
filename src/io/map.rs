//! Map binary format.
//!
//! A map file is a chunked file with a header (only version 0x201 is
//! accepted) and a map-data container holding the environment set: the
//! environments themselves and the index of the active one. Environment
//! fields arrive as minichunks; some angles are stored in degrees and are
//! converted to radians on load.

use super::chunk::{payload_string, ByteCursor, ChunkReader, MinichunkReader};

use crate::error::{Error, Result};
use crate::scene::{Environment, NUM_LIGHTS};

use glam::{Vec2, Vec3};

const CHUNK_MAP_INFO: u32 = 0x00;
const CHUNK_MAP_DATA: u32 = 0x01;
const CHUNK_ENVIRONMENT_SET: u32 = 0x100;
const CHUNK_ENVIRONMENTS: u32 = 0x04;
const CHUNK_ENVIRONMENT: u32 = 0x06;
const CHUNK_ACTIVE_ENVIRONMENT: u32 = 0x08;

/// The only supported map format version.
const MAP_FORMAT_VERSION: u32 = 0x201;

/// An in-memory map as read from a map file.
#[derive(Debug, Clone, Default)]
pub struct Map {
    pub environments: Vec<Environment>,
    /// Index into `environments`; 0 when the stored index is out of range.
    pub active_environment: usize,
}

impl Map {
    /// The active environment, if the map has any environments at all.
    #[must_use]
    pub fn active_environment(&self) -> Option<&Environment> {
        self.environments.get(self.active_environment)
    }
}

fn verify(condition: bool) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::InvalidFormat("map file failed validation".into()))
    }
}

fn as_f32(data: &[u8]) -> Result<f32> {
    verify(data.len() == 4)?;
    ByteCursor::new(data).read_f32()
}

fn as_u32(data: &[u8]) -> Result<u32> {
    verify(data.len() == 4)?;
    ByteCursor::new(data).read_u32()
}

fn as_rgb(data: &[u8]) -> Result<Vec3> {
    verify(data.len() == 12)?;
    ByteCursor::new(data).read_vec3()
}

// Unit vector pointing up from the XY plane by `tilt` radians, rotated
// around Z by `z_angle` radians.
fn direction_from_angles(tilt: f32, z_angle: f32) -> Vec3 {
    let r = tilt.cos();
    Vec3::new(r * z_angle.cos(), r * z_angle.sin(), tilt.sin())
}

fn read_map_version(data: &[u8]) -> Result<u32> {
    let mut version = 0;
    let mut reader = MinichunkReader::new(data);
    while reader.has_chunk() {
        if reader.id() == 0 {
            version = as_u32(reader.read_data()?)?;
        }
        reader.next()?;
    }
    Ok(version)
}

fn read_environment(data: &[u8]) -> Result<Environment> {
    let mut environment = Environment::default();

    // Light angles are stored in radians; by default the lights point to
    // +Y, lighting the front (-Y) of objects.
    let mut light_z_angles = [std::f32::consts::FRAC_PI_4; NUM_LIGHTS];
    let mut light_tilts = [0.0f32; NUM_LIGHTS];
    // The wind angle is stored in degrees
    let mut wind_z_angle = 0.0f32;

    let mut reader = MinichunkReader::new(data);
    while reader.has_chunk() {
        let payload = reader.read_data()?;
        match reader.id() {
            0 => environment.lights[0].color = as_rgb(payload)?,
            1 => environment.lights[1].color = as_rgb(payload)?,
            2 => environment.lights[2].color = as_rgb(payload)?,
            3 => environment.lights[0].specular_color = as_rgb(payload)?,
            4 => environment.ambient_color = as_rgb(payload)?,
            5 => environment.lights[0].intensity = as_f32(payload)?,
            6 => environment.lights[1].intensity = as_f32(payload)?,
            7 => environment.lights[2].intensity = as_f32(payload)?,
            8 => light_z_angles[0] = as_f32(payload)?,
            9 => light_z_angles[1] = as_f32(payload)?,
            10 => light_z_angles[2] = as_f32(payload)?,
            11 => light_tilts[0] = as_f32(payload)?,
            12 => light_tilts[1] = as_f32(payload)?,
            13 => light_tilts[2] = as_f32(payload)?,
            20 => environment.name = payload_string(payload),
            25 => environment.skydomes[0].name = payload_string(payload),
            26 => environment.skydomes[1].name = payload_string(payload),
            27 => environment.skydomes[0].scale = f64::from(as_f32(payload)?),
            28 => environment.skydomes[1].scale = f64::from(as_f32(payload)?),
            // Skydome angles are stored in degrees
            29 => environment.skydomes[0].tilt = f64::from(as_f32(payload)?.to_radians()),
            30 => environment.skydomes[1].tilt = f64::from(as_f32(payload)?.to_radians()),
            31 => environment.skydomes[0].z_angle = f64::from(as_f32(payload)?.to_radians()),
            32 => environment.skydomes[1].z_angle = f64::from(as_f32(payload)?.to_radians()),
            43 => wind_z_angle = as_f32(payload)?,
            44 => environment.wind.speed = as_f32(payload)?,
            _ => {}
        }
        reader.next()?;
    }

    for (light, (&z_angle, &tilt)) in environment
        .lights
        .iter_mut()
        .zip(light_z_angles.iter().zip(&light_tilts))
    {
        light.from_direction = direction_from_angles(tilt, z_angle);
    }
    let wind_radians = wind_z_angle.to_radians();
    environment.wind.to_direction = Vec2::new(wind_radians.cos(), wind_radians.sin());

    Ok(environment)
}

fn read_active_environment(data: &[u8]) -> Result<u32> {
    let mut active = 0;
    let mut reader = MinichunkReader::new(data);
    while reader.has_chunk() {
        if reader.id() == 37 {
            active = as_u32(reader.read_data()?)?;
        }
        reader.next()?;
    }
    Ok(active)
}

fn read_environment_set(map: &mut Map, reader: &mut ChunkReader) -> Result<()> {
    while reader.has_chunk() {
        match reader.id() {
            CHUNK_ENVIRONMENTS => {
                verify(!reader.has_data())?;
                reader.open()?;
                while reader.has_chunk() {
                    if reader.id() == CHUNK_ENVIRONMENT {
                        verify(reader.has_data())?;
                        map.environments.push(read_environment(reader.read_data()?)?);
                    }
                    reader.next()?;
                }
                reader.close();
            }
            CHUNK_ACTIVE_ENVIRONMENT => {
                verify(reader.has_data())?;
                map.active_environment = read_active_environment(reader.read_data()?)? as usize;
            }
            _ => {}
        }
        reader.next()?;
    }

    if map.active_environment >= map.environments.len() {
        map.active_environment = 0;
    }
    Ok(())
}

/// Reads a map from the bytes of a map file.
pub fn read_map(data: &[u8]) -> Result<Map> {
    let mut map = Map::default();
    let mut reader = ChunkReader::new(data);

    while reader.has_chunk() {
        match reader.id() {
            CHUNK_MAP_INFO => {
                verify(reader.has_data())?;
                let version = read_map_version(reader.read_data()?)?;
                verify(version == MAP_FORMAT_VERSION)?;
            }
            CHUNK_MAP_DATA => {
                verify(!reader.has_data())?;
                reader.open()?;
                while reader.has_chunk() {
                    if reader.id() == CHUNK_ENVIRONMENT_SET {
                        verify(!reader.has_data())?;
                        reader.open()?;
                        read_environment_set(&mut map, &mut reader)?;
                        reader.close();
                    }
                    reader.next()?;
                }
                reader.close();
            }
            _ => {}
        }
        reader.next()?;
    }
    Ok(map)
}
