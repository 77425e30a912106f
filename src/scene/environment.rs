//! Environment properties of a scene: lighting, backdrop, weather.

use glam::{Vec2, Vec3};

/// Number of skydomes an environment can carry.
pub const NUM_SKYDOMES: usize = 2;

/// Number of directional lights an environment can carry. The first light
/// is the "main" light.
pub const NUM_LIGHTS: usize = 3;

/// Skydome properties.
#[derive(Debug, Clone, Default)]
pub struct Skydome {
    /// Name of the skydome's game object type.
    pub name: String,
    /// Scale to instantiate the skydome with.
    pub scale: f64,
    /// Rotation around the X axis, in radians.
    pub tilt: f64,
    /// Rotation around the Z axis, in radians.
    pub z_angle: f64,
}

/// A directional environment light.
#[derive(Debug, Clone)]
pub struct EnvironmentLight {
    /// Direction the light is pointing **from**.
    pub from_direction: Vec3,
    /// Diffuse color of the light.
    pub color: Vec3,
    /// Specular color of the light.
    pub specular_color: Vec3,
    /// Intensity of the light.
    pub intensity: f32,
}

impl Default for EnvironmentLight {
    fn default() -> Self {
        Self {
            from_direction: Vec3::new(0.0, 1.0, 0.0),
            color: Vec3::ONE,
            specular_color: Vec3::ZERO,
            intensity: 0.5,
        }
    }
}

/// Wind properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct Wind {
    /// Direction of the wind on the XY plane.
    pub to_direction: Vec2,
    /// Speed of the wind, in world units per second.
    pub speed: f32,
}

/// The physical characteristics of a scene.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The environment's name.
    pub name: String,

    /// Skydomes, rendered behind all other objects, on top of each other in
    /// stored order.
    pub skydomes: [Skydome; NUM_SKYDOMES],

    /// The directional lights. `lights[0]` is the main light.
    pub lights: [EnvironmentLight; NUM_LIGHTS],

    /// Omnidirectional light applied to every object, even with all lights
    /// off.
    pub ambient_color: Vec3,

    /// Wind information.
    pub wind: Wind,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            name: String::new(),
            skydomes: Default::default(),
            lights: Default::default(),
            ambient_color: Vec3::splat(0.1),
            wind: Wind::default(),
        }
    }
}
