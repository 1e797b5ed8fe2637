//! Typed pick property documents
//!
//! Each pick type has its own property struct with serde defaults for every
//! optional field. [`PickProperties`] is the tagged union accepted by the
//! manager and parsed from TOML or RON documents. Keys are camelCase, with
//! snake_case accepted as an alias; unknown keys are rejected:
//!
//! ```toml
//! type = "ray"
//! enabled = true
//! filter = 7
//! maxDistance = 10.0
//! position = [0.0, 0.0, 0.0]
//! direction = [0.0, -1.0, 0.0]
//! ```

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, vectors, Quat, Quaternion, Vec3};
use crate::physics::{CollisionRegion, Ray, ShapeType};
use super::filter::PickFilter;
use super::pick::{Pick, PickSettings, PickSource, MOUSE_JOINT};
use super::sources::Hand;
use super::{PickError, PickType};

/// Properties of a ray pick (static, joint or mouse)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RayPickProperties {
    /// Start enabled
    pub enabled: bool,
    /// Raw filter bits
    pub filter: PickFilter,
    /// Maximum hit distance, 0 for unbounded
    #[serde(alias = "max_distance")]
    pub max_distance: f32,
    /// Joint to attach to; `"Mouse"` follows the pointer
    pub joint: Option<String>,
    /// Origin offset in joint space
    #[serde(alias = "pos_offset")]
    pub pos_offset: Vec3,
    /// Direction in joint space
    #[serde(alias = "dir_offset")]
    pub dir_offset: Vec3,
    /// World origin of a static ray; required without a joint
    pub position: Option<Vec3>,
    /// World direction of a static ray
    pub direction: Vec3,
}

impl Default for RayPickProperties {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: PickFilter::default(),
            max_distance: 0.0,
            joint: None,
            pos_offset: vectors::zero(),
            dir_offset: vectors::up(),
            position: None,
            direction: vectors::down(),
        }
    }
}

impl RayPickProperties {
    fn into_pick(self) -> Result<Pick, PickError> {
        let settings = PickSettings::new(self.filter, self.max_distance)?;

        let source = match self.joint {
            Some(joint) if joint == MOUSE_JOINT => PickSource::MouseRay,
            Some(joint) => {
                if !utils::is_finite(&self.pos_offset) {
                    return Err(PickError::DegenerateDirection("pos_offset"));
                }
                if !utils::is_finite(&self.dir_offset)
                    || self.dir_offset.try_normalize(f32::EPSILON).is_none()
                {
                    return Err(PickError::DegenerateDirection("dir_offset"));
                }
                PickSource::JointRay {
                    joint,
                    pos_offset: self.pos_offset,
                    dir_offset: self.dir_offset,
                }
            }
            None => {
                let position = self.position.ok_or(PickError::MissingField {
                    pick_type: PickType::Ray,
                    field: "position",
                })?;
                let ray = Ray::try_new(position, self.direction)
                    .filter(|ray| utils::is_finite(&ray.origin) && utils::is_finite(&ray.direction))
                    .ok_or(PickError::DegenerateDirection("direction"))?;
                PickSource::StaticRay { ray }
            }
        };

        Ok(Pick::new(source, settings).enabled(self.enabled))
    }
}

/// Properties of a stylus pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StylusPickProperties {
    /// 0 for left, 1 for right, anything else unbound
    pub hand: i32,
    /// Start enabled
    pub enabled: bool,
    /// Raw filter bits
    pub filter: PickFilter,
    /// Maximum hit distance, 0 for unbounded
    #[serde(alias = "max_distance")]
    pub max_distance: f32,
}

impl Default for StylusPickProperties {
    fn default() -> Self {
        Self {
            hand: -1,
            enabled: false,
            filter: PickFilter::default(),
            max_distance: 0.0,
        }
    }
}

impl StylusPickProperties {
    fn into_pick(self) -> Result<Pick, PickError> {
        let settings = PickSettings::new(self.filter, self.max_distance)?;
        let source = PickSource::Stylus {
            hand: Hand::from_index(self.hand),
        };
        Ok(Pick::new(source, settings).enabled(self.enabled))
    }
}

fn unit_dimensions() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0)
}

/// Shape part of a collision pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShapeProperties {
    /// Shape of the volume
    #[serde(alias = "shape_type")]
    pub shape_type: ShapeType,
    /// Size to scale the shape to
    #[serde(default = "unit_dimensions")]
    pub dimensions: Vec3,
    /// Model for model-based shapes
    #[serde(default, rename = "modelURL", alias = "modelUrl", alias = "model_url")]
    pub model_url: Option<String>,
}

/// Properties of a collision pick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CollisionPickProperties {
    /// Start enabled
    pub enabled: bool,
    /// Raw filter bits
    pub filter: PickFilter,
    /// Maximum contact distance from the region center, 0 for unbounded
    #[serde(alias = "max_distance")]
    pub max_distance: f32,
    /// Volume shape, required
    pub shape: Option<ShapeProperties>,
    /// World position, required
    pub position: Option<Vec3>,
    /// World orientation as `[x, y, z, w]`, required; normalized on load
    pub orientation: Option<Quaternion<f32>>,
}

impl CollisionPickProperties {
    fn into_pick(self) -> Result<Pick, PickError> {
        let missing = |field| PickError::MissingField {
            pick_type: PickType::Collision,
            field,
        };

        let settings = PickSettings::new(self.filter, self.max_distance)?;
        let shape = self.shape.ok_or_else(|| missing("shape"))?;
        let position = self.position.ok_or_else(|| missing("position"))?;
        let orientation = self.orientation.ok_or_else(|| missing("orientation"))?;

        if shape.shape_type.requires_model()
            && shape.model_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(PickError::MissingModelUrl(shape.shape_type));
        }
        let orientation = Quat::try_new(orientation, f32::EPSILON)
            .filter(|q| q.coords.iter().all(|c| c.is_finite()))
            .ok_or(PickError::InvalidOrientation)?;

        let region = CollisionRegion {
            shape: shape.shape_type,
            dimensions: shape.dimensions,
            model_url: shape.model_url,
            position,
            orientation,
        };
        Ok(Pick::new(PickSource::Collision { region }, settings).enabled(self.enabled))
    }
}

/// Creation request for any pick type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PickProperties {
    /// Ray pick
    Ray(RayPickProperties),
    /// Stylus pick
    Stylus(StylusPickProperties),
    /// Collision pick
    Collision(CollisionPickProperties),
}

impl PickProperties {
    /// Type of pick these properties describe
    pub fn pick_type(&self) -> PickType {
        match self {
            Self::Ray(_) => PickType::Ray,
            Self::Stylus(_) => PickType::Stylus,
            Self::Collision(_) => PickType::Collision,
        }
    }

    /// Validate and build the pick
    pub fn into_pick(self) -> Result<Pick, PickError> {
        match self {
            Self::Ray(properties) => properties.into_pick(),
            Self::Stylus(properties) => properties.into_pick(),
            Self::Collision(properties) => properties.into_pick(),
        }
    }

    /// Parse a TOML property document
    pub fn from_toml_str(document: &str) -> Result<Self, PickError> {
        toml::from_str(document).map_err(|e| PickError::Parse(e.to_string()))
    }

    /// Parse a RON property document
    pub fn from_ron_str(document: &str) -> Result<Self, PickError> {
        ron::from_str(document).map_err(|e| PickError::Parse(e.to_string()))
    }
}

impl From<RayPickProperties> for PickProperties {
    fn from(properties: RayPickProperties) -> Self {
        Self::Ray(properties)
    }
}

impl From<StylusPickProperties> for PickProperties {
    fn from(properties: StylusPickProperties) -> Self {
        Self::Stylus(properties)
    }
}

impl From<CollisionPickProperties> for PickProperties {
    fn from(properties: CollisionPickProperties) -> Self {
        Self::Collision(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_defaults() {
        let properties = RayPickProperties::default();
        assert!(!properties.enabled);
        assert_eq!(properties.filter, PickFilter::empty());
        assert_eq!(properties.dir_offset, vectors::up());
        assert_eq!(properties.direction, vectors::down());
    }

    #[test]
    fn test_static_ray_requires_position() {
        let result = PickProperties::Ray(RayPickProperties::default()).into_pick();
        assert!(matches!(
            result,
            Err(PickError::MissingField { field: "position", .. })
        ));
    }

    #[test]
    fn test_zero_direction_rejected() {
        let properties = RayPickProperties {
            position: Some(Vec3::zeros()),
            direction: Vec3::zeros(),
            ..Default::default()
        };
        assert!(matches!(
            properties.into_pick(),
            Err(PickError::DegenerateDirection("direction"))
        ));
    }

    #[test]
    fn test_negative_distance_rejected() {
        let properties = StylusPickProperties {
            max_distance: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            properties.into_pick(),
            Err(PickError::InvalidMaxDistance(_))
        ));
    }

    #[test]
    fn test_mouse_joint_builds_mouse_pick() {
        let properties = RayPickProperties {
            joint: Some(MOUSE_JOINT.to_string()),
            ..Default::default()
        };
        let pick = properties.into_pick().unwrap();
        assert_eq!(pick.source, PickSource::MouseRay);
    }

    #[test]
    fn test_toml_ray_document() {
        let properties = PickProperties::from_toml_str(
            r#"
            type = "ray"
            enabled = true
            filter = 7
            max_distance = 10.0
            position = [0.0, 0.0, 0.0]
            direction = [0.0, -2.0, 0.0]
            "#,
        )
        .unwrap();
        assert_eq!(properties.pick_type(), PickType::Ray);

        let pick = properties.into_pick().unwrap();
        assert!(pick.enabled);
        assert_eq!(pick.settings.filter, PickFilter::ENTITIES);
        assert_relative_eq!(pick.settings.max_distance(), 10.0);
        match pick.source {
            PickSource::StaticRay { ray } => {
                assert_relative_eq!(ray.direction, vectors::down(), epsilon = 1e-6);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_toml_collision_document() {
        let properties = PickProperties::from_toml_str(
            r#"
            type = "collision"
            enabled = true
            filter = 8
            position = [1.0, 0.0, 0.0]
            orientation = [0.0, 0.0, 0.0, 2.0]

            [shape]
            shapeType = "box"
            dimensions = [2.0, 1.0, 1.0]
            "#,
        )
        .unwrap();

        let pick = properties.into_pick().unwrap();
        match pick.source {
            PickSource::Collision { region } => {
                assert_eq!(region.shape, ShapeType::Box);
                assert_relative_eq!(region.orientation.w, 1.0, epsilon = 1e-6);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_collision_requires_fields() {
        let properties = CollisionPickProperties {
            shape: Some(ShapeProperties {
                shape_type: ShapeType::Sphere,
                dimensions: unit_dimensions(),
                model_url: None,
            }),
            position: Some(Vec3::zeros()),
            ..Default::default()
        };
        assert!(matches!(
            properties.into_pick(),
            Err(PickError::MissingField { field: "orientation", .. })
        ));
    }

    #[test]
    fn test_model_shape_needs_url() {
        let properties = CollisionPickProperties {
            shape: Some(ShapeProperties {
                shape_type: ShapeType::StaticMesh,
                dimensions: unit_dimensions(),
                model_url: None,
            }),
            position: Some(Vec3::zeros()),
            orientation: Some(Quaternion::identity()),
            ..Default::default()
        };
        assert!(matches!(
            properties.into_pick(),
            Err(PickError::MissingModelUrl(ShapeType::StaticMesh))
        ));
    }

    #[test]
    fn test_zero_orientation_rejected() {
        let properties = CollisionPickProperties {
            shape: Some(ShapeProperties {
                shape_type: ShapeType::Sphere,
                dimensions: unit_dimensions(),
                model_url: None,
            }),
            position: Some(Vec3::zeros()),
            orientation: Some(Quaternion::new(0.0, 0.0, 0.0, 0.0)),
            ..Default::default()
        };
        assert!(matches!(properties.into_pick(), Err(PickError::InvalidOrientation)));
    }

    #[test]
    fn test_ron_stylus_document() {
        let properties =
            PickProperties::from_ron_str(r#"{"type": "stylus", "hand": 1, "enabled": true}"#).unwrap();
        let pick = properties.into_pick().unwrap();
        assert_eq!(pick.source, PickSource::Stylus { hand: Hand::Right });
        assert!(pick.enabled);
    }

    #[test]
    fn test_camel_case_joint_document() {
        let properties = PickProperties::from_toml_str(
            r#"
            type = "ray"
            enabled = true
            filter = 7
            maxDistance = 4.0
            joint = "RightHand"
            posOffset = [0.0, 0.1, 0.0]
            dirOffset = [0.0, 0.0, -1.0]
            "#,
        )
        .unwrap();

        let pick = properties.into_pick().unwrap();
        assert_relative_eq!(pick.settings.max_distance(), 4.0);
        match pick.source {
            PickSource::JointRay {
                joint,
                pos_offset,
                dir_offset,
            } => {
                assert_eq!(joint, "RightHand");
                assert_relative_eq!(pos_offset, Vec3::new(0.0, 0.1, 0.0));
                assert_relative_eq!(dir_offset, vectors::forward());
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_camel_case_zero_dir_offset_rejected() {
        let properties = PickProperties::from_toml_str(
            "type = \"ray\"\njoint = \"Head\"\ndirOffset = [0.0, 0.0, 0.0]",
        )
        .unwrap();
        assert!(matches!(
            properties.into_pick(),
            Err(PickError::DegenerateDirection("dir_offset"))
        ));
    }

    #[test]
    fn test_camel_case_negative_distance_rejected() {
        let properties = PickProperties::from_toml_str(
            "type = \"ray\"\nmaxDistance = -1.0\nposition = [0.0, 0.0, 0.0]",
        )
        .unwrap();
        assert!(matches!(
            properties.into_pick(),
            Err(PickError::InvalidMaxDistance(_))
        ));
    }

    #[test]
    fn test_model_url_key() {
        let properties = PickProperties::from_toml_str(
            r#"
            type = "collision"
            position = [0.0, 0.0, 0.0]
            orientation = [0.0, 0.0, 0.0, 1.0]

            [shape]
            shapeType = "static-mesh"
            modelURL = "models/crate.fbx"
            "#,
        )
        .unwrap();

        let pick = properties.into_pick().unwrap();
        match pick.source {
            PickSource::Collision { region } => {
                assert_eq!(region.model_url.as_deref(), Some("models/crate.fbx"));
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_misspelled_key_is_parse_error() {
        let result = PickProperties::from_toml_str(
            "type = \"stylus\"\nhand = 1\nmaxDistanse = 2.0",
        );
        assert!(matches!(result, Err(PickError::Parse(_))));

        let result = PickProperties::from_toml_str(
            "type = \"collision\"\n[shape]\nshapeType = \"box\"\nmodel = \"x\"",
        );
        assert!(matches!(result, Err(PickError::Parse(_))));
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let result = PickProperties::from_toml_str("type = \"laser\"");
        assert!(matches!(result, Err(PickError::Parse(_))));
    }
}
