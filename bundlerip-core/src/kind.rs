//! Asset kind classification
//!
//! Maps Unity class ids and class names onto the set of asset kinds
//! the extraction pipeline knows how to handle. Anything outside that
//! set is carried as `Other` and extracted through the generic tiers.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// The kind of a serialized asset within a bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture2D,
    Sprite,
    TextAsset,
    AudioClip,
    Mesh,
    Material,
    Shader,
    AnimationClip,
    Animator,
    AnimatorController,
    Font,
    GameObject,
    Transform,
    MonoBehaviour,
    MonoScript,
    /// Any class the pipeline has no specific handling for
    Other(String),
}

impl AssetKind {
    /// Resolve a kind from a Unity class name
    pub fn from_class_name(name: &str) -> Self {
        match name {
            "Texture2D" => Self::Texture2D,
            "Sprite" => Self::Sprite,
            "TextAsset" => Self::TextAsset,
            "AudioClip" => Self::AudioClip,
            "Mesh" => Self::Mesh,
            "Material" => Self::Material,
            "Shader" => Self::Shader,
            "AnimationClip" => Self::AnimationClip,
            "Animator" => Self::Animator,
            "AnimatorController" => Self::AnimatorController,
            "Font" => Self::Font,
            "GameObject" => Self::GameObject,
            "Transform" => Self::Transform,
            "MonoBehaviour" => Self::MonoBehaviour,
            "MonoScript" => Self::MonoScript,
            other => Self::Other(other.to_string()),
        }
    }

    /// Resolve a kind from a Unity class id, when the name is not
    /// available from the reader
    pub fn from_class_id(class_id: i32) -> Self {
        match class_id {
            1 => Self::GameObject,
            4 => Self::Transform,
            21 => Self::Material,
            28 => Self::Texture2D,
            43 => Self::Mesh,
            48 => Self::Shader,
            49 => Self::TextAsset,
            74 => Self::AnimationClip,
            83 => Self::AudioClip,
            91 => Self::AnimatorController,
            95 => Self::Animator,
            114 => Self::MonoBehaviour,
            115 => Self::MonoScript,
            128 => Self::Font,
            213 => Self::Sprite,
            other => Self::Other(format!("Class_{}", other)),
        }
    }

    /// The class name, used as the per-kind output directory name
    pub fn name(&self) -> &str {
        match self {
            Self::Texture2D => "Texture2D",
            Self::Sprite => "Sprite",
            Self::TextAsset => "TextAsset",
            Self::AudioClip => "AudioClip",
            Self::Mesh => "Mesh",
            Self::Material => "Material",
            Self::Shader => "Shader",
            Self::AnimationClip => "AnimationClip",
            Self::Animator => "Animator",
            Self::AnimatorController => "AnimatorController",
            Self::Font => "Font",
            Self::GameObject => "GameObject",
            Self::Transform => "Transform",
            Self::MonoBehaviour => "MonoBehaviour",
            Self::MonoScript => "MonoScript",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for AssetKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AssetKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct KindVisitor;

        impl<'de> Visitor<'de> for KindVisitor {
            type Value = AssetKind;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a Unity class name")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<AssetKind, E> {
                Ok(AssetKind::from_class_name(value))
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_round_trip() {
        assert_eq!(AssetKind::from_class_name("Texture2D"), AssetKind::Texture2D);
        assert_eq!(AssetKind::from_class_name("Texture2D").name(), "Texture2D");
        assert_eq!(
            AssetKind::from_class_name("ParticleSystem"),
            AssetKind::Other("ParticleSystem".to_string())
        );
    }

    #[test]
    fn test_class_id_mapping() {
        assert_eq!(AssetKind::from_class_id(28), AssetKind::Texture2D);
        assert_eq!(AssetKind::from_class_id(114), AssetKind::MonoBehaviour);
        assert_eq!(
            AssetKind::from_class_id(999999),
            AssetKind::Other("Class_999999".to_string())
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&AssetKind::AudioClip).unwrap();
        assert_eq!(json, "\"AudioClip\"");
        let back: AssetKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AssetKind::AudioClip);
    }
}
