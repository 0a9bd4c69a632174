// ============================================================
// Layer 3 — ModelType Domain Type
// ============================================================
// The architectures this harness knows how to train.
//
// The serialised names match the names used in config files
// and on the command line, so "ResNet_18" round-trips through
// JSON exactly as a user would type it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which classifier architecture a run trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    /// Two conv layers + three fully connected layers
    #[serde(rename = "LeNet")]
    LeNet,

    /// Compact residual network (three stages, one block each)
    #[serde(rename = "ResNet")]
    ResNet,

    /// ResNet-18 adapted to small inputs (3x3 stem, no max-pool)
    #[serde(rename = "ResNet_18")]
    ResNet18,
}

impl ModelType {
    /// Every supported architecture, in preset order
    pub const ALL: [ModelType; 3] = [ModelType::LeNet, ModelType::ResNet, ModelType::ResNet18];

    /// The canonical name used in configs, directories and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::LeNet    => "LeNet",
            ModelType::ResNet   => "ResNet",
            ModelType::ResNet18 => "ResNet_18",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = String;

    /// Accepts the canonical names plus a few common spellings
    /// ("lenet", "resnet18", "resnet-18").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        match normalised.as_str() {
            "lenet"    => Ok(ModelType::LeNet),
            "resnet"   => Ok(ModelType::ResNet),
            "resnet18" => Ok(ModelType::ResNet18),
            _ => Err(format!(
                "unknown model type '{s}' (expected one of: LeNet, ResNet, ResNet_18)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_canonical_and_loose_names() {
        assert_eq!("LeNet".parse::<ModelType>().unwrap(), ModelType::LeNet);
        assert_eq!("ResNet".parse::<ModelType>().unwrap(), ModelType::ResNet);
        assert_eq!("ResNet_18".parse::<ModelType>().unwrap(), ModelType::ResNet18);
        assert_eq!("resnet-18".parse::<ModelType>().unwrap(), ModelType::ResNet18);
        assert!("vgg".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_serde_uses_config_names() {
        let json = serde_json::to_string(&ModelType::ResNet18).unwrap();
        assert_eq!(json, "\"ResNet_18\"");

        let back: ModelType = serde_json::from_str("\"LeNet\"").unwrap();
        assert_eq!(back, ModelType::LeNet);
    }
}
