use std::path::Path;
use std::sync::Arc;

use toptag::ml::{BDT_MODEL_VERSION, BdtModel, BoostType, ModelRegistry, Node, Tree};
use toptag::pipeline::{FEATURE_NAMES, SPECTATOR_NAMES, TOP_TAG_SCHEMA, TopTagProducer};
use toptag::toptagger::HepTopTaggerConfig;

pub const COLLECTION: &str = "CA15PFPuppi";

fn split(feature: usize, cut: f32, left: usize, right: usize) -> Node {
    Node::Split {
        feature,
        cut,
        cut_type: true,
        left,
        right,
    }
}

fn leaf(node_type: i8, purity: f32) -> Node {
    Node::Leaf {
        node_type,
        purity,
        response: 0.0,
    }
}

/// Two shallow trees on `tau32SD` and `htt_frec`.
pub fn cut_model() -> BdtModel {
    BdtModel {
        model_version: BDT_MODEL_VERSION,
        variables: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        spectators: SPECTATOR_NAMES.iter().map(|name| name.to_string()).collect(),
        boost: BoostType::AdaBoost,
        use_yes_no_leaf: true,
        trees: vec![
            Tree {
                weight: 0.7,
                nodes: vec![split(11, 0.65, 1, 2), leaf(1, 0.8), leaf(-1, 0.2)],
            },
            Tree {
                weight: 0.3,
                nodes: vec![split(12, 0.25, 1, 2), leaf(1, 0.7), leaf(-1, 0.3)],
            },
        ],
    }
}

/// Gradient-boosted variant keyed on the first ECF ratio.
pub fn grad_model() -> BdtModel {
    BdtModel {
        boost: BoostType::Grad,
        use_yes_no_leaf: false,
        trees: vec![Tree {
            weight: 1.0,
            nodes: vec![
                split(0, 0.5, 1, 2),
                Node::Leaf {
                    node_type: 1,
                    purity: 0.6,
                    response: 0.4,
                },
                Node::Leaf {
                    node_type: -1,
                    purity: 0.4,
                    response: -0.4,
                },
            ],
        }],
        ..cut_model()
    }
}

pub fn registry() -> Arc<ModelRegistry> {
    Arc::new(
        ModelRegistry::from_models(
            [("v0".to_string(), cut_model()), ("grad".to_string(), grad_model())],
            &TOP_TAG_SCHEMA,
        )
        .expect("registry"),
    )
}

pub fn producer() -> TopTagProducer {
    TopTagProducer::new(COLLECTION, registry(), HepTopTaggerConfig::default()).expect("producer")
}

pub fn write_model(path: &Path, model: &BdtModel) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("model dir");
    }
    let json = serde_json::to_string_pretty(model).expect("encode model");
    std::fs::write(path, json).expect("write model");
}
