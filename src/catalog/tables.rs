//! Published serving image tables

use std::collections::HashMap;
use std::sync::LazyLock;

/// One framework/scope entry of the catalog
#[derive(Debug)]
pub struct FrameworkImages {
    pub repository: &'static str,
    pub processors: &'static [&'static str],
    pub version_aliases: &'static [(&'static str, &'static str)],
    /// Full version -> supported python versions
    pub versions: &'static [(&'static str, &'static [&'static str])],
    /// Region -> ECR registry account
    pub registries: &'static HashMap<&'static str, &'static str>,
}

/// Registry account serving the deep learning containers in most regions
const DLC_DEFAULT_ACCOUNT: &str = "763104351884";

static DLC_REGISTRIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    for region in [
        "ap-northeast-1",
        "ap-northeast-2",
        "ap-northeast-3",
        "ap-south-1",
        "ap-southeast-1",
        "ap-southeast-2",
        "ca-central-1",
        "eu-central-1",
        "eu-north-1",
        "eu-west-1",
        "eu-west-2",
        "eu-west-3",
        "sa-east-1",
        "us-east-1",
        "us-east-2",
        "us-west-1",
        "us-west-2",
    ] {
        map.insert(region, DLC_DEFAULT_ACCOUNT);
    }

    // Opt-in and isolated regions host their own registries
    map.insert("af-south-1", "626614931356");
    map.insert("ap-east-1", "871362719292");
    map.insert("ap-south-2", "772153158452");
    map.insert("ap-southeast-3", "907027046896");
    map.insert("ap-southeast-4", "457447274322");
    map.insert("ca-west-1", "204538143572");
    map.insert("cn-north-1", "727897471807");
    map.insert("cn-northwest-1", "727897471807");
    map.insert("eu-central-2", "380420809688");
    map.insert("eu-south-1", "692866216735");
    map.insert("eu-south-2", "503227376785");
    map.insert("il-central-1", "780543022126");
    map.insert("me-central-1", "914824155844");
    map.insert("me-south-1", "217643126080");
    map.insert("us-gov-east-1", "446045086412");
    map.insert("us-gov-west-1", "442386744353");

    map
});

const PY39: &[&str] = &["py39"];
const PY310: &[&str] = &["py310"];
const PY311: &[&str] = &["py311"];

static PYTORCH_INFERENCE: LazyLock<FrameworkImages> = LazyLock::new(|| FrameworkImages {
    repository: "pytorch-inference",
    processors: &["cpu", "gpu"],
    version_aliases: &[
        ("1.13", "1.13.1"),
        ("2.0", "2.0.1"),
        ("2.1", "2.1.0"),
        ("2.2", "2.2.0"),
        ("2.3", "2.3.0"),
    ],
    versions: &[
        ("1.13.1", PY39),
        ("2.0.0", PY310),
        ("2.0.1", PY310),
        ("2.1.0", PY310),
        ("2.2.0", PY310),
        ("2.3.0", PY311),
    ],
    registries: &DLC_REGISTRIES,
});

/// Look up the image table for a framework and scope
pub fn framework_images(framework: &str, image_scope: &str) -> Option<&'static FrameworkImages> {
    match (framework, image_scope) {
        ("pytorch", "inference") => Some(&PYTORCH_INFERENCE),
        _ => None,
    }
}

/// Frameworks known to the catalog, for error messages
pub const KNOWN_FRAMEWORKS: &[&str] = &["pytorch"];
