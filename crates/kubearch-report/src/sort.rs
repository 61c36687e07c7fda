use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use kubearch_types::{ArchError, ImageResult};

/// Column to sort results by
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Image,
    ResourceName,
    Namespace,
    ResourceKind,
    IsArmCompatible,
}

impl SortKey {
    fn compare(&self, a: &ImageResult, b: &ImageResult) -> Ordering {
        match self {
            Self::Image => cmp_ignore_case(&a.image, &b.image),
            Self::ResourceName => cmp_ignore_case(&a.resource_name, &b.resource_name),
            Self::Namespace => cmp_ignore_case(&a.namespace, &b.namespace),
            Self::ResourceKind => {
                cmp_ignore_case(a.resource_kind.as_str(), b.resource_kind.as_str())
            }
            Self::IsArmCompatible => {
                u8::from(a.is_arm_compatible).cmp(&u8::from(b.is_arm_compatible))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::ResourceName => "name",
            Self::Namespace => "namespace",
            Self::ResourceKind => "kind",
            Self::IsArmCompatible => "arm",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "name" | "resourcename" | "resource-name" => Ok(Self::ResourceName),
            "namespace" | "ns" => Ok(Self::Namespace),
            "kind" | "resourcekind" | "resource-kind" | "type" => Ok(Self::ResourceKind),
            "arm" | "arm64" | "compatible" | "isarmcompatible" => Ok(Self::IsArmCompatible),
            other => Err(ArchError::parse("sort key", format!("unknown sort key '{}'", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Return a sorted copy of `results`; equal keys keep their original order
pub fn sort(results: &[ImageResult], key: SortKey, direction: SortDirection) -> Vec<ImageResult> {
    let mut sorted = results.to_vec();
    match direction {
        SortDirection::Ascending => sorted.sort_by(|a, b| key.compare(a, b)),
        SortDirection::Descending => sorted.sort_by(|a, b| key.compare(b, a)),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubearch_types::{ImageReference, ResourceKind};

    fn result(image: &str, kind: ResourceKind, name: &str, ns: &str, arm: bool) -> ImageResult {
        let reference = ImageReference::new(image.into(), kind, name.into(), ns.into());
        let arch = if arm { "arm64" } else { "amd64" };
        ImageResult::inspected(&reference, vec![arch.to_string()])
    }

    fn fixture() -> Vec<ImageResult> {
        vec![
            result("nginx:1.25", ResourceKind::Pod, "web", "prod", true),
            result("Alpine:3.18", ResourceKind::Job, "migrate", "dev", false),
            result("busybox", ResourceKind::DaemonSet, "Agent", "kube-system", true),
            result("redis:7", ResourceKind::StatefulSet, "cache", "prod", false),
        ]
    }

    fn images(results: &[ImageResult]) -> Vec<&str> {
        results.iter().map(|r| r.image.as_str()).collect()
    }

    #[test]
    fn test_sort_by_image_ignores_case() {
        let sorted = sort(&fixture(), SortKey::Image, SortDirection::Ascending);
        assert_eq!(images(&sorted), vec!["Alpine:3.18", "busybox", "nginx:1.25", "redis:7"]);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let input = fixture();
        let before = input.clone();
        let _ = sort(&input, SortKey::Namespace, SortDirection::Descending);
        assert_eq!(input, before);
    }

    #[test]
    fn test_boolean_key_is_stable() {
        let sorted = sort(&fixture(), SortKey::IsArmCompatible, SortDirection::Ascending);
        assert_eq!(images(&sorted), vec!["Alpine:3.18", "redis:7", "nginx:1.25", "busybox"]);

        let sorted = sort(&fixture(), SortKey::IsArmCompatible, SortDirection::Descending);
        assert_eq!(images(&sorted), vec!["nginx:1.25", "busybox", "Alpine:3.18", "redis:7"]);
    }

    #[test]
    fn test_sort_by_kind_and_name() {
        let sorted = sort(&fixture(), SortKey::ResourceKind, SortDirection::Ascending);
        assert_eq!(images(&sorted), vec!["busybox", "Alpine:3.18", "nginx:1.25", "redis:7"]);

        let sorted = sort(&fixture(), SortKey::ResourceName, SortDirection::Ascending);
        assert_eq!(images(&sorted), vec!["busybox", "redis:7", "Alpine:3.18", "nginx:1.25"]);
    }

    #[test]
    fn test_sort_twice_is_identical() {
        for key in [
            SortKey::Image,
            SortKey::ResourceName,
            SortKey::Namespace,
            SortKey::ResourceKind,
            SortKey::IsArmCompatible,
        ] {
            let once = sort(&fixture(), key, SortDirection::Ascending);
            let twice = sort(&once, key, SortDirection::Ascending);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_reverse_without_ties() {
        let asc = sort(&fixture(), SortKey::Image, SortDirection::Ascending);
        let mut desc = sort(&fixture(), SortKey::Image, SortDirection::Descending);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_parse_sort_key() {
        assert_eq!("kind".parse::<SortKey>().unwrap(), SortKey::ResourceKind);
        assert_eq!("ARM".parse::<SortKey>().unwrap(), SortKey::IsArmCompatible);
        assert!("size".parse::<SortKey>().is_err());
        assert_eq!(SortDirection::Ascending.reversed(), SortDirection::Descending);
    }
}
