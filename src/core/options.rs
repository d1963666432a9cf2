//! Build options and their platform-conditional normalization.

use serde::{Deserialize, Serialize};

use crate::core::settings::Os;

/// The declared build options of a project.
///
/// `fpic` is `None` when the option does not exist for the target platform;
/// it is never rendered in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    /// Build shared libraries instead of static ones
    pub shared: bool,

    /// Compile position-independent code
    #[serde(rename = "fPIC", default, skip_serializing_if = "Option::is_none")]
    pub fpic: Option<bool>,
}

impl Default for OptionSet {
    fn default() -> Self {
        OptionSet {
            shared: false,
            fpic: Some(true),
        }
    }
}

impl OptionSet {
    /// Whether the `fPIC` option exists in this set.
    pub fn has_fpic(&self) -> bool {
        self.fpic.is_some()
    }

    /// Options as `(name, value)` pairs in declaration order, absent options skipped.
    pub fn entries(&self) -> Vec<(&'static str, bool)> {
        let mut entries = vec![("shared", self.shared)];
        if let Some(fpic) = self.fpic {
            entries.push(("fPIC", fpic));
        }
        entries
    }
}

/// Remove options that have no meaning on `os`.
pub fn resolve(options: OptionSet, os: &Os) -> OptionSet {
    if os.pic_is_meaningless() {
        tracing::debug!("dropping fPIC option for {}", os);
        OptionSet {
            fpic: None,
            ..options
        }
    } else {
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_defaults() {
        let opts = OptionSet::default();
        assert!(!opts.shared);
        assert_eq!(opts.fpic, Some(true));
    }

    #[test]
    fn test_resolve_windows_removes_fpic() {
        let resolved = resolve(OptionSet::default(), &Os::Windows);
        assert!(!resolved.has_fpic());
        assert_eq!(resolved.entries(), vec![("shared", false)]);

        let json = serde_json::to_value(resolved).unwrap();
        assert!(json.get("fPIC").is_none());
    }

    #[test]
    fn test_resolve_keeps_declared_fpic_elsewhere() {
        for os in [Os::Linux, Os::Macos, Os::FreeBsd, Os::Other("Haiku".into())] {
            let resolved = resolve(OptionSet::default(), &os);
            assert_eq!(resolved.fpic, Some(true));
        }

        let declared = OptionSet {
            shared: true,
            fpic: Some(false),
        };
        assert_eq!(resolve(declared, &Os::Linux), declared);
    }

    #[test]
    fn test_resolve_preserves_shared_on_windows() {
        let declared = OptionSet {
            shared: true,
            fpic: Some(true),
        };
        let resolved = resolve(declared, &Os::Windows);
        assert!(resolved.shared);
        assert_eq!(resolved.fpic, None);
    }

    #[test]
    fn test_serialized_key_is_fpic() {
        let json = serde_json::to_string(&OptionSet::default()).unwrap();
        assert_eq!(json, r#"{"shared":false,"fPIC":true}"#);
    }
}
