use serde::Serialize;
use serde_json::{json, Value};
use std::panic::Location;
use std::process::Command;

/// Run metadata attached to every report the CLI prints.
pub struct Payload {
    pub scenario: String,
    pub params: Value,
}

impl Payload {
    pub fn new(scenario: impl Into<String>, params: Value) -> Self {
        Self {
            scenario: scenario.into(),
            params,
        }
    }
}

/// Source tree a layout run came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceState {
    /// Short commit hash, or `None` outside a git checkout.
    pub rev: Option<String>,
    /// Uncommitted changes were present; layouts may not reproduce from `rev`.
    pub dirty: bool,
}

impl SourceState {
    /// `FLOORGEN_REV` (runtime, then build time) wins over asking git, so
    /// packaged binaries can report the revision they were built from.
    pub fn detect() -> Self {
        let pinned = std::env::var("FLOORGEN_REV")
            .ok()
            .or_else(|| option_env!("FLOORGEN_REV").map(str::to_owned))
            .filter(|rev| !rev.trim().is_empty());
        if let Some(rev) = pinned {
            return Self {
                rev: Some(rev.trim().to_owned()),
                dirty: false,
            };
        }
        Self {
            rev: git(&["rev-parse", "--short", "HEAD"]).filter(|rev| !rev.is_empty()),
            dirty: git(&["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|status| !status.is_empty()),
        }
    }
}

/// Trimmed stdout of a successful git invocation.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_owned())
}

/// Provenance block: source state, crate version, callsite and parameters.
#[track_caller]
pub fn document(payload: Payload) -> Value {
    let callsite = Location::caller();
    json!({
        "source": SourceState::detect(),
        "floorgen_version": floorgen::VERSION,
        "callsite": {
            "file": callsite.file(),
            "line": callsite.line()
        },
        "scenario": payload.scenario,
        "params": payload.params
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_carries_params_and_callsite() {
        let doc = document(Payload::new("basics", json!({"seed": 3, "count": 2})));
        assert_eq!(doc["scenario"], "basics");
        assert_eq!(doc["params"]["seed"], 3);
        assert_eq!(doc["floorgen_version"], floorgen::VERSION);
        assert!(doc["callsite"]["file"].as_str().unwrap().ends_with("provenance.rs"));
        assert!(doc["callsite"]["line"].as_u64().unwrap() > 0);
        assert!(doc["source"]["dirty"].is_boolean());
    }

    #[test]
    fn missing_checkout_serializes_as_null_rev() {
        let state = SourceState {
            rev: None,
            dirty: false,
        };
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"rev": null, "dirty": false})
        );
    }

    #[test]
    fn detected_rev_is_never_blank() {
        if let Some(rev) = SourceState::detect().rev {
            assert!(!rev.is_empty());
            assert_eq!(rev, rev.trim());
        }
    }
}
