//! Campaign launch requests.
//!
//! A campaign request is an open key/value mapping taken from the form or
//! the JSON body. A handful of keys are understood by the built-in roster;
//! anything else rides along into the prompt variables unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Keys the built-in campaign roster references in its prompts.
pub const KNOWN_FIELDS: [&str; 7] = [
    "brand_name",
    "niche",
    "offer_name",
    "brand_voice",
    "budget_level",
    "audience_profile",
    "objective",
];

pub const DEFAULT_OBJECTIVE: &str = "Launch omni-channel growth campaign";

/// Filler used in prompts for known keys the caller left out.
const UNSPECIFIED: &str = "not specified";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignRequest {
    fields: BTreeMap<String, Value>,
}

impl CampaignRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs used by the `run` command when none are given.
    pub fn sample() -> Self {
        Self::new()
            .with("brand_name", "Popcorn Labs")
            .with("niche", "AI storyboard SaaS")
            .with("budget_level", "scrappy")
            .with("brand_voice", "bold, cinematic, human")
    }

    /// Build a request from raw form fields. Values are kept verbatim.
    pub fn from_form(form: HashMap<String, String>) -> Self {
        Self {
            fields: form
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drop `null` and blank values, then fill in the default objective.
    pub fn normalized(&self) -> Self {
        let mut fields: BTreeMap<String, Value> = self
            .fields
            .iter()
            .filter(|(_, v)| !is_blank(v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        fields
            .entry("objective".to_string())
            .or_insert_with(|| Value::String(DEFAULT_OBJECTIVE.to_string()));
        Self { fields }
    }

    /// Flatten the normalized request into prompt variables.
    ///
    /// Strings are used as-is, other JSON values are rendered compactly.
    /// Known keys that are missing become `"not specified"` so templates never
    /// leak raw placeholders.
    pub fn template_vars(&self) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = self
            .normalized()
            .fields
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect();
        for key in KNOWN_FIELDS {
            vars.entry(key.to_string())
                .or_insert_with(|| UNSPECIFIED.to_string());
        }
        vars
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_open_mapping() {
        let req: CampaignRequest = serde_json::from_value(json!({
            "brand_name": "Popcorn Labs",
            "channel": "tiktok",
            "budget": 500
        }))
        .unwrap();
        assert_eq!(req.len(), 3);
        assert_eq!(req.get("channel"), Some(&json!("tiktok")));
        assert_eq!(req.get("budget"), Some(&json!(500)));
    }

    #[test]
    fn test_normalized_drops_null_and_blank() {
        let req = CampaignRequest::new()
            .with("brand_name", "Popcorn Labs")
            .with("niche", Value::Null)
            .with("offer_name", "  ");
        let normalized = req.normalized();
        assert!(normalized.get("niche").is_none());
        assert!(normalized.get("offer_name").is_none());
        assert_eq!(normalized.get("brand_name"), Some(&json!("Popcorn Labs")));
    }

    #[test]
    fn test_objective_defaults_but_is_overridable() {
        let req = CampaignRequest::new();
        assert_eq!(
            req.normalized().get("objective"),
            Some(&json!(DEFAULT_OBJECTIVE))
        );

        let custom = CampaignRequest::new().with("objective", "Win the holiday season");
        assert_eq!(
            custom.normalized().get("objective"),
            Some(&json!("Win the holiday season"))
        );
    }

    #[test]
    fn test_template_vars_fill_known_fields() {
        let vars = CampaignRequest::new()
            .with("brand_name", "Popcorn Labs")
            .with("seats", 12)
            .template_vars();
        assert_eq!(vars["brand_name"], "Popcorn Labs");
        assert_eq!(vars["seats"], "12");
        assert_eq!(vars["niche"], "not specified");
        assert_eq!(vars["objective"], DEFAULT_OBJECTIVE);
    }

    #[test]
    fn test_from_form_keeps_values_verbatim() {
        let form = HashMap::from([
            ("brand_name".to_string(), "Popcorn Labs".to_string()),
            ("budget_level".to_string(), "premium".to_string()),
        ]);
        let req = CampaignRequest::from_form(form);
        assert_eq!(req.get("budget_level"), Some(&json!("premium")));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let req = CampaignRequest::sample();
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["brand_name"], "Popcorn Labs");
        assert_eq!(value["brand_voice"], "bold, cinematic, human");
    }
}
