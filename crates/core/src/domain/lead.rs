use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A captured sales lead. The named fields are the minimum contract with the
/// SDR conversation; anything else the caller collected rides along in
/// `extra` so no spoken detail is dropped on persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub company: String,
    pub email: String,
    pub role: String,
    pub use_case: String,
    pub team_size: String,
    pub timeline: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Lead {
    /// Build a lead from a loose field map, routing unknown keys to `extra`.
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        let mut lead = Lead::default();
        for (key, value) in fields {
            match key.as_str() {
                "name" => lead.name = value,
                "company" => lead.company = value,
                "email" => lead.email = value,
                "role" => lead.role = value,
                "use_case" => lead.use_case = value,
                "team_size" => lead.team_size = value,
                "timeline" => lead.timeline = value,
                _ => {
                    lead.extra.insert(key, value);
                }
            }
        }
        lead
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::Lead;

    #[test]
    fn from_fields_routes_named_and_extra_keys() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_owned(), "Priya".to_owned());
        fields.insert("company".to_owned(), "Blue Tokai".to_owned());
        fields.insert("favorite_roast".to_owned(), "dark".to_owned());

        let lead = Lead::from_fields(fields);
        assert_eq!(lead.name, "Priya");
        assert_eq!(lead.company, "Blue Tokai");
        assert_eq!(lead.extra.get("favorite_roast").map(String::as_str), Some("dark"));
    }

    #[test]
    fn round_trips_through_json_with_extras_flattened() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_owned(), "Arun".to_owned());
        fields.insert("region".to_owned(), "south".to_owned());
        let lead = Lead::from_fields(fields);

        let json = serde_json::to_value(&lead).expect("serialize");
        assert_eq!(json["region"], "south");

        let back: Lead = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, lead);
    }
}
