//! Query shaping shared by the delete routes.

use scout_rs_store::Query;
use serde_json::Value;

/// Id that matches every record in a delete-by-id route.
pub const MATCH_ALL_ID: &str = "*";

/// Constrain `find._id` to `id`, or lift the constraint entirely for `*`.
///
/// Other `find` fields supplied by the client are kept.
pub fn scope_to_id(query: &mut Query, id: &str) {
    if id == MATCH_ALL_ID {
        query.set_find_field("_id", None);
    } else {
        query.set_find_field("_id", Some(Value::String(id.to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::scope_to_id;
    use pretty_assertions::assert_eq;
    use scout_rs_store::Query;
    use serde_json::json;

    #[test]
    fn literal_id_constrains_find() {
        let mut query = Query::from_pairs([("find[device]", "pump")]);
        scope_to_id(&mut query, "abc123");
        assert_eq!(
            query.find().cloned().map(serde_json::Value::Object),
            Some(json!({ "device": "pump", "_id": "abc123" }))
        );
    }

    #[test]
    fn wildcard_removes_id_constraint() {
        let mut query = Query::from_pairs([("find[_id]", "abc"), ("find[device]", "pump")]);
        scope_to_id(&mut query, "*");
        assert_eq!(
            query.find().cloned().map(serde_json::Value::Object),
            Some(json!({ "device": "pump" }))
        );

        let mut bare = Query::new();
        scope_to_id(&mut bare, "*");
        assert_eq!(bare.find().map(|find| find.is_empty()), Some(true));
    }
}
