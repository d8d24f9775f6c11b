//! Immutable edits of embedded collections and links
//!
//! Every function takes a snapshot by reference and returns a new one; the
//! input is never modified. Items are matched by self href only, since the
//! same entity is routinely rebuilt between two calls.

use crate::core::error::{HalError, ProtocolError};
use crate::core::link::Link;
use crate::core::resource::{EmbeddedValue, Resource};
use serde::de::DeserializeOwned;

/// The embedded items under `rel`
pub fn unwrap<'a, T>(resource: &'a Resource<T>, rel: &str) -> Result<&'a [Resource], ProtocolError> {
    resource
        .embedded(rel)
        .map(EmbeddedValue::as_slice)
        .ok_or_else(|| ProtocolError::MissingEmbedded {
            rel: rel.to_string(),
            href: resource.self_href().to_string(),
        })
}

/// The embedded items under `rel`, read as `U`
pub fn unwrap_typed<T, U: DeserializeOwned>(resource: &Resource<T>, rel: &str) -> Result<Vec<Resource<U>>, HalError> {
    unwrap(resource, rel)?
        .iter()
        .cloned()
        .map(Resource::into_typed)
        .collect()
}

fn replace_items<T: Clone>(resource: &Resource<T>, rel: &str, items: Vec<Resource>) -> Resource<T> {
    let mut next = resource.clone();
    next.embedded
        .get_or_insert_with(Default::default)
        .insert(rel, EmbeddedValue::Many(items));
    next
}

/// Append `item` to the collection under `rel`
///
/// No duplicate check is made.
pub fn add_item<T: Clone>(resource: &Resource<T>, rel: &str, item: Resource) -> Result<Resource<T>, ProtocolError> {
    let mut items = unwrap(resource, rel)?.to_vec();
    items.push(item);
    Ok(replace_items(resource, rel, items))
}

/// Replace the item sharing `item`'s self href
///
/// Returns an unchanged copy when nothing matches.
pub fn set_item<T: Clone>(resource: &Resource<T>, rel: &str, item: Resource) -> Result<Resource<T>, ProtocolError> {
    let items = unwrap(resource, rel)?
        .iter()
        .map(|existing| {
            if existing.same_identity(&item) {
                item.clone()
            } else {
                existing.clone()
            }
        })
        .collect();
    Ok(replace_items(resource, rel, items))
}

/// Remove every item sharing `item`'s self href
pub fn delete_item<T: Clone, U>(
    resource: &Resource<T>,
    rel: &str,
    item: &Resource<U>,
) -> Result<Resource<T>, ProtocolError> {
    let items = unwrap(resource, rel)?
        .iter()
        .filter(|existing| !existing.same_identity(item))
        .cloned()
        .collect();
    Ok(replace_items(resource, rel, items))
}

/// Add a link to `rel`, turning a single link into an array
pub fn add_link<T: Clone>(resource: &Resource<T>, rel: &str, href: &str) -> Result<Resource<T>, ProtocolError> {
    let mut next = resource.clone();
    next.links.push(rel, Link::new(href))?;
    Ok(next)
}

/// Remove the link with `href` from `rel`
pub fn remove_link<T: Clone>(resource: &Resource<T>, rel: &str, href: &str) -> Result<Resource<T>, ProtocolError> {
    resource.require_link(rel)?;
    let mut next = resource.clone();
    next.links.remove(rel, href);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn team(id: u32, name: &str) -> Resource {
        Resource::from_value(json!({
            "name": name,
            "_links": {"self": {"href": format!("http://api/teams/{}", id)}}
        }))
        .unwrap()
    }

    fn collection(items: Vec<Resource>) -> Resource {
        let mut value = json!({
            "_links": {"self": {"href": "http://api/teams?page=0&size=20"}},
            "page": {"size": 20, "totalElements": items.len(), "totalPages": 1, "number": 0}
        });
        value["_embedded"] = json!({"teams": serde_json::to_value(&items).unwrap()});
        Resource::from_value(value).unwrap()
    }

    fn names(resource: &Resource) -> Vec<Value> {
        unwrap(resource, "teams")
            .unwrap()
            .iter()
            .map(|t| t.get("name").cloned().unwrap_or(Value::Null))
            .collect()
    }

    #[test]
    fn test_unwrap_missing_relation_fails() {
        let c = collection(vec![team(1, "U11 F")]);
        assert!(matches!(
            unwrap(&c, "coaches"),
            Err(ProtocolError::MissingEmbedded { .. })
        ));
    }

    #[test]
    fn test_add_item_appends_once_at_end() {
        let c = collection(vec![team(1, "U11 F"), team(2, "U13 M")]);
        let next = add_item(&c, "teams", team(3, "Senior")).unwrap();

        assert_eq!(names(&next), vec![json!("U11 F"), json!("U13 M"), json!("Senior")]);
        let hrefs: Vec<_> = unwrap(&next, "teams").unwrap().iter().map(|t| t.self_href()).collect();
        assert_eq!(hrefs.iter().filter(|h| **h == "http://api/teams/3").count(), 1);
        assert_eq!(unwrap(&c, "teams").unwrap().len(), 2);
    }

    #[test]
    fn test_set_item_matches_by_href_and_is_idempotent() {
        let c = collection(vec![team(1, "U11 F"), team(2, "U13 M")]);
        let renamed = team(2, "U13 Mixed");

        let once = set_item(&c, "teams", renamed.clone()).unwrap();
        let twice = set_item(&once, "teams", renamed).unwrap();

        assert_eq!(names(&once), vec![json!("U11 F"), json!("U13 Mixed")]);
        assert_eq!(once, twice);

        let untouched = set_item(&c, "teams", team(9, "Ghost")).unwrap();
        assert_eq!(untouched, c);
    }

    #[test]
    fn test_delete_item_matches_rebuilt_item() {
        let c = collection(vec![team(1, "U11 F"), team(2, "U13 M")]);
        let rebuilt = team(1, "completely different name");

        let next = delete_item(&c, "teams", &rebuilt).unwrap();
        assert_eq!(names(&next), vec![json!("U13 M")]);
    }

    #[test]
    fn test_unwrap_typed_reads_items() {
        #[derive(Debug, serde::Deserialize)]
        struct Named {
            name: String,
        }

        let c = collection(vec![team(1, "U11 F"), team(2, "U13 M")]);
        let teams: Vec<Resource<Named>> = unwrap_typed(&c, "teams").unwrap();

        assert_eq!(teams[1].data.name, "U13 M");
        assert_eq!(teams[1].self_href(), "http://api/teams/2");
        assert_eq!(
            unwrap_typed::<_, Named>(&c, "coaches").unwrap_err().error_code(),
            "MISSING_EMBEDDED"
        );
    }

    #[test]
    fn test_add_and_remove_link() {
        let t = team(1, "U11 F");

        let one = add_link(&t, "coaches", "http://api/coaches/1").unwrap();
        let two = add_link(&one, "coaches", "http://api/coaches/2").unwrap();
        assert_eq!(two.link("coaches").unwrap().len(), 2);
        assert!(!t.has_link("coaches"));

        let back = remove_link(&two, "coaches", "http://api/coaches/2").unwrap();
        assert_eq!(back.link("coaches").unwrap().len(), 1);

        assert!(remove_link(&t, "coaches", "http://api/coaches/1").is_err());
    }
}
