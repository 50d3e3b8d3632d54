//! Encoding of query descriptors into the store's bracket-style grammar.
//!
//! The nested shape wraps all facet predicates in one `filters[$and][i]`
//! tree; the flat shape roots each predicate directly under `filters`,
//! which is how the store's dedicated author contains-parameter is
//! expressed.

use url::form_urlencoded;

use super::types::{Predicate, QueryDescriptor, RequestShape};

/// Expand a descriptor into ordered key/value pairs, unescaped.
pub fn to_query_pairs(descriptor: &QueryDescriptor) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    match descriptor.shape {
        RequestShape::Nested => {
            if !descriptor.predicates.is_empty() {
                let tree = Predicate::And(descriptor.predicates.clone());
                write_predicate("filters", &tree, &mut pairs);
            }
        }
        RequestShape::AuthorContains => {
            for predicate in &descriptor.predicates {
                write_predicate("filters", predicate, &mut pairs);
            }
        }
    }

    for spec in descriptor.populate {
        for (index, field) in spec.fields.iter().enumerate() {
            pairs.push((
                format!("populate[{}][fields][{}]", spec.relation, index),
                (*field).to_string(),
            ));
        }
    }

    pairs.push(("pagination[page]".to_string(), descriptor.page.to_string()));
    pairs.push((
        "pagination[pageSize]".to_string(),
        descriptor.page_size.to_string(),
    ));
    pairs.push(("sort".to_string(), descriptor.sort.to_string()));
    pairs.push(("locale".to_string(), descriptor.locale.clone()));

    pairs
}

/// Expand and escape a descriptor into the request query string.
pub fn to_query_string(descriptor: &QueryDescriptor) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(to_query_pairs(descriptor))
        .finish()
}

fn write_predicate(prefix: &str, predicate: &Predicate, out: &mut Vec<(String, String)>) {
    match predicate {
        Predicate::And(children) => {
            for (index, child) in children.iter().enumerate() {
                write_predicate(&format!("{}[$and][{}]", prefix, index), child, out);
            }
        }
        Predicate::Or(children) => {
            for (index, child) in children.iter().enumerate() {
                write_predicate(&format!("{}[$or][{}]", prefix, index), child, out);
            }
        }
        Predicate::ContainsInsensitive { field, value } => {
            out.push((
                format!("{}{}[$containsi]", prefix, field_keys(field)),
                value.clone(),
            ));
        }
        Predicate::Gte { field, value } => {
            out.push((format!("{}{}[$gte]", prefix, field_keys(field)), value.clone()));
        }
        Predicate::Lte { field, value } => {
            out.push((format!("{}{}[$lte]", prefix, field_keys(field)), value.clone()));
        }
        Predicate::Eq { field, value } => {
            out.push((
                format!("{}{}[$eq]", prefix, field_keys(field)),
                value.to_string(),
            ));
        }
        Predicate::In { field, values } => {
            for (index, value) in values.iter().enumerate() {
                out.push((
                    format!("{}{}[$in][{}]", prefix, field_keys(field), index),
                    value.clone(),
                ));
            }
        }
    }
}

fn field_keys(field: &[&str]) -> String {
    field
        .iter()
        .map(|segment| format!("[{}]", segment))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        Scalar, FIELD_AUTHOR_NAME, FIELD_CATEGORY_SLUG, FIELD_IS_STUDENT, FIELD_TYPE,
        SORT_NEWEST_FIRST, STORY_POPULATE,
    };

    fn descriptor(predicates: Vec<Predicate>, shape: RequestShape) -> QueryDescriptor {
        QueryDescriptor {
            predicates,
            shape,
            populate: STORY_POPULATE,
            sort: SORT_NEWEST_FIRST,
            page: 1,
            page_size: 20,
            locale: "en".to_string(),
        }
    }

    fn assert_pair(pairs: &[(String, String)], key: &str, value: &str) {
        assert!(
            pairs.iter().any(|(k, v)| k == key && v == value),
            "missing pair {}={} in {:?}",
            key,
            value,
            pairs
        );
    }

    #[test]
    fn test_nested_shape_wraps_in_and() {
        let pairs = to_query_pairs(&descriptor(
            vec![Predicate::In {
                field: FIELD_CATEGORY_SLUG,
                values: vec!["climate".to_string(), "health".to_string()],
            }],
            RequestShape::Nested,
        ));

        assert_pair(&pairs, "filters[$and][0][categories][slug][$in][0]", "climate");
        assert_pair(&pairs, "filters[$and][0][categories][slug][$in][1]", "health");
    }

    #[test]
    fn test_author_shape_is_flat() {
        let pairs = to_query_pairs(&descriptor(
            vec![Predicate::ContainsInsensitive {
                field: FIELD_AUTHOR_NAME,
                value: "Asha".to_string(),
            }],
            RequestShape::AuthorContains,
        ));

        assert_pair(&pairs, "filters[authors][name][$containsi]", "Asha");
        assert!(pairs.iter().all(|(k, _)| !k.contains("$and")));
    }

    #[test]
    fn test_or_tree_is_indexed() {
        let pairs = to_query_pairs(&descriptor(
            vec![Predicate::Or(vec![
                Predicate::Eq {
                    field: FIELD_TYPE,
                    value: Scalar::Str("video".to_string()),
                },
                Predicate::Eq {
                    field: FIELD_IS_STUDENT,
                    value: Scalar::Bool(true),
                },
            ])],
            RequestShape::Nested,
        ));

        assert_pair(&pairs, "filters[$and][0][$or][0][type][$eq]", "video");
        assert_pair(
            &pairs,
            "filters[$and][0][$or][1][isStudentArticle][$eq]",
            "true",
        );
    }

    #[test]
    fn test_fixed_parameters_always_present() {
        let pairs = to_query_pairs(&descriptor(Vec::new(), RequestShape::Nested));

        assert_pair(&pairs, "pagination[page]", "1");
        assert_pair(&pairs, "pagination[pageSize]", "20");
        assert_pair(&pairs, "sort", "publishedAt:desc");
        assert_pair(&pairs, "locale", "en");
        assert_pair(&pairs, "populate[cover][fields][0]", "url");
        assert_pair(&pairs, "populate[localizations][fields][2]", "strap");
        assert!(pairs.iter().all(|(k, _)| !k.starts_with("filters")));
    }

    #[test]
    fn test_query_string_is_escaped() {
        let query = to_query_string(&descriptor(Vec::new(), RequestShape::Nested));
        assert!(query.contains("pagination%5Bpage%5D=1"));
        assert!(query.contains("sort=publishedAt%3Adesc"));
    }
}
