//! Query string helpers for the Solr adapter.

/// Quote a value as a Solr phrase, escaping backslashes and double quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Filter matching every document of one entity type owned by one site.
pub(crate) fn scope_filter(site_id: &str, entity_type: &str) -> String {
    format!("+site_id:{} +entity_type:{}", quote(site_id), quote(entity_type))
}

/// Filter matching every document owned by one site, whatever its type.
pub(crate) fn site_filter(site_id: &str) -> String {
    format!("+site_id:{}", quote(site_id))
}

/// Filter matching a single record by id or by name, inside a scope.
pub(crate) fn reference_filter(scope: &str, reference: &str) -> String {
    let quoted = quote(reference);
    format!("{} +(id:{} OR name:{})", scope, quoted, quoted)
}
