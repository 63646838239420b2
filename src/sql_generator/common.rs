/// Convert a DAX identifier to the warehouse naming convention.
///
/// Surrounding single quotes are stripped, then an underscore is inserted
/// before every uppercase letter that is not at position 0 and the result is
/// lowercased. Acronym runs split letter by letter (`CustomerID` becomes
/// `customer_i_d`); a schema context mapping is the intended override for
/// names where that is not wanted.
pub fn to_snake_case(name: &str) -> String {
    let name = name
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(name);

    let mut result = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() && i != 0 {
            result.push('_');
        }
        result.extend(ch.to_lowercase());
    }
    result
}
