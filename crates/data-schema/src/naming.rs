//! Naming conventions shared by the graph builder and the shape deriver.

/// Upper-cases the first character: `location` → `Location`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lower-cases the first character: `Company` → `company`.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Default foreign key name for a reference to `target` through its
/// identifier field `identifier_field`.
///
/// `Company` + `id` → `companyId`; `Employee` + `employeeId` →
/// `employeeEmployeeId`. Only the first character of the model name is
/// lowered, so `URLRecord` + `id` → `uRLRecordId`.
pub fn default_foreign_key(target: &str, identifier_field: &str) -> String {
    format!("{}{}", lower_first(target), capitalize(identifier_field))
}

/// Name under which an inline enum or custom type declared on `field` is
/// registered.
pub fn lifted_type_name(field: &str) -> String {
    capitalize(field)
}

/// Name under which an inline return type of the custom operation
/// `operation` is registered: `echo` → `EchoReturnType`.
pub fn return_type_name(operation: &str) -> String {
    format!("{}ReturnType", capitalize(operation))
}

/// Default join model name for a many-to-many relationship: both model names
/// in sorted order.
pub fn default_join_model(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}{}", a, b)
    } else {
        format!("{}{}", b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_helpers() {
        assert_eq!(capitalize("location"), "Location");
        assert_eq!(capitalize(""), "");
        assert_eq!(lower_first("Company"), "company");
        assert_eq!(lower_first("company"), "company");
    }

    #[test]
    fn test_default_foreign_key_golden() {
        assert_eq!(default_foreign_key("Company", "id"), "companyId");
        assert_eq!(default_foreign_key("Employee", "employeeId"), "employeeEmployeeId");
        assert_eq!(default_foreign_key("LineItem", "id"), "lineItemId");
        assert_eq!(default_foreign_key("customer", "id"), "customerId");
        assert_eq!(default_foreign_key("URLRecord", "id"), "uRLRecordId");
    }

    #[test]
    fn test_default_join_model_is_order_independent() {
        assert_eq!(default_join_model("Post", "Tag"), "PostTag");
        assert_eq!(default_join_model("Tag", "Post"), "PostTag");
    }

    #[test]
    fn test_return_type_name() {
        assert_eq!(return_type_name("echo"), "EchoReturnType");
        assert_eq!(lifted_type_name(&return_type_name("echo")), "EchoReturnType");
    }
}
